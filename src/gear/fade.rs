use crate::common::defs::{FAST_FADE_TIME_MULT, MASK, MAX_LEVEL, OPMODE_LINEAR_CURVE};
use crate::gear::control::{FadeDir, GearCtl};
use crate::gear::host::GearHost;

/// Fade time in µs, indexed by the FADE TIME parameter
pub const FADE_TIMES_US: [u32; 16] = [
    0, 700000, 1000000, 1400000, 2000000, 2800000, 4000000, 5700000, 8000000, 11300000, 16000000,
    22600000, 32000000, 45300000, 64000000, 90500000,
];

/// µs per step, indexed by the FADE RATE parameter
pub const FADE_RATES_US: [u32; 16] = [
    0, 2793, 3953, 5587, 7905, 11186, 15798, 22371, 31646, 44643, 63291, 89286, 126582, 178571,
    250000, 357143,
];

/// Logarithmic dimming curve in tenths of a percent
pub const DIM_CURVE: [u16; 255] = [
    0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3,
    3, 3, 3, 3, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5,
    5, 5, 5, 6, 6, 6, 6, 6, 6, 7, 7, 7, 7, 7, 8, 8,
    8, 8, 9, 9, 9, 9, 10, 10, 10, 11, 11, 11, 12, 12, 12, 13,
    13, 13, 14, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20,
    20, 21, 21, 22, 23, 23, 24, 25, 25, 26, 27, 27, 28, 29, 30, 31,
    32, 32, 33, 34, 35, 36, 37, 38, 39, 40, 42, 43, 44, 45, 46, 48,
    49, 50, 52, 53, 55, 56, 58, 60, 61, 63, 65, 67, 68, 70, 72, 74,
    76, 78, 81, 83, 85, 88, 90, 92, 95, 98, 100, 103, 106, 109, 112, 115,
    118, 122, 125, 129, 132, 136, 140, 143, 147, 151, 156, 160, 164, 169, 174, 179,
    184, 189, 194, 199, 205, 210, 216, 222, 228, 235, 241, 248, 255, 262, 269, 277,
    284, 292, 300, 309, 317, 326, 335, 344, 354, 364, 374, 384, 395, 406, 417, 428,
    440, 453, 465, 478, 491, 505, 519, 533, 548, 563, 579, 595, 611, 628, 646, 663,
    682, 701, 720, 740, 761, 782, 803, 826, 848, 872, 896, 921, 946, 973, 1000,
];

/// Light output for a level, in tenths of a percent
pub fn level_to_permille(level: u8, linear: bool) -> u16 {
    let level = level.min(MAX_LEVEL);
    if linear {
        (u32::from(level) * 1000 / u32::from(MAX_LEVEL)) as u16
    } else {
        DIM_CURVE[level as usize]
    }
}

impl GearCtl {
    /// Start moving towards the requested level
    pub(crate) fn setup_fade(&mut self) {
        if self.requested_level == MASK {
            self.requested_level = self.actual_level;
            self.stop_fade();
            return;
        }
        self.flags.fade_rate_req = false;
        self.fade_counter = 0;
        self.status.limit_error = false;

        let min = self.params.min_level;
        let max = self.params.max_level;
        if self.requested_level != 0 && self.requested_level < min {
            self.requested_level = min;
            self.status.limit_error = true;
        } else if self.requested_level > max {
            self.requested_level = max;
            self.status.limit_error = true;
        }

        let mut period = if self.params.fade_time != 0 {
            FADE_TIMES_US[(self.params.fade_time & 0x0f) as usize]
        } else {
            u32::from(self.params.fast_fade_time) * FAST_FADE_TIME_MULT
        };

        let actual = i32::from(self.actual_level);
        let requested = i32::from(self.requested_level);
        let (dir, distance) = if requested > actual + 1 {
            let from = if actual == 0 { i32::from(min) } else { actual };
            (FadeDir::Up, requested - from)
        } else if requested < actual - 1 {
            let to = if requested == 0 { i32::from(min) } else { requested };
            (FadeDir::Down, actual - to)
        } else {
            (FadeDir::Idle, 0)
        };
        // Nothing left to travel
        if distance <= 0 {
            period = 0;
        }

        if period == 0 {
            self.actual_level = self.requested_level;
            self.stop_fade();
        } else {
            self.fade_dir = dir;
            self.fade_increment = (period / distance as u32).max(1);
            self.fade_period = period;
            self.status.fade_running = true;
        }
    }

    /// Start fading at the configured rate, for UP and DOWN
    pub(crate) fn start_rate_fade(&mut self, dir: FadeDir, ticks: u32) {
        self.fade_dir = dir;
        self.fade_increment = FADE_RATES_US[(self.params.fade_rate & 0x0f) as usize];
        self.fade_counter = 0;
        self.fade_period = ticks;
        self.flags.fade_rate_req = true;
    }

    /// Keep the target of a running time fade inside changed level limits
    pub(crate) fn clamp_fade_target(&mut self) {
        if self.fade_period == 0 || self.flags.fade_rate_req {
            return;
        }
        let min = self.params.min_level;
        let max = self.params.max_level;
        if self.requested_level != 0 && self.requested_level < min {
            self.requested_level = min;
        } else if self.requested_level > max {
            self.requested_level = max;
        }
        if self.actual_level == self.requested_level {
            self.stop_fade();
        }
    }

    pub(crate) fn stop_fade(&mut self) {
        self.fade_period = 0;
        self.fade_increment = 0;
        self.fade_counter = 0;
        self.fade_dir = FadeDir::Idle;
        self.flags.fade_rate_req = false;
        self.status.fade_running = false;
    }

    /// Advance a running fade by one output tick
    pub(crate) fn fade_step(&mut self) {
        let min = self.params.min_level;
        let max = self.params.max_level;
        let by_rate = self.flags.fade_rate_req;
        self.fade_counter += self.timing.output_tick_us;
        if by_rate {
            self.fade_period = self.fade_period.saturating_sub(1);
        }
        if self.fade_counter >= self.fade_increment {
            self.fade_counter -= self.fade_increment;
            match self.fade_dir {
                FadeDir::Up => {
                    if self.actual_level == 0 {
                        self.actual_level = min;
                    } else if self.actual_level < max {
                        self.actual_level += 1;
                    }
                }
                FadeDir::Down => {
                    if self.actual_level > min {
                        self.actual_level -= 1;
                    } else if !by_rate {
                        self.actual_level = 0;
                    }
                }
                FadeDir::Idle => {}
            }
            if (!by_rate && self.actual_level == self.requested_level)
                || (by_rate && self.fade_period == 0)
            {
                self.stop_fade();
            } else {
                self.status.fade_running = true;
            }
        } else if by_rate && self.fade_period == 0 {
            self.stop_fade();
        }
    }

    /// Publish the actual level to the lamp
    pub(crate) fn output_light_level(&self, host: &mut dyn GearHost) {
        let linear = self.params.operating_mode & OPMODE_LINEAR_CURVE != 0;
        host.set_led_level(level_to_permille(self.actual_level, linear));
    }
}
