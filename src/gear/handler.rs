//! Entry points called by the firmware loop.

use crate::common::defs::{MASK, MAX_LEVEL};
use crate::gear::control::{GearCtl, MsgState};
use crate::gear::dispatch::{frame_name, ParseStatus};
use crate::gear::host::{GearEvent, GearHost, TimerSlot};
use crate::gear::params::{GearParams, ParamId};
use log::{debug, info, warn};

/// Consecutive powered samples needed before the bus counts as restored
const BUS_RESTORE_SAMPLES: u32 = 2;

impl GearCtl {
    /// Bring the control block to a known state before the first `control` call
    pub fn initialize(&mut self) -> bool {
        self.flags.initialized = false;
        self.flags.forced_message = false;
        self.flags.test_bus_power_on = false;
        self.bus_fail_count = 0;
        self.bus_restore_count = 0;
        // Nothing is accepted before `control` enables the gear
        self.state = MsgState::Off;
        true
    }

    /// Enable or disable the gear
    pub fn control(&mut self, host: &mut dyn GearHost, enable: bool) -> bool {
        if enable {
            if !self.flags.initialized {
                self.flags.initialized = true;
                self.params = GearParams::load(|id| host.get_value(id));
                self.short_address = host.get_value(ParamId::ShortAddress);
                self.status.power_failure = true;
                self.flags.init_window_running = false;
                host.seed_random();
                self.startup_condition(host);
                info!(
                    "Gear enabled, short address {:02x}, level {}",
                    self.short_address, self.actual_level
                );
            }
        } else {
            self.set_off(host);
            self.flags.initialized = false;
            info!("Gear disabled");
        }
        true
    }

    /// Handle one completion or timer event
    pub fn process_event(&mut self, host: &mut dyn GearHost, event: GearEvent) -> bool {
        if event == GearEvent::Timeout {
            if self.flags.repeat_timer_requested {
                self.flags.repeat_timer_requested = false;
                self.flags.app_ext_requested = false;
            } else if self.flags.dapc_sequence_running {
                self.end_dapc_sequence();
            } else if self.flags.response_pending {
                self.flags.response_pending = false;
                self.flags.response_requested = false;
                debug!("Reply {:02x}", self.response);
                host.start_transmit(&[self.response]);
            }
        }

        match (self.state, event) {
            (MsgState::Idle, GearEvent::ReceiveDone(frame)) => {
                self.cur_message = frame;
                debug!(
                    "Received {:02x} {:02x} {}",
                    frame[0],
                    frame[1],
                    frame_name(frame)
                );
                match self.parse_command(host) {
                    ParseStatus::Request100msTimer => {
                        self.flags.repeat_timer_requested = true;
                        host.start_timer(TimerSlot::Message, self.timing.repeat_window());
                        host.start_receive();
                    }
                    ParseStatus::Request200msTimer => {
                        host.start_timer(TimerSlot::Message, self.timing.dapc_window());
                        host.start_receive();
                    }
                    ParseStatus::SendResponse => {
                        self.flags.response_pending = true;
                        self.state = MsgState::WaitXmitDone;
                        host.start_timer(TimerSlot::Message, self.timing.reply_delay());
                    }
                    ParseStatus::ClearAllTimers => {
                        host.stop_timer(TimerSlot::Message);
                        self.flags.repeat_timer_requested = false;
                        self.flags.app_ext_requested = false;
                        host.start_receive();
                    }
                    ParseStatus::None => host.start_receive(),
                }
            }
            (MsgState::Off, GearEvent::ReceiveError) => {}
            (_, GearEvent::ReceiveError) => host.start_receive(),
            (MsgState::WaitXmitDone, GearEvent::ReceiveDone(_))
            | (MsgState::WaitXmitDone, GearEvent::TransmitDone) => {
                host.start_receive();
                self.state = MsgState::Idle;
            }
            _ => {}
        }
        true
    }

    /// The initialisation window has expired
    pub fn process_timer(&mut self) -> bool {
        if self.flags.init_window_running {
            debug!("Initialisation window closed");
        }
        self.flags.init_window_running = false;
        true
    }

    /// Called once per output tick
    pub fn process_output(&mut self, host: &mut dyn GearHost) -> bool {
        if self.fade_period != 0 {
            self.fade_step();
        }
        if self.actual_level != 0 && self.actual_level >= self.params.min_level {
            self.actual_level = self.actual_level.min(self.params.max_level);
            self.status.lamp_on = host.led_status();
            self.status.lamp_failure = !self.status.lamp_on;
        } else {
            self.status.lamp_on = false;
            self.actual_level = 0;
        }
        self.reset_state.actual_level = self.actual_level != MAX_LEVEL;
        self.output_light_level(host);
        true
    }

    /// Sample the bus power, called once per bus failure period
    pub fn process_bus_fail(&mut self, host: &mut dyn GearHost) -> bool {
        if self.state == MsgState::Off {
            return true;
        }
        let present = host.bus_power_present();
        if self.flags.test_bus_power_on {
            if present {
                self.bus_restore_count += 1;
                if self.bus_restore_count >= BUS_RESTORE_SAMPLES {
                    self.flags.test_bus_power_on = false;
                    self.bus_restore_count = 0;
                    self.bus_fail_count = 0;
                    host.start_receive();
                    info!("Bus power restored");
                }
            } else {
                self.bus_restore_count = 0;
            }
        } else if !present {
            let threshold = self.timing.bus_fail_threshold();
            if self.bus_fail_count < threshold {
                self.bus_fail_count += 1;
                if self.bus_fail_count == threshold {
                    self.system_failure(host);
                }
            }
        } else {
            self.bus_fail_count = 0;
        }
        true
    }

    /// Inject a frame as if it had been received, ahead of the queue
    pub fn force_message(&mut self, host: &mut dyn GearHost, addr: u8, data: u8) -> bool {
        if self.state != MsgState::Idle {
            return false;
        }
        self.flags.forced_message = true;
        host.post_priority(GearEvent::ReceiveDone([addr, data]));
        true
    }

    fn system_failure(&mut self, host: &mut dyn GearHost) {
        let level = self.params.system_failure_level;
        if level != MASK {
            self.actual_level = if level == 0 {
                0
            } else {
                level.min(self.params.max_level).max(self.params.min_level)
            };
            self.requested_level = self.actual_level;
            self.stop_fade();
            self.output_light_level(host);
        }
        warn!("Bus power lost, level {}", self.actual_level);
    }
}
