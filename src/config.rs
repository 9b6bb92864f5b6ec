use crate::common::defs::{MASK, MAX_LEVEL, SEARCH_ADDRESS_RESET};
use crate::error::DynResult;
use crate::gear::params::ParamId;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroOutputTick,
    ZeroBusFailPeriod,
    BusFailTimeoutTooShort,
    MinAboveMax,
    FadeRateOutOfRange(u8),
    FadeTimeOutOfRange(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroOutputTick => write!(f, "Output tick must be non-zero"),
            ConfigError::ZeroBusFailPeriod => write!(f, "Bus failure poll period must be non-zero"),
            ConfigError::BusFailTimeoutTooShort => {
                write!(f, "Bus failure timeout is shorter than the poll period")
            }
            ConfigError::MinAboveMax => write!(f, "Default min level is above max level"),
            ConfigError::FadeRateOutOfRange(r) => write!(f, "Fade rate {} not in 1..=15", r),
            ConfigError::FadeTimeOutOfRange(t) => write!(f, "Fade time {} not in 0..=15", t),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Factory default of every persistent parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamDefaults {
    pub short_address: u8,
    pub power_on_level: u8,
    pub system_failure_level: u8,
    pub min_level: u8,
    pub max_level: u8,
    pub last_requested_level: u8,
    pub fade_rate: u8,
    pub fade_time: u8,
    pub random_address: u32,
    pub groups: u16,
    pub scenes: [u8; 16],
    pub failure_status: u8,
    pub operating_mode: u8,
    pub fast_fade_time: u8,
    pub min_fast_fade_time: u8,
    pub gear_type: u8,
    pub possible_operating_modes: u8,
    pub features: u8,
    pub extended_version: u8,
    pub device_type: u8,
    pub physical_min_level: u8,
}

impl Default for ParamDefaults {
    fn default() -> Self {
        ParamDefaults {
            short_address: MASK,
            power_on_level: MAX_LEVEL,
            system_failure_level: MAX_LEVEL,
            min_level: 1,
            max_level: MAX_LEVEL,
            last_requested_level: MAX_LEVEL,
            fade_rate: 7,
            fade_time: 0,
            random_address: SEARCH_ADDRESS_RESET,
            groups: 0,
            scenes: [MASK; 16],
            failure_status: 0,
            operating_mode: 0,
            fast_fade_time: 0,
            min_fast_fade_time: 1,
            gear_type: 0,
            possible_operating_modes: 0,
            features: 0,
            extended_version: 1,
            device_type: 6,
            physical_min_level: 1,
        }
    }
}

impl ParamDefaults {
    pub fn value(&self, id: ParamId) -> u8 {
        use ParamId::*;
        match id {
            ShortAddress => self.short_address,
            PowerOnLevel => self.power_on_level,
            SystemFailureLevel => self.system_failure_level,
            MinLevel => self.min_level,
            MaxLevel => self.max_level,
            LastRequestedLevel => self.last_requested_level,
            FadeRate => self.fade_rate,
            FadeTime => self.fade_time,
            RandomAddressH => (self.random_address >> 16) as u8,
            RandomAddressM => (self.random_address >> 8) as u8,
            RandomAddressL => self.random_address as u8,
            Groups0007 => self.groups as u8,
            Groups0815 => (self.groups >> 8) as u8,
            Scene(s) => self.scenes[(s & 0x0f) as usize],
            FailureStatus => self.failure_status,
            OperatingMode => self.operating_mode,
            FastFadeTime => self.fast_fade_time,
            MinFastFadeTime => self.min_fast_fade_time,
            GearType => self.gear_type,
            PossibleOperatingModes => self.possible_operating_modes,
            Features => self.features,
            ExtendedVersion => self.extended_version,
            DeviceType => self.device_type,
            PhysicalMinLevel => self.physical_min_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearTiming {
    /// Microseconds added to the fade counter per output tick
    pub output_tick_us: u32,
    pub bus_fail_period_ms: u32,
    /// Bus power must be missing this long before the failure level is applied
    pub bus_fail_timeout_ms: u32,
    pub repeat_window_ms: u32,
    pub dapc_window_ms: u32,
    /// Delay between the end of a query and the backward frame
    pub reply_delay_ms: u32,
    pub init_window_s: u32,
}

impl Default for GearTiming {
    fn default() -> Self {
        GearTiming {
            output_tick_us: 1000,
            bus_fail_period_ms: 10,
            bus_fail_timeout_ms: 500,
            repeat_window_ms: 100,
            dapc_window_ms: 200,
            reply_delay_ms: 4,
            init_window_s: 15 * 60,
        }
    }
}

impl GearTiming {
    /// Number of bus failure polls without power before failing
    pub fn bus_fail_threshold(&self) -> u32 {
        (self.bus_fail_timeout_ms / self.bus_fail_period_ms.max(1)).max(1)
    }

    pub fn output_tick(&self) -> Duration {
        Duration::from_micros(u64::from(self.output_tick_us))
    }

    pub fn bus_fail_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.bus_fail_period_ms))
    }

    pub fn repeat_window(&self) -> Duration {
        Duration::from_millis(u64::from(self.repeat_window_ms))
    }

    pub fn dapc_window(&self) -> Duration {
        Duration::from_millis(u64::from(self.dapc_window_ms))
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.reply_delay_ms))
    }

    pub fn init_window(&self) -> Duration {
        Duration::from_secs(u64::from(self.init_window_s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearConfig {
    pub defaults: ParamDefaults,
    pub timing: GearTiming,
    /// Contents of memory bank 1 and up
    pub memory_banks: Vec<Vec<u8>>,
}

impl GearConfig {
    pub fn from_json(json: &str) -> DynResult<GearConfig> {
        let conf: GearConfig = serde_json::from_str(json)?;
        conf.validate()?;
        Ok(conf)
    }

    pub async fn load(path: impl AsRef<Path>) -> DynResult<GearConfig> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let timing = &self.timing;
        if timing.output_tick_us == 0 {
            return Err(ConfigError::ZeroOutputTick);
        }
        if timing.bus_fail_period_ms == 0 {
            return Err(ConfigError::ZeroBusFailPeriod);
        }
        if timing.bus_fail_timeout_ms < timing.bus_fail_period_ms {
            return Err(ConfigError::BusFailTimeoutTooShort);
        }
        let defaults = &self.defaults;
        if defaults.min_level > defaults.max_level {
            return Err(ConfigError::MinAboveMax);
        }
        if !(1..=15).contains(&defaults.fade_rate) {
            return Err(ConfigError::FadeRateOutOfRange(defaults.fade_rate));
        }
        if defaults.fade_time > 15 {
            return Err(ConfigError::FadeTimeOutOfRange(defaults.fade_time));
        }
        Ok(())
    }
}
