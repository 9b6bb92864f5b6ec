use crate::common::defs::status as flag;
use std::fmt;

/// Sticky status of the gear as answered by QUERY STATUS
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GearStatus {
    pub gear_failure: bool,
    pub lamp_failure: bool,
    pub lamp_on: bool,
    pub limit_error: bool,
    pub fade_running: bool,
    pub reset_state: bool,
    pub missing_short_address: bool,
    pub power_failure: bool,
}

impl GearStatus {
    pub fn value(&self) -> u8 {
        let bits = [
            (self.gear_failure, flag::GEAR_FAILURE),
            (self.lamp_failure, flag::LAMP_FAILURE),
            (self.lamp_on, flag::LAMP_ON),
            (self.limit_error, flag::LIMIT_ERROR),
            (self.fade_running, flag::FADE_RUNNING),
            (self.reset_state, flag::RESET_STATE),
            (self.missing_short_address, flag::NO_ADDRESS),
            (self.power_failure, flag::POWER_FAILURE),
        ];
        bits.iter()
            .filter(|(set, _)| *set)
            .fold(0, |acc, (_, bit)| acc | bit)
    }
}

impl fmt::Display for GearStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut strs = Vec::<&'static str>::new();
        if self.gear_failure {
            strs.push("gear failure");
        }
        if self.lamp_failure {
            strs.push("lamp failure");
        }
        if self.lamp_on {
            strs.push("lamp on");
        }
        if self.limit_error {
            strs.push("limit error");
        }
        if self.fade_running {
            strs.push("fade running");
        }
        if self.reset_state {
            strs.push("reset state");
        }
        if self.missing_short_address {
            strs.push("no address");
        }
        if self.power_failure {
            strs.push("power failure");
        }
        f.write_str(&strs.join(", "))
    }
}

/// Parameters that differ from their reset value.
///
/// A field is `true` when the value has left its reset state.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ResetState {
    pub actual_level: bool,
    pub power_on_level: bool,
    pub system_failure_level: bool,
    pub min_level: bool,
    pub max_level: bool,
    pub fade_rate: bool,
    pub fade_time: bool,
    pub search_address_h: bool,
    pub search_address_m: bool,
    pub search_address_l: bool,
    pub random_address_h: bool,
    pub random_address_m: bool,
    pub random_address_l: bool,
    pub groups: bool,
    /// One bit per scene
    pub scenes: u16,
}

impl ResetState {
    /// True when every tracked value is at its reset value
    pub fn is_clear(&self) -> bool {
        *self == ResetState::default()
    }
}
