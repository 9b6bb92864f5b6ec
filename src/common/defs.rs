/// Unset address, scene or level
pub const MASK: u8 = 0xff;

pub const YES: u8 = 0xff;
pub const NO: u8 = 0x00;

/// Highest arc power level
pub const MAX_LEVEL: u8 = 0xfe;

/// Actual level set by RESET, also the value tracked by the reset state
pub const RESET_LEVEL: u8 = 0xfe;

/// Search and random address value after reset
pub const SEARCH_ADDRESS_RESET: u32 = 0xffffff;

pub const VERSION_NUMBER: u8 = 1;

/// Indirect commands up to and including this opcode change the light level
pub const NORMAL_INDIRECT_LEVEL_MAX: u8 = 32;

/// Microseconds per unit of fast fade time
pub const FAST_FADE_TIME_MULT: u32 = 25000;
pub const FAST_FADE_TIME_MAX: u8 = 27;

/// Output ticks an UP or DOWN command keeps fading
pub const UP_DOWN_FADE_TICKS: u32 = 200;

/// Bit in the operating mode selecting the linear dimming curve
pub const OPMODE_LINEAR_CURVE: u8 = 0x10;

pub mod status {
    pub const GEAR_FAILURE: u8 = 0x01;
    pub const LAMP_FAILURE: u8 = 0x02;
    pub const LAMP_ON: u8 = 0x04;
    pub const LIMIT_ERROR: u8 = 0x08;
    pub const FADE_RUNNING: u8 = 0x10;
    pub const RESET_STATE: u8 = 0x20;
    pub const NO_ADDRESS: u8 = 0x40;
    pub const POWER_FAILURE: u8 = 0x80;

    /// Status bits that must be clear for the gear to be in reset state
    pub const RESET_MASK: u8 = LIMIT_ERROR | FADE_RUNNING | POWER_FAILURE;
}

/// Failure status bits of LED gear (device type 6)
pub mod failure {
    pub const SHORT_CIRCUIT: u8 = 0x01;
    pub const OPEN_CIRCUIT: u8 = 0x02;
    pub const LOAD_DECREASE: u8 = 0x04;
    pub const LOAD_INCREASE: u8 = 0x08;
    pub const CURRENT_PROTECTOR_ACTIVE: u8 = 0x10;
    pub const THERMAL_SHUTDOWN: u8 = 0x20;
    pub const THERMAL_OVERLOAD: u8 = 0x40;
    pub const REFERENCE_MEASUREMENT_FAILED: u8 = 0x80;
}
