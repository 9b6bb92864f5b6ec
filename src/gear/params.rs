use serde_derive::{Deserialize, Serialize};

/// Persistent parameter identifiers
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    ShortAddress,
    PowerOnLevel,
    SystemFailureLevel,
    MinLevel,
    MaxLevel,
    LastRequestedLevel,
    FadeRate,
    FadeTime,
    RandomAddressH,
    RandomAddressM,
    RandomAddressL,
    Groups0007,
    Groups0815,
    /// Scene 0 to 15
    Scene(u8),
    FailureStatus,
    OperatingMode,
    FastFadeTime,
    // Memory bank 0 constants
    MinFastFadeTime,
    GearType,
    PossibleOperatingModes,
    Features,
    ExtendedVersion,
    DeviceType,
    PhysicalMinLevel,
}

const SCENE_BASE: usize = 13;

impl ParamId {
    pub const COUNT: usize = 39;

    /// Position in the flat parameter space
    pub fn index(self) -> usize {
        use ParamId::*;
        match self {
            ShortAddress => 0,
            PowerOnLevel => 1,
            SystemFailureLevel => 2,
            MinLevel => 3,
            MaxLevel => 4,
            LastRequestedLevel => 5,
            FadeRate => 6,
            FadeTime => 7,
            RandomAddressH => 8,
            RandomAddressM => 9,
            RandomAddressL => 10,
            Groups0007 => 11,
            Groups0815 => 12,
            Scene(s) => SCENE_BASE + (s & 0x0f) as usize,
            FailureStatus => 29,
            OperatingMode => 30,
            FastFadeTime => 31,
            MinFastFadeTime => 32,
            GearType => 33,
            PossibleOperatingModes => 34,
            Features => 35,
            ExtendedVersion => 36,
            DeviceType => 37,
            PhysicalMinLevel => 38,
        }
    }

    pub fn from_index(index: usize) -> Option<ParamId> {
        use ParamId::*;
        Some(match index {
            0 => ShortAddress,
            1 => PowerOnLevel,
            2 => SystemFailureLevel,
            3 => MinLevel,
            4 => MaxLevel,
            5 => LastRequestedLevel,
            6 => FadeRate,
            7 => FadeTime,
            8 => RandomAddressH,
            9 => RandomAddressM,
            10 => RandomAddressL,
            11 => Groups0007,
            12 => Groups0815,
            13..=28 => Scene((index - SCENE_BASE) as u8),
            29 => FailureStatus,
            30 => OperatingMode,
            31 => FastFadeTime,
            32 => MinFastFadeTime,
            33 => GearType,
            34 => PossibleOperatingModes,
            35 => Features,
            36 => ExtendedVersion,
            37 => DeviceType,
            38 => PhysicalMinLevel,
            _ => return None,
        })
    }

    pub fn all() -> impl Iterator<Item = ParamId> {
        (0..Self::COUNT).filter_map(ParamId::from_index)
    }
}

/// RAM copy of the persistent parameters, short address excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GearParams {
    pub power_on_level: u8,
    pub system_failure_level: u8,
    pub min_level: u8,
    pub max_level: u8,
    pub last_requested_level: u8,
    pub fade_rate: u8,
    pub fade_time: u8,
    /// 24 bits
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

impl GearParams {
    /// Build from a parameter source, either current or default values
    pub fn load<F>(mut source: F) -> GearParams
    where
        F: FnMut(ParamId) -> u8,
    {
        let mut scenes = [0u8; 16];
        for (s, level) in scenes.iter_mut().enumerate() {
            *level = source(ParamId::Scene(s as u8));
        }
        GearParams {
            power_on_level: source(ParamId::PowerOnLevel),
            system_failure_level: source(ParamId::SystemFailureLevel),
            min_level: source(ParamId::MinLevel),
            max_level: source(ParamId::MaxLevel),
            last_requested_level: source(ParamId::LastRequestedLevel),
            fade_rate: source(ParamId::FadeRate),
            fade_time: source(ParamId::FadeTime),
            random_address: (u32::from(source(ParamId::RandomAddressH)) << 16)
                | (u32::from(source(ParamId::RandomAddressM)) << 8)
                | u32::from(source(ParamId::RandomAddressL)),
            groups: u16::from(source(ParamId::Groups0007))
                | (u16::from(source(ParamId::Groups0815)) << 8),
            scenes,
            failure_status: source(ParamId::FailureStatus),
            operating_mode: source(ParamId::OperatingMode),
            fast_fade_time: source(ParamId::FastFadeTime),
            min_fast_fade_time: source(ParamId::MinFastFadeTime),
            gear_type: source(ParamId::GearType),
            possible_operating_modes: source(ParamId::PossibleOperatingModes),
            features: source(ParamId::Features),
            extended_version: source(ParamId::ExtendedVersion),
            device_type: source(ParamId::DeviceType),
            physical_min_level: source(ParamId::PhysicalMinLevel),
        }
    }

    /// Stored byte of a parameter, `None` for the short address
    pub fn value(&self, id: ParamId) -> Option<u8> {
        use ParamId::*;
        Some(match id {
            ShortAddress => return None,
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
        })
    }
}
