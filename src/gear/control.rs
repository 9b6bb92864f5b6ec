use crate::common::address::Address;
use crate::common::defs::{MASK, NO, RESET_LEVEL, SEARCH_ADDRESS_RESET, YES};
use crate::config::GearTiming;
use crate::gear::host::GearHost;
use crate::gear::params::{GearParams, ParamId};
use crate::gear::status::{GearStatus, ResetState};
use log::warn;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MsgState {
    Idle,
    WaitXmitDone,
    Off,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FadeDir {
    Idle,
    Up,
    Down,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PhysicalSelection {
    Disabled,
    Requested,
    Enabled,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    pub repeat_timer_requested: bool,
    pub dapc_sequence_running: bool,
    pub forced_message: bool,
    pub response_pending: bool,
    pub response_requested: bool,
    pub output_change_requested: bool,
    pub reset_requested: bool,
    pub fade_rate_req: bool,
    pub write_memory_enabled: bool,
    pub app_ext_requested: bool,
    pub init_window_running: bool,
    pub compare_enabled: bool,
    pub initialized: bool,
    pub test_bus_power_on: bool,
}

/// Control block of one gear instance.
///
/// Owned by the caller and handed to every entry point.
#[derive(Debug, Clone)]
pub struct GearCtl {
    pub state: MsgState,
    pub dtr0: u8,
    pub dtr1: u8,
    pub dtr2: u8,
    pub actual_level: u8,
    pub requested_level: u8,
    /// 24 bits
    pub search_address: u32,
    /// Backward frame of the pending response
    pub response: u8,
    /// µs of fade time, or remaining ticks when fading by rate
    pub fade_period: u32,
    pub fade_counter: u32,
    /// µs per level step
    pub fade_increment: u32,
    pub fade_dir: FadeDir,
    /// Fade time to restore when a DAPC sequence ends
    pub saved_fade_time: u8,
    pub physical_selection: PhysicalSelection,
    pub short_address: u8,
    pub params: GearParams,
    pub status: GearStatus,
    pub reset_state: ResetState,
    pub prev_message: [u8; 2],
    pub cur_message: [u8; 2],
    pub bus_fail_count: u32,
    pub bus_restore_count: u32,
    pub current_protector_enabled: bool,
    pub flags: Flags,
    pub timing: GearTiming,
}

impl GearCtl {
    pub fn new(timing: GearTiming) -> GearCtl {
        GearCtl {
            state: MsgState::Off,
            dtr0: 0,
            dtr1: 0,
            dtr2: 0,
            actual_level: 0,
            requested_level: 0,
            search_address: SEARCH_ADDRESS_RESET,
            response: 0,
            fade_period: 0,
            fade_counter: 0,
            fade_increment: 0,
            fade_dir: FadeDir::Idle,
            saved_fade_time: 0,
            physical_selection: PhysicalSelection::Disabled,
            short_address: MASK,
            params: GearParams::load(|_| 0),
            status: GearStatus::default(),
            reset_state: ResetState::default(),
            prev_message: [0; 2],
            cur_message: [0; 2],
            bus_fail_count: 0,
            bus_restore_count: 0,
            current_protector_enabled: true,
            flags: Flags::default(),
            timing,
        }
    }

    /// Does a frame addressed to `target` concern this gear
    pub fn is_addressed(&self, target: Address) -> bool {
        match target {
            Address::Broadcast => true,
            Address::Short(s) => s.value() == self.short_address,
            Address::Group(g) => self.params.groups & g.mask() != 0,
        }
    }

    pub(crate) fn answer(&mut self, value: u8) {
        self.response = value;
    }

    /// Answer YES, or stay silent
    pub(crate) fn answer_flag(&mut self, set: bool) {
        self.response = if set { YES } else { NO };
        self.flags.response_requested = set;
    }

    /// Write a parameter through to the store
    pub(crate) fn store(&self, host: &mut dyn GearHost, id: ParamId, value: u8) {
        if !host.put_value(id, value) {
            warn!("Failed to store {:?} = {}", id, value);
        }
    }

    pub(crate) fn store_param(&self, host: &mut dyn GearHost, id: ParamId) {
        if let Some(value) = self.params.value(id) {
            self.store(host, id, value);
        }
    }

    pub(crate) fn store_short_address(&mut self, host: &mut dyn GearHost, short: u8) {
        self.short_address = short;
        self.status.missing_short_address = short == MASK;
        self.store(host, ParamId::ShortAddress, short);
    }

    /// Compare every resettable value against its default
    pub(crate) fn refresh_reset_state(&mut self, host: &mut dyn GearHost) {
        let params = &self.params;
        let mut differs = |id: ParamId| params.value(id) != Some(host.get_default_value(id));
        let mut scenes = 0u16;
        for s in 0..16u8 {
            if differs(ParamId::Scene(s)) {
                scenes |= 1 << s;
            }
        }
        self.reset_state = ResetState {
            actual_level: self.actual_level != RESET_LEVEL,
            power_on_level: differs(ParamId::PowerOnLevel),
            system_failure_level: differs(ParamId::SystemFailureLevel),
            min_level: differs(ParamId::MinLevel),
            max_level: differs(ParamId::MaxLevel),
            fade_rate: differs(ParamId::FadeRate),
            fade_time: differs(ParamId::FadeTime),
            search_address_h: (self.search_address >> 16) & 0xff != 0xff,
            search_address_m: (self.search_address >> 8) & 0xff != 0xff,
            search_address_l: self.search_address & 0xff != 0xff,
            random_address_h: differs(ParamId::RandomAddressH),
            random_address_m: differs(ParamId::RandomAddressM),
            random_address_l: differs(ParamId::RandomAddressL),
            groups: differs(ParamId::Groups0007) || differs(ParamId::Groups0815),
            scenes,
        };
    }

    /// Reset state as reported by QUERY STATUS and QUERY RESET STATE
    pub(crate) fn in_reset_state(&self) -> bool {
        use crate::common::defs::status::RESET_MASK;
        self.reset_state.is_clear() && self.status.value() & RESET_MASK == 0
    }

    /// Enter the idle state after power up, enable or reset
    pub(crate) fn startup_condition(&mut self, host: &mut dyn GearHost) {
        self.state = MsgState::Idle;
        self.status.limit_error = false;
        self.flags.dapc_sequence_running = false;
        self.flags.repeat_timer_requested = false;
        self.physical_selection = PhysicalSelection::Disabled;
        self.search_address = SEARCH_ADDRESS_RESET;
        self.status.missing_short_address = self.short_address == MASK;
        self.actual_level = if self.flags.reset_requested {
            RESET_LEVEL
        } else if self.params.power_on_level == MASK {
            self.params.last_requested_level
        } else {
            self.params.power_on_level
        };
        self.requested_level = self.actual_level;
        self.stop_fade();
        self.refresh_reset_state(host);
        self.output_light_level(host);

        if host.bus_power_present() {
            host.start_receive();
            self.flags.test_bus_power_on = false;
        } else {
            warn!("No bus power at start up");
            self.flags.test_bus_power_on = true;
            self.bus_restore_count = 0;
        }
    }

    /// Turn the output off and stop listening
    pub(crate) fn set_off(&mut self, host: &mut dyn GearHost) {
        self.state = MsgState::Off;
        self.actual_level = 0;
        self.stop_fade();
        self.output_light_level(host);
        host.stop_receive();
        host.stop_timer(crate::gear::host::TimerSlot::Message);
    }
}
