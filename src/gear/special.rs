//! Handlers of the special and extended commands, mostly addressing.

use crate::common::address::Short;
use crate::common::defs::{MASK, YES};
use crate::gear::control::{GearCtl, PhysicalSelection};
use crate::gear::host::{GearHost, TimerSlot};
use crate::gear::params::ParamId;
use log::debug;

fn data(ctl: &GearCtl) -> u8 {
    ctl.cur_message[1]
}

fn selected(ctl: &GearCtl) -> bool {
    ctl.params.random_address == ctl.search_address
        || ctl.physical_selection == PhysicalSelection::Enabled
}

pub(crate) fn terminate(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    host.stop_timer(TimerSlot::InitWindow);
    ctl.flags.init_window_running = false;
    ctl.flags.compare_enabled = false;
    ctl.physical_selection = PhysicalSelection::Disabled;
}

pub(crate) fn set_dtr0(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.dtr0 = data(ctl);
}

pub(crate) fn initialise(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    let data = data(ctl);
    let addressed = match data {
        0x00 => true,
        MASK => ctl.short_address == MASK,
        d => ctl.short_address != MASK && d == (ctl.short_address << 1) | 1,
    };
    if addressed {
        debug!("Initialisation window opened");
        host.start_timer(TimerSlot::InitWindow, ctl.timing.init_window());
        ctl.flags.compare_enabled = true;
        ctl.flags.init_window_running = true;
    }
}

pub(crate) fn randomise(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    ctl.params.random_address = host.generate_random() & 0xffffff;
    debug!("Random address {:06x}", ctl.params.random_address);
    for id in [
        ParamId::RandomAddressH,
        ParamId::RandomAddressM,
        ParamId::RandomAddressL,
    ] {
        ctl.store_param(host, id);
    }
    ctl.refresh_reset_state(host);
}

pub(crate) fn compare(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    let hit = ctl.flags.compare_enabled && ctl.params.random_address <= ctl.search_address;
    ctl.answer_flag(hit);
}

pub(crate) fn withdraw(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    if ctl.params.random_address == ctl.search_address {
        ctl.flags.compare_enabled = false;
    }
}

fn set_search_byte(ctl: &mut GearCtl, host: &mut dyn GearHost, shift: u32) {
    let mask = 0xffu32 << shift;
    ctl.search_address = (ctl.search_address & !mask) | (u32::from(data(ctl)) << shift);
    ctl.refresh_reset_state(host);
}

pub(crate) fn search_address_h(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    set_search_byte(ctl, host, 16);
}

pub(crate) fn search_address_m(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    set_search_byte(ctl, host, 8);
}

pub(crate) fn search_address_l(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    set_search_byte(ctl, host, 0);
}

pub(crate) fn program_short_address(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    if !selected(ctl) {
        return;
    }
    match Short::from_program_byte(data(ctl)) {
        Ok(short) => {
            let short = short.map_or(MASK, |s| s.value());
            debug!("Programmed short address {:02x}", short);
            ctl.store_short_address(host, short);
        }
        Err(e) => debug!("PROGRAM SHORT ADDRESS {:02x}: {}", data(ctl), e),
    }
}

pub(crate) fn verify_short_address(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    let hit = ctl.short_address != MASK && data(ctl) == (ctl.short_address << 1) | 1;
    ctl.answer_flag(hit);
}

pub(crate) fn query_short_address(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    if selected(ctl) {
        ctl.response = if ctl.short_address == MASK {
            MASK
        } else {
            (ctl.short_address << 1) | 1
        };
        ctl.flags.response_requested = true;
    } else {
        ctl.flags.response_requested = false;
    }
}

pub(crate) fn physical_selection(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    if ctl.physical_selection == PhysicalSelection::Disabled {
        ctl.physical_selection = PhysicalSelection::Requested;
        ctl.flags.compare_enabled = false;
    } else {
        ctl.physical_selection = PhysicalSelection::Disabled;
        ctl.flags.compare_enabled = true;
    }
}

pub(crate) fn enable_device_type(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.flags.app_ext_requested = data(ctl) == ctl.params.device_type;
}

pub(crate) fn set_dtr1(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.dtr1 = data(ctl);
}

pub(crate) fn set_dtr2(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.dtr2 = data(ctl);
}

fn write_memory(ctl: &mut GearCtl, host: &mut dyn GearHost) -> bool {
    if !ctl.flags.write_memory_enabled {
        return false;
    }
    let value = data(ctl);
    let written = host.write_memory(ctl.dtr1, ctl.dtr0, value);
    if !written {
        debug!("Memory bank {} location {} not writable", ctl.dtr1, ctl.dtr0);
    }
    ctl.dtr0 = ctl.dtr0.saturating_add(1);
    written
}

pub(crate) fn write_memory_location(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    let value = data(ctl);
    if write_memory(ctl, host) {
        ctl.response = value;
        ctl.flags.response_requested = true;
    }
}

pub(crate) fn write_memory_location_no_reply(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    write_memory(ctl, host);
}
