//! Handlers of the indirect commands and queries sent to an address.

use crate::common::address::Short;
use crate::common::defs::{
    failure, FAST_FADE_TIME_MAX, MASK, MAX_LEVEL, OPMODE_LINEAR_CURVE, UP_DOWN_FADE_TICKS,
    VERSION_NUMBER, YES,
};
use crate::gear::control::{FadeDir, GearCtl};
use crate::gear::host::GearHost;
use crate::gear::params::ParamId;
use log::debug;

fn opcode(ctl: &GearCtl) -> u8 {
    ctl.cur_message[1]
}

fn lamp_is_on(ctl: &GearCtl) -> bool {
    ctl.actual_level != 0
}

pub(crate) fn arc_power(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.requested_level = ctl.cur_message[1];
    ctl.status.power_failure = false;
    ctl.flags.output_change_requested = true;
}

pub(crate) fn off(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.stop_fade();
    ctl.actual_level = 0;
    ctl.status.limit_error = false;
}

pub(crate) fn up(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    let p = &ctl.params;
    if p.fade_rate != 0
        && lamp_is_on(ctl)
        && ctl.actual_level >= p.min_level
        && ctl.actual_level < p.max_level
    {
        ctl.start_rate_fade(FadeDir::Up, UP_DOWN_FADE_TICKS);
    } else {
        ctl.stop_fade();
    }
}

pub(crate) fn down(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    let p = &ctl.params;
    if p.fade_rate != 0 && lamp_is_on(ctl) && ctl.actual_level > p.min_level {
        ctl.start_rate_fade(FadeDir::Down, UP_DOWN_FADE_TICKS);
    } else {
        ctl.stop_fade();
    }
}

pub(crate) fn step_up(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    if lamp_is_on(ctl)
        && ctl.actual_level >= ctl.params.min_level
        && ctl.actual_level < ctl.params.max_level
    {
        ctl.stop_fade();
        ctl.actual_level += 1;
    }
}

pub(crate) fn step_down(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    if lamp_is_on(ctl) && ctl.actual_level > ctl.params.min_level {
        ctl.stop_fade();
        ctl.actual_level -= 1;
    }
}

pub(crate) fn recall_max_level(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.stop_fade();
    ctl.actual_level = ctl.params.max_level;
    ctl.status.limit_error = false;
}

pub(crate) fn recall_min_level(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.stop_fade();
    ctl.actual_level = ctl.params.min_level;
    ctl.status.limit_error = false;
}

pub(crate) fn step_down_and_off(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    if lamp_is_on(ctl) {
        ctl.stop_fade();
        if ctl.actual_level > ctl.params.min_level {
            ctl.actual_level -= 1;
        } else {
            ctl.actual_level = 0;
        }
    }
}

pub(crate) fn on_and_step_up(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.stop_fade();
    if !lamp_is_on(ctl) {
        ctl.actual_level = ctl.params.min_level;
    } else if ctl.actual_level < ctl.params.max_level {
        ctl.actual_level += 1;
    }
}

pub(crate) fn enable_dapc_sequence(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    if !ctl.flags.dapc_sequence_running {
        ctl.saved_fade_time = ctl.params.fade_time;
        ctl.params.fade_time = 1;
    }
    ctl.flags.dapc_sequence_running = true;
}

pub(crate) fn go_to_scene(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.requested_level = ctl.params.scenes[(opcode(ctl) & 0x0f) as usize];
    ctl.flags.output_change_requested = true;
}

pub(crate) fn reset(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.flags.reset_requested = true;
}

pub(crate) fn store_actual_level_in_dtr(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.dtr0 = ctl.actual_level;
}

pub(crate) fn store_dtr_as_max_level(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    let mut max = ctl.dtr0.min(MAX_LEVEL);
    if max <= ctl.params.min_level {
        max = ctl.params.min_level;
    }
    ctl.params.max_level = max;
    if ctl.actual_level > max {
        ctl.actual_level = max;
    }
    ctl.clamp_fade_target();
    ctl.store_param(host, ParamId::MaxLevel);
    ctl.refresh_reset_state(host);
}

pub(crate) fn store_dtr_as_min_level(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    let mut min = ctl.dtr0;
    if min >= ctl.params.max_level {
        min = ctl.params.max_level;
    }
    if min < ctl.params.physical_min_level {
        min = ctl.params.physical_min_level;
    }
    ctl.params.min_level = min;
    if lamp_is_on(ctl) && ctl.actual_level < min {
        ctl.actual_level = min;
    }
    ctl.clamp_fade_target();
    ctl.store_param(host, ParamId::MinLevel);
    ctl.refresh_reset_state(host);
}

pub(crate) fn store_dtr_as_system_failure_level(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    ctl.params.system_failure_level = ctl.dtr0;
    ctl.store_param(host, ParamId::SystemFailureLevel);
    ctl.refresh_reset_state(host);
}

pub(crate) fn store_dtr_as_power_on_level(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    ctl.params.power_on_level = ctl.dtr0;
    ctl.store_param(host, ParamId::PowerOnLevel);
    ctl.refresh_reset_state(host);
}

pub(crate) fn store_dtr_as_fade_time(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    ctl.params.fade_time = ctl.dtr0.min(15);
    ctl.store_param(host, ParamId::FadeTime);
    ctl.refresh_reset_state(host);
}

pub(crate) fn store_dtr_as_fade_rate(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    ctl.params.fade_rate = ctl.dtr0.clamp(1, 15);
    ctl.store_param(host, ParamId::FadeRate);
    ctl.refresh_reset_state(host);
}

pub(crate) fn store_dtr_as_scene(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    let scene = opcode(ctl) & 0x0f;
    ctl.params.scenes[scene as usize] = ctl.dtr0;
    ctl.store_param(host, ParamId::Scene(scene));
    ctl.refresh_reset_state(host);
}

pub(crate) fn remove_from_scene(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    let scene = opcode(ctl) & 0x0f;
    ctl.params.scenes[scene as usize] = MASK;
    ctl.store_param(host, ParamId::Scene(scene));
    ctl.refresh_reset_state(host);
}

pub(crate) fn add_to_group(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    let bit = 1u16 << (opcode(ctl) & 0x0f);
    ctl.params.groups |= bit;
    ctl.store_param(host, ParamId::Groups0007);
    ctl.store_param(host, ParamId::Groups0815);
    ctl.refresh_reset_state(host);
}

pub(crate) fn remove_from_group(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    let bit = 1u16 << (opcode(ctl) & 0x0f);
    ctl.params.groups &= !bit;
    ctl.store_param(host, ParamId::Groups0007);
    ctl.store_param(host, ParamId::Groups0815);
    ctl.refresh_reset_state(host);
}

pub(crate) fn store_dtr_as_short_address(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    match Short::from_program_byte(ctl.dtr0) {
        Ok(Some(short)) => ctl.store_short_address(host, short.value()),
        Ok(None) => ctl.store_short_address(host, MASK),
        Err(e) => debug!("DTR0 {:02x}: {}", ctl.dtr0, e),
    }
}

pub(crate) fn enable_write_memory(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.flags.write_memory_enabled = true;
}

pub(crate) fn query_status(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.status.reset_state = ctl.in_reset_state();
    ctl.answer(ctl.status.value());
}

pub(crate) fn query_control_gear_present(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(YES);
}

pub(crate) fn query_lamp_failure(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer_flag(ctl.status.lamp_failure);
}

pub(crate) fn query_lamp_power_on(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer_flag(ctl.status.lamp_on);
}

pub(crate) fn query_limit_error(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer_flag(ctl.status.limit_error);
}

pub(crate) fn query_reset_state(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.status.reset_state = ctl.in_reset_state();
    ctl.answer_flag(ctl.status.reset_state);
}

pub(crate) fn query_missing_short_address(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer_flag(ctl.status.missing_short_address);
}

pub(crate) fn query_version_number(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(VERSION_NUMBER);
}

pub(crate) fn query_content_dtr0(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.dtr0);
}

pub(crate) fn query_device_type(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.device_type);
}

pub(crate) fn query_physical_minimum(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.physical_min_level);
}

pub(crate) fn query_power_failure(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer_flag(ctl.status.power_failure);
}

pub(crate) fn query_content_dtr1(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.dtr1);
}

pub(crate) fn query_content_dtr2(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.dtr2);
}

pub(crate) fn query_actual_level(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    let level = if ctl.status.lamp_failure { MASK } else { ctl.actual_level };
    ctl.answer(level);
}

pub(crate) fn query_max_level(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.max_level);
}

pub(crate) fn query_min_level(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.min_level);
}

pub(crate) fn query_power_on_level(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.power_on_level);
}

pub(crate) fn query_system_failure_level(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.system_failure_level);
}

pub(crate) fn query_fade(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer((ctl.params.fade_time << 4) | (ctl.params.fade_rate & 0x0f));
}

pub(crate) fn query_scene_level(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.scenes[(opcode(ctl) & 0x0f) as usize]);
}

pub(crate) fn query_groups_0_7(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.groups as u8);
}

pub(crate) fn query_groups_8_15(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer((ctl.params.groups >> 8) as u8);
}

pub(crate) fn query_random_address_h(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer((ctl.params.random_address >> 16) as u8);
}

pub(crate) fn query_random_address_m(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer((ctl.params.random_address >> 8) as u8);
}

pub(crate) fn query_random_address_l(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.random_address as u8);
}

pub(crate) fn read_memory_location(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    ctl.flags.response_requested = false;
    if let Some(value) = host.read_memory(ctl.dtr1, ctl.dtr0) {
        ctl.response = value;
        ctl.flags.response_requested = true;
        ctl.dtr0 = ctl.dtr0.saturating_add(1);
    }
}

// LED gear

pub(crate) fn reference_system_power(_ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    debug!("Reference measurement not supported");
}

pub(crate) fn enable_current_protector(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.current_protector_enabled = true;
}

pub(crate) fn disable_current_protector(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.current_protector_enabled = false;
}

pub(crate) fn select_dimming_curve(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    match ctl.dtr0 {
        0 => ctl.params.operating_mode &= !OPMODE_LINEAR_CURVE,
        1 => ctl.params.operating_mode |= OPMODE_LINEAR_CURVE,
        _ => return,
    }
    ctl.store_param(host, ParamId::OperatingMode);
    ctl.output_light_level(host);
}

pub(crate) fn store_dtr_as_fast_fade_time(ctl: &mut GearCtl, host: &mut dyn GearHost) {
    let min = ctl.params.min_fast_fade_time;
    ctl.params.fast_fade_time = match ctl.dtr0 {
        0 => 0,
        t if t < min => min,
        t => t.min(FAST_FADE_TIME_MAX),
    };
    ctl.store_param(host, ParamId::FastFadeTime);
}

pub(crate) fn query_gear_type(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.gear_type);
}

pub(crate) fn query_dimming_curve(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    let linear = ctl.params.operating_mode & OPMODE_LINEAR_CURVE != 0;
    ctl.answer(u8::from(linear));
}

pub(crate) fn query_possible_operating_modes(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.possible_operating_modes);
}

pub(crate) fn query_features(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.features);
}

pub(crate) fn query_failure_status(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.failure_status);
}

fn answer_failure(ctl: &mut GearCtl, bit: u8) {
    ctl.answer_flag(ctl.params.failure_status & bit != 0);
}

pub(crate) fn query_short_circuit(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    answer_failure(ctl, failure::SHORT_CIRCUIT);
}

pub(crate) fn query_open_circuit(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    answer_failure(ctl, failure::OPEN_CIRCUIT);
}

pub(crate) fn query_load_decrease(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    answer_failure(ctl, failure::LOAD_DECREASE);
}

pub(crate) fn query_load_increase(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    answer_failure(ctl, failure::LOAD_INCREASE);
}

pub(crate) fn query_current_protector_active(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    answer_failure(ctl, failure::CURRENT_PROTECTOR_ACTIVE);
}

pub(crate) fn query_thermal_shutdown(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    answer_failure(ctl, failure::THERMAL_SHUTDOWN);
}

pub(crate) fn query_thermal_overload(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    answer_failure(ctl, failure::THERMAL_OVERLOAD);
}

pub(crate) fn query_reference_running(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer_flag(false);
}

pub(crate) fn query_reference_measurement_failed(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    answer_failure(ctl, failure::REFERENCE_MEASUREMENT_FAILED);
}

pub(crate) fn query_current_protector_enabled(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer_flag(ctl.current_protector_enabled);
}

pub(crate) fn query_operating_mode(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.operating_mode);
}

pub(crate) fn query_fast_fade_time(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.fast_fade_time);
}

pub(crate) fn query_min_fast_fade_time(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.min_fast_fade_time);
}

pub(crate) fn query_extended_version_number(ctl: &mut GearCtl, _host: &mut dyn GearHost) {
    ctl.answer(ctl.params.extended_version);
}
