use crate::common::address::{Address, Group, Short};
use crate::common::defs::{status, MASK};
use crate::config::GearConfig;
use crate::gear::cmd_defs::*;
use crate::gear::control::{MsgState, PhysicalSelection};
use crate::gear::host::TimerSlot;
use crate::gear::params::ParamId;
use crate::sim::gear_sim::GearSim;
use crate::sim::sim_host::SimHost;
use std::time::Duration;

const YES: Option<u8> = Some(0xff);
const BROADCAST: Address = Address::Broadcast;

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

fn short(a: u8) -> Short {
    Short::new(a).unwrap()
}

fn start(conf: &GearConfig, short_address: Option<u8>) -> GearSim {
    let mut host = SimHost::new(conf);
    if let Some(a) = short_address {
        host.set_value(ParamId::ShortAddress, a);
    }
    let mut sim = GearSim::with_host(conf, host);
    sim.enable();
    sim.advance(ms(5));
    sim
}

fn set_search_address(sim: &mut GearSim, addr: u32) {
    sim.send_command(SEARCHADDRH((addr >> 16) as u8));
    sim.send_command(SEARCHADDRM((addr >> 8) as u8));
    sim.send_command(SEARCHADDRL(addr as u8));
}

#[test]
fn arc_power_levels() {
    let mut conf = GearConfig::default();
    conf.defaults.min_level = 10;
    conf.defaults.power_on_level = 0;
    let mut sim = start(&conf, None);
    assert_eq!(sim.level(), 0);

    sim.send_command(DAPC(BROADCAST, 100));
    assert_eq!(sim.level(), 100);
    assert!(!sim.ctl.status.limit_error);

    sim.send_command(DAPC(BROADCAST, 5));
    assert_eq!(sim.ctl.requested_level, 10);
    assert_eq!(sim.level(), 10);
    assert_eq!(sim.send_command(QUERY_LIMIT_ERROR(BROADCAST)), YES);

    sim.send_command(DAPC(BROADCAST, 0));
    assert_eq!(sim.level(), 0);
    assert!(!sim.ctl.status.lamp_on);
    assert_eq!(sim.send_command(QUERY_LAMP_POWER_ON(BROADCAST)), None);
    assert_eq!(sim.host.value(ParamId::LastRequestedLevel), 0);
}

fn bus_fail_conf(failure_level: u8) -> GearConfig {
    let mut conf = GearConfig::default();
    conf.timing.bus_fail_timeout_ms = 30;
    conf.defaults.system_failure_level = failure_level;
    conf.defaults.min_level = 10;
    conf.defaults.max_level = 200;
    conf
}

#[test]
fn bus_failure_level() {
    let mut sim = start(&bus_fail_conf(50), None);
    assert_eq!(sim.level(), 200);
    sim.host.bus_power = false;
    sim.ctl.process_bus_fail(&mut sim.host);
    sim.ctl.process_bus_fail(&mut sim.host);
    assert_eq!(sim.level(), 200);
    sim.ctl.process_bus_fail(&mut sim.host);
    assert_eq!(sim.level(), 50);
}

#[test]
fn bus_failure_level_off() {
    let mut sim = start(&bus_fail_conf(0), None);
    sim.host.bus_power = false;
    for _ in 0..3 {
        sim.ctl.process_bus_fail(&mut sim.host);
    }
    assert_eq!(sim.level(), 0);
}

#[test]
fn bus_failure_clamp_and_debounce() {
    let mut sim = start(&bus_fail_conf(250), None);
    sim.send_command(DAPC(BROADCAST, 100));
    sim.host.bus_power = false;
    sim.ctl.process_bus_fail(&mut sim.host);
    sim.ctl.process_bus_fail(&mut sim.host);
    sim.host.bus_power = true;
    sim.ctl.process_bus_fail(&mut sim.host);
    assert_eq!(sim.ctl.bus_fail_count, 0);
    sim.host.bus_power = false;
    sim.ctl.process_bus_fail(&mut sim.host);
    sim.ctl.process_bus_fail(&mut sim.host);
    assert_eq!(sim.level(), 100);
    sim.ctl.process_bus_fail(&mut sim.host);
    assert_eq!(sim.level(), 200);

    // No change
    let mut sim = start(&bus_fail_conf(MASK), None);
    sim.send_command(DAPC(BROADCAST, 120));
    sim.host.bus_power = false;
    sim.advance(ms(50));
    assert_eq!(sim.ctl.bus_fail_count, 3);
    assert_eq!(sim.level(), 120);
}

#[test]
fn bus_power_restore() {
    let conf = GearConfig::default();
    let mut host = SimHost::new(&conf);
    host.bus_power = false;
    let mut sim = GearSim::with_host(&conf, host);
    sim.enable();
    assert!(sim.ctl.flags.test_bus_power_on);
    assert!(!sim.host.is_receiving());
    sim.advance(ms(100));
    assert!(!sim.send(DAPC(BROADCAST, 10).frame()));

    sim.host.bus_power = true;
    sim.ctl.process_bus_fail(&mut sim.host);
    assert!(!sim.host.is_receiving());
    sim.ctl.process_bus_fail(&mut sim.host);
    assert!(sim.host.is_receiving());
    assert!(!sim.ctl.flags.test_bus_power_on);

    sim.send_command(DAPC(BROADCAST, 10));
    assert_eq!(sim.level(), 10);
}

#[test]
fn repeat_required() {
    let s = short(5);
    let mut sim = start(&GearConfig::default(), Some(5));
    sim.send_command(DTR0(100));

    sim.send(SET_MAX_LEVEL(s).frame());
    assert!(sim.ctl.flags.repeat_timer_requested);
    sim.advance(ms(150));
    assert!(!sim.ctl.flags.repeat_timer_requested);
    assert_eq!(sim.ctl.params.max_level, 254);

    sim.send_command(SET_MAX_LEVEL(s));
    assert_eq!(sim.ctl.params.max_level, 100);
    assert_eq!(sim.host.value(ParamId::MaxLevel), 100);

    // A different frame restarts the window
    sim.send_command(DTR0(40));
    sim.send(SET_MAX_LEVEL(s).frame());
    sim.advance(ms(20));
    sim.send(SET_MIN_LEVEL(s).frame());
    sim.advance(ms(20));
    assert_eq!(sim.ctl.params.min_level, 1);
    sim.send(SET_MIN_LEVEL(s).frame());
    sim.advance(ms(20));
    assert_eq!(sim.ctl.params.min_level, 40);
    assert_eq!(sim.ctl.params.max_level, 100);

    // Anything else in between cancels it
    sim.send(SET_MAX_LEVEL(s).frame());
    sim.advance(ms(20));
    assert_eq!(sim.send_command(QUERY_CONTROL_GEAR_PRESENT(s)), None);
    assert!(!sim.ctl.flags.repeat_timer_requested);
    sim.send(SET_MAX_LEVEL(s).frame());
    sim.advance(ms(20));
    assert!(sim.ctl.flags.repeat_timer_requested);
    assert_eq!(sim.ctl.params.max_level, 100);
}

#[test]
fn repeated_query_answers_once_each() {
    let mut sim = start(&GearConfig::default(), Some(1));
    sim.send_command(QUERY_VERSION_NUMBER(short(1)));
    sim.send_command(QUERY_VERSION_NUMBER(short(1)));
    assert_eq!(sim.host.transmitted, vec![1, 1]);
}

#[test]
fn answer_timing() {
    let mut sim = start(&GearConfig::default(), None);
    sim.send(QUERY_CONTROL_GEAR_PRESENT(BROADCAST).frame());
    assert_eq!(sim.ctl.state, MsgState::WaitXmitDone);
    assert!(sim.host.timer_running(TimerSlot::Message));
    sim.advance(ms(3));
    assert!(sim.host.transmitted.is_empty());
    sim.advance(ms(2));
    assert_eq!(sim.host.transmitted, vec![0xff]);
    assert_eq!(sim.ctl.state, MsgState::Idle);
    assert!(sim.host.is_receiving());

    // Flag queries stay silent when the answer is no
    assert_eq!(sim.send_command(QUERY_LAMP_FAILURE(BROADCAST)), None);
    assert_eq!(sim.ctl.state, MsgState::Idle);
    sim.host.lamp_fault = true;
    sim.advance(ms(2));
    assert_eq!(sim.send_command(QUERY_LAMP_FAILURE(BROADCAST)), YES);
    assert_eq!(sim.send_command(QUERY_ACTUAL_LEVEL(BROADCAST)), Some(MASK));
    let st = sim.send_command(QUERY_STATUS(BROADCAST)).unwrap();
    assert_ne!(st & status::LAMP_FAILURE, 0);
}

#[test]
fn power_failure_flag() {
    let mut sim = start(&GearConfig::default(), None);
    assert_eq!(sim.send_command(QUERY_POWER_FAILURE(BROADCAST)), YES);
    sim.send_command(QUERY_STATUS(BROADCAST));
    assert_eq!(sim.send_command(QUERY_POWER_FAILURE(BROADCAST)), YES);
    sim.send_command(RECALL_MAX_LEVEL(BROADCAST));
    assert_eq!(sim.send_command(QUERY_POWER_FAILURE(BROADCAST)), None);
}

#[test]
fn fade_time_ramp() {
    let mut sim = start(&GearConfig::default(), None);
    sim.send_command(DTR0(1));
    sim.send_command(SET_FADE_TIME(BROADCAST));
    assert_eq!(sim.ctl.params.fade_time, 1);

    sim.send_command(DAPC(BROADCAST, 100));
    sim.advance(ms(100));
    let level = sim.level();
    assert!(level > 100 && level < 254);
    let st = sim.send_command(QUERY_STATUS(BROADCAST)).unwrap();
    assert_ne!(st & status::FADE_RUNNING, 0);

    sim.advance(ms(1000));
    assert_eq!(sim.level(), 100);
    assert!(!sim.ctl.status.fade_running);
    assert_eq!(sim.host.value(ParamId::LastRequestedLevel), 100);

    // Direct level commands cut a fade short
    sim.send(DAPC(BROADCAST, 200).frame());
    sim.advance(ms(50));
    sim.send_command(RECALL_MIN_LEVEL(BROADCAST));
    assert_eq!(sim.level(), 1);
    sim.advance(ms(1000));
    assert_eq!(sim.level(), 1);
}

#[test]
fn up_and_down_at_fade_rate() {
    let mut sim = start(&GearConfig::default(), None);
    sim.send_command(DAPC(BROADCAST, 100));
    sim.send_command(UP(BROADCAST));
    sim.advance(ms(300));
    assert_eq!(sim.level(), 108);

    sim.send_command(DOWN(BROADCAST));
    sim.advance(ms(300));
    assert_eq!(sim.level(), 100);

    // Lamp off, nothing to dim
    sim.send_command(OFF(BROADCAST));
    sim.send_command(UP(BROADCAST));
    sim.advance(ms(300));
    assert_eq!(sim.level(), 0);

    sim.send_command(ON_AND_STEP_UP(BROADCAST));
    assert_eq!(sim.level(), 1);
    sim.send_command(STEP_UP(BROADCAST));
    assert_eq!(sim.level(), 2);
    sim.send_command(STEP_DOWN_AND_OFF(BROADCAST));
    sim.send_command(STEP_DOWN_AND_OFF(BROADCAST));
    assert_eq!(sim.level(), 0);
}

#[test]
fn dapc_sequence() {
    let mut sim = start(&GearConfig::default(), None);
    sim.send_command(ENABLE_DAPC_SEQUENCE(BROADCAST));
    assert!(sim.ctl.flags.dapc_sequence_running);
    assert!(sim.host.timer_running(TimerSlot::Message));
    assert_eq!(sim.ctl.params.fade_time, 1);

    sim.send_command(DAPC(BROADCAST, 150));
    assert!(sim.ctl.flags.dapc_sequence_running);
    sim.advance(ms(250));
    assert!(!sim.ctl.flags.dapc_sequence_running);
    assert_eq!(sim.ctl.params.fade_time, 0);

    // A command in between ends the sequence
    sim.send_command(ENABLE_DAPC_SEQUENCE(BROADCAST));
    sim.send_command(QUERY_STATUS(BROADCAST));
    assert!(!sim.ctl.flags.dapc_sequence_running);
    assert_eq!(sim.ctl.params.fade_time, 0);
}

#[test]
fn scenes_and_groups() {
    let s = short(3);
    let mut sim = start(&GearConfig::default(), Some(3));
    sim.send_command(ADD_TO_GROUP(s, 3));
    assert_eq!(sim.send_command(QUERY_GROUPS_0_7(s)), Some(0x08));
    assert_eq!(sim.host.value(ParamId::Groups0007), 0x08);

    sim.send_command(DAPC(Group::new(3).unwrap(), 50));
    assert_eq!(sim.level(), 50);
    sim.send_command(DAPC(Group::new(4).unwrap(), 10));
    assert_eq!(sim.level(), 50);
    sim.send_command(DAPC(short(4), 10));
    assert_eq!(sim.level(), 50);

    sim.send_command(DTR0(77));
    sim.send_command(SET_SCENE(Group::new(3).unwrap(), 2));
    assert_eq!(sim.send_command(QUERY_SCENE_LEVEL(s, 2)), Some(77));
    sim.send_command(GOTO_SCENE(BROADCAST, 2));
    assert_eq!(sim.level(), 77);

    // Unset scene leaves the level alone
    sim.send_command(GOTO_SCENE(BROADCAST, 5));
    assert_eq!(sim.level(), 77);
    sim.send_command(REMOVE_FROM_SCENE(s, 2));
    assert_eq!(sim.send_command(QUERY_SCENE_LEVEL(s, 2)), Some(MASK));

    sim.send_command(REMOVE_FROM_GROUP(s, 3));
    sim.send_command(DAPC(Group::new(3).unwrap(), 20));
    assert_eq!(sim.level(), 77);
}

#[test]
fn reset_to_defaults() {
    let s = short(5);
    let mut sim = start(&GearConfig::default(), Some(5));
    sim.send_command(DTR0(100));
    sim.send_command(SET_MAX_LEVEL(s));
    sim.send_command(ADD_TO_GROUP(s, 2));
    sim.send_command(DAPC(s, 80));
    assert_eq!(sim.send_command(QUERY_RESET_STATE(s)), None);

    sim.send_command(RESET(s));
    assert_eq!(sim.ctl.params.max_level, 254);
    assert_eq!(sim.ctl.params.groups, 0);
    assert_eq!(sim.host.value(ParamId::MaxLevel), 254);
    assert_eq!(sim.ctl.short_address, 5);
    assert_eq!(sim.level(), 254);
    assert_eq!(sim.send_command(QUERY_RESET_STATE(s)), YES);
    let st = sim.send_command(QUERY_STATUS(s)).unwrap();
    assert_ne!(st & status::RESET_STATE, 0);
}

#[test]
fn device_type_commands() {
    let s = short(2);
    let mut sim = start(&GearConfig::default(), Some(2));
    assert_eq!(sim.send_command(QUERY_EXTENDED_VERSION_NUMBER(s)), None);

    sim.send_command(ENABLE_DEVICE_TYPE(6));
    assert_eq!(sim.send_command(QUERY_EXTENDED_VERSION_NUMBER(s)), Some(1));
    // Only the next command
    assert_eq!(sim.send_command(QUERY_EXTENDED_VERSION_NUMBER(s)), None);

    sim.send_command(ENABLE_DEVICE_TYPE(8));
    assert_eq!(sim.send_command(QUERY_EXTENDED_VERSION_NUMBER(s)), None);

    sim.send_command(DAPC(s, 127));
    sim.advance(ms(2));
    let log_level = sim.host.led_level();
    sim.send_command(DTR0(1));
    sim.send_command(ENABLE_DEVICE_TYPE(6));
    sim.send_command(SELECT_DIMMING_CURVE(s));
    sim.advance(ms(2));
    assert_eq!(sim.host.led_level(), 500);
    assert!(log_level < 500);
    sim.send_command(ENABLE_DEVICE_TYPE(6));
    assert_eq!(sim.send_command(QUERY_DIMMING_CURVE(s)), Some(1));

    sim.send_command(ENABLE_DEVICE_TYPE(6));
    assert_eq!(sim.send_command(QUERY_CURRENT_PROTECTOR_ENABLED(s)), YES);
    sim.send_command(ENABLE_DEVICE_TYPE(6));
    sim.send_command(DISABLE_CURRENT_PROTECTOR(s));
    assert!(!sim.ctl.current_protector_enabled);

    sim.send_command(DTR0(10));
    sim.send_command(ENABLE_DEVICE_TYPE(6));
    sim.send_command(STORE_DTR_AS_FAST_FADE_TIME(s));
    sim.send_command(ENABLE_DEVICE_TYPE(6));
    assert_eq!(sim.send_command(QUERY_FAST_FADE_TIME(s)), Some(10));
}

#[test]
fn memory_banks() {
    let s = short(9);
    let mut conf = GearConfig::default();
    conf.memory_banks = vec![vec![0x04, 0x00, 0x00, 0x00, 0x00]];
    let mut sim = start(&conf, Some(9));

    sim.send_command(DTR1(0));
    sim.send_command(DTR0(0));
    assert_eq!(sim.send_command(READ_MEMORY_LOCATION(s)), Some(0x1a));
    assert_eq!(sim.send_command(READ_MEMORY_LOCATION(s)), Some(0x00));
    assert_eq!(sim.send_command(READ_MEMORY_LOCATION(s)), Some(1));
    assert_eq!(sim.ctl.dtr0, 3);
    sim.send_command(DTR0(0x1b));
    assert_eq!(sim.send_command(READ_MEMORY_LOCATION(s)), None);
    assert_eq!(sim.ctl.dtr0, 0x1b);

    sim.send_command(DTR1(1));
    sim.send_command(DTR0(2));
    assert_eq!(sim.send_command(WRITE_MEMORY_LOCATION(0x55)), None);
    sim.send_command(ENABLE_WRITE_MEMORY(s));
    assert_eq!(sim.send_command(WRITE_MEMORY_LOCATION(0x55)), Some(0x55));
    assert_eq!(sim.send_command(WRITE_MEMORY_LOCATION(0x42)), Some(0x42));
    assert_eq!(sim.host.read_memory_bank(1, 3), Some(0x42));
    assert_eq!(sim.send_command(QUERY_CONTENT_DTR0(s)), Some(4));

    // Any addressed command disables writing
    assert_eq!(sim.send_command(WRITE_MEMORY_LOCATION(0x43)), None);
    assert_eq!(sim.host.read_memory_bank(1, 4), Some(0));

    sim.send_command(ENABLE_WRITE_MEMORY(s));
    assert_eq!(sim.send_command(WRITE_MEMORY_LOCATION_NO_REPLY(0x44)), None);
    assert_eq!(sim.host.read_memory_bank(1, 4), Some(0x44));
}

#[test]
fn initialisation_window() {
    let mut conf = GearConfig::default();
    conf.timing.init_window_s = 2;
    let mut sim = start(&conf, None);
    assert_eq!(sim.send_command(COMPARE()), None);

    sim.send_command(INITIALISE_ALL());
    assert!(sim.ctl.flags.init_window_running);
    sim.send_command(RANDOMISE());
    let random = sim.ctl.params.random_address;
    assert_ne!(random, 0xffffff);
    assert_eq!(sim.host.value(ParamId::RandomAddressL), random as u8);
    assert_eq!(sim.send_command(COMPARE()), YES);

    sim.advance(ms(2100));
    assert!(!sim.ctl.flags.init_window_running);
    assert_eq!(sim.send_command(COMPARE()), None);
    sim.send_command(RANDOMISE());
    assert_eq!(sim.ctl.params.random_address, random);
}

#[test]
fn address_assignment() {
    let mut sim = start(&GearConfig::default(), None);
    assert_eq!(sim.send_command(QUERY_MISSING_SHORT_ADDRESS(BROADCAST)), YES);
    sim.send_command(TERMINATE());
    sim.send_command(INITIALISE_NO_ADDR());
    sim.send_command(RANDOMISE());

    let (mut low, mut high) = (0u32, 0xffffff);
    while low < high {
        let mid = (low + high) / 2;
        set_search_address(&mut sim, mid);
        if sim.send_command(COMPARE()).is_some() {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    assert_eq!(low, sim.ctl.params.random_address);

    set_search_address(&mut sim, low);
    sim.send_command(PROGRAM_SHORT_ADDRESS(short(7)));
    assert_eq!(sim.send_command(VERIFY_SHORT_ADDRESS(short(7))), YES);
    assert_eq!(sim.send_command(VERIFY_SHORT_ADDRESS(short(6))), None);
    assert_eq!(sim.send_command(QUERY_SHORT_ADDRESS()), Some(0x0f));
    assert_eq!(sim.host.value(ParamId::ShortAddress), 7);

    sim.send_command(WITHDRAW());
    assert_eq!(sim.send_command(COMPARE()), None);
    sim.send_command(TERMINATE());
    assert!(!sim.ctl.flags.init_window_running);

    sim.send_command(DAPC(short(7), 30));
    assert_eq!(sim.level(), 30);
    assert_eq!(sim.send_command(QUERY_MISSING_SHORT_ADDRESS(short(7))), None);
}

#[test]
fn physical_selection_follows_lamp() {
    let mut sim = start(&GearConfig::default(), None);
    sim.send_command(INITIALISE_ALL());
    sim.send_command(RANDOMISE());
    set_search_address(&mut sim, 0);
    sim.send_command(PHYSICAL_SELECTION());
    assert_eq!(sim.ctl.physical_selection, PhysicalSelection::Requested);
    assert_eq!(sim.send_command(QUERY_SHORT_ADDRESS()), None);

    sim.host.lamp_fault = true;
    sim.advance(ms(2));
    sim.send_command(QUERY_SHORT_ADDRESS());
    assert_eq!(sim.ctl.physical_selection, PhysicalSelection::Enabled);
    assert_eq!(sim.send_command(QUERY_SHORT_ADDRESS()), Some(MASK));

    sim.host.lamp_fault = false;
    sim.advance(ms(2));
    sim.send_command(DTR0(0));
    assert_eq!(sim.ctl.physical_selection, PhysicalSelection::Requested);

    sim.send_command(TERMINATE());
    assert_eq!(sim.ctl.physical_selection, PhysicalSelection::Disabled);
}

#[test]
fn disable_and_enable() {
    let mut sim = start(&GearConfig::default(), None);
    sim.send_command(DTR0(MASK));
    sim.send_command(SET_POWER_ON_LEVEL(BROADCAST));
    sim.send_command(DAPC(BROADCAST, 77));

    sim.disable();
    assert_eq!(sim.ctl.state, MsgState::Off);
    assert_eq!(sim.host.led_level(), 0);
    assert!(!sim.send(DAPC(BROADCAST, 10).frame()));
    sim.advance(ms(100));
    assert_eq!(sim.level(), 0);

    sim.enable();
    sim.advance(ms(2));
    assert_eq!(sim.level(), 77);
    assert!(sim.ctl.status.power_failure);
    assert!(sim.host.is_receiving());
}

#[test]
fn forced_messages() {
    let mut sim = start(&GearConfig::default(), None);
    assert!(sim.force(0xfe, 120));
    assert_eq!(sim.level(), 120);
    assert!(!sim.ctl.flags.forced_message);

    // Repeat requirement is waived
    sim.send_command(DTR0(90));
    assert!(sim.force(0xff, 0x2a));
    assert_eq!(sim.ctl.params.max_level, 90);
    assert_eq!(sim.level(), 90);

    sim.send(QUERY_STATUS(BROADCAST).frame());
    assert!(!sim.force(0xfe, 10));
    sim.advance(ms(20));
    assert_eq!(sim.level(), 90);
}

#[test]
fn level_invariant_holds() {
    let mut conf = GearConfig::default();
    conf.defaults.min_level = 20;
    conf.defaults.max_level = 180;
    conf.defaults.fade_time = 2;
    let mut sim = start(&conf, None);
    let frames = [
        [0xfe, 5],
        [0xfe, 250],
        [0xff, 0x01],
        [0xff, 0x07],
        [0xfe, 0],
        [0xff, 0x08],
        [0xff, 0x02],
        [0xfe, 100],
        [0xff, 0x03],
        [0xfe, 21],
    ];
    for frame in frames.iter().cycle().take(40) {
        sim.send(*frame);
        for _ in 0..30 {
            sim.advance(ms(5));
            let ctl = &sim.ctl;
            if ctl.status.lamp_on {
                assert!(ctl.actual_level >= 20 && ctl.actual_level <= 180);
            }
            if ctl.fade_period != 0 {
                assert!(ctl.fade_counter < ctl.fade_increment);
            }
        }
    }
}

#[test]
fn advance_by_fraction_of_microsecond() {
    let mut sim = start(&GearConfig::default(), None);
    assert_eq!(sim.host.now(), ms(5));
    sim.advance(Duration::from_nanos(1_500));
    assert_eq!(sim.host.now(), Duration::from_micros(5_001));
    for _ in 0..100 {
        sim.advance(Duration::from_nanos(999));
    }
    assert_eq!(sim.host.now(), Duration::from_micros(5_001));
    sim.advance(Duration::from_micros(1_999));
    assert_eq!(sim.host.now(), ms(7));
    assert_eq!(sim.level(), 254);
}

#[test]
fn faded_level_survives_power_cycle() {
    let mut conf = GearConfig::default();
    conf.defaults.power_on_level = MASK;
    let mut sim = start(&conf, None);
    sim.send_command(DAPC(BROADCAST, 100));
    assert_eq!(sim.host.value(ParamId::LastRequestedLevel), 100);

    sim.send_command(UP(BROADCAST));
    sim.advance(ms(300));
    assert_eq!(sim.level(), 108);
    // Not for this gear, still stores the level
    assert_eq!(sim.send_command(QUERY_STATUS(short(5))), None);
    assert_eq!(sim.host.value(ParamId::LastRequestedLevel), 108);

    sim.disable();
    sim.enable();
    sim.advance(ms(2));
    assert_eq!(sim.level(), 108);
}

#[test]
fn new_max_level_ends_fade() {
    let mut conf = GearConfig::default();
    conf.defaults.power_on_level = 50;
    conf.defaults.fade_time = 4;
    let mut sim = start(&conf, None);
    assert_eq!(sim.level(), 50);
    sim.send_command(DAPC(BROADCAST, 250));
    sim.advance(ms(200));
    assert!(sim.ctl.status.fade_running);

    sim.send_command(DTR0(100));
    sim.send_command(SET_MAX_LEVEL(BROADCAST));
    assert_eq!(sim.ctl.requested_level, 100);
    sim.advance(ms(5000));
    assert_eq!(sim.level(), 100);
    assert!(!sim.ctl.status.fade_running);
    let st = sim.send_command(QUERY_STATUS(BROADCAST));
    assert_eq!(st.map(|s| s & status::FADE_RUNNING), Some(0));
}

#[test]
fn new_min_level_ends_fade() {
    let mut conf = GearConfig::default();
    conf.defaults.power_on_level = 200;
    conf.defaults.fade_time = 4;
    let mut sim = start(&conf, None);
    sim.send_command(DAPC(BROADCAST, 20));
    sim.advance(ms(200));
    assert!(sim.ctl.status.fade_running);

    sim.send_command(DTR0(150));
    sim.send_command(SET_MIN_LEVEL(BROADCAST));
    assert_eq!(sim.ctl.requested_level, 150);
    sim.advance(ms(5000));
    assert_eq!(sim.level(), 150);
    assert!(!sim.ctl.status.fade_running);
}

#[test]
fn force_needs_enable() {
    let conf = GearConfig::default();
    let mut sim = GearSim::new(&conf);
    assert_eq!(sim.ctl.state, MsgState::Off);
    assert!(!sim.force(0xfe, 120));
    assert_eq!(sim.level(), 0);

    sim.enable();
    assert!(sim.force(0xfe, 120));
    assert_eq!(sim.level(), 120);
}
