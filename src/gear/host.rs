//! Services the gear logic needs from the firmware around it.
//!
//! Every call is non-blocking. Completion of a receive or transmit is
//! reported later as a [`GearEvent`] through
//! [`GearCtl::process_event`](super::control::GearCtl::process_event).

use crate::gear::params::ParamId;
use std::time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GearEvent {
    /// A forward frame has been received
    ReceiveDone([u8; 2]),
    /// The receiver saw a malformed frame
    ReceiveError,
    /// The backward frame has been sent
    TransmitDone,
    /// The message timer expired
    Timeout,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerSlot {
    /// Repeat window, DAPC window and reply delay share this one
    Message,
    /// Fifteen minute initialisation window
    InitWindow,
}

pub trait Transport {
    fn start_receive(&mut self);
    fn stop_receive(&mut self);
    fn start_transmit(&mut self, data: &[u8]);
}

pub trait ParamStore {
    fn get_value(&mut self, id: ParamId) -> u8;
    fn put_value(&mut self, id: ParamId, value: u8) -> bool;
    fn get_default_value(&mut self, id: ParamId) -> u8;
    /// Restore every user changeable value, except the short address, to its default
    fn reset_user_defaults(&mut self);
    /// `None` if the location isn't implemented
    fn read_memory(&mut self, bank: u8, addr: u8) -> Option<u8>;
    fn write_memory(&mut self, bank: u8, addr: u8, value: u8) -> bool;
}

pub trait LampOutput {
    /// Light output in tenths of a percent
    fn set_led_level(&mut self, permille: u16);
    /// True if the lamp is lit when driven
    fn led_status(&mut self) -> bool;
}

pub trait BusMonitor {
    fn bus_power_present(&mut self) -> bool;
}

pub trait RandomSource {
    fn seed_random(&mut self);
    fn generate_random(&mut self) -> u32;
}

pub trait Scheduler {
    /// Start or restart a timer slot
    fn start_timer(&mut self, slot: TimerSlot, after: Duration);
    fn stop_timer(&mut self, slot: TimerSlot);
    /// Queue an event ahead of everything already queued
    fn post_priority(&mut self, event: GearEvent);
}

pub trait GearHost: Transport + ParamStore + LampOutput + BusMonitor + RandomSource + Scheduler {}

impl<T> GearHost for T where
    T: Transport + ParamStore + LampOutput + BusMonitor + RandomSource + Scheduler
{
}
