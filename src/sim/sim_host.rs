use crate::common::defs::MASK;
use crate::config::GearConfig;
use crate::gear::host::{
    BusMonitor, GearEvent, LampOutput, ParamStore, RandomSource, Scheduler, TimerSlot, Transport,
};
use crate::gear::params::ParamId;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;

/// Capacity of the event queue
pub const EVENT_QUEUE_LEN: usize = 8;

/// Memory bank locations at or above this need the bank unlocked
const LOCK_BYTE: u8 = 0x02;
const UNLOCKED: u8 = 0x55;

const DEFAULT_SEED: u64 = 0x6461_6c69;

fn slot_index(slot: TimerSlot) -> usize {
    match slot {
        TimerSlot::Message => 0,
        TimerSlot::InitWindow => 1,
    }
}

/// Generate the read-only memory bank 0
fn build_bank0(conf: &GearConfig) -> Vec<u8> {
    let mut bank = vec![0u8; 0x1b];
    bank[0x00] = 0x1a;
    bank[0x02] = conf.memory_banks.len() as u8;
    // Firmware version 1.0
    bank[0x09] = 1;
    bank[0x0b..=0x12].copy_from_slice(&u64::from(conf.defaults.random_address).to_be_bytes());
    // Hardware version 1.0
    bank[0x13] = 1;
    // IEC 62386-101/102 version 2.0, no 103
    bank[0x15] = 0x08;
    bank[0x16] = 0x08;
    bank[0x17] = MASK;
    bank[0x19] = 1;
    bank
}

/// Host services of a gear running entirely in memory
pub struct SimHost {
    values: [u8; ParamId::COUNT],
    defaults: [u8; ParamId::COUNT],
    bank0: Vec<u8>,
    banks: Vec<Vec<u8>>,
    led_level: u16,
    /// Every distinct level sent to the LED driver
    pub led_history: Vec<u16>,
    /// Lamp stays dark when driven
    pub lamp_fault: bool,
    pub bus_power: bool,
    seed: u64,
    rng: StdRng,
    receiving: bool,
    /// Backward frames in the order they were sent
    pub transmitted: Vec<u8>,
    now_us: u64,
    timers: [Option<u64>; 2],
    events: VecDeque<GearEvent>,
    pub dropped_events: usize,
}

impl SimHost {
    pub fn new(conf: &GearConfig) -> SimHost {
        Self::with_seed(conf, DEFAULT_SEED)
    }

    pub fn with_seed(conf: &GearConfig, seed: u64) -> SimHost {
        let mut defaults = [0u8; ParamId::COUNT];
        for id in ParamId::all() {
            defaults[id.index()] = conf.defaults.value(id);
        }
        SimHost {
            values: defaults,
            defaults,
            bank0: build_bank0(conf),
            banks: conf.memory_banks.clone(),
            led_level: 0,
            led_history: Vec::new(),
            lamp_fault: false,
            bus_power: true,
            seed,
            rng: StdRng::seed_from_u64(seed),
            receiving: false,
            transmitted: Vec::new(),
            now_us: 0,
            timers: [None; 2],
            events: VecDeque::with_capacity(EVENT_QUEUE_LEN),
            dropped_events: 0,
        }
    }

    /// Change a stored value behind the gear's back, as if programmed at the factory
    pub fn set_value(&mut self, id: ParamId, value: u8) {
        self.values[id.index()] = value;
    }

    pub fn value(&self, id: ParamId) -> u8 {
        self.values[id.index()]
    }

    pub fn read_memory_bank(&self, bank: u8, addr: u8) -> Option<u8> {
        let data = if bank == 0 {
            &self.bank0
        } else {
            self.banks.get(bank as usize - 1)?
        };
        data.get(addr as usize).copied()
    }

    pub fn led_level(&self) -> u16 {
        self.led_level
    }

    pub fn is_receiving(&self) -> bool {
        self.receiving
    }

    /// A forward frame appears on the bus. Lost unless the receiver is armed.
    pub fn bus_frame(&mut self, frame: [u8; 2]) -> bool {
        if !self.receiving || !self.bus_power {
            debug!("Frame {:02x} {:02x} not received", frame[0], frame[1]);
            return false;
        }
        self.receiving = false;
        self.push_event(GearEvent::ReceiveDone(frame));
        true
    }

    pub fn push_event(&mut self, event: GearEvent) {
        if self.events.len() >= EVENT_QUEUE_LEN {
            warn!("Event queue full, dropping {:?}", event);
            self.dropped_events += 1;
            return;
        }
        self.events.push_back(event);
    }

    pub fn next_event(&mut self) -> Option<GearEvent> {
        self.events.pop_front()
    }

    pub fn now(&self) -> Duration {
        Duration::from_micros(self.now_us)
    }

    pub fn set_now(&mut self, now: Duration) {
        self.now_us = now.as_micros() as u64;
    }

    /// Earliest running timer deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().flatten().min().map(|&t| Duration::from_micros(t))
    }

    /// Stop and return a timer slot that has expired
    pub fn take_expired(&mut self) -> Option<TimerSlot> {
        for slot in [TimerSlot::Message, TimerSlot::InitWindow] {
            let timer = &mut self.timers[slot_index(slot)];
            if matches!(timer, Some(t) if *t <= self.now_us) {
                *timer = None;
                return Some(slot);
            }
        }
        None
    }

    pub fn timer_running(&self, slot: TimerSlot) -> bool {
        self.timers[slot_index(slot)].is_some()
    }
}

impl Transport for SimHost {
    fn start_receive(&mut self) {
        self.receiving = true;
    }

    fn stop_receive(&mut self) {
        self.receiving = false;
    }

    fn start_transmit(&mut self, data: &[u8]) {
        self.receiving = false;
        self.transmitted.extend_from_slice(data);
        self.push_event(GearEvent::TransmitDone);
    }
}

impl ParamStore for SimHost {
    fn get_value(&mut self, id: ParamId) -> u8 {
        self.values[id.index()]
    }

    fn put_value(&mut self, id: ParamId, value: u8) -> bool {
        self.values[id.index()] = value;
        true
    }

    fn get_default_value(&mut self, id: ParamId) -> u8 {
        self.defaults[id.index()]
    }

    fn reset_user_defaults(&mut self) {
        let short = self.values[ParamId::ShortAddress.index()];
        self.values = self.defaults;
        self.values[ParamId::ShortAddress.index()] = short;
    }

    fn read_memory(&mut self, bank: u8, addr: u8) -> Option<u8> {
        self.read_memory_bank(bank, addr)
    }

    fn write_memory(&mut self, bank: u8, addr: u8, value: u8) -> bool {
        if bank == 0 {
            return false;
        }
        let data = match self.banks.get_mut(bank as usize - 1) {
            Some(data) => data,
            None => return false,
        };
        let writable = match addr {
            0 | 1 => false,
            LOCK_BYTE => true,
            _ => data.get(LOCK_BYTE as usize) == Some(&UNLOCKED),
        };
        match data.get_mut(addr as usize) {
            Some(loc) if writable => {
                *loc = value;
                true
            }
            _ => false,
        }
    }
}

impl LampOutput for SimHost {
    fn set_led_level(&mut self, permille: u16) {
        if permille != self.led_level || self.led_history.is_empty() {
            self.led_history.push(permille);
        }
        self.led_level = permille;
    }

    fn led_status(&mut self) -> bool {
        !self.lamp_fault
    }
}

impl BusMonitor for SimHost {
    fn bus_power_present(&mut self) -> bool {
        self.bus_power
    }
}

impl RandomSource for SimHost {
    fn seed_random(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn generate_random(&mut self) -> u32 {
        self.rng.gen()
    }
}

impl Scheduler for SimHost {
    fn start_timer(&mut self, slot: TimerSlot, after: Duration) {
        self.timers[slot_index(slot)] = Some(self.now_us + after.as_micros() as u64);
    }

    fn stop_timer(&mut self, slot: TimerSlot) {
        self.timers[slot_index(slot)] = None;
    }

    fn post_priority(&mut self, event: GearEvent) {
        if self.events.len() >= EVENT_QUEUE_LEN {
            // Make room by dropping the newest ordinary event
            warn!("Event queue full, dropping {:?}", self.events.back());
            self.events.pop_back();
            self.dropped_events += 1;
        }
        self.events.push_front(event);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn memory_bank_test() {
        let mut conf = GearConfig::default();
        conf.memory_banks = vec![vec![0x04, 0x00, 0x00, 0x00, 0x00]];
        let mut host = SimHost::new(&conf);
        assert_eq!(host.read_memory(0, 0), Some(0x1a));
        assert_eq!(host.read_memory(0, 2), Some(1));
        assert_eq!(host.read_memory(0, 0x1b), None);
        assert_eq!(host.read_memory(2, 0), None);
        assert!(!host.write_memory(0, 3, 1));

        // Locked
        assert!(!host.write_memory(1, 3, 0x42));
        assert!(host.write_memory(1, 2, UNLOCKED));
        assert!(host.write_memory(1, 3, 0x42));
        assert_eq!(host.read_memory(1, 3), Some(0x42));
        assert!(!host.write_memory(1, 0, 0x42));
        assert!(!host.write_memory(1, 5, 0x42));
    }

    #[test]
    fn reset_keeps_short_address() {
        let mut host = SimHost::new(&GearConfig::default());
        host.put_value(ParamId::ShortAddress, 7);
        host.put_value(ParamId::MaxLevel, 100);
        host.reset_user_defaults();
        assert_eq!(host.value(ParamId::ShortAddress), 7);
        assert_eq!(host.value(ParamId::MaxLevel), 0xfe);
    }

    #[test]
    fn event_queue_test() {
        let mut host = SimHost::new(&GearConfig::default());
        assert!(!host.bus_frame([0xff, 0x00]));
        host.start_receive();
        assert!(host.bus_frame([0xff, 0x00]));
        assert!(!host.bus_frame([0xff, 0x05]));
        host.post_priority(GearEvent::Timeout);
        assert_eq!(host.next_event(), Some(GearEvent::Timeout));
        assert_eq!(host.next_event(), Some(GearEvent::ReceiveDone([0xff, 0x00])));
        assert_eq!(host.next_event(), None);

        for _ in 0..EVENT_QUEUE_LEN + 2 {
            host.push_event(GearEvent::TransmitDone);
        }
        assert_eq!(host.dropped_events, 2);
        host.post_priority(GearEvent::ReceiveError);
        assert_eq!(host.next_event(), Some(GearEvent::ReceiveError));
        assert_eq!(host.dropped_events, 3);
    }

    #[test]
    fn timer_test() {
        let mut host = SimHost::new(&GearConfig::default());
        host.start_timer(TimerSlot::Message, Duration::from_millis(100));
        host.start_timer(TimerSlot::InitWindow, Duration::from_millis(50));
        assert_eq!(host.next_deadline(), Some(Duration::from_millis(50)));
        host.set_now(Duration::from_millis(60));
        assert_eq!(host.take_expired(), Some(TimerSlot::InitWindow));
        assert_eq!(host.take_expired(), None);
        host.set_now(Duration::from_millis(100));
        assert_eq!(host.take_expired(), Some(TimerSlot::Message));
        assert!(!host.timer_running(TimerSlot::Message));
    }

    #[test]
    fn random_is_reproducible() {
        let mut host = SimHost::new(&GearConfig::default());
        host.seed_random();
        let a = host.generate_random();
        host.seed_random();
        assert_eq!(host.generate_random(), a);
    }
}
