use crate::config::{GearConfig, GearTiming};
use crate::gear::cmd_defs::Command;
use crate::gear::control::GearCtl;
use crate::gear::host::{GearEvent, TimerSlot};
use crate::sim::sim_host::SimHost;
use std::time::Duration;

/// Gap between the two frames of a send twice command
pub const TWICE_GAP: Duration = Duration::from_millis(20);

/// Time allowed for a backward frame after a forward frame
pub const ANSWER_WAIT: Duration = Duration::from_millis(20);

/// A gear and its host, run on a virtual clock
pub struct GearSim {
    pub ctl: GearCtl,
    pub host: SimHost,
    timing: GearTiming,
    next_output: Duration,
    next_bus_fail: Duration,
}

impl GearSim {
    pub fn new(conf: &GearConfig) -> GearSim {
        Self::with_host(conf, SimHost::new(conf))
    }

    pub fn with_host(conf: &GearConfig, host: SimHost) -> GearSim {
        let mut ctl = GearCtl::new(conf.timing.clone());
        ctl.initialize();
        let now = host.now();
        GearSim {
            ctl,
            host,
            timing: conf.timing.clone(),
            next_output: now + conf.timing.output_tick(),
            next_bus_fail: now + conf.timing.bus_fail_period(),
        }
    }

    pub fn enable(&mut self) {
        self.ctl.control(&mut self.host, true);
        self.run_pending();
    }

    pub fn disable(&mut self) {
        self.ctl.control(&mut self.host, false);
        self.run_pending();
    }

    /// Put a frame on the bus, returns false if the gear wasn't listening
    pub fn send(&mut self, frame: [u8; 2]) -> bool {
        let received = self.host.bus_frame(frame);
        self.run_pending();
        received
    }

    /// Send a command the way a bus master would and return the answer, if any
    pub fn send_command<const ANSWER: bool, const TWICE: bool>(
        &mut self,
        cmd: Command<ANSWER, TWICE>,
    ) -> Option<u8> {
        let start = self.host.transmitted.len();
        self.send(cmd.frame());
        if cmd.send_twice() {
            self.advance(TWICE_GAP);
            self.send(cmd.frame());
        }
        self.advance(ANSWER_WAIT);
        self.host.transmitted.get(start).copied()
    }

    /// Inject a frame through the forced message path
    pub fn force(&mut self, addr: u8, data: u8) -> bool {
        let accepted = self.ctl.force_message(&mut self.host, addr, data);
        self.run_pending();
        accepted
    }

    /// Deliver queued events one at a time
    pub fn run_pending(&mut self) {
        while let Some(event) = self.host.next_event() {
            self.ctl.process_event(&mut self.host, event);
        }
    }

    /// Move the virtual clock forward, running every tick and timer on the way
    pub fn advance(&mut self, duration: Duration) {
        // The host clock counts whole µs
        let end = Duration::from_micros((self.host.now() + duration).as_micros() as u64);
        loop {
            let mut next = end.min(self.next_output).min(self.next_bus_fail);
            if let Some(deadline) = self.host.next_deadline() {
                next = next.min(deadline);
            }
            if next > self.host.now() {
                self.host.set_now(next);
            }
            while let Some(slot) = self.host.take_expired() {
                match slot {
                    TimerSlot::Message => self.host.push_event(GearEvent::Timeout),
                    TimerSlot::InitWindow => {
                        self.ctl.process_timer();
                    }
                }
                self.run_pending();
            }
            let now = self.host.now();
            if now >= self.next_output {
                self.ctl.process_output(&mut self.host);
                self.next_output += self.timing.output_tick();
            }
            if now >= self.next_bus_fail {
                self.ctl.process_bus_fail(&mut self.host);
                self.next_bus_fail += self.timing.bus_fail_period();
            }
            self.run_pending();
            if now >= end {
                break;
            }
        }
    }

    pub fn level(&self) -> u8 {
        self.ctl.actual_level
    }
}
