//! Runs a simulated gear in real time behind a pair of channels.

use crate::error::DynResult;
use crate::sim::gear_sim::{GearSim, TWICE_GAP};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusInput {
    Frame([u8; 2]),
    /// Frame repeated after the send twice gap
    Twice([u8; 2]),
    BusPower(bool),
    LampFault(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOutput {
    /// Backward frame sent by the gear
    Answer(u8),
    /// New actual level
    Level(u8),
    /// A forward frame arrived while the gear wasn't listening
    Lost([u8; 2]),
}

struct Reporter {
    sent: usize,
    level: Option<u8>,
}

impl Reporter {
    async fn report(
        &mut self,
        sim: &GearSim,
        output: &mpsc::Sender<BusOutput>,
    ) -> DynResult<()> {
        while let Some(&answer) = sim.host.transmitted.get(self.sent) {
            self.sent += 1;
            output.send(BusOutput::Answer(answer)).await?;
        }
        let level = sim.level();
        if self.level != Some(level) {
            self.level = Some(level);
            output.send(BusOutput::Level(level)).await?;
        }
        Ok(())
    }
}

async fn send_frame(
    sim: &mut GearSim,
    frame: [u8; 2],
    output: &mpsc::Sender<BusOutput>,
) -> DynResult<()> {
    if !sim.send(frame) {
        output.send(BusOutput::Lost(frame)).await?;
    }
    Ok(())
}

/// Drive `sim` until the input channel closes
pub async fn run_bus(
    mut sim: GearSim,
    mut input: mpsc::Receiver<BusInput>,
    output: mpsc::Sender<BusOutput>,
) -> DynResult<GearSim> {
    let period = sim.ctl.timing.output_tick().max(time::Duration::from_millis(1));
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    // Real time corresponding to virtual time zero
    let origin = Instant::now()
        .checked_sub(sim.host.now())
        .unwrap_or_else(Instant::now);
    let mut repeat: Option<(Instant, [u8; 2])> = None;
    let mut reporter = Reporter {
        sent: sim.host.transmitted.len(),
        level: None,
    };
    reporter.report(&sim, &output).await?;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            // New input waits until a pending repeat has been sent
            msg = input.recv(), if repeat.is_none() => {
                match msg {
                    None => break,
                    Some(BusInput::Frame(frame)) => send_frame(&mut sim, frame, &output).await?,
                    Some(BusInput::Twice(frame)) => {
                        send_frame(&mut sim, frame, &output).await?;
                        repeat = Some((Instant::now() + TWICE_GAP, frame));
                    }
                    Some(BusInput::BusPower(on)) => sim.host.bus_power = on,
                    Some(BusInput::LampFault(fault)) => sim.host.lamp_fault = fault,
                }
            }
        }
        let now = Instant::now();
        let target = now - origin;
        if target > sim.host.now() {
            sim.advance(target - sim.host.now());
        }
        if let Some((at, frame)) = repeat {
            if now >= at {
                repeat = None;
                send_frame(&mut sim, frame, &output).await?;
            }
        }
        reporter.report(&sim, &output).await?;
    }
    Ok(sim)
}
