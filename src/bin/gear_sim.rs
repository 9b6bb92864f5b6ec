use clap::Parser;
use dali_gear as gear;
use gear::config::GearConfig;
use gear::gear::params::ParamId;
use gear::sim::bus::{self, BusInput, BusOutput};
use gear::sim::gear_sim::GearSim;
use gear::sim::sim_host::SimHost;
use gear::utils::frame;
use log::{debug, error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
// Simulate a single DALI control gear
struct CmdArgs {
    /// Read configuration from this JSON file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
    /// Initial short address, 0-63
    #[arg(short = 's', long)]
    short_address: Option<u8>,
    /// Seed for random address generation
    #[arg(long)]
    seed: Option<u64>,
    /// Start with the bus unpowered
    #[arg(long)]
    no_bus_power: bool,
}

fn parse_input(line: &str) -> Result<Option<BusInput>, frame::FrameError> {
    let input = match line.trim() {
        "" => return Ok(None),
        "bus on" => BusInput::BusPower(true),
        "bus off" => BusInput::BusPower(false),
        "lamp fail" => BusInput::LampFault(true),
        "lamp ok" => BusInput::LampFault(false),
        line => {
            let line = frame::parse_line(line)?;
            if line.twice {
                BusInput::Twice(line.frame)
            } else {
                BusInput::Frame(line.frame)
            }
        }
    };
    Ok(Some(input))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let args = CmdArgs::parse();

    let conf = match &args.config {
        Some(path) => match GearConfig::load(path).await {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to load configuration {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => GearConfig::default(),
    };
    if let Some(a) = args.short_address {
        if a > 63 {
            error!("Short address out of range");
            return ExitCode::FAILURE;
        }
    }

    let mut host = SimHost::with_seed(&conf, args.seed.unwrap_or_else(rand::random));
    if let Some(a) = args.short_address {
        host.set_value(ParamId::ShortAddress, a);
    }
    host.bus_power = !args.no_bus_power;
    let mut sim = GearSim::with_host(&conf, host);
    sim.enable();

    let (in_tx, in_rx) = mpsc::channel(8);
    let (out_tx, mut out_rx) = mpsc::channel(32);
    let bus = tokio::spawn(bus::run_bus(sim, in_rx, out_tx));
    let printer = tokio::spawn(async move {
        while let Some(out) = out_rx.recv().await {
            match out {
                BusOutput::Answer(a) => println!("Answer: 0x{:02x} ({})", a, a),
                BusOutput::Level(l) => println!("Level: {}", l),
                BusOutput::Lost([a, d]) => println!("Not received: {:02x} {:02x}", a, d),
            }
        }
    });

    info!("Enter frames as hex, optionally followed by \"twice\"");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };
        match parse_input(&line) {
            Ok(Some(input)) => {
                debug!("Input: {:?}", input);
                if in_tx.send(input).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("{}", e),
        }
    }
    drop(in_tx);

    let status = match bus.await {
        Ok(Ok(sim)) => {
            info!("Final level {}, status {}", sim.level(), sim.ctl.status);
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            error!("Simulation failed: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Simulation task failed: {}", e);
            ExitCode::FAILURE
        }
    };
    if let Err(e) = printer.await {
        error!("Output task failed: {}", e);
    }
    status
}
