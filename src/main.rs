use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use trafsim::{build_lane, Format, ScenarioConfig, Simulation, SnapshotWriter, VehicleProfile};

#[derive(Parser, Debug)]
#[command(name = "trafsim", version, about = "Simulate a single lane of traffic and print every tick")]
struct Opts {
    /// Scenario file (JSON). Options given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of vehicles on the lane
    #[arg(long)]
    vehicles: Option<usize>,

    /// Vehicle profile to use for every vehicle
    #[arg(long, value_enum)]
    profile: Option<VehicleProfile>,

    /// Random seed (default: drawn from the OS)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 900)]
    ticks: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Output file (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_config(opts: &Opts) -> Result<ScenarioConfig> {
    let mut config = match &opts.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open scenario {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("cannot parse scenario {}", path.display()))?
        }
        None => ScenarioConfig::default(),
    };
    if let Some(count) = opts.vehicles {
        config.vehicle_count = count;
    }
    if let Some(profile) = opts.profile {
        config.profiles = vec![(profile, 1.0)];
    }
    if opts.seed.is_some() {
        config.seed = opts.seed;
    }
    Ok(config)
}

fn run<W: Write>(sim: &mut Simulation, ticks: usize, out: W, format: Format) -> Result<()> {
    let mut writer = SnapshotWriter::new(out, format);
    for _ in 0..ticks {
        writer.write_frame(sim.tick(), sim.lane())?;
        sim.step();
    }
    writer.finish().context("cannot write snapshots")?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trafsim=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let opts = Opts::parse();
    let config = load_config(&opts)?;
    let lane = build_lane(&config, &mut config.rng()).context("cannot build scenario")?;
    let mut sim = Simulation::new(lane);

    match &opts.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            run(&mut sim, opts.ticks, BufWriter::new(file), opts.format)?;
        }
        None => run(&mut sim, opts.ticks, io::stdout().lock(), opts.format)?,
    }

    let crashed = sim.crashed_count();
    if crashed > 0 {
        log::info!("{} of {} vehicles crashed", crashed, sim.lane().len());
    }
    Ok(())
}
