use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;
use turn_core::{
    estimated_range, EstimatedRange, EventEnvelope, EventLevel, FleetId, Rules, Universe,
};
use turn_world::{load_content, load_rules, load_universe, save_universe};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "turn_cli", about = "Fleet movement and transport turn runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Load the universe from a saved JSON file instead of the content directory.
    #[arg(long = "state")]
    state_file: Option<String>,
}

#[derive(Args)]
struct RunArgs {
    #[arg(long)]
    turns: u32,
    #[command(flatten)]
    source: Source,
    /// Override the seed stored in the universe.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
    event_level: String,
    /// Write the final universe here.
    #[arg(long)]
    out: Option<String>,
    #[arg(long, default_value_t = 1)]
    print_every: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a fixed number of turns.
    Run(RunArgs),
    /// Print how far a fleet can fly on its current fuel.
    Range {
        #[arg(long)]
        fleet: u32,
        #[arg(long)]
        warp: u32,
        #[command(flatten)]
        source: Source,
    },
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn load(source: &Source) -> Result<(Rules, Universe)> {
    match &source.state_file {
        Some(path) => {
            let rules = load_rules(&source.content_dir)?;
            let universe =
                load_universe(path).with_context(|| format!("loading state file: {path}"))?;
            Ok((rules, universe))
        }
        None => {
            let content = load_content(&source.content_dir)?;
            Ok((content.rules, content.universe))
        }
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let (rules, mut universe) = load(&args.source)?;
    if let Some(seed) = args.seed {
        universe.meta.seed = seed;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(universe.meta.seed);
    let event_level = match args.event_level.as_str() {
        "debug" => EventLevel::Debug,
        _ => EventLevel::Normal,
    };
    let print_every = args.print_every.max(1);

    println!(
        "Starting turns: count={} from_turn={} seed={} fleets={} rules_version={}",
        args.turns,
        universe.meta.turn,
        universe.meta.seed,
        universe.fleets.len(),
        rules.rules_version,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..args.turns {
        let events = turn_core::run_turn(&mut universe, &[], &rules, &mut rng, event_level);
        for envelope in &events {
            log_event(envelope);
        }
        if universe.meta.turn % print_every == 0 {
            print_status(&universe, events.len());
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state before turn {}:", universe.meta.turn);
    print_status(&universe, 0);

    if let Some(path) = &args.out {
        save_universe(path, &universe)?;
        println!("Universe written to {path}");
    }
    Ok(())
}

fn range(fleet_id: FleetId, warp: u32, source: &Source) -> Result<()> {
    let (_, universe) = load(source)?;
    let Some(fleet) = universe.fleets.get(&fleet_id) else {
        bail!("{fleet_id} not found in universe");
    };
    let player = universe
        .players
        .get(&fleet.owner)
        .with_context(|| format!("{fleet_id} owner {} not found", fleet.owner))?;
    match estimated_range(fleet, &universe.designs, player, warp) {
        EstimatedRange::Finite(ly) => println!("{} at warp {warp}: {ly} ly", fleet.name),
        EstimatedRange::Infinite => println!("{} at warp {warp}: unlimited", fleet.name),
    }
    Ok(())
}

fn log_event(envelope: &EventEnvelope) {
    tracing::info!(
        id = %envelope.id.0,
        turn = envelope.turn,
        player = %envelope.player,
        "{:?}",
        envelope.event
    );
}

fn print_status(universe: &Universe, event_count: usize) {
    let moving = universe
        .fleets
        .values()
        .filter(|fleet| fleet.warp_speed > 0)
        .count();
    let owned = universe
        .planets
        .values()
        .filter(|planet| planet.owner.is_some())
        .count();
    println!(
        "[turn={turn:04}]  fleets={fleets:3}  moving={moving:3}  \
         owned_planets={owned:3}  salvage={salvage:3}  events={event_count}",
        turn = universe.meta.turn,
        fleets = universe.fleets.len(),
        salvage = universe.salvage.len(),
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(&args)?,
        Commands::Range {
            fleet,
            warp,
            source,
        } => range(FleetId(fleet), warp, &source)?,
    }
    Ok(())
}
