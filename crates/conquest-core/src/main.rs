//! Headless Conquest Runner
//!
//! Plays a match with every faction under AI control except the player,
//! which idles, and prints the standings.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use conquest_core::config::default_config_toml;
use conquest_core::{EventLogger, MapDefinition, SimConfig, Simulation};
use conquest_events::SimTime;

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "conquest_sim")]
#[command(about = "Headless territorial conquest simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of factions on the default world map (2-6)
    #[arg(long, default_value_t = 4)]
    factions: usize,

    /// Simulation config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Custom map (TOML, or JSON by extension) instead of the world map
    #[arg(long)]
    map: Option<PathBuf>,

    /// Simulated time to run before stopping, such as "90s" or "600"
    #[arg(long, default_value = "600s")]
    duration: SimTime,

    /// Clock step in milliseconds
    #[arg(long, default_value_t = 100)]
    step_ms: u64,

    /// Write every event to this JSONL file
    #[arg(long)]
    events_out: Option<PathBuf>,

    /// Add to an existing events file instead of replacing it
    #[arg(long, requires = "events_out")]
    append_events: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    if args.dump_config {
        match &args.config {
            Some(_) => print!("{}", config.to_toml()?),
            None => print!("{}", default_config_toml()?),
        }
        return Ok(());
    }

    let mut sim = match &args.map {
        Some(path) => Simulation::from_map(config, &MapDefinition::from_file(path)?, args.seed)?,
        None => Simulation::standard_game(config, args.factions, args.seed)?,
    };
    let mut logger = open_event_log(args)?;

    println!("Conquest Simulation");
    println!("===================");
    println!("Seed: {}", args.seed);
    println!("Territories: {}", sim.territories().len());
    println!("Factions: {}", sim.factions().len());
    println!();

    let step = Duration::from_millis(args.step_ms.max(1));
    logger.log_batch(&sim.drain_events())?;

    while !sim.is_over() && sim.now() < args.duration {
        let report = sim.tick(step);
        for faction in &report.eliminated {
            println!("[{}] {} eliminated", report.ended_at, faction);
        }
        logger.log_batch(&sim.drain_events())?;
    }
    logger.flush()?;

    print_standings(&sim);
    Ok(())
}

fn open_event_log(args: &Args) -> std::io::Result<EventLogger> {
    match &args.events_out {
        Some(path) if args.append_events => EventLogger::append(path),
        Some(path) => EventLogger::new(path),
        None => Ok(EventLogger::null()),
    }
}

fn print_standings(sim: &Simulation) {
    let snapshot = sim.snapshot();
    println!();
    println!("Standings at {}", snapshot.time);
    println!("-------------");
    let mut factions = snapshot.factions.clone();
    factions.sort_by(|a, b| {
        b.territory_count
            .cmp(&a.territory_count)
            .then(b.total_points.cmp(&a.total_points))
    });
    for faction in &factions {
        let status = if faction.is_eliminated { " (eliminated)" } else { "" };
        println!(
            "  {:<12} {:>3} territories {:>6} points{}",
            faction.name, faction.territory_count, faction.total_points, status
        );
    }
    match sim.winner() {
        Some(winner) => println!("Winner: {}", winner.name),
        None => println!("No winner yet"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conquest_events::fixtures::victory_event;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["conquest_sim"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn line_count(path: &std::path::Path) -> usize {
        std::fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_duration_flag() {
        assert_eq!(args(&[]).duration, SimTime::from_millis(600_000));
        assert_eq!(args(&["--duration", "90s"]).duration, SimTime::from_millis(90_000));
        assert_eq!(args(&["--duration", "2.5"]).duration, SimTime::from_millis(2500));
        assert!(Args::try_parse_from(["conquest_sim", "--duration", "soon"]).is_err());
        assert!(Args::try_parse_from(["conquest_sim", "--duration", "-3s"]).is_err());
    }

    #[test]
    fn test_append_events_requires_output() {
        assert!(Args::try_parse_from(["conquest_sim", "--append-events"]).is_err());
    }

    #[test]
    fn test_events_out_replaces_or_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let path_arg = path.to_str().unwrap();
        let event = victory_event();

        for _ in 0..2 {
            let mut logger = open_event_log(&args(&["--events-out", path_arg])).unwrap();
            logger.log(&event).unwrap();
            logger.flush().unwrap();
        }
        assert_eq!(line_count(&path), 1);

        let mut logger =
            open_event_log(&args(&["--events-out", path_arg, "--append-events"])).unwrap();
        logger.log(&event).unwrap();
        logger.flush().unwrap();
        drop(logger);
        assert_eq!(line_count(&path), 2);
    }

    #[test]
    fn test_no_events_out_counts_only() {
        let logger = open_event_log(&args(&[])).unwrap();
        assert!(logger.path().is_none());
    }
}
