use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use gpro_setup::{
    AppConfig, GproError, ReportRecord,
    formulas::{
        overtaking::analyze_overtaking,
        parts_wear::analyze_parts_wear_with_budget,
        post_race::analyze_race_performance,
        qualifying::simulate_qualifying,
        setup::calculate_optimal_setup,
        strategy::{
            DEFAULT_CAR_EFFICIENCY, DEFAULT_DRIVER_SKILL, DEFAULT_TRAFFIC_DENSITY,
            DEFAULT_TYRE_LIFE, calculate_advanced_fuel, calculate_pit_window,
            calculate_race_strategy, strategy_scenarios, tyre_recommendation,
        },
    },
    report,
    snapshot::ProviderKind,
    writer,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Read the weekend from a snapshot JSON export instead of the configured provider
    #[arg(short, long, global = true)]
    snapshot: Option<PathBuf>,

    /// Seed for qualifying and overtaking sampling
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Append every result to this JSON lines file
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Qualifying and race car setup
    Setup,
    /// Fuel, tyre and pit stop plan for the race
    Strategy,
    /// Fuel load, tyre choice and pit window for a given distance
    Fuel {
        /// Laps to fuel for, defaults to the race distance
        #[arg(short, long)]
        laps: Option<u32>,
        #[arg(long, default_value_t = DEFAULT_DRIVER_SKILL)]
        driver_skill: f64,
        #[arg(long, default_value_t = DEFAULT_CAR_EFFICIENCY)]
        car_efficiency: f64,
    },
    /// Predicted grid position and session plan
    Qualifying,
    /// Parts wear projection and maintenance plan
    Wear {
        /// Races left in the season
        #[arg(short, long)]
        races: Option<u32>,
        /// Maintenance budget
        #[arg(short, long)]
        budget: Option<f64>,
    },
    /// Overtaking chances from the current race position
    Overtaking {
        #[arg(short, long)]
        position: u32,
        #[arg(short, long)]
        lap: u32,
        /// Race distance, defaults to the track's lap count
        #[arg(short, long)]
        total_laps: Option<u32>,
    },
    /// Compare the weekend's predictions with the race result
    PostRace {
        /// Race result JSON export, for the file provider
        #[arg(short, long)]
        race_result: Option<PathBuf>,
    },
    /// Show the configuration, or save the current options as the new default
    Config {
        #[arg(long)]
        save: bool,
    },
}

fn load_config(cli: &Args) -> AppConfig {
    let mut config = match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            warn!("Ignoring unreadable config file: {}", e);
            AppConfig::default()
        }
    };
    if let Some(snapshot) = &cli.snapshot {
        config.provider = ProviderKind::File;
        config.snapshot_path = Some(snapshot.clone());
    }
    if let Some(seed) = cli.seed {
        config.rng_seed = Some(seed);
    }
    if let Some(log) = &cli.log {
        config.report_log = Some(log.clone());
    }
    config
}

fn rng_for(config: &AppConfig) -> ChaCha8Rng {
    match config.rng_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), GproError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| GproError::WriterError { source: e.into() })?;
    println!("{}", json);
    Ok(())
}

fn emit(config: &AppConfig, json: bool, record: ReportRecord) -> Result<(), GproError> {
    if json {
        print_json(&record)?;
    } else {
        println!("{}", report::format_report(&record));
    }
    if let Some(log) = &config.report_log {
        writer::append_report(log, &record)?;
    }
    Ok(())
}

fn run(cli: Args) -> Result<(), GproError> {
    let mut config = load_config(&cli);

    if let Commands::Config { save } = &cli.command {
        if *save {
            let path = config.save()?;
            info!("Saved config to {}", path.display());
        }
        return print_json(&config);
    }
    if let Commands::PostRace {
        race_result: Some(race_result),
    } = &cli.command
    {
        config.race_result_path = Some(race_result.clone());
    }

    let provider = ProviderKind::build(&config)?;
    let snapshot = provider.sync_pre_race()?;
    info!("Using {} snapshot provider", provider.name());

    let record = match &cli.command {
        Commands::Setup => ReportRecord::Setup(calculate_optimal_setup(&snapshot)?),
        Commands::Strategy => {
            ReportRecord::Strategy(Box::new(calculate_race_strategy(&snapshot)?))
        }
        Commands::Fuel {
            laps,
            driver_skill,
            car_efficiency,
        } => {
            let track = snapshot.track()?;
            let weather = snapshot.weather()?;
            let laps = laps.unwrap_or(track.laps);
            let fuel =
                calculate_advanced_fuel(&track, &weather.race, laps, *driver_skill, *car_efficiency);
            if !cli.json {
                let tyres = tyre_recommendation(
                    &track,
                    &weather.race,
                    *driver_skill,
                    snapshot.car()?.suspension.performance,
                );
                let pit_window =
                    calculate_pit_window(laps, DEFAULT_TYRE_LIFE, DEFAULT_TRAFFIC_DENSITY);
                let scenarios = strategy_scenarios(&track, &tyres, laps);
                println!("{}\n", report::format_tyre_plan(&tyres, &pit_window, &scenarios));
            }
            ReportRecord::Fuel(fuel)
        }
        Commands::Qualifying => {
            let mut rng = rng_for(&config);
            ReportRecord::Qualifying(Box::new(simulate_qualifying(&snapshot, &mut rng)?))
        }
        Commands::Wear { races, budget } => ReportRecord::Wear(Box::new(
            analyze_parts_wear_with_budget(
                &snapshot,
                races.unwrap_or(config.remaining_races),
                budget.unwrap_or(config.budget),
            )?,
        )),
        Commands::Overtaking {
            position,
            lap,
            total_laps,
        } => {
            let total_laps = match total_laps {
                Some(total_laps) => *total_laps,
                None => snapshot.track()?.laps,
            };
            let mut rng = rng_for(&config);
            ReportRecord::Overtaking(Box::new(analyze_overtaking(
                &snapshot, *position, *lap, total_laps, &mut rng,
            )?))
        }
        Commands::PostRace { .. } => {
            let setup = calculate_optimal_setup(&snapshot)?;
            let strategy = calculate_race_strategy(&snapshot)?;
            let result = provider.post_race_results()?;
            ReportRecord::PostRace(Box::new(analyze_race_performance(
                &setup, &strategy, &result,
            )?))
        }
        Commands::Config { .. } => return Ok(()),
    };

    emit(&config, cli.json, record)
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
