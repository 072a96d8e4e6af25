//! Command line front end for tuning Toffoli approximations.
//!
//! ```bash
//! # Tune against the default cost functions
//! toffoli-tune tune
//!
//! # One reproducible search, printed as JSON
//! toffoli-tune tune --cost trace_overlap --seed 7 --json
//!
//! # Score a set of angles
//! toffoli-tune cost 1.57 0 3.14 1.57 0 3.14
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use toffoli_tune::prelude::*;

/// Tune a parameterised circuit towards a Toffoli gate
#[derive(Parser)]
#[command(name = "toffoli-tune")]
#[command(version)]
#[command(about = "Tune a parameterised circuit towards a Toffoli gate")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the task angles for each cost function
    Tune {
        /// Cost function to tune against, may be repeated
        #[arg(long = "cost")]
        costs: Vec<CostFunction>,

        /// Seed for the optimizer and shot sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Generation cap
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Sample this many shots for count comparison
        #[arg(long)]
        shots: Option<u32>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate every cost function for a set of angles
    Cost {
        /// Task angles: theta1 phi1 lambda1 theta2 phi2 lambda2
        #[arg(allow_negative_numbers = true)]
        angles: Vec<f64>,

        /// Score the ideal Toffoli gate instead
        #[arg(long, conflicts_with = "angles")]
        toffoli: bool,

        /// Sample this many shots for count comparison
        #[arg(long)]
        shots: Option<u32>,

        /// Seed for shot sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Compare the task circuit for a set of angles with the Toffoli gate
    Check {
        /// Task angles: theta1 phi1 lambda1 theta2 phi2 lambda2
        #[arg(allow_negative_numbers = true)]
        angles: Vec<f64>,
    },

    /// Show effective configuration
    Config,
}

fn main() -> TuneResult<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging.level);

    match cli.command {
        Commands::Tune {
            costs,
            seed,
            max_iterations,
            shots,
            json,
        } => {
            if !costs.is_empty() {
                config.cost_functions = costs;
            }
            if let Some(seed) = seed {
                config.optimizer.seed = Some(seed);
                config.simulation.seed = Some(seed);
            }
            if let Some(n) = max_iterations {
                config.optimizer.max_iterations = n;
            }
            if shots.is_some() {
                config.simulation.shots = shots;
            }
            config.validate()?;

            info!(
                cost_functions = ?config.cost_functions,
                seed = ?config.optimizer.seed,
                "starting tuning"
            );
            let runs = optimize_angles_and_time(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else {
                for run in &runs {
                    print_run(run)?;
                }
            }
        }

        Commands::Cost {
            angles,
            toffoli: ideal,
            shots,
            seed,
        } => {
            let circuit = if ideal {
                toffoli()
            } else {
                TaskAngles::from_slice(&angles)?.to_circuit()?
            };
            let mode = match shots.or(config.simulation.shots) {
                Some(shots) => SimulationMode::Shots {
                    shots,
                    seed: seed.or(config.simulation.seed),
                },
                None => SimulationMode::Exact,
            };
            for cost in CostFunction::ALL {
                println!("{:<18} {:.6}", cost.name(), cost.evaluate(&circuit, mode)?);
            }
        }

        Commands::Check { angles } => {
            let circuit = TaskAngles::from_slice(&angles)?.to_circuit()?;
            let ideal = toffoli();
            println!(
                "state_vector_equiv  {}",
                state_vector_equiv(&circuit, &ideal)?
            );
            println!(
                "unitaries_allclose  {}",
                unitaries_allclose(&circuit, &ideal)?
            );
            println!("operator_equiv      {}", operator_equiv(&circuit, &ideal)?);
        }

        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}

fn print_run(run: &TuningRun) -> TuneResult<()> {
    println!("{}", run.cost_function);
    println!("  cost        {:.6e}", run.cost);
    println!("  time        {:.3}s", run.elapsed.as_secs_f64());
    println!(
        "  generations {} ({} evaluations, {})",
        run.result.nit, run.result.nfev, run.result.message
    );
    println!("  angles      {:?}", run.angles.to_array());
    println!("  equivalent  {}", run.is_toffoli_equivalent()?);
    Ok(())
}

/// Initialize logging.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
