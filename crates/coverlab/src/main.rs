use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coverlab::cli::{outcome_line, outcomes_json, parse_assignments, parse_schema};
use coverlab::plan::plan_dir;
use coverlab::{ExperimentPlan, init_logging};
use coverlab_core::results::ResultStore;
use coverlab_core::{HarnessConfig, SweepOrchestrator, SweepSchema, decode_cells, tag};

#[derive(Parser, Debug)]
#[command(name = "coverlab")]
#[command(about = "Parameter sweeps and result aggregation for a coverage engine")]
struct Args {
    /// Harness root (default: the plan's `harness.root`, else the current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every experiment in a YAML plan
    Run {
        plan: PathBuf,

        /// Do not write outcomes to the summaries directory
        #[arg(long)]
        no_persist: bool,

        /// Do not export plot series
        #[arg(long)]
        no_export: bool,

        /// Override the number of concurrent engine processes
        #[arg(short, long)]
        workers: Option<usize>,

        /// Override the per-run timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Print the tag of a configuration given as key=value pairs
    Tag {
        #[arg(long, default_value = "query", value_parser = parse_schema)]
        schema: SweepSchema,

        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Print decoded cell polygons as JSON
    Cells {
        /// Grid resolution the ids were encoded with
        #[arg(long)]
        delta: f64,

        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Print the most recent persisted sweep outcomes as JSON
    Latest {
        #[arg(short, default_value_t = 1)]
        n: usize,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    match args.command {
        Command::Run {
            plan,
            no_persist,
            no_export,
            workers,
            timeout_secs,
        } => {
            let experiment_plan = ExperimentPlan::load(&plan)?;
            let mut config =
                experiment_plan.harness_config(args.root.as_deref(), &plan_dir(&plan));
            config.persist &= !no_persist;
            config.export_series &= !no_export;
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if timeout_secs.is_some() {
                config.timeout_secs = timeout_secs;
            }

            init_logging(&config, &args.log_level)?;
            run_plan(&experiment_plan, config)?;
        }
        Command::Tag { schema, values } => {
            let config = parse_assignments(&values, schema)?;
            println!("{}", tag(&config, schema)?);
        }
        Command::Cells { delta, ids } => {
            if !(delta.is_finite() && delta > 0.0) {
                color_eyre::eyre::bail!("delta must be a positive number, got {delta}");
            }
            let polygons = decode_cells(&ids, delta);
            println!("{}", serde_json::to_string_pretty(&polygons)?);
        }
        Command::Latest { n } => {
            let config = HarnessConfig::with_root(args.root.unwrap_or_else(|| PathBuf::from(".")));
            init_logging(&config, &args.log_level)?;
            let outcomes = ResultStore::new(config.summaries_path()).load_latest(n)?;
            if outcomes.is_empty() {
                tracing::warn!(dir = %config.summaries_path().display(), "no persisted outcomes");
            }
            println!("{}", serde_json::to_string_pretty(&outcomes_json(&outcomes))?);
        }
    }

    Ok(())
}

fn run_plan(plan: &ExperimentPlan, config: HarnessConfig) -> color_eyre::Result<()> {
    let root = config.root.clone();
    let orchestrator = SweepOrchestrator::new(config)?;
    tracing::info!(
        root = %root.display(),
        experiments = plan.experiments.len(),
        "running plan"
    );

    let mut failed = 0;
    for experiment in &plan.experiments {
        let outcomes = orchestrator.run_design(&experiment.name, &experiment.design)?;
        for outcome in &outcomes {
            failed += outcome.failures().count();
            println!("{}", outcome_line(outcome));
        }
    }

    if failed > 0 {
        tracing::warn!(failed, "some runs failed; see the log for details");
    }
    Ok(())
}
