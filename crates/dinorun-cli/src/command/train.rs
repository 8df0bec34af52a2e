use std::{path::PathBuf, sync::atomic::AtomicBool};

use anyhow::Context as _;
use chrono::Utc;
use dinorun_network::parse_layers;
use dinorun_training::{PopulationController, TrainingConfig, TrainingError};

use crate::{
    model::best_players::BestPlayersFile,
    util::{self, Output},
};

const DEFAULT_MODEL_NAME: &str = "dinorun";

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration file (JSON format)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations to run
    #[arg(long)]
    generations: Option<usize>,
    /// Number of agents per generation
    #[arg(long)]
    population: Option<usize>,
    /// Seed for networks, breeding and obstacles
    #[arg(long)]
    seed: Option<u64>,
    /// Hidden and output layers as WIDTHxREPEAT, e.g. `3x1,4x1`
    #[arg(long)]
    layers: Option<String>,
    /// Maximum ticks per generation
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Name stored in the output file
    #[arg(long)]
    name: Option<String>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn load_config(&self) -> anyhow::Result<TrainingConfig> {
        let mut config: TrainingConfig = match &self.config {
            Some(path) => util::read_json_file("training config", path)?,
            None => TrainingConfig::default(),
        };
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(population) = self.population {
            config.population = population;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(layers) = &self.layers {
            config.layers = parse_layers(layers)?;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.limits.max_ticks = Some(max_ticks);
        }
        Ok(config)
    }
}

/// Errors after which the completed generations are still saved.
fn stops_training(err: &TrainingError) -> bool {
    matches!(err, TrainingError::DidNotConverge { .. })
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.load_config()?;
    let topology = config.topology()?;
    config.game.validate()?;

    eprintln!(
        "Training {} agents for {} generations ({} parameters each)",
        config.population,
        config.generations,
        topology.parameter_count()
    );

    // Training is only interrupted by the tick budget.
    let cancel = AtomicBool::new(false);
    let mut controller = PopulationController::new(&config)?;
    for generation in 0..config.generations {
        eprintln!("Generation #{generation}:");
        let report = match controller.run_generation(config.dt, &config.limits, &cancel) {
            Ok(report) => report,
            Err(err) if stops_training(&err) => {
                eprintln!("  Stopped: {err}");
                break;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Generation #{generation} failed"));
            }
        };

        let summary = &report.summary;
        eprintln!("  Ticks:  {}", report.ticks);
        eprintln!(
            "  Leader: agent {} => {:.3}",
            report.record.agent, report.record.fitness
        );
        eprintln!("  Score Stats:");
        eprintln!("    Min:    {:.3}", summary.min);
        eprintln!("    Max:    {:.3}", summary.max);
        eprintln!("    Mean:   {:.3}", summary.mean);
        eprintln!("    Median: {:.3}", summary.median);
        eprintln!("    Stddev: {:.3}", summary.std_dev);
    }

    let records = controller.best_players().to_vec();
    anyhow::ensure!(!records.is_empty(), "No generation completed; nothing to save");

    eprintln!("Best Players:");
    for record in &records {
        eprintln!(
            "  {:3}: agent {:3} => {:.3}",
            record.generation, record.agent, record.fitness
        );
    }

    let name = arg
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_owned());
    let file = BestPlayersFile::new(name, Utc::now(), &config, records)?;
    Output::save_json(&file, arg.output.clone())?;

    eprintln!();
    eprintln!("Best players saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", file.name);
    eprintln!("  Trained at: {}", file.trained_at);
    eprintln!("  Generations: {}", file.records.len());

    Ok(())
}
