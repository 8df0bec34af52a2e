use std::path::PathBuf;

use dinorun_training::{GenerationRecord, PopulationController};

use crate::{
    model::best_players::BestPlayersFile,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the best players file (JSON format)
    best_players_file: PathBuf,
    /// Generation record to replay (defaults to the best one)
    #[arg(long, conflicts_with = "all")]
    index: Option<usize>,
    /// Replay every generation's leader in order
    #[arg(long)]
    all: bool,
    /// Print one JSON snapshot per tick to stdout
    #[arg(long)]
    trace: bool,
    /// Time step per tick (defaults to the one used in training)
    #[arg(long)]
    dt: Option<f64>,
    /// Give up after this many ticks
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,
    /// Seed for the obstacle stream
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct ReplayResult {
    ticks: u64,
    score: f64,
    alive: bool,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    eprintln!("Loading best players from {}", arg.best_players_file.display());
    let file = util::read_best_players_file(&arg.best_players_file)?;
    let dt = arg.dt.unwrap_or(file.dt);
    let mut output = arg.trace.then(Output::stdout);

    if arg.all {
        eprintln!("Replaying {} generations", file.records.len());
        for record in &file.records {
            let result = replay_record(&file, record, dt, arg, output.as_mut())?;
            eprintln!(
                "  {:3}: score {:10.3} (trained {:10.3}){}",
                record.generation,
                result.score,
                record.fitness,
                if result.alive { ", still alive" } else { "" }
            );
        }
        return Ok(());
    }

    let record = file.record(arg.index)?;
    eprintln!(
        "Replaying generation #{} (agent {}, fitness {:.3})",
        record.generation, record.agent, record.fitness
    );
    let result = replay_record(&file, record, dt, arg, output.as_mut())?;

    eprintln!();
    eprintln!("Replay finished");
    eprintln!("  Ticks: {}", result.ticks);
    eprintln!("  Final score: {:.3}", result.score);
    if result.alive {
        eprintln!("  Tick budget exhausted; the agent is still alive");
    }
    Ok(())
}

fn replay_record(
    file: &BestPlayersFile,
    record: &GenerationRecord,
    dt: f64,
    arg: &ReplayArg,
    mut output: Option<&mut Output>,
) -> anyhow::Result<ReplayResult> {
    let config = file.training_config(1, arg.seed);
    let mut controller = PopulationController::with_genome(&config, &record.genome)?;

    let mut ticks = 0;
    while controller.alive_count() > 0 && ticks < arg.max_ticks {
        controller.tick(dt)?;
        ticks += 1;
        if let Some(output) = output.as_deref_mut() {
            output.write_json_line(&controller.environments()[0].snapshot())?;
        }
    }

    let env = &controller.environments()[0];
    Ok(ReplayResult {
        ticks,
        score: env.score(),
        alive: env.is_alive(),
    })
}
