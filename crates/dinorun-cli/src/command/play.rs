use std::{
    io::{self, BufRead as _},
    path::PathBuf,
};

use anyhow::Context as _;
use dinorun_engine::{Action, Environment, EnvironmentSnapshot, GameConfig, SpawnSeed};
use dinorun_training::PopulationController;
use rand::Rng as _;
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Game configuration file (JSON format)
    #[arg(long, conflicts_with = "versus")]
    config: Option<PathBuf>,
    /// Race the best player of this file (JSON format)
    #[arg(long)]
    versus: Option<PathBuf>,
    /// Time step per input line
    #[arg(long, default_value_t = 0.1)]
    dt: f64,
    /// Seed for the obstacle stream
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Act(Action),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let input = match line.trim() {
        "" => Input::Act(Action::NoAction),
        "j" => Input::Act(Action::Jump),
        "d" => Input::Act(Action::Duck),
        "u" => Input::Act(Action::Unduck),
        "q" => Input::Quit,
        _ => return None,
    };
    Some(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
enum Winner {
    #[display("human")]
    Human,
    #[display("computer")]
    Computer,
}

impl Winner {
    /// The computer only wins by outliving the human.
    fn decide(human_alive: bool, computer_alive: bool) -> Self {
        if computer_alive && !human_alive {
            Self::Computer
        } else {
            Self::Human
        }
    }
}

#[derive(Debug, Serialize)]
struct VersusFrame {
    human: EnvironmentSnapshot,
    computer: EnvironmentSnapshot,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        config,
        versus,
        dt,
        seed,
    } = arg;

    let mut computer = match versus {
        Some(path) => {
            let file = util::read_best_players_file(path)?;
            let record = file.best_record()?;
            eprintln!(
                "Racing generation #{} (fitness {:.3}) from {}",
                record.generation,
                record.fitness,
                path.display()
            );
            let config = file.training_config(1, *seed);
            Some(PopulationController::with_genome(&config, &record.genome)?)
        }
        None => None,
    };

    let config: GameConfig = match (config, &computer) {
        (Some(path), _) => util::read_json_file("game config", path)?,
        (None, Some(computer)) => computer.environments()[0].config().clone(),
        (None, None) => GameConfig::default(),
    };
    let seed = match seed {
        Some(seed) => SpawnSeed::from_bytes(u128::from(*seed).to_be_bytes()),
        None => rand::rng().random(),
    };
    let mut env = Environment::new(&config, seed)?;
    let mut output = Output::stdout();

    eprintln!("One line per tick: j = jump, d = duck, u = unduck, empty = no action, q = quit");
    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        let action = match parse_input(&line) {
            Some(Input::Act(action)) => action,
            Some(Input::Quit) => break,
            None => {
                eprintln!("Unknown command: {}", line.trim());
                continue;
            }
        };
        env.tick(*dt);
        env.apply_action(action);

        let Some(computer) = &mut computer else {
            output.write_json_line(&env.snapshot())?;
            if !env.is_alive() {
                break;
            }
            continue;
        };
        computer.tick(*dt)?;
        output.write_json_line(&VersusFrame {
            human: env.snapshot(),
            computer: computer.environments()[0].snapshot(),
        })?;
        if !env.is_alive() || computer.alive_count() == 0 {
            break;
        }
    }

    eprintln!("Final score: {:.3}", env.score());
    if let Some(computer) = &computer {
        let opponent = &computer.environments()[0];
        let winner = Winner::decide(env.is_alive(), opponent.is_alive());
        eprintln!("Computer score: {:.3}", opponent.score());
        eprintln!("Winner: {winner}");
    }
    Ok(())
}
