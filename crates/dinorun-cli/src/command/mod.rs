use clap::{Parser, Subcommand};

use self::{play::PlayArg, replay::ReplayArg, train::TrainArg};

mod play;
mod replay;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve runner networks using the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Run a saved best player until it dies
    Replay(#[clap(flatten)] ReplayArg),
    /// Drive a single environment from stdin
    Play(#[clap(flatten)] PlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Train(TrainArg::default())) {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
    }
    Ok(())
}
