//! Genetic training of runner networks.
//!
//! A [`PopulationController`] owns one [`Environment`](dinorun_engine::Environment)
//! per agent and a single batched
//! [`NetworkEvaluator`](dinorun_network::NetworkEvaluator). Each tick it steps
//! every environment, evaluates all networks on the collected features and
//! feeds the chosen actions back. When every agent has died, the
//! [`GeneticOperator`] breeds the next generation from the most recent one or
//! two leaders.
//!
//! # Generation cycle
//!
//! 1. [`PopulationController::run_until_extinct`] ticks until all agents are dead,
//!    bounded by [`RunLimits`] and a cancellation flag.
//! 2. [`PopulationController::evolve`] records the leader as a
//!    [`GenerationRecord`] and replaces every genome with offspring.
//! 3. [`PopulationController::reset_all`] restarts every environment.
//!
//! [`PopulationController::run_generation`] performs all three steps.
//!
//! # Breeding
//!
//! Every scalar of every offspring is copied from a parent chosen uniformly at
//! random, perturbed by a [`MutationShape`] applied to uniform noise in
//! `[-1, 1]`, and finally passed through [`zigzag`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//!
//! use dinorun_training::{PopulationController, TrainingConfig};
//!
//! let config = TrainingConfig {
//!     seed: Some(42),
//!     ..TrainingConfig::default()
//! };
//! let mut controller = PopulationController::new(&config)?;
//! let cancel = AtomicBool::new(false);
//! for _ in 0..config.generations {
//!     let report = controller.run_generation(config.dt, &config.limits, &cancel)?;
//!     println!("{}: {:.1}", report.record.generation, report.record.fitness);
//! }
//! # Ok::<(), dinorun_training::TrainingError>(())
//! ```

use dinorun_engine::ConfigError;
use dinorun_network::NetworkError;

pub use self::{
    config::*, fold::*, genetic::*, mutation::*, population::*, record::*, summary::*,
};

mod config;
mod fold;
mod genetic;
mod mutation;
mod population;
mod record;
mod summary;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("network error: {_0}")]
    #[from]
    Network(NetworkError),
    #[display("invalid game configuration: {_0}")]
    #[from]
    Config(ConfigError),
    #[display("population must contain at least one agent")]
    EmptyPopulation,
    #[display("expected one or two distinct parents, got {parents:?}")]
    InvalidParents { parents: Vec<usize> },
    #[display("parent index {index} out of range for population of {len}")]
    ParentOutOfRange { index: usize, len: usize },
    #[display("population did not go extinct within {ticks} ticks")]
    DidNotConverge { ticks: u64 },
    #[display("run cancelled after {ticks} ticks")]
    Cancelled { ticks: u64 },
}
