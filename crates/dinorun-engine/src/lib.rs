//! Deterministic obstacle-course simulation.
//!
//! One [`Environment`] holds one [`Agent`] and a single active [`Obstacle`].
//! Each call to [`Environment::tick`] advances the score, runs the collision
//! test against the active obstacle, integrates the agent's vertical motion and
//! moves the obstacle towards the agent. Obstacles speed up by one unit every
//! [`GameConfig::speed_acceleration_period`] score units.
//!
//! Agents are steered with four discrete [`Action`]s. The network-facing view
//! of an environment is its 5-element [`Features`] vector; the renderer-facing
//! view is an [`EnvironmentSnapshot`].
//!
//! # Example
//!
//! ```
//! use dinorun_engine::{Action, Environment, GameConfig, SpawnSeed};
//!
//! let mut env = Environment::new(&GameConfig::default(), SpawnSeed::from_bytes([7; 16])).unwrap();
//! while env.is_alive() {
//!     env.tick(0.1);
//!     env.apply_action(Action::NoAction);
//! }
//! println!("final score: {}", env.score());
//! ```

pub use self::{
    action::*, agent::*, collision::*, config::*, environment::*, obstacle::*, seed::*,
};

mod action;
mod agent;
mod collision;
mod config;
mod environment;
mod obstacle;
mod seed;

/// Invalid [`GameConfig`] detected before a simulation starts.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{what} must not be negative (got {width}x{height})")]
    NegativeSize {
        what: &'static str,
        width: f64,
        height: f64,
    },
    #[display("{what} must be finite")]
    NonFiniteValue { what: &'static str },
    #[display("{what} must be positive (got {value})")]
    NonPositiveDivisor { what: &'static str, value: f64 },
    #[display("{what} must not be negative (got {value})")]
    NegativeValue { what: &'static str, value: f64 },
    #[display("{what} must be positive (got {value})")]
    NonPositiveValue { what: &'static str, value: f64 },
}
