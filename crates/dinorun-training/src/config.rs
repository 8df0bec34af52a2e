use dinorun_engine::{ACTION_COUNT, FEATURE_COUNT, GameConfig};
use dinorun_network::{Activation, LayerSpec, NetworkError, Objective, Topology};
use serde::{Deserialize, Serialize};

use crate::MutationShape;

/// Stop conditions for one generation besides extinction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunLimits {
    /// Maximum number of ticks per generation.
    pub max_ticks: Option<u64>,
    /// Maximum wall-clock time per generation, in seconds.
    pub max_seconds: Option<f64>,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_ticks: Some(200_000),
            max_seconds: None,
        }
    }
}

impl RunLimits {
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_ticks: None,
            max_seconds: None,
        }
    }
}

/// Everything needed to set up and run a training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of agents per generation.
    pub population: usize,
    /// Hidden and output layers; the last entry must have width 4.
    pub layers: Vec<LayerSpec>,
    pub hidden_activation: Activation,
    pub output_activation: Activation,
    pub mutation: MutationShape,
    pub objective: Objective,
    /// Time step of every tick.
    pub dt: f64,
    pub generations: usize,
    pub limits: RunLimits,
    /// Seed for network initialization, breeding and obstacle streams.
    /// A random seed is used when absent.
    pub seed: Option<u64>,
    pub game: GameConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population: 50,
            layers: vec![LayerSpec::new(3, 1), LayerSpec::new(4, 1)],
            hidden_activation: Activation::default(),
            output_activation: Activation::default(),
            mutation: MutationShape::default(),
            objective: Objective::Maximize,
            dt: 0.01,
            generations: 10,
            limits: RunLimits::default(),
            seed: None,
            game: GameConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Builds the topology and checks that it maps features to actions.
    pub fn topology(&self) -> Result<Topology, NetworkError> {
        let topology = Topology::new(FEATURE_COUNT, self.layers.clone())?;
        if topology.output_width() != ACTION_COUNT {
            return Err(NetworkError::InvalidOutputWidth {
                expected_inputs: FEATURE_COUNT,
                expected_outputs: ACTION_COUNT,
                inputs: topology.input_width(),
                outputs: topology.output_width(),
            });
        }
        Ok(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_topology() {
        let topology = TrainingConfig::default().topology().unwrap();
        assert_eq!(topology.input_width(), 5);
        assert_eq!(topology.output_width(), 4);
        assert_eq!(topology.depth(), 2);
    }

    #[test]
    fn test_output_width_must_match_actions() {
        let config = TrainingConfig {
            layers: vec![LayerSpec::new(3, 1), LayerSpec::new(2, 1)],
            ..TrainingConfig::default()
        };
        assert!(matches!(
            config.topology(),
            Err(NetworkError::InvalidOutputWidth { outputs: 2, .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{ "population": 8, "limits": { "max_seconds": 2.5 } }"#)
                .unwrap();
        assert_eq!(config.population, 8);
        assert_eq!(config.limits.max_ticks, Some(200_000));
        assert_eq!(config.limits.max_seconds, Some(2.5));
        assert_eq!(config.dt, 0.01);
        assert_eq!(config.game, GameConfig::default());
    }
}
