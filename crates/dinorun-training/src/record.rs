use dinorun_network::Genome;
use serde::{Deserialize, Serialize};

/// The leader of one generation: its final score and the parameters it ran with.
///
/// Serialized flat as `{ generation, agent, fitness, weights, biases }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    /// Index of the leading agent within its population.
    pub agent: usize,
    /// Final score of the leading agent.
    pub fitness: f64,
    #[serde(flatten)]
    pub genome: Genome,
}
