//! Batched feed-forward networks for a population of agents.
//!
//! Every agent owns an independent set of weights and biases, but all agents
//! share one [`Topology`]. Parameters are stored per layer as stacked tensors
//! ([`NetworkParameters`]) so a whole population can be evaluated with one
//! call to [`NetworkEvaluator::forward`]. Single agents are copied in and out
//! as [`Genome`]s.
//!
//! # Example
//!
//! ```
//! use dinorun_network::{Activation, LayerSpec, NetworkEvaluator, Objective, Topology};
//! use rand::SeedableRng as _;
//!
//! let topology = Topology::new(5, vec![LayerSpec::new(3, 1), LayerSpec::new(4, 1)]).unwrap();
//! let mut evaluator =
//!     NetworkEvaluator::new(2, topology, Activation::default(), Activation::default()).unwrap();
//! evaluator.randomize(&mut rand::rngs::StdRng::seed_from_u64(0));
//!
//! let features = [[1.0; 5], [0.0, 1.0, 2.0, 3.0, 4.0]];
//! let output = evaluator.forward(&features, Objective::Maximize).unwrap();
//! assert_eq!(output.shape(), [2, 4, 1]);
//! ```

pub use self::{activation::*, evaluator::*, genome::*, parameters::*, topology::*};

mod activation;
mod evaluator;
mod genome;
mod parameters;
mod topology;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("network parameters used before initialization")]
    Uninitialized,
    #[display("population must contain at least one agent")]
    NoAgents,
    #[display("topology must contain at least one layer")]
    EmptyTopology,
    #[display("layer width must be positive")]
    ZeroWidth,
    #[display("{what} mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display(
        "network must map {expected_inputs} inputs to {expected_outputs} outputs (got {inputs} to {outputs})"
    )]
    InvalidOutputWidth {
        expected_inputs: usize,
        expected_outputs: usize,
        inputs: usize,
        outputs: usize,
    },
    #[display("layer shape mismatch: expected {expected:?}, got {actual:?}")]
    LayerShapeMismatch {
        expected: LayerShape,
        actual: LayerShape,
    },
    #[display("agent index {index} out of range for population of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[display("invalid layer spec `{spec}`; expected WIDTHxREPEAT")]
    InvalidLayerSpec { spec: String },
    #[display("unknown activation `{name}`")]
    UnknownActivation { name: String },
}
