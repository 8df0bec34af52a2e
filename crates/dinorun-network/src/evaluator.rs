use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Activation, Genome, NetworkError, NetworkParameters, Topology};

/// Which extreme of the output vector selects the action.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    Maximize,
    Minimize,
}

impl Objective {
    /// Index of the selected element; ties resolve to the lowest index.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn select(self, values: &[f64]) -> Option<usize> {
        let (first, rest) = values.split_first()?;
        let mut best = (0, *first);
        for (i, &v) in rest.iter().enumerate() {
            let better = match self {
                Self::Maximize => v > best.1,
                Self::Minimize => v < best.1,
            };
            if better {
                best = (i + 1, v);
            }
        }
        Some(best.0)
    }
}

/// Result of one batched forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardOutput {
    actions: Vec<usize>,
    outputs: Vec<f64>,
    width: usize,
}

impl ForwardOutput {
    /// Selected output index per agent, shape `(N,)`.
    #[must_use]
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    /// Raw output activations, agent-major.
    #[must_use]
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    /// Output column of one agent.
    ///
    /// # Panics
    ///
    /// Panics if `agent` is not below the batch size.
    #[must_use]
    pub fn agent_outputs(&self, agent: usize) -> &[f64] {
        &self.outputs[agent * self.width..(agent + 1) * self.width]
    }

    /// Shape of the raw outputs as `(N, width, 1)`.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        [self.actions.len(), self.width, 1]
    }
}

/// Batched feed-forward inference over `agents` networks sharing one topology.
///
/// The evaluator starts without parameters; [`forward`](Self::forward) and
/// [`genome`](Self::genome) fail with [`NetworkError::Uninitialized`] until
/// [`randomize`](Self::randomize), [`set_all_genomes`](Self::set_all_genomes) or
/// [`set_parameters`](Self::set_parameters) has been called.
#[derive(Debug, Clone)]
pub struct NetworkEvaluator {
    agents: usize,
    topology: Topology,
    hidden_activation: Activation,
    output_activation: Activation,
    parameters: Option<NetworkParameters>,
}

impl NetworkEvaluator {
    pub fn new(
        agents: usize,
        topology: Topology,
        hidden_activation: Activation,
        output_activation: Activation,
    ) -> Result<Self, NetworkError> {
        if agents == 0 {
            return Err(NetworkError::NoAgents);
        }
        Ok(Self {
            agents,
            topology,
            hidden_activation,
            output_activation,
            parameters: None,
        })
    }

    #[must_use]
    pub fn agents(&self) -> usize {
        self.agents
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[must_use]
    pub fn hidden_activation(&self) -> Activation {
        self.hidden_activation
    }

    #[must_use]
    pub fn output_activation(&self) -> Activation {
        self.output_activation
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.parameters.is_some()
    }

    pub fn parameters(&self) -> Result<&NetworkParameters, NetworkError> {
        self.parameters.as_ref().ok_or(NetworkError::Uninitialized)
    }

    /// Draws fresh parameters uniformly from `[-1, 1]`.
    pub fn randomize<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.parameters = Some(NetworkParameters::random(rng, self.agents, &self.topology));
    }

    /// Replaces all parameters at once.
    pub fn set_parameters(&mut self, parameters: NetworkParameters) -> Result<(), NetworkError> {
        parameters.check_shape(&self.topology, self.agents)?;
        self.parameters = Some(parameters);
        Ok(())
    }

    /// Replaces all parameters with one genome per agent.
    pub fn set_all_genomes(&mut self, genomes: &[Genome]) -> Result<(), NetworkError> {
        if genomes.len() != self.agents {
            return Err(NetworkError::ShapeMismatch {
                what: "genome count",
                expected: self.agents,
                actual: genomes.len(),
            });
        }
        let parameters = NetworkParameters::from_genomes(&self.topology, genomes)?;
        self.parameters = Some(parameters);
        Ok(())
    }

    /// Copies out the parameters of `agent`.
    pub fn genome(&self, agent: usize) -> Result<Genome, NetworkError> {
        self.parameters()?.genome(agent)
    }

    /// Runs every agent's network on its own input row.
    ///
    /// Each layer computes `activation(W @ x + b)`; hidden layers use the hidden
    /// activation and the last layer the output activation. Sums run in input
    /// order for every agent, so results do not depend on the batch size.
    pub fn forward<I>(&self, inputs: &[I], objective: Objective) -> Result<ForwardOutput, NetworkError>
    where
        I: AsRef<[f64]>,
    {
        let parameters = self.parameters()?;
        if inputs.len() != self.agents {
            return Err(NetworkError::ShapeMismatch {
                what: "batch size",
                expected: self.agents,
                actual: inputs.len(),
            });
        }

        let width = self.topology.output_width();
        let depth = parameters.layers().len();
        let mut actions = Vec::with_capacity(self.agents);
        let mut outputs = Vec::with_capacity(self.agents * width);
        let mut x = Vec::new();
        let mut y = Vec::new();

        for (agent, input) in inputs.iter().enumerate() {
            let input = input.as_ref();
            if input.len() != self.topology.input_width() {
                return Err(NetworkError::ShapeMismatch {
                    what: "feature count",
                    expected: self.topology.input_width(),
                    actual: input.len(),
                });
            }
            x.clear();
            x.extend_from_slice(input);

            for (i, layer) in parameters.layers().iter().enumerate() {
                let activation = if i + 1 < depth {
                    self.hidden_activation
                } else {
                    self.output_activation
                };
                let shape = layer.shape();
                let weights = layer.agent_weights(agent);
                let biases = layer.agent_biases(agent);
                y.clear();
                y.extend(weights.chunks(shape.inputs).zip(biases).map(|(row, b)| {
                    let sum = row.iter().zip(&x).fold(0.0, |acc, (w, v)| acc + w * v);
                    activation.apply(sum + b)
                }));
                std::mem::swap(&mut x, &mut y);
            }

            // Output width is non-zero, so selection always succeeds.
            actions.push(objective.select(&x).unwrap_or(0));
            outputs.extend_from_slice(&x);
        }

        Ok(ForwardOutput {
            actions,
            outputs,
            width,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{LayerParameters, LayerShape, LayerSpec, Matrix};

    fn topology() -> Topology {
        Topology::new(5, vec![LayerSpec::new(3, 1), LayerSpec::new(4, 1)]).unwrap()
    }

    fn evaluator(agents: usize) -> NetworkEvaluator {
        NetworkEvaluator::new(
            agents,
            topology(),
            Activation::default(),
            Activation::default(),
        )
        .unwrap()
    }

    mod selection {
        use super::*;

        #[test]
        fn test_ties_resolve_to_lowest_index() {
            let values = [0.5, 0.5, 0.1, 0.1];
            assert_eq!(Objective::Maximize.select(&values), Some(0));
            assert_eq!(Objective::Minimize.select(&values), Some(2));
        }

        #[test]
        fn test_select_extremes() {
            let values = [0.2, -1.0, 3.0, 3.0];
            assert_eq!(Objective::Maximize.select(&values), Some(2));
            assert_eq!(Objective::Minimize.select(&values), Some(1));
            assert_eq!(Objective::Maximize.select(&[]), None);
        }

        #[test]
        fn test_parse_objective() {
            assert_eq!("Maximize".parse::<Objective>().unwrap(), Objective::Maximize);
            assert_eq!("Minimize".parse::<Objective>().unwrap(), Objective::Minimize);
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn test_forward_before_init_fails() {
            let evaluator = evaluator(2);
            let inputs = vec![[0.0; 5]; 2];
            assert!(matches!(
                evaluator.forward(&inputs, Objective::Maximize),
                Err(NetworkError::Uninitialized)
            ));
            assert!(matches!(evaluator.genome(0), Err(NetworkError::Uninitialized)));
        }

        #[test]
        fn test_zero_agents_rejected() {
            assert!(matches!(
                NetworkEvaluator::new(0, topology(), Activation::Relu, Activation::Relu),
                Err(NetworkError::NoAgents)
            ));
        }

        #[test]
        fn test_set_all_genomes_checks_count_and_shape() {
            let mut rng = Pcg32::seed_from_u64(9);
            let mut source = evaluator(3);
            source.randomize(&mut rng);
            let genomes = (0..3)
                .map(|i| source.genome(i).unwrap())
                .collect::<Vec<_>>();

            let mut target = evaluator(3);
            target.set_all_genomes(&genomes).unwrap();
            assert_eq!(target.parameters().unwrap(), source.parameters().unwrap());

            let mut wrong_count = evaluator(2);
            assert!(wrong_count.set_all_genomes(&genomes).is_err());
            assert!(!wrong_count.is_initialized());

            let mut truncated = genomes.clone();
            truncated[1].weights.pop();
            assert!(matches!(
                target.set_all_genomes(&truncated),
                Err(NetworkError::ShapeMismatch { .. })
            ));
        }

        #[test]
        fn test_genome_out_of_range() {
            let mut rng = Pcg32::seed_from_u64(10);
            let mut evaluator = evaluator(2);
            evaluator.randomize(&mut rng);
            assert!(matches!(
                evaluator.genome(5),
                Err(NetworkError::IndexOutOfRange { index: 5, len: 2 })
            ));
        }
    }

    mod forward {
        use super::*;

        #[test]
        fn test_output_shapes() {
            let mut rng = Pcg32::seed_from_u64(11);
            let mut evaluator = evaluator(7);
            evaluator.randomize(&mut rng);
            let inputs = (0..7)
                .map(|i| [f64::from(i), 1.0, 2.0, 0.0, 1.0])
                .collect::<Vec<_>>();
            let out = evaluator.forward(&inputs, Objective::Maximize).unwrap();
            assert_eq!(out.actions().len(), 7);
            assert_eq!(out.shape(), [7, 4, 1]);
            assert!(out.actions().iter().all(|&a| a < 4));
            for agent in 0..7 {
                assert_eq!(
                    Some(out.actions()[agent]),
                    Objective::Maximize.select(out.agent_outputs(agent))
                );
            }
        }

        #[test]
        fn test_wrong_feature_count() {
            let mut rng = Pcg32::seed_from_u64(12);
            let mut evaluator = evaluator(1);
            evaluator.randomize(&mut rng);
            let inputs = vec![vec![0.0; 4]];
            assert!(matches!(
                evaluator.forward(&inputs, Objective::Maximize),
                Err(NetworkError::ShapeMismatch {
                    what: "feature count",
                    ..
                })
            ));
        }

        #[test]
        fn test_hand_computed_network() {
            // 2 inputs -> 2 hidden (relu) -> 2 outputs (identity)
            let topology = Topology::new(2, vec![LayerSpec::new(2, 1), LayerSpec::new(2, 1)]).unwrap();
            let mut evaluator =
                NetworkEvaluator::new(1, topology, Activation::Relu, Activation::Identity).unwrap();
            let genome = Genome {
                weights: vec![
                    Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, -1.0]).unwrap(),
                    Matrix::from_vec(2, 2, vec![1.0, 1.0, 2.0, 0.0]).unwrap(),
                ],
                biases: vec![
                    Matrix::from_vec(2, 1, vec![0.0, 0.0]).unwrap(),
                    Matrix::from_vec(2, 1, vec![0.5, -0.5]).unwrap(),
                ],
            };
            evaluator.set_all_genomes(&[genome]).unwrap();

            // hidden = relu([3, -2]) = [3, 0]; out = [3 + 0.5, 6 - 0.5]
            let out = evaluator
                .forward(&[[3.0, 2.0]], Objective::Maximize)
                .unwrap();
            assert_eq!(out.agent_outputs(0), &[3.5, 5.5]);
            assert_eq!(out.actions(), &[1]);

            let out = evaluator
                .forward(&[[3.0, 2.0]], Objective::Minimize)
                .unwrap();
            assert_eq!(out.actions(), &[0]);
        }

        #[test]
        #[should_panic]
        fn test_agent_outputs_out_of_range() {
            let mut evaluator = evaluator(2);
            evaluator.randomize(&mut Pcg32::seed_from_u64(1));
            let out = evaluator
                .forward(&vec![[0.0; 5]; 2], Objective::Maximize)
                .unwrap();
            let _ = out.agent_outputs(2);
        }

        #[test]
        fn test_agents_are_independent_of_batch() {
            let mut rng = Pcg32::seed_from_u64(13);
            let mut batch = evaluator(3);
            batch.randomize(&mut rng);
            let inputs = [
                [10.0, 0.0, 71.0, 0.0, 0.0],
                [250.0, 65.0, 62.0, 1.0, 0.0],
                [-5.0, -20.0, 95.0, 0.0, 1.0],
            ];
            let out = batch.forward(&inputs, Objective::Maximize).unwrap();

            for agent in 0..3 {
                let mut single = evaluator(1);
                single
                    .set_all_genomes(&[batch.genome(agent).unwrap()])
                    .unwrap();
                let solo = single
                    .forward(&inputs[agent..=agent], Objective::Maximize)
                    .unwrap();
                assert_eq!(solo.agent_outputs(0), out.agent_outputs(agent));
            }
        }

        #[test]
        fn test_set_parameters_rejects_mismatch() {
            let shape = LayerShape {
                inputs: 5,
                outputs: 4,
            };
            let layer = LayerParameters::from_vecs(shape, 1, vec![0.0; 20], vec![0.0; 4]).unwrap();
            let params = NetworkParameters::new(1, vec![layer]).unwrap();
            let mut evaluator = evaluator(1);
            assert!(evaluator.set_parameters(params).is_err());
        }
    }
}
