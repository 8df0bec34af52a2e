use rand::Rng;

use crate::{Genome, LayerShape, Matrix, NetworkError, Topology};

/// Parameters of one layer for every agent of a population.
///
/// Weights have shape `(agents, outputs, inputs)` and biases
/// `(agents, outputs, 1)`, both stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerParameters {
    shape: LayerShape,
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl LayerParameters {
    /// Builds a layer from flat tensors, checking both lengths.
    pub fn from_vecs(
        shape: LayerShape,
        agents: usize,
        weights: Vec<f64>,
        biases: Vec<f64>,
    ) -> Result<Self, NetworkError> {
        if weights.len() != agents * shape.weight_len() {
            return Err(NetworkError::ShapeMismatch {
                what: "batched weights",
                expected: agents * shape.weight_len(),
                actual: weights.len(),
            });
        }
        if biases.len() != agents * shape.bias_len() {
            return Err(NetworkError::ShapeMismatch {
                what: "batched biases",
                expected: agents * shape.bias_len(),
                actual: biases.len(),
            });
        }
        Ok(Self {
            shape,
            weights,
            biases,
        })
    }

    #[must_use]
    pub fn shape(&self) -> LayerShape {
        self.shape
    }

    /// All weights, agent-major.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// All biases, agent-major.
    #[must_use]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Weight matrix of `agent`, row-major `outputs × inputs`.
    ///
    /// # Panics
    ///
    /// Panics if `agent` is not below the number of agents.
    #[must_use]
    pub fn agent_weights(&self, agent: usize) -> &[f64] {
        let len = self.shape.weight_len();
        &self.weights[agent * len..(agent + 1) * len]
    }

    /// Bias column of `agent`.
    ///
    /// # Panics
    ///
    /// Panics if `agent` is not below the number of agents.
    #[must_use]
    pub fn agent_biases(&self, agent: usize) -> &[f64] {
        let len = self.shape.bias_len();
        &self.biases[agent * len..(agent + 1) * len]
    }
}

/// Parameters of every layer for every agent of a population.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkParameters {
    agents: usize,
    layers: Vec<LayerParameters>,
}

impl NetworkParameters {
    /// Assembles parameters from layers, checking that each agrees with `agents`.
    pub fn new(agents: usize, layers: Vec<LayerParameters>) -> Result<Self, NetworkError> {
        for layer in &layers {
            let expected = agents * layer.shape.weight_len();
            if layer.weights.len() != expected {
                return Err(NetworkError::ShapeMismatch {
                    what: "batched weights",
                    expected,
                    actual: layer.weights.len(),
                });
            }
            let expected = agents * layer.shape.bias_len();
            if layer.biases.len() != expected {
                return Err(NetworkError::ShapeMismatch {
                    what: "batched biases",
                    expected,
                    actual: layer.biases.len(),
                });
            }
        }
        Ok(Self { agents, layers })
    }

    /// Samples every weight and bias uniformly from `[-1, 1]`.
    pub fn random<R>(rng: &mut R, agents: usize, topology: &Topology) -> Self
    where
        R: Rng + ?Sized,
    {
        let layers = topology
            .shapes()
            .iter()
            .map(|&shape| {
                let weights = (0..agents * shape.weight_len())
                    .map(|_| rng.random_range(-1.0..=1.0))
                    .collect();
                let biases = (0..agents * shape.bias_len())
                    .map(|_| rng.random_range(-1.0..=1.0))
                    .collect();
                LayerParameters {
                    shape,
                    weights,
                    biases,
                }
            })
            .collect();
        Self { agents, layers }
    }

    /// Stacks one genome per agent into batched tensors.
    pub fn from_genomes(topology: &Topology, genomes: &[Genome]) -> Result<Self, NetworkError> {
        for genome in genomes {
            genome.check_shape(topology)?;
        }
        let layers = topology
            .shapes()
            .iter()
            .enumerate()
            .map(|(i, &shape)| LayerParameters {
                shape,
                weights: genomes
                    .iter()
                    .flat_map(|g| g.weights[i].as_slice())
                    .copied()
                    .collect(),
                biases: genomes
                    .iter()
                    .flat_map(|g| g.biases[i].as_slice())
                    .copied()
                    .collect(),
            })
            .collect();
        Ok(Self {
            agents: genomes.len(),
            layers,
        })
    }

    #[must_use]
    pub fn agents(&self) -> usize {
        self.agents
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerParameters] {
        &self.layers
    }

    #[must_use]
    pub fn shapes(&self) -> Vec<LayerShape> {
        self.layers.iter().map(|l| l.shape).collect()
    }

    /// Copies out the parameters of one agent.
    pub fn genome(&self, agent: usize) -> Result<Genome, NetworkError> {
        if agent >= self.agents {
            return Err(NetworkError::IndexOutOfRange {
                index: agent,
                len: self.agents,
            });
        }
        let mut weights = Vec::with_capacity(self.layers.len());
        let mut biases = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let shape = layer.shape;
            weights.push(Matrix::from_vec(
                shape.outputs,
                shape.inputs,
                layer.agent_weights(agent).to_vec(),
            )?);
            biases.push(Matrix::from_vec(
                shape.outputs,
                1,
                layer.agent_biases(agent).to_vec(),
            )?);
        }
        Ok(Genome { weights, biases })
    }

    /// Checks these parameters against a topology and population size.
    pub fn check_shape(&self, topology: &Topology, agents: usize) -> Result<(), NetworkError> {
        if self.agents != agents {
            return Err(NetworkError::ShapeMismatch {
                what: "agent count",
                expected: agents,
                actual: self.agents,
            });
        }
        if self.layers.len() != topology.depth() {
            return Err(NetworkError::ShapeMismatch {
                what: "layer count",
                expected: topology.depth(),
                actual: self.layers.len(),
            });
        }
        for (layer, &shape) in self.layers.iter().zip(topology.shapes()) {
            if layer.shape != shape {
                return Err(NetworkError::LayerShapeMismatch {
                    expected: shape,
                    actual: layer.shape,
                });
            }
        }
        Ok(())
    }
}
