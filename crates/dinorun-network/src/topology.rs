use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::NetworkError;

/// A run of `repeat` consecutive fully-connected layers of the same `width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub width: usize,
    pub repeat: usize,
}

impl LayerSpec {
    #[must_use]
    pub const fn new(width: usize, repeat: usize) -> Self {
        Self { width, repeat }
    }
}

impl fmt::Display for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.repeat)
    }
}

/// Parses `WIDTHxREPEAT`, e.g. `3x1`. A bare width means a repeat of 1.
impl FromStr for LayerSpec {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NetworkError::InvalidLayerSpec {
            spec: s.to_owned(),
        };
        let (width, repeat) = s.trim().split_once('x').unwrap_or((s.trim(), "1"));
        let width = width.parse().map_err(|_| invalid())?;
        let repeat = repeat.parse().map_err(|_| invalid())?;
        Ok(Self { width, repeat })
    }
}

/// Shape of one expanded layer: a weight matrix `outputs × inputs` and a bias
/// column `outputs × 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerShape {
    pub inputs: usize,
    pub outputs: usize,
}

impl LayerShape {
    #[must_use]
    pub const fn weight_len(self) -> usize {
        self.inputs * self.outputs
    }

    #[must_use]
    pub const fn bias_len(self) -> usize {
        self.outputs
    }
}

/// Network shape shared by every agent of a population.
///
/// The last [`LayerSpec`] is the output layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTopology", into = "RawTopology")]
pub struct Topology {
    input_width: usize,
    layers: Vec<LayerSpec>,
    shapes: Vec<LayerShape>,
}

#[derive(Serialize, Deserialize)]
struct RawTopology {
    input_width: usize,
    layers: Vec<LayerSpec>,
}

impl TryFrom<RawTopology> for Topology {
    type Error = NetworkError;

    fn try_from(raw: RawTopology) -> Result<Self, Self::Error> {
        Self::new(raw.input_width, raw.layers)
    }
}

impl From<Topology> for RawTopology {
    fn from(topology: Topology) -> Self {
        Self {
            input_width: topology.input_width,
            layers: topology.layers,
        }
    }
}

impl Topology {
    /// Validates the layer specs and expands repeats into per-layer shapes.
    ///
    /// # Example
    ///
    /// ```
    /// use dinorun_network::{LayerSpec, Topology};
    ///
    /// let topology = Topology::new(5, vec![LayerSpec::new(3, 2), LayerSpec::new(4, 1)]).unwrap();
    /// assert_eq!(topology.depth(), 3);
    /// assert_eq!(topology.output_width(), 4);
    /// ```
    pub fn new(input_width: usize, layers: Vec<LayerSpec>) -> Result<Self, NetworkError> {
        if input_width == 0 {
            return Err(NetworkError::ZeroWidth);
        }
        if layers.iter().map(|l| l.repeat).sum::<usize>() == 0 {
            return Err(NetworkError::EmptyTopology);
        }
        if layers.iter().any(|l| l.width == 0 && l.repeat > 0) {
            return Err(NetworkError::ZeroWidth);
        }

        let mut shapes = vec![];
        let mut prev = input_width;
        for spec in &layers {
            for _ in 0..spec.repeat {
                shapes.push(LayerShape {
                    inputs: prev,
                    outputs: spec.width,
                });
                prev = spec.width;
            }
        }
        Ok(Self {
            input_width,
            layers,
            shapes,
        })
    }

    #[must_use]
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    #[must_use]
    pub fn output_width(&self) -> usize {
        self.shapes.last().map_or(self.input_width, |s| s.outputs)
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    /// Expanded layer shapes, input to output.
    #[must_use]
    pub fn shapes(&self) -> &[LayerShape] {
        &self.shapes
    }

    /// Number of expanded layers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.shapes.len()
    }

    /// Number of scalars in one genome.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.shapes
            .iter()
            .map(|s| s.weight_len() + s.bias_len())
            .sum()
    }
}

/// Parses a comma-separated list of [`LayerSpec`]s, e.g. `3x1,4x1`.
pub fn parse_layers(s: &str) -> Result<Vec<LayerSpec>, NetworkError> {
    s.split(',').map(str::parse).collect()
}
