use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::NetworkError;

/// Elementwise activation applied after each layer's affine map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activation {
    Identity,
    Relu,
    /// `max(x, slope * x)`.
    LeakyRelu {
        slope: f64,
    },
    Sigmoid,
    Softplus,
    Tanh,
}

impl Default for Activation {
    fn default() -> Self {
        Self::LeakyRelu { slope: 0.1 }
    }
}

impl Activation {
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Identity => x,
            Self::Relu => f64::max(x, 0.0),
            Self::LeakyRelu { slope } => f64::max(x, slope * x),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Softplus => x.exp().ln_1p(),
            Self::Tanh => x.tanh(),
        }
    }
}

/// Accepts `identity`, `relu`, `leaky-relu`, `leaky-relu:<slope>`, `sigmoid`,
/// `softplus` and `tanh`.
impl FromStr for Activation {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NetworkError::UnknownActivation { name: s.to_owned() };
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        let activation = match (name.to_ascii_lowercase().as_str(), arg) {
            ("identity", None) => Self::Identity,
            ("relu", None) => Self::Relu,
            ("leaky-relu" | "leaky_relu", None) => Self::default(),
            ("leaky-relu" | "leaky_relu", Some(slope)) => Self::LeakyRelu {
                slope: slope.parse().map_err(|_| invalid())?,
            },
            ("sigmoid", None) => Self::Sigmoid,
            ("softplus", None) => Self::Softplus,
            ("tanh", None) => Self::Tanh,
            _ => return Err(invalid()),
        };
        Ok(activation)
    }
}
