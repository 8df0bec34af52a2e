use serde::{Deserialize, Serialize};

/// Shapes uniform noise `u ∈ [-1, 1]` into the perturbation added to each
/// bred parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationShape {
    /// No perturbation.
    Zero,
    /// `scale · u`
    Linear { scale: f64 },
    /// `scale · u³`; small noise is damped much more than large noise.
    Cubic { scale: f64 },
}

impl Default for MutationShape {
    fn default() -> Self {
        Self::Cubic { scale: 0.1 }
    }
}

impl MutationShape {
    #[must_use]
    pub fn apply(self, u: f64) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Linear { scale } => scale * u,
            Self::Cubic { scale } => scale * u.powi(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cubic_bell() {
        let shape = MutationShape::default();
        assert_eq!(shape.apply(1.0), 0.1);
        assert_eq!(shape.apply(-1.0), -0.1);
        assert_eq!(shape.apply(0.5), 0.1 * 0.125);
        assert_eq!(shape.apply(0.0), 0.0);
    }

    #[test]
    fn test_zero_and_linear() {
        assert_eq!(MutationShape::Zero.apply(0.7), 0.0);
        assert_eq!(MutationShape::Linear { scale: 2.0 }.apply(-0.25), -0.5);
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&MutationShape::default()).unwrap();
        assert_eq!(json, r#"{"kind":"cubic","scale":0.1}"#);
        let zero: MutationShape = serde_json::from_str(r#"{"kind":"zero"}"#).unwrap();
        assert_eq!(zero, MutationShape::Zero);
    }
}
