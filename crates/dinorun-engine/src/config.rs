//! Simulation constants for a single [`Environment`](crate::Environment).
//!
//! [`GameConfig::default`] reproduces the standard course constants exactly; runs that
//! change any of them are not comparable with saved best-player files trained on
//! the defaults.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Width and height of an axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

impl BoxSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn validate(self, what: &'static str) -> Result<(), ConfigError> {
        if !(self.width.is_finite() && self.height.is_finite()) {
            return Err(ConfigError::NonFiniteValue { what });
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ConfigError::NegativeSize {
                what,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Tunable constants of the obstacle course.
///
/// Sprite sizes are the bounding boxes of the runner and obstacle artwork;
/// only the boxes matter for physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Divisor used when deriving the animation frame from the score.
    pub change_rate_modulus: f64,
    /// Horizontal slack in the collision test (`err`).
    pub collision_tolerance: f64,
    /// Obstacle speed at score zero, in units per tick.
    pub base_speed: f64,
    /// Score units per additional unit of obstacle speed.
    pub speed_acceleration_period: f64,
    /// Upward velocity applied when a jump starts.
    pub jump_velocity: f64,
    /// Per-tick acceleration while running.
    pub fall_acceleration: f64,
    /// Per-tick acceleration while ducking.
    pub duck_fall_acceleration: f64,
    /// Heights a bird can fly at, indexed by its variant.
    pub bird_heights: [f64; 3],
    /// X coordinate where obstacles spawn.
    pub canvas_width: f64,
    pub agent_run_size: BoxSize,
    pub agent_duck_size: BoxSize,
    pub bird_size: BoxSize,
    pub small_cactus_sizes: [BoxSize; 3],
    pub large_cactus_sizes: [BoxSize; 3],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            change_rate_modulus: 5.0,
            collision_tolerance: 1.0,
            base_speed: 10.0,
            speed_acceleration_period: 250.0,
            jump_velocity: 20.0,
            fall_acceleration: -1.0,
            duck_fall_acceleration: -1.5,
            bird_heights: [100.0, 65.0, 0.0],
            canvas_width: 800.0,
            agent_run_size: BoxSize::new(87.0, 94.0),
            agent_duck_size: BoxSize::new(118.0, 60.0),
            bird_size: BoxSize::new(93.0, 62.0),
            small_cactus_sizes: [
                BoxSize::new(40.0, 71.0),
                BoxSize::new(68.0, 71.0),
                BoxSize::new(105.0, 71.0),
            ],
            large_cactus_sizes: [
                BoxSize::new(48.0, 95.0),
                BoxSize::new(99.0, 95.0),
                BoxSize::new(102.0, 95.0),
            ],
        }
    }
}

impl GameConfig {
    /// Checks that every size is finite and non-negative and that the
    /// divisors used by the tick loop are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.agent_run_size.validate("agent run size")?;
        self.agent_duck_size.validate("agent duck size")?;
        self.bird_size.validate("bird size")?;
        for size in &self.small_cactus_sizes {
            size.validate("small cactus size")?;
        }
        for size in &self.large_cactus_sizes {
            size.validate("large cactus size")?;
        }

        let scalars = [
            ("collision tolerance", self.collision_tolerance),
            ("base speed", self.base_speed),
            ("jump velocity", self.jump_velocity),
            ("fall acceleration", self.fall_acceleration),
            ("duck fall acceleration", self.duck_fall_acceleration),
            ("canvas width", self.canvas_width),
        ];
        for (what, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue { what });
            }
        }
        for &height in &self.bird_heights {
            if !height.is_finite() {
                return Err(ConfigError::NonFiniteValue {
                    what: "bird heights",
                });
            }
            if height < 0.0 {
                return Err(ConfigError::NegativeValue {
                    what: "bird heights",
                    value: height,
                });
            }
        }

        let divisors = [
            ("change rate modulus", self.change_rate_modulus),
            ("speed acceleration period", self.speed_acceleration_period),
        ];
        for (what, value) in divisors {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositiveDivisor { what, value });
            }
        }

        if self.canvas_width <= 0.0 {
            return Err(ConfigError::NonPositiveValue {
                what: "canvas width",
                value: self.canvas_width,
            });
        }
        Ok(())
    }
}
