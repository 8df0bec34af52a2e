use serde::Serialize;

use crate::{BoundingBox, config::BoxSize, config::GameConfig};

/// The runner controlled by one network (or one human).
///
/// The agent never moves horizontally; obstacles come to it. Vertical motion is
/// integrated once per tick with a constant acceleration that depends on
/// whether the agent is ducking.
#[derive(Debug, Clone)]
pub struct Agent {
    x: f64,
    y: f64,
    prev_y: f64,
    velocity: f64,
    acceleration: f64,
    enabled: bool,
    jumping: bool,
    ducking: bool,
    run_size: BoxSize,
    duck_size: BoxSize,
    jump_velocity: f64,
    fall_acceleration: f64,
    duck_fall_acceleration: f64,
}

impl Agent {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            prev_y: 0.0,
            velocity: 0.0,
            acceleration: config.fall_acceleration,
            enabled: true,
            jumping: false,
            ducking: false,
            run_size: config.agent_run_size,
            duck_size: config.agent_duck_size,
            jump_velocity: config.jump_velocity,
            fall_acceleration: config.fall_acceleration,
            duck_fall_acceleration: config.duck_fall_acceleration,
        }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[must_use]
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    /// Returns `false` once the agent has collided.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    #[must_use]
    pub fn is_ducking(&self) -> bool {
        self.ducking
    }

    /// Current bounding-box size (ducking or running).
    #[must_use]
    pub fn size(&self) -> BoxSize {
        if self.ducking {
            self.duck_size
        } else {
            self.run_size
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let size = self.size();
        BoundingBox::new(self.x, self.y, size.width, size.height)
    }

    /// Starts a jump unless one is already in progress.
    pub fn jump(&mut self) {
        if !self.enabled || self.jumping {
            return;
        }
        self.jumping = true;
        self.velocity = self.jump_velocity;
    }

    /// Switches to the ducking box; no-op if already ducking.
    pub fn duck(&mut self) {
        if !self.enabled || self.ducking {
            return;
        }
        self.ducking = true;
        self.acceleration = self.duck_fall_acceleration;
    }

    /// Switches back to the running box; no-op if not ducking.
    pub fn unduck(&mut self) {
        if !self.enabled || !self.ducking {
            return;
        }
        self.ducking = false;
        self.acceleration = self.fall_acceleration;
    }

    /// Collision check followed by vertical integration.
    ///
    /// Returns `true` if the agent died during this update.
    pub(crate) fn update(&mut self, obstacle: &BoundingBox, tolerance: f64) -> bool {
        if !self.enabled {
            return false;
        }
        if self.bounding_box().collides_with(obstacle, tolerance) {
            self.die();
            return true;
        }

        if self.jumping && self.y == 0.0 && self.prev_y != 0.0 {
            self.jumping = false;
        }
        self.prev_y = self.y;
        self.velocity += self.acceleration;
        self.y = f64::max(self.y + self.velocity, 0.0);
        false
    }

    fn die(&mut self) {
        self.ducking = false;
        self.enabled = false;
    }

    pub(crate) fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.prev_y = 0.0;
        self.velocity = 0.0;
        self.acceleration = self.fall_acceleration;
        self.enabled = true;
        self.jumping = false;
        self.ducking = false;
    }

    pub(crate) fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            bounds: self.bounding_box(),
            enabled: self.enabled,
            jumping: self.jumping,
            ducking: self.ducking,
        }
    }
}

/// Read-only view of an [`Agent`] for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub bounds: BoundingBox,
    pub enabled: bool,
    pub jumping: bool,
    pub ducking: bool,
}
