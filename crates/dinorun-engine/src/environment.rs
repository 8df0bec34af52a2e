use rand::Rng as _;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    Action, Agent, AgentSnapshot, ConfigError, GameConfig, Obstacle, ObstacleSnapshot, SpawnSeed,
};

/// Number of features fed to the network per agent.
pub const FEATURE_COUNT: usize = 5;

/// Feature vector of one environment.
///
/// Layout: `[dx, dy, obstacle height, ducking, jumping]`.
pub type Features = [f64; FEATURE_COUNT];

/// Placeholder features reported when no decision is possible.
const INACTIVE_FEATURES: Features = [1.0; FEATURE_COUNT];

/// One agent running an endless obstacle course.
///
/// Exactly one obstacle is active at a time. It is spawned on the first tick
/// and replaced as soon as it leaves the screen.
#[derive(Debug, Clone)]
pub struct Environment {
    config: GameConfig,
    seed: SpawnSeed,
    rng: Pcg32,
    score: f64,
    animation_frame: u8,
    agent: Agent,
    obstacle: Option<Obstacle>,
}

impl Environment {
    pub fn new(config: &GameConfig, seed: SpawnSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            seed,
            rng: seed.rng(),
            score: 0.0,
            animation_frame: 0,
            agent: Agent::new(config),
            obstacle: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> SpawnSeed {
        self.seed
    }

    /// Elapsed score; also the fitness of the agent once it dies.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Sprite alternation flag (0 or 1). Has no effect on physics.
    #[must_use]
    pub fn animation_frame(&self) -> u8 {
        self.animation_frame
    }

    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    #[must_use]
    pub fn obstacle(&self) -> Option<&Obstacle> {
        self.obstacle.as_ref()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.agent.is_enabled()
    }

    /// Replaces the active obstacle with a freshly drawn one at the right edge.
    pub fn spawn(&mut self) {
        self.obstacle = Some(Obstacle::random(&mut self.rng, &self.config));
    }

    /// Advances the simulation by `dt`. Does nothing once the agent is dead.
    pub fn tick(&mut self, dt: f64) {
        debug_assert!(dt >= 0.0, "negative time step: {dt}");
        if !self.agent.is_enabled() {
            return;
        }

        self.update_animation_frame();
        self.score += dt * self.config.base_speed * 2.0;

        let tolerance = self.config.collision_tolerance;
        let obstacle = self
            .obstacle
            .get_or_insert_with(|| Obstacle::random(&mut self.rng, &self.config));
        self.agent.update(&obstacle.bounding_box(), tolerance);

        // The obstacle keeps moving on the tick the agent dies.
        let speed = self.config.base_speed
            + (self.score / self.config.speed_acceleration_period).floor();
        if obstacle.advance(-speed, tolerance) {
            self.spawn();
        }
    }

    fn update_animation_frame(&mut self) {
        let phase = (self.score * 3.0 / self.config.change_rate_modulus).floor();
        self.animation_frame = u8::from(phase.rem_euclid(2.0) >= 1.0);
    }

    /// Forwards `action` to the agent.
    pub fn apply_action(&mut self, action: Action) {
        action.apply(&mut self.agent);
    }

    /// Feature vector for the network.
    ///
    /// Returns `[1.0; 5]` for a dead agent or before the first obstacle exists.
    #[must_use]
    pub fn features(&self) -> Features {
        let Some(obstacle) = &self.obstacle else {
            return INACTIVE_FEATURES;
        };
        if !self.agent.is_enabled() {
            return INACTIVE_FEATURES;
        }
        [
            obstacle.x() - self.agent.x(),
            obstacle.y() - self.agent.y(),
            obstacle.size().height,
            f64::from(u8::from(self.agent.is_ducking())),
            f64::from(u8::from(self.agent.is_jumping())),
        ]
    }

    /// Clears the score, the obstacle slot and the agent state.
    ///
    /// The obstacle stream continues from where it was, so the next run sees a
    /// different course.
    pub fn reset(&mut self) {
        self.score = 0.0;
        self.animation_frame = 0;
        self.obstacle = None;
        self.agent.reset();
    }

    #[must_use]
    pub fn snapshot(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            score: self.score,
            animation_frame: self.animation_frame,
            agent: self.agent.snapshot(),
            obstacle: self
                .obstacle
                .as_ref()
                .map(|o| o.snapshot(self.animation_frame)),
        }
    }
}

/// Everything a renderer needs to draw one frame of an [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentSnapshot {
    pub score: f64,
    pub animation_frame: u8,
    pub agent: AgentSnapshot,
    pub obstacle: Option<ObstacleSnapshot>,
}
