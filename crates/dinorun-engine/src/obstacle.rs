use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{BoundingBox, config::BoxSize, config::GameConfig};

/// Vertical sprite offset of a bird on its wings-up frame.
const BIRD_FLAP_OFFSET: f64 = 25.0;

/// Top-level obstacle category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum ObstacleKind {
    /// Flies at one of three fixed heights and flaps (animates).
    Bird,
    /// Ground obstacle in one of three widths.
    SmallCactus,
    /// Taller ground obstacle in one of three widths.
    LargeCactus,
}

impl ObstacleKind {
    pub const ALL: [Self; 3] = [Self::Bird, Self::SmallCactus, Self::LargeCactus];

    /// Number of sub-variants per category.
    pub const VARIANTS: usize = 3;

    /// Only birds alternate sprites; the flag has no effect on collision.
    #[must_use]
    pub const fn animates(self) -> bool {
        matches!(self, Self::Bird)
    }
}

/// An obstacle travelling towards the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    kind: ObstacleKind,
    variant: usize,
    x: f64,
    y: f64,
    size: BoxSize,
}

impl Obstacle {
    /// Builds the `variant`-th obstacle of `kind` at the right edge of the canvas.
    ///
    /// # Panics
    ///
    /// Panics if `variant >= ObstacleKind::VARIANTS`.
    #[must_use]
    pub fn new(kind: ObstacleKind, variant: usize, config: &GameConfig) -> Self {
        let (y, size) = match kind {
            ObstacleKind::Bird => (config.bird_heights[variant], config.bird_size),
            ObstacleKind::SmallCactus => (0.0, config.small_cactus_sizes[variant]),
            ObstacleKind::LargeCactus => (0.0, config.large_cactus_sizes[variant]),
        };
        Self {
            kind,
            variant,
            x: config.canvas_width,
            y,
            size,
        }
    }

    /// Picks a category uniformly, then a sub-variant uniformly.
    pub fn random<R>(rng: &mut R, config: &GameConfig) -> Self
    where
        R: Rng + ?Sized,
    {
        let kind = ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())];
        let variant = rng.random_range(0..ObstacleKind::VARIANTS);
        Self::new(kind, variant, config)
    }

    #[must_use]
    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    #[must_use]
    pub fn variant(&self) -> usize {
        self.variant
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
    pub fn size(&self) -> BoxSize {
        self.size
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.size.width, self.size.height)
    }

    /// Sprite offset for the given animation frame. Rendering only.
    #[must_use]
    pub fn visual_offset(&self, animation_frame: u8) -> f64 {
        if self.kind.animates() {
            BIRD_FLAP_OFFSET * f64::from(animation_frame)
        } else {
            0.0
        }
    }

    /// Moves the obstacle by `offset` and reports whether its right edge plus
    /// `tolerance` has passed the left boundary.
    pub(crate) fn advance(&mut self, offset: f64, tolerance: f64) -> bool {
        self.x += offset;
        self.x + self.size.width + tolerance < 0.0
    }

    pub(crate) fn snapshot(&self, animation_frame: u8) -> ObstacleSnapshot {
        ObstacleSnapshot {
            kind: self.kind,
            variant: self.variant,
            bounds: self.bounding_box(),
            visual_offset: self.visual_offset(animation_frame),
        }
    }
}

/// Read-only view of an [`Obstacle`] for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObstacleSnapshot {
    pub kind: ObstacleKind,
    pub variant: usize,
    pub bounds: BoundingBox,
    pub visual_offset: f64,
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_birds_fly_at_configured_heights() {
        let config = GameConfig::default();
        for (variant, height) in config.bird_heights.iter().enumerate() {
            let bird = Obstacle::new(ObstacleKind::Bird, variant, &config);
            assert_eq!(bird.y(), *height);
            assert_eq!(bird.x(), config.canvas_width);
            assert_eq!(bird.size(), config.bird_size);
        }
    }

    #[test]
    fn test_cacti_sit_on_the_ground() {
        let config = GameConfig::default();
        for variant in 0..ObstacleKind::VARIANTS {
            let small = Obstacle::new(ObstacleKind::SmallCactus, variant, &config);
            let large = Obstacle::new(ObstacleKind::LargeCactus, variant, &config);
            assert_eq!(small.y(), 0.0);
            assert_eq!(large.y(), 0.0);
            assert_eq!(small.size(), config.small_cactus_sizes[variant]);
            assert_eq!(large.size(), config.large_cactus_sizes[variant]);
        }
    }

    #[test]
    fn test_only_birds_animate() {
        let config = GameConfig::default();
        let bird = Obstacle::new(ObstacleKind::Bird, 0, &config);
        let cactus = Obstacle::new(ObstacleKind::LargeCactus, 0, &config);
        assert_eq!(bird.visual_offset(1), 25.0);
        assert_eq!(bird.visual_offset(0), 0.0);
        assert_eq!(cactus.visual_offset(1), 0.0);
    }

    #[test]
    fn test_advance_reports_exit_with_tolerance() {
        let config = GameConfig::default();
        let mut cactus = Obstacle::new(ObstacleKind::SmallCactus, 0, &config);
        // width 40: exits once x + 40 + 1 < 0
        assert!(!cactus.advance(-config.canvas_width - 41.0, 1.0));
        assert_eq!(cactus.x(), -41.0);
        assert!(cactus.advance(-0.5, 1.0));
    }

    #[test]
    fn test_random_covers_all_categories() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let obstacle = Obstacle::random(&mut rng, &config);
            assert!(obstacle.variant() < ObstacleKind::VARIANTS);
            seen.insert((obstacle.kind(), obstacle.variant()));
        }
        assert_eq!(seen.len(), ObstacleKind::ALL.len() * ObstacleKind::VARIANTS);
    }
}
