use serde::Serialize;

/// Axis-aligned box anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fraction of the obstacle height sampled by the second vertical clause.
const VERTICAL_SAMPLE: f64 = 0.75;

impl BoundingBox {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tests whether this agent box hits `obstacle`.
    ///
    /// The test is deliberately asymmetric: only the obstacle's left edge
    /// (shifted right by `tolerance`) and right edge are tested horizontally,
    /// and only its bottom edge and the line at 75% of its height are tested
    /// vertically. Swapping the operands gives a different answer.
    ///
    /// # Examples
    ///
    /// ```
    /// use dinorun_engine::BoundingBox;
    ///
    /// let agent = BoundingBox::new(0.0, 0.0, 40.0, 40.0);
    /// assert!(agent.collides_with(&BoundingBox::new(30.0, 0.0, 20.0, 20.0), 1.0));
    /// assert!(!agent.collides_with(&BoundingBox::new(42.0, 0.0, 20.0, 20.0), 1.0));
    /// ```
    #[must_use]
    pub fn collides_with(&self, obstacle: &BoundingBox, tolerance: f64) -> bool {
        let left = obstacle.x + tolerance;
        let right = obstacle.x + obstacle.width;
        let x_overlap = (self.x + self.width >= left && left >= self.x)
            || (self.x + self.width >= right && right >= self.x);

        let bottom = obstacle.y;
        let sample_y = obstacle.y + obstacle.height * VERTICAL_SAMPLE;
        let y_overlap = (self.y + self.height >= bottom && bottom >= self.y)
            || (self.y + self.height >= sample_y && sample_y >= self.y);

        x_overlap && y_overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: BoundingBox = BoundingBox::new(0.0, 0.0, 40.0, 40.0);

    #[test]
    fn test_overlapping_fixture_collides() {
        let obstacle = BoundingBox::new(30.0, 0.0, 20.0, 20.0);
        assert!(AGENT.collides_with(&obstacle, 1.0));
    }

    #[test]
    fn test_obstacle_past_right_edge_misses() {
        let obstacle = BoundingBox::new(42.0, 0.0, 20.0, 20.0);
        assert!(!AGENT.collides_with(&obstacle, 1.0));
    }

    #[test]
    fn test_tolerance_shifts_left_edge() {
        // Left edge at 39.5 is inside the agent, but 39.5 + 1 is not.
        let obstacle = BoundingBox::new(39.5, 0.0, 20.0, 20.0);
        assert!(!AGENT.collides_with(&obstacle, 1.0));
        assert!(AGENT.collides_with(&obstacle, 0.0));
    }

    #[test]
    fn test_right_edge_clause() {
        // Left edge is behind the agent; the right edge is still inside.
        let obstacle = BoundingBox::new(-10.0, 0.0, 20.0, 20.0);
        assert!(AGENT.collides_with(&obstacle, 1.0));

        // Fully passed.
        let obstacle = BoundingBox::new(-30.0, 0.0, 20.0, 20.0);
        assert!(!AGENT.collides_with(&obstacle, 1.0));
    }

    #[test]
    fn test_obstacle_above_agent_misses() {
        let obstacle = BoundingBox::new(30.0, 41.0, 20.0, 20.0);
        assert!(!AGENT.collides_with(&obstacle, 1.0));
    }

    #[test]
    fn test_three_quarter_line() {
        // Agent hovering above the bottom edge of a tall obstacle is hit only
        // when it reaches the 75% line.
        let obstacle = BoundingBox::new(30.0, 0.0, 20.0, 100.0);
        let low = BoundingBox::new(0.0, 70.0, 40.0, 10.0);
        let high = BoundingBox::new(0.0, 76.0, 40.0, 10.0);
        assert!(low.collides_with(&obstacle, 1.0));
        assert!(!high.collides_with(&obstacle, 1.0));
    }

    #[test]
    fn test_asymmetric_operands() {
        // A wide box containing a small one: the small box's test lines never
        // land inside the wide one's edges.
        let wide = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let small = BoundingBox::new(40.0, 0.0, 10.0, 10.0);
        assert!(wide.collides_with(&small, 1.0));
        assert!(!small.collides_with(&wide, 1.0));
    }
}
