use serde::{Deserialize, Serialize};

/// Distribution of final scores over one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl ScoreSummary {
    /// Summarizes unsorted scores. Returns `None` for an empty input.
    ///
    /// # Example
    ///
    /// ```
    /// use dinorun_training::ScoreSummary;
    ///
    /// let summary = ScoreSummary::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(summary.min, 1.0);
    /// assert_eq!(summary.max, 5.0);
    /// assert_eq!(summary.mean, 3.0);
    /// assert_eq!(summary.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(scores: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut scores = scores.into_iter().collect::<Vec<_>>();
        scores.sort_by(f64::total_cmp);
        Self::from_sorted(&scores)
    }

    #[expect(clippy::cast_precision_loss)]
    fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let median = sorted[sorted.len() / 2];
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(ScoreSummary::new([]), None);
    }

    #[test]
    fn test_single_value() {
        let summary = ScoreSummary::new([4.2]).unwrap();
        assert_eq!(summary.min, 4.2);
        assert_eq!(summary.max, 4.2);
        assert_eq!(summary.median, 4.2);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn test_upper_median_for_even_count() {
        let summary = ScoreSummary::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.std_dev, 1.25_f64.sqrt());
    }
}
