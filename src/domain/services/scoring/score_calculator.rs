/// A category score breakdown whose total lives in [0, 100]
pub trait CategoryScore {
    /// Final category score, clamped to [0, 100]
    fn total(&self) -> f64;
}

/// Common trait for the five category score calculators
///
/// Calculators are pure: they read one metric group of a snapshot and return
/// a breakdown. Missing metrics lower the score, they never fail.
pub trait CategoryScoreCalculator: Send + Sync {
    type Input;
    type Output: CategoryScore;

    /// Calculate the category breakdown for the given metrics
    fn calculate(&self, input: &Self::Input) -> Self::Output;

    /// Get a human-readable name for this calculator
    fn name(&self) -> &str;

    /// Weight this category contributes to the composite score
    fn weight(&self) -> f64;

    /// Validate that a score is in valid range [0, 100]
    fn validate_score(score: f64) -> bool {
        (0.0..=100.0).contains(&score)
    }
}

/// Linear score where lower values are better: `max` at or below `low`,
/// 0 at or above `high`, linear in between.
pub(crate) fn lower_is_better(value: f64, low: f64, high: f64, max: f64) -> f64 {
    if value <= low {
        max
    } else if value >= high {
        0.0
    } else {
        max * (high - value) / (high - low)
    }
}

/// Linear score where higher values are better: 0 at or below `low`,
/// `max` at or above `high`, linear in between.
pub(crate) fn higher_is_better(value: f64, low: f64, high: f64, max: f64) -> f64 {
    if value <= low {
        0.0
    } else if value >= high {
        max
    } else {
        max * (value - low) / (high - low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl CategoryScore for Fixed {
        fn total(&self) -> f64 {
            self.0
        }
    }

    struct MockCalculator;

    impl CategoryScoreCalculator for MockCalculator {
        type Input = f64;
        type Output = Fixed;

        fn calculate(&self, input: &f64) -> Fixed {
            Fixed(*input)
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn weight(&self) -> f64 {
            0.5
        }
    }

    #[test]
    fn test_validate_score_valid() {
        assert!(MockCalculator::validate_score(0.0));
        assert!(MockCalculator::validate_score(55.5));
        assert!(MockCalculator::validate_score(100.0));
    }

    #[test]
    fn test_validate_score_invalid() {
        assert!(!MockCalculator::validate_score(-0.1));
        assert!(!MockCalculator::validate_score(100.1));
    }

    #[test]
    fn test_mock_calculator() {
        let calc = MockCalculator;
        assert_eq!(calc.calculate(&42.0).total(), 42.0);
        assert_eq!(calc.name(), "mock");
        assert_eq!(calc.weight(), 0.5);
    }

    #[test]
    fn test_lower_is_better_ramp() {
        assert_eq!(lower_is_better(5.0, 10.0, 25.0, 10.0), 10.0);
        assert_eq!(lower_is_better(10.0, 10.0, 25.0, 10.0), 10.0);
        assert_eq!(lower_is_better(17.5, 10.0, 25.0, 10.0), 5.0);
        assert_eq!(lower_is_better(25.0, 10.0, 25.0, 10.0), 0.0);
        assert_eq!(lower_is_better(40.0, 10.0, 25.0, 10.0), 0.0);
    }

    #[test]
    fn test_higher_is_better_ramp() {
        assert_eq!(higher_is_better(0.0, 5.0, 30.0, 15.0), 0.0);
        assert_eq!(higher_is_better(17.5, 5.0, 30.0, 15.0), 7.5);
        assert_eq!(higher_is_better(30.0, 5.0, 30.0, 15.0), 15.0);
        assert_eq!(higher_is_better(80.0, 5.0, 30.0, 15.0), 15.0);
    }
}
