//! Rolling Statistics Computation

/// Summary statistics over a window of values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollingStatistics {
    /// Number of values in the window
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Sample standard deviation (n - 1); zero for fewer than two values
    pub std_dev: f64,
}

impl RollingStatistics {
    /// Compute statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let std_dev = if values.len() >= 2 {
            let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (m2 / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Self {
            count: values.len(),
            mean,
            std_dev,
        }
    }

    /// Mean, or `None` for an empty window
    pub fn mean_opt(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample standard deviation, or `None` when fewer than two values
    pub fn std_dev_opt(&self) -> Option<f64> {
        (self.count >= 2).then_some(self.std_dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = RollingStatistics::compute(&values);
        assert!((stats.mean - 3.0).abs() < 0.001);
        assert_eq!(stats.count, 5);
    }

    #[test]
    fn test_sample_std_dev() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = RollingStatistics::compute(&values);
        // Population std is 2.0; sample std is sqrt(32 / 7)
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_single_value_has_no_std_dev() {
        let stats = RollingStatistics::compute(&[3.0]);
        assert_eq!(stats.mean_opt(), Some(3.0));
        assert_eq!(stats.std_dev_opt(), None);
    }

    #[test]
    fn test_empty_values() {
        let stats = RollingStatistics::compute(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean_opt(), None);
    }
}
