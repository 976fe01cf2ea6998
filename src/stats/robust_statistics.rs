//! Robust summary statistics for latency samples
//!
//! Latency distributions are heavy tailed, so alongside mean and standard
//! deviation this reports the median, the median absolute deviation and the
//! upper percentiles. Tail samples are kept: for latency they are the signal.

use serde::Serialize;

/// Summary of one phase's samples, in the display unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobustStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,
    pub mad: f64,              // Median Absolute Deviation - robust stdev
    pub min: f64,
    pub max: f64,
    pub p95: f64,              // 95th percentile
    pub p99: f64,              // 99th percentile
    pub outliers: usize,       // samples further than 3.5 MAD from the median
    pub confidence_interval_95: (f64, f64),
}

impl RobustStatistics {
    /// Summarise `samples`; `None` when there is nothing to summarise
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let median = Self::percentile(&sorted, 50.0);

        // MAD (Median Absolute Deviation) - robust measure of spread
        let mut deviations: Vec<f64> = sorted.iter().map(|&x| (x - median).abs()).collect();
        deviations.sort_by(f64::total_cmp);
        let mad = Self::percentile(&deviations, 50.0);

        // Rule: |x - median| > k * MAD, where k = 3.5 (corresponds to ~3σ)
        let threshold = 3.5 * mad;
        let outliers = sorted.iter().filter(|&&x| (x - median).abs() > threshold).count();

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;
        let stdev = variance.sqrt();

        // 95% confidence interval for mean
        let ci_margin = 1.96 * stdev / (count as f64).sqrt();

        Some(Self {
            count,
            mean,
            median,
            stdev,
            mad,
            min: sorted[0],
            max: sorted[count - 1],
            p95: Self::percentile(&sorted, 95.0),
            p99: Self::percentile(&sorted, 99.0),
            outliers,
            confidence_interval_95: (mean - ci_margin, mean + ci_margin),
        })
    }

    /// Nearest-rank percentile of sorted data
    pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
        if sorted_data.is_empty() {
            return 0.0;
        }
        let idx = (p / 100.0 * (sorted_data.len() - 1) as f64).round() as usize;
        sorted_data[idx.min(sorted_data.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_samples_have_no_statistics() {
        assert!(RobustStatistics::from_samples(&[]).is_none());
    }

    #[test]
    fn summarises_a_uniform_ramp() {
        let samples: Vec<f64> = (1..=100).map(f64::from).collect();
        let stats = RobustStatistics::from_samples(&samples).unwrap();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 100.0);
        assert!((stats.mean - 50.5).abs() < 1e-9);
        assert_eq!(stats.median, 51.0);
        assert_eq!(stats.p95, 95.0);
        assert_eq!(stats.p99, 99.0);
        assert_eq!(stats.outliers, 0);
        assert!(stats.confidence_interval_95.0 < stats.mean);
        assert!(stats.confidence_interval_95.1 > stats.mean);
    }

    #[test]
    fn tail_spikes_are_counted_not_dropped() {
        let mut samples: Vec<f64> = (0..50).map(|i| 1.0 + (i % 5) as f64 * 0.1).collect();
        samples.push(250.0);
        let stats = RobustStatistics::from_samples(&samples).unwrap();
        assert_eq!(stats.max, 250.0);
        assert_eq!(stats.outliers, 1);
        assert!(stats.mean > stats.median);
    }

    #[test]
    fn single_sample() {
        let stats = RobustStatistics::from_samples(&[4.2]).unwrap();
        assert_eq!(stats.median, 4.2);
        assert_eq!(stats.p99, 4.2);
        assert_eq!(stats.stdev, 0.0);
        assert_eq!(stats.mad, 0.0);
    }
}
