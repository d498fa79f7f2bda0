//! Z-score anomaly detection for per-period metric series.
//!
//! Flags periods whose value sits more than a configured number of standard
//! deviations from the series mean. Detection only runs once a series is
//! long enough for the deviation estimate to be stable; shorter series are
//! reported as insufficient data instead of being scanned.

use cadence_core::{AnalysisConfig, MetricKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How far an anomalous value deviates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    /// Between the base and high z-score thresholds.
    Medium,
    /// Above the high z-score threshold.
    High,
}

impl std::fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalySeverity::Medium => write!(f, "medium"),
            AnomalySeverity::High => write!(f, "high"),
        }
    }
}

/// Which side of the mean an anomalous value sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyDirection {
    /// Value above the series mean.
    Spike,
    /// Value below the series mean.
    Drop,
}

impl std::fmt::Display for AnomalyDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyDirection::Spike => write!(f, "spike"),
            AnomalyDirection::Drop => write!(f, "drop"),
        }
    }
}

/// A statistically unusual period in one metric's series.
///
/// Anomalies are independent per metric: the same period can appear once
/// for each metric it is unusual in.
///
/// # Examples
///
/// ```
/// use cadence_core::{AnalysisConfig, MetricKey};
/// use cadence_engine::anomaly::{detect_anomalies, AnomalyScan, AnomalySeverity};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
/// let points: Vec<_> = [2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 30.0, 2.0]
///     .iter()
///     .enumerate()
///     .map(|(i, v)| (start + Duration::days(i as i64), *v))
///     .collect();
///
/// let scan = detect_anomalies(MetricKey::Commits, &points, &AnalysisConfig::default());
/// let AnomalyScan::Ready(anomalies) = scan else { panic!("expected scan") };
/// assert_eq!(anomalies.len(), 1);
/// assert_eq!(anomalies[0].severity, AnomalySeverity::Medium);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    /// Period the unusual value was observed in.
    pub period: DateTime<Utc>,
    /// Metric the value belongs to.
    pub metric: MetricKey,
    /// The observed value.
    pub value: f64,
    /// The series mean the value was compared against.
    pub expected: f64,
    /// Deviation bucket.
    pub severity: AnomalySeverity,
    /// Side of the mean.
    pub direction: AnomalyDirection,
}

/// Outcome of scanning one metric series.
#[derive(Debug, Clone, PartialEq)]
pub enum AnomalyScan {
    /// The series was long enough; zero or more anomalies found.
    Ready(Vec<Anomaly>),
    /// The series was shorter than the configured minimum window.
    InsufficientData {
        /// Minimum number of periods required.
        required: usize,
        /// Number of periods supplied.
        actual: usize,
    },
}

/// Scan one metric's ordered `(period, value)` series for anomalies.
///
/// Computes the population mean and standard deviation, then flags every
/// point whose z-score exceeds `config.z_threshold`; points beyond
/// `config.high_z_threshold` are high severity. A zero-deviation series has
/// no anomalies by definition. Series shorter than
/// `config.min_anomaly_window` are reported as [`AnomalyScan::InsufficientData`]
/// regardless of content.
pub fn detect_anomalies(
    metric: MetricKey,
    points: &[(DateTime<Utc>, f64)],
    config: &AnalysisConfig,
) -> AnomalyScan {
    if points.len() < config.min_anomaly_window {
        return AnomalyScan::InsufficientData {
            required: config.min_anomaly_window,
            actual: points.len(),
        };
    }

    let count = points.len() as f64;
    let mean = points.iter().map(|(_, v)| v).sum::<f64>() / count;
    let variance = points
        .iter()
        .map(|(_, v)| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / count;
    let stddev = variance.sqrt();

    // A flat series has no outliers by the z-score definition.
    if stddev == 0.0 {
        return AnomalyScan::Ready(Vec::new());
    }

    let mut anomalies = Vec::new();
    for (period, value) in points {
        let z = (value - mean).abs() / stddev;
        if z <= config.z_threshold {
            continue;
        }
        let severity = if z > config.high_z_threshold {
            AnomalySeverity::High
        } else {
            AnomalySeverity::Medium
        };
        let direction = if *value > mean {
            AnomalyDirection::Spike
        } else {
            AnomalyDirection::Drop
        };
        anomalies.push(Anomaly {
            period: *period,
            metric,
            value: *value,
            expected: mean,
            severity,
            direction,
        });
    }

    AnomalyScan::Ready(anomalies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn series(values: &[f64]) -> Vec<(DateTime<Utc>, f64)> {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + Duration::days(i as i64), *v))
            .collect()
    }

    #[test]
    fn short_series_is_insufficient_regardless_of_content() {
        let config = AnalysisConfig::default();
        let wild = series(&[0.0, 1000.0, 0.0, 1000.0, 0.0, 1000.0]);
        let scan = detect_anomalies(MetricKey::Commits, &wild, &config);
        assert_eq!(
            scan,
            AnomalyScan::InsufficientData {
                required: 7,
                actual: 6
            }
        );
    }

    #[test]
    fn flat_series_has_no_anomalies() {
        let config = AnalysisConfig::default();
        let flat = series(&[5.0; 10]);
        let scan = detect_anomalies(MetricKey::Commits, &flat, &config);
        assert_eq!(scan, AnomalyScan::Ready(Vec::new()));
    }

    #[test]
    fn single_extreme_value_is_a_high_spike() {
        let config = AnalysisConfig::default();
        // Low-variance base with one value far above the mean.
        let mut values = vec![10.0, 10.2, 9.8, 10.1, 9.9, 10.0, 10.1, 9.9, 10.0, 10.2, 9.8, 10.0, 10.1];
        values.push(40.0);
        let scan = detect_anomalies(MetricKey::PullRequestsOpened, &series(&values), &config);

        let AnomalyScan::Ready(anomalies) = scan else {
            panic!("expected a completed scan");
        };
        assert_eq!(anomalies.len(), 1);
        let anomaly = &anomalies[0];
        assert_eq!(anomaly.severity, AnomalySeverity::High);
        assert_eq!(anomaly.direction, AnomalyDirection::Spike);
        assert_eq!(anomaly.value, 40.0);
        assert!(anomaly.expected < 15.0);
    }

    #[test]
    fn drop_below_mean_is_reported_as_drop() {
        let config = AnalysisConfig {
            z_threshold: 1.5,
            high_z_threshold: 3.0,
            ..AnalysisConfig::default()
        };
        let values = [20.0, 20.0, 21.0, 19.0, 20.0, 20.0, 21.0, 19.0, 20.0, 2.0];
        let scan = detect_anomalies(MetricKey::ReviewsGiven, &series(&values), &config);

        let AnomalyScan::Ready(anomalies) = scan else {
            panic!("expected a completed scan");
        };
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].direction, AnomalyDirection::Drop);
    }

    #[test]
    fn moderate_outlier_is_medium_severity() {
        let config = AnalysisConfig::default();
        // Base stddev is pushed up enough that the outlier lands between 2σ and 3σ.
        let values = [10.0, 12.0, 8.0, 11.0, 9.0, 10.0, 12.0, 8.0, 11.0, 9.0, 10.0, 14.0];
        let scan = detect_anomalies(MetricKey::Commits, &series(&values), &config);

        let AnomalyScan::Ready(anomalies) = scan else {
            panic!("expected a completed scan");
        };
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, AnomalySeverity::Medium);
    }

    #[test]
    fn window_threshold_is_configurable() {
        let config = AnalysisConfig {
            min_anomaly_window: 3,
            ..AnalysisConfig::default()
        };
        let scan = detect_anomalies(MetricKey::Commits, &series(&[1.0, 1.0, 1.0]), &config);
        assert_eq!(scan, AnomalyScan::Ready(Vec::new()));
    }
}
