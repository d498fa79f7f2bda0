//! Least-squares trend fitting for per-period metric series.
//!
//! Fits an ordinary least-squares line through a metric's samples (sample
//! index as the independent variable) and reports the slope together with
//! the mean and population standard deviation.

use cadence_core::{AnalysisConfig, MetricKey};
use serde::{Deserialize, Serialize};

/// Fitted trend statistics for one metric series.
///
/// # Examples
///
/// ```
/// use cadence_core::MetricKey;
/// use cadence_engine::trend::analyze_trend;
///
/// let summary = analyze_trend(MetricKey::Commits, &[1.0, 2.0, 3.0, 4.0]);
/// assert!(summary.slope > 0.0);
/// assert_eq!(summary.average, 2.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    /// Metric the series belongs to.
    pub metric: MetricKey,
    /// Least-squares slope per period; 0 when fewer than 2 samples.
    pub slope: f64,
    /// Arithmetic mean of the samples; 0 when the series is empty.
    pub average: f64,
    /// Population standard deviation of the samples. Always >= 0.
    pub volatility: f64,
    /// Number of samples the fit was computed over.
    pub sample_count: usize,
}

/// Directional classification of a fitted slope.
///
/// # Examples
///
/// ```
/// use cadence_engine::trend::TrendDirection;
///
/// assert_eq!(TrendDirection::classify(0.5, 0.1), TrendDirection::Improving);
/// assert_eq!(TrendDirection::classify(-0.5, 0.1), TrendDirection::Declining);
/// assert_eq!(TrendDirection::classify(0.05, 0.1), TrendDirection::Stable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Slope above the positive threshold.
    Improving,
    /// Slope below the negative threshold.
    Declining,
    /// Slope within the threshold band.
    Stable,
}

impl TrendDirection {
    /// Classify a slope against the configured threshold.
    pub fn classify(slope: f64, threshold: f64) -> Self {
        if slope > threshold {
            TrendDirection::Improving
        } else if slope < -threshold {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Improving => write!(f, "improving"),
            TrendDirection::Declining => write!(f, "declining"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// A classified trend for one metric, as reported in an insight bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendInsight {
    /// Fit statistics.
    #[serde(flatten)]
    pub summary: TrendSummary,
    /// Direction relative to the slope threshold.
    pub direction: TrendDirection,
    /// Whether volatility exceeds the configured fraction of the mean.
    pub high_volatility: bool,
}

/// Fit a trend to one metric's ordered samples.
///
/// The slope is the ordinary least-squares estimate with the sample index
/// `0..N-1` as the independent variable; it is defined as 0 when fewer than
/// two samples exist. Volatility is the population standard deviation. An
/// empty series yields all-zero statistics with `sample_count == 0`, which
/// callers surface as insufficient data rather than a degenerate trend.
///
/// # Examples
///
/// ```
/// use cadence_core::MetricKey;
/// use cadence_engine::trend::analyze_trend;
///
/// let flat = analyze_trend(MetricKey::Commits, &[3.0, 3.0, 3.0]);
/// assert_eq!(flat.slope, 0.0);
/// assert_eq!(flat.volatility, 0.0);
///
/// let single = analyze_trend(MetricKey::Commits, &[9.0]);
/// assert_eq!(single.slope, 0.0);
/// assert_eq!(single.average, 9.0);
/// ```
pub fn analyze_trend(metric: MetricKey, samples: &[f64]) -> TrendSummary {
    let n = samples.len();
    if n == 0 {
        return TrendSummary {
            metric,
            slope: 0.0,
            average: 0.0,
            volatility: 0.0,
            sample_count: 0,
        };
    }

    let count = n as f64;
    let average = samples.iter().sum::<f64>() / count;

    let variance = samples
        .iter()
        .map(|v| {
            let d = v - average;
            d * d
        })
        .sum::<f64>()
        / count;
    let volatility = variance.sqrt();

    let slope = if n < 2 {
        0.0
    } else {
        let sum_x: f64 = (0..n).map(|i| i as f64).sum();
        let sum_y: f64 = samples.iter().sum();
        let sum_xy: f64 = samples.iter().enumerate().map(|(i, v)| i as f64 * v).sum();
        let sum_x2: f64 = (0..n).map(|i| (i as f64) * (i as f64)).sum();

        let denominator = count * sum_x2 - sum_x * sum_x;
        if denominator.abs() < f64::EPSILON {
            0.0
        } else {
            (count * sum_xy - sum_x * sum_y) / denominator
        }
    };

    TrendSummary {
        metric,
        slope,
        average,
        volatility,
        sample_count: n,
    }
}

impl TrendSummary {
    /// Classify this fit into a reportable insight using configured thresholds.
    ///
    /// A series with mean 0 is never flagged volatile.
    pub fn classify(self, config: &AnalysisConfig) -> TrendInsight {
        let direction = TrendDirection::classify(self.slope, config.slope_threshold);
        let high_volatility =
            self.average > 0.0 && self.volatility > config.volatility_ratio * self.average;
        TrendInsight {
            summary: self,
            direction,
            high_volatility,
        }
    }
}
