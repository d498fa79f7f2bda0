use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CadenceError;

/// Top-level configuration loaded from `.cadence.toml`.
///
/// Every threshold the engine applies lives here with a documented default,
/// so nothing the analyses do depends on hidden magic numbers.
///
/// # Examples
///
/// ```
/// use cadence_core::CadenceConfig;
///
/// let config = CadenceConfig::default();
/// assert_eq!(config.analysis.min_anomaly_window, 7);
/// assert_eq!(config.scoring.weights.activity, 0.3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Trend and anomaly thresholds.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Health score constants and weights.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl CadenceConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::Io`] if the file cannot be read,
    /// [`CadenceError::Toml`] if the content is not valid TOML, or
    /// [`CadenceError::Config`] if the values fail validation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cadence_core::CadenceConfig;
    /// use std::path::Path;
    ///
    /// let config = CadenceConfig::from_file(Path::new(".cadence.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, CadenceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::Toml`] if parsing fails, or
    /// [`CadenceError::Config`] if the values fail validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use cadence_core::CadenceConfig;
    ///
    /// let toml = r#"
    /// [analysis]
    /// z_threshold = 2.5
    /// "#;
    /// let config = CadenceConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.analysis.z_threshold, 2.5);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, CadenceError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::Config`] when the scoring weights do not sum
    /// to 1.0, when a threshold is non-positive, or when the high z-score
    /// threshold sits below the base one.
    pub fn validate(&self) -> Result<(), CadenceError> {
        let weights = &self.scoring.weights;
        let sum = weights.activity + weights.staleness + weights.responsiveness + weights.merge_rate;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(CadenceError::Config(format!(
                "scoring weights must sum to 1.0 (got {sum})"
            )));
        }
        if self.analysis.z_threshold <= 0.0 {
            return Err(CadenceError::Config(
                "z_threshold must be positive".into(),
            ));
        }
        if self.analysis.high_z_threshold < self.analysis.z_threshold {
            return Err(CadenceError::Config(
                "high_z_threshold must not be below z_threshold".into(),
            ));
        }
        if self.analysis.min_anomaly_window == 0 {
            return Err(CadenceError::Config(
                "min_anomaly_window must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Trend and anomaly detection thresholds.
///
/// # Examples
///
/// ```
/// use cadence_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.z_threshold, 2.0);
/// assert_eq!(config.high_z_threshold, 3.0);
/// assert_eq!(config.slope_threshold, 0.1);
/// assert_eq!(config.volatility_ratio, 0.5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum series length before anomaly detection runs (default: 7).
    ///
    /// Shorter series produce unstable deviation estimates and are reported
    /// as insufficient data instead.
    #[serde(default = "default_min_anomaly_window")]
    pub min_anomaly_window: usize,
    /// Z-score above which a period counts as anomalous (default: 2.0).
    #[serde(default = "default_z_threshold")]
    pub z_threshold: f64,
    /// Z-score above which an anomaly is high severity (default: 3.0).
    #[serde(default = "default_high_z_threshold")]
    pub high_z_threshold: f64,
    /// Absolute slope above which a trend counts as moving (default: 0.1).
    #[serde(default = "default_slope_threshold")]
    pub slope_threshold: f64,
    /// A series is volatile when stddev exceeds this fraction of its mean
    /// (default: 0.5). Never flagged when the mean is 0.
    #[serde(default = "default_volatility_ratio")]
    pub volatility_ratio: f64,
}

fn default_min_anomaly_window() -> usize {
    7
}

fn default_z_threshold() -> f64 {
    2.0
}

fn default_high_z_threshold() -> f64 {
    3.0
}

fn default_slope_threshold() -> f64 {
    0.1
}

fn default_volatility_ratio() -> f64 {
    0.5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_anomaly_window: default_min_anomaly_window(),
            z_threshold: default_z_threshold(),
            high_z_threshold: default_high_z_threshold(),
            slope_threshold: default_slope_threshold(),
            volatility_ratio: default_volatility_ratio(),
        }
    }
}

/// Health score constants and weights.
///
/// # Examples
///
/// ```
/// use cadence_core::ScoringConfig;
///
/// let config = ScoringConfig::default();
/// assert_eq!(config.activity_weight, 2.0);
/// assert_eq!(config.staleness_penalty, 5.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Points per recent activity item, saturating at 100 (default: 2.0,
    /// so 40 recent items score 80).
    #[serde(default = "default_activity_weight")]
    pub activity_weight: f64,
    /// Points deducted per stale item, floored at 0 (default: 5.0).
    #[serde(default = "default_staleness_penalty")]
    pub staleness_penalty: f64,
    /// Relative weight of each subscore in the overall score.
    #[serde(default)]
    pub weights: ScoreWeights,
}

fn default_activity_weight() -> f64 {
    2.0
}

fn default_staleness_penalty() -> f64 {
    5.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            activity_weight: default_activity_weight(),
            staleness_penalty: default_staleness_penalty(),
            weights: ScoreWeights::default(),
        }
    }
}

/// Relative weight of each subscore in the overall health score.
///
/// The four weights must sum to 1.0; [`CadenceConfig::validate`] enforces
/// this at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the activity subscore (default: 0.3).
    #[serde(default = "default_weight_activity")]
    pub activity: f64,
    /// Weight of the staleness subscore (default: 0.25).
    #[serde(default = "default_weight_staleness")]
    pub staleness: f64,
    /// Weight of the responsiveness subscore (default: 0.2).
    #[serde(default = "default_weight_responsiveness")]
    pub responsiveness: f64,
    /// Weight of the merge rate subscore (default: 0.25).
    #[serde(default = "default_weight_merge_rate")]
    pub merge_rate: f64,
}

fn default_weight_activity() -> f64 {
    0.3
}

fn default_weight_staleness() -> f64 {
    0.25
}

fn default_weight_responsiveness() -> f64 {
    0.2
}

fn default_weight_merge_rate() -> f64 {
    0.25
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            activity: default_weight_activity(),
            staleness: default_weight_staleness(),
            responsiveness: default_weight_responsiveness(),
            merge_rate: default_weight_merge_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = CadenceConfig::default();
        assert_eq!(config.analysis.min_anomaly_window, 7);
        assert_eq!(config.analysis.z_threshold, 2.0);
        assert_eq!(config.analysis.high_z_threshold, 3.0);
        assert_eq!(config.analysis.slope_threshold, 0.1);
        assert_eq!(config.analysis.volatility_ratio, 0.5);
        assert_eq!(config.scoring.activity_weight, 2.0);
        assert_eq!(config.scoring.staleness_penalty, 5.0);
        assert_eq!(config.scoring.weights.activity, 0.3);
        assert_eq!(config.scoring.weights.staleness, 0.25);
        assert_eq!(config.scoring.weights.responsiveness, 0.2);
        assert_eq!(config.scoring.weights.merge_rate, 0.25);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(CadenceConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[analysis]
min_anomaly_window = 14
z_threshold = 2.5
"#;
        let config = CadenceConfig::from_toml(toml).unwrap();
        assert_eq!(config.analysis.min_anomaly_window, 14);
        assert_eq!(config.analysis.z_threshold, 2.5);
        // Untouched sections keep their defaults.
        assert_eq!(config.analysis.high_z_threshold, 3.0);
        assert_eq!(config.scoring.weights.activity, 0.3);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[analysis]
min_anomaly_window = 10
z_threshold = 1.5
high_z_threshold = 2.5
slope_threshold = 0.05
volatility_ratio = 0.75

[scoring]
activity_weight = 1.0
staleness_penalty = 10.0

[scoring.weights]
activity = 0.4
staleness = 0.2
responsiveness = 0.2
merge_rate = 0.2
"#;
        let config = CadenceConfig::from_toml(toml).unwrap();
        assert_eq!(config.analysis.slope_threshold, 0.05);
        assert_eq!(config.scoring.activity_weight, 1.0);
        assert_eq!(config.scoring.weights.activity, 0.4);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = CadenceConfig::from_toml("").unwrap();
        assert_eq!(config.analysis.min_anomaly_window, 7);
        assert_eq!(config.scoring.weights.merge_rate, 0.25);
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(CadenceConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn weights_must_sum_to_one() {
        let toml = r#"
[scoring.weights]
activity = 0.5
staleness = 0.5
responsiveness = 0.5
merge_rate = 0.5
"#;
        let err = CadenceConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"), "got: {err}");
    }

    #[test]
    fn high_z_threshold_below_base_is_rejected() {
        let toml = r#"
[analysis]
z_threshold = 3.0
high_z_threshold = 2.0
"#;
        assert!(CadenceConfig::from_toml(toml).is_err());
    }

    #[test]
    fn zero_anomaly_window_is_rejected() {
        let toml = r#"
[analysis]
min_anomaly_window = 0
"#;
        assert!(CadenceConfig::from_toml(toml).is_err());
    }
}
