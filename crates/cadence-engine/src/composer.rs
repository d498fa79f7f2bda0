//! Insight composition.
//!
//! Orchestrates the statistical components over one scope's records,
//! assembles the per-type sections into an [`InsightBundle`], and attaches
//! rule-driven narrative observations. Each requested insight type is
//! computed independently: one type failing or lacking data never aborts
//! its siblings, and the outcome of every requested type is recorded
//! explicitly in the bundle.

use std::fmt;
use std::str::FromStr;

use cadence_core::{
    CadenceConfig, CadenceError, DateRange, InteractionEvent, MetricKey, MetricRecord, ScopeKind,
    ScopeRef,
};
use serde::{Deserialize, Serialize};

use crate::anomaly::{detect_anomalies, Anomaly, AnomalyScan, AnomalySeverity};
use crate::narrative::{
    default_bundle_rules, default_trend_rules, evaluate_bundle_rules, evaluate_trend_rules,
    BundleFacts, Observation,
};
use crate::network::{build_network, CollaborationReport};
use crate::scoring::{score_health, HealthInputs, HealthScore};
use crate::trend::{analyze_trend, TrendInsight};

/// The insight types the composer can produce.
///
/// # Examples
///
/// ```
/// use cadence_engine::composer::InsightKind;
///
/// let kind: InsightKind = "anomalies".parse().unwrap();
/// assert_eq!(kind, InsightKind::Anomalies);
///
/// // Unknown types fail loudly instead of being skipped.
/// assert!("sentiment".parse::<InsightKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// Per-metric trend fits.
    Trends,
    /// Per-metric anomaly scans.
    Anomalies,
    /// Collaboration network aggregation.
    Collaboration,
    /// Composite health score.
    Health,
}

impl InsightKind {
    /// All insight kinds, in canonical bundle order.
    pub const ALL: [InsightKind; 4] = [
        InsightKind::Trends,
        InsightKind::Anomalies,
        InsightKind::Collaboration,
        InsightKind::Health,
    ];

    /// Parse a comma-separated list of kind names.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::UnknownInsightType`] on the first name that
    /// does not match a known kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use cadence_engine::composer::InsightKind;
    ///
    /// let kinds = InsightKind::parse_list("trends, health").unwrap();
    /// assert_eq!(kinds, vec![InsightKind::Trends, InsightKind::Health]);
    /// ```
    pub fn parse_list(input: &str) -> Result<Vec<InsightKind>, CadenceError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightKind::Trends => write!(f, "trends"),
            InsightKind::Anomalies => write!(f, "anomalies"),
            InsightKind::Collaboration => write!(f, "collaboration"),
            InsightKind::Health => write!(f, "health"),
        }
    }
}

impl FromStr for InsightKind {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trends" => Ok(InsightKind::Trends),
            "anomalies" => Ok(InsightKind::Anomalies),
            "collaboration" => Ok(InsightKind::Collaboration),
            "health" => Ok(InsightKind::Health),
            other => Err(CadenceError::UnknownInsightType(other.to_string())),
        }
    }
}

/// Everything the composer needs for one scope: pre-queried records,
/// interaction events, and optional scope-level health aggregates.
///
/// The supplying collaborator is responsible for date-bounding; the engine
/// treats every record as in scope and only re-sorts defensively by period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    /// Subject of the analysis.
    pub scope: ScopeRef,
    /// Window the records were queried for.
    pub date_range: DateRange,
    /// Per-period activity records, one per period.
    #[serde(default)]
    pub records: Vec<MetricRecord>,
    /// Pairwise interaction events in the window.
    #[serde(default)]
    pub interactions: Vec<InteractionEvent>,
    /// Scope-level aggregates for health scoring, when the caller has them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthInputs>,
}

/// Outcome of one requested insight type.
///
/// Never a silent empty success: a type that could not run reports why.
///
/// # Examples
///
/// ```
/// use cadence_engine::composer::InsightSection;
///
/// let section: InsightSection<Vec<u32>> = InsightSection::InsufficientData {
///     required: 7,
///     actual: 3,
/// };
/// assert!(section.ready().is_none());
///
/// let json = serde_json::to_value(&section).unwrap();
/// assert_eq!(json["status"], "insufficientData");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum InsightSection<T> {
    /// The computation ran to completion.
    #[serde(rename_all = "camelCase")]
    Ready {
        /// The computed result.
        data: T,
    },
    /// Fewer data points than the computation requires.
    #[serde(rename_all = "camelCase")]
    InsufficientData {
        /// Minimum points required.
        required: usize,
        /// Points supplied.
        actual: usize,
    },
    /// The computation failed; siblings are unaffected.
    #[serde(rename_all = "camelCase")]
    Failed {
        /// What went wrong.
        error: String,
    },
}

impl<T> InsightSection<T> {
    /// The computed result, when this section is ready.
    pub fn ready(&self) -> Option<&T> {
        match self {
            InsightSection::Ready { data } => Some(data),
            _ => None,
        }
    }

    fn from_result(result: Result<InsightSection<T>, CadenceError>) -> Self {
        result.unwrap_or_else(|e| InsightSection::Failed {
            error: e.to_string(),
        })
    }
}

/// Classified trends for every metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    /// One classified trend per metric, in canonical metric order.
    pub trends: Vec<TrendInsight>,
}

/// All anomalies found across the scanned metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    /// Anomalies ordered by period, then canonical metric order.
    pub anomalies: Vec<Anomaly>,
    /// Number of metric series scanned.
    pub metrics_scanned: usize,
}

/// The complete insight output for one scope and window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightBundle {
    /// Subject the insights describe.
    pub scope: ScopeRef,
    /// Window the insights cover.
    pub date_range: DateRange,
    /// Trend section, present when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<InsightSection<TrendReport>>,
    /// Anomaly section, present when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<InsightSection<AnomalyReport>>,
    /// Collaboration section, present when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaboration: Option<InsightSection<CollaborationReport>>,
    /// Health section, present when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<InsightSection<HealthScore>>,
    /// Narrative findings from the rule tables, in rule-table order.
    pub observations: Vec<Observation>,
}

/// Drives the statistical components and assembles insight bundles.
///
/// Stateless apart from configuration: composing the same input twice
/// yields byte-identical serialized output.
///
/// # Examples
///
/// ```
/// use cadence_core::{CadenceConfig, DateRange, ScopeKind, ScopeRef};
/// use cadence_engine::composer::{AnalysisInput, InsightComposer, InsightKind};
/// use chrono::{TimeZone, Utc};
///
/// let composer = InsightComposer::new(CadenceConfig::default());
/// let input = AnalysisInput {
///     scope: ScopeRef { kind: ScopeKind::Team, id: "platform".into() },
///     date_range: DateRange {
///         start: Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
///         end: Utc.with_ymd_and_hms(2025, 6, 16, 0, 0, 0).unwrap(),
///     },
///     records: vec![],
///     interactions: vec![],
///     health: None,
/// };
///
/// let bundle = composer.compose(&input, &InsightKind::ALL);
/// // No data: every requested section reports why it has nothing.
/// assert!(bundle.trends.unwrap().ready().is_none());
/// ```
pub struct InsightComposer {
    config: CadenceConfig,
}

impl InsightComposer {
    /// Create a composer with the given configuration.
    pub fn new(config: CadenceConfig) -> Self {
        Self { config }
    }

    /// Compose an insight bundle for one scope.
    ///
    /// Only the requested kinds are computed; each lands in its own bundle
    /// section as ready, insufficient-data, or failed. The composer always
    /// returns a bundle.
    pub fn compose(&self, input: &AnalysisInput, kinds: &[InsightKind]) -> InsightBundle {
        // Defensive re-sort into a private buffer; input records stay untouched.
        let mut sorted: Vec<&MetricRecord> = input.records.iter().collect();
        sorted.sort_by_key(|r| r.period);

        let mut bundle = InsightBundle {
            scope: input.scope.clone(),
            date_range: input.date_range,
            trends: None,
            anomalies: None,
            collaboration: None,
            health: None,
            observations: Vec::new(),
        };

        for kind in InsightKind::ALL {
            if !kinds.contains(&kind) {
                continue;
            }
            match kind {
                InsightKind::Trends => {
                    bundle.trends = Some(InsightSection::from_result(self.trends(&sorted)));
                }
                InsightKind::Anomalies => {
                    bundle.anomalies = Some(InsightSection::from_result(self.anomalies(&sorted)));
                }
                InsightKind::Collaboration => {
                    bundle.collaboration = Some(InsightSection::from_result(
                        self.collaboration(&input.scope, &input.interactions),
                    ));
                }
                InsightKind::Health => {
                    bundle.health = Some(InsightSection::from_result(
                        self.health(&input.scope, input.health.as_ref()),
                    ));
                }
            }
        }

        bundle.observations = self.narrate(&bundle);
        bundle
    }

    fn trends(
        &self,
        sorted: &[&MetricRecord],
    ) -> Result<InsightSection<TrendReport>, CadenceError> {
        if sorted.is_empty() {
            return Ok(InsightSection::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let trends = MetricKey::ALL
            .iter()
            .map(|&metric| {
                let samples: Vec<f64> = sorted
                    .iter()
                    .map(|r| metric.value_of(&r.counts))
                    .collect();
                analyze_trend(metric, &samples).classify(&self.config.analysis)
            })
            .collect();
        Ok(InsightSection::Ready {
            data: TrendReport { trends },
        })
    }

    fn anomalies(
        &self,
        sorted: &[&MetricRecord],
    ) -> Result<InsightSection<AnomalyReport>, CadenceError> {
        let mut anomalies = Vec::new();
        for metric in MetricKey::ALL {
            let points: Vec<_> = sorted
                .iter()
                .map(|r| (r.period, metric.value_of(&r.counts)))
                .collect();
            match detect_anomalies(metric, &points, &self.config.analysis) {
                AnomalyScan::Ready(found) => anomalies.extend(found),
                AnomalyScan::InsufficientData { required, actual } => {
                    // Series lengths are uniform across metrics, so the
                    // whole section is short on data.
                    return Ok(InsightSection::InsufficientData { required, actual });
                }
            }
        }

        let metric_rank =
            |m: MetricKey| MetricKey::ALL.iter().position(|&k| k == m).unwrap_or(0);
        anomalies.sort_by_key(|a| (a.period, metric_rank(a.metric)));

        Ok(InsightSection::Ready {
            data: AnomalyReport {
                anomalies,
                metrics_scanned: MetricKey::ALL.len(),
            },
        })
    }

    fn collaboration(
        &self,
        scope: &ScopeRef,
        interactions: &[InteractionEvent],
    ) -> Result<InsightSection<CollaborationReport>, CadenceError> {
        if interactions.is_empty() {
            return Ok(InsightSection::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let subject = match scope.kind {
            ScopeKind::User => Some(scope.id.as_str()),
            ScopeKind::Repository | ScopeKind::Team => None,
        };
        Ok(InsightSection::Ready {
            data: build_network(subject, interactions),
        })
    }

    fn health(
        &self,
        scope: &ScopeRef,
        inputs: Option<&HealthInputs>,
    ) -> Result<InsightSection<HealthScore>, CadenceError> {
        let Some(inputs) = inputs else {
            return Ok(InsightSection::InsufficientData {
                required: 1,
                actual: 0,
            });
        };
        Ok(InsightSection::Ready {
            data: score_health(scope, inputs, &self.config.scoring),
        })
    }

    fn narrate(&self, bundle: &InsightBundle) -> Vec<Observation> {
        let mut observations = Vec::new();

        if let Some(report) = bundle.trends.as_ref().and_then(InsightSection::ready) {
            observations.extend(evaluate_trend_rules(default_trend_rules(), &report.trends));
        }

        let mut facts = BundleFacts::default();
        if let Some(report) = bundle.anomalies.as_ref().and_then(InsightSection::ready) {
            facts.total_anomalies = report.anomalies.len();
            facts.high_anomalies = report
                .anomalies
                .iter()
                .filter(|a| a.severity == AnomalySeverity::High)
                .count();
        }
        if let Some(report) = bundle.collaboration.as_ref().and_then(InsightSection::ready) {
            facts.distinct_counterparts = Some(report.distinct_counterparts);
        }
        if let Some(score) = bundle.health.as_ref().and_then(InsightSection::ready) {
            facts.merge_rate_score = Some(score.subscores.merge_rate);
            facts.responsiveness_score = Some(score.subscores.responsiveness);
            facts.staleness_score = Some(score.subscores.staleness);
        }
        observations.extend(evaluate_bundle_rules(default_bundle_rules(), &facts));

        observations
    }
}
