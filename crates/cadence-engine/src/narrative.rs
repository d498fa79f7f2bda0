//! Rule-driven narrative generation.
//!
//! A small expert system over computed insight facts: each rule is a data
//! row pairing a predicate with an insight message and an optional
//! recommendation. Thresholds live in the rows, so they can be swapped or
//! probed in tests without touching the statistical components or the
//! message text.

use serde::{Deserialize, Serialize};

use crate::trend::{TrendDirection, TrendInsight};

/// One narrative finding attached to an insight bundle.
///
/// # Examples
///
/// ```
/// use cadence_engine::narrative::Observation;
///
/// let obs = Observation {
///     rule: "low-merge-rate".into(),
///     insight: "A low share of pull requests is being merged".into(),
///     recommendation: Some("Review common rejection and abandonment causes".into()),
/// };
/// assert!(obs.recommendation.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Name of the rule that fired.
    pub rule: String,
    /// Human-readable insight.
    pub insight: String,
    /// Suggested follow-up, when the rule defines one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// A rule evaluated once per classified metric trend.
///
/// Templates may contain a `{metric}` placeholder, substituted with the
/// metric's display name when the rule fires.
pub struct TrendRule {
    /// Stable rule name, used in [`Observation::rule`].
    pub name: &'static str,
    /// Fires when this returns true for a trend.
    pub predicate: fn(&TrendInsight) -> bool,
    /// Insight template.
    pub insight: &'static str,
    /// Recommendation template.
    pub recommendation: Option<&'static str>,
}

/// Aggregate facts the bundle-level rules evaluate against.
///
/// Fields are `None` when the corresponding insight type was not requested
/// or did not produce a result; rules over absent facts never fire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleFacts {
    /// High-severity anomaly count.
    pub high_anomalies: usize,
    /// Total anomaly count.
    pub total_anomalies: usize,
    /// Merge rate subscore, when health was computed.
    pub merge_rate_score: Option<u8>,
    /// Responsiveness subscore, when health was computed.
    pub responsiveness_score: Option<u8>,
    /// Staleness subscore, when health was computed.
    pub staleness_score: Option<u8>,
    /// Distinct counterpart count, when collaboration was computed.
    pub distinct_counterparts: Option<usize>,
}

/// A rule evaluated once per bundle.
///
/// The threshold is data, passed to the predicate at evaluation time, so a
/// custom table can reuse a predicate with a different cutoff.
pub struct BundleRule {
    /// Stable rule name, used in [`Observation::rule`].
    pub name: &'static str,
    /// Cutoff handed to the predicate.
    pub threshold: f64,
    /// Fires when this returns true for the facts and threshold.
    pub predicate: fn(&BundleFacts, f64) -> bool,
    /// Insight text.
    pub insight: &'static str,
    /// Recommendation text.
    pub recommendation: Option<&'static str>,
}

static DEFAULT_TREND_RULES: &[TrendRule] = &[
    TrendRule {
        name: "declining-metric",
        predicate: |t| t.direction == TrendDirection::Declining,
        insight: "{metric} is trending downward",
        recommendation: Some("Investigate the recent drop in {metric}"),
    },
    TrendRule {
        name: "improving-metric",
        predicate: |t| t.direction == TrendDirection::Improving,
        insight: "{metric} is trending upward",
        recommendation: None,
    },
    TrendRule {
        name: "volatile-metric",
        predicate: |t| t.high_volatility,
        insight: "{metric} swings widely between periods",
        recommendation: Some("Look for irregular spikes or gaps in {metric}"),
    },
];

/// The built-in per-trend rule table.
pub fn default_trend_rules() -> &'static [TrendRule] {
    DEFAULT_TREND_RULES
}

static DEFAULT_BUNDLE_RULES: &[BundleRule] = &[
    BundleRule {
        name: "low-merge-rate",
        threshold: 70.0,
        predicate: |f, t| f.merge_rate_score.is_some_and(|s| f64::from(s) < t),
        insight: "A low share of pull requests is being merged",
        recommendation: Some("Review common rejection and abandonment causes"),
    },
    BundleRule {
        name: "slow-reviews",
        threshold: 50.0,
        predicate: |f, t| f.responsiveness_score.is_some_and(|s| f64::from(s) < t),
        insight: "Review turnaround is slow",
        recommendation: Some("Triage incoming review requests daily"),
    },
    BundleRule {
        name: "stale-backlog",
        threshold: 50.0,
        predicate: |f, t| f.staleness_score.is_some_and(|s| f64::from(s) < t),
        insight: "Stale items are piling up",
        recommendation: Some("Close or revive long-open pull requests"),
    },
    BundleRule {
        name: "anomalous-activity",
        threshold: 1.0,
        predicate: |f, t| f.high_anomalies as f64 >= t,
        insight: "Activity shows statistically unusual periods",
        recommendation: Some("Check the flagged periods for incidents or process changes"),
    },
    BundleRule {
        name: "narrow-collaboration",
        threshold: 2.0,
        predicate: |f, t| {
            f.distinct_counterparts
                .is_some_and(|c| c > 0 && (c as f64) < t)
        },
        insight: "Collaboration is concentrated on very few people",
        recommendation: Some("Encourage broader review participation"),
    },
];

/// The built-in bundle-level rule table.
pub fn default_bundle_rules() -> &'static [BundleRule] {
    DEFAULT_BUNDLE_RULES
}

/// Evaluate the trend rules over every classified trend.
///
/// Observations come out in table order within each trend, and trends are
/// visited in their given order, so output ordering is deterministic.
pub fn evaluate_trend_rules(rules: &[TrendRule], trends: &[TrendInsight]) -> Vec<Observation> {
    let mut observations = Vec::new();
    for trend in trends {
        let metric = trend.summary.metric.to_string();
        for rule in rules {
            if (rule.predicate)(trend) {
                observations.push(Observation {
                    rule: rule.name.to_string(),
                    insight: rule.insight.replace("{metric}", &metric),
                    recommendation: rule
                        .recommendation
                        .map(|r| r.replace("{metric}", &metric)),
                });
            }
        }
    }
    observations
}

/// Evaluate the bundle rules over aggregate facts.
pub fn evaluate_bundle_rules(rules: &[BundleRule], facts: &BundleFacts) -> Vec<Observation> {
    rules
        .iter()
        .filter(|rule| (rule.predicate)(facts, rule.threshold))
        .map(|rule| Observation {
            rule: rule.name.to_string(),
            insight: rule.insight.to_string(),
            recommendation: rule.recommendation.map(str::to_string),
        })
        .collect()
}
