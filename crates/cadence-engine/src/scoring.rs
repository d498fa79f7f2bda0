//! Composite health scoring.
//!
//! Combines four normalized subscores (activity, staleness, responsiveness,
//! merge rate) into one bounded health score using configured weights.
//! Scoring is a pure function of its numeric inputs: identical inputs always
//! yield identical outputs.

use cadence_core::{ScopeRef, ScoringConfig};
use serde::{Deserialize, Serialize};

/// Scope-level aggregates the scorer consumes.
///
/// These are supplied by the caller alongside the metric records; they are
/// not derivable from per-period counters alone. Missing fields deserialize
/// as zero or empty, matching the engine's tolerance for partial data.
///
/// # Examples
///
/// ```
/// use cadence_engine::scoring::HealthInputs;
///
/// let inputs: HealthInputs = serde_json::from_str(
///     r#"{"recentActivityCount": 12, "mergedCount": 9, "totalCount": 10}"#,
/// ).unwrap();
/// assert_eq!(inputs.stale_item_count, 0);
/// assert!(inputs.latency_hours.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInputs {
    /// Activity items in the recent window.
    #[serde(default)]
    pub recent_activity_count: u64,
    /// Items considered stale (open too long without movement).
    #[serde(default)]
    pub stale_item_count: u64,
    /// Response latency samples, in hours.
    #[serde(default)]
    pub latency_hours: Vec<f64>,
    /// Pull requests merged or approved.
    #[serde(default)]
    pub merged_count: u64,
    /// Pull requests opened in total.
    #[serde(default)]
    pub total_count: u64,
}

/// The four subscores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscores {
    /// Saturating linear map of recent activity volume.
    pub activity: u8,
    /// 100 minus a penalty per stale item.
    pub staleness: u8,
    /// 100 minus average latency hours; 50 when no samples exist.
    pub responsiveness: u8,
    /// Merged share of total items; 50 when nothing was opened.
    pub merge_rate: u8,
}

/// Composite health score for one scope.
///
/// # Examples
///
/// ```
/// use cadence_core::{ScopeKind, ScopeRef, ScoringConfig};
/// use cadence_engine::scoring::{score_health, HealthInputs};
///
/// let scope = ScopeRef { kind: ScopeKind::Team, id: "platform".into() };
/// let inputs = HealthInputs {
///     recent_activity_count: 40,
///     stale_item_count: 2,
///     latency_hours: vec![10.0, 30.0],
///     merged_count: 9,
///     total_count: 10,
/// };
/// let score = score_health(&scope, &inputs, &ScoringConfig::default());
/// assert!(score.overall <= 100);
/// assert_eq!(score.subscores.activity, 80);
/// assert_eq!(score.subscores.merge_rate, 90);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    /// Scope the score belongs to.
    pub scope: ScopeRef,
    /// Weighted composite, rounded and clamped to `[0, 100]`.
    pub overall: u8,
    /// The four component scores.
    pub subscores: Subscores,
}

/// Compute the composite health score for one scope.
///
/// Subscores:
/// - activity: `min(100, activity_weight * recent_activity_count)`
/// - staleness: `max(0, 100 - staleness_penalty * stale_item_count)`
/// - responsiveness: `max(0, 100 - mean latency hours)`, or the neutral 50
///   when no samples exist
/// - merge rate: `100 * merged / total`, or the neutral 50 when `total == 0`
///
/// The overall score is the weighted sum of the unrounded subscores, rounded
/// to the nearest integer and clamped to `[0, 100]`.
pub fn score_health(scope: &ScopeRef, inputs: &HealthInputs, config: &ScoringConfig) -> HealthScore {
    let activity = (config.activity_weight * inputs.recent_activity_count as f64).min(100.0);
    let staleness = (100.0 - config.staleness_penalty * inputs.stale_item_count as f64).max(0.0);

    let responsiveness = if inputs.latency_hours.is_empty() {
        50.0
    } else {
        let avg_latency =
            inputs.latency_hours.iter().sum::<f64>() / inputs.latency_hours.len() as f64;
        (100.0 - avg_latency).max(0.0)
    };

    let merge_rate = if inputs.total_count > 0 {
        (100.0 * inputs.merged_count as f64 / inputs.total_count as f64).clamp(0.0, 100.0)
    } else {
        50.0
    };

    let weights = &config.weights;
    let overall = weights.activity * activity
        + weights.staleness * staleness
        + weights.responsiveness * responsiveness
        + weights.merge_rate * merge_rate;

    HealthScore {
        scope: scope.clone(),
        overall: clamp_round(overall),
        subscores: Subscores {
            activity: clamp_round(activity),
            staleness: clamp_round(staleness),
            responsiveness: clamp_round(responsiveness),
            merge_rate: clamp_round(merge_rate),
        },
    }
}

fn clamp_round(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::ScopeKind;

    fn scope() -> ScopeRef {
        ScopeRef {
            kind: ScopeKind::Repository,
            id: "cadence".into(),
        }
    }

    fn score(inputs: &HealthInputs) -> HealthScore {
        score_health(&scope(), inputs, &ScoringConfig::default())
    }

    #[test]
    fn zero_inputs_produce_defined_neutral_scores() {
        let result = score(&HealthInputs::default());
        assert_eq!(result.subscores.activity, 0);
        assert_eq!(result.subscores.staleness, 100);
        assert_eq!(result.subscores.responsiveness, 50);
        assert_eq!(result.subscores.merge_rate, 50);
        // 0.3*0 + 0.25*100 + 0.2*50 + 0.25*50 = 47.5, rounds to 48
        assert_eq!(result.overall, 48);
    }

    #[test]
    fn activity_saturates_at_100() {
        let result = score(&HealthInputs {
            recent_activity_count: 500,
            ..Default::default()
        });
        assert_eq!(result.subscores.activity, 100);
    }

    #[test]
    fn staleness_floors_at_zero() {
        let result = score(&HealthInputs {
            stale_item_count: 40,
            ..Default::default()
        });
        assert_eq!(result.subscores.staleness, 0);
    }

    #[test]
    fn responsiveness_uses_average_latency() {
        let result = score(&HealthInputs {
            latency_hours: vec![10.0, 20.0, 30.0],
            ..Default::default()
        });
        assert_eq!(result.subscores.responsiveness, 80);
    }

    #[test]
    fn extreme_latency_floors_at_zero() {
        let result = score(&HealthInputs {
            latency_hours: vec![500.0],
            ..Default::default()
        });
        assert_eq!(result.subscores.responsiveness, 0);
    }

    #[test]
    fn merge_rate_is_merged_share_of_total() {
        let result = score(&HealthInputs {
            merged_count: 3,
            total_count: 4,
            ..Default::default()
        });
        assert_eq!(result.subscores.merge_rate, 75);
    }

    #[test]
    fn overall_stays_in_bounds_for_arbitrary_nonnegative_inputs() {
        let cases = [
            HealthInputs::default(),
            HealthInputs {
                recent_activity_count: u64::from(u32::MAX),
                stale_item_count: 10_000,
                latency_hours: vec![0.0; 50],
                merged_count: 1,
                total_count: 1,
            },
            HealthInputs {
                recent_activity_count: 55,
                stale_item_count: 3,
                latency_hours: vec![1.5, 2.0, 72.0],
                merged_count: 17,
                total_count: 20,
            },
        ];
        for inputs in &cases {
            let result = score(inputs);
            assert!(result.overall <= 100);
            assert!(result.subscores.activity <= 100);
            assert!(result.subscores.staleness <= 100);
            assert!(result.subscores.responsiveness <= 100);
            assert!(result.subscores.merge_rate <= 100);
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let inputs = HealthInputs {
            recent_activity_count: 33,
            stale_item_count: 4,
            latency_hours: vec![6.0, 12.0],
            merged_count: 8,
            total_count: 11,
        };
        assert_eq!(score(&inputs), score(&inputs));
    }

    #[test]
    fn weights_shift_the_overall_score() {
        let inputs = HealthInputs {
            recent_activity_count: 50,
            ..Default::default()
        };
        let mut config = ScoringConfig::default();
        let default_overall = score_health(&scope(), &inputs, &config).overall;

        config.weights.activity = 0.7;
        config.weights.staleness = 0.1;
        config.weights.responsiveness = 0.1;
        config.weights.merge_rate = 0.1;
        let activity_heavy = score_health(&scope(), &inputs, &config).overall;

        // activity subscore is 100 here, so weighting it up raises the overall
        assert!(activity_heavy > default_overall);
    }
}
