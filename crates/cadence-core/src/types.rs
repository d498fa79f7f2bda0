use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The subject of an analysis: a contributor, a repository, or the whole team.
///
/// # Examples
///
/// ```
/// use cadence_core::ScopeKind;
///
/// let kind: ScopeKind = serde_json::from_str("\"repository\"").unwrap();
/// assert_eq!(kind, ScopeKind::Repository);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// A single contributor.
    User,
    /// A single repository.
    Repository,
    /// The team as a whole.
    Team,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::User => write!(f, "user"),
            ScopeKind::Repository => write!(f, "repository"),
            ScopeKind::Team => write!(f, "team"),
        }
    }
}

/// Identifies one analysis subject.
///
/// # Examples
///
/// ```
/// use cadence_core::{ScopeKind, ScopeRef};
///
/// let scope = ScopeRef {
///     kind: ScopeKind::User,
///     id: "alice".into(),
/// };
/// assert_eq!(scope.to_string(), "user:alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRef {
    /// What kind of subject this is.
    pub kind: ScopeKind,
    /// Opaque identifier within that kind.
    pub id: String,
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Per-period activity counters for one scope.
///
/// Every field defaults to 0 when absent from the input. A record missing a
/// counter is treated as zero activity for that counter rather than aborting
/// the batch, so aggregate analyses stay resilient to partial data.
///
/// # Examples
///
/// ```
/// use cadence_core::ActivityCounts;
///
/// // Missing counters deserialize as 0.
/// let counts: ActivityCounts = serde_json::from_str(r#"{"opened": 3}"#).unwrap();
/// assert_eq!(counts.opened, 3);
/// assert_eq!(counts.merged, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
    /// Pull requests opened.
    #[serde(default)]
    pub opened: u64,
    /// Pull requests merged.
    #[serde(default)]
    pub merged: u64,
    /// Reviews given.
    #[serde(default)]
    pub reviews_given: u64,
    /// Comments given.
    #[serde(default)]
    pub comments_given: u64,
    /// Commits pushed.
    #[serde(default)]
    pub commits: u64,
    /// Lines added.
    #[serde(default)]
    pub lines_added: u64,
    /// Lines deleted.
    #[serde(default)]
    pub lines_deleted: u64,
}

/// Pre-computed composite scores carried by some upstream data sources.
///
/// Passed through untouched; the engine computes its own health scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecomputedScores {
    /// Upstream productivity score.
    pub productivity: f64,
    /// Upstream quality score.
    pub quality: f64,
    /// Upstream collaboration score.
    pub collaboration: f64,
}

/// One period of activity for one scope.
///
/// Records are immutable input: the engine never mutates them, and re-sorts
/// defensively into its own buffers when period order matters.
///
/// # Examples
///
/// ```
/// use cadence_core::{ActivityCounts, MetricRecord, ScopeKind, ScopeRef};
/// use chrono::{TimeZone, Utc};
///
/// let record = MetricRecord {
///     period: Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
///     scope: ScopeRef { kind: ScopeKind::User, id: "alice".into() },
///     counts: ActivityCounts { opened: 2, ..Default::default() },
///     scores: None,
/// };
/// assert_eq!(record.counts.opened, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    /// Start of the period this record covers.
    pub period: DateTime<Utc>,
    /// Subject the counters are attributed to.
    pub scope: ScopeRef,
    /// Activity counters for the period.
    #[serde(default)]
    pub counts: ActivityCounts,
    /// Optional upstream scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<PrecomputedScores>,
}

/// Opaque actor identity, used only for attribution.
///
/// # Examples
///
/// ```
/// use cadence_core::ActorRef;
///
/// let actor = ActorRef {
///     id: "alice".into(),
///     display_name: "Alice".into(),
///     avatar_url: None,
/// };
/// assert_eq!(actor.id, "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    /// Stable identifier.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Avatar image URL, if the upstream source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Classification of a pairwise interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionKind {
    /// The subject reviewed someone else's pull request.
    ReviewGiven,
    /// Someone reviewed the subject's pull request.
    ReviewReceived,
    /// A comment left on someone's pull request.
    CommentGiven,
}

/// A single pairwise interaction between two actors.
///
/// `from_actor` is always the initiator (the reviewer or commenter) and
/// `to_actor` the recipient (the pull request author).
///
/// # Examples
///
/// ```
/// use cadence_core::{ActorRef, InteractionEvent, InteractionKind};
/// use chrono::{TimeZone, Utc};
///
/// let event = InteractionEvent {
///     kind: InteractionKind::ReviewGiven,
///     from_actor: ActorRef { id: "alice".into(), display_name: "Alice".into(), avatar_url: None },
///     to_actor: ActorRef { id: "bob".into(), display_name: "Bob".into(), avatar_url: None },
///     timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap(),
/// };
/// assert_eq!(event.from_actor.id, "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    /// What happened.
    pub kind: InteractionKind,
    /// Initiator (reviewer or commenter).
    pub from_actor: ActorRef,
    /// Recipient (pull request author).
    pub to_actor: ActorRef,
    /// When the interaction happened.
    pub timestamp: DateTime<Utc>,
}

/// The activity counters an analysis can run over.
///
/// Implements [`FromStr`] and [`fmt::Display`] using the same camelCase names
/// the serialized record fields use.
///
/// # Examples
///
/// ```
/// use cadence_core::MetricKey;
///
/// let key: MetricKey = "pullRequestsOpened".parse().unwrap();
/// assert_eq!(key, MetricKey::PullRequestsOpened);
/// assert_eq!(key.to_string(), "pullRequestsOpened");
/// assert!("velocity".parse::<MetricKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    /// Pull requests opened per period.
    PullRequestsOpened,
    /// Pull requests merged per period.
    PullRequestsMerged,
    /// Reviews given per period.
    ReviewsGiven,
    /// Comments given per period.
    CommentsGiven,
    /// Commits per period.
    Commits,
    /// Lines added per period.
    LinesAdded,
    /// Lines deleted per period.
    LinesDeleted,
}

impl MetricKey {
    /// All metric keys, in the canonical reporting order.
    pub const ALL: [MetricKey; 7] = [
        MetricKey::PullRequestsOpened,
        MetricKey::PullRequestsMerged,
        MetricKey::ReviewsGiven,
        MetricKey::CommentsGiven,
        MetricKey::Commits,
        MetricKey::LinesAdded,
        MetricKey::LinesDeleted,
    ];

    /// Extract this metric's value from one period's counters.
    ///
    /// # Examples
    ///
    /// ```
    /// use cadence_core::{ActivityCounts, MetricKey};
    ///
    /// let counts = ActivityCounts { commits: 7, ..Default::default() };
    /// assert_eq!(MetricKey::Commits.value_of(&counts), 7.0);
    /// ```
    pub fn value_of(self, counts: &ActivityCounts) -> f64 {
        let raw = match self {
            MetricKey::PullRequestsOpened => counts.opened,
            MetricKey::PullRequestsMerged => counts.merged,
            MetricKey::ReviewsGiven => counts.reviews_given,
            MetricKey::CommentsGiven => counts.comments_given,
            MetricKey::Commits => counts.commits,
            MetricKey::LinesAdded => counts.lines_added,
            MetricKey::LinesDeleted => counts.lines_deleted,
        };
        raw as f64
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKey::PullRequestsOpened => "pullRequestsOpened",
            MetricKey::PullRequestsMerged => "pullRequestsMerged",
            MetricKey::ReviewsGiven => "reviewsGiven",
            MetricKey::CommentsGiven => "commentsGiven",
            MetricKey::Commits => "commits",
            MetricKey::LinesAdded => "linesAdded",
            MetricKey::LinesDeleted => "linesDeleted",
        };
        write!(f, "{name}")
    }
}

impl FromStr for MetricKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pullRequestsOpened" => Ok(MetricKey::PullRequestsOpened),
            "pullRequestsMerged" => Ok(MetricKey::PullRequestsMerged),
            "reviewsGiven" => Ok(MetricKey::ReviewsGiven),
            "commentsGiven" => Ok(MetricKey::CommentsGiven),
            "commits" => Ok(MetricKey::Commits),
            "linesAdded" => Ok(MetricKey::LinesAdded),
            "linesDeleted" => Ok(MetricKey::LinesDeleted),
            other => Err(format!("unknown metric key: {other}")),
        }
    }
}

/// The date window an analysis covers.
///
/// The engine trusts that supplied records are already filtered to this
/// window and treats all of them as in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Inclusive window start.
    pub start: DateTime<Utc>,
    /// Inclusive window end.
    pub end: DateTime<Utc>,
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use cadence_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn scope_kind_roundtrips_through_json() {
        let json = serde_json::to_string(&ScopeKind::Team).unwrap();
        assert_eq!(json, "\"team\"");

        let parsed: ScopeKind = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, ScopeKind::User);
    }

    #[test]
    fn metric_key_display_matches_from_str() {
        for key in MetricKey::ALL {
            let name = key.to_string();
            assert_eq!(name.parse::<MetricKey>().unwrap(), key);
        }
    }

    #[test]
    fn metric_key_rejects_unknown_names() {
        assert!("burnRate".parse::<MetricKey>().is_err());
        assert!("pull_requests_opened".parse::<MetricKey>().is_err());
    }

    #[test]
    fn metric_key_extracts_each_counter() {
        let counts = ActivityCounts {
            opened: 1,
            merged: 2,
            reviews_given: 3,
            comments_given: 4,
            commits: 5,
            lines_added: 6,
            lines_deleted: 7,
        };
        let extracted: Vec<f64> = MetricKey::ALL.iter().map(|k| k.value_of(&counts)).collect();
        assert_eq!(extracted, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let record: MetricRecord = serde_json::from_str(
            r#"{
                "period": "2025-06-02T00:00:00Z",
                "scope": {"kind": "user", "id": "alice"},
                "counts": {"commits": 4, "linesAdded": 120}
            }"#,
        )
        .unwrap();
        assert_eq!(record.counts.commits, 4);
        assert_eq!(record.counts.opened, 0);
        assert_eq!(record.counts.reviews_given, 0);
        assert!(record.scores.is_none());
    }

    #[test]
    fn metric_record_serializes_camel_case() {
        let record = MetricRecord {
            period: Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
            scope: ScopeRef {
                kind: ScopeKind::Repository,
                id: "cadence".into(),
            },
            counts: ActivityCounts {
                reviews_given: 2,
                ..Default::default()
            },
            scores: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["counts"].get("reviewsGiven").is_some());
        assert!(json["counts"].get("reviews_given").is_none());
    }

    #[test]
    fn interaction_event_roundtrips() {
        let event = InteractionEvent {
            kind: InteractionKind::CommentGiven,
            from_actor: ActorRef {
                id: "bob".into(),
                display_name: "Bob".into(),
                avatar_url: Some("https://example.com/bob.png".into()),
            },
            to_actor: ActorRef {
                id: "alice".into(),
                display_name: "Alice".into(),
                avatar_url: None,
            },
            timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"commentGiven\""));
        let back: InteractionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "md".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn scope_ref_display() {
        let scope = ScopeRef {
            kind: ScopeKind::Repository,
            id: "cadence".into(),
        };
        assert_eq!(scope.to_string(), "repository:cadence");
    }
}
