//! Collaboration network aggregation.
//!
//! Folds pairwise interaction events into a weighted actor-to-actor view:
//! per-counterpart directional counts ranked by interaction volume, plus
//! directional edges between every interacting pair. Accumulation runs over
//! ordered maps and ties break on actor id, so identical input always
//! produces identically ordered output.

use std::collections::BTreeMap;

use cadence_core::{ActorRef, InteractionEvent, InteractionKind};
use serde::{Deserialize, Serialize};

/// Aggregated interaction counts with one counterpart.
///
/// # Examples
///
/// ```
/// use cadence_core::ActorRef;
/// use cadence_engine::network::CounterpartLink;
///
/// let link = CounterpartLink {
///     actor: ActorRef { id: "bob".into(), display_name: "Bob".into(), avatar_url: None },
///     reviews_given: 3,
///     reviews_received: 1,
///     comments: 2,
/// };
/// assert_eq!(link.total(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterpartLink {
    /// The counterpart actor.
    pub actor: ActorRef,
    /// Reviews the subject gave this counterpart.
    pub reviews_given: u64,
    /// Reviews the subject received from this counterpart.
    pub reviews_received: u64,
    /// Comments exchanged with this counterpart.
    pub comments: u64,
}

impl CounterpartLink {
    /// Total interaction volume with this counterpart.
    pub fn total(&self) -> u64 {
        self.reviews_given + self.reviews_received + self.comments
    }

    fn new(actor: ActorRef) -> Self {
        Self {
            actor,
            reviews_given: 0,
            reviews_received: 0,
            comments: 0,
        }
    }
}

/// Directional interaction counts between one pair of actors.
///
/// `actor_a` is always the actor with the lexicographically smaller id, so a
/// pair has exactly one edge regardless of event order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEdge {
    /// Pair member with the smaller id.
    pub actor_a: ActorRef,
    /// Pair member with the larger id.
    pub actor_b: ActorRef,
    /// Reviews A gave B.
    pub reviews_a_to_b: u64,
    /// Reviews B gave A.
    pub reviews_b_to_a: u64,
    /// Comments A left for B.
    pub comments_a_to_b: u64,
    /// Comments B left for A.
    pub comments_b_to_a: u64,
}

impl NetworkEdge {
    /// Total interaction volume across both directions.
    pub fn total(&self) -> u64 {
        self.reviews_a_to_b + self.reviews_b_to_a + self.comments_a_to_b + self.comments_b_to_a
    }
}

/// The collaboration structure computed for one scope.
///
/// For a user scope, `counterparts` holds everyone the subject interacted
/// with, keyed by the counterpart and never the subject. For repository and
/// team scopes it holds every participant with their own totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationReport {
    /// Counterparts ranked by total volume descending, ties by id ascending.
    pub counterparts: Vec<CounterpartLink>,
    /// Directional pair edges, ranked the same way.
    pub edges: Vec<NetworkEdge>,
    /// Number of distinct counterparts.
    pub distinct_counterparts: usize,
    /// Total interactions divided by counterpart count; 0 when there are none.
    pub avg_interactions: f64,
}

/// Aggregate interaction events into a collaboration report.
///
/// With `subject` set, the report is subject-centric: only events involving
/// the subject contribute, and counts are attributed to the counterpart.
/// Without a subject (repository or team scope) every event contributes to
/// both participants' entries. Self-interactions are skipped either way.
///
/// # Examples
///
/// ```
/// use cadence_core::{ActorRef, InteractionEvent, InteractionKind};
/// use cadence_engine::network::build_network;
/// use chrono::{TimeZone, Utc};
///
/// let actor = |id: &str| ActorRef {
///     id: id.into(),
///     display_name: id.to_uppercase(),
///     avatar_url: None,
/// };
/// let events = vec![InteractionEvent {
///     kind: InteractionKind::ReviewGiven,
///     from_actor: actor("alice"),
///     to_actor: actor("bob"),
///     timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
/// }];
///
/// let report = build_network(Some("alice"), &events);
/// assert_eq!(report.distinct_counterparts, 1);
/// assert_eq!(report.counterparts[0].actor.id, "bob");
/// assert_eq!(report.counterparts[0].reviews_given, 1);
/// ```
pub fn build_network(subject: Option<&str>, events: &[InteractionEvent]) -> CollaborationReport {
    let mut links: BTreeMap<String, CounterpartLink> = BTreeMap::new();
    let mut edges: BTreeMap<(String, String), NetworkEdge> = BTreeMap::new();

    for event in events {
        let from = &event.from_actor;
        let to = &event.to_actor;
        if from.id == to.id {
            continue;
        }

        match subject {
            Some(subject_id) => {
                let (counterpart, subject_initiated) = if from.id == subject_id {
                    (to, true)
                } else if to.id == subject_id {
                    (from, false)
                } else {
                    continue;
                };
                let link = links
                    .entry(counterpart.id.clone())
                    .or_insert_with(|| CounterpartLink::new(counterpart.clone()));
                match (event.kind, subject_initiated) {
                    (InteractionKind::CommentGiven, _) => link.comments += 1,
                    (_, true) => link.reviews_given += 1,
                    (_, false) => link.reviews_received += 1,
                }
            }
            None => {
                let initiator = links
                    .entry(from.id.clone())
                    .or_insert_with(|| CounterpartLink::new(from.clone()));
                match event.kind {
                    InteractionKind::CommentGiven => initiator.comments += 1,
                    _ => initiator.reviews_given += 1,
                }
                let recipient = links
                    .entry(to.id.clone())
                    .or_insert_with(|| CounterpartLink::new(to.clone()));
                match event.kind {
                    InteractionKind::CommentGiven => recipient.comments += 1,
                    _ => recipient.reviews_received += 1,
                }
            }
        }

        record_edge(&mut edges, event);
    }

    let mut counterparts: Vec<CounterpartLink> = links.into_values().collect();
    counterparts.sort_by(|a, b| b.total().cmp(&a.total()).then(a.actor.id.cmp(&b.actor.id)));

    let mut edges: Vec<NetworkEdge> = edges.into_values().collect();
    edges.sort_by(|a, b| {
        b.total()
            .cmp(&a.total())
            .then(a.actor_a.id.cmp(&b.actor_a.id))
            .then(a.actor_b.id.cmp(&b.actor_b.id))
    });

    let distinct_counterparts = counterparts.len();
    let total_interactions: u64 = counterparts.iter().map(CounterpartLink::total).sum();
    let avg_interactions = if distinct_counterparts == 0 {
        0.0
    } else {
        total_interactions as f64 / distinct_counterparts as f64
    };

    CollaborationReport {
        counterparts,
        edges,
        distinct_counterparts,
        avg_interactions,
    }
}

fn record_edge(edges: &mut BTreeMap<(String, String), NetworkEdge>, event: &InteractionEvent) {
    let from = &event.from_actor;
    let to = &event.to_actor;
    // Normalized key: smaller id is always actor A.
    let (a, b) = if from.id <= to.id { (from, to) } else { (to, from) };
    let edge = edges
        .entry((a.id.clone(), b.id.clone()))
        .or_insert_with(|| NetworkEdge {
            actor_a: a.clone(),
            actor_b: b.clone(),
            reviews_a_to_b: 0,
            reviews_b_to_a: 0,
            comments_a_to_b: 0,
            comments_b_to_a: 0,
        });

    let a_initiated = from.id == edge.actor_a.id;
    match (event.kind, a_initiated) {
        (InteractionKind::CommentGiven, true) => edge.comments_a_to_b += 1,
        (InteractionKind::CommentGiven, false) => edge.comments_b_to_a += 1,
        (_, true) => edge.reviews_a_to_b += 1,
        (_, false) => edge.reviews_b_to_a += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn actor(id: &str) -> ActorRef {
        ActorRef {
            id: id.into(),
            display_name: id.to_uppercase(),
            avatar_url: None,
        }
    }

    fn event(kind: InteractionKind, from: &str, to: &str) -> InteractionEvent {
        InteractionEvent {
            kind,
            from_actor: actor(from),
            to_actor: actor(to),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn counterpart_counts_from_subject_perspective() {
        // A reviews B x3, B reviews A x1, A comments on B x2.
        let mut events = Vec::new();
        for _ in 0..3 {
            events.push(event(InteractionKind::ReviewGiven, "alice", "bob"));
        }
        events.push(event(InteractionKind::ReviewGiven, "bob", "alice"));
        for _ in 0..2 {
            events.push(event(InteractionKind::CommentGiven, "alice", "bob"));
        }

        let report = build_network(Some("alice"), &events);
        assert_eq!(report.distinct_counterparts, 1);
        let bob = &report.counterparts[0];
        assert_eq!(bob.actor.id, "bob");
        assert_eq!(bob.reviews_given, 3);
        assert_eq!(bob.reviews_received, 1);
        assert_eq!(bob.comments, 2);
        assert_eq!(bob.total(), 6);
        assert_eq!(report.avg_interactions, 6.0);
    }

    #[test]
    fn ranking_is_by_volume_descending() {
        let mut events = Vec::new();
        events.push(event(InteractionKind::ReviewGiven, "alice", "carol"));
        for _ in 0..4 {
            events.push(event(InteractionKind::ReviewGiven, "alice", "bob"));
        }

        let report = build_network(Some("alice"), &events);
        assert_eq!(report.counterparts[0].actor.id, "bob");
        assert_eq!(report.counterparts[1].actor.id, "carol");
    }

    #[test]
    fn exact_ties_break_by_id_ascending() {
        let events = vec![
            event(InteractionKind::ReviewGiven, "alice", "dave"),
            event(InteractionKind::ReviewGiven, "alice", "bob"),
            event(InteractionKind::ReviewGiven, "alice", "carol"),
        ];

        let report = build_network(Some("alice"), &events);
        let ids: Vec<&str> = report
            .counterparts
            .iter()
            .map(|c| c.actor.id.as_str())
            .collect();
        assert_eq!(ids, vec!["bob", "carol", "dave"]);
    }

    #[test]
    fn self_interactions_are_excluded() {
        let events = vec![
            event(InteractionKind::ReviewGiven, "alice", "alice"),
            event(InteractionKind::CommentGiven, "alice", "alice"),
        ];

        let report = build_network(Some("alice"), &events);
        assert_eq!(report.distinct_counterparts, 0);
        assert_eq!(report.avg_interactions, 0.0);
        assert!(report.edges.is_empty());
    }

    #[test]
    fn events_not_involving_subject_are_skipped() {
        let events = vec![event(InteractionKind::ReviewGiven, "bob", "carol")];
        let report = build_network(Some("alice"), &events);
        assert_eq!(report.distinct_counterparts, 0);
    }

    #[test]
    fn empty_input_reports_zero_average() {
        let report = build_network(Some("alice"), &[]);
        assert_eq!(report.distinct_counterparts, 0);
        assert_eq!(report.avg_interactions, 0.0);
    }

    #[test]
    fn edges_preserve_direction() {
        let events = vec![
            event(InteractionKind::ReviewGiven, "alice", "bob"),
            event(InteractionKind::ReviewGiven, "alice", "bob"),
            event(InteractionKind::ReviewGiven, "bob", "alice"),
            event(InteractionKind::CommentGiven, "bob", "alice"),
        ];

        let report = build_network(Some("alice"), &events);
        assert_eq!(report.edges.len(), 1);
        let edge = &report.edges[0];
        assert_eq!(edge.actor_a.id, "alice");
        assert_eq!(edge.actor_b.id, "bob");
        assert_eq!(edge.reviews_a_to_b, 2);
        assert_eq!(edge.reviews_b_to_a, 1);
        assert_eq!(edge.comments_a_to_b, 0);
        assert_eq!(edge.comments_b_to_a, 1);
    }

    #[test]
    fn team_view_counts_both_participants() {
        let events = vec![
            event(InteractionKind::ReviewGiven, "alice", "bob"),
            event(InteractionKind::ReviewGiven, "bob", "carol"),
        ];

        let report = build_network(None, &events);
        assert_eq!(report.distinct_counterparts, 3);

        let find = |id: &str| {
            report
                .counterparts
                .iter()
                .find(|c| c.actor.id == id)
                .unwrap()
        };
        assert_eq!(find("alice").reviews_given, 1);
        assert_eq!(find("bob").reviews_given, 1);
        assert_eq!(find("bob").reviews_received, 1);
        assert_eq!(find("carol").reviews_received, 1);
    }

    #[test]
    fn identical_input_yields_identical_order() {
        let events = vec![
            event(InteractionKind::ReviewGiven, "alice", "carol"),
            event(InteractionKind::CommentGiven, "alice", "bob"),
            event(InteractionKind::ReviewReceived, "dave", "alice"),
        ];

        let first = build_network(Some("alice"), &events);
        let second = build_network(Some("alice"), &events);
        assert_eq!(first, second);
    }
}
