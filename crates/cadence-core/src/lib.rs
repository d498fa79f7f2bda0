//! Core types, configuration, and error handling for the Cadence engine.
//!
//! This crate provides the shared foundation used by the other Cadence crates:
//! - [`CadenceError`] — unified error type using `thiserror`
//! - [`CadenceConfig`] — analysis thresholds and scoring policy loaded from `.cadence.toml`
//! - The metric series model: [`MetricRecord`], [`ActorRef`], [`InteractionEvent`],
//!   [`MetricKey`], [`ScopeRef`], [`DateRange`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{AnalysisConfig, CadenceConfig, ScoreWeights, ScoringConfig};
pub use error::CadenceError;
pub use types::{
    ActivityCounts, ActorRef, DateRange, InteractionEvent, InteractionKind, MetricKey,
    MetricRecord, OutputFormat, PrecomputedScores, ScopeKind, ScopeRef,
};

/// A convenience `Result` type for Cadence operations.
pub type Result<T> = std::result::Result<T, CadenceError>;
