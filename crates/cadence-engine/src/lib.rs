//! Activity insight engine: trends, anomalies, collaboration, and health.
//!
//! Turns pre-queried activity records into structured insights: least-squares
//! trend fits, z-score anomaly scans, collaboration network aggregation, and
//! weighted health scores, composed per scope with rule-driven narrative
//! observations. Every function here is pure: no I/O, no clocks, no state
//! between invocations, so identical input always produces identical output.

pub mod anomaly;
pub mod composer;
pub mod narrative;
pub mod network;
pub mod scoring;
pub mod trend;
