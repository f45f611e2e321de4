//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `metrics` - Scoring, monthly buckets, the per-user aggregate and trend views

pub mod foundation;
pub mod metrics;
