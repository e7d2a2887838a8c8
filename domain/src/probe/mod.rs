//! Probe subdomain: what a single probe produces and how it is interpreted.
//!
//! - [`call`]: raw call results exchanged with the model client port
//! - [`classification::Classification`]: interpreted result of one call
//! - [`classifier::OutcomeClassifier`]: data-driven vendor message matching
//! - [`outcome::ProbeOutcome`] / [`outcome::ProbeHistory`]: append-only record
//! - [`stop::StopCondition`]: why a run halted

pub mod call;
pub mod classification;
pub mod classifier;
pub mod outcome;
pub mod stop;
