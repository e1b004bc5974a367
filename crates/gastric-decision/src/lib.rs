//! Decision scoring core for gastric cancer surgical treatment planning.
//!
//! The crate turns a validated patient/tumor case into a ranked set of FLOT + surgery
//! alternatives. Everything below [`decisions`] is synchronous and stateless: a
//! [`decisions::DecisionComposer`] can be shared across threads and invoked per request.

pub mod config;
pub mod decisions;
pub mod telemetry;
