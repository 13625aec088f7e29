//! Parameter Sweep
//!
//! The sweep is a lazy sequence of [`SweepPoint`]s (frequency deviation,
//! then output rate, then input rate) feeding a stateless per-point
//! evaluation. Each evaluation returns its own records; [`Sweep::run`]
//! only concatenates them into the report.

mod plan;
mod runner;

pub use plan::{SweepPlan, SweepPoint, SweepPoints};
pub use runner::{OutputLayout, PointOutcome, Sweep, SweepSummary};
