//! Plan validation: pre-flight checks over a proposed action sequence.
//!
//! The validator is advisory. It simulates, never executes; the engine
//! independently rejects illegal actions when the plan actually runs.

mod checks;
mod plan;

pub use checks::validate_plan;
pub use plan::{ActionKind, PlannedAction, Violation, ViolationKind};
