use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GoapError {
    #[error("Action cost must be finite and non-negative")]
    InvalidActionCost,
    #[error("Action already in catalogue: {0}")]
    DuplicateAction(String),
    /// A frontier priority evaluated to NaN or infinity. This always points at a
    /// misconfigured heuristic or action cost, so the search aborts instead of
    /// ordering the frontier on garbage.
    #[error("Invalid priority {priority} after applying action {action}")]
    InvalidPriority { action: String, priority: f64 },
}

pub type Result<T> = std::result::Result<T, GoapError>;
