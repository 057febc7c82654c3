mod action;
mod agent;
mod context;
mod error;
mod event;
mod goal;
mod planner;
mod search;
mod state;

pub use action::{Action, ActionOutcome};
pub use agent::{Agent, AgentConfig, AgentStatus, ExecutionReport, Outcome, ReplanSignal};
pub use context::{Context, PostActionHook, StateUpdateHook};
pub use error::{GoapError, Result};
pub use event::{EventHub, Subscription};
pub use goal::{any_satisfied, AbsoluteDistance, Goal, Heuristic, MismatchCount, ZeroHeuristic};
pub use planner::{Plan, Planner, PlannerConfig, PlannerStats, PlanningMode};
pub use state::{Comparison, State};
