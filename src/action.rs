//! # Action Module
//!
//! An [`Action`] is one capability of an agent: a named transition with
//! preconditions, additive effects, a duration and a planning cost.
//!
//! ## Key Components
//!
//! * `Action`: an immutable catalogue entry, shared read-only by the planner and the agent
//! * `ActionOutcome`: whether a live execution ran to completion or was interrupted
//!
//! ## Basic Usage
//!
//! ```
//! use goap_replan::{Action, State};
//!
//! let mut light_fire = Action::new("Light Fire", 1.0).unwrap().with_duration(1);
//! light_fire.preconditions.set("wood", 3);
//! light_fire.effects.set("fire", 1);
//!
//! let state: State = [("wood", 5)].into();
//! assert!(light_fire.is_applicable(&state));
//!
//! // `apply` never touches its input
//! let next = light_fire.apply(&state);
//! assert_eq!(state.get("fire"), 0);
//! assert_eq!(next.get("fire"), 1);
//! assert_eq!(next.get("wood"), 5);
//! ```
//!
//! `cost` and `duration` are independent. The planner minimises cost; duration
//! is the simulated time the action takes when an agent executes it, counted
//! in ticks whose real length the agent decides.

use crate::{Comparison, GoapError, Result, State};
use std::thread;
use std::time::Duration;

/// How a live execution of an action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The full duration elapsed and the effects were applied.
    Completed,
    /// The interruption check fired first; the state was left untouched.
    Interrupted,
}

/// Represents an action in the planning catalogue.
///
/// # Examples
///
/// ```
/// use goap_replan::{Action, Comparison, State};
///
/// let mut attack = Action::new("Simple Attack", 2.0).unwrap();
/// attack.preconditions.set("stamina", 2);
/// attack.preconditions.set("in_range", 1);
/// attack.effects.set("damage_dealt", 10);
/// attack.effects.set("stamina", -2);
///
/// let state: State = [("stamina", 5), ("in_range", 1)].into();
/// assert!(attack.is_applicable(&state));
/// assert!(!attack.is_applicable_with(&state, Comparison::Exact));
///
/// let after = attack.apply(&state);
/// assert_eq!(after.get("stamina"), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Unique name within a catalogue; plans refer to actions by it
    pub name: String,
    /// Planning weight, independent of duration
    pub cost: f64,
    /// Number of simulated time units a live execution takes
    pub duration: u64,
    /// Minimum (or exact) magnitudes required before the action can run
    pub preconditions: State,
    /// Signed deltas added to the state once the action completes
    pub effects: State,
}

impl Action {
    /// Creates a new action with no preconditions, no effects and zero duration.
    ///
    /// # Errors
    ///
    /// Returns `GoapError::InvalidActionCost` if the cost is negative, NaN or infinite.
    ///
    /// # Examples
    ///
    /// ```
    /// use goap_replan::Action;
    ///
    /// let action = Action::new("Wait", 1.0).unwrap();
    /// assert_eq!(action.name, "Wait");
    /// assert_eq!(action.duration, 0);
    ///
    /// assert!(Action::new("free", 0.0).is_ok());
    /// assert!(Action::new("invalid", -1.0).is_err());
    /// assert!(Action::new("invalid", f64::NAN).is_err());
    /// ```
    pub fn new(name: impl Into<String>, cost: f64) -> Result<Self> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(GoapError::InvalidActionCost);
        }

        Ok(Self {
            name: name.into(),
            cost,
            duration: 0,
            preconditions: State::new(),
            effects: State::new(),
        })
    }

    /// Sets how many time units a live execution takes.
    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    /// Checks the preconditions with at-least semantics.
    pub fn is_applicable(&self, state: &State) -> bool {
        self.is_applicable_with(state, Comparison::AtLeast)
    }

    /// Checks the preconditions with an explicit comparison policy.
    pub fn is_applicable_with(&self, state: &State, comparison: Comparison) -> bool {
        state.satisfies(&self.preconditions, comparison)
    }

    /// Returns the successor state, leaving `state` untouched.
    pub fn apply(&self, state: &State) -> State {
        let mut next = state.clone();
        self.apply_effects(&mut next);
        next
    }

    /// Adds this action's effects to `state` in place.
    pub fn apply_effects(&self, state: &mut State) {
        state.apply_effects(&self.effects);
    }

    /// Executes the action against a live state.
    ///
    /// Each of the `duration` time units starts by polling `interrupted`, then
    /// sleeps for `tick`. If the poll ever returns `true` the execution stops
    /// and `state` keeps its prior content. Otherwise the effects are applied
    /// once the last unit has elapsed.
    ///
    /// Preconditions are not re-checked here; callers test applicability
    /// first with the policy they plan with.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use goap_replan::{Action, ActionOutcome, State};
    ///
    /// let mut cook = Action::new("Cook Food", 2.0).unwrap().with_duration(2);
    /// cook.effects.set("cooked_food", 1);
    ///
    /// let mut state = State::new();
    /// let outcome = cook.execute(&mut state, Duration::ZERO, || true);
    /// assert_eq!(outcome, ActionOutcome::Interrupted);
    /// assert_eq!(state.get("cooked_food"), 0);
    ///
    /// let outcome = cook.execute(&mut state, Duration::ZERO, || false);
    /// assert_eq!(outcome, ActionOutcome::Completed);
    /// assert_eq!(state.get("cooked_food"), 1);
    /// ```
    pub fn execute<F>(&self, state: &mut State, tick: Duration, interrupted: F) -> ActionOutcome
    where
        F: Fn() -> bool,
    {
        for _ in 0..self.duration {
            if interrupted() {
                return ActionOutcome::Interrupted;
            }
            if !tick.is_zero() {
                thread::sleep(tick);
            }
        }

        self.apply_effects(state);
        ActionOutcome::Completed
    }
}
