//! Goals and cost-to-go estimators.
//!
//! A [`Goal`] pairs a target condition with an optional [`Heuristic`]. When
//! several goals are handed to the planner they form a disjunction: reaching
//! any one of them is enough.
//!
//! A heuristic must be admissible, i.e. never overestimate the cheapest
//! remaining cost, for the planner's result to be cost-optimal. This is not
//! checked. A goal without a heuristic estimates `0`, which turns the search
//! into uniform-cost search.

use std::fmt;
use std::sync::Arc;

use crate::{Comparison, State};

/// Estimates the remaining cost from `state` to `condition`.
///
/// `domain` is the payload carried by the planning [`crate::Context`], so an
/// estimator can look at things outside the state, such as where opponents
/// currently stand.
///
/// Closures with the matching signature implement this trait:
///
/// ```
/// use goap_replan::{Goal, State};
///
/// let goal: Goal = Goal::new([("cooked_food", 1)].into()).with_heuristic(
///     |state: &State, condition: &State, _: &()| {
///         condition
///             .values()
///             .iter()
///             .map(|(key, &required)| (required - state.get(key)).max(0) as f64)
///             .sum::<f64>()
///     },
/// );
/// assert_eq!(goal.estimate(&State::new(), &()), 1.0);
/// ```
pub trait Heuristic<D>: Send + Sync {
    fn estimate(&self, state: &State, condition: &State, domain: &D) -> f64;
}

impl<D, F> Heuristic<D> for F
where
    F: Fn(&State, &State, &D) -> f64 + Send + Sync,
{
    fn estimate(&self, state: &State, condition: &State, domain: &D) -> f64 {
        self(state, condition, domain)
    }
}

/// Always estimates zero. Equivalent to having no heuristic at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl<D> Heuristic<D> for ZeroHeuristic {
    fn estimate(&self, _state: &State, _condition: &State, _domain: &D) -> f64 {
        0.0
    }
}

/// Counts the conditions whose magnitude is not exactly met.
///
/// Admissible whenever every action costs at least `1` and no action fixes
/// more than one condition at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MismatchCount;

impl<D> Heuristic<D> for MismatchCount {
    fn estimate(&self, state: &State, condition: &State, _domain: &D) -> f64 {
        condition
            .values()
            .iter()
            .filter(|(key, &required)| state.get(key) != required)
            .count() as f64
    }
}

/// Sums `|state - required|` over every condition key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteDistance;

impl<D> Heuristic<D> for AbsoluteDistance {
    fn estimate(&self, state: &State, condition: &State, _domain: &D) -> f64 {
        condition
            .values()
            .iter()
            .map(|(key, &required)| (state.get(key) - required).unsigned_abs() as f64)
            .sum()
    }
}

/// A target condition plus an optional cost-to-go estimator.
pub struct Goal<D = ()> {
    pub condition: State,
    heuristic: Option<Arc<dyn Heuristic<D>>>,
}

impl<D> Goal<D> {
    pub fn new(condition: State) -> Self {
        Self {
            condition,
            heuristic: None,
        }
    }

    pub fn with_heuristic<H>(mut self, heuristic: H) -> Self
    where
        H: Heuristic<D> + 'static,
    {
        self.heuristic = Some(Arc::new(heuristic));
        self
    }

    pub fn has_heuristic(&self) -> bool {
        self.heuristic.is_some()
    }

    /// Exact-match satisfaction, the default goal policy.
    pub fn is_satisfied(&self, state: &State) -> bool {
        self.is_satisfied_with(state, Comparison::Exact)
    }

    pub fn is_satisfied_with(&self, state: &State, comparison: Comparison) -> bool {
        state.satisfies(&self.condition, comparison)
    }

    /// Estimated remaining cost, `0` when the goal has no heuristic.
    pub fn estimate(&self, state: &State, domain: &D) -> f64 {
        match &self.heuristic {
            Some(heuristic) => heuristic.estimate(state, &self.condition, domain),
            None => 0.0,
        }
    }
}

impl<D> Clone for Goal<D> {
    fn clone(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            heuristic: self.heuristic.clone(),
        }
    }
}

impl<D> fmt::Debug for Goal<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("condition", &self.condition)
            .field("heuristic", &self.heuristic.is_some())
            .finish()
    }
}

impl<D> From<State> for Goal<D> {
    fn from(condition: State) -> Self {
        Self::new(condition)
    }
}

/// Returns `true` if at least one goal is satisfied by `state`.
pub fn any_satisfied<D>(goals: &[Goal<D>], state: &State, comparison: Comparison) -> bool {
    goals
        .iter()
        .any(|goal| goal.is_satisfied_with(state, comparison))
}
