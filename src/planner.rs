//! # Planner Module
//!
//! The planner finds the cheapest ordered sequence of actions that turns a
//! start state into one satisfying a goal.
//!
//! ## Overview
//!
//! Planning is a best-first graph search over states:
//! 1. The start state is the root of the search
//! 2. Every applicable action yields a successor state
//! 3. Successors are ordered by accumulated cost plus the goal's heuristic estimate
//! 4. The first state popped that satisfies a goal ends the search
//!
//! With an admissible heuristic (or none at all) the returned plan is
//! cost-optimal. Ties are broken deterministically, so identical inputs always
//! produce identical plans.
//!
//! ## Basic Usage
//!
//! ```
//! use goap_replan::{Action, Context, Goal, Planner, PlanningMode, State};
//!
//! let mut gather_wood = Action::new("Gather Wood", 1.0).unwrap();
//! gather_wood.effects.set("wood", 5);
//!
//! let mut light_fire = Action::new("Light Fire", 1.0).unwrap();
//! light_fire.preconditions.set("wood", 3);
//! light_fire.effects.set("fire", 1);
//!
//! let mut cook_food = Action::new("Cook Food", 2.0).unwrap();
//! cook_food.preconditions.set("fire", 1);
//! cook_food.effects.set("cooked_food", 1);
//!
//! let planner = Planner::new(vec![gather_wood, light_fire, cook_food]).unwrap();
//!
//! let start: State = [("wood", 0), ("fire", 0), ("cooked_food", 0)].into();
//! let goal: Goal = Goal::new([("cooked_food", 1)].into());
//!
//! let plan = planner
//!     .plan(&start, &[goal], &Context::default(), PlanningMode::Global)
//!     .unwrap();
//! assert_eq!(plan.actions, ["Gather Wood", "Light Fire", "Cook Food"]);
//! assert_eq!(plan.cost, 4.0);
//! ```
//!
//! ## Multiple Goals
//!
//! Several goals form a disjunction. [`PlanningMode::Global`] lets them compete
//! in one search and returns the cheapest plan reaching any of them.
//! [`PlanningMode::Sequential`] tries them one at a time in the given order and
//! returns the first one that can be reached, whatever it costs.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::search::SearchContext;
use crate::{Action, Comparison, Context, GoapError, Goal, Result, State};

/// How several goals share the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanningMode {
    /// All goals compete in a single search; the globally cheapest plan wins.
    #[default]
    Global,
    /// Goals are searched independently in caller order; the first reachable one wins.
    Sequential,
}

/// Planner settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Search depth bound. A node whose plan has reached this many actions is
    /// discarded before the goal test, so returned plans are strictly shorter.
    pub max_depth: usize,
    /// How action preconditions are compared against a state
    pub preconditions: Comparison,
    /// How goal conditions are compared against a state
    pub goals: Comparison,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            preconditions: Comparison::AtLeast,
            goals: Comparison::Exact,
        }
    }
}

/// An ordered list of action names and its total cost.
///
/// A failed search is still a `Plan`: no actions and infinite cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub actions: Vec<String>,
    pub cost: f64,
}

impl Plan {
    pub fn unreachable() -> Self {
        Self {
            actions: Vec::new(),
            cost: f64::INFINITY,
        }
    }

    /// `true` if the search reached a goal. An empty plan with a finite cost
    /// means the start state already satisfied it.
    pub fn is_found(&self) -> bool {
        self.cost.is_finite()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// A snapshot of a planner's usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlannerStats {
    /// Calls to [`Planner::plan`]
    pub plans_requested: u64,
    /// Nodes popped from the frontier
    pub nodes_expanded: u64,
    /// Precondition checks against a catalogue action
    pub actions_tested: u64,
    /// Nodes dropped because they sat at the depth limit
    pub nodes_pruned: u64,
}

impl fmt::Display for PlannerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plan Requested: {}", self.plans_requested)?;
        writeln!(f, "Node Developed: {}", self.nodes_expanded)?;
        writeln!(f, "Action Tested: {}", self.actions_tested)?;
        write!(f, "Node Pruned: {}", self.nodes_pruned)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    plans_requested: AtomicU64,
    nodes_expanded: AtomicU64,
    actions_tested: AtomicU64,
    nodes_pruned: AtomicU64,
}

impl Counters {
    fn plan_requested(&self) {
        self.plans_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn node_expanded(&self) {
        self.nodes_expanded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn action_tested(&self) {
        self.actions_tested.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn node_pruned(&self) {
        self.nodes_pruned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> PlannerStats {
        PlannerStats {
            plans_requested: self.plans_requested.load(Ordering::Relaxed),
            nodes_expanded: self.nodes_expanded.load(Ordering::Relaxed),
            actions_tested: self.actions_tested.load(Ordering::Relaxed),
            nodes_pruned: self.nodes_pruned.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.plans_requested.store(0, Ordering::Relaxed);
        self.nodes_expanded.store(0, Ordering::Relaxed);
        self.actions_tested.store(0, Ordering::Relaxed);
        self.nodes_pruned.store(0, Ordering::Relaxed);
    }
}

/// The GOAP planner: a read-only action catalogue plus search settings.
///
/// Each call to [`Planner::plan`] owns its own frontier and closed set, so a
/// planner can be shared between threads (for example behind an `Arc`) and
/// queried concurrently. Only the usage counters are shared, and they are atomic.
///
/// # Examples
///
/// ```
/// use goap_replan::{Action, Context, Goal, Planner, PlannerConfig, PlanningMode, State};
///
/// let mut tick = Action::new("tick", 1.0).unwrap();
/// tick.effects.set("count", 1);
///
/// let config = PlannerConfig { max_depth: 3, ..PlannerConfig::default() };
/// let planner = Planner::with_config(vec![tick], config).unwrap();
///
/// let goal: Goal = Goal::new([("count", 3)].into());
/// let plan = planner
///     .plan(&State::new(), &[goal], &Context::default(), PlanningMode::Global)
///     .unwrap();
///
/// // The goal needs three ticks, which is already the depth limit
/// assert!(!plan.is_found());
/// assert!(plan.cost.is_infinite());
/// ```
#[derive(Debug)]
pub struct Planner {
    /// Catalogue, in the order successors are generated
    actions: Vec<Action>,
    /// Catalogue index by action name
    index: HashMap<String, usize>,
    config: PlannerConfig,
    counters: Counters,
}

impl Planner {
    /// Creates a planner with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `GoapError::DuplicateAction` if two actions share a name.
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        Self::with_config(actions, PlannerConfig::default())
    }

    pub fn with_config(actions: Vec<Action>, config: PlannerConfig) -> Result<Self> {
        let mut index = HashMap::with_capacity(actions.len());
        for (i, action) in actions.iter().enumerate() {
            if index.insert(action.name.clone(), i).is_some() {
                return Err(GoapError::DuplicateAction(action.name.clone()));
            }
        }

        Ok(Self {
            actions,
            index,
            config,
            counters: Counters::default(),
        })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Looks an action up by name.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.index.get(name).map(|&i| &self.actions[i])
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn stats(&self) -> PlannerStats {
        self.counters.snapshot()
    }

    pub fn reset_stats(&self) {
        self.counters.reset()
    }

    /// Plans from `start` towards any of `goals`.
    ///
    /// The context's state-update hook runs on the start state and on every
    /// generated successor before it is scored.
    ///
    /// Returns [`Plan::unreachable`] when no goal can be reached in fewer than
    /// [`PlannerConfig::max_depth`] actions, including when `goals` is empty.
    ///
    /// # Errors
    ///
    /// Returns `GoapError::InvalidPriority` if cost plus heuristic ever
    /// evaluates to NaN or infinity.
    pub fn plan<D>(
        &self,
        start: &State,
        goals: &[Goal<D>],
        context: &Context<D>,
        mode: PlanningMode,
    ) -> Result<Plan> {
        self.counters.plan_requested();
        log::debug!(
            "planning from {} towards {} goal(s) in {:?} mode",
            start,
            goals.len(),
            mode
        );

        let found = match mode {
            PlanningMode::Global => self.search(start, goals, context)?,
            PlanningMode::Sequential => {
                let mut found = None;
                for (i, goal) in goals.iter().enumerate() {
                    found = self.search(start, std::slice::from_ref(goal), context)?;
                    if found.is_some() {
                        log::debug!("goal #{} reached in sequential mode", i);
                        break;
                    }
                    log::debug!("goal #{} unreachable, trying next", i);
                }
                found
            }
        };

        Ok(found.unwrap_or_else(|| {
            log::debug!("no plan found from {}", start);
            Plan::unreachable()
        }))
    }

    fn search<D>(
        &self,
        start: &State,
        goals: &[Goal<D>],
        context: &Context<D>,
    ) -> Result<Option<Plan>> {
        if goals.is_empty() {
            return Ok(None);
        }

        SearchContext::new(
            &self.actions,
            goals,
            context,
            &self.config,
            &self.counters,
            start,
        )
        .run()
    }
}

/// Cloning a planner copies its catalogue and configuration; the clone starts
/// with fresh statistics.
impl Clone for Planner {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            index: self.index.clone(),
            config: self.config.clone(),
            counters: Counters::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{AbsoluteDistance, MismatchCount};

    fn make_action(name: &str, cost: f64, pre: &[(&str, i64)], eff: &[(&str, i64)]) -> Action {
        let mut action = Action::new(name, cost).unwrap();
        for (k, v) in pre {
            action.preconditions.set(*k, *v);
        }
        for (k, v) in eff {
            action.effects.set(*k, *v);
        }
        action
    }

    fn cooking_actions() -> Vec<Action> {
        vec![
            make_action("Gather Wood", 1.0, &[], &[("wood", 5)]).with_duration(1),
            make_action("Light Fire", 1.0, &[("wood", 3)], &[("fire", 1)]).with_duration(1),
            make_action("Cook Food", 2.0, &[("fire", 1)], &[("cooked_food", 1)]).with_duration(2),
        ]
    }

    fn cooking_start() -> State {
        [("wood", 0), ("fire", 0), ("cooked_food", 0)].into()
    }

    #[test]
    fn test_simple_plan() {
        let planner = Planner::new(cooking_actions()).unwrap();
        let goal: Goal = Goal::new([("cooked_food", 1)].into());

        let plan = planner
            .plan(&cooking_start(), &[goal], &Context::default(), PlanningMode::Global)
            .unwrap();
        assert_eq!(plan.actions, ["Gather Wood", "Light Fire", "Cook Food"]);
        assert_eq!(plan.cost, 4.0);
        assert!(plan.is_found());
    }

    #[test]
    fn test_heuristics_keep_the_optimal_plan() {
        let planner = Planner::new(cooking_actions()).unwrap();
        let goals: Vec<Goal> = vec![
            Goal::new([("cooked_food", 1)].into()).with_heuristic(MismatchCount),
            Goal::new([("cooked_food", 1)].into()).with_heuristic(AbsoluteDistance),
        ];

        for goal in goals {
            let plan = planner
                .plan(&cooking_start(), &[goal], &Context::default(), PlanningMode::Global)
                .unwrap();
            assert_eq!(plan.cost, 4.0);
            assert_eq!(plan.len(), 3);
        }
    }

    #[test]
    fn test_no_plan_found() {
        let planner = Planner::new(cooking_actions()).unwrap();
        let goal: Goal = Goal::new([("impossible_condition", 1)].into());

        let plan = planner
            .plan(&cooking_start(), &[goal], &Context::default(), PlanningMode::Global)
            .unwrap();
        assert_eq!(plan, Plan::unreachable());
    }

    #[test]
    fn test_no_goals_is_unreachable() {
        let planner = Planner::new(cooking_actions()).unwrap();
        for mode in [PlanningMode::Global, PlanningMode::Sequential] {
            let plan = planner
                .plan::<()>(&cooking_start(), &[], &Context::default(), mode)
                .unwrap();
            assert!(!plan.is_found());
        }
    }

    #[test]
    fn test_duplicate_action_rejected() {
        let actions = vec![
            make_action("Wait", 1.0, &[], &[("stamina", 10)]),
            make_action("Wait", 2.0, &[], &[("stamina", 5)]),
        ];
        let result = Planner::new(actions);
        assert!(matches!(result, Err(GoapError::DuplicateAction(name)) if name == "Wait"));
    }

    #[test]
    fn test_action_lookup() {
        let planner = Planner::new(cooking_actions()).unwrap();
        assert_eq!(planner.action("Light Fire").unwrap().cost, 1.0);
        assert!(planner.action("Fly").is_none());
        assert_eq!(planner.actions().len(), 3);
    }

    #[test]
    fn test_global_picks_cheapest_goal() {
        let actions = vec![
            make_action("ActionA", 100.0, &[], &[("condition_x", 1)]),
            make_action("ActionB", 300.0, &[], &[("condition_y", 1)]),
            make_action("ActionC", 30.0, &[], &[("condition_z", 1)]),
        ];
        let planner = Planner::new(actions).unwrap();
        let goals: Vec<Goal> = vec![
            Goal::new([("impossible_condition", 1)].into()),
            Goal::new([("condition_y", 1)].into()),
            Goal::new([("condition_z", 1)].into()),
        ];

        let global = planner
            .plan(&State::new(), &goals, &Context::default(), PlanningMode::Global)
            .unwrap();
        assert_eq!(global.actions, ["ActionC"]);
        assert_eq!(global.cost, 30.0);

        let sequential = planner
            .plan(&State::new(), &goals, &Context::default(), PlanningMode::Sequential)
            .unwrap();
        assert_eq!(sequential.actions, ["ActionB"]);
        assert_eq!(sequential.cost, 300.0);
    }

    #[test]
    fn test_update_hook_shapes_successors() {
        // Uncapped, one wait takes stamina from 3 to 13, which never equals
        // the goal of exactly 10; the hook caps it at 10 instead.
        let actions = vec![make_action("Wait", 1.0, &[], &[("stamina", 10)])];
        let planner = Planner::new(actions).unwrap();
        let context = Context::new(10).with_state_update(|state: &mut State, cap: &i64| {
            let stamina = state.get("stamina").min(*cap);
            state.set("stamina", stamina);
        });
        let goal = Goal::new([("stamina", 10)].into());

        let plan = planner
            .plan(&[("stamina", 3)].into(), &[goal], &context, PlanningMode::Global)
            .unwrap();
        assert_eq!(plan.actions, ["Wait"]);
    }

    #[test]
    fn test_stats_count_usage() {
        let planner = Planner::new(cooking_actions()).unwrap();
        let goal: Goal = Goal::new([("cooked_food", 1)].into());

        planner
            .plan(&cooking_start(), &[goal.clone()], &Context::default(), PlanningMode::Global)
            .unwrap();
        let stats = planner.stats();
        assert_eq!(stats.plans_requested, 1);
        assert!(stats.nodes_expanded >= 4);
        assert_eq!(stats.actions_tested % 3, 0);
        assert!(stats.to_string().contains("Plan Requested: 1"));

        let clone = planner.clone();
        assert_eq!(clone.stats(), PlannerStats::default());

        planner.reset_stats();
        assert_eq!(planner.stats(), PlannerStats::default());
    }
}
