//! Agent: drives plans to completion against a live, changing state.
//!
//! The agent walks a plan one action at a time. Before every step it folds
//! external observations into the live state (through the context's
//! state-update hook) and makes sure the next action still applies. If the
//! action no longer applies, is unknown, or an event was signalled, the agent
//! drops the rest of the plan and asks the planner for a new one from
//! wherever it now stands.
//!
//! Events arrive through an [`EventHub`]. The agent subscribes a listener that
//! raises its [`ReplanSignal`]; the signal is polled once per duration unit
//! while an action runs, so a running action is abandoned (without applying
//! its effects) at most one unit after the event fires.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use goap_replan::{Action, Agent, AgentConfig, Context, EventHub, Goal, Outcome, Planner, State};
//!
//! let mut gather = Action::new("Gather Wood", 1.0).unwrap().with_duration(1);
//! gather.effects.set("wood", 5);
//! let mut light = Action::new("Light Fire", 1.0).unwrap().with_duration(1);
//! light.preconditions.set("wood", 3);
//! light.effects.set("fire", 1);
//!
//! let planner = Arc::new(Planner::new(vec![gather, light]).unwrap());
//! let hub = EventHub::new();
//! let config = AgentConfig { tick: Duration::ZERO, ..AgentConfig::default() };
//! let mut agent = Agent::with_config(planner, &hub, config);
//!
//! let goal: Goal = Goal::new([("fire", 1)].into());
//! let report = agent
//!     .execute_plan(&State::new(), &[goal], &Context::default())
//!     .unwrap();
//!
//! assert_eq!(report.outcome, Outcome::GoalAchieved);
//! assert_eq!(report.executed, ["Gather Wood", "Light Fire"]);
//! assert_eq!(report.state.get("wood"), 5);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::event::{EventHub, Subscription};
use crate::goal::any_satisfied;
use crate::{ActionOutcome, Context, Goal, Plan, Planner, PlanningMode, Result, State};

/// Shared "replan now" flag.
///
/// Raised from any thread, consumed by the agent. Consumption clears it, so
/// each raise triggers at most one replan.
#[derive(Debug, Clone, Default)]
pub struct ReplanSignal {
    flag: Arc<AtomicBool>,
}

impl ReplanSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears the flag and returns whether it was raised.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

/// Where the agent is in its execution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentStatus {
    #[default]
    Idle,
    ExecutingAction,
    AwaitingReplan,
    GoalAchieved,
    FailedNoPlan,
}

/// How an execution run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    GoalAchieved,
    FailedNoPlan,
}

/// Summary of an execution run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub outcome: Outcome,
    /// The live state when the run ended
    pub state: State,
    /// Names of the actions that ran to completion, in order
    pub executed: Vec<String>,
    /// Number of times the planner was invoked after the initial plan
    pub replans: usize,
    /// Number of actions abandoned mid-execution
    pub interruptions: usize,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::GoalAchieved
    }
}

/// Configuration for the agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Real time that one unit of action duration takes
    pub tick: Duration,
    /// Planning mode used for the initial plan and for every replan
    pub mode: PlanningMode,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            mode: PlanningMode::Global,
        }
    }
}

/// Why the current plan is being abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplanCause {
    PlanExhausted,
    UnknownAction,
    PreconditionsUnmet,
    Signalled,
    Interrupted,
}

/// Executes plans and replans when the world moves under them.
#[derive(Debug)]
pub struct Agent {
    planner: Arc<Planner>,
    config: AgentConfig,
    signal: ReplanSignal,
    status: AgentStatus,
    _subscription: Subscription,
}

impl Agent {
    /// Creates an agent listening for replan events on `hub`.
    ///
    /// The listener is removed from the hub when the agent is dropped.
    pub fn new(planner: Arc<Planner>, hub: &EventHub) -> Self {
        Self::with_config(planner, hub, AgentConfig::default())
    }

    pub fn with_config(planner: Arc<Planner>, hub: &EventHub, config: AgentConfig) -> Self {
        let signal = ReplanSignal::new();
        let listener = signal.clone();
        let subscription = hub.subscribe(move || {
            log::debug!("event received, replan requested");
            listener.raise();
        });

        Self {
            planner,
            config,
            signal,
            status: AgentStatus::Idle,
            _subscription: subscription,
        }
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// A handle to the agent's replan flag, for raising it without a hub.
    pub fn signal(&self) -> ReplanSignal {
        self.signal.clone()
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    /// Plans from `start` towards `goals`, then executes the plan.
    ///
    /// # Errors
    ///
    /// Propagates `GoapError::InvalidPriority` from any planning call.
    pub fn execute_plan<D>(
        &mut self,
        start: &State,
        goals: &[Goal<D>],
        context: &Context<D>,
    ) -> Result<ExecutionReport> {
        let plan = self
            .planner
            .plan(start, goals, context, self.config.mode)?;
        self.execute(start, plan, goals, context)
    }

    /// Executes a plan computed beforehand, replanning as needed.
    ///
    /// When a plan runs out without reaching a goal, the agent replans from
    /// where it stands. If that replan hands back the same plan from the same
    /// state as the previous exhaustion did, the hooks are undoing the plan's
    /// progress and the run ends in [`Outcome::FailedNoPlan`]. Hooks that drift
    /// the state differently on every pass are the caller's to bound.
    pub fn execute<D>(
        &mut self,
        start: &State,
        plan: Plan,
        goals: &[Goal<D>],
        context: &Context<D>,
    ) -> Result<ExecutionReport> {
        let goal_policy = self.planner.config().goals;
        let mut report = ExecutionReport {
            outcome: Outcome::FailedNoPlan,
            state: start.clone(),
            executed: Vec::new(),
            replans: 0,
            interruptions: 0,
        };

        if !plan.is_found() {
            log::warn!("no plan to execute");
            return Ok(self.finish(report, Outcome::FailedNoPlan));
        }

        if any_satisfied(goals, &report.state, goal_policy) {
            return Ok(self.finish(report, Outcome::GoalAchieved));
        }

        let mut steps: VecDeque<String> = plan.actions.into();
        let mut last_exhausted: Option<(State, Vec<String>)> = None;
        self.status = AgentStatus::ExecutingAction;

        loop {
            log::debug!("state {} with plan {:?}", report.state, steps);
            context.update_state(&mut report.state);

            let cause = match steps.pop_front() {
                None => Some(ReplanCause::PlanExhausted),
                Some(name) => self.step(&name, context, &mut report),
            };

            match cause {
                None => {
                    if any_satisfied(goals, &report.state, goal_policy) {
                        log::info!("goal achieved");
                        return Ok(self.finish(report, Outcome::GoalAchieved));
                    }
                }
                Some(cause) => {
                    self.status = AgentStatus::AwaitingReplan;
                    log::info!("replanning ({:?})", cause);

                    // The event that caused this replan is handled by it.
                    self.signal.take();
                    report.replans += 1;

                    let plan = self
                        .planner
                        .plan(&report.state, goals, context, self.config.mode)?;
                    if !plan.is_found() {
                        log::warn!("no valid plan could be found during replanning");
                        return Ok(self.finish(report, Outcome::FailedNoPlan));
                    }
                    if plan.is_empty() {
                        return Ok(self.finish(report, Outcome::GoalAchieved));
                    }

                    if cause == ReplanCause::PlanExhausted {
                        let attempt = (report.state.clone(), plan.actions.clone());
                        if last_exhausted.as_ref() == Some(&attempt) {
                            log::warn!(
                                "plan {:?} already ran out from {} without reaching the goal",
                                attempt.1,
                                attempt.0
                            );
                            return Ok(self.finish(report, Outcome::FailedNoPlan));
                        }
                        last_exhausted = Some(attempt);
                    }

                    steps = plan.actions.into();
                    self.status = AgentStatus::ExecutingAction;
                }
            }
        }
    }

    /// Runs one plan step. Returns the reason to replan, if any.
    fn step<D>(
        &self,
        name: &str,
        context: &Context<D>,
        report: &mut ExecutionReport,
    ) -> Option<ReplanCause> {
        let Some(action) = self.planner.action(name) else {
            log::warn!("plan references unknown action {}", name);
            return Some(ReplanCause::UnknownAction);
        };

        if !action.is_applicable_with(&report.state, self.planner.config().preconditions) {
            log::info!("preconditions for action {} are not met", name);
            return Some(ReplanCause::PreconditionsUnmet);
        }

        if self.signal.is_raised() {
            return Some(ReplanCause::Signalled);
        }

        log::info!("starting action {} (duration {})", name, action.duration);
        match action.execute(&mut report.state, self.config.tick, || self.signal.is_raised()) {
            ActionOutcome::Interrupted => {
                log::warn!("action {} interrupted", name);
                report.interruptions += 1;
                Some(ReplanCause::Interrupted)
            }
            ActionOutcome::Completed => {
                context.post_action(action, &mut report.state);
                log::info!("action {} completed: {}", name, report.state);
                report.executed.push(name.to_string());
                None
            }
        }
    }

    fn finish(&mut self, mut report: ExecutionReport, outcome: Outcome) -> ExecutionReport {
        self.status = match outcome {
            Outcome::GoalAchieved => AgentStatus::GoalAchieved,
            Outcome::FailedNoPlan => AgentStatus::FailedNoPlan,
        };
        report.outcome = outcome;
        report
    }
}
