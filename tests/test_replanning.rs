//! Agent integration tests.
//! Runs plans against a live state while other threads fire replan events or
//! the world shifts under the agent through the context hooks.

use goap_replan::{
    Action, Agent, AgentConfig, AgentStatus, Context, EventHub, GoapError, Goal, Outcome, Plan,
    Planner, State,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

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

fn cooking_planner() -> Arc<Planner> {
    Arc::new(
        Planner::new(vec![
            make_action("Gather Wood", 1.0, &[], &[("wood", 5)]).with_duration(1),
            make_action("Light Fire", 1.0, &[("wood", 3)], &[("fire", 1)]).with_duration(1),
            make_action("Cook Food", 2.0, &[("fire", 1)], &[("cooked_food", 1)]).with_duration(2),
        ])
        .unwrap(),
    )
}

fn ticking(tick: Duration) -> AgentConfig {
    AgentConfig {
        tick,
        ..AgentConfig::default()
    }
}

#[test]
fn test_event_interrupts_long_action() {
    let planner = Arc::new(
        Planner::new(vec![
            make_action("Slow Cook", 1.0, &[], &[("cooked_food", 1)]).with_duration(300)
        ])
        .unwrap(),
    );
    let hub = EventHub::new();
    let mut agent = Agent::with_config(planner, &hub, ticking(Duration::from_millis(1)));

    let remote = hub.clone();
    let notifier = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.notify();
    });

    let goal: Goal = Goal::new([("cooked_food", 1)].into());
    let report = agent
        .execute_plan(&State::new(), &[goal], &Context::default())
        .unwrap();
    notifier.join().unwrap();

    assert_eq!(report.outcome, Outcome::GoalAchieved);
    assert_eq!(report.interruptions, 1);
    assert_eq!(report.replans, 1);
    // The interrupted run left no trace, so the action had to run again in full
    assert_eq!(report.executed, ["Slow Cook"]);
    assert_eq!(report.state.get("cooked_food"), 1);
    assert!(!agent.signal().is_raised());
}

#[test]
fn test_bursts_of_events_still_reach_goal() {
    let hub = EventHub::new();
    let mut agent = Agent::with_config(cooking_planner(), &hub, ticking(Duration::from_millis(2)));

    let remote = hub.clone();
    let notifier = thread::spawn(move || {
        for _ in 0..3 {
            thread::sleep(Duration::from_millis(3));
            remote.notify();
        }
    });

    let goal: Goal = Goal::new([("cooked_food", 1)].into());
    let report = agent
        .execute_plan(&State::new(), &[goal], &Context::default())
        .unwrap();
    notifier.join().unwrap();

    assert!(report.is_success());
    assert_eq!(report.state.get("cooked_food"), 1);
    assert!(report.replans >= report.interruptions);
    assert!(report.replans <= 3);
    assert_eq!(report.executed.last().map(String::as_str), Some("Cook Food"));
}

#[derive(Default)]
struct Flood {
    flooded: AtomicBool,
}

#[test]
fn test_world_change_leaves_no_plan() {
    // Gathering wood floods the camp, and from then on every woodpile is soaked
    let context = Context::new(Flood::default())
        .with_state_update(|state: &mut State, flood: &Flood| {
            if flood.flooded.load(Ordering::SeqCst) {
                state.set("wood", 0);
            }
        })
        .with_post_action(|action: &Action, _: &mut State, flood: &Flood| {
            if action.name == "Gather Wood" {
                flood.flooded.store(true, Ordering::SeqCst);
            }
        });

    let hub = EventHub::new();
    let mut agent = Agent::with_config(cooking_planner(), &hub, ticking(Duration::ZERO));
    let goal: Goal<Flood> = Goal::new([("cooked_food", 1)].into());

    let report = agent
        .execute_plan(&State::new(), &[goal], &context)
        .unwrap();

    assert_eq!(report.outcome, Outcome::FailedNoPlan);
    assert_eq!(report.executed, ["Gather Wood"]);
    assert_eq!(report.replans, 1);
    assert_eq!(report.state.get("wood"), 0);
    assert_eq!(agent.status(), AgentStatus::FailedNoPlan);
}

#[test]
fn test_replanning_error_propagates() {
    let hub = EventHub::new();
    let mut agent = Agent::with_config(cooking_planner(), &hub, ticking(Duration::ZERO));
    let goal = Goal::new([("cooked_food", 1)].into())
        .with_heuristic(|_: &State, _: &State, _: &()| f64::NAN);
    let stale = Plan {
        actions: vec!["Cook Food".into()],
        cost: 2.0,
    };

    let result = agent.execute(&State::new(), stale, &[goal], &Context::default());
    assert!(matches!(result, Err(GoapError::InvalidPriority { .. })));
}

#[test]
fn test_agents_share_one_hub() {
    let hub = EventHub::new();
    let first = Agent::with_config(cooking_planner(), &hub, ticking(Duration::ZERO));
    let second = Agent::with_config(cooking_planner(), &hub, ticking(Duration::ZERO));
    assert_eq!(hub.listener_count(), 2);

    hub.notify();
    assert!(first.signal().is_raised());
    assert!(second.signal().is_raised());

    drop(first);
    assert_eq!(hub.listener_count(), 1);
    drop(second);
    assert_eq!(hub.listener_count(), 0);
}
