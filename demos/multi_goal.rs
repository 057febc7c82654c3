//! Multi-goal experiment.
//!
//! Usage: `cargo run --example multi_goal -- [plan|execute]`
//!
//! Three goals of varying difficulty, one of them unreachable. The planner is
//! run in both modes to show which goal each one picks.

use std::env;
use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use goap_replan::{Action, Agent, AgentConfig, Context, EventHub, Goal, Planner, PlanningMode, State};

fn main() -> Result<(), Box<dyn Error>> {
    let execute = env::args().skip(1).any(|arg| arg == "execute");

    let mut action_a = Action::new("ActionA", 100.0)?.with_duration(10);
    action_a.effects.set("condition_x", 1);
    let mut action_b = Action::new("ActionB", 300.0)?.with_duration(100);
    action_b.effects.set("condition_y", 1);
    let mut action_c = Action::new("ActionC", 30.0)?.with_duration(5);
    action_c.effects.set("condition_z", 1);

    let planner = Arc::new(Planner::new(vec![action_a, action_b, action_c])?);

    let initial_state = State::new();
    let goals: Vec<Goal> = vec![
        Goal::new([("impossible_condition", 1)].into()),
        Goal::new([("condition_y", 1)].into()),
        Goal::new([("condition_z", 1)].into()),
    ];
    let context = Context::default();

    for mode in [PlanningMode::Global, PlanningMode::Sequential] {
        let plan = planner.plan(&initial_state, &goals, &context, mode)?;
        println!(
            "{:?}: Generated Plan: {:?} with total cost: {}",
            mode, plan.actions, plan.cost
        );
    }
    if !execute {
        return Ok(());
    }

    let hub = EventHub::new();
    let config = AgentConfig {
        tick: Duration::from_millis(100),
        ..AgentConfig::default()
    };
    let mut agent = Agent::with_config(planner.clone(), &hub, config);

    let events = hub.clone();
    thread::spawn(move || loop {
        thread::sleep(Duration::from_secs(5));
        println!("-- external event --");
        events.notify();
    });

    let report = agent.execute_plan(&initial_state, &goals, &context)?;
    println!("Outcome: {:?}", report.outcome);
    println!("Executed: {:?}", report.executed);
    println!("Final state: {}", report.state);
    println!("{}", planner.stats());

    Ok(())
}
