//! Cooking experiment.
//!
//! Usage: `cargo run --example cook -- [plan|execute] [--no-heuristic]`
//!
//! `plan` prints the plan and its cost. `execute` runs it with an agent while a
//! background thread fires a replan event every five seconds.

use std::env;
use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use goap_replan::{
    AbsoluteDistance, Action, Agent, Context, EventHub, Goal, Planner, PlanningMode, State,
};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let execute = args.iter().any(|arg| arg == "execute");
    let use_heuristic = !args.iter().any(|arg| arg == "--no-heuristic");

    // Create actions
    let mut gather_wood = Action::new("Gather Wood", 1.0)?.with_duration(1);
    gather_wood.preconditions.set("wood", 0);
    gather_wood.effects.set("wood", 5);

    let mut light_fire = Action::new("Light Fire", 1.0)?.with_duration(1);
    light_fire.preconditions.set("wood", 3);
    light_fire.effects.set("fire", 1);

    let mut cook_food = Action::new("Cook Food", 2.0)?.with_duration(2);
    cook_food.preconditions.set("fire", 1);
    cook_food.effects.set("cooked_food", 1);

    let planner = Arc::new(Planner::new(vec![gather_wood, light_fire, cook_food])?);

    let initial_state: State = [("wood", 0), ("fire", 0), ("cooked_food", 0)].into();
    let mut goal: Goal = Goal::new([("cooked_food", 1)].into());
    if use_heuristic {
        goal = goal.with_heuristic(AbsoluteDistance);
    }
    let goals = [goal];
    let context = Context::default();

    let plan = planner.plan(&initial_state, &goals, &context, PlanningMode::Global)?;
    println!(
        "Generated Plan: {:?} with total cost: {}",
        plan.actions, plan.cost
    );
    if !execute {
        return Ok(());
    }

    let hub = EventHub::new();
    let mut agent = Agent::new(planner.clone(), &hub);

    // Simulate dynamic events
    let events = hub.clone();
    thread::spawn(move || loop {
        thread::sleep(Duration::from_secs(5));
        println!("-- external event --");
        events.notify();
    });

    let report = agent.execute(&initial_state, plan, &goals, &context)?;
    println!("Outcome: {:?}", report.outcome);
    println!("Executed: {:?}", report.executed);
    println!("Final state: {}", report.state);
    println!(
        "Replans: {}, interruptions: {}",
        report.replans, report.interruptions
    );
    println!("{}", planner.stats());

    Ok(())
}
