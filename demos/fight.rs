//! Fighting experiment.
//!
//! Usage: `cargo run --example fight -- [plan|execute]`
//!
//! A fighter has to bring every opponent's health to zero. Opponents patrol
//! the grid on their own thread; every move is broadcast as a replan event,
//! and the state-update hook keeps the fighter's view of the arena current.

use std::env;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use goap_replan::{
    Action, Agent, AgentConfig, Context, EventHub, Goal, Planner, PlanningMode, State,
};

const GRID: i64 = 10;

#[derive(Debug, Clone, Copy)]
enum Patrol {
    Vertical,
    Horizontal,
}

#[derive(Debug)]
struct Opponent {
    name: &'static str,
    x: i64,
    y: i64,
    health: i64,
    patrol: Patrol,
    direction: i64,
}

impl Opponent {
    fn new(name: &'static str, x: i64, y: i64, health: i64, patrol: Patrol) -> Self {
        Self {
            name,
            x,
            y,
            health,
            patrol,
            direction: 1,
        }
    }

    /// Steps one cell along the patrol line, bouncing off the grid edges.
    fn advance(&mut self) {
        let axis = match self.patrol {
            Patrol::Vertical => &mut self.y,
            Patrol::Horizontal => &mut self.x,
        };
        *axis += self.direction;
        if !(0..GRID).contains(axis) {
            self.direction = -self.direction;
            *axis += 2 * self.direction;
        }
        println!("{} moved to ({}, {})", self.name, self.x, self.y);
    }

    fn at(&self, x: i64, y: i64) -> bool {
        self.x == x && self.y == y
    }
}

/// Everything the hooks and heuristic need to see of the arena.
#[derive(Debug)]
struct Arena {
    opponents: Mutex<Vec<Opponent>>,
}

impl Arena {
    fn any_alive(&self) -> bool {
        self.opponents.lock().unwrap().iter().any(|o| o.health > 0)
    }
}

fn health_key(i: usize) -> String {
    format!("enemy_health_{}", i)
}

/// Remaining perceived health plus Manhattan distance to each live opponent.
fn fight_heuristic(state: &State, _goal: &State, arena: &Arc<Arena>) -> f64 {
    let (x, y) = (state.get("x"), state.get("y"));
    let opponents = arena.opponents.lock().unwrap();

    opponents
        .iter()
        .enumerate()
        .map(|(i, opponent)| {
            let key = health_key(i);
            let health = if state.contains(&key) {
                state.get(&key)
            } else {
                opponent.health
            };
            let distance = if health == 0 {
                0
            } else {
                (x - opponent.x).abs() + (y - opponent.y).abs()
            };
            (distance + health) as f64
        })
        .sum()
}

/// Folds opponent positions and pending damage into the fighter's state.
fn update_fight_state(state: &mut State, arena: &Arc<Arena>) {
    let (x, y) = (state.get("x"), state.get("y"));
    let opponents = arena.opponents.lock().unwrap();

    let in_range = opponents.iter().any(|o| o.at(x, y));
    state.set("in_range", in_range as i64);

    let damage = state.get("damage_dealt");
    for (i, opponent) in opponents.iter().enumerate() {
        let key = health_key(i);
        if !state.contains(&key) {
            state.set(key.clone(), opponent.health);
        }
        if opponent.at(x, y) {
            let remaining = (state.get(&key) - damage).max(0);
            state.set(key, remaining);
        }
    }
    state.set("damage_dealt", 0);
}

/// Applies a landed attack to the real opponents.
fn update_enemy_health(action: &Action, state: &mut State, arena: &Arc<Arena>) {
    if !action.name.ends_with("Attack") {
        return;
    }
    let (x, y) = (state.get("x"), state.get("y"));
    let damage = action.effects.get("damage_dealt");

    let mut opponents = arena.opponents.lock().unwrap();
    for opponent in opponents.iter_mut().filter(|o| o.at(x, y) && o.health > 0) {
        opponent.health = (opponent.health - damage).max(0);
        if opponent.health > 0 {
            println!(
                "{} took {} damage! Remaining health: {}",
                opponent.name, damage, opponent.health
            );
        } else {
            println!("{} is dead!", opponent.name);
        }
    }
}

fn fighter_actions() -> Result<Vec<Action>, Box<dyn Error>> {
    let mut actions = Vec::new();

    for (name, axis, step) in [
        ("Move Up", "y", 1),
        ("Move Down", "y", -1),
        ("Move Left", "x", -1),
        ("Move Right", "x", 1),
    ] {
        let mut action = Action::new(name, 1.0)?.with_duration(1);
        action.preconditions.set("stamina", 1);
        action.effects.set(axis, step);
        action.effects.set("stamina", -1);
        actions.push(action);
    }

    let mut simple = Action::new("Simple Attack", 2.0)?.with_duration(1);
    simple.preconditions = [("stamina", 2), ("in_range", 1)].into();
    simple.effects = [("damage_dealt", 10), ("stamina", -2)].into();
    actions.push(simple);

    let mut combo = Action::new("Combo Attack", 4.0)?.with_duration(2);
    combo.preconditions = [("stamina", 4), ("in_range", 1)].into();
    combo.effects = [("damage_dealt", 30), ("stamina", -4)].into();
    actions.push(combo);

    let mut block = Action::new("Block", 1.0)?.with_duration(1);
    block.preconditions = [("stamina", 1), ("in_range", 1)].into();
    block.effects = [("blocking", 1), ("stamina", -1)].into();
    actions.push(block);

    let mut counter = Action::new("Counter Attack", 2.0)?.with_duration(1);
    counter.preconditions = [("blocking", 1), ("stamina", 2), ("in_range", 1)].into();
    counter.effects = [("damage_dealt", 20), ("blocking", -1), ("stamina", -2)].into();
    actions.push(counter);

    let mut wait = Action::new("Wait", 1.0)?.with_duration(1);
    wait.effects.set("stamina", 10);
    actions.push(wait);

    Ok(actions)
}

fn main() -> Result<(), Box<dyn Error>> {
    let execute = env::args().skip(1).any(|arg| arg == "execute");

    let arena = Arc::new(Arena {
        opponents: Mutex::new(vec![
            Opponent::new("Opponent1", 2, 0, 50, Patrol::Vertical),
            Opponent::new("Opponent2", 4, 1, 100, Patrol::Horizontal),
        ]),
    });
    let opponent_count = arena.opponents.lock().unwrap().len();

    let goal_state: State = (0..opponent_count).map(|i| (health_key(i), 0)).collect();
    let goals = [Goal::new(goal_state).with_heuristic(fight_heuristic)];
    let context = Context::new(arena.clone())
        .with_state_update(update_fight_state)
        .with_post_action(update_enemy_health);

    let initial_state: State = [
        ("x", 0),
        ("y", 0),
        ("stamina", 20),
        ("health", 100),
        ("blocking", 0),
        ("in_range", 0),
        ("damage_dealt", 0),
    ]
    .into();

    let planner = Arc::new(Planner::new(fighter_actions()?)?);
    let plan = planner.plan(&initial_state, &goals, &context, PlanningMode::Global)?;
    println!(
        "Generated Plan: {:?} with total cost: {}",
        plan.actions, plan.cost
    );
    if !execute {
        return Ok(());
    }

    let hub = EventHub::new();
    let config = AgentConfig {
        tick: Duration::from_millis(500),
        ..AgentConfig::default()
    };
    let mut fighter = Agent::with_config(planner.clone(), &hub, config);

    // Opponents wait two turns between moves; each move invalidates the plan
    let world = arena.clone();
    let events = hub.clone();
    thread::spawn(move || {
        while world.any_alive() {
            thread::sleep(Duration::from_secs(2));
            for opponent in world.opponents.lock().unwrap().iter_mut() {
                if opponent.health > 0 {
                    opponent.advance();
                }
            }
            events.notify();
        }
    });

    let report = fighter.execute(&initial_state, plan, &goals, &context)?;
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
