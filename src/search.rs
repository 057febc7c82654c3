use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use ordered_float::OrderedFloat;

use crate::goal::any_satisfied;
use crate::planner::{Counters, Plan, PlannerConfig};
use crate::{Action, Context, GoapError, Goal, Result, State};

/// A node in the search graph.
///
/// Nodes live in an arena and point at their parent by index, so a plan is
/// rebuilt once at the end instead of being copied into every successor.
#[derive(Debug, Clone)]
struct Node {
    /// The state reached at this node
    state: State,
    /// Index of the parent node
    parent: Option<usize>,
    /// Catalogue index of the action that produced this node
    action: Option<usize>,
    /// Accumulated planning cost
    cost: f64,
    /// Accumulated duration
    elapsed: u64,
    /// Number of actions from the start node
    depth: usize,
}

/// Frontier entry.
///
/// The derived ordering compares fields top to bottom: priority, then cost,
/// then elapsed duration, then plan length, then insertion order. Every key is
/// totally ordered, so equal inputs always pop in the same order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    priority: OrderedFloat<f64>,
    cost: OrderedFloat<f64>,
    elapsed: u64,
    depth: usize,
    seq: u64,
    idx: usize,
}

/// State for one best-first search over one set of competing goals.
pub(crate) struct SearchContext<'a, D> {
    actions: &'a [Action],
    goals: &'a [Goal<D>],
    context: &'a Context<D>,
    config: &'a PlannerConfig,
    counters: &'a Counters,
    nodes: Vec<Node>,
    frontier: BinaryHeap<Reverse<FrontierEntry>>,
    closed: HashSet<State>,
    seq: u64,
}

impl<'a, D> SearchContext<'a, D> {
    pub(crate) fn new(
        actions: &'a [Action],
        goals: &'a [Goal<D>],
        context: &'a Context<D>,
        config: &'a PlannerConfig,
        counters: &'a Counters,
        start: &State,
    ) -> Self {
        let mut state = start.clone();
        context.update_state(&mut state);

        let mut search = Self {
            actions,
            goals,
            context,
            config,
            counters,
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
            closed: HashSet::new(),
            seq: 0,
        };

        search.nodes.push(Node {
            state,
            parent: None,
            action: None,
            cost: 0.0,
            elapsed: 0,
            depth: 0,
        });
        search.push(0, 0.0);
        search
    }

    /// Runs the search to completion.
    ///
    /// Returns `Ok(None)` when the frontier runs dry, which covers both
    /// unreachable goals and goals that lie beyond the depth limit.
    pub(crate) fn run(mut self) -> Result<Option<Plan>> {
        while let Some(Reverse(entry)) = self.frontier.pop() {
            self.counters.node_expanded();
            let node = &self.nodes[entry.idx];

            // A node whose plan already has `max_depth` actions is dropped
            // before the goal test, so plans stay shorter than the limit.
            if node.depth >= self.config.max_depth {
                self.counters.node_pruned();
                continue;
            }

            if any_satisfied(self.goals, &node.state, self.config.goals) {
                let plan = Plan {
                    actions: self.reconstruct_path(entry.idx),
                    cost: node.cost,
                };
                log::debug!(
                    "search finished after {} nodes: {:?} (cost {})",
                    self.nodes.len(),
                    plan.actions,
                    plan.cost
                );
                return Ok(Some(plan));
            }

            if self.closed.contains(&node.state) {
                continue;
            }

            self.closed.insert(node.state.clone());
            self.expand(entry.idx)?;
        }

        log::debug!(
            "search exhausted after {} nodes, {} states closed",
            self.nodes.len(),
            self.closed.len()
        );
        Ok(None)
    }

    /// Generates one successor per applicable action and queues it once per goal.
    fn expand(&mut self, parent_idx: usize) -> Result<()> {
        let parent = self.nodes[parent_idx].clone();
        let (actions, goals, context) = (self.actions, self.goals, self.context);
        log::trace!("expanding {} at depth {}", parent.state, parent.depth);

        for (action_idx, action) in actions.iter().enumerate() {
            self.counters.action_tested();
            if !action.is_applicable_with(&parent.state, self.config.preconditions) {
                continue;
            }

            let mut state = action.apply(&parent.state);
            context.update_state(&mut state);

            let cost = parent.cost + action.cost;
            let idx = self.nodes.len();
            self.nodes.push(Node {
                state,
                parent: Some(parent_idx),
                action: Some(action_idx),
                cost,
                elapsed: parent.elapsed + action.duration,
                depth: parent.depth + 1,
            });

            for goal in goals {
                let priority = cost + goal.estimate(&self.nodes[idx].state, &context.domain);
                if !priority.is_finite() {
                    return Err(GoapError::InvalidPriority {
                        action: action.name.clone(),
                        priority,
                    });
                }
                self.push(idx, priority);
            }
        }

        Ok(())
    }

    fn push(&mut self, idx: usize, priority: f64) {
        let node = &self.nodes[idx];
        self.frontier.push(Reverse(FrontierEntry {
            priority: OrderedFloat(priority),
            cost: OrderedFloat(node.cost),
            elapsed: node.elapsed,
            depth: node.depth,
            seq: self.seq,
            idx,
        }));
        self.seq += 1;
    }

    fn reconstruct_path(&self, node_idx: usize) -> Vec<String> {
        let mut path = Vec::with_capacity(self.nodes[node_idx].depth);
        let mut current = Some(node_idx);

        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if let Some(action_idx) = node.action {
                path.push(self.actions[action_idx].name.clone());
            }
            current = node.parent;
        }

        path.reverse();
        path
    }
}
