//! Caller-supplied extension points threaded through planning and execution.
//!
//! The core never looks inside `domain`; it only hands it to heuristics and
//! hooks, which are the caller's code.

use std::fmt;

use crate::{Action, State};

/// Adjusts a state to fold in externally observed facts.
pub type StateUpdateHook<D> = Box<dyn Fn(&mut State, &D) + Send + Sync>;

/// Runs after an action completes during live execution.
pub type PostActionHook<D> = Box<dyn Fn(&Action, &mut State, &D) + Send + Sync>;

/// Auxiliary data and hooks passed unchanged through every search and execution step.
///
/// # Examples
///
/// ```
/// use goap_replan::{Context, State};
///
/// // The payload can be anything the hooks and heuristics need
/// struct Sensors {
///     enemy_in_sight: bool,
/// }
///
/// let ctx = Context::new(Sensors { enemy_in_sight: true }).with_state_update(
///     |state: &mut State, sensors: &Sensors| {
///         state.set("enemy_visible", sensors.enemy_in_sight as i64);
///     },
/// );
///
/// let mut state = State::new();
/// ctx.update_state(&mut state);
/// assert_eq!(state.get("enemy_visible"), 1);
/// ```
pub struct Context<D = ()> {
    pub domain: D,
    update_state: Option<StateUpdateHook<D>>,
    post_action: Option<PostActionHook<D>>,
}

impl<D> Context<D> {
    pub fn new(domain: D) -> Self {
        Self {
            domain,
            update_state: None,
            post_action: None,
        }
    }

    /// Installs the hook run on the start state and on every successor the
    /// planner generates, and on the live state before each executed step.
    pub fn with_state_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut State, &D) + Send + Sync + 'static,
    {
        self.update_state = Some(Box::new(hook));
        self
    }

    /// Installs the hook run on the live state after each completed action.
    pub fn with_post_action<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Action, &mut State, &D) + Send + Sync + 'static,
    {
        self.post_action = Some(Box::new(hook));
        self
    }

    pub fn update_state(&self, state: &mut State) {
        if let Some(hook) = &self.update_state {
            hook(state, &self.domain);
        }
    }

    pub fn post_action(&self, action: &Action, state: &mut State) {
        if let Some(hook) = &self.post_action {
            hook(action, state, &self.domain);
        }
    }
}

impl<D: Default> Default for Context<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D: fmt::Debug> fmt::Debug for Context<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("domain", &self.domain)
            .field("update_state", &self.update_state.is_some())
            .field("post_action", &self.post_action.is_some())
            .finish()
    }
}
