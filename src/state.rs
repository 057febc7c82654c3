//! # State Module
//!
//! A [`State`] is a snapshot of the world: a mapping from condition keys to
//! integer magnitudes. Booleans are written as `0`/`1`, and a key that is
//! absent reads as `0`.
//!
//! The same structure describes world states, action preconditions, action
//! effects (as signed deltas) and goal conditions.
//!
//! ## Basic Usage
//!
//! ```
//! use goap_replan::{Comparison, State};
//!
//! let mut current = State::new();
//! current.set("wood", 0);
//! current.set("fire", 0);
//!
//! // Effects are deltas, not overwrites
//! let mut effects = State::new();
//! effects.set("wood", 5);
//! current.apply_effects(&effects);
//! assert_eq!(current.get("wood"), 5);
//!
//! // Missing keys read as zero
//! assert_eq!(current.get("cooked_food"), 0);
//!
//! let mut needs_wood = State::new();
//! needs_wood.set("wood", 3);
//! assert!(current.satisfies(&needs_wood, Comparison::AtLeast));
//! assert!(!current.satisfies(&needs_wood, Comparison::Exact));
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// How a state's magnitude is compared against a required magnitude.
///
/// Both policies show up in GOAP practice. Preconditions are usually thresholds
/// ("at least 3 wood") while goals are usually exact targets ("exactly one
/// cooked meal"), which is why [`crate::PlannerConfig`] picks them separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Comparison {
    /// The state's magnitude must be greater than or equal to the requirement.
    #[default]
    AtLeast,
    /// The state's magnitude must equal the requirement.
    Exact,
}

impl Comparison {
    /// Compares an observed magnitude with a required one.
    pub fn matches(self, actual: i64, required: i64) -> bool {
        match self {
            Comparison::AtLeast => actual >= required,
            Comparison::Exact => actual == required,
        }
    }
}

/// Represents the state of the world as condition keys mapped to integer magnitudes.
///
/// The entries are kept sorted by key, so two states holding the same pairs
/// compare and hash equal no matter which order they were built in. That is
/// what lets the planner's closed set recognise a state reached along
/// different paths.
///
/// # Examples
///
/// ```
/// use goap_replan::State;
///
/// let a: State = [("fire", 1), ("wood", 2)].into();
/// let b: State = [("wood", 2), ("fire", 1)].into();
/// assert_eq!(a, b);
/// assert_eq!(a.canonical(), vec![("fire", 1), ("wood", 2)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct State {
    values: BTreeMap<String, i64>,
}

impl State {
    /// Creates a new empty state.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Sets the magnitude for `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: i64) {
        self.values.insert(key.into(), value);
    }

    /// Gets the magnitude for `key`. Keys that were never set read as `0`.
    pub fn get(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    /// Returns `true` if `key` has an explicit entry, even a zero one.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks every requirement in `condition` against this state.
    ///
    /// An empty condition is satisfied by any state. Requirements on keys this
    /// state does not hold are compared against `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use goap_replan::{Comparison, State};
    ///
    /// let state: State = [("stamina", 4)].into();
    /// let attack: State = [("stamina", 2)].into();
    /// assert!(state.satisfies(&attack, Comparison::AtLeast));
    /// assert!(!state.satisfies(&attack, Comparison::Exact));
    ///
    /// let idle: State = [("blocking", 0)].into();
    /// assert!(state.satisfies(&idle, Comparison::Exact));
    /// ```
    pub fn satisfies(&self, condition: &State, comparison: Comparison) -> bool {
        condition
            .values
            .iter()
            .all(|(key, &required)| comparison.matches(self.get(key), required))
    }

    /// Adds every delta in `effects` to this state.
    ///
    /// Keys missing from this state start at `0`; keys missing from `effects`
    /// are left untouched.
    pub fn apply_effects(&mut self, effects: &State) {
        for (key, delta) in effects.values.iter() {
            *self.values.entry(key.clone()).or_insert(0) += delta;
        }
    }

    /// Read-only access to the underlying sorted map.
    pub fn values(&self) -> &BTreeMap<String, i64> {
        &self.values
    }

    /// The canonical form of this state: its entries sorted by key.
    pub fn canonical(&self) -> Vec<(&str, i64)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), *value))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for State {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }
}

impl<K: Into<String>, const N: usize> From<[(K, i64); N]> for State {
    fn from(pairs: [(K, i64); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_state_is_empty() {
        let state = State::new();
        assert!(state.is_empty());
        assert_eq!(state.len(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut state = State::new();
        state.set("wood", 5);
        assert_eq!(state.get("wood"), 5);
        state.set("wood", 2);
        assert_eq!(state.get("wood"), 2);
        assert_eq!(state.get("fire"), 0);
        assert!(state.contains("wood"));
        assert!(!state.contains("fire"));
    }

    #[test]
    fn test_satisfies_at_least() {
        let state: State = [("wood", 5), ("fire", 0)].into();

        let mut required = State::new();
        assert!(state.satisfies(&required, Comparison::AtLeast));
        required.set("wood", 3);
        assert!(state.satisfies(&required, Comparison::AtLeast));
        required.set("wood", 6);
        assert!(!state.satisfies(&required, Comparison::AtLeast));
        required.set("wood", 0);
        required.set("missing", 1);
        assert!(!state.satisfies(&required, Comparison::AtLeast));
    }

    #[test]
    fn test_satisfies_exact() {
        let state: State = [("cooked_food", 2)].into();
        let one: State = [("cooked_food", 1)].into();
        let two: State = [("cooked_food", 2)].into();
        assert!(!state.satisfies(&one, Comparison::Exact));
        assert!(state.satisfies(&two, Comparison::Exact));
        assert!(state.satisfies(&one, Comparison::AtLeast));
    }

    #[test]
    fn test_apply_effects_is_additive() {
        let mut state: State = [("stamina", 3), ("x", 1)].into();
        let effects: State = [("stamina", -2), ("damage_dealt", 10)].into();

        state.apply_effects(&effects);
        assert_eq!(state.get("stamina"), 1);
        assert_eq!(state.get("x"), 1);
        assert_eq!(state.get("damage_dealt"), 10);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let mut a = State::new();
        a.set("wood", 5);
        a.set("fire", 1);
        a.set("cooked_food", 0);

        let mut b = State::new();
        b.set("cooked_food", 0);
        b.set("fire", 1);
        b.set("wood", 5);

        assert_eq!(a, b);
        let mut closed = HashSet::new();
        closed.insert(a);
        assert!(closed.contains(&b));
    }

    #[test]
    fn test_explicit_zero_is_kept() {
        let zero: State = [("wood", 0)].into();
        assert_ne!(zero, State::new());
        assert_eq!(zero.get("wood"), State::new().get("wood"));
    }

    #[test]
    fn test_display() {
        let state: State = [("wood", 5), ("fire", 1)].into();
        assert_eq!(state.to_string(), "{fire: 1, wood: 5}");
        assert_eq!(State::new().to_string(), "{}");
    }
}
