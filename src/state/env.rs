//! Abstract environments.
//!
//! An [`Env`] maps variable identities to interval facts at one program
//! point. A variable missing from the map is "not tracked in this state",
//! which is deliberately distinct from being tracked at top: merges
//! intersect key sets, so a variable known on only one incoming edge
//! becomes unknown at the join instead of leaking one path's fact.

use crate::bounds::interval::Interval;
use crate::core::types::ValueId;
use crate::stdlib::BTreeMap;

/// Mapping from variable identity to interval.
///
/// Equality is structural: same key set, equal interval per key. The map is
/// ordered so that iteration (and therefore logging and any derived output)
/// is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Env {
    ranges: BTreeMap<ValueId, Interval>,
}

impl Env {
    /// The empty environment (nothing tracked).
    pub fn new() -> Self {
        Self::default()
    }

    /// The interval tracked for `value`, if any.
    pub fn get(&self, value: ValueId) -> Option<Interval> {
        self.ranges.get(&value).copied()
    }

    /// Track (or strongly update) `value` with `interval`.
    pub fn set(&mut self, value: ValueId, interval: Interval) {
        self.ranges.insert(value, interval);
    }

    /// Whether `value` is tracked.
    pub fn contains(&self, value: ValueId) -> bool {
        self.ranges.contains_key(&value)
    }

    /// Number of tracked variables.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterate tracked variables in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (&ValueId, &Interval)> {
        self.ranges.iter()
    }

    /// Join with the facts of another incoming edge: intersect the key
    /// sets and union the intervals of shared keys.
    ///
    /// Not an outer join: keeping a variable tracked when one predecessor
    /// knows nothing about it would smuggle one path's bounds past the
    /// join.
    pub fn merge(&self, other: &Env) -> Env {
        let mut ranges = BTreeMap::new();
        for (value, a) in &self.ranges {
            if let Some(b) = other.ranges.get(value) {
                ranges.insert(*value, a.union(*b));
            }
        }
        Env { ranges }
    }

    /// One-sided widening against the previous recording of the same
    /// program point: every variable present in both has any strictly
    /// grown bound pinned to the corresponding infinity.
    pub fn widened_from(mut self, prev: &Env) -> Env {
        for (value, current) in self.ranges.iter_mut() {
            if let Some(p) = prev.ranges.get(value) {
                *current = current.widened_from(*p);
            }
        }
        self
    }
}
