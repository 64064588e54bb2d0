//! Finite-automaton infrastructure.
//!
//! Provides the NFA/DFA types, the capability traits shared by every
//! automaton flavor (including the compiled lexer table), and the
//! construction pipeline:
//! `Node → Thompson NFA → Alphabet classes → Subset DFA → Minimize`
//!
//! States live in an arena owned by the automaton and are addressed by
//! [`StateId`]. Each state carries a label of type `L`; determinization and
//! minimization choose result labels through a [`StateCombiner`].

pub mod combiner;
pub mod dfa;
pub mod dot;
pub mod minimize;
pub mod nfa;
pub mod partition;
pub mod subset;
pub mod thompson;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use crate::interval::{Interval, IntervalSet, Symbol};

pub use combiner::{Renumber, SetCombiner, StateCombiner};
pub use dfa::{Dfa, DfaState};
pub use minimize::{minimize, Distinctions};
pub use nfa::{Nfa, NfaState};
pub use partition::AlphabetPartition;
pub use subset::{determinize, determinize_with_sets, eliminate_epsilons};
pub use thompson::{construct, construct_with, ConstructionError, Fragment};

/// Identifier for an automaton state (index into the owning arena).
pub type StateId = u32;

/// Identifier for an alphabet equivalence class.
pub type ClassId = u32;

// ══════════════════════════════════════════════════════════════════════════════
// StateSet
// ══════════════════════════════════════════════════════════════════════════════

/// A sorted, de-duplicated set of state ids.
///
/// Equality is set equality. The hash is the XOR of per-member hashes, so
/// it does not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct StateSet {
    ids: Vec<StateId>,
}

impl StateSet {
    pub fn new() -> Self {
        StateSet::default()
    }

    pub fn single(id: StateId) -> Self {
        StateSet { ids: vec![id] }
    }

    /// Wraps an id list that is already sorted and free of duplicates.
    pub(crate) fn from_sorted(ids: Vec<StateId>) -> Self {
        debug_assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids must be strictly sorted");
        StateSet { ids }
    }

    /// Inserts `id`; returns `false` if it was already present.
    pub fn insert(&mut self, id: StateId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.ids.insert(pos, id);
                true
            },
        }
    }

    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[StateId] {
        &self.ids
    }

    /// Whether the two sets share at least one member.
    pub fn intersects(&self, other: &StateSet) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < other.ids.len() {
            match self.ids[i].cmp(&other.ids[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }
}

/// SplitMix64 finalizer: a cheap, well-mixed hash for a single id.
#[inline]
fn mix(id: StateId) -> u64 {
    let mut z = (id as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let folded = self.ids.iter().fold(0u64, |acc, &id| acc ^ mix(id));
        state.write_u64(folded);
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut ids: Vec<StateId> = iter.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        StateSet { ids }
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = StateId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, StateId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", id)?;
        }
        f.write_str("}")
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Capability traits
// ══════════════════════════════════════════════════════════════════════════════

/// Read-only view of a finite automaton over symbols `S`.
pub trait ReadOnlyAutomaton<S: Symbol> {
    fn state_count(&self) -> usize;

    /// All state ids, in arena order.
    fn states(&self) -> Range<StateId> {
        0..self.state_count() as StateId
    }

    fn initial_states(&self) -> StateSet;

    fn is_accepting(&self, state: StateId) -> bool;

    fn accepting_states(&self) -> StateSet {
        self.states().filter(|&s| self.is_accepting(s)).collect()
    }

    /// Symbol transitions leaving `state`.
    fn transitions(&self, state: StateId) -> &[(Interval<S>, StateId)];

    /// Epsilon transitions leaving `state`; none for deterministic flavors.
    fn epsilon_transitions(&self, _state: StateId) -> &[StateId] {
        &[]
    }

    /// Whether the automaton accepts `input` in full.
    fn accepts(&self, input: &[S]) -> bool {
        let mut current = closure_of(self, self.initial_states());
        for &symbol in input {
            let step: StateSet = current
                .iter()
                .flat_map(|s| self.transitions(s).iter())
                .filter(|(interval, _)| interval.contains(symbol))
                .map(|&(_, target)| target)
                .collect();
            if step.is_empty() {
                return false;
            }
            current = closure_of(self, step);
        }
        let accepted = current.iter().any(|s| self.is_accepting(s));
        accepted
    }

    /// Graphviz rendering, for debugging.
    fn to_dot(&self) -> String {
        dot::render(self)
    }

    /// Whether every state has a transition for every symbol of `alphabet`.
    fn is_complete(&self, alphabet: &IntervalSet<S>) -> bool {
        self.states()
            .all(|s| covered_symbols(self.transitions(s)).covers(alphabet))
    }
}

/// Mutable automaton.
pub trait Automaton<S: Symbol>: ReadOnlyAutomaton<S> {
    /// Per-state label type.
    type Label;

    fn new_state(&mut self, label: Self::Label) -> StateId;

    fn add_transition(&mut self, from: StateId, interval: Interval<S>, to: StateId);

    fn set_accepting(&mut self, state: StateId, accepting: bool);

    /// Adds, for every state (`trap` included), a transition to `trap` for
    /// each maximal interval of `alphabet` the state does not cover yet.
    ///
    /// Returns whether any transition was added.
    fn complete(&mut self, alphabet: &IntervalSet<S>, trap: StateId) -> bool {
        let mut added = false;
        for state in self.states() {
            let missing = alphabet.difference(&covered_symbols(self.transitions(state)));
            for interval in missing.iter() {
                self.add_transition(state, *interval, trap);
                added = true;
            }
        }
        added
    }
}

/// Deterministic automaton: one initial state, at most one target per
/// symbol.
pub trait ReadOnlyDfa<S: Symbol>: ReadOnlyAutomaton<S> {
    fn initial_state(&self) -> StateId;

    /// Target of `state` on `symbol`, if any.
    fn next(&self, state: StateId, symbol: S) -> Option<StateId> {
        let transitions = self.transitions(state);
        let idx = transitions.partition_point(|(interval, _)| interval.hi() < symbol);
        transitions
            .get(idx)
            .filter(|(interval, _)| interval.contains(symbol))
            .map(|&(_, target)| target)
    }
}

/// Union of the intervals on `transitions`.
pub fn covered_symbols<S: Symbol>(transitions: &[(Interval<S>, StateId)]) -> IntervalSet<S> {
    transitions.iter().map(|&(interval, _)| interval).collect()
}

/// Epsilon closure of `seeds` through any automaton's epsilon edges.
///
/// Iterative DFS with a visited bitmap, so cyclic epsilon graphs terminate.
pub(crate) fn closure_of<S, A>(automaton: &A, seeds: StateSet) -> StateSet
where
    S: Symbol,
    A: ReadOnlyAutomaton<S> + ?Sized,
{
    let mut visited = vec![false; automaton.state_count()];
    let mut closure: Vec<StateId> = Vec::with_capacity(seeds.len() * 2);
    let mut stack: Vec<StateId> = Vec::with_capacity(seeds.len());

    for s in seeds.iter() {
        visited[s as usize] = true;
        closure.push(s);
        stack.push(s);
    }

    while let Some(state) = stack.pop() {
        for &target in automaton.epsilon_transitions(state) {
            if !visited[target as usize] {
                visited[target as usize] = true;
                closure.push(target);
                stack.push(target);
            }
        }
    }

    closure.sort_unstable();
    StateSet::from_sorted(closure)
}
