//! Deterministic automaton with sorted interval transitions.

use super::{Automaton, ReadOnlyAutomaton, ReadOnlyDfa, StateId, StateSet};
use crate::interval::{Interval, Symbol};

/// DFA state. `transitions` is sorted by interval and never overlaps, so
/// the state's transition relation is a partial function.
#[derive(Debug, Clone)]
pub struct DfaState<S, L> {
    pub label: L,
    pub transitions: Vec<(Interval<S>, StateId)>,
    pub accepting: bool,
}

/// A deterministic finite automaton with a designated start state.
#[derive(Debug, Clone)]
pub struct Dfa<S, L = ()> {
    states: Vec<DfaState<S, L>>,
    start: StateId,
}

impl<S, L> Default for Dfa<S, L> {
    fn default() -> Self {
        Dfa { states: Vec::new(), start: 0 }
    }
}

impl<S: Symbol, L> Dfa<S, L> {
    /// An automaton with no states; the first added state becomes the start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self, label: L) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(DfaState { label, transitions: Vec::new(), accepting: false });
        id
    }

    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn set_start(&mut self, state: StateId) {
        self.start = state;
    }

    pub fn state(&self, id: StateId) -> &DfaState<S, L> {
        &self.states[id as usize]
    }

    pub fn label(&self, id: StateId) -> &L {
        &self.states[id as usize].label
    }

    pub fn labels(&self) -> impl Iterator<Item = &L> + '_ {
        self.states.iter().map(|s| &s.label)
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// Same automaton with every label rewritten by `f`.
    pub fn map_labels<M, F>(self, mut f: F) -> Dfa<S, M>
    where
        F: FnMut(StateId, L) -> M,
    {
        let states = self
            .states
            .into_iter()
            .enumerate()
            .map(|(i, s)| DfaState {
                label: f(i as StateId, s.label),
                transitions: s.transitions,
                accepting: s.accepting,
            })
            .collect();
        Dfa { states, start: self.start }
    }

    /// Replaces the transitions of `state` with `transitions`, which must
    /// not overlap each other.
    pub(crate) fn set_transitions(&mut self, state: StateId, mut transitions: Vec<(Interval<S>, StateId)>) {
        transitions.sort_unstable();
        self.states[state as usize].transitions = coalesce(transitions);
    }

    /// Consumes the automaton, returning its states.
    pub fn into_states(self) -> Vec<DfaState<S, L>> {
        self.states
    }
}

fn coalesce<S: Symbol>(transitions: Vec<(Interval<S>, StateId)>) -> Vec<(Interval<S>, StateId)> {
    let mut merged: Vec<(Interval<S>, StateId)> = Vec::with_capacity(transitions.len());
    for (interval, target) in transitions {
        if let Some((last, last_target)) = merged.last_mut() {
            if *last_target == target && last.precedes(&interval) {
                *last = Interval::new(last.lo(), interval.hi());
                continue;
            }
        }
        merged.push((interval, target));
    }
    merged
}

impl<S: Symbol, L> ReadOnlyAutomaton<S> for Dfa<S, L> {
    fn state_count(&self) -> usize {
        self.states.len()
    }

    fn initial_states(&self) -> StateSet {
        if self.states.is_empty() {
            StateSet::new()
        } else {
            StateSet::single(self.start)
        }
    }

    fn is_accepting(&self, state: StateId) -> bool {
        self.states[state as usize].accepting
    }

    fn transitions(&self, state: StateId) -> &[(Interval<S>, StateId)] {
        &self.states[state as usize].transitions
    }

    fn accepts(&self, input: &[S]) -> bool {
        if self.states.is_empty() {
            return false;
        }
        let mut state = self.start;
        for &symbol in input {
            match self.next(state, symbol) {
                Some(target) => state = target,
                None => return false,
            }
        }
        self.is_accepting(state)
    }
}

impl<S: Symbol, L> ReadOnlyDfa<S> for Dfa<S, L> {
    fn initial_state(&self) -> StateId {
        self.start
    }
}

impl<S: Symbol, L> Automaton<S> for Dfa<S, L> {
    type Label = L;

    fn new_state(&mut self, label: L) -> StateId {
        self.add_state(label)
    }

    /// Inserts the transition in interval order. The interval must not
    /// overlap an existing transition of `from`.
    fn add_transition(&mut self, from: StateId, interval: Interval<S>, to: StateId) {
        let transitions = &mut self.states[from as usize].transitions;
        let pos = transitions.partition_point(|(existing, _)| existing.hi() < interval.lo());
        debug_assert!(
            transitions.get(pos).map_or(true, |(existing, _)| !existing.overlaps(&interval)),
            "overlapping DFA transition {} from state {}",
            interval,
            from
        );
        transitions.insert(pos, (interval, to));
    }

    fn set_accepting(&mut self, state: StateId, accepting: bool) {
        self.states[state as usize].accepting = accepting;
    }
}
