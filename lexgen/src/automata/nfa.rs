//! Nondeterministic automaton with interval-labeled and epsilon edges.

use super::{closure_of, Automaton, ReadOnlyAutomaton, StateId, StateSet};
use crate::interval::{Interval, Symbol};

/// NFA state with labeled and epsilon transitions.
#[derive(Debug, Clone)]
pub struct NfaState<S, L> {
    pub label: L,
    /// Labeled transitions: (symbol interval, target state).
    pub transitions: Vec<(Interval<S>, StateId)>,
    /// Epsilon transitions: targets reachable without consuming input.
    pub epsilon: Vec<StateId>,
    pub accepting: bool,
}

/// A nondeterministic finite automaton with any number of initial states.
#[derive(Debug, Clone)]
pub struct Nfa<S, L = ()> {
    states: Vec<NfaState<S, L>>,
    initial: StateSet,
}

impl<S, L> Default for Nfa<S, L> {
    fn default() -> Self {
        Nfa { states: Vec::new(), initial: StateSet::new() }
    }
}

impl<S: Symbol, L> Nfa<S, L> {
    /// An automaton with no states.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self, label: L) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(NfaState {
            label,
            transitions: Vec::new(),
            epsilon: Vec::new(),
            accepting: false,
        });
        id
    }

    /// Add an epsilon transition from `from` to `to`.
    pub fn add_epsilon_transition(&mut self, from: StateId, to: StateId) {
        self.states[from as usize].epsilon.push(to);
    }

    /// Marks `state` as initial.
    pub fn add_initial(&mut self, state: StateId) {
        self.initial.insert(state);
    }

    pub fn state(&self, id: StateId) -> &NfaState<S, L> {
        &self.states[id as usize]
    }

    pub fn label(&self, id: StateId) -> &L {
        &self.states[id as usize].label
    }

    pub fn has_epsilon_transitions(&self) -> bool {
        self.states.iter().any(|s| !s.epsilon.is_empty())
    }

    /// Number of symbol and epsilon edges.
    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len() + s.epsilon.len()).sum()
    }

    /// Computes the epsilon-closure of `seeds`: every state reachable using
    /// only epsilon edges, the seeds included.
    pub fn epsilon_closure<I>(&self, seeds: I) -> StateSet
    where
        I: IntoIterator<Item = StateId>,
    {
        closure_of(self, seeds.into_iter().collect())
    }
}

impl<S: Symbol, L> ReadOnlyAutomaton<S> for Nfa<S, L> {
    fn state_count(&self) -> usize {
        self.states.len()
    }

    fn initial_states(&self) -> StateSet {
        self.initial.clone()
    }

    fn is_accepting(&self, state: StateId) -> bool {
        self.states[state as usize].accepting
    }

    fn transitions(&self, state: StateId) -> &[(Interval<S>, StateId)] {
        &self.states[state as usize].transitions
    }

    fn epsilon_transitions(&self, state: StateId) -> &[StateId] {
        &self.states[state as usize].epsilon
    }
}

impl<S: Symbol, L> Automaton<S> for Nfa<S, L> {
    type Label = L;

    fn new_state(&mut self, label: L) -> StateId {
        self.add_state(label)
    }

    fn add_transition(&mut self, from: StateId, interval: Interval<S>, to: StateId) {
        self.states[from as usize].transitions.push((interval, to));
    }

    fn set_accepting(&mut self, state: StateId, accepting: bool) {
        self.states[state as usize].accepting = accepting;
    }
}
