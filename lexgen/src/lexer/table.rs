//! The compiled, immutable scanner table.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::scanner::Scanner;
use super::{Accept, Token};
use crate::automata::{dot, ReadOnlyAutomaton, ReadOnlyDfa, StateId, StateSet};
use crate::interval::Interval;

/// One state of a compiled table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState<K> {
    /// Sorted, non-overlapping.
    pub transitions: Vec<(Interval<char>, StateId)>,
    pub accept: Option<Accept<K>>,
}

/// A minimized DFA over `char` with per-state accept tags.
///
/// Immutable after compilation; any number of [`Scanner`]s may share it.
/// Deserialization rejects tables whose state ids are out of range or whose
/// transitions are not sorted and disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "raw::LexerTable<K>", bound(deserialize = "K: Deserialize<'de>"))]
pub struct LexerTable<K> {
    states: Vec<TableState<K>>,
    start: StateId,
    trap: Option<StateId>,
    end_kind: K,
    error_kind: K,
}

/// Unchecked wire form of [`LexerTable`].
mod raw {
    use serde::Deserialize;

    use super::TableState;
    use crate::automata::StateId;

    #[derive(Deserialize)]
    pub struct LexerTable<K> {
        pub states: Vec<TableState<K>>,
        pub start: StateId,
        pub trap: Option<StateId>,
        pub end_kind: K,
        pub error_kind: K,
    }
}

impl<K> TryFrom<raw::LexerTable<K>> for LexerTable<K> {
    type Error = String;

    fn try_from(raw: raw::LexerTable<K>) -> Result<Self, Self::Error> {
        let count = raw.states.len();
        let in_range = |id: StateId| (id as usize) < count;
        if !in_range(raw.start) {
            return Err(format!("start state {} out of range ({} states)", raw.start, count));
        }
        if let Some(trap) = raw.trap.filter(|&trap| !in_range(trap)) {
            return Err(format!("trap state {} out of range ({} states)", trap, count));
        }
        for (id, state) in raw.states.iter().enumerate() {
            if let Some(&(_, target)) = state.transitions.iter().find(|&&(_, t)| !in_range(t)) {
                return Err(format!("state {}: target {} out of range ({} states)", id, target, count));
            }
            if state.transitions.windows(2).any(|w| w[0].0.hi() >= w[1].0.lo()) {
                return Err(format!("state {}: transitions are not sorted and disjoint", id));
            }
        }
        Ok(LexerTable::from_parts(raw.states, raw.start, raw.trap, raw.end_kind, raw.error_kind))
    }
}

impl<K> LexerTable<K> {
    pub(crate) fn from_parts(
        states: Vec<TableState<K>>,
        start: StateId,
        trap: Option<StateId>,
        end_kind: K,
        error_kind: K,
    ) -> Self {
        LexerTable { states, start, trap, end_kind, error_kind }
    }

    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The non-accepting sink added by alphabet completion, if any.
    #[inline]
    pub fn trap(&self) -> Option<StateId> {
        self.trap
    }

    pub fn end_kind(&self) -> &K {
        &self.end_kind
    }

    pub fn error_kind(&self) -> &K {
        &self.error_kind
    }

    pub fn state(&self, id: StateId) -> &TableState<K> {
        &self.states[id as usize]
    }

    pub fn accept(&self, id: StateId) -> Option<&Accept<K>> {
        self.states[id as usize].accept.as_ref()
    }

    /// Lazily scans `input`.
    pub fn scan<'t, 'i>(&'t self, input: &'i str) -> Scanner<'t, 'i, K> {
        Scanner::new(self, input)
    }

    /// Scans all of `input`, End token included.
    pub fn tokenize<'i>(&self, input: &'i str) -> Vec<Token<'i, K>>
    where
        K: Clone,
    {
        self.scan(input).collect()
    }
}

impl<K: fmt::Debug> LexerTable<K> {
    /// DOT rendering with the accept tag of every accepting state.
    pub fn to_annotated_dot(&self) -> String {
        dot::render_with(self, |state| {
            self.accept(state).map(|accept| match accept {
                Accept::Token { index, kind } => format!("#{} {:?}", index, kind),
                Accept::Ignore { index } => format!("#{} ignore", index),
            })
        })
    }
}

impl<K> ReadOnlyAutomaton<char> for LexerTable<K> {
    fn state_count(&self) -> usize {
        self.states.len()
    }

    fn initial_states(&self) -> StateSet {
        StateSet::single(self.start)
    }

    fn is_accepting(&self, state: StateId) -> bool {
        self.states[state as usize].accept.is_some()
    }

    fn transitions(&self, state: StateId) -> &[(Interval<char>, StateId)] {
        &self.states[state as usize].transitions
    }

    fn accepts(&self, input: &[char]) -> bool {
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

impl<K> ReadOnlyDfa<char> for LexerTable<K> {
    fn initial_state(&self) -> StateId {
        self.start
    }
}
