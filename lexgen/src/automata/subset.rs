//! Subset construction: NFA → DFA conversion, and epsilon elimination.
//!
//! Implements the standard powerset construction algorithm:
//! 1. Epsilon-closure of all NFA initial states → DFA start state
//! 2. For each DFA state and each alphabet class, union the closures of the
//!    targets reachable on that class
//! 3. A DFA state accepts iff its NFA state set meets the accepting set
//!
//! The seen-map is an `IndexSet<StateSet>` whose insertion index is the DFA
//! state id, so it doubles as the work queue.

use indexmap::IndexSet;
use log::{debug, trace};

use super::{
    closure_of, partition::AlphabetPartition, Automaton, ClassId, Dfa, Nfa, ReadOnlyAutomaton,
    StateCombiner, StateId, StateSet,
};
use crate::interval::{Interval, Symbol};

/// Convert an NFA to a DFA using subset construction over alphabet classes.
///
/// Result states are labeled by `combiner`; with [`SetCombiner`] each label
/// is the NFA state set the DFA state stands for. State 0 is the start.
///
/// [`SetCombiner`]: super::SetCombiner
pub fn determinize<S, L, C>(nfa: &Nfa<S, L>, combiner: C) -> Dfa<S, C::Label>
where
    S: Symbol,
    C: StateCombiner,
{
    determinize_with_sets(nfa, combiner).0
}

/// Like [`determinize`], also returning the NFA state set behind each DFA
/// state (indexed by DFA state id) whatever the combiner.
pub fn determinize_with_sets<S, L, C>(nfa: &Nfa<S, L>, mut combiner: C) -> (Dfa<S, C::Label>, Vec<StateSet>)
where
    S: Symbol,
    C: StateCombiner,
{
    let partition = AlphabetPartition::from_automaton(nfa);
    let accepting = nfa.accepting_states();

    let mut dfa = Dfa::new();
    let mut seen: IndexSet<StateSet> = IndexSet::new();
    seen.insert(nfa.epsilon_closure(nfa.initial_states().iter()));

    let mut targets: Vec<StateId> = Vec::new();
    let mut next = 0;
    while let Some(current) = seen.get_index(next).cloned() {
        let id = dfa.add_state(combiner.combine(&current));
        debug_assert_eq!(id as usize, next);
        dfa.set_accepting(id, current.intersects(&accepting));

        let mut transitions: Vec<(Interval<S>, StateId)> = Vec::new();
        for class in 0..partition.num_classes() as ClassId {
            let rep = partition.representative(class);

            // move(current, class): every NFA state reachable on the class
            targets.clear();
            for nfa_state in current.iter() {
                for &(interval, target) in nfa.transitions(nfa_state) {
                    if interval.contains(rep) {
                        targets.push(target);
                    }
                }
            }
            if targets.is_empty() {
                continue; // no transition for this class
            }

            let closure = closure_of(nfa, targets.iter().copied().collect());
            let (target_id, _) = seen.insert_full(closure);
            for &interval in partition.class_intervals(class) {
                transitions.push((interval, target_id as StateId));
            }
        }

        trace!("dfa state {} = nfa {} ({} transitions)", id, current, transitions.len());
        dfa.set_transitions(id, transitions);
        next += 1;
    }

    debug!(
        "determinized {} NFA states into {} DFA states over {} alphabet classes",
        nfa.state_count(),
        dfa.state_count(),
        partition.num_classes()
    );

    (dfa, seen.into_iter().collect())
}

/// Removes epsilon edges without determinizing.
///
/// Result states stand for the epsilon-closures of the original initial
/// states and of every target of a symbol transition; a state accepts iff
/// its closure meets the accepting set. The language is unchanged.
pub fn eliminate_epsilons<S, L, C>(nfa: &Nfa<S, L>, mut combiner: C) -> Nfa<S, C::Label>
where
    S: Symbol,
    C: StateCombiner,
{
    let accepting = nfa.accepting_states();
    let mut result = Nfa::new();
    let mut seen: IndexSet<StateSet> = IndexSet::new();

    for initial in nfa.initial_states().iter() {
        seen.insert(nfa.epsilon_closure([initial]));
    }
    let initial_count = seen.len();

    let mut next = 0;
    while let Some(current) = seen.get_index(next).cloned() {
        let id = result.add_state(combiner.combine(&current));
        result.set_accepting(id, current.intersects(&accepting));
        if next < initial_count {
            result.add_initial(id);
        }

        let mut transitions: Vec<(Interval<S>, StateId)> = current
            .iter()
            .flat_map(|member| nfa.transitions(member).iter().copied())
            .map(|(interval, target)| {
                let (target_id, _) = seen.insert_full(nfa.epsilon_closure([target]));
                (interval, target_id as StateId)
            })
            .collect();
        transitions.sort_unstable();
        transitions.dedup();
        for (interval, target) in transitions {
            result.add_transition(id, interval, target);
        }
        next += 1;
    }

    debug!(
        "eliminated epsilons: {} NFA states -> {} states",
        nfa.state_count(),
        result.state_count()
    );
    result
}
