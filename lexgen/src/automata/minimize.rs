//! Hopcroft's DFA minimization with distinction constraints.
//!
//! Merges equivalent DFA states: states with the same accepting status,
//! the same membership in every caller-supplied distinction set, and the
//! same behavior on every alphabet class. Distinction sets let the lexer
//! compiler keep per-token accepting states apart even when they accept
//! the same language, so priority resolution can still tell them apart.
//!
//! **Algorithm:** Hopcroft refinement using an inverse transition map.
//! For each splitter (block + alphabet class), only the predecessors of the
//! splitter states are examined. Transitions may be partial (a missing
//! transition behaves like a move to an implicit dead block), so both halves
//! of every split are queued as splitters.

use std::collections::BTreeMap;

use log::{debug, trace};

use super::{
    partition::AlphabetPartition, Automaton, ClassId, Dfa, ReadOnlyAutomaton, ReadOnlyDfa,
    StateCombiner, StateId, StateSet,
};
use crate::interval::{Interval, Symbol};

/// Marker for "no transition" / "no block" in the dense tables below.
const NONE: u32 = u32::MAX;

/// Sets of DFA states that minimization must keep apart: a state inside a
/// set is never merged with a state outside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distinctions {
    sets: Vec<StateSet>,
}

impl Distinctions {
    /// No constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constraint keeping `a` and `b` apart (by isolating `a`).
    pub fn pair(a: StateId, b: StateId) -> Self {
        let mut distinctions = Distinctions::new();
        distinctions.add_pair(a, b);
        distinctions
    }

    pub fn add_pair(&mut self, a: StateId, b: StateId) {
        if a != b {
            self.sets.push(StateSet::single(a));
        }
    }

    pub fn add_set(&mut self, set: StateSet) {
        if !set.is_empty() {
            self.sets.push(set);
        }
    }

    pub fn with_set(mut self, set: StateSet) -> Self {
        self.add_set(set);
        self
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StateSet> {
        self.sets.iter()
    }
}

/// Minimize a DFA.
///
/// Unreachable states are dropped first. Each final block of equivalent
/// states becomes one state labeled by `combiner` (given the block's
/// original state ids); the block of the original start state becomes
/// state 0. The accepted language is unchanged.
pub fn minimize<S, L, C>(dfa: &Dfa<S, L>, mut combiner: C, distinctions: &Distinctions) -> Dfa<S, C::Label>
where
    S: Symbol,
    C: StateCombiner,
{
    let n = dfa.state_count();
    if n == 0 {
        return Dfa::new();
    }

    let reachable = reachable_states(dfa);
    let partition = AlphabetPartition::from_automaton(dfa);
    let num_classes = partition.num_classes();

    // --- Step 1: Dense transition table and inverse map over reachable states ---
    // delta[state * num_classes + class] = target or NONE
    let mut delta: Vec<StateId> = vec![NONE; n * num_classes];
    // inverse[target][class] = predecessors of target on class
    let mut inverse: Vec<Vec<Vec<StateId>>> = vec![vec![Vec::new(); num_classes]; n];
    for &state in &reachable {
        for class in 0..num_classes as ClassId {
            if let Some(target) = dfa.next(state, partition.representative(class)) {
                delta[state as usize * num_classes + class as usize] = target;
                inverse[target as usize][class as usize].push(state);
            }
        }
    }

    // --- Step 2: Initial partition by accepting status and distinction membership ---
    let mut groups: BTreeMap<(bool, Vec<bool>), Vec<StateId>> = BTreeMap::new();
    for &state in &reachable {
        let membership = distinctions.iter().map(|set| set.contains(state)).collect();
        groups
            .entry((dfa.is_accepting(state), membership))
            .or_default()
            .push(state);
    }

    let mut block_of: Vec<u32> = vec![NONE; n];
    let mut blocks: Vec<Vec<StateId>> = Vec::with_capacity(groups.len());
    for (_key, states) in groups {
        let idx = blocks.len() as u32;
        for &s in &states {
            block_of[s as usize] = idx;
        }
        blocks.push(states);
    }

    // --- Step 3: Refinement ---
    let mut worklist: Vec<(u32, ClassId)> = Vec::with_capacity(blocks.len() * num_classes);
    for block in 0..blocks.len() as u32 {
        for class in 0..num_classes as ClassId {
            worklist.push((block, class));
        }
    }

    let mut in_splitter = vec![false; n];
    let mut affected: Vec<u32> = Vec::new();
    let mut block_seen: Vec<bool> = Vec::new();

    while let Some((splitter, class)) = worklist.pop() {
        if blocks[splitter as usize].is_empty() {
            continue;
        }

        // Snapshot the splitter: later splits in this round must not change it.
        let members = blocks[splitter as usize].clone();
        for &s in &members {
            in_splitter[s as usize] = true;
        }

        affected.clear();
        block_seen.clear();
        block_seen.resize(blocks.len(), false);
        for &s in &members {
            for &pred in &inverse[s as usize][class as usize] {
                let b = block_of[pred as usize];
                if !block_seen[b as usize] {
                    block_seen[b as usize] = true;
                    affected.push(b);
                }
            }
        }

        for &block in &affected {
            if blocks[block as usize].len() <= 1 {
                continue;
            }
            let (hit, miss): (Vec<StateId>, Vec<StateId>) =
                blocks[block as usize].iter().copied().partition(|&state| {
                    let target = delta[state as usize * num_classes + class as usize];
                    target != NONE && in_splitter[target as usize]
                });
            if hit.is_empty() || miss.is_empty() {
                continue;
            }

            let new_block = blocks.len() as u32;
            trace!(
                "split block {} ({} states) into {} + {} on class {}",
                block,
                hit.len() + miss.len(),
                hit.len(),
                miss.len(),
                class
            );
            for &s in &miss {
                block_of[s as usize] = new_block;
            }
            blocks[block as usize] = hit;
            blocks.push(miss);

            for c in 0..num_classes as ClassId {
                worklist.push((block, c));
                worklist.push((new_block, c));
            }
        }

        for &s in &members {
            in_splitter[s as usize] = false;
        }
    }

    // --- Step 4: Build minimized DFA ---
    let mut result = Dfa::new();
    let mut new_id: Vec<StateId> = vec![NONE; blocks.len()];

    let start_block = block_of[dfa.start() as usize];
    let order = std::iter::once(start_block)
        .chain((0..blocks.len() as u32).filter(|&b| b != start_block && !blocks[b as usize].is_empty()));
    for block in order {
        let members: StateSet = blocks[block as usize].iter().copied().collect();
        let id = result.add_state(combiner.combine(&members));
        result.set_accepting(id, dfa.is_accepting(blocks[block as usize][0]));
        new_id[block as usize] = id;
    }

    for (block, members) in blocks.iter().enumerate() {
        let Some(&rep) = members.first() else {
            continue;
        };
        let transitions: Vec<(Interval<S>, StateId)> = dfa
            .transitions(rep)
            .iter()
            .map(|&(interval, target)| (interval, new_id[block_of[target as usize] as usize]))
            .collect();
        result.set_transitions(new_id[block], transitions);
    }

    debug!(
        "minimized {} DFA states ({} reachable) into {} states",
        n,
        reachable.len(),
        result.state_count()
    );
    result
}

/// States reachable from the start, in discovery order.
fn reachable_states<S: Symbol, L>(dfa: &Dfa<S, L>) -> Vec<StateId> {
    let mut seen = vec![false; dfa.state_count()];
    let mut order = vec![dfa.start()];
    seen[dfa.start() as usize] = true;
    let mut i = 0;
    while let Some(&state) = order.get(i) {
        for &(_, target) in dfa.transitions(state) {
            if !seen[target as usize] {
                seen[target as usize] = true;
                order.push(target);
            }
        }
        i += 1;
    }
    order
}
