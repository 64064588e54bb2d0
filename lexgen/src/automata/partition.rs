//! Alphabet equivalence class partitioning.
//!
//! Partitions the symbols mentioned by an automaton into equivalence
//! classes: sets of symbols that behave identically in every state (same
//! targets from the same sources). Determinization and minimization then
//! iterate over classes instead of symbols; for `char` this shrinks
//! 1.1 million symbols to a handful of classes.
//!
//! Symbols that appear on no transition belong to no class.

use std::collections::HashMap;

use super::{ClassId, ReadOnlyAutomaton, StateId};
use crate::interval::{split_disjoint, Interval, Symbol};

/// Result of alphabet partitioning.
#[derive(Debug, Clone)]
pub struct AlphabetPartition<S> {
    /// Elementary disjoint intervals, sorted, each tagged with its class.
    pieces: Vec<(Interval<S>, ClassId)>,
    /// Intervals of each class, sorted.
    classes: Vec<Vec<Interval<S>>>,
}

impl<S: Symbol> AlphabetPartition<S> {
    /// Computes the classes induced by every transition of `automaton`.
    ///
    /// Two symbols are equivalent iff, for every state, they lead to the
    /// same set of targets. This is computed by:
    /// 1. Splitting all transition intervals into elementary pieces
    /// 2. Building a signature per piece (which state goes where)
    /// 3. Grouping pieces with identical signatures
    pub fn from_automaton<A>(automaton: &A) -> Self
    where
        A: ReadOnlyAutomaton<S> + ?Sized,
    {
        let all: Vec<Interval<S>> = automaton
            .states()
            .flat_map(|s| automaton.transitions(s).iter().map(|&(interval, _)| interval))
            .collect();
        let elementary = split_disjoint(&all);

        // signatures[piece] = (source, target) pairs of transitions covering the piece
        let mut signatures: Vec<Vec<(StateId, StateId)>> = vec![Vec::new(); elementary.len()];
        for state in automaton.states() {
            for &(interval, target) in automaton.transitions(state) {
                // Each transition interval is an exact run of pieces.
                let first = elementary.partition_point(|p| p.lo() < interval.lo());
                for (offset, piece) in elementary[first..].iter().enumerate() {
                    if piece.lo() > interval.hi() {
                        break;
                    }
                    signatures[first + offset].push((state, target));
                }
            }
        }

        let mut class_of_signature: HashMap<Vec<(StateId, StateId)>, ClassId> = HashMap::new();
        let mut classes: Vec<Vec<Interval<S>>> = Vec::new();
        let mut pieces = Vec::with_capacity(elementary.len());

        for (piece, mut signature) in elementary.into_iter().zip(signatures) {
            signature.sort_unstable();
            signature.dedup();
            let next_class = classes.len() as ClassId;
            let class = *class_of_signature.entry(signature).or_insert(next_class);
            if class == next_class {
                classes.push(Vec::new());
            }
            classes[class as usize].push(piece);
            pieces.push((piece, class));
        }

        /* Neighbouring pieces of the same class read better as one interval */
        for intervals in &mut classes {
            let mut merged: Vec<Interval<S>> = Vec::with_capacity(intervals.len());
            for &iv in intervals.iter() {
                match merged.last_mut() {
                    Some(last) if last.precedes(&iv) => *last = Interval::new(last.lo(), iv.hi()),
                    _ => merged.push(iv),
                }
            }
            *intervals = merged;
        }

        AlphabetPartition { pieces, classes }
    }

    /// Number of distinct equivalence classes.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Look up the equivalence class of a symbol; `None` if no transition
    /// mentions it.
    pub fn classify(&self, symbol: S) -> Option<ClassId> {
        let idx = self.pieces.partition_point(|(iv, _)| iv.hi() < symbol);
        self.pieces
            .get(idx)
            .filter(|(iv, _)| iv.contains(symbol))
            .map(|&(_, class)| class)
    }

    /// Sorted intervals making up `class`.
    pub fn class_intervals(&self, class: ClassId) -> &[Interval<S>] {
        &self.classes[class as usize]
    }

    /// Any one symbol of `class`.
    pub fn representative(&self, class: ClassId) -> S {
        self.classes[class as usize][0].lo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::{construct, Nfa};
    use crate::regex::parse;

    fn nfa_of(patterns: &[&str]) -> Nfa<char> {
        let mut nfa = Nfa::new();
        for pattern in patterns {
            let node = parse(pattern).unwrap().desugar();
            let frag = construct(&node, &mut nfa).unwrap();
            nfa.add_initial(frag.start);
        }
        nfa
    }

    #[test]
    fn test_equivalence_classes_simple() {
        let nfa = nfa_of(&["[a-z][a-z0-9]*", "[0-9]+", "if"]);
        let partition = AlphabetPartition::from_automaton(&nfa);

        // 'i' and 'f' are special; other letters behave alike.
        let i = partition.classify('i').unwrap();
        let f = partition.classify('f').unwrap();
        let a = partition.classify('a').unwrap();
        assert_ne!(i, f);
        assert_ne!(i, a);
        assert_eq!(partition.classify('b'), Some(a));
        assert_eq!(partition.classify('z'), Some(a));

        // Digits form their own class.
        let zero = partition.classify('0').unwrap();
        assert_eq!(partition.classify('9'), Some(zero));
        assert_ne!(zero, a);

        // Unmentioned symbols have no class.
        assert_eq!(partition.classify('+'), None);
        assert_eq!(partition.num_classes(), 4);
    }

    #[test]
    fn test_class_intervals_are_merged() {
        let nfa = nfa_of(&["[a-z]", "[m-p]"]);
        let partition = AlphabetPartition::from_automaton(&nfa);
        assert_eq!(partition.num_classes(), 2);

        let outer = partition.classify('a').unwrap();
        assert_eq!(
            partition.class_intervals(outer),
            &[Interval::new('a', 'l'), Interval::new('q', 'z')]
        );
        assert_eq!(partition.representative(outer), 'a');
        let inner = partition.classify('n').unwrap();
        assert_eq!(partition.class_intervals(inner), &[Interval::new('m', 'p')]);
    }
}
