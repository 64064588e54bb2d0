//! Multi-pattern compilation with first-declared-wins priority.
//!
//! Pipeline:
//! 1. Validate descriptors (one End, one Error, distinct indices)
//! 2. Parse → desugar → Thompson-construct every pattern into one NFA
//! 3. Subset construction (NFA → DFA)
//! 4. Minimize, keeping every token's accepting states apart
//! 5. Resolve each accepting state to its lowest-index descriptor
//! 6. Optionally complete the table over an alphabet with a trap state

use std::collections::HashSet;
use std::fmt;

use log::{debug, warn};
use thiserror::Error;

use super::{Accept, Pattern, TokenDescriptor, TokenRule};
use crate::automata::{
    construct, determinize, minimize, AlphabetPartition, Automaton, ConstructionError, Dfa,
    Distinctions, Nfa, ReadOnlyAutomaton, SetCombiner, StateId, StateSet,
};
use crate::interval::IntervalSet;
use crate::lexer::table::{LexerTable, TableState};
use crate::regex::PatternSyntaxError;

/// Compilation knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Run DFA minimization (on by default).
    pub minimize: bool,
    /// Complete the table over this alphabet with a trap state.
    pub alphabet: Option<IntervalSet<char>>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions { minimize: true, alphabet: None }
    }
}

impl CompileOptions {
    pub fn with_minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    pub fn with_alphabet(mut self, alphabet: IntervalSet<char>) -> Self {
        self.alphabet = Some(alphabet);
        self
    }
}

/// Statistics from the compilation pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexerStats {
    pub num_descriptors: usize,
    pub num_nfa_states: usize,
    pub num_dfa_states: usize,
    /// Equals `num_dfa_states` when minimization is off.
    pub num_minimized_states: usize,
    /// Alphabet classes of the final table.
    pub num_equiv_classes: usize,
    /// Indices of pattern descriptors that can never produce a token.
    pub shadowed: Vec<u32>,
    /// Indices of pattern descriptors matching the empty string.
    pub nullable: Vec<u32>,
}

/// Failure to compile a descriptor list. Compilation is all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("invalid pattern {pattern:?} for token #{index}")]
    Pattern {
        index: u32,
        pattern: String,
        #[source]
        source: PatternSyntaxError,
    },
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error("no End token descriptor")]
    MissingEnd,
    #[error("no Error token descriptor")]
    MissingError,
    #[error("more than one {role} token descriptor")]
    DuplicateReserved { role: &'static str },
    #[error("declaration index {index} is used by more than one token descriptor")]
    DuplicateIndex { index: u32 },
}

/// Compiles with [`CompileOptions::default`].
pub fn compile_default<K>(descriptors: &[TokenDescriptor<K>]) -> Result<(LexerTable<K>, LexerStats), CompileError>
where
    K: Clone + fmt::Debug,
{
    compile(descriptors, &CompileOptions::default())
}

/// Compiles `descriptors` into a scanner table.
///
/// # Errors
///
/// Fails on invalid patterns, on a missing or repeated End/Error
/// descriptor, and on repeated declaration indices.
pub fn compile<K>(
    descriptors: &[TokenDescriptor<K>],
    options: &CompileOptions,
) -> Result<(LexerTable<K>, LexerStats), CompileError>
where
    K: Clone + fmt::Debug,
{
    // Step 1: Validate
    let (end_kind, error_kind) = validate(descriptors)?;

    let mut patterns: Vec<(&TokenDescriptor<K>, &Pattern)> = descriptors
        .iter()
        .filter_map(|d| d.pattern().map(|p| (d, p)))
        .collect();
    patterns.sort_by_key(|(d, _)| d.index);

    // Step 2: Shared NFA. `owners[i]` is the accepting state of `patterns[i]`.
    let mut nfa: Nfa<char> = Nfa::new();
    let root = nfa.add_state(());
    nfa.add_initial(root);

    let mut owners: Vec<StateId> = Vec::with_capacity(patterns.len());
    let mut nullable: Vec<u32> = Vec::new();
    for &(descriptor, pattern) in &patterns {
        let node = pattern.to_node().map_err(|source| CompileError::Pattern {
            index: descriptor.index,
            pattern: pattern.text().to_string(),
            source,
        })?;
        if node.is_nullable() {
            warn!(
                "token #{} ({:?}) matches the empty string; empty matches are never emitted",
                descriptor.index, descriptor.kind
            );
            nullable.push(descriptor.index);
        }
        let fragment = construct(&node.desugar(), &mut nfa)?;
        nfa.add_epsilon_transition(root, fragment.start);
        nfa.set_accepting(fragment.end, true);
        owners.push(fragment.end);
    }
    let num_nfa_states = nfa.state_count();

    // Step 3: Subset construction
    let dfa = determinize(&nfa, SetCombiner);
    let num_dfa_states = dfa.state_count();

    // Step 5 (computed on the unminimized DFA): winner[state] = position in
    // `patterns` of the lowest-index token accepted there
    let winners: Vec<Option<usize>> = dfa
        .labels()
        .map(|set| owners.iter().position(|&accept| set.contains(accept)))
        .collect();

    // Step 4: Minimize
    let resolved: Dfa<char, Option<usize>> = if options.minimize {
        let mut distinctions = Distinctions::new();
        for &accept in &owners {
            let holders: StateSet = dfa
                .states()
                .filter(|&s| dfa.label(s).contains(accept))
                .collect();
            distinctions.add_set(holders);
        }
        minimize(&dfa, SetCombiner, &distinctions)
            .map_labels(|_, members| members.iter().next().and_then(|m| winners[m as usize]))
    } else {
        dfa.map_labels(|id, _| winners[id as usize])
    };
    let num_minimized_states = resolved.state_count();

    // A token is produced only from states entered by consuming input.
    let mut produced = vec![false; patterns.len()];
    for state in resolved.states() {
        for &(_, target) in resolved.transitions(state) {
            if let Some(position) = *resolved.label(target) {
                produced[position] = true;
            }
        }
    }
    let mut shadowed: Vec<u32> = Vec::new();
    for (position, (descriptor, _)) in patterns.iter().enumerate() {
        if !produced[position] {
            warn!(
                "token #{} ({:?}) is shadowed by higher-priority tokens and can never be produced",
                descriptor.index, descriptor.kind
            );
            shadowed.push(descriptor.index);
        }
    }

    // Step 6: Completion
    let mut resolved = resolved;
    let trap = match &options.alphabet {
        Some(alphabet) => {
            let trap = resolved.add_state(None);
            resolved.complete(alphabet, trap);
            Some(trap)
        },
        None => None,
    };

    let num_equiv_classes = AlphabetPartition::from_automaton(&resolved).num_classes();
    let start = resolved.start();
    let states: Vec<TableState<K>> = resolved
        .into_states()
        .into_iter()
        .map(|state| TableState {
            transitions: state.transitions,
            accept: state.label.map(|position| {
                let descriptor = patterns[position].0;
                if descriptor.ignore {
                    Accept::Ignore { index: descriptor.index }
                } else {
                    Accept::Token { index: descriptor.index, kind: descriptor.kind.clone() }
                }
            }),
        })
        .collect();

    let stats = LexerStats {
        num_descriptors: descriptors.len(),
        num_nfa_states,
        num_dfa_states,
        num_minimized_states,
        num_equiv_classes,
        shadowed,
        nullable,
    };
    debug!(
        "compiled {} descriptors: {} NFA states, {} DFA states, {} minimized, {} classes",
        stats.num_descriptors,
        stats.num_nfa_states,
        stats.num_dfa_states,
        stats.num_minimized_states,
        stats.num_equiv_classes
    );

    let table = LexerTable::from_parts(states, start, trap, end_kind, error_kind);
    Ok((table, stats))
}

/// Checks the reserved roles and index uniqueness; returns the End and
/// Error kinds.
fn validate<K: Clone>(descriptors: &[TokenDescriptor<K>]) -> Result<(K, K), CompileError> {
    let mut indices: HashSet<u32> = HashSet::with_capacity(descriptors.len());
    let mut end_kind: Option<K> = None;
    let mut error_kind: Option<K> = None;

    for descriptor in descriptors {
        if !indices.insert(descriptor.index) {
            return Err(CompileError::DuplicateIndex { index: descriptor.index });
        }
        let (slot, role) = match descriptor.rule {
            TokenRule::End => (&mut end_kind, "End"),
            TokenRule::Error => (&mut error_kind, "Error"),
            TokenRule::Pattern(_) => continue,
        };
        if slot.is_some() {
            return Err(CompileError::DuplicateReserved { role });
        }
        *slot = Some(descriptor.kind.clone());
    }

    let end_kind = end_kind.ok_or(CompileError::MissingEnd)?;
    let error_kind = error_kind.ok_or(CompileError::MissingError)?;
    Ok((end_kind, error_kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserved() -> Vec<TokenDescriptor<&'static str>> {
        vec![TokenDescriptor::end(100, "End"), TokenDescriptor::error(101, "Error")]
    }

    fn with_reserved(mut descriptors: Vec<TokenDescriptor<&'static str>>) -> Vec<TokenDescriptor<&'static str>> {
        descriptors.extend(reserved());
        descriptors
    }

    #[test]
    fn test_missing_reserved_descriptors() {
        let only_end = vec![TokenDescriptor::end(0, "End")];
        assert_eq!(compile_default(&only_end).unwrap_err(), CompileError::MissingError);
        let only_error = vec![TokenDescriptor::error(0, "Error")];
        assert_eq!(compile_default(&only_error).unwrap_err(), CompileError::MissingEnd);
    }

    #[test]
    fn test_duplicate_reserved_and_index() {
        let mut two_ends = reserved();
        two_ends.push(TokenDescriptor::end(102, "End2"));
        assert_eq!(
            compile_default(&two_ends).unwrap_err(),
            CompileError::DuplicateReserved { role: "End" }
        );

        let clash = with_reserved(vec![
            TokenDescriptor::literal(1, "a", "a"),
            TokenDescriptor::literal(1, "b", "b"),
        ]);
        assert_eq!(compile_default(&clash).unwrap_err(), CompileError::DuplicateIndex { index: 1 });
    }

    #[test]
    fn test_pattern_error_carries_source() {
        let bad = with_reserved(vec![TokenDescriptor::regex(4, "bad", "[a-")]);
        let err = compile_default(&bad).unwrap_err();
        match &err {
            CompileError::Pattern { index, pattern, source } => {
                assert_eq!(*index, 4);
                assert_eq!(pattern, "[a-");
                assert_eq!(source.offset, 0);
            },
            other => panic!("unexpected error {:?}", other),
        }
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "invalid pattern \"[a-\" for token #4");
    }

    #[test]
    fn test_stats_report_shadowed_and_nullable() {
        let descriptors = with_reserved(vec![
            TokenDescriptor::regex(0, "Word", "[a-z]+"),
            TokenDescriptor::literal(1, "If", "if"),
            TokenDescriptor::regex(2, "Maybe", "x*"),
        ]);
        let (_, stats) = compile_default(&descriptors).unwrap();
        assert_eq!(stats.shadowed, vec![1, 2]);
        assert_eq!(stats.nullable, vec![2]);
        assert_eq!(stats.num_descriptors, 5);
        assert!(stats.num_minimized_states <= stats.num_dfa_states);
    }

    #[test]
    fn test_minimize_flag() {
        let descriptors = with_reserved(vec![
            TokenDescriptor::literal(0, "ac", "ac"),
            TokenDescriptor::literal(1, "bc", "bc"),
            TokenDescriptor::regex(2, "other", "[de]c"),
        ]);
        let (_, full) = compile(&descriptors, &CompileOptions::default().with_minimize(false)).unwrap();
        assert_eq!(full.num_minimized_states, full.num_dfa_states);
        let (_, min) = compile_default(&descriptors).unwrap();
        assert!(min.num_minimized_states <= full.num_dfa_states);
    }

    #[test]
    fn test_alphabet_completion_adds_trap() {
        let descriptors = with_reserved(vec![TokenDescriptor::regex(0, "Num", "[0-9]+")]);
        let alphabet: IntervalSet<char> = IntervalSet::full();
        let (table, _) = compile(&descriptors, &CompileOptions::default().with_alphabet(alphabet.clone())).unwrap();
        let trap = table.trap().expect("completion requested");
        assert!(table.accept(trap).is_none());
        assert!(table.is_complete(&alphabet));
    }
}
