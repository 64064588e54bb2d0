//! Thompson construction: one NFA fragment per syntax node.
//!
//! ```text
//!   Literal/Range/Any:  s ──[iv]──▶ e
//!   Sequence(a, b):     a.end ─ε─▶ b.start
//!   Alternation(a, b):  s ─ε─▶ a.start, b.start;  a.end, b.end ─ε─▶ e
//!   Optional(x):        s ─ε─▶ x.start, e;  x.end ─ε─▶ e
//!   Rep0(x):            s ─ε─▶ x.start, e;  x.end ─ε─▶ s, e
//!   Nop:                s ─ε─▶ e
//! ```
//!
//! Only desugared trees are accepted; construction never marks accepting
//! states, callers do.

use thiserror::Error;

use super::{Automaton, Nfa, StateId};
use crate::interval::{Interval, Symbol};
use crate::regex::Node;

/// Construction failure. Signals a pipeline bug rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("{node} is not supported by Thompson construction; desugar the pattern first")]
    NotDesugared { node: &'static str },
}

/// A sub-automaton with exactly one dangling start and one dangling end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: StateId,
    pub end: StateId,
}

/// Builds the fragment for `node` into `nfa`, labeling new states with
/// `L::default()`.
pub fn construct<S, L>(node: &Node<S>, nfa: &mut Nfa<S, L>) -> Result<Fragment, ConstructionError>
where
    S: Symbol,
    L: Default,
{
    construct_with(node, nfa, &mut L::default)
}

/// Builds the fragment for `node` into `nfa`, labeling each new state with
/// the next value of `new_label`.
///
/// The tree is walked with an explicit work stack, so arbitrarily deep
/// trees build in constant call-stack space. States are allocated in the
/// same pre/post order a recursive walk would use.
pub fn construct_with<S, L, F>(
    node: &Node<S>,
    nfa: &mut Nfa<S, L>,
    new_label: &mut F,
) -> Result<Fragment, ConstructionError>
where
    S: Symbol,
    F: FnMut() -> L,
{
    let mut work: Vec<Step<'_, S>> = vec![Step::Enter(node)];
    let mut built: Vec<Fragment> = Vec::new();

    while let Some(step) = work.pop() {
        match step {
            Step::Enter(node) => match node {
                Node::Literal(symbol) => {
                    let (start, end) = (nfa.new_state(new_label()), nfa.new_state(new_label()));
                    nfa.add_transition(start, Interval::single(*symbol), end);
                    built.push(Fragment { start, end });
                },
                Node::Any => {
                    let (start, end) = (nfa.new_state(new_label()), nfa.new_state(new_label()));
                    nfa.add_transition(start, Interval::full(), end);
                    built.push(Fragment { start, end });
                },
                Node::Range { negate, set } => {
                    let (start, end) = (nfa.new_state(new_label()), nfa.new_state(new_label()));
                    let set = if *negate { set.complement() } else { set.clone() };
                    for interval in set.iter() {
                        nfa.add_transition(start, *interval, end);
                    }
                    built.push(Fragment { start, end });
                },
                Node::Nop => {
                    let (start, end) = (nfa.new_state(new_label()), nfa.new_state(new_label()));
                    nfa.add_epsilon_transition(start, end);
                    built.push(Fragment { start, end });
                },
                Node::Sequence(a, b) => {
                    work.push(Step::Join(Join::Sequence));
                    work.push(Step::Enter(b));
                    work.push(Step::Enter(a));
                },
                Node::Alternation(a, b) => {
                    let start = nfa.new_state(new_label());
                    work.push(Step::Join(Join::Alternation { start }));
                    work.push(Step::Enter(b));
                    work.push(Step::Enter(a));
                },
                Node::Optional(element) => {
                    let start = nfa.new_state(new_label());
                    work.push(Step::Join(Join::Optional { start }));
                    work.push(Step::Enter(element));
                },
                Node::Rep0(element) => {
                    let start = nfa.new_state(new_label());
                    work.push(Step::Join(Join::Rep0 { start }));
                    work.push(Step::Enter(element));
                },
                Node::Rep1(_) | Node::RepBetween { .. } => {
                    return Err(ConstructionError::NotDesugared { node: node.kind_name() });
                },
            },
            Step::Join(join) => {
                let fragment = join.finish(&mut built, nfa, new_label);
                built.push(fragment);
            },
        }
    }

    Ok(built.pop().expect("the root fragment is built last"))
}

/// A unit of pending construction work.
enum Step<'n, S> {
    /// Build the fragment for a node.
    Enter(&'n Node<S>),
    /// Wire the fragments of a node's operands, which sit on top of the
    /// fragment stack.
    Join(Join),
}

/// How to wire a composite node once its operands are built.
#[derive(Clone, Copy)]
enum Join {
    Sequence,
    Alternation { start: StateId },
    Optional { start: StateId },
    Rep0 { start: StateId },
}

impl Join {
    fn finish<S, L, F>(
        self,
        built: &mut Vec<Fragment>,
        nfa: &mut Nfa<S, L>,
        new_label: &mut F,
    ) -> Fragment
    where
        S: Symbol,
        F: FnMut() -> L,
    {
        let mut operand = || built.pop().expect("operands are built before their join");
        match self {
            Join::Sequence => {
                let second = operand();
                let first = operand();
                nfa.add_epsilon_transition(first.end, second.start);
                Fragment { start: first.start, end: second.end }
            },
            Join::Alternation { start } => {
                let right = operand();
                let left = operand();
                let end = nfa.new_state(new_label());
                nfa.add_epsilon_transition(start, left.start);
                nfa.add_epsilon_transition(start, right.start);
                nfa.add_epsilon_transition(left.end, end);
                nfa.add_epsilon_transition(right.end, end);
                Fragment { start, end }
            },
            Join::Optional { start } => {
                let inner = operand();
                let end = nfa.new_state(new_label());
                nfa.add_epsilon_transition(start, inner.start);
                nfa.add_epsilon_transition(start, end);
                nfa.add_epsilon_transition(inner.end, end);
                Fragment { start, end }
            },
            Join::Rep0 { start } => {
                let inner = operand();
                let end = nfa.new_state(new_label());
                nfa.add_epsilon_transition(start, end);
                nfa.add_epsilon_transition(start, inner.start);
                nfa.add_epsilon_transition(inner.end, start);
                nfa.add_epsilon_transition(inner.end, end);
                Fragment { start, end }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::ReadOnlyAutomaton;
    use crate::regex::parse;

    fn nfa_for(pattern: &str) -> Nfa<char> {
        let node = parse(pattern).expect("valid pattern").desugar();
        let mut nfa = Nfa::new();
        let frag = construct(&node, &mut nfa).expect("desugared tree");
        nfa.add_initial(frag.start);
        nfa.set_accepting(frag.end, true);
        nfa
    }

    fn accepts(nfa: &Nfa<char>, text: &str) -> bool {
        nfa.accepts(&text.chars().collect::<Vec<_>>())
    }

    #[test]
    fn test_literal_fragment() {
        let mut nfa: Nfa<u8> = Nfa::new();
        let frag = construct(&Node::Literal(b'x'), &mut nfa).unwrap();
        assert_eq!(nfa.state_count(), 2);
        assert_eq!(nfa.transitions(frag.start), &[(Interval::single(b'x'), frag.end)]);
        assert!(nfa.accepting_states().is_empty());
    }

    #[test]
    fn test_negated_range_uses_complement() {
        let nfa = nfa_for("[^a-y]");
        assert!(accepts(&nfa, "z"));
        assert!(accepts(&nfa, "λ"));
        assert!(!accepts(&nfa, "b"));
    }

    #[test]
    fn test_empty_class_matches_nothing() {
        let mut nfa: Nfa<char> = Nfa::new();
        let node = Node::class(false, Default::default());
        let frag = construct(&node, &mut nfa).unwrap();
        assert!(nfa.transitions(frag.start).is_empty());
    }

    #[test]
    fn test_composite_languages() {
        let nfa = nfa_for("(ab|c)*d?");
        for ok in ["", "ab", "c", "abcab", "d", "cd", "ababd"] {
            assert!(accepts(&nfa, ok), "{:?} should match", ok);
        }
        for bad in ["a", "b", "dd", "abd d", "ca"] {
            assert!(!accepts(&nfa, bad), "{:?} should not match", bad);
        }
    }

    #[test]
    fn test_bounded_repetition() {
        let nfa = nfa_for("a{2,4}");
        assert!(!accepts(&nfa, "a"));
        assert!(accepts(&nfa, "aa"));
        assert!(accepts(&nfa, "aaa"));
        assert!(accepts(&nfa, "aaaa"));
        assert!(!accepts(&nfa, "aaaaa"));
    }

    #[test]
    fn test_requires_desugared_tree() {
        let mut nfa: Nfa<char> = Nfa::new();
        let err = construct(&Node::rep1(Node::Literal('a')), &mut nfa).unwrap_err();
        assert_eq!(err, ConstructionError::NotDesugared { node: "Rep1" });

        let nested = Node::seq(Node::Literal('a'), Node::repeat(1, Some(2), Node::Literal('b')));
        let err = construct(&nested, &mut nfa).unwrap_err();
        assert_eq!(err, ConstructionError::NotDesugared { node: "RepBetween" });
    }

    #[test]
    fn test_state_allocation_order() {
        let mut nfa: Nfa<char> = Nfa::new();
        let node = Node::alt(Node::Literal('a'), Node::rep0(Node::Literal('b')));
        let frag = construct(&node, &mut nfa).unwrap();
        // alt start, a, rep0 start, b, rep0 end, alt end
        assert_eq!(frag, Fragment { start: 0, end: 7 });
        assert_eq!(nfa.transitions(1), &[(Interval::single('a'), 2)]);
        assert_eq!(nfa.transitions(4), &[(Interval::single('b'), 5)]);
        assert_eq!(nfa.epsilon_transitions(0), &[1, 3]);
    }

    #[test]
    fn test_long_optional_chain() {
        let nfa = nfa_for("b{0,1000}c");
        assert!(accepts(&nfa, "c"));
        assert!(accepts(&nfa, &format!("{}c", "b".repeat(1000))));
        assert!(!accepts(&nfa, &format!("{}c", "b".repeat(1001))));
    }

    #[test]
    fn test_custom_labels() {
        let mut nfa: Nfa<char, u32> = Nfa::new();
        let mut next = 100;
        let frag = construct_with(&Node::Literal('a'), &mut nfa, &mut || {
            next += 1;
            next
        })
        .unwrap();
        assert_eq!(*nfa.label(frag.start), 101);
        assert_eq!(*nfa.label(frag.end), 102);
    }
}
