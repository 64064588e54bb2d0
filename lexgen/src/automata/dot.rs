//! Graphviz DOT export.
//!
//! ```text
//! digraph automaton {
//!   rankdir=LR;
//!   node [shape=circle];
//!   __start0 [shape=point, style=invis];
//!   __start0 -> 0;
//!   2 [shape=doublecircle];
//!   0 -> 1 [label="'a'-'z'"];
//!   1 -> 2 [label="ε"];
//! }
//! ```

use std::fmt::Write;

use super::{ReadOnlyAutomaton, StateId};
use crate::interval::Symbol;

/// Renders `automaton` as a DOT digraph.
pub fn render<S, A>(automaton: &A) -> String
where
    S: Symbol,
    A: ReadOnlyAutomaton<S> + ?Sized,
{
    render_with(automaton, |_| None)
}

/// Like [`render`], with an optional extra line of text per state (shown
/// under the state number).
pub fn render_with<S, A, F>(automaton: &A, mut state_note: F) -> String
where
    S: Symbol,
    A: ReadOnlyAutomaton<S> + ?Sized,
    F: FnMut(StateId) -> Option<String>,
{
    let mut out = String::with_capacity(64 + automaton.state_count() * 48);
    out.push_str("digraph automaton {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=circle];\n");

    for (i, initial) in automaton.initial_states().iter().enumerate() {
        let _ = writeln!(out, "  __start{} [shape=point, style=invis];", i);
        let _ = writeln!(out, "  __start{} -> {};", i, initial);
    }

    for state in automaton.states() {
        let note = state_note(state);
        let accepting = automaton.is_accepting(state);
        if !accepting && note.is_none() {
            continue;
        }
        let _ = write!(out, "  {} [", state);
        if accepting {
            out.push_str("shape=doublecircle");
            if note.is_some() {
                out.push_str(", ");
            }
        }
        if let Some(note) = note {
            let _ = write!(out, "label=\"{}\\n{}\"", state, escape(&note));
        }
        out.push_str("];\n");
    }

    for state in automaton.states() {
        for (interval, target) in automaton.transitions(state) {
            let _ = writeln!(
                out,
                "  {} -> {} [label=\"{}\"];",
                state,
                target,
                escape(&interval.to_string())
            );
        }
        for target in automaton.epsilon_transitions(state) {
            let _ = writeln!(out, "  {} -> {} [label=\"ε\"];", state, target);
        }
    }

    out.push_str("}\n");
    out
}

/// Escapes quotes and backslashes for a DOT string.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::{Automaton, Nfa};
    use crate::interval::Interval;

    #[test]
    fn test_render_nfa() {
        let mut nfa: Nfa<char> = Nfa::new();
        let a = nfa.new_state(());
        let b = nfa.new_state(());
        let c = nfa.new_state(());
        nfa.add_initial(a);
        nfa.add_transition(a, Interval::single('"'), b);
        nfa.add_epsilon_transition(b, c);
        nfa.set_accepting(c, true);

        let dot = nfa.to_dot();
        assert!(dot.starts_with("digraph automaton {\n"));
        assert!(dot.contains("__start0 -> 0;"));
        assert!(dot.contains("  2 [shape=doublecircle];"));
        assert!(dot.contains(r#"0 -> 1 [label="'\"'"];"#));
        assert!(dot.contains("1 -> 2 [label=\"ε\"];"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_render_with_notes() {
        let mut nfa: Nfa<u8> = Nfa::new();
        let a = nfa.new_state(());
        nfa.set_accepting(a, true);
        let dot = render_with(&nfa, |s| Some(format!("kind \"{}\"", s)));
        assert!(dot.contains(r#"0 [shape=doublecircle, label="0\nkind \"0\""];"#));
    }
}
