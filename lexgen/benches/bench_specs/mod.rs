//! Token sets and inputs for benchmarks, plus precomputed pipeline
//! intermediates so each stage can be measured on its own.

// Each benchmark uses a different subset of these helpers.
#![allow(dead_code)]

use lexgen::automata::{construct, determinize, Automaton, Dfa, Nfa, SetCombiner, StateId, StateSet};
use lexgen::regex::parse;
use lexgen::TokenDescriptor;

/// Operators, delimiters and a few literal classes.
pub fn minimal_spec() -> Vec<TokenDescriptor<String>> {
    build(&["\\+", "-", "\\*", "/", "\\(", "\\)"], &[], &[("Int", "[0-9]+")])
}

/// A small expression language.
pub fn small_spec() -> Vec<TokenDescriptor<String>> {
    build(
        &["\\+", "-", "\\*", "/", "==", "!=", "<=", ">=", "<", ">", "=", "\\(", "\\)", "\\{", "\\}", ";", ","],
        &["if", "else", "let", "fn", "true", "false"],
        &[("Int", "[0-9]+"), ("Ident", "[a-zA-Z_][a-zA-Z0-9_]*")],
    )
}

/// Something shaped like a general-purpose language.
pub fn complex_spec() -> Vec<TokenDescriptor<String>> {
    build(
        &[
            "\\+", "-", "\\*", "/", "%", "==", "!=", "<=", ">=", "<", ">", "=", "\\+=", "-=", "&&", "\\|\\|",
            "!", "->", "=>", "::", ":", "\\.", "\\.\\.", "\\(", "\\)", "\\{", "\\}", "\\[", "\\]", ";", ",",
        ],
        &[
            "if", "else", "while", "for", "in", "loop", "break", "continue", "return", "let", "mut", "fn",
            "struct", "enum", "impl", "trait", "match", "true", "false",
        ],
        &[
            ("Float", "[0-9]+\\.[0-9]+([eE][+-]?[0-9]+)?"),
            ("Int", "[0-9]+|0x[0-9a-fA-F]+"),
            ("String", "\"([^\"\\\\]|\\\\.)*\""),
            ("Ident", "[a-zA-Z_][a-zA-Z0-9_]*"),
            ("Comment", "//[^\\n]*"),
        ],
    )
}

/// `n` keywords `kw0 .. kw{n-1}` plus identifiers and integers.
pub fn synthetic_spec(n: usize) -> Vec<TokenDescriptor<String>> {
    let keywords: Vec<String> = (0..n).map(|i| format!("kw{}", i)).collect();
    let keywords: Vec<&str> = keywords.iter().map(String::as_str).collect();
    build(&[], &keywords, &[("Int", "[0-9]+"), ("Ident", "[a-z_][a-z0-9_]*")])
}

/// Operators first, then keywords, then regex classes; whitespace is
/// ignored; End and Error close the list.
fn build(operators: &[&str], keywords: &[&str], classes: &[(&str, &str)]) -> Vec<TokenDescriptor<String>> {
    let mut descriptors = Vec::new();
    for op in operators {
        let index = descriptors.len() as u32;
        descriptors.push(TokenDescriptor::regex(index, format!("op{}", index), *op));
    }
    for kw in keywords {
        let index = descriptors.len() as u32;
        descriptors.push(TokenDescriptor::literal(index, kw.to_uppercase(), *kw));
    }
    for (name, pattern) in classes {
        let index = descriptors.len() as u32;
        descriptors.push(TokenDescriptor::regex(index, name.to_string(), *pattern));
    }
    let index = descriptors.len() as u32;
    descriptors.push(TokenDescriptor::regex(index, "Ws".to_string(), "[ \\t\\r\\n]+").ignored());
    descriptors.push(TokenDescriptor::end(index + 1, "End".to_string()));
    descriptors.push(TokenDescriptor::error(index + 2, "Error".to_string()));
    descriptors
}

/// Source text of roughly `lines` lines for the complex token set.
pub fn sample_input(lines: usize) -> String {
    let mut text = String::new();
    for i in 0..lines {
        text.push_str(&format!(
            "fn item_{i}(x: i32, y: f64) -> i32 {{ let mut acc = 0x{i:x} + x * 3.25e-2; // step {i}\n    \
             if acc >= {i} && y != 1.5 {{ return acc; }} else {{ acc += \"text\\n{i}\"; }} }}\n"
        ));
    }
    text
}

/// Intermediates of the automata pipeline for one token set.
pub struct Prepared {
    pub descriptors: Vec<TokenDescriptor<String>>,
    pub nfa: Nfa<char>,
    pub owners: Vec<StateId>,
    pub dfa: Dfa<char, StateSet>,
}

/// Shared NFA over every pattern descriptor, and its subset DFA.
pub fn prepare(descriptors: &[TokenDescriptor<String>]) -> Prepared {
    let (nfa, owners) = build_nfa(descriptors);
    let dfa = determinize(&nfa, SetCombiner);
    Prepared { descriptors: descriptors.to_vec(), nfa, owners, dfa }
}

pub fn build_nfa(descriptors: &[TokenDescriptor<String>]) -> (Nfa<char>, Vec<StateId>) {
    let mut nfa = Nfa::new();
    let root = nfa.add_state(());
    nfa.add_initial(root);
    let mut owners = Vec::new();
    for descriptor in descriptors {
        let Some(pattern) = descriptor.pattern() else {
            continue;
        };
        let node = pattern.to_node().expect("benchmark patterns are valid").desugar();
        let fragment = construct(&node, &mut nfa).expect("desugared");
        nfa.add_epsilon_transition(root, fragment.start);
        nfa.set_accepting(fragment.end, true);
        owners.push(fragment.end);
    }
    (nfa, owners)
}

/// Every pattern of `descriptors`, parsed.
pub fn parse_all(descriptors: &[TokenDescriptor<String>]) -> usize {
    descriptors
        .iter()
        .filter_map(|d| d.pattern())
        .filter(|p| matches!(p, lexgen::Pattern::Regex(_)))
        .map(|p| parse(p.text()).map(|_| 1).unwrap_or(0))
        .sum()
}
