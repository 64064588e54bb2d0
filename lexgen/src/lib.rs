//! # lexgen: regular expressions to minimized scanner tables
//!
//! Compiles a priority-ordered list of token patterns into a single
//! minimized DFA over `char` intervals, and scans text with it using
//! longest-match ("maximal munch") semantics.
//!
//! ## Architecture
//!
//! ```text
//!  patterns ──parse──▶ Node ──desugar──▶ Node (core forms)
//!                                          │
//!                                    Thompson construction
//!                                          ▼
//!                     shared NFA (one accepting state per token)
//!                                          │
//!                                  subset construction
//!                                          ▼
//!                       DFA ──minimize (per-token distinctions)──▶ DFA
//!                                          │
//!                         priority resolution, optional completion
//!                                          ▼
//!                                     LexerTable ──scan──▶ tokens
//! ```
//!
//! - [`interval`]: symbol intervals and interval sets
//! - [`regex`]: pattern syntax tree, desugaring and parser
//! - [`automata`]: NFA/DFA arenas, determinization, minimization, DOT export
//! - [`lexer`]: token descriptors, the compiler, tables and the scanner
//!
//! ```
//! use lexgen::{compile_default, TokenDescriptor};
//!
//! let descriptors = vec![
//!     TokenDescriptor::literal(0, "if", "if"),
//!     TokenDescriptor::regex(1, "ident", "[a-z]+"),
//!     TokenDescriptor::regex(2, "ws", "[ ]+").ignored(),
//!     TokenDescriptor::end(3, "eof"),
//!     TokenDescriptor::error(4, "error"),
//! ];
//! let (table, _stats) = compile_default(&descriptors).unwrap();
//! let kinds: Vec<&str> = table.scan("if iffy").map(|t| t.kind).collect();
//! assert_eq!(kinds, ["if", "ident", "eof"]);
//! ```

pub mod automata;
pub mod interval;
pub mod lexer;
pub mod regex;


pub use interval::{Interval, IntervalSet, Symbol};
pub use lexer::{
    compile, compile_default, parse_definitions, Accept, CompileError, CompileOptions,
    DefinitionError, LexerStats, LexerTable, Pattern, Scanner, Token, TokenDescriptor, TokenRule,
};
pub use regex::{Node, PatternSyntaxError};
