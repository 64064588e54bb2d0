//! Regular expressions: syntax tree, parser and predefined classes.
//!
//! ```text
//!   "[a-z]+"  ──parse──▶  Node::Rep1(Range)  ──desugar──▶  Sequence(Range, Rep0(Range))
//! ```

pub mod ast;
pub mod class;
pub mod parser;

pub use ast::Node;
pub use parser::{parse, validate, PatternSyntaxError, MAX_REPEAT, NEST_LIMIT};
