//! Lexer compilation and scanning.
//!
//! ```text
//!   [TokenDescriptor]  ──compile──▶  LexerTable  ──scan──▶  Token, Token, ..., End
//! ```
//!
//! Every pattern descriptor is parsed, desugared and Thompson-constructed
//! into one shared NFA; the NFA is determinized and (optionally) minimized
//! while keeping each token's accepting states apart, and each accepting
//! state is finally assigned the descriptor with the lowest declaration
//! index among the tokens it accepts ("first declared wins").

pub mod compiler;
pub mod definitions;
pub mod scanner;
pub mod table;

use serde::{Deserialize, Serialize};

use crate::regex::{parse, Node, PatternSyntaxError};

pub use compiler::{compile, compile_default, CompileError, CompileOptions, LexerStats};
pub use definitions::{parse_definitions, DefinitionError};
pub use scanner::Scanner;
pub use table::{LexerTable, TableState};

/// Source text of a token pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// Regular-expression syntax, see [`crate::regex::parser`].
    Regex(String),
    /// Matched verbatim.
    Literal(String),
}

impl Pattern {
    pub fn text(&self) -> &str {
        match self {
            Pattern::Regex(text) | Pattern::Literal(text) => text,
        }
    }

    /// Syntax tree of the pattern (not yet desugared).
    pub fn to_node(&self) -> Result<Node<char>, PatternSyntaxError> {
        match self {
            Pattern::Regex(text) => parse(text),
            Pattern::Literal(text) => Ok(Node::literal_str(text)),
        }
    }
}

/// What a descriptor stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenRule {
    /// Tokens matching a pattern.
    Pattern(Pattern),
    /// The kind emitted once at end of input.
    End,
    /// The kind emitted for a symbol no pattern matches.
    Error,
}

/// One token declaration.
///
/// Lower `index` means higher priority when two patterns match the same
/// longest text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor<K> {
    pub index: u32,
    pub kind: K,
    pub rule: TokenRule,
    /// Matches are consumed but never emitted (whitespace, comments).
    pub ignore: bool,
}

impl<K> TokenDescriptor<K> {
    pub fn regex(index: u32, kind: K, pattern: impl Into<String>) -> Self {
        TokenDescriptor {
            index,
            kind,
            rule: TokenRule::Pattern(Pattern::Regex(pattern.into())),
            ignore: false,
        }
    }

    pub fn literal(index: u32, kind: K, text: impl Into<String>) -> Self {
        TokenDescriptor {
            index,
            kind,
            rule: TokenRule::Pattern(Pattern::Literal(text.into())),
            ignore: false,
        }
    }

    pub fn end(index: u32, kind: K) -> Self {
        TokenDescriptor { index, kind, rule: TokenRule::End, ignore: false }
    }

    pub fn error(index: u32, kind: K) -> Self {
        TokenDescriptor { index, kind, rule: TokenRule::Error, ignore: false }
    }

    /// Marks the descriptor as ignored.
    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        match &self.rule {
            TokenRule::Pattern(pattern) => Some(pattern),
            TokenRule::End | TokenRule::Error => None,
        }
    }
}

/// What reaching an accepting state of a compiled table means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accept<K> {
    /// Emit a token of `kind`.
    Token { index: u32, kind: K },
    /// Discard the matched text.
    Ignore { index: u32 },
}

impl<K> Accept<K> {
    /// Declaration index of the winning descriptor.
    pub fn index(&self) -> u32 {
        match self {
            Accept::Token { index, .. } | Accept::Ignore { index } => *index,
        }
    }

    pub fn kind(&self) -> Option<&K> {
        match self {
            Accept::Token { kind, .. } => Some(kind),
            Accept::Ignore { .. } => None,
        }
    }

    pub fn is_ignore(&self) -> bool {
        matches!(self, Accept::Ignore { .. })
    }
}

/// A scanned token. `offset` and `length` are in bytes; `text` borrows the
/// scanned input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'input, K> {
    pub kind: K,
    pub text: &'input str,
    pub offset: usize,
    pub length: usize,
}
