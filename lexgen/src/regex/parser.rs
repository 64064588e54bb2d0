//! Pattern text → [`Node`] parser (single pass, trampolined).
//!
//! The parser keeps an explicit stack of continuation frames instead of
//! recursing into groups and alternations. Group nesting and stacked
//! quantifiers are limited to [`NEST_LIMIT`] levels and repetition counts to
//! [`MAX_REPEAT`], which bounds the depth of every tree the pipeline builds
//! from a parsed pattern.
//!
//! ## Supported syntax
//!
//! | Feature | Syntax |
//! |---------|--------|
//! | Literal | `a`, `1`, `_`, any non-meta character |
//! | Any symbol | `.` |
//! | Escapes | `\n \r \t \f \v \0`, `\xHH`, `\u{H..}`, `\` + punctuation |
//! | Shorthand classes | `\d \D \w \W \s \S` |
//! | Character class | `[abc]`, `[a-z]`, `[^"]`, `[]x]`, `[x-]` |
//! | POSIX classes | `[[:alpha:]_]`, `[[:digit:]]`, ... |
//! | Grouping | `(...)` |
//! | Alternation | <code>a&#124;b</code> |
//! | Quantifiers | `?` `*` `+` `{n}` `{n,}` `{n,m}` (stackable) |
//!
//! Offsets in errors are byte offsets into the pattern.

use thiserror::Error;

use super::ast::Node;
use super::class::{posix_class, shorthand_class};
use crate::interval::{Interval, IntervalSet};

/// Largest count accepted in `{n}`, `{n,}` and `{n,m}`.
pub const MAX_REPEAT: u32 = 1000;

/// Deepest accepted nesting of groups plus stacked quantifiers.
pub const NEST_LIMIT: usize = 250;

/// A malformed pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("regex error at byte {offset}: {message}")]
pub struct PatternSyntaxError {
    /// Byte offset into the pattern where the error was detected.
    pub offset: usize,
    /// Human-readable description of the error.
    pub message: String,
}

impl PatternSyntaxError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        PatternSyntaxError { offset, message: message.into() }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Continuation frames
// ══════════════════════════════════════════════════════════════════════════════

/// A suspended parse context, resumed once the current sub-expression ends.
enum Frame {
    /// Alternation: the branches before the last `|` are done, the next one
    /// is being parsed.
    Alt { branches: Vec<Node<char>> },
    /// Group `(...)`: the concatenation that was in progress outside it.
    Group { outer: Vec<Node<char>>, open: usize },
}

/// Result of an escape sequence.
enum Escape {
    Symbol(char),
    Class(IntervalSet<char>),
}

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Parses `pattern` into a syntax tree.
///
/// The empty pattern parses to [`Node::Nop`].
///
/// # Errors
///
/// Returns [`PatternSyntaxError`] for unterminated groups and classes,
/// unmatched `)`, invalid quantifier bounds, quantifiers with nothing to
/// repeat, dangling or unknown escapes, counts above [`MAX_REPEAT`] and
/// nesting beyond [`NEST_LIMIT`].
pub fn parse(pattern: &str) -> Result<Node<char>, PatternSyntaxError> {
    Parser { pattern, pos: 0, depth: 0 }.run()
}

/// Checks `pattern` without keeping the tree.
pub fn validate(pattern: &str) -> Result<(), PatternSyntaxError> {
    parse(pattern).map(|_| ())
}

struct Parser<'p> {
    pattern: &'p str,
    pos: usize,
    /// Number of open groups.
    depth: usize,
}

impl<'p> Parser<'p> {
    fn run(&mut self) -> Result<Node<char>, PatternSyntaxError> {
        let mut stack: Vec<Frame> = Vec::with_capacity(8);
        let mut current: Vec<Node<char>> = Vec::with_capacity(4);

        'drive: loop {
            let Some(c) = self.peek() else {
                /* End of input: close the running concatenation and unwind */
                let mut result = Node::concat(current.drain(..));
                loop {
                    match stack.pop() {
                        None => return Ok(result),
                        Some(Frame::Alt { mut branches }) => {
                            branches.push(result);
                            result = Node::alternate(branches);
                        },
                        Some(Frame::Group { open, .. }) => {
                            return Err(PatternSyntaxError::new(open, "unterminated group '('"));
                        },
                    }
                }
            };

            match c {
                '|' => {
                    self.pos += 1;
                    let branch = Node::concat(std::mem::take(&mut current));
                    match stack.last_mut() {
                        Some(Frame::Alt { branches }) => branches.push(branch),
                        _ => stack.push(Frame::Alt { branches: vec![branch] }),
                    }
                },
                '(' => {
                    if self.depth == NEST_LIMIT {
                        return Err(PatternSyntaxError::new(
                            self.pos,
                            format!("nesting limit of {} exceeded", NEST_LIMIT),
                        ));
                    }
                    self.depth += 1;
                    stack.push(Frame::Group { outer: std::mem::take(&mut current), open: self.pos });
                    self.pos += 1;
                },
                ')' => {
                    let close = self.pos;
                    self.pos += 1;
                    let mut result = Node::concat(std::mem::take(&mut current));

                    /* Unwind the alternations opened inside this group */
                    loop {
                        match stack.pop() {
                            Some(Frame::Alt { mut branches }) => {
                                branches.push(result);
                                result = Node::alternate(branches);
                            },
                            Some(Frame::Group { outer, .. }) => {
                                self.depth -= 1;
                                let quantified = self.parse_quantifiers(result)?;
                                current = outer;
                                current.push(quantified);
                                continue 'drive;
                            },
                            None => {
                                return Err(PatternSyntaxError::new(close, "unmatched ')'"));
                            },
                        }
                    }
                },
                _ => {
                    let atom = self.parse_atom()?;
                    let quantified = self.parse_quantifiers(atom)?;
                    current.push(quantified);
                },
            }
        }
    }

    // ── Cursor ───────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    /// The character `n` bytes past the cursor; only used right after
    /// single-byte characters.
    fn peek_at(&self, n: usize) -> Option<char> {
        self.pattern.get(self.pos + n..)?.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    // ── Atoms ────────────────────────────────────────────────────────────

    fn parse_atom(&mut self) -> Result<Node<char>, PatternSyntaxError> {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Err(PatternSyntaxError::new(start, "unexpected end of pattern"));
        };
        match c {
            '[' => self.parse_class(),
            '.' => {
                self.pos += 1;
                Ok(Node::Any)
            },
            '\\' => Ok(match self.parse_escape()? {
                Escape::Symbol(s) => Node::Literal(s),
                Escape::Class(set) => Node::class(false, set),
            }),
            '*' | '+' | '?' | '{' => Err(PatternSyntaxError::new(
                start,
                format!("quantifier '{}' without preceding atom", c),
            )),
            _ => {
                self.pos += c.len_utf8();
                Ok(Node::Literal(c))
            },
        }
    }

    fn parse_escape(&mut self) -> Result<Escape, PatternSyntaxError> {
        let start = self.pos;
        self.pos += 1; /* skip '\' */
        let Some(c) = self.bump() else {
            return Err(PatternSyntaxError::new(start, "dangling escape '\\' at end of pattern"));
        };
        if let Some(set) = shorthand_class(c) {
            return Ok(Escape::Class(set));
        }
        let symbol = match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'f' => '\u{0c}',
            'v' => '\u{0b}',
            '0' => '\0',
            'x' => self.parse_hex_escape(start)?,
            'u' => self.parse_unicode_escape(start)?,
            c if c.is_ascii_punctuation() || c == ' ' => c,
            _ => {
                return Err(PatternSyntaxError::new(start, format!("unknown escape '\\{}'", c)));
            },
        };
        Ok(Escape::Symbol(symbol))
    }

    /// `\xHH`, exactly two hex digits.
    fn parse_hex_escape(&mut self, start: usize) -> Result<char, PatternSyntaxError> {
        let mut value: u32 = 0;
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    value = value * 16 + digit;
                    self.pos += 1;
                },
                None => {
                    return Err(PatternSyntaxError::new(
                        start,
                        "invalid '\\x' escape: expected two hex digits",
                    ));
                },
            }
        }
        char::from_u32(value)
            .ok_or_else(|| PatternSyntaxError::new(start, "invalid '\\x' escape"))
    }

    /// `\u{H..}`, one to six hex digits naming a Unicode scalar value.
    fn parse_unicode_escape(&mut self, start: usize) -> Result<char, PatternSyntaxError> {
        if !self.eat('{') {
            return Err(PatternSyntaxError::new(start, "invalid '\\u' escape: expected '{'"));
        }
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.pos += 1;
        }
        let digits = &self.pattern[digits_start..self.pos];
        if digits.is_empty() || digits.len() > 6 || !self.eat('}') {
            return Err(PatternSyntaxError::new(
                start,
                "invalid '\\u' escape: expected 1 to 6 hex digits and '}'",
            ));
        }
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                PatternSyntaxError::new(start, format!("'\\u{{{}}}' is not a valid code point", digits))
            })
    }

    // ── Character classes ────────────────────────────────────────────────

    fn parse_class(&mut self) -> Result<Node<char>, PatternSyntaxError> {
        let open = self.pos;
        self.pos += 1; /* skip '[' */
        let negate = self.eat('^');

        let mut items: Vec<Interval<char>> = Vec::with_capacity(8);
        let mut first = true;

        loop {
            let Some(c) = self.peek() else {
                return Err(PatternSyntaxError::new(open, "unterminated character class '['"));
            };
            /* ']' right after '[' or '[^' is a literal */
            if c == ']' && !first {
                self.pos += 1;
                break;
            }
            first = false;

            let item_start = self.pos;
            let lo = match self.parse_class_item()? {
                Escape::Class(set) => {
                    items.extend(set.iter().copied());
                    continue;
                },
                Escape::Symbol(lo) => lo,
            };

            /* Range `lo-hi`; a '-' before ']' is a literal */
            if self.peek() == Some('-') && !matches!(self.peek_at(1), Some(']') | None) {
                self.pos += 1;
                let hi = match self.parse_class_item()? {
                    Escape::Symbol(hi) => hi,
                    Escape::Class(_) => {
                        return Err(PatternSyntaxError::new(
                            item_start,
                            "invalid range endpoint in character class",
                        ));
                    },
                };
                if lo > hi {
                    return Err(PatternSyntaxError::new(
                        item_start,
                        format!("reversed range '{}-{}' in character class", lo, hi),
                    ));
                }
                items.push(Interval::new(lo, hi));
            } else {
                items.push(Interval::single(lo));
            }
        }

        Ok(Node::class(negate, items.into_iter().collect()))
    }

    fn parse_class_item(&mut self) -> Result<Escape, PatternSyntaxError> {
        let start = self.pos;
        match self.peek() {
            Some('[') if self.peek_at(1) == Some(':') => {
                let body = &self.pattern[start + 2..];
                let Some(end) = body.find(":]") else {
                    return Err(PatternSyntaxError::new(start, "unterminated POSIX class '[:'"));
                };
                let name = &body[..end];
                let set = posix_class(name).ok_or_else(|| {
                    PatternSyntaxError::new(start, format!("unknown POSIX class '[:{}:]'", name))
                })?;
                self.pos = start + 2 + end + 2;
                Ok(Escape::Class(set))
            },
            Some('\\') => self.parse_escape(),
            Some(c) => {
                self.pos += c.len_utf8();
                Ok(Escape::Symbol(c))
            },
            None => Err(PatternSyntaxError::new(start, "unterminated character class '['")),
        }
    }

    // ── Quantifiers ──────────────────────────────────────────────────────

    fn parse_quantifiers(&mut self, mut node: Node<char>) -> Result<Node<char>, PatternSyntaxError> {
        let mut levels = self.depth;
        loop {
            if levels == NEST_LIMIT && matches!(self.peek(), Some('*' | '+' | '?' | '{')) {
                return Err(PatternSyntaxError::new(
                    self.pos,
                    format!("nesting limit of {} exceeded", NEST_LIMIT),
                ));
            }
            levels += 1;
            node = match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    Node::rep0(node)
                },
                Some('+') => {
                    self.pos += 1;
                    Node::rep1(node)
                },
                Some('?') => {
                    self.pos += 1;
                    Node::optional(node)
                },
                Some('{') => {
                    let (min, max) = self.parse_bounds()?;
                    Node::repeat(min, max, node)
                },
                _ => return Ok(node),
            };
        }
    }

    /// `{n}`, `{n,}` or `{n,m}`.
    fn parse_bounds(&mut self) -> Result<(u32, Option<u32>), PatternSyntaxError> {
        let open = self.pos;
        self.pos += 1; /* skip '{' */

        let min = self.parse_count(open, "expected digit after '{'")?;
        match self.bump() {
            Some('}') => return Ok((min, Some(min))),
            Some(',') => {},
            Some(_) => {
                return Err(PatternSyntaxError::new(
                    open,
                    "invalid quantifier bounds: expected ',' or '}'",
                ));
            },
            None => return Err(PatternSyntaxError::new(open, "unterminated quantifier '{'")),
        }

        if self.eat('}') {
            return Ok((min, None));
        }
        let max = self.parse_count(open, "expected digit or '}' after ','")?;
        if !self.eat('}') {
            return Err(PatternSyntaxError::new(open, "unterminated quantifier '{'"));
        }
        if max < min {
            return Err(PatternSyntaxError::new(
                open,
                format!("invalid quantifier bounds: max ({}) < min ({})", max, min),
            ));
        }
        Ok((min, Some(max)))
    }

    fn parse_count(&mut self, open: usize, expected: &str) -> Result<u32, PatternSyntaxError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            let message = if self.peek().is_none() {
                "unterminated quantifier '{'".to_string()
            } else {
                format!("invalid quantifier bounds: {}", expected)
            };
            return Err(PatternSyntaxError::new(open, message));
        }
        match self.pattern[start..self.pos].parse::<u32>() {
            Ok(count) if count <= MAX_REPEAT => Ok(count),
            _ => Err(PatternSyntaxError::new(
                start,
                format!("invalid quantifier bounds: count too large (max {})", MAX_REPEAT),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(c: char) -> Node<char> {
        Node::Literal(c)
    }

    fn class(pairs: &[(char, char)]) -> IntervalSet<char> {
        pairs.iter().map(|&(a, b)| Interval::new(a, b)).collect()
    }

    fn err(pattern: &str) -> PatternSyntaxError {
        parse(pattern).expect_err("pattern should be rejected")
    }

    /* ── Structure ─────────────────────────────────────────────────────── */

    #[test]
    fn test_empty_pattern_is_nop() {
        assert_eq!(parse("").unwrap(), Node::Nop);
        assert_eq!(parse("()").unwrap(), Node::Nop);
    }

    #[test]
    fn test_sequence_and_alternation() {
        assert_eq!(parse("ab").unwrap(), Node::seq(lit('a'), lit('b')));
        assert_eq!(
            parse("ab|c").unwrap(),
            Node::alt(Node::seq(lit('a'), lit('b')), lit('c'))
        );
        assert_eq!(
            parse("a|b|c").unwrap(),
            Node::alt(lit('a'), Node::alt(lit('b'), lit('c')))
        );
        assert_eq!(parse("a|").unwrap(), Node::alt(lit('a'), Node::Nop));
    }

    #[test]
    fn test_group_with_quantifier() {
        assert_eq!(
            parse("(ab)+c").unwrap(),
            Node::seq(Node::rep1(Node::seq(lit('a'), lit('b'))), lit('c'))
        );
        assert_eq!(
            parse("x(a|b)*").unwrap(),
            Node::seq(lit('x'), Node::rep0(Node::alt(lit('a'), lit('b'))))
        );
    }

    #[test]
    fn test_quantifiers() {
        assert_eq!(parse("a?").unwrap(), Node::optional(lit('a')));
        assert_eq!(parse("a{3}").unwrap(), Node::repeat(3, Some(3), lit('a')));
        assert_eq!(parse("a{2,}").unwrap(), Node::repeat(2, None, lit('a')));
        assert_eq!(parse("a{2,4}").unwrap(), Node::repeat(2, Some(4), lit('a')));
        assert_eq!(parse("a+?").unwrap(), Node::optional(Node::rep1(lit('a'))));
    }

    #[test]
    fn test_any_and_escapes() {
        assert_eq!(parse(".").unwrap(), Node::Any);
        assert_eq!(parse(r"\.").unwrap(), lit('.'));
        assert_eq!(parse(r"\n").unwrap(), lit('\n'));
        assert_eq!(parse(r"\x41").unwrap(), lit('A'));
        assert_eq!(parse(r"\u{3bb}").unwrap(), lit('λ'));
        assert_eq!(parse(r"\d").unwrap(), Node::class(false, class(&[('0', '9')])));
    }

    #[test]
    fn test_non_ascii_literal() {
        assert_eq!(parse("λx").unwrap(), Node::seq(lit('λ'), lit('x')));
    }

    /* ── Character classes ─────────────────────────────────────────────── */

    #[test]
    fn test_class_ranges() {
        assert_eq!(
            parse("[a-zA-Z_]").unwrap(),
            Node::class(false, class(&[('A', 'Z'), ('_', '_'), ('a', 'z')]))
        );
        assert_eq!(parse("[^\"]").unwrap(), Node::class(true, class(&[('"', '"')])));
    }

    #[test]
    fn test_class_literal_bracket_and_dash() {
        assert_eq!(parse("[]a]").unwrap(), Node::class(false, class(&[(']', ']'), ('a', 'a')])));
        assert_eq!(parse("[a-]").unwrap(), Node::class(false, class(&[('-', '-'), ('a', 'a')])));
        assert_eq!(parse("[-a]").unwrap(), Node::class(false, class(&[('-', '-'), ('a', 'a')])));
        assert_eq!(parse(r"[\]\\]").unwrap(), Node::class(false, class(&[('\\', ']')])));
    }

    #[test]
    fn test_class_posix_and_shorthand() {
        assert_eq!(
            parse("[[:digit:]_]").unwrap(),
            Node::class(false, class(&[('0', '9'), ('_', '_')]))
        );
        assert_eq!(
            parse(r"[\d\s]").unwrap(),
            Node::class(false, class(&[('\t', '\r'), (' ', ' '), ('0', '9')]))
        );
    }

    /* ── Errors ────────────────────────────────────────────────────────── */

    #[test]
    fn test_unterminated_group() {
        let e = err("ab(cd");
        assert_eq!(e.offset, 2);
        assert!(e.message.contains("unterminated group"));
    }

    #[test]
    fn test_unmatched_close() {
        let e = err("ab)");
        assert_eq!(e.offset, 2);
        assert!(e.message.contains("unmatched"));
    }

    #[test]
    fn test_unterminated_class() {
        let e = err("x[a-z");
        assert_eq!(e.offset, 1);
        assert!(e.message.contains("unterminated character class"));
        assert!(err("[]").message.contains("unterminated character class"));
    }

    #[test]
    fn test_reversed_class_range() {
        let e = err("[z-a]");
        assert_eq!(e.offset, 1);
        assert!(e.message.contains("reversed range"));
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(err("a{4,2}").message.contains("max (2) < min (4)"));
        assert!(err("a{x}").message.contains("invalid quantifier bounds"));
        assert!(err("a{2").message.contains("unterminated quantifier"));
        assert!(err("a{2,3").message.contains("unterminated quantifier"));
        assert!(err("a{99999999999}").message.contains("too large"));
        assert_eq!(err("ab{,3}").offset, 2);
    }

    #[test]
    fn test_repeat_count_cap() {
        assert_eq!(parse("a{1000}").unwrap(), Node::repeat(1000, Some(1000), lit('a')));
        assert_eq!(parse("a{0,1000}").unwrap(), Node::repeat(0, Some(1000), lit('a')));

        let e = err("a{30000}");
        assert_eq!(e.offset, 2);
        assert!(e.message.contains("count too large (max 1000)"));
        assert_eq!(err("a{2,1001}").offset, 4);
        assert!(err("a{4000000000}").message.contains("too large"));
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}a{}", "(".repeat(NEST_LIMIT), ")".repeat(NEST_LIMIT));
        assert_eq!(parse(&ok).unwrap(), lit('a'));

        let deep = format!("{}a{}", "(".repeat(NEST_LIMIT + 1), ")".repeat(NEST_LIMIT + 1));
        let e = err(&deep);
        assert_eq!(e.offset, NEST_LIMIT);
        assert!(e.message.contains("nesting limit"));

        assert!(parse(&format!("a{}", "?".repeat(NEST_LIMIT))).is_ok());
        let stacked = err(&format!("a{}", "?".repeat(NEST_LIMIT + 1)));
        assert_eq!(stacked.offset, 1 + NEST_LIMIT);
    }

    #[test]
    fn test_long_alternation_is_balanced() {
        assert_eq!(
            parse("a|b|c|d").unwrap(),
            Node::alt(Node::alt(lit('a'), lit('b')), Node::alt(lit('c'), lit('d')))
        );
        assert_eq!(
            parse("(a|b)|c").unwrap(),
            Node::alt(Node::alt(lit('a'), lit('b')), lit('c'))
        );

        let words: Vec<String> = (0..20_000).map(|i| format!("w{}", i)).collect();
        let node = parse(&words.join("|")).unwrap();
        let Node::Alternation(left, _) = &node else {
            panic!("expected an alternation, got {}", node.kind_name());
        };
        assert!(matches!(**left, Node::Alternation(..)));
    }

    #[test]
    fn test_dangling_and_unknown_escape() {
        let e = err("ab\\");
        assert_eq!(e.offset, 2);
        assert!(e.message.contains("dangling escape"));
        assert!(err(r"\q").message.contains("unknown escape"));
        assert!(err(r"\x4").message.contains("hex digits"));
        assert!(err(r"\u{d800}").message.contains("not a valid code point"));
    }

    #[test]
    fn test_nothing_to_repeat() {
        assert!(err("*a").message.contains("without preceding atom"));
        assert!(err("a|+").message.contains("without preceding atom"));
        assert!(err("({2})").message.contains("without preceding atom"));
    }

    #[test]
    fn test_unknown_posix_class() {
        let e = err("[[:letters:]]");
        assert_eq!(e.offset, 1);
        assert!(e.message.contains("unknown POSIX class"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(err("(").to_string(), "regex error at byte 0: unterminated group '('");
    }
}
