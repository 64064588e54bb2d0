//! Regular-expression syntax tree and the desugaring pass.
//!
//! The parser produces the full node set, including the convenience
//! quantifiers `Rep1` (`e+`) and `RepBetween` (`e{n,m}`). Thompson
//! construction only understands the reduced set
//! `{Literal, Any, Range, Alternation, Sequence, Optional, Rep0, Nop}`;
//! [`Node::desugar`] rewrites a tree into that set.

use std::fmt;

use crate::interval::{IntervalSet, Symbol};

/// A regular-expression syntax node over symbols of type `S`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node<S> {
    /// A single symbol.
    Literal(S),
    /// Any symbol of the alphabet.
    Any,
    /// A symbol class. With `negate`, every symbol *not* in `set`.
    Range { negate: bool, set: IntervalSet<S> },
    /// `a|b`
    Alternation(Box<Node<S>>, Box<Node<S>>),
    /// `ab`
    Sequence(Box<Node<S>>, Box<Node<S>>),
    /// `e?`
    Optional(Box<Node<S>>),
    /// `e*`
    Rep0(Box<Node<S>>),
    /// `e+`
    Rep1(Box<Node<S>>),
    /// `e{min,max}`; `max == None` means unbounded.
    RepBetween { min: u32, max: Option<u32>, element: Box<Node<S>> },
    /// The empty string.
    Nop,
}

impl<S: Symbol> Node<S> {
    pub fn seq(a: Node<S>, b: Node<S>) -> Node<S> {
        Node::Sequence(Box::new(a), Box::new(b))
    }

    pub fn alt(a: Node<S>, b: Node<S>) -> Node<S> {
        Node::Alternation(Box::new(a), Box::new(b))
    }

    pub fn optional(e: Node<S>) -> Node<S> {
        Node::Optional(Box::new(e))
    }

    pub fn rep0(e: Node<S>) -> Node<S> {
        Node::Rep0(Box::new(e))
    }

    pub fn rep1(e: Node<S>) -> Node<S> {
        Node::Rep1(Box::new(e))
    }

    pub fn repeat(min: u32, max: Option<u32>, e: Node<S>) -> Node<S> {
        Node::RepBetween { min, max, element: Box::new(e) }
    }

    pub fn class(negate: bool, set: IntervalSet<S>) -> Node<S> {
        Node::Range { negate, set }
    }

    /// Concatenates `nodes` in order; `Nop` for an empty list.
    ///
    /// The result is a balanced tree, so its depth grows with the log of
    /// the number of nodes.
    pub fn concat<I>(nodes: I) -> Node<S>
    where
        I: IntoIterator<Item = Node<S>>,
    {
        balanced(nodes.into_iter().collect(), Node::seq, Lean::Left).unwrap_or(Node::Nop)
    }

    /// Alternation of `branches` in order; `Nop` for an empty list.
    ///
    /// Balanced like [`Node::concat`].
    pub fn alternate<I>(branches: I) -> Node<S>
    where
        I: IntoIterator<Item = Node<S>>,
    {
        balanced(branches.into_iter().collect(), Node::alt, Lean::Right).unwrap_or(Node::Nop)
    }

    /// Short name of the node variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Literal(_) => "Literal",
            Node::Any => "Any",
            Node::Range { .. } => "Range",
            Node::Alternation(..) => "Alternation",
            Node::Sequence(..) => "Sequence",
            Node::Optional(_) => "Optional",
            Node::Rep0(_) => "Rep0",
            Node::Rep1(_) => "Rep1",
            Node::RepBetween { .. } => "RepBetween",
            Node::Nop => "Nop",
        }
    }

    /// Whether the tree only uses the constructs Thompson construction
    /// accepts.
    pub fn is_desugared(&self) -> bool {
        match self {
            Node::Literal(_) | Node::Any | Node::Range { .. } | Node::Nop => true,
            Node::Alternation(a, b) | Node::Sequence(a, b) => a.is_desugared() && b.is_desugared(),
            Node::Optional(e) | Node::Rep0(e) => e.is_desugared(),
            Node::Rep1(_) | Node::RepBetween { .. } => false,
        }
    }

    /// Whether the node matches the empty string.
    pub fn is_nullable(&self) -> bool {
        match self {
            Node::Literal(_) | Node::Any | Node::Range { .. } => false,
            Node::Nop | Node::Optional(_) | Node::Rep0(_) => true,
            Node::Alternation(a, b) => a.is_nullable() || b.is_nullable(),
            Node::Sequence(a, b) => a.is_nullable() && b.is_nullable(),
            Node::Rep1(e) => e.is_nullable(),
            Node::RepBetween { min, element, .. } => *min == 0 || element.is_nullable(),
        }
    }

    /// Returns an equivalent tree that only uses
    /// `{Literal, Any, Range, Alternation, Sequence, Optional, Rep0, Nop}`.
    ///
    /// Total and pure; `x.desugar().desugar() == x.desugar()`.
    pub fn desugar(&self) -> Node<S> {
        match self {
            Node::Literal(_) | Node::Any | Node::Range { .. } | Node::Nop => self.clone(),
            Node::Alternation(a, b) => Node::alt(a.desugar(), b.desugar()),
            Node::Sequence(a, b) => Node::seq(a.desugar(), b.desugar()),
            Node::Optional(e) => Node::optional(e.desugar()),
            Node::Rep0(e) => Node::rep0(e.desugar()),
            Node::Rep1(e) => {
                let e = e.desugar();
                Node::seq(e.clone(), Node::rep0(e))
            },
            Node::RepBetween { min, max, element } => {
                desugar_between(*min, *max, &element.desugar())
            },
        }
    }
}

impl Node<char> {
    /// A node matching exactly `text`.
    pub fn literal_str(text: &str) -> Node<char> {
        Node::concat(text.chars().map(Node::Literal))
    }
}

/// Which half gets the extra node when a list of odd length is split.
#[derive(Clone, Copy)]
enum Lean {
    Left,
    Right,
}

fn balanced<S>(
    mut nodes: Vec<Node<S>>,
    join: fn(Node<S>, Node<S>) -> Node<S>,
    lean: Lean,
) -> Option<Node<S>> {
    let mid = match (nodes.len(), lean) {
        (0, _) => return None,
        (1, _) => return nodes.pop(),
        (n, Lean::Left) => (n + 1) / 2,
        (n, Lean::Right) => n / 2,
    };
    let right = nodes.split_off(mid);
    Some(join(balanced(nodes, join, lean)?, balanced(right, join, lean)?))
}

/// `e{min,max}` → `min` mandatory copies, then either `e*` (unbounded) or
/// `max - min` nested optional copies.
///
/// A `max` below `min` is read as `max == min`. The parser caps both
/// bounds at [`crate::regex::MAX_REPEAT`]; trees built by hand with larger
/// counts desugar to correspondingly large trees.
fn desugar_between<S: Symbol>(min: u32, max: Option<u32>, element: &Node<S>) -> Node<S> {
    let suffix = match max {
        None => Some(Node::rep0(element.clone())),
        Some(max) => optional_chain(max.saturating_sub(min), element),
    };
    let mandatory = (min > 0).then(|| Node::concat((0..min).map(|_| element.clone())));

    match (mandatory, suffix) {
        (None, None) => Node::Nop,
        (Some(m), None) => m,
        (None, Some(s)) => s,
        (Some(m), Some(s)) => Node::seq(m, s),
    }
}

/// `(e(e(e)?)?)?` with `count` copies of `e`; `None` for zero copies.
fn optional_chain<S: Symbol>(count: u32, element: &Node<S>) -> Option<Node<S>> {
    if count == 0 {
        return None;
    }
    let mut node = Node::optional(element.clone());
    for _ in 1..count {
        node = Node::optional(Node::seq(element.clone(), node));
    }
    Some(node)
}

// ══════════════════════════════════════════════════════════════════════════════
// Rendering
// ══════════════════════════════════════════════════════════════════════════════

/// Binding strength of the surrounding context.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Alternation,
    Sequence,
    Postfix,
}

/// Renders the tree back into pattern syntax accepted by
/// [`crate::regex::parse`].
impl fmt::Display for Node<char> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(self, f, Prec::Alternation)
    }
}

fn write_node(node: &Node<char>, f: &mut fmt::Formatter<'_>, prec: Prec) -> fmt::Result {
    match node {
        Node::Literal(c) => write_literal(*c, f, false),
        Node::Any => f.write_str("."),
        Node::Nop => f.write_str("()"),
        Node::Range { negate, set } => {
            f.write_str(if *negate { "[^" } else { "[" })?;
            for iv in set {
                write_literal(iv.lo(), f, true)?;
                if iv.hi() != iv.lo() {
                    f.write_str("-")?;
                    write_literal(iv.hi(), f, true)?;
                }
            }
            f.write_str("]")
        },
        Node::Alternation(a, b) => {
            let wrap = prec > Prec::Alternation;
            if wrap {
                f.write_str("(")?;
            }
            write_node(a, f, Prec::Alternation)?;
            f.write_str("|")?;
            write_node(b, f, Prec::Alternation)?;
            if wrap {
                f.write_str(")")?;
            }
            Ok(())
        },
        Node::Sequence(a, b) => {
            let wrap = prec > Prec::Sequence;
            if wrap {
                f.write_str("(")?;
            }
            write_node(a, f, Prec::Sequence)?;
            write_node(b, f, Prec::Sequence)?;
            if wrap {
                f.write_str(")")?;
            }
            Ok(())
        },
        Node::Optional(e) => {
            write_node(e, f, Prec::Postfix)?;
            f.write_str("?")
        },
        Node::Rep0(e) => {
            write_node(e, f, Prec::Postfix)?;
            f.write_str("*")
        },
        Node::Rep1(e) => {
            write_node(e, f, Prec::Postfix)?;
            f.write_str("+")
        },
        Node::RepBetween { min, max, element } => {
            write_node(element, f, Prec::Postfix)?;
            match max {
                Some(max) if max == min => write!(f, "{{{}}}", min),
                Some(max) => write!(f, "{{{},{}}}", min, max),
                None => write!(f, "{{{},}}", min),
            }
        },
    }
}

fn write_literal(c: char, f: &mut fmt::Formatter<'_>, in_class: bool) -> fmt::Result {
    let special = if in_class {
        matches!(c, '\\' | ']' | '[' | '^' | '-')
    } else {
        matches!(c, '\\' | '.' | '[' | ']' | '(' | ')' | '|' | '*' | '+' | '?' | '{' | '}')
    };
    match c {
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        _ if special => write!(f, "\\{}", c),
        _ if c.is_control() => write!(f, "\\u{{{:x}}}", c as u32),
        _ => write!(f, "{}", c),
    }
}
