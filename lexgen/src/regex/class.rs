//! Predefined symbol classes: POSIX bracket names and `\d \w \s` shorthands.
//!
//! All classes are ASCII-only; their negations (`\D`, `[^[:alpha:]]`, ...)
//! complement over the whole `char` alphabet.

use crate::interval::{Interval, IntervalSet};

fn ranges(pairs: &[(char, char)]) -> IntervalSet<char> {
    pairs.iter().map(|&(lo, hi)| Interval::new(lo, hi)).collect()
}

/// Looks up a POSIX class by the name written between `[:` and `:]`.
pub fn posix_class(name: &str) -> Option<IntervalSet<char>> {
    let set = match name {
        "alpha" => ranges(&[('A', 'Z'), ('a', 'z')]),
        "digit" => ranges(&[('0', '9')]),
        "alnum" => ranges(&[('0', '9'), ('A', 'Z'), ('a', 'z')]),
        "upper" => ranges(&[('A', 'Z')]),
        "lower" => ranges(&[('a', 'z')]),
        "space" => ranges(&[('\t', '\r'), (' ', ' ')]),
        "blank" => ranges(&[('\t', '\t'), (' ', ' ')]),
        "punct" => ranges(&[('!', '/'), (':', '@'), ('[', '`'), ('{', '~')]),
        "xdigit" => ranges(&[('0', '9'), ('A', 'F'), ('a', 'f')]),
        "cntrl" => ranges(&[('\0', '\u{1f}'), ('\u{7f}', '\u{7f}')]),
        "print" => ranges(&[(' ', '~')]),
        "graph" => ranges(&[('!', '~')]),
        "word" => ranges(&[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')]),
        _ => return None,
    };
    Some(set)
}

/// Set for a shorthand escape letter (`d`, `w`, `s` and their upper-case
/// negations).
pub fn shorthand_class(letter: char) -> Option<IntervalSet<char>> {
    let (name, negate) = match letter {
        'd' => ("digit", false),
        'D' => ("digit", true),
        'w' => ("word", false),
        'W' => ("word", true),
        's' => ("space", false),
        'S' => ("space", true),
        _ => return None,
    };
    let set = posix_class(name)?;
    Some(if negate { set.complement() } else { set })
}
