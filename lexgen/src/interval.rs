//! Symbol intervals and normalized interval sets.
//!
//! Automaton transitions are labeled with closed intervals of symbols instead
//! of single symbols, so that dense alphabets (e.g. all of `char`) stay
//! compact: `[a-zA-Z_]` is three transitions, not fifty-three.
//!
//! An "unbounded" end of an interval is expressed with [`Symbol::MIN`] or
//! [`Symbol::MAX`].

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// An ordered alphabet symbol.
///
/// The alphabet must be a finite, totally ordered set where every element
/// except the extremes has a successor and a predecessor.
pub trait Symbol: Copy + Ord + Hash + fmt::Debug {
    /// Smallest symbol of the alphabet.
    const MIN: Self;
    /// Largest symbol of the alphabet.
    const MAX: Self;

    /// The next symbol, or `None` for [`Symbol::MAX`].
    fn successor(self) -> Option<Self>;

    /// The previous symbol, or `None` for [`Symbol::MIN`].
    fn predecessor(self) -> Option<Self>;
}

impl Symbol for u8 {
    const MIN: u8 = u8::MIN;
    const MAX: u8 = u8::MAX;

    #[inline]
    fn successor(self) -> Option<u8> {
        self.checked_add(1)
    }

    #[inline]
    fn predecessor(self) -> Option<u8> {
        self.checked_sub(1)
    }
}

/// `char` skips the surrogate block `U+D800..=U+DFFF`, which holds no
/// scalar values.
impl Symbol for char {
    const MIN: char = '\0';
    const MAX: char = char::MAX;

    #[inline]
    fn successor(self) -> Option<char> {
        match self {
            '\u{D7FF}' => Some('\u{E000}'),
            char::MAX => None,
            c => char::from_u32(c as u32 + 1),
        }
    }

    #[inline]
    fn predecessor(self) -> Option<char> {
        match self {
            '\0' => None,
            '\u{E000}' => Some('\u{D7FF}'),
            c => char::from_u32(c as u32 - 1),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Interval
// ══════════════════════════════════════════════════════════════════════════════

/// A closed interval `[lo, hi]` of symbols. Always `lo <= hi`, deserialized
/// values included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "raw::Interval<S>", bound(deserialize = "S: Symbol + Deserialize<'de>"))]
pub struct Interval<S> {
    lo: S,
    hi: S,
}

impl<S: Symbol> Interval<S> {
    /// Creates the interval spanning `a` and `b`, in whichever order they
    /// are given.
    pub fn new(a: S, b: S) -> Self {
        if a <= b {
            Interval { lo: a, hi: b }
        } else {
            Interval { lo: b, hi: a }
        }
    }

    /// The interval holding exactly one symbol.
    pub fn single(s: S) -> Self {
        Interval { lo: s, hi: s }
    }

    /// The interval holding the whole alphabet.
    pub fn full() -> Self {
        Interval { lo: S::MIN, hi: S::MAX }
    }

    #[inline]
    pub fn lo(&self) -> S {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> S {
        self.hi
    }

    #[inline]
    pub fn contains(&self, s: S) -> bool {
        self.lo <= s && s <= self.hi
    }

    /// Whether the two intervals share at least one symbol.
    pub fn overlaps(&self, other: &Interval<S>) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }

    /// Whether `other` starts right after `self` ends.
    pub fn precedes(&self, other: &Interval<S>) -> bool {
        self.hi.successor() == Some(other.lo)
    }

    pub fn intersection(&self, other: &Interval<S>) -> Option<Interval<S>> {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        (lo <= hi).then_some(Interval { lo, hi })
    }

    /// Whether `other` is entirely inside `self`.
    pub fn covers(&self, other: &Interval<S>) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }
}

impl<S: Symbol> fmt::Display for Interval<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "{:?}", self.lo)
        } else {
            write!(f, "{:?}-{:?}", self.lo, self.hi)
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// IntervalSet
// ══════════════════════════════════════════════════════════════════════════════

/// A set of symbols stored as sorted, non-overlapping, non-adjacent intervals.
///
/// Deserialization normalizes whatever interval list it reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "raw::IntervalSet<S>", bound(deserialize = "S: Symbol + Deserialize<'de>"))]
pub struct IntervalSet<S> {
    intervals: Vec<Interval<S>>,
}

impl<S> Default for IntervalSet<S> {
    fn default() -> Self {
        IntervalSet { intervals: Vec::new() }
    }
}

impl<S: Symbol> IntervalSet<S> {
    /// The empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole alphabet.
    pub fn full() -> Self {
        IntervalSet { intervals: vec![Interval::full()] }
    }

    pub fn single(s: S) -> Self {
        IntervalSet { intervals: vec![Interval::single(s)] }
    }

    /// Builds a normalized set from arbitrary (possibly overlapping,
    /// unsorted) intervals.
    pub fn from_intervals<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = Interval<S>>,
    {
        let mut set = IntervalSet { intervals: intervals.into_iter().collect() };
        set.normalize();
        set
    }

    pub fn insert(&mut self, interval: Interval<S>) {
        self.intervals.push(interval);
        self.normalize();
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of maximal intervals (not symbols).
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval<S>> {
        self.intervals.iter()
    }

    pub fn as_slice(&self) -> &[Interval<S>] {
        &self.intervals
    }

    pub fn contains(&self, s: S) -> bool {
        let idx = self.intervals.partition_point(|iv| iv.hi < s);
        self.intervals.get(idx).is_some_and(|iv| iv.contains(s))
    }

    pub fn union(&self, other: &IntervalSet<S>) -> IntervalSet<S> {
        IntervalSet::from_intervals(self.intervals.iter().chain(other.intervals.iter()).copied())
    }

    pub fn intersection(&self, other: &IntervalSet<S>) -> IntervalSet<S> {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let a = &self.intervals[i];
            let b = &other.intervals[j];
            if let Some(common) = a.intersection(b) {
                out.push(common);
            }
            if a.hi < b.hi {
                i += 1;
            } else {
                j += 1;
            }
        }
        // Pieces of normalized sets are already sorted and separated.
        IntervalSet { intervals: out }
    }

    /// Symbols of `self` that are not in `other`.
    pub fn difference(&self, other: &IntervalSet<S>) -> IntervalSet<S> {
        self.intersection(&other.complement())
    }

    /// Every symbol of the alphabet not in `self`.
    pub fn complement(&self) -> IntervalSet<S> {
        let mut out = Vec::with_capacity(self.intervals.len() + 1);
        let mut next = Some(S::MIN);
        for iv in &self.intervals {
            if let (Some(from), Some(to)) = (next, iv.lo.predecessor()) {
                if from <= to {
                    out.push(Interval { lo: from, hi: to });
                }
            }
            next = iv.hi.successor();
        }
        if let Some(from) = next {
            out.push(Interval { lo: from, hi: S::MAX });
        }
        IntervalSet { intervals: out }
    }

    /// Whether every symbol of `other` is in `self`.
    pub fn covers(&self, other: &IntervalSet<S>) -> bool {
        other.difference(self).is_empty()
    }

    fn normalize(&mut self) {
        if self.intervals.len() < 2 {
            return;
        }
        self.intervals.sort_unstable();
        let mut merged: Vec<Interval<S>> = Vec::with_capacity(self.intervals.len());
        for iv in self.intervals.drain(..) {
            if let Some(last) = merged.last_mut() {
                if iv.lo <= last.hi || last.precedes(&iv) {
                    last.hi = last.hi.max(iv.hi);
                    continue;
                }
            }
            merged.push(iv);
        }
        self.intervals = merged;
    }
}

/// Unchecked wire forms, validated on the way in.
mod raw {
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub struct Interval<S> {
        pub lo: S,
        pub hi: S,
    }

    #[derive(Deserialize)]
    #[serde(bound(deserialize = "S: super::Symbol + Deserialize<'de>"))]
    pub struct IntervalSet<S> {
        pub intervals: Vec<super::Interval<S>>,
    }
}

impl<S: Symbol> TryFrom<raw::Interval<S>> for Interval<S> {
    type Error = String;

    fn try_from(raw: raw::Interval<S>) -> Result<Self, Self::Error> {
        if raw.lo <= raw.hi {
            Ok(Interval { lo: raw.lo, hi: raw.hi })
        } else {
            Err(format!("reversed interval: {:?} > {:?}", raw.lo, raw.hi))
        }
    }
}

impl<S: Symbol> From<raw::IntervalSet<S>> for IntervalSet<S> {
    fn from(raw: raw::IntervalSet<S>) -> Self {
        IntervalSet::from_intervals(raw.intervals)
    }
}

impl<S: Symbol> FromIterator<Interval<S>> for IntervalSet<S> {
    fn from_iter<I: IntoIterator<Item = Interval<S>>>(iter: I) -> Self {
        IntervalSet::from_intervals(iter)
    }
}

impl<'a, S> IntoIterator for &'a IntervalSet<S> {
    type Item = &'a Interval<S>;
    type IntoIter = std::slice::Iter<'a, Interval<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl<S: Symbol> fmt::Display for IntervalSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", iv)?;
        }
        f.write_str("]")
    }
}

/// Splits a list of possibly overlapping intervals into the coarsest list of
/// pairwise-disjoint intervals such that every input interval is an exact
/// union of output intervals. Symbols covered by no input are left out.
///
/// The output is sorted.
pub fn split_disjoint<S: Symbol>(intervals: &[Interval<S>]) -> Vec<Interval<S>> {
    if intervals.is_empty() {
        return Vec::new();
    }

    // Every place where coverage may change starts a new piece.
    let mut cuts: Vec<S> = Vec::with_capacity(intervals.len() * 2);
    for iv in intervals {
        cuts.push(iv.lo);
        if let Some(after) = iv.hi.successor() {
            cuts.push(after);
        }
    }
    cuts.sort_unstable();
    cuts.dedup();

    let covered = IntervalSet::from_intervals(intervals.iter().copied());
    let mut pieces = Vec::with_capacity(cuts.len());
    for (i, &lo) in cuts.iter().enumerate() {
        let hi = match cuts.get(i + 1) {
            Some(next) => match next.predecessor() {
                Some(hi) => hi,
                None => continue,
            },
            None => S::MAX,
        };
        if covered.contains(lo) {
            pieces.push(Interval { lo, hi });
        }
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ranges: &[(u8, u8)]) -> IntervalSet<u8> {
        ranges.iter().map(|&(a, b)| Interval::new(a, b)).collect()
    }

    #[test]
    fn test_interval_orders_bounds() {
        let iv = Interval::new(b'z', b'a');
        assert_eq!(iv.lo(), b'a');
        assert_eq!(iv.hi(), b'z');
        assert!(iv.contains(b'm'));
        assert!(!iv.contains(b'A'));
    }

    #[test]
    fn test_normalize_merges_overlapping_and_adjacent() {
        let s = set(&[(10, 20), (0, 5), (6, 8), (15, 30)]);
        assert_eq!(s.as_slice(), &[Interval::new(0, 8), Interval::new(10, 30)]);
    }

    #[test]
    fn test_complement_u8() {
        let s = set(&[(0, 9), (20, 29), (250, 255)]);
        let c = s.complement();
        assert_eq!(c.as_slice(), &[Interval::new(10, 19), Interval::new(30, 249)]);
        assert_eq!(c.complement(), s);
        assert_eq!(IntervalSet::<u8>::new().complement(), IntervalSet::full());
        assert!(IntervalSet::<u8>::full().complement().is_empty());
    }

    #[test]
    fn test_char_successor_skips_surrogates() {
        assert_eq!('\u{D7FF}'.successor(), Some('\u{E000}'));
        assert_eq!('\u{E000}'.predecessor(), Some('\u{D7FF}'));
        assert_eq!(char::MAX.successor(), None);
        assert_eq!('\0'.predecessor(), None);

        // Intervals on either side of the gap are adjacent.
        let s: IntervalSet<char> =
            [Interval::new('a', '\u{D7FF}'), Interval::new('\u{E000}', 'z')].into_iter().collect();
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_contains() {
        let s = set(&[(b'0', b'9'), (b'a', b'f')]);
        assert!(s.contains(b'5'));
        assert!(s.contains(b'a'));
        assert!(s.contains(b'f'));
        assert!(!s.contains(b'g'));
        assert!(!s.contains(b'A'));
    }

    #[test]
    fn test_intersection_and_difference() {
        let a = set(&[(0, 10), (20, 30)]);
        let b = set(&[(5, 25)]);
        assert_eq!(a.intersection(&b), set(&[(5, 10), (20, 25)]));
        assert_eq!(a.difference(&b), set(&[(0, 4), (26, 30)]));
        assert!(a.covers(&set(&[(1, 2), (21, 22)])));
        assert!(!a.covers(&b));
    }

    #[test]
    fn test_split_disjoint() {
        let pieces = split_disjoint(&[Interval::new(b'a', b'm'), Interval::new(b'f', b'z')]);
        assert_eq!(
            pieces,
            vec![Interval::new(b'a', b'e'), Interval::new(b'f', b'm'), Interval::new(b'n', b'z')]
        );
    }

    #[test]
    fn test_deserialize_checks_and_normalizes() {
        let iv: Interval<u8> = serde_json::from_str(r#"{"lo":1,"hi":3}"#).unwrap();
        assert_eq!(iv, Interval::new(1, 3));
        let err = serde_json::from_str::<Interval<u8>>(r#"{"lo":9,"hi":3}"#).unwrap_err();
        assert!(err.to_string().contains("reversed interval"), "{}", err);

        let json = r#"{"intervals":[{"lo":20,"hi":30},{"lo":1,"hi":3},{"lo":25,"hi":40},{"lo":4,"hi":4}]}"#;
        let parsed: IntervalSet<u8> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, set(&[(1, 4), (20, 40)]));
    }

    #[test]
    fn test_split_disjoint_leaves_gaps_out() {
        let pieces = split_disjoint(&[
            Interval::new(0u8, 3),
            Interval::new(10, 12),
            Interval::single(11),
            Interval::new(250, 255),
        ]);
        assert_eq!(
            pieces,
            vec![
                Interval::new(0, 3),
                Interval::single(10),
                Interval::single(11),
                Interval::single(12),
                Interval::new(250, 255),
            ]
        );
    }
}
