//! Maximal-munch scanning over a compiled [`LexerTable`].

use log::trace;

use super::{Accept, LexerTable, Token};
use crate::automata::{ReadOnlyDfa, StateId};

/// Lazy token stream over one input.
///
/// At each position the scanner runs the table as far as it can and emits
/// the longest accepted prefix. Ignored matches are skipped; a position
/// where nothing matches yields a one-character token of the Error kind.
/// The stream ends with exactly one token of the End kind.
#[derive(Debug, Clone)]
pub struct Scanner<'t, 'i, K> {
    table: &'t LexerTable<K>,
    input: &'i str,
    offset: usize,
    finished: bool,
}

impl<'t, 'i, K> Scanner<'t, 'i, K> {
    pub fn new(table: &'t LexerTable<K>, input: &'i str) -> Self {
        Scanner { table, input, offset: 0, finished: false }
    }

    /// Restarts scanning on `input`.
    pub fn reset(&mut self, input: &'i str) {
        self.input = input;
        self.offset = 0;
        self.finished = false;
    }

    /// Byte offset of the next unscanned character.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Longest match starting at `self.offset`: the end offset and the
    /// accept tag of the last accepting state passed.
    fn longest_match(&self) -> Option<(usize, &'t Accept<K>)> {
        let table = self.table;
        let rest = &self.input[self.offset..];
        let mut state: StateId = table.start();
        let mut best = None;

        for (i, c) in rest.char_indices() {
            match table.next(state, c) {
                Some(target) if Some(target) != table.trap() => state = target,
                _ => break,
            }
            if let Some(accept) = table.accept(state) {
                best = Some((self.offset + i + c.len_utf8(), accept));
            }
        }
        best
    }
}

impl<'t, 'i, K: Clone> Iterator for Scanner<'t, 'i, K> {
    type Item = Token<'i, K>;

    fn next(&mut self) -> Option<Token<'i, K>> {
        if self.finished {
            return None;
        }

        loop {
            let start = self.offset;
            if start >= self.input.len() {
                self.finished = true;
                return Some(Token {
                    kind: self.table.end_kind().clone(),
                    text: "",
                    offset: self.input.len(),
                    length: 0,
                });
            }

            match self.longest_match() {
                Some((end, Accept::Ignore { index })) => {
                    trace!("skip #{} at {}..{}", index, start, end);
                    self.offset = end;
                },
                Some((end, Accept::Token { kind, .. })) => {
                    self.offset = end;
                    return Some(Token {
                        kind: kind.clone(),
                        text: &self.input[start..end],
                        offset: start,
                        length: end - start,
                    });
                },
                None => {
                    let width = self.input[start..].chars().next().map_or(1, char::len_utf8);
                    let end = start + width;
                    trace!("no token matches at {}", start);
                    self.offset = end;
                    return Some(Token {
                        kind: self.table.error_kind().clone(),
                        text: &self.input[start..end],
                        offset: start,
                        length: width,
                    });
                },
            }
        }
    }
}

impl<'t, 'i, K: Clone> std::iter::FusedIterator for Scanner<'t, 'i, K> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::IntervalSet;
    use crate::lexer::{compile, compile_default, CompileOptions, TokenDescriptor};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Num,
        Plus,
        Ws,
        End,
        Error,
    }

    fn descriptors() -> Vec<TokenDescriptor<Kind>> {
        vec![
            TokenDescriptor::regex(0, Kind::Num, "[0-9]+"),
            TokenDescriptor::literal(1, Kind::Plus, "+"),
            TokenDescriptor::regex(2, Kind::Ws, "[ \t]+").ignored(),
            TokenDescriptor::end(3, Kind::End),
            TokenDescriptor::error(4, Kind::Error),
        ]
    }

    fn kinds(table: &LexerTable<Kind>, input: &str) -> Vec<(Kind, String)> {
        table.scan(input).map(|t| (t.kind, t.text.to_string())).collect()
    }

    #[test]
    fn test_scan_sums() {
        let (table, _) = compile_default(&descriptors()).unwrap();
        assert_eq!(
            kinds(&table, "12 + 3"),
            vec![
                (Kind::Num, "12".to_string()),
                (Kind::Plus, "+".to_string()),
                (Kind::Num, "3".to_string()),
                (Kind::End, String::new()),
            ]
        );
    }

    #[test]
    fn test_error_token_and_resume() {
        let (table, _) = compile_default(&descriptors()).unwrap();
        let tokens = table.tokenize("1?2");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].kind, Kind::Error);
        assert_eq!((tokens[1].offset, tokens[1].length), (1, 1));
        assert_eq!(tokens[2].text, "2");
    }

    #[test]
    fn test_end_emitted_once() {
        let (table, _) = compile_default(&descriptors()).unwrap();
        let mut scanner = table.scan("  ");
        let end = scanner.next().unwrap();
        assert_eq!(end.kind, Kind::End);
        assert_eq!(end.offset, 2);
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());

        scanner.reset("7");
        assert_eq!(scanner.offset(), 0);
        assert_eq!(scanner.next().map(|t| t.kind), Some(Kind::Num));
        assert_eq!(scanner.offset(), 1);
    }

    #[test]
    fn test_multibyte_error_is_one_char() {
        let (table, _) = compile_default(&descriptors()).unwrap();
        let tokens = table.tokenize("1é");
        assert_eq!(tokens[1].kind, Kind::Error);
        assert_eq!(tokens[1].text, "é");
        assert_eq!((tokens[1].offset, tokens[1].length), (1, 2));
        assert_eq!(tokens[2].offset, 3);
    }

    #[test]
    fn test_trap_stops_scanning() {
        let alphabet: IntervalSet<char> = IntervalSet::full();
        let options = CompileOptions::default().with_alphabet(alphabet);
        let (table, _) = compile(&descriptors(), &options).unwrap();
        assert!(table.trap().is_some());
        assert_eq!(
            kinds(&table, "4x"),
            vec![
                (Kind::Num, "4".to_string()),
                (Kind::Error, "x".to_string()),
                (Kind::End, String::new()),
            ]
        );
    }
}
