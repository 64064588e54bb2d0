//! Reader for token definition files.
//!
//! ```text
//! (* comments nest: (* like this *) and \*) does not close *)
//! If         = "if" ;
//! Identifier = /[a-zA-Z_][a-zA-Z0-9_]*/ ;
//! Whitespace = /[ \t\r\n]+/ ignore ;
//! End        = %end ;
//! Error      = %error ;
//! ```
//!
//! Declaration order is priority order: the n-th definition gets index n.
//! Regexes are validated while reading, so a file that reads cleanly only
//! fails to compile on a missing or repeated `%end` / `%error`.

use std::collections::HashSet;

use thiserror::Error;

use super::TokenDescriptor;
use crate::regex;

/// Syntax error in a definitions file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("definition error at byte {position}: {message}")]
pub struct DefinitionError {
    /// Byte offset into the file.
    pub position: usize,
    pub message: String,
}

impl DefinitionError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        DefinitionError { position, message: message.into() }
    }
}

/// Reads every definition in `text`.
///
/// # Errors
///
/// Fails on malformed productions, invalid regexes, unknown directives and
/// names defined twice.
pub fn parse_definitions(text: &str) -> Result<Vec<TokenDescriptor<String>>, DefinitionError> {
    let mut reader = Reader { text, bytes: text.as_bytes(), pos: 0 };
    let mut names: HashSet<&str> = HashSet::new();
    let mut descriptors = Vec::new();

    while reader.skip_trivia()? {
        let name_start = reader.pos;
        let name = reader.name()?;
        if !names.insert(name) {
            return Err(DefinitionError::new(name_start, format!("duplicate definition of '{}'", name)));
        }
        reader.expect(b'=', || format!("expected '=' after '{}'", name))?;

        let index = descriptors.len() as u32;
        let kind = name.to_string();
        reader.skip_trivia()?;
        let mut descriptor = match reader.peek() {
            Some(b'"') => TokenDescriptor::literal(index, kind, reader.string()?),
            Some(b'/') => TokenDescriptor::regex(index, kind, reader.regex(name)?),
            Some(b'%') => {
                let directive_start = reader.pos;
                reader.pos += 1;
                match reader.name()? {
                    "end" => TokenDescriptor::end(index, kind),
                    "error" => TokenDescriptor::error(index, kind),
                    other => {
                        return Err(DefinitionError::new(
                            directive_start,
                            format!("unknown directive '%{}' (expected %end or %error)", other),
                        ));
                    },
                }
            },
            _ => {
                return Err(DefinitionError::new(
                    reader.pos,
                    format!("expected a string, /regex/ or directive for '{}'", name),
                ));
            },
        };

        /* Optional `ignore` flag, then ';' */
        reader.skip_trivia()?;
        if reader.peek().is_some_and(is_name_start) {
            let flag_start = reader.pos;
            match reader.name()? {
                "ignore" if descriptor.pattern().is_some() => descriptor = descriptor.ignored(),
                "ignore" => {
                    return Err(DefinitionError::new(flag_start, "only pattern definitions can be ignored"));
                },
                other => {
                    return Err(DefinitionError::new(flag_start, format!("unknown flag '{}'", other)));
                },
            }
        }
        reader.expect(b';', || format!("expected ';' after definition of '{}'", name))?;
        descriptors.push(descriptor);
    }

    Ok(descriptors)
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

struct Reader<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_comment(&self) -> bool {
        self.bytes[self.pos..].starts_with(b"(*")
    }

    /// Skips whitespace and comments; `false` at end of input.
    fn skip_trivia(&mut self) -> Result<bool, DefinitionError> {
        loop {
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.pos >= self.bytes.len() {
                return Ok(false);
            }
            if !self.starts_comment() {
                return Ok(true);
            }
            self.skip_comment()?;
        }
    }

    /// `(* ... *)` with nesting; `\` escapes the next byte.
    fn skip_comment(&mut self) -> Result<(), DefinitionError> {
        let start = self.pos;
        self.pos += 2;
        let mut depth: u32 = 1;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'\\' && self.pos + 1 < self.bytes.len() {
                self.pos += 2;
            } else if self.starts_comment() {
                depth += 1;
                self.pos += 2;
            } else if self.bytes[self.pos..].starts_with(b"*)") {
                depth -= 1;
                self.pos += 2;
                if depth == 0 {
                    return Ok(());
                }
            } else {
                self.pos += 1;
            }
        }
        Err(DefinitionError::new(
            start,
            format!("unclosed comment (nesting depth {} at end of input)", depth),
        ))
    }

    fn name(&mut self) -> Result<&'a str, DefinitionError> {
        let start = self.pos;
        if !self.peek().is_some_and(is_name_start) {
            return Err(DefinitionError::new(start, "expected a name"));
        }
        while self.peek().is_some_and(is_name_continue) {
            self.pos += 1;
        }
        let text = self.text;
        Ok(&text[start..self.pos])
    }

    fn expect(&mut self, byte: u8, message: impl FnOnce() -> String) -> Result<(), DefinitionError> {
        self.skip_trivia()?;
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(DefinitionError::new(self.pos, message()))
        }
    }

    /// `"..."` with `\"`, `\\`, `\n`, `\r`, `\t` escapes.
    fn string(&mut self) -> Result<String, DefinitionError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        let text = self.text;
        let mut chars = text[self.pos..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    if value.is_empty() {
                        return Err(DefinitionError::new(start, "empty literal"));
                    }
                    return Ok(value);
                },
                '\\' => {
                    let escaped = match chars.next() {
                        Some((_, '"')) => '"',
                        Some((_, '\\')) => '\\',
                        Some((_, 'n')) => '\n',
                        Some((_, 'r')) => '\r',
                        Some((_, 't')) => '\t',
                        Some((_, other)) => {
                            return Err(DefinitionError::new(
                                self.pos + i,
                                format!("unknown escape '\\{}' in literal", other),
                            ));
                        },
                        None => break,
                    };
                    value.push(escaped);
                },
                c => value.push(c),
            }
        }
        Err(DefinitionError::new(start, "unclosed string literal"))
    }

    /// `/.../`; `\/` does not close. The body is validated as a regex.
    fn regex(&mut self, name: &str) -> Result<String, DefinitionError> {
        let open = self.pos;
        self.pos += 1;
        let body_start = self.pos;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' if self.pos + 1 < self.bytes.len() => self.pos += 2,
                b'/' => break,
                _ => self.pos += 1,
            }
        }
        if self.pos >= self.bytes.len() {
            return Err(DefinitionError::new(open, "unclosed regex delimiter '/'"));
        }
        let text = self.text;
        let body = &text[body_start..self.pos];
        self.pos += 1;

        regex::validate(body).map_err(|e| {
            DefinitionError::new(body_start + e.offset, format!("in pattern for '{}': {}", name, e.message))
        })?;
        Ok(body.to_string())
    }
}
