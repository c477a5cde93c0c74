use std::{iter::Peekable, str::CharIndices};

use crate::{diagnostics::Diagnostic, value::Value};

/// Reads a whole program. The result is a top-level S-expression holding
/// every expression in `source`, or the first parse error encountered.
pub fn read(source: &str) -> Value {
    match Reader::new(source).read_program() {
        Ok(cells) => Value::sexpr(cells),
        Err(diagnostic) => Value::error(diagnostic),
    }
}

pub fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(ch, '_' | '+' | '-' | '*' | '/' | '\\' | '=' | '<' | '>' | '!' | '&')
}

/// `-?[0-9]+`. Anything else built from symbol characters is a symbol,
/// including a lone `-`.
fn is_number_token(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn unescape(ch: char) -> Option<char> {
    let decoded = match ch {
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0b',
        '\\' => '\\',
        '\'' => '\'',
        '"' => '"',
        _ => return None,
    };
    Some(decoded)
}

struct Reader<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Reader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn offset(&mut self) -> usize {
        self.peek().map_or(self.source.len(), |(idx, _)| idx)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some((_, ch)) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == ';' {
                while let Some((_, ch)) = self.bump() {
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn read_program(&mut self) -> Result<Vec<Value>, Diagnostic> {
        let mut cells = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.peek().is_none() {
                return Ok(cells);
            }
            cells.push(self.read_expr()?);
        }
    }

    fn read_expr(&mut self) -> Result<Value, Diagnostic> {
        let Some((start, ch)) = self.peek() else {
            return Err(Diagnostic::parse("unexpected end of input", self.source.len()));
        };
        match ch {
            '(' => {
                self.bump();
                Ok(Value::sexpr(self.read_cells(')')?))
            }
            '{' => {
                self.bump();
                Ok(Value::qexpr(self.read_cells('}')?))
            }
            '"' => {
                self.bump();
                self.read_string(start)
            }
            ch if is_symbol_char(ch) => self.read_atom(start),
            other => Err(Diagnostic::parse(
                format!("unexpected character '{other}'"),
                start,
            )),
        }
    }

    fn read_cells(&mut self, close: char) -> Result<Vec<Value>, Diagnostic> {
        let mut cells = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => {
                    return Err(Diagnostic::parse(
                        format!("unexpected end of input, expected '{close}'"),
                        self.source.len(),
                    ));
                }
                Some((_, ch)) if ch == close => {
                    self.bump();
                    return Ok(cells);
                }
                Some(_) => cells.push(self.read_expr()?),
            }
        }
    }

    fn read_atom(&mut self, start: usize) -> Result<Value, Diagnostic> {
        while let Some((_, ch)) = self.peek() {
            if !is_symbol_char(ch) {
                break;
            }
            self.bump();
        }
        let end = self.offset();
        let token = &self.source[start..end];
        if is_number_token(token) {
            token
                .parse::<i64>()
                .map(Value::number)
                .map_err(|_| Diagnostic::parse(format!("invalid number '{token}'"), start))
        } else {
            Ok(Value::symbol(token))
        }
    }

    fn read_string(&mut self, start: usize) -> Result<Value, Diagnostic> {
        let mut text = String::new();
        while let Some((idx, ch)) = self.bump() {
            match ch {
                '"' => return Ok(Value::string(text)),
                '\\' => {
                    let Some((_, esc)) = self.bump() else {
                        break;
                    };
                    match unescape(esc) {
                        Some(decoded) => text.push(decoded),
                        None => {
                            return Err(Diagnostic::parse(
                                format!("invalid escape sequence '\\{esc}'"),
                                idx,
                            ));
                        }
                    }
                }
                other => text.push(other),
            }
        }
        Err(Diagnostic::parse("unterminated string literal", start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_tokens() {
        assert!(is_number_token("0"));
        assert!(is_number_token("-42"));
        assert!(!is_number_token("-"));
        assert!(!is_number_token("-foo"));
        assert!(!is_number_token("12ab"));
        assert!(!is_number_token("--1"));
    }

    #[test]
    fn unescape_covers_the_printed_set() {
        for ch in ['\x07', '\x08', '\x0c', '\n', '\r', '\t', '\x0b', '\\', '\'', '"'] {
            let escaped = crate::value::escape(&ch.to_string());
            let esc = escaped.chars().nth(1).unwrap();
            assert_eq!(unescape(esc), Some(ch));
        }
        assert_eq!(unescape('q'), None);
    }

    #[test]
    fn symbol_charset() {
        for ch in "azAZ09_+-*/\\=<>!&".chars() {
            assert!(is_symbol_char(ch), "{ch:?}");
        }
        for ch in "()[]{}\"';%.,#".chars() {
            assert!(!is_symbol_char(ch), "{ch:?}");
        }
    }
}
