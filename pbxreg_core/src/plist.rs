//! Old-style (OpenStep) ASCII property lists, the encoding of `project.pbxproj`.
//!
//! Grammar:
//! - dictionary: `{ key = value; ... }`
//! - array: `( value, value, )` (trailing comma allowed)
//! - string: quoted `"..."` with backslash escapes, or an unquoted run of
//!   `[A-Za-z0-9_$+/:.-]`
//! - comments: `// ...` to end of line and `/* ... */`
//!
//! Comments are discarded on parse; the writer regenerates Xcode's
//! annotations from the object table.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Dictionary with keys kept in sorted order (Xcode writes keys sorted).
pub type Dictionary = BTreeMap<String, Value>;

/// A property list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

impl Value {
    /// Borrow as a string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as an array, if this is one.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Mutably borrow as an array, if this is one.
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a dictionary, if this is one.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Mutably borrow as a dictionary, if this is one.
    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Parse a complete property list document.
pub fn parse(input: &str) -> Result<Value> {
    let mut parser = Parser::new(input);
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.peek().is_some() {
        return Err(parser.error("Unexpected trailing content"));
    }
    Ok(value)
}

/// Characters allowed in an unquoted string.
pub(crate) fn is_unquoted_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '+' | '/' | ':' | '.' | '-')
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        // A leading BOM is tolerated.
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    /// Build a parse error at the current position.
    fn error(&self, reason: impl Into<String>) -> Error {
        let consumed = &self.input[..self.pos];
        let line = consumed.matches('\n').count() + 1;
        let column = match consumed.rfind('\n') {
            Some(idx) => consumed[idx + 1..].chars().count() + 1,
            None => consumed.chars().count() + 1,
        };
        Error::parse(line, column, reason)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("Expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("Expected '{}', found end of input", expected))),
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            let rest = self.rest();
            if rest.starts_with("//") {
                match rest.find('\n') {
                    Some(idx) => self.pos += idx + 1,
                    None => self.pos = self.input.len(),
                }
            } else if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(idx) => self.pos += idx + 4,
                    None => return Err(self.error("Unterminated comment")),
                }
            } else {
                match self.peek() {
                    Some(c) if c.is_whitespace() => {
                        self.bump();
                    }
                    _ => return Ok(()),
                }
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some('{') => self.parse_dictionary(),
            Some('(') => self.parse_array(),
            Some(_) => self.parse_string().map(Value::String),
            None => Err(self.error("Expected a value, found end of input")),
        }
    }

    fn parse_dictionary(&mut self) -> Result<Value> {
        self.expect('{')?;
        let mut dict = Dictionary::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Dictionary(dict));
            }
            let key = self.parse_string()?;
            self.skip_trivia()?;
            self.expect('=')?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            self.skip_trivia()?;
            self.expect(';')?;
            dict.insert(key, value);
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.expect('(')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(')') {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => {}
                Some(c) => return Err(self.error(format!("Expected ',' or ')', found '{}'", c))),
                None => return Err(self.error("Unterminated array")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.parse_quoted(quote)
            }
            Some(c) if is_unquoted_char(c) => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if is_unquoted_char(c)) {
                    self.bump();
                }
                Ok(self.input[start..self.pos].to_string())
            }
            Some(c) => Err(self.error(format!("Unexpected character '{}'", c))),
            None => Err(self.error("Expected a string, found end of input")),
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("Unterminated escape sequence"))?;
        let escaped = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            'a' => '\u{7}',
            'U' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .bump()
                        .and_then(|d| d.to_digit(16))
                        .ok_or_else(|| self.error("Invalid \\U escape"))?;
                    code = code * 16 + digit;
                }
                char::from_u32(code).ok_or_else(|| self.error("Invalid \\U escape"))?
            }
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            self.bump();
                            code = code * 8 + digit;
                        }
                        None => break,
                    }
                }
                char::from_u32(code).ok_or_else(|| self.error("Invalid octal escape"))?
            }
            other => other,
        };
        Ok(escaped)
    }
}
