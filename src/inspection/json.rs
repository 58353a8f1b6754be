//! Iterative JSON parsing for documents nested past serde_json's recursion
//! limit.
//!
//! Containers are tracked on a heap-allocated frame stack, so nesting depth
//! costs memory instead of call stack. Scalars (strings, numbers, literals)
//! are located here and decoded by serde_json, which keeps escape handling
//! and number grammar identical to the shallow path.

use serde_json::{Map, Value};
use thiserror::Error;

/// Failure to parse a JSON document.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("invalid JSON at byte {offset}")]
    Syntax { offset: usize },

    #[error(transparent)]
    Scalar(#[from] serde_json::Error),
}

/// Whether serde_json gave up because the document nests too deeply.
pub fn is_recursion_limit(error: &serde_json::Error) -> bool {
    error.is_syntax() && error.to_string().starts_with("recursion limit exceeded")
}

/// Parse a complete JSON document of any nesting depth.
pub fn parse_deep(input: &[u8]) -> Result<Value, JsonError> {
    let mut parser = Parser { input, pos: 0 };
    let mut frames = Frames(Vec::new());

    loop {
        let mut value = match parser.peek_token()? {
            b'[' => {
                parser.pos += 1;
                if parser.eat(b']') {
                    Value::Array(Vec::new())
                } else {
                    frames.0.push(Frame::Array(Vec::new()));
                    continue;
                }
            }
            b'{' => {
                parser.pos += 1;
                if parser.eat(b'}') {
                    Value::Object(Map::new())
                } else {
                    let key = parser.key()?;
                    frames.0.push(Frame::Object {
                        entries: Map::new(),
                        key,
                    });
                    continue;
                }
            }
            _ => parser.scalar()?,
        };

        // Attach the finished value, closing every container it completes.
        loop {
            match frames.0.last_mut() {
                None => {
                    parser.skip_whitespace();
                    if parser.pos == input.len() {
                        return Ok(value);
                    }
                    dismantle(value);
                    return Err(parser.error());
                }
                Some(Frame::Array(items)) => {
                    items.push(value);
                    if parser.eat(b',') {
                        break;
                    }
                    if !parser.eat(b']') {
                        return Err(parser.error());
                    }
                }
                Some(Frame::Object { entries, key }) => {
                    entries.insert(std::mem::take(key), value);
                    if parser.eat(b',') {
                        *key = parser.key()?;
                        break;
                    }
                    if !parser.eat(b'}') {
                        return Err(parser.error());
                    }
                }
            }

            value = match frames.0.pop() {
                Some(Frame::Array(items)) => Value::Array(items),
                Some(Frame::Object { entries, .. }) => Value::Object(entries),
                None => return Err(parser.error()),
            };
        }
    }
}

enum Frame {
    Array(Vec<Value>),
    Object { entries: Map<String, Value>, key: String },
}

/// Open containers, innermost last.
struct Frames(Vec<Frame>);

impl Drop for Frames {
    fn drop(&mut self) {
        for frame in self.0.drain(..) {
            match frame {
                Frame::Array(items) => dismantle(Value::Array(items)),
                Frame::Object { entries, .. } => dismantle(Value::Object(entries)),
            }
        }
    }
}

/// Drop a tree of any depth without recursing.
pub fn dismantle(root: Value) {
    let mut pending = vec![root];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(entries) => pending.extend(entries.into_iter().map(|(_, v)| v)),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self) -> JsonError {
        JsonError::Syntax { offset: self.pos }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.input.get(self.pos) {
            self.pos += 1;
        }
    }

    /// Next significant byte, without consuming it.
    fn peek_token(&mut self) -> Result<u8, JsonError> {
        self.skip_whitespace();
        self.input.get(self.pos).copied().ok_or_else(|| self.error())
    }

    /// Consume `byte` if it is the next significant byte.
    fn eat(&mut self, byte: u8) -> bool {
        self.skip_whitespace();
        if self.input.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// An object key and the colon after it.
    fn key(&mut self) -> Result<String, JsonError> {
        if self.peek_token()? != b'"' {
            return Err(self.error());
        }
        let token = self.string_token()?;
        let key = serde_json::from_slice(token)?;
        if !self.eat(b':') {
            return Err(self.error());
        }
        Ok(key)
    }

    fn scalar(&mut self) -> Result<Value, JsonError> {
        let token = if self.peek_token()? == b'"' {
            self.string_token()?
        } else {
            let start = self.pos;
            while let Some(b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'+' | b'-' | b'.') =
                self.input.get(self.pos)
            {
                self.pos += 1;
            }
            if start == self.pos {
                return Err(self.error());
            }
            &self.input[start..self.pos]
        };
        Ok(serde_json::from_slice(token)?)
    }

    /// The raw bytes of a string literal, quotes included.
    fn string_token(&mut self) -> Result<&'a [u8], JsonError> {
        let start = self.pos;
        let mut i = start + 1;
        loop {
            match self.input.get(i) {
                Some(b'"') => break,
                Some(b'\\') => i += 2,
                Some(_) => i += 1,
                None => {
                    self.pos = self.input.len();
                    return Err(self.error());
                }
            }
        }
        self.pos = i + 1;
        Ok(&self.input[start..self.pos])
    }
}
