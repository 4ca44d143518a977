//! Recursive-descent decoder for literal-only structured values.
//!
//! Accepts mappings, sets, lists, tuples, strings, numbers, `True`, `False`
//! and `None`. Any other expression form is rejected; nothing is evaluated.

use super::types::{LiteralError, Value};

/// Deepest container nesting accepted before giving up
pub const MAX_DEPTH: usize = 200;

type Result<T> = std::result::Result<T, LiteralError>;

/// Decode a complete literal expression
pub fn parse_literal(input: &str) -> Result<Value> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    let value = parser.parse_value(0)?;
    parser.skip_ws();
    if parser.pos < parser.src.len() {
        return Err(LiteralError::TrailingInput { offset: parser.pos });
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
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

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(found) => LiteralError::UnexpectedChar { found, offset: self.pos },
            None => LiteralError::UnexpectedEnd,
        }
    }

    /// Skip blanks, comments and explicit line continuations
    fn skip_ws(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\n' | '\r' | '\x0c') => {
                    self.bump();
                }
                Some('\\') if self.peek_nth(1) == Some('\n') => {
                    self.pos += 2;
                }
                Some('#') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep(MAX_DEPTH));
        }
        self.skip_ws();

        if let Some(prefix_len) = self.string_prefix_len() {
            return self.parse_strings(prefix_len);
        }

        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('{') => self.parse_brace(depth),
            Some('[') => {
                self.bump();
                self.skip_ws();
                if self.eat(']') {
                    return Ok(Value::List(Vec::new()));
                }
                let first = self.parse_value(depth + 1)?;
                Ok(Value::List(self.parse_rest(']', depth, vec![first])?))
            }
            Some('(') => self.parse_paren(depth),
            Some('+' | '-') => self.parse_signed(depth),
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some('.') if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_name(),
            Some(_) => Err(self.unexpected()),
        }
    }

    /// Remaining `, item` elements of a sequence up to and including `close`
    fn parse_rest(&mut self, close: char, depth: usize, mut items: Vec<Value>) -> Result<Vec<Value>> {
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(',')?;
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_value(depth + 1)?);
        }
    }

    fn parse_paren(&mut self, depth: usize) -> Result<Value> {
        self.bump();
        self.skip_ws();
        if self.eat(')') {
            return Ok(Value::Tuple(Vec::new()));
        }
        let first = self.parse_value(depth + 1)?;
        self.skip_ws();
        if self.eat(')') {
            // plain grouping, not a tuple
            return Ok(first);
        }
        self.expect(',')?;
        self.skip_ws();
        if self.eat(')') {
            return Ok(Value::Tuple(vec![first]));
        }
        let second = self.parse_value(depth + 1)?;
        Ok(Value::Tuple(self.parse_rest(')', depth, vec![first, second])?))
    }

    fn parse_brace(&mut self, depth: usize) -> Result<Value> {
        self.bump();
        self.skip_ws();
        if self.eat('}') {
            return Ok(Value::Dict(Vec::new()));
        }

        let first = self.parse_key(depth)?;
        self.skip_ws();
        if !self.eat(':') {
            let items = self.parse_rest('}', depth, vec![first])?;
            if let Some(bad) = items.iter().find(|v| !is_hashable(v)) {
                return Err(LiteralError::Unsupported {
                    what: format!("unhashable set element {}", bad.type_name()),
                    offset: self.pos,
                });
            }
            return Ok(Value::Set(items));
        }

        let value = self.parse_value(depth + 1)?;
        let mut entries = vec![(first, value)];
        loop {
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            self.expect(',')?;
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            let key = self.parse_key(depth)?;
            self.skip_ws();
            self.expect(':')?;
            let value = self.parse_value(depth + 1)?;
            entries.push((key, value));
        }
        Ok(Value::Dict(entries))
    }

    fn parse_key(&mut self, depth: usize) -> Result<Value> {
        self.skip_ws();
        let offset = self.pos;
        let key = self.parse_value(depth + 1)?;
        if !is_hashable(&key) {
            return Err(LiteralError::Unsupported {
                what: format!("unhashable key {}", key.type_name()),
                offset,
            });
        }
        Ok(key)
    }

    fn parse_signed(&mut self, depth: usize) -> Result<Value> {
        let offset = self.pos;
        let negate = self.bump() == Some('-');
        self.skip_ws();
        if matches!(self.peek(), Some('+' | '-')) {
            return Err(LiteralError::Unsupported {
                what: "chained unary operator".to_string(),
                offset,
            });
        }
        let operand = match self.parse_value(depth + 1)? {
            Value::Bool(b) => Value::Int(b as i64),
            v @ (Value::Int(_) | Value::Float(_)) => v,
            other => {
                return Err(LiteralError::Unsupported {
                    what: format!("unary operator on {}", other.type_name()),
                    offset,
                })
            }
        };
        if !negate {
            return Ok(operand);
        }
        Ok(match operand {
            Value::Int(i) => i.checked_neg().map(Value::Int).unwrap_or(Value::Float(-(i as f64))),
            Value::Float(f) => Value::Float(-f),
            other => other,
        })
    }

    fn parse_name(&mut self) -> Result<Value> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::None),
            name => Err(LiteralError::Unsupported {
                what: name.to_string(),
                offset: start,
            }),
        }
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        let radix = match (self.peek(), self.peek_nth(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        let is_float = match radix {
            Some(_) => {
                self.pos += 2;
                self.eat_digits(|c| c.is_ascii_hexdigit());
                false
            }
            None => {
                let mut is_float = false;
                self.eat_digits(|c| c.is_ascii_digit());
                if self.eat('.') {
                    is_float = true;
                    self.eat_digits(|c| c.is_ascii_digit());
                }
                if matches!(self.peek(), Some('e' | 'E')) {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('+' | '-')) {
                        self.bump();
                    }
                    self.eat_digits(|c| c.is_ascii_digit());
                }
                is_float
            }
        };

        let src = self.src;
        let text = &src[start..self.pos];
        let invalid = || LiteralError::InvalidNumber {
            text: text.to_string(),
            offset: start,
        };

        if matches!(self.peek(), Some('j' | 'J')) {
            return Err(LiteralError::Unsupported {
                what: "complex number".to_string(),
                offset: start,
            });
        }
        if matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            return Err(invalid());
        }
        if !valid_underscores(text, radix.is_some()) {
            return Err(invalid());
        }
        let digits: String = text.chars().filter(|&c| c != '_').collect();

        if let Some(radix) = radix {
            let body = &digits[2..];
            if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
                return Err(invalid());
            }
            return Ok(match i64::from_str_radix(body, radix) {
                Ok(i) => Value::Int(i),
                Err(_) => Value::Float(
                    body.chars()
                        .filter_map(|c| c.to_digit(radix))
                        .fold(0.0, |acc, d| acc * radix as f64 + d as f64),
                ),
            });
        }

        if is_float {
            return digits.parse::<f64>().map(Value::Float).map_err(|_| invalid());
        }

        // Leading zeros are only legal on zero itself
        if digits.len() > 1 && digits.starts_with('0') && digits.chars().any(|c| c != '0') {
            return Err(invalid());
        }
        match digits.parse::<i64>() {
            Ok(i) => Ok(Value::Int(i)),
            Err(_) => digits.parse::<f64>().map(Value::Float).map_err(|_| invalid()),
        }
    }

    fn eat_digits(&mut self, is_digit: impl Fn(char) -> bool) {
        while matches!(self.peek(), Some(c) if is_digit(c) || c == '_') {
            self.bump();
        }
    }

    /// Length of a string prefix (`r`, `u`, ...) if a string literal starts here
    fn string_prefix_len(&self) -> Option<usize> {
        let rest = self.src[self.pos..].as_bytes();
        let letters = rest.iter().take(2).take_while(|b| b.is_ascii_alphabetic()).count();
        match rest.get(letters) {
            Some(b'\'' | b'"') => Some(letters),
            _ => None,
        }
    }

    /// One or more adjacent string literals, concatenated
    fn parse_strings(&mut self, prefix_len: usize) -> Result<Value> {
        let mut out = self.parse_string(prefix_len)?;
        loop {
            let save = self.pos;
            self.skip_ws();
            match self.string_prefix_len() {
                Some(len) => out.push_str(&self.parse_string(len)?),
                None => {
                    self.pos = save;
                    return Ok(Value::Str(out));
                }
            }
        }
    }

    fn parse_string(&mut self, prefix_len: usize) -> Result<String> {
        let start = self.pos;
        let prefix = self.src[self.pos..self.pos + prefix_len].to_ascii_lowercase();
        let raw = match prefix.as_str() {
            "" | "u" => false,
            "r" => true,
            _ => {
                return Err(LiteralError::Unsupported {
                    what: format!("{}-prefixed string", prefix),
                    offset: start,
                })
            }
        };
        self.pos += prefix_len;

        let quote = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        let triple = self.peek() == Some(quote) && self.peek_nth(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let unterminated = LiteralError::UnterminatedString { offset: start };
        let mut out = String::new();
        loop {
            let c = self.bump().ok_or_else(|| unterminated.clone())?;
            match c {
                '\n' if !triple => return Err(unterminated),
                c if c == quote => {
                    if !triple {
                        return Ok(out);
                    }
                    if self.peek() == Some(quote) && self.peek_nth(1) == Some(quote) {
                        self.pos += 2;
                        return Ok(out);
                    }
                    out.push(c);
                }
                '\\' if raw => {
                    let next = self.bump().ok_or_else(|| unterminated.clone())?;
                    out.push('\\');
                    out.push(next);
                }
                '\\' => self.parse_escape(&mut out, &unterminated)?,
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String, unterminated: &LiteralError) -> Result<()> {
        let offset = self.pos - 1;
        let c = self.bump().ok_or_else(|| unterminated.clone())?;
        match c {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(c),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or(LiteralError::InvalidEscape { offset })?);
            }
            'x' => out.push(self.hex_escape(2, offset)?),
            'u' => out.push(self.hex_escape(4, offset)?),
            'U' => out.push(self.hex_escape(8, offset)?),
            'N' => {
                return Err(LiteralError::Unsupported {
                    what: "named unicode escape".to_string(),
                    offset,
                })
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, width: usize, offset: usize) -> Result<char> {
        let end = self.pos + width;
        let digits = self
            .src
            .get(self.pos..end)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or(LiteralError::InvalidEscape { offset })?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| LiteralError::InvalidEscape { offset })?;
        self.pos = end;
        char::from_u32(code).ok_or(LiteralError::InvalidEscape { offset })
    }
}

fn is_hashable(value: &Value) -> bool {
    match value {
        Value::List(_) | Value::Set(_) | Value::Dict(_) => false,
        Value::Tuple(items) => items.iter().all(is_hashable),
        _ => true,
    }
}

/// Underscores may only separate digits (or follow a radix prefix)
fn valid_underscores(text: &str, radix: bool) -> bool {
    let chars: Vec<char> = text.chars().collect();
    chars.iter().enumerate().all(|(i, &c)| {
        if c != '_' {
            return true;
        }
        let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
        let next = chars.get(i + 1).copied();
        let prev_ok = if radix {
            prev.is_some_and(|p| p.is_ascii_alphanumeric())
        } else {
            prev.is_some_and(|p| p.is_ascii_digit())
        };
        let next_ok = if radix {
            next.is_some_and(|n| n.is_ascii_hexdigit())
        } else {
            next.is_some_and(|n| n.is_ascii_digit())
        };
        prev_ok && next_ok
    })
}
