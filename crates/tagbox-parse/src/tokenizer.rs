//! Content stream tokenizer.
//!
//! Turns raw content stream bytes into a sequence of [`Operator`]s, each
//! carrying the [`Operand`]s that preceded it. Inline images (`BI` ... `EI`)
//! are consumed and dropped since they never carry marked-content ids.

use crate::error::BackendError;

/// Deepest array/dictionary nesting accepted in an operand.
pub const MAX_OPERAND_NESTING: usize = 256;

/// A content stream operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Real(f64),
    /// Name without the leading `/`, `#xx` escapes decoded.
    Name(String),
    /// Literal or hexadecimal string, decoded to raw bytes.
    Bytes(Vec<u8>),
    Array(Vec<Operand>),
    Dictionary(Vec<(String, Operand)>),
    Boolean(bool),
    Null,
}

impl Operand {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Look up `key` when this operand is an inline dictionary.
    pub fn dict_get(&self, key: &str) -> Option<&Operand> {
        match self {
            Operand::Dictionary(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// An operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

impl Operator {
    /// Operand `i` as a number.
    pub fn number(&self, i: usize) -> Option<f64> {
        self.operands.get(i).and_then(Operand::as_f64)
    }

    /// The first six operands as a matrix array, when all are numbers.
    pub fn matrix(&self) -> Option<[f64; 6]> {
        let mut out = [0.0; 6];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.number(i)?;
        }
        Some(out)
    }
}

/// Tokenize a content stream.
///
/// # Errors
///
/// Returns [`BackendError::Interpreter`] for malformed strings, arrays or
/// dictionaries, and for operands nested deeper than
/// [`MAX_OPERAND_NESTING`].
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, BackendError> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    /// Arrays and dictionaries currently open.
    nesting: usize,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn malformed(msg: impl Into<String>) -> BackendError {
    BackendError::Interpreter(msg.into())
}

/// Result of lexing one token at the top level.
enum Token {
    Value(Operand),
    Keyword(String),
}

impl<'a> Lexer<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            nesting: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn run(mut self) -> Result<Vec<Operator>, BackendError> {
        let mut ops = Vec::new();
        let mut operands = Vec::new();
        while let Some(token) = self.next_token()? {
            match token {
                Token::Value(v) => operands.push(v),
                Token::Keyword(k) if k == "BI" => {
                    self.skip_inline_image()?;
                    operands.clear();
                }
                Token::Keyword(name) => ops.push(Operator {
                    name,
                    operands: std::mem::take(&mut operands),
                }),
            }
        }
        Ok(ops)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, BackendError> {
        loop {
            self.skip_whitespace_and_comments();
            let Some(b) = self.peek() else {
                return Ok(None);
            };
            match b {
                b']' => return Err(malformed("unexpected ']' outside array")),
                b'a'..=b'z' | b'A'..=b'Z' | b'*' | b'\'' | b'"' => {
                    let word = self.keyword();
                    return Ok(Some(match word.as_str() {
                        "true" => Token::Value(Operand::Boolean(true)),
                        "false" => Token::Value(Operand::Boolean(false)),
                        "null" => Token::Value(Operand::Null),
                        _ => Token::Keyword(word),
                    }));
                }
                b'(' | b'<' | b'[' | b'/' | b'0'..=b'9' | b'+' | b'-' | b'.' => {
                    return Ok(Some(Token::Value(self.value()?)));
                }
                _ => self.pos += 1,
            }
        }
    }

    /// One operand value starting at the current (non-whitespace) byte.
    fn value(&mut self) -> Result<Operand, BackendError> {
        match self.peek() {
            Some(b'(') => Ok(Operand::Bytes(self.literal_string()?)),
            Some(b'<') if self.peek_at(1) == Some(b'<') => {
                self.enter()?;
                let entries = self.dictionary()?;
                self.nesting -= 1;
                Ok(Operand::Dictionary(entries))
            }
            Some(b'<') => Ok(Operand::Bytes(self.hex_string()?)),
            Some(b'[') => {
                self.enter()?;
                let items = self.array()?;
                self.nesting -= 1;
                Ok(Operand::Array(items))
            }
            Some(b'/') => Ok(Operand::Name(self.name())),
            Some(b'0'..=b'9' | b'+' | b'-' | b'.') => self.number(),
            Some(b'a'..=b'z' | b'A'..=b'Z') => Ok(match self.keyword().as_str() {
                "true" => Operand::Boolean(true),
                "false" => Operand::Boolean(false),
                "null" => Operand::Null,
                other => Operand::Name(other.to_string()),
            }),
            Some(b) => Err(malformed(format!("unexpected byte 0x{b:02X}"))),
            None => Err(malformed("unexpected end of stream")),
        }
    }

    fn enter(&mut self) -> Result<(), BackendError> {
        if self.nesting >= MAX_OPERAND_NESTING {
            return Err(malformed(format!(
                "operand nesting too deep (more than {MAX_OPERAND_NESTING} levels)"
            )));
        }
        self.nesting += 1;
        Ok(())
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1u32;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => {
                    let Some(esc) = self.peek() else { break };
                    self.pos += 1;
                    match esc {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0C),
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut value = u32::from(esc - b'0');
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        value = value * 8 + u32::from(d - b'0');
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            out.push((value & 0xFF) as u8);
                        }
                        other => out.push(other),
                    }
                }
                _ => out.push(b),
            }
        }
        Err(malformed("unterminated literal string"))
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut digits = Vec::new();
        loop {
            match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b) if is_whitespace(b) => self.pos += 1,
                Some(b) => {
                    let v = hex_value(b)
                        .ok_or_else(|| malformed(format!("invalid hex digit: {:?}", b as char)))?;
                    digits.push(v);
                    self.pos += 1;
                }
                None => return Err(malformed("unterminated hex string")),
            }
        }
        if digits.len() % 2 == 1 {
            digits.push(0);
        }
        Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
    }

    fn array(&mut self) -> Result<Vec<Operand>, BackendError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(_) => items.push(self.value()?),
                None => return Err(malformed("unterminated array")),
            }
        }
    }

    fn dictionary(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        self.pos += 2;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match (self.peek(), self.peek_at(1)) {
                (Some(b'>'), Some(b'>')) => {
                    self.pos += 2;
                    return Ok(entries);
                }
                (Some(b'/'), _) => {
                    let key = self.name();
                    self.skip_whitespace_and_comments();
                    let value = self.value()?;
                    entries.push((key, value));
                }
                (Some(_), _) => return Err(malformed("expected name key in dictionary")),
                (None, _) => return Err(malformed("unterminated dictionary")),
            }
        }
    }

    fn name(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace(b) || is_delimiter(b) {
                break;
            }
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        let mut out = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Some(hi), Some(lo)) = (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                    out.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            out.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    fn number(&mut self) -> Result<Operand, BackendError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut real = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !real => {
                    real = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| malformed("invalid number token"))?;
        if real {
            // "-." and "." alone show up in sloppy producers; read them as 0.
            let value = match text.trim_start_matches(['+', '-']) {
                "." | "" => 0.0,
                _ => text
                    .parse::<f64>()
                    .map_err(|_| malformed(format!("invalid real number: {text}")))?,
            };
            Ok(Operand::Real(value))
        } else {
            match text {
                "+" | "-" => Ok(Operand::Integer(0)),
                _ => text
                    .parse::<i64>()
                    .map(Operand::Integer)
                    .map_err(|_| malformed(format!("invalid integer: {text}"))),
            }
        }
    }

    fn keyword(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'*' || b == b'\'' || b == b'"' {
                self.pos += 1;
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    /// Skip `<entries> ID <data> EI` after a `BI` keyword.
    fn skip_inline_image(&mut self) -> Result<(), BackendError> {
        loop {
            self.skip_whitespace_and_comments();
            match (self.peek(), self.peek_at(1), self.peek_at(2)) {
                (Some(b'I'), Some(b'D'), next) if next.is_none_or(is_whitespace) => {
                    self.pos += 3;
                    break;
                }
                (Some(_), _, _) => {
                    self.value()?;
                }
                (None, _, _) => return Err(malformed("unterminated inline image (missing ID)")),
            }
        }
        while self.pos + 1 < self.input.len() {
            let at_ei = self.input[self.pos] == b'E'
                && self.input[self.pos + 1] == b'I'
                && is_whitespace(self.input[self.pos - 1])
                && self
                    .input
                    .get(self.pos + 2)
                    .is_none_or(|&b| is_whitespace(b) || is_delimiter(b));
            if at_ei {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(malformed("unterminated inline image (missing EI)"))
    }
}
