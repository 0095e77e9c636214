//! ToUnicode CMap parsing.
//!
//! A CMap stream is PostScript, but the parts needed here (`bfchar`,
//! `bfrange` and `codespacerange` sections) are plain operand lists, so the
//! content stream [`tokenize`](crate::tokenizer::tokenize)r reads them: the
//! entries of each section arrive as the operands of its `end...` keyword.

use std::collections::HashMap;

use crate::error::BackendError;
use crate::tokenizer::{Operand, tokenize};

/// Code to Unicode mapping of a `/ToUnicode` stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
    /// Byte length of the first codespace range, if one was declared.
    code_length: Option<usize>,
}

impl ToUnicodeCMap {
    /// Parse raw CMap stream bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Interpreter`] when the stream cannot be
    /// tokenized.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let mut cmap = ToUnicodeCMap::default();
        for op in tokenize(data)? {
            match op.name.as_str() {
                "endcodespacerange" => {
                    if cmap.code_length.is_none() {
                        cmap.code_length = match op.operands.first() {
                            Some(Operand::Bytes(lo)) if !lo.is_empty() => Some(lo.len()),
                            _ => None,
                        };
                    }
                }
                "endbfchar" => {
                    for pair in op.operands.chunks_exact(2) {
                        if let (Operand::Bytes(src), Operand::Bytes(dst)) = (&pair[0], &pair[1]) {
                            cmap.mappings.insert(code_of(src), decode_utf16be(dst));
                        }
                    }
                }
                "endbfrange" => {
                    for triple in op.operands.chunks_exact(3) {
                        cmap.add_range(&triple[0], &triple[1], &triple[2]);
                    }
                }
                _ => {}
            }
        }
        Ok(cmap)
    }

    fn add_range(&mut self, lo: &Operand, hi: &Operand, dst: &Operand) {
        let (Operand::Bytes(lo), Operand::Bytes(hi)) = (lo, hi) else {
            return;
        };
        let (lo, hi) = (code_of(lo), code_of(hi));
        if hi < lo {
            return;
        }
        match dst {
            Operand::Bytes(start) => {
                let units = utf16_units(start);
                let Some((&last, prefix)) = units.split_last() else {
                    return;
                };
                for (offset, code) in (lo..=hi).enumerate() {
                    let mut units = prefix.to_vec();
                    units.push(last.wrapping_add(offset as u16));
                    self.mappings
                        .insert(code, String::from_utf16_lossy(&units));
                }
            }
            Operand::Array(items) => {
                for (code, item) in (lo..=hi).zip(items) {
                    if let Operand::Bytes(bytes) = item {
                        self.mappings.insert(code, decode_utf16be(bytes));
                    }
                }
            }
            _ => {}
        }
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// Declared code length in bytes, if the CMap has a codespace range.
    pub fn code_length(&self) -> Option<usize> {
        self.code_length
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|c| match c {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect()
}

fn decode_utf16be(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}
