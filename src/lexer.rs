//! Pull lexer over a parsed format grammar.
//!
//! The grammar is parsed once per schema ([`crate::parser::parse`]); the lexer walks the
//! items left to right during a decode pass and resolves `(i)` back-references against
//! the values decoded so far, so every token carries a concrete repeat count.

use crate::ast::{Count, FormatCode, FormatItem};
use crate::error::{DecodeError, Result};
use crate::value::{DecodedValue, RawValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMode {
    /// Implicit or literal count.
    Plain,
    /// Count taken from the decoded value at this index.
    BackReference(usize),
    /// `T` without a back-reference: one nested record per repeat.
    NestedType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub repeat_count: u64,
    pub code: FormatCode,
    pub symbol: char,
    pub mode: TokenMode,
    /// Offset of the originating item in the grammar string.
    pub position: usize,
}

impl Token {
    /// A back-reference to anything but `s` denotes a variable array (one list value).
    pub fn is_var_array(&self) -> bool {
        matches!(self.mode, TokenMode::BackReference(_)) && self.code != FormatCode::Bytes
    }

    /// Label of the whole token, e.g. `3I` or `16s`.
    pub fn label(&self) -> String {
        format!("{}{}", self.repeat_count, self.symbol)
    }
}

pub struct Lexer<'a> {
    items: &'a [FormatItem],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(items: &'a [FormatItem]) -> Self {
        Lexer { items, pos: 0 }
    }

    pub fn has_tokens(&self) -> bool {
        self.pos < self.items.len()
    }

    /// Produce the next token, resolving a back-reference against `values`.
    pub fn next_token(&mut self, values: &[DecodedValue]) -> Result<Option<Token>> {
        let item = match self.items.get(self.pos) {
            Some(item) => item,
            None => return Ok(None),
        };
        self.pos += 1;

        let (repeat_count, mode) = match item.count {
            Count::Implicit => (1, plain_mode(item.code)),
            Count::Literal(n) => (n, plain_mode(item.code)),
            Count::BackRef(index) => (
                resolve_backref(item, index, values)?,
                TokenMode::BackReference(index),
            ),
        };
        Ok(Some(Token {
            repeat_count,
            code: item.code,
            symbol: item.symbol,
            mode,
            position: item.position,
        }))
    }
}

fn plain_mode(code: FormatCode) -> TokenMode {
    if code == FormatCode::Nested {
        TokenMode::NestedType
    } else {
        TokenMode::Plain
    }
}

fn resolve_backref(item: &FormatItem, index: usize, values: &[DecodedValue]) -> Result<u64> {
    if item.position == 0 {
        return Err(DecodeError::grammar(0, "a back-reference cannot be the first field"));
    }
    let referenced = values.get(index).ok_or_else(|| {
        DecodeError::grammar(
            item.position,
            format!(
                "index {} out of range ({} values decoded so far)",
                index,
                values.len()
            ),
        )
    })?;
    let value = match &referenced.raw {
        RawValue::Scalar(v) if v.is_integer() => v,
        _ => {
            return Err(DecodeError::grammar(
                item.position,
                format!("the repeat count at {} must be an integer", index),
            ))
        }
    };
    value.as_u64().ok_or_else(|| {
        DecodeError::grammar(
            item.position,
            format!("the repeat count at {} is negative", index),
        )
    })
}
