//! Decoded values: the raw per-token list built during a pass and the typed field values
//! exposed on a [`Record`].

use crate::ast::FormatCode;
use crate::record::Record;
use std::sync::Arc;

/// A single typed value (field, list element or nested record).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Bool(bool),
    Char(u8),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Record(Arc<Record>),
    /// Enum field after translation.
    Enum(EnumValue),
    /// Empty field: zero-count back-reference, or a synthetic field.
    Null,
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U8(x) => Some(*x as u64),
            Value::U16(x) => Some(*x as u64),
            Value::U32(x) => Some(*x as u64),
            Value::U64(x) => Some(*x),
            Value::I8(x) => u64::try_from(*x).ok(),
            Value::I16(x) => u64::try_from(*x).ok(),
            Value::I32(x) => u64::try_from(*x).ok(),
            Value::I64(x) => u64::try_from(*x).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(x) => Some(*x as i64),
            Value::I16(x) => Some(*x as i64),
            Value::I32(x) => Some(*x as i64),
            Value::I64(x) => Some(*x),
            Value::U8(x) => Some(*x as i64),
            Value::U16(x) => Some(*x as i64),
            Value::U32(x) => Some(*x as i64),
            Value::U64(x) => i64::try_from(*x).ok(),
            _ => None,
        }
    }

    /// Any integer, lossless.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::U64(x) => Some(i128::from(*x)),
            v => v.as_i64().map(i128::from),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x as f64),
            Value::Double(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for the integer variants a back-reference may point at.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::U8(_)
                | Value::U16(_)
                | Value::U32(_)
                | Value::U64(_)
                | Value::I8(_)
                | Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
        )
    }
}

/// Symbolic constant produced by enum translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Variant name, or the mapping's fallback name when `raw` matched nothing.
    pub name: String,
    /// Wide enough for every `u64` and `i64` the wire can carry.
    pub raw: i128,
    /// False when the fallback was used.
    pub known: bool,
}

/// Payload of one entry in the per-pass value list.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Scalar(Value),
    Bytes(Vec<u8>),
    List(Vec<DecodedValue>),
    Nested(Arc<Record>),
    /// Zero-count back-reference.
    Null,
}

/// One entry in the value list built by a decode pass.
///
/// The list is positionally aligned with the grammar's value-producing tokens:
/// back-references index into it by position.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedValue {
    pub raw: RawValue,
    pub code: FormatCode,
    /// Format label, e.g. `I`, `4s`, `3H` or a nested record's grammar.
    pub format: String,
    pub byte_size: u64,
}

impl DecodedValue {
    /// The integer a back-reference resolves to, if this entry is one.
    pub fn as_count(&self) -> Option<u64> {
        match &self.raw {
            RawValue::Scalar(v) if v.is_integer() => v.as_u64(),
            _ => None,
        }
    }

    /// Strip size/format bookkeeping, keeping only the typed value.
    pub fn into_value(self) -> Value {
        match self.raw {
            RawValue::Scalar(v) => v,
            RawValue::Bytes(b) => Value::Bytes(b),
            RawValue::List(items) => {
                Value::List(items.into_iter().map(DecodedValue::into_value).collect())
            }
            RawValue::Nested(r) => Value::Record(r),
            RawValue::Null => Value::Null,
        }
    }
}
