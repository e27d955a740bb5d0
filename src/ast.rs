//! Parsed form of a format grammar.

/// Primitive format codes understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCode {
    /// `x`: skipped byte, produces no value.
    Pad,
    /// `c`
    Char,
    I8,
    U8,
    /// `?`
    Bool,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// `s`: byte string whose width is the item's count.
    Bytes,
    /// `U`: unsigned LEB128.
    ULeb128,
    /// `V`: unsigned LEB128 storing `value + 1`.
    ULeb128P1,
    /// `S`: signed LEB128.
    SLeb128,
    /// `T`: record described by the field's nested schema.
    Nested,
}

impl FormatCode {
    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            'x' => FormatCode::Pad,
            'c' => FormatCode::Char,
            'b' => FormatCode::I8,
            'B' => FormatCode::U8,
            '?' => FormatCode::Bool,
            'h' => FormatCode::I16,
            'H' => FormatCode::U16,
            'i' | 'l' => FormatCode::I32,
            'I' | 'L' => FormatCode::U32,
            'q' => FormatCode::I64,
            'Q' => FormatCode::U64,
            'f' => FormatCode::F32,
            'd' => FormatCode::F64,
            's' => FormatCode::Bytes,
            'U' => FormatCode::ULeb128,
            'V' => FormatCode::ULeb128P1,
            'S' => FormatCode::SLeb128,
            'T' => FormatCode::Nested,
            _ => return None,
        })
    }

    /// Fixed byte width, or `None` for codes whose width depends on the data.
    pub fn width(self) -> Option<u64> {
        match self {
            FormatCode::Pad
            | FormatCode::Char
            | FormatCode::I8
            | FormatCode::U8
            | FormatCode::Bool => Some(1),
            FormatCode::I16 | FormatCode::U16 => Some(2),
            FormatCode::I32 | FormatCode::U32 | FormatCode::F32 => Some(4),
            FormatCode::I64 | FormatCode::U64 | FormatCode::F64 => Some(8),
            FormatCode::Bytes
            | FormatCode::ULeb128
            | FormatCode::ULeb128P1
            | FormatCode::SLeb128
            | FormatCode::Nested => None,
        }
    }

    pub fn is_varint(self) -> bool {
        matches!(
            self,
            FormatCode::ULeb128 | FormatCode::ULeb128P1 | FormatCode::SLeb128
        )
    }
}

/// How many times an item applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// No prefix: once.
    Implicit,
    /// Digit prefix, e.g. `3I`.
    Literal(u64),
    /// `(i)` prefix: the count is the integer decoded at position `i`.
    BackRef(usize),
}

/// One grammar item: optional count plus a format code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatItem {
    pub count: Count,
    pub code: FormatCode,
    /// The character as written (`l` and `i` share a code but keep their own label).
    pub symbol: char,
    /// Byte offset of the item in the grammar string.
    pub position: usize,
}
