//! Error type shared by the grammar parser, lexer, decoder and schema registry.

use thiserror::Error;

/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Every failure aborts the whole decode call; no partial record is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Grammar syntax or back-reference violation.
    #[error("malformed grammar at offset {position}: {reason}")]
    MalformedGrammar {
        /// Character offset in the format string.
        position: usize,
        reason: String,
    },

    /// Decoded value count does not line up with the schema's decodable fields.
    #[error("schema {schema}: expected {expected} decoded values, found {found}")]
    SchemaMismatch {
        schema: String,
        expected: usize,
        found: usize,
    },

    /// A format code needs a capability the decoder was configured without.
    #[error("unsupported format code '{code}': {reason}")]
    UnsupportedFormat { code: char, reason: String },

    /// The reader could not supply the requested bytes.
    #[error("unexpected end of stream")]
    Eof,

    /// A variable-length integer was overlong or overflowed 64 bits.
    #[error("malformed variable-length integer")]
    MalformedVarInt,

    #[error("IO: {0}")]
    Io(std::io::Error),

    /// Raised by a schema's post-read hook.
    #[error("Validation: {0}")]
    Validation(String),

    #[error("duplicate schema name: {0}")]
    DuplicateSchema(String),

    #[error("unknown schema: {0}")]
    UnknownSchema(String),
}

impl DecodeError {
    pub(crate) fn grammar(position: usize, reason: impl Into<String>) -> Self {
        Self::MalformedGrammar {
            position,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            DecodeError::Eof
        } else {
            DecodeError::Io(e)
        }
    }
}
