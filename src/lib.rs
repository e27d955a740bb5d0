//! # structdecode: declarative binary-structure decoding
//!
//! Describe a record's byte layout with a compact format grammar (in the spirit of
//! Python's `struct` module), attach it to an ordered field list, and decode records from
//! any `Read + Seek` source into a typed, introspectable value tree.
//!
//! ## Format grammar
//!
//! - Fixed-width codes: `x` (pad), `c`, `b`/`B`, `?`, `h`/`H`, `i`/`I`, `l`/`L`, `q`/`Q`,
//!   `f`, `d`
//! - `Ns`: byte string of N bytes
//! - `3I`: literal repeat, one value per repetition
//! - `(i)c`: back-reference; the count is the integer decoded at value position `i`.
//!   `(i)s` is one byte string of that length, any other code a variable array.
//!   A count of zero yields an empty field and reads nothing.
//! - `T`: nested record, decoded with the schema of the field at this position
//! - `U`, `V`, `S`: unsigned, unsigned-plus-one and signed LEB128 (feature `leb128`)
//!
//! ## Example
//!
//! ```
//! use structdecode::{Decoder, FieldSpec, Schema};
//!
//! let header = Schema::builder("Header")
//!     .field(FieldSpec::bytes("magic"))
//!     .field(FieldSpec::integer("count"))
//!     .field(FieldSpec::integer("items"))
//!     .grammar("4sB(1)H")
//!     .build()?;
//!
//! let bytes = [0x7f, b'E', b'L', b'F', 2, 1, 0, 2, 0];
//! let record = Decoder::new().decode_slice(&header, &bytes)?;
//! assert_eq!(record.length(), 9);
//! assert_eq!(record.field("count").and_then(|v| v.as_u64()), Some(2));
//! # Ok::<(), structdecode::DecodeError>(())
//! ```

pub mod ast;
pub mod codec;
pub mod dump;
pub mod error;
pub mod lexer;
pub mod metadata;
pub mod parser;
pub mod record;
pub mod schema;
pub mod value;
pub mod varint;

pub use ast::{Count, FormatCode, FormatItem};
pub use codec::{ByteReader, Decoder};
pub use error::{DecodeError, Result};
pub use lexer::{Lexer, Token, TokenMode};
pub use metadata::{translate_enum, MetadataItem, StructMetadata};
pub use parser::parse;
pub use record::Record;
pub use schema::{
    compose, ByteOrder, EnumMapping, FieldSpec, OnRead, Schema, SchemaBuilder, SchemaRef,
    SchemaRegistry, SemanticKind,
};
pub use value::{DecodedValue, EnumValue, RawValue, Value};
#[cfg(feature = "leb128")]
pub use varint::Leb128;
pub use varint::{VarIntCodec, VarIntEncoding};
