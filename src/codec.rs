//! Stream decoder: drive the lexer over a schema's grammar against a byte reader.
//!
//! Handles fixed-width primitives (honoring the schema's byte order), byte strings,
//! pad bytes, back-referenced variable arrays, nested records and LEB128 integers via the
//! optional [`VarIntCodec`] bridge.

use crate::ast::FormatCode;
use crate::error::{DecodeError, Result};
use crate::lexer::{Lexer, Token, TokenMode};
use crate::metadata::collect_metadata;
use crate::record::Record;
use crate::schema::{ByteOrder, Schema, SchemaRef};
use crate::value::{DecodedValue, RawValue, Value};
use crate::varint::{VarIntCodec, VarIntEncoding};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use tracing::{debug, trace};

/// Anything a record can be decoded from: `read_exact`, `stream_position`, `seek`.
pub trait ByteReader: Read + Seek {}

impl<T: Read + Seek + ?Sized> ByteReader for T {}

#[derive(Debug, Clone)]
pub struct Decoder {
    varint: Option<Arc<dyn VarIntCodec>>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Decoder with the bundled LEB128 codec when the `leb128` feature is enabled.
    pub fn new() -> Self {
        #[cfg(feature = "leb128")]
        let varint: Option<Arc<dyn VarIntCodec>> = Some(Arc::new(crate::varint::Leb128));
        #[cfg(not(feature = "leb128"))]
        let varint: Option<Arc<dyn VarIntCodec>> = None;
        Decoder { varint }
    }

    /// Decoder that rejects the `U`, `V` and `S` codes.
    pub fn without_varint() -> Self {
        Decoder { varint: None }
    }

    pub fn with_varint(codec: Arc<dyn VarIntCodec>) -> Self {
        Decoder {
            varint: Some(codec),
        }
    }

    pub fn has_varint(&self) -> bool {
        self.varint.is_some()
    }

    /// Decode one record.
    ///
    /// With `offset`, decoding starts at that absolute position. On success the reader is
    /// returned to the position it had before the call; on error it is left where the
    /// failure happened.
    pub fn decode<R: Read + Seek>(
        &self,
        schema: &SchemaRef,
        reader: &mut R,
        offset: Option<u64>,
    ) -> Result<Record> {
        let reader: &mut dyn ByteReader = reader;
        let start = reader.stream_position()?;
        if let Some(off) = offset {
            reader.seek(SeekFrom::Start(off))?;
        }
        let record = self.decode_record_in_place(schema, reader)?;
        reader.seek(SeekFrom::Start(start))?;
        debug!(
            schema = schema.name(),
            offset = ?offset,
            length = record.length(),
            "decoded record"
        );
        Ok(record)
    }

    /// Decode one record from the start of `bytes`.
    pub fn decode_slice(&self, schema: &SchemaRef, bytes: &[u8]) -> Result<Record> {
        let mut cursor = Cursor::new(bytes);
        self.decode(schema, &mut cursor, None)
    }

    /// Decode the raw value list only, without binding it to fields.
    ///
    /// Same positioning rules as [`Decoder::decode`].
    pub fn decode_values<R: Read + Seek>(
        &self,
        schema: &SchemaRef,
        reader: &mut R,
        offset: Option<u64>,
    ) -> Result<Vec<DecodedValue>> {
        let reader: &mut dyn ByteReader = reader;
        let start = reader.stream_position()?;
        if let Some(off) = offset {
            reader.seek(SeekFrom::Start(off))?;
        }
        let ctx = self.decode_raw(schema, reader)?;
        reader.seek(SeekFrom::Start(start))?;
        Ok(ctx.values)
    }

    /// Decode at the reader's current position and leave the cursor after the record.
    fn decode_record_in_place(&self, schema: &SchemaRef, r: &mut dyn ByteReader) -> Result<Record> {
        let ctx = self.decode_raw(schema, r)?;
        let bound = bind(schema, ctx.values)?;
        let (values, meta) = collect_metadata(schema, bound);
        let record = Record::new(Arc::clone(schema), values, meta, ctx.padding);
        if let Some(hook) = schema.on_read() {
            hook(&record).map_err(|e| {
                DecodeError::Validation(format!("{}: {}", schema.name(), e))
            })?;
        }
        Ok(record)
    }

    fn decode_raw(&self, schema: &Schema, r: &mut dyn ByteReader) -> Result<DecodeContext> {
        let mut ctx = DecodeContext::default();
        let mut lexer = Lexer::new(schema.items());
        while let Some(token) = lexer.next_token(&ctx.values)? {
            trace!(
                schema = schema.name(),
                code = %token.symbol,
                count = token.repeat_count,
                mode = ?token.mode,
                "token"
            );
            self.decode_token(schema, r, &token, &mut ctx)?;
        }
        Ok(ctx)
    }

    fn decode_token(
        &self,
        schema: &Schema,
        r: &mut dyn ByteReader,
        token: &Token,
        ctx: &mut DecodeContext,
    ) -> Result<()> {
        match token.mode {
            TokenMode::BackReference(_) if token.repeat_count == 0 => {
                ctx.values.push(DecodedValue {
                    raw: RawValue::Null,
                    code: token.code,
                    format: token.label(),
                    byte_size: 0,
                });
            }
            TokenMode::BackReference(_) if token.code == FormatCode::Bytes => {
                let v = self.read_byte_string(r, token.repeat_count)?;
                ctx.values.push(v);
            }
            TokenMode::BackReference(_) => {
                // The whole array lands in one slot, so every element maps to that field.
                let field_pos = ctx.values.len();
                let mut items = Vec::new();
                let mut sum_size = 0u64;
                for _ in 0..token.repeat_count {
                    let item = self.decode_element(schema, r, token, field_pos)?;
                    if item.byte_size == 0 && at_end(r)? {
                        return Err(DecodeError::Eof);
                    }
                    sum_size += item.byte_size;
                    items.push(item);
                }
                ctx.values.push(DecodedValue {
                    raw: RawValue::List(items),
                    code: token.code,
                    format: token.label(),
                    byte_size: sum_size,
                });
            }
            TokenMode::Plain | TokenMode::NestedType => match token.code {
                FormatCode::Pad => {
                    let skipped = io::copy(&mut Read::take(&mut *r, token.repeat_count), &mut io::sink())?;
                    if skipped < token.repeat_count {
                        return Err(DecodeError::Eof);
                    }
                    ctx.padding += skipped;
                }
                FormatCode::Bytes => {
                    let v = self.read_byte_string(r, token.repeat_count)?;
                    ctx.values.push(v);
                }
                _ => {
                    for _ in 0..token.repeat_count {
                        let field_pos = ctx.values.len();
                        let v = self.decode_element(schema, r, token, field_pos)?;
                        ctx.values.push(v);
                    }
                }
            },
        }
        Ok(())
    }

    /// Decode a single element of `token.code`. `field_pos` counts decodable fields and
    /// selects the nested schema for `T`.
    fn decode_element(
        &self,
        schema: &Schema,
        r: &mut dyn ByteReader,
        token: &Token,
        field_pos: usize,
    ) -> Result<DecodedValue> {
        match token.code {
            FormatCode::Nested => {
                let nested = nested_schema(schema, field_pos, token.position)?;
                let record = self.decode_record_in_place(nested, r)?;
                let byte_size = record.length();
                Ok(DecodedValue {
                    raw: RawValue::Nested(Arc::new(record)),
                    code: FormatCode::Nested,
                    format: nested.grammar().to_string(),
                    byte_size,
                })
            }
            code if code.is_varint() => self.read_varint(r, token),
            code => {
                let value = read_fixed(r, code, token.symbol, schema.byte_order())?;
                Ok(DecodedValue {
                    raw: RawValue::Scalar(value),
                    code,
                    format: token.symbol.to_string(),
                    byte_size: code.width().unwrap_or(0),
                })
            }
        }
    }

    fn read_byte_string(&self, r: &mut dyn ByteReader, len: u64) -> Result<DecodedValue> {
        // `take` bounds the allocation by what the stream actually holds.
        let mut buf = Vec::new();
        Read::take(&mut *r, len).read_to_end(&mut buf)?;
        if (buf.len() as u64) < len {
            return Err(DecodeError::Eof);
        }
        Ok(DecodedValue {
            raw: RawValue::Bytes(buf),
            code: FormatCode::Bytes,
            format: format!("{}s", len),
            byte_size: len,
        })
    }

    fn read_varint(&self, r: &mut dyn ByteReader, token: &Token) -> Result<DecodedValue> {
        let codec = self.varint.as_ref().ok_or_else(|| DecodeError::UnsupportedFormat {
            code: token.symbol,
            reason: "no variable-length integer codec configured".to_string(),
        })?;
        let encoding = match token.code {
            FormatCode::ULeb128 => VarIntEncoding::Unsigned,
            FormatCode::ULeb128P1 => VarIntEncoding::UnsignedPlusOne,
            _ => VarIntEncoding::Signed,
        };
        let (value, byte_size) = match codec.peek_size(r, encoding)? {
            // An exhausted stream yields one zero placeholder, never a run of them.
            0 if token.repeat_count > 1 || token.is_var_array() => {
                return Err(DecodeError::Eof)
            }
            0 => {
                let zero = match encoding {
                    VarIntEncoding::Unsigned => Value::U64(0),
                    _ => Value::I64(0),
                };
                (zero, 0)
            }
            _ => codec.decode(r, encoding)?,
        };
        Ok(DecodedValue {
            raw: RawValue::Scalar(value),
            code: token.code,
            format: token.symbol.to_string(),
            byte_size,
        })
    }
}

#[derive(Default)]
struct DecodeContext {
    values: Vec<DecodedValue>,
    padding: u64,
}

/// Pair decoded values with the schema's fields; synthetic fields get `None`.
fn bind(schema: &Schema, values: Vec<DecodedValue>) -> Result<Vec<Option<DecodedValue>>> {
    let expected = schema.decodable_count();
    if values.len() != expected {
        return Err(DecodeError::SchemaMismatch {
            schema: schema.name().to_string(),
            expected,
            found: values.len(),
        });
    }
    let mut values = values.into_iter();
    Ok(schema
        .fields()
        .iter()
        .map(|f| if f.synthetic { None } else { values.next() })
        .collect())
}

/// True when no byte is left to read; the position is unchanged.
fn at_end(r: &mut dyn ByteReader) -> Result<bool> {
    let mut buf = [0u8; 1];
    if r.read(&mut buf)? == 0 {
        return Ok(true);
    }
    r.seek(SeekFrom::Current(-1))?;
    Ok(false)
}

fn nested_schema(schema: &Schema, field_pos: usize, position: usize) -> Result<&SchemaRef> {
    let field = schema.decodable_fields().nth(field_pos).ok_or_else(|| {
        DecodeError::grammar(
            position,
            format!("no field at position {} for a nested record", field_pos),
        )
    })?;
    field.nested_schema().ok_or_else(|| {
        DecodeError::grammar(
            position,
            format!("field '{}' is not a nested record field", field.name),
        )
    })
}

fn read_fixed(r: &mut dyn ByteReader, code: FormatCode, symbol: char, order: ByteOrder) -> Result<Value> {
    Ok(match code {
        FormatCode::Char => Value::Char(r.read_u8()?),
        FormatCode::I8 => Value::I8(r.read_i8()?),
        FormatCode::U8 => Value::U8(r.read_u8()?),
        FormatCode::Bool => Value::Bool(r.read_u8()? != 0),
        FormatCode::I16 => Value::I16(match order {
            ByteOrder::Big => r.read_i16::<BigEndian>()?,
            ByteOrder::Little => r.read_i16::<LittleEndian>()?,
        }),
        FormatCode::U16 => Value::U16(match order {
            ByteOrder::Big => r.read_u16::<BigEndian>()?,
            ByteOrder::Little => r.read_u16::<LittleEndian>()?,
        }),
        FormatCode::I32 => Value::I32(match order {
            ByteOrder::Big => r.read_i32::<BigEndian>()?,
            ByteOrder::Little => r.read_i32::<LittleEndian>()?,
        }),
        FormatCode::U32 => Value::U32(match order {
            ByteOrder::Big => r.read_u32::<BigEndian>()?,
            ByteOrder::Little => r.read_u32::<LittleEndian>()?,
        }),
        FormatCode::I64 => Value::I64(match order {
            ByteOrder::Big => r.read_i64::<BigEndian>()?,
            ByteOrder::Little => r.read_i64::<LittleEndian>()?,
        }),
        FormatCode::U64 => Value::U64(match order {
            ByteOrder::Big => r.read_u64::<BigEndian>()?,
            ByteOrder::Little => r.read_u64::<LittleEndian>()?,
        }),
        FormatCode::F32 => Value::Float(match order {
            ByteOrder::Big => r.read_f32::<BigEndian>()?,
            ByteOrder::Little => r.read_f32::<LittleEndian>()?,
        }),
        FormatCode::F64 => Value::Double(match order {
            ByteOrder::Big => r.read_f64::<BigEndian>()?,
            ByteOrder::Little => r.read_f64::<LittleEndian>()?,
        }),
        _ => {
            return Err(DecodeError::UnsupportedFormat {
                code: symbol,
                reason: "not a fixed-width code".to_string(),
            })
        }
    })
}
