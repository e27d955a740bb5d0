//! Variable-length integer bridge (LEB128 family).
//!
//! The decoder only talks to [`VarIntCodec`]; the bundled [`Leb128`] implementation is
//! compiled in with the `leb128` feature. A decoder built without a codec rejects the
//! `U`, `V` and `S` format codes with
//! [`DecodeError::UnsupportedFormat`](crate::DecodeError::UnsupportedFormat).

use crate::codec::ByteReader;
#[cfg(feature = "leb128")]
use crate::error::DecodeError;
use crate::error::Result;
use crate::value::Value;
use std::fmt;
#[cfg(feature = "leb128")]
use std::io::{Read, Seek, SeekFrom};

/// Longest encoding of a 64-bit value.
pub const MAX_LEB128_LEN: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarIntEncoding {
    /// `U`
    Unsigned,
    /// `V`: stored as `value + 1`, so `0` on the wire decodes to `-1`.
    UnsignedPlusOne,
    /// `S`
    Signed,
}

/// Contract the decoder needs from a variable-length integer codec.
pub trait VarIntCodec: fmt::Debug + Send + Sync {
    /// Bytes the next encoded value would consume, without moving the reader.
    /// `0` means the stream is exhausted.
    fn peek_size(&self, reader: &mut dyn ByteReader, encoding: VarIntEncoding) -> Result<u64>;

    /// Decode one value and advance past it, returning the value and bytes consumed.
    fn decode(&self, reader: &mut dyn ByteReader, encoding: VarIntEncoding) -> Result<(Value, u64)>;
}

/// Bundled LEB128 codec.
#[cfg(feature = "leb128")]
#[derive(Debug, Default, Clone, Copy)]
pub struct Leb128;

#[cfg(feature = "leb128")]
impl VarIntCodec for Leb128 {
    fn peek_size(&self, reader: &mut dyn ByteReader, _encoding: VarIntEncoding) -> Result<u64> {
        let start = reader.stream_position()?;
        let mut size = 0u64;
        let outcome = loop {
            match next_byte(reader) {
                Ok(Some(b)) => {
                    size += 1;
                    if b & 0x80 == 0 {
                        break Ok(size);
                    }
                    if size == MAX_LEB128_LEN {
                        break Err(DecodeError::MalformedVarInt);
                    }
                }
                Ok(None) if size == 0 => break Ok(0),
                Ok(None) => break Err(DecodeError::Eof),
                Err(e) => break Err(e),
            }
        };
        reader.seek(SeekFrom::Start(start))?;
        outcome
    }

    fn decode(&self, reader: &mut dyn ByteReader, encoding: VarIntEncoding) -> Result<(Value, u64)> {
        let mut result = 0u64;
        let mut shift = 0u32;
        let mut size = 0u64;
        let last = loop {
            let b = next_byte(reader)?.ok_or(DecodeError::Eof)?;
            size += 1;
            let payload = (b & 0x7f) as u64;
            // Tenth byte carries bit 63 only; a signed value sign-fills the rest.
            if shift == 63 {
                let valid = match encoding {
                    VarIntEncoding::Signed => b == 0x00 || b == 0x7f,
                    _ => payload <= 1,
                };
                if !valid {
                    return Err(DecodeError::MalformedVarInt);
                }
            }
            result |= payload << shift;
            shift += 7;
            if b & 0x80 == 0 {
                break b;
            }
            if size == MAX_LEB128_LEN {
                return Err(DecodeError::MalformedVarInt);
            }
        };

        let value = match encoding {
            VarIntEncoding::Unsigned => Value::U64(result),
            VarIntEncoding::UnsignedPlusOne => {
                let stored = i64::try_from(result).map_err(|_| DecodeError::MalformedVarInt)?;
                Value::I64(stored - 1)
            }
            VarIntEncoding::Signed => {
                let mut signed = result as i64;
                if shift < 64 && last & 0x40 != 0 {
                    signed |= -1i64 << shift;
                }
                Value::I64(signed)
            }
        };
        Ok((value, size))
    }
}

#[cfg(feature = "leb128")]
fn next_byte(reader: &mut dyn ByteReader) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(all(test, feature = "leb128"))]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode(bytes: &[u8], enc: VarIntEncoding) -> Result<(Value, u64)> {
        let mut c = Cursor::new(bytes.to_vec());
        Leb128.decode(&mut c, enc)
    }

    #[test]
    fn unsigned_multi_byte() {
        let (v, n) = decode(&[0xe5, 0x8e, 0x26], VarIntEncoding::Unsigned).unwrap();
        assert_eq!(v, Value::U64(624_485));
        assert_eq!(n, 3);
    }

    #[test]
    fn signed_negative() {
        let (v, n) = decode(&[0xc0, 0xbb, 0x78], VarIntEncoding::Signed).unwrap();
        assert_eq!(v, Value::I64(-123_456));
        assert_eq!(n, 3);
        let (v, _) = decode(&[0x7f], VarIntEncoding::Signed).unwrap();
        assert_eq!(v, Value::I64(-1));
    }

    #[test]
    fn plus_one_zero_is_minus_one() {
        let (v, n) = decode(&[0x00], VarIntEncoding::UnsignedPlusOne).unwrap();
        assert_eq!(v, Value::I64(-1));
        assert_eq!(n, 1);
        let (v, _) = decode(&[0x05], VarIntEncoding::UnsignedPlusOne).unwrap();
        assert_eq!(v, Value::I64(4));
    }

    #[test]
    fn peek_does_not_advance() {
        let mut c = Cursor::new(vec![0x01, 0xe5, 0x8e, 0x26]);
        c.set_position(1);
        let n = Leb128.peek_size(&mut c, VarIntEncoding::Unsigned).unwrap();
        assert_eq!(n, 3);
        assert_eq!(c.stream_position().unwrap(), 1);
    }

    #[test]
    fn peek_exhausted_is_zero() {
        let mut c = Cursor::new(Vec::<u8>::new());
        assert_eq!(Leb128.peek_size(&mut c, VarIntEncoding::Signed).unwrap(), 0);
    }

    #[test]
    fn overlong_rejected() {
        let bytes = [0xffu8; 11];
        assert!(matches!(
            decode(&bytes, VarIntEncoding::Unsigned),
            Err(DecodeError::MalformedVarInt)
        ));
    }

    #[test]
    fn truncated_is_eof() {
        assert!(matches!(
            decode(&[0x80, 0x80], VarIntEncoding::Unsigned),
            Err(DecodeError::Eof)
        ));
    }

    #[test]
    fn signed_ten_byte_extremes() {
        let min = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x7f];
        let (v, n) = decode(&min, VarIntEncoding::Signed).unwrap();
        assert_eq!(v, Value::I64(i64::MIN));
        assert_eq!(n, 10);

        let below = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xbf, 0x7f];
        let (v, _) = decode(&below, VarIntEncoding::Signed).unwrap();
        assert_eq!(v, Value::I64(-(1i64 << 62) - 1));

        let max = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];
        let (v, _) = decode(&max, VarIntEncoding::Signed).unwrap();
        assert_eq!(v, Value::I64(i64::MAX));
    }

    #[test]
    fn signed_tenth_byte_overflow_rejected() {
        let bytes = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert!(matches!(
            decode(&bytes, VarIntEncoding::Signed),
            Err(DecodeError::MalformedVarInt)
        ));
    }

    #[test]
    fn max_u64() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        let (v, n) = decode(&bytes, VarIntEncoding::Unsigned).unwrap();
        assert_eq!(v, Value::U64(u64::MAX));
        assert_eq!(n, 10);
    }
}
