//! # Canonical Binary Encoding
//!
//! Every hash in the protocol is taken over bytes produced here, so the
//! layout is consensus-critical. The rules are few and fixed:
//!
//! - Integers are fixed-width little-endian.
//! - Fixed-size byte values (hashes, addresses, signatures) are written raw,
//!   no prefix.
//! - Sequences are a `u32` little-endian element count followed by the
//!   elements in order.
//! - Structs are their fields in declaration order. No padding, no tags,
//!   no optional fields.
//!
//! serde is deliberately not used for this: its output depends on the
//! chosen format and its options, and a hash must not.
//!
//! Decoding is for untrusted input. It never panics, never allocates more
//! than the input could possibly describe, and refuses trailing bytes.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use crate::config::{ADDRESS_LENGTH, HASH_LENGTH, LENGTH_PREFIX_BYTES, SIGNATURE_LENGTH};
use crate::crypto::{Address, Hash256, Signature};

/// Errors from decoding canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ended in the middle of a value.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A sequence declared more elements than the remaining input could hold.
    /// Checked before allocating anything for the sequence.
    #[error("sequence of {count} elements needs at least {min_bytes} bytes, {remaining} remaining")]
    LengthTooLarge {
        count: usize,
        min_bytes: usize,
        remaining: usize,
    },

    /// The value decoded cleanly but bytes were left over.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Canonical encoding of a value.
pub trait Encode {
    /// Append the encoding of `self` to `buf`.
    fn encode_to(&self, buf: &mut Vec<u8>);

    /// Exact number of bytes `encode_to` will append.
    fn encoded_len(&self) -> usize;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_to(&mut buf);
        buf
    }
}

/// Canonical decoding of a value from untrusted bytes.
pub trait Decode: Sized {
    /// Smallest possible encoding of one value. Used to bound sequence
    /// lengths before allocation.
    const MIN_ENCODED_LEN: usize;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError>;

    /// Decode a complete value; the input must be consumed exactly.
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let value = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Bounds-checked cursor over an input slice.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Take the next `n` bytes, advancing the cursor.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.data.len() < n {
            return Err(DecodeError::UnexpectedEof {
                needed: n,
                remaining: self.data.len(),
            });
        }
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        Ok(head)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    /// Read a sequence length prefix and check that `count` elements of at
    /// least `min_element_len` bytes each could fit in what is left.
    pub fn read_len(&mut self, min_element_len: usize) -> Result<usize, DecodeError> {
        let count = self.read_u32()? as usize;
        let min_bytes = count.saturating_mul(min_element_len);
        if min_bytes > self.remaining() {
            return Err(DecodeError::LengthTooLarge {
                count,
                min_bytes,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.data.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes(self.data.len()))
        }
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_u16(buf: &mut Vec<u8>, value: u16) {
    let mut bytes = [0u8; 2];
    LittleEndian::write_u16(&mut bytes, value);
    buf.extend_from_slice(&bytes);
}

fn write_u32(buf: &mut Vec<u8>, value: u32) {
    let mut bytes = [0u8; 4];
    LittleEndian::write_u32(&mut bytes, value);
    buf.extend_from_slice(&bytes);
}

fn write_u64(buf: &mut Vec<u8>, value: u64) {
    let mut bytes = [0u8; 8];
    LittleEndian::write_u64(&mut bytes, value);
    buf.extend_from_slice(&bytes);
}

// ---------------------------------------------------------------------------
// Primitive impls
// ---------------------------------------------------------------------------

impl Encode for u16 {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        write_u16(buf, *self);
    }

    fn encoded_len(&self) -> usize {
        2
    }
}

impl Decode for u16 {
    const MIN_ENCODED_LEN: usize = 2;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_u16()
    }
}

impl Encode for u64 {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        write_u64(buf, *self);
    }

    fn encoded_len(&self) -> usize {
        8
    }
}

impl Decode for u64 {
    const MIN_ENCODED_LEN: usize = 8;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_u64()
    }
}

impl Encode for Hash256 {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }

    fn encoded_len(&self) -> usize {
        HASH_LENGTH
    }
}

impl Decode for Hash256 {
    const MIN_ENCODED_LEN: usize = HASH_LENGTH;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_array().map(Hash256::from_bytes)
    }
}

impl Encode for Address {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }

    fn encoded_len(&self) -> usize {
        ADDRESS_LENGTH
    }
}

impl Decode for Address {
    const MIN_ENCODED_LEN: usize = ADDRESS_LENGTH;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_array().map(Address::from_bytes)
    }
}

impl Encode for Signature {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }

    fn encoded_len(&self) -> usize {
        SIGNATURE_LENGTH
    }
}

impl Decode for Signature {
    const MIN_ENCODED_LEN: usize = SIGNATURE_LENGTH;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_array().map(Signature::from_bytes)
    }
}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

impl<T: Encode> Encode for [T] {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        // Lengths are bounded by the u16 index space long before u32 overflows.
        write_u32(buf, self.len() as u32);
        for item in self {
            item.encode_to(buf);
        }
    }

    fn encoded_len(&self) -> usize {
        LENGTH_PREFIX_BYTES + self.iter().map(Encode::encoded_len).sum::<usize>()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.as_slice().encode_to(buf)
    }

    fn encoded_len(&self) -> usize {
        self.as_slice().encoded_len()
    }
}

impl<T: Decode> Decode for Vec<T> {
    const MIN_ENCODED_LEN: usize = LENGTH_PREFIX_BYTES;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let count = reader.read_len(T::MIN_ENCODED_LEN)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::decode_from(reader)?);
        }
        Ok(items)
    }
}
