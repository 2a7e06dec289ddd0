//! Primitive readers and writers shared by the NBT codec.

use std::borrow::Cow;
use std::io::{Read, Result as IoResult, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt as _, WriteBytesExt as _};

use crate::{io::NbtIoError, tag::NbtTag};
use crate::settings::{Endianness, IoOptions, StringEncoding};


type NbtResult<T> = Result<T, NbtIoError>;

pub(crate) const TAG_END_ID:    u8 = 0x0;
pub(crate) const BYTE_ID:       u8 = 0x1;
pub(crate) const SHORT_ID:      u8 = 0x2;
pub(crate) const INT_ID:        u8 = 0x3;
pub(crate) const LONG_ID:       u8 = 0x4;
pub(crate) const FLOAT_ID:      u8 = 0x5;
pub(crate) const DOUBLE_ID:     u8 = 0x6;
pub(crate) const BYTE_ARRAY_ID: u8 = 0x7;
pub(crate) const STRING_ID:     u8 = 0x8;
pub(crate) const LIST_ID:       u8 = 0x9;
pub(crate) const COMPOUND_ID:   u8 = 0xA;
pub(crate) const INT_ARRAY_ID:  u8 = 0xB;
pub(crate) const LONG_ARRAY_ID: u8 = 0xC;

/// Lengths read from the wire are only trusted this far when pre-allocating.
/// Longer sequences still read fine; they just grow as they go.
const MAX_PREALLOCATED_ELEMENTS: usize = 1 << 16;


#[inline]
pub(crate) const fn id_for_tag(tag: Option<&NbtTag>) -> u8 {
    match tag {
        None                        => TAG_END_ID,
        Some(NbtTag::Byte(..))      => BYTE_ID,
        Some(NbtTag::Short(..))     => SHORT_ID,
        Some(NbtTag::Int(..))       => INT_ID,
        Some(NbtTag::Long(..))      => LONG_ID,
        Some(NbtTag::Float(..))     => FLOAT_ID,
        Some(NbtTag::Double(..))    => DOUBLE_ID,
        Some(NbtTag::ByteArray(..)) => BYTE_ARRAY_ID,
        Some(NbtTag::String(..))    => STRING_ID,
        Some(NbtTag::List(..))      => LIST_ID,
        Some(NbtTag::Compound(..))  => COMPOUND_ID,
        Some(NbtTag::IntArray(..))  => INT_ARRAY_ID,
        Some(NbtTag::LongArray(..)) => LONG_ARRAY_ID,
    }
}

/// Capacity to reserve for a sequence whose length came from untrusted input.
#[inline]
pub(crate) fn initial_capacity(len: usize) -> usize {
    len.min(MAX_PREALLOCATED_ELEMENTS)
}

macro_rules! endian_rw {
    ($($read:ident, $write:ident, $ty:ty);* $(;)?) => {
        $(
            #[inline]
            pub(crate) fn $read<R: Read>(reader: &mut R, opts: IoOptions) -> IoResult<$ty> {
                match opts.endianness {
                    Endianness::BigEndian    => reader.$read::<BigEndian>(),
                    Endianness::LittleEndian => reader.$read::<LittleEndian>(),
                }
            }

            #[inline]
            pub(crate) fn $write<W: Write>(
                writer: &mut W,
                opts:   IoOptions,
                value:  $ty,
            ) -> IoResult<()> {
                match opts.endianness {
                    Endianness::BigEndian    => writer.$write::<BigEndian>(value),
                    Endianness::LittleEndian => writer.$write::<LittleEndian>(value),
                }
            }
        )*
    };
}

endian_rw!(
    read_u16, write_u16, u16;
    read_i16, write_i16, i16;
    read_i32, write_i32, i32;
    read_i64, write_i64, i64;
    read_f32, write_f32, f32;
    read_f64, write_f64, f64;
);

#[inline]
pub(crate) fn read_u8<R: Read>(reader: &mut R, _opts: IoOptions) -> IoResult<u8> {
    reader.read_u8()
}

#[inline]
pub(crate) fn read_i8<R: Read>(reader: &mut R, _opts: IoOptions) -> IoResult<i8> {
    reader.read_i8()
}

#[inline]
pub(crate) fn write_u8<W: Write>(writer: &mut W, _opts: IoOptions, value: u8) -> IoResult<()> {
    writer.write_u8(value)
}

#[inline]
pub(crate) fn write_i8<W: Write>(writer: &mut W, _opts: IoOptions, value: i8) -> IoResult<()> {
    writer.write_i8(value)
}

/// Reads an `i32` length prefix, rejecting negative values.
#[inline]
pub(crate) fn read_len<R: Read>(reader: &mut R, opts: IoOptions) -> NbtResult<usize> {
    let len = read_i32(reader, opts)?;
    usize::try_from(len).map_err(|_| NbtIoError::NegativeLength(len))
}

#[inline]
pub(crate) fn write_len<W: Write>(writer: &mut W, opts: IoOptions, len: usize) -> NbtResult<()> {
    let len = i32::try_from(len).map_err(|_| NbtIoError::ExcessiveLength)?;
    write_i32(writer, opts, len)?;
    Ok(())
}

#[inline]
fn string_from_bytes(bytes: &[u8], opts: IoOptions) -> NbtResult<Cow<'_, str>> {
    match opts.string_encoding {
        StringEncoding::Utf8 => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| NbtIoError::InvalidUtf8String),
        StringEncoding::Cesu8 => cesu8::from_java_cesu8(bytes)
            .map_err(|_| NbtIoError::InvalidCesu8String),
    }
}

#[inline]
fn bytes_from_string(string: &str, opts: IoOptions) -> Cow<'_, [u8]> {
    match opts.string_encoding {
        StringEncoding::Utf8  => Cow::Borrowed(string.as_bytes()),
        StringEncoding::Cesu8 => cesu8::to_java_cesu8(string),
    }
}

pub(crate) fn read_string<R: Read>(reader: &mut R, opts: IoOptions) -> NbtResult<String> {
    let len = usize::from(read_u16(reader, opts)?);
    let mut bytes = vec![0; len];
    reader.read_exact(&mut bytes)?;

    Ok(string_from_bytes(&bytes, opts)?.into_owned())
}

pub(crate) fn write_string<W: Write>(writer: &mut W, opts: IoOptions, string: &str) -> NbtResult<()> {
    let bytes = bytes_from_string(string, opts);
    let len = u16::try_from(bytes.len()).map_err(|_| NbtIoError::ExcessiveLength)?;
    write_u16(writer, opts, len)?;
    writer.write_all(&bytes)?;
    Ok(())
}

pub(crate) fn read_byte_array<R: Read>(reader: &mut R, len: usize) -> IoResult<Vec<i8>> {
    let mut bytes = Vec::with_capacity(initial_capacity(len));
    // `take` stops a bogus length from reading past the end into an enormous buffer.
    let read = reader.take(len as u64).read_to_end(&mut bytes)?;
    if read != len {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }
    Ok(bytes_to_signed(bytes))
}

pub(crate) fn read_i32_array<R: Read>(
    reader: &mut R,
    opts:   IoOptions,
    len:    usize,
) -> IoResult<Vec<i32>> {
    let mut array = Vec::with_capacity(initial_capacity(len));
    for _ in 0..len {
        array.push(read_i32(reader, opts)?);
    }
    Ok(array)
}

pub(crate) fn read_i64_array<R: Read>(
    reader: &mut R,
    opts:   IoOptions,
    len:    usize,
) -> IoResult<Vec<i64>> {
    let mut array = Vec::with_capacity(initial_capacity(len));
    for _ in 0..len {
        array.push(read_i64(reader, opts)?);
    }
    Ok(array)
}

#[inline]
pub(crate) fn bytes_to_signed(bytes: Vec<u8>) -> Vec<i8> {
    bytes.into_iter().map(|byte| byte as i8).collect()
}

#[inline]
pub(crate) fn bytes_to_unsigned(bytes: &[i8]) -> Vec<u8> {
    bytes.iter().map(|&byte| byte as u8).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cesu8_supplementary_characters() {
        let opts = IoOptions::java_uncompressed();
        let mut buf = Vec::new();
        write_string(&mut buf, opts, "a😀").expect("writing to a Vec");

        // One ASCII byte, then a surrogate pair of three bytes each.
        assert_eq!(&buf[..2], &[0, 7]);
        assert_eq!(
            read_string(&mut buf.as_slice(), opts).expect("valid CESU-8"),
            "a😀",
        );
    }

    #[test]
    fn string_length_limit() {
        let opts = IoOptions::java_uncompressed();

        let mut buf = Vec::new();
        write_string(&mut buf, opts, &"a".repeat(65_535)).expect("the longest allowed string");
        assert_eq!(&buf[..2], &[0xFF, 0xFF]);
        assert_eq!(buf.len(), 2 + 65_535);

        let mut buf = Vec::new();
        assert!(matches!(
            write_string(&mut buf, opts, &"a".repeat(65_536)),
            Err(NbtIoError::ExcessiveLength),
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn string_length_is_measured_after_encoding() {
        // 52,000 bytes of UTF-8, but 78,000 bytes of CESU-8
        let string = "😀".repeat(13_000);
        assert!(string.len() <= usize::from(u16::MAX));

        let mut buf = Vec::new();
        assert!(matches!(
            write_string(&mut buf, IoOptions::java_uncompressed(), &string),
            Err(NbtIoError::ExcessiveLength),
        ));

        let mut buf = Vec::new();
        write_string(&mut buf, IoOptions::bedrock_uncompressed(), &string)
            .expect("short enough as UTF-8");
        assert_eq!(&buf[..2], &52_000_u16.to_le_bytes());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let opts = IoOptions::bedrock_uncompressed();
        let bytes = [2, 0, 0xFF, 0xFE];
        assert!(matches!(
            read_string(&mut bytes.as_slice(), opts),
            Err(NbtIoError::InvalidUtf8String),
        ));
    }

    #[test]
    fn negative_lengths() {
        let opts = IoOptions::java_uncompressed();
        let bytes = (-1_i32).to_be_bytes();
        assert!(matches!(
            read_len(&mut bytes.as_slice(), opts),
            Err(NbtIoError::NegativeLength(-1)),
        ));
    }

    #[test]
    fn truncated_byte_array() {
        let err = read_byte_array(&mut [1_u8, 2, 3].as_slice(), 1_000_000)
            .expect_err("only three bytes are available");
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn little_endian_ints() {
        let opts = IoOptions::bedrock_uncompressed();
        let mut buf = Vec::new();
        write_i32(&mut buf, opts, 0x0102_0304).expect("writing to a Vec");
        assert_eq!(buf, [4, 3, 2, 1]);
    }
}
