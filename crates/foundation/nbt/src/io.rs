//! Reading and writing binary NBT.

use std::io;
use std::io::{Read, Write};

use flate2::Compression;
use flate2::{
    read::{GzDecoder, ZlibDecoder},
    write::{GzEncoder, ZlibEncoder},
};
use log::trace;
use thiserror::Error;

use crate::raw;
use crate::{
    settings::{DepthLimit, IoOptions, NbtCompression},
    tag::{NbtCompound, NbtList, NbtTag},
};


/// Read the Bedrock Edition NBT header. The first number is the version of `level.dat` format
/// if reading that file, and is otherwise always `8`. The second number is the length
/// of the NBT data, excluding the header.
pub fn read_bedrock_header<R: Read>(
    reader: &mut R,
    opts:   IoOptions,
) -> Result<(i32, i32), NbtIoError> {
    Ok((raw::read_i32(reader, opts)?, raw::read_i32(reader, opts)?))
}

/// Write the Bedrock Edition NBT header. The first number is the version of `level.dat` format
/// if writing that file, and should otherwise always be `8`. The second number is the length
/// of the NBT data, excluding the header.
pub fn write_bedrock_header<W: Write>(
    writer:    &mut W,
    opts:      IoOptions,
    first_num: i32,
    nbt_len:   usize,
) -> Result<(), NbtIoError> {
    raw::write_i32(writer, opts, first_num)?;
    raw::write_len(writer, opts, nbt_len)?;
    Ok(())
}

/// Guesses the compression of NBT bytes from their first two bytes.
///
/// Gzip streams start with `1F 8B`. Zlib streams start with a CMF byte for deflate
/// (`0x78` for the window sizes Minecraft uses) whose 16-bit header is a multiple of 31.
/// Anything else is treated as uncompressed; uncompressed NBT starts with `0x0A`.
pub fn detect_compression(bytes: &[u8]) -> NbtCompression {
    match bytes {
        [0x1F, 0x8B, ..] => NbtCompression::GzipCompressed,
        [cmf @ 0x78, flg, ..] if (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0 => {
            NbtCompression::ZlibCompressed
        }
        _ => NbtCompression::Uncompressed,
    }
}

/// Reads the given encoding of NBT data from the given reader, returning the resulting NBT
/// compound and associated root name.
///
/// Anything after the root compound is left unread.
pub fn read_nbt<R: Read>(
    reader: &mut R,
    opts:   IoOptions,
) -> Result<(NbtCompound, String), NbtIoError> {
    match opts.compression {
        NbtCompression::Uncompressed => read_nbt_uncompressed(reader, opts),
        NbtCompression::ZlibCompressed | NbtCompression::ZlibCompressedWith(_) =>
            read_nbt_uncompressed(&mut ZlibDecoder::new(reader), opts),
        NbtCompression::GzipCompressed | NbtCompression::GzipCompressedWith(_) =>
            read_nbt_uncompressed(&mut GzDecoder::new(reader), opts),
    }
}

/// Reads a complete buffer of NBT data in the given encoding.
///
/// Unlike [`read_nbt`], bytes left over after the root compound (after decompression, if any)
/// are an error unless `opts.allow_trailing_data` is set.
pub fn read_nbt_bytes(
    bytes: &[u8],
    opts:  IoOptions,
) -> Result<(NbtCompound, String), NbtIoError> {
    let decompressed;
    let mut remaining = match opts.compression {
        NbtCompression::Uncompressed => bytes,
        NbtCompression::ZlibCompressed | NbtCompression::ZlibCompressedWith(_) => {
            decompressed = decompress(ZlibDecoder::new(bytes))?;
            decompressed.as_slice()
        }
        NbtCompression::GzipCompressed | NbtCompression::GzipCompressedWith(_) => {
            decompressed = decompress(GzDecoder::new(bytes))?;
            decompressed.as_slice()
        }
    };

    let root = read_nbt_uncompressed(&mut remaining, opts)?;

    if !remaining.is_empty() {
        if opts.allow_trailing_data {
            trace!("Ignoring {} bytes after the root compound", remaining.len());
        } else {
            return Err(NbtIoError::TrailingData {
                remaining: remaining.len(),
            });
        }
    }

    Ok(root)
}

fn decompress<R: Read>(mut decoder: R) -> Result<Vec<u8>, NbtIoError> {
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn read_nbt_uncompressed<R: Read>(
    reader: &mut R,
    opts:   IoOptions,
) -> Result<(NbtCompound, String), NbtIoError> {
    let root_id = raw::read_u8(reader, opts)?;
    if root_id != raw::COMPOUND_ID {
        return Err(NbtIoError::TagTypeMismatch {
            expected: raw::COMPOUND_ID,
            found:    root_id,
        });
    }

    let root_name = raw::read_string(reader, opts)?;
    let root = read_compound_body(reader, opts, 0)?;

    Ok((root, root_name))
}

fn read_tag_body_dyn<R: Read>(
    reader:        &mut R,
    opts:          IoOptions,
    tag_id:        u8,
    current_depth: u32,
) -> Result<NbtTag, NbtIoError> {
    macro_rules! drive_reader {
        ($($id:literal)*) => {
            match tag_id {
                $( $id => read_tag_body_const::<_, $id>(reader, opts, current_depth), )*
                _ => Err(NbtIoError::InvalidTagId(tag_id))
            }
        };
    }

    drive_reader!(0x1 0x2 0x3 0x4 0x5 0x6 0x7 0x8 0x9 0xA 0xB 0xC)
}

#[inline]
fn read_tag_body_const<R: Read, const TAG_ID: u8>(
    reader:        &mut R,
    opts:          IoOptions,
    current_depth: u32,
) -> Result<NbtTag, NbtIoError> {
    let tag = match TAG_ID {
        raw::BYTE_ID   => NbtTag::Byte   (raw::read_i8 (reader, opts)?),
        raw::SHORT_ID  => NbtTag::Short  (raw::read_i16(reader, opts)?),
        raw::INT_ID    => NbtTag::Int    (raw::read_i32(reader, opts)?),
        raw::LONG_ID   => NbtTag::Long   (raw::read_i64(reader, opts)?),
        raw::FLOAT_ID  => NbtTag::Float  (raw::read_f32(reader, opts)?),
        raw::DOUBLE_ID => NbtTag::Double (raw::read_f64(reader, opts)?),
        raw::BYTE_ARRAY_ID => {
            let len = raw::read_len(reader, opts)?;
            NbtTag::ByteArray(raw::read_byte_array(reader, len)?)
        }
        raw::STRING_ID => NbtTag::String(raw::read_string(reader, opts)?),
        raw::LIST_ID => {
            let tag_id = raw::read_u8(reader, opts)?;
            let len = raw::read_len(reader, opts)?;

            // Make sure we don't have an invalid type or a nonempty list of TAG_End
            if tag_id > raw::LONG_ARRAY_ID || (tag_id == raw::TAG_END_ID && len > 0) {
                return Err(NbtIoError::InvalidTagId(tag_id));
            }

            if len == 0 {
                return Ok(NbtTag::List(NbtList::new()));
            }

            if current_depth >= opts.depth_limit.0 {
                return Err(NbtIoError::ExceededDepthLimit {
                    limit: opts.depth_limit,
                });
            }

            let mut list = NbtList::with_capacity(raw::initial_capacity(len));

            macro_rules! drive_reader {
                ($($id:literal)*) => {
                    match tag_id {
                        $(
                            $id => {
                                for _ in 0..len {
                                    list.push(read_tag_body_const::<_, $id>(
                                        reader, opts, current_depth + 1,
                                    )?);
                                }
                            },
                        )*
                        _ => return Err(NbtIoError::InvalidTagId(tag_id))
                    }
                };
            }

            drive_reader!(0x1 0x2 0x3 0x4 0x5 0x6 0x7 0x8 0x9 0xA 0xB 0xC);

            NbtTag::List(list)
        }
        raw::COMPOUND_ID => NbtTag::Compound(read_compound_body(reader, opts, current_depth)?),
        raw::INT_ARRAY_ID => {
            let len = raw::read_len(reader, opts)?;
            NbtTag::IntArray(raw::read_i32_array(reader, opts, len)?)
        }
        raw::LONG_ARRAY_ID => {
            let len = raw::read_len(reader, opts)?;
            NbtTag::LongArray(raw::read_i64_array(reader, opts, len)?)
        }
        _ => return Err(NbtIoError::InvalidTagId(TAG_ID)),
    };

    Ok(tag)
}

fn read_compound_body<R: Read>(
    reader:        &mut R,
    opts:          IoOptions,
    current_depth: u32,
) -> Result<NbtCompound, NbtIoError> {
    let mut compound = NbtCompound::new();
    let mut tag_id = raw::read_u8(reader, opts)?;

    if tag_id != raw::TAG_END_ID && current_depth >= opts.depth_limit.0 {
        return Err(NbtIoError::ExceededDepthLimit {
            limit: opts.depth_limit,
        });
    }

    // Read until TAG_End
    while tag_id != raw::TAG_END_ID {
        let name = raw::read_string(reader, opts)?;
        let tag = read_tag_body_dyn(reader, opts, tag_id, current_depth + 1)?;
        compound.insert(name, tag);
        tag_id = raw::read_u8(reader, opts)?;
    }

    Ok(compound)
}

/// Writes the given encoding of NBT data to the given writer.
/// If no root name is provided, the empty string is used.
pub fn write_nbt<W: Write>(
    writer:    &mut W,
    opts:      IoOptions,
    root_name: Option<&str>,
    root:      &NbtCompound,
) -> Result<(), NbtIoError> {
    let (gzip, compression) = match opts.compression {
        NbtCompression::Uncompressed => {
            return write_nbt_uncompressed(writer, opts, root_name, root);
        }
        NbtCompression::ZlibCompressed                  => (false, Compression::default()),
        NbtCompression::ZlibCompressedWith(compression) => (false, compression.into()),
        NbtCompression::GzipCompressed                  => (true,  Compression::default()),
        NbtCompression::GzipCompressedWith(compression) => (true,  compression.into()),
    };

    if gzip {
        let mut encoder = GzEncoder::new(writer, compression);
        write_nbt_uncompressed(&mut encoder, opts, root_name, root)?;
        encoder.try_finish()?;
    } else {
        let mut encoder = ZlibEncoder::new(writer, compression);
        write_nbt_uncompressed(&mut encoder, opts, root_name, root)?;
        encoder.try_finish()?;
    }

    Ok(())
}

/// Writes the given tag compound with the given name to the provided writer, writing only the raw
/// NBT data without any compression.
fn write_nbt_uncompressed<W: Write>(
    writer:    &mut W,
    opts:      IoOptions,
    root_name: Option<&str>,
    root:      &NbtCompound,
) -> Result<(), NbtIoError> {
    raw::write_u8(writer, opts, raw::COMPOUND_ID)?;
    raw::write_string(writer, opts, root_name.unwrap_or(""))?;
    write_compound_body(writer, opts, root, 0)
}

fn write_compound_body<W: Write>(
    writer:        &mut W,
    opts:          IoOptions,
    compound:      &NbtCompound,
    current_depth: u32,
) -> Result<(), NbtIoError> {
    if current_depth >= opts.depth_limit.0 && !compound.is_empty() {
        return Err(NbtIoError::ExceededDepthLimit {
            limit: opts.depth_limit,
        });
    }

    for (name, tag) in compound {
        raw::write_u8(writer, opts, raw::id_for_tag(Some(tag)))?;
        raw::write_string(writer, opts, name)?;
        write_tag_body(writer, opts, tag, current_depth + 1)?;
    }

    // TAG_End
    raw::write_u8(writer, opts, raw::id_for_tag(None))?;
    Ok(())
}

fn write_tag_body<W: Write>(
    writer:        &mut W,
    opts:          IoOptions,
    tag:           &NbtTag,
    current_depth: u32,
) -> Result<(), NbtIoError> {
    match tag {
        &NbtTag::Byte  (value) => raw::write_i8 (writer, opts, value)?,
        &NbtTag::Short (value) => raw::write_i16(writer, opts, value)?,
        &NbtTag::Int   (value) => raw::write_i32(writer, opts, value)?,
        &NbtTag::Long  (value) => raw::write_i64(writer, opts, value)?,
        &NbtTag::Float (value) => raw::write_f32(writer, opts, value)?,
        &NbtTag::Double(value) => raw::write_f64(writer, opts, value)?,
        NbtTag::ByteArray(value) => {
            raw::write_len(writer, opts, value.len())?;
            writer.write_all(&raw::bytes_to_unsigned(value))?;
        }
        NbtTag::String(value) => raw::write_string(writer, opts, value)?,
        NbtTag::List(value) => {
            let list_type = value.element_type().id();
            raw::write_u8(writer, opts, list_type)?;
            raw::write_len(writer, opts, value.len())?;

            if current_depth >= opts.depth_limit.0 && !value.is_empty() {
                return Err(NbtIoError::ExceededDepthLimit {
                    limit: opts.depth_limit,
                });
            }

            for sub_tag in value {
                let tag_id = sub_tag.numeric_tag_id();
                if tag_id != list_type {
                    return Err(NbtIoError::NonHomogenousList {
                        list_type,
                        encountered_type: tag_id,
                    });
                }

                write_tag_body(writer, opts, sub_tag, current_depth + 1)?;
            }
        }
        NbtTag::Compound(value) => write_compound_body(writer, opts, value, current_depth)?,
        NbtTag::IntArray(value) => {
            raw::write_len(writer, opts, value.len())?;

            for &int in value {
                raw::write_i32(writer, opts, int)?;
            }
        }
        NbtTag::LongArray(value) => {
            raw::write_len(writer, opts, value.len())?;

            for &long in value {
                raw::write_i64(writer, opts, long)?;
            }
        }
    }

    Ok(())
}

/// Describes an error which occurred during the reading or writing of NBT byte data.
#[derive(Error, Debug)]
pub enum NbtIoError {
    /// A native I/O error.
    #[error(transparent)]
    StdIo(#[from] io::Error),
    /// The limit on recursive nesting depth of NBT lists and compounds was exceeded.
    #[error("Exceeded depth limit {} for nested tag lists and compound tags", limit.0)]
    ExceededDepthLimit {
        /// The limit which was exceeded.
        limit: DepthLimit,
    },
    /// A list contained elements of more than one type. All lists in NBT data are homogenous.
    #[error(
        "Encountered non-homogenous list: \
        expected 0x{list_type:X} but found 0x{encountered_type:X}"
    )]
    NonHomogenousList {
        /// The list type.
        list_type:        u8,
        /// The encountered type.
        encountered_type: u8,
    },
    /// The length of a string or sequence was too large to fit in the numeric type
    /// it needed to.
    #[error("Length of a string or sequential type must fit in a u16 or i32 respectively")]
    ExcessiveLength,
    /// The length of a sequence was negative.
    #[error("Length of a sequential type must be nonnegative, but found {0}")]
    NegativeLength(i32),
    /// An invalid tag ID was encountered.
    #[error("Encountered invalid tag ID 0x{0:X} during deserialization")]
    InvalidTagId(u8),
    /// The first tag ID was expected, but the second was found.
    #[error("Tag type mismatch: expected 0x{expected:X} but found 0x{found:X}")]
    TagTypeMismatch {
        /// The expected ID.
        expected: u8,
        /// The found ID.
        found:    u8,
    },
    /// An invalid CESU-8 string was encountered.
    #[error("Encountered invalid CESU-8 string")]
    InvalidCesu8String,
    /// An invalid UTF-8 string was encountered.
    #[error("Encountered invalid UTF-8 string")]
    InvalidUtf8String,
    /// Bytes were left over after the root compound.
    #[error("Found {remaining} unexpected bytes after the root compound")]
    TrailingData {
        remaining: usize,
    },
}
