use std::{borrow::Cow, fs, path::Path};

use log::debug;

use rnbt_nbt::NbtCompound;
use rnbt_nbt::io::{detect_compression, read_bedrock_header, read_nbt_bytes};
use rnbt_nbt::settings::{IoOptions, NbtCompression};

use crate::{errors::WorldError, file_kind::FileKind};
use crate::tag_compound::{CompoundOrigin, TagCompound};


const COMPOUND_ID: u8 = 0x0A;


/// A file holding a single root compound, such as a structure, schematic or `level.dat`.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtFile {
    pub kind:           FileKind,
    pub name:           String,
    pub root:           NbtCompound,
    /// The format version from the header of a Bedrock `level.dat`.
    pub bedrock_header: Option<i32>,
}

impl NbtFile {
    pub fn open<P: AsRef<Path>>(path: P, kind: FileKind) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            WorldError::Io(Cow::Owned(format!("reading {}", path.display())), err)
        })?;
        Self::from_bytes(&bytes, kind)
    }

    /// Parses the whole of `bytes` as one root compound.
    ///
    /// Java files may be gzip-compressed, zlib-compressed or uncompressed; the compression
    /// is detected from the first bytes. Bedrock structures are uncompressed little-endian
    /// NBT, and an uncompressed `level.dat` whose first 8 bytes are a valid Bedrock header
    /// is read as a Bedrock `level.dat`.
    pub fn from_bytes(bytes: &[u8], kind: FileKind) -> Result<Self, WorldError> {
        let compression = detect_compression(bytes);

        let bedrock_level_dat = kind == FileKind::LevelDat
            && compression == NbtCompression::Uncompressed
            && has_bedrock_header(bytes);

        let parse_context = || Cow::Owned(format!("parsing {kind} data"));

        if bedrock_level_dat {
            let opts = IoOptions::bedrock_uncompressed();
            let mut reader = bytes;
            let (format_version, declared_len) = read_bedrock_header(&mut reader, opts)
                .map_err(|err| WorldError::Nbt(Cow::Borrowed("reading Bedrock header"), err))?;

            debug!("Reading Bedrock level.dat with {declared_len} bytes of NBT");

            let (root, name) = read_nbt_bytes(reader, opts)
                .map_err(|err| WorldError::Nbt(parse_context(), err))?;

            return Ok(Self {
                kind,
                name,
                root,
                bedrock_header: Some(format_version),
            });
        }

        let opts = if kind == FileKind::BedrockStructure {
            IoOptions::bedrock_uncompressed()
        } else {
            IoOptions::java().with_compression(compression)
        };
        debug!("Reading {kind} file with {:?}", opts.compression);

        let (root, name) = read_nbt_bytes(bytes, opts)
            .map_err(|err| WorldError::Nbt(parse_context(), err))?;

        Ok(Self {
            kind,
            name,
            root,
            bedrock_header: None,
        })
    }

    #[inline]
    pub fn into_tag_compound(self) -> TagCompound {
        TagCompound::new(self.name, self.root, CompoundOrigin::File)
    }
}

/// Bedrock `level.dat` files start with a little-endian format version and the length
/// of the NBT data after the header. Java files start with the root compound's tag id.
fn has_bedrock_header(bytes: &[u8]) -> bool {
    let Some((&[_, _, _, _, a, b, c, d], body)) = bytes.split_first_chunk() else {
        return false;
    };
    usize::try_from(i32::from_le_bytes([a, b, c, d])).ok() == Some(body.len())
        && body.first() == Some(&COMPOUND_ID)
}
