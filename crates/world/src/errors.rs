use std::{borrow::Cow, io, path::PathBuf};

use thiserror::Error;

use rnbt_nbt::io::NbtIoError;


/// Errors that may occur while loading, converting or saving Minecraft files.
#[derive(Error, Debug)]
pub enum WorldError {
    // Context messages should be present participles, e.g. "reading r.0.0.mca"
    #[error("error while {0}: {1}")]
    Io(Cow<'static, str>, io::Error),
    #[error("error while {0}: {1}")]
    Nbt(Cow<'static, str>, NbtIoError),
    #[error("error while {0}: {1}")]
    Json(Cow<'static, str>, serde_json::Error),

    #[error("region file is {len} bytes long, too short for its 8192-byte header")]
    TruncatedHeader {
        len: usize,
    },
    #[error("region {x}, {z} is too far out for its chunk coordinates to fit in an i32")]
    RegionOutOfRange {
        x: i32,
        z: i32,
    },
    #[error("chunk {0} is not a valid chunk slot; region files have 1024")]
    InvalidChunkIndex(usize),
    #[error("chunk {index} points outside of its region file or its allocated sectors")]
    ChunkOutOfBounds {
        index: usize,
    },
    #[error("chunk {index} has a length of zero")]
    EmptyChunk {
        index: usize,
    },
    #[error("chunk {index} uses compression {id} (LZ4), which is not supported")]
    UnsupportedCompression {
        index: usize,
        id:    u8,
    },
    #[error("chunk {index} uses unknown compression {id}")]
    UnknownCompression {
        index: usize,
        id:    u8,
    },
    #[error("chunk {index} is stored in an external .mcc file, but the region's folder is unknown")]
    ExternalChunkUnavailable {
        index: usize,
    },
    #[error("{} is not a recognised Minecraft file", .0.display())]
    UnsupportedFile(PathBuf),
    #[error("{0}")]
    InvalidJson(Cow<'static, str>),
    #[error("expected exactly one compound to write as NBT, but the document has {count}")]
    MultipleCompounds {
        count: usize,
    },
}
