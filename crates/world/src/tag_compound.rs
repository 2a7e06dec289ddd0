use std::fmt;
use std::fmt::{Display, Formatter};

use rnbt_mc_datatypes::ChunkPosition;
use rnbt_nbt::{NbtCompound, NbtTag};


/// A named root compound loaded from a file.
///
/// Plain NBT files hold one of these; region files hold one per stored chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct TagCompound {
    /// The root name. Usually empty for chunks and most files written by the game.
    pub name:   String,
    pub root:   NbtCompound,
    pub origin: CompoundOrigin,
}

/// Where in its file a [`TagCompound`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOrigin {
    /// The whole file is the compound.
    File,
    /// A chunk of a region file. The timestamp is in seconds since the Unix epoch.
    Chunk {
        position:  ChunkPosition,
        timestamp: u32,
    },
}

impl TagCompound {
    #[inline]
    pub fn new(name: String, root: NbtCompound, origin: CompoundOrigin) -> Self {
        Self { name, root, origin }
    }

    /// The position of the chunk this compound was read from, if any.
    #[inline]
    pub fn chunk_position(&self) -> Option<ChunkPosition> {
        match self.origin {
            CompoundOrigin::Chunk { position, .. } => Some(position),
            CompoundOrigin::File                   => None,
        }
    }
}

impl Display for TagCompound {
    /// Writes `name: {...}` with the root as SNBT; the alternate flag pretty-prints the root.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = NbtTag::string_to_snbt(&self.name);
        if f.alternate() {
            write!(f, "{name}: {:#}", self.root)
        } else {
            write!(f, "{name}: {}", self.root)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let mut root = NbtCompound::new();
        root.insert("id", 1_i8);

        let compound = TagCompound::new("hello world".to_owned(), root, CompoundOrigin::File);
        assert_eq!(compound.to_string(), "\"hello world\": {id:1B}");
        assert_eq!(format!("{compound:#}"), "\"hello world\": {\n    id: 1B\n}");
        assert_eq!(compound.chunk_position(), None);
    }
}
