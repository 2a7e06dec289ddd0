use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::Path;

use rnbt_nbt::{io::detect_compression, settings::NbtCompression};
use rnbt_util::lowercase_extension;


const REGION_SECTOR_LEN: usize = 4096;
const COMPOUND_ID: u8 = 0x0A;


/// The kinds of file that can be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Anvil region file, `.mca`
    Region,
    /// Pre-Anvil region file, `.mcr`
    McRegion,
    /// Any standalone Java NBT file, `.nbt` (e.g. structure block files)
    Nbt,
    /// Litematica schematic, `.litematic`
    Litematic,
    /// Sponge or MCEdit schematic, `.schem` / `.schematic`
    Schematic,
    /// `level.dat` of a Java or Bedrock world, also `level.dat_old`
    LevelDat,
    /// Bedrock structure file, `.mcstructure`
    BedrockStructure,
    /// A JSON export written by this crate
    Json,
}

impl FileKind {
    /// Decides the kind of a file by its extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        Some(match lowercase_extension(path)?.as_str() {
            "mca"                 => Self::Region,
            "mcr"                 => Self::McRegion,
            "nbt"                 => Self::Nbt,
            "litematic"           => Self::Litematic,
            "schem" | "schematic" => Self::Schematic,
            "dat" | "dat_old"     => Self::LevelDat,
            "mcstructure"         => Self::BedrockStructure,
            "json"                => Self::Json,
            _ => return None,
        })
    }

    /// Guesses the kind of a file from its contents, for files whose extension
    /// is missing or unknown.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if detect_compression(bytes) != NbtCompression::Uncompressed
            || bytes.first() == Some(&COMPOUND_ID)
        {
            return Some(Self::Nbt);
        }

        if bytes.iter().find(|byte| !byte.is_ascii_whitespace()) == Some(&b'{') {
            return Some(Self::Json);
        }

        if !bytes.is_empty() && bytes.len() % REGION_SECTOR_LEN == 0 {
            return Some(Self::Region);
        }

        None
    }

    /// Whether files of this kind hold many chunks rather than one compound.
    #[inline]
    pub fn is_region(self) -> bool {
        matches!(self, Self::Region | Self::McRegion)
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Self::Region           => "region",
            Self::McRegion         => "McRegion region",
            Self::Nbt              => "NBT",
            Self::Litematic        => "Litematica schematic",
            Self::Schematic        => "schematic",
            Self::LevelDat         => "level.dat",
            Self::BedrockStructure => "Bedrock structure",
            Self::Json             => "JSON",
        }
    }
}

impl Display for FileKind {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions() {
        let kind = |path: &str| FileKind::from_path(Path::new(path));

        assert_eq!(kind("region/r.0.-1.mca"), Some(FileKind::Region));
        assert_eq!(kind("r.0.0.MCR"), Some(FileKind::McRegion));
        assert_eq!(kind("house.litematic"), Some(FileKind::Litematic));
        assert_eq!(kind("house.schem"), Some(FileKind::Schematic));
        assert_eq!(kind("level.dat_old"), Some(FileKind::LevelDat));
        assert_eq!(kind("tree.mcstructure"), Some(FileKind::BedrockStructure));
        assert_eq!(kind("dump.json"), Some(FileKind::Json));
        assert_eq!(kind("notes.txt"), None);
        assert_eq!(kind("level"), None);
    }

    #[test]
    fn sniffing() {
        assert_eq!(FileKind::sniff(&[0x1F, 0x8B, 0x08]), Some(FileKind::Nbt));
        assert_eq!(FileKind::sniff(&[0x78, 0x9C]), Some(FileKind::Nbt));
        assert_eq!(FileKind::sniff(&[0x0A, 0x00, 0x00, 0x00]), Some(FileKind::Nbt));
        assert_eq!(FileKind::sniff(b"  \n{\"compounds\": []}"), Some(FileKind::Json));
        assert_eq!(FileKind::sniff(&[0; 8192]), Some(FileKind::Region));
        assert_eq!(FileKind::sniff(&[0; 100]), None);
        assert_eq!(FileKind::sniff(&[]), None);
    }
}
