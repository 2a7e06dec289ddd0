//! Loading of Minecraft data files into NBT compounds.
//!
//! Region files (`.mca`, `.mcr`), standalone NBT files (structures, schematics, `level.dat`,
//! Bedrock `.mcstructure`) and this crate's own JSON exports are all loaded through
//! [`load_binary`] into a [`McWorldDescriptor`], which holds the root compounds of the file
//! and the game version they were written with.

mod descriptor;
mod errors;
mod file_kind;
mod json;
mod nbt_file;
mod region;
mod tag_compound;
mod version;


pub use self::descriptor::{LoadOptions, McWorldDescriptor, load_binary};
pub use self::errors::WorldError;
pub use self::file_kind::FileKind;
pub use self::json::{json_string, read_json, write_json};
pub use self::nbt_file::NbtFile;
pub use self::region::{ChunkCompression, ChunkLocation, RegionFile};
pub use self::tag_compound::{CompoundOrigin, TagCompound};
pub use self::version::{McVersion, release_for_data_version};
