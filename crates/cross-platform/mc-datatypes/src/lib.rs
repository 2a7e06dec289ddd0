//! Small value types describing where Minecraft data lives and which game version wrote it.

mod positions;
mod version;


pub use self::positions::{ChunkPosition, RegionPosition, CHUNKS_PER_REGION, REGION_WIDTH};
pub use self::version::{NumericVersion, ParseVersionError, VersionName};
