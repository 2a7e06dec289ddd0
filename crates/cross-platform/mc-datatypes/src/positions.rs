/// Region files are square grids of chunks, this many chunks on a side.
pub const REGION_WIDTH: i32 = 32;
/// The number of chunk slots in a region file.
pub const CHUNKS_PER_REGION: usize = 1024;


/// The location of a chunk in a dimension of a world.
///
/// Note that this is not the block position;
/// multiply this position by 16 to find the positions of its blocks. For example
/// `ChunkPosition { x: 1, z: 2 }` refers to the chunk from `(16, 32)` to `(31, 47)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

impl ChunkPosition {
    /// The region file containing this chunk.
    #[inline]
    pub fn region(self) -> RegionPosition {
        RegionPosition {
            x: self.x.div_euclid(REGION_WIDTH),
            z: self.z.div_euclid(REGION_WIDTH),
        }
    }

    /// The slot of this chunk in its region file's header, `x + 32 * z` in local coordinates.
    #[inline]
    pub fn index_in_region(self) -> usize {
        let local_x = self.x.rem_euclid(REGION_WIDTH).unsigned_abs() as usize;
        let local_z = self.z.rem_euclid(REGION_WIDTH).unsigned_abs() as usize;
        local_x + local_z * (REGION_WIDTH as usize)
    }
}

/// The location of a region file, in units of 32 chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionPosition {
    pub x: i32,
    pub z: i32,
}

impl RegionPosition {
    /// Parses region file names of the form `r.<x>.<z>.mca` (or `.mcr`).
    ///
    /// Any extension is accepted; only the `r.<x>.<z>` stem matters. Regions whose chunk
    /// coordinates would not fit in an `i32` are rejected.
    pub fn parse_file_name(file_name: &str) -> Option<Self> {
        let mut parts = file_name.split('.');

        if parts.next()? != "r" {
            return None;
        }
        let x = parts.next()?.parse().ok()?;
        let z = parts.next()?.parse().ok()?;

        let region = Self { x, z };
        region.chunk_position(0)?;
        region.chunk_position(CHUNKS_PER_REGION - 1)?;
        Some(region)
    }

    /// The chunk stored at the given slot of this region's header.
    ///
    /// Returns `None` if `index` is not below [`CHUNKS_PER_REGION`], or if the chunk's
    /// coordinates overflow an `i32`.
    pub fn chunk_position(self, index: usize) -> Option<ChunkPosition> {
        if index >= CHUNKS_PER_REGION {
            return None;
        }

        // Both are below 32 after the check above
        let local_x = i32::try_from(index % 32).ok()?;
        let local_z = i32::try_from(index / 32).ok()?;

        Some(ChunkPosition {
            x: self.x.checked_mul(REGION_WIDTH)?.checked_add(local_x)?,
            z: self.z.checked_mul(REGION_WIDTH)?.checked_add(local_z)?,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_region_names() {
        assert_eq!(
            RegionPosition::parse_file_name("r.-1.2.mca"),
            Some(RegionPosition { x: -1, z: 2 }),
        );
        assert_eq!(
            RegionPosition::parse_file_name("r.0.0.mcr"),
            Some(RegionPosition { x: 0, z: 0 }),
        );
        assert_eq!(RegionPosition::parse_file_name("c.0.0.mcc"), None);
        assert_eq!(RegionPosition::parse_file_name("r.a.0.mca"), None);
        assert_eq!(RegionPosition::parse_file_name("r.3"), None);
    }

    #[test]
    fn chunk_slots() {
        let region = RegionPosition { x: -1, z: 2 };

        assert_eq!(region.chunk_position(0), Some(ChunkPosition { x: -32, z: 64 }));
        assert_eq!(region.chunk_position(33), Some(ChunkPosition { x: -31, z: 65 }));
        assert_eq!(region.chunk_position(1023), Some(ChunkPosition { x: -1, z: 95 }));
        assert_eq!(region.chunk_position(1024), None);
    }

    #[test]
    fn chunk_coordinates_must_fit() {
        // 67_108_864 * 32 is one past i32::MAX
        assert_eq!(RegionPosition { x: 67_108_864, z: 0 }.chunk_position(0), None);
        assert_eq!(RegionPosition { x: 0, z: i32::MIN }.chunk_position(0), None);

        let last = RegionPosition { x: 67_108_863, z: -67_108_864 };
        assert_eq!(
            last.chunk_position(0),
            Some(ChunkPosition { x: i32::MAX - 31, z: i32::MIN }),
        );
        assert_eq!(
            last.chunk_position(1023),
            Some(ChunkPosition { x: i32::MAX, z: i32::MIN + 31 }),
        );

        assert_eq!(RegionPosition::parse_file_name("r.67108864.0.mca"), None);
        assert_eq!(RegionPosition::parse_file_name("r.0.-67108865.mca"), None);
        assert_eq!(RegionPosition::parse_file_name("r.67108863.-67108864.mca"), Some(last));
    }

    #[test]
    fn chunks_know_their_region() {
        let chunk = ChunkPosition { x: -1, z: 95 };
        assert_eq!(chunk.region(), RegionPosition { x: -1, z: 2 });
        assert_eq!(chunk.index_in_region(), 1023);

        let chunk = ChunkPosition { x: 32, z: 0 };
        assert_eq!(chunk.region(), RegionPosition { x: 1, z: 0 });
        assert_eq!(chunk.index_in_region(), 0);
    }
}
