//! Reading of Java Edition region files (`.mca` and the older `.mcr`).
//!
//! A region file starts with two 4096-byte tables of 1024 entries each. Entry `x + 32 * z`
//! of the first table locates the chunk at local position `(x, z)`: a 3-byte big-endian
//! offset and a 1-byte length, both counted in 4096-byte sectors. The second table
//! holds the chunks' last-saved timestamps.
//!
//! Each stored chunk begins with a big-endian `u32` length (counting the compression byte
//! that follows it), a compression byte, then the compressed NBT compound.

use std::{borrow::Cow, fs};
use std::io::Read as _;
use std::path::{Path, PathBuf};

use flate2::read::{GzDecoder, ZlibDecoder};
use log::{debug, warn};

use rnbt_mc_datatypes::{CHUNKS_PER_REGION, ChunkPosition, RegionPosition};
use rnbt_nbt::{io::read_nbt_bytes, settings::IoOptions};
use rnbt_util::InspectNone as _;

use crate::{descriptor::LoadOptions, errors::WorldError};
use crate::tag_compound::{CompoundOrigin, TagCompound};


const SECTOR_LEN: usize = 4096;
const HEADER_LEN: usize = 2 * SECTOR_LEN;
/// Length prefix and compression byte
const CHUNK_HEADER_LEN: usize = 5;
/// Set in the compression byte when the chunk is stored in its own `.mcc` file.
const EXTERNAL_FLAG: u8 = 0x80;


/// The location of a chunk in its region file, in 4096-byte sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLocation {
    pub sector_offset: u32,
    pub sector_count:  u8,
}

impl ChunkLocation {
    #[inline]
    fn from_entry(entry: [u8; 4]) -> Self {
        let [a, b, c, sector_count] = entry;
        Self {
            sector_offset: u32::from_be_bytes([0, a, b, c]),
            sector_count,
        }
    }

    /// Whether a chunk is stored here. Either field being zero marks an empty slot.
    #[inline]
    pub fn is_present(self) -> bool {
        self.sector_offset != 0 && self.sector_count != 0
    }
}

/// The compression of a stored chunk, from the byte after its length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCompression {
    Gzip,
    Zlib,
    Uncompressed,
}

impl ChunkCompression {
    fn from_id(index: usize, id: u8) -> Result<Self, WorldError> {
        match id {
            1 => Ok(Self::Gzip),
            2 => Ok(Self::Zlib),
            3 => Ok(Self::Uncompressed),
            4 => Err(WorldError::UnsupportedCompression { index, id }),
            _ => Err(WorldError::UnknownCompression { index, id }),
        }
    }

    fn decompress<'a>(self, payload: &'a [u8]) -> std::io::Result<Cow<'a, [u8]>> {
        let mut decompressed = Vec::new();
        match self {
            Self::Gzip         => GzDecoder::new(payload).read_to_end(&mut decompressed)?,
            Self::Zlib         => ZlibDecoder::new(payload).read_to_end(&mut decompressed)?,
            Self::Uncompressed => return Ok(Cow::Borrowed(payload)),
        };
        Ok(Cow::Owned(decompressed))
    }
}

fn sectors_to_bytes(sectors: u32) -> Option<usize> {
    usize::try_from(sectors).ok()?.checked_mul(SECTOR_LEN)
}

/// A region file held in memory.
#[derive(Debug, Clone)]
pub struct RegionFile {
    bytes:        Vec<u8>,
    position:     Option<RegionPosition>,
    /// Folder holding the `c.<x>.<z>.mcc` files of oversized chunks.
    external_dir: Option<PathBuf>,
    /// Empty for an empty file, else one entry per chunk slot.
    locations:    Vec<ChunkLocation>,
    timestamps:   Vec<u32>,
}

impl RegionFile {
    /// Reads the region file at `path`. Its position is taken from its file name
    /// (`r.<x>.<z>.mca`) if possible, and chunks stored in external `.mcc` files are
    /// looked up next to it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            WorldError::Io(Cow::Owned(format!("reading {}", path.display())), err)
        })?;
        Self::from_file_bytes(bytes, path)
    }

    pub(crate) fn from_file_bytes(bytes: Vec<u8>, path: &Path) -> Result<Self, WorldError> {
        let position = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(RegionPosition::parse_file_name)
            .inspect_none(|| debug!(
                "{} is not named like a region file; using region 0, 0",
                path.display(),
            ));

        let mut region = Self::from_bytes(bytes, position)?;
        region.external_dir = path.parent().map(Path::to_path_buf);
        Ok(region)
    }

    /// Parses the header of an in-memory region file. Chunk positions are computed from
    /// `position`, or relative to region `(0, 0)` when it is unknown.
    ///
    /// An empty buffer is an empty region, which the game writes for regions
    /// it created but never saved chunks to.
    pub fn from_bytes(bytes: Vec<u8>, position: Option<RegionPosition>) -> Result<Self, WorldError> {
        if let Some(region) = position {
            let first = region.chunk_position(0);
            let last = region.chunk_position(CHUNKS_PER_REGION - 1);
            if first.is_none() || last.is_none() {
                return Err(WorldError::RegionOutOfRange { x: region.x, z: region.z });
            }
        }

        let (locations, timestamps) = if bytes.is_empty() {
            (Vec::new(), Vec::new())
        } else if bytes.len() < HEADER_LEN {
            return Err(WorldError::TruncatedHeader { len: bytes.len() });
        } else {
            let (location_table, rest) = bytes.split_at(SECTOR_LEN);
            let timestamp_table = &rest[..SECTOR_LEN];

            let locations = location_table
                .chunks_exact(4)
                .map(|entry| ChunkLocation::from_entry([entry[0], entry[1], entry[2], entry[3]]))
                .collect();
            let timestamps = timestamp_table
                .chunks_exact(4)
                .map(|entry| u32::from_be_bytes([entry[0], entry[1], entry[2], entry[3]]))
                .collect();

            (locations, timestamps)
        };

        Ok(Self {
            bytes,
            position,
            external_dir: None,
            locations,
            timestamps,
        })
    }

    /// The position of this region, if known.
    #[inline]
    pub fn position(&self) -> Option<RegionPosition> {
        self.position
    }

    /// The number of chunks stored in this region.
    pub fn chunk_count(&self) -> usize {
        self.locations
            .iter()
            .filter(|location| location.is_present())
            .count()
    }

    /// The location table, indexed by `x + 32 * z` in local chunk coordinates.
    /// Empty for an empty file.
    #[inline]
    pub fn chunk_locations(&self) -> &[ChunkLocation] {
        &self.locations
    }

    /// The last time the chunk at `index` was saved, in seconds since the Unix epoch.
    #[inline]
    pub fn timestamp(&self, index: usize) -> Option<u32> {
        self.timestamps.get(index).copied()
    }

    /// The position of the chunk stored at `index`.
    #[inline]
    pub fn chunk_position(&self, index: usize) -> Option<ChunkPosition> {
        self.position
            .unwrap_or(RegionPosition { x: 0, z: 0 })
            .chunk_position(index)
    }

    /// Returns the decompressed NBT bytes of the chunk at `index`, or `None` if no chunk
    /// is stored there.
    pub fn read_chunk_bytes(&self, index: usize) -> Result<Option<Vec<u8>>, WorldError> {
        if index >= CHUNKS_PER_REGION {
            return Err(WorldError::InvalidChunkIndex(index));
        }
        let Some(&location) = self.locations.get(index).filter(|location| location.is_present())
        else {
            return Ok(None);
        };

        let out_of_bounds = || WorldError::ChunkOutOfBounds { index };

        let start = sectors_to_bytes(location.sector_offset).ok_or_else(out_of_bounds)?;
        let allocated = usize::from(location.sector_count) * SECTOR_LEN;
        if start < HEADER_LEN {
            return Err(out_of_bounds());
        }

        let record = self.bytes.get(start..).ok_or_else(out_of_bounds)?;
        let Some((&[a, b, c, d, compression_byte], rest)) = record.split_first_chunk() else {
            return Err(out_of_bounds());
        };

        // `len` counts the compression byte
        let len = usize::try_from(u32::from_be_bytes([a, b, c, d])).ok().ok_or_else(out_of_bounds)?;
        if len == 0 {
            return Err(WorldError::EmptyChunk { index });
        }
        if len.saturating_add(4) > allocated {
            return Err(out_of_bounds());
        }

        let compression = ChunkCompression::from_id(index, compression_byte & !EXTERNAL_FLAG)?;

        let payload = if compression_byte & EXTERNAL_FLAG != 0 {
            Cow::Owned(self.read_external_chunk(index)?)
        } else {
            Cow::Borrowed(rest.get(..len - 1).ok_or_else(out_of_bounds)?)
        };

        let decompressed = compression.decompress(&payload).map_err(|err| {
            WorldError::Io(Cow::Owned(format!("decompressing chunk {index}")), err)
        })?;

        Ok(Some(decompressed.into_owned()))
    }

    fn read_external_chunk(&self, index: usize) -> Result<Vec<u8>, WorldError> {
        let (Some(dir), Some(position)) = (&self.external_dir, self.chunk_position(index)) else {
            return Err(WorldError::ExternalChunkUnavailable { index });
        };

        let path = dir.join(format!("c.{}.{}.mcc", position.x, position.z));
        debug!("Reading chunk {index} from {}", path.display());

        fs::read(&path).map_err(|err| {
            WorldError::Io(Cow::Owned(format!("reading {}", path.display())), err)
        })
    }

    /// Reads and parses the chunk at `index`, or returns `None` if no chunk is stored there.
    pub fn read_chunk(&self, index: usize) -> Result<Option<TagCompound>, WorldError> {
        let Some(bytes) = self.read_chunk_bytes(index)? else {
            return Ok(None);
        };

        let (root, name) = read_nbt_bytes(&bytes, IoOptions::java_uncompressed())
            .map_err(|err| WorldError::Nbt(Cow::Owned(format!("parsing chunk {index}")), err))?;

        let origin = CompoundOrigin::Chunk {
            position:  self.chunk_position(index).ok_or(WorldError::InvalidChunkIndex(index))?,
            timestamp: self.timestamp(index).unwrap_or(0),
        };

        Ok(Some(TagCompound::new(name, root, origin)))
    }

    /// Reads every stored chunk, in slot order.
    ///
    /// With `opts.skip_invalid_chunks`, chunks that fail to read are logged and left out;
    /// otherwise the first failure is returned.
    pub fn to_compounds_list(&self, opts: LoadOptions) -> Result<Vec<TagCompound>, WorldError> {
        let mut compounds = Vec::with_capacity(self.chunk_count());

        for index in 0..self.locations.len() {
            match self.read_chunk(index) {
                Ok(Some(compound)) => compounds.push(compound),
                Ok(None) => {}
                Err(err) if opts.skip_invalid_chunks => {
                    warn!("Skipping chunk {index}: {err}");
                }
                Err(err) => return Err(err),
            }
        }

        debug!("Read {} chunks", compounds.len());
        Ok(compounds)
    }
}


#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use flate2::{Compression, write::ZlibEncoder};

    use rnbt_nbt::{NbtCompound, io::write_nbt};
    use super::*;

    fn chunk_nbt(data_version: i32) -> Vec<u8> {
        let mut root = NbtCompound::new();
        root.insert("DataVersion", data_version);
        let mut bytes = Vec::new();
        write_nbt(&mut bytes, IoOptions::java_uncompressed(), None, &root)
            .expect("writing to a Vec");
        bytes
    }

    fn zlib(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).expect("writing to a Vec");
        encoder.finish().expect("writing to a Vec")
    }

    /// A region with one sector per chunk, in the order given.
    fn region_bytes(chunks: &[(usize, u8, Vec<u8>)]) -> Vec<u8> {
        let mut bytes = vec![0; HEADER_LEN];

        for (sector, (index, compression, payload)) in chunks.iter().enumerate() {
            let (index, compression) = (*index, *compression);
            let offset = u32::try_from(2 + sector).expect("small test regions");
            let entry = offset.to_be_bytes();
            bytes[index * 4..index * 4 + 4].copy_from_slice(&[entry[1], entry[2], entry[3], 1]);
            bytes[SECTOR_LEN + index * 4..SECTOR_LEN + index * 4 + 4]
                .copy_from_slice(&1_700_000_000_u32.to_be_bytes());

            let len = u32::try_from(payload.len() + 1).expect("small test chunks");
            let mut sector_bytes = Vec::with_capacity(SECTOR_LEN);
            sector_bytes.extend_from_slice(&len.to_be_bytes());
            sector_bytes.push(compression);
            sector_bytes.extend_from_slice(payload);
            sector_bytes.resize(SECTOR_LEN, 0);
            bytes.extend_from_slice(&sector_bytes);
        }

        bytes
    }

    #[test]
    fn empty_file_has_no_chunks() {
        let region = RegionFile::from_bytes(Vec::new(), None).expect("empty regions are valid");
        assert_eq!(region.chunk_count(), 0);
        assert!(region.chunk_locations().is_empty());
        assert!(matches!(region.read_chunk(0), Ok(None)));
        assert!(region.to_compounds_list(LoadOptions::default()).expect("empty").is_empty());
    }

    #[test]
    fn truncated_header() {
        assert!(matches!(
            RegionFile::from_bytes(vec![0; 5000], None),
            Err(WorldError::TruncatedHeader { len: 5000 }),
        ));
    }

    #[test]
    fn reads_chunks_in_slot_order() {
        let zlib_chunk = zlib(&chunk_nbt(3700));
        let plain_chunk = chunk_nbt(3465);
        let bytes = region_bytes(&[(33, 2, zlib_chunk), (1, 3, plain_chunk)]);

        let region = RegionFile::from_bytes(bytes, Some(RegionPosition { x: -1, z: 0 }))
            .expect("valid header");
        assert_eq!(region.chunk_count(), 2);
        assert_eq!(region.timestamp(33), Some(1_700_000_000));
        assert_eq!(region.timestamp(0), Some(0));

        let compounds = region.to_compounds_list(LoadOptions::default()).expect("valid chunks");
        assert_eq!(compounds.len(), 2);

        assert_eq!(compounds[0].root.get::<_, i32>("DataVersion").ok(), Some(3465));
        assert_eq!(
            compounds[0].origin,
            CompoundOrigin::Chunk {
                position:  ChunkPosition { x: -31, z: 0 },
                timestamp: 1_700_000_000,
            },
        );
        assert_eq!(compounds[1].root.get::<_, i32>("DataVersion").ok(), Some(3700));
        assert_eq!(compounds[1].chunk_position(), Some(ChunkPosition { x: -31, z: 1 }));
    }

    #[test]
    fn compression_ids() {
        let payload = chunk_nbt(1);
        let bytes = region_bytes(&[(0, 4, payload.clone()), (1, 9, payload.clone()), (2, 0, payload)]);
        let region = RegionFile::from_bytes(bytes, None).expect("valid header");

        assert!(matches!(
            region.read_chunk(0),
            Err(WorldError::UnsupportedCompression { index: 0, id: 4 }),
        ));
        assert!(matches!(
            region.read_chunk(1),
            Err(WorldError::UnknownCompression { index: 1, id: 9 }),
        ));
        assert!(matches!(
            region.read_chunk(2),
            Err(WorldError::UnknownCompression { index: 2, id: 0 }),
        ));
    }

    #[test]
    fn skipping_invalid_chunks() {
        let good = chunk_nbt(2586);
        let bytes = region_bytes(&[(0, 9, good.clone()), (5, 3, good)]);
        let region = RegionFile::from_bytes(bytes, None).expect("valid header");

        assert!(region.to_compounds_list(LoadOptions::default()).is_err());

        let opts = LoadOptions { skip_invalid_chunks: true };
        let compounds = region.to_compounds_list(opts).expect("the bad chunk is skipped");
        assert_eq!(compounds.len(), 1);
        assert_eq!(compounds[0].chunk_position(), Some(ChunkPosition { x: 5, z: 0 }));
    }

    #[test]
    fn bad_locations() {
        let mut bytes = region_bytes(&[(0, 3, chunk_nbt(1))]);
        // Slot 1 points into the header
        bytes[4..8].copy_from_slice(&[0, 0, 1, 1]);
        // Slot 2 points past the end of the file
        bytes[8..12].copy_from_slice(&[0, 0, 9, 1]);
        let region = RegionFile::from_bytes(bytes, None).expect("valid header");

        assert!(matches!(region.read_chunk(1), Err(WorldError::ChunkOutOfBounds { index: 1 })));
        assert!(matches!(region.read_chunk(2), Err(WorldError::ChunkOutOfBounds { index: 2 })));
        assert!(matches!(region.read_chunk(3), Ok(None)));
        assert!(matches!(region.read_chunk(1024), Err(WorldError::InvalidChunkIndex(1024))));
    }

    #[test]
    fn far_out_regions() {
        let bytes = region_bytes(&[(0, 3, chunk_nbt(1))]);

        let far_out = RegionPosition { x: 67_108_864, z: 0 };
        assert!(matches!(
            RegionFile::from_bytes(bytes.clone(), Some(far_out)),
            Err(WorldError::RegionOutOfRange { x: 67_108_864, z: 0 }),
        ));

        let edge = RegionPosition { x: 67_108_863, z: -67_108_864 };
        let region = RegionFile::from_bytes(bytes, Some(edge)).expect("the last region that fits");
        assert_eq!(
            region.chunk_position(1023),
            Some(ChunkPosition { x: i32::MAX, z: i32::MIN + 31 }),
        );
        let chunk = region.read_chunk(0).expect("valid chunk").expect("slot 0 holds a chunk");
        assert_eq!(
            chunk.chunk_position(),
            Some(ChunkPosition { x: i32::MAX - 31, z: i32::MIN }),
        );
    }

    #[test]
    fn bad_lengths() {
        let mut bytes = region_bytes(&[(0, 3, chunk_nbt(1)), (1, 3, chunk_nbt(1))]);
        // Chunk 0 claims a length of zero
        bytes[HEADER_LEN..HEADER_LEN + 4].copy_from_slice(&[0, 0, 0, 0]);
        // Chunk 1 claims more than its single sector
        let second = HEADER_LEN + SECTOR_LEN;
        bytes[second..second + 4].copy_from_slice(&5000_u32.to_be_bytes());
        let region = RegionFile::from_bytes(bytes, None).expect("valid header");

        assert!(matches!(region.read_chunk(0), Err(WorldError::EmptyChunk { index: 0 })));
        assert!(matches!(region.read_chunk(1), Err(WorldError::ChunkOutOfBounds { index: 1 })));
    }

    #[test]
    fn external_chunks_need_a_folder() {
        let bytes = region_bytes(&[(0, 0x82, Vec::new())]);
        let region = RegionFile::from_bytes(bytes, None).expect("valid header");
        assert!(matches!(
            region.read_chunk(0),
            Err(WorldError::ExternalChunkUnavailable { index: 0 }),
        ));
    }
}
