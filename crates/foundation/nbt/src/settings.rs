use flate2::Compression;


// ================================
//      Limits
// ================================

/// The recursive NBT tags (Compounds and Lists) can be nested up to (and including)
/// 512 levels deep in the NBT Minecraft writes and accepts.
///
/// Note that this crate uses recursive functions to read and write NBT data;
/// if the limit is raised too high and unreasonably nested data is received,
/// a crash could occur from the nested function calls exceeding the maximum stack size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLimit(pub(crate) u32);

impl Default for DepthLimit {
    /// The maximum depth to which Minecraft nests NBT compounds and lists.
    fn default() -> Self {
        Self(512)
    }
}

impl DepthLimit {
    /// A limit on how deeply the recursive NBT tags (Compounds and Lists) may be nested.
    #[inline]
    pub fn new(limit: u32) -> Self {
        Self(limit)
    }

    #[inline]
    pub fn limit(self) -> u32 {
        self.0
    }
}


// ================================
//      IO Settings
// ================================

/// Encoding options for reading/writing NBT data from/to bytes (e.g. from/to a file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoOptions {
    /// [Endianness] of numeric NBT data and of string and sequence lengths.
    ///
    /// Bedrock Edition is LittleEndian, Java is BigEndian.
    ///
    /// [Endianness]: https://en.wikipedia.org/wiki/Endianness
    pub endianness: Endianness,
    /// Compression of NBT bytes.
    ///
    /// Default: Gzip compression with the default compression level.
    pub compression: NbtCompression,
    /// The byte encoding used by strings. Note that the NBT tags in this crate always
    /// use Rust's encoding, UTF-8.
    ///
    /// Default: CESU-8 for Java, UTF-8 for Bedrock
    pub string_encoding: StringEncoding,
    /// The maximum depth that NBT compounds and tags can be recursively nested.
    ///
    /// Default: 512, the limit used by Minecraft.
    pub depth_limit: DepthLimit,
    /// Whether [`read_nbt_bytes`] accepts bytes left over after the root compound.
    /// Some tools pad NBT files; Minecraft itself never does.
    ///
    /// Default: false.
    ///
    /// [`read_nbt_bytes`]: crate::io::read_nbt_bytes
    pub allow_trailing_data: bool,
}

impl IoOptions {
    /// Default Java encoding for NBT bytes
    #[inline]
    pub fn java() -> Self {
        Self {
            endianness:          Endianness::BigEndian,
            compression:         NbtCompression::GzipCompressed,
            string_encoding:     StringEncoding::Cesu8,
            depth_limit:         DepthLimit::default(),
            allow_trailing_data: false,
        }
    }

    /// Default Java encoding for NBT bytes, but with no compression
    #[inline]
    pub fn java_uncompressed() -> Self {
        Self {
            compression: NbtCompression::Uncompressed,
            ..Self::java()
        }
    }

    /// Default Bedrock encoding for NBT bytes
    #[inline]
    pub fn bedrock() -> Self {
        Self {
            endianness:          Endianness::LittleEndian,
            compression:         NbtCompression::GzipCompressed,
            string_encoding:     StringEncoding::Utf8,
            depth_limit:         DepthLimit::default(),
            allow_trailing_data: false,
        }
    }

    /// Default Bedrock encoding for NBT bytes, but with no compression.
    /// This is what `.mcstructure` files and `level.dat` (after its header) use.
    #[inline]
    pub fn bedrock_uncompressed() -> Self {
        Self {
            compression: NbtCompression::Uncompressed,
            ..Self::bedrock()
        }
    }

    /// Returns these options with the compression replaced.
    #[inline]
    pub fn with_compression(self, compression: NbtCompression) -> Self {
        Self {
            compression,
            ..self
        }
    }
}

/// [Endianness] of NBT bytes.
///
/// [Endianness]: https://en.wikipedia.org/wiki/Endianness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Used by Java
    BigEndian,
    /// Used by Bedrock
    LittleEndian,
}

/// Describes the compression options for NBT data:
/// uncompressed, Zlib-compressed and Gzip-compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NbtCompression {
    /// Uncompressed NBT data.
    Uncompressed,
    /// Zlib-compressed NBT data. When writing, the default compression level will be used.
    ZlibCompressed,
    /// Zlib-compressed NBT data with the given compression level.
    ZlibCompressedWith(CompressionLevel),
    /// Gzip-compressed NBT data. When writing, the default compression level will be used.
    GzipCompressed,
    /// Gzip-compressed NBT data with the given compression level.
    GzipCompressedWith(CompressionLevel),
}

/// A compression level from 0 (none) to 9 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// Returns `None` if `level` is above 9.
    #[inline]
    pub fn new(level: u8) -> Option<Self> {
        (level <= 9).then_some(Self(level))
    }

    #[inline]
    pub fn level(self) -> u8 {
        self.0
    }
}

impl From<Compression> for CompressionLevel {
    fn from(value: Compression) -> Self {
        // flate2 can report 10 with some backends; anything past 9 is clamped.
        Self(value.level().min(9) as u8)
    }
}

impl From<CompressionLevel> for Compression {
    fn from(value: CompressionLevel) -> Self {
        Self::new(u32::from(value.0))
    }
}

/// String encodings used by Minecraft. Java is CESU-8 (Java's "Modified UTF-8"),
/// Bedrock is UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    /// Used by Bedrock
    Utf8,
    /// Used by Java
    Cesu8,
}


// ================================
//      SNBT Options
// ================================

/// Options for converting NBT into SNBT text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnbtWriteOptions {
    /// The maximum depth that NBT compounds and tags can be recursively nested.
    /// Tags past the limit are replaced by a quoted message.
    ///
    /// Default: 512, the limit used by Minecraft.
    pub depth_limit: DepthLimit,
    /// How infinite and NaN floats and doubles are printed.
    ///
    /// Default: `PrintFloats`
    pub non_finite: WriteNonFinite,
}

impl Default for SnbtWriteOptions {
    #[inline]
    fn default() -> Self {
        Self {
            depth_limit: DepthLimit::default(),
            non_finite:  WriteNonFinite::PrintFloats,
        }
    }
}

/// NBT isn't meant to contain infinite or NaN floats, but they do turn up.
/// Minecraft Java prints a positive infinite double as `Infinityd` (see MC-200070),
/// which reads back as a string rather than a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteNonFinite {
    /// Replace infinities with the largest finite values of the same sign,
    /// and print NaN as `NaN`.
    PrintFloats,
    /// Print `Infinity`, `-Infinity` or `NaN` followed by the type suffix, as Minecraft does.
    PrintStrings,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let java = IoOptions::java_uncompressed();
        assert_eq!(java.endianness, Endianness::BigEndian);
        assert_eq!(java.string_encoding, StringEncoding::Cesu8);
        assert_eq!(java.compression, NbtCompression::Uncompressed);
        assert_eq!(java.depth_limit.limit(), 512);

        let bedrock = IoOptions::bedrock();
        assert_eq!(bedrock.endianness, Endianness::LittleEndian);
        assert_eq!(bedrock.compression, NbtCompression::GzipCompressed);
    }

    #[test]
    fn compression_levels() {
        assert_eq!(CompressionLevel::new(10), None);
        let level = CompressionLevel::new(6).expect("6 is a valid level");
        assert_eq!(Compression::from(level).level(), 6);
        assert_eq!(CompressionLevel::from(Compression::best()).level(), 9);
    }
}
