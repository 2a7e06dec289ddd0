use std::{borrow::Cow, fs, slice};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use rnbt_nbt::{io::write_nbt, settings::IoOptions};

use crate::{errors::WorldError, file_kind::FileKind, nbt_file::NbtFile, region::RegionFile};
use crate::json::{json_string, read_json, write_json};
use crate::tag_compound::TagCompound;
use crate::version::McVersion;


/// Options for loading files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Leave out region chunks that fail to read, logging a warning for each,
    /// instead of failing the whole file.
    ///
    /// Default: false.
    pub skip_invalid_chunks: bool,
}

/// A loaded file: its root compounds and the game version that wrote them.
#[derive(Debug, Clone, PartialEq)]
pub struct McWorldDescriptor {
    input_path:    Option<PathBuf>,
    kind:          FileKind,
    version:       McVersion,
    tag_compounds: Vec<TagCompound>,
}

impl McWorldDescriptor {
    /// Loads the file at `path` with the default [`LoadOptions`].
    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WorldError> {
        Self::load_with_options(path, LoadOptions::default())
    }

    /// Loads the file at `path`. Its kind is decided by its extension, or else by its contents.
    pub fn load_with_options<P: AsRef<Path>>(path: P, opts: LoadOptions) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            WorldError::Io(Cow::Owned(format!("reading {}", path.display())), err)
        })?;

        let kind = FileKind::from_path(path)
            .or_else(|| FileKind::sniff(&bytes))
            .ok_or_else(|| WorldError::UnsupportedFile(path.to_path_buf()))?;
        debug!("Loading {} as a {kind} file", path.display());

        let (tag_compounds, version) = match kind {
            FileKind::Region | FileKind::McRegion => {
                let region = RegionFile::from_file_bytes(bytes, path)?;
                let compounds = region.to_compounds_list(opts)?;
                let version = McVersion::detect(&compounds);
                (compounds, version)
            }
            FileKind::Json => read_json(&bytes)?,
            FileKind::Nbt
            | FileKind::Litematic
            | FileKind::Schematic
            | FileKind::LevelDat
            | FileKind::BedrockStructure => {
                let compounds = vec![NbtFile::from_bytes(&bytes, kind)?.into_tag_compound()];
                let version = McVersion::detect(&compounds);
                (compounds, version)
            }
        };

        Ok(Self {
            input_path: Some(path.to_path_buf()),
            kind,
            version,
            tag_compounds,
        })
    }

    /// Wraps compounds that did not come from a file. The version is detected from them.
    pub fn from_compounds(kind: FileKind, tag_compounds: Vec<TagCompound>) -> Self {
        let version = McVersion::detect(&tag_compounds);
        Self {
            input_path: None,
            kind,
            version,
            tag_compounds,
        }
    }

    #[inline]
    pub fn mc_version(&self) -> &McVersion {
        &self.version
    }

    #[inline]
    pub fn input_path(&self) -> Option<&Path> {
        self.input_path.as_deref()
    }

    #[inline]
    pub fn file_kind(&self) -> FileKind {
        self.kind
    }

    #[inline]
    pub fn tag_compounds(&self) -> &[TagCompound] {
        &self.tag_compounds
    }

    #[inline]
    pub fn into_tag_compounds(self) -> Vec<TagCompound> {
        self.tag_compounds
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, TagCompound> {
        self.tag_compounds.iter()
    }

    /// Writes the compounds and version to `path` as pretty-printed JSON.
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<(), WorldError> {
        let path = path.as_ref();
        let io_context = || Cow::Owned(format!("writing {}", path.display()));

        let file = File::create(path).map_err(|err| WorldError::Io(io_context(), err))?;
        let mut writer = BufWriter::new(file);
        self.to_json_writer(&mut writer, true)?;
        writer.flush().map_err(|err| WorldError::Io(io_context(), err))?;

        debug!("Wrote {} compounds to {}", self.tag_compounds.len(), path.display());
        Ok(())
    }

    #[inline]
    pub fn to_json_string(&self, pretty: bool) -> Result<String, WorldError> {
        json_string(&self.version, &self.tag_compounds, pretty)
    }

    #[inline]
    pub fn to_json_writer<W: Write>(&self, writer: W, pretty: bool) -> Result<(), WorldError> {
        write_json(writer, &self.version, &self.tag_compounds, pretty)
    }

    /// Writes the single compound of this file to `path` as NBT.
    ///
    /// Region files and JSON documents with several compounds cannot be written this way.
    pub fn to_nbt<P: AsRef<Path>>(&self, path: P, opts: IoOptions) -> Result<(), WorldError> {
        let [compound] = self.tag_compounds.as_slice() else {
            return Err(WorldError::MultipleCompounds { count: self.tag_compounds.len() });
        };

        let path = path.as_ref();
        let io_context = || Cow::Owned(format!("writing {}", path.display()));

        let file = File::create(path).map_err(|err| WorldError::Io(io_context(), err))?;
        let mut writer = BufWriter::new(file);
        write_nbt(&mut writer, opts, Some(compound.name.as_str()), &compound.root)
            .map_err(|err| WorldError::Nbt(io_context(), err))?;
        writer.flush().map_err(|err| WorldError::Io(io_context(), err))
    }
}

impl<'a> IntoIterator for &'a McWorldDescriptor {
    type Item     = &'a TagCompound;
    type IntoIter = slice::Iter<'a, TagCompound>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Loads the file at `path`; see [`McWorldDescriptor::load`].
#[inline]
pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<McWorldDescriptor, WorldError> {
    McWorldDescriptor::load(path)
}


#[cfg(test)]
mod tests {
    use rnbt_nbt::NbtCompound;

    use crate::tag_compound::CompoundOrigin;
    use super::*;

    fn compound(data_version: i32) -> TagCompound {
        let mut root = NbtCompound::new();
        root.insert("DataVersion", data_version);
        TagCompound::new(String::new(), root, CompoundOrigin::File)
    }

    #[test]
    fn from_compounds() {
        let descriptor = McWorldDescriptor::from_compounds(
            FileKind::Nbt,
            vec![compound(3700), compound(1343)],
        );

        assert_eq!(descriptor.input_path(), None);
        assert_eq!(descriptor.file_kind(), FileKind::Nbt);
        assert_eq!(descriptor.mc_version().to_string(), "1.20.4");
        assert_eq!(descriptor.iter().count(), 2);
        assert_eq!(descriptor.into_tag_compounds().len(), 2);
    }

    #[test]
    fn to_nbt_needs_one_compound() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("out.nbt");

        let two = McWorldDescriptor::from_compounds(FileKind::Nbt, vec![compound(1), compound(2)]);
        assert!(matches!(
            two.to_nbt(&path, IoOptions::java()),
            Err(WorldError::MultipleCompounds { count: 2 }),
        ));
        let none = McWorldDescriptor::from_compounds(FileKind::Json, Vec::new());
        assert!(matches!(
            none.to_nbt(&path, IoOptions::java()),
            Err(WorldError::MultipleCompounds { count: 0 }),
        ));
        assert!(!path.exists());

        let one = McWorldDescriptor::from_compounds(FileKind::Nbt, vec![compound(3465)]);
        one.to_nbt(&path, IoOptions::java()).expect("writable temporary file");

        let reloaded = McWorldDescriptor::load(&path).expect("valid NBT file");
        assert_eq!(reloaded.tag_compounds(), one.tag_compounds());
        assert_eq!(reloaded.mc_version(), one.mc_version());
    }

    #[test]
    fn unsupported_files() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("notes.txt");
        fs::write(&path, "not a Minecraft file").expect("writable temporary file");

        assert!(matches!(load_binary(&path), Err(WorldError::UnsupportedFile(_))));
        assert!(matches!(
            load_binary(dir.path().join("missing.nbt")),
            Err(WorldError::Io(..)),
        ));
    }
}
