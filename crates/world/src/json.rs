//! The JSON export format:
//!
//! ```json
//! {
//!   "version": "1.20.4",
//!   "data_version": 3700,
//!   "compounds": [
//!     { "name": "", "root": { "DataVersion": { "Int": 3700 } }, "chunk": { "x": 0, "z": 0, "timestamp": 0 } }
//!   ]
//! }
//! ```
//!
//! Tags are written externally tagged by their type, so every NBT type survives a round trip.
//! `chunk` is only present for compounds read from region files. Non-finite floats are
//! written as `null` by `serde_json` and cannot be read back.

use std::{borrow::Cow, io::Write};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rnbt_mc_datatypes::{ChunkPosition, VersionName};
use rnbt_nbt::NbtCompound;

use crate::{errors::WorldError, version::{McVersion, release_for_data_version}};
use crate::tag_compound::{CompoundOrigin, TagCompound};


#[derive(Serialize)]
struct DocumentRef<'a> {
    version:      Option<String>,
    data_version: Option<i32>,
    compounds:    Vec<CompoundRef<'a>>,
}

#[derive(Serialize)]
struct CompoundRef<'a> {
    name:  &'a str,
    root:  &'a NbtCompound,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunk: Option<ChunkEntry>,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    version:      Option<String>,
    #[serde(default)]
    data_version: Option<i32>,
    compounds:    Vec<Compound>,
}

#[derive(Deserialize)]
struct Compound {
    #[serde(default)]
    name:  String,
    root:  NbtCompound,
    #[serde(default)]
    chunk: Option<ChunkEntry>,
}

#[derive(Serialize, Deserialize, Clone, Copy)]
struct ChunkEntry {
    x:         i32,
    z:         i32,
    #[serde(default)]
    timestamp: u32,
}

impl Compound {
    fn into_tag_compound(self) -> TagCompound {
        let origin = match self.chunk {
            Some(ChunkEntry { x, z, timestamp }) => CompoundOrigin::Chunk {
                position: ChunkPosition { x, z },
                timestamp,
            },
            None => CompoundOrigin::File,
        };
        TagCompound::new(self.name, self.root, origin)
    }
}

fn document<'a>(version: &McVersion, compounds: &'a [TagCompound]) -> DocumentRef<'a> {
    DocumentRef {
        version:      version.release_name().map(|name| name.to_string()),
        data_version: version.data_version,
        compounds:    compounds
            .iter()
            .map(|compound| CompoundRef {
                name:  &compound.name,
                root:  &compound.root,
                chunk: match compound.origin {
                    CompoundOrigin::Chunk { position, timestamp } => Some(ChunkEntry {
                        x: position.x,
                        z: position.z,
                        timestamp,
                    }),
                    CompoundOrigin::File => None,
                },
            })
            .collect(),
    }
}

/// Writes `compounds` and their version as a JSON document.
pub fn write_json<W: Write>(
    writer:    W,
    version:   &McVersion,
    compounds: &[TagCompound],
    pretty:    bool,
) -> Result<(), WorldError> {
    let document = document(version, compounds);
    let result = if pretty {
        serde_json::to_writer_pretty(writer, &document)
    } else {
        serde_json::to_writer(writer, &document)
    };
    result.map_err(|err| WorldError::Json(Cow::Borrowed("writing JSON"), err))
}

/// Like [`write_json`], but returns the document as a string.
pub fn json_string(
    version:   &McVersion,
    compounds: &[TagCompound],
    pretty:    bool,
) -> Result<String, WorldError> {
    let document = document(version, compounds);
    let result = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    };
    result.map_err(|err| WorldError::Json(Cow::Borrowed("writing JSON"), err))
}

/// Reads a JSON document, or a single `{"name": ..., "root": ...}` compound.
///
/// The version is taken from the document if it records one, and is otherwise
/// detected from the compounds.
pub fn read_json(bytes: &[u8]) -> Result<(Vec<TagCompound>, McVersion), WorldError> {
    let parse_err = |err: serde_json::Error| WorldError::Json(Cow::Borrowed("parsing JSON"), err);

    let value: Value = serde_json::from_slice(bytes).map_err(parse_err)?;

    let (compounds, version) = if value.get("compounds").is_some() {
        let document: Document = serde_json::from_value(value).map_err(parse_err)?;

        // Names that only restate the data version were derived from it when written.
        let name = document.version
            .map(VersionName::from)
            .filter(|name| {
                document.data_version.and_then(release_for_data_version).as_ref() != Some(name)
            });
        let version = McVersion {
            data_version: document.data_version,
            name,
        };

        let compounds = document.compounds
            .into_iter()
            .map(Compound::into_tag_compound)
            .collect::<Vec<_>>();
        (compounds, version)
    } else if value.get("root").is_some() {
        let compound: Compound = serde_json::from_value(value).map_err(parse_err)?;
        (vec![compound.into_tag_compound()], McVersion::unknown())
    } else {
        return Err(WorldError::InvalidJson(Cow::Borrowed(
            "expected an object with either a \"compounds\" list or a \"root\" compound",
        )));
    };

    debug!("Read {} compounds from JSON", compounds.len());

    if version.is_known() {
        Ok((compounds, version))
    } else {
        let version = McVersion::detect(&compounds);
        Ok((compounds, version))
    }
}


#[cfg(test)]
mod tests {
    use rnbt_nbt::{NbtList, NbtTag};

    use super::*;

    fn chunk() -> TagCompound {
        let mut root = NbtCompound::new();
        root.insert("DataVersion", 3465_i32);
        root.insert("Status", "minecraft:full");
        root.insert("LastUpdate", 12_345_i64);
        root.insert("Heightmap", vec![1_i64, 2, 3]);
        root.insert("Biomes", NbtTag::IntArray(vec![-1, 0, 1]));
        root.insert("Sections", NbtList::from(vec![1.5_f32, -0.0]));

        TagCompound::new(String::new(), root, CompoundOrigin::Chunk {
            position:  ChunkPosition { x: -3, z: 7 },
            timestamp: 1_700_000_000,
        })
    }

    #[test]
    fn document_round_trip() {
        let compounds = vec![chunk()];
        let version = McVersion::detect(&compounds);

        let mut json = Vec::new();
        write_json(&mut json, &version, &compounds, true).expect("writing to a Vec");

        let value: Value = serde_json::from_slice(&json).expect("valid JSON");
        assert_eq!(value["version"], "1.20.1");
        assert_eq!(value["data_version"], 3465);
        assert_eq!(value["compounds"][0]["chunk"]["x"], -3);
        assert_eq!(value["compounds"][0]["root"]["LastUpdate"]["Long"], 12_345);

        let (read_back, read_version) = read_json(&json).expect("valid document");
        assert_eq!(read_back, compounds);
        assert_eq!(read_version, version);
    }

    #[test]
    fn empty_document() {
        let json = json_string(&McVersion::unknown(), &[], false).expect("serializable");
        assert_eq!(json, r#"{"version":null,"data_version":null,"compounds":[]}"#);

        let (compounds, version) = read_json(json.as_bytes()).expect("valid document");
        assert!(compounds.is_empty());
        assert!(!version.is_known());
    }

    #[test]
    fn recorded_names_are_kept() {
        let json = br#"{"version": "24w14a", "data_version": 3827, "compounds": []}"#;
        let (_, version) = read_json(json).expect("valid document");
        assert_eq!(version.name, Some(VersionName::String("24w14a".to_owned())));
        assert_eq!(version.to_string(), "24w14a");
    }

    #[test]
    fn bare_compound() {
        let json = br#"{"name": "house", "root": {"DataVersion": {"Int": 3700}}}"#;
        let (compounds, version) = read_json(json).expect("valid compound");

        assert_eq!(compounds.len(), 1);
        assert_eq!(compounds[0].name, "house");
        assert_eq!(compounds[0].origin, CompoundOrigin::File);
        assert_eq!(version.data_version, Some(3700));
    }

    #[test]
    fn malformed() {
        assert!(matches!(read_json(b"{\"compounds\": ["), Err(WorldError::Json(..))));
        assert!(matches!(read_json(b"[1, 2]"), Err(WorldError::InvalidJson(_))));
        assert!(matches!(
            read_json(br#"{"root": {"x": {"Quaternion": 1}}}"#),
            Err(WorldError::Json(..)),
        ));
    }

    #[test]
    fn non_finite_floats_do_not_read_back() {
        let mut root = NbtCompound::new();
        root.insert("nan", f32::NAN);
        let compounds = [TagCompound::new(String::new(), root, CompoundOrigin::File)];

        let mut json = Vec::new();
        write_json(&mut json, &McVersion::unknown(), &compounds, false).expect("writing to a Vec");
        assert!(read_json(&json).is_err());
    }
}
