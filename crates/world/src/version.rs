use std::fmt;
use std::fmt::{Display, Formatter};

use log::debug;

use rnbt_mc_datatypes::{NumericVersion, VersionName};
use rnbt_nbt::{NbtCompound, NbtList};

use crate::tag_compound::TagCompound;


/// Releases and the data version they stamp on saved data, in increasing order.
/// Only the first and last release of each minor version are listed, plus a few
/// releases that changed the data format.
const RELEASES: &[(i32, (u32, u32, u32))] = &[
    (1343, (1, 12, 2)),
    (1519, (1, 13, 0)),
    (1631, (1, 13, 2)),
    (1952, (1, 14, 0)),
    (1976, (1, 14, 4)),
    (2225, (1, 15, 0)),
    (2230, (1, 15, 2)),
    (2566, (1, 16, 0)),
    (2586, (1, 16, 5)),
    (2724, (1, 17, 0)),
    (2730, (1, 17, 1)),
    (2860, (1, 18, 0)),
    (2975, (1, 18, 2)),
    (3105, (1, 19, 0)),
    (3120, (1, 19, 2)),
    (3337, (1, 19, 4)),
    (3463, (1, 20, 0)),
    (3465, (1, 20, 1)),
    (3578, (1, 20, 2)),
    (3700, (1, 20, 4)),
    (3839, (1, 20, 6)),
    (3953, (1, 21, 0)),
    (3955, (1, 21, 1)),
    (4082, (1, 21, 3)),
    (4189, (1, 21, 4)),
];

/// The newest listed release whose data version is at most `data_version`.
///
/// Snapshots between two releases map to the older release. Data versions older than
/// 1.12.2 return `None`.
pub fn release_for_data_version(data_version: i32) -> Option<VersionName> {
    let newer = RELEASES.partition_point(|&(release_data, _)| release_data <= data_version);
    let (_, release) = RELEASES.get(newer.checked_sub(1)?)?;
    Some(VersionName::Numeric(NumericVersion::from(*release)))
}


/// The game version that wrote a file, as far as it can be told from the file itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct McVersion {
    /// The data version stamped on the data, if any.
    pub data_version: Option<i32>,
    /// The version name recorded in the data, if any; `level.dat` files record one.
    pub name:         Option<VersionName>,
}

impl McVersion {
    /// A version about which nothing is known.
    #[inline]
    pub fn unknown() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        self.data_version.is_some() || self.name.is_some()
    }

    /// The recorded name, or else the release matching the data version.
    pub fn release_name(&self) -> Option<VersionName> {
        self.name
            .clone()
            .or_else(|| release_for_data_version(self.data_version?))
    }

    /// Finds the version of the first compound that records one.
    ///
    /// For each compound, these are tried in order:
    /// - `Data.Version.Name` and `Data.DataVersion` (Java `level.dat`)
    /// - `DataVersion` (chunks, structure files, Sponge schematics v2)
    /// - `Schematic.DataVersion` (Sponge schematics v3)
    /// - `MinecraftDataVersion` (Litematica)
    /// - `lastOpenedWithVersion` (Bedrock `level.dat`)
    pub fn detect(compounds: &[TagCompound]) -> Self {
        let version = compounds
            .iter()
            .find_map(|compound| detect_in_root(&compound.root))
            .unwrap_or_default();

        debug!("Detected version {version} ({:?})", version.data_version);
        version
    }
}

impl Display for McVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.release_name(), self.data_version) {
            (Some(name), _)            => Display::fmt(&name, f),
            (None, Some(data_version)) => write!(f, "data version {data_version}"),
            (None, None)               => f.write_str("unknown"),
        }
    }
}

fn detect_in_root(root: &NbtCompound) -> Option<McVersion> {
    if let Ok(data) = root.get::<_, &NbtCompound>("Data") {
        let name = data
            .get::<_, &NbtCompound>("Version")
            .and_then(|version| version.get::<_, &str>("Name"))
            .ok()
            .map(VersionName::from);
        let data_version = data.get::<_, i32>("DataVersion").ok();

        if name.is_some() || data_version.is_some() {
            return Some(McVersion { data_version, name });
        }
    }

    let data_version = root
        .get::<_, i32>("DataVersion")
        .or_else(|_| {
            root.get::<_, &NbtCompound>("Schematic")
                .and_then(|schematic| schematic.get("DataVersion"))
        })
        .or_else(|_| root.get::<_, i32>("MinecraftDataVersion"))
        .ok();
    if data_version.is_some() {
        return Some(McVersion { data_version, name: None });
    }

    let name = root
        .get::<_, &NbtList>("lastOpenedWithVersion")
        .ok()
        .and_then(bedrock_version)?;
    Some(McVersion { data_version: None, name: Some(name) })
}

/// Bedrock stores versions as a list of up to five ints, like `[1, 20, 40, 1, 0]`.
fn bedrock_version(list: &NbtList) -> Option<VersionName> {
    let mut components = [0; 5];
    if list.len() < 2 || list.len() > components.len() {
        return None;
    }

    for (component, value) in components.iter_mut().zip(list.iter_map::<i32>()) {
        *component = u32::try_from(value.ok()?).ok()?;
    }

    let [major, minor, patch, revision, build] = components;
    Some(VersionName::Numeric(NumericVersion(major, minor, patch, revision, build)))
}
