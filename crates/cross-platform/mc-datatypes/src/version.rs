use std::{array, fmt};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;


/// The name of a game version, as stored in `level.dat` (`Data.Version.Name`) or
/// derived from a data version.
///
/// Release names such as `1.20.4` parse as numeric versions; snapshots (`24w14a`)
/// and anything else are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionName {
    Numeric(NumericVersion),
    String(String),
}

impl VersionName {
    #[inline]
    pub fn parse_numeric(version: &str) -> Option<Self> {
        NumericVersion::parse(version).map(Self::Numeric)
    }

    #[inline]
    pub fn numeric(major: u32, minor: u32, patch: u32) -> Self {
        Self::Numeric(NumericVersion(major, minor, patch, 0, 0))
    }

    #[inline]
    pub fn as_numeric(&self) -> Option<NumericVersion> {
        match self {
            &Self::Numeric(numeric) => Some(numeric),
            Self::String(_)         => None,
        }
    }
}

impl PartialOrd for VersionName {
    /// Only numeric versions are ordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.as_numeric()?.cmp(&other.as_numeric()?))
    }
}

impl From<String> for VersionName {
    #[inline]
    fn from(version: String) -> Self {
        Self::parse_numeric(&version).unwrap_or(Self::String(version))
    }
}

impl From<&str> for VersionName {
    #[inline]
    fn from(version: &str) -> Self {
        Self::parse_numeric(version).unwrap_or_else(|| Self::String(version.to_owned()))
    }
}

impl Display for VersionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(numeric) => Display::fmt(numeric, f),
            Self::String(string)   => f.write_str(string),
        }
    }
}

/// A numeric version of Minecraft, such as 1.21.0 (stored here as 1.21.0.0.0),
/// with room for the longer Bedrock versions like 1.16.100.56.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericVersion(pub u32, pub u32, pub u32, pub u32, pub u32);

impl NumericVersion {
    /// Parse a string into a numeric version.
    ///
    /// The first component is always the major version, so "1.0" is parsed the same
    /// as "1.0.0". A single component such as "1" is rejected, as is an empty
    /// component ("1." or "1..2") or more than five components.
    pub fn parse(version: &str) -> Option<Self> {
        let mut components = version.split('.');

        let nums: [Option<u32>; 5] = array::from_fn(|idx| {
            if let Some(next_component) = components.next() {
                next_component.parse().ok()
            } else if idx <= 1 {
                None
            } else {
                Some(0)
            }
        });

        if components.next().is_some() {
            return None;
        }

        Some(Self(nums[0]?, nums[1]?, nums[2]?, nums[3]?, nums[4]?))
    }
}

impl Display for NumericVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Only show the fourth or fifth components if necessary.
        match (self.3 == 0, self.4 == 0) {
            (true, true)  => write!(f, "{}.{}.{}",       self.0, self.1, self.2),
            (false, true) => write!(f, "{}.{}.{}.{}",    self.0, self.1, self.2, self.3),
            (_, false)    => write!(f, "{}.{}.{}.{}.{}", self.0, self.1, self.2, self.3, self.4),
        }
    }
}

impl From<(u32, u32, u32)> for NumericVersion {
    #[inline]
    fn from(value: (u32, u32, u32)) -> Self {
        Self(value.0, value.1, value.2, 0, 0)
    }
}

impl FromStr for NumericVersion {
    type Err = ParseVersionError;

    #[inline]
    fn from_str(version: &str) -> Result<Self, Self::Err> {
        Self::parse(version).ok_or_else(|| ParseVersionError(version.into()))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("\"{0}\" is not a numeric version like 1.20.4")]
pub struct ParseVersionError(Box<str>);
