mod compound;
mod list;
mod snbt;


use crate::raw;
use crate::repr::NbtStructureError;


pub use self::{compound::NbtCompound, list::NbtList};
pub use self::snbt::{CompoundWithOptions, ListWithOptions, TagWithOptions};


/// The hash map type utilized in this crate.
///
/// If `preserve_order` is enabled, the map will iterate over keys and values
/// in the order they were inserted by using the `IndexMap` type
/// from the crate <https://docs.rs/indexmap/latest/indexmap/>.
/// Otherwise, `std`'s `HashMap` is used.
#[cfg(feature = "preserve_order")]
pub type Map<T> = indexmap::IndexMap<String, T>;

/// The hash map type utilized in this crate.
///
/// If `preserve_order` is enabled, the map will iterate over keys and values
/// in the order they were inserted by using the `IndexMap` type
/// from the crate <https://docs.rs/indexmap/latest/indexmap/>.
/// Otherwise, `std`'s `HashMap` is used.
#[cfg(not(feature = "preserve_order"))]
pub type Map<T> = std::collections::HashMap<String, T>;


/// The generic NBT tag type, containing all supported tag variants
/// which wrap around a corresponding Rust type.
///
/// Tags do not carry their own names; a tag's name is its key in the parent [`NbtCompound`],
/// and the name of a root compound is returned beside it by the [`io`] functions.
///
/// With the `serde` feature, tags serialize externally tagged (`{"Short": 3}`), so that
/// converting to JSON and back restores the same tag types.
///
/// [`io`]: crate::io
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NbtTag {
    /// A signed, one-byte integer.
    Byte(i8),
    /// A signed, two-byte integer.
    Short(i16),
    /// A signed, four-byte integer.
    Int(i32),
    /// A signed, eight-byte integer.
    Long(i64),
    /// A 32-bit floating point value.
    Float(f32),
    /// A 64-bit floating point value.
    Double(f64),
    /// An array (vec) of one-byte integers. Minecraft treats this as an array of signed bytes.
    ByteArray(Vec<i8>),
    /// A UTF-8 string.
    String(String),
    /// An NBT tag list.
    List(NbtList),
    /// An NBT tag compound.
    Compound(NbtCompound),
    /// An array (vec) of signed, four-byte integers.
    IntArray(Vec<i32>),
    /// An array (vec) of signed, eight-byte integers.
    LongArray(Vec<i64>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NbtContainerType {
    Compound,
    List,
    ByteArray,
    IntArray,
    LongArray,
}

/// The type of an NBT tag, including `End`, which only appears in binary NBT
/// (as the terminator of a compound, or the element type of an empty list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NbtType {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
    LongArray,
}

impl NbtType {
    /// The numeric ID of this type in binary NBT.
    #[inline]
    pub const fn id(self) -> u8 {
        match self {
            Self::End       => raw::TAG_END_ID,
            Self::Byte      => raw::BYTE_ID,
            Self::Short     => raw::SHORT_ID,
            Self::Int       => raw::INT_ID,
            Self::Long      => raw::LONG_ID,
            Self::Float     => raw::FLOAT_ID,
            Self::Double    => raw::DOUBLE_ID,
            Self::ByteArray => raw::BYTE_ARRAY_ID,
            Self::String    => raw::STRING_ID,
            Self::List      => raw::LIST_ID,
            Self::Compound  => raw::COMPOUND_ID,
            Self::IntArray  => raw::INT_ARRAY_ID,
            Self::LongArray => raw::LONG_ARRAY_ID,
        }
    }

    #[inline]
    pub const fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            raw::TAG_END_ID    => Self::End,
            raw::BYTE_ID       => Self::Byte,
            raw::SHORT_ID      => Self::Short,
            raw::INT_ID        => Self::Int,
            raw::LONG_ID       => Self::Long,
            raw::FLOAT_ID      => Self::Float,
            raw::DOUBLE_ID     => Self::Double,
            raw::BYTE_ARRAY_ID => Self::ByteArray,
            raw::STRING_ID     => Self::String,
            raw::LIST_ID       => Self::List,
            raw::COMPOUND_ID   => Self::Compound,
            raw::INT_ARRAY_ID  => Self::IntArray,
            raw::LONG_ARRAY_ID => Self::LongArray,
            _ => return None,
        })
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::End       => "End",
            Self::Byte      => "Byte",
            Self::Short     => "Short",
            Self::Int       => "Int",
            Self::Long      => "Long",
            Self::Float     => "Float",
            Self::Double    => "Double",
            Self::ByteArray => "ByteArray",
            Self::String    => "String",
            Self::List      => "List",
            Self::Compound  => "Compound",
            Self::IntArray  => "IntArray",
            Self::LongArray => "LongArray",
        }
    }
}

impl NbtTag {
    /// Returns the single character denoting this tag's type in SNBT, or `None` if this tag
    /// has no type specifier.
    #[inline]
    pub fn type_specifier(&self) -> Option<&'static str> {
        match self {
            Self::Short(_)                     => Some("S"),
            Self::Float(_)                     => Some("F"),
            Self::Double(_)                    => Some("D"),
            Self::IntArray(_)                  => Some("I"),
            Self::Byte(_) | Self::ByteArray(_) => Some("B"),
            Self::Long(_) | Self::LongArray(_) => Some("L"),
            // Note that in particular, `Self::Int` has no type specifier.
            _ => None,
        }
    }

    /// Returns this tag's type.
    #[inline]
    pub fn tag_type(&self) -> NbtType {
        match self {
            Self::Byte(_)      => NbtType::Byte,
            Self::Short(_)     => NbtType::Short,
            Self::Int(_)       => NbtType::Int,
            Self::Long(_)      => NbtType::Long,
            Self::Float(_)     => NbtType::Float,
            Self::Double(_)    => NbtType::Double,
            Self::ByteArray(_) => NbtType::ByteArray,
            Self::String(_)    => NbtType::String,
            Self::List(_)      => NbtType::List,
            Self::Compound(_)  => NbtType::Compound,
            Self::IntArray(_)  => NbtType::IntArray,
            Self::LongArray(_) => NbtType::LongArray,
        }
    }

    /// Returns this tag's numeric ID.
    #[inline]
    pub fn numeric_tag_id(&self) -> u8 {
        raw::id_for_tag(Some(self))
    }

    /// Returns which type of container this tag is, or `None` if it is not a container.
    #[inline]
    pub fn container_type(&self) -> Option<NbtContainerType> {
        match self {
            Self::Compound(_)  => Some(NbtContainerType::Compound),
            Self::List(_)      => Some(NbtContainerType::List),
            Self::ByteArray(_) => Some(NbtContainerType::ByteArray),
            Self::IntArray(_)  => Some(NbtContainerType::IntArray),
            Self::LongArray(_) => Some(NbtContainerType::LongArray),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn tag_name(&self) -> &'static str {
        self.tag_type().name()
    }

    /// Converts this NBT tag into SNBT with no extraneous spacing.
    pub fn to_snbt(&self) -> String {
        format!("{self:?}")
    }

    /// Converts this NBT tag into SNBT with newlines and indentation for readability.
    pub fn to_pretty_snbt(&self) -> String {
        format!("{self:#?}")
    }
}

// Implement the from trait for all the tag's internal types
macro_rules! tag_from {
    ($($type:ty, $tag:ident);* $(;)?) => {
        $(
            impl From<$type> for NbtTag {
                #[inline]
                fn from(value: $type) -> NbtTag {
                    NbtTag::$tag(value)
                }
            }
        )*
    };
}

tag_from!(
    i8,  Byte;
    i16, Short;
    i32, Int;
    i64, Long;
    f32, Float;
    f64, Double;
    Vec<i8>,     ByteArray;
    String,      String;
    NbtList,     List;
    NbtCompound, Compound;
    Vec<i32>,    IntArray;
    Vec<i64>,    LongArray;
);

impl From<&str> for NbtTag {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for NbtTag {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Byte(i8::from(value))
    }
}

impl From<Vec<u8>> for NbtTag {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Self::ByteArray(raw::bytes_to_signed(value))
    }
}

macro_rules! prim_from_tag {
    ($($type:ty, $tag:ident);* $(;)?) => {
        $(
            impl TryFrom<&NbtTag> for $type {
                type Error = NbtStructureError;

                #[inline]
                fn try_from(tag: &NbtTag) -> Result<Self, Self::Error> {
                    if let NbtTag::$tag(value) = tag {
                        Ok(*value)
                    } else {
                        Err(NbtStructureError::type_mismatch(stringify!($tag), tag.tag_name()))
                    }
                }
            }
        )*
    };
}

prim_from_tag!(
    i8,  Byte;
    i16, Short;
    i32, Int;
    i64, Long;
    f32, Float;
    f64, Double;
);

impl TryFrom<&NbtTag> for bool {
    type Error = NbtStructureError;

    fn try_from(tag: &NbtTag) -> Result<Self, Self::Error> {
        match *tag {
            NbtTag::Byte(value)  => Ok(value != 0),
            NbtTag::Short(value) => Ok(value != 0),
            NbtTag::Int(value)   => Ok(value != 0),
            NbtTag::Long(value)  => Ok(value != 0),
            _ => Err(NbtStructureError::type_mismatch(
                "Byte, Short, Int, or Long",
                tag.tag_name(),
            )),
        }
    }
}

macro_rules! ref_from_tag {
    ($($type:ty, $tag:ident);* $(;)?) => {
        $(
            impl<'a> TryFrom<&'a NbtTag> for &'a $type {
                type Error = NbtStructureError;

                #[inline]
                fn try_from(tag: &'a NbtTag) -> Result<Self, Self::Error> {
                    if let NbtTag::$tag(value) = tag {
                        Ok(value)
                    } else {
                        Err(NbtStructureError::type_mismatch(stringify!($tag), tag.tag_name()))
                    }
                }
            }

            impl<'a> TryFrom<&'a mut NbtTag> for &'a mut $type {
                type Error = NbtStructureError;

                #[inline]
                fn try_from(tag: &'a mut NbtTag) -> Result<Self, Self::Error> {
                    if let NbtTag::$tag(value) = tag {
                        Ok(value)
                    } else {
                        Err(NbtStructureError::type_mismatch(stringify!($tag), tag.tag_name()))
                    }
                }
            }
        )*
    };
}

ref_from_tag!(
    Vec<i8>,     ByteArray;
    [i8],        ByteArray;
    String,      String;
    str,         String;
    NbtList,     List;
    NbtCompound, Compound;
    Vec<i32>,    IntArray;
    [i32],       IntArray;
    Vec<i64>,    LongArray;
    [i64],       LongArray;
);

macro_rules! from_tag {
    ($($type:ty, $tag:ident);* $(;)?) => {
        $(
            impl TryFrom<NbtTag> for $type {
                type Error = NbtStructureError;

                #[inline]
                fn try_from(tag: NbtTag) -> Result<Self, Self::Error> {
                    if let NbtTag::$tag(value) = tag {
                        Ok(value)
                    } else {
                        Err(NbtStructureError::type_mismatch(stringify!($tag), tag.tag_name()))
                    }
                }
            }
        )*
    };
}

from_tag!(
    i8,  Byte;
    i16, Short;
    i32, Int;
    i64, Long;
    f32, Float;
    f64, Double;
    Vec<i8>,     ByteArray;
    String,      String;
    NbtList,     List;
    NbtCompound, Compound;
    Vec<i32>,    IntArray;
    Vec<i64>,    LongArray;
);

impl TryFrom<NbtTag> for Vec<u8> {
    type Error = NbtStructureError;

    #[inline]
    fn try_from(tag: NbtTag) -> Result<Self, Self::Error> {
        if let NbtTag::ByteArray(value) = tag {
            Ok(raw::bytes_to_unsigned(&value))
        } else {
            Err(NbtStructureError::type_mismatch("ByteArray", tag.tag_name()))
        }
    }
}



#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn externally_tagged_json() {
        let mut list = NbtList::new();
        list.push(1_i16);

        let mut compound = NbtCompound::new();
        compound.insert("list", list);

        let json = serde_json::to_string(&NbtTag::Compound(compound.clone()))
            .expect("tags serialize to JSON");
        assert_eq!(json, r#"{"Compound":{"list":{"List":[{"Short":1}]}}}"#);

        let tag: NbtTag = serde_json::from_str(&json).expect("JSON just written");
        assert_eq!(tag, NbtTag::Compound(compound));
    }

    #[test]
    fn arrays_keep_their_width() {
        let tag = NbtTag::LongArray(vec![i64::MAX, -1]);
        let json = serde_json::to_string(&tag).expect("tags serialize to JSON");
        assert_eq!(json, r#"{"LongArray":[9223372036854775807,-1]}"#);
        assert_eq!(serde_json::from_str::<NbtTag>(&json).expect("JSON just written"), tag);
    }
}
