use crate::settings::SnbtWriteOptions;
use crate::repr::{NbtReprError, NbtStructureError};

use super::{ListWithOptions, NbtTag, NbtType};


/// An ordered sequence of NBT tags.
///
/// Minecraft requires every element of a list to have the same type. That is not enforced
/// while building a list, but writing a mixed list to binary NBT fails.
///
/// With the `serde` feature, this type serializes as a plain sequence of tags.
#[repr(transparent)]
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NbtList(pub(crate) Vec<NbtTag>);

impl NbtList {
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// An empty list with room for `capacity` elements.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    #[inline]
    pub fn into_inner(self) -> Vec<NbtTag> {
        self.0
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, NbtTag> {
        self.0.iter()
    }

    /// Tries to convert each element to `T`. Failed conversions are yielded as errors
    /// and do not end the iteration.
    #[inline]
    pub fn iter_map<'a, T: TryFrom<&'a NbtTag> + 'a>(
        &'a self,
    ) -> impl Iterator<Item = Result<T, T::Error>> + 'a {
        self.0.iter().map(T::try_from)
    }

    /// Compact SNBT, the same as `format!("{list}")`.
    #[inline]
    pub fn to_snbt(&self) -> String {
        format!("{self:?}")
    }

    /// SNBT with each element on its own indented line.
    #[inline]
    pub fn to_pretty_snbt(&self) -> String {
        format!("{self:#?}")
    }

    #[inline]
    pub fn to_snbt_with_options(&self, opts: SnbtWriteOptions) -> String {
        format!("{:?}", ListWithOptions::new(self, opts))
    }

    /// Returns the type of this list's elements, taken from its first element.
    ///
    /// Returns `NbtType::End` for an empty list; binary NBT writes empty lists that way,
    /// whatever element type they were read with.
    #[inline]
    pub fn element_type(&self) -> NbtType {
        self.0.first().map_or(NbtType::End, NbtTag::tag_type)
    }

    /// Whether every element has the type of the first one.
    #[inline]
    pub fn is_homogenous(&self) -> bool {
        let element_type = self.element_type();
        self.0.iter().all(|tag| tag.tag_type() == element_type)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the element at `index` to `T`.
    ///
    /// Fails with [`NbtStructureError::InvalidIndex`] past the end of the list, or with the
    /// conversion's error when the element has another type.
    #[inline]
    pub fn get<'a, T>(&'a self, index: usize) -> Result<T, NbtReprError>
    where
        T: TryFrom<&'a NbtTag>,
        T::Error: Into<anyhow::Error>,
    {
        let tag = self.0
            .get(index)
            .ok_or_else(|| NbtStructureError::invalid_index(index, self.len()))?;
        T::try_from(tag).map_err(NbtReprError::from_any)
    }

    #[inline]
    pub fn get_tag(&self, index: usize) -> Option<&NbtTag> {
        self.0.get(index)
    }

    #[inline]
    pub fn get_tag_mut(&mut self, index: usize) -> Option<&mut NbtTag> {
        self.0.get_mut(index)
    }

    /// Removes the element at `index`, shifting later elements down.
    #[inline]
    pub fn remove_tag(&mut self, index: usize) -> Option<NbtTag> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    #[inline]
    pub fn push<T: Into<NbtTag>>(&mut self, value: T) {
        self.0.push(value.into());
    }
}

impl Default for NbtList {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Into<NbtTag>> From<Vec<T>> for NbtList {
    #[inline]
    fn from(values: Vec<T>) -> Self {
        values.into_iter().map(Into::into).collect()
    }
}

impl FromIterator<NbtTag> for NbtList {
    #[inline]
    fn from_iter<I: IntoIterator<Item = NbtTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for NbtList {
    type Item     = NbtTag;
    type IntoIter = std::vec::IntoIter<NbtTag>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NbtList {
    type Item     = &'a NbtTag;
    type IntoIter = std::slice::Iter<'a, NbtTag>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
