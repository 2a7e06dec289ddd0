use std::{borrow::Borrow, hash::Hash};

use crate::{
    repr::{NbtReprError, NbtStructureError},
    settings::SnbtWriteOptions,
};

use super::{CompoundWithOptions, Map, NbtTag};


/// Named NBT tags. Names are unique within a compound.
///
/// With the `preserve_order` feature, iteration follows insertion order.
/// With the `serde` feature, this type serializes as a plain map from names to tags.
/// Binary NBT should still be read and written with the [`io`] module.
///
/// [`io`]: crate::io
#[repr(transparent)]
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NbtCompound(pub(crate) Map<NbtTag>);

impl NbtCompound {
    #[inline]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// An empty compound with room for `capacity` tags.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Map::with_capacity(capacity))
    }

    #[inline]
    pub fn inner(&self) -> &Map<NbtTag> {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> Map<NbtTag> {
        self.0
    }

    /// Compact SNBT, the same as `format!("{compound}")`.
    #[inline]
    pub fn to_snbt(&self) -> String {
        format!("{self:?}")
    }

    /// SNBT with each entry on its own indented line.
    #[inline]
    pub fn to_pretty_snbt(&self) -> String {
        format!("{self:#?}")
    }

    #[inline]
    pub fn to_snbt_with_options(&self, opts: SnbtWriteOptions) -> String {
        format!("{:?}", CompoundWithOptions::new(self, opts))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the tag called `name` to `T`.
    ///
    /// Fails with [`NbtStructureError::MissingTag`] when there is no such tag, or with the
    /// conversion's error when it has another type. Lists and compounds are borrowed
    /// with `T = &NbtList` or `T = &NbtCompound`.
    ///
    /// [`NbtStructureError::MissingTag`]: crate::repr::NbtStructureError::MissingTag
    #[inline]
    pub fn get<'a, 'b, K, T>(&'a self, name: &'b K) -> Result<T, NbtReprError>
    where
        String: Borrow<K>,
        K: Hash + Ord + Eq + ?Sized,
        &'b K: Into<String>,
        T: TryFrom<&'a NbtTag>,
        T::Error: Into<anyhow::Error>,
    {
        let tag = self.0
            .get(name)
            .ok_or_else(|| NbtStructureError::missing_tag(name))?;
        T::try_from(tag).map_err(NbtReprError::from_any)
    }

    /// Like [`get`](Self::get), for `T = &mut NbtList` or `T = &mut NbtCompound`.
    #[inline]
    pub fn get_mut<'a, 'b, K, T>(&'a mut self, name: &'b K) -> Result<T, NbtReprError>
    where
        String: Borrow<K>,
        K: Hash + Ord + Eq + ?Sized,
        &'b K: Into<String>,
        T: TryFrom<&'a mut NbtTag>,
        T::Error: Into<anyhow::Error>,
    {
        let tag = self.0
            .get_mut(name)
            .ok_or_else(|| NbtStructureError::missing_tag(name))?;
        T::try_from(tag).map_err(NbtReprError::from_any)
    }

    #[inline]
    pub fn contains_key<K>(&self, name: &K) -> bool
    where
        String: Borrow<K>,
        K: Hash + Ord + Eq + ?Sized,
    {
        self.0.contains_key(name)
    }

    #[inline]
    pub fn get_tag<K>(&self, name: &K) -> Option<&NbtTag>
    where
        String: Borrow<K>,
        K: Hash + Ord + Eq + ?Sized,
    {
        self.0.get(name)
    }

    #[inline]
    pub fn get_tag_mut<K>(&mut self, name: &K) -> Option<&mut NbtTag>
    where
        String: Borrow<K>,
        K: Hash + Ord + Eq + ?Sized,
    {
        self.0.get_mut(name)
    }

    /// Removes the tag called `name`. The order of the other tags is kept.
    #[inline]
    pub fn remove_tag<K>(&mut self, name: &K) -> Option<NbtTag>
    where
        String: Borrow<K>,
        K: Hash + Ord + Eq + ?Sized,
    {
        #[cfg(feature = "preserve_order")]
        {
            self.0.shift_remove(name)
        }
        #[cfg(not(feature = "preserve_order"))]
        {
            self.0.remove(name)
        }
    }

    /// Adds `value` under `name`, replacing any tag already called that.
    #[inline]
    pub fn insert<K: Into<String>, T: Into<NbtTag>>(&mut self, name: K, value: T) {
        self.0.insert(name.into(), value.into());
    }

    #[inline]
    pub fn iter(&self) -> <&Map<NbtTag> as IntoIterator>::IntoIter {
        self.0.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> <&mut Map<NbtTag> as IntoIterator>::IntoIter {
        self.0.iter_mut()
    }
}

impl Default for NbtCompound {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(String, NbtTag)> for NbtCompound {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (String, NbtTag)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for NbtCompound {
    type Item     = (String, NbtTag);
    type IntoIter = <Map<NbtTag> as IntoIterator>::IntoIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NbtCompound {
    type Item     = (&'a String, &'a NbtTag);
    type IntoIter = <&'a Map<NbtTag> as IntoIterator>::IntoIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_get() {
        let mut compound = NbtCompound::new();
        compound.insert("DataVersion", 3465_i32);
        compound.insert("Name", "test");

        assert_eq!(compound.get::<_, i32>("DataVersion").ok(), Some(3465));
        assert_eq!(compound.get::<_, &str>("Name").ok(), Some("test"));

        let error = compound.get::<_, i32>("Missing").expect_err("no such key");
        assert_eq!(error.as_structure(), Some(&NbtStructureError::missing_tag("Missing")));

        let error = compound.get::<_, i16>("DataVersion").expect_err("the tag is an Int");
        assert_eq!(
            error.as_structure(),
            Some(&NbtStructureError::type_mismatch("Short", "Int")),
        );
    }

    #[test]
    fn nested_mutation() {
        let mut data = NbtCompound::new();
        data.insert("Version", NbtCompound::new());
        let mut root = NbtCompound::new();
        root.insert("Data", data);

        root.get_mut::<_, &mut NbtCompound>("Data")
            .and_then(|data| data.get_mut::<_, &mut NbtCompound>("Version"))
            .expect("both compounds exist")
            .insert("Id", 3700_i32);

        let version: &NbtCompound = root
            .get::<_, &NbtCompound>("Data")
            .and_then(|data| data.get("Version"))
            .expect("both compounds exist");
        assert!(version.contains_key("Id"));
    }

    #[test]
    fn untyped_access() {
        let mut compound = NbtCompound::with_capacity(2);
        compound.insert("xPos", 4_i32);
        compound.insert("Status", "minecraft:full");

        assert_eq!(compound.get_tag("xPos"), Some(&NbtTag::Int(4)));
        assert_eq!(compound.get_tag("zPos"), None);

        *compound.get_tag_mut("xPos").expect("xPos was inserted") = NbtTag::Int(-4);
        assert!(compound.get_tag_mut("zPos").is_none());
        assert_eq!(compound.get::<_, i32>("xPos").ok(), Some(-4));

        for (_, tag) in compound.iter_mut() {
            if let NbtTag::String(status) = tag {
                status.push_str("_lit");
            }
        }

        let inner = compound.into_inner();
        assert_eq!(inner.len(), 2);
        assert_eq!(inner.get("xPos"), Some(&NbtTag::Int(-4)));
        assert_eq!(
            inner.get("Status"),
            Some(&NbtTag::String("minecraft:full_lit".to_owned())),
        );
    }

    #[test]
    fn remove() {
        let mut compound = NbtCompound::new();
        compound.insert("a", 1_i8);
        compound.insert("b", 2_i8);

        assert_eq!(compound.remove_tag("a"), Some(NbtTag::Byte(1)));
        assert_eq!(compound.remove_tag("a"), None);
        assert_eq!(compound.len(), 1);
    }
}
