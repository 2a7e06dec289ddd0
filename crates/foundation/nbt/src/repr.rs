use std::{error, fmt};
use std::fmt::{Debug, Display, Formatter};

use thiserror::Error;


/// An error from accessing an NBT tag tree: either a conflict between the expected and
/// actual structure of the tree, or a custom error raised while converting a tag.
#[derive(Debug)]
pub enum NbtReprError {
    /// A structure error in the tag tree.
    Structure(Box<NbtStructureError>),
    /// A custom error.
    Custom(anyhow::Error),
}

impl NbtReprError {
    /// Creates a new NBT representation error from the given structure error.
    pub fn structure(error: NbtStructureError) -> Self {
        Self::Structure(Box::new(error))
    }

    /// Creates a `NbtReprError` from the given error. A [`NbtStructureError`] becomes the
    /// `Structure` variant, a `NbtReprError` is returned as-is, and anything else
    /// is wrapped as a custom error.
    pub fn from_any<E: Into<anyhow::Error>>(error: E) -> Self {
        let mut error = <E as Into<anyhow::Error>>::into(error);

        error = match error.downcast::<Self>() {
            Ok(error)  => return error,
            Err(error) => error,
        };

        match error.downcast::<NbtStructureError>() {
            Ok(error)  => Self::Structure(Box::new(error)),
            Err(error) => Self::Custom(error),
        }
    }

    /// Returns the structure error, if this is one.
    pub fn as_structure(&self) -> Option<&NbtStructureError> {
        match self {
            Self::Structure(error) => Some(error),
            Self::Custom(_)        => None,
        }
    }
}

impl From<NbtStructureError> for NbtReprError {
    fn from(error: NbtStructureError) -> Self {
        Self::Structure(Box::new(error))
    }
}

impl Display for NbtReprError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure(error) => Display::fmt(error, f),
            Self::Custom(custom)   => Display::fmt(custom, f),
        }
    }
}

impl error::Error for NbtReprError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Structure(error) => Some(error),
            Self::Custom(custom)   => Some(&**custom),
        }
    }
}

/// An error associated with the structure of an NBT tag tree. This error represents a conflict
/// between the expected and actual structure of an NBT tag tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NbtStructureError {
    #[error("Missing tag \"{tag_name}\"")]
    MissingTag {
        tag_name: Box<str>,
    },
    #[error("Index out of range: {index} >= {length}")]
    InvalidIndex {
        index:  usize,
        length: usize,
    },
    #[error("Tag type mismatch: expected {expected} but found {found}")]
    TypeMismatch {
        expected: &'static str,
        found:    &'static str,
    },
}

impl NbtStructureError {
    pub fn missing_tag<T: Into<String>>(tag_name: T) -> Self {
        Self::MissingTag {
            tag_name: tag_name.into().into_boxed_str(),
        }
    }

    pub fn invalid_index(index: usize, length: usize) -> Self {
        Self::InvalidIndex { index, length }
    }

    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_any_recovers_structure_errors() {
        let error = NbtReprError::from_any(NbtStructureError::missing_tag("Data"));
        assert_eq!(
            error.as_structure(),
            Some(&NbtStructureError::missing_tag("Data")),
        );
        assert_eq!(error.to_string(), "Missing tag \"Data\"");
    }

    #[test]
    fn from_any_does_not_double_wrap() {
        let inner = NbtReprError::structure(NbtStructureError::invalid_index(3, 2));
        let error = NbtReprError::from_any(inner);
        assert!(matches!(
            error.as_structure(),
            Some(NbtStructureError::InvalidIndex { index: 3, length: 2 }),
        ));
    }

    #[test]
    fn other_errors_are_custom() {
        let error = NbtReprError::from_any(anyhow::anyhow!("bad palette"));
        assert!(matches!(error, NbtReprError::Custom(_)));
        assert_eq!(error.to_string(), "bad palette");
    }
}
