//! The NBT (Named Binary Tag) data model used by Minecraft, together with a binary codec
//! for Java Edition (big-endian, CESU-8 strings) and Bedrock Edition (little-endian, UTF-8)
//! encodings.
//!
//! SNBT is produced through the `Display` and `Debug` implementations of the tag types.

mod tag;
mod repr; // Used by tag module

pub mod io;

mod raw;

pub mod settings;


pub use self::repr::*;
pub use self::tag::*;
