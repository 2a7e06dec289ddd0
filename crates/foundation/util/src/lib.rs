//! Small utilities without functionality specific to NBT, for small Rust-specific tasks.

mod inspect_none;
mod lock_or_panic;
mod path_ext;


pub use self::{
    inspect_none::InspectNone,
    lock_or_panic::LockOrPanic,
    path_ext::lowercase_extension,
};
