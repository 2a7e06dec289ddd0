use std::path::Path;


/// The extension of `path`, lowercased, if it has one that is valid UTF-8.
///
/// Minecraft data moves between case-insensitive and case-sensitive filesystems,
/// so `LEVEL.DAT` and `r.0.0.MCA` turn up in the wild.
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
}
