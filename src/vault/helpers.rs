//! Helper utilities for the vault module.

use std::path::{Component, Path};

use pathdiff::diff_paths;

/// Vault path (relative, `/`-separated) of a file below `root_dir`.
pub fn get_vault_path(root_dir: &Path, path: &Path) -> Option<String> {
    let diff = diff_paths(path, root_dir)?;

    let segments = diff
        .components()
        .map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    Some(segments.join("/"))
}

/// Path of `target` relative to the folder `from_dir`, both vault paths.
pub fn relative_vault_path(from_dir: &str, target: &str) -> Option<String> {
    let diff = diff_paths(Path::new(target), Path::new(from_dir))?;

    let segments = diff
        .components()
        .map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            Component::ParentDir => Some(".."),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    Some(segments.join("/"))
}

/// Applies a `./` or `../` link path to a folder. `None` when it climbs
/// above the vault root.
pub fn join_relative(from_dir: &str, linkpath: &str) -> Option<String> {
    let mut segments: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();

    for segment in linkpath.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            segment => segments.push(segment),
        }
    }

    Some(segments.join("/"))
}
