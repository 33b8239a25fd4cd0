//! Resource lookup.

use std::fs;
use std::path::{Path, PathBuf};

/// Image extensions native menus and the dock can load.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "tiff", "tif", "bmp", "ico", "icns",
];

/// Resolves resource paths for the native layer.
pub trait Resources {
    /// Resolves a path relative to the resource directory.
    fn resolve(&self, relative: &str) -> PathBuf;

    /// Whether the path has an image extension the native layer supports.
    fn is_supported_image(&self, path: &Path) -> bool {
        is_supported_image_extension(path)
    }

    /// Stylesheets to link into window documents, relative to the resource directory.
    fn css(&self) -> Vec<String> {
        Vec::new()
    }

    /// Scripts to link into window documents, relative to the resource directory.
    fn js(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Case-insensitive check against [`IMAGE_EXTENSIONS`].
pub fn is_supported_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}

/// A resource directory on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDir {
    root: PathBuf,
}

impl ResourceDir {
    pub fn new(root: impl Into<PathBuf>) -> ResourceDir {
        ResourceDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists files with the given extension under `dir`, relative to the root and sorted.
    fn list(&self, dir: &str, extension: &str) -> Vec<String> {
        let entries = match fs::read_dir(self.root.join(dir)) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut files: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |ext| ext == extension))
            .filter_map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| format!("{}/{}", dir, name))
            })
            .collect();
        files.sort();
        files
    }
}

impl Resources for ResourceDir {
    fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn css(&self) -> Vec<String> {
        self.list("css", "css")
    }

    fn js(&self) -> Vec<String> {
        self.list("js", "js")
    }
}
