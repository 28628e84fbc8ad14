// Asset file access

use super::AssetError;
use std::path::{Path, PathBuf};

/// Kinds of files the core reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    AnimationConfig,
    Frame,
    Map,
}

impl AssetType {
    /// Get supported file extensions for this asset type
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AssetType::AnimationConfig => &["json"],
            AssetType::Frame => &["png", "jpg", "jpeg"],
            AssetType::Map => &["json"],
        }
    }

    /// Check whether a path carries an extension of this type
    pub fn matches<P: AsRef<Path>>(&self, path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_ascii_lowercase();
                self.extensions().contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}

/// Asset loader responsible for resolving and reading asset files
#[derive(Debug, Clone)]
pub struct AssetLoader {
    base_path: PathBuf,
}

impl AssetLoader {
    /// Create a new asset loader with the given base path
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for an asset; absolute paths are kept as-is
    pub fn resolve_path<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.base_path.join(name)
        }
    }

    /// Read a UTF-8 text asset
    pub fn load_text<P: AsRef<Path>>(&self, name: P) -> Result<String, AssetError> {
        let path = self.resolve_path(name);

        if !path.exists() {
            return Err(AssetError::ConfigMissing(path.to_string_lossy().to_string()));
        }

        std::fs::read_to_string(&path).map_err(|e| AssetError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// Check if an asset exists
    pub fn exists<P: AsRef<Path>>(&self, name: P) -> bool {
        self.resolve_path(name).exists()
    }

    /// Get the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new(".")
    }
}
