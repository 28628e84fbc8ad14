// Asset management system
//
// Loads animation configs and their frame images off the update loop and
// shares the resulting tables between every entity of a preset.

mod cache;
mod handle;
mod loader;
mod table;

pub use cache::{AnimationCache, LoadStatus, LoadTicket, PresetHandle};
pub use handle::{AssetHandle, AssetId, FrameAsset, FrameHandle};
pub use loader::{AssetLoader, AssetType};
pub use table::{
    AnimationClip, AnimationTable, ClipDef, ClipKind, ClipSet, FrameRef, FrameSource,
    ImageFrameSource,
};

#[cfg(test)]
pub(crate) use table::tests::{StubFrames, ZOMBIE_CONFIG};

/// Asset loading errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Animation config not found: {0}")]
    ConfigMissing(String),

    #[error("Malformed animation config {path}: {reason}")]
    ConfigMalformed { path: String, reason: String },

    #[error("Animation not found: {0}")]
    AnimationNotFound(String),

    #[error("Failed to decode frame {path}: {reason}")]
    FrameDecode { path: String, reason: String },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start loader worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
