// Type-safe asset handle system

use std::marker::PhantomData;
use std::path::Path;

/// Unique identifier for an asset, derived from its path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Create a new asset ID from a path
    ///
    /// Uses FNV-1a so ids are stable across runs and processes.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let path = path.as_ref().to_string_lossy();
        let mut hash = OFFSET_BASIS;
        for byte in path.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(PRIME);
        }
        Self(hash)
    }

    /// Get the raw u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Type-safe handle to a loaded asset
///
/// The `T` parameter ensures handles can only be used with the correct asset type.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct AssetHandle<T> {
    pub(crate) id: AssetId,
    _phantom: PhantomData<fn() -> T>,
}

// Manual impls: a handle is copyable whatever `T` is
impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AssetHandle<T> {}

impl<T> AssetHandle<T> {
    /// Create a new asset handle
    pub(crate) fn new(id: AssetId) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Handle for the asset stored at `path`
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        Self::new(AssetId::from_path(path))
    }

    /// Get the underlying asset ID
    pub fn id(&self) -> AssetId {
        self.id
    }
}

/// Marker for decoded animation frame images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameAsset;

/// Handle to a decoded frame image owned by an animation table
pub type FrameHandle = AssetHandle<FrameAsset>;
