// Animation tables: named clips grouped per character preset
//
// One config file describes several presets:
//
// { "Army_zombie": { "Walk": { "anchor_x": 64, "anchor_y": 70, "width": 128,
//                              "height": 128, "frames": ["..."], "type": "Movement" } } }

use super::handle::{AssetId, FrameHandle};
use super::loader::AssetLoader;
use super::AssetError;
use glam::Vec2;
use image::RgbaImage;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_FRAME_SIZE: f32 = 128.0;

/// How a clip plays back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ClipKind {
    /// Loops forever and can be interrupted at any time
    Movement,
    /// Plays once and must reach its last frame before being replaced
    Action,
}

/// One frame of a clip: the image plus where to draw it relative to the body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRef {
    pub image: FrameHandle,
    pub offset: Vec2,
}

/// A single named animation
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub frames: Vec<FrameRef>,
    pub kind: ClipKind,
    pub width: f32,
    pub height: f32,
    /// Point of the image that sits on the body position
    pub pivot: Vec2,
}

impl AnimationClip {
    /// Build a clip; every frame shares the offset derived from the pivot
    pub fn new<P: AsRef<Path>>(
        name: &str,
        kind: ClipKind,
        width: f32,
        height: f32,
        pivot: Vec2,
        frame_paths: &[P],
    ) -> Self {
        let offset = Vec2::new(width / 2.0 - pivot.x, height / 2.0 - pivot.y);
        let frames = frame_paths
            .iter()
            .map(|path| FrameRef {
                image: FrameHandle::for_path(path),
                offset,
            })
            .collect();

        Self {
            name: name.to_string(),
            frames,
            kind,
            width,
            height,
            pivot,
        }
    }

    /// Looping clip with `count` synthetic frames, centred pivot
    pub fn movement(name: &str, count: usize) -> Self {
        Self::synthetic(name, ClipKind::Movement, count)
    }

    /// One-shot clip with `count` synthetic frames, centred pivot
    pub fn action(name: &str, count: usize) -> Self {
        Self::synthetic(name, ClipKind::Action, count)
    }

    fn synthetic(name: &str, kind: ClipKind, count: usize) -> Self {
        let paths: Vec<String> = (0..count).map(|i| format!("{}/{}.png", name, i)).collect();
        let pivot = Vec2::splat(DEFAULT_FRAME_SIZE / 2.0);
        Self::new(name, kind, DEFAULT_FRAME_SIZE, DEFAULT_FRAME_SIZE, pivot, &paths)
    }

    /// Number of frames in the clip
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index of the final frame
    pub fn last_frame(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    pub fn is_action(&self) -> bool {
        self.kind == ClipKind::Action
    }

    pub fn frame(&self, index: usize) -> Option<&FrameRef> {
        self.frames.get(index)
    }
}

/// Every clip of one character preset, ordered by name
#[derive(Debug, Clone, Default)]
pub struct ClipSet {
    clips: BTreeMap<String, AnimationClip>,
}

impl ClipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for in-memory presets
    pub fn with_clip(mut self, clip: AnimationClip) -> Self {
        self.insert(clip);
        self
    }

    pub fn insert(&mut self, clip: AnimationClip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    pub fn get(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

    /// Playable clip by name; a clip without frames counts as missing
    pub fn require(&self, name: &str) -> Result<&AnimationClip, AssetError> {
        self.clips
            .get(name)
            .filter(|clip| clip.frame_count() > 0)
            .ok_or_else(|| AssetError::AnimationNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Clip names in ascending order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Raw clip entry as written in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct ClipDef {
    #[serde(default = "default_frame_size")]
    pub width: f32,
    #[serde(default = "default_frame_size")]
    pub height: f32,
    #[serde(default, alias = "anchorX")]
    pub anchor_x: Option<f32>,
    #[serde(default, alias = "anchorY")]
    pub anchor_y: Option<f32>,
    pub frames: Vec<String>,
    #[serde(rename = "type", alias = "animationType")]
    pub kind: ClipKind,
}

fn default_frame_size() -> f32 {
    DEFAULT_FRAME_SIZE
}

impl ClipDef {
    /// Anchor point, defaulting to the image centre
    pub fn pivot(&self) -> Vec2 {
        Vec2::new(
            self.anchor_x.unwrap_or(self.width / 2.0),
            self.anchor_y.unwrap_or(self.height / 2.0),
        )
    }
}

/// Produces decoded frame images for the table being loaded
pub trait FrameSource: Send + Sync {
    fn load_frame(&self, path: &str) -> Result<Arc<RgbaImage>, AssetError>;
}

/// Decodes frames from disk with the `image` crate
#[derive(Debug, Clone, Default)]
pub struct ImageFrameSource {
    loader: AssetLoader,
}

impl ImageFrameSource {
    pub fn new(loader: AssetLoader) -> Self {
        Self { loader }
    }
}

impl FrameSource for ImageFrameSource {
    fn load_frame(&self, path: &str) -> Result<Arc<RgbaImage>, AssetError> {
        let resolved = self.loader.resolve_path(path);
        let decoded = image::open(&resolved).map_err(|e| AssetError::FrameDecode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        // Sprites are authored pointing down; flip once at load time
        Ok(Arc::new(image::imageops::flip_vertical(&decoded.into_rgba8())))
    }
}

/// All presets of one animation config file plus their decoded frames
#[derive(Debug, Default)]
pub struct AnimationTable {
    presets: HashMap<String, Arc<ClipSet>>,
    images: HashMap<AssetId, Arc<RgbaImage>>,
}

impl AnimationTable {
    /// Table with no presets; what a failed load leaves behind
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add an in-memory preset
    pub fn with_preset(mut self, name: &str, clips: ClipSet) -> Self {
        self.presets.insert(name.to_string(), Arc::new(clips));
        self
    }

    /// Parse a config file body, decoding every referenced frame once.
    ///
    /// A malformed clip is logged and skipped; the rest of its preset still loads.
    /// Only a body that is not a preset -> clip mapping fails as a whole.
    pub fn parse(json: &str, origin: &str, frames: &dyn FrameSource) -> Result<Self, AssetError> {
        let raw: BTreeMap<String, BTreeMap<String, serde_json::Value>> =
            serde_json::from_str(json).map_err(|e| AssetError::ConfigMalformed {
                path: origin.to_string(),
                reason: e.to_string(),
            })?;

        let mut table = Self::empty();
        for (preset_name, entries) in raw {
            let mut clips = ClipSet::new();
            for (clip_name, value) in entries {
                match table.build_clip(&clip_name, value, frames) {
                    Ok(clip) => clips.insert(clip),
                    Err(e) => log::warn!("{}: skipping clip {}/{}: {}", origin, preset_name, clip_name, e),
                }
            }
            log::debug!("{}: preset {} has {} clips", origin, preset_name, clips.len());
            table.presets.insert(preset_name, Arc::new(clips));
        }

        Ok(table)
    }

    fn build_clip(
        &mut self,
        name: &str,
        value: serde_json::Value,
        frames: &dyn FrameSource,
    ) -> Result<AnimationClip, AssetError> {
        let malformed = |reason: String| AssetError::ConfigMalformed {
            path: name.to_string(),
            reason,
        };

        let def: ClipDef = serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
        if def.frames.is_empty() {
            return Err(malformed("clip has no frames".to_string()));
        }
        if def.width <= 0.0 || def.height <= 0.0 {
            return Err(malformed(format!("invalid size {}x{}", def.width, def.height)));
        }

        // Decode everything first so a bad frame leaves no half-built clip behind
        let mut decoded = Vec::new();
        for path in &def.frames {
            let id = AssetId::from_path(path);
            if !self.images.contains_key(&id) {
                decoded.push((id, frames.load_frame(path)?));
            }
        }
        self.images.extend(decoded);

        Ok(AnimationClip::new(
            name,
            def.kind,
            def.width,
            def.height,
            def.pivot(),
            &def.frames,
        ))
    }

    /// Clips of a preset, if the file defines it
    pub fn preset(&self, name: &str) -> Option<Arc<ClipSet>> {
        self.presets.get(name).cloned()
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Decoded pixels for a frame
    pub fn image(&self, frame: FrameHandle) -> Option<&Arc<RgbaImage>> {
        self.images.get(&frame.id())
    }

    /// Number of distinct decoded frame images
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}
