// Per-character animation playback
//
// Frames advance on a fixed cadence. Movement clips loop and never lock;
// Action clips play once and hold the overwrite lock until their last frame
// has been shown for a full cadence step.

use super::state::EntityState;
use crate::engine::assets::{AnimationClip, ClipKind, FrameRef, PresetHandle};
use glam::Vec2;
use std::collections::HashSet;

/// Playback state of one character
#[derive(Debug, Clone)]
pub struct Animator {
    preset: PresetHandle,
    current: Option<String>,
    frame_index: usize,
    time_in_frame: f32,
    overwrite_locked: bool,
    frame_duration: f32,
    /// Frame currently displayed; kept when a clip goes missing
    current_frame: Option<FrameRef>,
    /// Names already reported as missing
    missing_logged: HashSet<String>,
}

impl Animator {
    pub fn new(preset: PresetHandle, frame_duration: f32) -> Self {
        Self {
            preset,
            current: None,
            frame_index: 0,
            time_in_frame: 0.0,
            overwrite_locked: false,
            frame_duration: frame_duration.max(f32::EPSILON),
            current_frame: None,
            missing_logged: HashSet::new(),
        }
    }

    pub fn preset(&self) -> &PresetHandle {
        &self.preset
    }

    /// Switch to a clip, keeping playback if it is already current
    ///
    /// Returns true when `name` is the current clip afterwards.
    pub fn set_animation(&mut self, name: &str) -> bool {
        if self.current.as_deref() == Some(name) {
            return true;
        }
        self.start(name)
    }

    /// Switch to a clip and play it from its first frame, even if current
    pub fn restart_animation(&mut self, name: &str) -> bool {
        self.start(name)
    }

    fn start(&mut self, name: &str) -> bool {
        if self.overwrite_locked && self.current.as_deref() != Some(name) {
            log::trace!(
                "{}: '{}' rejected while {:?} is locked",
                self.preset.name(),
                name,
                self.current
            );
            return false;
        }

        let Some(clips) = self.preset.clips() else {
            // Config still loading or failed; nothing to switch to yet
            return false;
        };
        let clip = match clips.require(name) {
            Ok(clip) => clip,
            Err(err) => {
                if self.missing_logged.insert(name.to_string()) {
                    log::warn!("{}: {}", self.preset.name(), err);
                }
                return false;
            }
        };

        self.current = Some(clip.name.clone());
        self.frame_index = 0;
        self.time_in_frame = 0.0;
        self.overwrite_locked = clip.kind == ClipKind::Action;
        // Show the first frame right away instead of on the next cadence step
        self.current_frame = clip.frame(0).copied();
        true
    }

    /// Advance playback by `dt`; `state` is the owner's current state
    pub fn advance(&mut self, dt: f32, state: EntityState) {
        let Some(clips) = self.preset.clips() else {
            return;
        };
        let Some(clip) = self.current.as_deref().and_then(|name| clips.get(name)) else {
            return;
        };

        self.time_in_frame += dt;
        if self.time_in_frame >= self.frame_duration {
            self.time_in_frame = 0.0;
            self.step(clip);
        }

        // Standing still on a movement clip shows its first frame
        if state == EntityState::Idle && clip.kind == ClipKind::Movement {
            self.frame_index = 0;
        }

        self.frame_index = self.frame_index.min(clip.last_frame());
        self.current_frame = clip.frame(self.frame_index).copied();
    }

    fn step(&mut self, clip: &AnimationClip) {
        match clip.kind {
            ClipKind::Movement => {
                self.frame_index = (self.frame_index + 1) % clip.frame_count().max(1);
                self.overwrite_locked = false;
            }
            ClipKind::Action => {
                if self.frame_index < clip.last_frame() {
                    self.frame_index += 1;
                } else {
                    self.overwrite_locked = false;
                }
            }
        }
    }

    pub fn is_locked(&self) -> bool {
        self.overwrite_locked
    }

    pub fn current_clip_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn time_in_frame(&self) -> f32 {
        self.time_in_frame
    }

    pub fn frame_duration(&self) -> f32 {
        self.frame_duration
    }

    /// Frame to draw, if any clip has been shown yet
    pub fn frame_data(&self) -> Option<FrameRef> {
        self.current_frame
    }

    /// Draw offset of the displayed frame
    pub fn draw_offset(&self) -> Vec2 {
        self.current_frame.map(|frame| frame.offset).unwrap_or(Vec2::ZERO)
    }
}
