//! Character behavior core of a top-down zombie survival game.
//!
//! Data-driven sprite animation, a four-state character state machine,
//! friction-based movement, throttled A* pursuit and wandering for zombies,
//! and weighted spawn point selection. Rendering, windowing and input are
//! left to the host.

pub mod config;
pub mod core;
pub mod engine;
pub mod game;
