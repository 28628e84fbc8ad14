// Navigation: static walkability grid, A* search and throttled path following

pub mod grid;
pub mod path;

pub use grid::{Cell, WalkabilityGrid};
pub use path::{NavStep, NavTick, Navigator, PathOutcome, PathPlanner};

/// Navigation setup errors. These are fatal at map load.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("Walkability grid missing: {0}")]
    GridMissing(String),

    #[error("Invalid grid cell size: {0}")]
    InvalidCellSize(f32),
}
