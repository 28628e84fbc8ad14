// Physics: movement integration and static obstacle queries
//
// There is no collision response here; bodies are moved by their velocity
// and obstacles are only queried (path grids, spawn validation).

pub mod movement;
pub mod obstacles;

pub use movement::Kinematics;
pub use obstacles::{ObstacleMap, Rect};
