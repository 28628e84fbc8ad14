// Engine modules: assets, physics, navigation, game loop

pub mod assets;
pub mod game_loop;
pub mod navigation;
pub mod physics;
