// Game logic: characters, spawning, maps and the world that ties them together

pub mod characters;
pub mod events;
pub mod map;
pub mod spawning;
pub mod world;

pub use events::{EntityId, EventQueue, GameEvent, DEFAULT_EVENT_CAPACITY};
pub use map::{MapData, MapError, MapPoint};
pub use spawning::{SpawnBatch, SpawnManager, SpawnPoint, SpawnStats};
pub use world::World;
