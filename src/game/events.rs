// Advisory gameplay events for UI and telemetry collaborators
//
// Nothing in the core reads these back; dropping them never changes behavior.

use super::characters::state::EntityState;
pub use crate::engine::navigation::PathOutcome;
use glam::Vec2;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Identifier of a character in the world
pub type EntityId = u32;

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    StateChanged {
        entity: EntityId,
        from: EntityState,
        to: EntityState,
    },

    /// An attack trigger dealt damage
    AttackLanded {
        attacker: EntityId,
        target: EntityId,
        damage: f32,
        remaining_health: f32,
    },

    /// A spawn batch was placed
    SpawnSelected {
        requested: usize,
        positions: Vec<Vec2>,
        from_spawn_points: bool,
    },

    PathSearched {
        entity: EntityId,
        outcome: PathOutcome,
    },
}

/// Events kept before the oldest ones are dropped
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct EventBuffer {
    events: VecDeque<GameEvent>,
    capacity: usize,
    dropped: u64,
}

/// Shared queue of events produced during ticks
///
/// Clones share the same buffer, so systems can each hold one. The buffer is
/// bounded: when nobody drains it, the oldest events make room for new ones.
#[derive(Debug, Clone)]
pub struct EventQueue {
    buffer: Arc<Mutex<EventBuffer>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Queue holding at most `capacity` events (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Arc::new(Mutex::new(EventBuffer {
                events: VecDeque::with_capacity(capacity.min(32)), // Pre-allocate for common case
                capacity,
                dropped: 0,
            })),
        }
    }

    /// Add an event, evicting the oldest one when full
    pub fn push(&self, event: GameEvent) {
        if let Ok(mut buffer) = self.buffer.lock() {
            if buffer.events.len() >= buffer.capacity {
                buffer.events.pop_front();
                if buffer.dropped == 0 {
                    log::debug!("Event queue full ({}), dropping oldest events", buffer.capacity);
                }
                buffer.dropped += 1;
            }
            buffer.events.push_back(event);
        }
    }

    /// Take every queued event, leaving the queue empty
    pub fn drain(&self) -> Vec<GameEvent> {
        self.buffer
            .lock()
            .map(|mut buffer| buffer.events.drain(..).collect())
            .unwrap_or_default()
    }

    /// Copy of the queued events
    pub fn events(&self) -> Vec<GameEvent> {
        self.buffer
            .lock()
            .map(|buffer| buffer.events.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Clear all events
    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.events.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().map(|buffer| buffer.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.buffer.lock().map(|buffer| buffer.capacity).unwrap_or(0)
    }

    /// Events evicted unread since the queue was created
    pub fn dropped(&self) -> u64 {
        self.buffer.lock().map(|buffer| buffer.dropped).unwrap_or(0)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let queue = EventQueue::new();
        let producer = queue.clone();

        producer.push(GameEvent::PathSearched {
            entity: 3,
            outcome: PathOutcome::Failed,
        });

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.events().len(), 1);
    }

    #[test]
    fn test_drain_empties_queue() {
        let queue = EventQueue::new();
        queue.push(GameEvent::StateChanged {
            entity: 1,
            from: EntityState::Idle,
            to: EntityState::Walking,
        });

        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let queue = EventQueue::with_capacity(3);
        for entity in 0..5 {
            queue.push(GameEvent::PathSearched {
                entity,
                outcome: PathOutcome::Failed,
            });
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped(), 2);
        let kept: Vec<EntityId> = queue
            .drain()
            .into_iter()
            .map(|event| match event {
                GameEvent::PathSearched { entity, .. } => entity,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(kept, vec![2, 3, 4]);
    }

    #[test]
    fn test_clear() {
        let queue = EventQueue::new();
        queue.push(GameEvent::PathSearched {
            entity: 1,
            outcome: PathOutcome::Found { waypoints: 4 },
        });
        queue.clear();
        assert!(queue.is_empty());
    }
}
