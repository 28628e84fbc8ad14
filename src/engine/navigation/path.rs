// Throttled path following for a single agent

use glam::Vec2;
use std::collections::VecDeque;

/// Anything that can plan a route between two world positions
pub trait PathPlanner {
    /// Waypoints from the start cell to the goal cell, or None if unreachable
    fn find_path(&self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>>;

    /// Distance under which a waypoint counts as reached
    fn cell_size(&self) -> f32;
}

/// Result of one path search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    /// A path with this many waypoints (goal included) replaced the old one
    Found { waypoints: usize },
    /// No route exists; the agent idles until the next search
    Failed,
}

/// What the agent should do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavStep {
    /// Move along this (unnormalised) direction
    Steer(Vec2),
    /// The front waypoint was reached and dropped; no movement this tick
    Arrived,
    /// Nothing to follow
    Idle,
}

/// Outcome of one `Navigator::goto` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavTick {
    pub step: NavStep,
    /// Set when a search ran this tick
    pub searched: Option<PathOutcome>,
}

/// Per-agent path state with a search throttle
#[derive(Debug, Clone)]
pub struct Navigator {
    path: VecDeque<Vec2>,
    timer: f32,
    delay: f32,
    searches: u32,
}

impl Navigator {
    pub fn new(pathfind_delay: f32) -> Self {
        Self {
            path: VecDeque::new(),
            timer: 0.0,
            delay: pathfind_delay.max(0.0),
            searches: 0,
        }
    }

    /// Head towards `target`, searching again once the throttle expires
    ///
    /// The throttle timer accumulates `dt` and a search runs only when it
    /// exceeds the delay, so at most one search happens per delay window.
    pub fn goto(&mut self, position: Vec2, target: Vec2, dt: f32, planner: &dyn PathPlanner) -> NavTick {
        self.timer += dt;

        let mut searched = None;
        if self.timer > self.delay {
            self.timer = 0.0;
            searched = Some(self.replan(position, target, planner));
        }

        NavTick {
            step: self.follow(position, planner.cell_size()),
            searched,
        }
    }

    fn replan(&mut self, position: Vec2, target: Vec2, planner: &dyn PathPlanner) -> PathOutcome {
        self.searches += 1;

        match planner.find_path(position, target) {
            Some(waypoints) if waypoints.len() >= 2 => {
                self.path = waypoints.into();
                self.path.push_back(target);
            }
            // Already in the goal cell: walk straight at the target
            Some(_) => {
                self.path.clear();
                self.path.push_back(target);
            }
            None => {
                log::debug!("No path from {:?} to {:?}", position, target);
                self.path.clear();
                return PathOutcome::Failed;
            }
        }

        PathOutcome::Found {
            waypoints: self.path.len(),
        }
    }

    fn follow(&mut self, position: Vec2, arrive_distance: f32) -> NavStep {
        let Some(&next) = self.path.front() else {
            return NavStep::Idle;
        };

        if position.distance(next) < arrive_distance {
            self.path.pop_front();
            NavStep::Arrived
        } else {
            NavStep::Steer(next - position)
        }
    }

    pub fn clear(&mut self) {
        self.path.clear();
    }

    pub fn path(&self) -> impl Iterator<Item = &Vec2> {
        self.path.iter()
    }

    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of searches run so far
    pub fn search_count(&self) -> u32 {
        self.searches
    }

    /// Forget the throttle and path, e.g. when the agent is respawned
    pub fn reset(&mut self) {
        self.path.clear();
        self.timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Planner that returns a fixed answer and counts calls
    struct FixedPlanner {
        answer: Option<Vec<Vec2>>,
        calls: Cell<u32>,
    }

    impl FixedPlanner {
        fn new(answer: Option<Vec<Vec2>>) -> Self {
            Self {
                answer,
                calls: Cell::new(0),
            }
        }
    }

    impl PathPlanner for FixedPlanner {
        fn find_path(&self, _from: Vec2, _to: Vec2) -> Option<Vec<Vec2>> {
            self.calls.set(self.calls.get() + 1);
            self.answer.clone()
        }

        fn cell_size(&self) -> f32 {
            30.0
        }
    }

    #[test]
    fn test_throttle_limits_searches() {
        let planner = FixedPlanner::new(Some(vec![Vec2::ZERO, Vec2::new(500.0, 0.0)]));
        let mut nav = Navigator::new(1.0);

        // 3.05 simulated seconds at 100 Hz
        for _ in 0..305 {
            nav.goto(Vec2::new(100.0, 100.0), Vec2::new(900.0, 0.0), 0.01, &planner);
        }

        assert_eq!(planner.calls.get(), 3);
        assert_eq!(nav.search_count(), 3);
    }

    #[test]
    fn test_found_path_gets_goal_appended() {
        let planner = FixedPlanner::new(Some(vec![Vec2::ZERO, Vec2::new(30.0, 0.0)]));
        let mut nav = Navigator::new(0.0);
        let target = Vec2::new(40.0, 5.0);

        let tick = nav.goto(Vec2::new(-100.0, 0.0), target, 0.1, &planner);
        assert_eq!(tick.searched, Some(PathOutcome::Found { waypoints: 3 }));
        assert_eq!(nav.path().last(), Some(&target));
        assert!(matches!(tick.step, NavStep::Steer(_)));
    }

    #[test]
    fn test_short_result_walks_straight_at_target() {
        let planner = FixedPlanner::new(Some(vec![Vec2::ZERO]));
        let mut nav = Navigator::new(0.0);
        let target = Vec2::new(200.0, 0.0);

        let tick = nav.goto(Vec2::ZERO, target, 0.1, &planner);
        assert_eq!(tick.searched, Some(PathOutcome::Found { waypoints: 1 }));
        assert_eq!(tick.step, NavStep::Steer(target));
    }

    #[test]
    fn test_failed_search_clears_path() {
        let planner = FixedPlanner::new(None);
        let mut nav = Navigator::new(0.0);

        let tick = nav.goto(Vec2::ZERO, Vec2::new(200.0, 0.0), 0.1, &planner);
        assert_eq!(tick.searched, Some(PathOutcome::Failed));
        assert_eq!(tick.step, NavStep::Idle);
        assert!(!nav.has_path());
    }

    #[test]
    fn test_arrival_pops_without_moving() {
        let planner = FixedPlanner::new(Some(vec![Vec2::new(10.0, 0.0), Vec2::new(60.0, 0.0)]));
        let mut nav = Navigator::new(0.0);

        // First waypoint is within one cell of the agent
        let tick = nav.goto(Vec2::ZERO, Vec2::new(100.0, 0.0), 0.1, &planner);
        assert_eq!(tick.step, NavStep::Arrived);
        assert_eq!(nav.path_len(), 2);
    }

    #[test]
    fn test_no_search_before_delay() {
        let planner = FixedPlanner::new(Some(vec![Vec2::ZERO, Vec2::ONE]));
        let mut nav = Navigator::new(1.0);

        let tick = nav.goto(Vec2::ZERO, Vec2::new(100.0, 0.0), 0.5, &planner);
        assert!(tick.searched.is_none());
        assert_eq!(tick.step, NavStep::Idle);
        assert_eq!(planner.calls.get(), 0);
    }
}
