/// Fixed-step simulation clock
///
/// Wall-clock frame time is accumulated and paid out as whole simulation
/// steps, so the character core always ticks with the same dt no matter how
/// unevenly the host calls in.
use std::time::{Duration, Instant};

/// Simulation rate (60 ticks per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667);

/// Maximum ticks paid out per frame to prevent a spiral of death
const MAX_STEPS_PER_FRAME: u32 = 5;

/// Fixed-step clock state
pub struct GameLoop {
    accumulator: Duration,
    last_frame_time: Instant,

    /// Simulated time actually paid out as ticks
    simulated: Duration,

    paused: bool,
    frame_count: u64,
    tick_count: u64,

    /// Frames whose backlog exceeded the step cap
    dropped_frames: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            accumulator: Duration::ZERO,
            last_frame_time: Instant::now(),
            simulated: Duration::ZERO,
            paused: false,
            frame_count: 0,
            tick_count: 0,
            dropped_frames: 0,
        }
    }

    /// Begin a frame using wall-clock time, returns the number of ticks to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Begin a frame of the given length, returns the number of ticks to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= FIXED_TIMESTEP_DURATION && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= FIXED_TIMESTEP_DURATION;
            steps += 1;
        }

        // Drop the backlog instead of carrying it into the next frame
        if self.accumulator >= FIXED_TIMESTEP_DURATION {
            log::debug!(
                "Frame {} fell behind by {:?}, dropping backlog",
                self.frame_count,
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
            self.dropped_frames += 1;
        }

        self.tick_count += steps as u64;
        self.simulated += FIXED_TIMESTEP_DURATION * steps;
        steps
    }

    /// Tick length in seconds
    pub fn fixed_timestep(&self) -> f32 {
        FIXED_TIMESTEP
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / FIXED_TIMESTEP
    }

    /// Simulated time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.simulated.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset so the pause is not paid out as a burst of ticks
            self.accumulator = Duration::ZERO;
            self.last_frame_time = Instant::now();
            log::info!("Simulation resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}
