//! Shared utilities

use std::collections::VecDeque;
use std::time::Instant;

/// Deterministic RNG using xorshift128+
/// Owned by whoever needs randomness so runs are reproducible from the seed
#[derive(Debug, Clone)]
pub struct Rng {
    state: [u64; 2],
}

impl Rng {
    /// Create a new RNG from two seed words
    pub fn new(seed0: u64, seed1: u64) -> Self {
        // An all-zero state would only ever produce zeros
        if seed0 == 0 && seed1 == 0 {
            return Self { state: [1, 0] };
        }
        Self {
            state: [seed0, seed1],
        }
    }

    /// Get the next random u64
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut s1 = self.state[0];
        let s0 = self.state[1];
        let result = s0.wrapping_add(s1);
        self.state[0] = s0;
        s1 ^= s1 << 23;
        self.state[1] = s1 ^ s0 ^ (s1 >> 17) ^ (s0 >> 26);
        result
    }

    /// Get a random f32 in [0, 1)
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u32 << 24) as f32
    }

    /// Get a random integer in [0, bound); 0 when `bound` is 0
    #[inline]
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % u64::from(bound)) as u32
    }
}

// ============================================================================
// Frame Clock
// ============================================================================

/// Supplies elapsed seconds per frame and keeps a rolling FPS average
pub struct FrameClock {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
}

impl FrameClock {
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count: sample_count.max(1),
        }
    }

    /// Call once per frame; returns seconds since the previous call
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt);
        dt
    }

    fn record(&mut self, dt: f32) {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
    }

    /// Average frame time over the sample window, in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        let avg_dt: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        avg_dt * 1000.0
    }

    pub fn avg_fps(&self) -> f32 {
        let ms = self.avg_frame_time_ms();
        if ms > 0.0 {
            1000.0 / ms
        } else {
            0.0
        }
    }
}
