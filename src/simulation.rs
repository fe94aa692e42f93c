//! Per-frame snowfall simulation
//!
//! `SnowState` is the persistent state the host keeps between frames. Each
//! call to `update_and_render` clears the buffer, maybe spawns a flake, then
//! moves and draws every pool slot.

use crate::color::NormalizedColor;
use crate::display::PixelBuffer;
use crate::particles::{Particle, ParticlePool};
use crate::util::Rng;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

pub const RNG_SEED: [u64; 2] = [0x0bdb1dd352d7ddd4, 0x009b18cd16d1df52];

/// Opaque dark blue sky
pub const BACKGROUND: NormalizedColor = NormalizedColor::new(1.0, 0.01, 0.02, 0.05);

const PARTICLE_RADIUS: f32 = 2.5;
const PARTICLE_LIFETIME: i32 = 200;
/// Vertical speed in buffer units per second
const FALL_SPEED: f32 = 160.0;
/// Spawn on every Nth tick
const SPAWN_INTERVAL: u64 = 2;
const SNOW_RED: f32 = 0.55;
const SNOW_GREEN: f32 = 0.9;
const SNOW_BLUE: f32 = 1.0;
const MIN_ALPHA: f32 = 0.25;

/// What happens to a slot once its particle has expired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReclaimPolicy {
    /// Expired slots stay checked out forever; spawning stops once every
    /// slot has been used
    #[default]
    Never,
    /// Expired slots go back on the free list
    OnExpiry,
}

/// Persistent simulation state, owned by the host across frames
#[derive(Debug, Clone)]
pub struct SnowState {
    pool: ParticlePool,
    rng: Rng,
    ticks: u64,
    reclaim: ReclaimPolicy,
    exhaustion_reported: bool,
}

impl SnowState {
    /// Seed the RNG and link every pool slot into the free list
    pub fn new(reclaim: ReclaimPolicy) -> Self {
        Self::with_pool(ParticlePool::new(), reclaim)
    }

    /// Same as `new` with a caller-sized pool
    pub fn with_pool(pool: ParticlePool, reclaim: ReclaimPolicy) -> Self {
        let mut state = Self {
            pool,
            rng: Rng::new(RNG_SEED[0], RNG_SEED[1]),
            ticks: 0,
            reclaim,
            exhaustion_reported: false,
        };
        state.reset();
        state
    }

    /// Back to the freshly initialized state; the reclaim policy is kept
    pub fn reset(&mut self) {
        self.pool.reset();
        self.rng = Rng::new(RNG_SEED[0], RNG_SEED[1]);
        self.ticks = 0;
        self.exhaustion_reported = false;
        debug!(
            "snow state initialized: {} slots, reclaim {:?}",
            self.pool.capacity(),
            self.reclaim
        );
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn reclaim(&self) -> ReclaimPolicy {
        self.reclaim
    }

    pub fn set_reclaim(&mut self, reclaim: ReclaimPolicy) {
        self.reclaim = reclaim;
    }

    /// Check out a slot and place a new flake just above the top edge.
    /// Returns `None` without side effects when the pool is exhausted.
    pub fn spawn(&mut self, width: u32) -> Option<usize> {
        let Some(index) = self.pool.acquire() else {
            if !self.exhaustion_reported {
                warn!(
                    "particle pool exhausted after {} ticks; spawning paused",
                    self.ticks
                );
                self.exhaustion_reported = true;
            }
            return None;
        };
        self.exhaustion_reported = false;

        let x = self.rng.below(width) as f32;
        let alpha = MIN_ALPHA + (1.0 - MIN_ALPHA) * self.rng.next_f32();
        let particle = Particle {
            x,
            y: -2.0 * PARTICLE_RADIUS,
            radius: PARTICLE_RADIUS,
            color: NormalizedColor::new(alpha, SNOW_RED, SNOW_GREEN, SNOW_BLUE),
            lifetime: PARTICLE_LIFETIME,
        };
        if let Some(slot) = self.pool.get_mut(index) {
            *slot = particle;
        }
        trace!("spawned particle {} at x={} alpha={:.3}", index, x, alpha);
        Some(index)
    }

    /// Advance one tick and draw the frame into `buffer`
    pub fn update_and_render(&mut self, buffer: &mut PixelBuffer, seconds_elapsed: f32) {
        buffer.clear(BACKGROUND.to_packed());

        if self.ticks % SPAWN_INTERVAL == 0 {
            self.spawn(buffer.width());
        }

        for index in 0..self.pool.capacity() {
            let Some(particle) = self.pool.get_mut(index) else {
                continue;
            };
            if particle.is_expired() {
                if self.reclaim == ReclaimPolicy::OnExpiry {
                    self.pool.release(index);
                }
                continue;
            }
            particle.animate(FALL_SPEED, seconds_elapsed);
            let (min_x, min_y, max_x, max_y) = particle.bounds();
            buffer.fill_rect(min_x, min_y, max_x, max_y, particle.color.to_packed());
        }

        self.ticks += 1;
    }
}

impl Default for SnowState {
    fn default() -> Self {
        Self::new(ReclaimPolicy::default())
    }
}

/// Frame entry point for hosts that prefer a free function
pub fn update_and_render(state: &mut SnowState, buffer: &mut PixelBuffer, seconds_elapsed: f32) {
    state.update_and_render(buffer, seconds_elapsed);
}
