//! Fixed-capacity particle pool
//!
//! Slots live in one preallocated array and are handed out by index from a
//! stack of free indices, so acquiring (and releasing) is O(1) and never
//! allocates after construction.

use crate::color::NormalizedColor;

/// Number of particle slots in the pool
pub const POOL_CAPACITY: usize = 256;

/// A single snow particle, drawn as a square of half-extent `radius`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: NormalizedColor,
    /// Remaining ticks; keeps counting down past zero
    pub lifetime: i32,
}

impl Particle {
    /// Counted down past zero. A fresh (never spawned) slot has lifetime 0
    /// and is not expired yet.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.lifetime != 0 && self.lifetime < 1
    }

    /// Advance one tick: fall at `fall_speed` units/second, age by one tick
    /// regardless of how much time passed
    #[inline]
    pub fn animate(&mut self, fall_speed: f32, seconds_elapsed: f32) {
        self.y += fall_speed * seconds_elapsed;
        self.lifetime -= 1;
    }

    /// Bounds as (min_x, min_y, max_x, max_y)
    #[inline]
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        (
            self.x - self.radius,
            self.y - self.radius,
            self.x + self.radius,
            self.y + self.radius,
        )
    }
}

/// Particle slots plus a free list of slot indices
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    free: Vec<usize>,
    checked_out: Vec<bool>,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::with_capacity(POOL_CAPACITY)
    }

    /// Build a pool with every slot free; slot 0 is handed out first
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::default(); capacity],
            free: (0..capacity).rev().collect(),
            checked_out: vec![false; capacity],
        }
    }

    /// Return every slot to its default state and relink the free list
    pub fn reset(&mut self) {
        self.slots.fill(Particle::default());
        self.checked_out.fill(false);
        self.free.clear();
        self.free.extend((0..self.slots.len()).rev());
    }

    /// Take the next free slot, or `None` when the pool is exhausted
    pub fn acquire(&mut self) -> Option<usize> {
        let index = self.free.pop()?;
        self.checked_out[index] = true;
        Some(index)
    }

    /// Put a checked-out slot back on the free list.
    /// Returns false (and does nothing) if the slot is already free or out of range.
    pub fn release(&mut self, index: usize) -> bool {
        match self.checked_out.get_mut(index) {
            Some(out) if *out => {
                *out = false;
                self.free.push(index);
                true
            },
            _ => false,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots still available to `acquire`
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.free.is_empty()
    }

    #[inline]
    pub fn is_checked_out(&self, index: usize) -> bool {
        self.checked_out.get(index).copied().unwrap_or(false)
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.slots.get_mut(index)
    }

    /// All slots, checked out or not
    pub fn slots(&self) -> &[Particle] {
        &self.slots
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new()
    }
}
