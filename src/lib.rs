//! Software-rendered snowfall.
//!
//! A fixed pool of particles falls through a host-owned 32-bit ARGB bitmap.
//! The host keeps a [`SnowState`] alive and calls [`update_and_render`] once
//! per frame with a [`PixelBuffer`] view and the seconds since the last frame.

pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod particles;
pub mod simulation;
pub mod util;

pub use color::{composite, NormalizedColor, PackedColor};
pub use display::{Bitmap, PixelBuffer};
pub use error::{Error, Result};
pub use particles::{Particle, ParticlePool, POOL_CAPACITY};
pub use simulation::{update_and_render, ReclaimPolicy, SnowState};
