//! Status effects and the per-turn passes that tick them.
//!
//! - `StatusBucket`: independent slots per character (burn, root, iron
//!   skin, invisibility, transform, redirect, pending buff)
//! - `ticks`: start-of-turn and end-of-turn passes over characters,
//!   walls and auras

pub mod bucket;
pub mod ticks;

pub use bucket::{StatusBucket, StatusEffect};
