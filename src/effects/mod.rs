//! Effect system for abilities and cards.
//!
//! - `Effect`: the closed union of things an ability or card can do
//! - `Targeting` / `RangeRule`: who an effect may be aimed at, and how far
//! - `EffectResolver`: executes effects on match state
//!
//! Effects are plain data, loaded from the roster table. Adding a hero
//! means adding rows, not code.

mod effect;
mod resolver;
mod targeting;

pub use effect::{Affects, AuraPulse, Effect, LineShape};
pub use resolver::{EffectResolver, Resolution, ResolveContext};
pub use targeting::{RangeRule, Target, Targeting};
