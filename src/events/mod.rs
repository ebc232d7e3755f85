//! Typed events decoded from combat records.
//!
//! Each canonical [`CombatRecord`](crate::records::CombatRecord) becomes at
//! most one [`Event`]. The event carries the shared fields (relative time,
//! server and local wall-clock time, source agent) and an [`EventKind`]
//! with the kind-specific data, so a single `match` covers every kind.
//!
//! # Example
//!
//! ```ignore
//! use evtc::events::EventKind;
//!
//! let chain = evtc::parse(&data)?;
//! for event in &chain.events {
//!     if let EventKind::DirectDamage(hit) = &event.kind {
//!         println!("{} hit for {} ({:?})", event.time, hit.damage, hit.result);
//!     }
//! }
//! ```

mod classifier;
mod state_change;
mod types;

pub use classifier::classify;
pub use state_change::guild_uuid;
pub use types::{
    ActivationEnd, BuffApply, BuffDamage, BuffRemoval, BuffRemove, CombatContext, DirectDamage,
    Event, EventKind, HitResult, Iff, InitialBuff, LifeState, Overstack, SkillActivated,
    SkillActivation, Vector3,
};
