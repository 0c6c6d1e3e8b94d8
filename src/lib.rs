//! # intersect-persona
//!
//! Trait weight and persona classification engine for the Intersect inner
//! voices: Snap (instinct), Dot (logic) and Puff (psyche).
//!
//! The engine decides which voices speak and how, spreads a fixed point
//! budget across the three traits, turns the resulting weights into chart
//! geometry with an eased transition, and labels the weight triple with
//! one of sixteen personality archetypes.
//!
//! Everything is single-threaded and host-driven: the host supplies time
//! (`Instant`), a tick [`Scheduler`](persona::Scheduler) and a backend
//! [`PointSync`](persona::PointSync), and receives events and render frames.

pub mod events;
pub mod persona;
pub mod utilities;

// Re-exports
pub use events::{EventEnvelope, PersonaEvent, PersonaListener};
pub use persona::{
    AgentActivationState, PersonaClassification, PersonaController, ProfileSnapshot, RenderFrame,
    TraitId, WeightVector,
};
pub use utilities::{EngineConfig, PersonaError, Result, SyncError};
