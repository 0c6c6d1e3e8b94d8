//! Persona events for observing controller state changes.
//!
//! Renderers and persistence layers subscribe a [`PersonaListener`] to a
//! controller instead of polling it.

/// Event enum and emission envelope.
pub mod persona_event;

/// Per-controller listener registry.
pub mod event_bus;

pub use event_bus::{ListenerId, PersonaEventBus, PersonaListener};
pub use persona_event::{EventEnvelope, PersonaEvent};
