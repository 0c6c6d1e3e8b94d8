//! Persona engine: trait voices, point budget, weights and archetypes.
//!
//! # Architecture
//!
//! ```text
//! AgentActivationModel      PointAllocator        learned weights (backend)
//!   off / on / disco          2..=6 per trait            │
//!         │                   sum <= budget              │
//!         │                        │  points / budget    │
//!         │                        └──────┬──────────────┘
//!         │                               ▼
//!         │                        settled WeightVector ─────▶ PersonaClassifier
//!         │                               │                      (16 archetypes)
//!         │                               ▼
//!         │                        WeightAnimator (eased tween)
//!         │                               │  displayed vector
//!         ▼                               ▼
//!      RenderFrame ◀──────────────── WeightProjector (chart geometry)
//! ```
//!
//! [`PersonaController`] owns all of it for one profile and notifies
//! listeners after every applied change.

pub mod activation;
pub mod animator;
pub mod archetype;
pub mod controller;
pub mod evolution;
pub mod points;
pub mod projection;
pub mod session;
pub mod trait_id;

// Re-exports
pub use activation::{AgentActivationModel, AgentActivationState};
pub use animator::{
    AnimationConfig, AnimationPhase, AnimationState, ManualScheduler, Scheduler, TickToken,
    WeightAnimator,
};
pub use archetype::{
    confidence, Archetype, ClassifierThresholds, PersonaClassification, PersonaClassifier,
    TraitRanking, ARCHETYPES,
};
pub use controller::{
    NoopSync, PersonaController, PointSync, ProfileSnapshot, RenderFrame, WeightSource,
};
pub use evolution::{
    dominant_trait, enforce_dominant_lead, evolve_from_signals, evolve_weights,
    points_from_weights, variability, weights_from_traits, EvolutionSignals, InteractionKind,
    ShiftKind, WeightShift,
};
pub use points::{
    preset_for, PointAllocation, PointAllocator, PointRules, TraitPreset, BUDGET, LEGACY_BUDGET,
    MAX_POINTS, MIN_POINTS, PRESETS,
};
pub use projection::{
    normalize, Point2, ProjectedPoint, ProjectorConfig, TrianglePath, WeightProjector,
    MAX_WEIGHT, MIN_WEIGHT,
};
pub use session::SessionWeights;
pub use trait_id::{ActivationMode, TraitId, TraitMap, WeightVector};
