//! Events emitted by the persona controller after each applied change.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::persona::activation::AgentActivationState;
use crate::persona::archetype::PersonaClassification;
use crate::persona::controller::WeightSource;
use crate::persona::points::PointAllocation;
use crate::persona::trait_id::{TraitId, WeightVector};
use crate::utilities::errors::SyncError;

/// What changed.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonaEvent {
    /// Voice modes changed.
    ActivationChanged { state: AgentActivationState },
    /// Points or the manual dominant flag changed.
    PointsChanged {
        points: PointAllocation,
        dominant: Option<TraitId>,
    },
    /// The settled weight vector changed and an animation toward it started.
    WeightsRetargeted {
        target: WeightVector,
        source: WeightSource,
    },
    /// The settled classification changed.
    ClassificationChanged {
        classification: PersonaClassification,
    },
    /// The displayed vector reached its target.
    AnimationSettled { displayed: WeightVector },
    /// Persisting points to the backend failed; local state was kept.
    SyncFailed {
        points: PointAllocation,
        error: SyncError,
    },
}

impl PersonaEvent {
    /// Stable discriminator string, e.g. `"points_changed"`.
    pub fn event_type(&self) -> &'static str {
        match self {
            PersonaEvent::ActivationChanged { .. } => "activation_changed",
            PersonaEvent::PointsChanged { .. } => "points_changed",
            PersonaEvent::WeightsRetargeted { .. } => "weights_retargeted",
            PersonaEvent::ClassificationChanged { .. } => "classification_changed",
            PersonaEvent::AnimationSettled { .. } => "animation_settled",
            PersonaEvent::SyncFailed { .. } => "sync_failed",
        }
    }
}

/// A [`PersonaEvent`] stamped at emission.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Monotonic per-bus emission counter, starting at 1.
    pub sequence: u64,
    pub event: PersonaEvent,
}

impl EventEnvelope {
    pub fn new(sequence: u64, event: PersonaEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sequence,
            event,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
