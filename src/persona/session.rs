//! Short-term, per-conversation weight boosts.
//!
//! Base weights move slowly across the user's whole history.  Within one
//! conversation the voices that just spoke get an extra, fading boost so
//! turn-taking follows the flow of the exchange.  Each exchange first
//! decays the boosts by 10%, then adds fresh ones for the voices that
//! responded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trait_id::{TraitId, WeightVector};

/// Multiplier applied to every boost at the start of an exchange.
pub const SESSION_DECAY: f64 = 0.9;
/// Boost for the voice that answered first.
pub const PRIMARY_SESSION_BOOST: f64 = 0.02;
/// Boost for supporting voices and every voice in a full-disco exchange.
pub const SUPPORT_SESSION_BOOST: f64 = 0.015;

/// Boosts owned by a single conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWeights {
    pub conversation_id: Uuid,
    pub boosts: WeightVector,
    pub updated_at: DateTime<Utc>,
}

impl SessionWeights {
    /// Fresh boosts for a new conversation.
    pub fn new(conversation_id: Uuid) -> Self {
        Self {
            conversation_id,
            boosts: WeightVector::new(0.0, 0.0, 0.0),
            updated_at: Utc::now(),
        }
    }

    /// Fresh boosts under a newly generated conversation id.
    pub fn start() -> Self {
        Self::new(Uuid::new_v4())
    }

    /// Fade every boost by [`SESSION_DECAY`].
    pub fn decay(&mut self) {
        self.boosts = self.boosts.map(|_, b| b * SESSION_DECAY);
        self.updated_at = Utc::now();
    }

    pub fn boost(&mut self, id: TraitId, amount: f64) {
        *self.boosts.get_mut(id) += amount;
        self.updated_at = Utc::now();
    }

    /// Record one exchange: decay, then boost the primary and supporting voices.
    pub fn record_exchange(&mut self, primary: TraitId, supporting: &[TraitId]) {
        self.decay();
        self.boost(primary, PRIMARY_SESSION_BOOST);
        for id in supporting.iter().filter(|id| **id != primary) {
            self.boost(*id, SUPPORT_SESSION_BOOST);
        }
        log::debug!(
            "session {} boosts now {:?}",
            self.conversation_id,
            self.boosts
        );
    }

    /// Weights used for routing this conversation's next turn.
    ///
    /// Not renormalized: the boosts are small relative offsets on top of
    /// the base vector.
    pub fn routing_weights(&self, base: &WeightVector) -> WeightVector {
        WeightVector::from_fn(|id| base.get(id) + self.boosts.get(id))
    }
}
