//! Learned weight evolution.
//!
//! Weights drift toward the voices a user keeps choosing.  Drift is large
//! for new users and shrinks as the message count grows:
//!
//! ```text
//! variability(n) = 1 - sqrt(min(n / 10_000, 1))
//!
//!   n       0     100    1000   2500   10000
//!   var     1.00  0.90   0.68   0.50   0.00
//! ```
//!
//! Every update clamps each weight to `[0.10, 0.60]` and renormalizes, so no
//! voice can vanish or take over entirely.

use serde::{Deserialize, Serialize};

use super::points::{PointAllocation, PointRules};
use super::trait_id::{TraitId, TraitMap, WeightVector};

/// Message count at which learned weights stop moving.
pub const RIGIDITY_MESSAGES: f64 = 10_000.0;
/// Floor for any learned weight before renormalization.
pub const EVOLVED_MIN_WEIGHT: f64 = 0.10;
/// Ceiling for any learned weight before renormalization.
pub const EVOLVED_MAX_WEIGHT: f64 = 0.60;
/// Minimum margin the dominant trait keeps over the others.
pub const DOMINANT_LEAD: f64 = 0.10;

const PRIMARY_BOOST: f64 = 0.02;
const SECONDARY_BOOST: f64 = 0.015;
const INTRINSIC_BOOST: f64 = 0.015;
const ENGAGEMENT_BOOST: f64 = 0.03;
/// Neutral intrinsic signal; values above it pull the weight up.
const INTRINSIC_BASELINE: f64 = 0.33;
/// Disco replies count half toward engagement.
const DISCO_DAMPENING: f64 = 0.5;

/// Trait with the largest weight; ties go logic, then psyche, then instinct.
pub fn dominant_trait(weights: &WeightVector) -> TraitId {
    let (i, l, p) = (weights.instinct, weights.logic, weights.psyche);
    if l >= i && l >= p {
        TraitId::Logic
    } else if p >= i && p >= l {
        TraitId::Psyche
    } else {
        TraitId::Instinct
    }
}

/// How far a single interaction may still move the weights, in `[0, 1]`.
pub fn variability(total_messages: u64) -> f64 {
    let progress = (total_messages as f64 / RIGIDITY_MESSAGES).min(1.0);
    1.0 - progress.sqrt()
}

fn clamp_and_normalize(weights: WeightVector) -> WeightVector {
    weights
        .map(|_, w| {
            let w = if w.is_finite() { *w } else { EVOLVED_MIN_WEIGHT };
            w.clamp(EVOLVED_MIN_WEIGHT, EVOLVED_MAX_WEIGHT)
        })
        .normalized()
}

// ============================================================================
// Interaction-driven evolution
// ============================================================================

/// How a voice took part in an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    ChosenAsPrimary,
    ChosenAsSecondary,
}

impl InteractionKind {
    pub fn base_boost(&self) -> f64 {
        match self {
            InteractionKind::ChosenAsPrimary => PRIMARY_BOOST,
            InteractionKind::ChosenAsSecondary => SECONDARY_BOOST,
        }
    }
}

/// Nudge `current` toward `id` after it took part in an exchange.
pub fn evolve_weights(
    current: &WeightVector,
    id: TraitId,
    interaction: InteractionKind,
    total_messages: u64,
) -> WeightVector {
    let boost = interaction.base_boost() * variability(total_messages);
    let mut next = *current;
    *next.get_mut(id) += boost;
    clamp_and_normalize(next)
}

/// Per-trait signals extracted from one exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSignals {
    /// How strongly the user engaged with each voice, in `[-1, 1]`.
    #[serde(default)]
    pub engagement: Option<TraitMap<f64>>,
    /// How much each trait showed in the user's own message, in `[0, 1]`.
    #[serde(default)]
    pub intrinsic: Option<TraitMap<f64>>,
    /// The exchange happened in disco mode.
    #[serde(default)]
    pub disco: bool,
}

/// Apply analysed engagement and intrinsic signals to `current`.
///
/// Intrinsic signals move weights relative to a neutral 0.33 baseline;
/// engagement scores move them directly and count half in disco mode.
pub fn evolve_from_signals(
    current: &WeightVector,
    signals: &EvolutionSignals,
    total_messages: u64,
) -> WeightVector {
    let var = variability(total_messages);
    let mut next = *current;

    if let Some(intrinsic) = &signals.intrinsic {
        for (id, signal) in intrinsic.iter() {
            *next.get_mut(id) += (signal - INTRINSIC_BASELINE) * INTRINSIC_BOOST * var;
        }
    }

    if let Some(engagement) = &signals.engagement {
        let multiplier = if signals.disco { DISCO_DAMPENING } else { 1.0 };
        for (id, score) in engagement.iter() {
            *next.get_mut(id) += score.clamp(-1.0, 1.0) * ENGAGEMENT_BOOST * var * multiplier;
        }
    }

    clamp_and_normalize(next)
}

// ============================================================================
// Seeding and migration
// ============================================================================

/// Initial learned weights from a dominant and secondary pick: 0.5 / 0.3 / 0.2.
///
/// When both picks name the same trait it gets 0.3 and the others 0.2
/// before renormalization.
pub fn weights_from_traits(dominant: TraitId, secondary: TraitId) -> WeightVector {
    let mut w = WeightVector::new(0.2, 0.2, 0.2);
    w.set(dominant, 0.5);
    w.set(secondary, 0.3);
    w.normalized()
}

/// Raise `dominant` to at least [`DOMINANT_LEAD`] above the others, then
/// renormalize.
pub fn enforce_dominant_lead(weights: &WeightVector, dominant: TraitId) -> WeightVector {
    let max_other = weights
        .iter()
        .filter(|(id, _)| *id != dominant)
        .map(|(_, w)| *w)
        .fold(f64::MIN, f64::max);
    let mut next = *weights;
    if *next.get(dominant) < max_other + DOMINANT_LEAD {
        next.set(dominant, max_other + DOMINANT_LEAD);
    }
    next.normalized()
}

/// Convert learned weights to a point allocation under `rules`.
///
/// Each trait gets `round(w * budget)` clamped to the per-trait bounds.
/// Rounding can overshoot the budget; the excess is taken from the largest
/// allocation, lowest priority trait first.
pub fn points_from_weights(weights: &WeightVector, rules: &PointRules) -> PointAllocation {
    let budget = f64::from(rules.budget);
    let mut points = weights.map(|_, w| {
        let w = if w.is_finite() { *w } else { 0.0 };
        (w * budget)
            .round()
            .clamp(f64::from(rules.min_points), f64::from(rules.max_points)) as u8
    });

    while points.total() > u16::from(rules.budget) {
        // max_by_key keeps the last maximum, so iterate highest priority first.
        let trim = TraitId::TIE_BREAK_ORDER
            .into_iter()
            .filter(|id| *points.get(*id) > rules.min_points)
            .max_by_key(|id| *points.get(*id));
        match trim {
            Some(id) => *points.get_mut(id) -= 1,
            None => break,
        }
    }
    points
}

// ============================================================================
// Change notification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftKind {
    /// Small adjustment, dominant unchanged.
    Minor,
    /// Noticeable movement, dominant unchanged.
    Shift,
    /// The dominant trait changed.
    MajorShift,
}

/// User-facing summary of a learned weight update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightShift {
    pub change_type: ShiftKind,
    pub message: String,
    pub old_dominant: TraitId,
    pub new_dominant: TraitId,
}

impl WeightShift {
    /// Below this total absolute movement nothing is reported.
    pub const REPORT_THRESHOLD: f64 = 0.01;
    /// Above this total absolute movement a same-dominant change is a `Shift`.
    pub const SHIFT_THRESHOLD: f64 = 0.03;

    /// Describe the move from `old` to `new`, attributing it to `primary`.
    pub fn detect(
        old: &WeightVector,
        new: &WeightVector,
        primary: TraitId,
        had_secondary: bool,
    ) -> Option<Self> {
        let total_shift = old.total_shift(new);
        if total_shift < Self::REPORT_THRESHOLD {
            return None;
        }

        let old_dominant = dominant_trait(old);
        let new_dominant = dominant_trait(new);
        let voice = primary.voice_name();

        let (change_type, message) = if old_dominant != new_dominant {
            (
                ShiftKind::MajorShift,
                format!(
                    "Your dominant trait has shifted from {} to {}. \
                     This conversation resonated more with {}.",
                    old_dominant.display_name(),
                    new_dominant.display_name(),
                    voice
                ),
            )
        } else if total_shift > Self::SHIFT_THRESHOLD {
            let grew = TraitId::ALL
                .into_iter()
                .find(|id| new.get(*id) > old.get(*id))
                .unwrap_or(TraitId::Psyche);
            (
                ShiftKind::Shift,
                format!(
                    "Your {} weight increased slightly. {} guided this exchange.",
                    grew.display_name(),
                    voice
                ),
            )
        } else {
            (
                ShiftKind::Minor,
                format!(
                    "Weights adjusted based on {} taking the lead{}.",
                    voice,
                    if had_secondary { " with support" } else { "" }
                ),
            )
        };

        Some(Self {
            change_type,
            message,
            old_dominant,
            new_dominant,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
