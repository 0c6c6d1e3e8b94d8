//! The three trait voices and per-trait value maps.
//!
//! | Trait    | Voice | Disco voice | Role                         |
//! |----------|-------|-------------|------------------------------|
//! | Instinct | Snap  | Storm       | Gut reaction, action         |
//! | Logic    | Dot   | Spin        | Analysis, structure          |
//! | Psyche   | Puff  | Swarm       | Feeling, intuition, meaning  |
//!
//! The trait set is closed: every lookup is an exhaustive `match`, so a new
//! or misspelled trait is a compile error rather than a missing map key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utilities::errors::PersonaError;

// ============================================================================
// Trait identifiers
// ============================================================================

/// One of the three cognitive traits modelled per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitId {
    /// Gut reaction and decisive action.
    Instinct,
    /// Analysis and structure.
    Logic,
    /// Emotion, intuition and meaning.
    Psyche,
}

impl TraitId {
    /// All three traits in canonical (storage) order.
    pub const ALL: [TraitId; 3] = [TraitId::Instinct, TraitId::Logic, TraitId::Psyche];

    /// Order in which active voices are listed to the renderer.
    pub const DISPLAY_ORDER: [TraitId; 3] = [TraitId::Psyche, TraitId::Logic, TraitId::Instinct];

    /// Priority used to break ties between numerically equal weights.
    /// Earlier wins.
    pub const TIE_BREAK_ORDER: [TraitId; 3] = [TraitId::Logic, TraitId::Psyche, TraitId::Instinct];

    /// Lowercase identifier used in archetype keys and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraitId::Instinct => "instinct",
            TraitId::Logic => "logic",
            TraitId::Psyche => "psyche",
        }
    }

    /// Capitalized label for UI text.
    pub fn display_name(&self) -> &'static str {
        match self {
            TraitId::Instinct => "Instinct",
            TraitId::Logic => "Logic",
            TraitId::Psyche => "Psyche",
        }
    }

    /// Name of the voice speaking for this trait in normal mode.
    pub fn voice_name(&self) -> &'static str {
        match self {
            TraitId::Instinct => "Snap",
            TraitId::Logic => "Dot",
            TraitId::Psyche => "Puff",
        }
    }

    /// Name of the voice speaking for this trait in disco mode.
    pub fn disco_voice_name(&self) -> &'static str {
        match self {
            TraitId::Instinct => "Storm",
            TraitId::Logic => "Spin",
            TraitId::Psyche => "Swarm",
        }
    }

    /// Voice speaking for this trait in `mode`, or `None` when silent.
    pub fn voice_for(&self, mode: ActivationMode) -> Option<&'static str> {
        match mode {
            ActivationMode::Off => None,
            ActivationMode::On => Some(self.voice_name()),
            ActivationMode::Disco => Some(self.disco_voice_name()),
        }
    }

    /// Rank in [`TraitId::TIE_BREAK_ORDER`] (0 = wins ties).
    pub fn tie_break_rank(&self) -> u8 {
        match self {
            TraitId::Logic => 0,
            TraitId::Psyche => 1,
            TraitId::Instinct => 2,
        }
    }
}

impl fmt::Display for TraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraitId {
    type Err = PersonaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instinct" => Ok(TraitId::Instinct),
            "logic" => Ok(TraitId::Logic),
            "psyche" => Ok(TraitId::Psyche),
            other => Err(PersonaError::UnknownTrait(other.to_string())),
        }
    }
}

// ============================================================================
// Activation modes
// ============================================================================

/// Presentation mode of a single trait voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    /// Silent.
    Off,
    /// Participating normally.
    #[default]
    On,
    /// Participating in the intensified disco presentation.
    Disco,
}

impl ActivationMode {
    /// Whether the voice participates at all.
    pub fn is_active(&self) -> bool {
        !matches!(self, ActivationMode::Off)
    }

    /// Unguarded successor in the off → on → disco → off cycle.
    pub fn next(&self) -> ActivationMode {
        match self {
            ActivationMode::Off => ActivationMode::On,
            ActivationMode::On => ActivationMode::Disco,
            ActivationMode::Disco => ActivationMode::Off,
        }
    }
}

// ============================================================================
// Per-trait map
// ============================================================================

/// A value for each of the three traits.
///
/// Serializes as `{"instinct": .., "logic": .., "psyche": ..}`, the shape the
/// backend uses for points and weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TraitMap<T> {
    pub instinct: T,
    pub logic: T,
    pub psyche: T,
}

impl<T> TraitMap<T> {
    /// Build from explicit per-trait values.
    pub const fn new(instinct: T, logic: T, psyche: T) -> Self {
        Self {
            instinct,
            logic,
            psyche,
        }
    }

    /// Build by evaluating `f` for every trait.
    pub fn from_fn(mut f: impl FnMut(TraitId) -> T) -> Self {
        Self {
            instinct: f(TraitId::Instinct),
            logic: f(TraitId::Logic),
            psyche: f(TraitId::Psyche),
        }
    }

    pub fn get(&self, id: TraitId) -> &T {
        match id {
            TraitId::Instinct => &self.instinct,
            TraitId::Logic => &self.logic,
            TraitId::Psyche => &self.psyche,
        }
    }

    pub fn get_mut(&mut self, id: TraitId) -> &mut T {
        match id {
            TraitId::Instinct => &mut self.instinct,
            TraitId::Logic => &mut self.logic,
            TraitId::Psyche => &mut self.psyche,
        }
    }

    pub fn set(&mut self, id: TraitId, value: T) {
        *self.get_mut(id) = value;
    }

    /// Apply `f` to each value, keeping the trait association.
    pub fn map<U>(&self, mut f: impl FnMut(TraitId, &T) -> U) -> TraitMap<U> {
        TraitMap {
            instinct: f(TraitId::Instinct, &self.instinct),
            logic: f(TraitId::Logic, &self.logic),
            psyche: f(TraitId::Psyche, &self.psyche),
        }
    }

    /// Iterate `(trait, &value)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (TraitId, &T)> {
        TraitId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }
}

// ============================================================================
// Weight vectors
// ============================================================================

/// Normalized influence per trait, each in [0, 1] and summing to roughly 1.
///
/// Points-derived and externally learned vectors share this type and are
/// consumed identically by projection and classification.
pub type WeightVector = TraitMap<f64>;

impl TraitMap<f64> {
    /// Even three-way split.
    pub fn uniform() -> Self {
        Self::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
    }

    pub fn sum(&self) -> f64 {
        self.instinct + self.logic + self.psyche
    }

    /// Scale so the components sum to 1. A zero vector becomes uniform.
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total <= 0.0 || !total.is_finite() {
            return Self::uniform();
        }
        self.map(|_, w| w / total)
    }

    /// Component-wise linear interpolation; `t = 0` is `self`, `t = 1` is `to`.
    pub fn lerp(&self, to: &WeightVector, t: f64) -> Self {
        Self::from_fn(|id| {
            let a = *self.get(id);
            a + (to.get(id) - a) * t
        })
    }

    /// Sum of absolute per-trait differences.
    pub fn total_shift(&self, other: &WeightVector) -> f64 {
        TraitId::ALL
            .iter()
            .map(|id| (other.get(*id) - self.get(*id)).abs())
            .sum()
    }

    /// True when every component differs by less than `epsilon`.
    pub fn approx_eq(&self, other: &WeightVector, epsilon: f64) -> bool {
        TraitId::ALL
            .iter()
            .all(|id| (self.get(*id) - other.get(*id)).abs() < epsilon)
    }
}

// ============================================================================
// Tests
// ============================================================================
