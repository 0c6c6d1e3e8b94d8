//! Point allocation: the user's fixed budget spread across three traits.
//!
//! Points are integers, bounded per trait and capped in total.  Edits are
//! one point at a time and are rejected (not clamped) when they would break
//! a bound.  Freed points stay free: nothing is redistributed
//! automatically, so a profile may sit below its budget.
//!
//! ```text
//! increment(t):  points[t] < max  &&  sum + 1 <= budget
//! decrement(t):  points[t] > min
//! weight(t)   =  points[t] / budget
//! ```

use serde::{Deserialize, Serialize};

use super::trait_id::{TraitId, TraitMap, WeightVector};
use crate::utilities::errors::{PersonaError, Result};

/// Lowest allocation any trait may hold.
pub const MIN_POINTS: u8 = 2;
/// Highest allocation any trait may hold.
pub const MAX_POINTS: u8 = 6;
/// Total points available across the three traits.
pub const BUDGET: u8 = 12;
/// Budget used by profiles created before the budget was raised to 12.
pub const LEGACY_BUDGET: u8 = 11;

/// Points assigned per trait.
pub type PointAllocation = TraitMap<u8>;

impl TraitMap<u8> {
    pub fn total(&self) -> u16 {
        self.instinct as u16 + self.logic as u16 + self.psyche as u16
    }

    /// Points-derived weights: `points[t] / budget`.
    ///
    /// The result sums to 1 only when the budget is fully spent.
    pub fn to_weights(&self, budget: u8) -> WeightVector {
        let budget = f64::from(budget.max(1));
        self.map(|_, p| f64::from(*p) / budget)
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Bounds and budget for one allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRules {
    #[serde(default = "default_min_points")]
    pub min_points: u8,
    #[serde(default = "default_max_points")]
    pub max_points: u8,
    #[serde(default = "default_budget")]
    pub budget: u8,
}

fn default_min_points() -> u8 {
    MIN_POINTS
}

fn default_max_points() -> u8 {
    MAX_POINTS
}

fn default_budget() -> u8 {
    BUDGET
}

impl Default for PointRules {
    fn default() -> Self {
        Self {
            min_points: MIN_POINTS,
            max_points: MAX_POINTS,
            budget: BUDGET,
        }
    }
}

impl PointRules {
    /// Rules for profiles still on the 11-point budget.
    pub fn legacy() -> Self {
        Self {
            budget: LEGACY_BUDGET,
            ..Self::default()
        }
    }

    /// Reject rule sets no allocation can satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.min_points > self.max_points {
            return Err(PersonaError::Config(format!(
                "min_points ({}) exceeds max_points ({})",
                self.min_points, self.max_points
            )));
        }
        if u16::from(self.min_points) * 3 > u16::from(self.budget) {
            return Err(PersonaError::Config(format!(
                "budget ({}) cannot cover three traits at min_points ({})",
                self.budget, self.min_points
            )));
        }
        Ok(())
    }

    /// True when every trait is within bounds and the total fits the budget.
    pub fn admits(&self, points: &PointAllocation) -> bool {
        points
            .iter()
            .all(|(_, p)| (self.min_points..=self.max_points).contains(p))
            && points.total() <= u16::from(self.budget)
    }

    /// `points` with one more point on `id`, or `None` if that breaks a bound.
    pub fn increment(&self, points: &PointAllocation, id: TraitId) -> Option<PointAllocation> {
        let current = *points.get(id);
        if current >= self.max_points || points.total() + 1 > u16::from(self.budget) {
            return None;
        }
        let mut next = *points;
        next.set(id, current + 1);
        Some(next)
    }

    /// `points` with one point fewer on `id`, or `None` at the floor.
    pub fn decrement(&self, points: &PointAllocation, id: TraitId) -> Option<PointAllocation> {
        let current = *points.get(id);
        if current <= self.min_points {
            return None;
        }
        let mut next = *points;
        next.set(id, current - 1);
        Some(next)
    }

    /// Starting allocation for a new profile: as even as the budget allows,
    /// remainder handed out in tie-break order.
    pub fn starting_allocation(&self) -> PointAllocation {
        let share = (self.budget / 3).max(self.min_points).min(self.max_points);
        let mut points = PointAllocation::new(share, share, share);
        for id in TraitId::TIE_BREAK_ORDER {
            if let Some(next) = self.increment(&points, id) {
                points = next;
            }
        }
        points
    }
}

// ============================================================================
// Presets
// ============================================================================

/// A fixed, pre-validated allocation with its dominant trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraitPreset {
    pub name: &'static str,
    pub dominant: TraitId,
    pub points: PointAllocation,
}

/// The three canned archetype presets, one per dominant trait.
/// Each spends the full default budget.
pub static PRESETS: [TraitPreset; 3] = [
    TraitPreset {
        name: "Logic",
        dominant: TraitId::Logic,
        points: PointAllocation::new(3, 5, 4),
    },
    TraitPreset {
        name: "Instinct",
        dominant: TraitId::Instinct,
        points: PointAllocation::new(5, 4, 3),
    },
    TraitPreset {
        name: "Psyche",
        dominant: TraitId::Psyche,
        points: PointAllocation::new(4, 3, 5),
    },
];

/// Preset whose dominant trait is `id`.
pub fn preset_for(id: TraitId) -> &'static TraitPreset {
    match id {
        TraitId::Logic => &PRESETS[0],
        TraitId::Instinct => &PRESETS[1],
        TraitId::Psyche => &PRESETS[2],
    }
}

// ============================================================================
// Allocator
// ============================================================================

/// Owns one profile's point allocation and manual dominant-trait flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointAllocator {
    rules: PointRules,
    points: PointAllocation,
    dominant: Option<TraitId>,
}

impl Default for PointAllocator {
    fn default() -> Self {
        Self::new(PointRules::default())
    }
}

impl PointAllocator {
    /// New allocator at the rules' starting allocation.
    pub fn new(rules: PointRules) -> Self {
        Self {
            rules,
            points: rules.starting_allocation(),
            dominant: None,
        }
    }

    /// Allocator seeded with existing points; fails if they break the rules.
    pub fn with_points(rules: PointRules, points: PointAllocation) -> Result<Self> {
        let mut allocator = Self::new(rules);
        allocator.replace(points)?;
        Ok(allocator)
    }

    pub fn rules(&self) -> &PointRules {
        &self.rules
    }

    pub fn points(&self) -> PointAllocation {
        self.points
    }

    pub fn current(&self, id: TraitId) -> u8 {
        *self.points.get(id)
    }

    /// Points not yet assigned to any trait.
    pub fn remaining(&self) -> u16 {
        u16::from(self.rules.budget).saturating_sub(self.points.total())
    }

    pub fn dominant(&self) -> Option<TraitId> {
        self.dominant
    }

    /// Set or clear the manually selected dominant trait.
    pub fn set_dominant(&mut self, dominant: Option<TraitId>) {
        self.dominant = dominant;
    }

    /// Whether `increment(id)` would currently be accepted.
    pub fn can_increment(&self, id: TraitId) -> bool {
        self.rules.increment(&self.points, id).is_some()
    }

    /// Whether `decrement(id)` would currently be accepted.
    pub fn can_decrement(&self, id: TraitId) -> bool {
        self.rules.decrement(&self.points, id).is_some()
    }

    /// Add one point to `id`. Returns `false` and leaves state unchanged on rejection.
    pub fn increment(&mut self, id: TraitId) -> bool {
        match self.rules.increment(&self.points, id) {
            Some(next) => {
                self.points = next;
                true
            }
            None => {
                log::debug!(
                    "increment({}) rejected: {} points, {} of {} spent",
                    id,
                    self.current(id),
                    self.points.total(),
                    self.rules.budget
                );
                false
            }
        }
    }

    /// Remove one point from `id`. Returns `false` and leaves state unchanged on rejection.
    pub fn decrement(&mut self, id: TraitId) -> bool {
        match self.rules.decrement(&self.points, id) {
            Some(next) => {
                self.points = next;
                true
            }
            None => {
                log::debug!("decrement({}) rejected: already at {}", id, self.current(id));
                false
            }
        }
    }

    /// Set all three values and the dominant flag in one step.
    ///
    /// Step guards do not apply; the values must still be a full-budget
    /// allocation inside the per-trait bounds, which every entry in
    /// [`PRESETS`] is under the default rules.
    pub fn apply_preset(&mut self, values: PointAllocation, dominant: TraitId) -> bool {
        if !self.rules.admits(&values) || values.total() != u16::from(self.rules.budget) {
            log::warn!(
                "preset {:?} does not fit rules {:?}; ignoring",
                values,
                self.rules
            );
            return false;
        }
        self.points = values;
        self.dominant = Some(dominant);
        log::info!("preset applied: {:?}, dominant {}", values, dominant);
        true
    }

    /// Apply one of the canned [`PRESETS`].
    pub fn apply_named_preset(&mut self, preset: &TraitPreset) -> bool {
        self.apply_preset(preset.points, preset.dominant)
    }

    /// Overwrite the allocation with values read from the backend.
    pub fn replace(&mut self, points: PointAllocation) -> Result<()> {
        if !self.rules.admits(&points) {
            return Err(PersonaError::Validation(format!(
                "allocation {:?} violates {:?}",
                points, self.rules
            )));
        }
        self.points = points;
        Ok(())
    }

    /// Points-derived weight vector.
    pub fn weights(&self) -> WeightVector {
        self.points.to_weights(self.rules.budget)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_valid() {
        assert!(PointRules::default().validate().is_ok());
        assert!(PointRules::legacy().validate().is_ok());
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let inverted = PointRules {
            min_points: 5,
            max_points: 3,
            budget: 12,
        };
        assert!(inverted.validate().is_err());
        let starved = PointRules {
            min_points: 4,
            max_points: 6,
            budget: 11,
        };
        assert!(starved.validate().is_err());
    }

    #[test]
    fn test_starting_allocation() {
        assert_eq!(
            PointRules::default().starting_allocation(),
            PointAllocation::new(4, 4, 4)
        );
        // 11-point budget: 3/3/3 plus two remainder points by tie-break order.
        assert_eq!(
            PointRules::legacy().starting_allocation(),
            PointAllocation::new(3, 4, 4)
        );
    }

    #[test]
    fn test_budget_edits_at_capacity() {
        let mut alloc = PointAllocator::default();
        assert_eq!(alloc.points(), PointAllocation::new(4, 4, 4));

        // Sum would be 13.
        assert!(!alloc.increment(TraitId::Logic));
        assert_eq!(alloc.points(), PointAllocation::new(4, 4, 4));

        assert!(alloc.decrement(TraitId::Psyche));
        assert_eq!(alloc.points(), PointAllocation::new(4, 4, 3));
        assert_eq!(alloc.points().total(), 11);

        assert!(alloc.increment(TraitId::Logic));
        assert_eq!(alloc.points(), PointAllocation::new(4, 5, 3));
        assert_eq!(alloc.points().total(), 12);
    }

    #[test]
    fn test_max_points_guard() {
        let points = PointAllocation::new(2, 6, 2);
        let mut alloc = PointAllocator::with_points(PointRules::default(), points).unwrap();
        assert_eq!(alloc.remaining(), 2);
        assert!(!alloc.increment(TraitId::Logic));
        assert!(alloc.increment(TraitId::Psyche));
    }

    #[test]
    fn test_min_points_guard_and_no_redistribution() {
        let mut alloc = PointAllocator::default();
        assert!(alloc.decrement(TraitId::Instinct));
        assert!(alloc.decrement(TraitId::Instinct));
        assert!(!alloc.decrement(TraitId::Instinct));
        assert_eq!(alloc.points(), PointAllocation::new(2, 4, 4));
        assert_eq!(alloc.remaining(), 2);
    }

    #[test]
    fn test_bounds_hold_over_any_sequence() {
        let rules = PointRules::default();
        let mut alloc = PointAllocator::new(rules);
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..1000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let id = TraitId::ALL[(seed % 3) as usize];
            if seed & 8 == 0 {
                alloc.increment(id);
            } else {
                alloc.decrement(id);
            }
            assert!(rules.admits(&alloc.points()), "{:?}", alloc.points());
        }
    }

    #[test]
    fn test_presets_spend_full_budget() {
        let rules = PointRules::default();
        for preset in PRESETS.iter() {
            assert!(rules.admits(&preset.points), "{}", preset.name);
            assert_eq!(preset.points.total(), u16::from(BUDGET), "{}", preset.name);
            assert_eq!(preset_for(preset.dominant), preset);
        }
    }

    #[test]
    fn test_apply_preset_sets_values_and_dominant() {
        let mut alloc = PointAllocator::default();
        alloc.decrement(TraitId::Logic);
        assert!(alloc.apply_named_preset(preset_for(TraitId::Psyche)));
        assert_eq!(alloc.points(), PointAllocation::new(4, 3, 5));
        assert_eq!(alloc.dominant(), Some(TraitId::Psyche));
    }

    #[test]
    fn test_apply_preset_rejected_under_legacy_budget() {
        let mut alloc = PointAllocator::new(PointRules::legacy());
        let before = alloc.points();
        assert!(!alloc.apply_named_preset(preset_for(TraitId::Logic)));
        assert_eq!(alloc.points(), before);
        assert_eq!(alloc.dominant(), None);
    }

    #[test]
    fn test_replace_validates() {
        let mut alloc = PointAllocator::default();
        assert!(alloc.replace(PointAllocation::new(1, 5, 5)).is_err());
        assert!(alloc.replace(PointAllocation::new(6, 6, 2)).is_err());
        assert!(alloc.replace(PointAllocation::new(3, 3, 3)).is_ok());
    }

    #[test]
    fn test_points_derived_weights() {
        let points = PointAllocation::new(3, 6, 3);
        let alloc = PointAllocator::with_points(PointRules::default(), points).unwrap();
        let w = alloc.weights();
        assert!((w.logic - 0.5).abs() < 1e-12);
        assert!((w.instinct - 0.25).abs() < 1e-12);
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }
}
