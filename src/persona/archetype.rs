//! Persona classification: one of sixteen archetypes from a weight triple.
//!
//! The three weights are ranked (dominant, secondary, tertiary) and the
//! first matching rule picks the archetype:
//!
//! | # | Rule                                              | Key                        |
//! |---|---------------------------------------------------|----------------------------|
//! | 1 | `dom - ter < 0.10`                                | `balanced`                 |
//! | 2 | `abs(dom - sec) < 0.08` and `sec - ter > 0.10`    | `mixed-{a}-{b}` (sorted)   |
//! | 3 | `dom - sec < 0.12`                                | `{dom}-{sec}`              |
//! | 4 | `sec - ter < 0.08`                                | `{dom}-balanced`           |
//! | 5 | otherwise                                         | `{dom}-pure`               |
//!
//! Equal weights rank by the fixed priority logic > psyche > instinct, so
//! classification is a deterministic function of its input.

use serde::{Deserialize, Serialize};

use super::trait_id::{TraitId, WeightVector};
use crate::utilities::errors::{PersonaError, Result};

/// Messages needed before confidence saturates at 100%.
pub const CONFIDENCE_SATURATION: u64 = 100;

// ============================================================================
// Archetype table
// ============================================================================

/// A fixed personality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Archetype {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const fn archetype(code: &'static str, name: &'static str, description: &'static str) -> Archetype {
    Archetype {
        code,
        name,
        description,
    }
}

/// Every archetype the classifier can return.
pub static ARCHETYPES: [Archetype; 16] = [
    archetype(
        "balanced",
        "The Harmonizer",
        "No single voice leads. You weigh gut, reason and feeling in roughly equal measure.",
    ),
    archetype(
        "mixed-instinct-logic",
        "The Tactician",
        "Action and analysis share the lead. You move quickly but with a plan in hand.",
    ),
    archetype(
        "mixed-instinct-psyche",
        "The Firebrand",
        "Gut and heart lead together. You act on what you feel and feel what you act on.",
    ),
    archetype(
        "mixed-logic-psyche",
        "The Sage",
        "Reason and intuition lead together. You look for the meaning behind the structure.",
    ),
    archetype(
        "instinct-logic",
        "The Operator",
        "Instinct drives, logic steers. You trust your first read and then check the numbers.",
    ),
    archetype(
        "instinct-psyche",
        "The Adventurer",
        "Instinct drives, feeling colors it. You chase experiences that feel right.",
    ),
    archetype(
        "logic-instinct",
        "The Strategist",
        "Logic leads, instinct sharpens it. You plan carefully and commit decisively.",
    ),
    archetype(
        "logic-psyche",
        "The Architect",
        "Logic leads, feeling informs it. You build systems that make sense to people.",
    ),
    archetype(
        "psyche-instinct",
        "The Artist",
        "Feeling leads, instinct gives it form. You express before you explain.",
    ),
    archetype(
        "psyche-logic",
        "The Counselor",
        "Feeling leads, reason supports it. You understand people and can say why.",
    ),
    archetype(
        "instinct-balanced",
        "The Pathfinder",
        "Instinct leads while reason and feeling keep each other in check.",
    ),
    archetype(
        "logic-balanced",
        "The Analyst",
        "Logic leads while gut and feeling hold an even second place.",
    ),
    archetype(
        "psyche-balanced",
        "The Mediator",
        "Feeling leads while gut and reason balance beneath it.",
    ),
    archetype(
        "instinct-pure",
        "The Spark",
        "Instinct dominates. You decide in the moment and rarely look back.",
    ),
    archetype(
        "logic-pure",
        "The Engineer",
        "Logic dominates. You want the proof before the conclusion.",
    ),
    archetype(
        "psyche-pure",
        "The Dreamer",
        "Feeling dominates. You navigate by meaning, mood and intuition.",
    ),
];

/// Look up an archetype by its composite key.
pub fn lookup(code: &str) -> Option<&'static Archetype> {
    ARCHETYPES.iter().find(|a| a.code == code)
}

/// Lookup for keys every weight triple can produce.
///
/// A miss means the static table is incomplete, which is a build defect.
fn lookup_required(code: &str) -> &'static Archetype {
    match lookup(code) {
        Some(a) => a,
        None => panic!("archetype table has no entry for {:?}", code),
    }
}

// ============================================================================
// Confidence
// ============================================================================

/// Classification confidence in percent: linear up to
/// [`CONFIDENCE_SATURATION`] messages, then capped at 100.
pub fn confidence(message_count: u64) -> u8 {
    let pct = (message_count as f64 / CONFIDENCE_SATURATION as f64 * 100.0).round();
    pct.min(100.0) as u8
}

// ============================================================================
// Classifier
// ============================================================================

/// Gap thresholds for the classification rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Rule 1: maximum dominant-to-tertiary spread for `balanced`.
    pub balanced_spread: f64,
    /// Rule 2: maximum dominant-to-secondary gap for a mixed lead.
    pub mixed_lead_gap: f64,
    /// Rule 2: minimum secondary-to-tertiary gap for a mixed lead.
    pub mixed_separation: f64,
    /// Rule 3: maximum dominant-to-secondary gap for a paired archetype.
    pub paired_gap: f64,
    /// Rule 4: maximum secondary-to-tertiary gap for `{dom}-balanced`.
    pub balanced_others_gap: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            balanced_spread: 0.10,
            mixed_lead_gap: 0.08,
            mixed_separation: 0.10,
            paired_gap: 0.12,
            balanced_others_gap: 0.08,
        }
    }
}

impl ClassifierThresholds {
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("balanced_spread", self.balanced_spread),
            ("mixed_lead_gap", self.mixed_lead_gap),
            ("mixed_separation", self.mixed_separation),
            ("paired_gap", self.paired_gap),
            ("balanced_others_gap", self.balanced_others_gap),
        ];
        for (name, value) in all {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PersonaError::Config(format!(
                    "classifier threshold {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Traits ordered by descending weight, ties by fixed priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRanking {
    pub dominant: TraitId,
    pub secondary: TraitId,
    pub tertiary: TraitId,
}

impl TraitRanking {
    pub fn of(weights: &WeightVector) -> Self {
        let mut ranked = TraitId::ALL;
        ranked.sort_by(|a, b| {
            weights
                .get(*b)
                .total_cmp(weights.get(*a))
                .then(a.tie_break_rank().cmp(&b.tie_break_rank()))
        });
        Self {
            dominant: ranked[0],
            secondary: ranked[1],
            tertiary: ranked[2],
        }
    }
}

/// Result of classifying a settled weight vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaClassification {
    pub archetype_code: &'static str,
    pub archetype_name: &'static str,
    pub description: &'static str,
    pub confidence_percent: u8,
    pub ranking: TraitRanking,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PersonaClassifier {
    thresholds: ClassifierThresholds,
}

impl PersonaClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// The archetype for `weights`.
    pub fn archetype(&self, weights: &WeightVector) -> &'static Archetype {
        let t = &self.thresholds;
        let rank = TraitRanking::of(weights);
        let dom = *weights.get(rank.dominant);
        let sec = *weights.get(rank.secondary);
        let ter = *weights.get(rank.tertiary);

        if dom - ter < t.balanced_spread {
            return lookup_required("balanced");
        }

        if (dom - sec).abs() < t.mixed_lead_gap && sec - ter > t.mixed_separation {
            let (a, b) = if rank.dominant.as_str() <= rank.secondary.as_str() {
                (rank.dominant, rank.secondary)
            } else {
                (rank.secondary, rank.dominant)
            };
            if let Some(found) = lookup(&format!("mixed-{}-{}", a, b)) {
                return found;
            }
        }

        if dom - sec < t.paired_gap {
            if let Some(found) = lookup(&format!("{}-{}", rank.dominant, rank.secondary)) {
                return found;
            }
        }

        if sec - ter < t.balanced_others_gap {
            return lookup_required(&format!("{}-balanced", rank.dominant));
        }

        lookup_required(&format!("{}-pure", rank.dominant))
    }

    /// Full classification with confidence from the interaction count.
    pub fn classify(&self, weights: &WeightVector, message_count: u64) -> PersonaClassification {
        let archetype = self.archetype(weights);
        PersonaClassification {
            archetype_code: archetype.code,
            archetype_name: archetype.name,
            description: archetype.description,
            confidence_percent: confidence(message_count),
            ranking: TraitRanking::of(weights),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
