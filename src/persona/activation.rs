//! Voice activation: which traits speak, and in which mode.
//!
//! Each trait cycles `off → on → disco → off`.  The one hard rule is that
//! the conversation never loses its last voice: a transition that would
//! leave zero active traits is redirected to `on`.
//!
//! [`AgentActivationState`] holds the pure transitions; the
//! [`AgentActivationModel`] applies them in place for a single owner.

use serde::{Deserialize, Serialize};

use super::trait_id::{ActivationMode, TraitId, TraitMap};

// ============================================================================
// Activation state
// ============================================================================

/// Mode of every trait voice.  Always has at least one active trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TraitMap<ActivationMode>", into = "TraitMap<ActivationMode>")]
pub struct AgentActivationState {
    modes: TraitMap<ActivationMode>,
}

impl Default for AgentActivationState {
    /// All three voices on.
    fn default() -> Self {
        Self {
            modes: TraitMap::new(ActivationMode::On, ActivationMode::On, ActivationMode::On),
        }
    }
}

impl TryFrom<TraitMap<ActivationMode>> for AgentActivationState {
    type Error = String;

    fn try_from(modes: TraitMap<ActivationMode>) -> Result<Self, Self::Error> {
        Self::from_modes(modes).ok_or_else(|| "at least one trait must be active".to_string())
    }
}

impl From<AgentActivationState> for TraitMap<ActivationMode> {
    fn from(state: AgentActivationState) -> Self {
        state.modes
    }
}

impl AgentActivationState {
    /// Build from explicit modes; `None` when every mode is `off`.
    pub fn from_modes(modes: TraitMap<ActivationMode>) -> Option<Self> {
        if modes.iter().any(|(_, m)| m.is_active()) {
            Some(Self { modes })
        } else {
            None
        }
    }

    pub fn mode(&self, id: TraitId) -> ActivationMode {
        *self.modes.get(id)
    }

    pub fn modes(&self) -> &TraitMap<ActivationMode> {
        &self.modes
    }

    pub fn active_count(&self) -> usize {
        self.modes.iter().filter(|(_, m)| m.is_active()).count()
    }

    /// Advance one trait through the cycle.
    ///
    /// `disco → off` on the sole active trait lands on `on` instead.
    pub fn cycled(&self, id: TraitId) -> Self {
        let current = self.mode(id);
        let mut next = current.next();
        if !next.is_active() && current.is_active() && self.active_count() == 1 {
            log::debug!("{} is the last active voice; staying on", id);
            next = ActivationMode::On;
        }
        let mut modes = self.modes;
        modes.set(id, next);
        Self { modes }
    }

    /// Toggle disco across all active traits.
    ///
    /// When every active trait is already disco they all drop back to `on`;
    /// otherwise they all go disco.  Off traits are never touched.
    pub fn bulk_disco_toggled(&self) -> Self {
        let all_disco = self
            .modes
            .iter()
            .filter(|(_, m)| m.is_active())
            .all(|(_, m)| *m == ActivationMode::Disco);
        let target = if all_disco {
            ActivationMode::On
        } else {
            ActivationMode::Disco
        };
        let modes = self.modes.map(|_, m| if m.is_active() { target } else { *m });
        Self { modes }
    }

    /// Active traits in display order `[psyche, logic, instinct]`.
    pub fn active_list(&self) -> Vec<TraitId> {
        TraitId::DISPLAY_ORDER
            .into_iter()
            .filter(|id| self.mode(*id).is_active())
            .collect()
    }

    /// The subset of [`active_list`](Self::active_list) currently in disco.
    pub fn disco_list(&self) -> Vec<TraitId> {
        TraitId::DISPLAY_ORDER
            .into_iter()
            .filter(|id| self.mode(*id) == ActivationMode::Disco)
            .collect()
    }

    /// `(trait, voice name)` for each active trait, in display order.
    pub fn speaking_voices(&self) -> Vec<(TraitId, &'static str)> {
        TraitId::DISPLAY_ORDER
            .into_iter()
            .filter_map(|id| id.voice_for(self.mode(id)).map(|voice| (id, voice)))
            .collect()
    }

    /// True when every voice is active and in disco (the backend's "game mode").
    pub fn is_full_disco(&self) -> bool {
        self.modes.iter().all(|(_, m)| *m == ActivationMode::Disco)
    }
}

// ============================================================================
// Activation model
// ============================================================================

/// In-place owner of an [`AgentActivationState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentActivationModel {
    state: AgentActivationState,
}

impl AgentActivationModel {
    pub fn new(state: AgentActivationState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> AgentActivationState {
        self.state
    }

    /// Replace the whole state (e.g. from a backend snapshot).
    pub fn replace(&mut self, state: AgentActivationState) {
        self.state = state;
    }

    /// Advance `id` one step through the cycle and return the new state.
    pub fn cycle(&mut self, id: TraitId) -> AgentActivationState {
        self.state = self.state.cycled(id);
        self.state
    }

    /// Toggle disco across all active traits and return the new state.
    pub fn set_bulk_disco(&mut self) -> AgentActivationState {
        self.state = self.state.bulk_disco_toggled();
        self.state
    }

    pub fn active_list(&self) -> Vec<TraitId> {
        self.state.active_list()
    }

    pub fn disco_list(&self) -> Vec<TraitId> {
        self.state.disco_list()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ActivationMode::{Disco, Off, On};

    fn state(
        instinct: ActivationMode,
        logic: ActivationMode,
        psyche: ActivationMode,
    ) -> AgentActivationState {
        AgentActivationState::from_modes(TraitMap::new(instinct, logic, psyche)).unwrap()
    }

    #[test]
    fn test_default_all_on() {
        let s = AgentActivationState::default();
        assert_eq!(s.active_list(), vec![TraitId::Psyche, TraitId::Logic, TraitId::Instinct]);
        assert!(s.disco_list().is_empty());
    }

    #[test]
    fn test_all_off_is_unrepresentable() {
        assert!(AgentActivationState::from_modes(TraitMap::new(Off, Off, Off)).is_none());
        let parsed: Result<AgentActivationState, _> =
            serde_json::from_str(r#"{"instinct":"off","logic":"off","psyche":"off"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cycle_full_loop_with_other_voices_active() {
        let mut model = AgentActivationModel::default();
        assert_eq!(model.cycle(TraitId::Psyche).mode(TraitId::Psyche), Disco);
        assert_eq!(model.cycle(TraitId::Psyche).mode(TraitId::Psyche), Off);
        assert_eq!(model.cycle(TraitId::Psyche).mode(TraitId::Psyche), On);
    }

    #[test]
    fn test_sole_active_voice_never_turns_off() {
        // Only logic is active.
        let mut model = AgentActivationModel::new(state(Off, On, Off));
        assert_eq!(model.cycle(TraitId::Logic).mode(TraitId::Logic), Disco);
        let after = model.cycle(TraitId::Logic);
        assert_eq!(after.mode(TraitId::Logic), On);
        assert_eq!(after.active_list(), vec![TraitId::Logic]);
    }

    #[test]
    fn test_cycling_off_trait_activates_it() {
        let mut model = AgentActivationModel::new(state(Off, On, Off));
        let after = model.cycle(TraitId::Instinct);
        assert_eq!(after.mode(TraitId::Instinct), On);
        assert_eq!(after.active_count(), 2);
    }

    #[test]
    fn test_active_count_never_zero_over_any_sequence() {
        let mut model = AgentActivationModel::default();
        // Deterministic pseudo-random walk over the three traits.
        let mut seed: u32 = 0x9E37_79B9;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let id = TraitId::ALL[(seed % 3) as usize];
            if seed % 7 == 0 {
                model.set_bulk_disco();
            } else {
                model.cycle(id);
            }
            assert!(!model.active_list().is_empty());
        }
    }

    #[test]
    fn test_bulk_disco_sets_active_traits() {
        let mut model = AgentActivationModel::new(state(On, Off, Disco));
        let after = model.set_bulk_disco();
        assert_eq!(after.mode(TraitId::Instinct), Disco);
        assert_eq!(after.mode(TraitId::Logic), Off);
        assert_eq!(after.mode(TraitId::Psyche), Disco);
        assert_eq!(after.disco_list(), vec![TraitId::Psyche, TraitId::Instinct]);
        assert_eq!(
            after.speaking_voices(),
            vec![(TraitId::Psyche, "Swarm"), (TraitId::Instinct, "Storm")]
        );
    }

    #[test]
    fn test_bulk_disco_reverts_when_all_active_are_disco() {
        let mut model = AgentActivationModel::new(state(Disco, Off, Disco));
        let after = model.set_bulk_disco();
        assert_eq!(after.mode(TraitId::Instinct), On);
        assert_eq!(after.mode(TraitId::Logic), Off);
        assert_eq!(after.mode(TraitId::Psyche), On);
        assert!(after.disco_list().is_empty());
    }

    #[test]
    fn test_full_disco_detection() {
        let mut model = AgentActivationModel::default();
        model.set_bulk_disco();
        assert!(model.state().is_full_disco());
        model.cycle(TraitId::Logic);
        assert!(!model.state().is_full_disco());
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let s = state(Disco, Off, On);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"instinct":"disco","logic":"off","psyche":"on"}"#);
        let back: AgentActivationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
