//! Persona controller: single owner of one profile's persona state.
//!
//! Mutations follow the same path every time:
//!
//! 1. apply a pure transition to the owned state
//! 2. push accepted point changes to the backend (fire-and-forget)
//! 3. recompute the settled weights, retarget the animator, reclassify
//! 4. notify listeners
//!
//! Rejected edits stop at step 1 and change nothing.  A failed push is
//! logged and reported as an event; the local change stays.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::activation::{AgentActivationModel, AgentActivationState};
use super::animator::{Scheduler, TickToken, WeightAnimator};
use super::archetype::{PersonaClassification, PersonaClassifier};
use super::evolution::{evolve_weights, InteractionKind, WeightShift};
use super::points::{PointAllocation, PointAllocator, TraitPreset};
use super::projection::{ProjectedPoint, TrianglePath, WeightProjector};
use super::trait_id::{TraitId, TraitMap, WeightVector};
use crate::events::event_bus::{ListenerId, PersonaEventBus, PersonaListener};
use crate::events::persona_event::PersonaEvent;
use crate::utilities::config::EngineConfig;
use crate::utilities::errors::{PersonaError, Result, SyncError};

// ============================================================================
// Backend boundary
// ============================================================================

/// Which vector drives projection and classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    /// `points / budget`.
    #[default]
    Points,
    /// Weights learned by the backend from conversation history.
    Learned,
}

/// Persists point allocations to the backend.
pub trait PointSync {
    fn push_points(
        &mut self,
        points: &PointAllocation,
        dominant: Option<TraitId>,
    ) -> std::result::Result<(), SyncError>;
}

impl<F> PointSync for F
where
    F: FnMut(&PointAllocation, Option<TraitId>) -> std::result::Result<(), SyncError>,
{
    fn push_points(
        &mut self,
        points: &PointAllocation,
        dominant: Option<TraitId>,
    ) -> std::result::Result<(), SyncError> {
        self(points, dominant)
    }
}

/// Sync that discards every update, for offline use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSync;

impl PointSync for NoopSync {
    fn push_points(
        &mut self,
        _points: &PointAllocation,
        _dominant: Option<TraitId>,
    ) -> std::result::Result<(), SyncError> {
        Ok(())
    }
}

/// Profile state as read from or written to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default = "Uuid::new_v4")]
    pub profile_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    pub points: PointAllocation,
    #[serde(default)]
    pub learned_weights: Option<WeightVector>,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub dominant_override: Option<TraitId>,
    #[serde(default)]
    pub weight_source: WeightSource,
    #[serde(default)]
    pub activation: AgentActivationState,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl ProfileSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Learned weights must be finite, non-negative and not all zero.
fn validate_weights(weights: &WeightVector) -> Result<()> {
    if weights.iter().any(|(_, w)| !w.is_finite() || *w < 0.0) {
        return Err(PersonaError::Validation(format!(
            "learned weights must be finite and non-negative: {:?}",
            weights
        )));
    }
    if weights.sum() <= 0.0 {
        return Err(PersonaError::Validation(
            "learned weights are all zero".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Render output
// ============================================================================

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    /// The animated vector currently on screen.
    pub displayed: WeightVector,
    /// The vector the animation is heading to.
    pub settled: WeightVector,
    pub points: TraitMap<ProjectedPoint>,
    pub triangle: TrianglePath,
    pub classification: PersonaClassification,
    pub activation: AgentActivationState,
    pub active: Vec<TraitId>,
    pub disco: Vec<TraitId>,
    pub animating: bool,
}

// ============================================================================
// Controller
// ============================================================================

pub struct PersonaController {
    profile_id: Uuid,
    config: EngineConfig,
    activation: AgentActivationModel,
    allocator: PointAllocator,
    learned: Option<WeightVector>,
    message_count: u64,
    source: WeightSource,
    projector: WeightProjector,
    classifier: PersonaClassifier,
    classification: PersonaClassification,
    animator: WeightAnimator,
    bus: PersonaEventBus,
    sync: Box<dyn PointSync>,
}

impl std::fmt::Debug for PersonaController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaController")
            .field("profile_id", &self.profile_id)
            .field("activation", &self.activation)
            .field("allocator", &self.allocator)
            .field("learned", &self.learned)
            .field("message_count", &self.message_count)
            .field("source", &self.source)
            .field("classification", &self.classification.archetype_code)
            .field("animator", &self.animator)
            .finish()
    }
}

impl PersonaController {
    /// Fresh profile at the configured starting allocation.
    pub fn new(
        config: EngineConfig,
        scheduler: Box<dyn Scheduler>,
        sync: Box<dyn PointSync>,
    ) -> Self {
        let allocator = PointAllocator::new(config.points);
        let settled = allocator.weights();
        let classifier = PersonaClassifier::new(config.classifier);
        Self {
            profile_id: Uuid::new_v4(),
            config,
            activation: AgentActivationModel::default(),
            allocator,
            learned: None,
            message_count: 0,
            source: WeightSource::Points,
            projector: WeightProjector::new(config.projector),
            classification: classifier.classify(&settled, 0),
            classifier,
            animator: WeightAnimator::new(config.animation, scheduler, settled),
            bus: PersonaEventBus::new(),
            sync,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn profile_id(&self) -> Uuid {
        self.profile_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn activation(&self) -> AgentActivationState {
        self.activation.state()
    }

    pub fn points(&self) -> PointAllocation {
        self.allocator.points()
    }

    pub fn allocator(&self) -> &PointAllocator {
        &self.allocator
    }

    pub fn dominant_override(&self) -> Option<TraitId> {
        self.allocator.dominant()
    }

    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    pub fn weight_source(&self) -> WeightSource {
        self.source
    }

    pub fn learned_weights(&self) -> Option<WeightVector> {
        self.learned
    }

    /// The vector classification and the animation target are based on.
    ///
    /// Falls back to points-derived weights when the source is `Learned`
    /// but the backend has not supplied any yet.
    pub fn settled_weights(&self) -> WeightVector {
        match (self.source, self.learned) {
            (WeightSource::Learned, Some(learned)) => learned,
            _ => self.allocator.weights(),
        }
    }

    /// The vector currently on screen.
    pub fn displayed_weights(&self) -> WeightVector {
        self.animator.displayed()
    }

    pub fn classification(&self) -> &PersonaClassification {
        &self.classification
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn subscribe(&mut self, listener: Box<dyn PersonaListener>) -> ListenerId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ------------------------------------------------------------------
    // Backend snapshot
    // ------------------------------------------------------------------

    /// Replace the whole profile with backend state.
    ///
    /// Validation happens before anything is touched, so a bad snapshot
    /// leaves the controller unchanged.  The display jumps straight to the
    /// new weights and nothing is pushed back to the backend.
    pub fn load_snapshot(&mut self, snapshot: &ProfileSnapshot) -> Result<()> {
        let allocator = PointAllocator::with_points(self.config.points, snapshot.points)?;
        if let Some(learned) = &snapshot.learned_weights {
            validate_weights(learned)?;
        }

        self.profile_id = snapshot.profile_id;
        self.allocator = allocator;
        self.allocator.set_dominant(snapshot.dominant_override);
        self.learned = snapshot.learned_weights;
        self.message_count = snapshot.message_count;
        self.source = snapshot.weight_source;
        self.activation.replace(snapshot.activation);
        let settled = self.settled_weights();
        self.animator.snap_to(settled);

        log::info!(
            "loaded profile {} ({:?}, {} messages, source {:?})",
            self.profile_id,
            self.allocator.points(),
            self.message_count,
            self.source
        );

        self.bus.emit(PersonaEvent::ActivationChanged {
            state: self.activation.state(),
        });
        self.emit_points_changed();
        self.reclassify();
        Ok(())
    }

    /// Current state in backend form.
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            profile_id: self.profile_id,
            name: None,
            points: self.allocator.points(),
            learned_weights: self.learned,
            message_count: self.message_count,
            dominant_override: self.allocator.dominant(),
            weight_source: self.source,
            activation: self.activation.state(),
            updated_at: Utc::now(),
        }
    }

    // ------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------

    pub fn cycle_activation(&mut self, id: TraitId) -> AgentActivationState {
        let state = self.activation.cycle(id);
        self.bus.emit(PersonaEvent::ActivationChanged { state });
        state
    }

    pub fn set_bulk_disco(&mut self) -> AgentActivationState {
        let state = self.activation.set_bulk_disco();
        self.bus.emit(PersonaEvent::ActivationChanged { state });
        state
    }

    pub fn active_list(&self) -> Vec<TraitId> {
        self.activation.active_list()
    }

    pub fn disco_list(&self) -> Vec<TraitId> {
        self.activation.disco_list()
    }

    // ------------------------------------------------------------------
    // Points
    // ------------------------------------------------------------------

    pub fn increment(&mut self, id: TraitId, now: Instant) -> bool {
        let accepted = self.allocator.increment(id);
        if accepted {
            self.after_points_change(now);
        }
        accepted
    }

    pub fn decrement(&mut self, id: TraitId, now: Instant) -> bool {
        let accepted = self.allocator.decrement(id);
        if accepted {
            self.after_points_change(now);
        }
        accepted
    }

    pub fn apply_preset(
        &mut self,
        values: PointAllocation,
        dominant: TraitId,
        now: Instant,
    ) -> bool {
        let accepted = self.allocator.apply_preset(values, dominant);
        if accepted {
            self.after_points_change(now);
        }
        accepted
    }

    pub fn apply_named_preset(&mut self, preset: &TraitPreset, now: Instant) -> bool {
        self.apply_preset(preset.points, preset.dominant, now)
    }

    /// Set or clear the manual dominant-trait flag.
    pub fn set_dominant_override(&mut self, dominant: Option<TraitId>) {
        if self.allocator.dominant() == dominant {
            return;
        }
        self.allocator.set_dominant(dominant);
        self.push_points();
        self.emit_points_changed();
    }

    fn after_points_change(&mut self, now: Instant) {
        self.push_points();
        self.emit_points_changed();
        if self.source == WeightSource::Points {
            self.refresh(now);
        }
    }

    fn push_points(&mut self) {
        let points = self.allocator.points();
        if let Err(error) = self.sync.push_points(&points, self.allocator.dominant()) {
            log::warn!("point sync failed for profile {}: {}", self.profile_id, error);
            self.bus.emit(PersonaEvent::SyncFailed { points, error });
        }
    }

    fn emit_points_changed(&mut self) {
        self.bus.emit(PersonaEvent::PointsChanged {
            points: self.allocator.points(),
            dominant: self.allocator.dominant(),
        });
    }

    // ------------------------------------------------------------------
    // Learned weights and message count
    // ------------------------------------------------------------------

    /// Accept a new learned vector from the backend.
    pub fn set_learned_weights(&mut self, weights: WeightVector, now: Instant) -> Result<()> {
        validate_weights(&weights)?;
        self.learned = Some(weights);
        if self.source == WeightSource::Learned {
            self.refresh(now);
        }
        Ok(())
    }

    /// Record one exchange in which `primary` answered, optionally
    /// supported by `secondary`.
    ///
    /// Evolves the learned weights (seeded from the points when none exist
    /// yet), bumps the message count, and returns the notification to show
    /// the user, if the change is large enough to mention.
    pub fn record_interaction(
        &mut self,
        primary: TraitId,
        secondary: Option<TraitId>,
        now: Instant,
    ) -> Option<WeightShift> {
        let old = self
            .learned
            .unwrap_or_else(|| self.allocator.weights().normalized());
        let mut next = evolve_weights(
            &old,
            primary,
            InteractionKind::ChosenAsPrimary,
            self.message_count,
        );
        if let Some(secondary) = secondary {
            next = evolve_weights(
                &next,
                secondary,
                InteractionKind::ChosenAsSecondary,
                self.message_count,
            );
        }

        self.learned = Some(next);
        self.message_count += 1;
        if self.source == WeightSource::Learned {
            self.refresh(now);
        } else {
            self.reclassify();
        }
        WeightShift::detect(&old, &next, primary, secondary.is_some())
    }

    pub fn set_message_count(&mut self, count: u64) {
        self.message_count = count;
        self.reclassify();
    }

    pub fn set_weight_source(&mut self, source: WeightSource, now: Instant) {
        if self.source == source {
            return;
        }
        log::info!("profile {} weight source {:?} -> {:?}", self.profile_id, self.source, source);
        self.source = source;
        self.refresh(now);
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    fn refresh(&mut self, now: Instant) {
        let target = self.settled_weights();
        if target != self.animator.target() {
            self.animator.retarget(target, now);
            self.bus.emit(PersonaEvent::WeightsRetargeted {
                target,
                source: self.source,
            });
        }
        self.reclassify();
    }

    fn reclassify(&mut self) {
        let next = self
            .classifier
            .classify(&self.settled_weights(), self.message_count);
        if next != self.classification {
            log::debug!(
                "classification {} -> {} ({}%)",
                self.classification.archetype_code,
                next.archetype_code,
                next.confidence_percent
            );
            self.classification = next.clone();
            self.bus.emit(PersonaEvent::ClassificationChanged {
                classification: next,
            });
        }
    }

    // ------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------

    /// Advance the animation to `now` and return the displayed vector.
    pub fn tick(&mut self, now: Instant) -> WeightVector {
        let was_animating = self.animator.is_animating();
        let displayed = self.animator.tick(now);
        if was_animating && !self.animator.is_animating() {
            self.bus.emit(PersonaEvent::AnimationSettled { displayed });
        }
        displayed
    }

    /// Deliver a scheduled tick; stale tokens are ignored.
    pub fn on_tick(&mut self, token: TickToken, now: Instant) -> Option<WeightVector> {
        if self.animator.pending_tick() != Some(token) {
            return None;
        }
        Some(self.tick(now))
    }

    /// Geometry and labels for the vector currently on screen.
    pub fn render_frame(&self) -> RenderFrame {
        let displayed = self.animator.displayed();
        RenderFrame {
            displayed,
            settled: self.settled_weights(),
            points: self.projector.layout(&displayed),
            triangle: self.projector.triangle_path(&displayed),
            classification: self.classification.clone(),
            activation: self.activation.state(),
            active: self.activation.active_list(),
            disco: self.activation.disco_list(),
            animating: self.animator.is_animating(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::persona_event::EventEnvelope;
    use crate::persona::animator::ManualScheduler;
    use crate::persona::points::preset_for;
    use crate::persona::trait_id::ActivationMode;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    type Pushes = Rc<RefCell<Vec<PointAllocation>>>;

    struct Harness {
        controller: PersonaController,
        scheduler: ManualScheduler,
        pushes: Pushes,
        events: Rc<RefCell<Vec<EventEnvelope>>>,
    }

    fn harness_with(fail_sync: bool) -> Harness {
        let scheduler = ManualScheduler::new();
        let pushes: Pushes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pushes);
        let sync = move |points: &PointAllocation, _dominant: Option<TraitId>| {
            sink.borrow_mut().push(*points);
            if fail_sync {
                Err(SyncError::Unavailable("offline".into()))
            } else {
                Ok(())
            }
        };
        let mut controller = PersonaController::new(
            EngineConfig::default(),
            Box::new(scheduler.clone()),
            Box::new(sync),
        );
        let events = Rc::new(RefCell::new(Vec::new()));
        let event_sink = Rc::clone(&events);
        controller.subscribe(Box::new(move |e: &EventEnvelope| {
            event_sink.borrow_mut().push(e.clone())
        }));
        Harness {
            controller,
            scheduler,
            pushes,
            events,
        }
    }

    fn harness() -> Harness {
        harness_with(false)
    }

    fn event_types(h: &Harness) -> Vec<&'static str> {
        h.events.borrow().iter().map(|e| e.event_type()).collect()
    }

    #[test]
    fn test_new_profile_defaults() {
        let h = harness();
        let c = &h.controller;
        assert_eq!(c.points(), PointAllocation::new(4, 4, 4));
        assert_eq!(c.weight_source(), WeightSource::Points);
        assert_eq!(c.classification().archetype_code, "balanced");
        assert_eq!(c.classification().confidence_percent, 0);
        assert!(!c.is_animating());
    }

    #[test]
    fn test_point_edits_sync_only_when_accepted() {
        let mut h = harness();
        let now = Instant::now();
        assert!(!h.controller.increment(TraitId::Logic, now));
        assert!(h.pushes.borrow().is_empty());

        assert!(h.controller.decrement(TraitId::Psyche, now));
        assert!(h.controller.increment(TraitId::Logic, now));
        assert_eq!(
            *h.pushes.borrow(),
            vec![PointAllocation::new(4, 4, 3), PointAllocation::new(4, 5, 3)]
        );
        assert_eq!(h.controller.points(), PointAllocation::new(4, 5, 3));
    }

    #[test]
    fn test_sync_failure_keeps_local_state() {
        let mut h = harness_with(true);
        let now = Instant::now();
        assert!(h.controller.decrement(TraitId::Instinct, now));
        assert_eq!(h.controller.points(), PointAllocation::new(3, 4, 4));
        let failed: Vec<_> = h
            .events
            .borrow()
            .iter()
            .filter_map(|e| match &e.event {
                PersonaEvent::SyncFailed { points, error } => Some((*points, error.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            failed,
            vec![(
                PointAllocation::new(3, 4, 4),
                SyncError::Unavailable("offline".into())
            )]
        );
    }

    #[test]
    fn test_point_change_animates_to_new_weights() {
        let mut h = harness();
        let t0 = Instant::now();
        let before = h.controller.displayed_weights();
        assert!(h.controller.decrement(TraitId::Instinct, t0));
        assert!(h.controller.is_animating());
        assert_eq!(h.controller.displayed_weights(), before);

        let tokens = h.scheduler.take_pending();
        assert_eq!(tokens.len(), 1);
        let mid = h.controller.on_tick(tokens[0], t0 + Duration::from_millis(200)).unwrap();
        assert!(mid.instinct < before.instinct);

        let settled = h.controller.tick(t0 + Duration::from_millis(600));
        assert_eq!(settled, h.controller.settled_weights());
        assert!(!h.controller.is_animating());
        assert_eq!(event_types(&h).last(), Some(&"animation_settled"));
    }

    #[test]
    fn test_stale_tick_ignored() {
        let mut h = harness();
        let t0 = Instant::now();
        h.controller.decrement(TraitId::Instinct, t0);
        let first = h.scheduler.take_pending()[0];
        h.controller.decrement(TraitId::Logic, t0 + Duration::from_millis(50));
        assert_eq!(h.controller.on_tick(first, t0 + Duration::from_millis(100)), None);
    }

    #[test]
    fn test_classification_follows_points() {
        let mut h = harness();
        let now = Instant::now();
        // 3/5/4 of 12 -> logic 0.417, psyche 0.333, instinct 0.25.
        assert!(h.controller.apply_named_preset(preset_for(TraitId::Logic), now));
        assert_eq!(h.controller.dominant_override(), Some(TraitId::Logic));
        assert_eq!(h.controller.classification().archetype_code, "logic-psyche");
        assert!(event_types(&h).contains(&"classification_changed"));
    }

    #[test]
    fn test_learned_weights_source() {
        let mut h = harness();
        let now = Instant::now();
        h.controller
            .set_learned_weights(WeightVector::new(0.25, 0.45, 0.30), now)
            .unwrap();
        // Still on points: nothing changes yet.
        assert_eq!(h.controller.classification().archetype_code, "balanced");

        h.controller.set_weight_source(WeightSource::Learned, now);
        assert_eq!(h.controller.classification().archetype_code, "logic-balanced");
        assert_eq!(h.controller.settled_weights(), WeightVector::new(0.25, 0.45, 0.30));

        // Point edits do not retarget while learned weights drive the chart.
        h.scheduler.take_pending();
        assert!(h.controller.decrement(TraitId::Logic, now));
        assert_eq!(h.controller.classification().archetype_code, "logic-balanced");
    }

    #[test]
    fn test_invalid_learned_weights_rejected() {
        let mut h = harness();
        let now = Instant::now();
        assert!(h
            .controller
            .set_learned_weights(WeightVector::new(f64::NAN, 0.5, 0.5), now)
            .is_err());
        assert!(h
            .controller
            .set_learned_weights(WeightVector::new(0.0, 0.0, 0.0), now)
            .is_err());
        assert_eq!(h.controller.learned_weights(), None);
    }

    #[test]
    fn test_record_interaction_evolves_learned_weights() {
        let mut h = harness();
        let now = Instant::now();
        h.controller.set_weight_source(WeightSource::Learned, now);

        let mut last = None;
        for _ in 0..5 {
            last = h
                .controller
                .record_interaction(TraitId::Psyche, Some(TraitId::Instinct), now);
        }
        let learned = h.controller.learned_weights().unwrap();
        assert!((learned.sum() - 1.0).abs() < 1e-9);
        assert!(learned.psyche > learned.logic);
        assert!(learned.instinct > learned.logic);
        assert_eq!(h.controller.message_count(), 5);
        assert_eq!(h.controller.settled_weights(), learned);
        assert!(h.controller.is_animating());

        let shift = last.unwrap();
        assert_eq!(shift.new_dominant, TraitId::Psyche);
        assert!(shift.message.contains("Puff"));
        // Points are untouched by learning.
        assert_eq!(h.controller.points(), PointAllocation::new(4, 4, 4));
    }

    #[test]
    fn test_message_count_sets_confidence() {
        let mut h = harness();
        h.controller.set_message_count(50);
        assert_eq!(h.controller.classification().confidence_percent, 50);
        h.controller.set_message_count(150);
        assert_eq!(h.controller.classification().confidence_percent, 100);
    }

    #[test]
    fn test_load_snapshot_from_json() {
        let mut h = harness();
        let json = r#"{
            "points": {"instinct": 3, "logic": 6, "psyche": 3},
            "learned_weights": {"instinct": 0.25, "logic": 0.45, "psyche": 0.30},
            "message_count": 42,
            "dominant_override": "logic",
            "weight_source": "learned",
            "activation": {"instinct": "off", "logic": "disco", "psyche": "on"}
        }"#;
        let snapshot = ProfileSnapshot::from_json(json).unwrap();
        h.controller.load_snapshot(&snapshot).unwrap();

        let c = &h.controller;
        assert_eq!(c.profile_id(), snapshot.profile_id);
        assert_eq!(c.points(), PointAllocation::new(3, 6, 3));
        assert_eq!(c.dominant_override(), Some(TraitId::Logic));
        assert_eq!(c.displayed_weights(), WeightVector::new(0.25, 0.45, 0.30));
        assert!(!c.is_animating());
        assert_eq!(c.classification().archetype_code, "logic-balanced");
        assert_eq!(c.classification().confidence_percent, 42);
        assert_eq!(c.disco_list(), vec![TraitId::Logic]);
        // Loading from the backend is not echoed back to it.
        assert!(h.pushes.borrow().is_empty());
    }

    #[test]
    fn test_bad_snapshot_leaves_state_untouched() {
        let mut h = harness();
        let before = h.controller.snapshot();
        let mut snapshot = before.clone();
        snapshot.points = PointAllocation::new(6, 6, 6);
        snapshot.message_count = 99;
        assert!(h.controller.load_snapshot(&snapshot).is_err());
        assert_eq!(h.controller.points(), before.points);
        assert_eq!(h.controller.message_count(), 0);
    }

    #[test]
    fn test_snapshot_roundtrip_through_json() {
        let mut h = harness();
        h.controller.decrement(TraitId::Psyche, Instant::now());
        h.controller.cycle_activation(TraitId::Instinct);
        let json = serde_json::to_string(&h.controller.snapshot()).unwrap();
        let back = ProfileSnapshot::from_json(&json).unwrap();
        assert_eq!(back.points, PointAllocation::new(4, 4, 3));
        assert_eq!(back.activation.mode(TraitId::Instinct), ActivationMode::Disco);
        assert_eq!(back.profile_id, h.controller.profile_id());
    }

    #[test]
    fn test_activation_events_and_render_frame() {
        let mut h = harness();
        h.controller.set_bulk_disco();
        h.controller.cycle_activation(TraitId::Psyche);
        assert_eq!(
            event_types(&h),
            vec!["activation_changed", "activation_changed"]
        );

        let frame = h.controller.render_frame();
        assert_eq!(frame.active, vec![TraitId::Logic, TraitId::Instinct]);
        assert_eq!(frame.disco, vec![TraitId::Logic, TraitId::Instinct]);
        assert_eq!(frame.triangle.vertices[0], frame.points.logic.position());
        assert_eq!(frame.classification.archetype_code, "balanced");
        assert!(!frame.animating);
    }

    #[test]
    fn test_dominant_override_syncs() {
        let mut h = harness();
        h.controller.set_dominant_override(Some(TraitId::Psyche));
        h.controller.set_dominant_override(Some(TraitId::Psyche));
        assert_eq!(h.pushes.borrow().len(), 1);
        assert_eq!(event_types(&h), vec!["points_changed"]);
    }
}
