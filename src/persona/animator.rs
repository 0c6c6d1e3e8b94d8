//! Weight animation: eased tween from the displayed vector to a target.
//!
//! ```text
//!            retarget                   progress >= 1
//!   Idle ───────────────▶ Animating ───────────────────▶ Idle
//!                           │    ▲
//!                           └────┘ tick / retarget
//! ```
//!
//! The animator never sleeps or spawns.  It asks an injected [`Scheduler`]
//! for the next tick and the host calls [`WeightAnimator::on_tick`] when
//! that tick fires.  Retargeting cancels the outstanding tick so only one
//! animation ever writes the displayed vector.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::trait_id::WeightVector;
use crate::utilities::errors::{PersonaError, Result};

pub const DEFAULT_DURATION_MS: u64 = 600;

/// Cubic ease-out: fast start, gentle landing. Monotonic on `[0, 1]`.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

// ============================================================================
// Scheduling
// ============================================================================

/// Handle for one requested tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(pub u64);

/// Host capability that delivers ticks (a frame callback, a timer, a test).
pub trait Scheduler {
    /// Ask for one future tick.
    fn request_tick(&mut self) -> TickToken;

    /// Withdraw a previously requested tick. Unknown tokens are ignored.
    fn cancel(&mut self, token: TickToken);
}

#[derive(Debug, Default)]
struct ManualQueue {
    next_id: u64,
    pending: Vec<TickToken>,
    cancelled: u64,
}

/// Scheduler that queues tokens until the host drains them.
///
/// Clones share one queue, so a host can keep a handle after passing a
/// clone into the animator.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every pending tick in request order.
    pub fn take_pending(&self) -> Vec<TickToken> {
        std::mem::take(&mut self.queue.borrow_mut().pending)
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Number of ticks withdrawn through [`Scheduler::cancel`].
    pub fn cancelled_count(&self) -> u64 {
        self.queue.borrow().cancelled
    }
}

impl Scheduler for ManualScheduler {
    fn request_tick(&mut self) -> TickToken {
        let mut q = self.queue.borrow_mut();
        q.next_id += 1;
        let token = TickToken(q.next_id);
        q.pending.push(token);
        token
    }

    fn cancel(&mut self, token: TickToken) {
        let mut q = self.queue.borrow_mut();
        let before = q.pending.len();
        q.pending.retain(|t| *t != token);
        if q.pending.len() < before {
            q.cancelled += 1;
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
}

fn default_duration_ms() -> u64 {
    DEFAULT_DURATION_MS
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
        }
    }
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        // One hour is far beyond any sensible transition.
        if self.duration_ms > 3_600_000 {
            return Err(PersonaError::Config(format!(
                "animation duration_ms too large: {}",
                self.duration_ms
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Animator
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationPhase {
    Idle,
    Animating,
}

/// Snapshot of an animation's endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub start: WeightVector,
    pub displayed: WeightVector,
    pub target: WeightVector,
    pub started_at: Option<Instant>,
}

pub struct WeightAnimator {
    duration: Duration,
    scheduler: Box<dyn Scheduler>,
    phase: AnimationPhase,
    start: WeightVector,
    displayed: WeightVector,
    target: WeightVector,
    started_at: Option<Instant>,
    pending: Option<TickToken>,
}

impl std::fmt::Debug for WeightAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightAnimator")
            .field("duration", &self.duration)
            .field("phase", &self.phase)
            .field("displayed", &self.displayed)
            .field("target", &self.target)
            .field("pending", &self.pending)
            .finish()
    }
}

impl WeightAnimator {
    /// Idle animator resting on `initial`.
    pub fn new(
        config: AnimationConfig,
        scheduler: Box<dyn Scheduler>,
        initial: WeightVector,
    ) -> Self {
        Self {
            duration: config.duration(),
            scheduler,
            phase: AnimationPhase::Idle,
            start: initial,
            displayed: initial,
            target: initial,
            started_at: None,
            pending: None,
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn is_animating(&self) -> bool {
        self.phase == AnimationPhase::Animating
    }

    pub fn displayed(&self) -> WeightVector {
        self.displayed
    }

    pub fn target(&self) -> WeightVector {
        self.target
    }

    /// Tick the animator is waiting for, if any.
    pub fn pending_tick(&self) -> Option<TickToken> {
        self.pending
    }

    pub fn state(&self) -> AnimationState {
        AnimationState {
            start: self.start,
            displayed: self.displayed,
            target: self.target,
            started_at: self.started_at,
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
    }

    /// Start a new tween from whatever is on screen now.
    pub fn retarget(&mut self, target: WeightVector, now: Instant) {
        self.cancel_pending();
        self.start = self.displayed;
        self.target = target;
        self.started_at = Some(now);
        self.phase = AnimationPhase::Animating;
        self.pending = Some(self.scheduler.request_tick());
    }

    /// Jump straight to `target` without animating.
    pub fn snap_to(&mut self, target: WeightVector) {
        self.cancel_pending();
        self.start = target;
        self.displayed = target;
        self.target = target;
        self.started_at = None;
        self.phase = AnimationPhase::Idle;
    }

    /// Deliver a scheduled tick. Stale or cancelled tokens return `None`
    /// and leave the animator untouched.
    pub fn on_tick(&mut self, token: TickToken, now: Instant) -> Option<WeightVector> {
        if self.pending != Some(token) {
            log::trace!("ignoring stale tick {:?}", token);
            return None;
        }
        Some(self.tick(now))
    }

    /// Advance to `now` and return the displayed vector.
    pub fn tick(&mut self, now: Instant) -> WeightVector {
        let started_at = match (self.phase, self.started_at) {
            (AnimationPhase::Animating, Some(at)) => at,
            _ => return self.displayed,
        };
        self.cancel_pending();

        let progress = if self.duration.is_zero() {
            1.0
        } else {
            let elapsed = now.saturating_duration_since(started_at);
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };

        if progress >= 1.0 {
            self.displayed = self.target;
            self.phase = AnimationPhase::Idle;
        } else {
            self.displayed = self.start.lerp(&self.target, ease_out_cubic(progress));
            self.pending = Some(self.scheduler.request_tick());
        }
        self.displayed
    }
}

// ============================================================================
// Tests
// ============================================================================
