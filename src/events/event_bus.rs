//! Single-owner dispatcher for persona events.
//!
//! Each controller owns one bus.  Listeners run synchronously, in
//! registration order, after the controller has finished applying a change,
//! so a listener always observes a fully updated state.

use std::fmt;

use super::persona_event::{EventEnvelope, PersonaEvent};

/// Receives persona events.
pub trait PersonaListener {
    fn on_event(&mut self, envelope: &EventEnvelope);
}

impl<F> PersonaListener for F
where
    F: FnMut(&EventEnvelope),
{
    fn on_event(&mut self, envelope: &EventEnvelope) {
        self(envelope)
    }
}

/// Handle returned by [`PersonaEventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct PersonaEventBus {
    listeners: Vec<(ListenerId, Box<dyn PersonaListener>)>,
    next_listener: u64,
    next_sequence: u64,
}

impl fmt::Debug for PersonaEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonaEventBus")
            .field("listeners", &self.listeners.len())
            .field("emitted", &self.next_sequence)
            .finish()
    }
}

impl PersonaEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn PersonaListener>) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() < before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Stamp `event` and deliver it to every listener.
    pub fn emit(&mut self, event: PersonaEvent) -> EventEnvelope {
        self.next_sequence += 1;
        let envelope = EventEnvelope::new(self.next_sequence, event);
        log::trace!(
            "emit #{} {} to {} listener(s)",
            envelope.sequence,
            envelope.event_type(),
            self.listeners.len()
        );
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_event(&envelope);
        }
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::activation::AgentActivationState;
    use crate::persona::trait_id::WeightVector;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(bus: &mut PersonaEventBus) -> (ListenerId, Rc<RefCell<Vec<EventEnvelope>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = bus.subscribe(Box::new(move |e: &EventEnvelope| {
            sink.borrow_mut().push(e.clone())
        }));
        (id, seen)
    }

    #[test]
    fn test_emit_reaches_all_listeners_in_order() {
        let mut bus = PersonaEventBus::new();
        let (_, a) = recorder(&mut bus);
        let (_, b) = recorder(&mut bus);

        bus.emit(PersonaEvent::ActivationChanged {
            state: AgentActivationState::default(),
        });
        bus.emit(PersonaEvent::AnimationSettled {
            displayed: WeightVector::uniform(),
        });

        assert_eq!(a.borrow().len(), 2);
        assert_eq!(b.borrow().len(), 2);
        assert_eq!(a.borrow()[0].sequence, 1);
        assert_eq!(a.borrow()[1].sequence, 2);
        assert_eq!(a.borrow()[1].event_type(), "animation_settled");
        assert_eq!(a.borrow()[0].event_id, b.borrow()[0].event_id);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = PersonaEventBus::new();
        let (id, seen) = recorder(&mut bus);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(PersonaEvent::AnimationSettled {
            displayed: WeightVector::uniform(),
        });
        assert!(seen.borrow().is_empty());
        assert_eq!(bus.listener_count(), 0);
    }
}
