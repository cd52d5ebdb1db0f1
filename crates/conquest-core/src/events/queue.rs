//! Outbound event queue.
//!
//! Mutations push notifications here instead of invoking callbacks, and the
//! owner drains the queue once a step has finished. Consumers therefore
//! never observe a half-applied step.

use conquest_events::{generate_event_id, Event, EventKind, SimTime};

/// Pending events for the current and previous steps, in emission order.
#[derive(Debug)]
pub struct EventQueue {
    now: SimTime,
    next_sequence: u64,
    events: Vec<Event>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self {
            now: SimTime::ZERO,
            next_sequence: 1,
            events: Vec::new(),
        }
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp subsequent events with this simulated time.
    pub fn set_time(&mut self, now: SimTime) {
        self.now = now;
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn push(&mut self, kind: EventKind) {
        let id = generate_event_id(self.next_sequence);
        self.next_sequence += 1;
        self.events.push(Event::new(id, self.now, kind));
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn pending(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conquest_events::FactionId;

    #[test]
    fn test_ids_continue_across_drains() {
        let mut queue = EventQueue::new();
        queue.push(EventKind::FactionEliminated {
            faction: FactionId::from("faction_1"),
        });
        let first = queue.drain();
        assert!(queue.is_empty());

        queue.set_time(SimTime::from_millis(2000));
        queue.push(EventKind::Victory {
            faction: FactionId::from("faction_0"),
        });
        let second = queue.drain();

        assert_eq!(first[0].event_id, "evt_00000001");
        assert_eq!(second[0].event_id, "evt_00000002");
        assert_eq!(second[0].time, SimTime::from_millis(2000));
    }
}
