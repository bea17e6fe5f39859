//! Deferred continuations as data: a min-heap of (due tick, payload)
//! scheduled against the simulation clock. Payloads are small values, not
//! closures, so ordering and cancellation stay explicit and testable.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// What a scheduled continuation does when it fires.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum GameEvent {
    /// Revert the pickup camera pose and the avatar's flourish offsets.
    PickupPoseEnd,
    /// End the pickup animation; optionally teleport (cave entrances).
    PickupEnd { teleport: Option<[i32; 3]> },
    /// Start a room's song after the transition delay.
    SongStart { name: String },
}

impl GameEvent {
    fn is_pickup(&self) -> bool {
        matches!(
            self,
            GameEvent::PickupPoseEnd | GameEvent::PickupEnd { .. }
        )
    }
}

#[derive(Eq, PartialEq, Ord, PartialOrd)]
struct Entry {
    due: u64,
    seq: u64,
    event: GameEvent,
}

/// FIFO within a tick, ordered by due tick across ticks.
#[derive(Default)]
pub struct ScheduledEvents {
    heap: BinaryHeap<Reverse<Entry>>,
    seq: u64,
}

impl ScheduledEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_tick: u64, event: GameEvent) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Reverse(Entry {
            due: due_tick,
            seq,
            event,
        }));
    }

    /// Pops the next event due at or before `now`, oldest first.
    pub fn pop_due(&mut self, now: u64) -> Option<GameEvent> {
        if self.heap.peek().is_some_and(|Reverse(e)| e.due <= now) {
            return self.heap.pop().map(|Reverse(e)| e.event);
        }
        None
    }

    /// Drops pending pickup continuations. Dying mid-pickup must not leave a
    /// teleport aimed at a dead avatar.
    pub fn cancel_pickup(&mut self) {
        let rest: Vec<_> = self
            .heap
            .drain()
            .filter(|Reverse(e)| !e.event.is_pickup())
            .collect();
        self.heap = rest.into_iter().collect();
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fire_in_due_order_then_fifo() {
        let mut q = ScheduledEvents::new();
        q.schedule(10, GameEvent::PickupPoseEnd);
        q.schedule(5, GameEvent::SongStart { name: "a".into() });
        q.schedule(5, GameEvent::SongStart { name: "b".into() });
        assert!(q.pop_due(4).is_none());
        assert_eq!(q.pop_due(10), Some(GameEvent::SongStart { name: "a".into() }));
        assert_eq!(q.pop_due(10), Some(GameEvent::SongStart { name: "b".into() }));
        assert_eq!(q.pop_due(10), Some(GameEvent::PickupPoseEnd));
        assert!(q.pop_due(10).is_none());
    }

    #[test]
    fn cancel_pickup_spares_other_events() {
        let mut q = ScheduledEvents::new();
        q.schedule(3, GameEvent::PickupPoseEnd);
        q.schedule(4, GameEvent::PickupEnd { teleport: None });
        q.schedule(5, GameEvent::SongStart { name: "s".into() });
        q.cancel_pickup();
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_due(9), Some(GameEvent::SongStart { name: "s".into() }));
    }
}
