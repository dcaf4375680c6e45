//! Ring buffer of recent combat records, readable through `query::combat_log`.

use std::collections::VecDeque;

use valor_core::Event;

/// Bounded history of the most recent combat records.
#[derive(Clone, Debug)]
pub struct CombatLog {
    capacity: usize,
    records: VecDeque<Event>,
}

impl CombatLog {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Keeps the combat-relevant events of a batch, evicting the oldest first.
    pub(crate) fn record_all(&mut self, events: &[Event]) {
        for event in events.iter().filter(|event| event.is_combat_record()) {
            if self.capacity == 0 {
                return;
            }
            while self.records.len() >= self.capacity {
                let _ = self.records.pop_front();
            }
            self.records.push_back(event.clone());
        }
    }

    /// Records from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.records.iter()
    }

    /// Number of records retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valor_core::{Event, UnitId};

    fn round(round: u32) -> Event {
        Event::RoundAdvanced { round }
    }

    fn respawn(id: u32) -> Event {
        Event::HeroRespawned {
            hero: UnitId::new(id),
            cell: valor_core::CellCoord::new(7, 1),
        }
    }

    #[test]
    fn keeps_only_the_newest_records() {
        let mut log = CombatLog::new(10);
        let events: Vec<Event> = (0..15).map(respawn).collect();
        log.record_all(&events);
        assert_eq!(log.len(), 10);
        assert_eq!(log.iter().next(), Some(&respawn(5)));
    }

    #[test]
    fn ignores_non_combat_events() {
        let mut log = CombatLog::new(10);
        log.record_all(&[round(1), round(2)]);
        assert!(log.is_empty());
    }
}
