//! Bounded log of raw SDK events, kept for display.

use campaign_types::EventRecord;
use std::collections::VecDeque;

pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 25;

/// Most-recent-N ring of [`EventRecord`]s, oldest first.
///
/// Evicted records are gone; the log never feeds back into call control.
#[derive(Debug, Clone)]
pub struct EventLog {
    records: VecDeque<EventRecord>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, record: EventRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.kind.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_most_recent_entries_oldest_first() {
        let mut log = EventLog::default();
        for i in 0..30 {
            log.record(EventRecord::new(format!("event-{i}")));
        }

        assert_eq!(log.len(), 25);
        let kinds = log.kinds();
        assert_eq!(kinds.first(), Some(&"event-5"));
        assert_eq!(kinds.last(), Some(&"event-29"));
        let expected: Vec<String> = (5..30).map(|i| format!("event-{i}")).collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn zero_capacity_keeps_latest() {
        let mut log = EventLog::with_capacity(0);
        log.record(EventRecord::new("a"));
        log.record(EventRecord::new("b"));
        assert_eq!(log.kinds(), vec!["b"]);
    }
}
