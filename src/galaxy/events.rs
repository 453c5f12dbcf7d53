//! Chronological event log

use serde::{Deserialize, Serialize};

use crate::core::types::Year;

/// Every message recorded during one year, in order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YearEntry {
    pub year: Year,
    pub messages: Vec<String>,
}

/// Append-only log; consecutive messages of the same year share one entry
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub entries: Vec<YearEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, year: Year, message: impl Into<String>) {
        let message = message.into();
        tracing::trace!(year, "{}", message);

        match self.entries.last_mut() {
            Some(entry) if entry.year == year => entry.messages.push(message),
            _ => self.entries.push(YearEntry {
                year,
                messages: vec![message],
            }),
        }
    }

    pub fn messages_for_year(&self, year: Year) -> impl Iterator<Item = &String> {
        self.entries
            .iter()
            .filter(move |e| e.year == year)
            .flat_map(|e| e.messages.iter())
    }

    /// Total number of messages across all years
    pub fn message_count(&self) -> usize {
        self.entries.iter().map(|e| e.messages.len()).sum()
    }

    pub fn latest(&self) -> Option<&YearEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_year_messages_merge() {
        let mut log = EventLog::new();
        log.record(1, "a");
        log.record(1, "b");
        log.record(2, "c");
        log.record(2, "d");
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[0].messages, vec!["a", "b"]);
        assert_eq!(log.message_count(), 4);
        assert_eq!(log.messages_for_year(2).count(), 2);
    }

    #[test]
    fn test_year_gap_starts_new_entry() {
        let mut log = EventLog::new();
        log.record(3, "x");
        log.record(5, "y");
        assert_eq!(log.latest().map(|e| e.year), Some(5));
        assert_eq!(log.messages_for_year(4).count(), 0);
    }
}
