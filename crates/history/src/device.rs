//! The history device seam.
//!
//! The synchronizer talks to the browser's session history through this
//! trait: read the current location, push or replace an entry with an
//! opaque state payload. Back/forward events arrive from the host shell,
//! which forwards them to [`crate::sync::Synchronizer::handle_pop`].

use serde_json::Value;

use crate::location::Location;

pub trait HistoryDevice {
    fn location(&self) -> Location;

    /// Append a new entry, discarding any forward entries.
    fn push(&mut self, location: Location, state: Value);

    /// Rewrite the current entry in place.
    fn replace(&mut self, location: Location, state: Value);
}

// ---------------------------------------------------------------------------
// In-memory device
// ---------------------------------------------------------------------------

/// One session-history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub location: Location,
    pub state: Value,
}

/// In-memory [`HistoryDevice`] mimicking browser session history, for
/// tests and headless harnesses.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl MemoryHistory {
    /// Start with a single entry (the page the user landed on), carrying
    /// no state payload.
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![HistoryEntry {
                location: initial,
                state: Value::Null,
            }],
            index: 0,
        }
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Simulate the browser back button. Returns the entry navigated to.
    pub fn back(&mut self) -> Option<HistoryEntry> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Simulate the browser forward button. Returns the entry navigated to.
    pub fn forward(&mut self) -> Option<HistoryEntry> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }
}

impl HistoryDevice for MemoryHistory {
    fn location(&self) -> Location {
        self.current().location.clone()
    }

    fn push(&mut self, location: Location, state: Value) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry { location, state });
        self.index += 1;
    }

    fn replace(&mut self, location: Location, state: Value) {
        self.entries[self.index] = HistoryEntry { location, state };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_appends_and_back_returns_previous() {
        let mut history = MemoryHistory::new(Location::parse("/start"));
        history.push(Location::parse("/start/phone"), json!({"step": "phone"}));
        assert_eq!(history.len(), 2);

        let entry = history.back().unwrap();
        assert_eq!(entry.location.path, "/start");
        assert!(history.back().is_none());
    }

    #[test]
    fn push_discards_forward_entries() {
        let mut history = MemoryHistory::new(Location::parse("/start"));
        history.push(Location::parse("/start/phone"), json!({"step": "phone"}));
        history.back().unwrap();
        history.push(Location::parse("/start/verify"), json!({"step": "verify"}));

        assert_eq!(history.len(), 2);
        assert!(history.forward().is_none());
        assert_eq!(history.current().location.path, "/start/verify");
    }

    #[test]
    fn replace_rewrites_in_place() {
        let mut history = MemoryHistory::new(Location::parse("/start"));
        history.replace(Location::parse("/start/roles"), json!({"step": "roles"}));
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().location.path, "/start/roles");
    }
}
