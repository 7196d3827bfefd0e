//! Navigation history
//!
//! `HistoryBridge` is the seam between the coordinator and whatever keeps the
//! session history. Writes (`push`, `replace`) are silent; only moves through
//! the history (`back`, `forward`) notify subscribers. The coordinator relies
//! on that asymmetry to never react to its own writes.

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::models::Location;

/// Session history as seen by the coordinator
pub trait HistoryBridge {
    /// Location of the current entry
    fn current_location(&self) -> Location;

    /// Add an entry after the current one, dropping any forward entries.
    /// Does not notify subscribers.
    fn push(&mut self, location: Location, label: &str);

    /// Overwrite the current entry. Does not notify subscribers.
    fn replace(&mut self, location: Location, label: &str);

    /// Step back one entry, notifying subscribers if the cursor moved
    fn back(&mut self);

    /// Step forward one entry, notifying subscribers if the cursor moved
    fn forward(&mut self);

    /// Receive the new current location once per history move
    fn subscribe(&mut self) -> UnboundedReceiver<Location>;
}

/// One history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub location: Location,
    pub label: String,
}

/// In-process session history with a cursor, like a browser tab's
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Vec<Entry>,
    cursor: usize,
    listeners: Vec<UnboundedSender<Location>>,
}

impl MemoryHistory {
    /// Start a history whose only entry is `initial`
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![Entry {
                location: initial,
                label: String::new(),
            }],
            cursor: 0,
            listeners: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    fn notify(&mut self) {
        let location = self.current_location();
        // Drop listeners whose receiver is gone
        self.listeners
            .retain(|listener| listener.send(location.clone()).is_ok());
        tracing::debug!(%location, "history moved");
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(Location::root())
    }
}

impl HistoryBridge for MemoryHistory {
    fn current_location(&self) -> Location {
        self.entries[self.cursor].location.clone()
    }

    fn push(&mut self, location: Location, label: &str) {
        self.entries.truncate(self.cursor + 1);
        tracing::debug!(%location, label, "history push");
        self.entries.push(Entry {
            location,
            label: label.to_string(),
        });
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, location: Location, label: &str) {
        tracing::debug!(%location, label, "history replace");
        self.entries[self.cursor] = Entry {
            location,
            label: label.to_string(),
        };
    }

    fn back(&mut self) {
        if self.can_go_back() {
            self.cursor -= 1;
            self.notify();
        }
    }

    fn forward(&mut self) {
        if self.can_go_forward() {
            self.cursor += 1;
            self.notify();
        }
    }

    fn subscribe(&mut self) -> UnboundedReceiver<Location> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[test]
    fn test_push_does_not_notify() {
        let mut history = MemoryHistory::new(loc("/"));
        let mut rx = history.subscribe();

        history.push(loc("/?search=a"), "Search");
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_location(), loc("/?search=a"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_back_notifies_once() {
        let mut history = MemoryHistory::new(loc("/"));
        let mut rx = history.subscribe();
        history.push(loc("/?search=a"), "Search");

        history.back();
        assert_eq!(rx.try_recv().unwrap(), loc("/"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_back_at_start_is_silent() {
        let mut history = MemoryHistory::new(loc("/"));
        let mut rx = history.subscribe();
        history.back();
        assert!(rx.try_recv().is_err());
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_forward_after_back() {
        let mut history = MemoryHistory::new(loc("/"));
        let mut rx = history.subscribe();
        history.push(loc("/?feed=x"), "Podcast");
        history.back();
        history.forward();

        assert_eq!(rx.try_recv().unwrap(), loc("/"));
        assert_eq!(rx.try_recv().unwrap(), loc("/?feed=x"));
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut history = MemoryHistory::new(loc("/"));
        history.push(loc("/?search=a"), "Search");
        history.push(loc("/?search=b"), "Search");
        history.back();
        history.back();
        history.push(loc("/?feed=y"), "Podcast");

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[1].label, "Podcast");
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_replace_keeps_length() {
        let mut history = MemoryHistory::new(loc("/"));
        let mut rx = history.subscribe();
        history.replace(loc("/?search=z"), "Search");
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_location(), loc("/?search=z"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_subscriber_wakes_on_back() {
        use tokio_test::{assert_pending, assert_ready_eq, task};

        let mut history = MemoryHistory::new(loc("/"));
        let mut rx = history.subscribe();
        history.push(loc("/?search=a"), "Search");

        let mut next = task::spawn(rx.recv());
        assert_pending!(next.poll());

        history.back();
        assert!(next.is_woken());
        assert_ready_eq!(next.poll(), Some(loc("/")));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut history = MemoryHistory::new(loc("/"));
        let rx = history.subscribe();
        drop(rx);
        history.push(loc("/a"), "");
        history.back();
        assert!(history.listeners.is_empty());
    }
}
