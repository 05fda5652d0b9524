//! Session history.
//!
//! A stack of locations with a cursor, behaving like a browser tab: pushing
//! discards forward entries, moving outside the stack does nothing.

use serde::Serialize;
use waypoint_location::Location;

/// How the current entry was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationType {
    /// A new entry was pushed.
    Push,
    /// The current entry was replaced.
    Replace,
    /// The cursor moved (back, forward, or initial load).
    Pop,
}

impl NavigationType {
    /// Lowercase name, for logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Replace => "replace",
            Self::Pop => "pop",
        }
    }
}

/// A history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Entry location.
    pub location: Location,
    /// Unique key for the entry.
    pub key: u64,
}

/// The history stack.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    next_key: u64,
}

impl History {
    /// Create a history with a single entry.
    #[must_use]
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![HistoryEntry {
                location: initial,
                key: 0,
            }],
            index: 0,
            next_key: 1,
        }
    }

    fn key(&mut self) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    /// Current entry.
    #[must_use]
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    /// Current location.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.current().location
    }

    /// Push a location, discarding forward entries.
    pub fn push(&mut self, location: Location) {
        let key = self.key();
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry { location, key });
        self.index += 1;
    }

    /// Replace the current entry.
    pub fn replace(&mut self, location: Location) {
        let key = self.key();
        self.entries[self.index] = HistoryEntry { location, key };
    }

    /// Move the cursor by `delta`.
    ///
    /// Returns the new current location, or `None` (without moving) if the
    /// target is outside the stack or `delta` is zero.
    pub fn go(&mut self, delta: isize) -> Option<&Location> {
        if delta == 0 {
            return None;
        }
        let target = self.index.checked_add_signed(delta)?;
        if target >= self.entries.len() {
            return None;
        }
        self.index = target;
        Some(self.location())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// History always holds at least one entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Cursor position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if there is an entry behind the cursor.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    /// Check if there is an entry ahead of the cursor.
    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }
}
