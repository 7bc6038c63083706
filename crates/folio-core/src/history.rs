//! Bounded undo/redo stacks over deep state snapshots.
//!
//! Linear history semantics: recording a new snapshot invalidates anything
//! that was undone (no redo branching), and the past stack evicts its
//! oldest entry FIFO once the configured cap is reached.

/// Default maximum number of past snapshots retained.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Two-stack history machine over owned snapshots of type `T`.
///
/// Snapshots are deep copies handed in by the caller, never live
/// references; undo/redo trade the caller's current state against the
/// stacks and return the state to restore.
#[derive(Debug)]
pub struct History<T> {
    past: Vec<T>,
    future: Vec<T>,
    max_size: usize,
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_HISTORY)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            max_size,
        }
    }

    /// Record the pre-mutation state. Clears the future stack and evicts
    /// the oldest past entry once over capacity.
    pub fn record(&mut self, snapshot: T) {
        self.future.clear();
        self.past.push(snapshot);
        if self.past.len() > self.max_size {
            self.past.remove(0);
        }
    }

    /// Trade `current` for the most recent past state. `None` when there
    /// is nothing to undo; `current` is untouched in that case.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.past.pop()?;
        self.future.insert(0, current);
        Some(previous)
    }

    /// Trade `current` for the next undone state. `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self, current: T) -> Option<T> {
        if self.future.is_empty() {
            return None;
        }
        self.past.push(current);
        if self.past.len() > self.max_size {
            self.past.remove(0);
        }
        Some(self.future.remove(0))
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of retained past snapshots.
    pub fn depth(&self) -> usize {
        self.past.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_is_noop() {
        let mut history: History<i32> = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(0), None);
        assert_eq!(history.redo(0), None);
        // A failed undo must not pollute the future stack.
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history = History::new();
        history.record(1);
        history.record(2);

        let restored = history.undo(3).unwrap();
        assert_eq!(restored, 2);
        assert!(history.can_redo());

        let replayed = history.redo(restored).unwrap();
        assert_eq!(replayed, 3);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_clears_future() {
        let mut history = History::new();
        history.record(1);
        let _ = history.undo(2).unwrap();
        assert!(history.can_redo());

        history.record(1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut history = History::with_max_size(3);
        for i in 0..10 {
            history.record(i);
        }
        assert_eq!(history.depth(), 3);

        // Oldest entries were evicted; only the newest three remain.
        assert_eq!(history.undo(99), Some(9));
        assert_eq!(history.undo(9), Some(8));
        assert_eq!(history.undo(8), Some(7));
        assert_eq!(history.undo(7), None);
    }

    #[test]
    fn test_redo_respects_cap() {
        let mut history = History::with_max_size(2);
        history.record(1);
        let _ = history.undo(2);
        history.record(10);
        history.record(11);
        // Past is full; a redo with an empty future must not push.
        assert_eq!(history.redo(12), None);
        assert_eq!(history.depth(), 2);
    }
}
