use crate::config::EditorConfig;
use std::collections::VecDeque;

// Pushing after an undo drops the redo branch; once `capacity` snapshots are
// held the oldest one is discarded.
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: VecDeque<T>,
    cursor: usize,
    capacity: usize,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T, capacity: usize) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn with_config(initial: T, config: &EditorConfig) -> Self {
        Self::new(initial, config.history_capacity)
    }

    pub fn current(&self) -> &T {
        &self.snapshots[self.cursor]
    }

    pub fn push(&mut self, snapshot: T) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        tracing::trace!(depth = self.snapshots.len(), "history snapshot pushed");
    }

    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
