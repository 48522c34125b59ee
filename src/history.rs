use std::collections::VecDeque;

/// Fixed-capacity log of recent names, evicting the oldest entry first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    capacity: usize,
    entries: VecDeque<String>,
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` names.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Append `name`, dropping the oldest entries once the buffer is full.
    pub fn enqueue(&mut self, name: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(name.into());
    }

    /// Return the newest `count` entries, oldest first.
    pub fn last(&self, count: usize) -> Vec<String> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
