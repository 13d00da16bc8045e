//! Bounded source of the integers to reveal

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Next integer to reveal, counting up from 1 to a fixed bound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegerCursor {
    next: u64,
    /// Inclusive upper bound
    limit: u64,
}

impl IntegerCursor {
    pub fn new(limit: u64) -> Self {
        Self { next: 1, limit }
    }

    /// Pull up to `count` integers in ascending order
    pub fn next_n(&mut self, count: u64) -> Range<u64> {
        let start = self.next;
        let end = start.saturating_add(count).min(self.limit.saturating_add(1)).max(start);
        self.next = end;
        start..end
    }

    /// The integer the next pull starts at
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// How many integers have been handed out so far
    pub fn issued(&self) -> u64 {
        self.next - 1
    }

    pub fn is_exhausted(&self) -> bool {
        self.next > self.limit
    }
}
