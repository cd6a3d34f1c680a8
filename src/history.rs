//! Bounded undo checkpoints.

use std::collections::VecDeque;

use crate::buffer::PixelBuffer;

/// Default number of checkpoints kept for undo
pub const HISTORY_LIMIT: usize = 50;

/// A bounded stack of buffer checkpoints.
///
/// Pushing past the limit silently discards the oldest checkpoint; popping
/// always returns the newest.
#[derive(Debug, Clone)]
pub struct History {
    checkpoints: VecDeque<PixelBuffer>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl History {
    /// Creates an empty history holding at most `limit` checkpoints (at least one)
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            checkpoints: VecDeque::with_capacity(limit.min(HISTORY_LIMIT)),
            limit,
        }
    }

    /// Store a checkpoint, evicting the oldest one when full
    pub fn push(&mut self, checkpoint: PixelBuffer) {
        if self.checkpoints.len() == self.limit {
            self.checkpoints.pop_front();
            log::debug!("History full, dropped oldest checkpoint");
        }
        self.checkpoints.push_back(checkpoint);
    }

    /// Remove and return the newest checkpoint
    pub fn pop(&mut self) -> Option<PixelBuffer> {
        self.checkpoints.pop_back()
    }

    pub fn peek(&self) -> Option<&PixelBuffer> {
        self.checkpoints.back()
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.checkpoints.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Size;
    use egui::Color32;

    fn tagged(width: u32) -> PixelBuffer {
        PixelBuffer::new(Size::new(width, 1).unwrap(), Color32::WHITE)
    }

    #[test]
    fn test_bounded_with_fifo_eviction() {
        let mut history = History::default();
        for width in 1..=(HISTORY_LIMIT as u32 + 5) {
            history.push(tagged(width));
            assert!(history.len() <= HISTORY_LIMIT);
        }
        assert_eq!(history.len(), HISTORY_LIMIT);

        // The newest survive, the first five were dropped
        let mut widths = Vec::new();
        while let Some(checkpoint) = history.pop() {
            widths.push(checkpoint.width());
        }
        assert_eq!(widths.first(), Some(&(HISTORY_LIMIT as u32 + 5)));
        assert_eq!(widths.last(), Some(&6));
    }

    #[test]
    fn test_pop_empty_is_none() {
        let mut history = History::new(3);
        assert!(history.pop().is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_huge_limit_allocates_lazily() {
        let mut history = History::new(usize::MAX / 2);
        assert_eq!(history.limit(), usize::MAX / 2);
        history.push(tagged(1));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_zero_limit_keeps_one() {
        let mut history = History::new(0);
        assert_eq!(history.limit(), 1);
        history.push(tagged(1));
        history.push(tagged(2));
        assert_eq!(history.len(), 1);
        assert_eq!(history.peek().map(PixelBuffer::width), Some(2));
    }
}
