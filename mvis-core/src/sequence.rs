//! Wrapping sequence counter bookkeeping
//!
//! Data frames carry a 15-bit counter. The distance between two counters is
//! `(current - last) mod 32768`: 0 is a duplicate, 1 the expected successor,
//! anything larger a gap of `distance - 1` frames, however wide.

use crate::constants::{COUNTER_LIMIT, COUNTER_MASK};
use crate::error::MvisError;

/// Outcome of observing one counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// First counter of a file, with no predecessor to compare against
    First {
        /// Counter value, also the number of block slots before it
        leading: u16,
    },
    /// Expected successor
    Next,
    /// `missing` frames were skipped
    Gap {
        /// Number of skipped counters
        missing: u16,
    },
    /// Same counter as the previous frame
    Duplicate,
}

impl Step {
    /// Frames counted missing by this step
    ///
    /// Slots before the first counter of a file are not counted: without a
    /// predecessor they cannot be told apart from a file starting mid-window.
    pub fn missing(&self) -> u64 {
        match self {
            Step::Gap { missing } => u64::from(*missing),
            _ => 0,
        }
    }

    /// Blocks the write position moves forward by, zero when nothing is written
    pub fn advance(&self) -> u64 {
        match self {
            Step::Next => 1,
            Step::Gap { missing } => u64::from(*missing) + 1,
            _ => 0,
        }
    }

    /// Whether the frame should be written
    pub fn accepts(&self) -> bool {
        matches!(self, Step::First { .. } | Step::Next | Step::Gap { .. })
    }
}

/// Distance from `last` to `current` in counter space
pub fn counter_diff(current: u16, last: u16) -> u16 {
    current.wrapping_sub(last) & COUNTER_MASK
}

/// Last counter seen for the active logical file
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    last: Option<u16>,
}

impl SequenceTracker {
    /// Tracker with no prior state
    pub fn new() -> Self {
        Self::default()
    }

    /// Last accepted counter
    pub fn last(&self) -> Option<u16> {
        self.last
    }

    /// Forget the last counter (new logical file)
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Classify `counter` against the last one and advance on acceptance
    pub fn observe(&mut self, counter: u16) -> Result<Step, MvisError> {
        if counter >= COUNTER_LIMIT {
            return Err(MvisError::InvalidCounter(counter));
        }

        let Some(last) = self.last else {
            self.last = Some(counter);
            return Ok(Step::First { leading: counter });
        };

        let step = match counter_diff(counter, last) {
            0 => Step::Duplicate,
            1 => Step::Next,
            diff => Step::Gap { missing: diff - 1 },
        };

        if step.accepts() {
            self.last = Some(counter);
        }
        Ok(step)
    }
}
