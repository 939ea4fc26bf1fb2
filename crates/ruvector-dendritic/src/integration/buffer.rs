//! Mutex-guarded input mailbox.

use crate::types::TimestampedInput;
use parking_lot::Mutex;
use std::mem;

/// Inputs awaiting the next tick.
///
/// `push` holds the lock only to append; `drain` swaps the whole batch out in
/// one step, so an input lands in exactly one tick.
#[derive(Debug, Default)]
pub struct InputBuffer {
    inputs: Mutex<Vec<TimestampedInput>>,
}

impl InputBuffer {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an input
    pub fn push(&self, input: TimestampedInput) {
        self.inputs.lock().push(input);
    }

    /// Take every buffered input, leaving the buffer empty
    pub fn drain(&self) -> Vec<TimestampedInput> {
        mem::take(&mut *self.inputs.lock())
    }

    /// Number of buffered inputs
    pub fn len(&self) -> usize {
        self.inputs.lock().len()
    }

    /// True when nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.inputs.lock().is_empty()
    }

    /// Drop every buffered input and release the allocation
    pub fn clear(&self) {
        *self.inputs.lock() = Vec::new();
    }
}
