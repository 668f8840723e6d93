//! Loop marker stack - pending forward references for open loops

use crate::error::{Error, Result};
use crate::program::SourcePos;

/// One open loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<T> {
    /// Where the loop-open's forward reference must be resolved.
    ///
    /// For the translator this is the code offset just past the
    /// displacement field; the interpreter stores an instruction index.
    pub target: T,

    /// Source position of the `[`
    pub pos: SourcePos,
}

/// LIFO of open loops
///
/// Must be empty when translation ends; [`LoopMarkers::finish`] checks it.
#[derive(Debug, Clone)]
pub struct LoopMarkers<T = usize> {
    stack: Vec<Marker<T>>,
}

impl<T> LoopMarkers<T> {
    /// Create an empty stack
    #[must_use]
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Record a new open loop
    pub fn push(&mut self, target: T, pos: SourcePos) {
        self.stack.push(Marker { target, pos });
    }

    /// Close the innermost open loop
    ///
    /// `pos` is the position of the `]`, used when there is nothing to close.
    pub fn pop(&mut self, pos: SourcePos) -> Result<Marker<T>> {
        self.stack.pop().ok_or(Error::UnbalancedLoopClose { pos })
    }

    /// Number of loops currently open
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns true if no loop is open
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Assert the end-of-input invariant: every loop has been closed
    pub fn finish(self) -> Result<()> {
        match self.stack.last() {
            None => Ok(()),
            Some(innermost) => Err(Error::UnterminatedLoop {
                pos: innermost.pos,
                open: self.stack.len(),
            }),
        }
    }
}

impl<T> Default for LoopMarkers<T> {
    fn default() -> Self {
        Self::new()
    }
}
