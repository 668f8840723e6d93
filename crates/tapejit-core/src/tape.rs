//! The program tape - a fixed-size, zero-initialized byte array

use std::collections::TryReserveError;
use std::io;

use crate::error::{Error, Result};

/// Fixed-size byte tape handed to compiled code as its state
///
/// The cursor into the tape lives entirely inside the running code; the
/// tape itself only provides storage and inspection after a run.
pub struct Tape {
    cells: Box<[u8]>,
}

impl Tape {
    /// Allocate a zeroed tape of `size` cells
    ///
    /// Allocation is fallible: an oversized request is reported as
    /// [`Error::MemoryAcquisition`] instead of aborting the process.
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self {
            cells: zeroed_cells(size)?.into_boxed_slice(),
        })
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the tape has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read a cell
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.cells.get(index).copied()
    }

    /// All cells
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Base address passed to compiled code
    pub(crate) fn base_ptr(&mut self) -> *mut u8 {
        self.cells.as_mut_ptr()
    }

    /// Reset every cell to zero
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }
}

impl std::fmt::Debug for Tape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nonzero = self.cells.iter().filter(|&&c| c != 0).count();
        f.debug_struct("Tape")
            .field("len", &self.cells.len())
            .field("nonzero_cells", &nonzero)
            .finish()
    }
}

/// Allocate `size` zeroed cells, reporting failure instead of aborting
pub(crate) fn zeroed_cells(size: usize) -> Result<Vec<u8>> {
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(size)
        .map_err(|e| allocation_failure(&e))?;
    cells.resize(size, 0);
    Ok(cells)
}

fn allocation_failure(err: &TryReserveError) -> Error {
    Error::MemoryAcquisition {
        what: "tape",
        source: io::Error::new(io::ErrorKind::OutOfMemory, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tape_is_zeroed() {
        let tape = Tape::new(64).unwrap();
        assert_eq!(tape.len(), 64);
        assert!(tape.cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn out_of_range_get_is_none() {
        let tape = Tape::new(4).unwrap();
        assert_eq!(tape.get(3), Some(0));
        assert_eq!(tape.get(4), None);
    }

    #[test]
    fn impossible_allocation_fails_cleanly() {
        let result = Tape::new(usize::MAX);
        assert!(matches!(
            result,
            Err(Error::MemoryAcquisition { what: "tape", .. })
        ));
    }

    #[test]
    fn zeroed_cells_reports_oversized_request() {
        assert_eq!(zeroed_cells(3).unwrap(), vec![0, 0, 0]);
        assert!(matches!(
            zeroed_cells(isize::MAX as usize),
            Err(Error::MemoryAcquisition { what: "tape", .. })
        ));
    }

    #[test]
    fn clear_resets_cells() {
        let mut tape = Tape::new(2).unwrap();
        tape.cells[1] = 9;
        tape.clear();
        assert_eq!(tape.cells(), &[0, 0]);
    }
}
