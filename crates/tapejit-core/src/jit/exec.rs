//! Executor - install, invoke and release one compiled routine

use std::time::Instant;

use tracing::debug;

use super::host::{with_bound_io, ReadFn, WriteFn};
use super::memory::ExecutableRegion;
use super::translate::MachineCode;
use crate::config::{Config, DEFAULT_EOF_BYTE, DEFAULT_TAPE_SIZE};
use crate::error::{Error, Result};
use crate::io::ByteIo;
use crate::tape::Tape;

/// Entry point of a generated routine: `(output, input, tape base)`
type EntryFn = unsafe extern "C" fn(WriteFn, ReadFn, *mut u8);

/// Returns true if generated code can run on this host
#[must_use]
pub const fn native_supported() -> bool {
    cfg!(all(target_arch = "x86_64", unix))
}

/// Runs [`MachineCode`] natively
///
/// Each call owns its executable region and tape exclusively; both are
/// released before the call returns, on every path.
///
/// # Preconditions
/// The program must keep its cursor inside the tape. Compiled code does
/// not check bounds, and leaving the tape is undefined behavior.
#[derive(Debug, Clone)]
pub struct Executor {
    tape_size: usize,
    eof_byte: u8,
}

impl Executor {
    /// Executor using the tape size and EOF byte from `config`
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            tape_size: config.tape_size,
            eof_byte: config.eof_byte,
        }
    }

    /// Tape length allocated for each run
    #[must_use]
    pub fn tape_size(&self) -> usize {
        self.tape_size
    }

    /// Run `code` once on a fresh zeroed tape
    pub fn execute(&self, code: &MachineCode, io: &mut dyn ByteIo) -> Result<()> {
        ensure_native()?;
        Config::default()
            .with_tape_size(self.tape_size)
            .validate()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let region = ExecutableRegion::install(code.bytes())?;
        let mut tape = Tape::new(self.tape_size)?;
        self.invoke(&region, &mut tape, io)
    }

    /// Run `code` once on a caller-owned tape, leaving it for inspection
    ///
    /// The cursor starts at cell 0 of `tape`, which must hold at least one cell.
    pub fn execute_on(&self, code: &MachineCode, tape: &mut Tape, io: &mut dyn ByteIo) -> Result<()> {
        ensure_native()?;
        if tape.is_empty() {
            return Err(Error::InvalidConfig(
                "tape must hold at least one cell".to_string(),
            ));
        }
        let region = ExecutableRegion::install(code.bytes())?;
        self.invoke(&region, tape, io)
    }

    fn invoke(&self, region: &ExecutableRegion, tape: &mut Tape, io: &mut dyn ByteIo) -> Result<()> {
        let base = tape.base_ptr();
        let started = Instant::now();

        // SAFETY: the region holds a routine produced by `Translator`, which
        // follows `EntryFn`'s calling convention and resolves every branch.
        let entry: EntryFn = unsafe { std::mem::transmute::<*const u8, EntryFn>(region.as_ptr()) };

        with_bound_io(io, self.eof_byte, |host| unsafe {
            entry(host.write, host.read, base);
        })?;

        debug!(
            code_bytes = region.len(),
            tape_size = tape.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "native execution finished"
        );
        Ok(())
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            eof_byte: DEFAULT_EOF_BYTE,
        }
    }
}

fn ensure_native() -> Result<()> {
    if native_supported() {
        Ok(())
    } else {
        Err(Error::UnsupportedTarget)
    }
}
