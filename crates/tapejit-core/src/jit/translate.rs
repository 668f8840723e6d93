//! Translator - source text to fully resolved machine code

use tracing::{debug, trace};

use super::buffer::CodeBuffer;
use super::markers::LoopMarkers;
use super::select::{InstructionSelector, DISPLACEMENT_LEN, X86_64};
use crate::error::{Error, Result};
use crate::program::{instructions, Instruction};

/// Finalized machine code for one program
///
/// Only [`Translator::translate`] constructs this, after every loop has
/// been closed and both of its displacements patched, so a `MachineCode`
/// never contains an unresolved placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct MachineCode {
    bytes: Vec<u8>,
    instructions: usize,
    loops: usize,
}

impl MachineCode {
    /// The routine's bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the routine in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Never true: every routine has at least a prologue and epilogue
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of source instructions translated
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions
    }

    /// Number of loops resolved
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.loops
    }
}

impl std::fmt::Debug for MachineCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineCode")
            .field("len", &self.bytes.len())
            .field("instructions", &self.instructions)
            .field("loops", &self.loops)
            .finish()
    }
}

/// Translates source programs using an instruction selector
#[derive(Debug, Clone, Default)]
pub struct Translator<S = X86_64> {
    selector: S,
}

impl Translator<X86_64> {
    /// Translator for the host's native target
    #[must_use]
    pub fn new() -> Self {
        Self { selector: X86_64 }
    }
}

impl<S: InstructionSelector> Translator<S> {
    /// Translator with a specific selector
    #[must_use]
    pub fn with_selector(selector: S) -> Self {
        Self { selector }
    }

    /// Translate `source` into machine code
    ///
    /// Fails with [`Error::UnbalancedLoopClose`] or
    /// [`Error::UnterminatedLoop`] on mismatched brackets, and with
    /// [`Error::MissingDisplacement`] if the selector's loop templates
    /// carry no branch field; nothing is returned for execution in that case.
    pub fn translate(&self, source: &str) -> Result<MachineCode> {
        let mut buf = CodeBuffer::with_capacity(source.len() * 3 + 64);
        let mut markers = LoopMarkers::new();
        let mut count = 0;
        let mut loops = 0;

        buf.write_bytes(self.selector.prologue());

        for (pos, instr) in instructions(source) {
            count += 1;
            match instr {
                Instruction::LoopOpen => {
                    let field_end = self.emit_branch(instr, &mut buf)?;
                    markers.push(field_end, pos);
                }
                Instruction::LoopClose => {
                    let open = markers.pop(pos)?;
                    let close_end = self.emit_branch(instr, &mut buf)?;
                    patch_loop(&mut buf, open.target, close_end)?;
                    loops += 1;
                    trace!(
                        open = open.pos.index,
                        close = pos.index,
                        span = close_end - open.target,
                        "patched loop"
                    );
                }
                _ => {
                    self.selector.emit(instr, &mut buf);
                }
            }
        }

        markers.finish()?;
        buf.write_bytes(self.selector.epilogue());

        debug!(
            target_name = self.selector.name(),
            instructions = count,
            loops,
            bytes = buf.len(),
            "translated program"
        );

        Ok(MachineCode {
            bytes: buf.into_bytes(),
            instructions: count,
            loops,
        })
    }

    fn emit_branch(&self, instr: Instruction, buf: &mut CodeBuffer) -> Result<usize> {
        self.selector
            .emit(instr, buf)
            .ok_or(Error::MissingDisplacement { instr })
    }
}

/// Resolve a loop's pair of displacements
///
/// `open_end` and `close_end` are the offsets just past the loop-open's and
/// loop-close's displacement fields. The forward branch lands just past the
/// loop-close; the backward branch lands on the first body instruction.
fn patch_loop(buf: &mut CodeBuffer, open_end: usize, close_end: usize) -> Result<()> {
    let forward = i32::try_from(close_end - open_end)
        .map_err(|_| Error::CodeTooLarge { len: buf.len() })?;
    buf.patch_i32(open_end - DISPLACEMENT_LEN, forward);
    buf.patch_i32(close_end - DISPLACEMENT_LEN, -forward);
    Ok(())
}
