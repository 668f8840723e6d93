//! Instruction selection - source instruction to machine code template
//!
//! The translator's control logic never looks at target bytes; it asks an
//! [`InstructionSelector`] to emit each instruction and gets back the
//! location of any displacement field it has to patch.

use super::buffer::CodeBuffer;
use crate::program::Instruction;

/// Size of a branch displacement field in bytes
pub const DISPLACEMENT_LEN: usize = 4;

/// A machine code template for one source instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Fixed instruction bytes
    pub bytes: &'static [u8],

    /// Whether a 4-byte little-endian signed displacement follows `bytes`
    ///
    /// The displacement is relative to the end of the field, which is also
    /// the end of the instruction.
    pub displacement: bool,
}

/// Maps source instructions to target machine code
///
/// Implementations define the routine's calling convention in
/// [`prologue`](Self::prologue): the generated code must accept
/// `(output primitive, input primitive, tape base)` and keep all three
/// live for its whole body.
pub trait InstructionSelector {
    /// Short target name, for diagnostics
    fn name(&self) -> &'static str;

    /// Routine entry: save callee-saved state and load the reserved registers
    fn prologue(&self) -> &'static [u8];

    /// Routine exit: restore saved state and return
    fn epilogue(&self) -> &'static [u8];

    /// Template for one instruction
    fn template(&self, instr: Instruction) -> Template;

    /// Emit `instr` into `buf`
    ///
    /// Returns the offset just past the displacement placeholder for
    /// instructions that carry one.
    fn emit(&self, instr: Instruction, buf: &mut CodeBuffer) -> Option<usize> {
        let template = self.template(instr);
        buf.write_bytes(template.bytes);
        template.displacement.then(|| buf.emit_placeholder())
    }
}

/// x86-64 System V selector
///
/// Register assignment for the generated routine:
/// - `rbx`: tape cursor, initialized from the third argument (`rdx`)
/// - `r12`: output primitive, from the first argument (`rdi`)
/// - `r13`: input primitive, from the second argument (`rsi`)
///
/// All three are callee-saved, so they survive the calls into the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct X86_64;

impl X86_64 {
    const PROLOGUE: &'static [u8] = &[
        0x55, //                      push rbp
        0x48, 0x89, 0xE5, //          mov rbp, rsp
        0x41, 0x54, //                push r12
        0x49, 0x89, 0xFC, //          mov r12, rdi
        0x41, 0x55, //                push r13
        0x49, 0x89, 0xF5, //          mov r13, rsi
        0x53, //                      push rbx
        0x48, 0x89, 0xD3, //          mov rbx, rdx
        0x48, 0x83, 0xEC, 0x08, //    sub rsp, 8 (keep calls 16-byte aligned)
    ];

    const EPILOGUE: &'static [u8] = &[
        0x48, 0x83, 0xC4, 0x08, //    add rsp, 8
        0x5B, //                      pop rbx
        0x41, 0x5D, //                pop r13
        0x41, 0x5C, //                pop r12
        0x5D, //                      pop rbp
        0xC3, //                      ret
    ];
}

impl InstructionSelector for X86_64 {
    fn name(&self) -> &'static str {
        "x86_64"
    }

    fn prologue(&self) -> &'static [u8] {
        Self::PROLOGUE
    }

    fn epilogue(&self) -> &'static [u8] {
        Self::EPILOGUE
    }

    fn template(&self, instr: Instruction) -> Template {
        let (bytes, displacement): (&'static [u8], bool) = match instr {
            // inc rbx
            Instruction::MoveRight => (&[0x48, 0xFF, 0xC3], false),
            // dec rbx
            Instruction::MoveLeft => (&[0x48, 0xFF, 0xCB], false),
            // inc byte [rbx]
            Instruction::Increment => (&[0xFE, 0x03], false),
            // dec byte [rbx]
            Instruction::Decrement => (&[0xFE, 0x0B], false),
            // movzx rdi, byte [rbx]; call r12
            Instruction::Output => (&[0x48, 0x0F, 0xB6, 0x3B, 0x41, 0xFF, 0xD4], false),
            // call r13; mov [rbx], al
            Instruction::Input => (&[0x41, 0xFF, 0xD5, 0x88, 0x03], false),
            // cmp byte [rbx], 0; je rel32
            Instruction::LoopOpen => (&[0x80, 0x3B, 0x00, 0x0F, 0x84], true),
            // cmp byte [rbx], 0; jne rel32
            Instruction::LoopClose => (&[0x80, 0x3B, 0x00, 0x0F, 0x85], true),
        };
        Template {
            bytes,
            displacement,
        }
    }
}
