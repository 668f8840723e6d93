//! Reference interpreter
//!
//! Executes the same instruction sequence as the JIT over an idealized
//! tape that grows to the right on demand. It checks what compiled code
//! does not: moving left of the first cell is an error, and an optional
//! step bound stops runaway programs. Used as the oracle for the JIT and
//! as the fallback backend where native execution is unavailable.

use tracing::debug;

use crate::config::{Config, DEFAULT_EOF_BYTE, DEFAULT_TAPE_SIZE};
use crate::error::{Error, Result};
use crate::io::ByteIo;
use crate::jit::LoopMarkers;
use crate::program::{instructions, Instruction, SourcePos};
use crate::tape::zeroed_cells;

/// A decoded operation with its loop target resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Right,
    Left,
    Inc,
    Dec,
    Out,
    In,
    /// Jump to the op after the matching `]` when the cell is zero
    JumpIfZero(usize),
    /// Jump to the op after the matching `[` when the cell is nonzero
    JumpIfNonZero(usize),
}

/// A bracket-checked program ready to interpret
#[derive(Debug, Clone)]
pub struct Program {
    ops: Vec<Op>,
    positions: Vec<SourcePos>,
}

impl Program {
    /// Decode `source`, matching every loop
    ///
    /// Reports the same structural errors, at the same positions, as
    /// [`crate::jit::Translator::translate`].
    pub fn parse(source: &str) -> Result<Self> {
        let mut ops = Vec::new();
        let mut positions = Vec::new();
        let mut markers = LoopMarkers::new();

        for (pos, instr) in instructions(source) {
            let op = match instr {
                Instruction::MoveRight => Op::Right,
                Instruction::MoveLeft => Op::Left,
                Instruction::Increment => Op::Inc,
                Instruction::Decrement => Op::Dec,
                Instruction::Output => Op::Out,
                Instruction::Input => Op::In,
                Instruction::LoopOpen => {
                    markers.push(ops.len(), pos);
                    Op::JumpIfZero(usize::MAX)
                }
                Instruction::LoopClose => {
                    let open = markers.pop(pos)?.target;
                    let close = ops.len();
                    ops[open] = Op::JumpIfZero(close + 1);
                    Op::JumpIfNonZero(open + 1)
                }
            };
            ops.push(op);
            positions.push(pos);
        }

        markers.finish()?;
        Ok(Self { ops, positions })
    }

    /// Number of instructions
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true for a program with no instructions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Final machine state of an interpreted run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Tape contents, including any cells grown past the initial size
    pub tape: Vec<u8>,
    /// Cursor position when the program finished
    pub cursor: usize,
    /// Instructions executed
    pub steps: u64,
}

/// Interpreter settings
#[derive(Debug, Clone)]
pub struct Interpreter {
    initial_tape: usize,
    eof_byte: u8,
    max_steps: Option<u64>,
}

impl Interpreter {
    /// Interpreter using the tape size and EOF byte from `config`
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            initial_tape: config.tape_size,
            eof_byte: config.eof_byte,
            max_steps: None,
        }
    }

    /// Stop with [`Error::StepLimitExceeded`] after `limit` instructions
    #[must_use]
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.max_steps = Some(limit);
        self
    }

    /// Parse and run `source`
    pub fn run_source(&self, source: &str, io: &mut dyn ByteIo) -> Result<Outcome> {
        let program = Program::parse(source)?;
        self.run(&program, io)
    }

    /// Run a parsed program
    pub fn run(&self, program: &Program, io: &mut dyn ByteIo) -> Result<Outcome> {
        let mut tape = zeroed_cells(self.initial_tape.max(1))?;
        let mut cursor = 0usize;
        let mut pc = 0usize;
        let mut steps = 0u64;

        while let Some(&op) = program.ops.get(pc) {
            if let Some(limit) = self.max_steps {
                if steps >= limit {
                    return Err(Error::StepLimitExceeded { limit });
                }
            }
            steps += 1;
            pc += 1;

            match op {
                Op::Right => {
                    cursor += 1;
                    if cursor == tape.len() {
                        tape.push(0);
                    }
                }
                Op::Left => {
                    cursor = cursor.checked_sub(1).ok_or(Error::TapeUnderflow {
                        pos: program.positions[pc - 1],
                    })?;
                }
                Op::Inc => tape[cursor] = tape[cursor].wrapping_add(1),
                Op::Dec => tape[cursor] = tape[cursor].wrapping_sub(1),
                Op::Out => io.write_byte(tape[cursor]).map_err(Error::HostIo)?,
                Op::In => {
                    tape[cursor] = io
                        .read_byte()
                        .map_err(Error::HostIo)?
                        .unwrap_or(self.eof_byte);
                }
                Op::JumpIfZero(target) => {
                    if tape[cursor] == 0 {
                        pc = target;
                    }
                }
                Op::JumpIfNonZero(target) => {
                    if tape[cursor] != 0 {
                        pc = target;
                    }
                }
            }
        }

        io.flush().map_err(Error::HostIo)?;
        debug!(steps, tape_len = tape.len(), "interpreted program");
        Ok(Outcome {
            tape,
            cursor,
            steps,
        })
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self {
            initial_tape: DEFAULT_TAPE_SIZE,
            eof_byte: DEFAULT_EOF_BYTE,
            max_steps: None,
        }
    }
}
