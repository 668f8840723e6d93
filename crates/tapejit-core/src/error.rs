//! Error types for translation and execution

use std::io;

use thiserror::Error;

use crate::program::{Instruction, SourcePos};

/// Errors that can occur while translating or running a program
///
/// Out-of-range tape access and malformed generated code in the JIT backend
/// are not represented here: they are undefined behavior, and keeping the
/// cursor inside the tape is a precondition on the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// A `]` with no pending `[`
    #[error("unmatched ']' at {pos}")]
    UnbalancedLoopClose { pos: SourcePos },

    /// Input ended while loops were still open
    #[error("unterminated loop: '[' at {pos} is never closed ({open} open in total)")]
    UnterminatedLoop {
        /// Position of the innermost unmatched `[`
        pos: SourcePos,
        /// Number of loops still open at end of input
        open: usize,
    },

    /// Executable region or tape allocation failed
    #[error("failed to acquire {what}: {source}")]
    MemoryAcquisition {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    /// A loop spans more bytes than a 32-bit displacement can reach
    #[error("generated code too large for 32-bit branch displacements ({len} bytes)")]
    CodeTooLarge { len: usize },

    /// An instruction selector gave a loop instruction no displacement field
    #[error("selector emitted '{instr}' without a branch displacement")]
    MissingDisplacement { instr: Instruction },

    /// The native backend cannot run on this host
    #[error("native code execution is not supported on this target (requires x86_64 unix)")]
    UnsupportedTarget,

    /// A host byte primitive failed during execution
    #[error("host I/O failed: {0}")]
    HostIo(#[source] io::Error),

    /// Reference interpreter moved the cursor left of cell 0
    #[error("cursor moved left of the first cell at {pos}")]
    TapeUnderflow { pos: SourcePos },

    /// Reference interpreter exceeded its step bound
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },

    /// Rejected configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns true for the structural errors detected before any code runs
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::UnbalancedLoopClose { .. }
                | Error::UnterminatedLoop { .. }
                | Error::CodeTooLarge { .. }
                | Error::MissingDisplacement { .. }
        )
    }
}

/// Result type for tapejit operations
pub type Result<T> = std::result::Result<T, Error>;
