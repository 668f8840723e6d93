//! tapejit Core - translator and runtime for the eight-symbol tape language
//!
//! This crate provides:
//! - Program: instruction symbols and source positions
//! - JIT: translation to x86-64 machine code and in-process execution
//! - Interpreter: reference execution over an unbounded tape
//! - Config: tape size, end-of-input byte and backend selection
//! - I/O: the byte primitives programs read and write through

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Instruction model and source scanning
pub mod program;

/// Error taxonomy
pub mod error;

/// Runtime configuration
pub mod config;

/// Host byte I/O
pub mod io;

/// Fixed-size program tape
pub mod tape;

/// Native translation and execution
/// The JIT requires unsafe code for executable memory and function pointers
#[allow(unsafe_code, clippy::missing_safety_doc)]
pub mod jit;

/// Reference interpreter
pub mod interp;

pub use config::{Backend, Config, ConfigError};
pub use error::{Error, Result};
pub use interp::Interpreter;
pub use io::{ByteIo, RecordingIo, StdIo};
pub use jit::{Executor, MachineCode, Translator};
pub use program::{Instruction, SourcePos};
pub use tape::Tape;

use tracing::warn;

/// Translate `source` to native machine code without running it
pub fn translate(source: &str) -> Result<MachineCode> {
    Translator::new().translate(source)
}

/// Translate and execute `source` with the backend chosen in `config`
///
/// Bracket errors are reported before anything runs. When the JIT backend
/// is requested on a host that cannot run x86-64 code, the reference
/// interpreter is used instead.
pub fn run_source(source: &str, config: &Config, io: &mut dyn ByteIo) -> Result<()> {
    config
        .validate()
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;

    match config.backend {
        Backend::Jit if jit::native_supported() => {
            let code = translate(source)?;
            Executor::new(config).execute(&code, io)
        }
        Backend::Jit => {
            warn!("native execution unavailable on this target, falling back to the interpreter");
            Interpreter::new(config).run_source(source, io).map(drop)
        }
        Backend::Interpreter => Interpreter::new(config).run_source(source, io).map(drop),
    }
}
