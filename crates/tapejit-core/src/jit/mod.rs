//! Native code translation and execution
//!
//! Source text is translated straight into x86-64 machine code, one fixed
//! template per instruction, and run in-process:
//!
//! ```text
//! source → Translator → CodeBuffer → MachineCode → Executor → ExecutableRegion
//!                ↑                                       ↕
//!           LoopMarkers                       Tape + host primitives
//! ```
//!
//! # Calling Convention
//!
//! A generated routine is `extern "C" fn(write, read, tape)`. The two
//! primitives and the tape cursor are kept in callee-saved registers for
//! the whole routine; see [`X86_64`] for the assignment.
//!
//! # Safety
//!
//! All raw executable memory handling lives in `memory`, and the only
//! call into generated code is in [`Executor`]. The tape cursor is not
//! bounds-checked: a program that walks off the tape is undefined behavior.

mod buffer;
mod exec;
mod host;
mod markers;
mod memory;
mod select;
mod translate;

pub use buffer::CodeBuffer;
pub use exec::{native_supported, Executor};
pub use host::{with_bound_io, HostPrimitives, ReadFn, WriteFn};
pub use markers::{LoopMarkers, Marker};
pub use memory::ExecutableRegion;
pub use select::{InstructionSelector, Template, DISPLACEMENT_LEN, X86_64};
pub use translate::{MachineCode, Translator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jit_module_loads() {
        let code = Translator::new().translate("+").unwrap();
        assert!(!code.is_empty());
    }
}
