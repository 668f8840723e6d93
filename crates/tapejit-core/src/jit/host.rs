//! Host I/O primitives for compiled code
//!
//! Generated code calls two plain C-ABI functions. They have no context
//! argument, so the [`ByteIo`] they dispatch to is bound to the current
//! thread for the duration of one execution by [`with_bound_io`].

use std::cell::Cell;
use std::io;
use std::ptr;

use crate::error::{Error, Result};
use crate::io::ByteIo;

/// `write_byte(value)`: value arrives zero-extended in the first argument
pub type WriteFn = extern "C" fn(u32);

/// `read_byte() -> value`: only the low 8 bits of the result are stored
pub type ReadFn = extern "C" fn() -> u32;

/// The two primitives handed to a routine at entry
#[derive(Clone, Copy)]
pub struct HostPrimitives {
    pub write: WriteFn,
    pub read: ReadFn,
}

struct Binding<'a> {
    io: &'a mut dyn ByteIo,
    eof_byte: u8,
    /// First host error; once set, writes are dropped and reads yield EOF
    error: Option<io::Error>,
}

thread_local! {
    static ACTIVE: Cell<*mut ()> = const { Cell::new(ptr::null_mut()) };
}

/// Restores the previously bound I/O, also when `f` unwinds
struct Restore(*mut ());

impl Drop for Restore {
    fn drop(&mut self) {
        ACTIVE.with(|active| active.set(self.0));
    }
}

/// Bind `io` to the host primitives while `f` runs
///
/// A host error is latched during the run and reported once `f` returns;
/// output is flushed at the end of a successful run.
pub fn with_bound_io<R>(
    io: &mut dyn ByteIo,
    eof_byte: u8,
    f: impl FnOnce(HostPrimitives) -> R,
) -> Result<R> {
    let mut binding = Binding {
        io,
        eof_byte,
        error: None,
    };

    let result = {
        let this = ptr::addr_of_mut!(binding).cast::<()>();
        let _restore = Restore(ACTIVE.with(|active| active.replace(this)));
        f(HostPrimitives {
            write: host_write_byte,
            read: host_read_byte,
        })
    };

    if let Some(err) = binding.error {
        return Err(Error::HostIo(err));
    }
    binding.io.flush().map_err(Error::HostIo)?;
    Ok(result)
}

/// Run `f` on the bound I/O, holding it exclusively
///
/// The binding is detached while `f` runs, so a primitive called from
/// inside a [`ByteIo`] method finds nothing bound and does nothing.
fn with_active<R>(f: impl FnOnce(&mut Binding<'_>) -> R) -> Option<R> {
    let ptr = ACTIVE.with(|active| active.replace(ptr::null_mut()));
    if ptr.is_null() {
        return None;
    }
    let _restore = Restore(ptr);
    // SAFETY: non-null only inside `with_bound_io` on this thread, which
    // keeps the binding alive until the pointer is restored. Detaching it
    // above makes this the only reference until `_restore` drops.
    let binding = unsafe { &mut *ptr.cast::<Binding<'_>>() };
    Some(f(binding))
}

extern "C" fn host_write_byte(value: u32) {
    with_active(|binding| {
        if binding.error.is_some() {
            return;
        }
        if let Err(e) = binding.io.write_byte(value as u8) {
            binding.error = Some(e);
        }
    });
}

extern "C" fn host_read_byte() -> u32 {
    with_active(|binding| {
        if binding.error.is_some() {
            return binding.eof_byte;
        }
        match binding.io.read_byte() {
            Ok(Some(byte)) => byte,
            Ok(None) => binding.eof_byte,
            Err(e) => {
                binding.error = Some(e);
                binding.eof_byte
            }
        }
    })
    .map_or(0, u32::from)
}
