//! Executable memory
//!
//! This is the only place that touches raw executable pages. A region is
//! mapped read/write, filled with the routine, then flipped to
//! read/execute; it is never writable and executable at the same time.
//! Dropping the region unmaps it.

use std::io;
use std::ptr::NonNull;

use tracing::trace;

use crate::error::{Error, Result};

/// An installed machine code routine
pub struct ExecutableRegion {
    ptr: NonNull<u8>,
    len: usize,
}

impl ExecutableRegion {
    /// Map a region of exactly `code.len()` bytes and install `code` in it
    pub fn install(code: &[u8]) -> Result<Self> {
        if code.is_empty() {
            return Err(acquire_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot map an empty routine",
            )));
        }

        let ptr = sys::map_writable(code.len()).map_err(acquire_error)?;
        // From here on `Drop` releases the mapping, including when the
        // protection change below fails.
        let region = Self {
            ptr,
            len: code.len(),
        };

        unsafe {
            std::ptr::copy_nonoverlapping(code.as_ptr(), region.ptr.as_ptr(), code.len());
        }
        sys::make_executable(region.ptr, region.len).map_err(acquire_error)?;

        trace!(len = region.len, "installed executable region");
        Ok(region)
    }

    /// Size of the region in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Never true for a successfully installed region
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start of the routine
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }
}

impl Drop for ExecutableRegion {
    fn drop(&mut self) {
        if let Err(e) = sys::unmap(self.ptr, self.len) {
            tracing::warn!(error = %e, "failed to release executable region");
        }
    }
}

impl std::fmt::Debug for ExecutableRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutableRegion")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

fn acquire_error(source: io::Error) -> Error {
    Error::MemoryAcquisition {
        what: "executable region",
        source,
    }
}

#[cfg(unix)]
mod sys {
    use std::io;
    use std::ptr::{self, NonNull};

    pub(super) fn map_writable(len: usize) -> io::Result<NonNull<u8>> {
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_ANON | libc::MAP_PRIVATE,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        NonNull::new(ptr.cast::<u8>()).ok_or_else(|| io::Error::other("mmap returned null"))
    }

    pub(super) fn make_executable(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
        let rc = unsafe { libc::mprotect(ptr.as_ptr().cast(), len, libc::PROT_READ | libc::PROT_EXEC) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub(super) fn unmap(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
        let rc = unsafe { libc::munmap(ptr.as_ptr().cast(), len) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod sys {
    use std::io;
    use std::ptr::NonNull;

    pub(super) fn map_writable(_len: usize) -> io::Result<NonNull<u8>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "executable memory allocation not implemented for this platform",
        ))
    }

    pub(super) fn make_executable(_ptr: NonNull<u8>, _len: usize) -> io::Result<()> {
        Ok(())
    }

    pub(super) fn unmap(_ptr: NonNull<u8>, _len: usize) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn region_holds_exact_copy() {
        let code = [0x90, 0x90, 0xC3];
        let region = ExecutableRegion::install(&code).unwrap();
        assert_eq!(region.len(), 3);
        let installed = unsafe { std::slice::from_raw_parts(region.as_ptr(), region.len()) };
        assert_eq!(installed, &code);
    }

    #[test]
    fn empty_code_is_rejected() {
        assert!(matches!(
            ExecutableRegion::install(&[]),
            Err(Error::MemoryAcquisition { .. })
        ));
    }

    #[test]
    fn many_regions_can_be_created_and_dropped() {
        for _ in 0..64 {
            let region = ExecutableRegion::install(&[0xC3; 4096]).unwrap();
            drop(region);
        }
    }
}
