//! Host byte I/O
//!
//! Programs interact with the outside world only through two primitives:
//! write one byte and read one byte. [`ByteIo`] is the embedding's side of
//! that contract; the JIT binds an implementation to its native call
//! targets for the duration of one run (see `jit::host`).

use std::collections::VecDeque;
use std::io::{self, BufWriter, Read, Stdin, Stdout, Write};

/// Source and sink for program bytes
pub trait ByteIo {
    /// Write one byte produced by `.`
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Read one byte for `,`; `Ok(None)` signals end of input
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Flush buffered output; called once when a run finishes
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: ByteIo + ?Sized> ByteIo for &mut T {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Process stdin/stdout
///
/// Output is buffered and flushed before every read, so prompts appear
/// before the program blocks on input.
pub struct StdIo {
    out: BufWriter<Stdout>,
    input: Stdin,
}

impl StdIo {
    /// Create handles on the process streams
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: BufWriter::new(io::stdout()),
            input: io::stdin(),
        }
    }
}

impl Default for StdIo {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteIo for StdIo {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.out.write_all(&[byte])
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.out.flush()?;
        let mut buf = [0u8; 1];
        loop {
            match self.input.lock().read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// In-memory I/O that replays scripted input and records every output call
#[derive(Debug, Clone, Default)]
pub struct RecordingIo {
    input: VecDeque<u8>,

    /// Every byte passed to the output primitive, in call order
    pub output: Vec<u8>,

    /// Number of calls made to the input primitive
    pub reads: usize,
}

impl RecordingIo {
    /// Recorder with no input
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder that will hand out `input` one byte per read
    #[must_use]
    pub fn with_input(input: impl AsRef<[u8]>) -> Self {
        Self {
            input: input.as_ref().iter().copied().collect(),
            output: Vec::new(),
            reads: 0,
        }
    }

    /// Recorded output as (lossy) UTF-8
    #[must_use]
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl ByteIo for RecordingIo {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.reads += 1;
        Ok(self.input.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_io_replays_input_then_eof() {
        let mut io = RecordingIo::with_input("ab");
        assert_eq!(io.read_byte().unwrap(), Some(b'a'));
        assert_eq!(io.read_byte().unwrap(), Some(b'b'));
        assert_eq!(io.read_byte().unwrap(), None);
        assert_eq!(io.reads, 3);
    }

    #[test]
    fn recording_io_records_output() {
        let mut io = RecordingIo::new();
        io.write_byte(b'h').unwrap();
        io.write_byte(b'i').unwrap();
        assert_eq!(io.output, b"hi");
        assert_eq!(io.output_string(), "hi");
    }

    #[test]
    fn mutable_references_forward() {
        fn echo_once<I: ByteIo>(mut io: I) {
            let byte = io.read_byte().unwrap().unwrap();
            io.write_byte(byte + 1).unwrap();
        }

        let mut io = RecordingIo::with_input([7]);
        echo_once(&mut io);
        assert_eq!(io.output, vec![8]);
    }
}
