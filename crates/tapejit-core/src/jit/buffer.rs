//! Code buffer - the append-only byte sequence of emitted machine code

/// Emitted native instructions
///
/// Bytes are only ever appended, except for 4-byte displacement fields
/// which are emitted as zero placeholders and patched once the branch
/// target is known.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    code: Vec<u8>,
}

impl CodeBuffer {
    /// Create a new empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self { code: Vec::new() }
    }

    /// Create a buffer with room for `capacity` bytes
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes in the buffer
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if nothing has been emitted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Returns the raw bytes
    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Get the current offset (for branch targets)
    #[must_use]
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Append a single byte
    pub fn write_byte(&mut self, byte: u8) {
        self.code.push(byte);
    }

    /// Append an instruction template verbatim
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.code.extend_from_slice(bytes);
    }

    /// Append an i32 value (little-endian)
    pub fn write_i32(&mut self, value: i32) {
        self.code.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a zeroed 4-byte displacement field and return the offset just past it
    pub fn emit_placeholder(&mut self) -> usize {
        self.write_i32(0);
        self.code.len()
    }

    /// Read an i32 at a position (little-endian)
    #[must_use]
    pub fn read_i32(&self, offset: usize) -> Option<i32> {
        let bytes = self.code.get(offset..offset.checked_add(4)?)?;
        Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Overwrite the i32 at `offset` (little-endian)
    ///
    /// # Panics
    /// Panics if the field does not lie entirely within emitted code.
    pub fn patch_i32(&mut self, offset: usize, value: i32) {
        self.code[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Consume the buffer, returning its bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.code
    }
}

impl std::fmt::Debug for CodeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeBuffer")
            .field("len", &self.code.len())
            .finish()
    }
}
