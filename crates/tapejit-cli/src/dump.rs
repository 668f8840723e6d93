//! Hex listing of generated machine code

use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Format `code` as offset-prefixed rows of 16 hex bytes
pub fn hex_dump(code: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in code.chunks(BYTES_PER_LINE).enumerate() {
        let _ = write!(out, "{:08x}:", row * BYTES_PER_LINE);
        for byte in chunk {
            let _ = write!(out, " {byte:02x}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn rows_wrap_at_sixteen_bytes() {
        let code: Vec<u8> = (0..18).collect();
        let dump = hex_dump(&code);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000: 00 01 02"));
        assert!(lines[0].ends_with(" 0f"));
        assert_eq!(lines[1], "00000010: 10 11");
    }
}
