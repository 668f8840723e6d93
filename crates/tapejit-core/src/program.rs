//! Source model - the eight instruction symbols and their positions
//!
//! Any character that is not one of the eight symbols is a comment.

use std::fmt;

/// One recognized instruction symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `>` - advance the cursor one cell
    MoveRight,
    /// `<` - retreat the cursor one cell
    MoveLeft,
    /// `+` - add one to the current cell (mod 256)
    Increment,
    /// `-` - subtract one from the current cell (mod 256)
    Decrement,
    /// `.` - write the current cell through the output primitive
    Output,
    /// `,` - store the low 8 bits of the input primitive's result
    Input,
    /// `[` - skip past the matching `]` when the current cell is zero
    LoopOpen,
    /// `]` - jump back past the matching `[` when the current cell is nonzero
    LoopClose,
}

impl Instruction {
    /// All instructions, in symbol-table order
    pub const ALL: [Instruction; 8] = [
        Instruction::MoveRight,
        Instruction::MoveLeft,
        Instruction::Increment,
        Instruction::Decrement,
        Instruction::Output,
        Instruction::Input,
        Instruction::LoopOpen,
        Instruction::LoopClose,
    ];

    /// Decode a source character, returning `None` for comments
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Instruction::MoveRight),
            '<' => Some(Instruction::MoveLeft),
            '+' => Some(Instruction::Increment),
            '-' => Some(Instruction::Decrement),
            '.' => Some(Instruction::Output),
            ',' => Some(Instruction::Input),
            '[' => Some(Instruction::LoopOpen),
            ']' => Some(Instruction::LoopClose),
            _ => None,
        }
    }

    /// The source symbol for this instruction
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Instruction::MoveRight => '>',
            Instruction::MoveLeft => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopOpen => '[',
            Instruction::LoopClose => ']',
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Location of an instruction in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    /// Zero-based instruction index, comments excluded
    pub index: usize,

    /// Byte offset into the source
    pub offset: usize,

    /// One-based line number
    pub line: u32,

    /// One-based column, counted in characters
    pub column: u32,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} (instruction {})",
            self.line, self.column, self.index
        )
    }
}

/// Iterator over the instructions of a source string
///
/// Yields each instruction together with its position; comments are
/// skipped but still advance line and column tracking.
#[derive(Debug, Clone)]
pub struct Instructions<'src> {
    chars: std::str::CharIndices<'src>,
    index: usize,
    line: u32,
    column: u32,
}

impl<'src> Instructions<'src> {
    /// Start scanning `source` from the beginning
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            chars: source.char_indices(),
            index: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Iterator for Instructions<'_> {
    type Item = (SourcePos, Instruction);

    fn next(&mut self) -> Option<Self::Item> {
        for (offset, c) in self.chars.by_ref() {
            let (line, column) = (self.line, self.column);
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }

            if let Some(instr) = Instruction::from_char(c) {
                let pos = SourcePos {
                    index: self.index,
                    offset,
                    line,
                    column,
                };
                self.index += 1;
                return Some((pos, instr));
            }
        }
        None
    }
}

/// Scan `source` into its instruction sequence
pub fn instructions(source: &str) -> Instructions<'_> {
    Instructions::new(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip_through_from_char() {
        for instr in Instruction::ALL {
            assert_eq!(Instruction::from_char(instr.symbol()), Some(instr));
        }
    }

    #[test]
    fn comments_are_skipped() {
        let kinds: Vec<_> = instructions("a+b-c hello.").map(|(_, i)| i).collect();
        assert_eq!(
            kinds,
            vec![
                Instruction::Increment,
                Instruction::Decrement,
                Instruction::Output
            ]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let found: Vec<_> = instructions("x+\n  [\n]").collect();
        assert_eq!(found.len(), 3);

        let (plus, _) = found[0];
        assert_eq!((plus.index, plus.offset, plus.line, plus.column), (0, 1, 1, 2));

        let (open, _) = found[1];
        assert_eq!((open.index, open.offset, open.line, open.column), (1, 5, 2, 3));

        let (close, _) = found[2];
        assert_eq!((close.index, close.line, close.column), (2, 3, 1));
    }

    #[test]
    fn multibyte_comments_count_as_one_column() {
        let (pos, instr) = instructions("é+").next().unwrap();
        assert_eq!(instr, Instruction::Increment);
        assert_eq!(pos.offset, 2);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn empty_source_has_no_instructions() {
        assert_eq!(instructions("no code here").count(), 0);
    }
}
