use crate::token::Position;
use crate::LexerError;

/// Character-level reader with line/column tracking.
///
/// Keeps exactly one step of history so the scanner can look one character
/// past the current one (`.5` vs `.`) and undo the step.
pub struct Cursor {
    chars: Vec<char>,
    offset: usize,
    pos: Position,
    /// Offset and position before the most recent `next()`.
    previous: Option<(usize, Position)>,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            offset: 0,
            pos: Position::default(),
            previous: None,
        }
    }

    /// Consume and return the current character, `None` past the end.
    /// A `next()` at the end consumes nothing and leaves nothing to undo.
    pub fn next(&mut self) -> Option<char> {
        let Some(ch) = self.chars.get(self.offset).copied() else {
            self.previous = None;
            return None;
        };
        self.previous = Some((self.offset, self.pos));
        self.offset += 1;
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    /// The current character, without advancing.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    /// Undo the most recent `next()`. Only one level of history is kept.
    pub fn back(&mut self) -> Result<(), LexerError> {
        let (offset, pos) = self
            .previous
            .take()
            .ok_or(LexerError::BacktrackUnderflow { pos: self.pos })?;
        self.offset = offset;
        self.pos = pos;
        Ok(())
    }

    pub fn eof(&self) -> bool {
        self.offset >= self.chars.len()
    }

    /// Position of the current (not yet consumed) character.
    pub fn pos(&self) -> Position {
        self.pos
    }
}
