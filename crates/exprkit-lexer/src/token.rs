use std::fmt;

/// A 1-indexed line/column location in source text.
///
/// Ordered by line first, then column, so a forward scan never produces a
/// position smaller than an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The source range a token or expression node derives from.
///
/// Both ends are inclusive: `end` is the position of the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A span covering a single character.
    pub fn point(pos: Position) -> Self {
        Self::new(pos, pos)
    }

    /// The smallest span containing both `self` and `other`.
    pub fn to(self, other: Span) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Whether `pos` lies inside this span.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Token classification.
///
/// Literal tokens keep their raw text; whether that text is a number or a
/// string is decided when the expression is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `(`, `)` and `,`
    Punctuation,
    /// Numeric or quoted string literal
    Literal,
    Identifier,
    /// A configured operator token, symbolic or keyword-style
    Operator,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Punctuation => "punctuation",
            TokenKind::Literal => "literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Operator => "operator",
        };
        f.write_str(name)
    }
}

/// A token produced by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Check if this is the punctuation token `punc`.
    pub fn is_punctuation(&self, punc: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == punc
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.text)
    }
}
