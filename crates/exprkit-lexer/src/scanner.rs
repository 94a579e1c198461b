use crate::cursor::Cursor;
use crate::grammar::{Grammar, LiteralKind};
use crate::token::{Position, Span, Token, TokenKind};
use crate::LexerError;

/// Grammar-driven expression scanner.
///
/// Produces tokens lazily from a [`Cursor`]. The scanner keeps an explicit
/// two-slot cache: `peeked` holds the memoized lookahead token and `last`
/// holds the most recently consumed one, which the parser uses to locate
/// "unexpected end of input" errors.
///
/// Classification order after whitespace and `#` comments:
/// string, number, operator, identifier (or keyword operator), punctuation.
pub struct Scanner<'g> {
    cursor: Cursor,
    grammar: &'g Grammar,
    peeked: Option<Token>,
    last: Option<Token>,
}

impl<'g> Scanner<'g> {
    /// Create a new scanner for the given source.
    pub fn new(source: &str, grammar: &'g Grammar) -> Self {
        Self {
            cursor: Cursor::new(source),
            grammar,
            peeked: None,
            last: None,
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str, grammar: &Grammar) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source, grammar);
        let mut tokens = Vec::new();
        while let Some(token) = scanner.next()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// The next token, without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Token>, LexerError> {
        if self.peeked.is_none() {
            self.peeked = self.read_next()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume the next token.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Token>, LexerError> {
        let token = match self.peeked.take() {
            Some(token) => Some(token),
            None => self.read_next()?,
        };
        if let Some(token) = &token {
            self.last = Some(token.clone());
        }
        Ok(token)
    }

    /// Whether the token stream is exhausted.
    pub fn eof(&mut self) -> Result<bool, LexerError> {
        Ok(self.peek()?.is_none())
    }

    /// The most recently consumed token.
    pub fn last(&self) -> Option<&Token> {
        self.last.as_ref()
    }

    /// Position of the underlying cursor. Past any peeked token.
    pub fn pos(&self) -> Position {
        self.cursor.pos()
    }

    // --- Classification ---

    fn read_next(&mut self) -> Result<Option<Token>, LexerError> {
        let ch = loop {
            self.skip_while(char::is_whitespace);
            match self.cursor.peek() {
                None => return Ok(None),
                Some('#') => self.skip_while(|c| c != '\n'),
                Some(ch) => break ch,
            }
        };

        let number_start =
            self.grammar.allows_literal(LiteralKind::Number) && self.starts_number(ch)?;
        let single_char_operator =
            is_operator_char(ch) && self.grammar.is_operator(&ch.to_string());

        let token = match ch {
            '"' if self.grammar.allows_literal(LiteralKind::String) => self.read_string()?,
            _ if number_start => self.read_number()?,
            _ if single_char_operator => self.read_operator(ch),
            c if c.is_alphabetic() || c == '_' => self.read_identifier(),
            '(' | ')' | ',' => {
                let pos = self.advance();
                Token::new(TokenKind::Punctuation, ch, Span::point(pos))
            }
            c => {
                return Err(LexerError::UnexpectedCharacter {
                    ch: c,
                    pos: self.cursor.pos(),
                })
            }
        };
        Ok(Some(token))
    }

    /// A digit, or a `.` immediately followed by a digit.
    fn starts_number(&mut self, ch: char) -> Result<bool, LexerError> {
        if ch.is_ascii_digit() {
            return Ok(true);
        }
        if ch != '.' {
            return Ok(false);
        }
        self.cursor.next();
        let digit_follows = self.cursor.peek().is_some_and(|c| c.is_ascii_digit());
        self.cursor.back()?;
        Ok(digit_follows)
    }

    // --- Scanners ---

    /// Scan a string literal verbatim, quotes included. No escapes.
    fn read_string(&mut self) -> Result<Token, LexerError> {
        let start = self.advance(); // consume opening quote
        let mut text = String::from('"');

        let end = loop {
            match self.cursor.peek() {
                None => return Err(LexerError::UnterminatedString { pos: start }),
                Some('\n') => {
                    return Err(LexerError::UnexpectedNewline {
                        pos: self.cursor.pos(),
                    })
                }
                Some('"') => {
                    text.push('"');
                    break self.advance();
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        };

        Ok(Token::new(TokenKind::Literal, text, Span::new(start, end)))
    }

    /// Scan digits with at most one `.`. A second `.` is left for the next token.
    fn read_number(&mut self) -> Result<Token, LexerError> {
        let start = self.cursor.pos();
        let mut end = start;
        let mut text = String::new();
        let mut seen_dot = false;

        while let Some(c) = self.cursor.peek() {
            if c == '.' && !seen_dot {
                seen_dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            end = self.advance();
        }

        let span = Span::new(start, end);
        if text.parse::<f64>().is_err() {
            return Err(LexerError::InvalidNumber { text, span });
        }
        Ok(Token::new(TokenKind::Literal, text, span))
    }

    /// Scan an operator, extending only while the longer text is itself a
    /// configured token.
    fn read_operator(&mut self, first: char) -> Token {
        let start = self.advance();
        let mut end = start;
        let mut text = String::from(first);

        while let Some(c) = self.cursor.peek() {
            let mut candidate = text.clone();
            candidate.push(c);
            if !self.grammar.is_operator(&candidate) {
                break;
            }
            text = candidate;
            end = self.advance();
        }

        Token::new(TokenKind::Operator, text, Span::new(start, end))
    }

    /// Scan an identifier. Identifiers that match a configured operator
    /// (`AND`, `IS`, ...) become operator tokens.
    fn read_identifier(&mut self) -> Token {
        let start = self.cursor.pos();
        let mut end = start;
        let mut text = String::new();

        while let Some(c) = self.cursor.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            text.push(c);
            end = self.advance();
        }

        let kind = if self.grammar.is_operator(&text) {
            TokenKind::Operator
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, text, Span::new(start, end))
    }

    // --- Helpers ---

    /// Consume one character and return the position it occupied.
    fn advance(&mut self) -> Position {
        let pos = self.cursor.pos();
        self.cursor.next();
        pos
    }

    fn skip_while(&mut self, test: impl Fn(char) -> bool) {
        while self.cursor.peek().is_some_and(&test) {
            self.cursor.next();
        }
    }
}

/// Characters that may start a symbolic operator.
fn is_operator_char(c: char) -> bool {
    c.is_ascii_punctuation() && !matches!(c, '(' | ')' | ',' | '"' | '#' | '_')
}
