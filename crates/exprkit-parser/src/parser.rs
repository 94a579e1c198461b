//! Expression parser.
//!
//! Consumes the lazy token stream from [`Scanner`] and builds an [`Expr`]
//! tree using recursive descent with precedence climbing:
//!
//! ```text
//! expression := binary(0)
//! binary(min) := atom (OP binary(prec(OP)))*      while prec(OP) > min
//! atom        := "(" expression ")" | LITERAL | IDENT [ "(" args ")" ]
//! args        := [ expression ("," expression)* [","] ]
//! ```
//!
//! Climbing starts from a floor of 0, so an operator configured with
//! precedence 0 is lexed but never binds.
//!
//! Both recursion and tree height are capped at [`MAX_DEPTH`]. Deeper input
//! fails with [`ParseError::TooDeep`] instead of exhausting the stack.

use exprkit_lexer::{Grammar, Scanner, Span, Token, TokenKind};

use crate::ast::{Expr, ExprKind};
use crate::ParseError;

/// Maximum nesting of parentheses, calls and operator chains.
pub const MAX_DEPTH: usize = 128;

/// A parsed subtree and its height (a leaf is 1).
type Parsed = (Expr, usize);

/// exprkit expression parser.
pub struct Parser<'g> {
    scanner: Scanner<'g>,
    grammar: &'g Grammar,
    depth: usize,
}

impl<'g> Parser<'g> {
    /// Create a new parser for the given source.
    pub fn new(source: &str, grammar: &'g Grammar) -> Self {
        Self {
            scanner: Scanner::new(source, grammar),
            grammar,
            depth: 0,
        }
    }

    /// Parse source code into an expression tree.
    pub fn parse_source(source: &str, grammar: &Grammar) -> Result<Expr, ParseError> {
        Parser::new(source, grammar).parse()
    }

    /// Parse the whole token stream as one expression.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let (expr, _) = self.parse_expression(0)?;

        if let Some(token) = self.scanner.next()? {
            return Err(ParseError::TrailingInput {
                found: token.to_string(),
                span: token.span,
            });
        }

        Ok(expr)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Precedence climbing. Only operators binding tighter than `min` are
    /// folded in here; the loop keeps `min` so equal-precedence operators
    /// associate to the left.
    fn parse_expression(&mut self, min: u32) -> Result<Parsed, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = self.parse_binary(min);
        self.depth -= 1;
        result
    }

    fn parse_binary(&mut self, min: u32) -> Result<Parsed, ParseError> {
        let (mut left, mut height) = self.parse_atom()?;

        while let Some(prec) = self.peek_operator_precedence()? {
            if prec <= min {
                break;
            }
            let op = self.advance()?;
            let (right, right_height) = self.parse_expression(prec)?;
            let span = left.span.to(right.span);
            height = check_height(height.max(right_height) + 1, span)?;
            left = Expr::new(
                ExprKind::Binary {
                    op: op.text,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok((left, height))
    }

    fn parse_atom(&mut self) -> Result<Parsed, ParseError> {
        let token = self.advance()?;

        match token.kind {
            TokenKind::Punctuation if token.text == "(" => {
                let (inner, height) = self.parse_expression(0)?;
                let close = self.expect_punctuation(")")?;
                Ok((inner.with_span(token.span.to(close.span)), height))
            }
            TokenKind::Literal => Ok((Expr::new(ExprKind::Literal(token.text), token.span), 1)),
            TokenKind::Identifier => {
                if !self.next_is_punctuation("(")? {
                    let ident = Expr::new(ExprKind::Identifier(token.text), token.span);
                    return Ok((ident, 1));
                }
                if !self.grammar.allows_calls() {
                    let paren = self.advance()?;
                    return Err(ParseError::UnexpectedToken {
                        expected: "an operator (calls are disabled)".into(),
                        found: paren.to_string(),
                        span: paren.span,
                    });
                }
                self.parse_call(token)
            }
            TokenKind::Punctuation | TokenKind::Operator => Err(ParseError::UnexpectedToken {
                expected: "an expression".into(),
                found: token.to_string(),
                span: token.span,
            }),
        }
    }

    /// Parse `callee(arg, ...)`. The node spans from the callee to the `)`.
    fn parse_call(&mut self, callee: Token) -> Result<Parsed, ParseError> {
        self.expect_punctuation("(")?;
        let (arguments, close, args_height) = self.parse_delimited(")", ",")?;
        let span = callee.span.to(close.span);
        let height = check_height(args_height + 1, span)?;

        Ok((
            Expr::new(
                ExprKind::Call {
                    callee: callee.text,
                    arguments,
                },
                span,
            ),
            height,
        ))
    }

    /// Parse a `sep`-separated list up to and including `stop`. Also returns
    /// the tallest item's height.
    ///
    /// Zero items are fine when `stop` comes first. A `sep` directly before
    /// `stop` is tolerated; this list form only backs call arguments.
    fn parse_delimited(
        &mut self,
        stop: &str,
        sep: &str,
    ) -> Result<(Vec<Expr>, Token, usize), ParseError> {
        let mut items = Vec::new();
        let mut height = 0;

        while !self.next_is_punctuation(stop)? {
            if !items.is_empty() {
                self.expect_punctuation(sep)?;
                if self.next_is_punctuation(stop)? {
                    break;
                }
            }
            let (item, item_height) = self.parse_expression(0)?;
            height = height.max(item_height);
            items.push(item);
        }

        let close = self.expect_punctuation(stop)?;
        Ok((items, close, height))
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn advance(&mut self) -> Result<Token, ParseError> {
        match self.scanner.next()? {
            Some(token) => Ok(token),
            None => Err(self.unexpected_end()),
        }
    }

    fn expect_punctuation(&mut self, punc: &str) -> Result<Token, ParseError> {
        let token = self.advance()?;
        if token.is_punctuation(punc) {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("'{punc}'"),
                found: token.to_string(),
                span: token.span,
            })
        }
    }

    fn next_is_punctuation(&mut self, punc: &str) -> Result<bool, ParseError> {
        Ok(self.scanner.peek()?.is_some_and(|t| t.is_punctuation(punc)))
    }

    /// Precedence of the next token if it is an operator.
    fn peek_operator_precedence(&mut self) -> Result<Option<u32>, ParseError> {
        match self.scanner.peek()? {
            Some(token) if token.kind == TokenKind::Operator => {
                Ok(Some(self.grammar.precedence(&token.text)?))
            }
            _ => Ok(None),
        }
    }

    fn unexpected_end(&self) -> ParseError {
        ParseError::UnexpectedEnd {
            span: self.last_span(),
        }
    }

    fn too_deep(&self) -> ParseError {
        ParseError::TooDeep {
            span: self.last_span(),
        }
    }

    /// Span of the last consumed token, or the cursor position if none was.
    fn last_span(&self) -> Span {
        match self.scanner.last() {
            Some(token) => token.span,
            None => Span::point(self.scanner.pos()),
        }
    }
}

fn check_height(height: usize, span: Span) -> Result<usize, ParseError> {
    if height > MAX_DEPTH {
        return Err(ParseError::TooDeep { span });
    }
    Ok(height)
}
