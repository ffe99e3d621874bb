//! Read-only cursor over a borrowed token slice
//!
//! Shared by the parser and the semantic walker. The cursor never mutates
//! tokens; it only tracks the index of the next unconsumed one.

use crate::tokens::token::{Token, TokenKind};
use crate::utils::Span;

#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Token at the cursor, `None` at end of input
    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|token| token.kind)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.position + n)
    }

    pub fn peek_kind(&self, n: usize) -> Option<TokenKind> {
        self.peek_ahead(n).map(|token| token.kind)
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// Consume and return the current token
    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.current()?;
        self.position += 1;
        Some(token)
    }

    /// Consume the current token only if it has the expected kind
    pub fn advance_if(&mut self, kind: TokenKind) -> Option<&'a Token> {
        if self.check(kind) {
            self.advance()
        } else {
            None
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Index of the next unconsumed token
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn remaining_count(&self) -> usize {
        self.tokens.len().saturating_sub(self.position)
    }

    /// Line of the current token, or of the last token at end of input
    pub fn current_line(&self) -> u32 {
        self.current()
            .or_else(|| self.tokens.last())
            .map(|token| token.line)
            .unwrap_or(1)
    }

    /// Span of the current token, or a point after the last token
    pub fn current_span(&self) -> Span {
        match self.current() {
            Some(token) => token.span,
            None => self
                .tokens
                .last()
                .map(|token| Span::point(token.span.end))
                .unwrap_or_else(Span::dummy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<Token> {
        vec![
            Token::synthetic(TokenKind::Definir, "El", 1),
            Token::synthetic(TokenKind::Id, "x", 1),
            Token::synthetic(TokenKind::Int, "Puntual", 2),
        ]
    }

    #[test]
    fn test_navigation() {
        let tokens = tokens();
        let mut cursor = TokenCursor::new(&tokens);

        assert!(cursor.check(TokenKind::Definir));
        assert_eq!(cursor.peek_kind(2), Some(TokenKind::Int));
        assert!(cursor.advance_if(TokenKind::Id).is_none());
        assert_eq!(cursor.position(), 0);

        cursor.advance();
        assert_eq!(cursor.advance_if(TokenKind::Id).map(|t| t.lexeme.as_str()), Some("x"));
        assert_eq!(cursor.remaining_count(), 1);
        assert_eq!(cursor.current_line(), 2);
    }

    #[test]
    fn test_end_of_input() {
        let tokens = tokens();
        let mut cursor = TokenCursor::new(&tokens);
        while cursor.advance().is_some() {}

        assert!(cursor.is_at_end());
        assert_eq!(cursor.current_kind(), None);
        assert_eq!(cursor.current_line(), 2);
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_empty_cursor() {
        let cursor = TokenCursor::new(&[]);
        assert!(cursor.is_empty());
        assert_eq!(cursor.current_line(), 1);
        assert_eq!(cursor.current_span(), Span::dummy());
    }
}
