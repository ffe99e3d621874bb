//! Token model shared by every compiler stage
//!
//! - [`TokenKind`]: the closed enumeration of lexical categories
//! - [`Token`]: kind, exact lexeme, 1-based line and source span
//! - [`KEYWORDS`]: the Spanish surface lexeme of every reserved word
//! - [`TokenCursor`]: read-only navigation used by the parser and the
//!   semantic walker
//!
//! Tokens are created once by the lexer and never mutated afterwards.

pub mod token;
pub mod token_stream;

pub use token::{keyword_kind, Token, TokenKind, DELIMITERS, KEYWORDS};
pub use token_stream::TokenCursor;

pub use crate::utils::{Position, SourceMap, Span};

/// Comma-joined kind names, the format of the token dump
pub fn kind_names(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| token.kind.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let tokens = vec![
            Token::synthetic(TokenKind::Definir, "El", 1),
            Token::synthetic(TokenKind::Id, "x", 1),
            Token::synthetic(TokenKind::Int, "Puntual", 1),
            Token::synthetic(TokenKind::DelimLine, ";", 1),
        ];
        assert_eq!(kind_names(&tokens), "DEFINIR,ID,INT,DELIM_LINE");
        assert_eq!(kind_names(&[]), "");
    }
}
