//! Syntax errors with error code mapping
//!
//! The parser never recovers: the first mismatch aborts the parse and is the
//! only error reported.

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Name used for `found` when the input ran out
pub const END_OF_INPUT: &str = "EOF";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Line {line}, position {position}: expected {expected}, found {found}")]
    ExpectedTokenMismatch {
        expected: String,
        found: String,
        line: u32,
        position: usize,
        span: Span,
    },

    #[error("Line {line}, position {position}: unexpected {found} after the end of the program")]
    UnexpectedTrailingTokens {
        found: String,
        line: u32,
        position: usize,
        span: Span,
    },

    #[error("Line {line}: nesting deeper than {depth} levels")]
    MaxRecursionDepth { depth: usize, line: u32, span: Span },

    #[error("Empty token stream - no tokens to parse")]
    EmptyTokenStream,
}

impl SyntaxError {
    pub fn mismatch(expected: &str, found: &str, line: u32, position: usize, span: Span) -> Self {
        Self::ExpectedTokenMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
            line,
            position,
            span,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::ExpectedTokenMismatch { .. } => codes::syntax::EXPECTED_TOKEN_MISMATCH,
            Self::UnexpectedTrailingTokens { .. } => codes::syntax::UNEXPECTED_TRAILING_TOKENS,
            Self::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
            Self::EmptyTokenStream => codes::syntax::EMPTY_TOKEN_STREAM,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::ExpectedTokenMismatch { span, .. }
            | Self::UnexpectedTrailingTokens { span, .. }
            | Self::MaxRecursionDepth { span, .. } => Some(*span),
            Self::EmptyTokenStream => None,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Self::ExpectedTokenMismatch { line, .. }
            | Self::UnexpectedTrailingTokens { line, .. }
            | Self::MaxRecursionDepth { line, .. } => Some(*line),
            Self::EmptyTokenStream => None,
        }
    }

    /// Token index at which the error was detected
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::ExpectedTokenMismatch { position, .. }
            | Self::UnexpectedTrailingTokens { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Self::ExpectedTokenMismatch { found, .. } if found == END_OF_INPUT)
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let error = SyntaxError::mismatch("DELIM_LINE", "ID", 3, 7, Span::dummy());
        assert_eq!(
            error.to_string(),
            "Line 3, position 7: expected DELIM_LINE, found ID"
        );
        assert_eq!(error.line(), Some(3));
        assert_eq!(error.position(), Some(7));
        assert!(!error.is_end_of_input());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SyntaxError::EmptyTokenStream.error_code().as_str(), "E042");
        let error = SyntaxError::mismatch("END_PROCESS", END_OF_INPUT, 1, 4, Span::dummy());
        assert_eq!(error.error_code(), codes::syntax::EXPECTED_TOKEN_MISMATCH);
        assert_eq!(error.category(), "SyntaxAnalysis");
        assert!(error.is_end_of_input());
    }

    #[test]
    fn test_span_availability() {
        assert!(SyntaxError::EmptyTokenStream.span().is_none());
        let error = SyntaxError::MaxRecursionDepth {
            depth: 4,
            line: 2,
            span: Span::dummy(),
        };
        assert_eq!(error.span(), Some(Span::dummy()));
        assert_eq!(error.position(), None);
    }
}
