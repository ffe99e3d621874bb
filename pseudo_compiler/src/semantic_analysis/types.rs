//! Semantic diagnostics
//!
//! Semantic errors are collected, never thrown: the analyzer keeps going
//! after each one so the whole program is checked in a single run.

use crate::config::constants::compile_time::semantic::MAX_ERROR_MESSAGE_LENGTH;
use crate::logging::codes;
use crate::symbols::{DataType, DuplicateDeclaration};
use crate::utils::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("Line {line}: '{name}' is already declared at line {first_line}")]
    DuplicateDeclaration {
        name: String,
        line: u32,
        first_line: u32,
        span: Span,
    },

    #[error("Line {line}: '{name}' is not declared")]
    UndeclaredIdentifier { name: String, line: u32, span: Span },

    #[error("Line {line}: '{name}' is used before it has a value")]
    UseBeforeAssignment { name: String, line: u32, span: Span },

    #[error("Line {line}: {context} requires {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
        line: u32,
        span: Span,
    },

    #[error("Line {line}: cannot assign {value} to '{name}' of type {target}")]
    IncompatibleAssignment {
        name: String,
        target: DataType,
        value: DataType,
        line: u32,
        span: Span,
    },

    #[error("Line {line}: cannot assign to function '{name}'")]
    AssignmentToFunction { name: String, line: u32, span: Span },

    #[error("Line {line}: '{name}' is not a function")]
    NotCallable { name: String, line: u32, span: Span },

    #[error("Line {line}: '{name}' takes {expected} argument(s), {found} given")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        line: u32,
        span: Span,
    },

    #[error("Line {line}: blocks nested deeper than {limit} levels")]
    ScopeDepthExceeded { limit: usize, line: u32, span: Span },

    #[error("Too many semantic errors (limit {limit}); analysis stopped")]
    TooManyErrors { limit: usize },
}

impl SemanticError {
    pub fn duplicate(error: DuplicateDeclaration, span: Span) -> Self {
        Self::DuplicateDeclaration {
            name: error.name,
            line: error.line,
            first_line: error.first_line,
            span,
        }
    }

    pub fn type_mismatch(context: &str, expected: &str, found: &str, line: u32, span: Span) -> Self {
        Self::TypeMismatch {
            context: truncate(context),
            expected: expected.to_string(),
            found: truncate(found),
            line,
            span,
        }
    }

    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::DuplicateDeclaration { .. } => codes::symbols::DUPLICATE_DECLARATION,
            Self::UndeclaredIdentifier { .. } => codes::semantic::UNDECLARED_IDENTIFIER,
            Self::UseBeforeAssignment { .. } => codes::semantic::USE_BEFORE_ASSIGNMENT,
            Self::TypeMismatch { .. } => codes::semantic::TYPE_MISMATCH,
            Self::IncompatibleAssignment { .. } => codes::semantic::INCOMPATIBLE_ASSIGNMENT,
            Self::AssignmentToFunction { .. } => codes::semantic::ASSIGNMENT_TO_FUNCTION,
            Self::NotCallable { .. } => codes::semantic::NOT_CALLABLE,
            Self::ArgumentCountMismatch { .. } => codes::semantic::ARGUMENT_COUNT_MISMATCH,
            Self::ScopeDepthExceeded { .. } => codes::symbols::SCOPE_DEPTH_EXCEEDED,
            Self::TooManyErrors { .. } => codes::semantic::TOO_MANY_ERRORS,
        }
    }

    /// Short variant name for reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            Self::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            Self::UseBeforeAssignment { .. } => "UseBeforeAssignment",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::IncompatibleAssignment { .. } => "IncompatibleAssignment",
            Self::AssignmentToFunction { .. } => "AssignmentToFunction",
            Self::NotCallable { .. } => "NotCallable",
            Self::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            Self::ScopeDepthExceeded { .. } => "ScopeDepthExceeded",
            Self::TooManyErrors { .. } => "TooManyErrors",
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Self::DuplicateDeclaration { line, .. }
            | Self::UndeclaredIdentifier { line, .. }
            | Self::UseBeforeAssignment { line, .. }
            | Self::TypeMismatch { line, .. }
            | Self::IncompatibleAssignment { line, .. }
            | Self::AssignmentToFunction { line, .. }
            | Self::NotCallable { line, .. }
            | Self::ArgumentCountMismatch { line, .. }
            | Self::ScopeDepthExceeded { line, .. } => Some(*line),
            Self::TooManyErrors { .. } => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::DuplicateDeclaration { span, .. }
            | Self::UndeclaredIdentifier { span, .. }
            | Self::UseBeforeAssignment { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::IncompatibleAssignment { span, .. }
            | Self::AssignmentToFunction { span, .. }
            | Self::NotCallable { span, .. }
            | Self::ArgumentCountMismatch { span, .. }
            | Self::ScopeDepthExceeded { span, .. } => Some(*span),
            Self::TooManyErrors { .. } => None,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

fn truncate(text: &str) -> String {
    if text.len() <= MAX_ERROR_MESSAGE_LENGTH {
        return text.to_string();
    }
    let mut end = MAX_ERROR_MESSAGE_LENGTH;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let error = SemanticError::UndeclaredIdentifier {
            name: "x".to_string(),
            line: 3,
            span: Span::dummy(),
        };
        assert_eq!(error.to_string(), "Line 3: 'x' is not declared");
        assert_eq!(error.kind(), "UndeclaredIdentifier");

        let error = SemanticError::IncompatibleAssignment {
            name: "s".to_string(),
            target: DataType::String,
            value: DataType::Int,
            line: 2,
            span: Span::dummy(),
        };
        assert_eq!(error.to_string(), "Line 2: cannot assign INT to 's' of type STRING");
    }

    #[test]
    fn test_codes_and_lines() {
        let error = SemanticError::TooManyErrors { limit: 10 };
        assert_eq!(error.error_code().as_str(), "E199");
        assert_eq!(error.line(), None);
        assert!(error.span().is_none());

        let error = SemanticError::type_mismatch("IF condition", "BOOL", "INT", 5, Span::dummy());
        assert_eq!(error.error_code(), codes::semantic::TYPE_MISMATCH);
        assert_eq!(error.line(), Some(5));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_duplicate_conversion() {
        let error = SemanticError::duplicate(
            DuplicateDeclaration {
                name: "x".to_string(),
                line: 4,
                first_line: 1,
            },
            Span::dummy(),
        );
        assert_eq!(error.error_code(), codes::symbols::DUPLICATE_DECLARATION);
        assert_eq!(error.to_string(), "Line 4: 'x' is already declared at line 1");
    }

    #[test]
    fn test_long_context_is_truncated() {
        let context = "c".repeat(MAX_ERROR_MESSAGE_LENGTH + 10);
        match SemanticError::type_mismatch(&context, "BOOL", "INT", 1, Span::dummy()) {
            SemanticError::TypeMismatch { context, .. } => {
                assert_eq!(context.len(), MAX_ERROR_MESSAGE_LENGTH + 3);
                assert!(context.ends_with("..."));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
