//! Symbol table errors

use crate::logging::{codes, Code};

/// A name declared twice in the same frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{name}' at line {line} is already declared at line {first_line}")]
pub struct DuplicateDeclaration {
    pub name: String,
    pub line: u32,
    /// Line of the declaration that stays in effect
    pub first_line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Scope nesting exceeds {limit} levels")]
pub struct ScopeDepthExceeded {
    pub limit: usize,
}

impl DuplicateDeclaration {
    pub fn error_code(&self) -> Code {
        codes::symbols::DUPLICATE_DECLARATION
    }
}

impl ScopeDepthExceeded {
    pub fn error_code(&self) -> Code {
        codes::symbols::SCOPE_DEPTH_EXCEEDED
    }
}
