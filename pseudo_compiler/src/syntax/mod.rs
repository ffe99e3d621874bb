//! Syntax analysis: predictive recursive descent over the token sequence
//!
//! Only validates structure. Semantic analysis walks the same tokens again
//! and assumes this stage succeeded.

mod error;
mod parser;

pub use error::{SyntaxError, SyntaxResult, END_OF_INPUT};
pub use parser::{Parser, StatementList};

use crate::tokens::Token;

/// Validate a whole program.
///
/// The error list holds a single entry: parsing stops at the first
/// mismatch.
pub fn parse(tokens: &[Token]) -> Result<(), Vec<SyntaxError>> {
    Parser::new(tokens).parse_program().map_err(|error| vec![error])
}

/// Validate a bare statement list, without the process wrapper
pub fn parse_statements(tokens: &[Token]) -> Result<(), Vec<SyntaxError>> {
    Parser::new(tokens)
        .parse_statements()
        .map_err(|error| vec![error])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;

    #[test]
    fn test_parse_reports_single_error() {
        let tokens = tokenize("Para p { x Dice ; } Fin").unwrap();
        let errors = parse(&tokens).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line(), Some(1));
    }

    #[test]
    fn test_parse_valid_program() {
        let tokens = tokenize("Para p {\n El x Puntual;\n x Dice 5;\n} Fin").unwrap();
        assert!(parse(&tokens).is_ok());
    }

    #[test]
    fn test_parse_statements_rejects_process_wrapper_leftovers() {
        let tokens = tokenize("El x Puntual; } Fin").unwrap();
        let errors = parse_statements(&tokens).unwrap_err();
        assert!(matches!(errors[0], SyntaxError::UnexpectedTrailingTokens { .. }));
    }
}
