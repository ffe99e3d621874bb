//! Semantic analysis: scopes, declarations and type rules
//!
//! One forward walk over the token sequence produced by the lexer and
//! accepted by the parser. Diagnostics are collected rather than returned
//! as errors; a run succeeds when the list comes back empty.

pub mod analyzer;
pub mod type_checker;
pub mod types;

pub use analyzer::SemanticAnalyzer;
pub use type_checker::{TypeChecker, TypeRule, TypeViolation};
pub use types::SemanticError;

use crate::config::constants::compile_time::semantic::MAX_SEMANTIC_ERRORS;
use crate::config::runtime::SemanticPreferences;
use crate::logging::codes;
use crate::symbols::SymbolTable;
use crate::tokens::Token;
use crate::{log_info, log_success};

/// Analyze with default preferences
pub fn analyze(tokens: &[Token]) -> (SymbolTable, Vec<SemanticError>) {
    analyze_with_preferences(tokens, SemanticPreferences::default())
}

pub fn analyze_with_preferences(
    tokens: &[Token],
    preferences: SemanticPreferences,
) -> (SymbolTable, Vec<SemanticError>) {
    log_info!("Starting semantic analysis",
        "tokens" => tokens.len(),
        "max_errors_limit" => MAX_SEMANTIC_ERRORS);

    let start_time = std::time::Instant::now();
    let (table, diagnostics) = SemanticAnalyzer::with_preferences(tokens, preferences).run();

    if diagnostics.is_empty() {
        log_success!(codes::success::SEMANTIC_ANALYSIS_COMPLETE,
            "Semantic analysis completed",
            "variables" => table.variable_count(),
            "functions" => table.function_count(),
            "duration_ms" => start_time.elapsed().as_millis());
    } else {
        log_info!("Semantic analysis found errors",
            "error_count" => diagnostics.len(),
            "variables" => table.variable_count(),
            "functions" => table.function_count());
    }

    (table, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;

    #[test]
    fn test_analyze_collects_every_error() {
        let tokens = tokenize("Para p {\na Dice 1;\nb Dice 2;\nEl c Puntual;\nSe_Escribe c;\n} Fin").unwrap();
        let (table, errors) = analyze(&tokens);
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.iter().map(SemanticError::kind).collect::<Vec<_>>(),
            vec!["UndeclaredIdentifier", "UndeclaredIdentifier", "UseBeforeAssignment"]
        );
        assert_eq!(table.variable_count(), 1);
    }

    #[test]
    fn test_fresh_table_per_run() {
        let tokens = tokenize("Para p {\nEl x Puntual;\n} Fin").unwrap();
        let (first, _) = analyze(&tokens);
        let (second, _) = analyze(&tokens);
        assert_eq!(first.entries()[0].id, "VAR_001");
        assert_eq!(second.entries()[0].id, "VAR_001");
    }
}
