//! Report artifacts: token dump, symbol table listing, JSON export, summary

use super::error::PipelineError;
use crate::logging::codes;
use crate::semantic_analysis::SemanticError;
use crate::symbols::{SymbolEntry, SymbolTable};
use crate::tokens::{kind_names, Token};
use crate::{log_error, log_success};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 100;

/// `Res_<base>.txt`
pub fn token_dump_file_name(base_name: &str) -> String {
    format!("Res_{}.txt", base_name)
}

/// Write the comma-joined token kinds of one unit into `dir`
pub fn write_token_dump(
    tokens: &[Token],
    base_name: &str,
    dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let path = dir.join(token_dump_file_name(base_name));
    match fs::write(&path, kind_names(tokens)) {
        Ok(()) => {
            log_success!(codes::success::OUTPUT_WRITTEN, "Token dump written",
                "path" => path.display(),
                "tokens" => tokens.len());
            Ok(path)
        }
        Err(error) => {
            log_error!(codes::file_processing::OUTPUT_WRITE_FAILURE, "Token dump write failed",
                "path" => path.display(),
                "error" => error);
            Err(PipelineError::output_write(path, error))
        }
    }
}

/// Counts printed at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompilationSummary {
    pub tokens: usize,
    pub variables: usize,
    pub functions: usize,
    pub diagnostics: usize,
}

impl fmt::Display for CompilationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tokens, {} variables, {} functions, {} semantic error(s)",
            self.tokens, self.variables, self.functions, self.diagnostics
        )
    }
}

/// Plain-text FUNCIONES / VARIABLES listing of every entry
pub fn format_symbol_report(table: &SymbolTable) -> String {
    let mut out = String::new();
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    out.push_str(&heavy);
    out.push('\n');
    out.push_str(&format!("{:^width$}\n", "TABLA DE SIMBOLOS", width = RULE_WIDTH));
    out.push_str(&heavy);
    out.push('\n');

    if table.function_count() > 0 {
        out.push_str("\n--- FUNCIONES ---\n");
        out.push_str(&format!(
            "{:<12} | {:<20} | {:<10} | {:<30} | {}\n",
            "ID", "Name", "Returns", "Parameters", "Declared"
        ));
        out.push_str(&light);
        out.push('\n');
        for function in table.functions() {
            let params = if function.params.is_empty() {
                "none".to_string()
            } else {
                function.params.join(", ")
            };
            out.push_str(&format!(
                "{:<12} | {:<20} | {:<10} | {:<30} | L{}\n",
                function.id, function.name, function.data_type, params, function.declared_line
            ));
        }
    }

    if table.variable_count() > 0 {
        out.push_str("\n--- VARIABLES ---\n");
        out.push_str(&format!(
            "{:<12} | {:<20} | {:<10} | {:<7} | {:<12} | {:<8} | {}\n",
            "ID", "Name", "Type", "Scope", "Declared", "Assigned", "Used"
        ));
        out.push_str(&light);
        out.push('\n');

        let mut variables: Vec<&SymbolEntry> = table.variables().collect();
        variables.sort_by_key(|entry| entry.declared_line);
        for variable in variables {
            out.push_str(&format!(
                "{:<12} | {:<20} | {:<10} | {:<7} | {:<12} | {:<8} | {}{}\n",
                variable.id,
                variable.name,
                variable.data_type,
                variable.scope,
                format!("L{}", variable.declared_line),
                if variable.has_value { "yes" } else { "no" },
                usage(&variable.usage_lines),
                if variable.is_parameter { " (param)" } else { "" }
            ));
        }
    }

    out.push_str(&heavy);
    out.push('\n');
    out
}

fn usage(lines: &[u32]) -> String {
    if lines.is_empty() {
        return "unused".to_string();
    }
    lines
        .iter()
        .map(|line| format!("L{}", line))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One diagnostic as exported to JSON
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    pub code: &'static str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub message: String,
}

impl From<&SemanticError> for DiagnosticRecord {
    fn from(error: &SemanticError) -> Self {
        Self {
            code: error.error_code().as_str(),
            kind: error.kind(),
            line: error.line(),
            message: error.to_string(),
        }
    }
}

/// JSON document for one compilation unit
#[derive(Debug, Serialize)]
pub struct PipelineOutput<'a> {
    pub file: String,
    pub summary: CompilationSummary,
    pub symbols: &'a SymbolTable,
    pub diagnostics: Vec<DiagnosticRecord>,
}

impl<'a> PipelineOutput<'a> {
    pub fn new(
        file: impl Into<String>,
        summary: CompilationSummary,
        symbols: &'a SymbolTable,
        diagnostics: &[SemanticError],
    ) -> Self {
        Self {
            file: file.into(),
            summary,
            symbols,
            diagnostics: diagnostics.iter().map(DiagnosticRecord::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::DataType;
    use crate::tokens::TokenKind;
    use crate::utils::Span;

    fn sample_table() -> SymbolTable {
        let mut table = SymbolTable::new();
        table
            .declare_function("suma", DataType::Int, vec!["a".into(), "b".into()], 9)
            .unwrap();
        table.enter_scope().unwrap();
        let x = table.declare_variable("x", DataType::Int, 2, false).unwrap();
        table.mark_assigned(x);
        table.record_usage(x, 3);
        table.declare_variable("a", DataType::Int, 9, true).unwrap();
        table
    }

    #[test]
    fn test_token_dump_written_under_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = vec![
            Token::synthetic(TokenKind::Process, "Para", 1),
            Token::synthetic(TokenKind::Id, "p", 1),
        ];

        let path = write_token_dump(&tokens, "prueba", dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "Res_prueba.txt");
        assert_eq!(fs::read_to_string(path).unwrap(), "PROCESS,ID");
    }

    #[test]
    fn test_token_dump_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let error = write_token_dump(&[], "x", &missing).unwrap_err();
        assert!(matches!(error, PipelineError::OutputWrite { .. }));
    }

    #[test]
    fn test_symbol_report_sections() {
        let report = format_symbol_report(&sample_table());
        assert!(report.contains("--- FUNCIONES ---"));
        assert!(report.contains("--- VARIABLES ---"));
        assert!(report.contains("FUNC_001"));
        assert!(report.contains("a, b"));
        assert!(report.contains("L3"));
        assert!(report.contains("(param)"));

        let x_line = report.lines().find(|line| line.starts_with("VAR_001")).unwrap();
        assert!(x_line.contains("yes"));
    }

    #[test]
    fn test_empty_table_report_has_no_sections() {
        let report = format_symbol_report(&SymbolTable::new());
        assert!(!report.contains("FUNCIONES"));
        assert!(!report.contains("VARIABLES"));
    }

    #[test]
    fn test_json_export() {
        let table = sample_table();
        let diagnostics = vec![SemanticError::UndeclaredIdentifier {
            name: "y".to_string(),
            line: 4,
            span: Span::dummy(),
        }];
        let summary = CompilationSummary {
            tokens: 10,
            variables: table.variable_count(),
            functions: table.function_count(),
            diagnostics: diagnostics.len(),
        };
        let json = PipelineOutput::new("prueba.txt", summary, &table, &diagnostics)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["variables"], 2);
        assert_eq!(value["symbols"]["entries"][0]["id"], "FUNC_001");
        assert_eq!(value["symbols"]["entries"][1]["data_type"], "INT");
        assert_eq!(value["diagnostics"][0]["code"], "E110");
        assert_eq!(value["diagnostics"][0]["line"], 4);
    }

    #[test]
    fn test_summary_display() {
        let summary = CompilationSummary {
            tokens: 12,
            variables: 2,
            functions: 1,
            diagnostics: 0,
        };
        assert_eq!(
            summary.to_string(),
            "12 tokens, 2 variables, 1 functions, 0 semantic error(s)"
        );
    }
}
