//! Diagnostic codes and their classification
//!
//! Every code the compiler can emit lives here together with its metadata
//! (category, severity, recoverability, description, suggested action).

use std::collections::HashMap;
use std::sync::OnceLock;

/// Code wrapper shared by error and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata attached to a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const EVENT_LIMIT_REACHED: Code = Code::new("W001");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const TOO_MANY_LINES: Code = Code::new("E012");
    pub const OUTPUT_WRITE_FAILURE: Code = Code::new("E013");
    pub const CLEANUP_UNAVAILABLE: Code = Code::new("E014");
}

pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INCOMPLETE_TOKEN: Code = Code::new("E022");
    pub const LEXEME_TOO_LONG: Code = Code::new("E023");
    pub const TOO_MANY_TOKENS: Code = Code::new("E024");
    pub const UNKNOWN_ACCEPTING_STATE: Code = Code::new("E025");
}

pub mod syntax {
    use super::Code;

    pub const EXPECTED_TOKEN_MISMATCH: Code = Code::new("E040");
    pub const UNEXPECTED_TRAILING_TOKENS: Code = Code::new("E041");
    pub const EMPTY_TOKEN_STREAM: Code = Code::new("E042");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E043");
}

pub mod symbols {
    use super::Code;

    pub const DUPLICATE_DECLARATION: Code = Code::new("E090");
    pub const SCOPE_DEPTH_EXCEEDED: Code = Code::new("E091");
}

pub mod semantic {
    use super::Code;

    pub const UNDECLARED_IDENTIFIER: Code = Code::new("E110");
    pub const USE_BEFORE_ASSIGNMENT: Code = Code::new("E111");
    pub const TYPE_MISMATCH: Code = Code::new("E180");
    pub const INCOMPATIBLE_ASSIGNMENT: Code = Code::new("E181");
    pub const ASSIGNMENT_TO_FUNCTION: Code = Code::new("E182");
    pub const NOT_CALLABLE: Code = Code::new("E183");
    pub const ARGUMENT_COUNT_MISMATCH: Code = Code::new("E184");
    pub const TOO_MANY_ERRORS: Code = Code::new("E199");
}

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const CLEANUP_APPLIED: Code = Code::new("I007");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const SYNTAX_VALIDATION_PASSED: Code = Code::new("I041");
    pub const SEMANTIC_ANALYSIS_COMPLETE: Code = Code::new("I070");
    pub const OUTPUT_WRITTEN: Code = Code::new("I090");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

type Row = (
    Code,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

#[rustfmt::skip]
const REGISTRY_ROWS: &[Row] = &[
    (system::INTERNAL_ERROR, "System", Severity::Critical, false, true,
        "Internal compiler invariant violated", "Report the input that triggered it"),
    (system::INITIALIZATION_FAILURE, "System", Severity::Critical, false, true,
        "Compiler initialization failed", "Check the runtime configuration"),
    (system::EVENT_LIMIT_REACHED, "System", Severity::Low, true, false,
        "Further events for this file were dropped", "Fix the reported errors and rerun"),

    (file_processing::FILE_NOT_FOUND, "FileProcessing", Severity::High, false, true,
        "Source file does not exist", "Check the file path"),
    (file_processing::INVALID_EXTENSION, "FileProcessing", Severity::High, false, true,
        "Source file has an unexpected extension", "Rename the file or change the expected extension"),
    (file_processing::FILE_TOO_LARGE, "FileProcessing", Severity::High, false, true,
        "Source file exceeds the size limit", "Split the program into smaller files"),
    (file_processing::EMPTY_FILE, "FileProcessing", Severity::Medium, false, true,
        "Source file is empty", "Provide a program with a process block"),
    (file_processing::PERMISSION_DENIED, "FileProcessing", Severity::High, false, true,
        "Source file cannot be read", "Check the file permissions"),
    (file_processing::INVALID_ENCODING, "FileProcessing", Severity::High, false, true,
        "Source file is not valid UTF-8", "Save the file as UTF-8"),
    (file_processing::IO_ERROR, "FileProcessing", Severity::High, false, true,
        "I/O failure while reading the source", "Retry the operation"),
    (file_processing::TOO_MANY_LINES, "FileProcessing", Severity::High, false, true,
        "Source file exceeds the line limit", "Split the program into smaller files"),
    (file_processing::OUTPUT_WRITE_FAILURE, "FileProcessing", Severity::Medium, true, false,
        "Failed to write a report file", "Check the output directory"),
    (file_processing::CLEANUP_UNAVAILABLE, "FileProcessing", Severity::Critical, false, true,
        "Cleanup filter patterns failed to compile", "Rerun with --no-clean and report the failure"),

    (lexical::INVALID_CHARACTER, "LexicalAnalysis", Severity::High, false, true,
        "Character not accepted by the lexical automaton", "Remove or replace the character"),
    (lexical::UNTERMINATED_STRING, "LexicalAnalysis", Severity::High, false, true,
        "String literal is missing its closing quote", "Close the string with '\"'"),
    (lexical::INCOMPLETE_TOKEN, "LexicalAnalysis", Severity::High, false, true,
        "Token ended before reaching an accepting state", "Complete the number or keyword"),
    (lexical::LEXEME_TOO_LONG, "LexicalAnalysis", Severity::High, false, true,
        "Token exceeds the maximum lexeme length", "Shorten the identifier or literal"),
    (lexical::TOO_MANY_TOKENS, "LexicalAnalysis", Severity::High, false, true,
        "Source produces more tokens than allowed", "Split the program into smaller files"),
    (lexical::UNKNOWN_ACCEPTING_STATE, "LexicalAnalysis", Severity::Critical, false, true,
        "Accepting state without a token kind", "Rebuild the keyword table"),

    (syntax::EXPECTED_TOKEN_MISMATCH, "SyntaxAnalysis", Severity::High, false, true,
        "Token does not match the grammar", "Fix the statement near the reported token"),
    (syntax::UNEXPECTED_TRAILING_TOKENS, "SyntaxAnalysis", Severity::High, false, true,
        "Tokens remain after a complete program", "Remove text after the last block"),
    (syntax::EMPTY_TOKEN_STREAM, "SyntaxAnalysis", Severity::High, false, true,
        "No tokens to parse", "Provide a program with a process block"),
    (syntax::MAX_RECURSION_DEPTH, "SyntaxAnalysis", Severity::Critical, false, true,
        "Blocks are nested deeper than the parser allows", "Flatten the nested blocks"),

    (symbols::DUPLICATE_DECLARATION, "SymbolTable", Severity::Medium, true, false,
        "Name declared twice in the same scope", "Rename or remove one declaration"),
    (symbols::SCOPE_DEPTH_EXCEEDED, "SymbolTable", Severity::High, true, false,
        "Scopes are nested deeper than allowed", "Flatten the nested blocks"),

    (semantic::UNDECLARED_IDENTIFIER, "SemanticAnalysis", Severity::Medium, true, false,
        "Identifier used without a visible declaration", "Declare the name before using it"),
    (semantic::USE_BEFORE_ASSIGNMENT, "SemanticAnalysis", Severity::Medium, true, false,
        "Variable read before it holds a value", "Assign or read the variable first"),
    (semantic::TYPE_MISMATCH, "SemanticAnalysis", Severity::Medium, true, false,
        "Operand types do not fit the operator", "Check the operand types"),
    (semantic::INCOMPATIBLE_ASSIGNMENT, "SemanticAnalysis", Severity::Medium, true, false,
        "Value type cannot be stored in the target", "Change the declared type or the value"),
    (semantic::ASSIGNMENT_TO_FUNCTION, "SemanticAnalysis", Severity::Medium, true, false,
        "Function name used as an assignment target", "Assign to a variable instead"),
    (semantic::NOT_CALLABLE, "SemanticAnalysis", Severity::Medium, true, false,
        "Call syntax applied to a variable", "Call a declared function"),
    (semantic::ARGUMENT_COUNT_MISMATCH, "SemanticAnalysis", Severity::Medium, true, false,
        "Call passes the wrong number of arguments", "Match the function's parameter list"),
    (semantic::TOO_MANY_ERRORS, "SemanticAnalysis", Severity::High, false, true,
        "Diagnostic limit reached", "Fix the reported errors and rerun"),

    (success::OPERATION_COMPLETED_SUCCESSFULLY, "Success", Severity::Low, true, false,
        "Operation completed", "None"),
    (success::SYSTEM_INITIALIZATION_COMPLETED, "Success", Severity::Low, true, false,
        "Logging initialized", "None"),
    (success::FILE_PROCESSING_SUCCESS, "Success", Severity::Low, true, false,
        "Source file read", "Continue to lexical analysis"),
    (success::CLEANUP_APPLIED, "Success", Severity::Low, true, false,
        "Comments and elision markers stripped", "Continue to lexical analysis"),
    (success::TOKENIZATION_COMPLETE, "Success", Severity::Low, true, false,
        "Tokenization completed", "Continue to syntax analysis"),
    (success::SYNTAX_VALIDATION_PASSED, "Success", Severity::Low, true, false,
        "Token stream matches the grammar", "Continue to semantic analysis"),
    (success::SEMANTIC_ANALYSIS_COMPLETE, "Success", Severity::Low, true, false,
        "Semantic analysis completed", "Hand the symbol table to code generation"),
    (success::OUTPUT_WRITTEN, "Success", Severity::Low, true, false,
        "Report file written", "None"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ROWS
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code.as_str(),
                        ErrorMetadata {
                            code: code.as_str(),
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        assert_eq!(get_error_registry().len(), REGISTRY_ROWS.len());
    }

    #[test]
    fn test_semantic_codes_are_recoverable() {
        assert!(is_recoverable(semantic::TYPE_MISMATCH.as_str()));
        assert!(!requires_halt(semantic::UNDECLARED_IDENTIFIER.as_str()));
        assert!(requires_halt(lexical::INVALID_CHARACTER.as_str()));
        assert_eq!(get_category(syntax::EMPTY_TOKEN_STREAM.as_str()), "SyntaxAnalysis");
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_category("X999"), "Unknown");
        assert_eq!(get_severity("X999"), Severity::Medium);
        assert_eq!(get_description("X999"), "Unknown error");
    }
}
