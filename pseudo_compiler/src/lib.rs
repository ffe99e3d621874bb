// Internal modules
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod semantic_analysis;
pub mod symbols;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use lexical::{tokenize, LexerError};
pub use pipeline::{PipelineError, PipelineResult};
pub use semantic_analysis::{analyze, SemanticError};
pub use symbols::{DataType, SymbolTable};
pub use syntax::{parse, SyntaxError};
pub use tokens::{Token, TokenKind};
