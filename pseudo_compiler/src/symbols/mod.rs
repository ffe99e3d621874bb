//! Symbol table and scope management
//!
//! Used by semantic analysis to register declarations and resolve names
//! innermost-first. Id counters (`VAR_001`, `FUNC_001`) belong to each
//! table, so every run starts numbering from one.

pub mod error;
pub mod table;

pub use error::{DuplicateDeclaration, ScopeDepthExceeded};
pub use table::{DataType, EntryRef, SymbolEntry, SymbolKind, SymbolTable};
