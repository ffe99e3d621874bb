//! Scoped symbol table
//!
//! Entries live in an arena for the whole run so the final report can list
//! every declaration, including those whose scope has closed. Lookups go
//! through a stack of frames mapping names to arena indices; frame 0 is the
//! global frame and is never popped.

use super::error::{DuplicateDeclaration, ScopeDepthExceeded};
use crate::config::constants::compile_time::semantic::MAX_SCOPE_DEPTH;
use crate::tokens::TokenKind;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Index of an entry in the table's arena
pub type EntryRef = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Int,
    Real,
    Bool,
    Char,
    String,
}

impl DataType {
    /// Type named by a type keyword (`Puntual`, `Eminente`, ...)
    pub fn from_keyword(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Int => Some(Self::Int),
            TokenKind::Real => Some(Self::Real),
            TokenKind::Bool => Some(Self::Bool),
            TokenKind::Char => Some(Self::Char),
            TokenKind::String => Some(Self::String),
            _ => None,
        }
    }

    /// Type of a literal token
    pub fn of_literal(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::DataInt => Some(Self::Int),
            TokenKind::DataDouble => Some(Self::Real),
            TokenKind::DataString => Some(Self::String),
            TokenKind::True | TokenKind::False => Some(Self::Bool),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Real)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Real => "REAL",
            Self::Bool => "BOOL",
            Self::Char => "CHAR",
            Self::String => "STRING",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Variable,
    Function,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolEntry {
    /// `VAR_001`, `FUNC_001`, ...
    pub id: String,
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type, or the return type for functions
    pub data_type: DataType,
    /// Frame depth at declaration
    pub scope: usize,
    pub declared_line: u32,
    pub has_value: bool,
    pub is_parameter: bool,
    /// Parameter names, functions only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    /// Name bound to the result inside a function body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_variable: Option<String>,
    pub usage_lines: Vec<u32>,
}

impl SymbolEntry {
    pub fn is_function(&self) -> bool {
        self.kind == SymbolKind::Function
    }

    /// Whether reading the symbol is allowed
    pub fn is_usable(&self) -> bool {
        self.has_value || self.is_parameter || self.is_function()
    }

    pub fn record_usage(&mut self, line: u32) {
        if !self.usage_lines.contains(&line) {
            self.usage_lines.push(line);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    #[serde(skip)]
    frames: Vec<HashMap<String, EntryRef>>,
    variable_count: usize,
    function_count: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: vec![HashMap::new()],
            variable_count: 0,
            function_count: 0,
        }
    }

    /// Depth of the innermost open frame; 0 is global
    pub fn current_depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn enter_scope(&mut self) -> Result<usize, ScopeDepthExceeded> {
        if self.current_depth() >= MAX_SCOPE_DEPTH {
            return Err(ScopeDepthExceeded {
                limit: MAX_SCOPE_DEPTH,
            });
        }
        self.frames.push(HashMap::new());
        Ok(self.current_depth())
    }

    /// Close the innermost frame; the global frame stays
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn declare_variable(
        &mut self,
        name: &str,
        data_type: DataType,
        line: u32,
        is_parameter: bool,
    ) -> Result<EntryRef, DuplicateDeclaration> {
        let depth = self.current_depth();
        self.check_free(depth, name, line)?;

        self.variable_count += 1;
        let entry = SymbolEntry {
            id: format!("VAR_{:03}", self.variable_count),
            name: name.to_string(),
            kind: SymbolKind::Variable,
            data_type,
            scope: depth,
            declared_line: line,
            has_value: is_parameter,
            is_parameter,
            params: Vec::new(),
            return_variable: None,
            usage_lines: Vec::new(),
        };
        Ok(self.insert(depth, entry))
    }

    /// Functions always go to the global frame
    pub fn declare_function(
        &mut self,
        name: &str,
        return_type: DataType,
        params: Vec<String>,
        line: u32,
    ) -> Result<EntryRef, DuplicateDeclaration> {
        self.check_free(0, name, line)?;

        self.function_count += 1;
        let entry = SymbolEntry {
            id: format!("FUNC_{:03}", self.function_count),
            name: name.to_string(),
            kind: SymbolKind::Function,
            data_type: return_type,
            scope: 0,
            declared_line: line,
            has_value: false,
            is_parameter: false,
            params,
            return_variable: None,
            usage_lines: Vec::new(),
        };
        Ok(self.insert(0, entry))
    }

    /// Innermost-first lookup across the open frames
    pub fn resolve(&self, name: &str) -> Option<EntryRef> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    pub fn resolve_entry(&self, name: &str) -> Option<&SymbolEntry> {
        self.resolve(name).and_then(|entry| self.entries.get(entry))
    }

    pub fn get(&self, entry: EntryRef) -> Option<&SymbolEntry> {
        self.entries.get(entry)
    }

    pub fn get_mut(&mut self, entry: EntryRef) -> Option<&mut SymbolEntry> {
        self.entries.get_mut(entry)
    }

    pub fn mark_assigned(&mut self, entry: EntryRef) {
        if let Some(entry) = self.entries.get_mut(entry) {
            entry.has_value = true;
        }
    }

    pub fn record_usage(&mut self, entry: EntryRef, line: u32) {
        if let Some(entry) = self.entries.get_mut(entry) {
            entry.record_usage(line);
        }
    }

    /// Every entry in declaration order, closed scopes included
    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn variables(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter().filter(|entry| !entry.is_function())
    }

    pub fn functions(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter().filter(|entry| entry.is_function())
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn function_count(&self) -> usize {
        self.function_count
    }

    fn check_free(&self, depth: usize, name: &str, line: u32) -> Result<(), DuplicateDeclaration> {
        match self.frames.get(depth).and_then(|frame| frame.get(name)) {
            Some(existing) => Err(DuplicateDeclaration {
                name: name.to_string(),
                line,
                first_line: self
                    .entries
                    .get(*existing)
                    .map(|entry| entry.declared_line)
                    .unwrap_or(line),
            }),
            None => Ok(()),
        }
    }

    fn insert(&mut self, depth: usize, entry: SymbolEntry) -> EntryRef {
        let index = self.entries.len();
        if let Some(frame) = self.frames.get_mut(depth) {
            frame.insert(entry.name.clone(), index);
        }
        self.entries.push(entry);
        index
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
