//! Shared primitive types used by every compilation stage.

pub mod span;

pub use span::{Position, SourceMap, Span};
