//! Lexical analysis
//!
//! [`automaton`] holds the table-driven DFA built once from the keyword
//! table; [`analyzer`] drives it over cleaned source text. Comment removal
//! is not done here (see `file_processor::cleanup`).

pub mod analyzer;
pub mod automaton;

use crate::tokens::Token;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};
pub use automaton::{Automaton, CharClass, StateId, Symbol, INITIAL_STATE};

/// Tokenize cleaned source text with default preferences
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexerError> {
    LexicalAnalyzer::new().tokenize(text)
}

/// Build the shared automaton ahead of the first file and check it.
/// A failure here means the keyword table itself is broken.
pub fn init_lexical_analysis() -> Result<(), LexerError> {
    Automaton::shared().validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    #[test]
    fn test_tokenize_entry_point() {
        let tokens = tokenize("Para p { } Fin").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Process,
                TokenKind::Id,
                TokenKind::DelimLkey,
                TokenKind::DelimRkey,
                TokenKind::EndProcess
            ]
        );
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize(" \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_init_validates_shared_automaton() {
        assert!(init_lexical_analysis().is_ok());
    }
}
