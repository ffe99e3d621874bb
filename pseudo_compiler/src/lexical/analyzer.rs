//! Lexer driver over the shared automaton
//!
//! Scans left to right, skipping whitespace between tokens. Each token grows
//! by exact-character or class transitions until no transition applies; if
//! the automaton is then in an accepting state the token is emitted and the
//! current character starts the next one (maximal munch with early cutoff).
//! Delimiters and closed strings end a token as soon as they are entered.

use super::automaton::{Automaton, StateId, INITIAL_STATE};
use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{Token, TokenKind};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success};
use std::collections::BTreeMap;

/// Lexical errors; every one of them aborts tokenization
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at line {}, column {}", position.line, position.column)]
    InvalidCharacter { character: char, position: Position },

    #[error("Unterminated string literal starting at line {start_line}")]
    UnterminatedString { start_line: u32, start: Position },

    #[error("Incomplete token '{lexeme}' at line {line}")]
    IncompleteToken {
        lexeme: String,
        line: u32,
        start: Position,
    },

    #[error("Token at line {line} is {length} bytes long (max {limit})")]
    LexemeTooLong {
        length: usize,
        limit: usize,
        line: u32,
    },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },

    #[error("Internal error: accepting state {state} has no token kind")]
    UnknownAcceptingState { state: StateId },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::IncompleteToken { .. } => codes::lexical::INCOMPLETE_TOKEN,
            LexerError::LexemeTooLong { .. } => codes::lexical::LEXEME_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::UnknownAcceptingState { .. } => codes::lexical::UNKNOWN_ACCEPTING_STATE,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            LexerError::InvalidCharacter { position, .. } => Some(position.line),
            LexerError::UnterminatedString { start_line, .. } => Some(*start_line),
            LexerError::IncompleteToken { line, .. } | LexerError::LexemeTooLong { line, .. } => {
                Some(*line)
            }
            LexerError::TooManyTokens { .. } | LexerError::UnknownAcceptingState { .. } => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            LexerError::InvalidCharacter {
                character,
                position,
            } => Some(Span::new(*position, position.advance(*character))),
            LexerError::UnterminatedString { start, .. } => Some(Span::point(*start)),
            LexerError::IncompleteToken { lexeme, start, .. } => {
                let end = lexeme.chars().fold(*start, Position::advance);
                Some(Span::new(*start, end))
            }
            _ => None,
        }
    }

    /// Internal invariant violations as opposed to bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, LexerError::UnknownAcceptingState { .. })
    }
}

#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub delimiter_tokens: usize,
    pub line_count: u32,
    pub max_lexeme_length: usize,
    /// Filled only when kind tracking is enabled in the preferences
    pub kind_counts: BTreeMap<TokenKind, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        self.max_lexeme_length = self.max_lexeme_length.max(token.lexeme.len());

        match token.kind {
            TokenKind::Id => self.identifier_tokens += 1,
            TokenKind::DataInt
            | TokenKind::DataDouble
            | TokenKind::DataString
            | TokenKind::True
            | TokenKind::False => self.literal_tokens += 1,
            kind if kind.is_delimiter() => self.delimiter_tokens += 1,
            _ => self.keyword_tokens += 1,
        }

        if preferences.track_kind_counts {
            *self.kind_counts.entry(token.kind).or_insert(0) += 1;
        }
    }
}

pub struct LexicalAnalyzer {
    automaton: &'static Automaton,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            automaton: Automaton::shared(),
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize cleaned source text
    pub fn tokenize(&mut self, text: &str) -> Result<Vec<Token>, LexerError> {
        self.metrics = LexicalMetrics::default();

        log_debug!("Starting lexical analysis",
            "char_count" => text.chars().count(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        match self.scan(text) {
            Ok(tokens) => {
                log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
                    "token_count" => tokens.len(),
                    "identifiers" => self.metrics.identifier_tokens,
                    "literals" => self.metrics.literal_tokens,
                    "lines" => self.metrics.line_count
                );
                Ok(tokens)
            }
            Err(error) => {
                match error.span() {
                    Some(span) => log_error!(error.error_code(), &error.to_string(), span = span),
                    None => log_error!(error.error_code(), &error.to_string()),
                }
                Err(error)
            }
        }
    }

    fn scan(&mut self, text: &str) -> Result<Vec<Token>, LexerError> {
        let automaton = self.automaton;
        let mut tokens = Vec::new();
        let mut chars = text.chars().peekable();
        let mut pos = Position::start();
        let mut start = pos;
        let mut state = INITIAL_STATE;
        let mut lexeme = String::new();

        while let Some(&ch) = chars.peek() {
            if lexeme.is_empty() {
                if ch.is_whitespace() {
                    pos = pos.advance(ch);
                    chars.next();
                    continue;
                }
                start = pos;
            }

            match automaton.step(state, ch) {
                Some(next) => {
                    lexeme.push(ch);
                    chars.next();
                    pos = pos.advance(ch);
                    state = next;
                    check_length(&lexeme, start)?;

                    if automaton.is_terminal(state) {
                        self.emit(&mut tokens, state, &mut lexeme, Span::new(start, pos))?;
                        state = INITIAL_STATE;
                    }
                }
                // Early cutoff: `ch` is read again as the start of the next token
                None if automaton.is_accepting(state) => {
                    self.emit(&mut tokens, state, &mut lexeme, Span::new(start, pos))?;
                    state = INITIAL_STATE;
                }
                None if ch.is_whitespace() => {
                    return Err(LexerError::IncompleteToken {
                        lexeme,
                        line: start.line,
                        start,
                    });
                }
                None => {
                    return Err(LexerError::InvalidCharacter {
                        character: ch,
                        position: pos,
                    });
                }
            }
        }

        if !lexeme.is_empty() {
            if automaton.is_accepting(state) {
                self.emit(&mut tokens, state, &mut lexeme, Span::new(start, pos))?;
            } else if automaton.is_inside_string(state) {
                return Err(LexerError::UnterminatedString {
                    start_line: start.line,
                    start,
                });
            } else {
                return Err(LexerError::IncompleteToken {
                    lexeme,
                    line: start.line,
                    start,
                });
            }
        }

        self.metrics.line_count = pos.line;
        Ok(tokens)
    }

    fn emit(
        &mut self,
        tokens: &mut Vec<Token>,
        state: StateId,
        lexeme: &mut String,
        span: Span,
    ) -> Result<(), LexerError> {
        let kind = self.automaton.kind_of(state)?;

        if tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexerError::TooManyTokens {
                count: tokens.len() + 1,
            });
        }

        let token = Token::new(kind, std::mem::take(lexeme), span);
        self.metrics.record_token(&token, &self.preferences);

        if self.preferences.log_each_token {
            log_debug!("Token emitted",
                "kind" => token.kind,
                "lexeme" => token.lexeme.as_str(),
                "line" => token.line
            );
        }

        tokens.push(token);
        Ok(())
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn check_length(lexeme: &str, start: Position) -> Result<(), LexerError> {
    let limit = if lexeme.starts_with('"') {
        MAX_STRING_SIZE
    } else {
        MAX_LEXEME_LENGTH
    };

    if lexeme.len() > limit {
        return Err(LexerError::LexemeTooLong {
            length: lexeme.len(),
            limit,
            line: start.line,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn kinds(text: &str) -> Vec<TokenKind> {
        LexicalAnalyzer::new()
            .tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_declaration_tokens() {
        assert_eq!(
            kinds("El x Puntual;"),
            vec![
                TokenKind::Definir,
                TokenKind::Id,
                TokenKind::Int,
                TokenKind::DelimLine
            ]
        );
    }

    #[test]
    fn test_early_cutoff_splits_adjacent_tokens() {
        assert_eq!(
            kinds("suma(a,b);"),
            vec![
                TokenKind::Id,
                TokenKind::DelimLparen,
                TokenKind::Id,
                TokenKind::DelimComma,
                TokenKind::Id,
                TokenKind::DelimRparen,
                TokenKind::DelimLine
            ]
        );
        // A keyword followed directly by a lowercase letter splits too
        assert_eq!(kinds("Sialfa"), vec![TokenKind::If, TokenKind::Id]);
    }

    #[test]
    fn test_numbers() {
        let tokens = LexicalAnalyzer::new().tokenize("x Dice -12 Inspira 3.5;").unwrap();
        let summary: Vec<_> = tokens.iter().map(|t| (t.kind, t.lexeme.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (TokenKind::Id, "x"),
                (TokenKind::Equal, "Dice"),
                (TokenKind::DataInt, "-12"),
                (TokenKind::Plus, "Inspira"),
                (TokenKind::DataDouble, "3.5"),
                (TokenKind::DelimLine, ";"),
            ]
        );
    }

    #[test]
    fn test_string_literal_keeps_spaces_and_quotes() {
        let tokens = LexicalAnalyzer::new()
            .tokenize("Se_Escribe \"hola, mundo\";")
            .unwrap();
        assert_eq!(tokens[1].kind, TokenKind::DataString);
        assert_eq!(tokens[1].lexeme, "\"hola, mundo\"");
        assert_eq!(tokens[2].kind, TokenKind::DelimLine);
    }

    #[test]
    fn test_lines_are_tracked() {
        let tokens = LexicalAnalyzer::new()
            .tokenize("Para p {\nEl x Puntual;\n\"a\nb\" }")
            .unwrap();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[3].line, 2);
        let string = tokens.iter().find(|t| t.kind == TokenKind::DataString).unwrap();
        assert_eq!(string.line, 3);
        // Newline inside the string still counts
        assert_eq!(tokens.last().map(|t| t.line), Some(4));
    }

    #[test]
    fn test_unterminated_string() {
        let result = LexicalAnalyzer::new().tokenize("Se_Escribe \"abc");
        assert_matches!(result, Err(LexerError::UnterminatedString { start_line: 1, .. }));
    }

    #[test]
    fn test_invalid_character() {
        let result = LexicalAnalyzer::new().tokenize("El x Puntual;\nx Dice 5 # 2;");
        assert_matches!(
            result,
            Err(LexerError::InvalidCharacter { character: '#', position }) if position.line == 2
        );
    }

    #[test]
    fn test_incomplete_tokens() {
        assert_matches!(
            LexicalAnalyzer::new().tokenize("x Dice 3. ;"),
            Err(LexerError::IncompleteToken { ref lexeme, .. }) if lexeme == "3."
        );
        assert_matches!(
            LexicalAnalyzer::new().tokenize("Sim"),
            Err(LexerError::IncompleteToken { ref lexeme, line: 1, .. }) if lexeme == "Sim"
        );
    }

    #[test]
    fn test_uppercase_identifier_is_rejected() {
        assert_matches!(
            LexicalAnalyzer::new().tokenize("Zeta"),
            Err(LexerError::InvalidCharacter { character: 'Z', .. })
        );
    }

    #[test]
    fn test_tokenizing_twice_is_identical() {
        let source = "Para p { El x Puntual; x Dice 1; } Fin";
        let first = LexicalAnalyzer::new().tokenize(source).unwrap();
        let second = LexicalAnalyzer::new().tokenize(source).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_metrics() {
        let mut analyzer = LexicalAnalyzer::new();
        analyzer.tokenize("El x Puntual;\nx Dice 5;").unwrap();
        let metrics = analyzer.metrics();

        assert_eq!(metrics.total_tokens, 8);
        assert_eq!(metrics.identifier_tokens, 2);
        assert_eq!(metrics.literal_tokens, 1);
        assert_eq!(metrics.delimiter_tokens, 2);
        assert_eq!(metrics.keyword_tokens, 3);
        assert_eq!(metrics.line_count, 2);
    }

    #[test]
    fn test_error_spans() {
        let error = LexicalAnalyzer::new().tokenize("x Dice 5 #").unwrap_err();
        let span = error.span().unwrap();
        assert_eq!(span.start.column, 10);
        assert_eq!(error.line(), Some(1));
        assert_eq!(error.error_code(), codes::lexical::INVALID_CHARACTER);
    }
}
