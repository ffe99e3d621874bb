//! Table-driven DFA for the token language
//!
//! Reserved words are inserted as chains of exact-character transitions
//! from the initial state, so the keyword table doubles as a trie. Literal
//! classes (identifiers, numbers, strings) use character-class transitions.
//! The automaton is built once and shared read-only between lexer runs.

use super::analyzer::LexerError;
use crate::tokens::{TokenKind, DELIMITERS, KEYWORDS};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::OnceLock;

pub type StateId = usize;

pub const INITIAL_STATE: StateId = 0;

/// Character classes usable as transition labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// `a`..=`z`
    Lowercase,
    /// `0`..=`9`
    Digit,
    /// `+` or `-`
    Sign,
    /// `.`
    Dot,
    /// Anything but `"`, only inside string literals
    StringBody,
}

impl CharClass {
    /// Classes other than `StringBody` that contain `ch`
    fn of(ch: char) -> Option<Self> {
        match ch {
            'a'..='z' => Some(Self::Lowercase),
            '0'..='9' => Some(Self::Digit),
            '+' | '-' => Some(Self::Sign),
            '.' => Some(Self::Dot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Exact(char),
    Class(CharClass),
}

#[derive(Debug, Clone, Default)]
pub struct Automaton {
    transitions: HashMap<(StateId, Symbol), StateId>,
    accepting: BTreeSet<StateId>,
    kinds: HashMap<StateId, TokenKind>,
    /// Accepting states that end the token as soon as they are entered
    terminal: HashSet<StateId>,
    /// States between the opening and closing quote of a string
    string_states: HashSet<StateId>,
    state_count: usize,
}

static SHARED: OnceLock<Automaton> = OnceLock::new();

impl Automaton {
    /// The process-wide automaton, built on first use
    pub fn shared() -> &'static Automaton {
        SHARED.get_or_init(Self::build)
    }

    /// Build the automaton from the keyword and delimiter tables
    pub fn build() -> Self {
        let mut builder = Builder::default();
        builder.new_state(); // initial state

        for (lexeme, kind) in KEYWORDS {
            builder.insert_word(lexeme, *kind);
        }

        for (ch, kind) in DELIMITERS {
            let state = builder.new_state();
            builder.add(INITIAL_STATE, Symbol::Exact(*ch), state);
            builder.accept(state, *kind);
            builder.automaton.terminal.insert(state);
        }

        // Identifiers: lowercase letter, then lowercase, digits or '_'
        let id = builder.new_state();
        builder.add(INITIAL_STATE, Symbol::Class(CharClass::Lowercase), id);
        builder.add(id, Symbol::Class(CharClass::Lowercase), id);
        builder.add(id, Symbol::Class(CharClass::Digit), id);
        builder.add(id, Symbol::Exact('_'), id);
        builder.accept(id, TokenKind::Id);

        // Numbers: optional sign, digits, optional '.' digits
        let sign = builder.new_state();
        let int = builder.new_state();
        let dot = builder.new_state();
        let double = builder.new_state();
        builder.add(INITIAL_STATE, Symbol::Class(CharClass::Sign), sign);
        builder.add(INITIAL_STATE, Symbol::Class(CharClass::Digit), int);
        builder.add(sign, Symbol::Class(CharClass::Digit), int);
        builder.add(int, Symbol::Class(CharClass::Digit), int);
        builder.add(int, Symbol::Class(CharClass::Dot), dot);
        builder.add(dot, Symbol::Class(CharClass::Digit), double);
        builder.add(double, Symbol::Class(CharClass::Digit), double);
        builder.accept(int, TokenKind::DataInt);
        builder.accept(double, TokenKind::DataDouble);

        // Strings: '"' body* '"'
        let open = builder.new_state();
        let body = builder.new_state();
        let closed = builder.new_state();
        builder.add(INITIAL_STATE, Symbol::Exact('"'), open);
        builder.add(open, Symbol::Class(CharClass::StringBody), body);
        builder.add(body, Symbol::Class(CharClass::StringBody), body);
        builder.add(open, Symbol::Exact('"'), closed);
        builder.add(body, Symbol::Exact('"'), closed);
        builder.accept(closed, TokenKind::DataString);
        builder.automaton.terminal.insert(closed);
        builder.automaton.string_states.extend([open, body]);

        builder.automaton
    }

    /// Next state for `ch`: exact character first, then its class
    pub fn step(&self, state: StateId, ch: char) -> Option<StateId> {
        if let Some(next) = self.transitions.get(&(state, Symbol::Exact(ch))) {
            return Some(*next);
        }
        if let Some(class) = CharClass::of(ch) {
            if let Some(next) = self.transitions.get(&(state, Symbol::Class(class))) {
                return Some(*next);
            }
        }
        if ch != '"' {
            return self
                .transitions
                .get(&(state, Symbol::Class(CharClass::StringBody)))
                .copied();
        }
        None
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    pub fn is_terminal(&self, state: StateId) -> bool {
        self.terminal.contains(&state)
    }

    pub fn is_inside_string(&self, state: StateId) -> bool {
        self.string_states.contains(&state)
    }

    /// Token kind bound to an accepting state
    pub fn kind_of(&self, state: StateId) -> Result<TokenKind, LexerError> {
        self.kinds
            .get(&state)
            .copied()
            .ok_or(LexerError::UnknownAcceptingState { state })
    }

    /// Every accepting state must be bound to a token kind
    pub fn validate(&self) -> Result<(), LexerError> {
        for state in &self.accepting {
            self.kind_of(*state)?;
        }
        Ok(())
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn accepting_count(&self) -> usize {
        self.accepting.len()
    }
}

#[derive(Default)]
struct Builder {
    automaton: Automaton,
}

impl Builder {
    fn new_state(&mut self) -> StateId {
        let id = self.automaton.state_count;
        self.automaton.state_count += 1;
        id
    }

    fn add(&mut self, from: StateId, symbol: Symbol, to: StateId) {
        self.automaton.transitions.insert((from, symbol), to);
    }

    fn accept(&mut self, state: StateId, kind: TokenKind) {
        self.automaton.accepting.insert(state);
        self.automaton.kinds.insert(state, kind);
    }

    /// Walk or extend the exact-character chain for `word`
    fn insert_word(&mut self, word: &str, kind: TokenKind) {
        let mut state = INITIAL_STATE;
        for ch in word.chars() {
            state = match self.automaton.transitions.get(&(state, Symbol::Exact(ch))) {
                Some(next) => *next,
                None => {
                    let next = self.new_state();
                    self.add(state, Symbol::Exact(ch), next);
                    next
                }
            };
        }
        self.accept(state, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(automaton: &Automaton, input: &str) -> Option<StateId> {
        input
            .chars()
            .try_fold(INITIAL_STATE, |state, ch| automaton.step(state, ch))
    }

    #[test]
    fn test_shared_automaton_is_valid() {
        let automaton = Automaton::shared();
        assert!(automaton.validate().is_ok());
        assert!(automaton.state_count() > KEYWORDS.len());
        assert!(automaton.accepting_count() >= KEYWORDS.len());
    }

    #[test]
    fn test_keywords_reach_their_kind() {
        let automaton = Automaton::build();
        for (lexeme, kind) in KEYWORDS {
            let state = run(&automaton, lexeme).unwrap();
            assert!(automaton.is_accepting(state), "{} not accepting", lexeme);
            assert_eq!(automaton.kind_of(state).unwrap(), *kind);
        }
    }

    #[test]
    fn test_keyword_prefixes_share_states() {
        let automaton = Automaton::build();
        let hasta = run(&automaton, "Hasta").unwrap();
        let hasta_que = run(&automaton, "Hasta_Que").unwrap();

        assert_eq!(automaton.kind_of(hasta).unwrap(), TokenKind::Through);
        assert_eq!(automaton.step(hasta, '_'), run(&automaton, "Hasta_"));
        assert_eq!(automaton.kind_of(hasta_que).unwrap(), TokenKind::Until);

        // "Sim" is a prefix of two keywords but not a token itself
        let sim = run(&automaton, "Sim").unwrap();
        assert!(!automaton.is_accepting(sim));
    }

    #[test]
    fn test_literal_classes() {
        let automaton = Automaton::build();
        let kind = |input: &str| {
            run(&automaton, input)
                .filter(|s| automaton.is_accepting(*s))
                .and_then(|s| automaton.kind_of(s).ok())
        };

        assert_eq!(kind("contador_2"), Some(TokenKind::Id));
        assert_eq!(kind("42"), Some(TokenKind::DataInt));
        assert_eq!(kind("-7"), Some(TokenKind::DataInt));
        assert_eq!(kind("3.14"), Some(TokenKind::DataDouble));
        assert_eq!(kind("\"hola mundo\""), Some(TokenKind::DataString));
        assert_eq!(kind("\"\""), Some(TokenKind::DataString));
        assert_eq!(kind("-"), None);
        assert_eq!(kind("3."), None);
        assert_eq!(run(&automaton, "_x"), None);
        assert_eq!(run(&automaton, "Zeta"), None);
    }

    #[test]
    fn test_delimiters_are_terminal() {
        let automaton = Automaton::build();
        for (ch, kind) in DELIMITERS {
            let state = automaton.step(INITIAL_STATE, *ch).unwrap();
            assert!(automaton.is_terminal(state));
            assert_eq!(automaton.kind_of(state).unwrap(), *kind);
        }
    }

    #[test]
    fn test_missing_kind_is_reported() {
        let mut automaton = Automaton::build();
        automaton.accepting.insert(9_999);
        assert!(matches!(
            automaton.validate(),
            Err(LexerError::UnknownAcceptingState { state: 9_999 })
        ));
    }
}
