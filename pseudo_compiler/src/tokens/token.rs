//! Token kinds, the keyword lexeme table, and the token record
use crate::utils::Span;
use serde::Serialize;
use std::fmt;

/// Closed set of lexical categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub enum TokenKind {
    // Program structure
    Process,
    EndProcess,
    Definir,
    Function,
    EndFunction,

    // Types
    Int,
    Real,
    Bool,
    Char,
    String,

    // Statements
    Write,
    Read,
    If,
    Then,
    Else,
    EndIf,
    For,
    Through,
    Rate,
    DoFor,
    EndFor,
    Repeat,
    Until,
    While,
    Do,
    EndWhile,
    Switch,
    Select,
    Default,
    EndSwitch,

    // Assignment and relational operators
    Equal,
    Less,
    More,
    Same,
    LessSame,
    MoreSame,
    Diff,

    // Arithmetic operators
    Plus,
    Minus,
    Mult,
    Div,
    Modulo,
    Exp,

    // Logical operators
    And,
    Or,
    Not,

    // Math functions
    FunSqrt,
    FunAbs,
    FunLn,
    FunExp,
    FunSen,
    FunCos,
    FunAtan,
    FunTrunc,
    FunRound,
    FunRand,

    // Delimiters
    DelimLine,
    DelimEnter,
    DelimLparen,
    DelimRparen,
    DelimComma,
    DelimLkey,
    DelimRkey,

    // Literals
    True,
    False,
    DataString,
    Id,
    DataInt,
    DataDouble,
}

impl TokenKind {
    /// Canonical name used in diagnostics and the token dump
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "PROCESS",
            Self::EndProcess => "END_PROCESS",
            Self::Definir => "DEFINIR",
            Self::Function => "FUNCTION",
            Self::EndFunction => "END_FUNCTION",
            Self::Int => "INT",
            Self::Real => "REAL",
            Self::Bool => "BOOL",
            Self::Char => "CHAR",
            Self::String => "STRING",
            Self::Write => "WRITE",
            Self::Read => "READ",
            Self::If => "IF",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::EndIf => "END_IF",
            Self::For => "FOR",
            Self::Through => "THROUGH",
            Self::Rate => "RATE",
            Self::DoFor => "DO_FOR",
            Self::EndFor => "END_FOR",
            Self::Repeat => "REPEAT",
            Self::Until => "UNTIL",
            Self::While => "WHILE",
            Self::Do => "DO",
            Self::EndWhile => "END_WHILE",
            Self::Switch => "SWITCH",
            Self::Select => "SELECT",
            Self::Default => "DEFAULT",
            Self::EndSwitch => "END_SWITCH",
            Self::Equal => "EQUAL",
            Self::Less => "LESS",
            Self::More => "MORE",
            Self::Same => "SAME",
            Self::LessSame => "LESS_SAME",
            Self::MoreSame => "MORE_SAME",
            Self::Diff => "DIFF",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Mult => "MULT",
            Self::Div => "DIV",
            Self::Modulo => "MODULO",
            Self::Exp => "EXP",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::FunSqrt => "FUN_SQRT",
            Self::FunAbs => "FUN_ABS",
            Self::FunLn => "FUN_LN",
            Self::FunExp => "FUN_EXP",
            Self::FunSen => "FUN_SEN",
            Self::FunCos => "FUN_COS",
            Self::FunAtan => "FUN_ATAN",
            Self::FunTrunc => "FUN_TRUNC",
            Self::FunRound => "FUN_ROUND",
            Self::FunRand => "FUN_RAND",
            Self::DelimLine => "DELIM_LINE",
            Self::DelimEnter => "DELIM_ENTER",
            Self::DelimLparen => "DELIM_LPAREN",
            Self::DelimRparen => "DELIM_RPAREN",
            Self::DelimComma => "DELIM_COMMA",
            Self::DelimLkey => "DELIM_LKEY",
            Self::DelimRkey => "DELIM_RKEY",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::DataString => "DATA_STRING",
            Self::Id => "ID",
            Self::DataInt => "DATA_INT",
            Self::DataDouble => "DATA_DOUBLE",
        }
    }

    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Real | Self::Bool | Self::Char | Self::String
        )
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::Less | Self::More | Self::Same | Self::LessSame | Self::MoreSame | Self::Diff
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Plus | Self::Minus | Self::Mult | Self::Div | Self::Modulo | Self::Exp
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Not)
    }

    pub fn is_math_function(&self) -> bool {
        matches!(
            self,
            Self::FunSqrt
                | Self::FunAbs
                | Self::FunLn
                | Self::FunExp
                | Self::FunSen
                | Self::FunCos
                | Self::FunAtan
                | Self::FunTrunc
                | Self::FunRound
                | Self::FunRand
        )
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::DataInt | Self::DataDouble)
    }

    pub fn is_boolean_literal(&self) -> bool {
        matches!(self, Self::True | Self::False)
    }

    /// Literal values accepted by `WRITE`
    pub fn is_printable_value(&self) -> bool {
        self.is_number() || self.is_boolean_literal() || *self == Self::DataString
    }

    /// Single-character tokens that end as soon as they are read
    pub fn is_delimiter(&self) -> bool {
        matches!(
            self,
            Self::DelimLine
                | Self::DelimEnter
                | Self::DelimLparen
                | Self::DelimRparen
                | Self::DelimComma
                | Self::DelimLkey
                | Self::DelimRkey
        )
    }
}

impl From<TokenKind> for &'static str {
    fn from(kind: TokenKind) -> Self {
        kind.as_str()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surface lexemes of the reserved words
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("Para", TokenKind::Process),
    ("Fin", TokenKind::EndProcess),
    ("El", TokenKind::Definir),
    ("La", TokenKind::Definir),
    ("Funcion", TokenKind::Function),
    ("Fin_Funcion", TokenKind::EndFunction),
    ("Puntual", TokenKind::Int),
    ("Eminente", TokenKind::Real),
    ("Simple", TokenKind::Bool),
    ("Singular", TokenKind::Char),
    ("Versatil", TokenKind::String),
    ("Se_Escribe", TokenKind::Write),
    ("Escucha", TokenKind::Read),
    ("Si", TokenKind::If),
    ("Entonces", TokenKind::Then),
    ("Sino", TokenKind::Else),
    ("Fin_Si", TokenKind::EndIf),
    ("De", TokenKind::For),
    ("Hasta", TokenKind::Through),
    ("Con", TokenKind::Rate),
    ("Visitar", TokenKind::DoFor),
    ("Se_Sienta", TokenKind::EndFor),
    ("Repetir", TokenKind::Repeat),
    ("Hasta_Que", TokenKind::Until),
    ("Mientras", TokenKind::While),
    ("Canta", TokenKind::Do),
    ("Se_Culmina", TokenKind::EndWhile),
    ("Cuando", TokenKind::Switch),
    ("Decida", TokenKind::Select),
    ("Rendirse", TokenKind::Default),
    ("Se_Retira", TokenKind::EndSwitch),
    ("Dice", TokenKind::Equal),
    ("Convence", TokenKind::Less),
    ("Disuade", TokenKind::More),
    ("Entiende", TokenKind::Same),
    ("Envidia", TokenKind::LessSame),
    ("Empatiza", TokenKind::MoreSame),
    ("Difiere", TokenKind::Diff),
    ("Inspira", TokenKind::Plus),
    ("Elimina", TokenKind::Minus),
    ("Abraza", TokenKind::Mult),
    ("Comparte", TokenKind::Div),
    ("Reparte", TokenKind::Modulo),
    ("Invierte", TokenKind::Exp),
    ("Y", TokenKind::And),
    ("O", TokenKind::Or),
    ("Ni", TokenKind::Not),
    ("Verdad", TokenKind::True),
    ("Mentira", TokenKind::False),
    ("Fragmenta", TokenKind::FunSqrt),
    ("Absoluto", TokenKind::FunAbs),
    ("Explora", TokenKind::FunLn),
    ("Crece", TokenKind::FunExp),
    ("Seno", TokenKind::FunSen),
    ("Coseno", TokenKind::FunCos),
    ("Arco", TokenKind::FunAtan),
    ("Trunca", TokenKind::FunTrunc),
    ("Simplifica", TokenKind::FunRound),
    ("Chance", TokenKind::FunRand),
];

/// Delimiter characters and their kinds
pub const DELIMITERS: &[(char, TokenKind)] = &[
    (';', TokenKind::DelimLine),
    (':', TokenKind::DelimEnter),
    ('(', TokenKind::DelimLparen),
    (')', TokenKind::DelimRparen),
    (',', TokenKind::DelimComma),
    ('{', TokenKind::DelimLkey),
    ('}', TokenKind::DelimRkey),
];

/// Look up a reserved word by its exact lexeme
pub fn keyword_kind(lexeme: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == lexeme)
        .map(|(_, kind)| *kind)
}

/// An immutable lexical unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text, quotes included for strings
    pub lexeme: String,
    /// 1-based line of the first character
    pub line: u32,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line: span.start.line,
            span,
        }
    }

    /// Token without source position, for tests and synthesized streams
    pub fn synthetic(kind: TokenKind, lexeme: impl Into<String>, line: u32) -> Self {
        let pos = crate::utils::Position::new(0, line, 1);
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            span: Span::point(pos),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}('{}') at line {}", self.kind, self.lexeme, self.line)
    }
}
