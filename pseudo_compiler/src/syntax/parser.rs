//! Recursive-descent parser, one method per grammar non-terminal
//!
//! Every alternative is chosen from the current token alone (LL(1)). The
//! parser only validates; it builds no tree. Compound statements go through
//! [`Parser::nested`], which bounds nesting at `MAX_PARSE_DEPTH`.

use crate::config::constants::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::logging::codes;
use crate::syntax::error::{SyntaxError, SyntaxResult, END_OF_INPUT};
use crate::tokens::{Token, TokenCursor, TokenKind};
use crate::{log_debug, log_error, log_success};

/// Which statements a statement list admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementList {
    /// Process, function, if and else bodies (`Cont`)
    Body,
    /// Loop bodies: no declarations (`Contblo`)
    Loop,
    /// Switch cases: no declarations, no nested switch (`Contswi`)
    Case,
}

impl StatementList {
    /// FIRST set of a statement in this list
    pub fn starts_statement(self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Id
            | TokenKind::Write
            | TokenKind::Read
            | TokenKind::If
            | TokenKind::For
            | TokenKind::Repeat
            | TokenKind::While => true,
            TokenKind::Definir => self == StatementList::Body,
            TokenKind::Switch => self != StatementList::Case,
            _ => false,
        }
    }

    fn expected(self) -> &'static str {
        match self {
            StatementList::Body => "DEFINIR, ID, WRITE, READ, IF, FOR, REPEAT, WHILE, or SWITCH",
            StatementList::Loop => "ID, WRITE, READ, IF, FOR, REPEAT, WHILE, or SWITCH",
            StatementList::Case => "ID, WRITE, READ, IF, FOR, REPEAT, or WHILE",
        }
    }
}

pub struct Parser<'a> {
    cursor: TokenCursor<'a>,
    depth: usize,
    deepest: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            depth: 0,
            deepest: 0,
        }
    }

    /// Tokens consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor.position()
    }

    /// Deepest statement nesting seen
    pub fn deepest_nesting(&self) -> usize {
        self.deepest
    }

    /// Parse a whole program; the token slice must be consumed entirely
    pub fn parse_program(&mut self) -> SyntaxResult<()> {
        log_debug!("Starting syntax analysis", "tokens" => self.cursor.len());

        let result = self.complete(Self::program);

        match &result {
            Ok(()) => {
                log_success!(codes::success::SYNTAX_VALIDATION_PASSED, "Syntax analysis passed",
                    "tokens" => self.cursor.len(),
                    "max_nesting" => self.deepest
                );
            }
            Err(error) => match error.span() {
                Some(span) => log_error!(error.error_code(), &error.to_string(), span = span,
                    "position" => self.cursor.position()),
                None => log_error!(error.error_code(), &error.to_string()),
            },
        }

        result
    }

    /// Parse a bare statement list (`Cont`) with nothing around it
    pub fn parse_statements(&mut self) -> SyntaxResult<()> {
        self.complete(|parser| parser.statements(StatementList::Body))
    }

    fn complete(&mut self, production: impl FnOnce(&mut Self) -> SyntaxResult<()>) -> SyntaxResult<()> {
        if self.cursor.is_empty() {
            return Err(SyntaxError::EmptyTokenStream);
        }

        production(self)?;

        match self.cursor.current() {
            None => Ok(()),
            Some(token) => Err(SyntaxError::UnexpectedTrailingTokens {
                found: token.kind.as_str().to_string(),
                line: token.line,
                position: self.cursor.position(),
                span: token.span,
            }),
        }
    }

    // === PRIMITIVES ===

    fn error(&self, expected: &str) -> SyntaxError {
        let found = self
            .cursor
            .current_kind()
            .map(|kind| kind.as_str())
            .unwrap_or(END_OF_INPUT);
        SyntaxError::mismatch(
            expected,
            found,
            self.cursor.current_line(),
            self.cursor.position(),
            self.cursor.current_span(),
        )
    }

    fn expect(&mut self, kind: TokenKind) -> SyntaxResult<&'a Token> {
        match self.cursor.advance_if(kind) {
            Some(token) => Ok(token),
            None => Err(self.error(kind.as_str())),
        }
    }

    /// Consume the current token if `accepts` holds for its kind
    fn expect_where(&mut self, accepts: fn(&TokenKind) -> bool, expected: &str) -> SyntaxResult<()> {
        match self.cursor.current_kind() {
            Some(kind) if accepts(&kind) => {
                self.cursor.advance();
                Ok(())
            }
            _ => Err(self.error(expected)),
        }
    }

    fn nested(&mut self, production: fn(&mut Self) -> SyntaxResult<()>) -> SyntaxResult<()> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(SyntaxError::MaxRecursionDepth {
                depth: MAX_PARSE_DEPTH,
                line: self.cursor.current_line(),
                span: self.cursor.current_span(),
            });
        }

        self.depth += 1;
        self.deepest = self.deepest.max(self.depth);
        let result = production(self);
        self.depth -= 1;
        result
    }

    /// `{ list }`
    fn block(&mut self, list: StatementList) -> SyntaxResult<()> {
        self.expect(TokenKind::DelimLkey)?;
        self.statements(list)?;
        self.expect(TokenKind::DelimRkey)?;
        Ok(())
    }

    // === PROGRAM STRUCTURE ===

    /// Program := Class {Func}
    fn program(&mut self) -> SyntaxResult<()> {
        self.class()?;
        while self.cursor.check(TokenKind::Function) {
            self.func()?;
        }
        Ok(())
    }

    /// Class := PROCESS ID { Cont } END_PROCESS
    fn class(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Process)?;
        self.expect(TokenKind::Id)?;
        self.block(StatementList::Body)?;
        self.expect(TokenKind::EndProcess)?;
        Ok(())
    }

    /// Func := FUNCTION ID EQUAL ID ( Varmul ) { Cont } END_FUNCTION
    fn func(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Function)?;
        self.expect(TokenKind::Id)?;
        self.expect(TokenKind::Equal)?;
        self.expect(TokenKind::Id)?;
        self.expect(TokenKind::DelimLparen)?;
        self.varmul()?;
        self.expect(TokenKind::DelimRparen)?;
        self.block(StatementList::Body)?;
        self.expect(TokenKind::EndFunction)?;
        Ok(())
    }

    /// One or more statements admitted by `list`
    fn statements(&mut self, list: StatementList) -> SyntaxResult<()> {
        self.statement(list)?;
        while self
            .cursor
            .current_kind()
            .is_some_and(|kind| list.starts_statement(kind))
        {
            self.statement(list)?;
        }
        Ok(())
    }

    fn statement(&mut self, list: StatementList) -> SyntaxResult<()> {
        match self.cursor.current_kind() {
            Some(kind) if list.starts_statement(kind) => match kind {
                TokenKind::Definir => self.defi(),
                TokenKind::Id => self.asig(),
                TokenKind::Write => self.impr(),
                TokenKind::Read => self.lect(),
                TokenKind::If => self.nested(Self::condif),
                TokenKind::For => self.nested(Self::cycle_for),
                TokenKind::Repeat => self.nested(Self::cycle_repeat),
                TokenKind::While => self.nested(Self::cycle_while),
                TokenKind::Switch => self.nested(Self::multselec),
                _ => Err(self.error(list.expected())),
            },
            _ => Err(self.error(list.expected())),
        }
    }

    // === CONTROL FLOW ===

    /// IF ( Exprelog ) THEN { Cont } (ELSE { Cont } END_IF | END_IF)
    fn condif(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::DelimLparen)?;
        self.exprelog()?;
        self.expect(TokenKind::DelimRparen)?;
        self.expect(TokenKind::Then)?;
        self.block(StatementList::Body)?;

        match self.cursor.current_kind() {
            Some(TokenKind::Else) => {
                self.cursor.advance();
                self.block(StatementList::Body)?;
                self.expect(TokenKind::EndIf)?;
                Ok(())
            }
            Some(TokenKind::EndIf) => {
                self.cursor.advance();
                Ok(())
            }
            _ => Err(self.error("ELSE or END_IF")),
        }
    }

    /// FOR ID EQUAL DATA_INT THROUGH DATA_INT RATE DATA_INT DO_FOR { Contblo } END_FOR
    fn cycle_for(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::Id)?;
        self.expect(TokenKind::Equal)?;
        self.expect(TokenKind::DataInt)?;
        self.expect(TokenKind::Through)?;
        self.expect(TokenKind::DataInt)?;
        self.expect(TokenKind::Rate)?;
        self.expect(TokenKind::DataInt)?;
        self.expect(TokenKind::DoFor)?;
        self.block(StatementList::Loop)?;
        self.expect(TokenKind::EndFor)?;
        Ok(())
    }

    /// REPEAT { Contblo } UNTIL ( Exprelog )
    fn cycle_repeat(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Repeat)?;
        self.block(StatementList::Loop)?;
        self.expect(TokenKind::Until)?;
        self.expect(TokenKind::DelimLparen)?;
        self.exprelog()?;
        self.expect(TokenKind::DelimRparen)?;
        Ok(())
    }

    /// WHILE ( Exprelog ) DO { Contblo } END_WHILE
    fn cycle_while(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::DelimLparen)?;
        self.exprelog()?;
        self.expect(TokenKind::DelimRparen)?;
        self.expect(TokenKind::Do)?;
        self.block(StatementList::Loop)?;
        self.expect(TokenKind::EndWhile)?;
        Ok(())
    }

    /// SWITCH ( ID ) SELECT {DATA_INT : { Contswi }} DEFAULT : { Contswi }
    fn multselec(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Switch)?;
        self.expect(TokenKind::DelimLparen)?;
        self.expect(TokenKind::Id)?;
        self.expect(TokenKind::DelimRparen)?;
        self.expect(TokenKind::Select)?;

        while self.cursor.advance_if(TokenKind::DataInt).is_some() {
            self.expect(TokenKind::DelimEnter)?;
            self.block(StatementList::Case)?;
        }

        self.expect(TokenKind::Default)?;
        self.expect(TokenKind::DelimEnter)?;
        self.block(StatementList::Case)?;
        Ok(())
    }

    // === LOGICAL EXPRESSIONS ===

    /// Exprelog := Log {(AND|OR|NOT) Log}
    fn exprelog(&mut self) -> SyntaxResult<()> {
        self.log()?;
        while self.cursor.current_kind().is_some_and(|kind| kind.is_logical()) {
            self.cursor.advance();
            self.log()?;
        }
        Ok(())
    }

    /// Log := (ID | number) relop (ID | number)
    fn log(&mut self) -> SyntaxResult<()> {
        self.expect_where(
            |kind| *kind == TokenKind::Id || kind.is_number(),
            "ID, DATA_INT, or DATA_DOUBLE",
        )?;
        self.expect_where(TokenKind::is_relational, "Comparison operator")?;
        self.valorlog()
    }

    fn valorlog(&mut self) -> SyntaxResult<()> {
        self.expect_where(
            |kind| *kind == TokenKind::Id || kind.is_number(),
            "ID or numeric value",
        )
    }

    // === SIMPLE STATEMENTS ===

    /// Asig := ID EQUAL (Expremath | Exprestring | TRUE | FALSE | Expression) ;
    fn asig(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Id)?;
        self.expect(TokenKind::Equal)?;

        match self.cursor.current_kind() {
            Some(kind) if kind.is_number() || kind.is_math_function() => self.expremath()?,
            Some(TokenKind::DataString) => self.exprestring()?,
            Some(kind) if kind.is_boolean_literal() => {
                self.cursor.advance();
            }
            Some(TokenKind::Id) => self.expression()?,
            _ => return Err(self.error("Expression")),
        }

        self.expect(TokenKind::DelimLine)?;
        Ok(())
    }

    /// Expremath := number [arith (ID|number)] | mathfn ( ID )
    fn expremath(&mut self) -> SyntaxResult<()> {
        match self.cursor.current_kind() {
            Some(kind) if kind.is_number() => {
                self.cursor.advance();
                if self.cursor.current_kind().is_some_and(|kind| kind.is_arithmetic()) {
                    self.cursor.advance();
                    self.valorlog()?;
                }
                Ok(())
            }
            Some(kind) if kind.is_math_function() => {
                self.cursor.advance();
                self.expect(TokenKind::DelimLparen)?;
                self.expect(TokenKind::Id)?;
                self.expect(TokenKind::DelimRparen)?;
                Ok(())
            }
            _ => Err(self.error("DATA_INT, DATA_DOUBLE, or Math Function")),
        }
    }

    /// Exprestring := DATA_STRING [PLUS (ID|DATA_STRING)]
    fn exprestring(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::DataString)?;
        if self.cursor.advance_if(TokenKind::Plus).is_some() {
            self.expect_where(
                |kind| matches!(kind, TokenKind::Id | TokenKind::DataString),
                "ID or DATA_STRING",
            )?;
        }
        Ok(())
    }

    /// Expression := ID [( Varmul ) | arith (ID|number|DATA_STRING)]
    fn expression(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Id)?;

        match self.cursor.current_kind() {
            Some(TokenKind::DelimLparen) => {
                self.cursor.advance();
                self.varmul()?;
                self.expect(TokenKind::DelimRparen)?;
            }
            Some(kind) if kind.is_arithmetic() => {
                self.cursor.advance();
                self.expect_where(
                    |kind| {
                        matches!(kind, TokenKind::Id | TokenKind::DataString) || kind.is_number()
                    },
                    "ID, numeric value, or string",
                )?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Impr := WRITE (value|ID) {, (value|ID)} ;
    fn impr(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Write)?;
        self.expect_where(
            |kind| *kind == TokenKind::Id || kind.is_printable_value(),
            "Value or ID",
        )?;
        while self.cursor.advance_if(TokenKind::DelimComma).is_some() {
            self.expect_where(
                |kind| *kind == TokenKind::Id || kind.is_printable_value(),
                "ID or Value",
            )?;
        }
        self.expect(TokenKind::DelimLine)?;
        Ok(())
    }

    /// Lect := READ ID ;
    fn lect(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Read)?;
        self.expect(TokenKind::Id)?;
        self.expect(TokenKind::DelimLine)?;
        Ok(())
    }

    /// Defi := DEFINIR ID type ;
    fn defi(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Definir)?;
        self.expect(TokenKind::Id)?;
        self.expect_where(TokenKind::is_type_keyword, "INT, REAL, BOOL, CHAR, or STRING")?;
        self.expect(TokenKind::DelimLine)?;
        Ok(())
    }

    /// Varmul := ID {, ID}
    fn varmul(&mut self) -> SyntaxResult<()> {
        self.expect(TokenKind::Id)?;
        while self.cursor.advance_if(TokenKind::DelimComma).is_some() {
            self.expect(TokenKind::Id)?;
        }
        Ok(())
    }
}
