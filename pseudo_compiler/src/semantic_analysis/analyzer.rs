//! Single-pass semantic walker
//!
//! Walks the token sequence once with the scope stack kept in step with the
//! braces: `{` opens a frame and `}` closes it. Statements are recognised by
//! their first token; anything else is stepped over. The walker tolerates
//! malformed input and never fails, it only collects diagnostics.

use super::type_checker::{TypeChecker, TypeRule};
use super::types::SemanticError;
use crate::config::constants::compile_time::semantic::MAX_SEMANTIC_ERRORS;
use crate::config::runtime::SemanticPreferences;
use crate::symbols::{DataType, EntryRef, SymbolTable};
use crate::tokens::{Token, TokenCursor, TokenKind};
use crate::{log_debug, log_error};

/// Function whose header has been read and whose body is open or pending
#[derive(Debug)]
struct OpenFunction {
    /// `None` when the name was a duplicate; the body is still checked
    entry: Option<EntryRef>,
    return_variable: String,
    /// Declared when the body's opening brace is reached
    params: Vec<(String, u32)>,
    body_depth: Option<usize>,
}

pub struct SemanticAnalyzer<'a> {
    cursor: TokenCursor<'a>,
    table: SymbolTable,
    diagnostics: Vec<SemanticError>,
    preferences: SemanticPreferences,
    function: Option<OpenFunction>,
    /// Opening braces refused by the depth limit and not yet closed
    overflow: usize,
    stopped: bool,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_preferences(tokens, SemanticPreferences::default())
    }

    pub fn with_preferences(tokens: &'a [Token], preferences: SemanticPreferences) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            table: SymbolTable::new(),
            diagnostics: Vec::new(),
            preferences,
            function: None,
            overflow: 0,
            stopped: false,
        }
    }

    /// Walk every token and hand back the table and the diagnostics
    pub fn run(mut self) -> (SymbolTable, Vec<SemanticError>) {
        while let Some(token) = self.cursor.current() {
            if self.stopped {
                break;
            }
            match token.kind {
                TokenKind::Definir => self.declaration(),
                TokenKind::Function => self.function_header(),
                TokenKind::Id if self.cursor.peek_kind(1) == Some(TokenKind::Equal) => {
                    self.assignment()
                }
                TokenKind::Read => self.read(),
                TokenKind::Write => self.write(),
                TokenKind::If => self.condition_statement("IF condition"),
                TokenKind::While => self.condition_statement("WHILE condition"),
                TokenKind::Until => self.condition_statement("UNTIL condition"),
                TokenKind::For => self.for_loop(),
                TokenKind::Switch => self.switch(),
                TokenKind::DelimLkey => self.open_block(),
                TokenKind::DelimRkey => self.close_block(),
                _ => {
                    self.cursor.advance();
                }
            }
        }

        log_debug!("Semantic walk finished",
            "tokens" => self.cursor.len(),
            "diagnostics" => self.diagnostics.len(),
            "depth" => self.table.current_depth());

        (self.table, self.diagnostics)
    }

    // ---------------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------------

    fn report(&mut self, error: SemanticError) {
        if self.stopped {
            return;
        }

        if self.diagnostics.len() >= MAX_SEMANTIC_ERRORS {
            let sentinel = SemanticError::TooManyErrors {
                limit: MAX_SEMANTIC_ERRORS,
            };
            log_error!(sentinel.error_code(), &sentinel.to_string(),
                "limit" => MAX_SEMANTIC_ERRORS);
            self.diagnostics.push(sentinel);
            self.stopped = true;
            return;
        }

        if self.preferences.log_each_diagnostic {
            match error.span() {
                Some(span) => log_error!(error.error_code(), &error.to_string(), span = span,
                    "kind" => error.kind()),
                None => log_error!(error.error_code(), &error.to_string(),
                    "kind" => error.kind()),
            }
        }
        self.diagnostics.push(error);
    }

    fn report_rule(&mut self, rule: TypeRule, context: &str, at: &Token) -> Option<DataType> {
        match rule {
            Ok(data_type) => Some(data_type),
            Err(violation) => {
                self.report(SemanticError::type_mismatch(
                    context,
                    violation.expected,
                    &violation.found,
                    at.line,
                    at.span,
                ));
                None
            }
        }
    }

    fn undeclared(&mut self, token: &Token) {
        self.report(SemanticError::UndeclaredIdentifier {
            name: token.lexeme.clone(),
            line: token.line,
            span: token.span,
        });
    }

    // ---------------------------------------------------------------------
    // Scopes
    // ---------------------------------------------------------------------

    fn open_block(&mut self) {
        let Some(brace) = self.cursor.advance() else {
            return;
        };

        if self.overflow > 0 {
            self.overflow += 1;
            return;
        }

        match self.table.enter_scope() {
            Ok(depth) => {
                let params = match self.function.as_mut() {
                    Some(function) if function.body_depth.is_none() => {
                        function.body_depth = Some(depth);
                        std::mem::take(&mut function.params)
                    }
                    _ => Vec::new(),
                };
                for (name, line) in params {
                    if let Err(duplicate) = self.table.declare_variable(&name, DataType::Int, line, true)
                    {
                        self.report(SemanticError::duplicate(duplicate, brace.span));
                    }
                }
            }
            Err(exceeded) => {
                self.overflow = 1;
                self.report(SemanticError::ScopeDepthExceeded {
                    limit: exceeded.limit,
                    line: brace.line,
                    span: brace.span,
                });
            }
        }
    }

    fn close_block(&mut self) {
        self.cursor.advance();

        if self.overflow > 0 {
            self.overflow -= 1;
            return;
        }

        let depth = self.table.current_depth();
        if self
            .function
            .as_ref()
            .is_some_and(|function| function.body_depth == Some(depth))
        {
            self.function = None;
        }
        self.table.exit_scope();
    }

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------

    /// DEFINIR ID type
    fn declaration(&mut self) {
        self.cursor.advance();
        let Some(name) = self.cursor.advance_if(TokenKind::Id) else {
            return;
        };
        let Some(data_type) = self
            .cursor
            .current_kind()
            .and_then(DataType::from_keyword)
        else {
            return;
        };
        self.cursor.advance();

        match self
            .table
            .declare_variable(&name.lexeme, data_type, name.line, false)
        {
            Ok(_) => {
                log_debug!("Variable declared",
                    "name" => name.lexeme,
                    "type" => data_type,
                    "scope" => self.table.current_depth());
                self.update_return_type(&name.lexeme, data_type);
            }
            Err(duplicate) => self.report(SemanticError::duplicate(duplicate, name.span)),
        }
    }

    /// Only a declaration directly in the body frame sets the return type
    fn update_return_type(&mut self, name: &str, data_type: DataType) {
        let Some(function) = self.function.as_ref() else {
            return;
        };
        if function.body_depth != Some(self.table.current_depth())
            || function.return_variable != name
        {
            return;
        }
        let Some(entry) = function.entry else {
            return;
        };
        if let Some(record) = self.table.get_mut(entry) {
            record.data_type = data_type;
        }
    }

    /// FUNCTION retvar EQUAL name ( params )
    fn function_header(&mut self) {
        self.cursor.advance();
        let Some(return_variable) = self.cursor.advance_if(TokenKind::Id) else {
            return;
        };
        if self.cursor.advance_if(TokenKind::Equal).is_none() {
            return;
        }
        let Some(name) = self.cursor.advance_if(TokenKind::Id) else {
            return;
        };

        let mut params = Vec::new();
        if self.cursor.advance_if(TokenKind::DelimLparen).is_some() {
            while let Some(token) = self.cursor.current() {
                match token.kind {
                    TokenKind::Id => params.push((token.lexeme.clone(), token.line)),
                    TokenKind::DelimComma => {}
                    TokenKind::DelimRparen => {
                        self.cursor.advance();
                        break;
                    }
                    _ => break,
                }
                self.cursor.advance();
            }
        }

        let names = params.iter().map(|(param, _)| param.clone()).collect();
        let entry = match self
            .table
            .declare_function(&name.lexeme, DataType::Int, names, name.line)
        {
            Ok(entry) => {
                if let Some(record) = self.table.get_mut(entry) {
                    record.return_variable = Some(return_variable.lexeme.clone());
                }
                log_debug!("Function declared",
                    "name" => name.lexeme,
                    "params" => params.len());
                Some(entry)
            }
            Err(duplicate) => {
                self.report(SemanticError::duplicate(duplicate, name.span));
                None
            }
        };

        self.function = Some(OpenFunction {
            entry,
            return_variable: return_variable.lexeme.clone(),
            params,
            body_depth: None,
        });
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    /// ID EQUAL expression
    fn assignment(&mut self) {
        let Some(target) = self.cursor.advance() else {
            return;
        };
        self.cursor.advance();

        let resolved = self.table.resolve(&target.lexeme);
        let value = self.expression();

        let Some(entry) = resolved else {
            self.undeclared(target);
            return;
        };
        self.record_usage(entry, target.line);

        let Some((is_function, declared)) = self
            .table
            .get(entry)
            .map(|record| (record.is_function(), record.data_type))
        else {
            return;
        };

        if is_function {
            self.report(SemanticError::AssignmentToFunction {
                name: target.lexeme.clone(),
                line: target.line,
                span: target.span,
            });
            return;
        }

        let Some(value) = value else {
            return;
        };
        if TypeChecker::is_assignable(declared, value) {
            self.table.mark_assigned(entry);
        } else {
            self.report(SemanticError::IncompatibleAssignment {
                name: target.lexeme.clone(),
                target: declared,
                value,
                line: target.line,
                span: target.span,
            });
        }
    }

    /// READ ID: an implicit assignment without type evaluation
    fn read(&mut self) {
        self.cursor.advance();
        let Some(target) = self.cursor.advance_if(TokenKind::Id) else {
            return;
        };
        self.store_into(target);
    }

    /// WRITE (value | ID) {, (value | ID)}
    fn write(&mut self) {
        self.cursor.advance();
        while let Some(token) = self.cursor.current() {
            match token.kind {
                TokenKind::Id => {
                    self.cursor.advance();
                    self.use_variable(token);
                }
                TokenKind::DelimComma => {
                    self.cursor.advance();
                }
                kind if kind.is_printable_value() => {
                    self.cursor.advance();
                }
                _ => break,
            }
        }
    }

    /// IF / WHILE / UNTIL followed by a parenthesised condition
    fn condition_statement(&mut self, context: &str) {
        let Some(keyword) = self.cursor.advance() else {
            return;
        };
        if self.cursor.advance_if(TokenKind::DelimLparen).is_none() {
            return;
        }
        if let Some(found) = self.condition() {
            self.report_rule(TypeChecker::condition(found), context, keyword);
        }
        self.cursor.advance_if(TokenKind::DelimRparen);
    }

    /// FOR ID EQUAL start THROUGH end RATE step
    fn for_loop(&mut self) {
        self.cursor.advance();
        let Some(control) = self.cursor.advance_if(TokenKind::Id) else {
            return;
        };
        self.store_value(control, DataType::Int);

        if self.cursor.advance_if(TokenKind::Equal).is_none() {
            return;
        }
        self.for_bound("FOR start");
        if self.cursor.advance_if(TokenKind::Through).is_none() {
            return;
        }
        self.for_bound("FOR end");
        if self.cursor.advance_if(TokenKind::Rate).is_none() {
            return;
        }
        self.for_bound("FOR step");
    }

    fn for_bound(&mut self, context: &str) {
        let Some(at) = self.cursor.current() else {
            return;
        };
        if let Some(found) = self.operand() {
            self.report_rule(TypeChecker::for_bound(found), context, at);
        }
    }

    /// SWITCH ( ID )
    fn switch(&mut self) {
        self.cursor.advance();
        if self.cursor.advance_if(TokenKind::DelimLparen).is_none() {
            return;
        }
        let Some(selector) = self.cursor.advance_if(TokenKind::Id) else {
            return;
        };
        if let Some(found) = self.use_variable(selector) {
            self.report_rule(TypeChecker::switch_selector(found), "SWITCH selector", selector);
        }
        self.cursor.advance_if(TokenKind::DelimRparen);
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    /// Operand {arith operand}; `None` when the type is unknown or wrong
    fn expression(&mut self) -> Option<DataType> {
        let mut left = self.operand();
        while let Some(op) = self
            .cursor
            .current()
            .filter(|token| token.kind.is_arithmetic())
        {
            self.cursor.advance();
            let right = self.operand();
            left = match (left, right) {
                (Some(l), Some(r)) => {
                    let context = format!("operator {}", op.lexeme);
                    self.report_rule(TypeChecker::arithmetic(op.kind, l, r), &context, op)
                }
                _ => None,
            };
        }
        left
    }

    /// Literal, identifier, call or math function
    fn operand(&mut self) -> Option<DataType> {
        let token = self.cursor.current()?;
        match token.kind {
            TokenKind::Id => {
                self.cursor.advance();
                if self.cursor.check(TokenKind::DelimLparen) {
                    self.call(token)
                } else {
                    self.use_variable(token)
                }
            }
            kind if kind.is_math_function() => {
                self.cursor.advance();
                self.cursor.advance_if(TokenKind::DelimLparen)?;
                let argument = self.operand();
                self.cursor.advance_if(TokenKind::DelimRparen);
                let context = format!("{} argument", token.lexeme);
                self.report_rule(TypeChecker::math_function(argument?), &context, token)
            }
            kind => {
                let data_type = DataType::of_literal(kind)?;
                self.cursor.advance();
                Some(data_type)
            }
        }
    }

    /// name ( ID {, ID} ): the function's current return type
    fn call(&mut self, name: &'a Token) -> Option<DataType> {
        self.cursor.advance();
        let mut arguments = 0;
        while let Some(token) = self.cursor.current() {
            match token.kind {
                TokenKind::Id => {
                    arguments += 1;
                    self.cursor.advance();
                    self.use_variable(token);
                }
                kind if DataType::of_literal(kind).is_some() => {
                    arguments += 1;
                    self.cursor.advance();
                }
                TokenKind::DelimComma => {
                    self.cursor.advance();
                }
                TokenKind::DelimRparen => {
                    self.cursor.advance();
                    break;
                }
                _ => break,
            }
        }

        let Some(entry) = self.table.resolve(&name.lexeme) else {
            self.undeclared(name);
            return None;
        };
        self.record_usage(entry, name.line);

        let (is_function, expected, return_type) = self
            .table
            .get(entry)
            .map(|record| (record.is_function(), record.params.len(), record.data_type))?;

        if !is_function {
            self.report(SemanticError::NotCallable {
                name: name.lexeme.clone(),
                line: name.line,
                span: name.span,
            });
            return None;
        }
        if expected != arguments {
            self.report(SemanticError::ArgumentCountMismatch {
                name: name.lexeme.clone(),
                expected,
                found: arguments,
                line: name.line,
                span: name.span,
            });
        }
        Some(return_type)
    }

    /// comparison {AND|OR|NOT comparison}
    fn condition(&mut self) -> Option<DataType> {
        let mut left = self.comparison();
        while let Some(op) = self
            .cursor
            .current()
            .filter(|token| token.kind.is_logical())
        {
            self.cursor.advance();
            let right = self.comparison();
            left = match (left, right) {
                // `a NOT b` reads as `a AND (NOT b)`
                (Some(l), Some(r)) if op.kind == TokenKind::Not => self
                    .report_rule(TypeChecker::negation(r), "NOT operand", op)
                    .and_then(|negated| {
                        self.report_rule(TypeChecker::logical(l, negated), "operator Ni", op)
                    }),
                (Some(l), Some(r)) => {
                    let context = format!("operator {}", op.lexeme);
                    self.report_rule(TypeChecker::logical(l, r), &context, op)
                }
                _ => None,
            };
        }
        left
    }

    /// operand [relop operand]
    fn comparison(&mut self) -> Option<DataType> {
        let left = self.operand();
        let Some(op) = self
            .cursor
            .current()
            .filter(|token| token.kind.is_relational())
        else {
            return left;
        };
        self.cursor.advance();
        let right = self.operand();
        let context = format!("comparison {}", op.lexeme);
        self.report_rule(TypeChecker::comparison(left?, right?), &context, op)
    }

    // ---------------------------------------------------------------------
    // Symbol access
    // ---------------------------------------------------------------------

    /// Read a name: it must resolve and hold a value
    fn use_variable(&mut self, token: &Token) -> Option<DataType> {
        let Some(entry) = self.table.resolve(&token.lexeme) else {
            self.undeclared(token);
            return None;
        };
        self.record_usage(entry, token.line);

        let (usable, data_type) = self
            .table
            .get(entry)
            .map(|record| (record.is_usable(), record.data_type))?;
        if !usable {
            self.report(SemanticError::UseBeforeAssignment {
                name: token.lexeme.clone(),
                line: token.line,
                span: token.span,
            });
        }
        Some(data_type)
    }

    /// Target of READ: marked assigned without a type check
    fn store_into(&mut self, target: &Token) {
        let Some(entry) = self.assignable_target(target) else {
            return;
        };
        self.table.mark_assigned(entry);
    }

    /// Target receiving a value of a known type
    fn store_value(&mut self, target: &Token, value: DataType) {
        let Some(entry) = self.assignable_target(target) else {
            return;
        };
        let declared = self.table.get(entry).map(|record| record.data_type);
        match declared {
            Some(declared) if !TypeChecker::is_assignable(declared, value) => {
                self.report(SemanticError::IncompatibleAssignment {
                    name: target.lexeme.clone(),
                    target: declared,
                    value,
                    line: target.line,
                    span: target.span,
                });
            }
            _ => self.table.mark_assigned(entry),
        }
    }

    fn assignable_target(&mut self, target: &Token) -> Option<EntryRef> {
        let Some(entry) = self.table.resolve(&target.lexeme) else {
            self.undeclared(target);
            return None;
        };
        self.record_usage(entry, target.line);

        if self.table.get(entry).is_some_and(|record| record.is_function()) {
            self.report(SemanticError::AssignmentToFunction {
                name: target.lexeme.clone(),
                line: target.line,
                span: target.span,
            });
            return None;
        }
        Some(entry)
    }

    fn record_usage(&mut self, entry: EntryRef, line: u32) {
        if self.preferences.record_usage_lines {
            self.table.record_usage(entry, line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use assert_matches::assert_matches;

    fn analyze_source(source: &str) -> (SymbolTable, Vec<SemanticError>) {
        let tokens = tokenize(source).unwrap();
        SemanticAnalyzer::new(&tokens).run()
    }

    fn program(body: &str) -> String {
        format!("Para prog {{\n{}\n}} Fin", body)
    }

    #[test]
    fn test_clean_program_has_no_diagnostics() {
        let (table, errors) = analyze_source(&program(
            "El x Puntual;\nx Dice 5;\nSe_Escribe x;",
        ));
        assert!(errors.is_empty(), "{:?}", errors);

        let x = table.variables().next().unwrap();
        assert_eq!(x.name, "x");
        assert_eq!(x.data_type, DataType::Int);
        assert!(x.has_value);
        assert_eq!(x.scope, 1);
        assert_eq!(x.usage_lines, vec![3, 4]);
    }

    #[test]
    fn test_undeclared_assignment_target() {
        let (_, errors) = analyze_source(&program("x Dice 5;"));
        assert_eq!(errors.len(), 1);
        assert_matches!(
            &errors[0],
            SemanticError::UndeclaredIdentifier { name, line: 2, .. } if name == "x"
        );
    }

    #[test]
    fn test_int_widens_into_real() {
        let (table, errors) = analyze_source(&program("El r Eminente;\nr Dice 3;"));
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(table.resolve_entry("r").is_none());
        assert!(table.variables().next().unwrap().has_value);
    }

    #[test]
    fn test_incompatible_assignment_leaves_target_unassigned() {
        let (table, errors) = analyze_source(&program("El s Versatil;\ns Dice 3;"));
        assert_eq!(errors.len(), 1);
        assert_matches!(
            &errors[0],
            SemanticError::IncompatibleAssignment {
                target: DataType::String,
                value: DataType::Int,
                ..
            }
        );
        assert!(!table.variables().next().unwrap().has_value);
    }

    #[test]
    fn test_real_into_int_is_rejected() {
        let (_, errors) = analyze_source(&program("El n Puntual;\nn Dice 2.5;"));
        assert_matches!(
            errors.as_slice(),
            [SemanticError::IncompatibleAssignment {
                target: DataType::Int,
                value: DataType::Real,
                ..
            }]
        );
    }

    #[test]
    fn test_use_before_assignment() {
        let (_, errors) = analyze_source(&program("El x Puntual;\nSe_Escribe x;"));
        assert_matches!(
            errors.as_slice(),
            [SemanticError::UseBeforeAssignment { name, line: 3, .. }] if name == "x"
        );
    }

    #[test]
    fn test_read_marks_assigned() {
        let (_, errors) = analyze_source(&program(
            "El x Puntual;\nEscucha x;\nSe_Escribe x;",
        ));
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_read_of_undeclared_name() {
        let (_, errors) = analyze_source(&program("Escucha y;"));
        assert_matches!(errors.as_slice(), [SemanticError::UndeclaredIdentifier { .. }]);
    }

    #[test]
    fn test_duplicate_declaration_keeps_first() {
        let (table, errors) = analyze_source(&program("El x Puntual;\nEl x Versatil;"));
        assert_matches!(
            errors.as_slice(),
            [SemanticError::DuplicateDeclaration { line: 3, first_line: 2, .. }]
        );
        assert_eq!(table.variable_count(), 1);
        assert_eq!(table.variables().next().unwrap().data_type, DataType::Int);
    }

    #[test]
    fn test_string_concatenation() {
        let (_, errors) = analyze_source(&program(
            "El s Versatil;\ns Dice \"a\" Inspira \"b\";",
        ));
        assert!(errors.is_empty(), "{:?}", errors);

        let (_, errors) = analyze_source(&program(
            "El s Versatil;\ns Dice \"a\" Inspira 3;",
        ));
        assert_matches!(errors.as_slice(), [SemanticError::TypeMismatch { .. }]);
    }

    #[test]
    fn test_arithmetic_result_type() {
        let (_, errors) = analyze_source(&program(
            "El a Puntual;\na Dice 1;\nEl b Eminente;\nb Dice a Abraza 2.5;",
        ));
        assert!(errors.is_empty(), "{:?}", errors);

        let (_, errors) = analyze_source(&program(
            "El a Puntual;\na Dice 1;\nEl n Puntual;\nn Dice a Abraza 2.5;",
        ));
        assert_matches!(errors.as_slice(), [SemanticError::IncompatibleAssignment { .. }]);
    }

    #[test]
    fn test_math_function_yields_real() {
        let (_, errors) = analyze_source(&program(
            "El a Puntual;\na Dice 4;\nEl r Eminente;\nr Dice Fragmenta(a);",
        ));
        assert!(errors.is_empty(), "{:?}", errors);

        let (_, errors) = analyze_source(&program(
            "El a Puntual;\na Dice 4;\nEl n Puntual;\nn Dice Fragmenta(a);",
        ));
        assert_matches!(errors.as_slice(), [SemanticError::IncompatibleAssignment { .. }]);
    }

    #[test]
    fn test_condition_must_be_boolean_comparison() {
        let source = program(
            "El x Puntual;\nx Dice 1;\nSi (x Convence 10) Entonces {\nSe_Escribe x;\n} Fin_Si",
        );
        let (_, errors) = analyze_source(&source);
        assert!(errors.is_empty(), "{:?}", errors);

        let source = program(
            "El x Puntual;\nx Dice 1;\nEl s Versatil;\ns Dice \"a\";\nMientras (x Convence s) Canta {\nSe_Escribe x;\n} Se_Culmina",
        );
        let (_, errors) = analyze_source(&source);
        assert_matches!(errors.as_slice(), [SemanticError::TypeMismatch { line: 6, .. }]);
    }

    #[test]
    fn test_logical_operators_need_booleans() {
        let source = program(
            "El a Simple;\na Dice Verdad;\nEl x Puntual;\nx Dice 1;\nMientras (a Y x Convence 3) Canta {\nSe_Escribe x;\n} Se_Culmina",
        );
        let (_, errors) = analyze_source(&source);
        assert!(errors.is_empty(), "{:?}", errors);

        let source = program(
            "El x Puntual;\nx Dice 1;\nMientras (x Y x Convence 3) Canta {\nSe_Escribe x;\n} Se_Culmina",
        );
        let (_, errors) = analyze_source(&source);
        assert_matches!(errors.as_slice(), [SemanticError::TypeMismatch { .. }]);
    }

    #[test]
    fn test_negation() {
        let source = program(
            "El a Simple;\na Dice Verdad;\nSi (a Ni Mentira) Entonces {\nSe_Escribe a;\n} Fin_Si",
        );
        let (_, errors) = analyze_source(&source);
        assert!(errors.is_empty(), "{:?}", errors);

        let source = program(
            "El a Simple;\na Dice Verdad;\nSi (a Ni 4) Entonces {\nSe_Escribe a;\n} Fin_Si",
        );
        let (_, errors) = analyze_source(&source);
        assert_matches!(errors.as_slice(), [SemanticError::TypeMismatch { .. }]);
    }

    #[test]
    fn test_inner_scope_declaration_does_not_leak() {
        let source = program(
            "El x Puntual;\nx Dice 1;\nSi (x Convence 2) Entonces {\nEl t Puntual;\nt Dice 3;\n} Fin_Si\nt Dice 4;",
        );
        let (table, errors) = analyze_source(&source);
        assert_matches!(
            errors.as_slice(),
            [SemanticError::UndeclaredIdentifier { name, line: 8, .. }] if name == "t"
        );
        // Closed scopes stay in the report
        assert_eq!(table.variable_count(), 2);
        assert_eq!(table.current_depth(), 0);
    }

    #[test]
    fn test_shadowing_in_nested_block() {
        let source = program(
            "El x Puntual;\nx Dice 1;\nSi (x Convence 2) Entonces {\nEl x Versatil;\nx Dice \"s\";\n} Fin_Si\nx Dice 2;",
        );
        let (_, errors) = analyze_source(&source);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_for_loop_bounds_and_control() {
        let source = program(
            "El i Puntual;\nDe i Dice 1 Hasta 10 Con 1 Visitar {\nSe_Escribe i;\n} Se_Sienta",
        );
        let (_, errors) = analyze_source(&source);
        assert!(errors.is_empty(), "{:?}", errors);

        let source = program(
            "El r Eminente;\nDe r Dice 1 Hasta 2.5 Con 1 Visitar {\nSe_Escribe r;\n} Se_Sienta",
        );
        let (_, errors) = analyze_source(&source);
        assert_matches!(errors.as_slice(), [SemanticError::TypeMismatch { context, .. }] if context == "FOR end");

        let source = program("De k Dice 1 Hasta 2 Con 1 Visitar {\nSe_Escribe 1;\n} Se_Sienta");
        let (_, errors) = analyze_source(&source);
        assert_matches!(errors.as_slice(), [SemanticError::UndeclaredIdentifier { .. }]);
    }

    #[test]
    fn test_switch_selector_must_be_int() {
        let source = program(
            "El s Versatil;\ns Dice \"a\";\nCuando (s) Decida 1 : {\nSe_Escribe s;\n} Rendirse : {\nSe_Escribe s;\n}",
        );
        let (_, errors) = analyze_source(&source);
        assert_matches!(
            errors.as_slice(),
            [SemanticError::TypeMismatch { context, .. }] if context == "SWITCH selector"
        );
    }

    #[test]
    fn test_function_registration_and_return_type() {
        let source = format!(
            "{}\nFuncion total Dice suma(a, b) {{\nEl total Eminente;\ntotal Dice a Inspira b;\n}} Fin_Funcion",
            program("El x Puntual;\nx Dice 1;")
        );
        let (table, errors) = analyze_source(&source);
        assert!(errors.is_empty(), "{:?}", errors);

        let suma = table.functions().next().unwrap();
        assert_eq!(suma.id, "FUNC_001");
        assert_eq!(suma.scope, 0);
        assert_eq!(suma.params, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(suma.data_type, DataType::Real);
        assert_eq!(suma.return_variable.as_deref(), Some("total"));

        let a = table.variables().find(|entry| entry.name == "a").unwrap();
        assert!(a.is_parameter);
        assert!(a.has_value);
        assert_eq!(a.data_type, DataType::Int);
        assert_eq!(a.scope, 1);
    }

    #[test]
    fn test_function_without_return_declaration_returns_int() {
        let source = format!(
            "{}\nFuncion r Dice uno(a) {{\nSe_Escribe a;\n}} Fin_Funcion",
            program("El x Puntual;\nx Dice 1;")
        );
        let (table, errors) = analyze_source(&source);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(table.functions().next().unwrap().data_type, DataType::Int);
    }

    #[test]
    fn test_duplicate_function_still_declares_its_parameters() {
        let function = "Funcion r Dice f(a) {\nSe_Escribe a;\n} Fin_Funcion";
        let source = format!(
            "{}\n{}\n{}",
            program("El x Puntual;\nx Dice 1;"),
            function,
            function
        );
        let (table, errors) = analyze_source(&source);

        assert_matches!(
            errors.as_slice(),
            [SemanticError::DuplicateDeclaration { name, line: 8, first_line: 5, .. }] if name == "f"
        );
        assert_eq!(table.function_count(), 1);
        assert_eq!(table.variables().filter(|entry| entry.name == "a").count(), 2);
    }

    #[test]
    fn test_nested_return_variable_does_not_set_return_type() {
        let source = format!(
            "{}\nFuncion r Dice f(a) {{\n\
             Si (a Convence 1) Entonces {{\nEl r Eminente;\n}} Fin_Si\n\
             }} Fin_Funcion",
            program("El x Puntual;\nx Dice 1;")
        );
        let (table, errors) = analyze_source(&source);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(table.functions().next().unwrap().data_type, DataType::Int);
    }

    #[test]
    fn test_call_before_definition_is_undeclared() {
        let source = format!(
            "{}\nFuncion r Dice doble(a) {{\nSe_Escribe a;\n}} Fin_Funcion",
            program("El x Puntual;\nx Dice doble(x);")
        );
        let (_, errors) = analyze_source(&source);
        assert!(errors
            .iter()
            .any(|error| matches!(error, SemanticError::UndeclaredIdentifier { name, .. } if name == "doble")));
    }

    #[test]
    fn test_calls_check_callability_and_arity() {
        let tokens = tokenize(
            "Funcion r Dice f(a) { Se_Escribe a; } Fin_Funcion\n\
             Para p {\nEl x Puntual;\nx Dice 1;\nx Dice f(x, x);\nx Dice x(x);\nf Dice 2;\n} Fin",
        )
        .unwrap();
        let (_, errors) = SemanticAnalyzer::new(&tokens).run();
        assert_matches!(
            errors.as_slice(),
            [
                SemanticError::ArgumentCountMismatch { expected: 1, found: 2, .. },
                SemanticError::NotCallable { .. },
                SemanticError::AssignmentToFunction { .. },
            ]
        );
    }

    #[test]
    fn test_usage_lines_can_be_disabled() {
        let tokens = tokenize(&program("El x Puntual;\nx Dice 5;")).unwrap();
        let preferences = SemanticPreferences {
            record_usage_lines: false,
            log_each_diagnostic: false,
        };
        let (table, _) = SemanticAnalyzer::with_preferences(&tokens, preferences).run();
        assert!(table.variables().next().unwrap().usage_lines.is_empty());
    }

    #[test]
    fn test_error_limit_adds_sentinel() {
        let body = "y Dice 1;\n".repeat(MAX_SEMANTIC_ERRORS + 5);
        let (_, errors) = analyze_source(&program(&body));
        assert_eq!(errors.len(), MAX_SEMANTIC_ERRORS + 1);
        assert_matches!(errors.last(), Some(SemanticError::TooManyErrors { .. }));
    }

    #[test]
    fn test_scope_limit_reported_once() {
        use crate::config::constants::compile_time::semantic::MAX_SCOPE_DEPTH;

        let depth = MAX_SCOPE_DEPTH + 2;
        let source = format!("{}{}", "{ ".repeat(depth), "} ".repeat(depth));
        let (table, errors) = analyze_source(&source);
        assert_matches!(
            errors.as_slice(),
            [SemanticError::ScopeDepthExceeded { limit, .. }] if *limit == MAX_SCOPE_DEPTH
        );
        assert_eq!(table.current_depth(), 0);
    }

    #[test]
    fn test_malformed_input_does_not_panic() {
        for source in ["", "}", "} } {", "El", "Funcion", "Funcion r Dice", "x Dice", "De", "Cuando (", "Si ( x"] {
            let tokens = tokenize(source).unwrap();
            let _ = SemanticAnalyzer::new(&tokens).run();
        }
    }
}
