//! Type compatibility rules
//!
//! Pure functions over [`DataType`]; the analyzer turns a [`TypeViolation`]
//! into a diagnostic with the offending token's position.

use crate::symbols::DataType;
use crate::tokens::TokenKind;

/// A rule that did not hold: what it needed and what it got
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeViolation {
    pub expected: &'static str,
    pub found: String,
}

impl TypeViolation {
    fn new(expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}

pub type TypeRule = Result<DataType, TypeViolation>;

pub struct TypeChecker;

impl TypeChecker {
    /// Result type of `left op right` for an arithmetic operator.
    ///
    /// `PLUS` concatenates when either side is a string, and then both sides
    /// must be strings.
    pub fn arithmetic(op: TokenKind, left: DataType, right: DataType) -> TypeRule {
        if op == TokenKind::Plus && (left == DataType::String || right == DataType::String) {
            return if left == right {
                Ok(DataType::String)
            } else {
                Err(TypeViolation::new(
                    "STRING and STRING",
                    format!("{} and {}", left, right),
                ))
            };
        }

        if !left.is_numeric() || !right.is_numeric() {
            return Err(TypeViolation::new(
                "numeric operands",
                format!("{} and {}", left, right),
            ));
        }

        if left == DataType::Real || right == DataType::Real {
            Ok(DataType::Real)
        } else {
            Ok(DataType::Int)
        }
    }

    /// Relational comparison: equal types, or two numerics
    pub fn comparison(left: DataType, right: DataType) -> TypeRule {
        if left == right || (left.is_numeric() && right.is_numeric()) {
            Ok(DataType::Bool)
        } else {
            Err(TypeViolation::new(
                "comparable operands",
                format!("{} and {}", left, right),
            ))
        }
    }

    /// `AND` / `OR`
    pub fn logical(left: DataType, right: DataType) -> TypeRule {
        if left == DataType::Bool && right == DataType::Bool {
            Ok(DataType::Bool)
        } else {
            Err(TypeViolation::new(
                "BOOL and BOOL",
                format!("{} and {}", left, right),
            ))
        }
    }

    /// `NOT` applied to a single operand
    pub fn negation(operand: DataType) -> TypeRule {
        Self::require(operand, DataType::Bool, "BOOL")
    }

    /// Same type, or an INT widened into a REAL target
    pub fn is_assignable(target: DataType, value: DataType) -> bool {
        target == value || (target == DataType::Real && value == DataType::Int)
    }

    /// Condition of `IF`, `WHILE` and `UNTIL`
    pub fn condition(found: DataType) -> TypeRule {
        Self::require(found, DataType::Bool, "BOOL")
    }

    /// Built-in math functions take a number and return REAL
    pub fn math_function(argument: DataType) -> TypeRule {
        if argument.is_numeric() {
            Ok(DataType::Real)
        } else {
            Err(TypeViolation::new("a numeric argument", argument.as_str()))
        }
    }

    pub fn for_bound(found: DataType) -> TypeRule {
        Self::require(found, DataType::Int, "INT")
    }

    pub fn switch_selector(found: DataType) -> TypeRule {
        Self::require(found, DataType::Int, "INT")
    }

    fn require(found: DataType, wanted: DataType, expected: &'static str) -> TypeRule {
        if found == wanted {
            Ok(found)
        } else {
            Err(TypeViolation::new(expected, found.as_str()))
        }
    }
}
