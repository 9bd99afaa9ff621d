//! Static type inference.
//!
//! Follows the evaluator's rules without evaluating anything, so both arms of
//! every ternary are checked. The two arms must agree on their type.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::types::{FormulaError, Result};

/// The type of a sub-expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Number,
    Boolean,
}

impl ValueType {
    /// Same names as [`Value::type_name`](crate::types::Value::type_name).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// Infers the type of `expr`. `lookup` gives the type of each variable;
/// unknown names fail with [`FormulaError::UnresolvedVariable`].
pub fn infer<F>(expr: &Expr, lookup: &F) -> Result<ValueType>
where
    F: Fn(&str) -> Option<ValueType>,
{
    match expr {
        Expr::Number(_) => Ok(ValueType::Number),
        Expr::Bool(_) => Ok(ValueType::Boolean),
        Expr::Var(name) => {
            lookup(name).ok_or_else(|| FormulaError::UnresolvedVariable(name.clone()))
        }
        Expr::Unary { op, expr } => {
            let operand = infer(expr, lookup)?;
            match op {
                UnaryOp::Neg => require(op.symbol(), ValueType::Number, operand),
                UnaryOp::Not => require(op.symbol(), ValueType::Boolean, operand),
            }
        }
        Expr::Binary { op, left, right } => {
            let lhs = infer(left, lookup)?;
            let rhs = infer(right, lookup)?;
            let sym = op.symbol();
            match op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                    require(sym, ValueType::Number, lhs)?;
                    require(sym, ValueType::Number, rhs)
                }
                BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                    require(sym, ValueType::Number, lhs)?;
                    require(sym, ValueType::Number, rhs)?;
                    Ok(ValueType::Boolean)
                }
                BinaryOp::Eq | BinaryOp::Ne => {
                    if lhs != rhs {
                        let expected = match lhs {
                            ValueType::Number => "two numbers",
                            ValueType::Boolean => "two booleans",
                        };
                        return Err(mismatch(sym, expected, rhs));
                    }
                    Ok(ValueType::Boolean)
                }
                BinaryOp::And | BinaryOp::Or => {
                    require(sym, ValueType::Boolean, lhs)?;
                    require(sym, ValueType::Boolean, rhs)
                }
            }
        }
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => {
            require("?:", ValueType::Boolean, infer(cond, lookup)?)?;
            let then = infer(then, lookup)?;
            let otherwise = infer(otherwise, lookup)?;
            let expected = match then {
                ValueType::Number => "a number in both branches",
                ValueType::Boolean => "a boolean in both branches",
            };
            if then != otherwise {
                return Err(mismatch("?:", expected, otherwise));
            }
            Ok(then)
        }
    }
}

/// Like [`infer`] but the whole expression must be a number.
pub fn infer_number<F>(expr: &Expr, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<ValueType>,
{
    match infer(expr, lookup)? {
        ValueType::Number => Ok(()),
        other => Err(FormulaError::NonNumericResult(other.name())),
    }
}

fn require(operator: &'static str, expected: ValueType, found: ValueType) -> Result<ValueType> {
    if found == expected {
        return Ok(found);
    }
    let expected = match expected {
        ValueType::Number => "a number",
        ValueType::Boolean => "a boolean",
    };
    Err(mismatch(operator, expected, found))
}

fn mismatch(operator: &'static str, expected: &'static str, found: ValueType) -> FormulaError {
    FormulaError::TypeMismatch {
        operator,
        expected,
        found: found.name(),
    }
}
