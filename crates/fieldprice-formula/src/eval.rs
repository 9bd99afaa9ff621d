//! Tree-walking evaluator.
//!
//! Numbers and booleans never convert into each other: arithmetic and
//! ordering need numbers, logical operators and ternary conditions need
//! booleans, and `==`/`!=` need two operands of the same type.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::types::{Bindings, FormulaError, Result, Value};

/// Evaluates an expression against the given variable bindings.
pub fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Var(name) => bindings
            .get(name)
            .copied()
            .ok_or_else(|| FormulaError::UnresolvedVariable(name.clone())),
        Expr::Unary { op, expr } => {
            let operand = evaluate(expr, bindings)?;
            match op {
                UnaryOp::Neg => Ok(Value::Number(-num(op.symbol(), operand)?)),
                UnaryOp::Not => Ok(Value::Bool(!boolean(op.symbol(), operand)?)),
            }
        }
        Expr::Binary { op, left, right } => evaluate_binary(*op, left, right, bindings),
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => {
            if boolean("?:", evaluate(cond, bindings)?)? {
                evaluate(then, bindings)
            } else {
                evaluate(otherwise, bindings)
            }
        }
    }
}

/// Evaluates an expression that must produce a finite number.
pub fn evaluate_number(expr: &Expr, bindings: &Bindings) -> Result<f64> {
    match evaluate(expr, bindings)? {
        Value::Number(n) if n.is_finite() => Ok(n),
        Value::Number(_) => Err(FormulaError::NonFiniteResult),
        other => Err(FormulaError::NonNumericResult(other.type_name())),
    }
}

fn evaluate_binary(op: BinaryOp, left: &Expr, right: &Expr, bindings: &Bindings) -> Result<Value> {
    // Short-circuit before evaluating the right operand.
    match op {
        BinaryOp::And => {
            if !boolean(op.symbol(), evaluate(left, bindings)?)? {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(boolean(op.symbol(), evaluate(right, bindings)?)?));
        }
        BinaryOp::Or => {
            if boolean(op.symbol(), evaluate(left, bindings)?)? {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(boolean(op.symbol(), evaluate(right, bindings)?)?));
        }
        _ => {}
    }

    let lhs = evaluate(left, bindings)?;
    let rhs = evaluate(right, bindings)?;
    apply(op, lhs, rhs)
}

fn apply(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    let sym = op.symbol();

    match op {
        BinaryOp::Add => Ok(Value::Number(num(sym, lhs)? + num(sym, rhs)?)),
        BinaryOp::Sub => Ok(Value::Number(num(sym, lhs)? - num(sym, rhs)?)),
        BinaryOp::Mul => Ok(Value::Number(num(sym, lhs)? * num(sym, rhs)?)),
        BinaryOp::Div => {
            let dividend = num(sym, lhs)?;
            let divisor = num(sym, rhs)?;
            if divisor == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            Ok(Value::Number(dividend / divisor))
        }
        BinaryOp::Lt => Ok(Value::Bool(num(sym, lhs)? < num(sym, rhs)?)),
        BinaryOp::Gt => Ok(Value::Bool(num(sym, lhs)? > num(sym, rhs)?)),
        BinaryOp::Le => Ok(Value::Bool(num(sym, lhs)? <= num(sym, rhs)?)),
        BinaryOp::Ge => Ok(Value::Bool(num(sym, lhs)? >= num(sym, rhs)?)),
        BinaryOp::Eq | BinaryOp::Ne => {
            let equal = match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => a == b,
                (Value::Bool(a), Value::Bool(b)) => a == b,
                (Value::Number(_), other) => {
                    return Err(mismatch(sym, "two numbers", other));
                }
                (Value::Bool(_), other) => {
                    return Err(mismatch(sym, "two booleans", other));
                }
            };
            Ok(Value::Bool(if op == BinaryOp::Eq { equal } else { !equal }))
        }
        BinaryOp::And => Ok(Value::Bool(boolean(sym, lhs)? && boolean(sym, rhs)?)),
        BinaryOp::Or => Ok(Value::Bool(boolean(sym, lhs)? || boolean(sym, rhs)?)),
    }
}

fn num(operator: &'static str, value: Value) -> Result<f64> {
    value
        .as_number()
        .ok_or_else(|| mismatch(operator, "a number", value))
}

fn boolean(operator: &'static str, value: Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| mismatch(operator, "a boolean", value))
}

fn mismatch(operator: &'static str, expected: &'static str, found: Value) -> FormulaError {
    FormulaError::TypeMismatch {
        operator,
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn bindings(pairs: &[(&str, Value)]) -> Bindings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn eval(text: &str, vars: &Bindings) -> Result<Value> {
        evaluate(&parse(text).unwrap(), vars)
    }

    #[test]
    fn arithmetic() {
        let vars = bindings(&[("value", Value::Number(4.0))]);
        assert_eq!(eval("value * 2 + 1", &vars), Ok(Value::Number(9.0)));
        assert_eq!(eval("-value / 8", &vars), Ok(Value::Number(-0.5)));
    }

    #[test]
    fn ternary_selects_branch() {
        let vars = bindings(&[
            ("choice5selected", Value::Bool(true)),
            ("choice6selected", Value::Bool(false)),
        ]);
        assert_eq!(
            eval("(choice5selected ? 10 : 0) + (choice6selected ? 7 : 0)", &vars),
            Ok(Value::Number(10.0))
        );
    }

    #[test]
    fn comparisons_and_logic() {
        let vars = bindings(&[("value", Value::Number(3.0)), ("valueNotEmpty", Value::Bool(true))]);
        assert_eq!(eval("value >= 3 && valueNotEmpty", &vars), Ok(Value::Bool(true)));
        assert_eq!(eval("value != 3 || !valueNotEmpty", &vars), Ok(Value::Bool(false)));
        assert_eq!(eval("valueNotEmpty == true", &vars), Ok(Value::Bool(true)));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let vars = bindings(&[("value", Value::Number(0.0))]);
        assert_eq!(eval("10 / value", &vars), Err(FormulaError::DivisionByZero));
        assert_eq!(eval("10 / (value + 1)", &vars), Ok(Value::Number(10.0)));
    }

    #[test]
    fn missing_binding_is_fatal() {
        let err = eval("field3 * 2", &Bindings::new()).unwrap_err();
        assert_eq!(err, FormulaError::UnresolvedVariable("field3".into()));
    }

    #[test]
    fn arithmetic_on_boolean_is_a_type_error() {
        let vars = bindings(&[("valueNotEmpty", Value::Bool(true))]);
        assert_eq!(
            eval("valueNotEmpty * 2", &vars),
            Err(FormulaError::TypeMismatch {
                operator: "*",
                expected: "a number",
                found: "boolean",
            })
        );
    }

    #[test]
    fn mixed_equality_is_a_type_error() {
        let vars = bindings(&[("valueNotEmpty", Value::Bool(true))]);
        assert!(matches!(
            eval("1 == valueNotEmpty", &vars),
            Err(FormulaError::TypeMismatch { operator: "==", .. })
        ));
    }

    #[test]
    fn short_circuit_skips_unbound_right_operand() {
        let vars = bindings(&[("valueNotEmpty", Value::Bool(false))]);
        assert_eq!(eval("valueNotEmpty && value > 1", &vars), Ok(Value::Bool(false)));
    }

    #[test]
    fn evaluate_number_rejects_booleans() {
        let expr = parse("1 < 2").unwrap();
        assert_eq!(
            evaluate_number(&expr, &Bindings::new()),
            Err(FormulaError::NonNumericResult("boolean"))
        );
    }
}
