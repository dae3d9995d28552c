mod functions;
mod round;

use std::cmp::Ordering;

use rulex_lang::ast::{BinaryOp, Expression, UnaryOp};
use rulex_lang::format::format_expr;
use rulex_lang::{Value, ValueKind};

use crate::event::FieldSource;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Evaluation failure. `node` is the printed sub-expression that failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} in `{node}`")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub node: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("type mismatch: `{op}` cannot be applied to {found}")]
    TypeMismatch { op: &'static str, found: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("`{op}` produced a non-finite number")]
    NonFinite { op: &'static str },
    #[error("invalid argument to `{function}`: {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },
    #[error("{0} cannot be evaluated here")]
    UnsupportedOperation(&'static str),
}

impl EvalError {
    fn at(expr: &Expression, kind: EvalErrorKind) -> Self {
        Self {
            kind,
            node: format_expr(expr),
        }
    }

    pub fn code(&self) -> i32 {
        match self.kind {
            EvalErrorKind::TypeMismatch { .. } => 1301,
            EvalErrorKind::DivisionByZero => 1302,
            EvalErrorKind::NonFinite { .. } => 1303,
            EvalErrorKind::InvalidArgument { .. } => 1304,
            EvalErrorKind::UnsupportedOperation(_) => 1305,
        }
    }
}

fn mismatch(op: &'static str, kinds: &[ValueKind]) -> EvalErrorKind {
    let found = kinds.iter().map(ValueKind::as_str).collect::<Vec<_>>().join(" and ");
    EvalErrorKind::TypeMismatch { op, found }
}

type EvalResult = Result<Value, EvalError>;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Evaluate `expr` against `source`.
///
/// Pure: the same expression and field values always give the same result.
/// `&&` and `||` short-circuit, so fields on the skipped side are never read.
pub fn evaluate(expr: &Expression, source: &dyn FieldSource) -> EvalResult {
    match expr {
        Expression::Literal(value) => Ok(value.clone()),
        Expression::Field(path) => Ok(lookup_field(source, path)),
        Expression::Grouping(inner) => evaluate(inner, source),
        Expression::Unary { op, operand } => {
            let value = evaluate(operand, source)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOp::Neg => match to_number(&value) {
                    Some(n) => Ok(Value::Number(-n)),
                    None => Err(EvalError::at(expr, mismatch("-", &[value.kind()]))),
                },
            }
        }
        Expression::Binary { op, left, right } => eval_binary(expr, *op, left, right, source),
        Expression::List(_) => Err(EvalError::at(
            expr,
            EvalErrorKind::UnsupportedOperation("a list literal"),
        )),
        Expression::Call { function, args } => functions::call(expr, *function, args, source),
    }
}

/// Missing fields read as `Null`. A path written with the `event.` prefix
/// falls back to the bare path.
fn lookup_field(source: &dyn FieldSource, path: &str) -> Value {
    source
        .lookup(path)
        .or_else(|| path.strip_prefix("event.").and_then(|bare| source.lookup(bare)))
        .cloned()
        .unwrap_or(Value::Null)
}

fn eval_binary(
    expr: &Expression,
    op: BinaryOp,
    left: &Expression,
    right: &Expression,
    source: &dyn FieldSource,
) -> EvalResult {
    match op {
        BinaryOp::And => {
            if !evaluate(left, source)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(evaluate(right, source)?.is_truthy()))
        }
        BinaryOp::Or => {
            if evaluate(left, source)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(evaluate(right, source)?.is_truthy()))
        }
        BinaryOp::In | BinaryOp::NotIn => {
            let lv = evaluate(left, source)?;
            let found = membership(expr, op, &lv, right, source)?;
            Ok(Value::Bool(found == (op == BinaryOp::In)))
        }
        _ => {
            let lv = evaluate(left, source)?;
            let rv = evaluate(right, source)?;
            match op {
                BinaryOp::Eq => Ok(Value::Bool(values_equal(&lv, &rv))),
                BinaryOp::Ne => Ok(Value::Bool(!values_equal(&lv, &rv))),
                BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                    compare(expr, op, &lv, &rv)
                }
                _ => arithmetic(expr, op, &lv, &rv),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Total equality: differing kinds are unequal, numbers compare exactly so
/// `==` agrees with `<` and `>`.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        _ => false,
    }
}

fn compare(expr: &Expression, op: BinaryOp, lv: &Value, rv: &Value) -> EvalResult {
    let ord = match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => None,
    };
    let Some(ord) = ord else {
        return Err(EvalError::at(expr, mismatch(op.symbol(), &[lv.kind(), rv.kind()])));
    };
    let result = match op {
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Le => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        _ => ord != Ordering::Less,
    };
    Ok(Value::Bool(result))
}

/// `needle in (a, b, ...)` tests items left to right and stops at the first
/// match; `needle in "haystack"` is a substring test.
fn membership(
    expr: &Expression,
    op: BinaryOp,
    needle: &Value,
    haystack: &Expression,
    source: &dyn FieldSource,
) -> Result<bool, EvalError> {
    if let Expression::List(items) = haystack {
        for item in items {
            if values_equal(needle, &evaluate(item, source)?) {
                return Ok(true);
            }
        }
        return Ok(false);
    }
    let hv = evaluate(haystack, source)?;
    match (needle, &hv) {
        (Value::Str(n), Value::Str(h)) => Ok(h.contains(n.as_str())),
        _ => Err(EvalError::at(
            expr,
            mismatch(op.symbol(), &[needle.kind(), hv.kind()]),
        )),
    }
}

fn arithmetic(expr: &Expression, op: BinaryOp, lv: &Value, rv: &Value) -> EvalResult {
    let (Some(a), Some(b)) = (to_number(lv), to_number(rv)) else {
        return Err(EvalError::at(expr, mismatch(op.symbol(), &[lv.kind(), rv.kind()])));
    };
    let n = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => {
            return Err(EvalError::at(expr, EvalErrorKind::DivisionByZero));
        }
        BinaryOp::Div => a / b,
        _ => a % b,
    };
    finite(expr, op.symbol(), n)
}

pub(crate) fn finite(expr: &Expression, op: &'static str, n: f64) -> EvalResult {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(EvalError::at(expr, EvalErrorKind::NonFinite { op }))
    }
}

/// Numeric view of a value: numbers as is, strings that read as a finite
/// number. `Null` and booleans have none.
pub(crate) fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Str(s) => s.parse::<f64>().ok().filter(|n| n.is_finite()),
        Value::Null | Value::Bool(_) => None,
    }
}

#[cfg(test)]
mod tests;
