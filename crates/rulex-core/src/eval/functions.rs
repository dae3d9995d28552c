use rulex_lang::Value;
use rulex_lang::ast::{Expression, Function};

use super::round::{RoundMode, round_to};
use super::{EvalError, EvalErrorKind, EvalResult, evaluate, finite, mismatch, to_number};
use crate::event::FieldSource;

/// Evaluate a built-in call. Argument counts were checked by the parser.
///
/// Supported functions:
/// - `concat(a, ...)` → Str of the rendered arguments
/// - `round(x[, d])`, `ceil(x[, d])`, `floor(x[, d])` → Number
/// - `min(a, ...)`, `max(a, ...)` → Number
/// - `lower(s)`, `upper(s)` → Str
/// - `len(s)` → Number of characters
/// - `contains(haystack, needle)` → Bool
/// - `regex_match(s, pattern)` → Bool
pub(super) fn call(
    expr: &Expression,
    function: Function,
    args: &[Expression],
    source: &dyn FieldSource,
) -> EvalResult {
    let values = args
        .iter()
        .map(|arg| evaluate(arg, source))
        .collect::<Result<Vec<_>, _>>()?;
    let call = Call {
        expr,
        function,
        values: &values,
    };

    match function {
        Function::Concat => Ok(Value::Str(values.iter().map(Value::render).collect())),
        Function::Round => call.rounded(RoundMode::HalfUp),
        Function::Ceil => call.rounded(RoundMode::Ceiling),
        Function::Floor => call.rounded(RoundMode::Floor),
        Function::Min => call.fold_numbers(f64::min),
        Function::Max => call.fold_numbers(f64::max),
        Function::Lower => Ok(Value::Str(call.string(0)?.to_lowercase())),
        Function::Upper => Ok(Value::Str(call.string(0)?.to_uppercase())),
        Function::Len => Ok(Value::Number(call.string(0)?.chars().count() as f64)),
        Function::Contains => {
            let haystack = call.string(0)?;
            let needle = call.string(1)?;
            Ok(Value::Bool(haystack.contains(needle)))
        }
        Function::RegexMatch => {
            let hay = call.string(0)?;
            let pattern = call.string(1)?;
            let re = regex::Regex::new(pattern)
                .map_err(|e| call.invalid(format!("bad pattern {pattern:?}: {e}")))?;
            Ok(Value::Bool(re.is_match(hay)))
        }
    }
}

static NULL: Value = Value::Null;

/// Evaluated arguments of one call, with error constructors bound to it.
struct Call<'a> {
    expr: &'a Expression,
    function: Function,
    values: &'a [Value],
}

impl Call<'_> {
    fn arg(&self, i: usize) -> &Value {
        self.values.get(i).unwrap_or(&NULL)
    }

    fn mismatch(&self, value: &Value) -> EvalError {
        EvalError::at(self.expr, mismatch(self.function.name(), &[value.kind()]))
    }

    fn invalid(&self, message: String) -> EvalError {
        EvalError::at(
            self.expr,
            EvalErrorKind::InvalidArgument {
                function: self.function.name(),
                message,
            },
        )
    }

    fn number(&self, i: usize) -> Result<f64, EvalError> {
        let value = self.arg(i);
        to_number(value).ok_or_else(|| self.mismatch(value))
    }

    fn string(&self, i: usize) -> Result<&str, EvalError> {
        match self.arg(i) {
            Value::Str(s) => Ok(s),
            other => Err(self.mismatch(other)),
        }
    }

    fn rounded(&self, mode: RoundMode) -> EvalResult {
        let x = self.number(0)?;
        let places = if self.values.len() > 1 {
            let d = self.number(1)?;
            if d.fract() != 0.0 {
                return Err(self.invalid(format!(
                    "decimal places must be an integer, got {}",
                    rulex_lang::format_number(d)
                )));
            }
            d as i64
        } else {
            0
        };
        finite(self.expr, self.function.name(), round_to(x, places, mode))
    }

    fn fold_numbers(&self, pick: fn(f64, f64) -> f64) -> EvalResult {
        let mut acc = self.number(0)?;
        for i in 1..self.values.len() {
            acc = pick(acc, self.number(i)?);
        }
        Ok(Value::Number(acc))
    }
}
