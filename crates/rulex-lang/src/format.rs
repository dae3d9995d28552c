use std::fmt::Write;

use crate::ast::Expression;
use crate::value::{Value, format_number};

// ---------------------------------------------------------------------------
// Expression formatting
// ---------------------------------------------------------------------------

/// Render an expression back to source text.
///
/// Groupings are kept in the tree, so no extra parentheses are inserted and
/// the output parses back to an equal expression.
pub fn format_expr(expr: &Expression) -> String {
    match expr {
        Expression::Literal(value) => format_literal(value),
        Expression::Field(path) => path.clone(),
        Expression::Unary { op, operand } => format!("{}{}", op.symbol(), format_expr(operand)),
        Expression::Binary { op, left, right } => {
            format!("{} {} {}", format_expr(left), op.symbol(), format_expr(right))
        }
        Expression::Grouping(inner) => format!("({})", format_expr(inner)),
        Expression::List(items) => format!("({})", format_list(items)),
        Expression::Call { function, args } => format!("{}({})", function.name(), format_list(args)),
    }
}

fn format_list(items: &[Expression]) -> String {
    items.iter().map(format_expr).collect::<Vec<_>>().join(", ")
}

pub fn format_literal(value: &Value) -> String {
    match value {
        Value::Str(s) => quote(s),
        Value::Number(n) => format_number(*n),
        other => other.to_string(),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_expression;

    #[test]
    fn formats_operators_with_spacing() {
        let expr = parse_expression("age>=18&&country=='US'").unwrap();
        assert_eq!(format_expr(&expr), r#"age >= 18 && country == "US""#);
    }

    #[test]
    fn formats_membership_and_calls() {
        let expr = parse_expression("plan not in ['a','b'] || ROUND(x,2) > 1").unwrap();
        assert_eq!(format_expr(&expr), r#"plan not in ("a", "b") || round(x, 2) > 1"#);
    }

    #[test]
    fn formats_unary_and_groups() {
        let expr = parse_expression("!(a || b) && -x < -1.5").unwrap();
        assert_eq!(format_expr(&expr), "!(a || b) && -x < -1.5");
    }

    #[test]
    fn escapes_strings() {
        let value = Value::Str("say \"hi\"\n\\ \u{1}".into());
        assert_eq!(format_literal(&value), r#""say \"hi\"\n\\ \u{1}""#);
    }

    #[test]
    fn formats_literals() {
        assert_eq!(format_literal(&Value::Null), "null");
        assert_eq!(format_literal(&Value::Bool(false)), "false");
        assert_eq!(format_literal(&Value::Number(3.0)), "3");
    }
}
