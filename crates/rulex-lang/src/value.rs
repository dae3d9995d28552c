use std::fmt;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// Runtime value produced by every sub-expression.
///
/// `f64` is the single numeric representation: integer and decimal literals,
/// JSON numbers and numeric strings all end up as `Number`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

/// The kind of a [`Value`], used in type-mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Str,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::Str => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Str(_) => ValueKind::Str,
        }
    }

    /// Truthiness used by `!`, `&&` and `||`.
    ///
    /// `null`, `false`, `0` and `""` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Textual form that crosses the C boundary.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Renders a value with the fixed per-kind mapping:
///
/// | kind    | text                                  |
/// |---------|---------------------------------------|
/// | Null    | `null`                                |
/// | Bool    | `true` / `false`                      |
/// | Number  | [`format_number`]                     |
/// | Str     | raw content, no quotes                |
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Canonical decimal form of a number.
///
/// Integral values carry no fraction (`3`, `-12`), negative zero prints as
/// `0`, everything else is the shortest decimal that reads back to the same
/// `f64`. Exponent notation is never produced.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{n}")
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_per_kind() {
        assert_eq!(Value::Null.render(), "null");
        assert_eq!(Value::Bool(true).render(), "true");
        assert_eq!(Value::Bool(false).render(), "false");
        assert_eq!(Value::Str("US".into()).render(), "US");
        assert_eq!(Value::Str(String::new()).render(), "");
    }

    #[test]
    fn render_numbers_canonically() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(12.177), "12.177");
        assert_eq!(format_number(1e21), "1000000000000000000000");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Str("0".into()).is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }
}
