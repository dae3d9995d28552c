/// Tokenization failure. `position` is a byte offset into the source text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("lex error at {position}: {reason}")]
pub struct LexError {
    pub position: usize,
    pub reason: LexErrorReason,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexErrorReason {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid escape sequence in string literal")]
    InvalidEscape,
    #[error("malformed number literal")]
    InvalidNumber,
}

impl LexErrorReason {
    pub fn code(&self) -> i32 {
        match self {
            LexErrorReason::UnexpectedChar(_) => 1101,
            LexErrorReason::UnterminatedString => 1102,
            LexErrorReason::InvalidEscape => 1103,
            LexErrorReason::InvalidNumber => 1104,
        }
    }
}

/// Parse failure. `position` is the byte offset of the offending token
/// (the end of the input for a premature end).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at {position}: {kind}")]
pub struct ParseError {
    pub position: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Lex(LexErrorReason),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("unexpected trailing input {found}")]
    TrailingInput { found: String },
    #[error("expression is too complex: nesting exceeds {limit} levels")]
    TooComplex { limit: usize },
    #[error("input is {len} bytes, limit is {limit}")]
    InputTooLong { len: usize, limit: usize },
    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },
    #[error("function `{function}` expects {expected} argument(s), found {found}")]
    Arity {
        function: &'static str,
        expected: String,
        found: usize,
    },
}

impl ParseError {
    pub(crate) fn new(position: usize, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }

    /// What the parser was looking for, when the failure was an unexpected token.
    pub fn expected(&self) -> Option<&str> {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, .. } => Some(expected),
            ParseErrorKind::TrailingInput { .. } => Some("end of input"),
            _ => None,
        }
    }

    /// Description of the token actually found.
    pub fn found(&self) -> Option<&str> {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { found, .. }
            | ParseErrorKind::TrailingInput { found } => Some(found),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match &self.kind {
            ParseErrorKind::Lex(reason) => reason.code(),
            ParseErrorKind::UnexpectedToken { .. } => 1201,
            ParseErrorKind::TrailingInput { .. } => 1202,
            ParseErrorKind::TooComplex { .. } => 1203,
            ParseErrorKind::InputTooLong { .. } => 1204,
            ParseErrorKind::UnknownFunction { .. } => 1205,
            ParseErrorKind::Arity { .. } => 1206,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        Self {
            position: e.position,
            kind: ParseErrorKind::Lex(e.reason),
        }
    }
}
