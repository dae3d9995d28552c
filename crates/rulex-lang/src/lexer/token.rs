use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    /// `in` keyword
    In,
    /// `not` keyword, only meaningful before `in`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Literal(Value),
    Operator(Operator),
    Punct(Punct),
    Eof,
}

/// One lexical unit. `offset` is the byte position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            offset,
        }
    }

    /// Human-readable form for diagnostics: `'lexeme'`, or `end of input`.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        self.kind == TokenKind::Operator(op)
    }

    pub fn is_punct(&self, p: Punct) -> bool {
        self.kind == TokenKind::Punct(p)
    }
}

/// Map a word to its keyword token, if it is one.
pub(crate) fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "true" => TokenKind::Literal(Value::Bool(true)),
        "false" => TokenKind::Literal(Value::Bool(false)),
        "null" => TokenKind::Literal(Value::Null),
        "in" => TokenKind::Operator(Operator::In),
        "not" => TokenKind::Operator(Operator::Not),
        _ => return None,
    };
    Some(kind)
}
