mod token;

pub use token::{Operator, Punct, Token, TokenKind};

use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::literal;

use crate::error::{LexError, LexErrorReason};
use crate::parse_utils::{ident, number_literal, quoted_string, ws_skip};
use crate::value::Value;

/// Split `source` into tokens, terminated by an [`TokenKind::Eof`] token
/// positioned at `source.len()`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut input = source;
    let mut tokens = Vec::new();
    loop {
        let _ = ws_skip.parse_next(&mut input);
        let offset = source.len() - input.len();
        let Some(first) = input.chars().next() else {
            tokens.push(Token::new(TokenKind::Eof, "", offset));
            return Ok(tokens);
        };

        let rest = input;
        let kind = if first.is_ascii_digit() {
            match number_literal.parse_next(&mut input) {
                Ok(n) => TokenKind::Literal(Value::Number(n)),
                Err(_) => return Err(lex_error(offset, LexErrorReason::InvalidNumber)),
            }
        } else if first == '"' || first == '\'' {
            match quoted_string.parse_next(&mut input) {
                Ok(s) => TokenKind::Literal(Value::Str(s)),
                Err(_) if input.starts_with('\\') => {
                    let at = source.len() - input.len();
                    return Err(lex_error(at, LexErrorReason::InvalidEscape));
                }
                Err(_) => return Err(lex_error(offset, LexErrorReason::UnterminatedString)),
            }
        } else if first.is_ascii_alphabetic() || first == '_' {
            match ident.parse_next(&mut input) {
                Ok(word) => token::keyword(word).unwrap_or_else(|| TokenKind::Ident(word.to_string())),
                Err(_) => return Err(lex_error(offset, LexErrorReason::UnexpectedChar(first))),
            }
        } else if let Ok(op) = operator.parse_next(&mut input) {
            TokenKind::Operator(op)
        } else if let Ok(p) = punct.parse_next(&mut input) {
            TokenKind::Punct(p)
        } else {
            return Err(lex_error(offset, LexErrorReason::UnexpectedChar(first)));
        };

        let lexeme = &rest[..rest.len() - input.len()];
        tokens.push(Token::new(kind, lexeme, offset));
    }
}

fn lex_error(position: usize, reason: LexErrorReason) -> LexError {
    LexError { position, reason }
}

fn operator(input: &mut &str) -> ModalResult<Operator> {
    // Two-character operators first so `<=` is not split into `<` `=`.
    alt((
        literal("==").value(Operator::EqEq),
        literal("!=").value(Operator::NotEq),
        literal("<=").value(Operator::Le),
        literal(">=").value(Operator::Ge),
        literal("&&").value(Operator::AndAnd),
        literal("||").value(Operator::OrOr),
        literal("<").value(Operator::Lt),
        literal(">").value(Operator::Gt),
        literal("!").value(Operator::Bang),
        literal("+").value(Operator::Plus),
        literal("-").value(Operator::Minus),
        literal("*").value(Operator::Star),
        literal("/").value(Operator::Slash),
        literal("%").value(Operator::Percent),
    ))
    .parse_next(input)
}

fn punct(input: &mut &str) -> ModalResult<Punct> {
    alt((
        literal("(").value(Punct::LParen),
        literal(")").value(Punct::RParen),
        literal("[").value(Punct::LBracket),
        literal("]").value(Punct::RBracket),
        literal(",").value(Punct::Comma),
        literal(".").value(Punct::Dot),
    ))
    .parse_next(input)
}
