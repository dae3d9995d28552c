use winnow::ascii::multispace0;
use winnow::combinator::{cut_err, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, literal, one_of, take_while};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

pub fn ident<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    // First character must be alphabetic or underscore (not digit).
    if !input.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Parse a single- or double-quoted string literal and decode its escapes.
///
/// Supported escapes: `\\ \" \' \n \t \r \0 \u{XXXX}`.
///
/// On an unknown escape the input is left at the offending backslash; on a
/// missing closing quote it is left at the end of input.
pub fn quoted_string(input: &mut &str) -> ModalResult<String> {
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let mut out = String::new();
    loop {
        let chunk = take_while(0.., |c: char| c != quote && c != '\\').parse_next(input)?;
        out.push_str(chunk);

        let checkpoint = *input;
        if opt(one_of('\\')).parse_next(input)?.is_some() {
            match escape.parse_next(input) {
                Ok(c) => out.push(c),
                Err(_) => {
                    *input = checkpoint;
                    return Err(ErrMode::Cut(ContextError::new()));
                }
            }
        } else {
            cut_err(one_of(quote)).parse_next(input)?;
            return Ok(out);
        }
    }
}

fn escape(input: &mut &str) -> ModalResult<char> {
    match any.parse_next(input)? {
        c @ ('\\' | '"' | '\'') => Ok(c),
        'n' => Ok('\n'),
        't' => Ok('\t'),
        'r' => Ok('\r'),
        '0' => Ok('\0'),
        'u' => unicode_escape.parse_next(input),
        _ => Err(ErrMode::Backtrack(ContextError::new())),
    }
}

/// `{XXXX}` after `\u`: one to six hex digits naming a Unicode scalar value.
fn unicode_escape(input: &mut &str) -> ModalResult<char> {
    literal("{").parse_next(input)?;
    let hex = take_while(1..=6, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    literal("}").parse_next(input)?;
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
}

// ---------------------------------------------------------------------------
// Whitespace & comments
// ---------------------------------------------------------------------------

/// Skip whitespace and `# ...` line comments.
pub fn ws_skip(input: &mut &str) -> ModalResult<()> {
    loop {
        let _ = multispace0.parse_next(input)?;
        if opt(literal("#")).parse_next(input)?.is_some() {
            let _ = take_while(0.., |c: char| c != '\n').parse_next(input)?;
        } else {
            break;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Number literal
// ---------------------------------------------------------------------------

/// Parse an unsigned number literal: `digits ['.' digits] [exponent]`.
///
/// A dot that is not followed by a digit is left in the input so that
/// `tags.0.name` still lexes as a path. A literal running straight into an
/// identifier character (`12abc`) or an exponent without digits (`1e`) is a
/// hard error.
pub fn number_literal(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let _ = opt((literal("."), take_while(1.., |c: char| c.is_ascii_digit()))).parse_next(input)?;
    if opt(one_of(['e', 'E'])).parse_next(input)?.is_some() {
        let _ = opt(one_of(['+', '-'])).parse_next(input)?;
        cut_err(take_while(1.., |c: char| c.is_ascii_digit())).parse_next(input)?;
    }
    if input.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ErrMode::Cut(ContextError::new()));
    }
    let text = &start[..start.len() - input.len()];
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ErrMode::Cut(ContextError::new())),
    }
}
