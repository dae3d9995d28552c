pub mod ast;
mod error;
pub mod format;
pub mod lexer;
pub mod parse_utils;
mod parser;
mod value;

pub use error::{LexError, LexErrorReason, ParseError, ParseErrorKind};
pub use lexer::tokenize;
pub use parser::{ParseLimits, parse_expression, parse_expression_with};
pub use value::{Value, ValueKind, format_number};
