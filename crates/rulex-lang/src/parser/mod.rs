mod limits;

pub use limits::ParseLimits;

use crate::ast::{BinaryOp, Expression, Function, UnaryOp};
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Operator, Punct, Token, TokenKind, tokenize};
use crate::value::Value;

type PResult<T> = Result<T, ParseError>;

// ---------------------------------------------------------------------------
// Public entry
// ---------------------------------------------------------------------------

/// Parse `source` with the default [`ParseLimits`].
pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    parse_expression_with(source, &ParseLimits::default())
}

/// Parse `source` into an [`Expression`], consuming every token.
pub fn parse_expression_with(source: &str, limits: &ParseLimits) -> Result<Expression, ParseError> {
    if source.len() > limits.max_input_bytes {
        return Err(ParseError::new(
            0,
            ParseErrorKind::InputTooLong {
                len: source.len(),
                limit: limits.max_input_bytes,
            },
        ));
    }
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        limits,
    };
    let node = parser.or_expr()?;
    parser.expect_end()?;
    Ok(node.expr)
}

// ---------------------------------------------------------------------------
// Parser state
// ---------------------------------------------------------------------------

/// A built expression together with its height (a leaf has height 1).
struct Node {
    expr: Expression,
    height: usize,
}

impl Node {
    fn leaf(expr: Expression) -> Self {
        Self { expr, height: 1 }
    }
}

struct Parser<'a> {
    /// Always ends with an `Eof` token; `pos` never moves past it.
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    limits: &'a ParseLimits,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Consume the current token and return its offset.
    fn bump(&mut self) -> usize {
        let offset = self.tokens[self.pos].offset;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        offset
    }

    fn eat_punct(&mut self, p: Punct) -> bool {
        if self.peek().is_punct(p) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: Punct) -> PResult<()> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", punct_str(p))))
        }
    }

    fn expect_end(&self) -> PResult<()> {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => Ok(()),
            _ => Err(ParseError::new(
                token.offset,
                ParseErrorKind::TrailingInput {
                    found: token.describe(),
                },
            )),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::new(
            token.offset,
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: token.describe(),
            },
        )
    }

    fn too_complex(&self, at: usize) -> ParseError {
        ParseError::new(
            at,
            ParseErrorKind::TooComplex {
                limit: self.limits.effective_depth(),
            },
        )
    }

    /// Run `f` one nesting level deeper, failing once the depth budget is spent.
    fn nested<T>(&mut self, at: usize, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.limits.effective_depth() {
            return Err(self.too_complex(at));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn node(&self, at: usize, expr: Expression, height: usize) -> PResult<Node> {
        if height > self.limits.effective_depth() {
            return Err(self.too_complex(at));
        }
        Ok(Node { expr, height })
    }

    fn binary(&self, at: usize, op: BinaryOp, left: Node, right: Node) -> PResult<Node> {
        let height = left.height.max(right.height) + 1;
        self.node(at, Expression::binary(op, left.expr, right.expr), height)
    }

    /// Left-associative loop shared by the plain binary levels.
    fn binary_level(
        &mut self,
        next: fn(&mut Self) -> PResult<Node>,
        op_of: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> PResult<Node> {
        let mut left = next(self)?;
        while let Some(op) = op_of(&self.peek().kind) {
            let at = self.bump();
            let right = next(self)?;
            left = self.binary(at, op, left, right)?;
        }
        Ok(left)
    }

    // -----------------------------------------------------------------------
    // Precedence levels (lowest to highest)
    // -----------------------------------------------------------------------

    /// `or_expr = and_expr { "||" and_expr }`
    fn or_expr(&mut self) -> PResult<Node> {
        self.binary_level(Self::and_expr, |kind| match kind {
            TokenKind::Operator(Operator::OrOr) => Some(BinaryOp::Or),
            _ => None,
        })
    }

    /// `and_expr = eq_expr { "&&" eq_expr }`
    fn and_expr(&mut self) -> PResult<Node> {
        self.binary_level(Self::eq_expr, |kind| match kind {
            TokenKind::Operator(Operator::AndAnd) => Some(BinaryOp::And),
            _ => None,
        })
    }

    /// `eq_expr = rel_expr { ("==" | "!=") rel_expr }`
    fn eq_expr(&mut self) -> PResult<Node> {
        self.binary_level(Self::rel_expr, |kind| match kind {
            TokenKind::Operator(Operator::EqEq) => Some(BinaryOp::Eq),
            TokenKind::Operator(Operator::NotEq) => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    /// `rel_expr = member_expr { ("<" | "<=" | ">" | ">=") member_expr }`
    fn rel_expr(&mut self) -> PResult<Node> {
        self.binary_level(Self::member_expr, |kind| match kind {
            TokenKind::Operator(Operator::Lt) => Some(BinaryOp::Lt),
            TokenKind::Operator(Operator::Le) => Some(BinaryOp::Le),
            TokenKind::Operator(Operator::Gt) => Some(BinaryOp::Gt),
            TokenKind::Operator(Operator::Ge) => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    /// `member_expr = add_expr { ["not"] "in" (list | add_expr) }`
    fn member_expr(&mut self) -> PResult<Node> {
        let mut left = self.add_expr()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Operator(Operator::In) => BinaryOp::In,
                TokenKind::Operator(Operator::Not) => BinaryOp::NotIn,
                _ => break,
            };
            let at = self.bump();
            if op == BinaryOp::NotIn {
                if !self.peek().is_operator(Operator::In) {
                    return Err(self.unexpected("'in' after 'not'"));
                }
                self.bump();
            }
            let right = if self.peek().is_punct(Punct::LParen) || self.peek().is_punct(Punct::LBracket) {
                self.list()?
            } else {
                self.add_expr()?
            };
            left = self.binary(at, op, left, right)?;
        }
        Ok(left)
    }

    /// `list = "(" expr {"," expr} [","] ")" | "[" expr {"," expr} [","] "]"`
    fn list(&mut self) -> PResult<Node> {
        let close = if self.peek().is_punct(Punct::LParen) {
            Punct::RParen
        } else {
            Punct::RBracket
        };
        let at = self.bump();
        let items = self.nested(at, |p| p.items(close, true))?;
        let height = items.iter().map(|n| n.height).max().unwrap_or(0) + 1;
        let items = items.into_iter().map(|n| n.expr).collect();
        self.node(at, Expression::List(items), height)
    }

    /// `add_expr = mul_expr { ("+" | "-") mul_expr }`
    fn add_expr(&mut self) -> PResult<Node> {
        self.binary_level(Self::mul_expr, |kind| match kind {
            TokenKind::Operator(Operator::Plus) => Some(BinaryOp::Add),
            TokenKind::Operator(Operator::Minus) => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    /// `mul_expr = unary_expr { ("*" | "/" | "%") unary_expr }`
    fn mul_expr(&mut self) -> PResult<Node> {
        self.binary_level(Self::unary_expr, |kind| match kind {
            TokenKind::Operator(Operator::Star) => Some(BinaryOp::Mul),
            TokenKind::Operator(Operator::Slash) => Some(BinaryOp::Div),
            TokenKind::Operator(Operator::Percent) => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    /// `unary_expr = ("-" | "!") unary_expr | primary`
    ///
    /// `-` directly followed by a number literal folds into a negative literal.
    fn unary_expr(&mut self) -> PResult<Node> {
        let op = match self.peek().kind {
            TokenKind::Operator(Operator::Minus) => UnaryOp::Neg,
            TokenKind::Operator(Operator::Bang) => UnaryOp::Not,
            _ => return self.primary(),
        };
        let at = self.bump();
        if let (UnaryOp::Neg, TokenKind::Literal(Value::Number(n))) = (op, &self.peek().kind) {
            let folded = Expression::Literal(Value::Number(-*n));
            self.bump();
            return Ok(Node::leaf(folded));
        }
        let operand = self.nested(at, Self::unary_expr)?;
        let height = operand.height + 1;
        self.node(at, Expression::unary(op, operand.expr), height)
    }

    // -----------------------------------------------------------------------
    // Primary
    // -----------------------------------------------------------------------

    /// `primary = literal | ident "(" args ")" | path | "(" expr ")"`
    fn primary(&mut self) -> PResult<Node> {
        let token = self.peek();
        let at = token.offset;
        match &token.kind {
            TokenKind::Literal(value) => {
                let value = value.clone();
                self.bump();
                Ok(Node::leaf(Expression::Literal(value)))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                if self.peek().is_punct(Punct::LParen) {
                    self.call(at, &name)
                } else {
                    self.field_path(name)
                }
            }
            TokenKind::Punct(Punct::LParen) => {
                self.bump();
                let inner = self.nested(at, |p| {
                    let inner = p.or_expr()?;
                    p.expect_punct(Punct::RParen)?;
                    Ok(inner)
                })?;
                let height = inner.height + 1;
                self.node(at, Expression::Grouping(Box::new(inner.expr)), height)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `path = ident { "." (ident | index) }`
    fn field_path(&mut self, first: String) -> PResult<Node> {
        let mut path = first;
        while self.eat_punct(Punct::Dot) {
            let token = self.peek();
            let segment = match &token.kind {
                TokenKind::Ident(name) => name.clone(),
                TokenKind::Literal(Value::Number(_)) if is_index(&token.lexeme) => token.lexeme.clone(),
                _ => return Err(self.unexpected("field name after '.'")),
            };
            self.bump();
            path.push('.');
            path.push_str(&segment);
        }
        Ok(Node::leaf(Expression::Field(path)))
    }

    fn call(&mut self, at: usize, name: &str) -> PResult<Node> {
        let function = Function::lookup(name).ok_or_else(|| {
            ParseError::new(
                at,
                ParseErrorKind::UnknownFunction {
                    name: name.to_string(),
                },
            )
        })?;
        self.bump();
        let args = self.nested(at, |p| p.items(Punct::RParen, false))?;
        if !function.accepts(args.len()) {
            return Err(ParseError::new(
                at,
                ParseErrorKind::Arity {
                    function: function.name(),
                    expected: describe_arity(function.arity()),
                    found: args.len(),
                },
            ));
        }
        let height = args.iter().map(|n| n.height).max().unwrap_or(0) + 1;
        let args = args.into_iter().map(|n| n.expr).collect();
        self.node(at, Expression::Call { function, args }, height)
    }

    /// Comma-separated expressions up to and including `close`.
    ///
    /// List literals need at least one item and allow a trailing comma; call
    /// arguments may be empty and do not.
    fn items(&mut self, close: Punct, list: bool) -> PResult<Vec<Node>> {
        let mut items = Vec::new();
        if !list && self.eat_punct(close) {
            return Ok(items);
        }
        loop {
            items.push(self.or_expr()?);
            if self.eat_punct(Punct::Comma) {
                if list && self.eat_punct(close) {
                    return Ok(items);
                }
                continue;
            }
            if self.eat_punct(close) {
                return Ok(items);
            }
            return Err(self.unexpected(&format!("',' or '{}'", punct_str(close))));
        }
    }
}

fn punct_str(p: Punct) -> &'static str {
    match p {
        Punct::LParen => "(",
        Punct::RParen => ")",
        Punct::LBracket => "[",
        Punct::RBracket => "]",
        Punct::Comma => ",",
        Punct::Dot => ".",
    }
}

/// Array index segments such as `0` in `tags.0.name`; `0.1` arrives as a
/// single number token and is accepted as two segments.
fn is_index(lexeme: &str) -> bool {
    lexeme.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

fn describe_arity((min, max): (usize, Option<usize>)) -> String {
    match max {
        None => format!("at least {min}"),
        Some(max) if max == min => min.to_string(),
        Some(max) => format!("{min} to {max}"),
    }
}
