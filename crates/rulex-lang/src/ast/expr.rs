use crate::value::Value;

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }
}

// ---------------------------------------------------------------------------
// Built-in functions
// ---------------------------------------------------------------------------

/// Built-in function, resolved by name at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Concat,
    Round,
    Ceil,
    Floor,
    Min,
    Max,
    Lower,
    Upper,
    Len,
    Contains,
    RegexMatch,
}

impl Function {
    /// Case-insensitive lookup: `CONCAT` and `concat` name the same function.
    pub fn lookup(name: &str) -> Option<Self> {
        let f = match name.to_ascii_lowercase().as_str() {
            "concat" => Function::Concat,
            "round" => Function::Round,
            "ceil" => Function::Ceil,
            "floor" => Function::Floor,
            "min" => Function::Min,
            "max" => Function::Max,
            "lower" => Function::Lower,
            "upper" => Function::Upper,
            "len" => Function::Len,
            "contains" => Function::Contains,
            "regex_match" => Function::RegexMatch,
            _ => return None,
        };
        Some(f)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Concat => "concat",
            Function::Round => "round",
            Function::Ceil => "ceil",
            Function::Floor => "floor",
            Function::Min => "min",
            Function::Max => "max",
            Function::Lower => "lower",
            Function::Upper => "upper",
            Function::Len => "len",
            Function::Contains => "contains",
            Function::RegexMatch => "regex_match",
        }
    }

    /// Accepted argument count as `(min, max)`; `None` means variadic.
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Function::Concat | Function::Min | Function::Max => (1, None),
            Function::Round | Function::Ceil | Function::Floor => (1, Some(2)),
            Function::Lower | Function::Upper | Function::Len => (1, Some(1)),
            Function::Contains | Function::RegexMatch => (2, Some(2)),
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        let (min, max) = self.arity();
        count >= min && max.is_none_or(|max| count <= max)
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Parsed expression tree.
///
/// Every node owns its children exclusively; a tree is immutable once built
/// and may be evaluated from many threads at once.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant: number, string, boolean or null.
    Literal(Value),
    /// Event field lookup by dotted path, e.g. `age` or `properties.plan`.
    Field(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Parenthesized sub-expression.
    Grouping(Box<Expression>),
    /// `(a, b, ...)` or `[a, b, ...]`, only as the right operand of `in`.
    List(Vec<Expression>),
    Call {
        function: Function,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn field(path: impl Into<String>) -> Self {
        Expression::Field(path.into())
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
