//! Compiler for gettext-style plural expressions.
//!
//! A plural expression maps an integer quantity `n` (also accepted as
//! `value`) to the index of the plural form to use, e.g.
//!
//! ```text
//! n % 10 == 1 && n % 100 != 11 ? 0 : n % 10 >= 2 && n % 10 <= 4 && (n % 100 < 10 || n % 100 >= 20) ? 1 : 2
//! ```
//!
//! Supported syntax, from lowest to highest precedence:
//!
//! | operators               | operands          | result  |
//! |-------------------------|-------------------|---------|
//! | `c ? a : b` (right)     | bool, T, T        | T       |
//! | `\|\|`                  | bool              | bool    |
//! | `&&`                    | bool              | bool    |
//! | `==` `!=`               | T, T              | bool    |
//! | `<` `<=` `>` `>=`       | int               | bool    |
//! | `%`                     | int               | int     |
//! | `!` (prefix)            | bool              | bool    |
//! | literals, `n`, `( )`    |                   |         |
//!
//! Compilation is two passes: [`parse`] builds an [`Expr`] tree, then a type
//! check rejects operands of the wrong kind. A boolean-valued expression is
//! accepted as a whole and yields `0` for false and `1` for true.

use std::fmt;

use thiserror::Error;

/// Names accepted for the quantity variable.
pub const VARIABLE_NAMES: [&str; 2] = ["n", "value"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluralError {
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("semantic error at offset {offset}: {message}")]
    Semantic { offset: usize, message: String },
}

impl PluralError {
    fn parse(offset: usize, message: impl Into<String>) -> Self {
        PluralError::Parse {
            offset,
            message: message.into(),
        }
    }

    fn semantic(offset: usize, message: impl Into<String>) -> Self {
        PluralError::Semantic {
            offset,
            message: message.into(),
        }
    }

    /// Character offset into the expression source.
    pub fn offset(&self) -> usize {
        match self {
            PluralError::Parse { offset, .. } | PluralError::Semantic { offset, .. } => *offset,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PluralError::Parse { message, .. } | PluralError::Semantic { message, .. } => message,
        }
    }
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
    Rem,
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
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Bool,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("integer"),
            Type::Bool => f.write_str("boolean"),
        }
    }
}

/// Expression tree node; `offset` is the character offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Variable(String),
    Int(i64),
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Int(i64),
    Ident(String),
    Question,
    Colon,
    AndAnd,
    OrOr,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Percent,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Int(v) => return write!(f, "`{}`", v),
            TokenKind::Ident(name) => return write!(f, "`{}`", name),
            TokenKind::Question => "`?`",
            TokenKind::Colon => "`:`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::Bang => "`!`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::Le => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::Ge => "`>=`",
            TokenKind::Percent => "`%`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Eof => "end of expression",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, PluralError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let next = chars.get(i + 1).copied();
        let (kind, len) = match (c, next) {
            ('&', Some('&')) => (TokenKind::AndAnd, 2),
            ('|', Some('|')) => (TokenKind::OrOr, 2),
            ('=', Some('=')) => (TokenKind::EqEq, 2),
            ('!', Some('=')) => (TokenKind::NotEq, 2),
            ('<', Some('=')) => (TokenKind::Le, 2),
            ('>', Some('=')) => (TokenKind::Ge, 2),
            ('<', _) => (TokenKind::Lt, 1),
            ('>', _) => (TokenKind::Gt, 1),
            ('!', _) => (TokenKind::Bang, 1),
            ('?', _) => (TokenKind::Question, 1),
            (':', _) => (TokenKind::Colon, 1),
            ('%', _) => (TokenKind::Percent, 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            (c, _) if c.is_ascii_digit() => {
                let mut j = i;
                while j < chars.len() && chars[j].is_ascii_digit() {
                    j += 1;
                }
                let digits: String = chars[i..j].iter().collect();
                let value = digits.parse::<i64>().map_err(|_| {
                    PluralError::parse(start, format!("integer literal `{}` is too large", digits))
                })?;
                (TokenKind::Int(value), j - i)
            }
            (c, _) if c.is_ascii_alphabetic() || c == '_' => {
                let mut j = i;
                while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                    j += 1;
                }
                (TokenKind::Ident(chars[i..j].iter().collect()), j - i)
            }
            (c, _) => {
                return Err(PluralError::parse(
                    start,
                    format!("unexpected character `{}`", c),
                ));
            }
        };
        tokens.push(Token { kind, offset: start });
        i += len;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: chars.len(),
    });
    Ok(tokens)
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> &Token {
        // `tokens` always ends with `Eof`, which is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, PluralError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(PluralError::parse(
                token.offset,
                format!("expected {}, found {}", kind, token.kind),
            ))
        }
    }

    fn conditional(&mut self) -> Result<Expr, PluralError> {
        let cond = self.or()?;
        if self.peek().kind != TokenKind::Question {
            return Ok(cond);
        }
        self.advance();
        let then = self.conditional()?;
        self.expect(TokenKind::Colon)?;
        let otherwise = self.conditional()?;
        Ok(Expr {
            offset: cond.offset,
            kind: ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
        })
    }

    /// Parses a left-associative chain of the binary operators in `ops`.
    fn binary_chain(
        &mut self,
        ops: &[(TokenKind, BinaryOp)],
        operand: fn(&mut Self) -> Result<Expr, PluralError>,
    ) -> Result<Expr, PluralError> {
        let mut lhs = operand(self)?;
        while let Some(&(_, op)) = ops.iter().find(|(kind, _)| *kind == self.peek().kind) {
            self.advance();
            let rhs = operand(self)?;
            lhs = Expr {
                offset: lhs.offset,
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
            };
        }
        Ok(lhs)
    }

    fn or(&mut self) -> Result<Expr, PluralError> {
        self.binary_chain(&[(TokenKind::OrOr, BinaryOp::Or)], Self::and)
    }

    fn and(&mut self) -> Result<Expr, PluralError> {
        self.binary_chain(&[(TokenKind::AndAnd, BinaryOp::And)], Self::equality)
    }

    fn equality(&mut self) -> Result<Expr, PluralError> {
        self.binary_chain(
            &[
                (TokenKind::EqEq, BinaryOp::Eq),
                (TokenKind::NotEq, BinaryOp::Ne),
            ],
            Self::relational,
        )
    }

    fn relational(&mut self) -> Result<Expr, PluralError> {
        self.binary_chain(
            &[
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Le, BinaryOp::Le),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::Ge, BinaryOp::Ge),
            ],
            Self::remainder,
        )
    }

    fn remainder(&mut self) -> Result<Expr, PluralError> {
        self.binary_chain(&[(TokenKind::Percent, BinaryOp::Rem)], Self::unary)
    }

    fn unary(&mut self) -> Result<Expr, PluralError> {
        if self.peek().kind == TokenKind::Bang {
            let bang = self.advance();
            let operand = self.unary()?;
            return Ok(Expr {
                offset: bang.offset,
                kind: ExprKind::Not(Box::new(operand)),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, PluralError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Int(value) => Ok(Expr {
                offset: token.offset,
                kind: ExprKind::Int(value),
            }),
            TokenKind::Ident(name) => Ok(Expr {
                offset: token.offset,
                kind: ExprKind::Variable(name),
            }),
            TokenKind::LParen => {
                let inner = self.conditional()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            other => Err(PluralError::parse(
                token.offset,
                format!("expected expression, found {}", other),
            )),
        }
    }
}

/// First pass: parses `source` into an expression tree.
pub fn parse(source: &str) -> Result<Expr, PluralError> {
    let mut parser = ExprParser {
        tokens: tokenize(source)?,
        pos: 0,
    };
    let expr = parser.conditional()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(PluralError::parse(
            trailing.offset,
            format!("unexpected {} after expression", trailing.kind),
        ));
    }
    Ok(expr)
}

fn expect_type(expr: &Expr, expected: Type, context: &str) -> Result<(), PluralError> {
    let found = type_of(expr)?;
    if found == expected {
        Ok(())
    } else {
        Err(PluralError::semantic(
            expr.offset,
            format!("{} must be {}, found {}", context, expected, found),
        ))
    }
}

/// Second pass: computes the type of `expr`, rejecting ill-typed operands.
pub fn type_of(expr: &Expr) -> Result<Type, PluralError> {
    match &expr.kind {
        ExprKind::Variable(name) => {
            if VARIABLE_NAMES.contains(&name.as_str()) {
                Ok(Type::Int)
            } else {
                Err(PluralError::semantic(
                    expr.offset,
                    format!("unknown variable `{}`, expected `n`", name),
                ))
            }
        }
        ExprKind::Int(_) => Ok(Type::Int),
        ExprKind::Not(operand) => {
            expect_type(operand, Type::Bool, "operand of `!`")?;
            Ok(Type::Bool)
        }
        ExprKind::Binary { op, lhs, rhs } => match op {
            BinaryOp::Or | BinaryOp::And => {
                let context = format!("operand of `{}`", op.symbol());
                expect_type(lhs, Type::Bool, &context)?;
                expect_type(rhs, Type::Bool, &context)?;
                Ok(Type::Bool)
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                let left = type_of(lhs)?;
                expect_type(rhs, left, &format!("right operand of `{}`", op.symbol()))?;
                Ok(Type::Bool)
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let context = format!("operand of `{}`", op.symbol());
                expect_type(lhs, Type::Int, &context)?;
                expect_type(rhs, Type::Int, &context)?;
                Ok(Type::Bool)
            }
            BinaryOp::Rem => {
                expect_type(lhs, Type::Int, "operand of `%`")?;
                expect_type(rhs, Type::Int, "operand of `%`")?;
                if rhs.kind == ExprKind::Int(0) {
                    return Err(PluralError::semantic(rhs.offset, "modulo by zero"));
                }
                Ok(Type::Int)
            }
        },
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            expect_type(cond, Type::Bool, "condition of `?:`")?;
            let branch = type_of(then)?;
            expect_type(otherwise, branch, "both branches of `?:`")?;
            Ok(branch)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    fn as_int(self) -> i64 {
        match self {
            Value::Int(v) => v,
            Value::Bool(b) => b as i64,
        }
    }

    fn as_bool(self) -> bool {
        match self {
            Value::Int(v) => v != 0,
            Value::Bool(b) => b,
        }
    }
}

fn eval(expr: &Expr, n: i64) -> Value {
    match &expr.kind {
        ExprKind::Variable(_) => Value::Int(n),
        ExprKind::Int(v) => Value::Int(*v),
        ExprKind::Not(operand) => Value::Bool(!eval(operand, n).as_bool()),
        ExprKind::Binary { op, lhs, rhs } => {
            let int = |e: &Expr| eval(e, n).as_int();
            match op {
                BinaryOp::Or => Value::Bool(eval(lhs, n).as_bool() || eval(rhs, n).as_bool()),
                BinaryOp::And => Value::Bool(eval(lhs, n).as_bool() && eval(rhs, n).as_bool()),
                BinaryOp::Eq => Value::Bool(eval(lhs, n) == eval(rhs, n)),
                BinaryOp::Ne => Value::Bool(eval(lhs, n) != eval(rhs, n)),
                BinaryOp::Lt => Value::Bool(int(lhs) < int(rhs)),
                BinaryOp::Le => Value::Bool(int(lhs) <= int(rhs)),
                BinaryOp::Gt => Value::Bool(int(lhs) > int(rhs)),
                BinaryOp::Ge => Value::Bool(int(lhs) >= int(rhs)),
                BinaryOp::Rem => Value::Int(int(lhs).checked_rem(int(rhs)).unwrap_or(0)),
            }
        }
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            if eval(cond, n).as_bool() {
                eval(then, n)
            } else {
                eval(otherwise, n)
            }
        }
    }
}

/// Renders `expr` as a Rust expression over an `n: i64` binding.
fn write_rust(expr: &Expr, out: &mut String, nested: bool) {
    let atomic = matches!(expr.kind, ExprKind::Variable(_) | ExprKind::Int(_));
    let wrap = nested && !atomic;
    if wrap {
        out.push('(');
    }
    match &expr.kind {
        ExprKind::Variable(_) => out.push('n'),
        ExprKind::Int(v) => out.push_str(&v.to_string()),
        ExprKind::Not(operand) => {
            out.push('!');
            write_rust(operand, out, true);
        }
        ExprKind::Binary {
            op: BinaryOp::Rem,
            lhs,
            rhs,
        } if !matches!(rhs.kind, ExprKind::Int(_)) => {
            out.push_str("i64::checked_rem(");
            write_rust(lhs, out, false);
            out.push_str(", ");
            write_rust(rhs, out, false);
            out.push_str(").unwrap_or(0)");
        }
        ExprKind::Binary { op, lhs, rhs } => {
            write_rust(lhs, out, true);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_rust(rhs, out, true);
        }
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            out.push_str("if ");
            write_rust(cond, out, false);
            out.push_str(" { ");
            write_rust(then, out, false);
            out.push_str(" } else { ");
            write_rust(otherwise, out, false);
            out.push_str(" }");
        }
    }
    if wrap {
        out.push(')');
    }
}

/// Range of quantities probed by [`PluralRule::find_out_of_range`].
///
/// Sampling is a soundness heuristic, not a proof: a rule can still misbehave
/// for quantities outside this set.
pub fn sample_domain() -> impl Iterator<Item = i64> {
    (-16..=1100).chain([10_000, 1_000_000, i64::MAX, i64::MIN])
}

/// A compiled, type-checked plural rule of one locale.
///
/// Evaluation is a pure function of the quantity; rules are `Send + Sync`
/// and can be shared freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralRule {
    pub locale: String,
    pub forms: usize,
    pub source: String,
    expr: Expr,
    result: Type,
}

impl PluralRule {
    /// Parses and type-checks `source` for a locale with `forms` plural forms.
    pub fn compile(
        locale: impl Into<String>,
        forms: usize,
        source: impl Into<String>,
    ) -> Result<Self, PluralError> {
        let source = source.into();
        let expr = parse(&source)?;
        let result = type_of(&expr)?;
        Ok(PluralRule {
            locale: locale.into(),
            forms,
            source,
            expr,
            result,
        })
    }

    /// False for constant rules such as `0`.
    pub fn uses_variable(&self) -> bool {
        fn visit(expr: &Expr) -> bool {
            match &expr.kind {
                ExprKind::Variable(_) => true,
                ExprKind::Int(_) => false,
                ExprKind::Not(operand) => visit(operand),
                ExprKind::Binary { lhs, rhs, .. } => visit(lhs) || visit(rhs),
                ExprKind::Conditional {
                    cond,
                    then,
                    otherwise,
                } => visit(cond) || visit(then) || visit(otherwise),
            }
        }
        visit(&self.expr)
    }

    /// Raw form index for quantity `n`; not clamped to `[0, forms)`.
    pub fn evaluate(&self, n: i64) -> i64 {
        eval(&self.expr, n).as_int()
    }

    /// Form index for `n`, or `None` if the rule leaves `[0, forms)`.
    pub fn form_index(&self, n: i64) -> Option<usize> {
        usize::try_from(self.evaluate(n))
            .ok()
            .filter(|&index| index < self.forms)
    }

    /// First sampled quantity whose index falls outside `[0, forms)`, with
    /// the offending index.
    pub fn find_out_of_range(&self) -> Option<(i64, i64)> {
        sample_domain()
            .map(|n| (n, self.evaluate(n)))
            .find(|&(_, index)| index < 0 || index as u64 >= self.forms as u64)
    }

    /// The rule as the body of a Rust `fn(n: i64) -> i64`.
    pub fn to_rust(&self) -> String {
        let mut out = String::new();
        if self.result == Type::Bool {
            out.push_str("if ");
            write_rust(&self.expr, &mut out, false);
            out.push_str(" { 1 } else { 0 }");
        } else {
            write_rust(&self.expr, &mut out, false);
        }
        out
    }
}
