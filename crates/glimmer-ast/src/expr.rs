use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    IntLit(i32),
    FloatLit(f32),
    BoolLit(bool),
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// Field access. On vectors the field is a swizzle such as `xy`.
    Field {
        base: Box<Expr>,
        field: String,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    PreIncrement,
    PreDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_relational(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    /// The arithmetic operator a compound assignment applies, `None` for plain `=`.
    pub fn arithmetic(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn int(value: i32) -> Self {
        Self::new(ExprKind::IntLit(value))
    }

    pub fn float(value: f32) -> Self {
        Self::new(ExprKind::FloatLit(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::BoolLit(value))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Var(name.into()))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::new(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Self::compound_assign(AssignOp::Assign, target, value)
    }

    pub fn compound_assign(op: AssignOp, target: Expr, value: Expr) -> Self {
        Self::new(ExprKind::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn postfix(op: PostfixOp, operand: Expr) -> Self {
        Self::new(ExprKind::Postfix {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn conditional(test: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Self::new(ExprKind::Conditional {
            test: Box::new(test),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    pub fn index(base: Expr, index: Expr) -> Self {
        Self::new(ExprKind::Index {
            base: Box::new(base),
            index: Box::new(index),
        })
    }

    pub fn field(base: Expr, field: impl Into<String>) -> Self {
        Self::new(ExprKind::Field {
            base: Box::new(base),
            field: field.into(),
        })
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            callee: callee.into(),
            args,
        })
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            ExprKind::IntLit(_) | ExprKind::FloatLit(_) | ExprKind::BoolLit(_) => "literal",
            ExprKind::Var(_) => "variable reference",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Assign { .. } => "assignment",
            ExprKind::Postfix { .. } => "postfix expression",
            ExprKind::Conditional { .. } => "conditional expression",
            ExprKind::Index { .. } => "array subscript",
            ExprKind::Field { .. } => "field access",
            ExprKind::Call { .. } => "function call",
        }
    }

    /// Whether `name` is read or written anywhere inside this expression.
    pub fn references(&self, name: &str) -> bool {
        match &self.kind {
            ExprKind::IntLit(_) | ExprKind::FloatLit(_) | ExprKind::BoolLit(_) => false,
            ExprKind::Var(var) => var == name,
            ExprKind::Unary { operand, .. } | ExprKind::Postfix { operand, .. } => {
                operand.references(name)
            }
            ExprKind::Field { base, .. } => base.references(name),
            ExprKind::Binary { left, right, .. } => {
                left.references(name) || right.references(name)
            }
            ExprKind::Assign { target, value, .. } => {
                target.references(name) || value.references(name)
            }
            ExprKind::Index { base, index } => base.references(name) || index.references(name),
            ExprKind::Conditional {
                test,
                then_expr,
                else_expr,
            } => {
                test.references(name) || then_expr.references(name) || else_expr.references(name)
            }
            ExprKind::Call { args, .. } => args.iter().any(|arg| arg.references(name)),
        }
    }
}
