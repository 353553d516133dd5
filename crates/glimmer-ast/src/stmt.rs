use crate::{Expr, Span, VarDecl};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Block {
        decls: Vec<VarDecl>,
        stmts: Vec<Stmt>,
    },
    Decl(VarDecl),
    Expr(Expr),
    If {
        test: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    For {
        init: Option<Expr>,
        test: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    Switch {
        expr: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Box<Stmt>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub label: Expr,
    pub body: Stmt,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn block(decls: Vec<VarDecl>, stmts: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Block { decls, stmts })
    }

    pub fn decl(decl: VarDecl) -> Self {
        Self::new(StmtKind::Decl(decl))
    }

    pub fn expr(expr: Expr) -> Self {
        Self::new(StmtKind::Expr(expr))
    }

    pub fn if_then(test: Expr, then_branch: Stmt) -> Self {
        Self::new(StmtKind::If {
            test,
            then_branch: Box::new(then_branch),
            else_branch: None,
        })
    }

    pub fn if_else(test: Expr, then_branch: Stmt, else_branch: Stmt) -> Self {
        Self::new(StmtKind::If {
            test,
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        })
    }

    pub fn for_loop(init: Option<Expr>, test: Option<Expr>, step: Option<Expr>, body: Stmt) -> Self {
        Self::new(StmtKind::For {
            init,
            test,
            step,
            body: Box::new(body),
        })
    }

    pub fn while_loop(test: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::While {
            test,
            body: Box::new(body),
        })
    }

    pub fn break_() -> Self {
        Self::new(StmtKind::Break)
    }

    pub fn continue_() -> Self {
        Self::new(StmtKind::Continue)
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Return(value))
    }
}

