use crate::{Expr, SourceType, Span, Stmt};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeQualifier {
    Const,
    In,
    Out,
    Uniform,
}

impl fmt::Display for TypeQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeQualifier::Const => write!(f, "const"),
            TypeQualifier::In => write!(f, "in"),
            TypeQualifier::Out => write!(f, "out"),
            TypeQualifier::Uniform => write!(f, "uniform"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: SourceType,
    pub qualifier: Option<TypeQualifier>,
    pub init: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: SourceType) -> Self {
        Self {
            name: name.into(),
            ty,
            qualifier: None,
            init: None,
            span: Span::default(),
        }
    }

    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }

    pub fn with_qualifier(mut self, qualifier: TypeQualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnDecl {
    pub name: String,
    pub return_type: SourceType,
    pub return_qualifier: Option<TypeQualifier>,
    pub params: Vec<VarDecl>,
    /// `None` for a prototype.
    pub body: Option<Stmt>,
    #[serde(default)]
    pub span: Span,
}

impl FnDecl {
    pub fn new(
        name: impl Into<String>,
        return_type: SourceType,
        params: Vec<VarDecl>,
        body: Option<Stmt>,
    ) -> Self {
        Self {
            name: name.into(),
            return_type,
            return_qualifier: None,
            params,
            body,
            span: Span::default(),
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_prototype(&self) -> bool {
        self.body.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Var(VarDecl),
    Function(FnDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Var(var) => &var.name,
            Decl::Function(func) => &func.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Decl::Var(var) => var.span,
            Decl::Function(func) => func.span,
        }
    }
}

/// A whole translation unit: top-level declarations in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub decls: Vec<Decl>,
}

impl Program {
    pub fn new(decls: Vec<Decl>) -> Self {
        Self { decls }
    }
}
