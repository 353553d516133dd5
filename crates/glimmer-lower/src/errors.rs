use glimmer_ast::Span;
use glimmer_core::IrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LowerError {
    #[error("{span}: redeclaration of '{name}' in the same scope (previous declaration at {previous})")]
    ScopeConflict {
        name: String,
        span: Span,
        previous: Span,
    },

    #[error("{span}: '{statement}' outside of a loop")]
    ControlFlowMisuse { statement: &'static str, span: Span },

    #[error("{span}: function '{function}' can reach its end without returning a value")]
    MissingReturn { function: String, span: Span },

    #[error("{span}: unresolved reference to '{name}'")]
    UnresolvedReference { name: String, span: Span },

    #[error("Type {0} has no IR representation")]
    UnmappableType(String),

    #[error("{span}: {construct} is not implemented")]
    Unsupported { construct: String, span: Span },

    #[error("{span}: expression is not assignable")]
    InvalidLvalue { span: Span },

    #[error("Internal lowering error: {0}")]
    Internal(String),

    #[error("IR builder error: {0}")]
    Builder(#[from] IrError),

    #[error("{} errors occurred: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<LowerError>),
}

impl LowerError {
    /// Fatal errors abort the compilation unit. The rest are collected and
    /// reported together once the whole program has been walked.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            LowerError::ScopeConflict { .. }
                | LowerError::ControlFlowMisuse { .. }
                | LowerError::MissingReturn { .. }
                | LowerError::Multiple(_)
        )
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            LowerError::ScopeConflict { span, .. }
            | LowerError::ControlFlowMisuse { span, .. }
            | LowerError::MissingReturn { span, .. }
            | LowerError::UnresolvedReference { span, .. }
            | LowerError::Unsupported { span, .. }
            | LowerError::InvalidLvalue { span } => Some(*span),
            _ => None,
        }
    }

    /// The individual errors, flattening `Multiple`.
    pub fn errors(&self) -> Vec<&LowerError> {
        match self {
            LowerError::Multiple(errors) => errors.iter().flat_map(|e| e.errors()).collect(),
            other => vec![other],
        }
    }

    pub fn unsupported(construct: impl Into<String>, span: Span) -> Self {
        LowerError::Unsupported {
            construct: construct.into(),
            span,
        }
    }
}

fn join_errors(errors: &[LowerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, LowerError>;
