/*! Syntax tree for the Glimmer shading language.
 *
 * The tree is produced by the front end after name resolution and type checking.
 * The back end only reads it: every node is owned by its parent, nothing is shared,
 * and declared types are already resolved. Nodes serialize with serde so a front end
 * living in another process can hand the tree over as JSON.
 */

pub mod decl;
pub mod expr;
pub mod stmt;
pub mod types;

pub use decl::{Decl, FnDecl, Program, TypeQualifier, VarDecl};
pub use expr::{AssignOp, BinaryOp, Expr, ExprKind, PostfixOp, UnaryOp};
pub use stmt::{Stmt, StmtKind, SwitchCase};
pub use types::SourceType;

use serde::{Deserialize, Serialize};

/// Position of a node in the original source text, 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
