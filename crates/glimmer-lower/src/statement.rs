use crate::context::LoweringContext;
use crate::declaration::DeclarationLowerer;
use crate::errors::{LowerError, Result};
use crate::expression::ExpressionLowerer;
use glimmer_ast::{Expr, Span, Stmt, StmtKind, VarDecl};
use glimmer_core::BlockId;
use tracing::trace;

/// Lowers statements, wiring the CFG edges of each construct.
pub struct StatementLowerer<'a, 'ast> {
    ctx: &'a mut LoweringContext<'ast>,
}

impl<'a, 'ast> StatementLowerer<'a, 'ast> {
    pub fn new(ctx: &'a mut LoweringContext<'ast>) -> Self {
        Self { ctx }
    }

    pub fn lower(&mut self, stmt: &'ast Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Block { decls, stmts } => self
                .ctx
                .with_scope(|ctx| StatementLowerer::new(ctx).block_contents(decls, stmts)),
            StmtKind::Decl(decl) => DeclarationLowerer::new(&mut *self.ctx).lower_var(decl),
            StmtKind::Expr(expr) => {
                ExpressionLowerer::new(&mut *self.ctx).rvalue(expr)?;
                Ok(())
            }
            StmtKind::If {
                test,
                then_branch,
                else_branch,
            } => self.if_stmt(test, then_branch, else_branch.as_deref()),
            StmtKind::For {
                init,
                test,
                step,
                body,
            } => self.for_stmt(init.as_ref(), test.as_ref(), step.as_ref(), body),
            StmtKind::While { test, body } => self.while_stmt(test, body),
            StmtKind::Break => {
                let target = self.ctx.current_break_target();
                self.loop_exit("break", target, stmt.span)
            }
            StmtKind::Continue => {
                let target = self.ctx.current_continue_target();
                self.loop_exit("continue", target, stmt.span)
            }
            StmtKind::Return(value) => self.return_stmt(value.as_ref()),
            StmtKind::Switch { .. } => Err(LowerError::unsupported("switch statement", stmt.span)),
        }
    }

    /// Lowers a block's declarations and statements into the current scope.
    /// Statements after a terminator are dead and skipped.
    pub fn block_contents(&mut self, decls: &'ast [VarDecl], stmts: &'ast [Stmt]) -> Result<()> {
        for decl in decls {
            DeclarationLowerer::new(&mut *self.ctx).lower_var(decl)?;
        }
        for (index, stmt) in stmts.iter().enumerate() {
            if self.ctx.is_terminated() {
                trace!(skipped = stmts.len() - index, "dropping unreachable statements");
                break;
            }
            self.lower(stmt)?;
        }
        Ok(())
    }

    fn if_stmt(
        &mut self,
        test: &'ast Expr,
        then_branch: &'ast Stmt,
        else_branch: Option<&'ast Stmt>,
    ) -> Result<()> {
        let condition = ExpressionLowerer::new(&mut *self.ctx).rvalue(test)?;
        let then_block = self.ctx.new_block("then")?;
        let else_block = match else_branch {
            Some(_) => Some(self.ctx.new_block("else")?),
            None => None,
        };
        let merge_block = self.ctx.new_block("merge")?;
        self.ctx
            .ins()?
            .branch(condition, then_block, else_block.unwrap_or(merge_block))?;

        self.ctx.set_block(then_block)?;
        self.lower(then_branch)?;
        self.fall_through(merge_block)?;

        if let (Some(block), Some(stmt)) = (else_block, else_branch) {
            self.ctx.set_block(block)?;
            self.lower(stmt)?;
            self.fall_through(merge_block)?;
        }

        self.ctx.set_block(merge_block)
    }

    fn for_stmt(
        &mut self,
        init: Option<&'ast Expr>,
        test: Option<&'ast Expr>,
        step: Option<&'ast Expr>,
        body: &'ast Stmt,
    ) -> Result<()> {
        if let Some(init) = init {
            ExpressionLowerer::new(&mut *self.ctx).rvalue(init)?;
        }

        let header = self.ctx.new_block("for.header")?;
        let body_block = self.ctx.new_block("for.body")?;
        let step_block = match step {
            Some(_) => Some(self.ctx.new_block("for.step")?),
            None => None,
        };
        let footer = self.ctx.new_block("for.end")?;

        let inner: Vec<BlockId> = std::iter::once(body_block).chain(step_block).collect();
        self.ctx.mark_loop(header, &inner, footer)?;
        self.ctx.ins()?.jump(header)?;

        self.ctx.set_block(header)?;
        self.loop_test(test, body_block, footer)?;

        let continue_target = step_block.unwrap_or(header);
        self.loop_body(body, body_block, footer, continue_target)?;

        if let (Some(block), Some(step)) = (step_block, step) {
            self.ctx.set_block(block)?;
            ExpressionLowerer::new(&mut *self.ctx).rvalue(step)?;
            self.ctx.ins()?.jump(header)?;
        }

        self.ctx.set_block(footer)
    }

    fn while_stmt(&mut self, test: &'ast Expr, body: &'ast Stmt) -> Result<()> {
        let header = self.ctx.new_block("while.header")?;
        let body_block = self.ctx.new_block("while.body")?;
        let footer = self.ctx.new_block("while.end")?;

        self.ctx.mark_loop(header, &[body_block], footer)?;
        self.ctx.ins()?.jump(header)?;

        self.ctx.set_block(header)?;
        self.loop_test(Some(test), body_block, footer)?;
        self.loop_body(body, body_block, footer, header)?;

        self.ctx.set_block(footer)
    }

    /// Branches to the body while `test` holds. No test loops forever.
    fn loop_test(&mut self, test: Option<&'ast Expr>, body: BlockId, footer: BlockId) -> Result<()> {
        match test {
            Some(test) => {
                let condition = ExpressionLowerer::new(&mut *self.ctx).rvalue(test)?;
                self.ctx.ins()?.branch(condition, body, footer)?;
            }
            None => self.ctx.ins()?.jump(body)?,
        }
        Ok(())
    }

    fn loop_body(
        &mut self,
        body: &'ast Stmt,
        body_block: BlockId,
        break_target: BlockId,
        continue_target: BlockId,
    ) -> Result<()> {
        self.ctx.with_loop(break_target, continue_target, |ctx| {
            ctx.set_block(body_block)?;
            let mut lowerer = StatementLowerer::new(ctx);
            lowerer.lower(body)?;
            lowerer.fall_through(continue_target)
        })
    }

    /// `break`/`continue` outside a loop is recorded and lowering goes on.
    fn loop_exit(&mut self, statement: &'static str, target: Option<BlockId>, span: Span) -> Result<()> {
        match target {
            Some(block) => Ok(self.ctx.ins()?.jump(block)?),
            None => {
                self.ctx
                    .add_error(LowerError::ControlFlowMisuse { statement, span });
                Ok(())
            }
        }
    }

    fn return_stmt(&mut self, value: Option<&'ast Expr>) -> Result<()> {
        let value = match value {
            Some(expr) => Some(ExpressionLowerer::new(&mut *self.ctx).rvalue(expr)?),
            None => None,
        };
        let mut ins = self.ctx.ins()?;
        match value {
            Some(value) => ins.return_value(value)?,
            None => ins.return_void()?,
        }
        Ok(())
    }

    fn fall_through(&mut self, target: BlockId) -> Result<()> {
        if !self.ctx.is_terminated() {
            self.ctx.ins()?.jump(target)?;
        }
        Ok(())
    }
}
