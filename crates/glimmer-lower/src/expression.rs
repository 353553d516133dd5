use crate::config::LogicalOps;
use crate::context::LoweringContext;
use crate::errors::{LowerError, Result};
use crate::type_lowering::TypeLowering;
use glimmer_ast::{AssignOp, BinaryOp, Expr, ExprKind, PostfixOp, Span, UnaryOp};
use glimmer_core::{Constant, FloatCC, IntCC, Type, Value};
use tracing::trace;

/// An assignable location.
#[derive(Debug, Clone, PartialEq)]
pub enum LValue {
    /// The whole value stored at `ptr`.
    Storage { ptr: Value, ty: Type },
    /// Some lanes of the vector stored at `ptr`, in written order.
    Swizzle {
        ptr: Value,
        vector_ty: Type,
        lanes: Vec<u8>,
    },
}

/// Lowers expressions into the current block of the context.
pub struct ExpressionLowerer<'a, 'ast> {
    ctx: &'a mut LoweringContext<'ast>,
}

impl<'a, 'ast> ExpressionLowerer<'a, 'ast> {
    pub fn new(ctx: &'a mut LoweringContext<'ast>) -> Self {
        Self { ctx }
    }

    /// Materializes the value of `expr`.
    pub fn rvalue(&mut self, expr: &Expr) -> Result<Value> {
        trace!(kind = expr.describe(), span = %expr.span, "rvalue");
        match &expr.kind {
            ExprKind::IntLit(value) => Ok(Value::int(*value)),
            ExprKind::FloatLit(value) => Ok(Value::float(*value)),
            ExprKind::BoolLit(value) => Ok(Value::bool(*value)),
            ExprKind::Var(name) => {
                let (ptr, ty) = self.variable(name, expr.span)?;
                self.load(&LValue::Storage { ptr, ty })
            }
            ExprKind::Unary { op, operand } => self.unary(*op, operand),
            ExprKind::Binary { op, left, right } => self.binary(*op, left, right),
            ExprKind::Assign { op, target, value } => self.assign(*op, target, value),
            ExprKind::Postfix { op, operand } => {
                self.step(operand, *op == PostfixOp::Increment, false)
            }
            ExprKind::Index { base, index } => {
                let (ptr, ty) = self.element(base, index, false)?;
                self.load(&LValue::Storage { ptr, ty })
            }
            ExprKind::Field { base, field } => self.swizzle(base, field),
            ExprKind::Conditional { .. } | ExprKind::Call { .. } => {
                Err(LowerError::unsupported(expr.describe(), expr.span))
            }
        }
    }

    /// Resolves `expr` to the storage it names.
    pub fn lvalue(&mut self, expr: &Expr) -> Result<LValue> {
        match &expr.kind {
            ExprKind::Var(name) => {
                let (ptr, ty) = self.variable(name, expr.span)?;
                Ok(LValue::Storage { ptr, ty })
            }
            ExprKind::Index { base, index } => {
                let (ptr, ty) = self.element(base, index, true)?;
                Ok(LValue::Storage { ptr, ty })
            }
            ExprKind::Field { base, field } => match self.lvalue(base)? {
                LValue::Storage { ptr, ty } => {
                    let width = ty.lanes().ok_or_else(|| {
                        LowerError::Internal(format!("swizzle .{} on non-vector {}", field, ty))
                    })?;
                    let lanes = swizzle_lanes(field, width)?;
                    Ok(LValue::Swizzle {
                        ptr,
                        vector_ty: ty,
                        lanes,
                    })
                }
                LValue::Swizzle {
                    ptr,
                    vector_ty,
                    lanes: outer,
                } => {
                    let inner = swizzle_lanes(field, outer.len() as u8)?;
                    Ok(LValue::Swizzle {
                        ptr,
                        vector_ty,
                        lanes: inner.iter().map(|&lane| outer[lane as usize]).collect(),
                    })
                }
            },
            _ => Err(LowerError::InvalidLvalue { span: expr.span }),
        }
    }

    pub fn load(&mut self, target: &LValue) -> Result<Value> {
        match target {
            LValue::Storage { ptr, ty } => Ok(self.ctx.ins()?.load(ptr.clone(), ty.clone())?),
            LValue::Swizzle {
                ptr,
                vector_ty,
                lanes,
            } => {
                let whole = self.ctx.ins()?.load(ptr.clone(), vector_ty.clone())?;
                self.select_lanes(whole, vector_ty.clone(), lanes)
            }
        }
    }

    /// Stores `value` into `target` and returns the value stored.
    ///
    /// A scalar stored into vector storage is broadcast first. A swizzle store
    /// reads the whole vector, replaces the named lanes and writes it back to
    /// the same storage.
    pub fn store(&mut self, target: &LValue, value: Value) -> Result<Value> {
        match target {
            LValue::Storage { ptr, ty } => {
                let value = self.coerce(value, ty)?;
                self.ctx.ins()?.store(ptr.clone(), value.clone())?;
                Ok(value)
            }
            LValue::Swizzle {
                ptr,
                vector_ty,
                lanes,
            } => {
                let source_ty = self.ctx.value_type(&value)?;
                let mut merged = self.ctx.ins()?.load(ptr.clone(), vector_ty.clone())?;
                for (i, &lane) in lanes.iter().enumerate() {
                    let part = if source_ty.is_vector() {
                        self.ctx
                            .ins()?
                            .extract_element(value.clone(), i as u8, source_ty.clone())?
                    } else {
                        value.clone()
                    };
                    merged = self
                        .ctx
                        .ins()?
                        .insert_element(merged, part, lane, vector_ty.clone())?;
                }
                self.ctx.ins()?.store(ptr.clone(), merged)?;
                Ok(value)
            }
        }
    }

    fn variable(&mut self, name: &str, span: Span) -> Result<(Value, Type)> {
        let binding = self
            .ctx
            .lookup(name)
            .ok_or_else(|| LowerError::UnresolvedReference {
                name: name.to_string(),
                span,
            })?;
        if binding.is_function() {
            return Err(LowerError::Internal(format!(
                "function '{}' used as a value",
                name
            )));
        }
        Ok((binding.storage.clone(), binding.ty.clone()))
    }

    /// Address and type of `base[index]`. A base without storage of its own is
    /// spilled when only read; writing through it is rejected since the store
    /// would land in the spill slot.
    fn element(&mut self, base: &Expr, index: &Expr, assignable: bool) -> Result<(Value, Type)> {
        let (ptr, ty) = self.address(base, assignable)?;
        let index = self.rvalue(index)?;
        let elem_ty = ty.element().cloned().ok_or_else(|| {
            LowerError::Internal(format!("cannot subscript a value of type {}", ty))
        })?;
        let elem_ptr = self.ctx.ins()?.element_ptr(ptr, index, elem_ty.clone())?;
        Ok((elem_ptr, elem_ty))
    }

    fn address(&mut self, base: &Expr, assignable: bool) -> Result<(Value, Type)> {
        match &base.kind {
            ExprKind::Var(name) => self.variable(name, base.span),
            ExprKind::Index { base: inner, index } => self.element(inner, index, assignable),
            _ if assignable => Err(LowerError::InvalidLvalue { span: base.span }),
            _ => {
                let value = self.rvalue(base)?;
                self.spill(value)
            }
        }
    }

    /// Parks a value in a fresh stack slot so it can be addressed.
    fn spill(&mut self, value: Value) -> Result<(Value, Type)> {
        let ty = self.ctx.value_type(&value)?;
        let slot = self.ctx.alloca(None, ty.clone())?;
        self.ctx.ins()?.store(slot.clone(), value)?;
        Ok((slot, ty))
    }

    fn swizzle(&mut self, base: &Expr, field: &str) -> Result<Value> {
        let vector = self.rvalue(base)?;
        let ty = self.ctx.value_type(&vector)?;
        let width = ty.lanes().ok_or_else(|| {
            LowerError::Internal(format!("swizzle .{} on non-vector {}", field, ty))
        })?;
        let lanes = swizzle_lanes(field, width)?;
        self.select_lanes(vector, ty, &lanes)
    }

    fn select_lanes(&mut self, vector: Value, vector_ty: Type, lanes: &[u8]) -> Result<Value> {
        let mut ins = self.ctx.ins()?;
        let value = match lanes {
            [lane] => ins.extract_element(vector, *lane, vector_ty)?,
            _ => ins.shuffle(vector, lanes.to_vec(), vector_ty)?,
        };
        Ok(value)
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value> {
        match op {
            UnaryOp::Plus => self.rvalue(operand),
            UnaryOp::Minus => {
                let value = self.rvalue(operand)?;
                let ty = self.ctx.value_type(&value)?;
                let zero = TypeLowering::zero_value(&ty)?;
                let mut ins = self.ctx.ins()?;
                let negated = if ty.is_float_like() {
                    ins.fsub(zero, value, ty)?
                } else {
                    ins.isub(zero, value, ty)?
                };
                Ok(negated)
            }
            UnaryOp::PreIncrement => self.step(operand, true, true),
            UnaryOp::PreDecrement => self.step(operand, false, true),
        }
    }

    /// `++`/`--` in either position. Prefix yields the new value, postfix the old one.
    fn step(&mut self, operand: &Expr, increment: bool, prefix: bool) -> Result<Value> {
        let target = self.lvalue(operand)?;
        let old = self.load(&target)?;
        let ty = self.ctx.value_type(&old)?;
        let scalar_ty = ty.element().cloned().unwrap_or(ty);
        let one = Constant::one(&scalar_ty)
            .map(Value::Constant)
            .ok_or_else(|| LowerError::Internal(format!("cannot step a value of type {}", scalar_ty)))?;

        let op = if increment { BinaryOp::Add } else { BinaryOp::Sub };
        let new = self.arith(op, old.clone(), one)?;
        let new = self.store(&target, new)?;
        Ok(if prefix { new } else { old })
    }

    fn binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value> {
        if op.is_logical() {
            return self.logical(op, left, right);
        }

        let left = self.rvalue(left)?;
        let right = self.rvalue(right)?;
        if op.is_arithmetic() {
            self.arith(op, left, right)
        } else {
            self.compare(op, left, right)
        }
    }

    /// Widens a scalar operand to the width of a vector operand.
    fn promote(&mut self, left: Value, right: Value) -> Result<(Value, Value, Type)> {
        let left_ty = self.ctx.value_type(&left)?;
        let right_ty = self.ctx.value_type(&right)?;
        match (left_ty.is_vector(), right_ty.is_vector()) {
            (true, false) => {
                let right = self.broadcast(right, &left_ty)?;
                Ok((left, right, left_ty))
            }
            (false, true) => {
                let left = self.broadcast(left, &right_ty)?;
                Ok((left, right, right_ty))
            }
            _ => Ok((left, right, left_ty)),
        }
    }

    /// Replicates a scalar into every lane, starting from an undefined vector.
    fn broadcast(&mut self, scalar: Value, vector_ty: &Type) -> Result<Value> {
        let lanes = vector_ty.lanes().ok_or_else(|| {
            LowerError::Internal(format!("cannot broadcast to non-vector {}", vector_ty))
        })?;
        let mut ins = self.ctx.ins()?;
        let mut vector = Value::undef(vector_ty.clone());
        for lane in 0..lanes {
            vector = ins.insert_element(vector, scalar.clone(), lane, vector_ty.clone())?;
        }
        Ok(vector)
    }

    fn coerce(&mut self, value: Value, target_ty: &Type) -> Result<Value> {
        if target_ty.is_vector() && !self.ctx.value_type(&value)?.is_vector() {
            self.broadcast(value, target_ty)
        } else {
            Ok(value)
        }
    }

    fn arith(&mut self, op: BinaryOp, left: Value, right: Value) -> Result<Value> {
        let (left, right, ty) = self.promote(left, right)?;
        let float = ty.is_float_like();
        let mut ins = self.ctx.ins()?;
        let value = match (op, float) {
            (BinaryOp::Add, true) => ins.fadd(left, right, ty)?,
            (BinaryOp::Add, false) => ins.iadd(left, right, ty)?,
            (BinaryOp::Sub, true) => ins.fsub(left, right, ty)?,
            (BinaryOp::Sub, false) => ins.isub(left, right, ty)?,
            (BinaryOp::Mul, true) => ins.fmul(left, right, ty)?,
            (BinaryOp::Mul, false) => ins.imul(left, right, ty)?,
            (BinaryOp::Div, true) => ins.fdiv(left, right, ty)?,
            (BinaryOp::Div, false) => ins.sdiv(left, right, ty)?,
            _ => {
                return Err(LowerError::Internal(format!(
                    "'{}' is not an arithmetic operator",
                    op
                )))
            }
        };
        Ok(value)
    }

    fn compare(&mut self, op: BinaryOp, left: Value, right: Value) -> Result<Value> {
        let (left, right, ty) = self.promote(left, right)?;
        let result = if ty.is_float_like() {
            let cond = float_predicate(op)?;
            self.ctx.ins()?.fcmp(cond, left, right, ty.clone())?
        } else {
            let cond = int_predicate(op)?;
            self.ctx.ins()?.icmp(cond, left, right, ty.clone())?
        };

        if op.is_equality() && ty.is_vector() {
            self.fold_lanes(result, ty.comparison_result(), op == BinaryOp::Eq)
        } else {
            Ok(result)
        }
    }

    /// Reduces a per-lane comparison. `==` needs every lane equal, `!=` any lane different.
    fn fold_lanes(&mut self, lanes_value: Value, lanes_ty: Type, all: bool) -> Result<Value> {
        let lanes = lanes_ty.lanes().unwrap_or(1);
        let mut ins = self.ctx.ins()?;
        let mut acc = ins.extract_element(lanes_value.clone(), 0, lanes_ty.clone())?;
        for lane in 1..lanes {
            let next = ins.extract_element(lanes_value.clone(), lane, lanes_ty.clone())?;
            acc = if all {
                ins.and(acc, next, Type::Bool)?
            } else {
                ins.or(acc, next, Type::Bool)?
            };
        }
        Ok(acc)
    }

    fn logical(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value> {
        match self.ctx.config.logical_ops {
            LogicalOps::Eager => {
                let left = self.rvalue(left)?;
                let right = self.rvalue(right)?;
                let mut ins = self.ctx.ins()?;
                let value = if op == BinaryOp::And {
                    ins.and(left, right, Type::Bool)?
                } else {
                    ins.or(left, right, Type::Bool)?
                };
                Ok(value)
            }
            LogicalOps::ShortCircuit => self.short_circuit(op, left, right),
        }
    }

    fn short_circuit(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value> {
        let result = self.ctx.alloca(None, Type::Bool)?;
        let lhs = self.rvalue(left)?;
        self.ctx.ins()?.store(result.clone(), lhs.clone())?;

        let rhs_block = self.ctx.new_block("logic.rhs")?;
        let end_block = self.ctx.new_block("logic.end")?;
        let (on_true, on_false) = if op == BinaryOp::And {
            (rhs_block, end_block)
        } else {
            (end_block, rhs_block)
        };
        self.ctx.ins()?.branch(lhs, on_true, on_false)?;

        self.ctx.set_block(rhs_block)?;
        let rhs = self.rvalue(right)?;
        {
            let mut ins = self.ctx.ins()?;
            ins.store(result.clone(), rhs)?;
            ins.jump(end_block)?;
        }

        self.ctx.set_block(end_block)?;
        Ok(self.ctx.ins()?.load(result, Type::Bool)?)
    }

    /// Plain assignment stores the right side. Compound assignment computes
    /// `target OP value` and stores it back, resolving the target only once.
    fn assign(&mut self, op: AssignOp, target: &Expr, value: &Expr) -> Result<Value> {
        match op.arithmetic() {
            Some(arith) => {
                let place = self.lvalue(target)?;
                let current = self.load(&place)?;
                let operand = self.rvalue(value)?;
                let result = self.arith(arith, current, operand)?;
                self.store(&place, result)
            }
            None => {
                let value = self.rvalue(value)?;
                let place = self.lvalue(target)?;
                self.store(&place, value)
            }
        }
    }
}

fn swizzle_lanes(field: &str, width: u8) -> Result<Vec<u8>> {
    if field.is_empty() || field.len() > 4 {
        return Err(LowerError::Internal(format!("invalid swizzle .{}", field)));
    }

    field
        .chars()
        .map(|c| {
            let lane = match c {
                'x' => 0,
                'y' => 1,
                'z' => 2,
                'w' => 3,
                _ => return Err(LowerError::Internal(format!("invalid swizzle .{}", field))),
            };
            if lane >= width {
                return Err(LowerError::Internal(format!(
                    "swizzle .{} reads past a {}-lane vector",
                    field, width
                )));
            }
            Ok(lane)
        })
        .collect()
}

fn float_predicate(op: BinaryOp) -> Result<FloatCC> {
    match op {
        BinaryOp::Eq => Ok(FloatCC::Equal),
        BinaryOp::Ne => Ok(FloatCC::OrderedNotEqual),
        BinaryOp::Lt => Ok(FloatCC::LessThan),
        BinaryOp::Gt => Ok(FloatCC::GreaterThan),
        BinaryOp::Le => Ok(FloatCC::LessThanOrEqual),
        BinaryOp::Ge => Ok(FloatCC::GreaterThanOrEqual),
        other => Err(LowerError::Internal(format!("'{}' is not a comparison", other))),
    }
}

fn int_predicate(op: BinaryOp) -> Result<IntCC> {
    match op {
        BinaryOp::Eq => Ok(IntCC::Equal),
        BinaryOp::Ne => Ok(IntCC::NotEqual),
        BinaryOp::Lt => Ok(IntCC::SignedLessThan),
        BinaryOp::Gt => Ok(IntCC::SignedGreaterThan),
        BinaryOp::Le => Ok(IntCC::SignedLessThanOrEqual),
        BinaryOp::Ge => Ok(IntCC::SignedGreaterThanOrEqual),
        other => Err(LowerError::Internal(format!("'{}' is not a comparison", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_swizzle_lanes() {
        assert_eq!(swizzle_lanes("x", 4).unwrap(), vec![0]);
        assert_eq!(swizzle_lanes("wzyx", 4).unwrap(), vec![3, 2, 1, 0]);
        assert_eq!(swizzle_lanes("yy", 2).unwrap(), vec![1, 1]);
        assert!(swizzle_lanes("z", 2).is_err());
        assert!(swizzle_lanes("q", 4).is_err());
        assert!(swizzle_lanes("", 4).is_err());
        assert!(swizzle_lanes("xyzwx", 4).is_err());
    }

    #[test]
    fn test_predicate_tables() {
        assert_eq!(float_predicate(BinaryOp::Lt).unwrap(), FloatCC::LessThan);
        assert_eq!(float_predicate(BinaryOp::Ge).unwrap(), FloatCC::GreaterThanOrEqual);
        assert_eq!(int_predicate(BinaryOp::Le).unwrap(), IntCC::SignedLessThanOrEqual);
        assert_eq!(int_predicate(BinaryOp::Gt).unwrap(), IntCC::SignedGreaterThan);
        assert!(int_predicate(BinaryOp::Add).is_err());
    }
}
