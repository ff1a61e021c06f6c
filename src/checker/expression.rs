use crate::{
    ast::{
        expression::{
            ArrayAllocation, ArrayExpression, ArrayIndex, BinaryOperation, Cast, DynamicAllocation,
            Expr, FieldAccess, FunctionCall, Literal, TakeReference, Variable,
        },
        visitor::ExpressionVisitorMut,
    },
    checker::{Symbol, TypeChecker},
    error::{CheckError, CheckResult},
    types::TypeId,
};

impl ExpressionVisitorMut for TypeChecker<'_> {
    type Output = CheckResult<TypeId>;

    /// Both operands must have equal types. Comparisons and logical
    /// operators yield `Bool`, arithmetic yields the operand type.
    fn visit_binary_operation(&mut self, node: &mut BinaryOperation) -> Self::Output {
        let lhs = node.lhs.accept_mut(self)?;
        let rhs = node.rhs.accept_mut(self)?;

        if !self.ctx.types.equals(lhs, rhs) {
            return Err(CheckError::OperandMismatch { lhs: self.type_name(lhs),
                                                     rhs: self.type_name(rhs) });
        }

        if node.op.is_boolean() {
            Ok(TypeId::BOOL)
        } else {
            Ok(lhs)
        }
    }

    fn visit_literal(&mut self, node: &mut Literal) -> Self::Output {
        Ok(node.value.type_id())
    }

    fn visit_variable(&mut self, node: &mut Variable) -> Self::Output {
        match self.symbols.get(&node.name) {
            Some(Symbol::Value(ty)) => {
                let ty = *ty;
                node.ty = Some(ty);
                Ok(ty)
            },
            Some(Symbol::Type(_)) => Err(CheckError::TypeUsedAsValue { name: node.name.clone() }),
            None => Err(CheckError::UndeclaredVariable { name: node.name.clone() }),
        }
    }

    fn visit_field_access(&mut self, node: &mut FieldAccess) -> Self::Output {
        let base = node.base.accept_mut(self)?;
        let base = self.dereference(base);

        if !self.ctx.types.is_object(base) {
            return Err(CheckError::FieldOfNonObject { ty: self.type_name(base) });
        }

        let ty = self.ctx
                     .types
                     .field_type(base, &node.field)
                     .ok_or_else(|| CheckError::UnknownField { ty:    self.type_name(base),
                                                               field: node.field.clone(), })?;
        node.ty = Some(ty);
        Ok(ty)
    }

    fn visit_dynamic_allocation(&mut self, node: &mut DynamicAllocation) -> Self::Output {
        Ok(node.ty)
    }

    fn visit_array_allocation(&mut self, node: &mut ArrayAllocation) -> Self::Output {
        let size = node.size.accept_mut(self)?;
        if size != TypeId::INT {
            return Err(CheckError::NonIntegerSize { ty: self.type_name(size) });
        }
        Ok(self.ctx.types.array_of(node.element))
    }

    fn visit_array_expression(&mut self, node: &mut ArrayExpression) -> Self::Output {
        for item in &mut node.items {
            let ty = item.accept_mut(self)?;
            if !self.ctx.types.equals(ty, node.element) {
                return Err(CheckError::ArrayElementMismatch { found:    self.type_name(ty),
                                                              expected: self.type_name(node.element), });
            }
        }
        Ok(self.ctx.types.array_of(node.element))
    }

    fn visit_array_index(&mut self, node: &mut ArrayIndex) -> Self::Output {
        let array = node.array.accept_mut(self)?;
        let array = self.dereference(array);
        let element = self.ctx
                          .types
                          .element_of(array)
                          .ok_or_else(|| CheckError::NotAnArray { ty: self.type_name(array) })?;

        let index = node.index.accept_mut(self)?;
        if index != TypeId::INT {
            return Err(CheckError::NonIntegerIndex { ty: self.type_name(index) });
        }
        Ok(element)
    }

    fn visit_take_reference(&mut self, node: &mut TakeReference) -> Self::Output {
        if !matches!(*node.expr, Expr::Variable(_) | Expr::FieldAccess(_)) {
            return Err(CheckError::ReferenceOfNonVariable);
        }
        let referent = node.expr.accept_mut(self)?;
        Ok(self.ctx.types.reference_to(referent))
    }

    fn visit_cast(&mut self, node: &mut Cast) -> Self::Output {
        node.expr.accept_mut(self)?;
        Ok(node.to)
    }

    fn visit_call(&mut self, node: &mut FunctionCall) -> Self::Output {
        self.check_call(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        checker::TypeChecker, context::CompilationContext, lexer::tokenize, module::Module,
        parser::parse_module,
    };

    fn check(source: &str) -> Vec<String> {
        let mut ctx = CompilationContext::new();
        let lexed = tokenize("t.kv", source);
        let module: Module = parse_module(&mut ctx, &[], "t", 0, lexed.tokens);
        assert!(!ctx.diagnostics.has_error(), "{}", ctx.diagnostics.report());

        let modules = [module];
        TypeChecker::new(&mut ctx, &modules).check_module(0);
        ctx.diagnostics.errors().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn operands_must_match() {
        let errors = check("let x = 1 + 2.5;");
        assert_eq!(errors, vec!["binary operand types mismatch: Int and Float"]);
    }

    #[test]
    fn comparisons_are_boolean() {
        assert!(check("let b: Bool = 1 < 2;").is_empty());
    }

    #[test]
    fn unknown_fields_are_reported() {
        let errors = check("type P { x: Int; }\nfn f(p: P) -> Int { ret p.y; }");
        assert_eq!(errors, vec!["P has no field named y"]);
    }

    #[test]
    fn indexing_needs_an_array_and_an_integer() {
        let errors = check("let a = <1, 2>;\nlet x = a[True];\nlet y = 3;\nlet z = y[0];");
        assert_eq!(errors,
                   vec!["cannot index with non integer type Bool", "cannot index non array type Int"]);
    }

    #[test]
    fn types_are_not_values() {
        let errors = check("type P { x: Int; }\nlet p = P;");
        assert_eq!(errors, vec!["P is a type, not a value"]);
    }
}
