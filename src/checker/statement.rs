use crate::{
    ast::{
        expression::{Expr, FunctionCall},
        function::Traits,
        statement::{Assignment, For, IfElse, Return, Statement, StatementBlock, While},
        visitor::StatementVisitorMut,
    },
    checker::{Symbol, TypeChecker},
    error::{CheckError, CheckResult},
    types::TypeId,
};

impl TypeChecker<'_> {
    fn check_condition(&mut self, condition: &mut Expr) -> CheckResult<()> {
        let ty = condition.accept_mut(self)?;
        if ty == TypeId::BOOL {
            Ok(())
        } else {
            Err(CheckError::ConditionNotBool { ty: self.type_name(ty) })
        }
    }

    /// Checks the body of a branch or loop in its own segment.
    fn check_nested(&mut self, statement: &mut Statement) -> CheckResult<()> {
        self.scoped(|checker| statement.accept_mut(checker))
    }

    fn declare(&mut self, target: &mut Expr, value: TypeId, annotation: Option<TypeId>) -> CheckResult<()> {
        let Expr::Variable(variable) = target else {
            return Err(CheckError::InvalidDeclaration);
        };

        if self.symbols.is_declared_local(&variable.name) {
            return Err(CheckError::Redeclaration { name: variable.name.clone() });
        }
        if value == TypeId::VOID {
            return Err(CheckError::VoidAssignment { name: variable.name.clone() });
        }

        let ty = match annotation {
            Some(annotation) if annotation != TypeId::VOID => {
                if !self.ctx.types.equals(value, annotation) {
                    return Err(CheckError::AssignmentMismatch { found:    self.type_name(value),
                                                                expected: self.type_name(annotation), });
                }
                annotation
            },
            _ => value,
        };

        variable.ty = Some(ty);
        self.symbols.push(variable.name.clone(), Symbol::Value(ty));
        Ok(())
    }
}

impl StatementVisitorMut for TypeChecker<'_> {
    type Output = CheckResult<()>;

    fn visit_block(&mut self, node: &mut StatementBlock) -> Self::Output {
        self.scoped(|checker| {
                checker.check_block(&mut node.statements);
                Ok(())
            })
    }

    /// A `let` declares a new name in the current segment; any other
    /// assignment stores into an existing variable, field or array element
    /// of an equal type.
    fn visit_assignment(&mut self, node: &mut Assignment) -> Self::Output {
        let value = node.value.accept_mut(self)?;

        if node.declaration {
            return self.declare(&mut node.target, value, node.annotation);
        }

        let target = node.target.accept_mut(self)?;
        if self.ctx.types.equals(value, target) {
            Ok(())
        } else {
            Err(CheckError::AssignmentMismatch { found:    self.type_name(value),
                                                 expected: self.type_name(target), })
        }
    }

    /// The first `ret` of a function without a declared return type fixes
    /// it; every later one must agree. Returning a call of the function
    /// itself is exempt.
    fn visit_return(&mut self, node: &mut Return) -> Self::Output {
        let value = node.value.accept_mut(self)?;
        let Some(current) = self.current_function() else {
            return Ok(());
        };

        if matches!(&node.value, Expr::Call(FunctionCall { target: Some(target), .. }) if *target == current) {
            return Ok(());
        }
        if value == TypeId::VOID {
            return Err(CheckError::ReturnVoid);
        }

        let function = self.ctx.functions.get_mut(current);
        if !function.traits.contains(Traits::EXPLICIT_TYPE) && function.return_type == TypeId::VOID {
            function.return_type = value;
            return Ok(());
        }

        let expected = function.return_type;
        if self.ctx.types.equals(value, expected) {
            Ok(())
        } else {
            Err(CheckError::ReturnMismatch { found:    self.type_name(value),
                                             expected: self.type_name(expected), })
        }
    }

    fn visit_if_else(&mut self, node: &mut IfElse) -> Self::Output {
        self.check_condition(&mut node.condition)?;
        self.check_nested(&mut node.then)?;
        if let Some(otherwise) = &mut node.otherwise {
            self.check_nested(otherwise)?;
        }
        Ok(())
    }

    fn visit_while(&mut self, node: &mut While) -> Self::Output {
        self.check_condition(&mut node.condition)?;
        self.check_nested(&mut node.body)
    }

    /// The loop variable lives in a segment of its own around the loop.
    fn visit_for(&mut self, node: &mut For) -> Self::Output {
        self.scoped(|checker| {
                node.init.accept_mut(checker)?;
                checker.check_condition(&mut node.condition)?;
                node.step.accept_mut(checker)?;
                checker.check_nested(&mut node.body)
            })
    }

    fn visit_call_statement(&mut self, node: &mut FunctionCall) -> Self::Output {
        self.check_call(node).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        checker::TypeChecker, context::CompilationContext, lexer::tokenize, module::Module,
        parser::parse_module, types::TypeId,
    };

    fn check_module(source: &str) -> (CompilationContext, Module, Vec<String>) {
        let mut ctx = CompilationContext::new();
        let lexed = tokenize("t.kv", source);
        let modules = [parse_module(&mut ctx, &[], "t", 0, lexed.tokens)];
        assert!(!ctx.diagnostics.has_error(), "{}", ctx.diagnostics.report());

        TypeChecker::new(&mut ctx, &modules).check_module(0);
        let errors = ctx.diagnostics.errors().map(|d| d.message.clone()).collect();
        let [module] = modules;
        (ctx, module, errors)
    }

    fn check(source: &str) -> (CompilationContext, Vec<String>) {
        let (ctx, _, errors) = check_module(source);
        (ctx, errors)
    }

    #[test]
    fn redeclaration_in_the_same_block_is_an_error() {
        let (_, errors) = check("let x = 1;\nlet x = 2;");
        assert_eq!(errors, vec!["redeclaration of local variable x"]);
    }

    #[test]
    fn redeclaration_after_the_block_closes_is_fine() {
        let (_, errors) = check("{ let x = 1; }\nlet x = 2;\nif x == 2: { let y = x; }\nlet y = 3;");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn conditions_must_be_boolean() {
        let (_, errors) = check("while 1: { }");
        assert_eq!(errors, vec!["condition must be Bool, found Int"]);
    }

    #[test]
    fn return_type_is_inferred_from_the_first_return() {
        let (ctx, module, errors) = check_module("fn half(x: Float) { ret x / 2.0; }");
        assert!(errors.is_empty(), "{errors:?}");

        let half = module.function_group(&ctx.functions, "half")[0];
        assert_eq!(ctx.functions.get(half).return_type, TypeId::FLOAT);
    }

    #[test]
    fn later_returns_must_agree() {
        let (_, errors) = check("fn f(x: Int) { if x > 0: ret 1; ret True; }");
        assert_eq!(errors, vec!["Bool is not same as Int"]);
    }

    #[test]
    fn assignments_keep_the_declared_type() {
        let (_, errors) = check("let x = 1;\nx = 2.0;\nlet y: Float = 3;");
        assert_eq!(errors,
                   vec!["expression type Float does not equal specified type Int",
                        "expression type Int does not equal specified type Float"]);
    }

    #[test]
    fn void_values_cannot_be_stored() {
        let (_, errors) = check("fn nothing() { }\nlet x = nothing();");
        assert_eq!(errors, vec!["cannot assign a Void value to x"]);
    }
}
