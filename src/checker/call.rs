use crate::{
    ast::{
        expression::{Expr, FunctionCall},
        function::{FunctionId, FunctionIdentifier, Traits},
    },
    checker::{Symbol, TypeChecker},
    error::{CheckError, CheckResult},
    types::TypeId,
};

impl TypeChecker<'_> {
    /// Binds a call to its target and validates its arguments.
    ///
    /// - `f(...)` looks `f` up among the functions visible in the current
    ///   module, overloads included.
    /// - `Type.f(...)` calls a method of `Type` without a receiver.
    /// - `value.f(...)` calls a method of the type of `value`; unless the
    ///   method is static, `value` becomes the first argument.
    ///
    /// A call bound earlier, by the parser or a previous check, keeps its
    /// target.
    ///
    /// # Returns
    /// The return type of the target.
    ///
    /// # Errors
    /// Unknown functions and methods, calls through something that is not a
    /// name, wrong argument counts and argument type mismatches.
    pub(crate) fn check_call(&mut self, call: &mut FunctionCall) -> CheckResult<TypeId> {
        let target = match call.target {
            Some(target) => target,
            None => {
                let target = self.resolve(call)?;
                call.target = Some(target);
                target
            },
        };

        self.check_function(target);

        let arguments = self.check_arguments(&mut call.arguments)?;
        self.check_signature(target, &arguments, call.receiver_injected)?;

        Ok(self.ctx.functions.get(target).return_type)
    }

    fn check_arguments(&mut self, arguments: &mut [Expr]) -> CheckResult<Vec<TypeId>> {
        arguments.iter_mut()
                 .map(|argument| argument.accept_mut(self))
                 .collect()
    }

    fn resolve(&mut self, call: &mut FunctionCall) -> CheckResult<FunctionId> {
        match call.callee.as_mut() {
            Expr::Variable(variable) => {
                let name = variable.name.clone();
                let arguments = self.check_arguments(&mut call.arguments)?;
                self.resolve_free(name, arguments)
            },
            Expr::FieldAccess(access) => {
                if let Expr::Variable(base) = access.base.as_ref() {
                    if let Some(Symbol::Type(ty)) = self.symbols.get(&base.name) {
                        let ty = *ty;
                        return self.resolve_method(ty, &access.field);
                    }
                }

                let receiver = access.base.accept_mut(self)?;
                let receiver = self.dereference(receiver);
                let method = self.resolve_method(receiver, &access.field)?;

                if !call.receiver_injected && !self.ctx.functions.get(method).traits.contains(Traits::STATIC) {
                    call.arguments.insert(0, (*access.base).clone());
                    call.receiver_injected = true;
                }
                Ok(method)
            },
            _ => Err(CheckError::NotCallable),
        }
    }

    fn resolve_free(&self, name: String, arguments: Vec<TypeId>) -> CheckResult<FunctionId> {
        let key = FunctionIdentifier::free(name, arguments);

        self.current_module()
            .and_then(|module| module.find_function(&self.ctx.functions, &self.ctx.types, &key))
            .ok_or_else(|| {
                let arguments = key.params
                                   .iter()
                                   .map(|ty| self.type_name(*ty))
                                   .collect::<Vec<_>>()
                                   .join(", ");
                CheckError::UnknownFunction { name: key.name.clone(),
                                              arguments }
            })
    }

    /// Finds a method on `ty` or its parents; the derived type's own method
    /// wins.
    fn resolve_method(&self, ty: TypeId, name: &str) -> CheckResult<FunctionId> {
        self.ctx
            .types
            .find_method(ty, name)
            .ok_or_else(|| CheckError::UnknownMethod { ty:   self.type_name(ty),
                                                       name: name.to_string(), })
    }

    /// Compares the argument types with the formal parameters. An injected
    /// receiver may be of a derived type and is not compared.
    fn check_signature(&self, target: FunctionId, arguments: &[TypeId], receiver_injected: bool) -> CheckResult<()> {
        let function = self.ctx.functions.get(target);
        let params = function.param_types();
        let skipped = usize::from(receiver_injected);

        if params.len() != arguments.len() {
            return Err(CheckError::ArityMismatch { name:     function.name.clone(),
                                                   expected: params.len().saturating_sub(skipped),
                                                   found:    arguments.len().saturating_sub(skipped), });
        }

        for (argument, param) in arguments.iter().zip(&params).skip(skipped) {
            if !self.ctx.types.equals(*argument, *param) {
                return Err(CheckError::ArgumentMismatch { found:    self.type_name(*argument),
                                                          expected: self.type_name(*param), });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{expression::Expr, statement::Statement},
        checker::TypeChecker,
        context::CompilationContext,
        lexer::tokenize,
        module::Module,
        parser::parse_module,
    };

    fn check(source: &str) -> (CompilationContext, Module, Vec<String>) {
        let mut ctx = CompilationContext::new();
        let lexed = tokenize("t.kv", source);
        let modules = [parse_module(&mut ctx, &[], "t", 0, lexed.tokens)];
        assert!(!ctx.diagnostics.has_error(), "{}", ctx.diagnostics.report());

        TypeChecker::new(&mut ctx, &modules).check_module(0);
        let errors = ctx.diagnostics.errors().map(|d| d.message.clone()).collect();
        let [module] = modules;
        (ctx, module, errors)
    }

    #[test]
    fn overloads_are_told_apart_by_parameter_types() {
        let source = "fn show(x: Int) -> Int => 1;\nfn show(x: Float) -> Int => 2;\nlet a = show(1);\nlet b = show(1.0);";
        let (ctx, module, errors) = check(source);
        assert!(errors.is_empty(), "{errors:?}");

        let group = module.function_group(&ctx.functions, "show");
        assert_eq!(group.len(), 2);

        let body = module.body().map(|id| &ctx.functions.get(id).body);
        let targets: Vec<_> = body.into_iter()
                                  .flatten()
                                  .filter_map(|statement| match statement {
                                      Statement::Assignment(assignment) => match &assignment.value {
                                          Expr::Call(call) => call.target,
                                          _ => None,
                                      },
                                      _ => None,
                                  })
                                  .collect();
        assert_eq!(targets, group);
    }

    #[test]
    fn methods_receive_their_receiver() {
        let source = "type P { x: Int; }\nfn P.get() -> Int { ret self.x; }\nfn f(p: P) -> Int { ret p.get(); }";
        let (_, _, errors) = check(source);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn static_calls_go_through_the_type_name() {
        let source = "type P { x: Int; }\nfn P.new(x: Int) { self.x = x; }\nlet p = P.new(3);\nlet x: Int = p.x;";
        let (_, _, errors) = check(source);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn argument_errors_are_reported() {
        let source = "fn f(x: Int) -> Int => x;\nlet a = f(True);\nlet b = g();";
        let (_, _, errors) = check(source);
        assert_eq!(errors,
                   vec!["no function named f with arguments: Bool", "no function named g with arguments: "]);
    }

    #[test]
    fn method_arity_does_not_count_the_receiver() {
        let source = "type P { x: Int; }\nfn P.set(x: Int) { self.x = x; }\nfn f(p: P) { p.set(); }";
        let (_, _, errors) = check(source);
        assert_eq!(errors, vec!["function set expects 1 arguments, but 0 were provided"]);
    }
}
