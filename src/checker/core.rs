use std::{collections::HashSet, convert::Infallible, iter, mem};

use crate::{
    ast::{function::FunctionId, statement::Statement, visitor::TraversalContext},
    context::CompilationContext,
    error::CheckResult,
    module::Module,
    symbol_stack::SymbolStack,
    types::{Type, TypeId},
};

/// What a name in the checker's symbol table stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A variable or parameter of the given type.
    Value(TypeId),
    /// An object type visible in the module. Only usable as the receiver of
    /// a static call such as `Pair.new(1, 2)`.
    Type(TypeId),
}

/// Resolves and validates the types of checked modules in place.
///
/// Checking a function stores the type of every variable and field access on
/// the node, binds every call to its target function and fills in inferred
/// return types. Functions are checked at most once; a call to a function
/// that was not checked yet checks it on the spot, so declaration order does
/// not matter and recursion terminates.
///
/// Errors do not stop the checker. A failing statement is recorded in the
/// diagnostics sink at its line and checking goes on with the next one.
///
/// # Example
/// ```
/// use kvantum::{
///     checker::TypeChecker, context::CompilationContext, lexer::tokenize, parser::parse_module,
///     types::TypeId,
/// };
///
/// let mut ctx = CompilationContext::new();
/// let lexed = tokenize("demo.kv", "fn add(a: Int, b: Int) -> Int { ret a + b; }");
/// let module = parse_module(&mut ctx, &[], "demo", 0, lexed.tokens);
/// let modules = [module];
///
/// TypeChecker::new(&mut ctx, &modules).check_module(0);
///
/// assert!(!ctx.diagnostics.has_error());
/// let add = modules[0].function_group(&ctx.functions, "add")[0];
/// assert_eq!(ctx.functions.get(add).return_type, TypeId::INT);
/// ```
pub struct TypeChecker<'a> {
    pub(crate) ctx:     &'a mut CompilationContext,
    modules:            &'a [Module],
    pub(crate) symbols: SymbolStack<Symbol>,
    checked:            HashSet<FunctionId>,
    stack:              Vec<FunctionId>,
    traversal:          TraversalContext,
}

impl<'a> TypeChecker<'a> {
    /// Creates a checker over every module of a compilation.
    ///
    /// `modules` must be indexed by module index, builtin module first, since
    /// each function is checked against the module that declares it.
    pub fn new(ctx: &'a mut CompilationContext, modules: &'a [Module]) -> Self {
        Self { ctx,
               modules,
               symbols: SymbolStack::new(),
               checked: HashSet::new(),
               stack: Vec::new(),
               traversal: TraversalContext::default() }
    }

    /// Checks every function the module declares: its top-level body, its
    /// free functions and its methods.
    ///
    /// Checking a module twice is harmless.
    pub fn check_module(&mut self, index: usize) {
        let modules = self.modules;
        let Some(module) = modules.get(index) else {
            return;
        };

        tracing::debug!(module = module.name(), "module is being checked");
        for &id in module.functions() {
            self.check_function(id);
        }
    }

    /// Checks one function unless it was checked before or is native.
    pub fn check_function(&mut self, id: FunctionId) {
        if !self.checked.insert(id) {
            return;
        }

        let modules = self.modules;
        let function = self.ctx.functions.get(id);
        if function.is_native() {
            return;
        }
        let Some(module) = modules.get(function.module) else {
            return;
        };

        let types: Vec<(String, Symbol)> = module.visible_object_types(&self.ctx.types)
                                                 .into_iter()
                                                 .map(|ty| (self.ctx.types.name(ty), Symbol::Type(ty)))
                                                 .collect();
        let params: Vec<(String, Symbol)> = function.params
                                                    .iter()
                                                    .map(|param| (param.name.clone(), Symbol::Value(param.ty)))
                                                    .collect();
        tracing::trace!(function = %function.name, "checking function");

        let mut body = mem::take(&mut self.ctx.functions.get_mut(id).body);
        let outer_symbols = mem::take(&mut self.symbols);
        let outer_module = self.ctx.diagnostics.working_module().to_string();

        self.ctx.diagnostics.set_working_module(module.file());
        self.symbols.push_segment(types);
        self.symbols.push_segment(params);
        self.stack.push(id);

        self.check_block(&mut body);

        self.stack.pop();
        self.symbols = outer_symbols;
        self.ctx.diagnostics.set_working_module(outer_module);
        self.ctx.functions.get_mut(id).body = body;
    }

    /// Returns `true` once `id` has been checked or is being checked.
    #[must_use]
    pub fn is_checked(&self, id: FunctionId) -> bool {
        self.checked.contains(&id)
    }

    /// Checks a statement list, recording each failing statement and moving
    /// on to the next.
    pub(crate) fn check_block(&mut self, statements: &mut Vec<Statement>) {
        let mut traversal = mem::take(&mut self.traversal);

        let walked = traversal.walk_block(statements, |traversal, statement| {
                                  mem::swap(&mut self.traversal, traversal);
                                  let result = statement.accept_mut(self);
                                  mem::swap(&mut self.traversal, traversal);

                                  if let Err(error) = result {
                                      self.ctx.diagnostics.error_at(statement.line(), &error);
                                  }
                                  Ok::<(), Infallible>(())
                              });

        self.traversal = traversal;
        if let Err(never) = walked {
            match never {}
        }
    }

    /// Runs `check` inside a fresh symbol segment.
    pub(crate) fn scoped<T>(&mut self, check: impl FnOnce(&mut Self) -> CheckResult<T>) -> CheckResult<T> {
        self.symbols.push_segment(iter::empty());
        let result = check(self);
        self.symbols.pop_segment();
        result
    }

    /// The function whose body is being checked.
    pub(crate) fn current_function(&self) -> Option<FunctionId> {
        self.stack.last().copied()
    }

    /// The module declaring the function being checked.
    pub(crate) fn current_module(&self) -> Option<&'a Module> {
        let modules = self.modules;
        self.current_function()
            .and_then(|id| modules.get(self.ctx.functions.get(id).module))
    }

    pub(crate) fn type_name(&self, ty: TypeId) -> String {
        self.ctx.types.name(ty)
    }

    /// Looks through a reference type to its referent.
    pub(crate) fn dereference(&self, ty: TypeId) -> TypeId {
        match self.ctx.types.get(ty) {
            Type::Reference(referent) => *referent,
            _ => ty,
        }
    }
}
