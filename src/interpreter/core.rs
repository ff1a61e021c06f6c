use std::{
    collections::HashMap,
    io::{self, BufRead, Write},
    iter, mem,
};

use crate::{
    ast::{
        function::{FunctionId, Traits},
        statement::Statement,
    },
    compiler::CodeExecutor,
    context::CompilationContext,
    error::{EvalResult, RuntimeError},
    interpreter::{
        native::{Native, Streams},
        Value,
    },
    module::Module,
    symbol_stack::SymbolStack,
    types::TypeId,
};

/// What `exec` runs: the top-level statements of the entry module, then its
/// `main` function if it declares one.
#[derive(Debug, Clone, Copy)]
struct Entry {
    body: Option<FunctionId>,
    main: Option<FunctionId>,
}

/// Tree-walking evaluator over checked modules.
///
/// Runs function bodies straight from the arena of a [`CompilationContext`].
/// Every call gets a fresh frame holding only its parameters and its own
/// return slot; nested blocks, branches and loop bodies add segments on top
/// of it.
///
/// As a [`CodeExecutor`], generating a module binds its native functions,
/// lays out its object types and makes it the entry module.
pub struct Interpreter<'a> {
    ctx:          &'a CompilationContext,
    streams:      Streams<'a>,
    symbols:      SymbolStack<Value>,
    return_value: Option<Value>,
    natives:      HashMap<FunctionId, Native>,
    layouts:      HashMap<TypeId, Vec<(String, TypeId)>>,
    entry:        Option<Entry>,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter wired to the process's standard streams.
    #[must_use]
    pub fn new(ctx: &'a CompilationContext) -> Self {
        Self::with_io(ctx, io::stdin().lock(), io::stdout())
    }

    /// Creates an interpreter that reads `scanf` input from `input` and
    /// writes `printf` output to `output`.
    pub fn with_io(ctx: &'a CompilationContext, input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
        Self { ctx,
               streams: Streams::new(input, output),
               symbols: SymbolStack::new(),
               return_value: None,
               natives: HashMap::new(),
               layouts: HashMap::new(),
               entry: None }
    }

    /// Calls a function with already evaluated arguments.
    ///
    /// # Errors
    /// A wrong argument count, a native without implementation or any
    /// runtime error raised by the body.
    pub fn call_function(&mut self, id: FunctionId, arguments: Vec<Value>, line: usize) -> EvalResult<Value> {
        let ctx = self.ctx;
        let function = ctx.functions.get(id);

        if arguments.len() != function.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch { name: function.name.clone(),
                                                             expected: function.params.len(),
                                                             found: arguments.len(),
                                                             line });
        }

        if function.is_native() {
            let native = self.native(id, line)?;
            return native.call(&mut self.streams, &arguments, line);
        }

        tracing::trace!(function = %function.name, "calling function");
        let mut frame = SymbolStack::new();
        frame.push_segment(function.params
                                   .iter()
                                   .map(|param| param.name.clone())
                                   .zip(arguments));

        let outer_symbols = mem::replace(&mut self.symbols, frame);
        let outer_return = self.return_value.take();

        let result = self.execute_block(&function.body);
        let value = self.return_value.take().unwrap_or(Value::Void);

        self.symbols = outer_symbols;
        self.return_value = outer_return;
        result.map(|()| value)
    }

    /// Picks the method that actually runs for a method call.
    ///
    /// A virtual or overriding method called on an object whose runtime type
    /// overrides it again dispatches to that override.
    pub(crate) fn dispatch(&self, target: FunctionId, receiver: Option<&Value>) -> FunctionId {
        let function = self.ctx.functions.get(target);
        let overridable = function.traits.contains(Traits::VIRTUAL) || function.traits.contains(Traits::OVERRIDE);

        match receiver {
            Some(Value::Object(object)) if overridable => {
                let runtime = object.borrow().ty;
                self.ctx
                    .types
                    .find_method(runtime, &function.name)
                    .unwrap_or(target)
            },
            _ => target,
        }
    }

    /// Runs statements in order until one of them sets the return slot.
    pub(crate) fn execute_block(&mut self, statements: &[Statement]) -> EvalResult<()> {
        for statement in statements {
            if self.return_value.is_some() {
                break;
            }
            statement.accept(self)?;
        }
        Ok(())
    }

    /// Runs `run` inside a fresh symbol segment.
    pub(crate) fn scoped<T>(&mut self, run: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        self.symbols.push_segment(iter::empty());
        let result = run(self);
        self.symbols.pop_segment();
        result
    }

    pub(crate) const fn returned(&self) -> bool {
        self.return_value.is_some()
    }

    pub(crate) fn set_return(&mut self, value: Value) {
        self.return_value = Some(value);
    }

    pub(crate) fn symbols(&mut self) -> &mut SymbolStack<Value> {
        &mut self.symbols
    }

    /// A fresh instance of the object type `ty` with every field at its
    /// default value.
    pub(crate) fn instantiate(&mut self, ty: TypeId) -> Value {
        let ctx = self.ctx;
        let layout = self.layouts
                         .entry(ty)
                         .or_insert_with(|| ctx.types.fields(ty));

        let fields = layout.iter()
                           .map(|(name, field)| (name.clone(), Value::default_for(*field, &ctx.types)))
                           .collect();
        Value::object(ty, fields)
    }

    pub(crate) const fn context(&self) -> &'a CompilationContext {
        self.ctx
    }

    fn native(&mut self, id: FunctionId, line: usize) -> EvalResult<Native> {
        if let Some(native) = self.natives.get(&id) {
            return Ok(*native);
        }

        let ctx = self.ctx;
        let name = &ctx.functions.get(id).name;
        let native = Native::find(name).ok_or_else(|| RuntimeError::MissingNative { name: name.clone(),
                                                                                      line })?;
        self.natives.insert(id, native);
        Ok(native)
    }
}

impl CodeExecutor for Interpreter<'_> {
    type Output = Value;

    fn generate(&mut self, module: &Module) {
        tracing::debug!(module = module.name(), "generating module");
        let ctx = self.ctx;

        for ty in module.object_types(&ctx.types) {
            self.generate_object(ty);
        }
        for &id in module.functions() {
            self.prototype_function(id);
        }
        for &id in module.functions() {
            self.generate_function(id);
        }

        self.entry = Some(Entry { body: module.body(),
                                  main: module.main_function(&ctx.functions) });
    }

    fn prototype_function(&mut self, id: FunctionId) {
        let ctx = self.ctx;
        let function = ctx.functions.get(id);
        if !function.is_native() {
            return;
        }

        match Native::find(&function.name) {
            Some(native) => {
                self.natives.insert(id, native);
            },
            None => tracing::warn!(function = %function.name, "native function has no implementation"),
        }
    }

    /// Bodies run straight from the syntax tree; there is nothing to emit.
    fn generate_function(&mut self, id: FunctionId) {
        tracing::trace!(function = %self.ctx.functions.get(id).name, "function ready");
    }

    fn generate_object(&mut self, ty: TypeId) {
        let fields = self.ctx.types.fields(ty);
        self.layouts.insert(ty, fields);
    }

    fn exec(&mut self) -> EvalResult<Value> {
        let entry = self.entry.ok_or(RuntimeError::NoEntryModule)?;

        let mut result = Value::Void;
        if let Some(body) = entry.body {
            result = self.call_function(body, Vec::new(), 0)?;
        }
        if let Some(main) = entry.main {
            let line = self.ctx.functions.get(main).line;
            result = self.call_function(main, Vec::new(), line)?;
        }

        self.streams.flush(0)?;
        Ok(result)
    }
}
