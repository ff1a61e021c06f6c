use std::{fs, path::Path};

use crate::{
    ast::function::FunctionId,
    checker::TypeChecker,
    context::CompilationContext,
    diagnostics::Verbosity,
    error::{CompileError, EvalResult},
    lexer::{tokenize, tokenize_all, SourceFile},
    module::{Module, BUILTIN_MODULE, BUILTIN_MODULE_NAME},
    parser::parse_module,
    types::TypeId,
};

/// Declarations of the host functions every module can call.
const BUILTIN_SOURCE: &str = "\
@native fn printf(str: Char) [const, public] -> Void;
@native fn scanf(prompt: Char) [const, public] -> Char;
@native fn malloc(size: Int) [const, public] -> Object;
@native fn memcpy(dest: Object, src: Object, size: Int) [const, public] -> Void;
@native fn panic(message: Char) [const, public] -> Void;
";

/// A backend that turns checked modules into something runnable.
///
/// The [`Compiler`] hands every module to [`generate`](Self::generate) in
/// dependency order, builtin module first, and then calls
/// [`exec`](Self::exec) once. The entry point is the last generated module.
pub trait CodeExecutor {
    /// What running the program produces.
    type Output;

    /// Prepares every object type and function a module declares.
    fn generate(&mut self, module: &Module);

    /// Emits the body of a function.
    fn generate_function(&mut self, id: FunctionId);

    /// Declares a function so calls to it can be emitted before its body.
    fn prototype_function(&mut self, id: FunctionId);

    /// Lays out an object type.
    fn generate_object(&mut self, ty: TypeId);

    /// Runs the program.
    ///
    /// # Errors
    /// Whatever the program raises while running.
    fn exec(&mut self) -> EvalResult<Self::Output>;
}

/// Drives a compilation: lexing, parsing and type checking of a list of
/// source files, followed by execution through a [`CodeExecutor`].
///
/// Each phase records its errors and the next phase only starts if there
/// were none.
///
/// # Example
/// ```
/// use kvantum::{compiler::Compiler, interpreter::{Interpreter, Value}, lexer::SourceFile};
///
/// let mut compiler = Compiler::new();
/// compiler.compile(&[SourceFile::new("main.kv", "fn main() -> Int => 6 * 7;")]).unwrap();
/// assert!(compiler.has_function("main", "main"));
///
/// let mut output = Vec::new();
/// let mut interpreter = Interpreter::with_io(compiler.context(), std::io::empty(), &mut output);
/// assert_eq!(compiler.execute(&mut interpreter).unwrap(), Value::Int(42));
/// ```
pub struct Compiler {
    ctx:     CompilationContext,
    modules: Vec<Module>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Creates a compiler holding only the builtin module.
    #[must_use]
    pub fn new() -> Self {
        let mut ctx = CompilationContext::new();
        ctx.diagnostics.set_verbosity(Verbosity::Error);

        let lexed = tokenize(BUILTIN_MODULE_NAME, BUILTIN_SOURCE);
        let builtin = parse_module(&mut ctx, &[], BUILTIN_MODULE_NAME, BUILTIN_MODULE, lexed.tokens);

        Self { ctx,
               modules: vec![builtin] }
    }

    /// Reads and compiles files, given in dependency order with the entry
    /// file last.
    ///
    /// # Errors
    /// [`CompileError::Io`] if a file cannot be read, otherwise as
    /// [`Compiler::compile`].
    pub fn compile_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), CompileError> {
        let sources = paths.iter()
                           .map(|path| {
                               let path = path.as_ref();
                               fs::read_to_string(path).map(|text| SourceFile::new(path.display().to_string(), text))
                                                       .map_err(|source| CompileError::Io { path: path.to_path_buf(),
                                                                                            source })
                           })
                           .collect::<Result<Vec<_>, _>>()?;
        self.compile(&sources)
    }

    /// Compiles in-memory sources, given in dependency order with the entry
    /// file last. Each file becomes a module named after its file stem and
    /// may `use` the modules before it.
    ///
    /// # Errors
    /// [`CompileError::Diagnostics`] with the report of the first phase that
    /// recorded an error.
    pub fn compile(&mut self, sources: &[SourceFile]) -> Result<(), CompileError> {
        for source in sources {
            self.ctx.diagnostics.register_source(&source.path, &source.text);
        }

        let lexed = tokenize_all(sources);
        for file in &lexed {
            self.ctx.diagnostics.extend(file.diagnostics.iter().cloned());
        }
        self.gate()?;

        for (file, source) in lexed.into_iter().zip(sources) {
            let index = self.modules.len();
            let module = parse_module(&mut self.ctx, &self.modules, &source.module_name(), index, file.tokens);
            self.modules.push(module);
        }
        self.gate()?;

        let mut checker = TypeChecker::new(&mut self.ctx, &self.modules);
        for index in BUILTIN_MODULE + 1..self.modules.len() {
            checker.check_module(index);
        }
        self.gate()?;

        tracing::info!(modules = self.modules.len() - 1, "analysis success");
        Ok(())
    }

    /// Generates every module with `executor` and runs the program.
    ///
    /// # Errors
    /// Whatever the program raises while running.
    pub fn execute<E: CodeExecutor>(&self, executor: &mut E) -> EvalResult<E::Output> {
        for module in &self.modules {
            executor.generate(module);
        }
        executor.exec()
    }

    fn gate(&mut self) -> Result<(), CompileError> {
        if self.ctx.diagnostics.has_error() {
            Err(self.ctx.diagnostics.fail())
        } else {
            Ok(())
        }
    }

    /// The shared context: diagnostics, types and function bodies.
    #[must_use]
    pub const fn context(&self) -> &CompilationContext {
        &self.ctx
    }

    /// Every module, builtin module first.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Finds a module by name.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// The module `exec` starts from, if any user module was compiled.
    #[must_use]
    pub fn entry_module(&self) -> Option<&Module> {
        self.modules.iter().skip(BUILTIN_MODULE + 1).last()
    }

    /// Returns `true` if `module` declares a free function called `name`.
    #[must_use]
    pub fn has_function(&self, module: &str, name: &str) -> bool {
        self.module(module)
            .is_some_and(|module| module.has_internal_function(&self.ctx.functions, name))
    }

    /// Returns `true` if `module` declares an object type called `name`.
    #[must_use]
    pub fn has_object(&self, module: &str, name: &str) -> bool {
        self.module(module).is_some_and(|module| {
                               module.object_types(&self.ctx.types)
                                     .into_iter()
                                     .any(|ty| self.ctx.types.name(ty) == name)
                           })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::function::Traits;

    #[test]
    fn builtin_functions_are_native_and_public() {
        let compiler = Compiler::new();
        let builtin = &compiler.modules()[BUILTIN_MODULE];
        assert_eq!(builtin.name(), BUILTIN_MODULE_NAME);

        for name in crate::interpreter::NATIVE_FUNCTIONS {
            let group = builtin.function_group(&compiler.context().functions, name);
            assert_eq!(group.len(), 1, "{name}");

            let function = compiler.context().functions.get(group[0]);
            assert!(function.is_native());
            assert!(function.traits.contains(Traits::PUBLIC | Traits::CONST | Traits::EXPLICIT_TYPE));
        }
    }

    #[test]
    fn later_modules_use_earlier_ones() {
        let mut compiler = Compiler::new();
        let sources = [SourceFile::new("lib/math.kv", "fn sq(x: Int) [public] -> Int => x * x;"),
                       SourceFile::new("main.kv", "use math::sq;\nlet y = sq(3);")];
        compiler.compile(&sources).unwrap();

        assert!(compiler.has_function("math", "sq"));
        assert!(!compiler.has_function("main", "sq"));
        assert_eq!(compiler.entry_module().map(Module::name), Some("main"));
    }

    #[test]
    fn objects_are_found_by_module() {
        let mut compiler = Compiler::new();
        compiler.compile(&[SourceFile::new("shapes.kv", "type Square { side: Int; }")])
                .unwrap();
        assert!(compiler.has_object("shapes", "Square"));
        assert!(!compiler.has_object("shapes", "Circle"));
    }

    #[test]
    fn errors_stop_before_checking() {
        let mut compiler = Compiler::new();
        let error = compiler.compile(&[SourceFile::new("bad.kv", "let x = ;\nlet y: Int = True;")])
                            .unwrap_err();

        let CompileError::Diagnostics { count, report } = error else {
            panic!("expected diagnostics");
        };
        assert!(count > 0);
        assert!(report.contains("bad.kv"));
        assert!(!report.contains("Bool"), "{report}");
    }

    #[test]
    fn missing_files_are_io_errors() {
        let mut compiler = Compiler::new();
        let error = compiler.compile_paths(&["does/not/exist.kv"]).unwrap_err();
        assert!(matches!(error, CompileError::Io { .. }));
    }
}
