mod common;

use common::{assert_compile_error, assert_failure, assert_runtime_error, run};
use kvantum::{compiler::Compiler, error::CompileError, error::Error, lexer::SourceFile};

fn compile(files: &[(&str, &str)]) -> Result<Compiler, CompileError> {
    let sources: Vec<SourceFile> = files.iter()
                                        .map(|(path, text)| SourceFile::new(*path, *text))
                                        .collect();
    let mut compiler = Compiler::new();
    compiler.compile(&sources)?;
    Ok(compiler)
}

#[test]
fn errors_name_their_line_and_file() {
    assert_compile_error("let a = 1;\nlet b = a + c;", "variable not declared c at line 2 file: main.kv");
}

#[test]
fn every_broken_statement_is_reported() {
    let Error::Compile(CompileError::Diagnostics { count, report }) = assert_failure("let a = 1 + True;\nlet b = 2.0 + 1;\nlet c = 3;")
    else {
        panic!("expected a compile error");
    };
    assert_eq!(count, 2, "{report}");
    assert!(report.contains("binary operand types mismatch: Int and Bool"));
    assert!(report.contains("binary operand types mismatch: Float and Int"));
}

#[test]
fn programs_with_errors_never_run() {
    let (result, output) = run("printf(\"x\");\nlet a: Int = True;\nfn main() -> Int {\n    printf(\"y\");\n    ret 0;\n}");
    assert!(matches!(result, Err(Error::Compile(_))), "{result:?}");
    assert_eq!(output, "");

    let (result, output) = run("printf(\"x\");\nlet b = ;");
    assert!(matches!(result, Err(Error::Compile(_))), "{result:?}");
    assert_eq!(output, "");
}

#[test]
fn parse_errors() {
    assert_compile_error("let a = 1;\n+ 2;", "is not a valid statement");
    assert_compile_error("let a = * 2;", "missing left hand side of binary operation");
    assert_compile_error("let a = 1", "no semi colon at the end of assignment");
    assert_compile_error("@inline fn f() => 1;", "no valid annotation named @inline");
    assert_compile_error("fn f(x: Thing) => 1;", "no type named Thing");
}

#[test]
fn type_errors() {
    assert_compile_error("let a = 1;\nlet a = 2;", "redeclaration of local variable a");
    assert_compile_error("let a: Int = 1.5;", "expression type Float does not equal specified type Int");
    assert_compile_error("if 1: printf(\"x\");", "condition must be Bool, found Int");
    assert_compile_error("fn f() -> Int => True;", "Bool is not same as Int");
    assert_compile_error("fn f(x: Int) => x;\nlet y = f(1, 2);", "no function named f with arguments: Int, Int");
    assert_compile_error("let v = printf(\"x\");", "cannot assign a Void value to v");
}

#[test]
fn main_cannot_see_top_level_variables() {
    let source = "
        let limit = 10;
        fn main() -> Int => limit;
    ";
    assert_compile_error(source, "variable not declared limit");
}

#[test]
fn runtime_errors_carry_their_line() {
    assert_runtime_error("let z = 0;\n\nlet x = 4 / z;", "Error on line 3: Division by zero.");
    assert_runtime_error("let a = \"x\" as Int;\nlet b = a + 1;", "Type violation");
}

#[test]
fn modules_import_public_items() {
    let math = ("lib/math.kv", "fn sq(x: Int) [public] -> Int => x * x;\nfn helper() -> Int => 1;");

    assert!(compile(&[math, ("main.kv", "use math::sq;\nlet y = sq(4);")]).is_ok());

    let error = compile(&[math, ("main.kv", "use math::helper;")]).err().map(|e| e.to_string());
    assert!(error.is_some_and(|e| e.contains("cannot use function helper because it is private")));

    let error = compile(&[math, ("main.kv", "use math::cube;")]).err().map(|e| e.to_string());
    assert!(error.is_some_and(|e| e.contains("no function or object named cube in module math")));

    let error = compile(&[("main.kv", "use geometry::area;")]).err().map(|e| e.to_string());
    assert!(error.is_some_and(|e| e.contains("no module named geometry")));
}

#[test]
fn imported_functions_are_not_visible_without_use() {
    let files = [("lib/math.kv", "fn sq(x: Int) [public] -> Int => x * x;"), ("main.kv", "let y = sq(4);")];
    let error = compile(&files).err().map(|e| e.to_string());
    assert!(error.is_some_and(|e| e.contains("no function named sq with arguments: Int")));
}

#[test]
fn imported_types_bring_their_public_methods() {
    let shapes = "type Square { side: Int; }\nfn Square.new(side: Int) [public] { self.side = side; }\nfn Square.area() [public] -> Int => self.side * self.side;";
    let main = "use shapes::Square;\nlet s = Square.new(3);\nlet a: Int = s.area();";
    assert!(compile(&[("shapes.kv", shapes), ("main.kv", main)]).is_ok());
}
