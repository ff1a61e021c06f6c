mod common;

use std::fs;

use common::{assert_compile_error, assert_output, assert_runtime_error, assert_success, assert_value, run_with_input};
use kvantum::{
    compiler::Compiler, interpreter::Interpreter, interpreter::Value, preprocessor::preprocess,
};
use walkdir::WalkDir;

#[test]
fn example_programs_work() {
    let mut count = 0;

    for entry in WalkDir::new("programs").into_iter()
                                         .filter_map(Result::ok)
                                         .filter(|e| e.path().extension().is_some_and(|ext| ext == "kv"))
    {
        let path = entry.path();
        let sources = preprocess(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        let mut compiler = Compiler::new();
        if let Err(e) = compiler.compile(&sources) {
            panic!("Program {path:?} did not compile:\n{e}");
        }

        let mut output = Vec::new();
        let mut interpreter = Interpreter::with_io(compiler.context(), "".as_bytes(), &mut output);
        if let Err(e) = compiler.execute(&mut interpreter) {
            panic!("Program {path:?} failed:\n{e}");
        }
        drop(interpreter);

        let expected = path.with_extension("out");
        if expected.exists() {
            let expected = fs::read_to_string(&expected).unwrap_or_else(|e| panic!("Failed to read {expected:?}: {e}"));
            assert_eq!(String::from_utf8_lossy(&output), expected, "Output of {path:?}");
        }
        count += 1;
    }

    assert!(count > 0, "No programs found in programs/");
}

#[test]
fn top_level_return_is_the_result() {
    assert_value("ret 1 + 2;", Value::Int(3));
    assert_value("let x = 4;\nret x * x;", Value::Int(16));
}

#[test]
fn operators_group_to_the_right() {
    assert_value("ret 10 - 2 - 3;", Value::Int(11));
    assert_value("ret (10 - 2) - 3;", Value::Int(5));
    assert_value("ret 2 * 3 + 4;", Value::Int(14));
}

#[test]
fn arithmetic() {
    assert_value("ret 7 / 2;", Value::Int(3));
    assert_value("ret 7.0 / 2.0;", Value::Rat(3.5));
    assert_value("ret 1.5 + 1.5;", Value::Rat(3.0));
}

#[test]
fn booleans() {
    assert_value("ret (1 < 2) and (3 > 4);", Value::Bool(false));
    assert_value("ret (1 < 2) or (3 > 4);", Value::Bool(true));
    assert_value("ret True + False;", Value::Bool(true));
    assert_value("ret True * False;", Value::Bool(false));
    assert_value("ret 2 != 3;", Value::Bool(true));
}

#[test]
fn not_negates_its_operand_only() {
    assert_value("ret not True;", Value::Bool(false));
    assert_value("ret not (1 < 2) or True;", Value::Bool(true));
    assert_value("let done = False;\nlet n = 0;\nwhile not done: { n = n + 1; done = n == 3; }\nret n;", Value::Int(3));
    assert_compile_error("ret not 1;", "binary operand types mismatch: Int and Bool");
}

#[test]
fn strings() {
    assert_output("printf(\"a\" + \"b\");", "ab");
    assert_value("ret \"abc\" > \"zz\";", Value::Bool(true));
    assert_value("ret \"abc\" == \"abc\";", Value::Bool(true));
    assert_output("printf(\"line\\n\");", "line\n");
}

#[test]
fn casts_convert_numbers() {
    assert_value("ret 7 as Float;", Value::Rat(7.0));
    assert_value("ret 2.9 as Int;", Value::Int(2));
    assert_output("printf(42 as Char);", "42");
}

#[test]
fn while_loops() {
    let source = "
        let i = 0;
        let sum = 0;
        while i < 5: {
            i = i + 1;
            sum = sum + i;
        }
        ret sum;
    ";
    assert_value(source, Value::Int(15));
}

#[test]
fn for_loops_and_early_return() {
    let source = "
        fn first_over(limit: Int) -> Int {
            for let i = 0; i < 100; i = i + 1: {
                if (i * i) > limit: ret i;
            }
            ret 0 - 1;
        }
        ret first_over(50);
    ";
    assert_value(source, Value::Int(8));
}

#[test]
fn if_else() {
    let source = "
        fn sign(x: Int) -> Int {
            if x < 0: ret 0 - 1;
            else: if x == 0: ret 0;
            ret 1;
        }
        ret (sign(0 - 5) + sign(0)) + sign(9);
    ";
    assert_value(source, Value::Int(0));
}

#[test]
fn blocks_shadow_and_restore() {
    let source = "
        let x = 1;
        {
            let x = 2;
            x = 3;
        }
        ret x;
    ";
    assert_value(source, Value::Int(1));
}

#[test]
fn main_runs_after_the_module_body() {
    let source = "
        printf(\"body \");
        fn main() -> Int {
            printf(\"main\");
            ret 7;
        }
    ";
    let (result, output) = run_with_input(source, "");
    assert_eq!(result.unwrap(), Value::Int(7));
    assert_eq!(output, "body main");
}

#[test]
fn recursion() {
    let source = "
        fn fact(n: Int) -> Int {
            if n < 2: ret 1;
            ret n * fact(n - 1);
        }
        fn main() => fact(10);
    ";
    assert_value(source, Value::Int(3_628_800));
}

#[test]
fn return_types_are_inferred() {
    let source = "
        fn half(x: Float) { ret x / 2.0; }
        ret half(5.0);
    ";
    assert_value(source, Value::Rat(2.5));
}

#[test]
fn overloads_pick_by_argument_type() {
    let source = "
        fn describe(x: Int) -> Char => \"int\";
        fn describe(x: Float) -> Char => \"float\";
        printf(describe(1) + describe(1.0));
    ";
    assert_output(source, "intfloat");
}

#[test]
fn nested_calls_keep_their_own_return_slot() {
    let source = "
        fn inner() -> Int { ret 1; }
        fn outer() -> Int {
            let a = inner();
            ret a + 10;
        }
        ret outer();
    ";
    assert_value(source, Value::Int(11));
}

#[test]
fn scanf_reads_a_line() {
    let source = "let name = scanf(\"name? \");\nprintf(\"hi \" + name);";
    let (result, output) = run_with_input(source, "Ada\nLovelace\n");
    assert!(result.is_ok());
    assert_eq!(output, "name? hi Ada");
}

#[test]
fn arrays() {
    let source = "
        let a = <1, 2, 3>;
        a[1] = 20;
        ret (a[0] + a[1]) + a[2];
    ";
    assert_value(source, Value::Int(24));
}

#[test]
fn arrays_are_shared() {
    let source = "
        fn fill(a: <Int>) { a[0] = 9; }
        let a = <1, 2>;
        fill(a);
        ret a[0];
    ";
    assert_value(source, Value::Int(9));
}

#[test]
fn malloc_and_memcpy() {
    let source = "
        let src = <4, 5, 6>;
        let dest = malloc(3);
        memcpy(dest, src, 2);
        ret dest;
    ";
    let value = assert_success(source);
    assert_eq!(value.to_string(), "<4, 5, None>");
}

#[test]
fn runtime_errors() {
    assert_runtime_error("let z = 0;\nret 1 / z;", "Division by zero");
    assert_runtime_error("let a = <1, 2>;\nret a[2];", "Length is 2, but found 2");
    assert_runtime_error("panic(\"stop\");", "panic: stop");
    assert_runtime_error("ret 9223372036854775807 + 1;", "overflow");
}

#[test]
fn return_stops_a_while_loop() {
    let source = "
        fn count() -> Int {
            let i = 0;
            while True: {
                i = i + 1;
                if i == 3: ret i;
                printf(\"x\");
            }
            ret 0 - 1;
        }
        ret count();
    ";
    assert_value(source, Value::Int(3));
    assert_output(source, "xx");
}

#[test]
fn names_can_be_declared_again_after_their_block() {
    let source = "
        {
            let t = 1;
        }
        let t = 2;
        ret t;
    ";
    assert_value(source, Value::Int(2));
}
