mod common;

use common::{assert_compile_error, assert_output, assert_runtime_error, assert_value};
use kvantum::interpreter::Value;

#[test]
fn list_literals() {
    let source = "
        let xs = [10, 20, 30];
        ret (xs.at(0) + xs.at(2)) + xs.getSize();
    ";
    assert_value(source, Value::Int(43));
}

#[test]
fn append_grows_the_storage() {
    let source = "
        let xs = [1];
        for let i = 2; i <= 10; i = i + 1: xs.append(i);
        printf(xs.max_size as Char);
        ret xs.getSize();
    ";
    assert_value(source, Value::Int(10));
    // 1 -> 3 -> 7 -> 15
    assert_output(source, "15");
}

#[test]
fn lists_of_other_types() {
    let source = "
        let words = [\"a\", \"b\"];
        words.append(\"c\");
        let out = \"\";
        for let i = 0; i < words.getSize(); i = i + 1: out = out + words.at(i);
        printf(out);

        let half = [0.5, 1.5];
        ret half.at(1);
    ";
    assert_value(source, Value::Rat(1.5));
    assert_output(source, "abc");
}

#[test]
fn lists_as_parameters() {
    let source = "
        fn sum(xs: [Int]) -> Int {
            let total = 0;
            for let i = 0; i < xs.size; i = i + 1: total = total + xs.at(i);
            ret total;
        }
        fn push_twice(xs: [Int], x: Int) {
            xs.append(x);
            xs.append(x);
        }

        let xs = [1, 2, 3];
        push_twice(xs, 4);
        ret sum(xs);
    ";
    assert_value(source, Value::Int(14));
}

#[test]
fn resize_keeps_elements() {
    let source = "
        let xs = [5, 6];
        xs.reSize(8);
        xs.append(7);
        ret (xs.max_size * 100) + xs.at(2);
    ";
    assert_value(source, Value::Int(807));
}

#[test]
fn at_checks_the_index() {
    assert_runtime_error("let xs = [1, 2];\nret xs.at(2);", "panic: list index out of range");
    assert_runtime_error("let xs = [1, 2];\nret xs.at(0 - 1);", "panic: list index out of range");
}

#[test]
fn elements_must_match_the_list_type() {
    assert_compile_error("let xs = [1, 2];\nxs.append(True);", "Bool does not equal expected Int");
    assert_compile_error("let xs = [1, 2.5];", "Float");
}

#[test]
fn empty_list_literals_have_no_type() {
    assert_compile_error("let xs = [];", "cannot infer the element type of an empty list literal");
}

#[test]
fn array_literals_hold_literals_only() {
    assert_compile_error("let x = 1;\nlet a = <x, 2>;", "array initializer can only be literal value");
}

#[test]
fn array_index_bounds() {
    assert_runtime_error("let a = <1, 2, 3>;\nlet i = 0 - 1;\nret a[i];", "found -1");
    assert_runtime_error("let a = malloc(0 - 2);", "Size must not be negative, found -2");
}

#[test]
fn oversized_allocations_fail_at_runtime() {
    assert_runtime_error("let a = malloc(9223372036854775807);",
                         "Error on line 1: Could not allocate an array of 9223372036854775807 elements.");
    assert_runtime_error("let xs = [1, 2];\nxs.reSize(9223372036854775807);",
                         "Could not allocate an array of 9223372036854775807 elements");
}
