#![allow(dead_code)]

use kvantum::{error::Error, interpreter::Value, run_source_with_io};

/// Runs `source` with `input` as its standard input and returns the result
/// together with everything the program printed.
pub fn run_with_input(source: &str, input: &str) -> (Result<Value, Error>, String) {
    let mut output = Vec::new();
    let result = run_source_with_io(source, input.as_bytes(), &mut output);
    (result, String::from_utf8_lossy(&output).into_owned())
}

pub fn run(source: &str) -> (Result<Value, Error>, String) {
    run_with_input(source, "")
}

pub fn assert_success(source: &str) -> Value {
    match run(source).0 {
        Ok(value) => value,
        Err(e) => panic!("Expected success, but got error:\n{e}\nSource:\n{source}"),
    }
}

pub fn assert_value(source: &str, expected: Value) {
    assert_eq!(assert_success(source), expected, "Source:\n{source}");
}

pub fn assert_output(source: &str, expected: &str) {
    let (result, output) = run(source);
    if let Err(e) = result {
        panic!("Expected success, but got error:\n{e}\nSource:\n{source}");
    }
    assert_eq!(output, expected, "Source:\n{source}");
}

pub fn assert_failure(source: &str) -> Error {
    match run(source).0 {
        Ok(value) => panic!("Expected failure, but got {value}\nSource:\n{source}"),
        Err(e) => e,
    }
}

/// Expects compilation to fail with a report mentioning `fragment`.
pub fn assert_compile_error(source: &str, fragment: &str) {
    match assert_failure(source) {
        Error::Compile(e) => {
            let message = e.to_string();
            assert!(message.contains(fragment),
                    "Expected a compile error containing {fragment:?}, got:\n{message}");
        },
        Error::Runtime(e) => panic!("Expected a compile error, got runtime error: {e}"),
    }
}

/// Expects the program to compile and fail while running with a message
/// mentioning `fragment`.
pub fn assert_runtime_error(source: &str, fragment: &str) {
    match assert_failure(source) {
        Error::Runtime(e) => {
            let message = e.to_string();
            assert!(message.contains(fragment),
                    "Expected a runtime error containing {fragment:?}, got:\n{message}");
        },
        Error::Compile(e) => panic!("Expected a runtime error, got compile error:\n{e}"),
    }
}
