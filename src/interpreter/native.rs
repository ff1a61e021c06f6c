use std::{
    io::{BufRead, Write},
    rc::Rc,
};

use crate::{
    error::{EvalResult, RuntimeError},
    interpreter::Value,
    util::num::size_checked,
};

/// The standard streams a running program reads from and writes to.
pub struct Streams<'a> {
    pub(crate) input:  Box<dyn BufRead + 'a>,
    pub(crate) output: Box<dyn Write + 'a>,
}

impl<'a> Streams<'a> {
    /// Wraps an input and an output stream.
    pub fn new(input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
        Self { input:  Box::new(input),
               output: Box::new(output), }
    }

    /// Flushes the output stream.
    ///
    /// # Errors
    /// [`RuntimeError::Io`] if the stream refuses the flush.
    pub fn flush(&mut self, line: usize) -> EvalResult<()> {
        self.output.flush().map_err(|error| io_error(&error, line))
    }
}

fn io_error(error: &std::io::Error, line: usize) -> RuntimeError {
    RuntimeError::Io { details: error.to_string(),
                       line }
}

/// Type alias for native function handlers.
///
/// A native receives the program's streams, the evaluated arguments and the
/// line of the call.
type NativeFn = fn(&mut Streams<'_>, &[Value], usize) -> EvalResult<Value>;

/// A native implementation together with its parameter count.
#[derive(Clone, Copy)]
pub(crate) struct Native {
    name:  &'static str,
    arity: usize,
    func:  NativeFn,
}

/// Defines native functions by generating a lookup table and a name list.
///
/// The macro produces:
/// - `NATIVE_TABLE` (static table for lookup),
/// - `NATIVE_FUNCTIONS` (public list of native names).
macro_rules! native_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        static NATIVE_TABLE: &[Native] = &[
            $(
                Native { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// Names of every function the interpreter implements natively.
        pub const NATIVE_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

native_functions! {
    "printf" => { arity: 1, func: printf },
    "scanf"  => { arity: 1, func: scanf },
    "malloc" => { arity: 1, func: malloc },
    "memcpy" => { arity: 3, func: memcpy },
    "panic"  => { arity: 1, func: |_, args, line| Err(RuntimeError::Panic { message: args[0].to_string(), line }) },
}

impl Native {
    /// Finds the implementation of the native called `name`.
    pub(crate) fn find(name: &str) -> Option<Self> {
        NATIVE_TABLE.iter().find(|native| native.name == name).copied()
    }

    /// Runs the native.
    ///
    /// # Errors
    /// [`RuntimeError::ArgumentCountMismatch`] if `args` does not match the
    /// arity, otherwise whatever the native raises.
    pub(crate) fn call(self, streams: &mut Streams<'_>, args: &[Value], line: usize) -> EvalResult<Value> {
        if args.len() != self.arity {
            return Err(RuntimeError::ArgumentCountMismatch { name: self.name.to_string(),
                                                             expected: self.arity,
                                                             found: args.len(),
                                                             line });
        }
        (self.func)(streams, args, line)
    }
}

/// Writes the argument without a trailing newline.
fn printf(streams: &mut Streams<'_>, args: &[Value], line: usize) -> EvalResult<Value> {
    write!(streams.output, "{}", args[0]).map_err(|error| io_error(&error, line))?;
    Ok(Value::Void)
}

/// Shows the prompt and reads one line, without its line terminator.
fn scanf(streams: &mut Streams<'_>, args: &[Value], line: usize) -> EvalResult<Value> {
    write!(streams.output, "{}", args[0]).map_err(|error| io_error(&error, line))?;
    streams.flush(line)?;

    let mut input = String::new();
    streams.input
           .read_line(&mut input)
           .map_err(|error| io_error(&error, line))?;

    let trimmed = input.trim_end_matches(['\n', '\r']).len();
    input.truncate(trimmed);
    Ok(Value::Str(input))
}

/// Allocates an array of `size` empty slots.
fn malloc(_: &mut Streams<'_>, args: &[Value], line: usize) -> EvalResult<Value> {
    let size = size_checked(args[0].as_int(line)?, line)?;
    Value::filled_array(Value::Void, size, line)
}

/// Copies the first `size` elements of `src` over those of `dest`.
fn memcpy(_: &mut Streams<'_>, args: &[Value], line: usize) -> EvalResult<Value> {
    let dest = args[0].as_array(line)?;
    let src = args[1].as_array(line)?;
    let requested = args[2].as_int(line)?;
    let size = size_checked(requested, line)?;

    if Rc::ptr_eq(&dest, &src) {
        return Ok(Value::Void);
    }

    let src = src.borrow();
    let mut dest = dest.borrow_mut();
    let len = src.len().min(dest.len());
    if size > len {
        return Err(RuntimeError::IndexOutOfBounds { len,
                                                    found: requested,
                                                    line });
    }

    dest[..size].clone_from_slice(&src[..size]);
    Ok(Value::Void)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn call(name: &str, args: &[Value], input: &str) -> (EvalResult<Value>, String) {
        let mut output = Vec::new();
        let result = {
            let mut streams = Streams::new(Cursor::new(input.as_bytes()), &mut output);
            Native::find(name).expect("native exists")
                              .call(&mut streams, args, 1)
        };
        (result, String::from_utf8(output).expect("utf-8 output"))
    }

    #[test]
    fn every_native_is_listed() {
        assert_eq!(NATIVE_FUNCTIONS, &["printf", "scanf", "malloc", "memcpy", "panic"]);
        assert!(NATIVE_FUNCTIONS.iter().all(|name| Native::find(name).is_some()));
    }

    #[test]
    fn printf_writes_without_newline() {
        let (result, output) = call("printf", &[Value::from("hi")], "");
        assert_eq!(result, Ok(Value::Void));
        assert_eq!(output, "hi");
    }

    #[test]
    fn scanf_prompts_and_strips_the_line_end() {
        let (result, output) = call("scanf", &[Value::from("name? ")], "Ada\r\nrest\n");
        assert_eq!(result, Ok(Value::from("Ada")));
        assert_eq!(output, "name? ");
    }

    #[test]
    fn memcpy_copies_a_prefix() {
        let dest = Value::array(vec![Value::Void; 3]);
        let src = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let (result, _) = call("memcpy", &[dest.clone(), src, Value::Int(2)], "");
        assert_eq!(result, Ok(Value::Void));

        let Value::Array(items) = dest else { unreachable!() };
        assert_eq!(*items.borrow(), vec![Value::Int(1), Value::Int(2), Value::Void]);
    }

    #[test]
    fn memcpy_checks_bounds() {
        let dest = Value::array(vec![Value::Void; 1]);
        let src = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let (result, _) = call("memcpy", &[dest, src, Value::Int(2)], "");
        assert_eq!(result, Err(RuntimeError::IndexOutOfBounds { len: 1, found: 2, line: 1 }));
    }

    #[test]
    fn malloc_rejects_negative_sizes() {
        let (result, _) = call("malloc", &[Value::Int(-1)], "");
        assert_eq!(result, Err(RuntimeError::NegativeSize { size: -1, line: 1 }));
    }

    #[test]
    fn panic_raises_with_its_message() {
        let (result, _) = call("panic", &[Value::from("boom")], "");
        assert_eq!(result.unwrap_err().to_string(), "Error on line 1: panic: boom");
    }

    #[test]
    fn arity_is_checked() {
        let (result, _) = call("malloc", &[], "");
        assert!(matches!(result, Err(RuntimeError::ArgumentCountMismatch { expected: 1, found: 0, .. })));
    }
}
