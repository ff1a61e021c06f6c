use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use kvantum::{
    compiler::Compiler, error::Error, interpreter::Interpreter, lexer::tokenize_all,
    preprocessor::preprocess,
};
use tracing::Level;

/// kvantum compiles a program and its imports, type checks it and runs it.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The entry file. Files it imports are compiled before it.
    #[arg(default_value = "main.kv")]
    file: PathBuf,

    /// Raise the log level: -v info, -vv debug, -vvv trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log the token stream of every file and stop after lexing.
    #[arg(long)]
    tokens: bool,

    /// Stop after type checking.
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        _ if args.tokens => Level::TRACE,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level)
                             .with_writer(std::io::stderr)
                             .without_time()
                             .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let sources = preprocess(&args.file)?;

    if args.tokens {
        for lexed in tokenize_all(&sources) {
            for token in lexed.tokens.iter() {
                tracing::trace!(file = %lexed.file, line = token.line, kind = ?token.kind, text = %token.text);
            }
        }
        return Ok(());
    }

    let mut compiler = Compiler::new();
    compiler.compile(&sources)?;
    if args.check {
        tracing::info!(file = %args.file.display(), "check passed");
        return Ok(());
    }

    let mut interpreter = Interpreter::new(compiler.context());
    compiler.execute(&mut interpreter)?;
    Ok(())
}
