//! Interpreter command-line.
//!
//! When called without a script it drops into an interactive read-evaluate-print loop, where the
//! value of a trailing expression statement is echoed and errors do not end the session.
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=walox=debug`) to trace the pipeline on stderr.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::Parser;

use walox::interpreter::{Interpreter, LoxError};

/// Tree-walking interpreter for a subset of Lox.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print the syntax tree of each statement before running it.
    #[arg(long)]
    dump_ast: bool,

    /// Script to run.  Starts an interactive session when omitted.
    script: Option<PathBuf>,
}

fn main() -> Result<(), anyhow::Error> {
    init_tracing();
    let args = Args::parse();

    match &args.script {
        Some(path) => run_file(path, args.dump_ast),
        None => run_prompt(args.dump_ast).context("interactive session failed"),
    }
}

/// Installs a stderr subscriber when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_file(path: &Path, dump_ast: bool) -> Result<(), anyhow::Error> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout);

    if let Err(e) = run_source(&mut interp, &source, dump_ast) {
        eprintln!("{}", e);
        process::exit(e.exit_code());
    }
    Ok(())
}

fn run_prompt(dump_ast: bool) -> Result<(), io::Error> {
    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();
    let mut interp_stdout = io::stdout();

    let mut interp = Interpreter::new(&mut interp_stdout).interactive(true);

    let mut input = String::new();
    loop {
        repl_stdout.write_all(b"> ")?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }

        if let Err(e) = run_source(&mut interp, &input, dump_ast) {
            eprintln!("{}", e);
        }
    }

    Ok(())
}

fn run_source<W: Write>(
    interp: &mut Interpreter<'_, W>,
    source: &str,
    dump_ast: bool,
) -> Result<(), LoxError> {
    let prg = interp.parse(source)?;
    if dump_ast {
        for stmt in &prg {
            eprintln!("{}", stmt);
        }
    }
    interp.execute(&prg)
}
