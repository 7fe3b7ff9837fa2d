use std::{path::PathBuf, process::Command};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, error, metadata::LevelFilter};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Parser)]
struct Args {
    /// Source file to compile.
    input: PathBuf,

    /// Where to write the assembly text. Written to stdout when omitted.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Name under which the entry function is exported.
    #[clap(long, default_value = "main")]
    export: String,

    /// Additionally assemble the output with `wat2wasm`. Requires `-o`.
    #[clap(long)]
    assemble: bool,
}

fn fallible_main(args: Args) -> anyhow::Result<()> {
    let filename = args.input.display().to_string();
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read source file at {:?}", args.input))?;

    debug!("lexing {filename}");
    let tokens = match tern_lexer::lex(&source) {
        Ok(tokens) => tokens,
        Err(lex_error) => {
            _ = lex_error.to_diagnostic().emit_to_stderr(&filename, &source);
            bail!("compilation failed: {lex_error}");
        }
    };

    debug!("parsing");
    let mut program = match tern_syntax::parse(tokens) {
        Ok(program) => program,
        Err(parse_error) => {
            _ = parse_error.to_diagnostic().emit_to_stderr(&filename, &source);
            bail!("compilation failed: {parse_error}");
        }
    };

    debug!("attaching types");
    tern_codegen::annotate(&mut program);

    debug!("emitting assembly text");
    let mut text = tern_codegen::emit_to_string(&program, &args.export);
    text.push('\n');

    match &args.output {
        Some(path) => std::fs::write(path, &text)
            .with_context(|| format!("cannot write output file at {path:?}"))?,
        None => print!("{text}"),
    }

    if args.assemble {
        let Some(output) = &args.output else {
            bail!("--assemble requires -o so wat2wasm has a file to read");
        };
        let wasm = output.with_extension("wasm");
        debug!("assembling {wasm:?}");
        let status = Command::new("wat2wasm")
            .arg(output)
            .arg("-o")
            .arg(&wasm)
            .status()
            .context("cannot run wat2wasm; is it installed?")?;
        if !status.success() {
            bail!("wat2wasm exited with {status}");
        }
    }

    Ok(())
}

fn main() {
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        );
    tracing::subscriber::set_global_default(subscriber)
        .expect("cannot set default tracing subscriber");

    let args = Args::parse();

    match fallible_main(args) {
        Ok(()) => (),
        Err(error) => {
            error!("{error:?}");
            std::process::exit(1);
        }
    }
}
