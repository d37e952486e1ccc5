use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tran::interpreter::{Interpreter, InterpreterConfig};
use tran::{lexer, parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Tokens,
    Ast,
    Run,
}

impl Emit {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "tokens" => Ok(Self::Tokens),
            "ast" => Ok(Self::Ast),
            "run" => Ok(Self::Run),
            other => bail!("Unknown emit stage '{other}', expected tokens, ast or run"),
        }
    }
}

struct Options {
    emit: Emit,
    verbosity: u8,
    config: InterpreterConfig,
    input_path: Option<String>,
}

fn parse_args() -> Result<Options> {
    let mut args = std::env::args().skip(1);
    let mut options = Options {
        emit: Emit::Run,
        verbosity: 0,
        config: InterpreterConfig::default(),
        input_path: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--emit" | "-e" => {
                let stage = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing stage after {arg}"))?;
                options.emit = Emit::parse(&stage)?;
            }
            "-v" => options.verbosity = options.verbosity.max(1),
            "-vv" => options.verbosity = 2,
            "--no-construction-call" => options.config.construction_method_call = false,
            _ => {
                if options.input_path.is_some() {
                    bail!("Only one input file is supported");
                }
                options.input_path = Some(arg);
            }
        }
    }
    Ok(options)
}

fn directive_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "tran=warn",
        1 => "tran=debug",
        _ => "tran=trace",
    }
}

fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let options = parse_args()?;
    init_tracing(options.verbosity);

    let source = if let Some(path) = &options.input_path {
        fs::read_to_string(path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };
    debug!(bytes = source.len(), emit = ?options.emit, "loaded source");

    let tokens = lexer::tokenize(&source).context("Tokenizing source")?;
    if options.emit == Emit::Tokens {
        for token in &tokens {
            println!("{}:{} {token}", token.span.line, token.span.column);
        }
        return Ok(());
    }

    let program = parser::parse_tokens(tokens).context("Parsing source")?;
    if options.emit == Emit::Ast {
        println!("{program:#?}");
        return Ok(());
    }

    let output = Interpreter::with_config(options.config)
        .run(&program)
        .context("Running program")?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
