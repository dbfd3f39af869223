use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use crossterm::style::Stylize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use avenger_interpreter::lexer::tokenize;
use avenger_interpreter::{global_env, run_source, Config, Env};

const EXTENSION: &str = "avenger";

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn report(err: impl std::fmt::Display) {
    eprintln!("{}", err.to_string().red());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        report(format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env()?;

    match args.get(1).map(String::as_str) {
        None => repl(config).await,
        Some("--tokens") => {
            let Some(filename) = args.get(2) else {
                bail!("Usage: {} --tokens <file.{}>", args[0], EXTENSION);
            };
            dump_tokens(filename).await
        }
        Some(filename) => run_file(filename, config).await,
    }
}

async fn read_script(filename: &str) -> anyhow::Result<String> {
    let path = Path::new(filename);
    if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
        bail!("File must have .{} extension", EXTENSION);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file '{}'", filename))
}

async fn run_file(filename: &str, config: Config) -> anyhow::Result<()> {
    let source = read_script(filename).await?;
    let env = global_env(config)?;
    run_source(&source, &env)?;
    Ok(())
}

async fn dump_tokens(filename: &str) -> anyhow::Result<()> {
    let source = read_script(filename).await?;
    let tokens: Vec<_> = tokenize(&source)?
        .into_iter()
        .map(|token| {
            json!({
                "type": format!("{:?}", token.kind),
                "value": token.value,
                "line": token.line,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&tokens)?);
    Ok(())
}

/// Line REPL over one shared global scope; `exit` quits.
async fn repl(config: Config) -> anyhow::Result<()> {
    let env: Env = global_env(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Avenger REPL v{}", env!("CARGO_PKG_VERSION"));
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input == "exit" {
            break;
        }
        if input.is_empty() {
            continue;
        }
        if let Err(err) = run_source(input, &env) {
            report(err);
        }
    }
    Ok(())
}
