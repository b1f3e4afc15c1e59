use anyhow::{Context, Result};
use chatsplit::{
    BufferStats, Chunk, Config, LoggingConfig, Splitter, TokenBuffer, init_logging,
    logging::parse_level,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "chatsplit", version, about = "Split LLM replies into chat-sized messages")]
struct Cli {
    /// JSON config file; environment variables are used when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum characters per message, overriding config and environment
    #[arg(long, global = true)]
    max_chars: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a complete text at natural boundaries
    Split {
        /// Input file, stdin when omitted
        input: Option<PathBuf>,

        /// Print the chunks as a JSON document
        #[arg(long)]
        json: bool,
    },
    /// Replay a text as a token stream through the online buffer
    Stream {
        /// Input file, stdin when omitted
        input: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct SplitOutput<'a> {
    generated_at: DateTime<Utc>,
    max_chars: usize,
    chunks: &'a [Chunk],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging(LoggingConfig {
        json_format: cli.log_json,
        ..LoggingConfig::with_level_name(&config.log_level)
    });
    info!(max_chars = config.max_chars, level = %parse_level(&config.log_level), "configuration loaded");

    match &cli.command {
        Command::Split { input, json } => {
            let text = read_input(input.as_deref()).await?;
            run_split(&config, &text, *json)
        }
        Command::Stream { input } => {
            let text = read_input(input.as_deref()).await?;
            let stats = run_stream(&config, &text).await?;
            info!(
                tokens = stats.tokens_seen,
                chunks = stats.chunks_emitted,
                dropped = stats.thinking_tokens_dropped,
                "stream replay complete"
            );
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::from_env(),
    };

    if let Some(max_chars) = cli.max_chars {
        config.max_chars = max_chars;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.to_lowercase();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input: {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn run_split(config: &Config, text: &str, json: bool) -> Result<()> {
    let splitter = Splitter::from_config(config)?;
    let chunks = splitter.split_chunks(text);

    if json {
        let output = SplitOutput {
            generated_at: Utc::now(),
            max_chars: splitter.max_chars(),
            chunks: &chunks,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let total = chunks.len();
    for (i, chunk) in chunks.iter().enumerate() {
        let forced = if chunk.metadata.forced { ", forced" } else { "" };
        println!(
            "--- chunk {}/{} ({} chars{}) ---",
            i + 1,
            total,
            chunk.metadata.char_count,
            forced
        );
        println!("{}", chunk.text);
    }
    Ok(())
}

async fn run_stream(config: &Config, text: &str) -> Result<BufferStats> {
    let buffer = TokenBuffer::from_config(config)?;
    let (mut tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

    let printer = tokio::spawn(async move {
        let mut index = 0;
        while let Some(chunk) = rx.recv().await {
            index += 1;
            println!("--- message {} ({} chars) ---", index, chunk.chars().count());
            println!("{}", chunk);
        }
    });

    let source = futures::stream::iter(word_tokens(text).into_iter().map(Ok::<_, Infallible>));
    let stats = buffer.run(source, &mut tx).await?;

    drop(tx);
    printer.await.context("Printer task failed")?;
    Ok(stats)
}

/// Break text into alternating runs of non-whitespace and whitespace
fn word_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_space = false;

    for c in text.chars() {
        if !current.is_empty() && c.is_whitespace() != in_space {
            tokens.push(std::mem::take(&mut current));
        }
        in_space = c.is_whitespace();
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
