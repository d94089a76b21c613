//! `uamatch` command line: detect devices from user-agent strings.
//!
//! Each input prints one line of JSON, or `false` when nothing matched.
//! Inputs come from the arguments or, when there are none, one per stdin line.
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use uamatch::{Provider, ProviderConfig};

/// Identify devices from user-agent strings.
#[derive(Debug, Parser)]
#[command(name = "uamatch", version, about)]
struct Cli {
    /// Device data file (JSON)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Comma separated required properties; empty selects every property
    #[arg(short, long)]
    properties: Option<String>,

    /// YAML provider configuration; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resultset cache capacity (0 disables the cache)
    #[arg(long)]
    cache_size: Option<usize>,

    /// Number of pooled worksets
    #[arg(long)]
    pool_size: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Write logs to stderr as JSON
    #[arg(long)]
    log_json: bool,

    /// User agents to detect
    user_agents: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = build_config(&cli)?;
    let provider = Provider::new(&config)
        .with_context(|| format!("failed to open {}", config.data_file.display()))?;

    let mut out = io::stdout().lock();
    if cli.user_agents.is_empty() {
        detect_lines(&provider, io::stdin().lock(), cli.pretty, &mut out)?;
    } else {
        for user_agent in &cli.user_agents {
            print_detection(&provider, user_agent, cli.pretty, &mut out)?;
        }
    }
    out.flush()?;

    provider.close();
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<ProviderConfig> {
    let mut config = match &cli.config {
        Some(path) => ProviderConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ProviderConfig::new(PathBuf::new(), ""),
    };
    if let Some(data) = &cli.data {
        config.data_file = data.clone();
    }
    if let Some(properties) = &cli.properties {
        config.required_properties = properties.clone();
    }
    if let Some(cache_size) = cli.cache_size {
        config.cache_size = cache_size;
    }
    if let Some(pool_size) = cli.pool_size {
        config.pool_size = pool_size;
    }
    Ok(config)
}

/// One detection per input line. Bytes that are not UTF-8 are replaced
/// rather than ending the run.
fn detect_lines(
    provider: &Provider,
    input: impl BufRead,
    pretty: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for line in input.split(b'\n') {
        let line = line.context("failed to read stdin")?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
        print_detection(provider, &String::from_utf8_lossy(line), pretty, out)?;
    }
    Ok(())
}

fn print_detection(
    provider: &Provider,
    user_agent: &str,
    pretty: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match provider.detect(user_agent) {
        Some(result) if pretty => serde_json::to_writer_pretty(&mut *out, &result)?,
        Some(result) => serde_json::to_writer(&mut *out, &result)?,
        None => out.write_all(b"false")?,
    }
    out.write_all(b"\n")?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
