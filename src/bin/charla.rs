// Charla - answer chat messages through the response pipeline

use charla::{CharlaConfig, Router};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML). Defaults to <config dir>/charla/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend hint: auto, predefined, gemini, deepseek
    #[arg(short, long, default_value = "auto")]
    backend: String,

    /// Print replies as `{"response": ...}` JSON lines
    #[arg(long)]
    json: bool,

    /// Write a default configuration file to --config (or the default path) and exit
    #[arg(long)]
    init: bool,

    /// Message to answer. Without it, messages are read from stdin, one per line
    message: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("charla=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.init {
        let path = match args.config {
            Some(path) => path,
            None => CharlaConfig::default_path()
                .ok_or_else(|| anyhow::anyhow!("no configuration directory on this platform"))?,
        };
        CharlaConfig::default().to_file(&path)?;
        info!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = CharlaConfig::load(args.config.as_deref())?;
    let router = Router::from_config(&config)?;

    if let Some(message) = args.message {
        let reply = router.route_hint(&message, &args.backend).await;
        print_reply(&reply, args.json)?;
        return Ok(());
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = router.route_hint(&line, &args.backend).await;
        print_reply(&reply, args.json)?;
    }

    Ok(())
}

fn print_reply(reply: &str, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({ "response": reply }))?);
    } else {
        println!("{}", reply);
    }
    Ok(())
}
