mod error;
mod history;
mod parser;
mod server;
mod settings;
mod source;
mod timeline;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use parser::{Document, Extractor};
use settings::Settings;
use source::HttpSource;

#[derive(Parser)]
#[command(name = "custody_timeline", about = "Custody history timeline service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Bind address (default: CUSTODY_HOST:CUSTODY_PORT)
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Fetch one identifier from the upstream and print the response body
    Fetch {
        id: String,
    },
    /// Run extraction + timeline over a saved upstream document
    Extract {
        file: PathBuf,
        /// Treat the file as a JSON API response instead of markup
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr } => {
            let settings = Settings::load().context("Failed to load configuration")?;
            let addr = addr.unwrap_or_else(|| settings.bind_addr());
            server::serve(&settings, &addr).await
        }
        Commands::Fetch { id } => {
            let settings = Settings::load().context("Failed to load configuration")?;
            let source = HttpSource::new(&settings)?;
            let response = history::lookup(&source, &Extractor::default(), &id).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Commands::Extract { file, json } => {
            let body = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let content_type = json.then_some("application/json");
            let doc = Document::from_body(body, content_type).context("Failed to parse JSON document")?;

            match Extractor::default().extract(&doc) {
                Some(records) => {
                    let timeline = timeline::build(&records);
                    println!("{}", serde_json::to_string_pretty(&timeline)?);
                }
                None => println!("{}", history::NO_RECORDS_MESSAGE),
            }
            Ok(())
        }
    }
}
