use std::path::PathBuf;

use clap::{Parser, Subcommand};
use findaso_index::Result;
use findaso_index::commands::{ingest, query};
use findaso_index::config::Config;

#[derive(Parser)]
#[command(name = "findaso-index")]
#[command(about = "Embed Findaso solutions into Pinecone and search them")]
#[command(version)]
struct Cli {
    /// Dotenv file providing DB_URI, PINECONE_API_KEY and OPENAI_KEY
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,
    /// Settings file [default: ~/.findaso-index/config.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render, embed and upload every solution in the database
    Ingest,
    /// Print the indexed solutions closest to a query
    Query {
        /// Free-text query
        text: String,
        /// Number of results, overrides `search.top_k`
        #[arg(short)]
        k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings_path = match cli.config {
        Some(path) => path,
        None => Config::default_settings_path()?,
    };
    let config = Config::load(&cli.env_file, &settings_path)?;

    match cli.command {
        Commands::Ingest => {
            ingest(&config).await?;
        }
        Commands::Query { text, k } => {
            query(&config, &text, k.unwrap_or(config.search.top_k))?;
        }
    }

    Ok(())
}
