//! kbchat-rs CLI application
//!
//! Command-line interface for the kbchat-rs library.

use clap::{Parser, Subcommand};
use kbchat_rs::{ChatSession, Config, KbChatError, KbSearch, KbTable, run_chat_loop};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "kbchat-rs")]
#[command(
    about = "A chat front end over a keyword-ranked knowledgebase with a text-generation fallback"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat against the knowledgebase
    Chat {
        /// Knowledgebase CSV file (falls back to the config file)
        #[arg(short, long)]
        kb: Option<PathBuf>,

        /// Generation service endpoint
        #[arg(short, long)]
        endpoint: Option<String>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Ask a single question and print the routed answer
    Ask {
        /// Knowledgebase CSV file
        #[arg(short, long)]
        kb: PathBuf,

        /// Generation service endpoint
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Query text
        query: String,
    },

    /// Rank the knowledgebase directly, bypassing the response router
    Search {
        /// Knowledgebase CSV file
        #[arg(short, long)]
        kb: PathBuf,

        /// Search query
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            kb,
            endpoint,
            config,
        } => {
            chat_command(kb, endpoint, config).await?;
        }
        Commands::Ask {
            kb,
            endpoint,
            query,
        } => {
            ask_command(kb, endpoint, query).await?;
        }
        Commands::Search { kb, query } => {
            search_command(kb, query)?;
        }
    }

    Ok(())
}

fn load_config(
    path: Option<PathBuf>,
    endpoint: Option<String>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config = config.apply_env()?;
    if let Some(endpoint) = endpoint {
        config.generation.endpoint = endpoint;
    }
    Ok(config)
}

async fn chat_command(
    kb: Option<PathBuf>,
    endpoint: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path, endpoint)?;

    let kb_path = kb.or_else(|| config.kb.path.clone()).ok_or_else(|| {
        KbChatError::Config("no knowledgebase source configured".to_string())
    })?;

    let table = Arc::new(KbTable::load(&kb_path)?);
    let session = ChatSession::new(table, &config)?;

    run_chat_loop(session).await?;

    Ok(())
}

async fn ask_command(
    kb: PathBuf,
    endpoint: Option<String>,
    query: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(None, endpoint)?;

    let table = Arc::new(KbTable::load(&kb)?);
    let mut session = ChatSession::new(table, &config)?;

    let reply = session.respond(&query).await;
    println!("{}", reply);

    Ok(())
}

fn search_command(kb: PathBuf, query: String) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Searching for: \"{}\"", query);

    let table = Arc::new(KbTable::load(&kb)?);
    let search = KbSearch::new(table)?;

    let ranked = search.rank(&query)?;
    println!(
        "📋 Best row: {} (matched {}/{} tokens)",
        ranked.row, ranked.score, ranked.token_count
    );
    println!();
    println!("{}", search.answer(&query)?);

    Ok(())
}
