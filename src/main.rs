// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use finrag::utils::logging::{format_error, format_info, format_success, format_warning};
use finrag::{
    AnswerEngine, Config, IndexBuilder, LanceDbStore, MultiQueryRetriever, OllamaEmbeddingClient,
    OllamaGenerationClient, Validator,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "finrag")]
#[command(version = "0.1.0")]
#[command(about = "RAG pipeline for financial documents using LanceDB", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, chunk, embed and index a financial document
    Ingest {
        /// Path to the CSV, Excel or PDF file
        file: PathBuf,

        /// Rebuild even when the file content is already indexed
        #[arg(long)]
        force: bool,
    },

    /// Answer a question over the indexed document
    Ask {
        /// The question to answer
        question: String,
    },

    /// Raw similarity search over the chunk index
    Search {
        /// Search query text
        query: String,

        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Show index statistics
    Stats,

    /// Drop the chunk table
    Reset {
        #[arg(long)]
        confirm: bool,
    },

    /// Check database connectivity and table state
    Verify,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    finrag::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Financial Document RAG Pipeline");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Ingest { file, force } => {
            cmd_ingest(&config, &file, force).await?;
        }
        Commands::Ask { question } => {
            cmd_ask(&config, &question).await?;
        }
        Commands::Search { query, limit } => {
            cmd_search(&config, &query, limit).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(&config, confirm).await?;
        }
        Commands::Verify => {
            cmd_verify(&config).await?;
        }
    }

    Ok(())
}

fn embedding_client(config: &Config) -> OllamaEmbeddingClient {
    OllamaEmbeddingClient::new(
        config.model.base_url.clone(),
        config.model.embedding_model.clone(),
        config.database.embedding_dim,
    )
}

fn generation_client(config: &Config) -> OllamaGenerationClient {
    OllamaGenerationClient::new(
        config.model.base_url.clone(),
        config.model.generation_model.clone(),
    )
}

async fn connect_store(config: &Config) -> Result<LanceDbStore> {
    let store = LanceDbStore::connect(config.database.clone())
        .await
        .context("Failed to connect to LanceDB")?;
    store.ping().await.context("Database connection failed")?;
    Ok(store)
}

async fn cmd_ingest(config: &Config, file: &PathBuf, force: bool) -> Result<()> {
    info!("Starting ingestion pipeline");

    Validator::validate_file_path(file).context("Invalid input file")?;
    Validator::validate_url(&config.model.base_url).context("Invalid model base URL")?;
    if !Validator::has_supported_extension(file) {
        println!(
            "{}",
            format_warning(&format!(
                "{} has no recognized extension, treating as plain text",
                file.display()
            ))
        );
    }

    let store = connect_store(config).await?;
    let embedder = embedding_client(config);
    let builder = IndexBuilder::new(config, &store, &embedder);

    let report = builder
        .build_from_file(file, force)
        .await
        .context("Ingestion failed")?;

    if report.skipped {
        println!(
            "{}",
            format_info(&format!(
                "{} unchanged ({} chunks already indexed), use --force to rebuild",
                report.source, report.chunks_indexed
            ))
        );
        return Ok(());
    }

    if report.degraded {
        println!(
            "{}",
            format_warning(&format!(
                "{} was only partially extracted, answers may be incomplete",
                report.source
            ))
        );
    }

    println!(
        "{}",
        format_success(&format!(
            "Indexed {}: {} documents, {} chunks in {}s",
            report.source, report.documents_extracted, report.chunks_indexed, report.duration_secs
        ))
    );

    let mut counts: Vec<_> = report.doc_type_counts.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (doc_type, count) in counts {
        println!("  {doc_type}: {count} chunks");
    }

    Ok(())
}

async fn cmd_ask(config: &Config, question: &str) -> Result<()> {
    Validator::validate_question(question).context("Invalid question")?;

    let store = connect_store(config).await?;
    let embedder = embedding_client(config);
    let generator = generation_client(config);

    let engine = AnswerEngine::new(&store, &embedder, &generator, config.model.retrieval_k);
    let answer = engine.answer(question).await;

    println!("\n{answer}\n");
    Ok(())
}

async fn cmd_search(config: &Config, query: &str, limit: usize) -> Result<()> {
    Validator::validate_question(query).context("Invalid query")?;

    let store = connect_store(config).await?;
    let embedder = embedding_client(config);
    let generator = generation_client(config);

    let retriever =
        MultiQueryRetriever::new(&store, &embedder, &generator, config.model.retrieval_k);
    let results = retriever.similarity_search(query, limit).await?;

    if results.is_empty() {
        println!("\nNo results found for query: \"{query}\"\n");
        println!("Try:");
        println!("  - ingesting a document first (finrag ingest <file>)");
        println!("  - broader terms (\"total\", \"summary\", a column name)");
        return Ok(());
    }

    println!("\nFound {} results:\n", results.len());
    for result in &results {
        println!("{}", result.format_summary(200));
    }

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let store = connect_store(config).await?;

    let chunk_count = store.chunk_count().await?;
    println!("Table: {}", config.database.table_name);
    println!("Indexed chunks: {chunk_count}");

    if let Some(hash) = store.latest_content_hash().await? {
        println!("Content hash: {hash}");
    } else {
        println!("Content hash: (empty index)");
    }

    Ok(())
}

async fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        println!(
            "{}",
            format_error("This will delete all indexed data. Use --confirm to proceed")
        );
        return Ok(());
    }

    warn!("Resetting index - all data will be lost");

    let store = connect_store(config).await?;
    store.drop_table().await.context("Failed to drop table")?;

    println!("{}", format_success("Index cleared"));
    Ok(())
}

async fn cmd_verify(config: &Config) -> Result<()> {
    info!("Verifying database");

    let store = connect_store(config).await?;
    println!("{}", format_success("Database connection successful"));

    if store.table_exists().await? {
        let chunk_count = store.chunk_count().await?;
        println!(
            "{}",
            format_success(&format!(
                "Table {} exists with {} chunks",
                config.database.table_name, chunk_count
            ))
        );
    } else {
        println!(
            "{}",
            format_warning(&format!(
                "Table {} does not exist yet, run ingest first",
                config.database.table_name
            ))
        );
    }

    Ok(())
}
