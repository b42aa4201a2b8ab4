use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use segdex::{
    DeltaVarLenCompressor, Document, IndexConfig, InvertedIndex, Tokenizer, TokenizerConfig,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "segdex")]
#[command(about = "Disk-backed segmented inverted index", long_about = None)]
struct Args {
    /// Index directory
    #[arg(long, env = "SEGDEX_DIR", default_value = "./index")]
    dir: PathBuf,

    /// Record term positions (required for phrase search)
    #[arg(long, env = "SEGDEX_POSITIONAL")]
    positional: bool,

    /// Flush the buffer after this many documents
    #[arg(long, env = "SEGDEX_FLUSH_THRESHOLD", default_value_t = IndexConfig::DEFAULT_FLUSH_THRESHOLD)]
    flush_threshold: usize,

    /// Merge once this many segments exist
    #[arg(long, env = "SEGDEX_MERGE_THRESHOLD", default_value_t = IndexConfig::DEFAULT_MERGE_THRESHOLD)]
    merge_threshold: usize,

    /// Stemming and stop-word language
    #[arg(long, env = "SEGDEX_LANGUAGE", default_value = "english")]
    language: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index each file as one document, then flush
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Search the index
    Search {
        #[arg(long, value_enum, default_value = "term")]
        mode: SearchMode,
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Mark every document matching a keyword as deleted
    Delete { keyword: String },
    /// Merge all segments
    Merge,
    /// Print segment statistics
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum SearchMode {
    Term,
    And,
    Or,
    Phrase,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("segdex v{}", segdex::VERSION);

    let config = IndexConfig {
        flush_threshold: args.flush_threshold,
        merge_threshold: args.merge_threshold,
        positional: args.positional,
    };
    let tokenizer = Tokenizer::new(&TokenizerConfig {
        language: args.language.clone(),
        ..TokenizerConfig::default()
    })?;
    let mut index = InvertedIndex::open_with_config(&args.dir, tokenizer, DeltaVarLenCompressor, config)
        .with_context(|| format!("failed to open index at {}", args.dir.display()))?;

    match args.command {
        Command::Add { files } => {
            for file in &files {
                let text = std::fs::read_to_string(file)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                index.add_document(Document::new(text))?;
            }
            index.flush()?;
            info!("Indexed {} documents", files.len());
        }
        Command::Search { mode, keywords } => {
            let results = match mode {
                SearchMode::Term => index.search_query(&keywords.join(" "))?,
                SearchMode::And => index.search_and_query(keywords.as_slice())?,
                SearchMode::Or => index.search_or_query(keywords.as_slice())?,
                SearchMode::Phrase => index.search_phrase_query(keywords.as_slice())?,
            };
            let mut hits = 0;
            for doc in results {
                hits += 1;
                println!("{}", doc.text().trim_end());
                println!("---");
            }
            info!("{} matching documents", hits);
        }
        Command::Delete { keyword } => {
            index.delete_documents(&keyword)?;
        }
        Command::Merge => {
            index.merge_all_segments()?;
        }
        Command::Stats => {
            let manifest = index.manifest();
            println!("segments:      {}", manifest.segment_count());
            println!("documents:     {}", manifest.total_doc_count());
            println!("positional:    {}", manifest.positional);
            println!("compressor:    {}", manifest.compressor);
            println!("deleted terms: {}", manifest.deleted_terms.len());
            for entry in manifest.iter() {
                println!(
                    "  {}: {} documents, {} terms",
                    entry.id, entry.doc_count, entry.term_count
                );
            }
        }
    }

    Ok(())
}
