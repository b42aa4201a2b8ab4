pub mod compress;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod segment;
pub mod storage;
pub mod tokenizer;

pub use compress::{Compressor, DeltaVarLenCompressor, NaiveCompressor};
pub use config::{IndexConfig, TokenizerConfig};
pub use error::{Result, SegdexError};
pub use models::*;
pub use segment::InvertedIndex;
pub use tokenizer::{Analyzer, PunctuationAnalyzer, Tokenizer, WordBreakAnalyzer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
