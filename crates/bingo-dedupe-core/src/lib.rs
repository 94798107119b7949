//! Bingo Dedupe: interactive deduplication of reading-bingo authors and books.

pub mod authors;
pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod session;
pub mod storage;

pub use config::{AppConfig, AuthorsConfig, MatchingConfig, StorageConfig};
pub use error::{DedupeError, ExitCode, Result};
pub use models::*;

pub use matching::{
    Adjudicator, FuzzyOracle, MatchDecision, MatchOutcome, MatchPolicy, MatchPrompt,
    OverlapDecision, OverlapKind, OverlapPrompt, PromptCandidate, ReconcileReport,
    SimilarityOracle,
};
pub use session::{LoadReport, Session, SessionOptions, SessionOutcome, SessionReport};
pub use storage::RecordStore;
