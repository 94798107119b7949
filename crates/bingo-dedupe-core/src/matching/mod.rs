pub mod adjudicate;
pub mod oracle;
pub mod processor;
pub mod reconcile;

pub use adjudicate::{
    Adjudicator, MatchDecision, MatchPrompt, OverlapDecision, OverlapKind, OverlapPrompt,
    PromptCandidate,
};
pub use oracle::{FuzzyOracle, ScoredCandidate, SimilarityOracle};
pub use processor::{MatchOutcome, MatchPolicy, MatchProcessor};
pub use reconcile::{ReconcileReport, reconcile};
