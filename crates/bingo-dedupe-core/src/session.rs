use std::collections::BTreeSet;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

use tracing::{debug, error, info};

use crate::authors;
use crate::config::{AppConfig, AuthorsConfig};
use crate::error::Result;
use crate::matching::{
    Adjudicator, MatchOutcome, MatchPolicy, MatchProcessor, ReconcileReport, SimilarityOracle,
    reconcile,
};
use crate::models::{
    Author, Book, EntityKind, Recorded, RecordedDupes, RecordedIgnores, TitleAuthor,
};
use crate::storage::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every entity in the pool was classified.
    Completed,
    /// The adjudicator asked to save and exit.
    Terminated,
}

/// Summary of one pass over an entity pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub kind: EntityKind,
    pub outcome: SessionOutcome,
    pub processed: usize,
    /// Entities recorded as duplicates of another.
    pub merges: usize,
    /// Candidates rejected as non-matches.
    pub ignores: usize,
    /// Entities left unscanned when the session ended.
    pub remaining: usize,
    pub reconciled: ReconcileReport,
}

impl SessionReport {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            outcome: SessionOutcome::Completed,
            processed: 0,
            merges: 0,
            ignores: 0,
            remaining: 0,
            reconciled: ReconcileReport::default(),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.outcome == SessionOutcome::Terminated
    }
}

/// Repairs made to both registries when the records were opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub authors: ReconcileReport,
    pub books: ReconcileReport,
}

impl LoadReport {
    pub fn is_noop(&self) -> bool {
        self.authors.is_noop() && self.books.is_noop()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Put every existing key back in the unscanned set.
    pub rescan_keys: bool,
    /// Save after this many processed items; 0 saves only on exit.
    pub autosave_interval: usize,
}

/// Loaded records plus the policy to extend them with.
///
/// Records are read once at [`Session::open`], mutated in memory, and written
/// back whenever a run ends, however it ends.
pub struct Session {
    store: RecordStore,
    policy: MatchPolicy,
    options: SessionOptions,
    dupes: RecordedDupes,
    ignores: RecordedIgnores,
    loaded: LoadReport,
}

impl Session {
    /// Load both records, migrating books to the policy's separator if needed,
    /// then reconcile the author and book registries.
    ///
    /// Repairs are saved straight away. If `adjudicator` asks to save and exit
    /// part way, the repairs made so far are saved and the termination is
    /// returned.
    pub fn open(
        store: RecordStore,
        policy: MatchPolicy,
        options: SessionOptions,
        adjudicator: &mut dyn Adjudicator,
    ) -> Result<Self> {
        let (dupes, ignores) = store.load(&policy.title_author_separator)?;
        let mut session = Self {
            store,
            policy,
            options,
            dupes,
            ignores,
            loaded: LoadReport::default(),
        };

        let result = session.reconcile_loaded(adjudicator);
        if result.is_err() || !session.loaded.is_noop() {
            session.finish(result)?;
        }
        Ok(session)
    }

    pub fn from_config(config: &AppConfig, adjudicator: &mut dyn Adjudicator) -> Result<Self> {
        Self::open(
            RecordStore::from_config(config),
            MatchPolicy::from_config(&config.matching),
            SessionOptions {
                rescan_keys: config.matching.rescan_keys,
                autosave_interval: config.matching.autosave_interval,
            },
            adjudicator,
        )
    }

    /// Repairs made while opening.
    pub fn loaded(&self) -> LoadReport {
        self.loaded
    }

    pub fn dupes(&self) -> &RecordedDupes {
        &self.dupes
    }

    pub fn ignores(&self) -> &RecordedIgnores {
        &self.ignores
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.dupes, &self.ignores)
    }

    /// Repair the `E` registry and save.
    pub fn reconcile<E: Recorded>(
        &mut self,
        adjudicator: &mut dyn Adjudicator,
    ) -> Result<ReconcileReport> {
        let result = reconcile(E::dupes_mut(&mut self.dupes), adjudicator);
        self.finish(result)
    }

    fn reconcile_loaded(&mut self, adjudicator: &mut dyn Adjudicator) -> Result<()> {
        self.loaded.authors = reconcile(Author::dupes_mut(&mut self.dupes), adjudicator)?;
        self.loaded.books = reconcile(Book::dupes_mut(&mut self.dupes), adjudicator)?;
        Ok(())
    }

    /// Classify every unscanned entity of `pool`, saving on every exit path.
    ///
    /// The `E` registry is reconciled again first. A "save and exit" decision
    /// ends the run with [`SessionOutcome::Terminated`]; any other error is
    /// returned after the save.
    pub fn run<E, I>(
        &mut self,
        pool: I,
        oracle: &dyn SimilarityOracle,
        adjudicator: &mut dyn Adjudicator,
    ) -> Result<SessionReport>
    where
        E: Recorded,
        I: IntoIterator<Item = E>,
    {
        let mut report = SessionReport::new(E::KIND);
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.process_pool(pool, oracle, adjudicator, &mut report)
        }));

        let result = match result {
            Ok(result) => result,
            Err(payload) => {
                error!("Unexpected panic. Saving progress and exiting.");
                if let Err(err) = self.save() {
                    error!(%err, "Failed to save duplicates");
                }
                resume_unwind(payload);
            }
        };

        match self.finish(result) {
            Ok(()) => {
                info!("All {}s scanned!", E::KIND);
                Ok(report)
            }
            Err(err) if err.is_user_termination() => {
                report.outcome = SessionOutcome::Terminated;
                Ok(report)
            }
            Err(err) => Err(err),
        }
    }

    /// Save, then hand back `result`. A failed save is reported after the original error.
    fn finish<T>(&self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => {}
            Err(err) if err.is_user_termination() => info!("Saving progress and exiting"),
            Err(err) => error!(%err, "Unexpected error. Saving progress and exiting."),
        }
        let saved = self.save();
        match (result, saved) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(save_err)) => {
                error!(%save_err, "Failed to save duplicates");
                Err(err)
            }
        }
    }

    fn process_pool<E, I>(
        &mut self,
        pool: I,
        oracle: &dyn SimilarityOracle,
        adjudicator: &mut dyn Adjudicator,
        report: &mut SessionReport,
    ) -> Result<()>
    where
        E: Recorded,
        I: IntoIterator<Item = E>,
    {
        report.reconciled = reconcile(E::dupes_mut(&mut self.dupes), adjudicator)?;

        let mut unscanned = self.initial_unscanned(pool);
        let total = unscanned.len();
        let rescanning = if self.options.rescan_keys {
            format!(", of which {} are being rescanned", E::dupes(&self.dupes).len())
        } else {
            String::new()
        };
        info!("Scanning {total} unscanned {}s{rescanning}.", E::KIND);

        let mut processor = MatchProcessor::new(&self.policy, oracle, adjudicator);
        while let Some(item) = unscanned.pop_first() {
            report.processed += 1;
            info!("{}/{total}: {item}", report.processed);

            let outcome = processor.process(
                item,
                E::dupes_mut(&mut self.dupes),
                E::ignores_mut(&mut self.ignores),
                &mut unscanned,
            );
            report.remaining = unscanned.len();
            match outcome? {
                MatchOutcome::NoMatch { ignored } => report.ignores += ignored,
                MatchOutcome::Merged {
                    absorbed, ignored, ..
                } => {
                    report.merges += absorbed.len();
                    report.ignores += ignored;
                }
            }

            let interval = self.options.autosave_interval;
            if interval > 0 && report.processed % interval == 0 {
                self.store.save(&self.dupes, &self.ignores)?;
                debug!(processed = report.processed, "Checkpoint saved");
            }
        }
        Ok(())
    }

    fn initial_unscanned<E, I>(&self, pool: I) -> BTreeSet<E>
    where
        E: Recorded,
        I: IntoIterator<Item = E>,
    {
        let registry = E::dupes(&self.dupes);
        let mut unscanned: BTreeSet<E> = pool
            .into_iter()
            .filter(|entity| !registry.is_scanned(entity))
            .collect();
        if self.options.rescan_keys {
            unscanned.extend(registry.keys().cloned());
        }
        unscanned
    }

    // ─── Author and book pipelines ─────────────────────────────

    /// The full author workflow: dedupe the pool, normalize multi-author
    /// joiners, dedupe individual names, then rebuild multi-author keys.
    ///
    /// Stops after the first terminated pass.
    pub fn run_authors(
        &mut self,
        pool: BTreeSet<Author>,
        settings: &AuthorsConfig,
        oracle: &dyn SimilarityOracle,
        adjudicator: &mut dyn Adjudicator,
    ) -> Result<Vec<SessionReport>> {
        let mut pool = pool;
        pool.extend(self.dupes.author_dupes.all_entities());

        let first = self.run(pool.clone(), oracle, adjudicator)?;
        if first.is_terminated() {
            return Ok(vec![first]);
        }
        let mut reports = vec![first];

        let normalized = authors::comma_separate_authors(
            &mut self.dupes.author_dupes,
            &settings.multi_author_joiners,
        );
        info!(normalized, "Normalized multi-author joiners");
        self.save()?;

        if settings.single_author_pass {
            pool.extend(authors::single_author_pool(&self.dupes.author_dupes));
            let second = self.run(pool, oracle, adjudicator)?;
            let terminated = second.is_terminated();
            reports.push(second);
            if terminated {
                return Ok(reports);
            }
        }

        let corrected = authors::correct_multi_author_keys(&mut self.dupes.author_dupes);
        info!(corrected, "Corrected multi-author groups");
        self.reconcile::<Author>(adjudicator)?;
        Ok(reports)
    }

    /// Fold author corrections into books, then dedupe the book pool.
    pub fn run_books(
        &mut self,
        pairs: &[TitleAuthor],
        propagate_authors: bool,
        oracle: &dyn SimilarityOracle,
        adjudicator: &mut dyn Adjudicator,
    ) -> Result<SessionReport> {
        let separator = self.policy.title_author_separator.clone();
        if propagate_authors {
            let author_map = self.dupes.author_dupes.get_dedupe_map();
            let propagated = authors::propagate_author_corrections(
                &mut self.dupes.book_dupes,
                pairs,
                &author_map,
                &separator,
            )?;
            info!(propagated, "Propagated author corrections to books");
        }

        let mut pool = pairs
            .iter()
            .map(|pair| Book::from_title_author(pair, &separator))
            .collect::<Result<BTreeSet<Book>>>()?;
        pool.extend(self.dupes.book_dupes.all_entities());
        self.run(pool, oracle, adjudicator)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::error::DedupeError;
    use crate::matching::adjudicate::testing::ScriptedAdjudicator;
    use crate::matching::oracle::testing::TableOracle;
    use crate::matching::{MatchDecision, OverlapDecision};

    fn author(name: &str) -> Author {
        Author::new(name)
    }

    fn pool(names: &[&str]) -> BTreeSet<Author> {
        names.iter().map(|n| author(n)).collect()
    }

    fn store(dir: &TempDir) -> RecordStore {
        RecordStore::new(
            dir.path().join("resolved_duplicates.json"),
            dir.path().join("ignored_duplicates.json"),
        )
    }

    fn open(dir: &TempDir, options: SessionOptions) -> Session {
        let mut adjudicator = ScriptedAdjudicator::new();
        Session::open(store(dir), MatchPolicy::new(90), options, &mut adjudicator).unwrap()
    }

    fn book(title: &str, author: &str) -> Book {
        Book::from_parts(title, author, " /// ").unwrap()
    }

    /// Authors chain `b1 -> B -> A`; books share `Z /// y` between two keys.
    const BROKEN_RECORDS: &str = r#"{
        "author_dupes": {"A": ["B"], "B": ["b1"]},
        "book_dupes": {"X /// y": ["Z /// y"], "W /// y": ["Z /// y"]}
    }"#;

    /// Reports an unavailable backend for every query.
    struct FailingOracle;

    impl SimilarityOracle for FailingOracle {
        fn best_matches(
            &self,
            _query: &str,
            _candidates: &[&str],
            _score_cutoff: u8,
        ) -> Result<Vec<crate::matching::ScoredCandidate>> {
            Err(DedupeError::OracleUnavailable("backend offline".to_string()))
        }
    }

    #[test]
    fn test_run_completes_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, SessionOptions::default());
        let oracle = TableOracle::new().with("Pratchett", "Pratchet", 94);
        // [0] Pratchet, [1] Pratchett
        let mut adjudicator = ScriptedAdjudicator::new().with_matches([MatchDecision::Select(1)]);

        let report = session
            .run(pool(&["Pratchett", "Pratchet", "Le Guin"]), &oracle, &mut adjudicator)
            .unwrap();

        assert_eq!(report.outcome, SessionOutcome::Completed);
        assert_eq!(report.merges, 1);
        assert_eq!(report.remaining, 0);

        let (dupes, _) = store(&dir).load(" /// ").unwrap();
        assert_eq!(
            dupes.author_dupes.duplicates_of(&author("Pratchett")),
            Some(&pool(&["Pratchet"]))
        );
        assert!(dupes.author_dupes.contains_key(&author("Le Guin")));
    }

    #[test]
    fn test_exit_saves_decisions_made_so_far() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, SessionOptions::default());
        let oracle = TableOracle::new()
            .with("Banks", "Bnaks", 92)
            .with("Tolkien", "Tolkein", 93);
        // "Banks" is processed first and merged; exit at "Tolkein".
        let mut adjudicator = ScriptedAdjudicator::new()
            .with_matches([MatchDecision::Select(0), MatchDecision::Exit]);

        let report = session
            .run(pool(&["Banks", "Bnaks", "Tolkien", "Tolkein"]), &oracle, &mut adjudicator)
            .unwrap();

        assert!(report.is_terminated());
        assert_eq!(report.processed, 2);

        let (dupes, _) = store(&dir).load(" /// ").unwrap();
        assert_eq!(
            dupes.author_dupes.duplicates_of(&author("Banks")),
            Some(&pool(&["Bnaks"]))
        );
        assert!(!dupes.author_dupes.is_scanned(&author("Tolkein")));

        // Resuming picks up only what is left.
        let mut resumed = open(&dir, SessionOptions::default());
        let mut adjudicator = ScriptedAdjudicator::new().with_matches([MatchDecision::Select(1)]);
        let report = resumed
            .run(pool(&["Banks", "Bnaks", "Tolkien", "Tolkein"]), &oracle, &mut adjudicator)
            .unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(
            resumed.dupes().author_dupes.duplicates_of(&author("Tolkien")),
            Some(&pool(&["Tolkein"]))
        );
    }

    #[test]
    fn test_error_still_saves() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, SessionOptions::default());
        session.dupes.author_dupes.insert_key(author("Jemisin"));
        let mut adjudicator = ScriptedAdjudicator::new();

        let err = session
            .run(pool(&["Okorafor"]), &FailingOracle, &mut adjudicator)
            .unwrap_err();

        assert!(matches!(err, DedupeError::OracleUnavailable(_)));
        let (dupes, _) = store(&dir).load(" /// ").unwrap();
        assert!(dupes.author_dupes.contains_key(&author("Jemisin")));
    }

    #[test]
    fn test_open_reconciles_both_registries() {
        let dir = TempDir::new().unwrap();
        fs::write(store(&dir).dupes_path(), BROKEN_RECORDS).unwrap();
        let mut adjudicator = ScriptedAdjudicator::new()
            .with_overlaps([OverlapDecision::First, OverlapDecision::Second]);

        let session = Session::open(
            store(&dir),
            MatchPolicy::new(90),
            SessionOptions::default(),
            &mut adjudicator,
        )
        .unwrap();

        assert!(adjudicator.is_exhausted());
        assert_eq!(session.loaded().authors.key_value_merges, 1);
        assert_eq!(session.loaded().books.value_value_merges, 1);

        let authors = &session.dupes().author_dupes;
        assert!(authors.is_stable());
        let map = authors.get_dedupe_map();
        assert_eq!(map.get(&author("b1")), Some(&author("A")));
        assert!(map.values().all(|canonical| !map.contains_key(canonical)));

        // W /// y sorts first, so the second choice keeps X /// y.
        let books = &session.dupes().book_dupes;
        assert!(books.is_stable());
        assert_eq!(
            books.duplicates_of(&book("X", "y")),
            Some(&BTreeSet::from([book("W", "y"), book("Z", "y")]))
        );

        // The repairs are already on disk.
        let (saved, _) = store(&dir).load(" /// ").unwrap();
        assert!(saved.author_dupes.is_stable());
        assert!(saved.book_dupes.is_stable());
    }

    #[test]
    fn test_exit_while_opening_saves_repairs_so_far() {
        let dir = TempDir::new().unwrap();
        fs::write(store(&dir).dupes_path(), BROKEN_RECORDS).unwrap();
        let mut adjudicator = ScriptedAdjudicator::new()
            .with_overlaps([OverlapDecision::First, OverlapDecision::Exit]);

        let err = Session::open(
            store(&dir),
            MatchPolicy::new(90),
            SessionOptions::default(),
            &mut adjudicator,
        )
        .err()
        .unwrap();

        assert!(err.is_user_termination());
        let (saved, _) = store(&dir).load(" /// ").unwrap();
        assert!(saved.author_dupes.is_stable());
        assert!(!saved.book_dupes.is_stable());
    }

    #[test]
    fn test_book_session_merges_and_ignores() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, SessionOptions::default());
        let habit = book("The Habit", "Tolkien");
        let hobbit = book("The Hobbit", "Tolkien");
        let hobit = book("The Hobit", "Tolkien");
        let oracle = TableOracle::new()
            .with(habit.as_str(), hobbit.as_str(), 91)
            .with(hobbit.as_str(), hobit.as_str(), 95);
        let pairs = vec![
            TitleAuthor::new("The Hobit", "Tolkien"),
            TitleAuthor::new("The Hobbit", "Tolkien"),
            TitleAuthor::new("The Habit", "Tolkien"),
        ];
        // "The Habit" first: [0] Habit, [1] Hobbit; then [0] Hobbit, [1] Hobit.
        let mut adjudicator = ScriptedAdjudicator::new()
            .with_matches([MatchDecision::IgnoreAll, MatchDecision::Select(0)]);

        let report = session
            .run_books(&pairs, false, &oracle, &mut adjudicator)
            .unwrap();

        assert_eq!(report.kind, EntityKind::Book);
        assert_eq!(report.outcome, SessionOutcome::Completed);
        assert_eq!(report.processed, 2);
        assert_eq!(report.merges, 1);
        assert_eq!(report.ignores, 1);
        assert!(adjudicator.is_exhausted());

        let (dupes, ignores) = store(&dir).load(" /// ").unwrap();
        assert_eq!(
            dupes.book_dupes.duplicates_of(&hobbit),
            Some(&BTreeSet::from([hobit]))
        );
        assert_eq!(dupes.book_dupes.duplicates_of(&habit), Some(&BTreeSet::new()));
        assert!(ignores.ignored_book_dupes.is_ignored(&hobbit, &habit));
        assert!(ignores.ignored_book_dupes.is_ignored(&habit, &hobbit));
    }

    #[test]
    fn test_rescan_reopens_existing_keys() {
        let dir = TempDir::new().unwrap();
        let mut session = open(
            &dir,
            SessionOptions {
                rescan_keys: true,
                autosave_interval: 0,
            },
        );
        session.dupes.author_dupes.insert_key(author("Hobb"));
        session.dupes.author_dupes.insert_key(author("Hob"));
        let oracle = TableOracle::new().with("Hob", "Hobb", 91);
        // "Hob" is popped first: [0] Hob {CK}, [1] Hobb {CK}
        let mut adjudicator = ScriptedAdjudicator::new().with_matches([MatchDecision::Select(1)]);

        let report = session
            .run(BTreeSet::<Author>::new(), &oracle, &mut adjudicator)
            .unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(
            session.dupes().author_dupes.duplicates_of(&author("Hobb")),
            Some(&pool(&["Hob"]))
        );
    }

    /// Reads the saved dupes file when first prompted, then exits.
    struct ProbeAdjudicator {
        path: std::path::PathBuf,
        seen: Option<String>,
    }

    impl Adjudicator for ProbeAdjudicator {
        fn choose_match(
            &mut self,
            _prompt: &crate::matching::MatchPrompt<'_>,
        ) -> Result<MatchDecision> {
            self.seen = fs::read_to_string(&self.path).ok();
            Ok(MatchDecision::Exit)
        }

        fn choose_overlap(
            &mut self,
            _prompt: &crate::matching::OverlapPrompt<'_>,
        ) -> Result<OverlapDecision> {
            Ok(OverlapDecision::Exit)
        }
    }

    #[test]
    fn test_checkpoint_saves_during_run() {
        let dir = TempDir::new().unwrap();
        let mut session = open(
            &dir,
            SessionOptions {
                rescan_keys: false,
                autosave_interval: 1,
            },
        );
        let oracle = TableOracle::new().with("Zelazny", "Zelazni", 93);
        let mut probe = ProbeAdjudicator {
            path: store(&dir).dupes_path().to_path_buf(),
            seen: None,
        };

        // "Wolfe" is classified and checkpointed before "Zelazni" prompts.
        let report = session
            .run(pool(&["Wolfe", "Zelazni", "Zelazny"]), &oracle, &mut probe)
            .unwrap();

        assert!(report.is_terminated());
        let seen = probe.seen.unwrap();
        assert!(seen.contains("Wolfe"));
    }

    #[test]
    fn test_run_books_propagates_author_fix() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, SessionOptions::default());
        session
            .dupes
            .author_dupes
            .add_duplicates(&author("Tolkien"), [author("Tolkein")]);
        let pairs = vec![
            TitleAuthor::new("The Hobbit", "Tolkein"),
            TitleAuthor::new("The Hobbit", "Tolkien"),
        ];
        let mut adjudicator = ScriptedAdjudicator::new();

        let report = session
            .run_books(&pairs, true, &TableOracle::new(), &mut adjudicator)
            .unwrap();

        assert_eq!(report.outcome, SessionOutcome::Completed);
        let right = book("The Hobbit", "Tolkien");
        let wrong = book("The Hobbit", "Tolkein");
        assert_eq!(
            session.dupes().book_dupes.duplicates_of(&right),
            Some(&BTreeSet::from([wrong]))
        );
    }

    #[test]
    fn test_run_authors_normalizes_and_splits() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, SessionOptions::default());
        let settings = AuthorsConfig::default();
        let oracle = TableOracle::new().with("Gaiman", "Gaimen", 92);
        // Second pass sees "Gaiman" split out of the group: [0] Gaiman, [1] Gaimen
        let mut adjudicator = ScriptedAdjudicator::new().with_matches([MatchDecision::Select(0)]);

        let reports = session
            .run_authors(
                pool(&["Pratchett and Gaimen", "Gaiman"]),
                &settings,
                &oracle,
                &mut adjudicator,
            )
            .unwrap();

        assert_eq!(reports.len(), 2);
        let authors = &session.dupes().author_dupes;
        assert!(authors.is_stable());
        assert_eq!(
            authors.duplicates_of(&author("Gaiman")),
            Some(&pool(&["Gaimen"]))
        );
        // The joiner fix and the name fix both land on the rebuilt group.
        assert_eq!(
            authors.duplicates_of(&author("Pratchett, Gaiman")),
            Some(&pool(&["Pratchett and Gaimen", "Pratchett, Gaimen"]))
        );
        assert!(adjudicator.is_exhausted());
    }
}
