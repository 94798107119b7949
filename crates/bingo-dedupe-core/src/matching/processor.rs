use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::config::MatchingConfig;
use crate::error::{DedupeError, Result};
use crate::matching::adjudicate::{Adjudicator, MatchDecision, MatchPrompt, PromptCandidate};
use crate::matching::oracle::SimilarityOracle;
use crate::models::{
    Book, DEFAULT_TITLE_AUTHOR_SEPARATOR, DuplicateRegistry, Entity, EntityKind, IgnoreRegistry,
};

/// Knobs for one matching run.
#[derive(Debug, Clone)]
pub struct MatchPolicy {
    /// Minimum oracle score (0–100) for a candidate to be considered.
    pub match_score: u8,
    /// Candidates that are never offered, whatever they score.
    pub banned: BTreeSet<String>,
    /// Used to check manually typed books.
    pub title_author_separator: String,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            match_score: 90,
            banned: BTreeSet::new(),
            title_author_separator: DEFAULT_TITLE_AUTHOR_SEPARATOR.to_string(),
        }
    }
}

impl MatchPolicy {
    pub fn new(match_score: u8) -> Self {
        Self {
            match_score: match_score.min(100),
            ..Self::default()
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self {
            match_score: config.match_score.min(100),
            banned: config.banned_matches.iter().cloned().collect(),
            title_author_separator: config.title_author_separator.clone(),
        }
    }

    pub fn with_banned<I, S>(mut self, banned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banned = banned.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.title_author_separator = separator.into();
        self
    }

    fn is_banned<E: Entity>(&self, entity: &E) -> bool {
        self.banned.contains(entity.as_ref())
    }
}

/// What happened to one processed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<E> {
    /// Recorded as its own key; `ignored` candidates were rejected.
    NoMatch { ignored: usize },
    /// `absorbed` were recorded as duplicates of `canonical`.
    Merged {
        canonical: E,
        absorbed: BTreeSet<E>,
        ignored: usize,
    },
}

/// Classifies one unscanned entity against everything known so far.
pub struct MatchProcessor<'a> {
    policy: &'a MatchPolicy,
    oracle: &'a dyn SimilarityOracle,
    adjudicator: &'a mut dyn Adjudicator,
}

impl<'a> MatchProcessor<'a> {
    pub fn new(
        policy: &'a MatchPolicy,
        oracle: &'a dyn SimilarityOracle,
        adjudicator: &'a mut dyn Adjudicator,
    ) -> Self {
        Self {
            policy,
            oracle,
            adjudicator,
        }
    }

    /// Process `item`, which must already be removed from `unscanned`.
    pub fn process<E: Entity>(
        &mut self,
        item: E,
        registry: &mut DuplicateRegistry<E>,
        ignores: &mut IgnoreRegistry<E>,
        unscanned: &mut BTreeSet<E>,
    ) -> Result<MatchOutcome<E>> {
        let already_ignored: BTreeSet<E> = ignores.ignored_for(&item).cloned().unwrap_or_default();
        let allowed = |candidate: &E| {
            *candidate == item
                || (!already_ignored.contains(candidate) && !self.policy.is_banned(candidate))
        };

        let mut pool = registry.all_entities();
        pool.extend(unscanned.iter().cloned());
        pool.retain(|candidate| allowed(candidate));
        let candidates: Vec<&E> = pool.iter().collect();
        let texts: Vec<&str> = candidates.iter().map(|c| c.as_ref()).collect();

        let results = self
            .oracle
            .best_matches(item.as_ref(), &texts, self.policy.match_score)?;
        debug!(item = %item, matches = results.len(), "Oracle results");

        // A rescanned item is already a key, whether or not the oracle returns it.
        let mut existing_keys = BTreeSet::new();
        let mut bare = BTreeSet::new();
        if registry.contains_key(&item) {
            existing_keys.insert(item.clone());
        } else {
            bare.insert(item.clone());
        }
        for scored in &results {
            let candidate = candidates.get(scored.index).ok_or_else(|| {
                DedupeError::OracleUnavailable(format!(
                    "returned index {} for a pool of {}",
                    scored.index,
                    candidates.len()
                ))
            })?;
            if registry.is_value(candidate) {
                existing_keys.insert(registry.lookup_canonical(candidate)?.clone());
            } else if registry.contains_key(candidate) {
                existing_keys.insert((*candidate).clone());
            } else {
                bare.insert((*candidate).clone());
            }
        }

        let initial: BTreeSet<E> = bare
            .union(&existing_keys)
            .filter(|candidate| allowed(*candidate))
            .cloned()
            .collect();
        let filtered: BTreeSet<E> = initial
            .iter()
            .filter(|candidate| !contributor_subset(&item, *candidate))
            .cloned()
            .collect();

        let (resolution, new_ignores): (Option<(E, BTreeSet<E>)>, BTreeSet<E>) =
            if filtered.len() > 1 {
                debug!("Matching {item}");
                match self.adjudicate(&item, &filtered, &existing_keys)? {
                    Some((best, kept)) => {
                        let best = if registry.is_value(&best) {
                            let key = registry.lookup_canonical(&best)?.clone();
                            warn!("{best} already deduped to {key}. Using {key}.");
                            key
                        } else {
                            best
                        };
                        let ignored = initial
                            .iter()
                            .filter(|c| !kept.contains(*c) && **c != best && **c != item)
                            .cloned()
                            .collect();
                        (Some((best, kept)), ignored)
                    }
                    None => (
                        None,
                        initial.iter().filter(|c| **c != item).cloned().collect(),
                    ),
                }
            } else {
                (None, initial.difference(&filtered).cloned().collect())
            };

        let ignored = ignores.record_all(&item, &new_ignores);

        let Some((best, kept)) = resolution else {
            info!("No duplicates found for {item}");
            if !registry.is_value(&item) {
                registry.insert_key(item);
            }
            return Ok(MatchOutcome::NoMatch { ignored });
        };

        let absorbed_keys: BTreeSet<E> = existing_keys
            .intersection(&kept)
            .filter(|key| **key != best)
            .cloned()
            .collect();
        let absorbed_bare: BTreeSet<E> = bare
            .intersection(&kept)
            .filter(|entity| **entity != best)
            .cloned()
            .collect();

        registry.insert_key(best.clone());
        for key in &absorbed_keys {
            registry.merge(&best, key);
            warn!("Duplicates of {key} swapped to duplicates of {best}");
        }
        if !absorbed_bare.is_empty() {
            registry.add_duplicates(&best, absorbed_bare.iter().cloned());
            info!(
                "{} recorded as duplicate{} of {best}",
                join_entities(&absorbed_bare),
                if absorbed_bare.len() > 1 { "s" } else { "" }
            );
        }
        if !registry.is_scanned(&item) {
            registry.insert_key(item);
        }

        let group = registry.duplicates_of(&best).cloned().unwrap_or_default();
        unscanned.retain(|entity| *entity != best && !group.contains(entity));

        let mut absorbed = absorbed_keys;
        absorbed.extend(absorbed_bare);
        Ok(MatchOutcome::Merged {
            canonical: best,
            absorbed,
            ignored,
        })
    }

    /// Run the choose-the-best-version protocol until a decision sticks.
    ///
    /// Returns the chosen canonical form and the candidates it covers, or `None`
    /// when nothing matches.
    fn adjudicate<E: Entity>(
        &mut self,
        item: &E,
        filtered: &BTreeSet<E>,
        existing_keys: &BTreeSet<E>,
    ) -> Result<Option<(E, BTreeSet<E>)>> {
        let mut matched: Vec<E> = filtered.iter().cloned().collect();
        loop {
            let prompt = MatchPrompt {
                item: item.as_ref(),
                candidates: matched
                    .iter()
                    .map(|candidate| PromptCandidate {
                        text: candidate.as_ref(),
                        canonical_key: existing_keys.contains(candidate),
                    })
                    .collect(),
            };

            match self.adjudicator.choose_match(&prompt)? {
                MatchDecision::Select(idx) => {
                    let best = matched.get(idx).cloned().ok_or_else(|| {
                        DedupeError::InvalidInput(format!("no candidate numbered {idx}"))
                    })?;
                    return Ok(Some((best, matched.into_iter().collect())));
                }
                MatchDecision::Remove(indices) => {
                    if let Some(idx) = indices.iter().find(|idx| **idx >= matched.len()) {
                        return Err(DedupeError::InvalidInput(format!(
                            "no candidate numbered {idx}"
                        )));
                    }
                    matched = matched
                        .into_iter()
                        .enumerate()
                        .filter(|(idx, _)| !indices.contains(idx))
                        .map(|(_, candidate)| candidate)
                        .collect();
                    if matched.len() < 2 {
                        return Ok(None);
                    }
                }
                MatchDecision::Retype(text) => match self.check_retyped::<E>(text) {
                    Ok(best) => return Ok(Some((best, matched.into_iter().collect()))),
                    Err(err) => warn!(%err, "Rejected manually entered version"),
                },
                MatchDecision::IgnoreAll => return Ok(None),
                MatchDecision::Exit => return Err(DedupeError::UserTermination),
            }
        }
    }

    fn check_retyped<E: Entity>(&self, text: String) -> Result<E> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(DedupeError::InvalidInput(
                "manually entered version is empty".to_string(),
            ));
        }
        if E::KIND == EntityKind::Book {
            Book::from(text.as_str()).split(&self.policy.title_author_separator)?;
        }
        Ok(E::from(text))
    }
}

/// One contributor set strictly contains the other ("Smith" vs "Smith, Jones").
fn contributor_subset<E: Entity>(item: &E, candidate: &E) -> bool {
    match (item.contributors(), candidate.contributors()) {
        (Some(left), Some(right)) => {
            left != right && (left.is_subset(&right) || right.is_subset(&left))
        }
        _ => false,
    }
}

fn join_entities<E: Entity>(entities: &BTreeSet<E>) -> String {
    entities
        .iter()
        .map(|e| e.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
