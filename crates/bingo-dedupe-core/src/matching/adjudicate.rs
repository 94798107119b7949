use std::collections::BTreeSet;

use crate::error::Result;

/// One entry in a numbered list of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCandidate<'a> {
    pub text: &'a str,
    /// Already the canonical key of an existing group.
    pub canonical_key: bool,
}

/// "Choose the best version" for a set of probable duplicates.
#[derive(Debug, Clone)]
pub struct MatchPrompt<'a> {
    /// The entity currently being processed.
    pub item: &'a str,
    pub candidates: Vec<PromptCandidate<'a>>,
}

/// The adjudicator's answer to a [`MatchPrompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchDecision {
    /// Use candidate `n` as the canonical form of all remaining candidates.
    Select(usize),
    /// Drop these candidates from consideration and ask again.
    Remove(BTreeSet<usize>),
    /// Replace the whole set with a manually typed canonical form.
    Retype(String),
    /// None of the candidates match.
    IgnoreAll,
    /// Save and end the session.
    Exit,
}

/// Which structural contradiction an [`OverlapPrompt`] is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlapKind<'a> {
    /// `second` is a key but is also listed as a variant of `first`.
    KeyValue,
    /// `first` and `second` are both keys listing the same variants.
    ValueValue { shared: Vec<&'a str> },
}

/// A choice between two forms while repairing the registry.
#[derive(Debug, Clone)]
pub struct OverlapPrompt<'a> {
    pub kind: OverlapKind<'a>,
    pub first: &'a str,
    pub second: &'a str,
}

impl OverlapPrompt<'_> {
    /// Human-readable description of the contradiction.
    pub fn describe(&self) -> String {
        match &self.kind {
            OverlapKind::KeyValue => format!(
                "{} is a corrected version and a duplicate for {}",
                self.second, self.first
            ),
            OverlapKind::ValueValue { shared } => format!(
                "{} are saved as duplicates for both {} and {}",
                shared.join(", "),
                self.first,
                self.second
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapDecision {
    /// Keep `first` as the canonical form.
    First,
    /// Keep `second` as the canonical form.
    Second,
    /// Save and end the session.
    Exit,
}

/// The human in the loop. Every call blocks until a decision is made.
pub trait Adjudicator {
    fn choose_match(&mut self, prompt: &MatchPrompt<'_>) -> Result<MatchDecision>;

    fn choose_overlap(&mut self, prompt: &OverlapPrompt<'_>) -> Result<OverlapDecision>;
}

impl<A: Adjudicator + ?Sized> Adjudicator for &mut A {
    fn choose_match(&mut self, prompt: &MatchPrompt<'_>) -> Result<MatchDecision> {
        (**self).choose_match(prompt)
    }

    fn choose_overlap(&mut self, prompt: &OverlapPrompt<'_>) -> Result<OverlapDecision> {
        (**self).choose_overlap(prompt)
    }
}
