use tracing::{info, warn};

use crate::error::{DedupeError, Result};
use crate::matching::adjudicate::{Adjudicator, OverlapDecision, OverlapKind, OverlapPrompt};
use crate::models::{DuplicateRegistry, Entity};

/// Repairs made while reconciling one registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Keys that listed themselves as their own variant.
    pub self_references: usize,
    pub key_value_merges: usize,
    pub value_value_merges: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    pub fn total(&self) -> usize {
        self.self_references + self.key_value_merges + self.value_value_merges
    }
}

/// Restore both registry invariants, asking `adjudicator` which form wins each conflict.
///
/// Key/value overlaps are cleared before value/value overlaps, and the whole
/// check repeats until the registry is stable. Every merge removes a key, so
/// this terminates. A stable registry is returned untouched without prompting.
pub fn reconcile<E: Entity>(
    registry: &mut DuplicateRegistry<E>,
    adjudicator: &mut dyn Adjudicator,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();
    if registry.is_stable() {
        return Ok(report);
    }
    info!("Reconciling overlapping {} duplicates", E::KIND);

    loop {
        if let Some(overlap) = registry.key_value_overlaps().into_iter().next() {
            if registry.remove_duplicate(&overlap, &overlap) {
                report.self_references += 1;
                continue;
            }

            let owner = registry.lookup_canonical(&overlap)?.clone();
            let prompt = OverlapPrompt {
                kind: OverlapKind::KeyValue,
                first: owner.as_ref(),
                second: overlap.as_ref(),
            };
            warn!("{}", prompt.describe());
            let (canonical, absorbed) = match adjudicator.choose_overlap(&prompt)? {
                OverlapDecision::First => (&owner, &overlap),
                OverlapDecision::Second => (&overlap, &owner),
                OverlapDecision::Exit => return Err(DedupeError::UserTermination),
            };
            registry.merge(canonical, absorbed);
            info!("Duplicates of {absorbed} swapped to duplicates of {canonical}");
            report.key_value_merges += 1;
            continue;
        }

        if let Some(overlap) = registry.value_value_overlaps().into_iter().next() {
            let prompt = OverlapPrompt {
                kind: OverlapKind::ValueValue {
                    shared: overlap.shared.iter().map(|e| e.as_ref()).collect(),
                },
                first: overlap.first.as_ref(),
                second: overlap.second.as_ref(),
            };
            warn!("{}", prompt.describe());
            let (canonical, absorbed) = match adjudicator.choose_overlap(&prompt)? {
                OverlapDecision::First => (&overlap.first, &overlap.second),
                OverlapDecision::Second => (&overlap.second, &overlap.first),
                OverlapDecision::Exit => return Err(DedupeError::UserTermination),
            };
            registry.merge(canonical, absorbed);
            info!("Duplicates of {absorbed} swapped to duplicates of {canonical}");
            report.value_value_merges += 1;
            continue;
        }

        break;
    }

    Ok(report)
}
