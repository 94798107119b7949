//! Multi-author normalization and author → book propagation.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::error::Result;
use crate::models::{Author, Book, DuplicateRegistry, MULTI_AUTHOR_SEPARATOR, TitleAuthor};

/// Rewrite every joiner in author keys to `", "`.
///
/// Joiners are applied in order. The old key becomes a variant of the
/// rewritten one, merging into it if it already exists. Returns the number of
/// keys rewritten.
pub fn comma_separate_authors(
    registry: &mut DuplicateRegistry<Author>,
    joiners: &[String],
) -> usize {
    let mut rewritten = 0;
    let joiners = joiners
        .iter()
        .filter(|j| !j.is_empty() && j.as_str() != MULTI_AUTHOR_SEPARATOR);
    for joiner in joiners {
        let affected: Vec<Author> = registry
            .keys()
            .filter(|author| author.as_str().contains(joiner.as_str()))
            .cloned()
            .collect();
        for author in affected {
            let updated =
                Author::new(author.as_str().replace(joiner.as_str(), MULTI_AUTHOR_SEPARATOR));
            if updated == author {
                continue;
            }
            registry.merge(&updated, &author);
            info!("{author} rewritten as {updated}");
            rewritten += 1;
        }
    }
    rewritten
}

/// Every individual author named inside a registry key.
pub fn single_author_pool(registry: &DuplicateRegistry<Author>) -> BTreeSet<Author> {
    registry
        .keys()
        .flat_map(Author::split_multi_author)
        .filter(|author| !author.as_str().trim().is_empty())
        .collect()
}

/// Rebuild each multi-author key from the canonical form of each of its authors.
///
/// A key that changes is merged into the rebuilt key. Returns how many keys moved.
pub fn correct_multi_author_keys(registry: &mut DuplicateRegistry<Author>) -> usize {
    let dedupe_map = registry.get_dedupe_map();
    let multi: Vec<Author> = registry
        .keys()
        .filter(|author| author.is_multi_author())
        .cloned()
        .collect();

    let mut corrected = 0;
    for author in multi {
        let rebuilt = Author::new(
            author
                .split_multi_author()
                .iter()
                .map(|single| dedupe_map.get(single).unwrap_or(single).as_str())
                .collect::<Vec<_>>()
                .join(MULTI_AUTHOR_SEPARATOR),
        );
        if rebuilt != author {
            warn!("Duplicates of {author} swapped to duplicates of {rebuilt}");
            registry.merge(&rebuilt, &author);
            corrected += 1;
        }
    }
    corrected
}

/// Record `Book(title, variant)` as a duplicate of `Book(title, canonical)` for
/// every pair whose author is a known variant.
///
/// Each corrected book lands on the key that already covers it, or becomes a
/// new key. Book keys absorbed this way are merged; the registry may need
/// reconciling afterwards. Returns the number of books recorded.
pub fn propagate_author_corrections<'a, I>(
    registry: &mut DuplicateRegistry<Book>,
    pairs: I,
    author_map: &BTreeMap<Author, Author>,
    separator: &str,
) -> Result<usize>
where
    I: IntoIterator<Item = &'a TitleAuthor>,
{
    let mut corrections: BTreeMap<Book, BTreeSet<Book>> = BTreeMap::new();
    for pair in pairs {
        let Some(canonical) = author_map.get(&pair.author) else {
            continue;
        };
        let target = Book::from_parts(&pair.title, canonical.as_str(), separator)?;
        let old = Book::from_title_author(pair, separator)?;
        corrections.entry(target).or_default().insert(old);
    }

    let mut recorded = 0;
    for (target, olds) in corrections {
        let owner = registry.canonical_of(&target).cloned();
        let owner = owner.unwrap_or(target);
        for old in olds {
            if old == owner || registry.duplicates_of(&owner).is_some_and(|v| v.contains(&old)) {
                continue;
            }
            if registry.contains_key(&old) {
                registry.merge(&owner, &old);
            } else {
                registry.add_duplicates(&owner, [old]);
            }
            recorded += 1;
        }
    }
    Ok(recorded)
}
