use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{DedupeError, Result};
use crate::models::entity::Entity;

/// Canonical entity → known variants of it.
///
/// Keys are the editorially correct form, values are known misspellings. Once
/// stable, no entity is both a key and a value, and no value belongs to two keys.
/// An entity present as a key (even with no variants) counts as scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DuplicateRegistry<E: Ord> {
    entries: BTreeMap<E, BTreeSet<E>>,
}

impl<E: Ord> Default for DuplicateRegistry<E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<E: Entity> FromIterator<(E, BTreeSet<E>)> for DuplicateRegistry<E> {
    fn from_iter<I: IntoIterator<Item = (E, BTreeSet<E>)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (key, values) in iter {
            registry.entries.entry(key).or_default().extend(values);
        }
        registry
    }
}

impl<E: Entity> DuplicateRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &E> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&E, &BTreeSet<E>)> {
        self.entries.iter()
    }

    pub fn contains_key(&self, entity: &E) -> bool {
        self.entries.contains_key(entity)
    }

    pub fn duplicates_of(&self, key: &E) -> Option<&BTreeSet<E>> {
        self.entries.get(key)
    }

    /// Union of every duplicate set.
    pub fn all_values(&self) -> BTreeSet<&E> {
        self.entries.values().flatten().collect()
    }

    pub fn is_value(&self, entity: &E) -> bool {
        self.entries.values().any(|values| values.contains(entity))
    }

    /// Whether the entity has been reviewed, as a key or as a known variant.
    pub fn is_scanned(&self, entity: &E) -> bool {
        self.contains_key(entity) || self.is_value(entity)
    }

    /// Every entity reachable as a key or a value.
    pub fn all_entities(&self) -> BTreeSet<E> {
        self.entries
            .iter()
            .flat_map(|(key, values)| std::iter::once(key).chain(values))
            .cloned()
            .collect()
    }

    /// The key whose duplicate set contains `entity`.
    pub fn lookup_canonical(&self, entity: &E) -> Result<&E> {
        self.entries
            .iter()
            .find(|(_, values)| values.contains(entity))
            .map(|(key, _)| key)
            .ok_or_else(|| {
                DedupeError::NotFound(format!(
                    "{entity} was expected in existing {} duplicates but no key owns it",
                    E::KIND
                ))
            })
    }

    /// The canonical form: the entity itself if it is a key, else its owning key.
    pub fn canonical_of<'a>(&'a self, entity: &'a E) -> Option<&'a E> {
        if let Some((key, _)) = self.entries.get_key_value(entity) {
            return Some(key);
        }
        self.lookup_canonical(entity).ok()
    }

    /// Flatten into variant → canonical, for bulk correction of external data.
    pub fn get_dedupe_map(&self) -> BTreeMap<E, E> {
        self.entries
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (value.clone(), key.clone())))
            .collect()
    }

    /// Record `entity` as a key with no known variants, if it is not one already.
    pub fn insert_key(&mut self, entity: E) {
        self.entries.entry(entity).or_default();
    }

    /// Record bare entities as variants of `canonical`, creating the key if needed.
    pub fn add_duplicates<I>(&mut self, canonical: &E, duplicates: I) -> usize
    where
        I: IntoIterator<Item = E>,
    {
        let values = self.entries.entry(canonical.clone()).or_default();
        let before = values.len();
        values.extend(duplicates.into_iter().filter(|dupe| dupe != canonical));
        values.len() - before
    }

    pub fn remove_duplicate(&mut self, key: &E, duplicate: &E) -> bool {
        self.entries
            .get_mut(key)
            .is_some_and(|values| values.remove(duplicate))
    }

    /// Absorb `absorbed` into `canonical`.
    ///
    /// `absorbed`'s variants move to `canonical`, `absorbed` itself becomes a
    /// variant and stops being a key. `canonical` never lists itself as a variant.
    /// All lookups happen before the first write, so no partial merge is observable.
    pub fn merge(&mut self, canonical: &E, absorbed: &E) {
        if canonical == absorbed {
            return;
        }

        let absorbed_values = self.entries.remove(absorbed).unwrap_or_default();
        let values = self.entries.entry(canonical.clone()).or_default();
        values.extend(absorbed_values);
        values.insert(absorbed.clone());
        values.remove(canonical);
    }

    /// Entities that are both a key and somebody's variant.
    pub fn key_value_overlaps(&self) -> BTreeSet<E> {
        self.all_values()
            .into_iter()
            .filter(|value| self.entries.contains_key(*value))
            .cloned()
            .collect()
    }

    /// Every pair of distinct keys whose duplicate sets intersect, ordered by key pair.
    pub fn value_value_overlaps(&self) -> Vec<ValueOverlap<E>> {
        let mut owners: BTreeMap<&E, Vec<&E>> = BTreeMap::new();
        for (key, values) in &self.entries {
            for value in values {
                owners.entry(value).or_default().push(key);
            }
        }

        let mut pairs: BTreeMap<(&E, &E), BTreeSet<E>> = BTreeMap::new();
        for (value, keys) in owners.into_iter().filter(|(_, keys)| keys.len() > 1) {
            for (idx, first) in keys.iter().enumerate() {
                for second in &keys[idx + 1..] {
                    pairs
                        .entry((*first, *second))
                        .or_default()
                        .insert(value.clone());
                }
            }
        }

        pairs
            .into_iter()
            .map(|((first, second), shared)| ValueOverlap {
                first: first.clone(),
                second: second.clone(),
                shared,
            })
            .collect()
    }

    /// Both structural invariants hold.
    pub fn is_stable(&self) -> bool {
        self.key_value_overlaps().is_empty() && self.value_value_overlaps().is_empty()
    }

    /// Rebuild every key and value through `convert`.
    pub fn try_map<F>(&self, mut convert: F) -> Result<Self>
    where
        F: FnMut(&E) -> Result<E>,
    {
        let mut mapped = Self::new();
        for (key, values) in &self.entries {
            let new_key = convert(key)?;
            let mut new_values = BTreeSet::new();
            for value in values {
                new_values.insert(convert(value)?);
            }
            mapped.entries.entry(new_key).or_default().extend(new_values);
        }
        Ok(mapped)
    }
}

/// Two keys listing the same variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueOverlap<E> {
    pub first: E,
    pub second: E,
    pub shared: BTreeSet<E>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::Author;

    fn author(name: &str) -> Author {
        Author::new(name)
    }

    fn registry(entries: &[(&str, &[&str])]) -> DuplicateRegistry<Author> {
        entries
            .iter()
            .map(|(key, values)| (author(key), values.iter().map(|v| author(v)).collect()))
            .collect()
    }

    #[test]
    fn test_lookup_canonical_finds_owner() {
        let reg = registry(&[("Tolkien, J.R.R.", &["Tolkein, JRR"]), ("Le Guin", &[])]);
        assert_eq!(
            reg.lookup_canonical(&author("Tolkein, JRR")).unwrap(),
            &author("Tolkien, J.R.R.")
        );
    }

    #[test]
    fn test_lookup_canonical_missing_is_not_found() {
        let reg = registry(&[("Le Guin", &[])]);
        let err = reg.lookup_canonical(&author("Le Guin")).unwrap_err();
        assert!(matches!(err, DedupeError::NotFound(_)));
    }

    #[test]
    fn test_dedupe_map_reverses_entries() {
        let reg = registry(&[("Pratchett", &["Pratchet", "Prachett"]), ("Banks", &["Bankes"])]);
        let map = reg.get_dedupe_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map[&author("Prachett")], author("Pratchett"));
        assert_eq!(map[&author("Bankes")], author("Banks"));
        assert!(!map.contains_key(&author("Banks")));
    }

    #[test]
    fn test_merge_moves_variants_and_demotes_absorbed() {
        let mut reg = registry(&[("Pratchett", &["Pratchet"]), ("Prachett", &["Pratchitt"])]);
        let entities_before = reg.all_entities();

        reg.merge(&author("Pratchett"), &author("Prachett"));

        assert!(!reg.contains_key(&author("Prachett")));
        let values = reg.duplicates_of(&author("Pratchett")).unwrap();
        assert_eq!(values.len(), 3);
        assert!(values.contains(&author("Prachett")));
        assert!(values.contains(&author("Pratchitt")));
        assert_eq!(reg.all_entities(), entities_before);
        assert!(reg.is_stable());
    }

    #[test]
    fn test_merge_keys_shrink_by_absorbed_only() {
        let mut reg = registry(&[("A", &["a1"]), ("B", &["b1"]), ("C", &[])]);
        let mut expected_keys: BTreeSet<Author> = reg.keys().cloned().collect();
        expected_keys.remove(&author("B"));

        reg.merge(&author("A"), &author("B"));

        let keys: BTreeSet<Author> = reg.keys().cloned().collect();
        assert_eq!(keys, expected_keys);
    }

    #[test]
    fn test_merge_drops_self_reference() {
        // "A" is listed as a variant of "B"; promoting "A" must not list it under itself.
        let mut reg = registry(&[("B", &["A", "b1"]), ("A", &[])]);
        reg.merge(&author("A"), &author("B"));

        let values = reg.duplicates_of(&author("A")).unwrap();
        assert!(!values.contains(&author("A")));
        assert!(values.contains(&author("B")));
        assert!(values.contains(&author("b1")));
        assert!(reg.is_stable());
    }

    #[test]
    fn test_merge_into_itself_is_noop() {
        let mut reg = registry(&[("A", &["a1"])]);
        let before = reg.clone();
        reg.merge(&author("A"), &author("A"));
        assert_eq!(reg, before);
    }

    #[test]
    fn test_overlap_detection() {
        let reg = registry(&[("A", &["C", "B"]), ("B", &["C"]), ("D", &["E"])]);
        assert_eq!(reg.key_value_overlaps(), BTreeSet::from([author("B")]));

        let overlaps = reg.value_value_overlaps();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].first, author("A"));
        assert_eq!(overlaps[0].second, author("B"));
        assert_eq!(overlaps[0].shared, BTreeSet::from([author("C")]));
        assert!(!reg.is_stable());
    }

    #[test]
    fn test_scanned_covers_keys_and_values() {
        let reg = registry(&[("Smith, Jones", &[]), ("Jemisin", &["Jemison"])]);
        assert!(reg.is_scanned(&author("Smith, Jones")));
        assert!(reg.is_scanned(&author("Jemison")));
        assert!(!reg.is_scanned(&author("Smith")));
        assert_eq!(
            reg.canonical_of(&author("Jemison")),
            Some(&author("Jemisin"))
        );
    }

    #[test]
    fn test_add_duplicates_skips_canonical() {
        let mut reg = DuplicateRegistry::new();
        let added = reg.add_duplicates(&author("Banks"), [author("Banks"), author("Bankes")]);
        assert_eq!(added, 1);
        assert_eq!(
            reg.duplicates_of(&author("Banks")),
            Some(&BTreeSet::from([author("Bankes")]))
        );
    }
}
