use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::entity::Entity;

/// Pairs of entities a human confirmed are *not* duplicates of each other.
///
/// Symmetric: recording `a` against `b` also records `b` against `a`. Loaded
/// records are rebuilt pair by pair, so a one-sided file comes back symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IgnoreRegistry<E: Ord> {
    entries: BTreeMap<E, BTreeSet<E>>,
}

impl<E: Ord> Default for IgnoreRegistry<E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<E: Entity> IgnoreRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&E, &BTreeSet<E>)> {
        self.entries.iter()
    }

    /// Entities already rejected as matches for `entity`.
    pub fn ignored_for(&self, entity: &E) -> Option<&BTreeSet<E>> {
        self.entries.get(entity)
    }

    pub fn is_ignored(&self, entity: &E, other: &E) -> bool {
        self.entries
            .get(entity)
            .is_some_and(|ignored| ignored.contains(other))
    }

    /// Record `entity` and `other` as a non-match, in both directions.
    pub fn record(&mut self, entity: &E, other: &E) -> bool {
        if entity == other {
            return false;
        }
        let inserted = self
            .entries
            .entry(entity.clone())
            .or_default()
            .insert(other.clone());
        self.entries
            .entry(other.clone())
            .or_default()
            .insert(entity.clone());
        inserted
    }

    /// Record every entity in `others` as a non-match for `entity`. Returns how many were new.
    pub fn record_all<'a, I>(&mut self, entity: &E, others: I) -> usize
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        others
            .into_iter()
            .filter(|other| self.record(entity, other))
            .count()
    }

    /// Rebuild every entity through `convert`, keeping symmetry.
    pub fn try_map<F, Err>(&self, mut convert: F) -> Result<Self, Err>
    where
        F: FnMut(&E) -> Result<E, Err>,
    {
        let mut mapped = Self::new();
        for (entity, ignored) in &self.entries {
            let new_entity = convert(entity)?;
            for other in ignored {
                let new_other = convert(other)?;
                mapped.record(&new_entity, &new_other);
            }
        }
        Ok(mapped)
    }
}

impl<E: Entity> FromIterator<(E, BTreeSet<E>)> for IgnoreRegistry<E> {
    fn from_iter<I: IntoIterator<Item = (E, BTreeSet<E>)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (entity, ignored) in iter {
            for other in &ignored {
                registry.record(&entity, other);
            }
        }
        registry
    }
}

impl<'de, E: Entity> Deserialize<'de> for IgnoreRegistry<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<E, BTreeSet<E>>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::Author;

    #[test]
    fn test_record_is_symmetric() {
        let mut ignores = IgnoreRegistry::new();
        let smith = Author::new("Smith");
        let smyth = Author::new("Smyth");

        assert!(ignores.record(&smith, &smyth));
        assert!(ignores.is_ignored(&smith, &smyth));
        assert!(ignores.is_ignored(&smyth, &smith));
        assert!(!ignores.record(&smyth, &smith));
    }

    #[test]
    fn test_self_ignore_is_rejected() {
        let mut ignores = IgnoreRegistry::new();
        let smith = Author::new("Smith");
        assert!(!ignores.record(&smith, &smith));
        assert!(ignores.is_empty());
    }

    #[test]
    fn test_from_iter_restores_symmetry() {
        let ignores: IgnoreRegistry<Author> = [(
            Author::new("Brown"),
            BTreeSet::from([Author::new("Browne"), Author::new("Braun")]),
        )]
        .into_iter()
        .collect();

        assert_eq!(ignores.len(), 3);
        assert!(ignores.is_ignored(&Author::new("Braun"), &Author::new("Brown")));
    }

    #[test]
    fn test_one_sided_file_loads_symmetric() {
        let ignores: IgnoreRegistry<Author> =
            serde_json::from_str(r#"{"Hobb": ["Robb", "Hobb"]}"#).unwrap();

        assert!(ignores.is_ignored(&Author::new("Robb"), &Author::new("Hobb")));
        assert!(!ignores.is_ignored(&Author::new("Hobb"), &Author::new("Hobb")));
        assert_eq!(
            serde_json::to_string(&ignores).unwrap(),
            r#"{"Hobb":["Robb"],"Robb":["Hobb"]}"#
        );
    }

    #[test]
    fn test_record_all_counts_new_pairs() {
        let mut ignores = IgnoreRegistry::new();
        let item = Author::new("Lee");
        let others = [Author::new("Leigh"), Author::new("Li")];
        assert_eq!(ignores.record_all(&item, &others), 2);
        assert_eq!(ignores.record_all(&item, &others), 0);
    }
}
