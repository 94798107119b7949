use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::models::entity::{Author, Book, DEFAULT_TITLE_AUTHOR_SEPARATOR, Entity};
use crate::models::ignores::IgnoreRegistry;
use crate::models::registry::DuplicateRegistry;

/// Resolved duplicates, as persisted in `resolved_duplicates.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedDupes {
    #[serde(default)]
    pub author_dupes: DuplicateRegistry<Author>,
    #[serde(default)]
    pub book_dupes: DuplicateRegistry<Book>,
    /// Separator the books were joined with when this file was written.
    #[serde(default = "default_separator")]
    pub title_author_separator: String,
}

/// Known non-matches, as persisted in `ignored_duplicates.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedIgnores {
    #[serde(default)]
    pub ignored_author_dupes: IgnoreRegistry<Author>,
    #[serde(default)]
    pub ignored_book_dupes: IgnoreRegistry<Book>,
}

fn default_separator() -> String {
    DEFAULT_TITLE_AUTHOR_SEPARATOR.to_string()
}

impl Default for RecordedDupes {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_AUTHOR_SEPARATOR)
    }
}

impl RecordedDupes {
    pub fn new(separator: &str) -> Self {
        Self {
            author_dupes: DuplicateRegistry::new(),
            book_dupes: DuplicateRegistry::new(),
            title_author_separator: separator.to_string(),
        }
    }

    pub fn registry<E: Recorded>(&self) -> &DuplicateRegistry<E> {
        E::dupes(self)
    }

    pub fn registry_mut<E: Recorded>(&mut self) -> &mut DuplicateRegistry<E> {
        E::dupes_mut(self)
    }

    /// Re-join every book with `separator` if the stored one differs.
    ///
    /// Returns the previous separator when a migration happened. Nothing is
    /// changed if any title or author already contains the new separator.
    pub fn migrate_separator(&mut self, separator: &str) -> Result<Option<String>> {
        if self.title_author_separator == separator {
            return Ok(None);
        }

        warn!(
            old = %self.title_author_separator,
            new = %separator,
            "Title/author separator has changed since last serialization; updating old data"
        );
        let old = self.title_author_separator.clone();
        let migrated = self
            .book_dupes
            .try_map(|book| rejoin_book(book, &old, separator))?;

        self.book_dupes = migrated;
        self.title_author_separator = separator.to_string();
        Ok(Some(old))
    }
}

impl RecordedIgnores {
    pub fn registry<E: Recorded>(&self) -> &IgnoreRegistry<E> {
        E::ignores(self)
    }

    pub fn registry_mut<E: Recorded>(&mut self) -> &mut IgnoreRegistry<E> {
        E::ignores_mut(self)
    }

    /// Re-join every ignored book from `old` to `new` separator.
    pub fn migrate_separator(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        let migrated = self
            .ignored_book_dupes
            .try_map(|book| rejoin_book(book, old, new))?;
        self.ignored_book_dupes = migrated;
        Ok(())
    }
}

fn rejoin_book(book: &Book, old: &str, new: &str) -> Result<Book> {
    let parts = book.split(old)?;
    Book::from_title_author(&parts, new)
}

/// Entities with a home in the persisted documents.
pub trait Recorded: Entity {
    fn dupes(records: &RecordedDupes) -> &DuplicateRegistry<Self>;
    fn dupes_mut(records: &mut RecordedDupes) -> &mut DuplicateRegistry<Self>;
    fn ignores(records: &RecordedIgnores) -> &IgnoreRegistry<Self>;
    fn ignores_mut(records: &mut RecordedIgnores) -> &mut IgnoreRegistry<Self>;
}

impl Recorded for Author {
    fn dupes(records: &RecordedDupes) -> &DuplicateRegistry<Self> {
        &records.author_dupes
    }

    fn dupes_mut(records: &mut RecordedDupes) -> &mut DuplicateRegistry<Self> {
        &mut records.author_dupes
    }

    fn ignores(records: &RecordedIgnores) -> &IgnoreRegistry<Self> {
        &records.ignored_author_dupes
    }

    fn ignores_mut(records: &mut RecordedIgnores) -> &mut IgnoreRegistry<Self> {
        &mut records.ignored_author_dupes
    }
}

impl Recorded for Book {
    fn dupes(records: &RecordedDupes) -> &DuplicateRegistry<Self> {
        &records.book_dupes
    }

    fn dupes_mut(records: &mut RecordedDupes) -> &mut DuplicateRegistry<Self> {
        &mut records.book_dupes
    }

    fn ignores(records: &RecordedIgnores) -> &IgnoreRegistry<Self> {
        &records.ignored_book_dupes
    }

    fn ignores_mut(records: &mut RecordedIgnores) -> &mut IgnoreRegistry<Self> {
        &mut records.ignored_book_dupes
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::error::DedupeError;

    fn book(title: &str, author: &str, sep: &str) -> Book {
        Book::from_parts(title, author, sep).unwrap()
    }

    #[test]
    fn test_serialized_shape_is_sorted() {
        let mut records = RecordedDupes::default();
        records.author_dupes.add_duplicates(
            &Author::new("Pratchett"),
            [Author::new("Prachett"), Author::new("Pratchet")],
        );
        records.author_dupes.insert_key(Author::new("Banks"));

        let json = serde_json::to_string_pretty(&records).unwrap();
        let expected = r#"{
  "author_dupes": {
    "Banks": [],
    "Pratchett": [
      "Prachett",
      "Pratchet"
    ]
  },
  "book_dupes": {},
  "title_author_separator": " /// "
}"#;
        assert_eq!(json, expected);

        let back: RecordedDupes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records);
        assert_eq!(serde_json::to_string_pretty(&back).unwrap(), expected);
    }

    #[test]
    fn test_missing_separator_defaults() {
        let records: RecordedDupes =
            serde_json::from_str(r#"{"author_dupes": {}, "book_dupes": {}}"#).unwrap();
        assert_eq!(records.title_author_separator, DEFAULT_TITLE_AUTHOR_SEPARATOR);
    }

    #[test]
    fn test_separator_migration_rejoins_books() {
        let mut records = RecordedDupes::new(" | ");
        records.book_dupes.add_duplicates(
            &book("The Hobbit", "Tolkien", " | "),
            [book("The Hobit", "Tolkien", " | ")],
        );

        let old = records.migrate_separator(" /// ").unwrap();
        assert_eq!(old.as_deref(), Some(" | "));
        assert_eq!(records.title_author_separator, " /// ");

        let key = records.book_dupes.keys().next().unwrap().clone();
        let parts = key.split(" /// ").unwrap();
        assert_eq!(parts.title, "The Hobbit");
        assert_eq!(parts.author, Author::new("Tolkien"));
        assert_eq!(
            records.book_dupes.duplicates_of(&key),
            Some(&BTreeSet::from([book("The Hobit", "Tolkien", " /// ")]))
        );
    }

    #[test]
    fn test_separator_migration_fails_loudly_on_collision() {
        let mut records = RecordedDupes::new(" | ");
        records
            .book_dupes
            .insert_key(book("Either - Or", "Kierkegaard", " | "));
        let before = records.clone();

        let err = records.migrate_separator(" - ").unwrap_err();
        assert!(matches!(err, DedupeError::Configuration(_)));
        assert_eq!(records, before);
    }

    #[test]
    fn test_same_separator_is_noop() {
        let mut records = RecordedDupes::default();
        assert_eq!(records.migrate_separator(" /// ").unwrap(), None);
    }

    #[test]
    fn test_ignore_migration() {
        let mut ignores = RecordedIgnores::default();
        ignores.ignored_book_dupes.record(
            &book("Dune", "Herbert", " | "),
            &book("Dune Messiah", "Herbert", " | "),
        );
        ignores.migrate_separator(" | ", " /// ").unwrap();
        assert!(ignores.ignored_book_dupes.is_ignored(
            &book("Dune", "Herbert", " /// "),
            &book("Dune Messiah", "Herbert", " /// "),
        ));
    }
}
