use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DedupeError, Result};

/// Separator used to join a title and its author into a [`Book`].
pub const DEFAULT_TITLE_AUTHOR_SEPARATOR: &str = " /// ";

/// Joiner between individual names inside a multi-author [`Author`].
pub const MULTI_AUTHOR_SEPARATOR: &str = ", ";

/// Which kind of entity a registry or session deals with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Author,
    Book,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Book => "book",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value being deduplicated. Equality is plain string equality.
pub trait Entity:
    Clone
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Display
    + AsRef<str>
    + From<String>
    + Serialize
    + DeserializeOwned
{
    const KIND: EntityKind;

    /// Individual contributors named by this entity, when the entity can name
    /// several of them. Used to keep "Smith" and "Smith, Jones" apart.
    fn contributors(&self) -> Option<BTreeSet<&str>> {
        None
    }
}

// ─── Author ────────────────────────────────────────────────

/// An author string as written on a card; may name several people joined by `", "`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Author(String);

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_multi_author(&self) -> bool {
        self.0.contains(MULTI_AUTHOR_SEPARATOR)
    }

    /// Split a comma-separated multi-author into individual authors.
    pub fn split_multi_author(&self) -> Vec<Author> {
        self.0
            .split(MULTI_AUTHOR_SEPARATOR)
            .map(Author::new)
            .collect()
    }
}

impl Entity for Author {
    const KIND: EntityKind = EntityKind::Author;

    fn contributors(&self) -> Option<BTreeSet<&str>> {
        Some(self.0.split(MULTI_AUTHOR_SEPARATOR).collect())
    }
}

// ─── Book ──────────────────────────────────────────────────

/// A title and author joined by the title/author separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Book(String);

/// A book split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TitleAuthor {
    pub title: String,
    pub author: Author,
}

impl TitleAuthor {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: Author::new(author),
        }
    }
}

impl Book {
    /// Join a title and author. Fails if the separator occurs inside either part.
    pub fn from_parts(title: &str, author: &str, separator: &str) -> Result<Self> {
        validate_separator(separator)?;
        for part in [title, author] {
            if part.contains(separator) {
                return Err(DedupeError::Configuration(format!(
                    "title/author separator {separator:?} appears in {part:?}; \
                     select a different separator"
                )));
            }
        }
        Ok(Self(format!("{title}{separator}{author}")))
    }

    pub fn from_title_author(pair: &TitleAuthor, separator: &str) -> Result<Self> {
        Self::from_parts(&pair.title, pair.author.as_str(), separator)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into title and author using `separator`.
    pub fn split(&self, separator: &str) -> Result<TitleAuthor> {
        validate_separator(separator)?;
        let mut parts = self.0.split(separator);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(title), Some(author), None) => Ok(TitleAuthor::new(title, author)),
            _ => Err(DedupeError::MalformedBook(format!(
                "{:?} does not split into exactly one title and one author on {separator:?}",
                self.0
            ))),
        }
    }
}

impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;
}

fn validate_separator(separator: &str) -> Result<()> {
    if separator.is_empty() {
        return Err(DedupeError::Configuration(
            "title/author separator must not be empty".to_string(),
        ));
    }
    Ok(())
}

macro_rules! string_entity {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_entity!(Author);
string_entity!(Book);
