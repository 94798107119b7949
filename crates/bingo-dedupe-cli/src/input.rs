use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bingo_dedupe_core::{Author, Book, DedupeError, Result, TitleAuthor};

/// One author per line; blank lines are skipped.
pub fn read_authors(path: &Path) -> Result<BTreeSet<Author>> {
    parse_authors(BufReader::new(File::open(path)?))
}

/// One `title<TAB>author` pair per line; blank lines are skipped.
pub fn read_books(path: &Path, separator: &str) -> Result<Vec<TitleAuthor>> {
    parse_books(BufReader::new(File::open(path)?), separator)
}

pub fn parse_authors(reader: impl BufRead) -> Result<BTreeSet<Author>> {
    let mut authors = BTreeSet::new();
    for line in reader.lines() {
        let line = line?;
        let name = line.trim();
        if !name.is_empty() {
            authors.insert(Author::new(name));
        }
    }
    Ok(authors)
}

/// Fails on lines without exactly one tab, or whose parts contain `separator`.
pub fn parse_books(reader: impl BufRead, separator: &str) -> Result<Vec<TitleAuthor>> {
    let mut pairs = Vec::new();
    let mut seen = BTreeSet::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.split('\t');
        let (Some(title), Some(author), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(DedupeError::InvalidInput(format!(
                "line {}: expected `title<TAB>author`, got {line:?}",
                idx + 1
            )));
        };
        let pair = TitleAuthor::new(title.trim(), author.trim());
        let book = Book::from_title_author(&pair, separator)?;
        if seen.insert(book) {
            pairs.push(pair);
        }
    }
    Ok(pairs)
}
