//! Text tables exchanged with translators
//!
//! Each category is stored as two parallel line files in one directory:
//!
//! - `<category>.txt`: one original string per line
//! - `<category>_trans.txt`: line *i* is the translation of line *i*, blank
//!   until a translator fills it in
//!
//! Line breaks inside a string are written as [`SENTINEL`]. Files are UTF-8,
//! joined with `\n` and carry no trailing newline, so a fresh translation
//! file of *n* entries is *n - 1* newlines.
//!
//! Scripts additionally get a write-only `<category>_plain.txt` holding the
//! full decompressed source for reference.
//!
//! [`SENTINEL`]: crate::locator::SENTINEL

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Suffix of the translation file
pub const TRANSLATION_SUFFIX: &str = "_trans";

/// Suffix of the plain source dump
pub const PLAIN_SUFFIX: &str = "_plain";

/// Ordered original → translation mapping.
///
/// Insertion order is first-seen extraction order and is the order of the
/// lines on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: IndexMap<String, String>,
}

impl TranslationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from extracted originals, all untranslated.
    pub fn from_originals<I, S>(originals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for original in originals {
            table.add_original(original);
        }
        table
    }

    /// Build a table from (original, translation) pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add an original if it is not present yet. Returns true if it was added.
    pub fn add_original(&mut self, original: impl Into<String>) -> bool {
        let original = original.into();
        if self.entries.contains_key(&original) {
            return false;
        }
        self.entries.insert(original, String::new());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original)
    }

    /// Translation of `original`, if one has been filled in.
    pub fn translation(&self, original: &str) -> Option<&str> {
        self.entries
            .get(original)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    /// Number of entries with a non-empty translation.
    pub fn translated_count(&self) -> usize {
        self.entries.values().filter(|t| !t.is_empty()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn originals(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Merge a fresh extraction into this table.
    ///
    /// Existing entries keep their translations and relative order. An
    /// original not yet present is inserted, untranslated, at the position
    /// it has in `fresh`. Returns the number of added entries.
    pub fn merge_append<'a>(&mut self, fresh: impl IntoIterator<Item = &'a str>) -> usize {
        let mut added = 0;
        let mut seen = std::collections::HashSet::new();
        for original in fresh {
            if !seen.insert(original) {
                continue;
            }
            if !self.entries.contains_key(original) {
                let index = (seen.len() - 1).min(self.entries.len());
                self.entries.shift_insert(index, original.to_string(), String::new());
                added += 1;
            }
        }
        added
    }
}

/// `<dir>/<category>.txt` and `<dir>/<category>_trans.txt`
pub fn table_paths(dir: &Path, category: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{category}.txt")),
        dir.join(format!("{category}{TRANSLATION_SUFFIX}.txt")),
    )
}

/// Whether `category` already has a non-empty translation file in `dir`.
pub fn has_translation_file(dir: &Path, category: &str) -> bool {
    let (_, trans) = table_paths(dir, category);
    fs::metadata(trans).is_ok_and(|meta| meta.len() > 0)
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Read the table for `category` from `dir`.
///
/// Lines are paired by position; a translation file shorter than the
/// originals file leaves the remaining entries untranslated.
///
/// # Errors
/// Returns [`Error::MissingTranslationFile`] if either file is absent.
pub fn read_pair(dir: &Path, category: &str) -> Result<TranslationTable> {
    let (original_path, trans_path) = table_paths(dir, category);
    for path in [&original_path, &trans_path] {
        if !path.is_file() {
            return Err(Error::MissingTranslationFile { path: path.clone() });
        }
    }

    let originals = read_lines(&original_path)?;
    let mut translations = read_lines(&trans_path)?.into_iter();

    let mut table = TranslationTable::new();
    for original in originals {
        let translation = translations.next().unwrap_or_default();
        table.entries.insert(original, translation);
    }
    tracing::debug!(
        "Read {} entries ({} translated) from {}",
        table.len(),
        table.translated_count(),
        original_path.display()
    );
    Ok(table)
}

/// Write the table for `category` into `dir`, creating `dir` if needed.
///
/// # Errors
/// Returns an error if the files cannot be written.
pub fn write_pair(dir: &Path, category: &str, table: &TranslationTable) -> Result<()> {
    fs::create_dir_all(dir)?;
    let (original_path, trans_path) = table_paths(dir, category);

    let originals: Vec<&str> = table.entries.keys().map(String::as_str).collect();
    let translations: Vec<&str> = table.entries.values().map(String::as_str).collect();
    fs::write(&original_path, originals.join("\n"))?;
    fs::write(&trans_path, translations.join("\n"))?;

    tracing::debug!("Wrote {} entries to {}", table.len(), original_path.display());
    Ok(())
}

/// Write the `<category>_plain.txt` reference dump.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_plain(dir: &Path, category: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{category}{PLAIN_SUFFIX}.txt"));
    fs::write(&path, content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fresh_table_layout() {
        let dir = tempdir().unwrap();
        let table = TranslationTable::from_originals(["one", "two", "one", r"three\#lines"]);
        assert_eq!(table.len(), 3);

        write_pair(dir.path(), "items", &table).unwrap();
        let original = fs::read_to_string(dir.path().join("items.txt")).unwrap();
        let trans = fs::read_to_string(dir.path().join("items_trans.txt")).unwrap();
        assert_eq!(original, "one\ntwo\nthree\\#lines");
        assert_eq!(trans, "\n\n");
        assert!(has_translation_file(dir.path(), "items"));

        let read = read_pair(dir.path(), "items").unwrap();
        assert_eq!(read, table);
        assert_eq!(read.translation("one"), None);
    }

    #[test]
    fn test_read_pairs_by_position() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("system.txt"), "Fire\nIce\nGold").unwrap();
        fs::write(dir.path().join("system_trans.txt"), "Feu\r\n\r\n").unwrap();

        let table = read_pair(dir.path(), "system").unwrap();
        assert_eq!(table.translation("Fire"), Some("Feu"));
        assert_eq!(table.translation("Ice"), None);
        assert_eq!(table.translation("Gold"), None);
        assert_eq!(table.translated_count(), 1);
    }

    #[test]
    fn test_missing_translation_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("maps.txt"), "Hello").unwrap();
        assert!(!has_translation_file(dir.path(), "maps"));

        let err = read_pair(dir.path(), "maps").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingTranslationFile { ref path } if path.ends_with("maps_trans.txt")
        ));
    }

    #[test]
    fn test_empty_translation_file_does_not_count() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("maps_trans.txt"), "").unwrap();
        assert!(!has_translation_file(dir.path(), "maps"));
    }

    #[test]
    fn test_merge_append_inserts_in_place() {
        let mut table = TranslationTable::from_pairs([("a", "A"), ("c", "C")]);
        let added = table.merge_append(["a", "b", "c", "a"]);
        assert_eq!(added, 1);
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![("a", "A"), ("b", ""), ("c", "C")]
        );
    }
}
