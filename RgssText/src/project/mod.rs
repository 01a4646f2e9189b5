//! Whole-project extraction and injection
//!
//! Files are processed one at a time: each is decoded, handled and dropped
//! before the next one is read. A file that fails to decode or encode stops
//! the run after its name has been logged.

mod extract;
mod game_ini;
mod inject;
pub mod layout;
pub mod options;

pub use extract::{ExtractSummary, extract};
pub use game_ini::{read_title, replace_title};
pub use inject::{InjectSummary, inject};
pub use layout::{DataFile, Engine, FileKind, ProjectLayout, classify};
pub use options::{Category, ProcessingMode, ProjectOptions};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::locator::GameQuirks;
use crate::marshal::{RString, Value, read_marshal};

/// Table names used for map files
pub const MAPS_TABLE: &str = "maps";
pub const NAMES_TABLE: &str = "names";

/// Decode a data file, logging its name if that fails.
fn load(path: &Path) -> Result<Value> {
    read_marshal(path).inspect_err(|err| {
        tracing::error!("Failed to decode {}: {err}", path.display());
    })
}

/// Write `bytes` to `<dir>/<file_name>` through a temporary file in `dir`,
/// so the destination only ever holds complete output.
fn write_output(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    let path = dir.join(file_name);
    tmp.persist(&path)?;
    Ok(path)
}

fn quirks_for(system: &Value, options: &ProjectOptions) -> GameQuirks {
    let quirks = options.quirks.unwrap_or_else(|| GameQuirks::detect(system));
    tracing::debug!("Using {} game quirks", quirks.variant.name());
    quirks
}

/// Title used for the game: the `Game.ini` one when present.
fn game_title(layout: &ProjectLayout) -> Result<Option<String>> {
    match layout.game_ini() {
        Some(ini) => read_title(&ini),
        None => Ok(None),
    }
}

/// `(index, compressed source)` of every `[id, name, zlib]` script entry.
fn script_blobs<'a>(scripts: &'a Value, file: &str) -> Result<Vec<(usize, &'a RString)>> {
    let entries = scripts.as_array().ok_or_else(|| Error::UnexpectedLayout {
        file: file.to_string(),
        message: format!("expected an array of script entries, found {}", scripts.kind()),
    })?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            entry
                .as_array()
                .and_then(|fields| fields.get(2))
                .and_then(Value::as_rstring)
                .map(|blob| (i, blob))
                .ok_or_else(|| Error::UnexpectedLayout {
                    file: file.to_string(),
                    message: format!("script entry {i} is not [id, name, code]"),
                })
        })
        .collect()
}
