//! Data files → text tables

use std::path::{Path, PathBuf};

use super::layout::{DataFile, Engine, FileKind, ProjectLayout};
use super::options::{Category, ProcessingMode, ProjectOptions};
use super::{MAPS_TABLE, NAMES_TABLE, game_title, load, quirks_for, script_blobs};
use crate::compression::inflate_script;
use crate::error::Result;
use crate::locator::{GameQuirks, Located, graph, script};
use crate::marshal::Value;
use crate::text_table::{
    TranslationTable, has_translation_file, read_pair, table_paths, write_pair, write_plain,
};

/// Outcome of [`extract`]
#[derive(Debug, Clone)]
pub struct ExtractSummary {
    pub engine: Engine,
    /// `<category>.txt` files written
    pub tables: Vec<PathBuf>,
    /// Tables left alone because a translation already exists
    pub skipped: Vec<String>,
    /// Total entries across written tables
    pub entries: usize,
}

impl ExtractSummary {
    fn new(engine: Engine) -> Self {
        Self {
            engine,
            tables: Vec::new(),
            skipped: Vec::new(),
            entries: 0,
        }
    }
}

struct Extractor<'a> {
    layout: &'a ProjectLayout,
    options: &'a ProjectOptions,
    quirks: GameQuirks,
    summary: ExtractSummary,
}

/// Extract every translatable string of the project at `root` into text
/// tables under `<root>/translation`.
///
/// In [`ProcessingMode::Default`] a category whose translation file already
/// exists and is not empty is skipped and reported in
/// [`ExtractSummary::skipped`].
///
/// # Errors
/// Returns an error if the project layout is invalid, a data file fails to
/// decode or a table cannot be written.
pub fn extract(root: impl AsRef<Path>, options: &ProjectOptions) -> Result<ExtractSummary> {
    let layout = ProjectLayout::open(root, &options.data_dir)?;
    let files = layout.data_files()?;
    let system = load(&layout.system_file())?;

    let mut extractor = Extractor {
        layout: &layout,
        options,
        quirks: quirks_for(&system, options),
        summary: ExtractSummary::new(layout.engine),
    };

    if options.includes(Category::Maps) {
        extractor.maps(&files)?;
    }
    if options.includes(Category::Other) {
        for file in files
            .iter()
            .filter(|f| matches!(f.kind, FileKind::Records | FileKind::EventContainer))
        {
            extractor.other(file)?;
        }
    }
    if options.includes(Category::System) {
        extractor.system(&system)?;
    }
    if options.includes(Category::Scripts) {
        if let Some(file) = files.iter().find(|f| f.kind == FileKind::Scripts) {
            extractor.scripts(file)?;
        }
    }

    Ok(extractor.summary)
}

fn texts(located: Vec<Located>) -> impl Iterator<Item = String> {
    located.into_iter().map(|l| l.text)
}

impl Extractor<'_> {
    /// In default mode, report and skip when any of `tables` already has a
    /// translation.
    fn blocked(&mut self, dir: &Path, tables: &[&str]) -> bool {
        if self.options.mode != ProcessingMode::Default {
            return false;
        }
        let Some(existing) = tables.iter().find(|name| has_translation_file(dir, name)) else {
            return false;
        };
        tracing::warn!(
            "{existing}_trans.txt already exists; \
             use --force to re-extract or --append to add new strings"
        );
        self.summary.skipped.push((*existing).to_string());
        true
    }

    fn save(&mut self, dir: &Path, name: &str, originals: &[String]) -> Result<()> {
        let fresh = originals.iter().map(String::as_str);
        let append = self.options.mode == ProcessingMode::Append;
        let table = if append && has_translation_file(dir, name) {
            let mut table = read_pair(dir, name)?;
            let added = table.merge_append(fresh);
            tracing::debug!("Appended {added} new entries to {name}");
            table
        } else {
            if self.options.mode == ProcessingMode::Append {
                tracing::info!("{name} has not been extracted yet, writing a fresh table");
            }
            TranslationTable::from_originals(fresh)
        };

        write_pair(dir, name, &table)?;
        self.summary.entries += table.len();
        self.summary.tables.push(table_paths(dir, name).0);
        Ok(())
    }

    fn parsed(&self, file: &DataFile) {
        if self.options.logging {
            tracing::info!("Parsed {}", file.file_name());
        }
    }

    fn maps(&mut self, files: &[DataFile]) -> Result<()> {
        let dir = self.layout.maps_dir();
        if self.blocked(&dir, &[MAPS_TABLE, NAMES_TABLE]) {
            return Ok(());
        }

        let mut names = Vec::new();
        let mut events = Vec::new();
        for file in files.iter().filter(|f| f.kind == FileKind::Map) {
            let map = load(&file.path)?;
            let strings = graph::locate_map(&map, self.quirks);
            names.extend(texts(strings.names));
            events.extend(texts(strings.events));
            self.parsed(file);
        }

        self.save(&dir, MAPS_TABLE, &events)?;
        self.save(&dir, NAMES_TABLE, &names)
    }

    fn other(&mut self, file: &DataFile) -> Result<()> {
        let dir = self.layout.other_dir();
        let name = file.table_name();
        if self.blocked(&dir, &[name.as_str()]) {
            return Ok(());
        }

        let value = load(&file.path)?;
        let located = match file.kind {
            FileKind::EventContainer => graph::locate_event_container(&value, self.quirks),
            _ => graph::locate_records(&value, self.quirks),
        };
        self.parsed(file);
        self.save(&dir, &name, &texts(located).collect::<Vec<_>>())
    }

    fn system(&mut self, system: &Value) -> Result<()> {
        let dir = self.layout.other_dir();
        let name = Category::System.name();
        if self.blocked(&dir, &[name]) {
            return Ok(());
        }

        let title = game_title(self.layout)?;
        let located = graph::locate_system(system, title.as_deref());
        if self.options.logging {
            tracing::info!("Parsed {}", self.layout.system_file().display());
        }
        self.save(&dir, name, &texts(located).collect::<Vec<_>>())
    }

    fn scripts(&mut self, file: &DataFile) -> Result<()> {
        let dir = self.layout.other_dir();
        let name = Category::Scripts.name();
        if self.blocked(&dir, &[name]) {
            return Ok(());
        }

        let value = load(&file.path)?;
        let mut sources = Vec::new();
        let mut originals = Vec::new();
        for (i, blob) in script_blobs(&value, &file.file_name())? {
            let source = inflate_script(&blob.bytes).inspect_err(|err| {
                tracing::error!("Failed to inflate script {i} of {}: {err}", file.file_name());
            })?;
            let filter = self.options.script_filter.as_ref();
            originals.extend(script::locate_script(&source.text, filter));
            sources.push(source.text);
        }
        self.parsed(file);

        write_plain(&dir, name, &sources.join("\n"))?;
        self.save(&dir, name, &originals)
    }
}
