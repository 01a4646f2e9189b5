//! Text tables → translated data files

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::layout::{DataFile, Engine, FileKind, ProjectLayout};
use super::options::{Category, ProjectOptions};
use super::{
    MAPS_TABLE, NAMES_TABLE, load, quirks_for, read_title, replace_title, script_blobs,
    write_output,
};
use crate::compression::{decode_script_text, deflate_script, inflate_script};
use crate::error::{Error, Result};
use crate::locator::{self, GameQuirks, graph, script};
use crate::marshal::{Value, encode};
use crate::text_table::{TranslationTable, read_pair};

/// Outcome of [`inject`]
#[derive(Debug, Clone)]
pub struct InjectSummary {
    pub engine: Engine,
    /// Files written to the output directory
    pub written: Vec<PathBuf>,
    /// Translation units written back
    pub replaced: usize,
}

struct Injector<'a> {
    layout: &'a ProjectLayout,
    options: &'a ProjectOptions,
    quirks: GameQuirks,
    tables: HashMap<String, TranslationTable>,
    summary: InjectSummary,
}

/// Tables needed to inject the selected categories, as (directory, name).
fn required_tables(
    layout: &ProjectLayout,
    files: &[DataFile],
    options: &ProjectOptions,
) -> Vec<(PathBuf, String)> {
    let mut required = Vec::new();
    if options.includes(Category::Maps) && files.iter().any(|f| f.kind == FileKind::Map) {
        required.push((layout.maps_dir(), MAPS_TABLE.to_string()));
        required.push((layout.maps_dir(), NAMES_TABLE.to_string()));
    }
    if options.includes(Category::Other) {
        for file in files
            .iter()
            .filter(|f| matches!(f.kind, FileKind::Records | FileKind::EventContainer))
        {
            required.push((layout.other_dir(), file.table_name()));
        }
    }
    if options.includes(Category::System) {
        required.push((layout.other_dir(), Category::System.name().to_string()));
    }
    if options.includes(Category::Scripts) && files.iter().any(|f| f.kind == FileKind::Scripts) {
        required.push((layout.other_dir(), Category::Scripts.name().to_string()));
    }
    required
}

/// Write translated copies of the project's data files to `<root>/output`.
///
/// Every required translation table is read before any output is written,
/// so a missing `_trans.txt` leaves the output directory untouched.
///
/// # Errors
/// Returns [`Error::MissingTranslationFile`] when a table is missing, or
/// any decode or I/O error met while processing a file.
pub fn inject(root: impl AsRef<Path>, options: &ProjectOptions) -> Result<InjectSummary> {
    let layout = ProjectLayout::open(root, &options.data_dir)?;
    let files = layout.data_files()?;

    let mut tables = HashMap::new();
    for (dir, name) in required_tables(&layout, &files, options) {
        let table = read_pair(&dir, &name)?;
        tables.insert(name, table);
    }

    let system = load(&layout.system_file())?;
    let mut injector = Injector {
        layout: &layout,
        options,
        quirks: quirks_for(&system, options),
        tables,
        summary: InjectSummary {
            engine: layout.engine,
            written: Vec::new(),
            replaced: 0,
        },
    };

    for file in &files {
        if !options.includes(file.kind.category()) {
            continue;
        }
        match file.kind {
            FileKind::Map => injector.map(file)?,
            FileKind::Records | FileKind::EventContainer => injector.other(file)?,
            FileKind::Scripts => injector.scripts(file)?,
            FileKind::System => {}
        }
    }
    if options.includes(Category::System) {
        injector.system(system)?;
    }

    Ok(injector.summary)
}

impl Injector<'_> {
    fn table(&self, name: &str) -> Result<&TranslationTable> {
        self.tables.get(name).ok_or_else(|| Error::MissingTranslationFile {
            path: self.layout.translation_dir().join(format!("{name}_trans.txt")),
        })
    }

    fn finish(&mut self, file_name: &str, value: &Value) -> Result<()> {
        let path = write_output(&self.layout.output_dir(), file_name, &encode(value))?;
        if self.options.logging {
            tracing::info!("Written {file_name}");
        }
        self.summary.written.push(path);
        Ok(())
    }

    fn map(&mut self, file: &DataFile) -> Result<()> {
        let mut map = load(&file.path)?;
        let strings = graph::locate_map(&map, self.quirks);
        let replaced = locator::apply(&mut map, &strings.names, self.table(NAMES_TABLE)?)?
            + locator::apply(&mut map, &strings.events, self.table(MAPS_TABLE)?)?;
        self.summary.replaced += replaced;
        self.finish(&file.file_name(), &map)
    }

    fn other(&mut self, file: &DataFile) -> Result<()> {
        let mut value = load(&file.path)?;
        let located = match file.kind {
            FileKind::EventContainer => graph::locate_event_container(&value, self.quirks),
            _ => graph::locate_records(&value, self.quirks),
        };
        let replaced = locator::apply(&mut value, &located, self.table(&file.table_name())?)?;
        self.summary.replaced += replaced;
        self.finish(&file.file_name(), &value)
    }

    fn system(&mut self, mut system: Value) -> Result<()> {
        let ini = self.layout.game_ini();
        let title = match &ini {
            Some(path) => read_title(path)?,
            None => None,
        };

        let located = graph::locate_system(&system, title.as_deref());
        let table = self.table(Category::System.name())?;
        let replaced = locator::apply(&mut system, &located, table)?;
        let translated_title = located
            .last()
            .and_then(|unit| table.translation(&unit.text))
            .map(str::to_string);
        self.summary.replaced += replaced;

        if let (Some(ini), Some(translated)) = (ini, translated_title) {
            let content = decode_script_text(&fs::read(&ini)?).text;
            let path = write_output(
                &self.layout.output_dir(),
                "Game.ini",
                replace_title(&content, &translated).as_bytes(),
            )?;
            self.summary.written.push(path);
        }

        let file_name = self
            .layout
            .system_file()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.finish(&file_name, &system)
    }

    fn scripts(&mut self, file: &DataFile) -> Result<()> {
        let mut value = load(&file.path)?;
        let table = self.table(Category::Scripts.name())?;

        let mut rewritten = Vec::new();
        for (i, blob) in script_blobs(&value, &file.file_name())? {
            let source = inflate_script(&blob.bytes)?;
            let (text, replaced) = script::rewrite_script(&source.text, table);
            if replaced > 0 {
                rewritten.push((i, deflate_script(&text)?, replaced));
            }
        }

        if let Some(entries) = value.as_array_mut() {
            for (i, compressed, replaced) in rewritten {
                let blob = entries
                    .get_mut(i)
                    .and_then(Value::as_array_mut)
                    .and_then(|fields| fields.get_mut(2))
                    .and_then(Value::as_rstring_mut);
                if let Some(blob) = blob {
                    blob.bytes = compressed;
                    self.summary.replaced += replaced;
                }
            }
        }
        self.finish(&file.file_name(), &value)
    }
}
