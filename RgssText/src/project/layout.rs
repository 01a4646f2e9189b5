//! Project directory conventions and data file discovery
//!
//! ```text
//! <project>/
//!   Data/                   original data files
//!   Game.ini                optional, its Title= line follows the game title
//!   translation/maps/       maps + names tables
//!   translation/other/      one table per database file, system, scripts
//!   output/                 injected data files
//! ```

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::options::Category;
use crate::error::{Error, Result};

/// RPG Maker generation, which fixes the data file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// RPG Maker XP (RGSS1)
    Xp,
    /// RPG Maker VX (RGSS2)
    Vx,
    /// RPG Maker VX Ace (RGSS3)
    Ace,
}

impl Engine {
    /// Detection order when several `System` files exist.
    const PROBE_ORDER: [Engine; 3] = [Self::Ace, Self::Vx, Self::Xp];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xp => "rxdata",
            Self::Vx => "rvdata",
            Self::Ace => "rvdata2",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Xp => "XP",
            Self::Vx => "VX",
            Self::Ace => "VX Ace",
        }
    }

    /// Detect the engine from the `System` file present in `data_dir`.
    ///
    /// # Errors
    /// Returns [`Error::EngineNotDetected`] if no `System` file exists.
    pub fn detect(data_dir: &Path) -> Result<Self> {
        Self::PROBE_ORDER
            .into_iter()
            .find(|engine| data_dir.join(format!("System.{}", engine.extension())).is_file())
            .ok_or_else(|| Error::EngineNotDetected {
                path: data_dir.to_path_buf(),
            })
    }
}

/// Database files without translatable text
pub const SKIPPED_STEMS: &[&str] = &["MapInfos", "Tilesets", "Animations", "Areas"];

/// Files walked as event containers instead of record arrays
pub const EVENT_CONTAINER_STEMS: &[&str] = &["CommonEvents", "Troops"];

/// How a data file is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Map,
    /// `Actors`, `Items`, `Skills`, ...
    Records,
    /// `CommonEvents` and `Troops`
    EventContainer,
    System,
    Scripts,
}

impl FileKind {
    pub fn category(self) -> Category {
        match self {
            Self::Map => Category::Maps,
            Self::Records | Self::EventContainer => Category::Other,
            Self::System => Category::System,
            Self::Scripts => Category::Scripts,
        }
    }
}

/// Classify a data file by its stem. `None` for files that are skipped.
pub fn classify(stem: &str) -> Option<FileKind> {
    if stem
        .strip_prefix("Map")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
    {
        return Some(FileKind::Map);
    }
    match stem {
        "System" => Some(FileKind::System),
        "Scripts" => Some(FileKind::Scripts),
        s if SKIPPED_STEMS.contains(&s) => None,
        s if EVENT_CONTAINER_STEMS.contains(&s) => Some(FileKind::EventContainer),
        _ => Some(FileKind::Records),
    }
}

/// A discovered data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

impl DataFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lowercased stem, used as the table name for `other` files.
    pub fn table_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Resolved directories of one project.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub engine: Engine,
}

impl ProjectLayout {
    /// Resolve the layout of the project at `root`.
    ///
    /// # Errors
    /// Returns [`Error::ProjectNotFound`] if the data directory is missing and
    /// [`Error::EngineNotDetected`] if it holds no `System` file.
    pub fn open(root: impl AsRef<Path>, data_dir_name: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let data_dir = root.join(data_dir_name);
        if !data_dir.is_dir() {
            return Err(Error::ProjectNotFound { path: data_dir });
        }
        let engine = Engine::detect(&data_dir)?;
        tracing::debug!("Detected RPG Maker {} project at {}", engine.name(), root.display());
        Ok(Self {
            root,
            data_dir,
            engine,
        })
    }

    pub fn translation_dir(&self) -> PathBuf {
        self.root.join("translation")
    }

    /// Directory of the `maps` and `names` tables
    pub fn maps_dir(&self) -> PathBuf {
        self.translation_dir().join("maps")
    }

    /// Directory of every other table
    pub fn other_dir(&self) -> PathBuf {
        self.translation_dir().join("other")
    }

    /// Directory of the tables for `category`
    pub fn tables_dir(&self, category: Category) -> PathBuf {
        match category {
            Category::Maps => self.maps_dir(),
            Category::Other | Category::System | Category::Scripts => self.other_dir(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    /// `Game.ini` beside the data directory, if present
    pub fn game_ini(&self) -> Option<PathBuf> {
        let path = self.root.join("Game.ini");
        path.is_file().then_some(path)
    }

    pub fn system_file(&self) -> PathBuf {
        self.data_dir.join(format!("System.{}", self.engine.extension()))
    }

    /// Every processable data file with the engine's extension, sorted by name.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be read.
    pub fn data_files(&self) -> Result<Vec<DataFile>> {
        let extension = self.engine.extension();
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.data_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file()
                || !path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
            {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(kind) = classify(stem) {
                files.push(DataFile {
                    path: path.to_path_buf(),
                    kind,
                });
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_classify() {
        assert_eq!(classify("Map001"), Some(FileKind::Map));
        assert_eq!(classify("MapInfos"), None);
        assert_eq!(classify("Map"), Some(FileKind::Records));
        assert_eq!(classify("Troops"), Some(FileKind::EventContainer));
        assert_eq!(classify("Actors"), Some(FileKind::Records));
        assert_eq!(classify("Tilesets"), None);
        assert_eq!(classify("Scripts").map(FileKind::category), Some(Category::Scripts));
    }

    #[test]
    fn test_open_and_discover() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("Data");
        fs::create_dir(&data).unwrap();
        let names = [
            "System.rvdata2",
            "Map002.rvdata2",
            "Map001.rvdata2",
            "Tilesets.rvdata2",
            "Actors.rxdata",
        ];
        for name in names {
            fs::write(data.join(name), b"\x04\x08").unwrap();
        }

        let layout = ProjectLayout::open(dir.path(), "Data").unwrap();
        assert_eq!(layout.engine, Engine::Ace);
        assert_eq!(layout.maps_dir(), dir.path().join("translation").join("maps"));
        assert!(layout.game_ini().is_none());

        let names: Vec<String> = layout
            .data_files()
            .unwrap()
            .iter()
            .map(DataFile::file_name)
            .collect();
        assert_eq!(names, vec!["Map001.rvdata2", "Map002.rvdata2", "System.rvdata2"]);
    }

    #[test]
    fn test_missing_project() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            ProjectLayout::open(dir.path(), "Data"),
            Err(Error::ProjectNotFound { .. })
        ));
        fs::create_dir(dir.path().join("Data")).unwrap();
        assert!(matches!(
            ProjectLayout::open(dir.path(), "Data"),
            Err(Error::EngineNotDetected { .. })
        ));
    }
}
