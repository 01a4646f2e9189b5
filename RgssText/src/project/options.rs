//! Options for project extraction and injection

use std::fmt;
use std::str::FromStr;

use crate::locator::{GameQuirks, StringFilter, ScriptNoiseFilter};

/// What to do when a category already has a translation file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Skip the category so translator work is never overwritten.
    #[default]
    Default,
    /// Re-extract and overwrite the existing tables.
    Force,
    /// Keep existing entries and insert newly found strings in place.
    Append,
}

/// Groups of data files handled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `Map###` files, exported to the `maps` and `names` tables
    Maps,
    /// Database and event container files, one table each
    Other,
    /// The `System` file
    System,
    /// The `Scripts` file
    Scripts,
}

impl Category {
    pub const ALL: [Category; 4] = [Self::Maps, Self::Other, Self::System, Self::Scripts];

    pub fn name(self) -> &'static str {
        match self {
            Self::Maps => "maps",
            Self::Other => "other",
            Self::System => "system",
            Self::Scripts => "scripts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maps" => Ok(Self::Maps),
            "other" => Ok(Self::Other),
            "system" => Ok(Self::System),
            "scripts" | "plugins" => Ok(Self::Scripts),
            other => Err(format!(
                "unknown category '{other}' (expected maps, other, system or scripts)"
            )),
        }
    }
}

/// Options shared by [`extract`](super::extract) and [`inject`](super::inject)
pub struct ProjectOptions {
    pub mode: ProcessingMode,
    /// Only process this category
    pub only: Option<Category>,
    /// Log every processed file at info level
    pub logging: bool,
    /// Name of the directory holding the original data files
    pub data_dir: String,
    /// Force game quirks instead of detecting them from `System`
    pub quirks: Option<GameQuirks>,
    /// Decides which script literals are exported
    pub script_filter: Box<dyn StringFilter>,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::Default,
            only: None,
            logging: false,
            data_dir: "Data".to_string(),
            quirks: None,
            script_filter: Box::new(ScriptNoiseFilter),
        }
    }
}

impl fmt::Debug for ProjectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectOptions")
            .field("mode", &self.mode)
            .field("only", &self.only)
            .field("logging", &self.logging)
            .field("data_dir", &self.data_dir)
            .field("quirks", &self.quirks)
            .finish_non_exhaustive()
    }
}

impl ProjectOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_only(mut self, category: Category) -> Self {
        self.only = Some(category);
        self
    }

    #[must_use]
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    #[must_use]
    pub fn with_data_dir(mut self, name: impl Into<String>) -> Self {
        self.data_dir = name.into();
        self
    }

    #[must_use]
    pub fn with_quirks(mut self, quirks: GameQuirks) -> Self {
        self.quirks = Some(quirks);
        self
    }

    /// Replace the script literal filter
    #[must_use]
    pub fn with_script_filter(mut self, filter: impl StringFilter + 'static) -> Self {
        self.script_filter = Box::new(filter);
        self
    }

    /// Whether `category` is selected by [`ProjectOptions::only`]
    pub fn includes(&self, category: Category) -> bool {
        self.only.is_none_or(|only| only == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::AcceptAll;

    #[test]
    fn test_category_parse() {
        assert_eq!("Maps".parse::<Category>(), Ok(Category::Maps));
        assert_eq!("plugins".parse::<Category>(), Ok(Category::Scripts));
        assert!("tilesets".parse::<Category>().is_err());
    }

    #[test]
    fn test_builder() {
        let options = ProjectOptions::default()
            .with_mode(ProcessingMode::Append)
            .with_only(Category::System)
            .with_script_filter(AcceptAll);
        assert_eq!(options.mode, ProcessingMode::Append);
        assert!(options.includes(Category::System));
        assert!(!options.includes(Category::Maps));
        assert!(options.script_filter.accept("Graphics/x"));
        assert!(ProjectOptions::default().includes(Category::Scripts));
    }
}
