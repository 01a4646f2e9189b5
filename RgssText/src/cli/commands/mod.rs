use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::locator::{GameQuirks, GameVariant};
use crate::project::{Category, ProcessingMode, ProjectOptions};

pub mod execute;
pub mod inspect;
pub mod project;

/// Arguments shared by `extract` and `inject`
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Game folder (the one holding the data directory)
    pub project: PathBuf,

    /// Only process one category: maps, other, system or scripts
    #[arg(long)]
    pub only: Option<Category>,

    /// Name of the data directory inside the game folder
    #[arg(long, default_value = "Data")]
    pub data_dir: String,

    /// Game-specific parsing rules (generic, lisa); detected from the title by default
    #[arg(long)]
    pub game: Option<GameVariant>,
}

impl ProjectArgs {
    /// Library options for these arguments
    pub fn options(&self, mode: ProcessingMode, logging: bool) -> ProjectOptions {
        let mut options = ProjectOptions::default()
            .with_mode(mode)
            .with_logging(logging)
            .with_data_dir(self.data_dir.clone());
        if let Some(category) = self.only {
            options = options.with_only(category);
        }
        if let Some(variant) = self.game {
            options = options.with_quirks(GameQuirks::new(variant));
        }
        options
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export translatable strings to text tables under <project>/translation
    Extract {
        #[command(flatten)]
        args: ProjectArgs,

        /// Re-extract categories that already have a translation file
        #[arg(short, long, conflicts_with = "append")]
        force: bool,

        /// Add newly found strings to existing tables, keeping translations
        #[arg(short, long)]
        append: bool,
    },

    /// Write translated data files to <project>/output
    Inject {
        #[command(flatten)]
        args: ProjectArgs,
    },

    /// Print a data file as JSON
    Inspect {
        /// Data file (.rxdata, .rvdata, .rvdata2)
        file: PathBuf,

        /// Write the JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print decompressed script sources instead (Scripts files only)
        #[arg(long)]
        scripts: bool,
    },
}
