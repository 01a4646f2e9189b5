#![allow(non_snake_case)]
//! # RgssText
//!
//! A pure-Rust library for translating RPG Maker XP, VX and VX Ace games.
//!
//! It exports every player-visible string of a project's data files to
//! plain text tables, and writes translated copies of those data files back
//! from the filled-in tables.
//!
//! ## Supported Formats
//!
//! - **Marshal 4.8** - Ruby object graphs (`.rxdata`, `.rvdata`, `.rvdata2`)
//! - **Table/Color/Tone/Rect** - engine fixed-layout values
//! - **Scripts** - zlib-compressed Ruby sources
//! - **Text tables** - line-aligned `<category>.txt` / `<category>_trans.txt`
//!
//! ## Quick Start
//!
//! ### Translating a project
//!
//! ```no_run
//! use rgsstext::project::{ProjectOptions, extract, inject};
//!
//! let options = ProjectOptions::default();
//!
//! // Writes translation/maps/maps.txt, translation/other/actors.txt, ...
//! let summary = extract("MyGame", &options)?;
//! println!("{} strings in {} tables", summary.entries, summary.tables.len());
//!
//! // After filling in the *_trans.txt files:
//! let summary = inject("MyGame", &options)?;
//! println!("Wrote {} files", summary.written.len());
//! # Ok::<(), rgsstext::Error>(())
//! ```
//!
//! ### Working with a single data file
//!
//! ```no_run
//! use rgsstext::prelude::*;
//!
//! let actors = read_marshal("Data/Actors.rvdata2")?;
//! let located = graph::locate_records(&actors, GameQuirks::default());
//! for unit in &located {
//!     println!("{}", unit.text);
//! }
//! # Ok::<(), rgsstext::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `rgsstext` command-line binary

pub mod compression;
pub mod error;
pub mod locator;
pub mod marshal;
pub mod project;
pub mod text_table;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    // Object graph codec
    pub use crate::marshal::{
        FixedValue, RString, Record, Value, decode, encode, read_marshal, write_marshal,
    };

    // Locator
    pub use crate::locator::{
        GameQuirks, GameVariant, Located, SENTINEL, ScriptNoiseFilter, StringFilter, Target,
        ValuePath, apply, graph, script,
    };

    // Script blobs
    pub use crate::compression::{ScriptText, deflate_script, inflate_script};

    // Text tables
    pub use crate::text_table::{TranslationTable, read_pair, write_pair};

    // Project pipeline
    pub use crate::project::{
        Category, Engine, ExtractSummary, InjectSummary, ProcessingMode, ProjectOptions, extract,
        inject,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
