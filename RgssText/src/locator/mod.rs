//! String locator
//!
//! Finds the translatable strings of a data file and remembers where each
//! one lives so a translation can be written back to the same place.
//!
//! Two modes are provided:
//!
//! - **Graph mode** ([`graph`], [`events`]) walks a decoded marshal graph
//!   using a fixed table of interesting fields per file kind.
//! - **Script mode** ([`script`]) scans Ruby source text for quoted literals
//!   and records their byte offsets.
//!
//! Both modes represent an embedded newline with [`SENTINEL`] so every unit
//! fits on one line of a text table.

pub mod events;
pub mod filter;
pub mod graph;
pub mod path;
pub mod quirks;
pub mod script;

pub use filter::{AcceptAll, ScriptNoiseFilter, StringFilter};
pub use path::{PathSegment, ValuePath};
pub use quirks::{GameQuirks, GameVariant};

use crate::error::Result;
use crate::marshal::Value;
use crate::text_table::TranslationTable;

/// Line-break marker used inside a single text table line
pub const SENTINEL: &str = r"\#";

/// Where a located string goes on write-back.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A single string leaf.
    Leaf(ValuePath),
    /// A run of dialogue lines coalesced into one unit.
    Dialogue {
        /// One path per physical line, in order.
        slots: Vec<ValuePath>,
        /// Control prefix removed before export and restored on write-back.
        prefix: String,
    },
}

/// A translatable string together with its write-back target.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub text: String,
    pub target: Target,
}

/// Trim a leaf value and fold its line breaks into [`SENTINEL`].
pub fn normalize_text(text: &str) -> String {
    text.trim().replace("\r\n", SENTINEL).replace('\n', SENTINEL)
}

/// Texts of `located` in order with duplicates removed.
pub fn unique_texts(located: &[Located]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    located
        .iter()
        .map(|l| l.text.as_str())
        .filter(|text| seen.insert(*text))
        .collect()
}

/// Write translations back into `graph`.
///
/// Units without a non-empty translation are left untouched. Returns the
/// number of units that were replaced.
///
/// # Errors
/// Returns [`Error::InvalidPath`](crate::Error::InvalidPath) if a target no
/// longer resolves to a string, which means `located` was produced from a
/// different graph.
pub fn apply(graph: &mut Value, located: &[Located], table: &TranslationTable) -> Result<usize> {
    let mut replaced = 0;
    for unit in located {
        let Some(translated) = table.translation(&unit.text) else {
            continue;
        };

        match &unit.target {
            Target::Leaf(path) => {
                path.set_text(graph, &translated.replace(SENTINEL, "\n"))?;
            }
            Target::Dialogue { slots, prefix } => {
                let full = format!("{prefix}{translated}");
                let lines = events::split_translation(&full, slots.len());
                for (slot, line) in slots.iter().zip(lines) {
                    slot.set_text(graph, &line)?;
                }
            }
        }
        replaced += 1;
    }
    Ok(replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::Record;

    #[test]
    fn test_normalize_and_unique() {
        assert_eq!(normalize_text("  a\r\nb\nc "), r"a\#b\#c");

        let located: Vec<Located> = ["x", "y", "x"]
            .iter()
            .map(|t| Located {
                text: (*t).to_string(),
                target: Target::Leaf(ValuePath::root()),
            })
            .collect();
        assert_eq!(unique_texts(&located), vec!["x", "y"]);
    }

    #[test]
    fn test_apply_leaf_and_dialogue() {
        let mut record = Record::new("RPG::Test");
        record.set("name", Value::from("Potion"));
        record.set("a", Value::from("Hello"));
        record.set("b", Value::from("world"));
        let mut graph = Value::Object(record);

        let located = vec![
            Located {
                text: "Potion".into(),
                target: Target::Leaf(ValuePath::root().field("name")),
            },
            Located {
                text: r"Hello\#world".into(),
                target: Target::Dialogue {
                    slots: vec![ValuePath::root().field("a"), ValuePath::root().field("b")],
                    prefix: String::new(),
                },
            },
        ];
        let table = TranslationTable::from_pairs([
            ("Potion", ""),
            (r"Hello\#world", r"Bonjour\#le\#monde"),
        ]);

        assert_eq!(apply(&mut graph, &located, &table).unwrap(), 1);
        assert_eq!(graph.field("name").and_then(Value::as_text).as_deref(), Some("Potion"));
        assert_eq!(graph.field("a").and_then(Value::as_text).as_deref(), Some("Bonjour"));
        assert_eq!(graph.field("b").and_then(Value::as_text).as_deref(), Some("le\nmonde"));
    }
}
