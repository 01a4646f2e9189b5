//! CLI command for dumping a data file

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::compression::inflate_script;
use crate::marshal::{Value, json, read_marshal};

/// `# <name>` header followed by the source of every script entry.
fn script_sources(scripts: &Value) -> anyhow::Result<String> {
    let entries = scripts.as_array().context("Not a Scripts file: expected an array")?;

    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        let fields = entry
            .as_array()
            .with_context(|| format!("Script entry {i} is not an array"))?;
        let name = fields.get(1).and_then(Value::as_text).unwrap_or_default();
        let blob = fields
            .get(2)
            .and_then(Value::as_rstring)
            .with_context(|| format!("Script entry {i} has no code"))?;
        let source = inflate_script(&blob.bytes)?;

        out.push_str(&format!("# {name}\n{}\n", source.text));
    }
    Ok(out)
}

pub fn execute(file: &Path, output: Option<&Path>, scripts: bool) -> anyhow::Result<()> {
    let graph = read_marshal(file).with_context(|| format!("Failed to decode {}", file.display()))?;

    let text = if scripts {
        script_sources(&graph)?
    } else {
        serde_json::to_string_pretty(&json::to_json(&graph))?
    };

    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
