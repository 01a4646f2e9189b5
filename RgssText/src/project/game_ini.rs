//! `Game.ini` title handling

use std::fs;
use std::path::Path;

use crate::compression::decode_script_text;
use crate::error::Result;

fn is_title_line(line: &str) -> bool {
    line.trim_start()
        .get(..5)
        .is_some_and(|key| key.eq_ignore_ascii_case("title"))
}

/// Read the value of the `Title=` line, if any.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_title(path: &Path) -> Result<Option<String>> {
    let bytes = fs::read(path)?;
    let content = decode_script_text(&bytes).text;
    Ok(content
        .lines()
        .find(|line| is_title_line(line))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim().to_string()))
}

/// Return `content` with its `Title=` line set to `title`.
///
/// The line is appended when missing. Line endings follow the input.
pub fn replace_title(content: &str, title: &str) -> String {
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let title_line = format!("Title={title}");

    match lines.iter_mut().find(|line| is_title_line(line)) {
        Some(line) => *line = title_line,
        None => lines.push(title_line),
    }

    let mut out = lines.join(newline);
    if content.ends_with('\n') {
        out.push_str(newline);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_title() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Game.ini");
        fs::write(&path, "[Game]\r\nLibrary=RGSS301.dll\r\nTitle= My Game \r\n").unwrap();
        assert_eq!(read_title(&path).unwrap().as_deref(), Some("My Game"));

        fs::write(&path, "[Game]\n").unwrap();
        assert_eq!(read_title(&path).unwrap(), None);
    }

    #[test]
    fn test_replace_title() {
        let content = "[Game]\r\nTitle=My Game\r\nScripts=Data\\Scripts.rvdata2\r\n";
        assert_eq!(
            replace_title(content, "Mon Jeu"),
            "[Game]\r\nTitle=Mon Jeu\r\nScripts=Data\\Scripts.rvdata2\r\n"
        );
        assert_eq!(replace_title("[Game]", "X"), "[Game]\nTitle=X");
    }
}
