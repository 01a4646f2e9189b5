//! Script mode: quoted literals in Ruby source
//!
//! This is a lexical scan, not a parser. It understands line comments,
//! `=begin`/`=end` blocks, `'` and `"` quotes and backslash escapes, which
//! covers the literals found in RGSS script sections.

use super::filter::StringFilter;
use super::SENTINEL;
use crate::text_table::TranslationTable;

/// Ideographic space, removed before deciding whether a literal is empty
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// One quoted literal of a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLiteral {
    /// Text between the quotes with escaped quotes resolved and line
    /// breaks replaced by [`SENTINEL`].
    pub content: String,
    /// Byte offset of the first content byte (just after the opening quote).
    pub start: usize,
    /// Byte offset of the closing quote.
    pub end: usize,
    pub quote: char,
}

impl ScriptLiteral {
    /// Key under which this literal appears in a text table, if any.
    pub fn key(&self) -> Option<String> {
        let key: String = self
            .content
            .trim()
            .chars()
            .filter(|&c| c != IDEOGRAPHIC_SPACE)
            .collect();
        if key.is_empty() { None } else { Some(key) }
    }
}

fn unescape(raw: &str, quote: char) -> String {
    let escaped_quote = format!("\\{quote}");
    raw.replace(&escaped_quote, &quote.to_string())
        .replace("\r\n", SENTINEL)
        .replace('\n', SENTINEL)
}

fn escape(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut backslashes = 0usize;
    for c in text.chars() {
        if c == quote && backslashes % 2 == 0 {
            out.push('\\');
        }
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
        out.push(c);
    }
    out
}

/// Find every complete quoted literal in `source`.
///
/// A literal still open at the end of the source is dropped.
pub fn scan_literals(source: &str) -> Vec<ScriptLiteral> {
    let mut literals = Vec::new();
    let mut in_block_comment = false;
    // (quote, content start) of the literal being read
    let mut open: Option<(char, usize)> = None;
    let mut backslashes = 0usize;
    let mut line_start = 0usize;

    for line in source.split_inclusive('\n') {
        let offset = line_start;
        line_start += line.len();

        if open.is_none() {
            let trimmed = line.trim_start();
            if in_block_comment {
                if trimmed.starts_with("=end") {
                    in_block_comment = false;
                }
                continue;
            }
            if trimmed.starts_with("=begin") {
                in_block_comment = true;
                continue;
            }
            if trimmed.starts_with('#') {
                continue;
            }
        }

        for (i, c) in line.char_indices() {
            let pos = offset + i;
            match open {
                None => {
                    if c == '#' {
                        break;
                    }
                    if c == '"' || c == '\'' {
                        open = Some((c, pos + 1));
                        backslashes = 0;
                    }
                }
                Some((quote, start)) => {
                    if c == quote && backslashes % 2 == 0 {
                        literals.push(ScriptLiteral {
                            content: unescape(&source[start..pos], quote),
                            start,
                            end: pos,
                            quote,
                        });
                        open = None;
                    }
                    backslashes = if c == '\\' { backslashes + 1 } else { 0 };
                }
            }
        }
    }

    literals
}

/// Keys of the literals in `source` accepted by `filter`, in source order.
pub fn locate_script(source: &str, filter: &dyn StringFilter) -> Vec<String> {
    scan_literals(source)
        .iter()
        .filter_map(ScriptLiteral::key)
        .filter(|key| filter.accept(key))
        .collect()
}

/// Substitute translated literals into `source`.
///
/// Literals are replaced from the end of the source towards the start so
/// the recorded offsets of earlier literals stay valid. Leading and trailing
/// whitespace inside the quotes is kept, line breaks follow the source's
/// style and the enclosing quote character is escaped. Returns the new
/// source and the number of replaced literals.
pub fn rewrite_script(source: &str, table: &TranslationTable) -> (String, usize) {
    let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let mut output = source.to_string();
    let mut replaced = 0;

    for literal in scan_literals(source).iter().rev() {
        let Some(key) = literal.key() else {
            continue;
        };
        let Some(translated) = table.translation(&key) else {
            continue;
        };

        let raw = &source[literal.start..literal.end];
        let body = raw.trim();
        let leading = &raw[..raw.len() - raw.trim_start().len()];
        let trailing = &raw[leading.len() + body.len()..];

        let translated = translated.replace(SENTINEL, newline);
        let replacement = format!("{leading}{}{trailing}", escape(&translated, literal.quote));
        output.replace_range(literal.start..literal.end, &replacement);
        replaced += 1;
    }

    (output, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::filter::AcceptAll;

    fn contents(source: &str) -> Vec<String> {
        scan_literals(source).into_iter().map(|l| l.content).collect()
    }

    #[test]
    fn test_escaped_quote() {
        let source = r#"x = "a\"b""#;
        let literals = scan_literals(source);
        assert_eq!(literals.len(), 1);
        assert_eq!(literals[0].content, "a\"b");
        assert_eq!(literals[0].start, 5);
        assert_eq!(&source[literals[0].start..literals[0].end], r#"a\"b"#);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert!(scan_literals("# \"not a string\"").is_empty());
        assert!(scan_literals("  # 'indented'\n").is_empty());
        assert_eq!(contents("p 'x' # 'trailing'\n"), vec!["x"]);
        assert_eq!(
            contents("=begin\n\"doc\"\n=end\nputs \"code\"\n"),
            vec!["code"]
        );
    }

    #[test]
    fn test_quote_types_do_not_mix() {
        assert_eq!(contents(r#"say "don't" + 'a "b"'"#), vec!["don't", "a \"b\""]);
    }

    #[test]
    fn test_even_backslashes_close() {
        assert_eq!(contents(r#"p "a\\" + "b""#), vec![r"a\\", "b"]);
    }

    #[test]
    fn test_multiline_literal_and_unterminated_tail() {
        let source = "text = \"one\r\ntwo\"\r\n# end\r\nbroken = 'oops\r\n";
        assert_eq!(contents(source), vec![r"one\#two"]);
    }

    #[test]
    fn test_locate_and_rewrite() {
        let source = "a = \"  Hello \"\r\nb = 'x'\r\nc = \"\u{3000}\"\r\nd = \"Hello\"\r\n";
        assert_eq!(locate_script(source, &AcceptAll), vec!["Hello", "x", "Hello"]);

        let table = TranslationTable::from_pairs([("Hello", r#"Say "hi"\#now"#), ("x", "")]);
        let (rewritten, replaced) = rewrite_script(source, &table);
        assert_eq!(replaced, 2);
        assert_eq!(
            rewritten,
            concat!(
                "a = \"  Say \\\"hi\\\"\r\nnow \"\r\n",
                "b = 'x'\r\n",
                "c = \"\u{3000}\"\r\n",
                "d = \"Say \\\"hi\\\"\r\nnow\"\r\n",
            )
        );
    }
}
