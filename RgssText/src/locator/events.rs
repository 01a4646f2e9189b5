//! Event command lists
//!
//! Consecutive dialogue lines (codes 401/405) are coalesced into one
//! translation unit joined with [`SENTINEL`]. The unit remembers each
//! physical line's path so a translation can be split back over them.

use super::path::ValuePath;
use super::quirks::GameQuirks;
use super::{Located, SENTINEL, Target, normalize_text};
use crate::marshal::Value;

/// Show Text continuation line
pub const CODE_DIALOGUE: i64 = 401;
/// Show Scrolling Text line
pub const CODE_SCROLL_TEXT: i64 = 405;
/// Show Choices (`parameters[0]` is the choice array)
pub const CODE_SHOW_CHOICES: i64 = 102;
/// When [choice] branch (`parameters[1]` is the label)
pub const CODE_WHEN_CHOICE: i64 = 402;
/// Script/plugin text (`parameters[0]`)
pub const CODE_SCRIPT_TEXT: i64 = 356;

/// Continuation codes coalesced in map event pages
pub const MAP_CONTINUATION: &[i64] = &[CODE_DIALOGUE];
/// Continuation codes coalesced in common events and troops
pub const CONTAINER_CONTINUATION: &[i64] = &[CODE_DIALOGUE, CODE_SCROLL_TEXT];

#[derive(Default)]
struct Pending {
    lines: Vec<String>,
    slots: Vec<ValuePath>,
}

impl Pending {
    fn push(&mut self, line: String, slot: ValuePath) {
        self.lines.push(line);
        self.slots.push(slot);
    }

    fn flush(&mut self, quirks: GameQuirks, out: &mut Vec<Located>) {
        if self.lines.is_empty() {
            return;
        }
        let joined = self.lines.join(SENTINEL);
        let slots = std::mem::take(&mut self.slots);
        self.lines.clear();

        let (prefix, body) = quirks.split_dialogue_prefix(joined.trim());
        if body.is_empty() {
            return;
        }
        out.push(Located {
            text: body.to_string(),
            target: Target::Dialogue {
                slots,
                prefix: prefix.to_string(),
            },
        });
    }
}

fn leaf(value: Option<&Value>, path: ValuePath, out: &mut Vec<Located>) {
    if let Some(text) = value.and_then(Value::as_text) {
        let text = normalize_text(&text);
        if !text.is_empty() {
            out.push(Located {
                text,
                target: Target::Leaf(path),
            });
        }
    }
}

/// Locate the text of one event command list.
///
/// `list_path` is the path of `list` inside the decoded file. A dialogue
/// run still open when the list ends is dropped; engine lists always end
/// with a terminating code 0 command.
pub fn locate_commands(
    list: &Value,
    list_path: &ValuePath,
    continuation: &[i64],
    quirks: GameQuirks,
    out: &mut Vec<Located>,
) {
    let Some(commands) = list.as_array() else {
        return;
    };

    let mut pending = Pending::default();
    for (i, command) in commands.iter().enumerate() {
        let code = command.field("code").and_then(Value::as_int);
        let params = command.field("parameters").and_then(Value::as_array);
        let params_path = list_path.index(i).field("parameters");

        if let (Some(code), Some(params)) = (code, params) {
            if continuation.contains(&code) {
                if let Some(line) = params.first().and_then(Value::as_text) {
                    if !line.is_empty() {
                        let line = line.replace("\r\n", SENTINEL).replace('\n', SENTINEL);
                        pending.push(line, params_path.index(0));
                    }
                }
                continue;
            }

            pending.flush(quirks, out);
            match code {
                CODE_SHOW_CHOICES => {
                    if let Some(choices) = params.first().and_then(Value::as_array) {
                        let choices_path = params_path.index(0);
                        for (c, choice) in choices.iter().enumerate() {
                            leaf(Some(choice), choices_path.index(c), out);
                        }
                    }
                }
                CODE_WHEN_CHOICE => leaf(params.get(1), params_path.index(1), out),
                CODE_SCRIPT_TEXT => leaf(params.first(), params_path.index(0), out),
                _ => {}
            }
        } else {
            pending.flush(quirks, out);
        }
    }
}

/// Distribute a translated dialogue unit over `slots` physical lines.
///
/// Line `i` goes to slot `i`; slots without a line become empty, and
/// surplus lines are joined with newlines onto the last slot.
pub fn split_translation(translated: &str, slots: usize) -> Vec<String> {
    let lines: Vec<&str> = translated.split(SENTINEL).collect();
    (0..slots)
        .map(|i| {
            if i + 1 == slots && lines.len() > slots {
                lines[i..].join("\n")
            } else {
                lines.get(i).copied().unwrap_or_default().to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::quirks::GameVariant;
    use crate::marshal::Record;

    fn command(code: i64, params: Vec<Value>) -> Value {
        let mut record = Record::new("RPG::EventCommand");
        record.set("code", Value::Integer(code));
        record.set("indent", Value::Integer(0));
        record.set("parameters", Value::Array(params));
        record.into()
    }

    fn texts(located: &[Located]) -> Vec<&str> {
        located.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_dialogue_is_coalesced() {
        let list = Value::Array(vec![
            command(101, vec![Value::from(""), Value::Integer(0)]),
            command(401, vec![Value::from("Hello")]),
            command(401, vec![Value::from("world")]),
            command(0, vec![]),
        ]);
        let mut out = Vec::new();
        locate_commands(
            &list,
            &ValuePath::root(),
            MAP_CONTINUATION,
            GameQuirks::default(),
            &mut out,
        );

        assert_eq!(texts(&out), vec![r"Hello\#world"]);
        let Target::Dialogue { slots, prefix } = &out[0].target else {
            panic!("expected a dialogue unit");
        };
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].to_string(), "[2].parameters[0]");
        assert!(prefix.is_empty());
    }

    #[test]
    fn test_choices_labels_and_script_text() {
        let list = Value::Array(vec![
            command(
                102,
                vec![
                    Value::Array(vec![Value::from(" Yes "), Value::from("No")]),
                    Value::Integer(2),
                ],
            ),
            command(402, vec![Value::Integer(0), Value::from("Yes")]),
            command(356, vec![Value::from("line one\r\nline two")]),
            command(0, vec![]),
        ]);
        let mut out = Vec::new();
        locate_commands(
            &list,
            &ValuePath::root(),
            MAP_CONTINUATION,
            GameQuirks::default(),
            &mut out,
        );
        assert_eq!(texts(&out), vec!["Yes", "No", "Yes", r"line one\#line two"]);
    }

    #[test]
    fn test_scroll_text_only_in_containers() {
        let list = Value::Array(vec![
            command(405, vec![Value::from("Credits")]),
            command(0, vec![]),
        ]);
        let mut map_out = Vec::new();
        locate_commands(
            &list,
            &ValuePath::root(),
            MAP_CONTINUATION,
            GameQuirks::default(),
            &mut map_out,
        );
        assert!(map_out.is_empty());

        let mut container_out = Vec::new();
        locate_commands(
            &list,
            &ValuePath::root(),
            CONTAINER_CONTINUATION,
            GameQuirks::default(),
            &mut container_out,
        );
        assert_eq!(texts(&container_out), vec!["Credits"]);
    }

    #[test]
    fn test_unterminated_run_is_dropped() {
        let list = Value::Array(vec![command(401, vec![Value::from("dangling")])]);
        let mut out = Vec::new();
        locate_commands(
            &list,
            &ValuePath::root(),
            MAP_CONTINUATION,
            GameQuirks::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_lisa_prefix_is_kept_aside() {
        let list = Value::Array(vec![
            command(401, vec![Value::from(r"\et[3]Brad...")]),
            command(0, vec![]),
        ]);
        let mut out = Vec::new();
        let quirks = GameQuirks::new(GameVariant::Lisa);
        locate_commands(&list, &ValuePath::root(), MAP_CONTINUATION, quirks, &mut out);
        assert_eq!(texts(&out), vec!["Brad..."]);
        assert!(matches!(&out[0].target, Target::Dialogue { prefix, .. } if prefix == r"\et[3]"));
    }

    #[test]
    fn test_split_translation() {
        assert_eq!(split_translation(r"Bonjour\#le\#monde", 2), vec!["Bonjour", "le\nmonde"]);
        assert_eq!(split_translation(r"Bonjour\#monde", 2), vec!["Bonjour", "monde"]);
        assert_eq!(split_translation("Salut", 3), vec!["Salut", "", ""]);
        assert_eq!(split_translation(r"a\#b\#c", 1), vec!["a\nb\nc"]);
        assert!(split_translation("x", 0).is_empty());
    }
}
