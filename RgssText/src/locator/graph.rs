//! Graph mode: which fields of which data files carry text

use super::events::{self, CONTAINER_CONTINUATION, MAP_CONTINUATION};
use super::path::ValuePath;
use super::quirks::GameQuirks;
use super::{Located, SENTINEL, Target, normalize_text};
use crate::marshal::{Record, Value};

/// Record fields exported from database files (`Actors`, `Items`, ...).
pub const RECORD_FIELDS: &[&str] = &["name", "nickname", "description", "note"];

/// `System` arrays of plain strings.
pub const SYSTEM_ARRAYS: &[&str] = &["elements", "skill_types", "weapon_types", "armor_types"];

/// Text found in one `Map###` file.
#[derive(Debug, Default)]
pub struct MapStrings {
    /// The map's display name.
    pub names: Vec<Located>,
    /// Event dialogue, choices and script text.
    pub events: Vec<Located>,
}

fn push_leaf(value: &Value, path: ValuePath, out: &mut Vec<Located>) {
    if let Some(text) = value.as_text() {
        let text = normalize_text(&text);
        if !text.is_empty() {
            out.push(Located {
                text,
                target: Target::Leaf(path),
            });
        }
    }
}

fn push_string_array(value: &Value, path: &ValuePath, out: &mut Vec<Located>) {
    if let Some(items) = value.as_array() {
        for (i, item) in items.iter().enumerate() {
            push_leaf(item, path.index(i), out);
        }
    }
}

/// Locate the display name and event text of a map.
pub fn locate_map(map: &Value, quirks: GameQuirks) -> MapStrings {
    let mut strings = MapStrings::default();
    let root = ValuePath::root();

    if let Some(name) = map.field("display_name") {
        push_leaf(name, root.field("display_name"), &mut strings.names);
    }

    let Some(events) = map.field("events").and_then(Value::as_hash) else {
        return strings;
    };
    for (e, (_, event)) in events.iter().enumerate() {
        let Some(pages) = event.field("pages").and_then(Value::as_array) else {
            continue;
        };
        let pages_path = root.field("events").hash_value(e).field("pages");
        for (p, page) in pages.iter().enumerate() {
            if let Some(list) = page.field("list") {
                let list_path = pages_path.index(p).field("list");
                events::locate_commands(
                    list,
                    &list_path,
                    MAP_CONTINUATION,
                    quirks,
                    &mut strings.events,
                );
            }
        }
    }
    strings
}

/// Locate `name`/`nickname`/`description`/`note` of every record in a
/// database array.
///
/// Multi-line values are subject to [`GameQuirks::accepts_multiline`].
pub fn locate_records(records: &Value, quirks: GameQuirks) -> Vec<Located> {
    let mut out = Vec::new();
    let Some(items) = records.as_array() else {
        return out;
    };

    for (i, record) in items.iter().enumerate() {
        let Some(record) = record.as_record() else {
            continue;
        };
        for field in RECORD_FIELDS {
            let Some(text) = record.get(field).and_then(Value::as_text) else {
                continue;
            };
            let text = normalize_text(&text);
            if text.is_empty() {
                continue;
            }
            if text.contains(SENTINEL) && !quirks.accepts_multiline(text.split(SENTINEL)) {
                continue;
            }
            out.push(Located {
                text,
                target: Target::Leaf(ValuePath::root().index(i).field(field)),
            });
        }
    }
    out
}

/// Locate event text in `CommonEvents` (one `list` per event) or `Troops`
/// (a `list` per battle page).
pub fn locate_event_container(container: &Value, quirks: GameQuirks) -> Vec<Located> {
    let mut out = Vec::new();
    let Some(items) = container.as_array() else {
        return out;
    };

    for (i, item) in items.iter().enumerate() {
        let item_path = ValuePath::root().index(i);
        if let Some(pages) = item.field("pages").and_then(Value::as_array) {
            for (p, page) in pages.iter().enumerate() {
                if let Some(list) = page.field("list") {
                    let list_path = item_path.field("pages").index(p).field("list");
                    let continuation = CONTAINER_CONTINUATION;
                    events::locate_commands(list, &list_path, continuation, quirks, &mut out);
                }
            }
        } else if let Some(list) = item.field("list") {
            let list_path = item_path.field("list");
            events::locate_commands(list, &list_path, CONTAINER_CONTINUATION, quirks, &mut out);
        }
    }
    out
}

/// Name of the vocabulary record: `terms` on VX/Ace, `words` on XP.
pub fn terms_field(system: &Record) -> Option<&'static str> {
    ["terms", "words"]
        .into_iter()
        .find(|name| system.get(name).is_some_and(|v| v.as_record().is_some()))
}

/// Locate the vocabulary of a `System` file.
///
/// The game title is always the last unit. `title` overrides the text
/// used for it (the `Game.ini` title when one exists); its target is still
/// the record's `game_title` field.
pub fn locate_system(system: &Value, title: Option<&str>) -> Vec<Located> {
    let mut out = Vec::new();
    let Some(record) = system.as_record() else {
        return out;
    };
    let root = ValuePath::root();

    for name in SYSTEM_ARRAYS {
        if let Some(array) = record.get(name) {
            push_string_array(array, &root.field(name), &mut out);
        }
    }

    if let Some(unit) = record.get("currency_unit") {
        push_leaf(unit, root.field("currency_unit"), &mut out);
    }

    if let Some(terms_name) = terms_field(record) {
        let terms_path = root.field(terms_name);
        if let Some(terms) = record.get(terms_name).and_then(Value::as_record) {
            for (name, value) in terms.field_names().zip(terms.fields.iter().map(|(_, v)| v)) {
                let path = terms_path.field(name);
                match value {
                    Value::Array(_) => push_string_array(value, &path, &mut out),
                    _ => push_leaf(value, path, &mut out),
                }
            }
        }
    }

    let title_path = root.field("game_title");
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => out.push(Located {
            text: title.to_string(),
            target: Target::Leaf(title_path),
        }),
        None => {
            if let Some(game_title) = record.get("game_title") {
                push_leaf(game_title, title_path, &mut out);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::quirks::GameVariant;
    use crate::locator::unique_texts;

    fn actor(name: &str, note: &str) -> Value {
        let mut record = Record::new("RPG::Actor");
        record.set("id", Value::Integer(1));
        record.set("name", Value::from(name));
        record.set("nickname", Value::from(""));
        record.set("note", Value::from(note));
        record.into()
    }

    #[test]
    fn test_records_dedup_keeps_first_position() {
        let actors = Value::Array(vec![
            Value::Nil,
            actor("Eric", ""),
            actor("Alex", ""),
            actor("Eric", ""),
        ]);
        let located = locate_records(&actors, GameQuirks::default());
        assert_eq!(located.len(), 3);
        assert_eq!(unique_texts(&located), vec!["Eric", "Alex"]);
        assert_eq!(
            located[0].target,
            Target::Leaf(ValuePath::root().index(1).field("name"))
        );
    }

    #[test]
    fn test_lisa_multiline_notes() {
        let actors = Value::Array(vec![actor("A", "<tag>\n<other>."), actor("B", "free\ntext")]);
        let generic = locate_records(&actors, GameQuirks::default());
        assert_eq!(unique_texts(&generic), vec!["A", r"<tag>\#<other>.", "B", r"free\#text"]);

        let lisa = locate_records(&actors, GameQuirks::new(GameVariant::Lisa));
        assert_eq!(unique_texts(&lisa), vec!["A", r"<tag>\#<other>.", "B"]);
    }

    #[test]
    fn test_system_vocabulary() {
        let mut words = Record::new("RPG::System::Words");
        words.set("gold", Value::from("G"));
        words.set("hp", Value::from("HP"));
        let mut system = Record::new("RPG::System");
        system.set("elements", Value::Array(vec![Value::from(""), Value::from("Fire")]));
        system.set("words", words.into());
        system.set("game_title", Value::from("Quest"));
        let system = Value::Object(system);

        let located = locate_system(&system, None);
        assert_eq!(unique_texts(&located), vec!["Fire", "G", "HP", "Quest"]);
        assert_eq!(
            located[1].target,
            Target::Leaf(ValuePath::root().field("words").field("gold"))
        );

        let from_ini = locate_system(&system, Some(" Quest Deluxe "));
        assert_eq!(from_ini.last().map(|l| l.text.as_str()), Some("Quest Deluxe"));
    }

    #[test]
    fn test_common_events_and_troops() {
        let mut line = Record::new("RPG::EventCommand");
        line.set("code", Value::Integer(401));
        line.set("parameters", Value::Array(vec![Value::from("Hi")]));
        let mut end = Record::new("RPG::EventCommand");
        end.set("code", Value::Integer(0));
        end.set("parameters", Value::Array(vec![]));
        let list = Value::Array(vec![line.into(), end.into()]);

        let mut common = Record::new("RPG::CommonEvent");
        common.set("list", list.clone());
        let mut page = Record::new("RPG::Troop::Page");
        page.set("list", list);
        let mut troop = Record::new("RPG::Troop");
        troop.set("pages", Value::Array(vec![page.into()]));

        let located = locate_event_container(
            &Value::Array(vec![Value::Nil, common.into(), troop.into()]),
            GameQuirks::default(),
        );
        assert_eq!(located.len(), 2);
        let Target::Dialogue { slots, .. } = &located[1].target else {
            panic!("expected dialogue");
        };
        assert_eq!(slots[0].to_string(), "[2].pages[0].list[0].parameters[0]");
    }
}
