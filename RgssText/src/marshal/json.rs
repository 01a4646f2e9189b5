//! JSON view of a decoded object graph, used by the `inspect` command
//!
//! The view is lossy and one-way: it is meant for reading a data file, not
//! for editing it.

use serde_json::{Map, Value as Json, json};

use super::fixed::FixedValue;
use super::value::{RString, Value};

/// Convert a value graph to JSON.
///
/// Records become `{"class": ..., "fields": {...}}` with field names stripped
/// of their `@` prefix. Strings that do not decode as text are shown as a
/// byte array.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(i) => json!(i),
        Value::Bignum(big) => big
            .to_i128()
            .map_or_else(|| json!({ "bignum": big.magnitude }), |v| json!(v.to_string())),
        Value::Float(float) => {
            serde_json::Number::from_f64(float.value).map_or_else(
                || Json::String(String::from_utf8_lossy(float.repr()).into_owned()),
                Json::Number,
            )
        }
        Value::Str(string) => string_json(string),
        Value::Symbol(symbol) => Json::String(format!(":{}", symbol.name())),
        Value::Array(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Hash(entries) => Json::Array(
            entries
                .iter()
                .map(|(key, value)| json!([to_json(key), to_json(value)]))
                .collect(),
        ),
        Value::Object(record) => {
            let fields: Map<String, Json> = record
                .field_names()
                .zip(record.fields.iter())
                .map(|(name, (_, value))| (name.to_string(), to_json(value)))
                .collect();
            json!({ "class": record.class, "fields": fields })
        }
        Value::Fixed(fixed) => fixed_json(fixed),
        Value::UserData(data) => json!({ "class": data.class, "dump": data.bytes }),
        Value::Link(idx) => json!({ "link": idx }),
    }
}

fn string_json(string: &RString) -> Json {
    string
        .to_text()
        .map_or_else(|| json!(string.bytes), |text| Json::String(text.into_owned()))
}

fn fixed_json(fixed: &FixedValue) -> Json {
    let class = fixed.kind().class_name();
    let body = match fixed {
        FixedValue::Table(table) => serde_json::to_value(table),
        FixedValue::Color(rgba) | FixedValue::Tone(rgba) => serde_json::to_value(rgba),
        FixedValue::Rect(rect) => serde_json::to_value(rect),
    };
    json!({ "class": class, "value": body.unwrap_or(Json::Null) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::{Record, Rect};

    #[test]
    fn test_record_to_json() {
        let mut record = Record::new("RPG::Actor");
        record.set("name", Value::from("Eric"));
        record.set("id", Value::Integer(3));
        let rect = Rect {
            x: 0,
            y: 0,
            width: 4,
            height: 2,
        };
        record.set("rect", Value::Fixed(FixedValue::Rect(rect)));

        let json = to_json(&Value::Object(record));
        assert_eq!(json["class"], "RPG::Actor");
        assert_eq!(json["fields"]["name"], "Eric");
        assert_eq!(json["fields"]["id"], 3);
        assert_eq!(json["fields"]["rect"]["class"], "Rect");
        assert_eq!(json["fields"]["rect"]["value"]["width"], 4);
    }

    #[test]
    fn test_undecodable_string_is_bytes() {
        let value = Value::Str(RString::utf8("x"));
        assert_eq!(to_json(&value), json!("x"));
        let mut bad = RString::utf8("");
        bad.bytes = vec![0xff, 0xfe];
        assert_eq!(to_json(&Value::Str(bad)), json!([255, 254]));
    }
}
