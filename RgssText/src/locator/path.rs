//! Handles addressing a single leaf inside a decoded graph

use std::fmt;

use crate::error::{Error, Result};
use crate::marshal::Value;

/// One step from a value to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Instance variable of a record, without the `@`.
    Field(String),
    /// Element of an array.
    Index(usize),
    /// Value of the n-th entry of a hash, in insertion order.
    HashValue(usize),
}

/// A route from the root of a graph to one of its leaves.
///
/// Paths stay valid across mutations as long as only leaves are replaced,
/// which is all the locator ever does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ValuePath {
    segments: Vec<PathSegment>,
}

impl ValuePath {
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Self {
        self.child(PathSegment::Field(name.to_string()))
    }

    #[must_use]
    pub fn index(&self, idx: usize) -> Self {
        self.child(PathSegment::Index(idx))
    }

    #[must_use]
    pub fn hash_value(&self, idx: usize) -> Self {
        self.child(PathSegment::HashValue(idx))
    }

    fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Follow the path from `root`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`] if a step does not exist.
    pub fn resolve<'a>(&self, root: &'a Value) -> Result<&'a Value> {
        let mut current = root;
        for (depth, segment) in self.segments.iter().enumerate() {
            let next = match (segment, current) {
                (PathSegment::Field(name), Value::Object(record)) => record.get(name),
                (PathSegment::Index(idx), Value::Array(items)) => items.get(*idx),
                (PathSegment::HashValue(idx), Value::Hash(entries)) => {
                    entries.get(*idx).map(|(_, value)| value)
                }
                _ => None,
            };
            current = next.ok_or_else(|| self.broken_at(depth))?;
        }
        Ok(current)
    }

    /// Mutable variant of [`ValuePath::resolve`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`] if a step does not exist.
    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Value> {
        let mut current = root;
        for (depth, segment) in self.segments.iter().enumerate() {
            let next = match (segment, current) {
                (PathSegment::Field(name), Value::Object(record)) => record.get_mut(name),
                (PathSegment::Index(idx), Value::Array(items)) => items.get_mut(*idx),
                (PathSegment::HashValue(idx), Value::Hash(entries)) => {
                    entries.get_mut(*idx).map(|(_, value)| value)
                }
                _ => None,
            };
            current = match next {
                Some(value) => value,
                None => return Err(self.broken_at(depth)),
            };
        }
        Ok(current)
    }

    /// Replace the text of the string at this path.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`] if the path does not lead to a string.
    pub fn set_text(&self, root: &mut Value, text: &str) -> Result<()> {
        let target = self.resolve_mut(root)?;
        match target.as_rstring_mut() {
            Some(string) => {
                string.set_text(text);
                Ok(())
            }
            None => Err(Error::InvalidPath(format!(
                "{self} is a {}, not a string",
                target.kind()
            ))),
        }
    }

    fn broken_at(&self, depth: usize) -> Error {
        let prefix = Self {
            segments: self.segments[..=depth].to_vec(),
        };
        Error::InvalidPath(format!("{prefix} does not exist (full path {self})"))
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "$");
        }
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                PathSegment::HashValue(idx) => write!(f, "{{{idx}}}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::Record;

    fn sample() -> Value {
        let mut command = Record::new("RPG::EventCommand");
        command.set("code", Value::Integer(401));
        command.set("parameters", Value::Array(vec![Value::from("Hello")]));
        Value::Hash(vec![(
            Value::Integer(1),
            Value::Array(vec![Value::Nil, command.into()]),
        )])
    }

    #[test]
    fn test_resolve_and_set() {
        let mut graph = sample();
        let path = ValuePath::root()
            .hash_value(0)
            .index(1)
            .field("parameters")
            .index(0);
        assert_eq!(path.to_string(), "{0}[1].parameters[0]");
        assert_eq!(path.resolve(&graph).unwrap().as_text().as_deref(), Some("Hello"));

        path.set_text(&mut graph, "Bonjour").unwrap();
        assert_eq!(path.resolve(&graph).unwrap().as_text().as_deref(), Some("Bonjour"));
    }

    #[test]
    fn test_invalid_paths() {
        let mut graph = sample();
        let missing = ValuePath::root().hash_value(0).index(7);
        assert!(matches!(missing.resolve(&graph), Err(Error::InvalidPath(_))));

        let not_string = ValuePath::root().hash_value(0).index(1).field("code");
        assert!(matches!(
            not_string.set_text(&mut graph, "x"),
            Err(Error::InvalidPath(_))
        ));
    }
}
