//! Per-game parsing rules

use std::sync::LazyLock;

use regex::Regex;

use crate::marshal::Value;

/// Games that need special handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameVariant {
    #[default]
    Generic,
    /// LISA: The Painful and its spin-offs
    Lisa,
}

impl GameVariant {
    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Lisa => "lisa",
        }
    }
}

impl std::str::FromStr for GameVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "none" => Ok(Self::Generic),
            "lisa" => Ok(Self::Lisa),
            other => Err(format!("unknown game variant '{other}'")),
        }
    }
}

/// Parsing rules threaded through the locator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameQuirks {
    pub variant: GameVariant,
}

/// `\et[N]` or `\nbt` control prefix on LISA dialogue lines
static LISA_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:\\et\[[0-9]+\]|\\nbt)").ok());

static LISA_TAG_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^<.*>\.?$").ok());

impl GameQuirks {
    #[must_use]
    pub fn new(variant: GameVariant) -> Self {
        Self { variant }
    }

    /// Pick quirks from the decoded `System` record's `game_title`.
    pub fn detect(system: &Value) -> Self {
        let title = system
            .field("game_title")
            .and_then(Value::as_text)
            .unwrap_or_default();
        Self::from_title(&title)
    }

    pub fn from_title(title: &str) -> Self {
        let variant = if title.to_lowercase().contains("lisa") {
            GameVariant::Lisa
        } else {
            GameVariant::Generic
        };
        Self { variant }
    }

    /// Split a dialogue string into its control prefix and the text to translate.
    ///
    /// The prefix is empty unless the game uses one.
    pub fn split_dialogue_prefix<'a>(&self, text: &'a str) -> (&'a str, &'a str) {
        match self.variant {
            GameVariant::Lisa => match LISA_PREFIX.as_ref().and_then(|re| re.find(text)) {
                Some(m) => text.split_at(m.end()),
                None => ("", text),
            },
            GameVariant::Generic => ("", text),
        }
    }

    /// Whether a multi-line name/description/note value should be exported.
    ///
    /// `lines` are the value's lines after newline splitting.
    pub fn accepts_multiline<'a>(&self, mut lines: impl Iterator<Item = &'a str>) -> bool {
        match self.variant {
            GameVariant::Lisa => lines.all(|line| {
                line.is_empty() || LISA_TAG_LINE.as_ref().is_some_and(|re| re.is_match(line))
            }),
            GameVariant::Generic => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::Record;

    #[test]
    fn test_detect_from_system() {
        let mut system = Record::new("RPG::System");
        system.set("game_title", Value::from("LISA: The Joyful"));
        assert_eq!(GameQuirks::detect(&system.into()).variant, GameVariant::Lisa);

        let mut other = Record::new("RPG::System");
        other.set("game_title", Value::from("Some Quest"));
        assert_eq!(GameQuirks::detect(&other.into()).variant, GameVariant::Generic);
    }

    #[test]
    fn test_lisa_prefix() {
        let lisa = GameQuirks::new(GameVariant::Lisa);
        assert_eq!(lisa.split_dialogue_prefix(r"\et[12]Hello"), (r"\et[12]", "Hello"));
        assert_eq!(lisa.split_dialogue_prefix(r"\nbtHey"), (r"\nbt", "Hey"));
        assert_eq!(lisa.split_dialogue_prefix("Plain"), ("", "Plain"));

        let generic = GameQuirks::default();
        assert_eq!(generic.split_dialogue_prefix(r"\nbtHey"), ("", r"\nbtHey"));
    }

    #[test]
    fn test_lisa_multiline() {
        let lisa = GameQuirks::new(GameVariant::Lisa);
        assert!(lisa.accepts_multiline(["<tag>", "", "<other>."].into_iter()));
        assert!(!lisa.accepts_multiline(["<tag>", "free text"].into_iter()));
        assert!(GameQuirks::default().accepts_multiline(["free", "text"].into_iter()));
    }
}
