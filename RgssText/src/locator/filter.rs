//! Predicates deciding which script literals are worth translating

use std::sync::LazyLock;

use regex::RegexSet;

/// Decides whether an extracted script literal is exported.
///
/// The same filter must be used for every extraction run of a project;
/// write-back only ever touches literals found in the translation table.
pub trait StringFilter {
    fn accept(&self, text: &str) -> bool;
}

impl<F: Fn(&str) -> bool> StringFilter for F {
    fn accept(&self, text: &str) -> bool {
        self(text)
    }
}

/// Exports every non-empty literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl StringFilter for AcceptAll {
    fn accept(&self, _text: &str) -> bool {
        true
    }
}

/// Rejects literals that look like engine internals rather than prose:
/// asset paths, identifiers, format strings, numbers, font names and the
/// like.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptNoiseFilter;

static NOISE: LazyLock<Option<RegexSet>> = LazyLock::new(|| {
    RegexSet::new([
        r"^(?:[#!?$@]|(?:\./)?(?:Graphics|Data|Audio|CG|Movies|Save)/)",
        r"^\d+$",
        r"^(?:true|false)$",
        r"^[wr]b$",
        r"^(?:[A-Za-z0-9\-]*\d[A-Za-z0-9\-]*)$",
        r"^[a-z\-()/ +'&]*$",
        r"^[A-Za-z]+[+-]$",
        r"^[.()+\-:;\[\]^~%&!*/→×？?ｘ％▼|]$",
        r"^Tile.*[A-Z]$",
        r"^[a-zA-Z][a-z]+(?:[A-Z][a-z]*)+$",
        r"^(?:Cancel Action|Invert|End|Individual|Missed File|Bitmap|Audio)$",
        r"\.(?:mp3|ogg|jpg|png|ini)$",
        r"/(?:\d.*)?$",
        r"FILE$",
        r"#\{",
        r"\+?=?=",
        r"[}{_<>]",
        r"r[vx]data",
        r"No such file or directory",
        r"level \*\*",
        r"Courier New|Comic Sans|Lucida|Verdana|Tahoma|Arial",
        r"Player start location|Common event call has exceeded|An error has occurred",
        r"se-|Start Pos|Define it first|Process Skill|Wpn Only|Don't Wait|Clear image|Can Collapse",
    ])
    .ok()
});

impl ScriptNoiseFilter {
    /// Three or more repetitions of a single character, e.g. `---`.
    fn is_repeated_char(text: &str) -> bool {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => text.chars().count() >= 3 && chars.all(|c| c == first),
            None => false,
        }
    }

    /// A backslash that is not `\\`, `\G` or `\#`, i.e. a raw escape sequence.
    fn has_raw_escape(text: &str) -> bool {
        let bytes = text.as_bytes();
        bytes.iter().enumerate().any(|(i, &b)| {
            b == b'\\'
                && (i == 0 || bytes[i - 1] != b'\\')
                && !matches!(bytes.get(i + 1), Some(b'\\' | b'G' | b'#'))
        })
    }
}

impl StringFilter for ScriptNoiseFilter {
    fn accept(&self, text: &str) -> bool {
        if Self::is_repeated_char(text) || Self::has_raw_escape(text) {
            return false;
        }
        !NOISE.as_ref().is_some_and(|set| set.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_rejected() {
        let filter = ScriptNoiseFilter;
        for noise in [
            "Graphics/Pictures/title",
            "12345",
            "true",
            "rb",
            "Window_Base",
            "save01",
            "-----",
            "bgm.ogg",
            "Arial",
            "x == y",
            "Sprite_Character",
            "\\n",
        ] {
            assert!(!filter.accept(noise), "{noise:?} should be rejected");
        }
    }

    #[test]
    fn test_prose_is_kept() {
        let filter = ScriptNoiseFilter;
        for prose in ["Save to which file?", "You won!", "Not enough gold.", "New Game"] {
            assert!(filter.accept(prose), "{prose:?} should be kept");
        }
    }

    #[test]
    fn test_closures_and_accept_all() {
        let short_only = |text: &str| text.len() < 4;
        assert!(short_only.accept("abc"));
        assert!(!short_only.accept("abcd"));
        assert!(AcceptAll.accept("Graphics/x"));
    }
}
