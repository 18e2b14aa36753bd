use serde::{Deserialize, Serialize};

/// What a bounded field counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    #[default]
    Characters,
    Words,
}

pub trait TextCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Counts UTF-16 code units, so astral-plane characters count as two.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharacterCounter;

impl TextCounter for CharacterCounter {
    fn count(&self, text: &str) -> usize {
        text.encode_utf16().count()
    }
}

/// Counts maximal runs of non-whitespace characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordCounter;

impl TextCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.split(is_separator)
            .filter(|word| !word.is_empty())
            .count()
    }
}

/// Characters matched by `\s` in ECMAScript regular expressions. This is
/// Unicode `White_Space` without U+0085, plus U+FEFF.
fn is_separator(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'..='\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

pub fn count(text: &str, mode: CountMode) -> usize {
    match mode {
        CountMode::Characters => CharacterCounter.count(text),
        CountMode::Words => WordCounter.count(text),
    }
}
