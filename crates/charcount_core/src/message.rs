use std::fmt;

use crate::CountMode;

/// Noun used in feedback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Character,
    Word,
}

impl Unit {
    pub fn noun(self, quantity: u64) -> &'static str {
        match (self, quantity == 1) {
            (Unit::Character, true) => "character",
            (Unit::Character, false) => "characters",
            (Unit::Word, true) => "word",
            (Unit::Word, false) => "words",
        }
    }
}

impl From<CountMode> for Unit {
    fn from(mode: CountMode) -> Self {
        match mode {
            CountMode::Characters => Unit::Character,
            CountMode::Words => Unit::Word,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub is_over_limit: bool,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Formats the remaining-count message. The noun is pluralized on the
/// magnitude of `remaining`, so zero reads "0 characters".
pub fn format(remaining: i64, unit: Unit) -> Message {
    let magnitude = remaining.unsigned_abs();
    let noun = unit.noun(magnitude);
    let text = if remaining < 0 {
        format!("You have {magnitude} {noun} too many")
    } else {
        format!("You have {magnitude} {noun} remaining")
    };
    Message {
        text,
        is_over_limit: remaining < 0,
    }
}

/// Static description of a bounded field, e.g. "You can enter up to 10 characters".
pub fn limit_hint(limit: u32, unit: Unit) -> String {
    format!("You can enter up to {limit} {}", unit.noun(u64::from(limit)))
}
