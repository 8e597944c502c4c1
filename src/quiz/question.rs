use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

use crate::quiz::options::Direction;

/// A term and its reading. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "kanji")]
    pub prompt: String,
    #[serde(alias = "reading")]
    pub answer: String,
}

impl Question {
    pub fn new(prompt: &str, answer: &str) -> Self {
        Self {
            prompt: nfc(prompt),
            answer: nfc(answer),
        }
    }

    /// Re-normalize after deserialization so decomposed kana compare equal.
    pub fn normalized(self) -> Self {
        Self::new(&self.prompt, &self.answer)
    }

    /// Text that falls down the lane.
    pub fn shown(&self, direction: Direction) -> &str {
        match direction {
            Direction::WordGiven => &self.prompt,
            Direction::ReadingGiven => &self.answer,
        }
    }

    /// Text of the correct choice.
    pub fn label(&self, direction: Direction) -> &str {
        match direction {
            Direction::WordGiven => &self.answer,
            Direction::ReadingGiven => &self.prompt,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.prompt.trim().is_empty() || self.answer.trim().is_empty()
    }
}

fn nfc(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text.trim())
        .into_owned()
}

/// A question plus its solved flag for the current round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayEntry {
    pub question: Question,
    pub solved: bool,
}

impl PlayEntry {
    pub fn new(question: Question) -> Self {
        Self {
            question,
            solved: false,
        }
    }
}
