//! Word tokens and the whitespace tokenizer.
//!
//! A token is a maximal run of non-whitespace characters, so trailing
//! punctuation stays attached (`"sat."` is one token). Spans are byte
//! offsets into the UTF-8 source text, half-open `[start_index, end_index)`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+").expect("static regex is valid"));

static NOT_SPOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s']").expect("static regex is valid"));

/// One addressable word of the source text.
///
/// Serialized `startIndex`/`endIndex` are UTF-8 byte offsets. UI layers that
/// index strings in UTF-16 code units (browsers, most native text views)
/// should use [`Token::utf16_span`] instead of the raw fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Stable identifier derived from `start_index` (`"word-{start}"`).
    pub id: String,

    /// Raw slice of the source, including trailing punctuation.
    pub text: String,

    /// Word characters and apostrophes only; what click-to-pronounce speaks.
    pub clean_text: String,

    /// Byte offset of the first character.
    pub start_index: usize,

    /// Byte offset one past the last character.
    pub end_index: usize,
}

impl Token {
    /// Build a token for the slice `text` found at `start_index`.
    pub fn new(text: &str, start_index: usize) -> Self {
        Self {
            id: format!("word-{start_index}"),
            text: text.to_string(),
            clean_text: NOT_SPOKEN.replace_all(text, "").into_owned(),
            start_index,
            end_index: start_index + text.len(),
        }
    }

    /// The token's `[start, end)` span in UTF-16 code units of `source`.
    ///
    /// `source` must be the text the token was cut from.
    pub fn utf16_span(&self, source: &str) -> (usize, usize) {
        let start = source
            .get(..self.start_index)
            .map_or(0, |prefix| prefix.encode_utf16().count());
        (start, start + self.text.encode_utf16().count())
    }

    /// Whether `offset` falls inside `[start_index, end_index)`.
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.start_index && offset < self.end_index
    }
}

/// Split `text` into its ordered word tokens.
///
/// The sequence must be regenerated whenever the source text changes.
pub fn tokenize(text: &str) -> Vec<Token> {
    WORD_RUN
        .find_iter(text)
        .map(|m| Token::new(m.as_str(), m.start()))
        .collect()
}
