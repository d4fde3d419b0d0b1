//! Highlight synchronizer: maps reported character offsets onto the bound
//! token sequence.
//!
//! Matching is recomputed from scratch for every signal, so out-of-order
//! offsets degrade gracefully instead of corrupting state:
//!
//! 1. **Direct containment**: the token whose `[start, end)` holds the offset.
//! 2. **Sticky fallback**: otherwise the last token starting before the
//!    offset, so the highlight stays on the most recently started word
//!    through whitespace and punctuation gaps.
//! 3. No token starts before the offset: no match.

use readalong_core::Token;
use serde::Serialize;

/// Best-matching token index for `char_index`, or `None`.
pub fn match_token(tokens: &[Token], char_index: usize) -> Option<usize> {
    tokens
        .iter()
        .position(|t| t.contains(char_index))
        .or_else(|| tokens.iter().rposition(|t| t.start_index < char_index))
}

/// Highlight projection owned by the synchronizer.
///
/// `None` plays the role of "no token" / "no offset yet" for both fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightState {
    pub active_token_index: Option<usize>,
    pub last_matched_char_index: Option<usize>,
}

/// Owns the bound token sequence and the highlight derived from it.
#[derive(Debug, Default)]
pub struct HighlightSynchronizer {
    tokens: Vec<Token>,
    state: HighlightState,
}

impl HighlightSynchronizer {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            state: HighlightState::default(),
        }
    }

    /// Bind a new token sequence. Resets the highlight so it can never
    /// point into a stale sequence.
    pub fn rebind(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.state = HighlightState::default();
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub const fn state(&self) -> HighlightState {
        self.state
    }

    pub const fn active_index(&self) -> Option<usize> {
        self.state.active_token_index
    }

    /// The currently highlighted token, if any.
    pub fn active_token(&self) -> Option<&Token> {
        self.state
            .active_token_index
            .and_then(|i| self.tokens.get(i))
    }

    /// Apply a native boundary offset. Returns the matched index.
    ///
    /// The offset is recorded even when nothing matches. An empty sequence
    /// never matches.
    pub fn apply_offset(&mut self, char_index: usize) -> Option<usize> {
        self.state.last_matched_char_index = Some(char_index);
        let matched = match_token(&self.tokens, char_index);
        if matched.is_some() {
            self.state.active_token_index = matched;
        }
        matched
    }

    /// Apply an estimated index. Never regresses and never leaves the
    /// bound sequence. Returns `true` when the highlight moved.
    pub fn advance_to(&mut self, index: usize) -> bool {
        let Some(last) = self.tokens.len().checked_sub(1) else {
            return false;
        };
        let index = index.min(last);
        if self.state.active_token_index.is_some_and(|current| current >= index) {
            return false;
        }
        self.state.active_token_index = Some(index);
        true
    }
}
