use serde::Serialize;

use super::layout::MANDATORY_LEN;

/// Characters accepted so far, typed and auto-filled alike.
///
/// Offsets below the remark block only ever hold ASCII, so byte offsets and
/// character offsets agree there; remarks may contain any printable text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputBuffer {
    text: String,
    len: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Long enough for the decoder.
    pub fn is_complete(&self) -> bool {
        self.len >= MANDATORY_LEN
    }

    pub(crate) fn push(&mut self, ch: char) {
        self.text.push(ch);
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<char> {
        let ch = self.text.pop()?;
        self.len -= 1;
        Some(ch)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.len = 0;
    }

    /// Keep the first `len` characters.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let cut = self
            .text
            .char_indices()
            .nth(len)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len());
        self.text.truncate(cut);
        self.len = len;
    }

    /// State after a rejected two-digit field: the keystroke that completed
    /// the field counts as entered, then `dropped` characters are removed.
    pub fn after_backtrack(&self, dropped: usize) -> Self {
        let mut next = self.clone();
        next.truncate((self.len + 1).saturating_sub(dropped));
        next
    }
}

impl std::fmt::Display for InputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
