use super::types::Key;

/// Edge-triggered input queued between two frame flushes.
///
/// Appends are constant time (amortized). Key transitions collapse to the
/// latest state per key, ordered by the first time the key changed.
#[derive(Debug, Default)]
pub struct PendingInput {
    chars: Vec<char>,
    keys: Vec<(Key, bool)>,
}

impl PendingInput {
    pub fn push_char(&mut self, c: char) {
        self.chars.push(c);
    }

    pub fn push_key(&mut self, key: Key, pressed: bool) {
        match self.keys.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = pressed,
            None => self.keys.push((key, pressed)),
        }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn keys(&self) -> &[(Key, bool)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty() && self.keys.is_empty()
    }

    /// Moves queued characters and key states out, leaving the queue empty.
    pub fn drain(&mut self) -> (Vec<char>, Vec<(Key, bool)>) {
        (std::mem::take(&mut self.chars), std::mem::take(&mut self.keys))
    }
}
