//! Session-scoped key/value storage.
//!
//! Lives exactly as long as the process.  The only key in use is the
//! first-visit tutorial flag.

use std::collections::HashMap;

pub const TUTORIAL_SEEN_KEY: &str = "tarot-tutorial-seen";

#[derive(Clone, Debug, Default)]
pub struct SessionStorage {
    entries: HashMap<String, String>,
}

impl SessionStorage {
    pub fn new() -> Self { SessionStorage::default() }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn tutorial_seen(&self) -> bool {
        self.get(TUTORIAL_SEEN_KEY).is_some()
    }

    pub fn mark_tutorial_seen(&mut self) {
        self.set(TUTORIAL_SEEN_KEY, "true");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_unset() {
        let mut s = SessionStorage::new();
        assert!(!s.tutorial_seen());
        s.mark_tutorial_seen();
        assert!(s.tutorial_seen());
        assert_eq!(s.get(TUTORIAL_SEEN_KEY), Some("true"));
    }
}
