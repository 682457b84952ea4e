use std::collections::HashMap;

// @module: Subtitle file header with key aliases

/// Key/value bag read from (or written to) a format's header block.
///
/// Keys are case-insensitive. An alias table maps alternative spellings onto one canonical key,
/// so `prg` and `program` name the same entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubtitleHeader {
    entries: HashMap<String, String>,
    aliases: HashMap<String, String>,
}

impl SubtitleHeader {
    /// Create an empty header with the default aliases registered
    pub fn new() -> Self {
        let mut header = Self::default();
        header.register_alias("prg", "program");
        header.register_alias("cd track", "cd_track");
        header.register_alias("cdtrack", "cd_track");
        header.register_alias("file path", "filepath");
        header
    }

    /// Make `alias` resolve to `canonical` for every lookup and update
    pub fn register_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(Self::normalize(alias), Self::normalize(canonical));
    }

    /// Set a value, replacing any previous one stored under the same canonical key
    pub fn add(&mut self, key: &str, value: impl Into<String>) {
        let key = self.canonical(key);
        self.entries.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&self.canonical(key)).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let key = self.canonical(key);
        self.entries.remove(&key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&self.canonical(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all values; aliases stay registered
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Canonical keys with their values, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn canonical(&self, key: &str) -> String {
        let key = Self::normalize(key);
        match self.aliases.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    fn normalize(key: &str) -> String {
        key.trim().to_lowercase()
    }
}
