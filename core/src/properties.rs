//! Ordered set of configuration entries

#[cfg(feature = "fileio")]
use crate::{
    error::{Error, Result},
    util::format::{format_properties, parse_properties},
};
#[cfg(feature = "fileio")]
use std::path::Path;

/// Ordered key/value configuration.
/// Insertion order is kept so that written files are stable; putting an
/// existing key replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertySet {
    entries: Vec<(String, String)>,
}

impl PropertySet {
    pub fn new() -> Self {
        PropertySet {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns value for the key, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces the value for `key`
    pub fn put<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes the entry, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Loads a property file
    #[cfg(feature = "fileio")]
    pub async fn read_file<P: AsRef<Path>>(path: P) -> Result<PropertySet, Error> {
        let text = tokio::fs::read_to_string(path).await?;
        parse_properties(&text)
    }

    /// Writes the set as a property file, replacing any existing file
    #[cfg(feature = "fileio")]
    pub async fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        use tokio::io::AsyncWriteExt;

        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(format_properties(self).as_bytes()).await?;
        file.sync_all().await?; // flush file and metadata to disk before returning
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for (k, v) in iter {
            set.put(k, v);
        }
        set
    }
}

impl IntoIterator for PropertySet {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
