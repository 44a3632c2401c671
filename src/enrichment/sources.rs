use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::SOURCE_URL_DELIMITER;

/// Set of URLs a row's data was taken from.
///
/// Empty strings are never stored and duplicates collapse on exact (case-sensitive) match.
/// Iteration order is lexical so the joined cell value is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceUrls(BTreeSet<String>);

impl SourceUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a cell value previously produced by [`SourceUrls::to_delimited`].
    pub fn from_delimited(cell: &str) -> Self {
        let mut urls = Self::new();
        urls.extend(cell.split(SOURCE_URL_DELIMITER).map(str::to_string));
        urls
    }

    /// Returns true if the URL was newly added.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if url.is_empty() {
            return false;
        }
        self.0.insert(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_delimited(&self) -> String {
        self.iter().collect::<Vec<_>>().join(SOURCE_URL_DELIMITER)
    }
}

impl Extend<String> for SourceUrls {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for url in iter {
            self.insert(url);
        }
    }
}

impl FromIterator<String> for SourceUrls {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut urls = Self::new();
        urls.extend(iter);
        urls
    }
}
