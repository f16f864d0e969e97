//! Known organization names, loaded once per process.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

use blackbox_core::constants::MIN_DICTIONARY_MATCH_LEN;
use blackbox_core::errors::DictionaryError;
use blackbox_core::types::collections::{FxHashMap, FxHashSet};
use serde::Serialize;

use super::Stoplists;

/// Loaded dictionaries keyed by file path. Each file is read at most once.
static SHARED: LazyLock<Mutex<FxHashMap<PathBuf, Arc<CompanyDictionary>>>> =
    LazyLock::new(|| Mutex::new(FxHashMap::default()));

/// Immutable set of lowercase organization names.
#[derive(Debug, Clone, Default)]
pub struct CompanyDictionary {
    names: FxHashSet<String>,
    source: Option<PathBuf>,
}

/// Summary of a loaded dictionary.
#[derive(Debug, Clone, Serialize)]
pub struct DictionaryStats {
    pub total_names: usize,
    pub dict_file: Option<PathBuf>,
    pub dict_exists: bool,
    pub min_match_length: usize,
}

impl CompanyDictionary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
            source: None,
        }
    }

    /// Parse dictionary text: one name per line, `#` comments and blank
    /// lines ignored.
    pub fn parse(text: &str) -> Self {
        Self::from_names(text.lines().filter(|l| !l.trim_start().starts_with('#')))
    }

    /// Read a dictionary file. A missing file yields an empty dictionary.
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "company dictionary not found; dictionary-based brand detection disabled"
            );
            return Ok(Self {
                names: FxHashSet::default(),
                source: Some(path.to_path_buf()),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut dict = Self::parse(&text);
        dict.source = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), names = dict.len(), "loaded company dictionary");
        Ok(dict)
    }

    /// Process-wide instance for `path`, loaded on first use and shared
    /// read-only afterwards. Read errors degrade to an empty dictionary.
    pub fn shared(path: &Path) -> Arc<CompanyDictionary> {
        let mut cache = SHARED.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(dict) = cache.get(path) {
            return Arc::clone(dict);
        }
        let dict = Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "company dictionary unreadable; using empty dictionary");
            Self::empty()
        });
        let dict = Arc::new(dict);
        cache.insert(path.to_path_buf(), Arc::clone(&dict));
        dict
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// A single token that names a known organization and is specific
    /// enough to flag on its own.
    pub fn is_known_company(&self, term: &str, stoplists: &Stoplists) -> bool {
        if term.chars().count() < MIN_DICTIONARY_MATCH_LEN || self.names.is_empty() {
            return false;
        }
        if stoplists.is_too_common(term) {
            return false;
        }
        self.names.contains(&term.to_lowercase())
    }

    /// Single segments plus adjacent 2- and 3-segment combinations that name
    /// a known organization. Combinations come back joined with `_` in their
    /// original casing (`Direct_Energy`).
    pub fn find_company_matches(&self, segments: &[&str], stoplists: &Stoplists) -> Vec<String> {
        if self.names.is_empty() {
            return Vec::new();
        }
        let mut matches: Vec<String> = segments
            .iter()
            .filter(|seg| self.is_known_company(seg, stoplists))
            .map(|seg| seg.to_string())
            .collect();

        for width in [2usize, 3] {
            for window in segments.windows(width) {
                let combined = window.join(" ").to_lowercase();
                if self.names.contains(&combined) && !stoplists.is_too_common(&combined) {
                    matches.push(window.join("_"));
                }
            }
        }
        matches
    }

    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            total_names: self.names.len(),
            dict_file: self.source.clone(),
            dict_exists: self.source.as_deref().is_some_and(Path::exists),
            min_match_length: MIN_DICTIONARY_MATCH_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> CompanyDictionary {
        CompanyDictionary::parse("# comment\nglobex\ndirect energy\n\npr news wire\napple\n")
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        assert_eq!(dict().len(), 4);
    }

    #[test]
    fn single_segment_matches() {
        let lists = Stoplists::builtin();
        let d = dict();
        assert!(d.is_known_company("Globex", &lists));
        assert!(!d.is_known_company("Apple", &lists));
        assert!(!d.is_known_company("abc", &lists));
    }

    #[test]
    fn multi_segment_matches_keep_casing() {
        let lists = Stoplists::builtin();
        let matches = dict().find_company_matches(&["PR", "News", "Wire", "Direct", "Energy"], &lists);
        assert!(matches.contains(&"PR_News_Wire".to_string()));
        assert!(matches.contains(&"Direct_Energy".to_string()));
    }

    #[test]
    fn missing_file_is_empty() {
        let d = CompanyDictionary::load(Path::new("/nonexistent/company_names.txt")).unwrap();
        assert!(d.is_empty());
        assert!(!d.stats().dict_exists);
    }
}
