//! tsvclean - Schema registry
//!
//! Maps a record kind (a named dataset category such as `movies`) to the
//! per-column byte limits applied while cleaning. Columns without an entry
//! are passed through untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CleanError, Result};

/// Built-in limits, sized to the fixed-width stores the cleaned files load into.
const BUILTIN: &[(&str, &[(&str, usize)])] = &[
    ("movies", &[("tconst", 9), ("primaryTitle", 30)]),
    ("people", &[("nconst", 10), ("primaryName", 105)]),
    ("workedon", &[("tconst", 9), ("nconst", 10), ("category", 20)]),
];

/// Column name → maximum byte length for one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ColumnLimits(BTreeMap<String, usize>);

impl ColumnLimits {
    /// Byte limit for `column`, or `None` if the column is unconstrained.
    pub fn limit(&self, column: &str) -> Option<usize> {
        self.0.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(c, &n)| (c.as_str(), n))
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ColumnLimits {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(c, n)| (c.into(), n)).collect())
    }
}

/// Immutable table of kinds and their column limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    kinds: BTreeMap<String, ColumnLimits>,
}

impl SchemaRegistry {
    /// The built-in registry: `movies`, `people` and `workedon`.
    pub fn builtin() -> Self {
        let kinds = BUILTIN
            .iter()
            .map(|(kind, cols)| {
                let limits: ColumnLimits = cols.iter().copied().collect();
                (kind.to_string(), limits)
            })
            .collect();
        Self { kinds }
    }

    /// Look up the limits for `kind`.
    ///
    /// An unknown kind is an error; there is no "no limits" fallback.
    pub fn limits_for(&self, kind: &str) -> Result<&ColumnLimits> {
        self.kinds.get(kind).ok_or_else(|| CleanError::UnknownKind {
            kind: kind.to_string(),
            known: self.kinds(),
        })
    }

    /// Sorted kind names.
    pub fn kinds(&self) -> Vec<String> {
        self.kinds.keys().cloned().collect()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Parse a registry from JSON of the form `{"kind": {"column": limit}}`.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::parse(text).map_err(CleanError::InvalidSchema)
    }

    /// Load a JSON schema file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CleanError::PathIo {
            action: "read schema",
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::parse(&text)
            .map_err(|e| CleanError::InvalidSchema(format!("{}: {}", path.display(), e)))?;
        debug!(
            "Loaded {} kind(s) from {}: {}",
            registry.kinds.len(),
            path.display(),
            registry.kinds().join(", ")
        );
        Ok(registry)
    }

    /// Overlay `other` on top of `self`. Kinds in `other` replace same-named kinds.
    pub fn merge(mut self, other: SchemaRegistry) -> Self {
        self.kinds.extend(other.kinds);
        self
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        let registry: Self = serde_json::from_str(text).map_err(|e| e.to_string())?;
        for (kind, limits) in &registry.kinds {
            if let Some((column, _)) = limits.iter().find(|&(_, n)| n == 0) {
                return Err(format!(
                    "kind '{}' column '{}': limit must be a positive byte count",
                    kind, column
                ));
            }
        }
        Ok(registry)
    }
}
