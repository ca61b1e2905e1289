//! TOML query manifests.
//!
//! A manifest lists named queries by component name:
//!
//! ```toml
//! [[query]]
//! name = "movers"
//! all = ["Position", "Velocity"]
//! exclude = ["Frozen"]
//! ```
//!
//! Component names are registered in first-seen order, so identities are
//! only comparable within one manifest run.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use cache_key::{CacheKey, CacheKeyBuilder, ComponentRegistry, QueryFilter};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct ManifestFile {
    #[serde(default, rename = "query")]
    queries: Vec<QueryEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEntry {
    pub name: String,
    #[serde(default)]
    pub all: Vec<String>,
    #[serde(default)]
    pub any: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// One query with its derived key, ready to print as a JSON line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyedQuery {
    pub name: String,
    pub key: i64,
    pub key_hex: String,
    pub layout: Vec<i64>,
}

/// Two queries with different layouts that landed on the same key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub key: i64,
    pub first: String,
    pub second: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManifestReport {
    pub queries: Vec<KeyedQuery>,
    /// Pairs of queries with identical layouts (same shape, different name).
    pub aliases: Vec<(String, String)>,
    pub collisions: Vec<Collision>,
}

#[derive(Debug)]
pub enum ManifestError {
    Io(io::Error),
    Parse { message: String },
    EmptyName { index: usize },
    DuplicateName { name: String },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "manifest I/O error: {e}"),
            Self::Parse { message } => write!(f, "invalid manifest: {message}"),
            Self::EmptyName { index } => write!(f, "query #{index} has an empty name"),
            Self::DuplicateName { name } => write!(f, "query name `{name}` is used twice"),
        }
    }
}

impl Error for ManifestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub fn parse_manifest(text: &str) -> Result<Vec<QueryEntry>, ManifestError> {
    let file: ManifestFile =
        toml::from_str(text).map_err(|e| ManifestError::Parse { message: e.to_string() })?;

    let mut seen = BTreeMap::new();
    for (index, entry) in file.queries.iter().enumerate() {
        if entry.name.trim().is_empty() {
            return Err(ManifestError::EmptyName { index });
        }
        if seen.insert(entry.name.as_str(), index).is_some() {
            return Err(ManifestError::DuplicateName { name: entry.name.clone() });
        }
    }
    Ok(file.queries)
}

pub fn load_manifest(path: &Path) -> Result<Vec<QueryEntry>, ManifestError> {
    let text = fs::read_to_string(path).map_err(ManifestError::Io)?;
    let entries = parse_manifest(&text)?;
    tracing::debug!(path = %path.display(), queries = entries.len(), "manifest loaded");
    Ok(entries)
}

/// Derives a key for every query and checks keys against layouts.
pub fn key_queries(entries: &[QueryEntry]) -> ManifestReport {
    let mut registry = ComponentRegistry::new();
    let mut builder = CacheKeyBuilder::new();
    let mut report = ManifestReport::default();
    let mut first_by_key: BTreeMap<CacheKey, usize> = BTreeMap::new();

    for entry in entries {
        let register = |registry: &mut ComponentRegistry, names: &[String]| {
            names.iter().map(|name| registry.register(name)).collect::<Vec<_>>()
        };
        let filter = QueryFilter::new()
            .with_all(register(&mut registry, &entry.all))
            .with_any(register(&mut registry, &entry.any))
            .with_none(register(&mut registry, &entry.exclude));

        let key = filter.cache_key_with(&mut builder, &registry);
        let keyed = KeyedQuery {
            name: entry.name.clone(),
            key: key.as_i64(),
            key_hex: key.to_hex(),
            layout: builder.last_layout().to_vec(),
        };

        match first_by_key.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(report.queries.len());
            }
            Entry::Occupied(slot) => {
                let first = &report.queries[*slot.get()];
                if first.layout == keyed.layout {
                    report.aliases.push((first.name.clone(), keyed.name.clone()));
                } else {
                    tracing::warn!(key = key.as_i64(), first = %first.name, second = %keyed.name, "cache key collision");
                    report.collisions.push(Collision {
                        key: key.as_i64(),
                        first: first.name.clone(),
                        second: keyed.name.clone(),
                    });
                }
            }
        }
        report.queries.push(keyed);
    }

    tracing::debug!(
        queries = report.queries.len(),
        components = registry.len(),
        aliases = report.aliases.len(),
        collisions = report.collisions.len(),
        "manifest keyed"
    );
    report
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const MANIFEST: &str = r#"
[[query]]
name = "movers"
all = ["Position", "Velocity"]
exclude = ["Frozen"]

[[query]]
name = "movers_reordered"
all = ["Velocity", "Position"]
exclude = ["Frozen"]

[[query]]
name = "any_movers"
any = ["Position", "Velocity"]

[[query]]
name = "everything"
"#;

    #[test]
    fn parses_entries_with_default_domains() {
        let entries = parse_manifest(MANIFEST).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].all, ["Position", "Velocity"]);
        assert!(entries[0].any.is_empty());
        assert!(entries[3].all.is_empty() && entries[3].exclude.is_empty());
    }

    #[test]
    fn reordered_queries_alias_and_domains_do_not() {
        let report = key_queries(&parse_manifest(MANIFEST).unwrap());
        assert_eq!(report.queries.len(), 4);
        assert_eq!(report.aliases, [("movers".to_string(), "movers_reordered".to_string())]);
        assert!(report.collisions.is_empty());
        assert_eq!(report.queries[0].key, report.queries[1].key);
        assert_ne!(report.queries[0].key, report.queries[2].key);

        // No components at all gives the fixed empty key.
        assert_eq!(report.queries[3].layout, [1, 0, 2, 0, 3, 0]);
        assert_eq!(report.queries[3].key_hex, "0x135739c3fb88c6e5");
    }

    #[test]
    fn rejects_duplicate_and_empty_names() {
        let duplicate = "[[query]]\nname = \"a\"\n[[query]]\nname = \"a\"\n";
        assert!(matches!(
            parse_manifest(duplicate),
            Err(ManifestError::DuplicateName { name }) if name == "a"
        ));

        let empty = "[[query]]\nname = \" \"\n";
        assert!(matches!(parse_manifest(empty), Err(ManifestError::EmptyName { index: 0 })));

        assert!(matches!(parse_manifest("[[query]]\nall = 3\n"), Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn loads_manifest_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();
        let entries = load_manifest(file.path()).unwrap();
        assert_eq!(entries[2].name, "any_movers");

        let missing = file.path().with_extension("missing");
        assert!(matches!(load_manifest(&missing), Err(ManifestError::Io(_))));
    }
}
