//! The manifest: the one durable record of what a batch rendered.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// One rendered walk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Dataset identifier.
    pub source: String,
    /// Walk name as extracted.
    pub walk: String,
    /// Output image file name.
    pub file: String,
}

/// Ordered list of rendered walks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reconciles a previous manifest with the output of a merge run.
    ///
    /// Entries of datasets in `reprocessed` are dropped wholesale; everything
    /// else is kept in its original order, followed by `fresh`.
    pub fn merge<'a>(
        prior: Manifest,
        reprocessed: impl IntoIterator<Item = &'a str>,
        fresh: Manifest,
    ) -> Manifest {
        let reprocessed: HashSet<&str> = reprocessed.into_iter().collect();
        let mut entries: Vec<ManifestEntry> = prior
            .entries
            .into_iter()
            .filter(|e| !reprocessed.contains(e.source.as_str()))
            .collect();
        entries.extend(fresh.entries);
        Manifest { entries }
    }

    /// Loads a manifest for merging.
    ///
    /// A missing file is an empty manifest. An unreadable one is logged and
    /// also treated as empty.
    pub fn load_or_default(path: &Path) -> Manifest {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Manifest::new(),
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot read previous manifest; starting fresh");
                return Manifest::new();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "previous manifest is malformed; starting fresh");
            Manifest::new()
        })
    }

    /// Writes the manifest as pretty JSON, replacing `path` atomically.
    pub fn write_atomic(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, path)
    }
}

/// Replaces every character outside `[A-Za-z0-9_-]` with `_` and keeps at
/// most `max_len` characters.
pub fn sanitize(name: &str, max_len: usize) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect()
}

/// Output image file name for a walk of a dataset.
pub fn output_file_name(source: &str, walk: &str, max_name_len: usize) -> String {
    format!(
        "{}__{}.png",
        sanitize(source, usize::MAX),
        sanitize(walk, max_name_len)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, walk: &str) -> ManifestEntry {
        ManifestEntry {
            source: source.into(),
            walk: walk.into(),
            file: output_file_name(source, walk, 64),
        }
    }

    #[test]
    fn sanitize_replaces_and_truncates() {
        assert_eq!(sanitize("Blue Whale (N. Pacific)", 64), "Blue_Whale__N__Pacific_");
        assert_eq!(sanitize("abcdef", 3), "abc");
        assert_eq!(sanitize("día", 64), "d_a");
    }

    #[test]
    fn output_names_are_stable() {
        assert_eq!(
            output_file_name("whales", "Region - Blue", 64),
            output_file_name("whales", "Region - Blue", 64)
        );
        assert_eq!(output_file_name("whales", "A/B", 64), "whales__A_B.png");
    }

    #[test]
    fn merge_keeps_others_then_appends_fresh() {
        let prior = Manifest {
            entries: vec![entry("A", "1"), entry("B", "1"), entry("A", "2"), entry("B", "2")],
        };
        let fresh = Manifest {
            entries: vec![entry("A", "new")],
        };
        let merged = Manifest::merge(prior, ["A"], fresh);
        assert_eq!(
            merged.entries,
            vec![entry("B", "1"), entry("B", "2"), entry("A", "new")]
        );
    }

    #[test]
    fn reprocessed_dataset_with_no_output_disappears() {
        let prior = Manifest {
            entries: vec![entry("A", "1"), entry("B", "1")],
        };
        let merged = Manifest::merge(prior, ["A"], Manifest::new());
        assert_eq!(merged.entries, vec![entry("B", "1")]);
    }
}
