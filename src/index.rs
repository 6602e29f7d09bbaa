//! Project file index.
//!
//! Enumerates every file under the project root, whatever its extension
//! (fix candidates are usually assets, not sources), and answers basename
//! lookups for the missing-file rename heuristic. Enumeration order is sorted, so
//! candidate tie-breaking is deterministic across runs and platforms.

use crate::scanner;
use anyhow::{Context, Result};
use colored::Colorize;
use glob::Pattern;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Flattened view of the project tree, indexed by file basename.
#[derive(Debug)]
pub struct FileIndex {
    entries: Vec<PathBuf>,
    by_basename: HashMap<String, Vec<usize>>,
}

impl FileIndex {
    /// Walks `root` and builds the index, honoring the same exclusion rules
    /// as the source-file scanner. Failing to read the root is fatal; deeper
    /// walk errors skip the affected subtree.
    pub fn build(root: &Path, excludes: &[Pattern], default_excludes: bool) -> Result<Self> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(root).into_iter().filter_entry(|e| {
            e.depth() == 0 || !scanner::is_excluded(e.path(), root, excludes, default_excludes)
        }) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(err).with_context(|| format!("Failed to walk {}", root.display()));
                }
                Err(err) => {
                    eprintln!("{} Skipping unreadable entry: {}", "warn:".yellow().bold(), err);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                entries.push(entry.into_path());
            }
        }

        entries.sort();

        let mut by_basename: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, path) in entries.iter().enumerate() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                by_basename.entry(name.to_string()).or_default().push(i);
            }
        }

        Ok(Self { entries, by_basename })
    }

    /// All indexed files, in enumeration order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Files whose basename equals `name`, in enumeration order.
    pub fn candidates(&self, name: &str) -> impl Iterator<Item = &PathBuf> {
        self.by_basename
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
