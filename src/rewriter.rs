//! File rewriting for applying fixes.
//!
//! Performs position-aware replacement of broken reference text using the
//! byte spans captured during extraction. All changes for one file are
//! sorted by position and applied in reverse order to preserve offset
//! validity, then the file is written back in a single pass.

use crate::scanner::PathRef;
use anyhow::{Context, Result};
use std::path::Path;

/// A single text replacement with position information.
#[derive(Debug, Clone)]
struct Replacement {
    start: usize,
    end: usize,
    new_text: String,
}

/// Applies path replacements to a file's contents and writes the result.
///
/// Each `(reference, new_path)` pair replaces every recorded span of the
/// reference with the corrected path. The file is read once, patched for all
/// of its references, and written back once; a failing read or write leaves
/// the file untouched.
pub fn apply_changes(file: &Path, changes: &[(&PathRef, &str)]) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let new_content = apply_replacements(&content, changes);
    std::fs::write(file, new_content)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    Ok(())
}

/// Applies replacements to source content, returning the modified string.
///
/// Sorts replacements by start offset (descending) and applies each in turn,
/// so earlier replacements don't invalidate later offsets. Out-of-bounds or
/// overlapping spans are skipped rather than corrupting the buffer.
pub fn apply_replacements(content: &str, changes: &[(&PathRef, &str)]) -> String {
    let mut replacements: Vec<Replacement> = changes
        .iter()
        .flat_map(|(reference, new_path)| {
            reference.spans.iter().map(|span| Replacement {
                start: span.start,
                end: span.end,
                new_text: (*new_path).to_string(),
            })
        })
        .collect();

    // Sort by start offset descending so we can apply from end to start
    replacements.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    let mut applied_floor = content.len();
    for rep in replacements {
        if rep.start <= rep.end && rep.end <= applied_floor {
            result.replace_range(rep.start..rep.end, &rep.new_text);
            applied_floor = rep.start;
        }
    }

    result
}
