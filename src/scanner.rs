//! Source file collection and reference extraction.
//!
//! Walks the project tree to collect scannable files, then runs the pattern
//! catalog over each file's content to extract resource references. Every
//! reference carries the byte spans of its occurrences so the rewriter can
//! replace exactly the text that was matched, never a lookalike elsewhere in
//! the file.

use crate::patterns::{self, ContentType, PatternEntry};
use anyhow::{Context, Result};
use colored::Colorize;
use glob::Pattern;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names skipped by default: dependency, build and VCS trees.
/// Dot-prefixed entries are skipped independently of this list.
pub const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "dist", "build", "vendor", "target"];

/// One extracted path-like token and where it was found.
#[derive(Debug, Clone, Serialize)]
pub struct PathRef {
    /// Exact text as captured, unmodified.
    pub raw: String,
    /// Source file containing the reference.
    pub file: PathBuf,
    /// Line number of the first occurrence, 1-indexed.
    pub line: usize,
    /// Column number of the first occurrence, 1-indexed.
    pub column: usize,
    /// Label of the pattern that matched first, e.g. `"img-src"`.
    pub kind: &'static str,
    /// Content family the reference was extracted from.
    pub content_type: ContentType,
    /// Byte ranges of every occurrence of `raw` in the file content as read
    /// at extraction time. A fix replaces all of them in one rewrite.
    pub spans: Vec<Range<usize>>,
}

/// Collects all scannable files under `root`.
///
/// A file qualifies when its extension is in `extensions` and no component of
/// its path is excluded. Exclusion covers dot-prefixed entries plus
/// [`DEFAULT_EXCLUDES`] (unless `default_excludes` is false) and any
/// user-supplied glob, matched against both the entry name and the
/// root-relative path. The result is sorted for deterministic output.
///
/// Failing to read the root itself is fatal; errors deeper in the walk are
/// reported to stderr and the affected subtree is skipped.
pub fn collect_source_files(
    root: &Path,
    extensions: &[String],
    excludes: &[Pattern],
    default_excludes: bool,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e.path(), root, excludes, default_excludes))
    {
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
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Whether a walked path should be skipped entirely.
pub(crate) fn is_excluded(
    path: &Path,
    root: &Path,
    excludes: &[Pattern],
    default_excludes: bool,
) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if default_excludes && (name.starts_with('.') || DEFAULT_EXCLUDES.contains(&name)) {
        return true;
    }
    if excludes.is_empty() {
        return false;
    }
    let relative = path.strip_prefix(root).unwrap_or(path);
    excludes
        .iter()
        .any(|pattern| pattern.matches(name) || pattern.matches_path(relative))
}

/// Extracts all resource references from `content`.
///
/// Pure in its inputs: applies the pattern set for `content_type`, discards
/// empty captures, drops Script-set matches that name a built-in module or a
/// bare package specifier, and merges duplicate raw paths into a single
/// record carrying every span. Template content is additionally scanned with
/// the HTML set and, inside inline `<style>`/`<script>` blocks, with the CSS
/// and Script sets; inline spans are offset back into the enclosing file.
pub fn extract(
    content: &str,
    content_type: ContentType,
    file: &Path,
    builtins: &HashSet<String>,
) -> Vec<PathRef> {
    let mut matches = Vec::new();

    match content_type {
        ContentType::Template => {
            run_set(
                patterns::patterns_for(ContentType::Template),
                content,
                0,
                false,
                builtins,
                &mut matches,
            );
            run_set(
                patterns::patterns_for(ContentType::Html),
                content,
                0,
                false,
                builtins,
                &mut matches,
            );
            for cap in patterns::STYLE_BLOCK.captures_iter(content) {
                if let Some(block) = cap.get(1) {
                    run_set(
                        patterns::patterns_for(ContentType::Css),
                        block.as_str(),
                        block.start(),
                        false,
                        builtins,
                        &mut matches,
                    );
                }
            }
            for cap in patterns::SCRIPT_BLOCK.captures_iter(content) {
                if let Some(block) = cap.get(1) {
                    run_set(
                        patterns::patterns_for(ContentType::Script),
                        block.as_str(),
                        block.start(),
                        true,
                        builtins,
                        &mut matches,
                    );
                }
            }
        }
        ContentType::Script => {
            run_set(
                patterns::patterns_for(ContentType::Script),
                content,
                0,
                true,
                builtins,
                &mut matches,
            );
        }
        other => {
            run_set(patterns::patterns_for(other), content, 0, false, builtins, &mut matches);
        }
    }

    assemble(content, content_type, file, matches)
}

struct RawMatch {
    kind: &'static str,
    range: Range<usize>,
}

fn run_set(
    set: &'static [PatternEntry],
    haystack: &str,
    base: usize,
    script_specifiers: bool,
    builtins: &HashSet<String>,
    out: &mut Vec<RawMatch>,
) {
    for entry in set {
        for cap in entry.regex.captures_iter(haystack) {
            let Some(group) = cap.get(1) else { continue };
            if group.is_empty() {
                continue;
            }
            if script_specifiers && is_excluded_specifier(group.as_str(), builtins) {
                continue;
            }
            out.push(RawMatch {
                kind: entry.kind,
                range: base + group.start()..base + group.end(),
            });
        }
    }
}

/// Module specifiers that are not file paths: platform built-ins, and bare
/// names without a separator (third-party packages).
fn is_excluded_specifier(raw: &str, builtins: &HashSet<String>) -> bool {
    if builtins.contains(raw) {
        return true;
    }
    !raw.starts_with('.') && !raw.starts_with('/') && !raw.contains('/') && !raw.contains(':')
}

/// Merges raw matches into deduplicated references ordered by first
/// occurrence. When the same raw text is matched by several patterns, the
/// catalog-order-first label wins and identical spans collapse.
fn assemble(
    content: &str,
    content_type: ContentType,
    file: &Path,
    mut matches: Vec<RawMatch>,
) -> Vec<PathRef> {
    matches.sort_by_key(|m| (m.range.start, m.range.end));

    let mut refs: Vec<PathRef> = Vec::new();
    let mut by_raw: HashMap<String, usize> = HashMap::new();

    for m in matches {
        let raw = &content[m.range.clone()];
        if let Some(&i) = by_raw.get(raw) {
            let existing = &mut refs[i];
            if !existing.spans.contains(&m.range) {
                existing.spans.push(m.range);
            }
        } else {
            let (line, column) = offset_to_line_col(content, m.range.start);
            by_raw.insert(raw.to_string(), refs.len());
            refs.push(PathRef {
                raw: raw.to_string(),
                file: file.to_path_buf(),
                line,
                column,
                kind: m.kind,
                content_type,
                spans: vec![m.range],
            });
        }
    }

    refs
}

pub(crate) fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}
