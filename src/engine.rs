//! Scan and fix pipeline.
//!
//! Drives the full run: collect scannable files, build the project index,
//! extract and classify per file (in parallel), and optionally apply the
//! suggested fixes. Errors local to one file are contained in the report;
//! only an unreadable project root aborts the run.

use crate::analyzer::{self, BrokenPath, Diagnostics};
use crate::index::FileIndex;
use crate::patterns::{self, ContentType};
use crate::rewriter;
use crate::scanner::{self, PathRef};
use anyhow::{Context, Result};
use colored::Colorize;
use glob::Pattern;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Knobs for a scan or fix run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// File extensions (without the dot) to scan.
    pub extensions: Vec<String>,
    /// Glob patterns for directories/files to exclude, in addition to the
    /// defaults.
    pub excludes: Vec<String>,
    /// Whether dependency/build/VCS directories and dot-entries are skipped.
    pub default_excludes: bool,
    /// Module names excluded from Script-type extraction.
    pub builtin_modules: HashSet<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: ["html", "htm", "css", "js", "mjs", "php"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excludes: Vec::new(),
            default_excludes: true,
            builtin_modules: patterns::default_builtins(),
        }
    }
}

/// A file that could not be processed; the run continues without it.
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub file: PathBuf,
    pub error: String,
}

/// Aggregate result of one scan.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    /// References that resolved cleanly.
    pub valid: Vec<PathRef>,
    /// Broken references with classification and suggestions.
    pub invalid: Vec<BrokenPath>,
    pub diagnostics: Diagnostics,
    /// Per-file processing failures.
    pub errors: Vec<FileError>,
}

/// Counters from a fix run.
#[derive(Debug, Default, Serialize)]
pub struct FixOutcome {
    /// References rewritten successfully.
    pub fixed: usize,
    /// References whose file could not be rewritten.
    pub failed: usize,
    /// Broken references with no applicable suggestion.
    pub manual: usize,
}

/// All accepted fixes targeting one file. Grouping guarantees each file is
/// read, patched for all of its references, and written back exactly once.
pub struct FileFixes<'a> {
    pub file: &'a Path,
    pub changes: Vec<(&'a PathRef, &'a str)>,
}

/// Scans the project and classifies every extracted reference.
///
/// # Errors
///
/// Fails only when the project root cannot be canonicalized or enumerated,
/// or when an exclude glob is invalid. Everything else is contained in the
/// report.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanReport> {
    let root = std::fs::canonicalize(root)
        .with_context(|| format!("Project root {} is not accessible", root.display()))?;
    let excludes = compile_excludes(&options.excludes)?;

    let files =
        scanner::collect_source_files(&root, &options.extensions, &excludes, options.default_excludes)?;
    let index = FileIndex::build(&root, &excludes, options.default_excludes)?;

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|file| process_file(file, &root, &index, &options.builtin_modules))
        .collect();

    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Scanned { valid: v, broken } => {
                valid.extend(v);
                invalid.extend(broken);
            }
            FileOutcome::Failed(error) => errors.push(error),
        }
    }

    let diagnostics = Diagnostics {
        files_scanned: files.len(),
        total_refs: valid.len() + invalid.len(),
        valid_refs: valid.len(),
        broken_refs: invalid.len(),
        suggestions_found: invalid.iter().filter(|b| b.suggestion.is_some()).count(),
        unsuggestable: invalid.iter().filter(|b| b.suggestion.is_none()).count(),
        files_errored: errors.len(),
    };

    Ok(ScanReport {
        valid,
        invalid,
        diagnostics,
        errors,
    })
}

/// Scans the project, then applies every applicable suggestion.
///
/// Classification completes across all files before the first write, so the
/// index backing the suggestions always reflects the pre-fix tree. Files are
/// patched in parallel; fixes within one file are serialized by grouping.
pub fn fix(root: &Path, options: &ScanOptions) -> Result<FixOutcome> {
    let report = scan(root, options)?;
    Ok(apply_fixes(&report))
}

/// Applies the fixable portion of an existing report.
pub fn apply_fixes(report: &ScanReport) -> FixOutcome {
    let groups = fixes_by_file(report);
    let fixable: usize = groups.iter().map(|g| g.changes.len()).sum();

    let results: Vec<usize> = groups
        .par_iter()
        .map(|group| match apply_file_fixes(group) {
            Ok(applied) => applied,
            Err(err) => {
                eprintln!("{} {:#}", "warn:".yellow().bold(), err);
                0
            }
        })
        .collect();

    let fixed: usize = results.iter().sum();
    FixOutcome {
        fixed,
        failed: fixable - fixed,
        manual: report.invalid.len() - fixable,
    }
}

/// Groups the report's applicable fixes by target file, sorted by path.
///
/// A fix is applicable when the defect kind allows rewriting and a concrete
/// suggestion exists; everything else stays manual.
pub fn fixes_by_file(report: &ScanReport) -> Vec<FileFixes<'_>> {
    let mut by_file: BTreeMap<&Path, Vec<(&PathRef, &str)>> = BTreeMap::new();

    for broken in &report.invalid {
        if !broken.defect.is_fixable() {
            continue;
        }
        let Some(suggestion) = broken.suggestion.as_deref() else {
            continue;
        };
        by_file
            .entry(broken.reference.file.as_path())
            .or_default()
            .push((&broken.reference, suggestion));
    }

    by_file
        .into_iter()
        .map(|(file, changes)| FileFixes { file, changes })
        .collect()
}

/// Rewrites one file's references; returns how many were applied.
pub fn apply_file_fixes(group: &FileFixes<'_>) -> Result<usize> {
    rewriter::apply_changes(group.file, &group.changes)?;
    Ok(group.changes.len())
}

enum FileOutcome {
    Scanned {
        valid: Vec<PathRef>,
        broken: Vec<BrokenPath>,
    },
    Failed(FileError),
}

fn process_file(
    file: &Path,
    root: &Path,
    index: &FileIndex,
    builtins: &HashSet<String>,
) -> FileOutcome {
    let Some(content_type) = file
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ContentType::from_extension)
    else {
        // Extension was requested but has no pattern set; nothing to extract.
        return FileOutcome::Scanned {
            valid: Vec::new(),
            broken: Vec::new(),
        };
    };

    match std::fs::read_to_string(file) {
        Ok(content) => {
            let refs = scanner::extract(&content, content_type, file, builtins);
            let (valid, broken) = analyzer::analyze(&refs, root, index);
            FileOutcome::Scanned { valid, broken }
        }
        Err(err) => FileOutcome::Failed(FileError {
            file: file.to_path_buf(),
            error: err.to_string(),
        }),
    }
}

fn compile_excludes(globs: &[String]) -> Result<Vec<Pattern>> {
    globs
        .iter()
        .map(|g| Pattern::new(g).with_context(|| format!("Invalid exclude pattern '{g}'")))
        .collect()
}
