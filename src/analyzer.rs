//! Reference classification and fix suggestion.
//!
//! Decides, for each extracted reference, whether it is a remote URL, an
//! absolute in-tree path, or a relative path, and whether it is defective.
//! For fixable defects a concrete replacement path is derived: absolute
//! paths become the lexical shortest relative path from the referencing
//! file's directory, missing files are searched in the project index by
//! basename with a closest-candidate tie-break.

use crate::index::FileIndex;
use crate::scanner::PathRef;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Syntactic shape of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    RemoteUrl,
    AbsoluteInTree,
    Relative,
}

/// Why a reference is considered broken. Mutually exclusive; assigned by the
/// first matching rule in [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Defect {
    /// Leading `/`: resolves in-tree but is not portable across deployments.
    AbsolutePath,
    /// Relative path whose target does not exist.
    MissingFile,
    /// Relative path that climbs above the project root.
    EscapesRoot,
    /// Relative path with redundant separators (`//`, `././`) and no target.
    MalformedRelative,
    /// URL-shaped reference that fails the syntax check.
    MalformedUrl,
    /// Existence could not be determined (e.g. permission denied).
    Unclassified,
}

impl Defect {
    /// Whether the rewriter may apply a suggestion for this defect.
    pub fn is_fixable(self) -> bool {
        matches!(self, Self::AbsolutePath | Self::MissingFile)
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AbsolutePath => "absolute path",
            Self::MissingFile => "missing file",
            Self::EscapesRoot => "escapes project root",
            Self::MalformedRelative => "malformed relative path",
            Self::MalformedUrl => "malformed URL",
            Self::Unclassified => "unclassified",
        };
        f.write_str(label)
    }
}

/// Outcome of classifying one reference.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub category: Category,
    /// `None` means the reference is valid.
    pub defect: Option<Defect>,
    /// Concrete replacement path, when one could be derived safely.
    pub suggestion: Option<String>,
    /// Guidance for manual correction when no suggestion exists.
    pub reason: Option<String>,
}

impl Classification {
    fn valid(category: Category) -> Self {
        Self {
            category,
            defect: None,
            suggestion: None,
            reason: None,
        }
    }

    fn broken(category: Category, defect: Defect, reason: &str) -> Self {
        Self {
            category,
            defect: Some(defect),
            suggestion: None,
            reason: Some(reason.to_string()),
        }
    }
}

/// A broken reference with its classification, ready for reporting or fixing.
#[derive(Debug, Clone, Serialize)]
pub struct BrokenPath {
    #[serde(flatten)]
    pub reference: PathRef,
    pub category: Category,
    pub defect: Defect,
    /// Suggested replacement path if one could be determined.
    pub suggestion: Option<String>,
    /// Explanation when no suggestion exists.
    pub reason: Option<String>,
}

/// Summary statistics from a scan.
#[derive(Debug, Default, Serialize)]
pub struct Diagnostics {
    pub files_scanned: usize,
    pub total_refs: usize,
    pub valid_refs: usize,
    pub broken_refs: usize,
    pub suggestions_found: usize,
    pub unsuggestable: usize,
    pub files_errored: usize,
}

/// Classifies every reference of one file, splitting valid from broken.
pub fn analyze(refs: &[PathRef], root: &Path, index: &FileIndex) -> (Vec<PathRef>, Vec<BrokenPath>) {
    let mut valid = Vec::new();
    let mut broken = Vec::new();

    for reference in refs {
        let classification = classify(reference, root, index);
        match classification.defect {
            None => valid.push(reference.clone()),
            Some(defect) => broken.push(BrokenPath {
                reference: reference.clone(),
                category: classification.category,
                defect,
                suggestion: classification.suggestion,
                reason: classification.reason,
            }),
        }
    }

    (valid, broken)
}

/// Classifies a single reference. Ordered, first applicable rule wins:
///
/// 1. URL-shaped (scheme token or `//` prefix): remote; valid iff the
///    syntax check passes. Never touched by the fixer.
/// 2. Leading `/`: absolute in-tree; always broken, even when the target
///    exists, because the path breaks as soon as the tree is deployed under
///    a different prefix. Suggestion: the relative form.
/// 3. Otherwise relative, resolved lexically against the referencing file's
///    directory: an existing in-root target is valid regardless of surface
///    form; a `..`-prefixed path landing outside the root escapes; redundant
///    separators on a dead path are malformed; any other dead path is a
///    missing file and goes through the rename lookup.
pub fn classify(reference: &PathRef, root: &Path, index: &FileIndex) -> Classification {
    let raw = reference.raw.as_str();

    if is_url_shaped(raw) {
        if is_well_formed_url(raw) {
            return Classification::valid(Category::RemoteUrl);
        }
        return Classification::broken(
            Category::RemoteUrl,
            Defect::MalformedUrl,
            "The URL is not syntactically valid. Please check manually.",
        );
    }

    let source_dir = reference.file.parent().unwrap_or(root);

    if raw.starts_with('/') {
        let target = normalize_lexically(&root.join(raw.trim_start_matches('/')));
        let suggestion = dot_prefixed(&relative_from(&target, source_dir));
        return Classification {
            category: Category::AbsoluteInTree,
            defect: Some(Defect::AbsolutePath),
            suggestion: Some(suggestion),
            reason: None,
        };
    }

    let resolved = normalize_lexically(&source_dir.join(raw));
    let exists = match std::fs::metadata(&resolved) {
        Ok(_) => true,
        Err(err) if err.kind() == io::ErrorKind::NotFound => false,
        Err(_) => {
            return Classification::broken(
                Category::Relative,
                Defect::Unclassified,
                "This path could not be classified. Please check manually.",
            );
        }
    };

    if exists && resolved.starts_with(root) {
        return Classification::valid(Category::Relative);
    }
    if raw.starts_with("..") && !resolved.starts_with(root) {
        return Classification::broken(
            Category::Relative,
            Defect::EscapesRoot,
            "Adjust the path to stay within the project root.",
        );
    }
    if exists {
        return Classification::valid(Category::Relative);
    }
    if raw.contains("//") || raw.contains("././") {
        return Classification::broken(
            Category::Relative,
            Defect::MalformedRelative,
            "Remove the redundant separators and check the path manually.",
        );
    }

    match suggest_for_missing(raw, source_dir, index) {
        Some(suggestion) => Classification {
            category: Category::Relative,
            defect: Some(Defect::MissingFile),
            suggestion: Some(suggestion),
            reason: None,
        },
        None => Classification::broken(
            Category::Relative,
            Defect::MissingFile,
            "Check if the file was moved or renamed manually.",
        ),
    }
}

/// Searches the index for files sharing the missing path's basename.
///
/// No candidate yields `None`. Otherwise the candidate whose relative form
/// from the referencing directory has the fewest path segments wins; ties
/// keep the first candidate in index enumeration order.
fn suggest_for_missing(raw: &str, source_dir: &Path, index: &FileIndex) -> Option<String> {
    let basename = Path::new(raw).file_name()?.to_str()?;

    let mut best: Option<(usize, String)> = None;
    for candidate in index.candidates(basename) {
        let relative = relative_from(candidate, source_dir);
        let segments = relative.components().count();
        if best.as_ref().is_none_or(|(s, _)| segments < *s) {
            best = Some((segments, dot_prefixed(&relative)));
        }
    }

    best.map(|(_, suggestion)| suggestion)
}

fn is_url_shaped(raw: &str) -> bool {
    raw.starts_with("//") || scheme_of(raw).is_some()
}

/// Returns the leading scheme token, if any. Two-plus characters required,
/// so Windows drive prefixes (`C:\...`) don't read as schemes.
fn scheme_of(raw: &str) -> Option<&str> {
    let colon = raw.find(':')?;
    if colon < 2 {
        return None;
    }
    let scheme = &raw[..colon];
    let mut chars = scheme.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}

/// Syntax-only URL check; no network access. Hierarchical URLs need a
/// non-empty authority; opaque ones (`data:`, `mailto:`) a non-empty body.
pub(crate) fn is_well_formed_url(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return !authority_of(rest).is_empty();
    }
    let Some(scheme) = scheme_of(raw) else {
        return false;
    };
    let rest = &raw[scheme.len() + 1..];
    match rest.strip_prefix("//") {
        Some(hierarchical) => !authority_of(hierarchical).is_empty(),
        None => !rest.is_empty(),
    }
}

fn authority_of(rest: &str) -> &str {
    rest.split(['/', '?', '#']).next().unwrap_or("")
}

/// Collapses `.` and `..` components without touching the filesystem.
/// Leading `..` is preserved when there is nothing left to pop; `..` directly
/// under the root is dropped, as the root is its own parent.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Lexical shortest relative path from `base` (a directory) to `target`.
/// Both are expected absolute and normalized; the result never contains
/// redundant `..` runs beyond what the tree shape requires.
pub(crate) fn relative_from(target: &Path, base: &Path) -> PathBuf {
    let target_parts: Vec<Component<'_>> = target.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(t, b)| t == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part);
    }
    relative
}

/// Renders a relative path with an explicit `./` prefix unless it already
/// starts with `./` or `../`; an empty path becomes `./`.
pub(crate) fn dot_prefixed(relative: &Path) -> String {
    let rendered = relative.to_string_lossy();
    if rendered.is_empty() {
        "./".to_string()
    } else if rendered.starts_with("./") || rendered.starts_with("../") {
        rendered.into_owned()
    } else {
        format!("./{rendered}")
    }
}
