//! Pattern catalog for resource reference extraction.
//!
//! Declares, per content type, the ordered set of regexes that locate a path
//! argument inside markup attributes, style declarations, and script/template
//! calls. Every pattern has exactly one capture group yielding the bare path
//! text; surrounding quotes are never captured. Entries are applied
//! independently, so one raw path may be matched by several entries;
//! deduplication happens downstream in the scanner.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

/// File-format family of a scanned file, determining which pattern set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Html,
    Css,
    Script,
    /// Server-side template (PHP). Scanned with its own set plus the HTML set,
    /// and recursively with the CSS/Script sets inside inline blocks.
    Template,
}

impl ContentType {
    /// Maps a file extension (without the dot) to a content type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "css" => Some(Self::Css),
            "js" | "mjs" => Some(Self::Script),
            "php" => Some(Self::Template),
            _ => None,
        }
    }
}

/// One extraction pattern: a reference-kind label plus the regex that finds it.
pub struct PatternEntry {
    /// Stable label describing what matched, e.g. `"img-src"` or `"css-url"`.
    pub kind: &'static str,
    pub regex: Regex,
}

fn entry(kind: &'static str, pattern: &str) -> PatternEntry {
    PatternEntry {
        kind,
        regex: Regex::new(pattern).expect("valid catalog pattern"),
    }
}

static HTML_PATTERNS: LazyLock<Vec<PatternEntry>> = LazyLock::new(|| {
    vec![
        entry(
            "img-src",
            r#"(?i)<(?:img|script|iframe|audio|video|source|embed)\b[^>]*?\ssrc\s*=\s*["']([^"']*)["']"#,
        ),
        entry(
            "link-href",
            r#"(?i)<(?:a|link|area)\b[^>]*?\shref\s*=\s*["']([^"']*)["']"#,
        ),
        entry(
            "form-action",
            r#"(?i)<form\b[^>]*?\saction\s*=\s*["']([^"']*)["']"#,
        ),
        // Only data-* values that contain a dot or slash; bare tokens like
        // data-toggle="modal" are not path candidates.
        entry(
            "data-attr",
            r#"(?i)<\w+\b[^>]*?\sdata-[a-z0-9_-]+\s*=\s*["']([^"']*[./][^"']*)["']"#,
        ),
        entry(
            "video-poster",
            r#"(?i)<video\b[^>]*?\sposter\s*=\s*["']([^"']*)["']"#,
        ),
        entry(
            "html-manifest",
            r#"(?i)<html\b[^>]*?\smanifest\s*=\s*["']([^"']*)["']"#,
        ),
    ]
});

static CSS_PATTERNS: LazyLock<Vec<PatternEntry>> = LazyLock::new(|| {
    vec![
        entry(
            "css-import-url",
            r#"(?i)@import\s+url\(\s*["']?([^"')]+)["']?\s*\)"#,
        ),
        entry("css-import", r#"(?i)@import\s+["']([^"']+)["']"#),
        // Generic url() covers background-image, cursor, border-image,
        // mask-image, filter, clip-path, content and friends.
        entry("css-url", r#"(?i)\burl\(\s*["']?([^"')]+)["']?\s*\)"#),
    ]
});

static SCRIPT_PATTERNS: LazyLock<Vec<PatternEntry>> = LazyLock::new(|| {
    vec![
        entry(
            "js-import-from",
            r#"import\s+[^'";]*?from\s*["']([^"']+)["']"#,
        ),
        entry("js-import", r#"import\s*["']([^"']+)["']"#),
        entry(
            "js-dynamic-import",
            r#"import\s*\(\s*["']([^"']+)["']\s*\)"#,
        ),
        entry("js-require", r#"\brequire\s*\(\s*["']([^"']+)["']\s*\)"#),
        entry("js-fetch", r#"\bfetch\s*\(\s*["']([^"']+)["']"#),
        entry(
            "js-xhr-open",
            r#"\.open\s*\(\s*["'][A-Za-z]+["']\s*,\s*["']([^"']+)["']"#,
        ),
        entry(
            "js-new-url",
            r#"new\s+URL\s*\(\s*["']([^"']+)["']\s*,\s*import\.meta\.url\s*\)"#,
        ),
        entry("js-worker", r#"new\s+(?:Shared)?Worker\s*\(\s*["']([^"']+)["']"#),
        entry(
            "js-service-worker",
            r#"serviceWorker\s*\.\s*register\s*\(\s*["']([^"']+)["']"#,
        ),
        entry("js-audio", r#"new\s+Audio\s*\(\s*["']([^"']+)["']\s*\)"#),
        entry("js-src-assign", r#"\w+\.src\s*=\s*["']([^"']+)["']"#),
        entry("js-href-assign", r#"\w+\.href\s*=\s*["']([^"']+)["']"#),
        entry(
            "js-location",
            r#"(?:window|document)\.location(?:\.href)?\s*=\s*["']([^"']+)["']"#,
        ),
        entry(
            "js-style-background",
            r#"style\.backgroundImage\s*=\s*["']?url\(["']?([^"')]+)["']?\)"#,
        ),
    ]
});

static TEMPLATE_PATTERNS: LazyLock<Vec<PatternEntry>> = LazyLock::new(|| {
    vec![
        entry(
            "php-include",
            r#"(?i)\b(?:include|require)(?:_once)?\s*\(?\s*["']([^"']+)["']\s*\)?\s*;"#,
        ),
        entry(
            "php-file-get-contents",
            r#"(?i)\bfile_get_contents\s*\(\s*["']([^"']+)["']\s*\)"#,
        ),
        entry("php-readfile", r#"(?i)\breadfile\s*\(\s*["']([^"']+)["']\s*\)"#),
        entry("php-fopen", r#"(?i)\bfopen\s*\(\s*["']([^"']+)["']\s*,"#),
        entry("php-opendir", r#"(?i)\bopendir\s*\(\s*["']([^"']+)["']\s*\)"#),
        entry(
            "php-header-location",
            r#"(?i)\bheader\s*\(\s*["']Location:\s*([^"']+)["']"#,
        ),
        // Echoed string literals that look like paths. Prose and plain words
        // are kept out by requiring a dot or slash.
        entry("php-echo-path", r#"(?i)\becho\s+["']([^"']*[./][^"']*)["']"#),
    ]
});

/// Inline `<style>` blocks; group 1 is the block body.
pub static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>(.*?)</style>").expect("valid pattern"));

/// Inline `<script>` blocks; group 1 is the block body.
pub static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("valid pattern"));

/// Returns the pattern set for a content type.
///
/// For [`ContentType::Template`] this is only the template-specific set; the
/// scanner layers the HTML set and the inline-block recursion on top.
pub fn patterns_for(content_type: ContentType) -> &'static [PatternEntry] {
    match content_type {
        ContentType::Html => &HTML_PATTERNS,
        ContentType::Css => &CSS_PATTERNS,
        ContentType::Script => &SCRIPT_PATTERNS,
        ContentType::Template => &TEMPLATE_PATTERNS,
    }
}

/// Node standard-library module names, excluded from Script-type extraction
/// so `require("fs/promises")` and friends are never flagged as file paths.
pub const NODE_BUILTIN_MODULES: &[&str] = &[
    "fs",
    "fs/promises",
    "path",
    "os",
    "util",
    "crypto",
    "http",
    "https",
    "stream",
    "events",
    "child_process",
    "cluster",
    "dns",
    "net",
    "tls",
    "zlib",
    "buffer",
    "vm",
    "url",
    "querystring",
    "assert",
    "readline",
    "string_decoder",
    "timers",
    "tty",
    "dgram",
];

/// The default built-in module set as an owned set, ready to inject into the
/// scanner. Callers targeting another platform can pass their own.
pub fn default_builtins() -> HashSet<String> {
    NODE_BUILTIN_MODULES.iter().map(|s| s.to_string()).collect()
}
