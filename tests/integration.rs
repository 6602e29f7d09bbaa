//! End-to-end scan/fix tests over throwaway project trees.

use pathfix::analyzer::Defect;
use pathfix::engine::{self, ScanOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (relative, content) in files {
        write(dir.path(), relative, content);
    }
    dir
}

#[test]
fn absolute_reference_at_root_is_flagged_with_relative_suggestion() {
    let dir = project(&[
        ("a.html", r#"<img src="/images/x.png">"#),
        ("images/x.png", "png"),
    ]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.invalid.len(), 1);
    let broken = &report.invalid[0];
    assert_eq!(broken.reference.raw, "/images/x.png");
    assert_eq!(broken.defect, Defect::AbsolutePath);
    assert_eq!(broken.suggestion.as_deref(), Some("./images/x.png"));
}

#[test]
fn missing_file_without_candidates_gets_manual_check_message() {
    let dir = project(&[("pages/b.html", r#"<script src="lib/app.js"></script>"#)]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.invalid.len(), 1);
    let broken = &report.invalid[0];
    assert_eq!(broken.defect, Defect::MissingFile);
    assert_eq!(broken.suggestion, None);
    assert_eq!(
        broken.reason.as_deref(),
        Some("Check if the file was moved or renamed manually.")
    );
}

#[test]
fn missing_file_with_unique_candidate_gets_relative_suggestion() {
    let dir = project(&[
        ("pages/b.html", r#"<script src="lib/app.js"></script>"#),
        ("assets/js/app.js", "js"),
    ]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.invalid.len(), 1);
    assert_eq!(
        report.invalid[0].suggestion.as_deref(),
        Some("../assets/js/app.js")
    );
}

#[test]
fn reference_escaping_the_project_root_is_never_fixed() {
    let dir = project(&[("index.html", r#"<a href="../../../outside.html">x</a>"#)]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.invalid.len(), 1);
    assert_eq!(report.invalid[0].defect, Defect::EscapesRoot);
    assert_eq!(report.invalid[0].suggestion, None);

    let outcome = engine::fix(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(outcome.fixed, 0);
    assert_eq!(outcome.manual, 1);
    let content = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert_eq!(content, r#"<a href="../../../outside.html">x</a>"#);
}

#[test]
fn remote_urls_stay_valid_and_untouched() {
    let dir = project(&[("app.js", "fetch('https://example.com/api');")]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.valid.len(), 1);
    assert_eq!(report.valid[0].raw, "https://example.com/api");
    assert!(report.invalid.is_empty());
}

#[test]
fn valid_relative_references_are_not_reported() {
    let dir = project(&[
        ("index.html", r#"<link href="css/site.css"><img src="images/logo.png">"#),
        ("css/site.css", "body {}"),
        ("images/logo.png", "png"),
    ]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.valid.len(), 2);
    assert!(report.invalid.is_empty());
}

#[test]
fn duplicate_references_are_reported_once() {
    let dir = project(&[(
        "index.html",
        "<img src=\"ghost.png\">\n<img src=\"ghost.png\">",
    )]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.invalid.len(), 1);
    assert_eq!(report.invalid[0].reference.spans.len(), 2);
}

#[test]
fn fixing_twice_leaves_nothing_to_fix() {
    let dir = project(&[
        ("a.html", r#"<img src="/images/x.png">"#),
        ("pages/b.html", r#"<script src="lib/app.js"></script>"#),
        ("images/x.png", "png"),
        ("assets/js/app.js", "js"),
    ]);

    let first = engine::fix(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(first.fixed, 2);
    assert_eq!(first.failed, 0);

    let second = engine::fix(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(second.fixed, 0);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert!(report.invalid.is_empty());
}

#[test]
fn fix_rewrites_every_occurrence_of_a_duplicated_reference() {
    let dir = project(&[
        (
            "index.html",
            "<img src=\"/img/a.png\">\n<img src=\"/img/a.png\">",
        ),
        ("img/a.png", "png"),
    ]);

    let outcome = engine::fix(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(outcome.fixed, 1);

    let content = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert_eq!(
        content,
        "<img src=\"./img/a.png\">\n<img src=\"./img/a.png\">"
    );

    let second = engine::fix(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(second.fixed, 0);
}

#[test]
fn template_files_are_scanned_across_embedded_languages() {
    let dir = project(&[
        (
            "index.php",
            concat!(
                "<?php include 'includes/header.php'; ?>\n",
                "<img src=\"/img/banner.png\">\n",
                "<style>body { background-image: url('img/bg.png'); }</style>\n",
                "<script>const data = fetch('./api/data.json');</script>\n",
            ),
        ),
        ("includes/header.php", "<?php ?>"),
        ("img/banner.png", "png"),
        ("img/bg.png", "png"),
    ]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();

    let valid: Vec<_> = report.valid.iter().map(|r| r.raw.as_str()).collect();
    assert!(valid.contains(&"includes/header.php"));
    assert!(valid.contains(&"img/bg.png"));

    let broken: Vec<_> = report
        .invalid
        .iter()
        .map(|b| (b.reference.raw.as_str(), b.defect))
        .collect();
    assert!(broken.contains(&("/img/banner.png", Defect::AbsolutePath)));
    assert!(broken.contains(&("./api/data.json", Defect::MissingFile)));
}

#[test]
fn fixing_a_template_rewrites_only_the_broken_spans() {
    let dir = project(&[
        (
            "page.php",
            "<?php include 'includes/header.php'; ?>\n<img src=\"/img/logo.png\">\n",
        ),
        ("includes/header.php", "<?php ?>"),
        ("img/logo.png", "png"),
    ]);

    let outcome = engine::fix(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(outcome.fixed, 1);

    let content = fs::read_to_string(dir.path().join("page.php")).unwrap();
    assert_eq!(
        content,
        "<?php include 'includes/header.php'; ?>\n<img src=\"./img/logo.png\">\n"
    );
}

#[test]
fn multiple_candidates_prefer_the_closest_match() {
    let dir = project(&[
        ("pages/b.html", r#"<script src="app.js"></script>"#),
        ("pages/lib/app.js", "js"),
        ("assets/js/deep/app.js", "js"),
    ]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.invalid.len(), 1);
    assert_eq!(report.invalid[0].suggestion.as_deref(), Some("./lib/app.js"));
}

#[test]
fn excluded_directories_are_invisible_to_scan_and_index() {
    let dir = project(&[
        ("index.html", r#"<script src="app.js"></script>"#),
        ("node_modules/pkg/app.js", "js"),
    ]);

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    // The only candidate lives in node_modules, which the index never sees.
    assert_eq!(report.invalid.len(), 1);
    assert_eq!(report.invalid[0].defect, Defect::MissingFile);
    assert_eq!(report.invalid[0].suggestion, None);
}

#[test]
fn user_exclude_globs_narrow_the_scan() {
    let dir = project(&[
        ("index.html", r#"<img src="ghost.png">"#),
        ("legacy/old.html", r#"<img src="ghost.png">"#),
    ]);

    let options = ScanOptions {
        excludes: vec!["legacy".to_string()],
        ..ScanOptions::default()
    };
    let report = engine::scan(dir.path(), &options).unwrap();
    assert_eq!(report.diagnostics.files_scanned, 1);
    assert_eq!(report.invalid.len(), 1);
}

#[test]
fn unreadable_files_do_not_abort_the_run() {
    let dir = project(&[
        ("ok.html", r#"<img src="x.png">"#),
        ("x.png", "png"),
    ]);
    fs::write(dir.path().join("bad.html"), [0xff, 0xfe, 0x80]).unwrap();

    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.valid.len(), 1);
    assert_eq!(report.diagnostics.files_errored, 1);
}

#[test]
fn empty_project_scans_clean() {
    let dir = tempfile::tempdir().unwrap();
    let report = engine::scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(report.diagnostics.files_scanned, 0);
    assert!(report.valid.is_empty());
    assert!(report.invalid.is_empty());
}
