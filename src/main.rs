//! pathfix: Detect and fix broken resource references in web projects.
//!
//! Scans markup, stylesheets, scripts and server templates for embedded
//! resource paths, classifies each one against the project tree, and
//! suggests or applies fixes for broken references.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands};
use colored::Colorize;
use dialoguer::Confirm;
use glob::Pattern;
use pathfix::engine::{self, FileFixes, ScanOptions, ScanReport};
use pathfix::index::FileIndex;
use pathfix::scanner;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Check {
            root,
            exclude,
            no_default_excludes,
            json,
            verbose,
        } => cmd_check(&root, scan_options(exclude, no_default_excludes), json, verbose),
        Commands::Fix {
            root,
            exclude,
            no_default_excludes,
            interactive,
            yes,
        } => cmd_fix(
            &root,
            scan_options(exclude, no_default_excludes),
            interactive,
            yes,
        ),
        Commands::Scan {
            root,
            exclude,
            no_default_excludes,
        } => cmd_scan(&root, scan_options(exclude, no_default_excludes)),
        Commands::Index {
            root,
            exclude,
            no_default_excludes,
        } => cmd_index(&root, scan_options(exclude, no_default_excludes)),
    }
}

fn scan_options(excludes: Vec<String>, no_default_excludes: bool) -> ScanOptions {
    ScanOptions {
        excludes,
        default_excludes: !no_default_excludes,
        ..ScanOptions::default()
    }
}

fn cmd_check(root: &Path, options: ScanOptions, json_output: bool, verbose: bool) -> Result<()> {
    let report = engine::scan(root, &options)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, verbose);
    }

    if !report.invalid.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_fix(root: &Path, options: ScanOptions, interactive: bool, yes: bool) -> Result<()> {
    let report = engine::scan(root, &options)?;

    if report.invalid.is_empty() {
        println!("{} No broken references found", "ok:".green().bold());
        return Ok(());
    }

    let groups = engine::fixes_by_file(&report);
    let fixable: usize = groups.iter().map(|g| g.changes.len()).sum();
    let manual = report.invalid.len() - fixable;

    if fixable == 0 {
        println!(
            "{} {} broken reference(s), none fixable automatically",
            "info:".blue().bold(),
            report.invalid.len()
        );
        print_manual_refs(&report);
        return Ok(());
    }

    if !yes && !interactive {
        let confirmed = Confirm::new()
            .with_prompt(format!("Apply {} suggested fix(es)?", fixable))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{} No changes were made", "info:".blue().bold());
            return Ok(());
        }
    }

    let mut fixed = 0;
    let mut failed = 0;
    let mut skipped = 0;

    for group in &groups {
        println!("\n{} {}", "Updating:".yellow().bold(), group.file.display());
        print_group_changes(group);

        if interactive {
            let confirmed = Confirm::new()
                .with_prompt("Apply these changes?")
                .default(true)
                .interact()?;
            if !confirmed {
                skipped += group.changes.len();
                continue;
            }
        }

        match engine::apply_file_fixes(group) {
            Ok(applied) => fixed += applied,
            Err(err) => {
                eprintln!("{} {:#}", "warn:".yellow().bold(), err);
                failed += group.changes.len();
            }
        }
    }

    println!(
        "\n{} Fixed {} reference(s) ({} failed, {} skipped, {} need manual attention)",
        "ok:".green().bold(),
        fixed,
        failed,
        skipped,
        manual
    );
    if manual > 0 {
        print_manual_refs(&report);
    }

    Ok(())
}

fn cmd_scan(root: &Path, options: ScanOptions) -> Result<()> {
    let root = canonical_root(root)?;
    let excludes = compile_excludes(&options.excludes)?;
    let files = scanner::collect_source_files(
        &root,
        &options.extensions,
        &excludes,
        options.default_excludes,
    )?;

    println!("Would scan {} file(s):", files.len());
    for file in files {
        println!("  {}", relative_display(&file, &root));
    }

    Ok(())
}

fn cmd_index(root: &Path, options: ScanOptions) -> Result<()> {
    let root = canonical_root(root)?;
    let excludes = compile_excludes(&options.excludes)?;
    let index = FileIndex::build(&root, &excludes, options.default_excludes)?;

    println!("Indexed {} file(s):", index.len());
    for entry in index.entries() {
        println!("  {}", relative_display(entry, &root).dimmed());
    }

    Ok(())
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(root)
        .with_context(|| format!("Project root {} is not accessible", root.display()))
}

fn compile_excludes(globs: &[String]) -> Result<Vec<Pattern>> {
    globs
        .iter()
        .map(|g| Pattern::new(g).with_context(|| format!("Invalid exclude pattern '{g}'")))
        .collect()
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

fn print_report(report: &ScanReport, verbose: bool) {
    let d = &report.diagnostics;

    if verbose {
        eprintln!(
            "{} Files: {}, Refs: {} ({} valid, {} broken)",
            "info:".blue().bold(),
            d.files_scanned,
            d.total_refs,
            d.valid_refs,
            d.broken_refs
        );
        eprintln!(
            "{} Suggestions: {}, Unsuggestable: {}",
            "info:".blue().bold(),
            d.suggestions_found,
            d.unsuggestable
        );
    }

    for error in &report.errors {
        eprintln!(
            "{} {}: {}",
            "warn:".yellow().bold(),
            error.file.display(),
            error.error
        );
    }

    if report.invalid.is_empty() {
        println!("{} No broken references found", "ok:".green().bold());
        return;
    }

    println!(
        "\n{} {} broken reference(s):\n",
        "Found".red().bold(),
        report.invalid.len()
    );

    for broken in &report.invalid {
        let loc = format!(
            "{}:{}:{}",
            broken.reference.file.display(),
            broken.reference.line,
            broken.reference.column
        );

        println!(
            "  {} {} {}",
            loc.dimmed(),
            broken.reference.raw.red(),
            format!("[{}]", broken.defect).dimmed()
        );
        if let Some(ref suggestion) = broken.suggestion {
            println!("    {} {}", "->".green(), suggestion.green());
        } else if let Some(ref reason) = broken.reason {
            println!("    {}", reason.dimmed());
        }
    }
}

fn print_group_changes(group: &FileFixes<'_>) {
    for (reference, new_path) in &group.changes {
        println!(
            "  {}:{}: {} -> {}",
            reference.line,
            reference.column,
            reference.raw.red(),
            new_path.green()
        );
    }
}

fn print_manual_refs(report: &ScanReport) {
    for broken in report
        .invalid
        .iter()
        .filter(|b| !b.defect.is_fixable() || b.suggestion.is_none())
    {
        println!(
            "  {} {} {}",
            format!(
                "{}:{}",
                broken.reference.file.display(),
                broken.reference.line
            )
            .dimmed(),
            broken.reference.raw.red(),
            format!(
                "({})",
                broken.reason.as_deref().unwrap_or("no suggestion")
            )
            .dimmed()
        );
    }
}
