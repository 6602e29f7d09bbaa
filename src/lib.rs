//! pathfix library for detecting and fixing broken resource references.
//!
//! This library provides programmatic access to the path validation
//! functionality. The core workflow involves three phases:
//!
//! 1. **Scanning**: Collect markup/stylesheet/script/template files and
//!    extract embedded resource references with their byte spans
//! 2. **Classification**: Decide per reference whether it is a remote URL,
//!    an absolute in-tree path, or a relative path, and derive fix
//!    suggestions for broken ones
//! 3. **Rewriting**: Apply span-anchored fixes to source files
//!
//! # Example
//!
//! ```no_run
//! use pathfix::engine::{self, ScanOptions};
//! use std::path::Path;
//!
//! let options = ScanOptions::default();
//! let report = engine::scan(Path::new("./site"), &options).unwrap();
//! println!(
//!     "Found {} broken reference(s) in {} file(s)",
//!     report.invalid.len(),
//!     report.diagnostics.files_scanned
//! );
//!
//! // Apply every applicable suggestion in place.
//! let outcome = engine::fix(Path::new("./site"), &options).unwrap();
//! println!("Fixed {} reference(s)", outcome.fixed);
//! ```

pub mod analyzer;
pub mod engine;
pub mod index;
pub mod patterns;
pub mod rewriter;
pub mod scanner;

// Re-export commonly used types at crate root
pub use analyzer::{BrokenPath, Category, Classification, Defect, Diagnostics};
pub use engine::{FileError, FixOutcome, ScanOptions, ScanReport};
pub use patterns::ContentType;
pub use scanner::PathRef;
