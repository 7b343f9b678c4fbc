//! `treesub` is a library for recursive, filtered, multi-pattern find-and-replace.
//!
//! It provides the core logic for the `treesub` command-line tool but can also be
//! used as a standalone library. The main components are:
//!
//! - `filter`: walks a directory tree and selects files by base-name globs, with
//!   separate include/exclude lists for files and directories.
//! - `Replacer`: applies a list of `(old, new)` substitutions in one simultaneous
//!   left-to-right pass, longest match first.
//! - `substitutions`: loads substitution pairs from a two-column CSV file.
//! - `config`: resolves glob lists from the command line and an optional YAML file.
//! - `processor`: drives a run, rewriting files or collecting a dry-run summary.
//! - `report`: renders the changed-file list as text, JSON or CSV.
//!
//! Processing is sequential: files are handled one at a time in traversal order.

pub mod cli;
pub mod config;
pub mod errors;
pub mod filter;
pub mod logging;
pub mod processor;
pub mod replacer;
pub mod report;
pub mod substitutions;

// Re-export main types for easier access by library users.
pub use errors::{Error, Result};
pub use filter::{FilterEvent, FilterObserver, GlobFilterSet, select};
pub use processor::{Processor, RunSummary};
pub use replacer::Replacer;
pub use report::{OutputFormat, ReportFormatter};
pub use substitutions::Substitution;
