//! Filtered tree traversal: decides which files the replacer sees.
//!
//! Every directory and file below the root is tested by base name against
//! four glob lists. Exclusion is checked before inclusion at both levels, and
//! a directory that is excluded or not included is pruned as a whole subtree.

use crate::errors::{Error, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default include list: everything.
pub const DEFAULT_INCLUDE: &str = "*";
/// Default exclude list: dotfiles and dot-directories.
pub const DEFAULT_EXCLUDE: &str = ".*";

/// An ordered list of globs compiled into a single matcher.
#[derive(Debug, Clone)]
pub struct GlobList {
    patterns: Vec<String>,
    set: GlobSet,
}

impl GlobList {
    /// Compiles `patterns`. Globs are case-sensitive and `*` never crosses a
    /// path separator, though only base names are ever tested.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .backslash_escape(true)
                .build()
                .map_err(|source| Error::Glob {
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| Error::Glob {
            pattern: patterns.join(" "),
            source,
        })?;
        Ok(Self { patterns, set })
    }

    /// Returns the first glob, in listing order, matching `name`.
    pub fn first_match(&self, name: &OsStr) -> Option<&str> {
        self.set
            .matches(Path::new(name))
            .into_iter()
            .min()
            .map(|idx| self.patterns[idx].as_str())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// The four glob lists steering a traversal.
#[derive(Debug, Clone)]
pub struct GlobFilterSet {
    pub include_files: GlobList,
    pub exclude_files: GlobList,
    pub include_dirs: GlobList,
    pub exclude_dirs: GlobList,
}

impl GlobFilterSet {
    /// Builds a filter set, substituting the defaults for any empty list.
    pub fn new(
        include_files: &[String],
        exclude_files: &[String],
        include_dirs: &[String],
        exclude_dirs: &[String],
    ) -> Result<Self> {
        Ok(Self {
            include_files: list_or_default(include_files, DEFAULT_INCLUDE)?,
            exclude_files: list_or_default(exclude_files, DEFAULT_EXCLUDE)?,
            include_dirs: list_or_default(include_dirs, DEFAULT_INCLUDE)?,
            exclude_dirs: list_or_default(exclude_dirs, DEFAULT_EXCLUDE)?,
        })
    }
}

impl Default for GlobFilterSet {
    fn default() -> Self {
        // The default globs are constants known to compile.
        Self::new(&[], &[], &[], &[]).expect("default globs compile")
    }
}

fn list_or_default(patterns: &[String], default: &str) -> Result<GlobList> {
    if patterns.is_empty() {
        GlobList::new([default])
    } else {
        GlobList::new(patterns.iter().cloned())
    }
}

/// A single decision made while walking the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    /// A directory matched an exclude glob and was pruned.
    ExcludeDir { path: PathBuf, glob: String },
    /// A directory matched an include glob and will be descended into.
    MatchDir { path: PathBuf, glob: String },
    /// A directory matched no include glob and was pruned.
    NoMatchDir { path: PathBuf },
    /// A file matched an exclude glob.
    ExcludeFile { path: PathBuf, glob: String },
    /// A file matched an include glob and was selected.
    MatchFile { path: PathBuf, glob: String },
    /// A file matched no include glob.
    NoMatchFile { path: PathBuf },
    /// An entry could not be read; it was skipped.
    WalkError {
        path: Option<PathBuf>,
        message: String,
    },
}

/// Receives every decision the traversal makes.
pub trait FilterObserver {
    fn on_event(&mut self, event: FilterEvent);
}

/// Records events, mostly useful in tests.
impl FilterObserver for Vec<FilterEvent> {
    fn on_event(&mut self, event: FilterEvent) {
        self.push(event);
    }
}

/// Forwards decisions to `tracing`: walk errors at `warn`, everything else at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FilterObserver for TracingObserver {
    fn on_event(&mut self, event: FilterEvent) {
        match event {
            FilterEvent::ExcludeDir { path, glob } => {
                debug!(path = %path.display(), %glob, "exclude dir")
            }
            FilterEvent::MatchDir { path, glob } => {
                debug!(path = %path.display(), %glob, "match for dir")
            }
            FilterEvent::NoMatchDir { path } => debug!(path = %path.display(), "no match for dir"),
            FilterEvent::ExcludeFile { path, glob } => {
                debug!(path = %path.display(), %glob, "exclude file")
            }
            FilterEvent::MatchFile { path, glob } => {
                debug!(path = %path.display(), %glob, "match for file")
            }
            FilterEvent::NoMatchFile { path } => debug!(path = %path.display(), "no match for file"),
            FilterEvent::WalkError { path, message } => match path {
                Some(path) => warn!(path = %path.display(), "walking directories: {message}"),
                None => warn!("walking directories: {message}"),
            },
        }
    }
}

/// Walks `root` depth-first and returns the selected files in visiting order.
///
/// The root itself is never filtered. Symlinks are not followed; a link is
/// treated as a file and tested against the file globs.
pub fn select(root: &Path, filters: &GlobFilterSet, observer: &mut dyn FilterObserver) -> Vec<PathBuf> {
    let mut selected = Vec::new();
    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                observer.on_event(FilterEvent::WalkError {
                    path: err.path().map(Path::to_path_buf),
                    message: err.to_string(),
                });
                continue;
            }
        };

        let name = entry.file_name();
        let path = entry.path().to_path_buf();

        if entry.file_type().is_dir() {
            if entry.depth() == 0 {
                continue;
            }
            if let Some(glob) = filters.exclude_dirs.first_match(name) {
                observer.on_event(FilterEvent::ExcludeDir {
                    path,
                    glob: glob.to_string(),
                });
                walker.skip_current_dir();
            } else if let Some(glob) = filters.include_dirs.first_match(name) {
                observer.on_event(FilterEvent::MatchDir {
                    path,
                    glob: glob.to_string(),
                });
            } else {
                observer.on_event(FilterEvent::NoMatchDir { path });
                walker.skip_current_dir();
            }
            continue;
        }

        if let Some(glob) = filters.exclude_files.first_match(name) {
            observer.on_event(FilterEvent::ExcludeFile {
                path,
                glob: glob.to_string(),
            });
        } else if let Some(glob) = filters.include_files.first_match(name) {
            observer.on_event(FilterEvent::MatchFile {
                path: path.clone(),
                glob: glob.to_string(),
            });
            selected.push(path);
        } else {
            observer.on_event(FilterEvent::NoMatchFile { path });
        }
    }

    selected
}
