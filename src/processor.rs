use crate::errors::{Error, Result};
use crate::filter::{self, FilterObserver, GlobFilterSet};
use crate::replacer::Replacer;
use crate::substitutions::load_substitutions;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Options for processing a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// If `true`, changes will be calculated but not written to disk.
    pub dry_run: bool,
}

/// The result of processing a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessResult {
    /// The number of substitutions made.
    pub changes: usize,
    /// `true` if the content differs from what was on disk.
    pub modified: bool,
}

/// A file whose content was (or, in a dry run, would be) rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    pub path: PathBuf,
    pub replacements: usize,
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub files_scanned: usize,
    pub total_replacements: usize,
    #[serde(rename = "files")]
    pub changed: Vec<ChangedFile>,
}

/// Applies one [`Replacer`] to files on disk.
pub struct Processor<'a> {
    replacer: &'a Replacer,
    options: ProcessOptions,
}

impl<'a> Processor<'a> {
    pub fn new(replacer: &'a Replacer, options: ProcessOptions) -> Self {
        Self { replacer, options }
    }

    /// Reads `path`, applies the replacer and, unless this is a dry run,
    /// writes the result back if anything changed.
    ///
    /// The write goes through a temporary file beside the real target that
    /// takes over the target's permissions before being renamed into place.
    pub fn process_file(&self, path: &Path) -> Result<ProcessResult> {
        let content = fs::read(path).map_err(|e| Error::processing(path, e))?;
        let replaced = self.replacer.replace(&content);
        let modified = replaced.content != content;

        if modified && !self.options.dry_run {
            write_preserving_permissions(path, &replaced.content)
                .map_err(|e| Error::processing(path, e))?;
        }

        Ok(ProcessResult {
            changes: replaced.replacements,
            modified,
        })
    }

    /// Processes `paths` in order. The first per-file error aborts the run.
    pub fn run(&self, paths: &[PathBuf]) -> Result<RunSummary> {
        let mut summary = RunSummary {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        for path in paths {
            let result = self.process_file(path)?;
            summary.files_scanned += 1;
            if result.modified {
                debug!(path = %path.display(), changes = result.changes, "modified");
                summary.total_replacements += result.changes;
                summary.changed.push(ChangedFile {
                    path: path.clone(),
                    replacements: result.changes,
                });
            }
        }

        Ok(summary)
    }
}

/// Replaces the content of the file `path` resolves to. Symlinks are written
/// through, so the link stays a link. Read-only files are refused.
fn write_preserving_permissions(path: &Path, content: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path)?;
    let perms = fs::metadata(&target)?.permissions();
    if perms.readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "file is read-only",
        ));
    }
    let parent = target.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content)?;
    fs::set_permissions(temp_file.path(), perms)?;
    temp_file.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

/// The main entry point for a replacement run.
///
/// 1. Loads the substitution pairs and builds the replacer.
/// 2. Walks `root` to collect the files selected by `filters`.
/// 3. Processes the files one at a time, in traversal order.
pub fn run_replace(
    pat_file: &Path,
    root: &Path,
    filters: &GlobFilterSet,
    options: ProcessOptions,
    observer: &mut dyn FilterObserver,
) -> Result<RunSummary> {
    let pairs = load_substitutions(pat_file)?;
    let replacer = Replacer::new(&pairs)?;

    let paths = filter::select(root, filters, observer);
    info!("selected {} files under {}", paths.len(), root.display());

    let summary = Processor::new(&replacer, options).run(&paths)?;
    info!(
        files_scanned = summary.files_scanned,
        files_changed = summary.changed.len(),
        total_replacements = summary.total_replacements,
        dry_run = summary.dry_run,
        "run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterEvent;
    use crate::substitutions::Substitution;
    use tempfile::TempDir;

    fn cycle() -> Replacer {
        Replacer::new(&[
            Substitution::new("a", "b"),
            Substitution::new("b", "c"),
            Substitution::new("c", "a"),
        ])
        .unwrap()
    }

    #[test]
    fn test_live_run_rewrites_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("in.txt");
        fs::write(&path, "abcdef").unwrap();

        let replacer = cycle();
        let result = Processor::new(&replacer, ProcessOptions::default())
            .process_file(&path)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "bcadef");
        assert!(result.modified);
        assert_eq!(result.changes, 3);
    }

    #[test]
    fn test_dry_run_never_writes() {
        let temp_dir = TempDir::new().unwrap();
        let hit = temp_dir.path().join("hit.txt");
        let miss = temp_dir.path().join("miss.txt");
        fs::write(&hit, "abc").unwrap();
        fs::write(&miss, "xyz").unwrap();

        let replacer = cycle();
        let summary = Processor::new(&replacer, ProcessOptions { dry_run: true })
            .run(&[hit.clone(), miss.clone()])
            .unwrap();

        assert_eq!(fs::read_to_string(&hit).unwrap(), "abc");
        assert_eq!(fs::read_to_string(&miss).unwrap(), "xyz");
        assert!(summary.dry_run);
        assert_eq!(summary.files_scanned, 2);
        assert_eq!(
            summary.changed,
            vec![ChangedFile {
                path: hit,
                replacements: 3
            }]
        );
    }

    #[test]
    fn test_matches_that_rewrite_to_same_text_are_not_changes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("same.txt");
        fs::write(&path, "keep").unwrap();

        let replacer = Replacer::new(&[Substitution::new("keep", "keep")]).unwrap();
        let result = Processor::new(&replacer, ProcessOptions::default())
            .process_file(&path)
            .unwrap();
        assert!(!result.modified);
        assert_eq!(result.changes, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_live_write_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("script.sh");
        fs::write(&path, "run a").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o750)).unwrap();

        let replacer = cycle();
        Processor::new(&replacer, ProcessOptions::default())
            .process_file(&path)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "run b");
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn test_live_write_follows_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target.txt");
        let link = temp_dir.path().join("link.txt");
        fs::write(&target, "a").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let replacer = cycle();
        let result = Processor::new(&replacer, ProcessOptions::default())
            .process_file(&link)
            .unwrap();

        assert!(result.modified);
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "b");
        assert_eq!(fs::read_to_string(&link).unwrap(), "b");
    }

    #[test]
    fn test_read_only_file_is_not_rewritten() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locked.txt");
        fs::write(&path, "abc").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        let replacer = cycle();
        let err = Processor::new(&replacer, ProcessOptions::default())
            .process_file(&path)
            .unwrap_err();

        assert!(matches!(err, Error::Processing { path: ref p, .. } if *p == path));
        assert!(err.to_string().contains("read-only"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "abc");

        // dry runs never write, so read-only files are still reported
        let result = Processor::new(&replacer, ProcessOptions { dry_run: true })
            .process_file(&path)
            .unwrap();
        assert!(result.modified);
    }

    #[test]
    fn test_missing_file_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.txt");
        let gone = temp_dir.path().join("gone.txt");
        let last = temp_dir.path().join("last.txt");
        fs::write(&first, "a").unwrap();
        fs::write(&last, "a").unwrap();

        let replacer = cycle();
        let err = Processor::new(&replacer, ProcessOptions::default())
            .run(&[first.clone(), gone.clone(), last.clone()])
            .unwrap_err();

        assert!(matches!(err, Error::Processing { ref path, .. } if *path == gone));
        assert_eq!(fs::read_to_string(&first).unwrap(), "b");
        assert_eq!(fs::read_to_string(&last).unwrap(), "a");
    }

    #[test]
    fn test_run_replace_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("tree");
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("in.txt"), "abcdef").unwrap();
        fs::write(root.join("in.md"), "abc").unwrap();
        fs::write(root.join(".git").join("HEAD"), "abc").unwrap();
        let pat = temp_dir.path().join("subs.csv");
        fs::write(&pat, "a,b\nb,c\nc,a\n").unwrap();

        let filters = GlobFilterSet::new(&["*.txt".to_string()], &[], &[], &[]).unwrap();
        let mut events: Vec<FilterEvent> = Vec::new();
        let summary =
            run_replace(&pat, &root, &filters, ProcessOptions::default(), &mut events).unwrap();

        assert_eq!(summary.files_scanned, 1);
        assert_eq!(fs::read_to_string(root.join("in.txt")).unwrap(), "bcadef");
        assert_eq!(fs::read_to_string(root.join("in.md")).unwrap(), "abc");
        assert_eq!(fs::read_to_string(root.join(".git").join("HEAD")).unwrap(), "abc");
        assert!(events.iter().any(|e| matches!(e, FilterEvent::NoMatchFile { .. })));
    }

    #[test]
    fn test_bad_substitution_file_aborts_before_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let pat = temp_dir.path().join("subs.csv");
        fs::write(&pat, "a,b,c\n").unwrap();

        let mut events: Vec<FilterEvent> = Vec::new();
        let err = run_replace(
            &pat,
            temp_dir.path(),
            &GlobFilterSet::default(),
            ProcessOptions::default(),
            &mut events,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert!(events.is_empty());
    }
}
