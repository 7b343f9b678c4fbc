use crate::config::GlobLists;
use crate::report::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Recursively find and replace substitution patterns across a file tree.
///
/// `treesub` walks the tree below `--dir` and rewrites every selected file,
/// applying all substitutions from a CSV file of `old,new` pairs in one
/// simultaneous pass.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Recursively find and replace substitution patterns across a file tree",
    long_about = "treesub recursively walks the file tree and finds and replaces the patterns
found in a substitution file. The substitution file is a CSV file of
old,new substitutions. All substitutions are applied in a single pass,
so replacement text is never substituted again.

EXAMPLE:
  -- subs.csv --
  a,b
  b,c
  c,a
  -- in.txt --
  abcdef

  treesub --pat subs.csv --match '*.txt'

  -- in.txt --
  bcadef"
)]
pub struct Args {
    /// Path to the CSV file containing substitution patterns.
    #[arg(long = "pat", value_name = "FILE", env = "TREESUB_PAT")]
    pub pat: Option<PathBuf>,

    /// Path to the starting directory.
    #[arg(long, value_name = "DIRECTORY", default_value = ".", env = "TREESUB_DIR")]
    pub dir: PathBuf,

    /// Just print the names of files that would be modified.
    #[arg(long, env = "TREESUB_DRY_RUN")]
    pub dry_run: bool,

    /// Glob matching files to include (default *). May be repeated.
    #[arg(long = "match", value_name = "GLOB")]
    pub match_files: Vec<String>,

    /// Glob matching files to exclude (default .*). May be repeated.
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude_files: Vec<String>,

    /// Glob matching directories to include (default *). May be repeated.
    #[arg(long = "match-dir", value_name = "GLOB")]
    pub match_dirs: Vec<String>,

    /// Glob matching directories to exclude (default .*). May be repeated.
    #[arg(long = "exclude-dir", value_name = "GLOB")]
    pub exclude_dirs: Vec<String>,

    /// Optional YAML file supplying globs and the substitution file.
    #[arg(short, long, value_name = "FILE", env = "TREESUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Format of the dry-run report.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log debug output.
    #[arg(short, long, env = "TREESUB_VERBOSE")]
    pub verbose: bool,
}

impl Args {
    /// The glob lists given on the command line, defaults not yet applied.
    pub fn glob_lists(&self) -> GlobLists {
        GlobLists {
            include_files: self.match_files.clone(),
            exclude_files: self.exclude_files.clone(),
            include_dirs: self.match_dirs.clone(),
            exclude_dirs: self.exclude_dirs.clone(),
        }
    }
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
