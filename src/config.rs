use crate::errors::{Error, Result};
use crate::filter::GlobFilterSet;
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings read from an optional YAML configuration file.
///
/// ```yaml
/// pat: subs.csv
/// match: ['*.go', '*.md']
/// exclude_dir: ['.*', vendor]
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Path to the substitution CSV.
    pub pat: Option<PathBuf>,
    /// Globs selecting files.
    #[serde(rename = "match")]
    pub match_files: Vec<String>,
    /// Globs rejecting files.
    pub exclude: Vec<String>,
    /// Globs selecting directories to descend into.
    pub match_dir: Vec<String>,
    /// Globs pruning directories.
    pub exclude_dir: Vec<String>,
}

/// The four raw glob lists, before defaults are applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GlobLists {
    pub include_files: Vec<String>,
    pub exclude_files: Vec<String>,
    pub include_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
}

impl GlobLists {
    /// Fills every empty list from `file`. Lists given on the command line
    /// replace the file's list rather than extending it.
    pub fn or_file(mut self, file: &FileConfig) -> Self {
        fill(&mut self.include_files, &file.match_files);
        fill(&mut self.exclude_files, &file.exclude);
        fill(&mut self.include_dirs, &file.match_dir);
        fill(&mut self.exclude_dirs, &file.exclude_dir);
        self
    }

    /// Compiles the lists, falling back to the defaults for any still empty.
    pub fn build(&self) -> Result<GlobFilterSet> {
        GlobFilterSet::new(
            &self.include_files,
            &self.exclude_files,
            &self.include_dirs,
            &self.exclude_dirs,
        )
    }
}

fn fill(target: &mut Vec<String>, from: &[String]) {
    if target.is_empty() {
        target.extend_from_slice(from);
    }
}

/// A utility for locating and loading configuration files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file by searching in a prioritized list of locations.
    ///
    /// The search order is:
    /// 1. The path as given (absolute, or relative to the current directory).
    /// 2. A path relative to the `working_dir`.
    /// 3. Inside the `~/.treesub` directory.
    pub fn find_config(config_path: &Path, working_dir: &Path) -> Result<PathBuf> {
        if config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        let mut tried_locations = vec![config_path.display().to_string()];
        if config_path.is_absolute() {
            return Err(not_found(config_path, &tried_locations));
        }

        let in_working_dir = working_dir.join(config_path);
        if in_working_dir.exists() {
            return Ok(in_working_dir);
        }
        tried_locations.push(in_working_dir.display().to_string());

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home).join(".treesub").join(config_path);
            if home_config.exists() {
                return Ok(home_config);
            }
            tried_locations.push(home_config.display().to_string());
        }

        Err(not_found(config_path, &tried_locations))
    }

    /// Loads a `FileConfig` from a YAML file.
    pub fn load_file_config(path: &Path) -> Result<FileConfig> {
        debug!("loading config file {}", path.display());
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}

fn not_found(config_path: &Path, tried: &[String]) -> Error {
    Error::Config(format!(
        "Config file '{}' not found. Searched in:\n  - {}",
        config_path.display(),
        tried.join("\n  - ")
    ))
}
