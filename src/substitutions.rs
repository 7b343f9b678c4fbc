//! Loading of `old,new` substitution pairs from a CSV file.

use crate::errors::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One `(old, new)` mapping applied by the [`Replacer`](crate::Replacer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The text to search for. Never empty once accepted by the replacer.
    pub old: String,
    /// The text written in its place. May be empty.
    pub new: String,
}

impl Substitution {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Reads substitutions from a headerless two-column CSV file.
pub fn load_substitutions(path: &Path) -> Result<Vec<Substitution>> {
    let file = File::open(path).map_err(|e| {
        Error::Config(format!(
            "opening substitution patterns file {}: {e}",
            path.display()
        ))
    })?;
    let subs = read_substitutions(file).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
        other => other,
    })?;

    if subs.is_empty() {
        warn!("found no substitutions");
    } else {
        info!("found {} substitutions", subs.len());
    }
    Ok(subs)
}

/// Parses substitutions from any reader.
///
/// Every record must have exactly two fields; quoting follows RFC 4180 so
/// commas and newlines can appear inside either side.
pub fn read_substitutions<R: Read>(reader: R) -> Result<Vec<Substitution>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut subs = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.len() != 2 {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(Error::Config(format!(
                "record on line {line}: wrong number of fields (expected 2, found {})",
                record.len()
            )));
        }
        subs.push(Substitution::new(&record[0], &record[1]));
    }
    Ok(subs)
}
