use crate::errors::{Error, Result};
use crate::substitutions::Substitution;
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::HashSet;
use tracing::debug;

/// Core engine for simultaneous multi-pattern replacement.
///
/// All `old` patterns are compiled into one leftmost-longest Aho-Corasick
/// automaton. Applying the engine is a single left-to-right pass: at each
/// position the longest pattern starting there is replaced, the scan resumes
/// after the consumed input, and replacement text is never re-scanned. So
/// `a -> b, b -> c` turns `"ab"` into `"bc"`, never `"cc"`.
pub struct Replacer {
    automaton: Option<AhoCorasick>,
    replacements: Vec<String>,
}

/// The outcome of running the engine over one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    /// The rewritten content.
    pub content: Vec<u8>,
    /// How many pattern occurrences were substituted.
    pub replacements: usize,
}

impl Replacer {
    /// Builds the engine from an ordered list of substitution pairs.
    ///
    /// An empty `old` is rejected. When the same `old` is listed more than
    /// once only the first mapping is kept, which is the one the scan would
    /// pick anyway.
    pub fn new(pairs: &[Substitution]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut patterns = Vec::with_capacity(pairs.len());
        let mut replacements = Vec::with_capacity(pairs.len());

        for (idx, pair) in pairs.iter().enumerate() {
            if pair.old.is_empty() {
                return Err(Error::Config(format!(
                    "substitution {} has an empty pattern",
                    idx + 1
                )));
            }
            if !seen.insert(pair.old.as_str()) {
                debug!("ignoring duplicate pattern {:?} at substitution {}", pair.old, idx + 1);
                continue;
            }
            patterns.push(pair.old.as_str());
            replacements.push(pair.new.clone());
        }

        if patterns.is_empty() {
            return Ok(Self {
                automaton: None,
                replacements,
            });
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| Error::Config(format!("building substitution automaton: {e}")))?;

        Ok(Self {
            automaton: Some(automaton),
            replacements,
        })
    }

    /// Number of distinct patterns the engine matches.
    pub fn pattern_count(&self) -> usize {
        self.replacements.len()
    }

    /// Rewrites `input` and reports how many substitutions were made.
    pub fn replace(&self, input: &[u8]) -> Replaced {
        let Some(ac) = &self.automaton else {
            return Replaced {
                content: input.to_vec(),
                replacements: 0,
            };
        };

        let mut content = Vec::with_capacity(input.len());
        let mut last = 0;
        let mut replacements = 0;
        for m in ac.find_iter(input) {
            content.extend_from_slice(&input[last..m.start()]);
            content.extend_from_slice(self.replacements[m.pattern().as_usize()].as_bytes());
            last = m.end();
            replacements += 1;
        }
        content.extend_from_slice(&input[last..]);

        Replaced {
            content,
            replacements,
        }
    }

    /// Rewrites a byte buffer.
    pub fn apply(&self, input: &[u8]) -> Vec<u8> {
        self.replace(input).content
    }

    /// Rewrites a string. Patterns are valid UTF-8, so matches always fall on
    /// character boundaries.
    pub fn apply_str(&self, input: &str) -> String {
        match &self.automaton {
            Some(ac) => ac.replace_all(input, self.replacements.as_slice()),
            None => input.to_string(),
        }
    }
}
