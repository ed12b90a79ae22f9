//! Milestone input loading
//!
//! Input is JSON Lines: one milestone record per line, blank lines ignored.
//! Each record keeps its 1-based line number, which is the row reported in
//! layout errors.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use roadmap_layout::{MilestoneRecord, NormalizedRecord, normalize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// A raw record and the input line it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub line: usize,
    pub record: MilestoneRecord,
}

/// Records read from one input source
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub records: Vec<SourceRecord>,
    /// Display name of the source
    pub source: String,
}

impl LoadedInput {
    /// Normalize every record, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Layout` naming the offending input line.
    pub fn normalize(&self) -> CliResult<Vec<NormalizedRecord>> {
        self.records
            .iter()
            .map(|r| normalize(&r.record, r.line).map_err(CliError::from))
            .collect()
    }
}

/// Read records from a file, or from stdin when `input` is `None`.
///
/// # Errors
///
/// Returns `CliError::Read` if the file cannot be opened or read and
/// `CliError::ParseRecord` for a line that is not a valid record.
pub fn load_records(input: Option<&Path>) -> CliResult<LoadedInput> {
    match input {
        Some(path) => {
            let file = std::fs::File::open(path).map_err(|e| CliError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
            let reader = std::io::BufReader::new(file);
            let records = parse_lines(reader, path)?;
            Ok(LoadedInput {
                records,
                source: path.display().to_string(),
            })
        }
        None => {
            let stdin = std::io::stdin();
            let reader = stdin.lock();
            let records = parse_lines(reader, &PathBuf::from("<stdin>"))?;
            Ok(LoadedInput {
                records,
                source: "stdin".to_string(),
            })
        }
    }
}

/// Parse lines from a reader into records
pub fn parse_lines<R: BufRead>(reader: R, path: &Path) -> CliResult<Vec<SourceRecord>> {
    let mut records = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CliError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let record: MilestoneRecord =
            serde_json::from_str(&line).map_err(|e| CliError::ParseRecord {
                path: path.to_path_buf(),
                line: line_num + 1,
                source: e,
            })?;
        records.push(SourceRecord {
            line: line_num + 1,
            record,
        });
    }
    debug!("Read {} record(s) from {}", records.len(), path.display());
    Ok(records)
}
