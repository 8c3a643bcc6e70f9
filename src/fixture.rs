//! Conformance fixtures.
//!
//! A case directory holds `*.json` cluster files plus one or more `*.spec`
//! files. A spec file is a list of records separated by blank lines:
//!
//! ```text
//! # comment
//! %web - web1
//! web2
//! web3
//!
//! count(%web)
//! 3
//! ```
//!
//! The first line of a record is the expression, the rest are the expected
//! members. A record with no member lines expects the empty set.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::loader::{self, files_with_extension};
use crate::result::ResultSet;
use crate::state::State;

#[derive(Debug, Clone, PartialEq)]
pub struct SpecRecord {
    pub path: PathBuf,
    /// 1-based line of the expression
    pub line: usize,
    pub expression: String,
    pub expected: ResultSet,
}

#[derive(Debug)]
pub enum SpecOutcome {
    Pass(SpecRecord),
    Mismatch { record: SpecRecord, actual: ResultSet },
    Failed { record: SpecRecord, error: Error },
}

impl SpecOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, SpecOutcome::Pass(_))
    }

    pub fn record(&self) -> &SpecRecord {
        match self {
            SpecOutcome::Pass(record)
            | SpecOutcome::Mismatch { record, .. }
            | SpecOutcome::Failed { record, .. } => record,
        }
    }
}

impl fmt::Display for SpecOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        write!(f, "{}:{}: `{}` ", record.path.display(), record.line, record.expression)?;
        match self {
            SpecOutcome::Pass(_) => write!(f, "ok"),
            SpecOutcome::Mismatch { record, actual } => write!(
                f,
                "expected [{}], got [{}]",
                record.expected.sorted().join(","),
                actual.sorted().join(",")
            ),
            SpecOutcome::Failed { error, .. } => write!(f, "error: {}", error),
        }
    }
}

/// Splits fixture text into records.
pub fn parse_specs(text: &str, path: &Path) -> Vec<SpecRecord> {
    let mut records = Vec::new();
    let mut current: Option<SpecRecord> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            records.extend(current.take());
            continue;
        }
        match current.as_mut() {
            Some(record) => record.expected.add(line),
            None => {
                current = Some(SpecRecord {
                    path: path.to_path_buf(),
                    line: index + 1,
                    expression: line.to_string(),
                    expected: ResultSet::new(),
                })
            }
        }
    }
    records.extend(current);
    records
}

pub fn parse_spec_file(path: &Path) -> Result<Vec<SpecRecord>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_specs(&text, path))
}

/// Evaluates one record against `state`.
pub fn run_record(state: &State, record: SpecRecord) -> SpecOutcome {
    match state.query(&record.expression) {
        Ok(actual) if actual == record.expected => SpecOutcome::Pass(record),
        Ok(actual) => SpecOutcome::Mismatch { record, actual },
        Err(error) => SpecOutcome::Failed { record, error },
    }
}

/// Loads the clusters of a case directory and runs all of its spec files.
pub fn run_case_dir(dir: &Path) -> Result<Vec<SpecOutcome>> {
    run_case_dir_with(dir, &State::new())
}

/// Like [`run_case_dir`], starting from a copy of `base`: its config and
/// clusters apply, and the case's own clusters are loaded on top.
pub fn run_case_dir_with(dir: &Path, base: &State) -> Result<Vec<SpecOutcome>> {
    let mut state = base.clone();
    loader::load_dir(&mut state, dir)?;

    let mut outcomes = Vec::new();
    for path in files_with_extension(dir, "spec")? {
        for record in parse_spec_file(&path)? {
            let outcome = run_record(&state, record);
            if !outcome.is_pass() {
                warn!("{}", outcome);
            }
            outcomes.push(outcome);
        }
    }
    debug!(dir = %dir.display(), records = outcomes.len(), "case directory evaluated");
    Ok(outcomes)
}

/// Every directory under `root` (inclusive) that holds a `.spec` file.
pub fn walk_cases(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::Load {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut cases = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        if !files_with_extension(&dir, "spec")?.is_empty() {
            cases.push(dir.clone());
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            }
        }
    }
    cases.sort();
    Ok(cases)
}
