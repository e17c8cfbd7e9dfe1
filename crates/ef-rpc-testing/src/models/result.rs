use std::path::{Path, PathBuf};

use tracing::{error, info};

use super::{case::Stage, error::RunnerError};

/// A case failure, with the last stage the case completed.
#[derive(Debug, thiserror::Error)]
#[error("failed after stage {stage}: {error}")]
pub struct CaseFailure {
    pub stage: Stage,
    pub error: RunnerError,
}

#[derive(Debug)]
pub enum Outcome {
    Passed,
    Skipped,
    Failed(CaseFailure),
}

/// The result of running a test case.
#[derive(Debug)]
pub struct CaseResult {
    /// The path to the fixture file holding the case.
    pub path: PathBuf,
    /// The name of the case inside the fixture file.
    pub name: String,
    pub outcome: Outcome,
}

impl CaseResult {
    pub fn new(path: &Path, name: &str, result: Result<(), CaseFailure>) -> Self {
        Self {
            path: path.into(),
            name: name.to_string(),
            outcome: match result {
                Ok(()) => Outcome::Passed,
                Err(failure) => Outcome::Failed(failure),
            },
        }
    }

    pub fn skipped(path: &Path, name: &str) -> Self {
        Self {
            path: path.into(),
            name: name.to_string(),
            outcome: Outcome::Skipped,
        }
    }

    pub fn failure(&self) -> Option<&CaseFailure> {
        match &self.outcome {
            Outcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A fixture file which could not be walked or loaded.
#[derive(Debug)]
pub struct FileError {
    pub path: PathBuf,
    pub error: RunnerError,
}

/// Everything a suite run produced.
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub suite_name: String,
    pub files_attempted: usize,
    pub files_skipped: usize,
    pub file_errors: Vec<FileError>,
    pub cases: Vec<CaseResult>,
}

impl SuiteReport {
    pub fn new(suite_name: String) -> Self {
        Self {
            suite_name,
            ..Default::default()
        }
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.cases.iter().filter(|case| predicate(&case.outcome)).count()
    }

    pub fn passed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Skipped))
    }

    /// True when no case failed and every file could be loaded.
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.file_errors.is_empty()
    }

    pub fn log_summary(&self) {
        for case in &self.cases {
            if let Some(failure) = case.failure() {
                error!(path = %case.path.display(), case = %case.name, "{failure}");
            }
        }
        for file in &self.file_errors {
            error!(path = %file.path.display(), "{}", file.error);
        }

        info!(
            suite = %self.suite_name,
            files = self.files_attempted,
            files_skipped = self.files_skipped,
            file_errors = self.file_errors.len(),
            passed = self.passed(),
            failed = self.failed(),
            skipped = self.skipped(),
            "suite finished"
        );
    }
}
