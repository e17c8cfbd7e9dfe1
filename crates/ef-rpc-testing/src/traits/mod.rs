//! Traits definition
//! Inspired by <https://github.com/paradigmxyz/reth/tree/main/testing/ef-tests>
use std::{fmt::Debug, path::Path};

use async_trait::async_trait;
use fixture_utils::{dir_reader::DirReader, filter::Filter, path::PathWrapper};
use ipc_client::JsonRpcClient;
use tracing::{error, info, warn};

use crate::models::{
    error::RunnerError,
    result::{CaseFailure, CaseResult, FileError, SuiteReport},
};

/// A single test case, capable of loading a JSON description of itself and running it.
#[async_trait]
pub trait Case: Debug + Sync + Send + Sized {
    /// Loads every test case of the fixture file at `path`.
    fn load(path: &Path) -> Result<Vec<Self>, RunnerError>;

    fn name(&self) -> &str;

    /// Run the test case against the client behind `client`.
    async fn run<C: JsonRpcClient>(&self, client: &C) -> Result<(), CaseFailure>;
}

/// A collection of fixture files sharing a root directory and a deny-list.
#[async_trait]
pub trait Suite: Sync {
    type Case: Case;

    fn suite_name(&self) -> String;

    /// The directory holding the fixture files.
    fn root(&self) -> &Path;

    fn filter(&self) -> &Filter;

    /// Runs every case of every fixture file found under [`Suite::root`], one
    /// after the other.
    async fn run<C: JsonRpcClient>(&self, client: &C) -> SuiteReport {
        let mut report = SuiteReport::new(self.suite_name());

        let files = match DirReader::new().walk_dir_and_store_files(self.root()) {
            Ok(reader) => reader.into_files(),
            Err(err) => {
                error!(root = %self.root().display(), "{err}");
                report.file_errors.push(FileError {
                    path: self.root().into(),
                    error: err.into(),
                });
                return report;
            }
        };

        for file in files {
            if self.filter().is_skipped(&file) {
                let relative = file.relative_to(self.root());
                warn!(path = %relative.display(), "skipping fixture file");
                report.files_skipped += 1;
                continue;
            }
            run_file::<Self::Case, C>(&file, self.root(), self.filter(), client, &mut report).await;
        }

        report
    }
}

async fn run_file<T: Case, C: JsonRpcClient>(
    file: &PathWrapper,
    root: &Path,
    filter: &Filter,
    client: &C,
    report: &mut SuiteReport,
) {
    let relative = file.relative_to(root);
    info!(path = %relative.display(), "running fixture file");
    report.files_attempted += 1;

    let cases = match T::load(file) {
        Ok(cases) => cases,
        Err(error) => {
            error!(path = %file.display(), "{error}");
            report.file_errors.push(FileError {
                path: file.to_path_buf(),
                error,
            });
            return;
        }
    };

    for case in cases {
        if filter.is_case_skipped(file, case.name()) {
            warn!(path = %file.display(), case = case.name(), "skipping test case");
            report.cases.push(CaseResult::skipped(file, case.name()));
            continue;
        }

        let result = case.run(client).await;
        if let Err(failure) = &result {
            error!(case = case.name(), "{failure}");
        } else {
            info!(case = case.name(), "passed");
        }
        report.cases.push(CaseResult::new(file, case.name(), result));
    }
}
