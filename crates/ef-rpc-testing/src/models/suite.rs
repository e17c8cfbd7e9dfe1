// Inspired by https://github.com/paradigmxyz/reth/tree/main/testing/ef-tests
// Modified to use async running

use std::path::{Path, PathBuf};

use fixture_utils::filter::Filter;

use super::case::BlockchainTestCase;
use crate::traits::Suite;

pub struct BlockchainTestSuite {
    root: PathBuf,
    filter: Filter,
}

impl BlockchainTestSuite {
    #[must_use]
    pub const fn new(root: PathBuf, filter: Filter) -> Self {
        Self { root, filter }
    }
}

impl Suite for BlockchainTestSuite {
    type Case = BlockchainTestCase;

    fn suite_name(&self) -> String {
        format!("BlockchainTests/{}", self.root.display())
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn filter(&self) -> &Filter {
        &self.filter
    }
}
