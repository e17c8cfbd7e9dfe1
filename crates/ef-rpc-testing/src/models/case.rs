// Inspired by https://github.com/paradigmxyz/reth/tree/main/testing/ef-tests

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use ipc_client::{JsonRpcClient, RpcResponse};
use serde_json::Value;
use tracing::{debug, info};

use super::{
    block_selector::BlockSelector, error::RunnerError, result::CaseFailure, BlockFixture,
    TestCase, Verbatim,
};
use crate::{
    constants::{APPLY_BLOCK_FIXTURE, RESET_TO_GENESIS_FIXTURE},
    traits::Case,
    utils::io::{deserialize_into, load_file},
    validation::Validator,
};

/// Progress of a test case run. On failure the last stage reached is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Uninitialized,
    GenesisLoaded,
    PreValidated,
    BlocksMined,
    PostValidated,
    PreReconfirmed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One named case of a blockchain test fixture file.
#[derive(Debug, Clone)]
pub struct BlockchainTestCase {
    pub path: PathBuf,
    pub name: String,
    /// The case exactly as written in the fixture file.
    pub fixture: Value,
}

#[async_trait]
impl Case for BlockchainTestCase {
    /// Loads every case of the fixture file at `path`, sorted by name. The
    /// cases are only type checked when they run, so a malformed case fails
    /// on its own.
    fn load(path: &Path) -> Result<Vec<Self>, RunnerError> {
        let s = load_file(path)?;
        let cases: BTreeMap<String, Value> = deserialize_into(&s, path)?;

        Ok(cases
            .into_iter()
            .map(|(name, fixture)| Self {
                path: path.into(),
                name,
                fixture,
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn run<C: JsonRpcClient>(&self, client: &C) -> Result<(), CaseFailure> {
        info!(case = %self.name, "running case");
        let mut stage = Stage::Uninitialized;
        let result = self.execute(client, &mut stage).await;
        result.map_err(|error| CaseFailure { stage, error })
    }
}

impl BlockchainTestCase {
    fn test_case(&self) -> Result<Verbatim<TestCase>, RunnerError> {
        Verbatim::from_value(self.fixture.clone()).map_err(|err| RunnerError::CouldNotDeserialize {
            path: self.path.clone(),
            error: format!("case {}: {}", self.name, err),
        })
    }

    async fn execute<C: JsonRpcClient>(
        &self,
        client: &C,
        stage: &mut Stage,
    ) -> Result<(), RunnerError> {
        let case = self.test_case()?;
        let validator = Validator::new(client);

        let response = client
            .request(RESET_TO_GENESIS_FIXTURE, vec![case.raw().clone()])
            .await?;
        if response != RpcResponse::Success(Value::Bool(true)) {
            return Err(RunnerError::protocol(RESET_TO_GENESIS_FIXTURE, response));
        }
        self.advance(stage, Stage::GenesisLoaded);

        validator
            .validate_accounts(&case.pre, &BlockSelector::LATEST)
            .await?;
        self.advance(stage, Stage::PreValidated);

        for (index, block) in case.blocks.iter().enumerate() {
            debug!(case = %self.name, index, "mining block");
            mine_block(client, &validator, block).await?;
        }
        self.advance(stage, Stage::BlocksMined);

        if let Some(hash) = &case.lastblockhash {
            match case.find_block(hash) {
                Some(block) => validator.validate_last_block(block).await?,
                None => debug!(case = %self.name, %hash, "no block matches the last block hash"),
            }
        }

        validator
            .validate_accounts(&case.post_state, &BlockSelector::LATEST)
            .await?;
        self.advance(stage, Stage::PostValidated);

        validator
            .validate_accounts(&case.pre, &BlockSelector::EARLIEST)
            .await?;
        self.advance(stage, Stage::PreReconfirmed);

        self.advance(stage, Stage::Done);
        Ok(())
    }

    fn advance(&self, stage: &mut Stage, next: Stage) {
        debug!(case = %self.name, %next, "stage reached");
        *stage = next;
    }
}

/// Submits `block` to the client. Blocks flagged with `rlp_error` are not
/// submitted, blocks without a header must be rejected.
async fn mine_block<C: JsonRpcClient>(
    client: &C,
    validator: &Validator<'_, C>,
    block: &Verbatim<BlockFixture>,
) -> Result<(), RunnerError> {
    match (&block.block_header, &block.rlp_error) {
        (Some(_), Some(_)) => Err(RunnerError::FixtureData(
            "block has both a blockHeader and an rlp_error".into(),
        )),
        (None, Some(_)) => {
            debug!("skipping block with a malformed encoding");
            Ok(())
        }
        (Some(header), None) => {
            let rlp = block.rlp.as_deref().ok_or_else(|| {
                RunnerError::FixtureData("block with a header has no rlp".into())
            })?;
            let hash = header
                .hash()
                .ok_or_else(|| RunnerError::FixtureData("block header has no hash".into()))?;

            let response = client
                .request(APPLY_BLOCK_FIXTURE, vec![block.raw().clone()])
                .await?;
            let result = match response {
                RpcResponse::Success(result) => result,
                failure => return Err(RunnerError::protocol(APPLY_BLOCK_FIXTURE, failure)),
            };
            if result != Value::String(rlp.to_string()) {
                return Err(RunnerError::mismatch(
                    "rlp of the applied block",
                    Value::String(rlp.to_string()),
                    result,
                ));
            }

            validator.validate_block(block, &hash.parse()?).await
        }
        (None, None) => {
            let response = client
                .request(APPLY_BLOCK_FIXTURE, vec![block.raw().clone()])
                .await?;
            if response.is_error() {
                Ok(())
            } else {
                Err(RunnerError::protocol(APPLY_BLOCK_FIXTURE, response))
            }
        }
    }
}
