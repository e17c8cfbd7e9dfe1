use ipc_client::JsonRpcClient;
use serde_json::{Map, Value};
use tracing::debug;

use super::{assert_equal, hex_count, Validator};
use crate::{
    constants::{
        GET_BLOCK_BY_HASH, GET_BLOCK_BY_NUMBER, GET_BLOCK_TRANSACTION_COUNT_BY_HASH,
        GET_BLOCK_TRANSACTION_COUNT_BY_NUMBER, GET_TRANSACTION_BY_BLOCK_HASH_AND_INDEX,
        GET_TRANSACTION_BY_BLOCK_NUMBER_AND_INDEX, GET_UNCLE_BY_BLOCK_HASH_AND_INDEX,
        GET_UNCLE_BY_BLOCK_NUMBER_AND_INDEX, GET_UNCLE_COUNT_BY_BLOCK_HASH,
        GET_UNCLE_COUNT_BY_BLOCK_NUMBER, RPC_BLOCK_ONLY_FIELDS, RPC_TRANSACTION_ONLY_FIELDS,
    },
    models::{
        block_selector::BlockSelector, error::RunnerError, BlockFixture, BlockHeader,
        TransactionFixture,
    },
    normalizer::{strip_hex_prefix, RPC_BLOCK, RPC_TRANSACTION},
};

/// Picks the by-hash or by-number flavour of a method.
const fn method_for(at_block: &BlockSelector, by_hash: &'static str, by_number: &'static str) -> &'static str {
    if at_block.is_by_hash() {
        by_hash
    } else {
        by_number
    }
}

fn without_fields(mut object: Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    for field in fields {
        object.remove(*field);
    }
    object
}

impl<'a, C: JsonRpcClient> Validator<'a, C> {
    /// Checks the header, the transactions and the uncles of `block` against
    /// the block the client serves at `at_block`.
    pub async fn validate_block(
        &self,
        block: &BlockFixture,
        at_block: &BlockSelector,
    ) -> Result<(), RunnerError> {
        let header = block.block_header.as_ref().ok_or_else(|| {
            RunnerError::FixtureData("cannot validate a block without a header".into())
        })?;
        debug!(%at_block, transactions = block.transactions.len(), "validating block");

        let method = method_for(at_block, GET_BLOCK_BY_HASH, GET_BLOCK_BY_NUMBER);
        let expected = RPC_BLOCK.to_rpc_form(&header.0)?;
        let rpc_block = self
            .query_object(method, vec![at_block.to_param(), false.into()], &expected, || {
                format!("block at {at_block}")
            })
            .await?;

        let transaction_count = rpc_block
            .get("transactions")
            .and_then(Value::as_array)
            .map(Vec::len);
        assert_equal(
            || format!("block header at {at_block}"),
            Value::Object(expected),
            Value::Object(without_fields(rpc_block, &RPC_BLOCK_ONLY_FIELDS)),
        )?;
        if transaction_count != Some(block.transactions.len()) {
            return Err(RunnerError::mismatch(
                format!("transactions of block at {at_block}"),
                block.transactions.len().into(),
                transaction_count.map_or(Value::Null, Value::from),
            ));
        }

        for (index, transaction) in block.transactions.iter().enumerate() {
            self.validate_transaction_by_index(transaction, at_block, index)
                .await?;
        }
        self.validate_transaction_count(block, at_block).await?;

        self.validate_uncles(block, at_block).await
    }

    async fn validate_transaction_by_index(
        &self,
        transaction: &TransactionFixture,
        at_block: &BlockSelector,
        index: usize,
    ) -> Result<(), RunnerError> {
        let method = method_for(
            at_block,
            GET_TRANSACTION_BY_BLOCK_HASH_AND_INDEX,
            GET_TRANSACTION_BY_BLOCK_NUMBER_AND_INDEX,
        );
        let expected = RPC_TRANSACTION.to_rpc_form(&transaction.0)?;
        let context = || format!("transaction {index} of block at {at_block}");
        let actual = self
            .query_object(method, vec![at_block.to_param(), hex_count(index)], &expected, context)
            .await?;

        assert_equal(
            context,
            Value::Object(expected),
            Value::Object(without_fields(actual, &RPC_TRANSACTION_ONLY_FIELDS)),
        )
    }

    async fn validate_transaction_count(
        &self,
        block: &BlockFixture,
        at_block: &BlockSelector,
    ) -> Result<(), RunnerError> {
        let method = method_for(
            at_block,
            GET_BLOCK_TRANSACTION_COUNT_BY_HASH,
            GET_BLOCK_TRANSACTION_COUNT_BY_NUMBER,
        );
        let actual = self.query(method, vec![at_block.to_param()]).await?;
        assert_equal(
            || format!("transaction count of block at {at_block}"),
            hex_count(block.transactions.len()),
            actual,
        )
    }

    /// Checks the uncle count and every uncle header of `block`.
    pub async fn validate_uncles(
        &self,
        block: &BlockFixture,
        at_block: &BlockSelector,
    ) -> Result<(), RunnerError> {
        let method = method_for(
            at_block,
            GET_UNCLE_COUNT_BY_BLOCK_HASH,
            GET_UNCLE_COUNT_BY_BLOCK_NUMBER,
        );
        let actual = self.query(method, vec![at_block.to_param()]).await?;
        assert_equal(
            || format!("uncle count of block at {at_block}"),
            hex_count(block.uncle_headers.len()),
            actual,
        )?;

        for (index, uncle) in block.uncle_headers.iter().enumerate() {
            self.validate_uncle_by_index(uncle, at_block, index).await?;
        }
        Ok(())
    }

    async fn validate_uncle_by_index(
        &self,
        uncle: &BlockHeader,
        at_block: &BlockSelector,
        index: usize,
    ) -> Result<(), RunnerError> {
        let method = method_for(
            at_block,
            GET_UNCLE_BY_BLOCK_HASH_AND_INDEX,
            GET_UNCLE_BY_BLOCK_NUMBER_AND_INDEX,
        );
        let expected = RPC_BLOCK.to_rpc_form(&uncle.0)?;
        let context = || format!("uncle {index} of block at {at_block}");
        let actual = self
            .query_object(method, vec![at_block.to_param(), hex_count(index)], &expected, context)
            .await?;

        assert_equal(
            context,
            Value::Object(expected),
            Value::Object(without_fields(actual, &RPC_BLOCK_ONLY_FIELDS)),
        )
    }

    /// Validates the best block at `latest`, at its hash and at its number.
    pub async fn validate_last_block(&self, block: &BlockFixture) -> Result<(), RunnerError> {
        let header = block.block_header.as_ref().ok_or_else(|| {
            RunnerError::FixtureData("the last block has no header".into())
        })?;
        let hash = header
            .hash()
            .ok_or_else(|| RunnerError::FixtureData("the last block header has no hash".into()))?;
        let number = header
            .number()
            .ok_or_else(|| RunnerError::FixtureData("the last block header has no number".into()))?;
        let number = u64::from_str_radix(strip_hex_prefix(number), 16)
            .map_err(|err| RunnerError::FixtureData(format!("invalid block number {number}: {err}")))?;

        self.validate_block(block, &BlockSelector::LATEST).await?;
        self.validate_block(block, &hash.parse()?).await?;
        self.validate_block(block, &BlockSelector::Number(number)).await
    }
}
