use lazy_static::lazy_static;
use std::path::PathBuf;

// Test harness methods
pub const RESET_TO_GENESIS_FIXTURE: &str = "evm_resetToGenesisFixture";
pub const APPLY_BLOCK_FIXTURE: &str = "evm_applyBlockFixture";

// Account state
pub const GET_BALANCE: &str = "eth_getBalance";
pub const GET_CODE: &str = "eth_getCode";
pub const GET_TRANSACTION_COUNT: &str = "eth_getTransactionCount";
pub const GET_STORAGE_AT: &str = "eth_getStorageAt";

// Blocks, selected by hash or by number/tag
pub const GET_BLOCK_BY_HASH: &str = "eth_getBlockByHash";
pub const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
pub const GET_BLOCK_TRANSACTION_COUNT_BY_HASH: &str = "eth_getBlockTransactionCountByHash";
pub const GET_BLOCK_TRANSACTION_COUNT_BY_NUMBER: &str = "eth_getBlockTransactionCountByNumber";
pub const GET_TRANSACTION_BY_BLOCK_HASH_AND_INDEX: &str = "eth_getTransactionByBlockHashAndIndex";
pub const GET_TRANSACTION_BY_BLOCK_NUMBER_AND_INDEX: &str =
    "eth_getTransactionByBlockNumberAndIndex";
pub const GET_UNCLE_COUNT_BY_BLOCK_HASH: &str = "eth_getUncleCountByBlockHash";
pub const GET_UNCLE_COUNT_BY_BLOCK_NUMBER: &str = "eth_getUncleCountByBlockNumber";
pub const GET_UNCLE_BY_BLOCK_HASH_AND_INDEX: &str = "eth_getUncleByBlockHashAndIndex";
pub const GET_UNCLE_BY_BLOCK_NUMBER_AND_INDEX: &str = "eth_getUncleByBlockNumberAndIndex";

/// Fields of an RPC block that have no counterpart in a fixture header.
pub const RPC_BLOCK_ONLY_FIELDS: [&str; 4] = ["size", "totalDifficulty", "transactions", "uncles"];
/// Fields of an RPC transaction that have no counterpart in a fixture transaction.
pub const RPC_TRANSACTION_ONLY_FIELDS: [&str; 1] = ["hash"];

pub const DEFAULT_SKIP_FILE: &str = "fixtures-skip.yml";
pub const DEFAULT_LOG_FILTER: &str = "ef_rpc_testing=info,ipc_client=info";

lazy_static! {
    pub static ref DEFAULT_SKIP_FILE_PATH: PathBuf =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(DEFAULT_SKIP_FILE);
}
