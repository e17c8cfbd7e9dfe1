pub mod block_selector;
pub mod case;
pub mod error;
pub mod result;
pub mod suite;

use std::{collections::BTreeMap, ops::Deref};

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A typed view over a fixture value which also keeps the exact JSON it was
/// read from. Serializing it writes the original JSON back untouched, which is
/// what the test harness RPC methods expect.
#[derive(Debug, Clone)]
pub struct Verbatim<T> {
    inner: T,
    raw: Value,
}

impl<T: DeserializeOwned> Verbatim<T> {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let inner = T::deserialize(&raw)?;
        Ok(Self { inner, raw })
    }
}

impl<T> Verbatim<T> {
    pub const fn raw(&self) -> &Value {
        &self.raw
    }
}

impl<T> Deref for Verbatim<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Verbatim<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(raw).map_err(serde::de::Error::custom)
    }
}

impl<T> Serialize for Verbatim<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

/// The definition of a blockchain test case.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// The test pre-state.
    pub pre: AccountStateMap,
    /// Block data.
    #[serde(default)]
    pub blocks: Vec<Verbatim<BlockFixture>>,
    /// The expected post state.
    pub post_state: AccountStateMap,
    /// Hash of the best block.
    #[serde(default)]
    pub lastblockhash: Option<String>,
}

impl TestCase {
    /// Returns the block whose header hash is `hash`, if any.
    pub fn find_block(&self, hash: &str) -> Option<&BlockFixture> {
        self.blocks
            .iter()
            .map(|block| &**block)
            .find(|block| block.block_header.as_ref().and_then(BlockHeader::hash) == Some(hash))
    }
}

pub type AccountStateMap = BTreeMap<String, AccountState>;

/// An account in the pre or post state of a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: String,
    pub code: String,
    pub nonce: String,
    #[serde(default)]
    pub storage: BTreeMap<String, String>,
}

impl AccountState {
    /// Returns the scalar field `name` (`balance`, `code` or `nonce`).
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "balance" => Some(&self.balance),
            "code" => Some(&self.code),
            "nonce" => Some(&self.nonce),
            _ => None,
        }
    }
}

/// A block in an Ethereum blockchain test.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFixture {
    /// Block header, present for blocks the client is expected to accept.
    pub block_header: Option<BlockHeader>,
    #[serde(default)]
    pub transactions: Vec<TransactionFixture>,
    /// Uncle/ommer headers
    #[serde(default)]
    pub uncle_headers: Vec<BlockHeader>,
    /// RLP encoded block bytes
    pub rlp: Option<String>,
    /// Set on blocks with a deliberately malformed encoding.
    #[serde(rename = "rlp_error")]
    pub rlp_error: Option<Value>,
}

/// A block header with fixture field names, kept as an ordered object so
/// every field takes part in the comparison.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BlockHeader(pub Map<String, Value>);

impl BlockHeader {
    pub fn hash(&self) -> Option<&str> {
        self.0.get("hash").and_then(Value::as_str)
    }

    pub fn number(&self) -> Option<&str> {
        self.0.get("number").and_then(Value::as_str)
    }
}

/// A transaction with fixture field names.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TransactionFixture(pub Map<String, Value>);
