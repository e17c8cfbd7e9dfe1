use std::{fmt, str::FromStr};

use serde_json::Value;

use super::error::RunnerError;

const BLOCK_HASH_LENGTH: usize = 66;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Earliest,
    Pending,
}

impl BlockTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Earliest => "earliest",
            Self::Pending => "pending",
        }
    }
}

/// Identifies the block an RPC query is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSelector {
    /// A `0x` prefixed 32 bytes block hash.
    Hash(String),
    Tag(BlockTag),
    Number(u64),
}

impl BlockSelector {
    pub const LATEST: Self = Self::Tag(BlockTag::Latest);
    pub const EARLIEST: Self = Self::Tag(BlockTag::Earliest);

    /// Whether by-hash RPC methods must be used for this selector.
    pub const fn is_by_hash(&self) -> bool {
        matches!(self, Self::Hash(_))
    }

    /// Renders the selector as an RPC parameter. Numbers are sent as JSON
    /// integers, hashes and tags as strings.
    pub fn to_param(&self) -> Value {
        match self {
            Self::Hash(hash) => Value::String(hash.clone()),
            Self::Tag(tag) => Value::String(tag.as_str().to_string()),
            Self::Number(number) => Value::from(*number),
        }
    }
}

fn is_block_hash(s: &str) -> bool {
    s.len() == BLOCK_HASH_LENGTH
        && (s.starts_with("0x") || s.starts_with("0X"))
        && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

impl FromStr for BlockSelector {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(Self::Tag(BlockTag::Latest)),
            "earliest" => Ok(Self::Tag(BlockTag::Earliest)),
            "pending" => Ok(Self::Tag(BlockTag::Pending)),
            s if is_block_hash(s) => Ok(Self::Hash(s.to_string())),
            _ => Err(RunnerError::InvalidBlockSelector(s.to_string())),
        }
    }
}

impl TryFrom<&Value> for BlockSelector {
    type Error = RunnerError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => s.parse(),
            Value::Number(n) => n
                .as_u64()
                .map(Self::Number)
                .ok_or_else(|| RunnerError::InvalidBlockSelector(n.to_string())),
            other => Err(RunnerError::InvalidBlockSelector(other.to_string())),
        }
    }
}

impl From<u64> for BlockSelector {
    fn from(number: u64) -> Self {
        Self::Number(number)
    }
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hash(hash) => f.write_str(hash),
            Self::Tag(tag) => f.write_str(tag.as_str()),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}
