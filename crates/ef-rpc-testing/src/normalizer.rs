//! Maps fixture field names and encodings onto the ones returned by the RPC.
use num_bigint::BigUint;
use num_traits::Num;
use serde_json::{Map, Value};

use crate::{
    constants::{GET_BALANCE, GET_CODE, GET_TRANSACTION_COUNT},
    models::error::RunnerError,
};

pub type Normalizer = fn(&str) -> Result<String, RunnerError>;

/// Renames and value transforms applied to one kind of fixture entity.
#[derive(Debug, Clone, Copy)]
pub struct NormalizationTable {
    pub remappers: &'static [(&'static str, &'static str)],
    pub normalizers: &'static [(&'static str, Normalizer)],
}

impl NormalizationTable {
    /// Returns the RPC name of the fixture field `key`.
    pub fn rename<'a>(&self, key: &'a str) -> &'a str {
        self.remappers
            .iter()
            .find(|(from, _)| *from == key)
            .map_or(key, |&(_, to)| to)
    }

    /// Normalizes `value` with the rule registered for the fixture field `key`,
    /// if any. Fields with a rule must hold strings.
    pub fn normalize(&self, key: &str, value: &Value) -> Result<Value, RunnerError> {
        let Some((_, normalizer)) = self.normalizers.iter().find(|(name, _)| *name == key) else {
            return Ok(value.clone());
        };
        let raw = value.as_str().ok_or_else(|| {
            RunnerError::FixtureData(format!("expected a string for `{key}`, got {value}"))
        })?;
        Ok(Value::String(normalizer(raw)?))
    }

    /// Renames then transforms every field of `entity`. The transform is picked
    /// by the fixture key, before renaming.
    pub fn to_rpc_form(
        &self,
        entity: &Map<String, Value>,
    ) -> Result<Map<String, Value>, RunnerError> {
        entity
            .iter()
            .map(|(key, value)| Ok((self.rename(key).to_string(), self.normalize(key, value)?)))
            .collect()
    }
}

pub const RPC_STATE: NormalizationTable = NormalizationTable {
    remappers: &[],
    normalizers: &[
        ("balance", normalize_leading_zeros),
        ("code", empty_to_zero_x),
        ("nonce", normalize_leading_zeros),
    ],
};

pub const RPC_BLOCK: NormalizationTable = NormalizationTable {
    remappers: &[
        ("bloom", "logsBloom"),
        ("coinbase", "miner"),
        ("transactionsTrie", "transactionsRoot"),
        ("uncleHash", "sha3Uncles"),
        ("receiptTrie", "receiptsRoot"),
    ],
    normalizers: &[
        ("difficulty", normalize_leading_zeros),
        ("extraData", empty_to_zero_x),
        ("gasLimit", normalize_leading_zeros),
        ("gasUsed", normalize_leading_zeros),
        ("number", normalize_leading_zeros),
        ("timestamp", normalize_leading_zeros),
    ],
};

pub const RPC_TRANSACTION: NormalizationTable = NormalizationTable {
    remappers: &[("data", "input"), ("gasLimit", "gas")],
    normalizers: &[
        ("nonce", normalize_leading_zeros),
        ("gasLimit", normalize_leading_zeros),
        ("gasPrice", normalize_leading_zeros),
        ("value", normalize_leading_zeros),
        ("data", empty_to_zero_x),
        ("to", add_zero_x_prefix),
        ("r", normalize_leading_zeros),
        ("s", normalize_leading_zeros),
        ("v", normalize_leading_zeros),
    ],
};

/// Account fields and the RPC method reading each of them.
pub const RPC_STATE_LOOKUPS: [(&str, &str); 3] = [
    ("balance", GET_BALANCE),
    ("code", GET_CODE),
    ("nonce", GET_TRANSACTION_COUNT),
];

pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parses a hex quantity of any width and renders it in canonical form:
/// lowercase, `0x` prefixed, no leading zeros. `"0x"` reads as zero.
pub fn normalize_leading_zeros(hex: &str) -> Result<String, RunnerError> {
    let digits = strip_hex_prefix(hex);
    if digits.is_empty() {
        return Ok("0x0".to_string());
    }
    let value = BigUint::from_str_radix(digits, 16)
        .map_err(|err| RunnerError::FixtureData(format!("invalid hex quantity {hex:?}: {err}")))?;
    Ok(format!("{value:#x}"))
}

pub fn empty_to_zero_x(s: &str) -> Result<String, RunnerError> {
    Ok(if s.is_empty() { "0x" } else { s }.to_string())
}

pub fn add_zero_x_prefix(s: &str) -> Result<String, RunnerError> {
    Ok(if s.starts_with("0x") || s.starts_with("0X") {
        s.to_string()
    } else {
        format!("0x{s}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("0x00", "0x0")]
    #[case("0x", "0x0")]
    #[case("0x0001", "0x1")]
    #[case("0X0A", "0xa")]
    #[case("ff", "0xff")]
    #[case(
        "0x00000000000000000000000000000000000000000000000000000000000000000001ffffffffffffffffffffffff",
        "0x1ffffffffffffffffffffffff"
    )]
    fn test_normalize_leading_zeros(#[case] input: &str, #[case] expected: &str) {
        let normalized = normalize_leading_zeros(input).unwrap();
        assert_eq!(normalized, expected);
        // idempotent
        assert_eq!(normalize_leading_zeros(&normalized).unwrap(), normalized);
    }

    #[test]
    fn test_normalize_leading_zeros_rejects_non_hex() {
        let err = normalize_leading_zeros("0xzz").unwrap_err();
        assert!(matches!(err, RunnerError::FixtureData(_)));
    }

    #[rstest]
    #[case("", "0x")]
    #[case("0x", "0x")]
    #[case("0x6001", "0x6001")]
    fn test_empty_to_zero_x(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(empty_to_zero_x(input).unwrap(), expected);
    }

    #[rstest]
    #[case("095e7baea6a6c7c4c2dfeb977efac326af552d87", "0x095e7baea6a6c7c4c2dfeb977efac326af552d87")]
    #[case("0x095e7baea6a6c7c4c2dfeb977efac326af552d87", "0x095e7baea6a6c7c4c2dfeb977efac326af552d87")]
    #[case("", "0x")]
    fn test_add_zero_x_prefix(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(add_zero_x_prefix(input).unwrap(), expected);
    }

    #[test]
    fn test_block_header_to_rpc_form() {
        // Given
        let header = json!({
            "bloom": "0x00",
            "coinbase": "0x8888f1f195afa192cfee860698584c030f4c9db1",
            "difficulty": "0x020000",
            "extraData": "",
            "gasLimit": "0x7fffffffffffffff",
            "hash": "0x0a",
        });
        let header = header.as_object().unwrap();
        let before = header.clone();

        // When
        let rpc = RPC_BLOCK.to_rpc_form(header).unwrap();

        // Then
        assert_eq!(header, &before);
        assert_eq!(
            Value::Object(rpc),
            json!({
                "logsBloom": "0x00",
                "miner": "0x8888f1f195afa192cfee860698584c030f4c9db1",
                "difficulty": "0x20000",
                "extraData": "0x",
                "gasLimit": "0x7fffffffffffffff",
                "hash": "0x0a",
            })
        );
    }

    #[test]
    fn test_transaction_transform_uses_fixture_key() {
        let transaction = json!({"data": "", "gasLimit": "0x0186a0", "to": "", "v": "0x1b"});

        let rpc = RPC_TRANSACTION
            .to_rpc_form(transaction.as_object().unwrap())
            .unwrap();

        assert_eq!(
            Value::Object(rpc),
            json!({"input": "0x", "gas": "0x186a0", "to": "0x", "v": "0x1b"})
        );
    }

    #[test]
    fn test_normalized_field_must_be_a_string() {
        let err = RPC_STATE.normalize("balance", &json!(10)).unwrap_err();
        assert!(matches!(err, RunnerError::FixtureData(_)));
        assert_eq!(RPC_STATE.normalize("storage", &json!({})).unwrap(), json!({}));
    }
}
