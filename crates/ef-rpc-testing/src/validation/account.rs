use ipc_client::JsonRpcClient;
use serde_json::Value;
use tracing::debug;

use super::{assert_equal, Validator};
use crate::{
    constants::GET_STORAGE_AT,
    models::{block_selector::BlockSelector, error::RunnerError, AccountState, AccountStateMap},
    normalizer::{RPC_STATE, RPC_STATE_LOOKUPS},
};

impl<'a, C: JsonRpcClient> Validator<'a, C> {
    /// Checks balance, code, nonce and every storage slot of each account
    /// against the client's state at `at_block`.
    pub async fn validate_accounts(
        &self,
        accounts: &AccountStateMap,
        at_block: &BlockSelector,
    ) -> Result<(), RunnerError> {
        for (address, account) in accounts {
            self.validate_account(address, account, at_block).await?;
        }
        Ok(())
    }

    async fn validate_account(
        &self,
        address: &str,
        account: &AccountState,
        at_block: &BlockSelector,
    ) -> Result<(), RunnerError> {
        debug!(address, %at_block, "validating account");

        for (field, method) in RPC_STATE_LOOKUPS {
            let raw = account.field(field).ok_or_else(|| {
                RunnerError::FixtureData(format!("account {address} has no `{field}`"))
            })?;
            let expected = RPC_STATE.normalize(field, &Value::String(raw.to_string()))?;
            let actual = self
                .query(method, vec![address.into(), at_block.to_param()])
                .await?;
            assert_equal(
                || format!("{field} of {address} at {at_block}"),
                expected,
                actual,
            )?;
        }

        for (key, expected) in &account.storage {
            let position = if key == "0x" { "0x0" } else { key.as_str() };
            let actual = self
                .query(
                    GET_STORAGE_AT,
                    vec![address.into(), position.into(), at_block.to_param()],
                )
                .await?;
            assert_equal(
                || format!("storage slot {position} of {address} at {at_block}"),
                Value::String(expected.clone()),
                actual,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockClient;
    use serde_json::json;

    const ADDRESS: &str = "0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b";

    fn accounts() -> AccountStateMap {
        serde_json::from_value(json!({
            ADDRESS: {
                "balance": "0x0de0b6b3a7640000",
                "code": "",
                "nonce": "0x00",
                "storage": {"0x": "0x01", "0x01": "0x02"},
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_validate_accounts_queries_every_field() {
        // Given
        let client = MockClient::serving_accounts(&accounts(), &["latest"]);
        let validator = Validator::new(&client);

        // When
        validator
            .validate_accounts(&accounts(), &BlockSelector::LATEST)
            .await
            .unwrap();

        // Then
        let calls = client.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], ("eth_getBalance".to_string(), vec![json!(ADDRESS), json!("latest")]));
        assert_eq!(
            calls[3],
            (
                "eth_getStorageAt".to_string(),
                vec![json!(ADDRESS), json!("0x0"), json!("latest")]
            )
        );
    }

    #[tokio::test]
    async fn test_validate_accounts_protocol_error() {
        // Given
        let client = MockClient::serving_accounts(&accounts(), &["latest"])
            .with_error("eth_getCode", "header not found");
        let validator = Validator::new(&client);

        // When
        let err = validator
            .validate_accounts(&accounts(), &BlockSelector::LATEST)
            .await
            .unwrap_err();

        // Then
        assert!(matches!(err, RunnerError::Protocol { ref method, .. } if method == "eth_getCode"));
    }

    #[tokio::test]
    async fn test_validate_accounts_at_earliest_uses_tag() {
        let client = MockClient::serving_accounts(&accounts(), &["earliest"]);
        let validator = Validator::new(&client);

        validator
            .validate_accounts(&accounts(), &BlockSelector::EARLIEST)
            .await
            .unwrap();

        assert!(client
            .calls()
            .iter()
            .all(|(_, params)| params.last() == Some(&json!("earliest"))));
    }
}
