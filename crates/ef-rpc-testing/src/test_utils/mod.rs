use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, Once},
};

use async_trait::async_trait;
use ipc_client::{IpcError, JsonRpcClient, RpcErrorObject, RpcResponse};
use serde_json::Value;
use tracing_subscriber::{filter, FmtSubscriber};

use crate::{
    constants::{DEFAULT_LOG_FILTER, GET_STORAGE_AT},
    models::AccountStateMap,
    normalizer::{RPC_STATE, RPC_STATE_LOOKUPS},
};

static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        // Set-up tracing filter
        let filter = filter::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| filter::EnvFilter::new(DEFAULT_LOG_FILTER));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .without_time()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("setting tracing default failed");
    })
}

type Handler = Arc<dyn Fn(&[Value]) -> RpcResponse + Send + Sync>;
type CallRecord = Vec<(String, Vec<Value>)>;

/// An in-memory `JsonRpcClient` answering from per-method handlers and
/// recording every call. Unknown methods get a "method not found" error.
#[derive(Clone, Default)]
pub struct MockClient {
    handlers: HashMap<String, Handler>,
    calls: Arc<Mutex<CallRecord>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `method` with the response built by `handler` from the params.
    pub fn with_handler(
        mut self,
        method: &str,
        handler: impl Fn(&[Value]) -> RpcResponse + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(method.to_string(), Arc::new(handler));
        self
    }

    /// Answers `method` with a constant result.
    pub fn with_result(self, method: &str, result: Value) -> Self {
        self.with_handler(method, move |_| RpcResponse::Success(result.clone()))
    }

    /// Answers `method` with a constant error.
    pub fn with_error(self, method: &str, message: &str) -> Self {
        let error = RpcErrorObject {
            code: -32000,
            message: message.to_string(),
            data: None,
        };
        self.with_handler(method, move |_| RpcResponse::Failure(error.clone()))
    }

    /// Serves the normalized balance, code, nonce and storage of `accounts`,
    /// for queries made at one of `at_blocks` only.
    pub fn serving_accounts(accounts: &AccountStateMap, at_blocks: &[&str]) -> Self {
        let at_blocks: Arc<Vec<Value>> =
            Arc::new(at_blocks.iter().map(|tag| Value::from(*tag)).collect());
        let mut client = Self::new();

        for (field, method) in RPC_STATE_LOOKUPS {
            let values: HashMap<String, Value> = accounts
                .iter()
                .map(|(address, account)| {
                    let raw = Value::String(account.field(field).unwrap_or_default().to_string());
                    let value = RPC_STATE
                        .normalize(field, &raw)
                        .expect("account fixture should normalize");
                    (address.clone(), value)
                })
                .collect();
            let at_blocks = Arc::clone(&at_blocks);
            client = client.with_handler(method, move |params| {
                lookup(&at_blocks, params, |address, _| values.get(address).cloned())
            });
        }

        let accounts = accounts.clone();
        client.with_handler(GET_STORAGE_AT, move |params| {
            lookup(&at_blocks, params, |address, position| {
                let storage = &accounts.get(address)?.storage;
                storage
                    .get(position)
                    .or_else(|| (position == "0x0").then(|| storage.get("0x")).flatten())
                    .map(|value| Value::String(value.clone()))
            })
        })
    }

    /// Returns all calls made to this client.
    pub fn calls(&self) -> CallRecord {
        self.lock_calls().clone()
    }

    /// Returns the number of times `method` was called.
    pub fn call_count(&self, method: &str) -> usize {
        self.lock_calls()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    fn lock_calls(&self) -> MutexGuard<'_, CallRecord> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resolves an account query with params `[address, (position,) at_block]`.
fn lookup(
    at_blocks: &[Value],
    params: &[Value],
    find: impl Fn(&str, &str) -> Option<Value>,
) -> RpcResponse {
    let address = params.first().and_then(Value::as_str).unwrap_or_default();
    let position = if params.len() == 3 {
        params[1].as_str().unwrap_or_default()
    } else {
        ""
    };
    if !params.last().is_some_and(|at_block| at_blocks.contains(at_block)) {
        return not_found(&format!("unexpected block {:?}", params.last()));
    }
    RpcResponse::Success(find(address, position).unwrap_or(Value::Null))
}

fn not_found(message: &str) -> RpcResponse {
    RpcResponse::Failure(RpcErrorObject {
        code: -32601,
        message: message.to_string(),
        data: None,
    })
}

#[async_trait]
impl JsonRpcClient for MockClient {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<RpcResponse, IpcError> {
        self.lock_calls()
            .push((method.to_string(), params.clone()));
        Ok(match self.handlers.get(method) {
            Some(handler) => handler(&params),
            None => not_found(&format!("method {method} not found")),
        })
    }
}
