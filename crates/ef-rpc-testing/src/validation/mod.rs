//! Read-only checks comparing normalized fixture data with what the client
//! serves over RPC. Every check fails on the first difference.
mod account;
mod block;

use ipc_client::{JsonRpcClient, RpcResponse};
use serde_json::{Map, Value};
use tracing::trace;

use crate::models::error::RunnerError;

pub struct Validator<'a, C: JsonRpcClient> {
    client: &'a C,
}

impl<'a, C: JsonRpcClient> Validator<'a, C> {
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Issues `method` and returns its result. An error envelope is a protocol
    /// error: every query made here is expected to succeed.
    async fn query(&self, method: &str, params: Vec<Value>) -> Result<Value, RunnerError> {
        trace!(method, ?params, "querying");
        match self.client.request(method, params).await? {
            RpcResponse::Success(result) => Ok(result),
            response @ RpcResponse::Failure(_) => Err(RunnerError::protocol(method, response)),
        }
    }

    /// Like [`Self::query`], for methods returning a JSON object.
    async fn query_object(
        &self,
        method: &str,
        params: Vec<Value>,
        expected: &Map<String, Value>,
        context: impl Fn() -> String,
    ) -> Result<Map<String, Value>, RunnerError> {
        match self.query(method, params).await? {
            Value::Object(object) => Ok(object),
            other => Err(RunnerError::mismatch(
                context(),
                Value::Object(expected.clone()),
                other,
            )),
        }
    }
}

fn hex_count(count: usize) -> Value {
    Value::String(format!("{count:#x}"))
}

fn assert_equal(
    context: impl FnOnce() -> String,
    expected: Value,
    actual: Value,
) -> Result<(), RunnerError> {
    if expected == actual {
        Ok(())
    } else {
        Err(RunnerError::mismatch(context(), expected, actual))
    }
}
