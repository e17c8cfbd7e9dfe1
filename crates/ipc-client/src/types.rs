use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [Value],
}

impl<'a> RpcRequest<'a> {
    pub const fn new(id: u64, method: &'a str, params: &'a [Value]) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC error object as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<Value> for RpcErrorObject {
    /// Servers do not agree on the shape of `error`. A string becomes the
    /// message, anything other than a well-formed error object is kept whole
    /// in `data`.
    fn from(error: Value) -> Self {
        match error {
            Value::String(message) => Self {
                code: 0,
                message,
                data: None,
            },
            Value::Object(_) => match serde_json::from_value(error.clone()) {
                Ok(object) => object,
                Err(_) => Self::raw(error),
            },
            other => Self::raw(other),
        }
    }
}

impl RpcErrorObject {
    fn raw(data: Value) -> Self {
        Self {
            code: 0,
            message: String::new(),
            data: Some(data),
        }
    }
}

/// A decoded response envelope. The presence of an `error` key selects
/// `Failure` whatever its value, a missing `result` is read as `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcResponse {
    Success(Value),
    Failure(RpcErrorObject),
}

impl RpcResponse {
    /// Fails only when the envelope is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut envelope: Map<String, Value> = serde_json::from_value(value)?;
        Ok(match envelope.remove("error") {
            Some(error) => Self::Failure(error.into()),
            None => Self::Success(envelope.remove("result").unwrap_or(Value::Null)),
        })
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub const fn result(&self) -> Option<&Value> {
        match self {
            Self::Success(result) => Some(result),
            Self::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Value, RpcErrorObject> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Failure(error) => Err(error),
        }
    }
}

impl std::fmt::Display for RpcResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(result) => write!(f, "{{\"result\":{}}}", result),
            Self::Failure(error) => write!(
                f,
                "{{\"error\":{}}}",
                serde_json::to_string(error).map_err(|_| std::fmt::Error)?
            ),
        }
    }
}
