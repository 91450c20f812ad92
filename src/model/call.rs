use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotAuthenticated,
    WalletRejected,
    NetworkFailure,
    InvalidArguments,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotAuthenticated => "not_authenticated",
            ErrorKind::WalletRejected => "wallet_rejected",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::InvalidArguments => "invalid_arguments",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct CallError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CallError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorKind::NotAuthenticated, "sign in to call change methods")
    }

    pub fn wallet_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WalletRejected, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkFailure, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArguments, message)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    View,
    Change,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::View => f.write_str("view"),
            CallKind::Change => f.write_str("change"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractCallRequest {
    pub method_name: String,
    pub kind: CallKind,

    #[serde(default)]
    pub args: Map<String, Value>,

    /// Base units, serialized as a decimal string.
    #[serde(
        default,
        with = "super::transaction::opt_u128_dec",
        skip_serializing_if = "Option::is_none"
    )]
    pub attached_deposit: Option<u128>,
}

impl ContractCallRequest {
    pub fn view(method_name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            method_name: method_name.into(),
            kind: CallKind::View,
            args,
            attached_deposit: None,
        }
    }

    pub fn change(
        method_name: impl Into<String>,
        args: Map<String, Value>,
        attached_deposit: Option<u128>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            kind: CallKind::Change,
            args,
            attached_deposit,
        }
    }

    pub fn check_shape(&self) -> Result<(), CallError> {
        if self.method_name.trim().is_empty() {
            return Err(CallError::invalid_arguments("method name is empty"));
        }
        if self.kind == CallKind::View && self.attached_deposit.is_some() {
            return Err(CallError::invalid_arguments(format!(
                "view method {} cannot carry a deposit",
                self.method_name
            )));
        }
        Ok(())
    }

    /// Parses a JSON object argument string as given on a command line.
    pub fn parse_args(raw: Option<&str>) -> Result<Map<String, Value>, CallError> {
        let Some(raw) = raw else {
            return Ok(Map::new());
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(CallError::invalid_arguments(
                "call arguments must be a JSON object",
            )),
            Err(err) => Err(CallError::invalid_arguments(format!(
                "call arguments are not valid JSON: {}",
                err
            ))),
        }
    }
}

/// Transient per-request result. `ok` is true exactly when `error` is absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractCallResult {
    ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<CallError>,
}

impl ContractCallResult {
    pub fn success(value: Value) -> Self {
        Self {
            ok: true,
            value: Some(value),
            error: None,
        }
    }

    pub fn failure(error: CallError) -> Self {
        Self {
            ok: false,
            value: None,
            error: Some(error),
        }
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&CallError> {
        self.error.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

impl From<Result<Value, CallError>> for ContractCallResult {
    fn from(r: Result<Value, CallError>) -> Self {
        match r {
            Ok(v) => Self::success(v),
            Err(e) => Self::failure(e),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallOutcome {
    Completed(ContractCallResult),
    AwaitingApproval { redirect_url: url::Url },
}

impl CallOutcome {
    pub fn result(&self) -> Option<&ContractCallResult> {
        match self {
            CallOutcome::Completed(r) => Some(r),
            CallOutcome::AwaitingApproval { .. } => None,
        }
    }
}
