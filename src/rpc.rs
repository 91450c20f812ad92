//! Chain node access: the JSON-RPC surface the contract proxy depends on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{AccessKeyView, AccountId, CallError, PublicKey, SignedTransaction, TxHash};

mod http_client;
mod jsonrpc;

pub use self::http_client::HttpRpcClient;
pub use self::jsonrpc::*;

pub const METHOD_VIEW_FUNCTION: &str = "view_function";
pub const METHOD_VIEW_ACCESS_KEY: &str = "view_access_key";
pub const METHOD_BROADCAST_TX_COMMIT: &str = "broadcast_tx_commit";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewFunctionParams {
    pub account_id: AccountId,
    pub method_name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewFunctionResult {
    pub result: Value,
    pub block_height: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewAccessKeyParams {
    pub account_id: AccountId,
    pub public_key: PublicKey,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Server { code: i32, message: String },
    #[error("execution failed: {0}")]
    Execution(String),
    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcError::Transport(_))
    }
}

impl From<RpcError> for CallError {
    fn from(err: RpcError) -> Self {
        CallError::network(err.to_string())
    }
}

/// Blocking access to a chain node.
pub trait ChainRpc {
    fn view_function(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: &Value,
    ) -> Result<Value, RpcError>;

    /// `Ok(None)` when the key is not registered for the account.
    fn view_access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<Option<AccessKeyView>, RpcError>;

    fn broadcast_tx_commit(&self, tx: &SignedTransaction) -> Result<TxOutcome, RpcError>;
}

impl<T: ChainRpc + ?Sized> ChainRpc for &T {
    fn view_function(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: &Value,
    ) -> Result<Value, RpcError> {
        (**self).view_function(contract_id, method_name, args)
    }

    fn view_access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<Option<AccessKeyView>, RpcError> {
        (**self).view_access_key(account_id, public_key)
    }

    fn broadcast_tx_commit(&self, tx: &SignedTransaction) -> Result<TxOutcome, RpcError> {
        (**self).broadcast_tx_commit(tx)
    }
}
