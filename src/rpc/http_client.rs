use std::cell::Cell;
use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;
use url::Url;

use super::*;

const TIMEOUT: Duration = Duration::from_secs(30);

pub(super) fn with_retries<T>(
    label: &str,
    mut f: impl FnMut() -> Result<T, RpcError>,
) -> Result<T, RpcError> {
    const ATTEMPTS: usize = 3;
    let mut attempt = 0;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(err) if err.is_retryable() && attempt + 1 < ATTEMPTS => {
                tracing::debug!(label, attempt, error = %err, "retrying rpc call");
                std::thread::sleep(Duration::from_millis(200 * (1 << attempt)));
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// JSON-RPC client for a chain node over HTTP.
pub struct HttpRpcClient {
    node_url: Url,
    client: reqwest::blocking::Client,
    next_id: Cell<u64>,
}

impl HttpRpcClient {
    pub fn new(node_url: Url) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("registry-gateway")
            .timeout(TIMEOUT)
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            node_url,
            client,
            next_id: Cell::new(1),
        })
    }

    pub fn node_url(&self) -> &Url {
        &self.node_url
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: &Value) -> Result<T, RpcError> {
        with_retries(method, || self.call_once(method, params.clone()))
    }

    fn call_once<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let req = JsonRpcRequest::new(method, params, id);

        let resp = self
            .client
            .post(self.node_url.clone())
            .json(&req)
            .send()
            .map_err(|e| RpcError::Transport(format!("{}: {}", method, e)))?;
        if !resp.status().is_success() {
            return Err(RpcError::Transport(format!(
                "{}: http status {}",
                method,
                resp.status()
            )));
        }

        let body: JsonRpcResponse = resp
            .json()
            .map_err(|e| RpcError::InvalidResponse(format!("{}: {}", method, e)))?;
        match body {
            JsonRpcResponse::Success { result, .. } => serde_json::from_value(result)
                .map_err(|e| RpcError::InvalidResponse(format!("{}: {}", method, e))),
            JsonRpcResponse::Error { error, .. } if error.code == EXECUTION_ERROR => {
                Err(RpcError::Execution(error.message))
            }
            JsonRpcResponse::Error { error, .. } => Err(RpcError::Server {
                code: error.code,
                message: error.message,
            }),
        }
    }
}

fn to_params<P: Serialize>(method: &str, params: &P) -> Result<Value, RpcError> {
    serde_json::to_value(params)
        .map_err(|e| RpcError::InvalidResponse(format!("encode {} params: {}", method, e)))
}

impl ChainRpc for HttpRpcClient {
    fn view_function(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: &Value,
    ) -> Result<Value, RpcError> {
        let params = to_params(
            METHOD_VIEW_FUNCTION,
            &ViewFunctionParams {
                account_id: contract_id.clone(),
                method_name: method_name.to_string(),
                args: args.clone(),
            },
        )?;
        let out: ViewFunctionResult = self.call(METHOD_VIEW_FUNCTION, &params)?;
        Ok(out.result)
    }

    fn view_access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<Option<AccessKeyView>, RpcError> {
        let params = to_params(
            METHOD_VIEW_ACCESS_KEY,
            &ViewAccessKeyParams {
                account_id: account_id.clone(),
                public_key: *public_key,
            },
        )?;
        self.call(METHOD_VIEW_ACCESS_KEY, &params)
    }

    fn broadcast_tx_commit(&self, tx: &SignedTransaction) -> Result<TxOutcome, RpcError> {
        // Not retried: a resend after a lost response would reuse the nonce.
        let params = to_params(METHOD_BROADCAST_TX_COMMIT, tx)?;
        self.call_once(METHOD_BROADCAST_TX_COMMIT, params)
    }
}
