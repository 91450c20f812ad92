use registry_gateway::model::SignedTransaction;
use registry_gateway::rpc::{
    EXECUTION_ERROR, INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_BROADCAST_TX_COMMIT,
    METHOD_NOT_FOUND, METHOD_VIEW_ACCESS_KEY, METHOD_VIEW_FUNCTION, ViewAccessKeyParams,
    ViewFunctionParams, ViewFunctionResult,
};

use super::*;

type RpcResult = std::result::Result<Value, (i32, String)>;

pub(super) async fn rpc(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    let id = req.id.clone();
    let out = match req.method.as_str() {
        METHOD_VIEW_FUNCTION => view_function(&state, req.params).await,
        METHOD_VIEW_ACCESS_KEY => view_access_key(&state, req.params).await,
        METHOD_BROADCAST_TX_COMMIT => broadcast_tx_commit(&state, req.params).await,
        other => Err((METHOD_NOT_FOUND, format!("method {} not found", other))),
    };
    match out {
        Ok(result) => Json(JsonRpcResponse::success(result, id)),
        Err((code, message)) => {
            tracing::debug!(method = %req.method, code, %message, "rpc error");
            Json(JsonRpcResponse::error(code, message, id))
        }
    }
}

fn params<T: serde::de::DeserializeOwned>(params: Value) -> std::result::Result<T, (i32, String)> {
    serde_json::from_value(params).map_err(|e| (INVALID_PARAMS, format!("invalid params: {}", e)))
}

fn to_result<T: serde::Serialize>(value: &T) -> RpcResult {
    serde_json::to_value(value).map_err(|e| (EXECUTION_ERROR, e.to_string()))
}

async fn view_function(state: &AppState, raw: Value) -> RpcResult {
    let p: ViewFunctionParams = params(raw)?;
    if p.account_id != state.contract_id {
        return Err((
            EXECUTION_ERROR,
            format!("account {} has no contract", p.account_id),
        ));
    }
    let chain = state.chain.read().await;
    let result = chain
        .registry()
        .view(&p.method_name, &p.args)
        .map_err(|e| (EXECUTION_ERROR, e))?;
    to_result(&ViewFunctionResult {
        result,
        block_height: chain.height(),
    })
}

async fn view_access_key(state: &AppState, raw: Value) -> RpcResult {
    let p: ViewAccessKeyParams = params(raw)?;
    let chain = state.chain.read().await;
    match chain.access_key(&p.account_id, &p.public_key) {
        Some(key) => to_result(key),
        None => Ok(Value::Null),
    }
}

async fn broadcast_tx_commit(state: &AppState, raw: Value) -> RpcResult {
    let signed: SignedTransaction = params(raw)?;
    let mut chain = state.chain.write().await;
    let outcome = chain
        .apply(&state.contract_id, &signed)
        .map_err(|e| (EXECUTION_ERROR, e))?;
    tracing::info!(hash = %outcome.transaction_hash, signer = %signed.transaction.signer_id, "transaction committed");
    to_result(&outcome)
}
