use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde_json::Value;
use tokio::sync::RwLock;

use registry_gateway::model::{AccessKey, AccessKeyPermission, AccessKeyView, AccountId, PublicKey};

#[path = "gateway_devnet/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "gateway_devnet/registry.rs"]
mod registry;
use self::registry::*;
#[path = "gateway_devnet/chain.rs"]
mod chain;
use self::chain::*;
#[path = "gateway_devnet/handlers_rpc.rs"]
mod handlers_rpc;
use self::handlers_rpc::*;
#[path = "gateway_devnet/handlers_wallet.rs"]
mod handlers_wallet;
use self::handlers_wallet::*;
#[path = "gateway_devnet/runtime.rs"]
mod runtime;

#[derive(Clone)]
struct AppState {
    contract_id: AccountId,

    // The one account the dev wallet signs in as.
    dev_account: AccountId,
    dev_key: AccessKey,

    // Wallet declines every request when set.
    reject: bool,

    chain: Arc<RwLock<Chain>>,
}

async fn healthz() -> Json<Value> {
    Json(serde_json::json!({"ok": true}))
}

#[tokio::main]
async fn main() {
    registry_gateway::logging::init("info");
    if let Err(err) = runtime::run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
