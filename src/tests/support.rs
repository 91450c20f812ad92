use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use url::Url;

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::model::{AccessKeyView, AccountId, PublicKey, SignedTransaction};
use crate::redirect;
use crate::rpc::{ChainRpc, RpcError, TxOutcome};
use crate::store::KeyStore;
use crate::wallet::{Navigator, RecordingNavigator, WalletConnection};

pub(crate) const CONTRACT: &str = "registry.testnet";
pub(crate) const ALICE: &str = "alice.testnet";

/// In-memory chain node that counts every request it sees.
#[derive(Default)]
pub(crate) struct FakeRpc {
    pub(crate) calls: Cell<usize>,
    pub(crate) views: RefCell<HashMap<String, Value>>,
    pub(crate) access_key: RefCell<Option<AccessKeyView>>,
    pub(crate) broadcasts: RefCell<Vec<SignedTransaction>>,
    pub(crate) broadcast_value: RefCell<Value>,
    pub(crate) offline: Cell<bool>,
}

impl FakeRpc {
    pub(crate) fn with_view(self, method: &str, value: Value) -> Self {
        self.views.borrow_mut().insert(method.to_string(), value);
        self
    }

    fn hit(&self) -> Result<(), RpcError> {
        self.calls.set(self.calls.get() + 1);
        if self.offline.get() {
            return Err(RpcError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

impl ChainRpc for FakeRpc {
    fn view_function(
        &self,
        _contract_id: &AccountId,
        method_name: &str,
        _args: &Value,
    ) -> Result<Value, RpcError> {
        self.hit()?;
        self.views
            .borrow()
            .get(method_name)
            .cloned()
            .ok_or_else(|| RpcError::Execution(format!("method {} not found", method_name)))
    }

    fn view_access_key(
        &self,
        _account_id: &AccountId,
        _public_key: &PublicKey,
    ) -> Result<Option<AccessKeyView>, RpcError> {
        self.hit()?;
        Ok(self.access_key.borrow().clone())
    }

    fn broadcast_tx_commit(&self, tx: &SignedTransaction) -> Result<TxOutcome, RpcError> {
        self.hit()?;
        let hash = tx
            .verify()
            .map_err(|e| RpcError::Execution(format!("{:#}", e)))?;
        self.broadcasts.borrow_mut().push(tx.clone());
        Ok(TxOutcome {
            transaction_hash: hash,
            value: self.broadcast_value.borrow().clone(),
        })
    }
}

pub(crate) fn account(s: &str) -> AccountId {
    s.parse().expect("valid account id")
}

pub(crate) fn test_config() -> GatewayConfig {
    GatewayConfig::for_environment("testnet", account(CONTRACT)).expect("testnet preset")
}

pub(crate) struct Fixture {
    pub(crate) dir: tempfile::TempDir,
    pub(crate) nav: Rc<RecordingNavigator>,
    pub(crate) dispatcher: Dispatcher<WalletConnection, FakeRpc>,
}

impl Fixture {
    pub(crate) fn new(rpc: FakeRpc) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let nav = Rc::new(RecordingNavigator::new());
        let dispatcher = Self::load(dir.path(), &nav, rpc);
        Self {
            dir,
            nav,
            dispatcher,
        }
    }

    /// A cold start sharing the persisted wallet state of `self`.
    pub(crate) fn reload(&mut self, rpc: FakeRpc) {
        self.dispatcher = Self::load(self.dir.path(), &self.nav, rpc);
    }

    fn load(
        dir: &std::path::Path,
        nav: &Rc<RecordingNavigator>,
        rpc: FakeRpc,
    ) -> Dispatcher<WalletConnection, FakeRpc> {
        let cfg = test_config();
        let store = KeyStore::open(dir).expect("open key store");
        let navigator: Rc<dyn Navigator> = nav.clone();
        let wallet = WalletConnection::new(&cfg, store, navigator.clone());
        Dispatcher::new(cfg, wallet, rpc, navigator)
    }

    pub(crate) fn rpc(&self) -> &FakeRpc {
        self.dispatcher.proxy().rpc()
    }

    pub(crate) fn app_url(&self) -> Url {
        self.dispatcher.config().app_url.clone()
    }

    /// Signs in `account_id` by driving the full redirect round trip.
    pub(crate) fn sign_in_as(&mut self, account_id: &str) {
        self.dispatcher.sign_in();
        let back = approve_sign_in(&self.nav, account_id);
        self.dispatcher.resolve_on_load(&back);
    }
}

pub(crate) fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Plays the wallet: approves the last login navigation and returns the
/// url the browser lands on.
pub(crate) fn approve_sign_in(nav: &RecordingNavigator, account_id: &str) -> Url {
    let login = nav.last_navigation().expect("wallet login navigation");
    let public_key = query_param(&login, redirect::PARAM_PUBLIC_KEY).expect("public_key");
    let success = query_param(&login, "success_url").expect("success_url");
    let mut back = Url::parse(&success).expect("success url");
    back.query_pairs_mut()
        .append_pair(redirect::PARAM_ACCOUNT_ID, account_id)
        .append_pair(redirect::PARAM_PUBLIC_KEY, &public_key)
        .append_pair(redirect::PARAM_ALL_KEYS, &public_key);
    back
}
