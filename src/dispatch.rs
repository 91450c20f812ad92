use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value, json};
use url::Url;

use crate::config::GatewayConfig;
use crate::contract::ContractProxy;
use crate::model::{CallError, CallOutcome, ContractCallRequest, ContractCallResult, Session};
use crate::redirect::{self, RedirectFamily, WalletRedirectContext};
use crate::rpc::ChainRpc;
use crate::session::SessionStore;
use crate::wallet::{Navigator, TransactionSigner, WalletGateway};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    SignInFailed { error: CallError },
    ChangeResult { result: ContractCallResult },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoadOutcome {
    pub session: Session,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

pub struct Dispatcher<W, R> {
    config: GatewayConfig,
    session: SessionStore,
    state: AuthState,
    wallet: W,
    proxy: ContractProxy<R>,
    navigator: Rc<dyn Navigator>,
}

impl<W, R> Dispatcher<W, R>
where
    W: WalletGateway + TransactionSigner,
    R: ChainRpc,
{
    pub fn new(config: GatewayConfig, wallet: W, rpc: R, navigator: Rc<dyn Navigator>) -> Self {
        let proxy = ContractProxy::new(
            config.contract_id.clone(),
            config.schema.clone(),
            rpc,
            None,
        );
        Self {
            session: SessionStore::new(config.network_id()),
            state: AuthState::Anonymous,
            config,
            wallet,
            proxy,
            navigator,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn session(&self) -> Session {
        self.session.get()
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn proxy(&self) -> &ContractProxy<R> {
        &self.proxy
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Session) + 'static) {
        self.session.subscribe(observer);
    }

    /// Runs on every load. Consumes wallet parameters in `current_url`, then
    /// derives the session from the wallet's persisted state.
    pub fn resolve_on_load(&mut self, current_url: &Url) -> LoadOutcome {
        let mut notice = None;
        if redirect::has_wallet_params(current_url) {
            let parsed = WalletRedirectContext::parse(current_url);
            self.navigator
                .replace_url(&redirect::strip_wallet_params(current_url));
            notice = match parsed {
                Ok(Some(ctx)) => self.apply_redirect(ctx),
                Ok(None) => None,
                Err(bad) => {
                    tracing::warn!(error = %bad, "ignoring wallet redirect");
                    match bad.family {
                        RedirectFamily::SignIn => {
                            self.wallet.abandon_sign_in();
                            Some(Notice::SignInFailed { error: bad.error })
                        }
                        RedirectFamily::Transactions => Some(Notice::ChangeResult {
                            result: ContractCallResult::failure(bad.error),
                        }),
                    }
                }
            };
        }
        self.sync_from_wallet();
        LoadOutcome {
            session: self.session.get(),
            notice,
        }
    }

    fn apply_redirect(&mut self, ctx: WalletRedirectContext) -> Option<Notice> {
        match ctx {
            WalletRedirectContext::SignInApproved {
                account_id,
                public_key,
                all_keys,
            } => match self
                .wallet
                .complete_sign_in(&account_id, &public_key, &all_keys)
            {
                Ok(()) => None,
                Err(error) => Some(Notice::SignInFailed { error }),
            },
            WalletRedirectContext::TransactionsApproved { hashes } => {
                let hashes: Vec<&str> = hashes.iter().map(|h| h.as_str()).collect();
                Some(Notice::ChangeResult {
                    result: ContractCallResult::success(json!({ "transaction_hashes": hashes })),
                })
            }
            WalletRedirectContext::Failed { code, message } => {
                let error = CallError::wallet_rejected(match message {
                    Some(m) => format!("{} ({})", m, code),
                    None => code,
                });
                // An anonymous caller has no change call awaiting approval.
                if self.wallet.abandon_sign_in() || !self.wallet.is_signed_in() {
                    Some(Notice::SignInFailed { error })
                } else {
                    Some(Notice::ChangeResult {
                        result: ContractCallResult::failure(error),
                    })
                }
            }
        }
    }

    fn sync_from_wallet(&mut self) {
        let account = if self.wallet.is_signed_in() {
            self.wallet.current_account_id()
        } else {
            None
        };
        let session = match account {
            Some(account_id) => Session::signed_in(self.config.network_id(), account_id),
            None => Session::anonymous(self.config.network_id()),
        };
        self.state = if session.authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        };
        self.proxy.bind_account(session.account_id().cloned());
        self.session.set(session);
    }

    /// Hands off to the wallet. Completion is observed by a later
    /// [`Self::resolve_on_load`].
    pub fn sign_in(&mut self) {
        if self.state == AuthState::Authenticated {
            tracing::debug!("sign-in requested while already signed in");
            return;
        }
        self.state = AuthState::Authenticating;
        let failure_url = self.config.failure_url();
        self.wallet.request_sign_in(
            &self.config.contract_id,
            self.config.success_url(),
            &failure_url,
        );
    }

    pub fn sign_out(&mut self) {
        self.wallet.sign_out();
        self.state = AuthState::Anonymous;
        self.proxy.bind_account(None);
        self.session
            .set(Session::anonymous(self.config.network_id()));
    }

    pub fn invoke_view(&self, method_name: &str, args: Map<String, Value>) -> ContractCallResult {
        self.proxy.call_view(method_name, args)
    }

    pub fn invoke_change(
        &self,
        method_name: &str,
        args: Map<String, Value>,
        deposit: Option<u128>,
    ) -> CallOutcome {
        self.proxy.call_change(
            method_name,
            args,
            deposit,
            &self.wallet,
            self.config.success_url(),
        )
    }

    pub fn invoke(&self, req: &ContractCallRequest) -> CallOutcome {
        self.proxy
            .dispatch(req, &self.wallet, self.config.success_url())
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
