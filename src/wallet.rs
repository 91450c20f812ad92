use std::rc::Rc;

use url::Url;

use crate::config::GatewayConfig;
use crate::model::{AccessKey, AccountId, CallError, PublicKey, TransactionDraft};
use crate::store::{KeyStore, WalletAuth, now_ts};

mod navigator;

pub use self::navigator::{Navigator, RecordingNavigator};

pub const PARAM_CONTRACT_ID: &str = "contract_id";
pub const PARAM_SUCCESS_URL: &str = "success_url";
pub const PARAM_FAILURE_URL: &str = "failure_url";
pub const PARAM_TRANSACTIONS: &str = "transactions";
pub const PARAM_CALLBACK_URL: &str = "callbackUrl";

pub trait WalletGateway {
    fn is_signed_in(&self) -> bool;

    fn current_account_id(&self) -> Option<AccountId>;

    /// Navigates to the wallet's authorization page. Does not return a
    /// result: the outcome arrives on a later load via the redirect urls.
    fn request_sign_in(&self, contract_id: &AccountId, success_url: &Url, failure_url: &Url);

    fn sign_out(&self);

    /// Drops a sign-in that was requested but never approved. Returns whether
    /// one was outstanding.
    fn abandon_sign_in(&self) -> bool;

    fn complete_sign_in(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
        all_keys: &[PublicKey],
    ) -> Result<(), CallError>;
}

pub trait TransactionSigner {
    fn signing_key(&self, account_id: &AccountId) -> Option<AccessKey>;

    fn request_transaction_approval(
        &self,
        draft: &TransactionDraft,
        callback_url: &Url,
    ) -> Result<Url, CallError>;
}

pub struct WalletConnection {
    network_id: String,
    app_key: String,
    wallet_url: Url,
    store: KeyStore,
    navigator: Rc<dyn Navigator>,
}

impl WalletConnection {
    pub fn new(cfg: &GatewayConfig, store: KeyStore, navigator: Rc<dyn Navigator>) -> Self {
        Self {
            network_id: cfg.network_id().to_string(),
            app_key: cfg.app_key(),
            wallet_url: cfg.network.wallet_url.clone(),
            store,
            navigator,
        }
    }

    fn auth(&self) -> Option<WalletAuth> {
        match self.store.get_auth(&self.app_key) {
            Ok(auth) => auth,
            Err(err) => {
                tracing::warn!(error = %format!("{:#}", err), "read wallet auth");
                None
            }
        }
    }

    fn wallet_page(&self, path: &str) -> Result<Url, CallError> {
        self.wallet_url
            .join(path)
            .map_err(|e| CallError::wallet_rejected(format!("bad wallet url: {}", e)))
    }

    fn login_url(
        &self,
        contract_id: &AccountId,
        public_key: &PublicKey,
        success_url: &Url,
        failure_url: &Url,
    ) -> Result<Url, CallError> {
        let mut url = self.wallet_page("login/")?;
        url.query_pairs_mut()
            .append_pair(PARAM_CONTRACT_ID, contract_id.as_str())
            .append_pair(crate::redirect::PARAM_PUBLIC_KEY, &public_key.to_string())
            .append_pair(PARAM_SUCCESS_URL, success_url.as_str())
            .append_pair(PARAM_FAILURE_URL, failure_url.as_str());
        Ok(url)
    }
}

impl WalletGateway for WalletConnection {
    fn is_signed_in(&self) -> bool {
        self.auth().is_some()
    }

    fn current_account_id(&self) -> Option<AccountId> {
        self.auth().map(|a| a.account_id)
    }

    fn request_sign_in(&self, contract_id: &AccountId, success_url: &Url, failure_url: &Url) {
        let key = match AccessKey::generate() {
            Ok(k) => k,
            Err(err) => {
                tracing::warn!(error = %format!("{:#}", err), "generate sign-in key");
                return;
            }
        };
        if let Err(err) = self.store.set_pending(&self.app_key, &key) {
            tracing::warn!(error = %format!("{:#}", err), "persist pending sign-in key");
            return;
        }
        match self.login_url(contract_id, &key.public_key(), success_url, failure_url) {
            Ok(url) => {
                tracing::debug!(%url, "redirecting to wallet for sign-in");
                self.navigator.navigate(&url);
            }
            Err(err) => tracing::warn!(error = %err, "build wallet login url"),
        }
    }

    fn sign_out(&self) {
        if let Err(err) = self.store.remove_account(&self.app_key, &self.network_id) {
            tracing::error!(error = %format!("{:#}", err), "clear wallet auth");
        }
    }

    fn abandon_sign_in(&self) -> bool {
        match self.store.take_pending(&self.app_key) {
            Ok(pending) => pending.is_some(),
            Err(err) => {
                tracing::warn!(error = %format!("{:#}", err), "drop pending sign-in key");
                false
            }
        }
    }

    fn complete_sign_in(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
        all_keys: &[PublicKey],
    ) -> Result<(), CallError> {
        let persist_err =
            |e: anyhow::Error| CallError::wallet_rejected(format!("complete sign-in: {:#}", e));

        // A repeated return leg for the same key is already applied.
        if let Some(auth) = self.auth()
            && &auth.account_id == account_id
            && let Ok(Some(key)) = self.store.get_key(&self.network_id, account_id)
            && key.public_key() == *public_key
        {
            return Ok(());
        }

        let auth = WalletAuth {
            account_id: account_id.clone(),
            all_keys: all_keys.to_vec(),
            signed_in_at: now_ts().map_err(persist_err)?,
        };
        // Pending key, account key and auth change in a single write.
        self.store
            .update(|st| {
                let Some(pending) = st.pending.remove(&self.app_key) else {
                    return Err(CallError::wallet_rejected(
                        "wallet returned a sign-in this app did not request",
                    ));
                };
                let key = AccessKey::from_secret_hex(&pending.secret_key).map_err(|e| {
                    CallError::wallet_rejected(format!("pending sign-in key is corrupt: {:#}", e))
                })?;
                if key.public_key() != *public_key {
                    return Err(CallError::wallet_rejected(
                        "wallet approved a different key than the one requested",
                    ));
                }
                st.keys.insert(
                    KeyStore::key_id(&self.network_id, account_id),
                    pending.secret_key,
                );
                st.auth.insert(self.app_key.clone(), auth);
                Ok(())
            })
            .map_err(persist_err)??;
        tracing::debug!(account_id = %account_id, "sign-in completed");
        Ok(())
    }
}

impl TransactionSigner for WalletConnection {
    fn signing_key(&self, account_id: &AccountId) -> Option<AccessKey> {
        let auth = self.auth()?;
        if &auth.account_id != account_id {
            return None;
        }
        match self.store.get_key(&self.network_id, account_id) {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(error = %format!("{:#}", err), "load account key");
                None
            }
        }
    }

    fn request_transaction_approval(
        &self,
        draft: &TransactionDraft,
        callback_url: &Url,
    ) -> Result<Url, CallError> {
        let encoded = serde_json::to_string(&[draft])
            .map_err(|e| CallError::invalid_arguments(format!("encode transaction: {}", e)))?;
        let mut url = self.wallet_page("sign")?;
        url.query_pairs_mut()
            .append_pair(PARAM_TRANSACTIONS, &encoded)
            .append_pair(PARAM_CALLBACK_URL, callback_url.as_str());
        tracing::debug!(receiver_id = %draft.receiver_id, "redirecting to wallet for approval");
        self.navigator.navigate(&url);
        Ok(url)
    }
}

#[cfg(test)]
#[path = "tests/wallet_tests.rs"]
mod tests;
