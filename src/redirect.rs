use url::Url;

use crate::model::{AccountId, CallError, PublicKey, TxHash};

pub const PARAM_ACCOUNT_ID: &str = "account_id";
pub const PARAM_PUBLIC_KEY: &str = "public_key";
pub const PARAM_ALL_KEYS: &str = "all_keys";
pub const PARAM_TX_HASHES: &str = "transactionHashes";
pub const PARAM_ERROR_CODE: &str = "errorCode";
pub const PARAM_ERROR_MESSAGE: &str = "errorMessage";

const WALLET_PARAMS: &[&str] = &[
    PARAM_ACCOUNT_ID,
    PARAM_PUBLIC_KEY,
    PARAM_ALL_KEYS,
    PARAM_TX_HASHES,
    PARAM_ERROR_CODE,
    PARAM_ERROR_MESSAGE,
];

/// Error code used when the wallet returns to the failure url.
pub const USER_REJECTED: &str = "userRejected";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletRedirectContext {
    SignInApproved {
        account_id: AccountId,
        public_key: PublicKey,
        all_keys: Vec<PublicKey>,
    },
    TransactionsApproved {
        hashes: Vec<TxHash>,
    },
    Failed {
        code: String,
        message: Option<String>,
    },
}

/// Which flow a return leg answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectFamily {
    SignIn,
    Transactions,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct MalformedRedirect {
    pub family: RedirectFamily,
    pub error: CallError,
}

impl WalletRedirectContext {
    /// Reads wallet parameters from `url`. `Ok(None)` means a fresh visit.
    pub fn parse(url: &Url) -> Result<Option<Self>, MalformedRedirect> {
        let param = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };

        if let Some(code) = param(PARAM_ERROR_CODE) {
            return Ok(Some(WalletRedirectContext::Failed {
                code,
                message: param(PARAM_ERROR_MESSAGE),
            }));
        }

        if let Some(raw) = param(PARAM_TX_HASHES) {
            let hashes: Vec<TxHash> = split_list(&raw).map(|h| TxHash(h.to_string())).collect();
            if hashes.is_empty() {
                return Err(malformed(
                    RedirectFamily::Transactions,
                    "empty transactionHashes",
                ));
            }
            return Ok(Some(WalletRedirectContext::TransactionsApproved { hashes }));
        }

        let Some(account) = param(PARAM_ACCOUNT_ID) else {
            return Ok(None);
        };
        let account_id: AccountId = account
            .parse()
            .map_err(|e: CallError| malformed(RedirectFamily::SignIn, &e.message))?;
        let public_key: PublicKey = param(PARAM_PUBLIC_KEY)
            .ok_or_else(|| malformed(RedirectFamily::SignIn, "account_id without public_key"))?
            .parse()
            .map_err(|e: anyhow::Error| malformed(RedirectFamily::SignIn, &e.to_string()))?;
        let all_keys = match param(PARAM_ALL_KEYS) {
            Some(raw) => split_list(&raw)
                .map(|k| k.parse())
                .collect::<anyhow::Result<Vec<PublicKey>>>()
                .map_err(|e| malformed(RedirectFamily::SignIn, &e.to_string()))?,
            None => Vec::new(),
        };

        Ok(Some(WalletRedirectContext::SignInApproved {
            account_id,
            public_key,
            all_keys,
        }))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, WalletRedirectContext::Failed { .. })
    }
}

pub fn strip_wallet_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !WALLET_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut out = url.clone();
    if kept.is_empty() {
        out.set_query(None);
    } else {
        out.query_pairs_mut().clear().extend_pairs(kept);
    }
    out
}

pub fn has_wallet_params(url: &Url) -> bool {
    url.query_pairs()
        .any(|(k, _)| WALLET_PARAMS.contains(&k.as_ref()))
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn malformed(family: RedirectFamily, detail: &str) -> MalformedRedirect {
    MalformedRedirect {
        family,
        error: CallError::wallet_rejected(format!("malformed wallet redirect: {}", detail)),
    }
}

#[cfg(test)]
#[path = "tests/redirect_tests.rs"]
mod tests;
