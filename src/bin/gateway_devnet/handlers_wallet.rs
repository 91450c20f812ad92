use anyhow::anyhow;
use url::Url;

use registry_gateway::model::{Transaction, TransactionDraft};
use registry_gateway::redirect::{
    PARAM_ACCOUNT_ID, PARAM_ALL_KEYS, PARAM_ERROR_CODE, PARAM_ERROR_MESSAGE, PARAM_PUBLIC_KEY,
    PARAM_TX_HASHES, USER_REJECTED,
};
use registry_gateway::wallet::{
    PARAM_CALLBACK_URL, PARAM_CONTRACT_ID, PARAM_FAILURE_URL, PARAM_SUCCESS_URL,
    PARAM_TRANSACTIONS,
};

use super::*;

const EXECUTION_FAILED: &str = "executionFailed";

type Params = HashMap<String, String>;

fn required<'a>(q: &'a Params, name: &str) -> Result<&'a str> {
    q.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing query parameter {}", name))
}

fn url_param(q: &Params, name: &str) -> Result<Url> {
    let raw = required(q, name)?;
    Url::parse(raw).with_context(|| format!("parse {} {}", name, raw))
}

/// Appends the failure pair unless the url already carries an error code.
fn with_failure(mut url: Url, code: &str, message: &str) -> Url {
    if !url.query_pairs().any(|(k, _)| k == PARAM_ERROR_CODE) {
        url.query_pairs_mut()
            .append_pair(PARAM_ERROR_CODE, code)
            .append_pair(PARAM_ERROR_MESSAGE, message);
    }
    url
}

pub(super) async fn wallet_login(
    State(state): State<Arc<AppState>>,
    Query(q): Query<Params>,
) -> Response {
    let parsed = (|| -> Result<(AccountId, PublicKey, Url, Url)> {
        let contract_id: AccountId = required(&q, PARAM_CONTRACT_ID)?
            .parse()
            .context("parse contract_id")?;
        let public_key: PublicKey = required(&q, PARAM_PUBLIC_KEY)?.parse()?;
        Ok((
            contract_id,
            public_key,
            url_param(&q, PARAM_SUCCESS_URL)?,
            url_param(&q, PARAM_FAILURE_URL)?,
        ))
    })();
    let (contract_id, public_key, success_url, failure_url) = match parsed {
        Ok(v) => v,
        Err(err) => return bad_request(err),
    };

    if state.reject {
        tracing::info!(%contract_id, "sign-in rejected");
        return redirect(&with_failure(
            failure_url,
            USER_REJECTED,
            "User rejected the sign-in",
        ));
    }
    if contract_id != state.contract_id {
        return redirect(&with_failure(
            failure_url,
            EXECUTION_FAILED,
            &format!("account {} has no contract", contract_id),
        ));
    }

    let all_keys = {
        let mut chain = state.chain.write().await;
        chain.add_key(
            &state.dev_account,
            public_key,
            AccessKeyPermission::FunctionCall {
                receiver_id: contract_id.clone(),
                method_names: Vec::new(),
                allowance: None,
            },
        );
        chain.keys_of(&state.dev_account)
    };
    tracing::info!(account = %state.dev_account, %public_key, "sign-in approved");

    let all_keys: Vec<String> = all_keys.iter().map(PublicKey::to_string).collect();
    let mut url = success_url;
    url.query_pairs_mut()
        .append_pair(PARAM_ACCOUNT_ID, state.dev_account.as_str())
        .append_pair(PARAM_PUBLIC_KEY, &public_key.to_string())
        .append_pair(PARAM_ALL_KEYS, &all_keys.join(","));
    redirect(&url)
}

pub(super) async fn wallet_sign(
    State(state): State<Arc<AppState>>,
    Query(q): Query<Params>,
) -> Response {
    let parsed = (|| -> Result<(Vec<TransactionDraft>, Url)> {
        let drafts: Vec<TransactionDraft> = serde_json::from_str(required(&q, PARAM_TRANSACTIONS)?)
            .context("parse transactions")?;
        Ok((drafts, url_param(&q, PARAM_CALLBACK_URL)?))
    })();
    let (drafts, callback_url) = match parsed {
        Ok(v) => v,
        Err(err) => return bad_request(err),
    };

    if state.reject {
        tracing::info!(count = drafts.len(), "transactions rejected");
        return redirect(&with_failure(
            callback_url,
            USER_REJECTED,
            "User rejected the transaction",
        ));
    }

    let mut chain = state.chain.write().await;
    let mut hashes = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let public_key = state.dev_key.public_key();
        let nonce = chain
            .access_key(&state.dev_account, &public_key)
            .map(|k| k.nonce + 1)
            .unwrap_or(1);
        let signed = Transaction {
            signer_id: state.dev_account.clone(),
            public_key,
            nonce,
            receiver_id: draft.receiver_id,
            actions: draft.actions,
        }
        .sign(&state.dev_key);
        let outcome = match signed {
            Ok(signed) => chain.apply(&state.contract_id, &signed),
            Err(err) => Err(format!("{:#}", err)),
        };
        match outcome {
            Ok(outcome) => hashes.push(outcome.transaction_hash.0),
            Err(message) => {
                tracing::info!(%message, "transaction failed");
                return redirect(&with_failure(callback_url, EXECUTION_FAILED, &message));
            }
        }
    }
    tracing::info!(count = hashes.len(), "transactions approved");

    let mut url = callback_url;
    url.query_pairs_mut()
        .append_pair(PARAM_TX_HASHES, &hashes.join(","));
    redirect(&url)
}
