use super::*;
use crate::model::AccessKey;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[test]
fn fresh_visit_has_no_context() {
    let u = url("http://localhost:1234/?tab=registries");
    assert_eq!(WalletRedirectContext::parse(&u).unwrap(), None);
    assert!(!has_wallet_params(&u));
}

#[test]
fn parses_sign_in_approval() {
    let key = AccessKey::from_seed([1; 32]).public_key();
    let mut u = url("http://localhost:1234/");
    u.query_pairs_mut()
        .append_pair(PARAM_ACCOUNT_ID, "alice.testnet")
        .append_pair(PARAM_PUBLIC_KEY, &key.to_string())
        .append_pair(PARAM_ALL_KEYS, &format!("{},{}", key, key));

    match WalletRedirectContext::parse(&u).unwrap() {
        Some(WalletRedirectContext::SignInApproved {
            account_id,
            public_key,
            all_keys,
        }) => {
            assert_eq!(account_id.as_str(), "alice.testnet");
            assert_eq!(public_key, key);
            assert_eq!(all_keys.len(), 2);
        }
        other => panic!("unexpected context {:?}", other),
    }
}

#[test]
fn error_code_wins_over_other_params() {
    let u = url(
        "http://localhost:1234/?account_id=alice.testnet&errorCode=userRejected&errorMessage=User%20rejected",
    );
    let ctx = WalletRedirectContext::parse(&u).unwrap().unwrap();
    assert!(ctx.is_failure());
    assert_eq!(
        ctx,
        WalletRedirectContext::Failed {
            code: "userRejected".to_string(),
            message: Some("User rejected".to_string()),
        }
    );
}

#[test]
fn parses_transaction_hashes() {
    let u = url("http://localhost:1234/?transactionHashes=aa,bb");
    let ctx = WalletRedirectContext::parse(&u).unwrap().unwrap();
    assert_eq!(
        ctx,
        WalletRedirectContext::TransactionsApproved {
            hashes: vec![TxHash("aa".to_string()), TxHash("bb".to_string())],
        }
    );
}

#[test]
fn malformed_sign_in_is_a_wallet_rejection() {
    let u = url("http://localhost:1234/?account_id=alice.testnet");
    let err = WalletRedirectContext::parse(&u).unwrap_err();
    assert_eq!(err.family, RedirectFamily::SignIn);
    assert_eq!(err.error.kind, crate::model::ErrorKind::WalletRejected);

    let u = url("http://localhost:1234/?account_id=Alice&public_key=ed25519:00");
    let err = WalletRedirectContext::parse(&u).unwrap_err();
    assert_eq!(err.family, RedirectFamily::SignIn);
}

#[test]
fn empty_transaction_hashes_belong_to_the_transaction_flow() {
    let u = url("http://localhost:1234/?transactionHashes=");
    let err = WalletRedirectContext::parse(&u).unwrap_err();
    assert_eq!(err.family, RedirectFamily::Transactions);
    assert_eq!(err.error.kind, crate::model::ErrorKind::WalletRejected);
}

#[test]
fn strip_keeps_unrelated_params() {
    let u = url("http://localhost:1234/app?tab=x&account_id=alice.testnet&public_key=k#top");
    assert_eq!(
        strip_wallet_params(&u).as_str(),
        "http://localhost:1234/app?tab=x#top"
    );

    let u = url("http://localhost:1234/?transactionHashes=aa");
    assert_eq!(strip_wallet_params(&u).as_str(), "http://localhost:1234/");
}
