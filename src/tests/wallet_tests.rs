use super::*;
use crate::model::Action;
use crate::test_support::{ALICE, CONTRACT, account, approve_sign_in, query_param, test_config};

fn wallet(dir: &std::path::Path) -> (WalletConnection, Rc<RecordingNavigator>) {
    let nav = Rc::new(RecordingNavigator::new());
    let store = KeyStore::open(dir).unwrap();
    let conn = WalletConnection::new(&test_config(), store, nav.clone());
    (conn, nav)
}

fn request(w: &WalletConnection) {
    let cfg = test_config();
    w.request_sign_in(&cfg.contract_id, cfg.success_url(), &cfg.failure_url());
}

#[test]
fn sign_in_round_trip_persists_account_and_key() {
    let dir = tempfile::tempdir().unwrap();
    let (w, nav) = wallet(dir.path());
    assert!(!w.is_signed_in());
    assert_eq!(w.current_account_id(), None);

    request(&w);
    assert!(!w.is_signed_in());
    let back = approve_sign_in(&nav, ALICE);
    let pk: PublicKey = query_param(&back, "public_key").unwrap().parse().unwrap();

    w.complete_sign_in(&account(ALICE), &pk, &[pk]).unwrap();
    assert!(w.is_signed_in());
    assert_eq!(w.current_account_id(), Some(account(ALICE)));
    assert_eq!(
        w.signing_key(&account(ALICE)).map(|k| k.public_key()),
        Some(pk)
    );
    assert!(w.signing_key(&account("bob.testnet")).is_none());
}

#[test]
fn mismatched_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (w, _nav) = wallet(dir.path());
    request(&w);

    let other = AccessKey::from_seed([5; 32]).public_key();
    let err = w
        .complete_sign_in(&account(ALICE), &other, &[])
        .unwrap_err();
    assert_eq!(err.kind, crate::model::ErrorKind::WalletRejected);
    assert!(!w.is_signed_in());
}

#[test]
fn sign_out_removes_auth_and_key() {
    let dir = tempfile::tempdir().unwrap();
    let (w, nav) = wallet(dir.path());
    request(&w);
    let back = approve_sign_in(&nav, ALICE);
    let pk: PublicKey = query_param(&back, "public_key").unwrap().parse().unwrap();
    w.complete_sign_in(&account(ALICE), &pk, &[]).unwrap();

    w.sign_out();
    assert!(!w.is_signed_in());
    assert!(w.signing_key(&account(ALICE)).is_none());
    assert_eq!(nav.navigations().len(), 1);

    // Signing out twice is harmless.
    w.sign_out();
    assert!(!w.is_signed_in());
}

#[test]
fn sign_out_leaves_no_account_state_behind() {
    let dir = tempfile::tempdir().unwrap();
    let (w, nav) = wallet(dir.path());
    request(&w);
    let back = approve_sign_in(&nav, ALICE);
    let pk: PublicKey = query_param(&back, "public_key").unwrap().parse().unwrap();
    w.complete_sign_in(&account(ALICE), &pk, &[]).unwrap();

    w.sign_out();

    let st = KeyStore::open(dir.path()).unwrap().read_state().unwrap();
    assert!(st.auth.is_empty());
    assert!(st.keys.is_empty());
}

#[test]
fn completed_sign_in_moves_pending_key_to_account() {
    let dir = tempfile::tempdir().unwrap();
    let (w, nav) = wallet(dir.path());
    request(&w);
    let back = approve_sign_in(&nav, ALICE);
    let pk: PublicKey = query_param(&back, "public_key").unwrap().parse().unwrap();

    w.complete_sign_in(&account(ALICE), &pk, &[pk]).unwrap();

    let st = KeyStore::open(dir.path()).unwrap().read_state().unwrap();
    assert!(st.pending.is_empty());
    assert_eq!(st.keys.len(), 1);
    assert_eq!(st.auth.len(), 1);
}

#[test]
fn rejected_sign_in_leaves_no_orphan_key() {
    let dir = tempfile::tempdir().unwrap();
    let (w, _nav) = wallet(dir.path());
    request(&w);

    let other = AccessKey::from_seed([6; 32]).public_key();
    assert!(w.complete_sign_in(&account(ALICE), &other, &[]).is_err());

    let st = KeyStore::open(dir.path()).unwrap().read_state().unwrap();
    assert!(st.pending.is_empty());
    assert!(st.keys.is_empty());
    assert!(st.auth.is_empty());
}

#[test]
fn abandon_reports_whether_sign_in_was_pending() {
    let dir = tempfile::tempdir().unwrap();
    let (w, _nav) = wallet(dir.path());
    assert!(!w.abandon_sign_in());
    request(&w);
    assert!(w.abandon_sign_in());
    assert!(!w.abandon_sign_in());
}

#[test]
fn approval_url_carries_transaction_and_callback() {
    let dir = tempfile::tempdir().unwrap();
    let (w, nav) = wallet(dir.path());
    let draft = TransactionDraft {
        receiver_id: account(CONTRACT),
        actions: vec![Action::function_call(
            "new_registry",
            serde_json::json!({"name": "x"}),
            5,
        )],
    };
    let callback = Url::parse("http://localhost:1234/").unwrap();

    let url = w.request_transaction_approval(&draft, &callback).unwrap();
    assert_eq!(nav.last_navigation(), Some(url.clone()));
    assert_eq!(url.path(), "/sign");
    assert_eq!(
        query_param(&url, PARAM_CALLBACK_URL).as_deref(),
        Some("http://localhost:1234/")
    );
    let txs: Vec<TransactionDraft> =
        serde_json::from_str(&query_param(&url, PARAM_TRANSACTIONS).unwrap()).unwrap();
    assert_eq!(txs, vec![draft]);
}
