use std::cell::Cell;
use std::rc::Rc;

use super::*;

#[test]
fn starts_anonymous() {
    let store = SessionStore::new("testnet");
    let s = store.get();
    assert!(!s.authenticated());
    assert!(s.account_id().is_none());
    assert_eq!(s.network_id(), "testnet");
}

#[test]
fn notifies_only_on_change() {
    let mut store = SessionStore::new("testnet");
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    store.subscribe(move |_| counter.set(counter.get() + 1));

    store.set(Session::anonymous("testnet"));
    assert_eq!(hits.get(), 0);

    let alice = "alice.testnet".parse().unwrap();
    store.set(Session::signed_in("testnet", alice));
    store.set(store.get());
    assert_eq!(hits.get(), 1);
    assert!(store.get().authenticated());
}

#[test]
fn snapshot_serializes_all_fields() {
    let s = Session::signed_in("testnet", "alice.testnet".parse().unwrap());
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(
        v,
        serde_json::json!({
            "authenticated": true,
            "account_id": "alice.testnet",
            "network_id": "testnet"
        })
    );
}

#[test]
fn snapshot_rejects_inconsistent_state() {
    let bad = serde_json::json!({"authenticated": true, "network_id": "testnet"});
    assert!(serde_json::from_value::<Session>(bad).is_err());

    let bad = serde_json::json!({
        "authenticated": false,
        "account_id": "alice.testnet",
        "network_id": "testnet"
    });
    assert!(serde_json::from_value::<Session>(bad).is_err());
}
