use serde_json::json;

use super::*;

fn alice() -> AccountId {
    "alice.testnet".parse().unwrap()
}

fn tx(nonce: u64, key: &AccessKey) -> Transaction {
    Transaction {
        signer_id: alice(),
        public_key: key.public_key(),
        nonce,
        receiver_id: "registry.testnet".parse().unwrap(),
        actions: vec![Action::function_call("new_registry", json!({"name": "a"}), 0)],
    }
}

#[test]
fn signature_binds_the_transaction() {
    let key = AccessKey::from_seed([4; 32]);
    let signed = tx(1, &key).sign(&key).unwrap();
    signed.verify().unwrap();

    let mut tampered = signed.clone();
    tampered.transaction.nonce = 2;
    assert!(tampered.verify().is_err());

    let other = AccessKey::from_seed([5; 32]);
    let mut wrong_key = signed;
    wrong_key.transaction.public_key = other.public_key();
    assert!(wrong_key.verify().is_err());
}

#[test]
fn deposit_is_encoded_as_decimal_string() {
    let action = Action::function_call("new_registry", json!({}), u128::MAX);
    let v = serde_json::to_value(&action).unwrap();
    assert_eq!(v["type"], "FunctionCall");
    assert_eq!(v["deposit"], json!(u128::MAX.to_string()));
    let back: Action = serde_json::from_value(v).unwrap();
    assert_eq!(back, action);
}

#[test]
fn function_call_keys_reject_deposits_and_other_receivers() {
    let perm = AccessKeyPermission::FunctionCall {
        receiver_id: "registry.testnet".parse().unwrap(),
        method_names: vec!["new_registry".to_string()],
        allowance: Some(250_000_000_000_000_000_000_000),
    };
    let registry: AccountId = "registry.testnet".parse().unwrap();
    assert!(perm.allows(&registry, "new_registry", 0));
    assert!(!perm.allows(&registry, "new_registry", 1));
    assert!(!perm.allows(&registry, "other", 0));
    assert!(!perm.allows(&alice(), "new_registry", 0));
    assert!(AccessKeyPermission::FullAccess.allows(&alice(), "anything", 1));
}

#[test]
fn public_keys_render_with_type_prefix() {
    let pk = AccessKey::from_seed([0; 32]).public_key();
    let s = pk.to_string();
    assert!(s.starts_with("ed25519:"));
    assert_eq!(s.parse::<PublicKey>().unwrap(), pk);
    assert!("secp256k1:00".parse::<PublicKey>().is_err());
}
