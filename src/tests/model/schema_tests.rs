use serde_json::json;

use super::*;
use crate::model::ErrorKind;

fn req(kind: CallKind, method: &str, args: Value) -> ContractCallRequest {
    let Value::Object(args) = args else {
        panic!("object expected")
    };
    ContractCallRequest {
        method_name: method.to_string(),
        kind,
        args,
        attached_deposit: None,
    }
}

#[test]
fn registry_schema_is_valid() {
    let schema = ContractSchema::registry();
    schema.validate().unwrap();
    assert_eq!(schema.lookup("get").map(|(k, _)| k), Some(CallKind::View));
    assert_eq!(
        schema.lookup("new_registry").map(|(k, _)| k),
        Some(CallKind::Change)
    );
    assert!(schema.lookup("is_name_exist").is_none());
}

#[test]
fn optional_arguments_may_be_omitted() {
    let schema = ContractSchema {
        view_methods: vec![MethodSchema::new(
            "get_registry",
            vec![
                ArgSpec::required("name", ArgType::String),
                ArgSpec {
                    name: "limit".to_string(),
                    ty: ArgType::Number,
                    optional: true,
                },
            ],
        )],
        change_methods: vec![],
    };
    schema
        .check(&req(CallKind::View, "get_registry", json!({"name": "a"})))
        .unwrap();
    schema
        .check(&req(CallKind::View, "get_registry", json!({"name": "a", "limit": 2})))
        .unwrap();
    let err = schema
        .check(&req(CallKind::View, "get_registry", json!({"name": "a", "limit": "2"})))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArguments);
}

#[test]
fn duplicate_declarations_fail_validation() {
    let schema = ContractSchema {
        view_methods: vec![MethodSchema::new(
            "get",
            vec![
                ArgSpec::required("a", ArgType::Any),
                ArgSpec::required("a", ArgType::Any),
            ],
        )],
        change_methods: vec![],
    };
    assert!(schema.validate().is_err());

    let schema = ContractSchema {
        view_methods: vec![MethodSchema::new("", vec![])],
        change_methods: vec![],
    };
    assert!(schema.validate().is_err());
}

#[test]
fn account_ids_follow_chain_rules() {
    for ok in ["alice.testnet", "a1", "registry_v2.alice-dev.testnet"] {
        assert!(AccountId::validate(ok).is_ok(), "{}", ok);
    }
    for bad in ["a", "Alice.testnet", "alice..testnet", ".alice", "alice.", "al ice"] {
        assert!(AccountId::validate(bad).is_err(), "{}", bad);
    }
}
