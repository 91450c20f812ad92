use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AccessKey, AccountId, PublicKey, TxHash};

/// 30 Tgas, enough for a registry write.
pub const DEFAULT_GAS: u64 = 30_000_000_000_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    FunctionCall {
        method_name: String,
        args: Value,
        gas: u64,
        #[serde(with = "u128_dec")]
        deposit: u128,
    },
}

impl Action {
    pub fn function_call(method_name: &str, args: Value, deposit: u128) -> Self {
        Action::FunctionCall {
            method_name: method_name.to_string(),
            args,
            gas: DEFAULT_GAS,
            deposit,
        }
    }
}

/// Unsigned actions handed to the wallet for approval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub receiver_id: AccountId,
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub signer_id: AccountId,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub receiver_id: AccountId,
    pub actions: Vec<Action>,
}

impl Transaction {
    pub fn hash(&self) -> Result<TxHash> {
        let bytes = serde_json::to_vec(self).context("serialize transaction")?;
        Ok(TxHash(blake3::hash(&bytes).to_hex().to_string()))
    }

    pub fn sign(self, key: &AccessKey) -> Result<SignedTransaction> {
        let hash = self.hash()?;
        let signature = key.sign_hex(hash.as_str().as_bytes());
        Ok(SignedTransaction {
            transaction: self,
            signature,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    /// Hex ed25519 signature over the transaction hash.
    pub signature: String,
}

impl SignedTransaction {
    pub fn hash(&self) -> Result<TxHash> {
        self.transaction.hash()
    }

    pub fn verify(&self) -> Result<TxHash> {
        let hash = self.hash()?;
        self.transaction
            .public_key
            .verify(hash.as_str().as_bytes(), &self.signature)?;
        Ok(hash)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccessKeyPermission {
    FullAccess,
    FunctionCall {
        receiver_id: AccountId,
        #[serde(default)]
        method_names: Vec<String>,
        #[serde(default, with = "opt_u128_dec", skip_serializing_if = "Option::is_none")]
        allowance: Option<u128>,
    },
}

impl AccessKeyPermission {
    /// Function-call keys never move funds, so any deposit needs the wallet.
    pub fn allows(&self, receiver_id: &AccountId, method_name: &str, deposit: u128) -> bool {
        match self {
            AccessKeyPermission::FullAccess => true,
            AccessKeyPermission::FunctionCall {
                receiver_id: allowed,
                method_names,
                ..
            } => {
                deposit == 0
                    && allowed == receiver_id
                    && (method_names.is_empty() || method_names.iter().any(|m| m == method_name))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessKeyView {
    pub nonce: u64,
    pub permission: AccessKeyPermission,
}

pub(crate) mod u128_dec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

pub(crate) mod opt_u128_dec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<u128>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(v) => s.serialize_some(&v.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u128>, D::Error> {
        let s = Option::<String>::deserialize(d)?;
        s.map(|s| s.parse().map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
#[path = "../tests/model/transaction_tests.rs"]
mod tests;
