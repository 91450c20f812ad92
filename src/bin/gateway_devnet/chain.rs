use registry_gateway::model::{Action, SignedTransaction};
use registry_gateway::rpc::TxOutcome;

use super::*;

pub(super) struct Chain {
    height: u64,
    access_keys: HashMap<(AccountId, PublicKey), AccessKeyView>,
    registry: RegistryContract,
    txs: HashMap<String, TxOutcome>,
}

impl Chain {
    pub(super) fn new(registry: RegistryContract) -> Self {
        Self {
            height: 1,
            access_keys: HashMap::new(),
            registry,
            txs: HashMap::new(),
        }
    }

    pub(super) fn height(&self) -> u64 {
        self.height
    }

    pub(super) fn registry(&self) -> &RegistryContract {
        &self.registry
    }

    pub(super) fn add_key(
        &mut self,
        account_id: &AccountId,
        public_key: PublicKey,
        permission: AccessKeyPermission,
    ) {
        self.access_keys.insert(
            (account_id.clone(), public_key),
            AccessKeyView {
                nonce: 0,
                permission,
            },
        );
    }

    pub(super) fn access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Option<&AccessKeyView> {
        self.access_keys.get(&(account_id.clone(), *public_key))
    }

    pub(super) fn keys_of(&self, account_id: &AccountId) -> Vec<PublicKey> {
        let mut keys: Vec<PublicKey> = self
            .access_keys
            .keys()
            .filter(|(a, _)| a == account_id)
            .map(|(_, pk)| *pk)
            .collect();
        keys.sort_by_key(|pk| pk.to_string());
        keys
    }

    /// Checks signature, nonce and key permission, then runs the actions
    /// against a copy of the contract and commits only if all succeed.
    pub(super) fn apply(
        &mut self,
        contract_id: &AccountId,
        signed: &SignedTransaction,
    ) -> Result<TxOutcome, String> {
        let hash = signed
            .verify()
            .map_err(|e| format!("invalid transaction: {:#}", e))?;
        let tx = &signed.transaction;

        if self.txs.contains_key(hash.as_str()) {
            return Err(format!("transaction {} already processed", hash));
        }
        if &tx.receiver_id != contract_id {
            return Err(format!("account {} has no contract", tx.receiver_id));
        }

        let key = self
            .access_key(&tx.signer_id, &tx.public_key)
            .ok_or_else(|| {
                format!(
                    "access key {} not found for {}",
                    tx.public_key, tx.signer_id
                )
            })?;
        if tx.nonce <= key.nonce {
            return Err(format!(
                "invalid nonce {} (access key nonce is {})",
                tx.nonce, key.nonce
            ));
        }

        let mut registry = self.registry.clone();
        let mut value = Value::Null;
        for action in &tx.actions {
            let Action::FunctionCall {
                method_name,
                args,
                deposit,
                ..
            } = action;
            if !key.permission.allows(&tx.receiver_id, method_name, *deposit) {
                return Err(format!("access key does not permit {}", method_name));
            }
            value = registry.call(&tx.signer_id, method_name, args)?;
        }

        self.registry = registry;
        if let Some(key) = self
            .access_keys
            .get_mut(&(tx.signer_id.clone(), tx.public_key))
        {
            key.nonce = tx.nonce;
        }
        self.height += 1;

        let outcome = TxOutcome {
            transaction_hash: hash.clone(),
            value,
        };
        self.txs.insert(hash.0, outcome.clone());
        Ok(outcome)
    }
}
