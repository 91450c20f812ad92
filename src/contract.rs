use serde_json::{Map, Value};
use url::Url;

use crate::model::{
    AccountId, Action, CallError, CallKind, CallOutcome, ContractCallRequest, ContractCallResult,
    ContractSchema, Transaction, TransactionDraft,
};
use crate::rpc::ChainRpc;
use crate::wallet::TransactionSigner;

pub struct ContractProxy<R> {
    contract_id: AccountId,
    schema: ContractSchema,
    rpc: R,
    account: Option<AccountId>,
}

impl<R: ChainRpc> ContractProxy<R> {
    pub fn new(
        contract_id: AccountId,
        schema: ContractSchema,
        rpc: R,
        account: Option<AccountId>,
    ) -> Self {
        Self {
            contract_id,
            schema,
            rpc,
            account,
        }
    }

    pub fn contract_id(&self) -> &AccountId {
        &self.contract_id
    }

    pub fn schema(&self) -> &ContractSchema {
        &self.schema
    }

    pub fn account(&self) -> Option<&AccountId> {
        self.account.as_ref()
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// Rebinds the caller after a sign-in or sign-out.
    pub fn bind_account(&mut self, account: Option<AccountId>) {
        self.account = account;
    }

    pub fn call_view(&self, method_name: &str, args: Map<String, Value>) -> ContractCallResult {
        self.view(&ContractCallRequest::view(method_name, args)).into()
    }

    pub fn call_change(
        &self,
        method_name: &str,
        args: Map<String, Value>,
        deposit: Option<u128>,
        signer: &dyn TransactionSigner,
        callback_url: &Url,
    ) -> CallOutcome {
        let req = ContractCallRequest::change(method_name, args, deposit);
        self.dispatch(&req, signer, callback_url)
    }

    pub fn dispatch(
        &self,
        req: &ContractCallRequest,
        signer: &dyn TransactionSigner,
        callback_url: &Url,
    ) -> CallOutcome {
        let out = match req.kind {
            CallKind::View => self
                .view(req)
                .map(|v| CallOutcome::Completed(ContractCallResult::success(v))),
            CallKind::Change => self.change(req, signer, callback_url),
        };
        out.unwrap_or_else(|err| {
            tracing::debug!(method = %req.method_name, error = %err, "contract call failed");
            CallOutcome::Completed(ContractCallResult::failure(err))
        })
    }

    fn view(&self, req: &ContractCallRequest) -> Result<Value, CallError> {
        self.schema.check(req)?;
        let value = self.rpc.view_function(
            &self.contract_id,
            &req.method_name,
            &Value::Object(req.args.clone()),
        )?;
        Ok(value)
    }

    fn change(
        &self,
        req: &ContractCallRequest,
        signer: &dyn TransactionSigner,
        callback_url: &Url,
    ) -> Result<CallOutcome, CallError> {
        let Some(account) = &self.account else {
            return Err(CallError::not_authenticated());
        };
        self.schema.check(req)?;

        let deposit = req.attached_deposit.unwrap_or(0);
        let action = Action::function_call(
            &req.method_name,
            Value::Object(req.args.clone()),
            deposit,
        );

        if let Some(key) = signer.signing_key(account) {
            let public_key = key.public_key();
            if let Some(view) = self.rpc.view_access_key(account, &public_key)?
                && view
                    .permission
                    .allows(&self.contract_id, &req.method_name, deposit)
            {
                let tx = Transaction {
                    signer_id: account.clone(),
                    public_key,
                    nonce: view.nonce + 1,
                    receiver_id: self.contract_id.clone(),
                    actions: vec![action],
                };
                let signed = tx
                    .sign(&key)
                    .map_err(|e| CallError::invalid_arguments(format!("{:#}", e)))?;
                let outcome = self.rpc.broadcast_tx_commit(&signed)?;
                tracing::debug!(
                    method = %req.method_name,
                    tx = %outcome.transaction_hash,
                    "change call committed"
                );
                return Ok(CallOutcome::Completed(ContractCallResult::success(
                    outcome.value,
                )));
            }
        }

        let draft = TransactionDraft {
            receiver_id: self.contract_id.clone(),
            actions: vec![action],
        };
        let redirect_url = signer.request_transaction_approval(&draft, callback_url)?;
        Ok(CallOutcome::AwaitingApproval { redirect_url })
    }
}

#[cfg(test)]
#[path = "tests/contract_tests.rs"]
mod tests;
