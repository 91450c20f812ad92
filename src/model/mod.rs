mod call;
mod ids;
mod keys;
mod schema;
mod session;
mod transaction;

pub use self::call::{
    CallError, CallKind, CallOutcome, ContractCallRequest, ContractCallResult, ErrorKind,
};
pub use self::ids::{AccountId, TxHash};
pub use self::keys::{AccessKey, PublicKey};
pub use self::schema::{ArgSpec, ArgType, ContractSchema, MethodSchema};
pub use self::session::Session;
pub use self::transaction::{
    AccessKeyPermission, AccessKeyView, Action, DEFAULT_GAS, SignedTransaction, Transaction,
    TransactionDraft,
};
