pub mod config;
pub mod contract;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod redirect;
pub mod rpc;
pub mod session;
pub mod store;
pub mod wallet;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
