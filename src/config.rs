use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::{AccountId, ContractSchema};
use crate::redirect;

pub const CONFIG_FILE: &str = "gateway.json";
pub const ENV_NETWORK: &str = "GATEWAY_ENV";
pub const ENV_CONTRACT: &str = "CONTRACT_NAME";

const DEFAULT_NETWORK: &str = "testnet";
const DEFAULT_CONTRACT: &str = "registry.testnet";
const DEFAULT_APP_URL: &str = "http://localhost:1234/";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub network_id: String,
    pub node_url: Url,
    pub wallet_url: Url,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<Url>,
}

impl NetworkConfig {
    /// Built-in endpoints by environment name.
    pub fn preset(env: &str) -> Result<Self> {
        let (network_id, node, wallet, explorer) = match env {
            "mainnet" | "production" => (
                "mainnet",
                "https://rpc.mainnet.near.org",
                "https://wallet.near.org",
                Some("https://explorer.mainnet.near.org"),
            ),
            "testnet" | "development" => (
                "testnet",
                "https://rpc.testnet.near.org",
                "https://wallet.testnet.near.org",
                Some("https://explorer.testnet.near.org"),
            ),
            "local" => (
                "local",
                "http://localhost:3030",
                "http://localhost:4000/wallet/",
                None,
            ),
            "devnet" => (
                "devnet",
                "http://127.0.0.1:8787/rpc",
                "http://127.0.0.1:8787/",
                None,
            ),
            other => {
                return Err(anyhow!(
                    "unknown environment {:?} (expected mainnet|testnet|local|devnet)",
                    other
                ));
            }
        };
        Ok(Self {
            network_id: network_id.to_string(),
            node_url: Url::parse(node).context("parse preset node url")?,
            wallet_url: Url::parse(wallet).context("parse preset wallet url")?,
            explorer_url: explorer
                .map(Url::parse)
                .transpose()
                .context("parse preset explorer url")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub network: NetworkConfig,

    pub contract_id: AccountId,

    /// Page the wallet returns to when no explicit redirect urls are set.
    pub app_url: Url,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_url: Option<Url>,

    #[serde(default)]
    pub schema: ContractSchema,
}

impl GatewayConfig {
    pub fn for_environment(env: &str, contract_id: AccountId) -> Result<Self> {
        Ok(Self {
            network: NetworkConfig::preset(env)?,
            contract_id,
            app_url: Url::parse(DEFAULT_APP_URL).context("parse default app url")?,
            success_url: None,
            failure_url: None,
            schema: ContractSchema::registry(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: GatewayConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display()))?;
        cfg.validate()
            .with_context(|| format!("validate {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.network_id.trim().is_empty() {
            anyhow::bail!("network_id is empty");
        }
        self.schema.validate()
    }

    pub fn network_id(&self) -> &str {
        &self.network.network_id
    }

    pub fn success_url(&self) -> &Url {
        self.success_url.as_ref().unwrap_or(&self.app_url)
    }

    /// Without an explicit failure url the wallet returns to the app url
    /// tagged with `errorCode=userRejected`, so the failure stays visible.
    pub fn failure_url(&self) -> Url {
        match &self.failure_url {
            Some(u) => u.clone(),
            None => {
                let mut u = self.app_url.clone();
                u.query_pairs_mut()
                    .append_pair(redirect::PARAM_ERROR_CODE, redirect::USER_REJECTED);
                u
            }
        }
    }

    /// Key under which the wallet auth record for this app is persisted.
    pub fn app_key(&self) -> String {
        format!("{}#{}", self.network.network_id, self.contract_id)
    }
}

/// Where configuration may come from, in precedence order: explicit file,
/// flags, environment, built-in defaults.
#[derive(Clone, Debug, Default)]
pub struct ConfigSources {
    pub config_path: Option<PathBuf>,
    pub network: Option<String>,
    pub contract: Option<String>,
    pub node_url: Option<String>,
    pub wallet_url: Option<String>,
    pub app_url: Option<String>,
}

impl ConfigSources {
    pub fn resolve(&self) -> Result<GatewayConfig> {
        self.resolve_with(|k| std::env::var(k).ok())
    }

    pub fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<GatewayConfig> {
        let mut cfg = match &self.config_path {
            Some(path) => GatewayConfig::load(path)?,
            None => {
                let network = self
                    .network
                    .clone()
                    .or_else(|| env(ENV_NETWORK))
                    .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
                let contract = self
                    .contract
                    .clone()
                    .or_else(|| env(ENV_CONTRACT))
                    .unwrap_or_else(|| DEFAULT_CONTRACT.to_string());
                let contract_id: AccountId = contract
                    .parse()
                    .with_context(|| format!("invalid contract id {:?}", contract))?;
                GatewayConfig::for_environment(&network, contract_id)?
            }
        };

        if self.config_path.is_some()
            && let Some(contract) = &self.contract
        {
            cfg.contract_id = contract
                .parse()
                .with_context(|| format!("invalid contract id {:?}", contract))?;
        }
        if let Some(u) = &self.node_url {
            cfg.network.node_url = Url::parse(u).with_context(|| format!("parse node url {}", u))?;
        }
        if let Some(u) = &self.wallet_url {
            cfg.network.wallet_url =
                Url::parse(u).with_context(|| format!("parse wallet url {}", u))?;
        }
        if let Some(u) = &self.app_url {
            cfg.app_url = Url::parse(u).with_context(|| format!("parse app url {}", u))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
