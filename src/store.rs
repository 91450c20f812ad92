use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::model::{AccessKey, AccountId, PublicKey};

pub const STORE_DIR: &str = ".gateway";
const STATE_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletState {
    pub version: u32,

    /// Signed-in account per app key (`<network>#<contract>`).
    #[serde(default)]
    pub auth: HashMap<String, WalletAuth>,

    /// Hex secret keys per `<network>:<account>`.
    #[serde(default)]
    pub keys: HashMap<String, String>,

    #[serde(default)]
    pub pending: HashMap<String, PendingKey>,
}

impl Default for WalletState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            auth: HashMap::new(),
            keys: HashMap::new(),
            pending: HashMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletAuth {
    pub account_id: AccountId,
    #[serde(default)]
    pub all_keys: Vec<PublicKey>,
    pub signed_in_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingKey {
    pub public_key: PublicKey,
    pub secret_key: String,
    pub requested_at: String,
}

#[derive(Clone, Debug)]
pub struct KeyStore {
    root: PathBuf,
}

impl KeyStore {
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).with_context(|| format!("create {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    pub fn read_state(&self) -> Result<WalletState> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(WalletState::default());
        }
        let bytes = fs::read(&path).context("read state.json")?;
        let st: WalletState = serde_json::from_slice(&bytes).context("parse state.json")?;
        if st.version != STATE_VERSION {
            anyhow::bail!("unsupported wallet state version {}", st.version);
        }
        Ok(st)
    }

    pub fn write_state(&self, st: &WalletState) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(st).context("serialize wallet state")?;
        write_atomic(&self.state_path(), &bytes).context("write state.json")?;
        Ok(())
    }

    /// Read-modify-write of the whole state in one atomic write. The state
    /// is written even when `f` reports a failure through its return value.
    pub fn update<T>(&self, f: impl FnOnce(&mut WalletState) -> T) -> Result<T> {
        let mut st = self.read_state()?;
        let out = f(&mut st);
        self.write_state(&st)?;
        Ok(out)
    }

    pub fn get_auth(&self, app_key: &str) -> Result<Option<WalletAuth>> {
        Ok(self.read_state()?.auth.get(app_key).cloned())
    }

    pub(crate) fn key_id(network_id: &str, account_id: &AccountId) -> String {
        format!("{}:{}", network_id, account_id)
    }

    pub fn get_key(&self, network_id: &str, account_id: &AccountId) -> Result<Option<AccessKey>> {
        let st = self.read_state()?;
        st.keys
            .get(&Self::key_id(network_id, account_id))
            .map(|s| AccessKey::from_secret_hex(s))
            .transpose()
            .with_context(|| format!("load key for {}", account_id))
    }

    pub fn remove_account(&self, app_key: &str, network_id: &str) -> Result<Option<WalletAuth>> {
        self.update(|st| {
            let auth = st.auth.remove(app_key)?;
            st.keys.remove(&Self::key_id(network_id, &auth.account_id));
            Some(auth)
        })
    }

    pub fn set_pending(&self, app_key: &str, key: &AccessKey) -> Result<()> {
        let pending = PendingKey {
            public_key: key.public_key(),
            secret_key: key.secret_hex(),
            requested_at: now_ts()?,
        };
        self.update(|st| {
            st.pending.insert(app_key.to_string(), pending);
        })
    }

    pub fn take_pending(&self, app_key: &str) -> Result<Option<AccessKey>> {
        let mut st = self.read_state()?;
        let Some(pending) = st.pending.remove(app_key) else {
            return Ok(None);
        };
        self.write_state(&st)?;
        let key = AccessKey::from_secret_hex(&pending.secret_key)?;
        if key.public_key() != pending.public_key {
            return Err(anyhow!("pending key for {} is corrupt", app_key));
        }
        Ok(Some(key))
    }
}

pub(crate) fn now_ts() -> Result<String> {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .context("format timestamp")
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
