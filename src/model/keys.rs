use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

const ED25519_PREFIX: &str = "ed25519:";

/// Ed25519 public key, rendered as `ed25519:<hex>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Checks a hex encoded signature over `message`.
    pub fn verify(&self, message: &[u8], signature_hex: &str) -> Result<()> {
        let vk = VerifyingKey::from_bytes(&self.0).map_err(|e| anyhow!("bad public key: {}", e))?;
        let raw = hex::decode(signature_hex).context("decode signature hex")?;
        let bytes: [u8; 64] = raw
            .try_into()
            .map_err(|_| anyhow!("signature must be 64 bytes"))?;
        vk.verify(message, &Signature::from_bytes(&bytes))
            .map_err(|e| anyhow!("signature check failed: {}", e))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ED25519_PREFIX, hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl FromStr for PublicKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let body = s
            .strip_prefix(ED25519_PREFIX)
            .ok_or_else(|| anyhow!("unsupported key type (expected {}...): {}", ED25519_PREFIX, s))?;
        let raw = hex::decode(body).context("decode public key hex")?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| anyhow!("public key must be 32 bytes"))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for PublicKey {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PublicKey> for String {
    fn from(pk: PublicKey) -> Self {
        pk.to_string()
    }
}

/// Key pair the application holds for a signed-in account.
#[derive(Clone)]
pub struct AccessKey {
    signing: SigningKey,
}

impl AccessKey {
    pub fn generate() -> Result<Self> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).map_err(|e| anyhow!("getrandom: {:?}", e))?;
        Ok(Self::from_seed(seed))
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    pub fn from_secret_hex(s: &str) -> Result<Self> {
        let raw = hex::decode(s).context("decode secret key hex")?;
        let seed: [u8; 32] = raw
            .try_into()
            .map_err(|_| anyhow!("secret key must be 32 bytes"))?;
        Ok(Self::from_seed(seed))
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing.to_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing.verifying_key().to_bytes())
    }

    pub fn sign_hex(&self, message: &[u8]) -> String {
        hex::encode(self.signing.sign(message).to_bytes())
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
