use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CallError;

/// Chain account identity, e.g. `alice.testnet`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 64;

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase alphanumeric parts joined by single `-`, `_` or `.` separators.
    pub fn validate(s: &str) -> Result<(), CallError> {
        if s.len() < Self::MIN_LEN || s.len() > Self::MAX_LEN {
            return Err(CallError::invalid_arguments(format!(
                "account id must be {}-{} characters: {:?}",
                Self::MIN_LEN,
                Self::MAX_LEN,
                s
            )));
        }
        let mut prev_separator = true;
        for c in s.chars() {
            let separator = matches!(c, '-' | '_' | '.');
            if separator {
                if prev_separator {
                    return Err(CallError::invalid_arguments(format!(
                        "account id has misplaced separator: {:?}",
                        s
                    )));
                }
            } else if !(c.is_ascii_lowercase() || c.is_ascii_digit()) {
                return Err(CallError::invalid_arguments(format!(
                    "account id has invalid character {:?}: {:?}",
                    c, s
                )));
            }
            prev_separator = separator;
        }
        if prev_separator {
            return Err(CallError::invalid_arguments(format!(
                "account id ends with a separator: {:?}",
                s
            )));
        }
        Ok(())
    }
}

impl FromStr for AccountId {
    type Err = CallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for AccountId {
    type Error = CallError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Blake3 hash of a transaction, hex encoded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
