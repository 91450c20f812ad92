use serde::{Deserialize, Serialize};

use super::AccountId;

/// The account id is present exactly when the session is authenticated; the
/// type stores only the optional account so the two cannot disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SessionView", try_from = "SessionView")]
pub struct Session {
    account_id: Option<AccountId>,
    network_id: String,
}

impl Session {
    pub fn anonymous(network_id: impl Into<String>) -> Self {
        Self {
            account_id: None,
            network_id: network_id.into(),
        }
    }

    pub fn signed_in(network_id: impl Into<String>, account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            network_id: network_id.into(),
        }
    }

    pub fn authenticated(&self) -> bool {
        self.account_id.is_some()
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        self.account_id.as_ref()
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }
}

#[derive(Serialize, Deserialize)]
struct SessionView {
    authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_id: Option<AccountId>,
    network_id: String,
}

impl From<Session> for SessionView {
    fn from(s: Session) -> Self {
        Self {
            authenticated: s.account_id.is_some(),
            account_id: s.account_id,
            network_id: s.network_id,
        }
    }
}

impl TryFrom<SessionView> for Session {
    type Error = String;

    fn try_from(v: SessionView) -> Result<Self, Self::Error> {
        if v.authenticated != v.account_id.is_some() {
            return Err("session account_id must be present iff authenticated".to_string());
        }
        Ok(Self {
            account_id: v.account_id,
            network_id: v.network_id,
        })
    }
}
