//! Static API key pass-through

use super::Credential;
use std::fmt::Debug;

/// Wraps a key read from the environment. Never touches the network.
#[derive(Clone)]
pub struct StaticKeyCredential {
    key: String,
}

impl StaticKeyCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn credential(&self) -> Credential {
        Credential::ApiKey(self.key.clone())
    }
}

impl Debug for StaticKeyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticKeyCredential(<redacted>)")
    }
}
