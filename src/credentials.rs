//! Credential store
//!
//! Holds one bearer token per subject. Login scenarios populate it through
//! extraction; scenarios that require authorization read from it. A token
//! past its expiry is never handed out, so a stale token is reported before
//! any request is sent instead of surfacing as a remote 401.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::common::config::StaticCredential;
use crate::common::{Error, Result};

/// An authentication token bound to a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub subject: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the credential can still be used at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Per-subject token storage for a run
#[derive(Debug, Default)]
pub struct CredentialStore {
    credentials: HashMap<String, Credential>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with out-of-band tokens
    pub fn with_static(credentials: &[StaticCredential]) -> Self {
        let mut store = Self::new();
        let now = Utc::now();
        for cred in credentials {
            store.put(
                &cred.subject,
                &cred.token,
                cred.issued_at.unwrap_or(now),
                cred.expires_at,
            );
        }
        store
    }

    /// Record or overwrite the credential for `subject`
    pub fn put(
        &mut self,
        subject: &str,
        token: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) {
        tracing::debug!(subject, %expires_at, "Storing credential");
        self.credentials.insert(
            subject.to_string(),
            Credential {
                subject: subject.to_string(),
                token: token.to_string(),
                issued_at,
                expires_at,
            },
        );
    }

    /// Store an already-built credential
    pub fn insert(&mut self, credential: Credential) {
        self.put(
            &credential.subject,
            &credential.token,
            credential.issued_at,
            credential.expires_at,
        );
    }

    /// Current token for `subject`, checked against the wall clock
    pub fn get(&self, subject: &str) -> Result<&str> {
        self.get_at(subject, Utc::now())
    }

    /// Current token for `subject`, checked against `now`
    pub fn get_at(&self, subject: &str, now: DateTime<Utc>) -> Result<&str> {
        let credential = self
            .credentials
            .get(subject)
            .ok_or_else(|| Error::CredentialMissing(subject.to_string()))?;

        if !credential.is_valid_at(now) {
            return Err(Error::CredentialExpired {
                subject: subject.to_string(),
                expired_at: credential.expires_at.to_rfc3339(),
            });
        }

        Ok(&credential.token)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[derive(Deserialize)]
struct JwtClaims {
    iat: Option<i64>,
    exp: Option<i64>,
}

/// Build a credential for a freshly obtained token
///
/// JWTs carry their own lifetime in the `iat`/`exp` claims; those are used
/// when present. Opaque tokens (or JWTs without claims) are assumed issued
/// at `now` and valid for `default_ttl`.
pub fn credential_from_token(
    subject: &str,
    token: &str,
    now: DateTime<Utc>,
    default_ttl: Duration,
) -> Credential {
    let claims = decode_jwt_claims(token);

    let issued_at = claims
        .as_ref()
        .and_then(|c| c.iat)
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or(now);
    let expires_at = claims
        .as_ref()
        .and_then(|c| c.exp)
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or(issued_at + default_ttl);

    Credential {
        subject: subject.to_string(),
        token: token.to_string(),
        issued_at,
        expires_at,
    }
}

fn decode_jwt_claims(token: &str) -> Option<JwtClaims> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}
