//! App Store Connect bearer credentials.
//!
//! App Store Connect accepts an ES256-signed JWT whose header names the API
//! key (`kid`) and whose claims name the issuer, the fixed audience
//! `appstoreconnect-v1`, and an expiry no more than 20 minutes out.
//!
//! A pre-generated token, when configured, is used unconditionally and is
//! never inspected. Otherwise a fresh token is signed for every call.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use events::EnrichmentError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// JWT audience required by App Store Connect.
pub const AUDIENCE: &str = "appstoreconnect-v1";

/// Lifetime of generated tokens, in seconds (20 minutes).
pub const TOKEN_LIFETIME_SECS: i64 = 20 * 60;

/// Credential material, as configured.
#[derive(Clone, Default)]
pub struct CredentialConfig {
    /// A pre-generated bearer token. Takes precedence over everything else.
    pub token: Option<String>,
    /// API key identifier (`kid`).
    pub key_id: Option<String>,
    /// Issuer identifier (`iss`).
    pub issuer_id: Option<String>,
    /// Base64 encoding of the `.p8` PEM private key.
    pub private_key_base64: Option<String>,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("key_id", &self.key_id)
            .field("issuer_id", &self.issuer_id)
            .field(
                "private_key_base64",
                &self.private_key_base64.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// JWT claims sent to App Store Connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer id.
    pub iss: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Always [`AUDIENCE`].
    pub aud: String,
}

/// Produces bearer tokens from [`CredentialConfig`].
#[derive(Debug, Clone)]
pub struct TokenProvider {
    config: CredentialConfig,
}

impl TokenProvider {
    /// Creates a provider. Configuration is validated lazily, per call.
    pub fn new(config: CredentialConfig) -> Self {
        Self { config }
    }

    /// Returns `true` when a pre-generated token is configured.
    pub fn uses_pre_generated_token(&self) -> bool {
        self.config.token.is_some()
    }

    /// Returns a bearer token valid from now.
    ///
    /// # Errors
    ///
    /// See [`TokenProvider::bearer_token_at`].
    pub fn bearer_token(&self) -> Result<String, EnrichmentError> {
        self.bearer_token_at(Utc::now())
    }

    /// Returns a bearer token issued at `now`.
    ///
    /// # Errors
    ///
    /// - [`EnrichmentError::IncompleteCredentials`] without a token and
    ///   without both key id and issuer id.
    /// - [`EnrichmentError::MissingPrivateKey`] without a private key.
    /// - [`EnrichmentError::InvalidKey`] for undecodable key material.
    /// - [`EnrichmentError::Signing`] if signing fails.
    pub fn bearer_token_at(&self, now: DateTime<Utc>) -> Result<String, EnrichmentError> {
        if let Some(token) = &self.config.token {
            return Ok(token.clone());
        }

        let (Some(key_id), Some(issuer_id)) = (&self.config.key_id, &self.config.issuer_id) else {
            return Err(EnrichmentError::IncompleteCredentials);
        };
        let encoded_key = self
            .config
            .private_key_base64
            .as_deref()
            .ok_or(EnrichmentError::MissingPrivateKey)?;

        let key = decode_private_key(encoded_key)?;

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(key_id.clone());
        header.typ = Some("JWT".to_string());

        let claims = Claims {
            iss: issuer_id.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
            aud: AUDIENCE.to_string(),
        };

        let token = encode(&header, &claims, &key)
            .map_err(|e| EnrichmentError::Signing(e.to_string()))?;
        debug!(%key_id, "generated App Store Connect token");
        Ok(token)
    }
}

fn decode_private_key(encoded: &str) -> Result<EncodingKey, EnrichmentError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let pem = STANDARD
        .decode(compact)
        .map_err(|e| EnrichmentError::InvalidKey(format!("not valid base64: {e}")))?;
    EncodingKey::from_ec_pem(&pem)
        .map_err(|e| EnrichmentError::InvalidKey(format!("not a valid EC PEM key: {e}")))
}
