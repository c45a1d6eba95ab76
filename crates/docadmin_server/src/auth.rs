//! Request authorization.
//!
//! An [`Authorizer`] decides, before anything else happens, whether a
//! request may be served. Any `Fn(&AdminRequest) -> bool` closure is an
//! authorizer; [`TokenAuthorizer`] is a stock implementation based on
//! HMAC-SHA256 signed tokens.
//!
//! ## Token Format
//!
//! Tokens are composed of:
//! - 8 bytes: issue timestamp (Unix millis, big-endian)
//! - N bytes: user name (UTF-8)
//! - 32 bytes: HMAC-SHA256 signature over everything before it
//!
//! Base64-encoded for transport in the `x-admin-token` header.

use crate::error::{AdminError, AdminResult};
use crate::request::AdminRequest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const TIMESTAMP_LEN: usize = 8;
const SIGNATURE_LEN: usize = 32;

/// Header carrying admin tokens.
pub const TOKEN_HEADER: &str = "x-admin-token";

/// Decides whether a request may reach the admin.
pub trait Authorizer: Send + Sync {
    /// Returns true if the request is allowed.
    fn authorize(&self, request: &AdminRequest) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&AdminRequest) -> bool + Send + Sync,
{
    fn authorize(&self, request: &AdminRequest) -> bool {
        self(request)
    }
}

/// Token authorizer configuration.
#[derive(Clone)]
pub struct TokenConfig {
    /// Secret key for HMAC.
    pub secret: Vec<u8>,
    /// Token lifetime.
    pub expiry: Duration,
    /// Header the token is read from.
    pub header: String,
}

impl TokenConfig {
    /// Creates a configuration with an 8 hour expiry.
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            expiry: Duration::from_secs(8 * 60 * 60),
            header: TOKEN_HEADER.to_string(),
        }
    }

    /// Sets the token lifetime.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Sets the header the token is read from.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("expiry", &self.expiry)
            .field("header", &self.header)
            .finish()
    }
}

/// Issues and validates signed, expiring admin tokens.
#[derive(Clone)]
pub struct TokenAuthorizer {
    mac: HmacSha256,
    expiry: Duration,
    header: String,
}

impl TokenAuthorizer {
    /// Creates a token authorizer.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidConfig`] if the secret is empty.
    pub fn new(config: TokenConfig) -> AdminResult<Self> {
        if config.secret.is_empty() {
            return Err(AdminError::invalid_config("token secret must not be empty"));
        }
        let mac = HmacSha256::new_from_slice(&config.secret)
            .map_err(|e| AdminError::invalid_config(format!("token secret: {e}")))?;
        Ok(Self {
            mac,
            expiry: config.expiry,
            header: config.header,
        })
    }

    /// Issues a token for `user`, valid from now until the expiry elapses.
    pub fn issue_token(&self, user: &str) -> String {
        self.issue_token_at(user, now_millis())
    }

    fn issue_token_at(&self, user: &str, timestamp: u64) -> String {
        let mut data = Vec::with_capacity(TIMESTAMP_LEN + user.len() + SIGNATURE_LEN);
        data.extend_from_slice(&timestamp.to_be_bytes());
        data.extend_from_slice(user.as_bytes());

        let signature = self.sign(&data);
        data.extend_from_slice(&signature);
        STANDARD.encode(data)
    }

    /// Validates a token and returns the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidToken`] if the token is malformed,
    /// tampered with, or expired.
    pub fn verify(&self, token: &str) -> AdminResult<String> {
        let invalid = |reason| AdminError::InvalidToken { reason };

        let raw = STANDARD
            .decode(token.trim())
            .map_err(|_| invalid("not base64"))?;
        if raw.len() < TIMESTAMP_LEN + SIGNATURE_LEN {
            return Err(invalid("too short"));
        }

        let (data, signature) = raw.split_at(raw.len() - SIGNATURE_LEN);
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.verify_slice(signature)
            .map_err(|_| invalid("bad signature"))?;

        let (timestamp, user) = data.split_at(TIMESTAMP_LEN);
        let mut stamp = [0u8; TIMESTAMP_LEN];
        stamp.copy_from_slice(timestamp);
        let issued = u64::from_be_bytes(stamp);

        let expiry = u64::try_from(self.expiry.as_millis()).unwrap_or(u64::MAX);
        if now_millis() > issued.saturating_add(expiry) {
            return Err(invalid("expired"));
        }

        String::from_utf8(user.to_vec()).map_err(|_| invalid("user is not UTF-8"))
    }

    /// Returns the header tokens are read from.
    pub fn header(&self) -> &str {
        &self.header
    }

    fn sign(&self, data: &[u8]) -> [u8; SIGNATURE_LEN] {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().into()
    }
}

impl Authorizer for TokenAuthorizer {
    fn authorize(&self, request: &AdminRequest) -> bool {
        let Some(token) = request.header(&self.header) else {
            tracing::debug!(path = request.path(), "request carries no admin token");
            return false;
        };
        match self.verify(token) {
            Ok(user) => {
                tracing::debug!(%user, path = request.path(), "admin token accepted");
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, path = request.path(), "admin token rejected");
                false
            }
        }
    }
}

impl fmt::Debug for TokenAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthorizer")
            .field("expiry", &self.expiry)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

fn now_millis() -> u64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    u64::try_from(elapsed).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    fn authorizer() -> TokenAuthorizer {
        TokenAuthorizer::new(TokenConfig::new(b"test-secret-key-32-bytes-long!!".to_vec())).unwrap()
    }

    #[test]
    fn issue_and_verify_token() {
        let auth = authorizer();
        let token = auth.issue_token("alice");
        assert_eq!(auth.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn reject_tampered_token() {
        let auth = authorizer();
        let mut raw = STANDARD.decode(auth.issue_token("alice")).unwrap();
        raw[TIMESTAMP_LEN] ^= 0x01; // Flip a bit in the user name
        let token = STANDARD.encode(raw);

        let err = auth.verify(&token).unwrap_err();
        assert!(matches!(err, AdminError::InvalidToken { reason: "bad signature" }));
    }

    #[test]
    fn reject_token_from_other_secret() {
        let other = TokenAuthorizer::new(TokenConfig::new(b"another-secret".to_vec())).unwrap();
        let token = other.issue_token("alice");
        assert!(authorizer().verify(&token).is_err());
    }

    #[test]
    fn reject_expired_token() {
        let config = TokenConfig::new(b"test-secret-key-32-bytes-long!!".to_vec())
            .with_expiry(Duration::from_secs(60));
        let auth = TokenAuthorizer::new(config).unwrap();

        let token = auth.issue_token_at("alice", now_millis() - 61_000);
        let err = auth.verify(&token).unwrap_err();
        assert!(matches!(err, AdminError::InvalidToken { reason: "expired" }));
    }

    #[test]
    fn reject_garbage() {
        let auth = authorizer();
        assert!(auth.verify("not base64 at all!").is_err());
        assert!(auth.verify(&STANDARD.encode([0u8; 10])).is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = TokenAuthorizer::new(TokenConfig::new(Vec::new())).unwrap_err();
        assert!(matches!(err, AdminError::InvalidConfig { .. }));
    }

    #[test]
    fn authorize_reads_header() {
        let auth = authorizer();
        let token = auth.issue_token("alice");

        assert!(auth.authorize(&AdminRequest::get("/").with_header("X-Admin-Token", token)));
        assert!(!auth.authorize(&AdminRequest::get("/")));
        assert!(!auth.authorize(&AdminRequest::get("/").with_header(TOKEN_HEADER, "bogus")));
    }

    #[test]
    fn custom_header() {
        let config = TokenConfig::new(b"secret".to_vec()).with_header("authorization");
        let auth = TokenAuthorizer::new(config).unwrap();
        let token = auth.issue_token("bob");

        assert!(auth.authorize(&AdminRequest::get("/").with_header("Authorization", token)));
    }

    #[test]
    fn closures_are_authorizers() {
        let only_get = |request: &AdminRequest| request.method.is_safe();
        assert!(only_get.authorize(&AdminRequest::get("/")));
        assert!(!only_get.authorize(&AdminRequest::new(Method::Post, "/")));
    }
}
