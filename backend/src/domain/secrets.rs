//! Shared-secret configuration and the write-path authenticator.
//!
//! Two secrets may be configured: the primary `API_SECRET` and the
//! relay-specific `API_SECRET_xDripAPS`. Both are read once at startup into
//! an immutable [`SharedSecrets`] value; every request is checked against
//! whichever of them are present.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Environment variable holding the primary secret.
pub const PRIMARY_SECRET_ENV: &str = "API_SECRET";
/// Environment variable holding the relay-specific secret.
pub const APPLICATION_SECRET_ENV: &str = "API_SECRET_xDripAPS";

/// Startup failure: no usable secret was configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SecretsError {
    /// Neither secret is set (or both are blank).
    #[error("neither API_SECRET nor API_SECRET_xDripAPS is set; set one and restart")]
    Misconfigured,
}

/// Per-request authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    /// The caller sent no secret header.
    #[error("client did not pass in the api-secret header")]
    MissingCredential,
    /// The secret matched neither configured value.
    #[error("authentication failed")]
    Mismatch,
}

/// Digest of one secret after Unicode lowercasing.
struct SecretDigest(Zeroizing<[u8; 32]>);

impl SecretDigest {
    fn of(secret: &str) -> Self {
        let folded = Zeroizing::new(secret.to_lowercase());
        let digest: [u8; 32] = Sha256::digest(folded.as_bytes()).into();
        Self(Zeroizing::new(digest))
    }

    /// Byte-wise comparison without early exit.
    fn matches(&self, other: &Self) -> bool {
        let diff = self
            .0
            .iter()
            .zip(other.0.iter())
            .fold(0_u8, |acc, (lhs, rhs)| acc | (lhs ^ rhs));
        diff == 0
    }
}

impl std::fmt::Debug for SecretDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretDigest(..)")
    }
}

/// Immutable set of configured secrets.
///
/// # Examples
/// ```
/// use glucose_relay::domain::SharedSecrets;
///
/// let secrets = SharedSecrets::new(None, Some("s3cret".to_owned())).expect("one secret set");
/// assert!(!secrets.has_primary());
/// assert!(secrets.has_application());
/// ```
#[derive(Debug)]
pub struct SharedSecrets {
    primary: Option<SecretDigest>,
    application: Option<SecretDigest>,
}

fn usable(value: Option<String>) -> Option<SecretDigest> {
    let secret = Zeroizing::new(value?);
    (!secret.trim().is_empty()).then(|| SecretDigest::of(&secret))
}

impl SharedSecrets {
    /// Build the secret set, failing when neither secret is usable.
    pub fn new(primary: Option<String>, application: Option<String>) -> Result<Self, SecretsError> {
        let secrets = Self {
            primary: usable(primary),
            application: usable(application),
        };
        if secrets.primary.is_none() && secrets.application.is_none() {
            return Err(SecretsError::Misconfigured);
        }
        Ok(secrets)
    }

    /// Build the secret set from a variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SecretsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(lookup(PRIMARY_SECRET_ENV), lookup(APPLICATION_SECRET_ENV))
    }

    /// Build the secret set from the process environment.
    pub fn from_env() -> Result<Self, SecretsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Whether `API_SECRET` is configured.
    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Whether `API_SECRET_xDripAPS` is configured.
    #[must_use]
    pub fn has_application(&self) -> bool {
        self.application.is_some()
    }

    fn accepts(&self, supplied: &SecretDigest) -> bool {
        // Evaluate both candidates so timing does not reveal which matched.
        let primary = self.primary.as_ref().is_some_and(|digest| digest.matches(supplied));
        let application = self
            .application
            .as_ref()
            .is_some_and(|digest| digest.matches(supplied));
        primary | application
    }
}

/// Gate for the write path.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use glucose_relay::domain::{AuthFailure, Authenticator, SharedSecrets};
///
/// let secrets = SharedSecrets::new(Some("Token".to_owned()), None).expect("configured");
/// let auth = Authenticator::new(Arc::new(secrets));
/// assert_eq!(auth.authenticate(Some("TOKEN")), Ok(()));
/// assert_eq!(auth.authenticate(None), Err(AuthFailure::MissingCredential));
/// ```
#[derive(Debug, Clone)]
pub struct Authenticator {
    secrets: std::sync::Arc<SharedSecrets>,
}

impl Authenticator {
    /// Create an authenticator over the startup secret set.
    #[must_use]
    pub const fn new(secrets: std::sync::Arc<SharedSecrets>) -> Self {
        Self { secrets }
    }

    /// Check a caller-supplied secret, case-insensitively.
    pub fn authenticate(&self, supplied: Option<&str>) -> Result<(), AuthFailure> {
        let secret = supplied.ok_or(AuthFailure::MissingCredential)?;
        if self.secrets.accepts(&SecretDigest::of(secret)) {
            Ok(())
        } else {
            Err(AuthFailure::Mismatch)
        }
    }
}
