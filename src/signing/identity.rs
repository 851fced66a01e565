// Partner Identity
//
// Issuer id, audience and RS256 private key of the calling partner, plus a
// process-wide cache so key files are parsed once.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use jsonwebtoken::{Algorithm, EncodingKey};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::signing::error::SigningError;

/// Partner identity used to sign every request.
#[derive(Clone)]
pub struct SigningIdentity {
    issuer_id: String,
    audience: String,
    key: Arc<EncodingKey>,
}

impl SigningIdentity {
    /// Build an identity from an already loaded key.
    pub fn new(issuer_id: impl Into<String>, audience: impl Into<String>, key: Arc<EncodingKey>) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            audience: audience.into(),
            key,
        }
    }

    /// Build an identity from PEM encoded RSA private key bytes.
    pub fn from_pem(
        issuer_id: impl Into<String>,
        audience: impl Into<String>,
        pem: &[u8],
    ) -> Result<Self, SigningError> {
        let key = parse_private_key(pem)?;
        Ok(Self::new(issuer_id, audience, Arc::new(key)))
    }

    /// Build an identity from a PEM key file, going through the global
    /// [`KeyCache`].
    pub fn from_key_file(
        issuer_id: impl Into<String>,
        audience: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, SigningError> {
        let key = KeyCache::global().load(path.as_ref())?;
        Ok(Self::new(issuer_id, audience, key))
    }

    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub(crate) fn key(&self) -> &EncodingKey {
        &self.key
    }

    /// Reject identities that cannot produce a meaningful token.
    pub fn validate(&self) -> Result<(), SigningError> {
        if self.issuer_id.trim().is_empty() {
            return Err(SigningError::Configuration("missing partner id".to_string()));
        }
        if self.audience.trim().is_empty() {
            return Err(SigningError::Configuration("missing audience".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("issuer_id", &self.issuer_id)
            .field("audience", &self.audience)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Parse a PEM (PKCS#1 or PKCS#8) RSA private key and make sure it can
/// actually produce an RS256 signature.
pub fn parse_private_key(pem: &[u8]) -> Result<EncodingKey, SigningError> {
    let key = EncodingKey::from_rsa_pem(pem)
        .map_err(|e| SigningError::KeyLoad(format!("malformed RSA private key: {}", e)))?;

    // PEM parsing alone accepts any DER payload; the key is only validated
    // when it is first used.
    jsonwebtoken::crypto::sign(b"key-check", &key, Algorithm::RS256)
        .map_err(|e| SigningError::KeyLoad(format!("key cannot sign RS256: {}", e)))?;

    Ok(key)
}

/// Read and parse a key file without caching.
pub fn load_key_file(path: &Path) -> Result<EncodingKey, SigningError> {
    let pem = std::fs::read(path)
        .map_err(|e| SigningError::KeyLoad(format!("{}: {}", path.display(), e)))?;
    parse_private_key(&pem).map_err(|e| match e {
        SigningError::KeyLoad(msg) => SigningError::KeyLoad(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

static GLOBAL_KEY_CACHE: Lazy<KeyCache> = Lazy::new(KeyCache::new);

/// Parsed private keys keyed by file path.
///
/// Concurrent loaders of the same path may both read the file; the first
/// entry stored is the one every caller gets back.
#[derive(Default)]
pub struct KeyCache {
    keys: RwLock<HashMap<PathBuf, Arc<EncodingKey>>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache shared by the whole process.
    pub fn global() -> &'static KeyCache {
        &GLOBAL_KEY_CACHE
    }

    /// Return the cached key for `path`, loading it on first use.
    pub fn load(&self, path: &Path) -> Result<Arc<EncodingKey>, SigningError> {
        if let Some(key) = self
            .keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            return Ok(Arc::clone(key));
        }

        debug!("Loading signing key from {}", path.display());
        let key = Arc::new(load_key_file(path)?);

        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(keys.entry(path.to_path_buf()).or_insert(key)))
    }

    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached key, forcing the next load to hit the filesystem.
    pub fn clear(&self) {
        self.keys.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
