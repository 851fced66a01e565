// Request Signer
//
// Turns a partner identity and an optional body into a bearer token plus
// the canonical body string that has to be transmitted verbatim.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::signing::canonical::to_canonical_string;
use crate::signing::content_hash::ContentHashAlgorithm;
use crate::signing::error::SigningError;
use crate::signing::identity::SigningIdentity;

/// Algorithm used for every token.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::RS256;

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub aud: String,
    pub iat: i64,
}

/// Output of [`RequestSigner::sign`].
///
/// `canonical_body` is the exact payload to send. Re-serializing the
/// original body instead would break the content hash in the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub token: String,
    pub canonical_body: Option<String>,
}

/// Signs outgoing API requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSigner {
    content_hash: ContentHashAlgorithm,
}

impl RequestSigner {
    pub fn new(content_hash: ContentHashAlgorithm) -> Self {
        Self { content_hash }
    }

    pub fn content_hash(&self) -> ContentHashAlgorithm {
        self.content_hash
    }

    /// Sign a request issued now.
    pub fn sign(
        &self,
        identity: &SigningIdentity,
        body: Option<&Value>,
    ) -> Result<SignedRequest, SigningError> {
        self.sign_at(identity, body, Utc::now().timestamp())
    }

    /// Sign a request whose body is any serializable type.
    pub fn sign_serializable<T: Serialize + ?Sized>(
        &self,
        identity: &SigningIdentity,
        body: Option<&T>,
    ) -> Result<SignedRequest, SigningError> {
        let value = body.map(serde_json::to_value).transpose()?;
        self.sign(identity, value.as_ref())
    }

    /// Sign a request with an explicit `iat` (unix seconds).
    pub fn sign_at(
        &self,
        identity: &SigningIdentity,
        body: Option<&Value>,
        issued_at: i64,
    ) -> Result<SignedRequest, SigningError> {
        identity.validate()?;

        let canonical_body = body.map(to_canonical_string).transpose()?;

        let mut header = Map::new();
        header.insert("alg".to_string(), Value::String("RS256".to_string()));
        header.insert("typ".to_string(), Value::String("JWT".to_string()));
        if let Some(encoded) = &canonical_body {
            header.insert(
                self.content_hash.header_field().to_string(),
                Value::String(self.content_hash.digest_base64(encoded)),
            );
        }

        let claims = TokenClaims {
            iss: identity.issuer_id().to_string(),
            aud: identity.audience().to_string(),
            iat: issued_at,
        };

        let header_segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Value::Object(header))?);
        let claims_segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{}.{}", header_segment, claims_segment);

        let signature = jsonwebtoken::crypto::sign(signing_input.as_bytes(), identity.key(), TOKEN_ALGORITHM)
            .map_err(|e| SigningError::KeyLoad(format!("signing failed: {}", e)))?;

        debug!(
            "Signed request for issuer {} (body: {} bytes)",
            claims.iss,
            canonical_body.as_ref().map(String::len).unwrap_or(0)
        );

        Ok(SignedRequest {
            token: format!("{}.{}", signing_input, signature),
            canonical_body,
        })
    }
}

/// Decode the header and claims of a token without verifying it.
///
/// Meant for inspection and diagnostics only.
pub fn decode_token_parts(token: &str) -> Result<(Value, TokenClaims), SigningError> {
    let mut parts = token.split('.');
    let (Some(header), Some(claims), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(SigningError::Serialization("token must have three segments".to_string()));
    };

    let decode = |segment: &str| {
        URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|e| SigningError::Serialization(format!("invalid base64url segment: {}", e)))
    };

    let header: Value = serde_json::from_slice(&decode(header)?)?;
    let claims: TokenClaims = serde_json::from_slice(&decode(claims)?)?;
    Ok((header, claims))
}
