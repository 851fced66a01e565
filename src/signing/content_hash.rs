// Content Hash
//
// Digest of the canonical body that is embedded in the token header so the
// API can check the body was not altered after signing.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Digest algorithm used for the body hash, together with the header field
/// it is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentHashAlgorithm {
    /// SHA-256, published as `contentSha256`.
    #[default]
    Sha256,
    /// MD5, published as `contentMd5`.
    Md5,
}

impl ContentHashAlgorithm {
    /// Name of the JWT header field carrying the digest.
    pub fn header_field(self) -> &'static str {
        match self {
            ContentHashAlgorithm::Sha256 => "contentSha256",
            ContentHashAlgorithm::Md5 => "contentMd5",
        }
    }

    /// Hash the UTF-8 bytes of `canonical_body` and return the padded
    /// standard base64 encoding of the digest.
    pub fn digest_base64(self, canonical_body: &str) -> String {
        match self {
            ContentHashAlgorithm::Sha256 => STANDARD.encode(Sha256::digest(canonical_body.as_bytes())),
            ContentHashAlgorithm::Md5 => STANDARD.encode(Md5::digest(canonical_body.as_bytes())),
        }
    }
}

impl fmt::Display for ContentHashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentHashAlgorithm::Sha256 => write!(f, "sha256"),
            ContentHashAlgorithm::Md5 => write!(f, "md5"),
        }
    }
}

impl FromStr for ContentHashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(ContentHashAlgorithm::Sha256),
            "md5" => Ok(ContentHashAlgorithm::Md5),
            other => Err(format!("unknown content hash algorithm '{}'", other)),
        }
    }
}
