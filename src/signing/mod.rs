// Request Signing
//
// Every call to the payment API carries a partner-signed RS256 token. When
// the request has a body, the token header also carries a hash of the
// canonical body, and that canonical string is what must be sent.

pub mod canonical;
pub mod content_hash;
pub mod error;
pub mod identity;
pub mod signer;

pub use canonical::{canonical_number, canonical_string_from, canonicalize, to_canonical_string};
pub use content_hash::ContentHashAlgorithm;
pub use error::SigningError;
pub use identity::{KeyCache, SigningIdentity};
pub use signer::{decode_token_parts, RequestSigner, SignedRequest, TokenClaims, TOKEN_ALGORITHM};
