// Payment MCP Library
//
// Signed access to the payment API for MCP tool adapters. Every request is
// authenticated with a partner-signed RS256 token; bodies are sent in their
// canonical form so the content hash in the token matches.

// Module declarations
pub mod api;
pub mod config;
pub mod signing;
pub mod tools;

// Re-export public types and functions
pub use api::SignedApiClient;
pub use config::{ApiConfig, Environment};
pub use signing::{ContentHashAlgorithm, RequestSigner, SignedRequest, SigningError, SigningIdentity};
pub use tools::ToolExecutor;
