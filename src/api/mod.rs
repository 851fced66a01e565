// Payment API Access
//
// HTTP layer that consumes the request signer's output.

pub mod client;

pub use client::{SignedApiClient, API_VERSION_HEADER};
