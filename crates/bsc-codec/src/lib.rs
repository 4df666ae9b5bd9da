//! XML payload codec for the build service client.
//!
//! The remote API speaks XML on every route. This crate is the single
//! encode/decode boundary: callers hand it a serde value and get wire bytes
//! back, or hand it wire bytes and get a value back. Route-specific schemas
//! live in `bsc-api`; this crate knows nothing about them.

pub mod codec;
pub mod error;

pub use codec::XmlCodec;
pub use error::{CodecError, CodecResult};
