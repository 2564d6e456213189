//! Value codecs for stowage.
//!
//! A [`Codec`] turns any serde value into bytes and back. The decorator
//! chain holds codecs as `Arc<dyn ValueCodec<V>>`, the object-safe view of
//! a codec bound to the contract's value type.
//!
//! # Codecs
//!
//! - [`JsonCodec`] -- `serde_json`, compact or pretty
//! - [`BincodeCodec`] -- `bincode`, compact binary
//! - [`YamlCodec`] -- `serde_yaml`
//! - [`RawBytesCodec`] -- `Vec<u8>` and `String` only, stored verbatim

pub mod binary;
pub mod bytes;
pub mod error;
pub mod json;
pub mod traits;
pub mod yaml;

pub use binary::BincodeCodec;
pub use bytes::RawBytesCodec;
pub use error::{CodecError, CodecResult};
pub use json::JsonCodec;
pub use traits::{Codec, ValueCodec};
pub use yaml::YamlCodec;
