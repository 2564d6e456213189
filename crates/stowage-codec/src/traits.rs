use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecResult;

/// A serialization format.
///
/// Codecs are generic over the value type at each call, so one codec
/// instance serves every contract. [`ValueCodec`] is the object-safe view
/// of a codec bound to a single value type; every `Codec` is a
/// `ValueCodec<V>` for all serde-capable `V`.
pub trait Codec: Send + Sync + 'static {
    /// Format name used in errors and logs.
    fn name(&self) -> &'static str;

    fn serialize<V: Serialize + 'static>(&self, value: &V) -> CodecResult<Vec<u8>>;

    fn deserialize<V: DeserializeOwned + 'static>(&self, bytes: &[u8]) -> CodecResult<V>;
}

/// A codec bound to one value type.
pub trait ValueCodec<V>: Send + Sync {
    fn name(&self) -> &'static str;

    fn encode(&self, value: &V) -> CodecResult<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> CodecResult<V>;
}

impl<C, V> ValueCodec<V> for C
where
    C: Codec,
    V: Serialize + DeserializeOwned + 'static,
{
    fn name(&self) -> &'static str {
        Codec::name(self)
    }

    fn encode(&self, value: &V) -> CodecResult<Vec<u8>> {
        self.serialize(value)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<V> {
        self.deserialize(bytes)
    }
}
