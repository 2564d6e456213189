use std::any::{self, Any, TypeId};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

/// Stores `Vec<u8>` values verbatim and `String` values as UTF-8.
///
/// Every other value type is rejected with
/// [`CodecError::UnsupportedType`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RawBytesCodec;

impl RawBytesCodec {
    /// Whether values of type `V` can pass through this codec.
    pub fn supports<V: 'static>() -> bool {
        let id = TypeId::of::<V>();
        id == TypeId::of::<Vec<u8>>() || id == TypeId::of::<String>()
    }

    fn unsupported<V>() -> CodecError {
        CodecError::UnsupportedType {
            codec: "bytes",
            type_name: any::type_name::<V>(),
        }
    }
}

impl Codec for RawBytesCodec {
    fn name(&self) -> &'static str {
        "bytes"
    }

    fn serialize<V: Serialize + 'static>(&self, value: &V) -> CodecResult<Vec<u8>> {
        let value = value as &dyn Any;
        if let Some(bytes) = value.downcast_ref::<Vec<u8>>() {
            return Ok(bytes.clone());
        }
        if let Some(s) = value.downcast_ref::<String>() {
            return Ok(s.as_bytes().to_vec());
        }
        Err(Self::unsupported::<V>())
    }

    fn deserialize<V: DeserializeOwned + 'static>(&self, bytes: &[u8]) -> CodecResult<V> {
        let boxed: Box<dyn Any> = if TypeId::of::<V>() == TypeId::of::<Vec<u8>>() {
            Box::new(bytes.to_vec())
        } else if TypeId::of::<V>() == TypeId::of::<String>() {
            let s = String::from_utf8(bytes.to_vec())
                .map_err(|e| CodecError::deserialize("bytes", e))?;
            Box::new(s)
        } else {
            return Err(Self::unsupported::<V>());
        };
        boxed
            .downcast::<V>()
            .map(|v| *v)
            .map_err(|_| Self::unsupported::<V>())
    }
}
