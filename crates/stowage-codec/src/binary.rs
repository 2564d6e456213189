use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

/// Compact binary encoding via `bincode`.
///
/// Not self-describing: the reader must use the same value type as the
/// writer.
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn serialize<V: Serialize + 'static>(&self, value: &V) -> CodecResult<Vec<u8>> {
        bincode::serialize(value).map_err(|e| CodecError::serialize("bincode", e))
    }

    fn deserialize<V: DeserializeOwned + 'static>(&self, bytes: &[u8]) -> CodecResult<V> {
        bincode::deserialize(bytes).map_err(|e| CodecError::deserialize("bincode", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Reading {
        sensor: String,
        values: Vec<u32>,
    }

    #[test]
    fn binary_roundtrip() {
        let r = Reading {
            sensor: "t1".into(),
            values: vec![1, 2, 3],
        };
        let bytes = BincodeCodec.serialize(&r).unwrap();
        assert_eq!(BincodeCodec.deserialize::<Reading>(&bytes).unwrap(), r);
    }

    #[test]
    fn truncated_input_fails() {
        let bytes = BincodeCodec.serialize(&"a long enough string").unwrap();
        let err = BincodeCodec
            .deserialize::<String>(&bytes[..bytes.len() - 3])
            .unwrap_err();
        assert!(matches!(err, CodecError::Deserialize { .. }));
    }
}
