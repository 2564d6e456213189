use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

/// YAML via `serde_yaml`.
#[derive(Clone, Copy, Debug, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn serialize<V: Serialize + 'static>(&self, value: &V) -> CodecResult<Vec<u8>> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| CodecError::serialize("yaml", e))
    }

    fn deserialize<V: DeserializeOwned + 'static>(&self, bytes: &[u8]) -> CodecResult<V> {
        serde_yaml::from_slice(bytes).map_err(|e| CodecError::deserialize("yaml", e))
    }
}
