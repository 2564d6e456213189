use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

/// UTF-8 JSON via `serde_json`. Compact unless `pretty` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn serialize<V: Serialize + 'static>(&self, value: &V) -> CodecResult<Vec<u8>> {
        let out = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        out.map_err(|e| CodecError::serialize("json", e))
    }

    fn deserialize<V: DeserializeOwned + 'static>(&self, bytes: &[u8]) -> CodecResult<V> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::deserialize("json", e))
    }
}
