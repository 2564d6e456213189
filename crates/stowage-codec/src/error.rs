use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{codec} serialization failed: {reason}")]
    Serialize { codec: &'static str, reason: String },

    #[error("{codec} deserialization failed: {reason}")]
    Deserialize { codec: &'static str, reason: String },

    #[error("{codec} codec cannot handle values of type {type_name}")]
    UnsupportedType {
        codec: &'static str,
        type_name: &'static str,
    },
}

impl CodecError {
    pub(crate) fn serialize(codec: &'static str, e: impl std::fmt::Display) -> Self {
        Self::Serialize {
            codec,
            reason: e.to_string(),
        }
    }

    pub(crate) fn deserialize(codec: &'static str, e: impl std::fmt::Display) -> Self {
        Self::Deserialize {
            codec,
            reason: e.to_string(),
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
