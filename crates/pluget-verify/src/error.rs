#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("invalid checksum {value:?}: {reason}")]
    Invalid { value: String, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, VerifyError>;
