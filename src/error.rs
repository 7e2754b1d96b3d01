use thiserror::Error;

/// Errors raised while saving or restoring module state
///
/// Frame processing itself is total and never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown module type: {0}")]
    UnknownModule(String),

    #[error("unsupported rack version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
