use dataset::InitError;
use thiserror::Error;

use crate::config::ConfigLoadError;

/// Errors raised while opening a [`Provider`](crate::Provider).
///
/// Matching itself never fails: an unrecognised input is `None` and an
/// unresolved property is recorded on the result.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The dataset or the workset pool could not be built.
    #[error(transparent)]
    Init(#[from] InitError),

    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),
}

impl From<ConfigLoadError> for ProviderError {
    fn from(err: ConfigLoadError) -> Self {
        ProviderError::InvalidConfig(err.to_string())
    }
}
