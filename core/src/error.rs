//! Error types for provider session setup.

use thiserror::Error;

/// Failure to establish a metrics-provider session.
///
/// Session failures degrade the overlay (every reading shows `N/A`) rather
/// than preventing it; individual metric queries never produce an error at
/// all, only absence.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("NVML initialization failed: {0}")]
    NvmlInit(#[from] nvml_wrapper::error::NvmlError),

    #[error("no GPU devices present")]
    NoGpu,
}
