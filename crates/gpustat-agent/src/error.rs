use thiserror::Error;

/// Failures that abort a snapshot request
///
/// Malformed individual fields are never reported here; parsers degrade them to
/// `Reading::Unavailable` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// Neither `nvidia-smi` nor `rocm-smi` could be run on this host
    #[error("unable to detect GPU brand: no supported diagnostic tool is runnable")]
    NoVendorDetected,

    /// The detected vendor's tool failed to launch, exited non-zero, timed out or
    /// printed output that could not be read
    #[error("{tool} unavailable: {reason}")]
    SourceUnavailable { tool: String, reason: String },
}

impl TelemetryError {
    pub fn source_unavailable(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        TelemetryError::SourceUnavailable {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}
