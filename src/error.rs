use thiserror::Error;

/// Main error type for the detection engine.
/// Aggregates errors from the header finder and the segmentation pipeline.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("{0}")]
    WithContextError(String),

    // Detection errors
    #[error("{0}")]
    HeaderError(#[from] crate::detection::header::HeaderError),

    /// Segmentation produced no usable rows at all.
    #[error("No structured table found")]
    NoStructuredTableFound,
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, DetectionError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| DetectionError::WithContextError(format!("{}: {}", message, e)))
    }
}
