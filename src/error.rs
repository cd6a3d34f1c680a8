use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring the brush or drawing on the canvas
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A setter was given a value outside the legal set for its field
    #[error("{value} is not a valid {field}")]
    InvalidParameter {
        field: &'static str,
        value: String,
    },

    /// A stroke operation was invoked outside of the state it requires
    #[error("invalid canvas state: {0}")]
    InvalidState(&'static str),

    /// Reading or writing an image file failed
    #[error("failed to access image {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl CanvasError {
    pub(crate) fn invalid_parameter(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            field,
            value: value.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for canvas and brush operations
pub type CanvasResult<T> = Result<T, CanvasError>;
