//! Error types for the mesh optimizer

use std::path::Path;

use thiserror::Error;

/// Main error type for the optimizer
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid rotation angle {0} (expected one of -45, -22.5, 0, 22.5, 45)")]
    InvalidAngle(f64),

    #[error("malformed element: {0}")]
    MalformedElement(String),

    #[error("octree region limit reached at depth {depth} with {items} items in one leaf")]
    IndexDepthExceeded { depth: u8, items: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("model {path}: {source}")]
    Model {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Attach the archive path of the model being processed
    pub fn in_model(self, path: impl Into<String>) -> Self {
        Error::Model {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Config error for a file that could not be located
    pub fn missing_file(path: &Path) -> Self {
        Error::Config(format!("file not found: {}", path.display()))
    }
}
