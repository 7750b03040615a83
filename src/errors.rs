use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Access to {path} is not allowed")]
    AccessDenied { path: String },
    #[error("Failed to read file {path}: {source}")]
    ReadFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Import cycle detected at {path}")]
    ImportCycle { path: String },
    #[error("Import depth limit of {limit} exceeded at {path}")]
    DepthExceeded { path: String, limit: usize },
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::AccessDenied { .. } => "AccessDenied",
            Error::ReadFailure { .. } => "ReadFailure",
            Error::ImportCycle { .. } => "ImportCycle",
            Error::DepthExceeded { .. } => "DepthExceeded",
        }
    }

    /// Normalized path the failure refers to.
    pub fn path(&self) -> &str {
        match self {
            Error::AccessDenied { path }
            | Error::ReadFailure { path, .. }
            | Error::ImportCycle { path }
            | Error::DepthExceeded { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
