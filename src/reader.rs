use crate::{
    errors::{Error, Result},
    path,
    security::check_allowed,
};
use async_trait::async_trait;
use std::io;
use tracing::debug;

pub use crate::security::AllowList;

/// Where file contents come from. Every read the crate performs goes
/// through one of these.
#[async_trait]
pub trait FileSource: Send + Sync {
    async fn read_to_string(&self, path: &str) -> io::Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl FileSource for TokioFs {
    async fn read_to_string(&self, path: &str) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

/// Reads whole files as UTF-8 text, refusing paths outside the allow-list.
#[derive(Debug, Clone, Default)]
pub struct SafeReader<F = TokioFs> {
    source: F,
}

impl SafeReader<TokioFs> {
    pub fn new() -> Self {
        Self { source: TokioFs }
    }
}

impl<F: FileSource> SafeReader<F> {
    pub fn with_source(source: F) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    /// Normalize `path`, check it against `allow`, then read it in one go.
    ///
    /// The allow-list is consulted before the source is touched, so a denied
    /// path never reaches the filesystem.
    pub async fn read(&self, path: &str, allow: &AllowList) -> Result<String> {
        let normalized = path::normalize(path);
        check_allowed(&normalized, allow)?;
        debug!(path = %normalized, "reading file");
        self.source
            .read_to_string(&normalized)
            .await
            .map_err(|source| Error::ReadFailure { path: normalized, source })
    }
}

/// Read `path` from disk, restricted to `allowed` directories when any are
/// given.
pub async fn read<S: AsRef<str>>(path: &str, allowed: &[S]) -> Result<String> {
    SafeReader::new().read(path, &AllowList::new(allowed)).await
}
