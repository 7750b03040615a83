use crate::{errors::Error, path};
use serde::Serialize;

/// Directories outside of which reads are rejected. Empty means no
/// restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllowList {
    dirs: Vec<String>,
}

impl AllowList {
    pub fn new<S: AsRef<str>>(dirs: &[S]) -> Self {
        dirs.iter().collect()
    }

    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    pub fn permits(&self, path: &str) -> bool {
        self.is_open() || self.dirs.iter().any(|dir| path::is_contained(path, dir))
    }
}

impl<S: AsRef<str>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            dirs: iter.into_iter().map(|d| path::normalize(d.as_ref())).collect(),
        }
    }
}

pub fn check_allowed(path: &str, allow: &AllowList) -> Result<(), Error> {
    if allow.permits(path) {
        Ok(())
    } else {
        tracing::warn!(path = path, allowed = ?allow.dirs(), "access denied");
        Err(Error::AccessDenied { path: path.to_string() })
    }
}
