use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for INI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8 or UTF-16 LE text", path.display())]
    Encoding { path: PathBuf },

    #[error("line {line}: expected `key = value`, found {text:?}")]
    MalformedProperty { line: usize, text: String },

    #[error("line {line}: section name cannot be empty")]
    SectionNameEmpty { line: usize },

    #[error("invalid section name: {name:?}")]
    InvalidSectionName { name: String },

    #[error("invalid key: {key:?}")]
    InvalidKey { key: String },

    #[error("values cannot span multiple lines: {value:?}")]
    InvalidValue { value: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();

        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}
