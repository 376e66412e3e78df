use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage file '{}' does not exist or is not readable", path.display())]
    StorageUnavailable { path: PathBuf },

    #[error("storage file '{}' is not writable", path.display())]
    StorageNotWritable {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("config for '{0}' is not set")]
    ConfigurationMissing(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidData(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
