use std::path::PathBuf;

/// Errors that abort compilation database generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        source: std::io::Error,
    },

    /// A cmd file names a source for an object it has no command for.
    #[error("{}: no cmd_{object} for source_{object}", .path.display())]
    MissingCommand {
        /// Object identifier shared by the cmd_/source_ variables.
        object: String,
        /// The cmd file being parsed.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("{}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    /// The database could not be serialized.
    #[error("{}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
