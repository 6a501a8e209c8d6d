use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing credential: {key} is not set or empty")]
    MissingCredential { key: String },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
