use thiserror::Error;

/// Errors raised while turning a NOTIFY into a zone config update.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    #[error("zone config file not found: {0}")]
    NotFound(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("no such handler type: {0}")]
    NoSuchHandlerType(String),

    #[error("decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised while loading the daemon configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    Missing(String),

    #[error("failed to read config file: {0}")]
    Io(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),
}
