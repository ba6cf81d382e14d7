use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Daemon configuration, read from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address and port the NOTIFY listener binds to
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Remote addresses allowed to send NOTIFY packets. Packets from any
    /// other address are discarded.
    #[serde(default)]
    pub remotes: Vec<IpAddr>,

    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Nameservers to keep in sync, one entry per handler
    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

/// One nameserver update target.
///
/// The `type` tag stays a raw string here; the update handler resolves it
/// and rejects tags it does not know.
#[derive(Debug, Clone, Deserialize)]
pub struct HandlerConfig {
    /// Name used in log output
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    /// Zone config file this handler rewrites
    #[serde(rename = "config-file")]
    pub config_file: PathBuf,

    /// Directory the nameserver keeps zone data files in
    #[serde(rename = "zonefiles-path")]
    pub zonefiles_path: PathBuf,
}

impl AppConfig {
    /// Read and parse the configuration file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Missing(path.display().to_string()));
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn default_listen() -> SocketAddr {
    "0.0.0.0:53".parse().expect("default listen address is valid")
}

fn default_log_level() -> String {
    "info".to_string()
}
