use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Upper bound on how long a watch may be held open, whatever the
    /// client asks for.
    pub max_wait_msec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 20431)),
            max_wait_msec: 60_000,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:20431".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_wait_msec, 60_000);
    }

    #[test]
    fn toml_overrides() {
        let c = ServerConfig::from_toml_str("bind_addr = \"0.0.0.0:8080\"\n").unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.max_wait_msec, 60_000);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "max_wait_msec = 100\n").unwrap();
        assert_eq!(ServerConfig::load(&path).unwrap().max_wait_msec, 100);
    }

    #[test]
    fn bad_address_is_config_error() {
        assert!(matches!(
            ServerConfig::from_toml_str("bind_addr = \"nowhere\""),
            Err(ServerError::Config(_))
        ));
    }
}
