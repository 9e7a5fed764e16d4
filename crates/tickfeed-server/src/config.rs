//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tickfeed_core::AssetMode;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Asset root read in filesystem mode.
    pub static_dir: PathBuf,
    pub asset_mode: AssetMode,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8088
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./static")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            asset_mode: AssetMode::default(),
        }
    }
}

impl ServerConfig {
    /// Default configuration, reading assets from disk when `dev` is set.
    pub fn from_dev_flag(dev: bool) -> Self {
        Self {
            asset_mode: AssetMode::from_dev_flag(dev),
            ..Self::default()
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
