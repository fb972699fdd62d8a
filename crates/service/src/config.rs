use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

#[derive(Debug)]
pub struct Config {
    /// address for the API server to listen on.
    ///  if not set then 0.0.0.0:8080 will be used
    pub listen_addr: Option<SocketAddr>,

    /// a path to the data directory (metadata database + blob payloads),
    ///  if not set the service runs fully ephemeral in memory
    pub data_dir: Option<PathBuf>,

    // misc
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080)),
            data_dir: None,
            log_level: tracing::Level::INFO,
        }
    }
}
