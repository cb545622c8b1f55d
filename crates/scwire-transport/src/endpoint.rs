use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::{Result, TransportError};
use crate::stream::ScStream;

/// Where the graph store listens.
///
/// Accepted forms:
/// - `tcp://host:port`
/// - `unix:///path/to/socket` (Unix only)
/// - `host:port` (TCP)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp(String),
    Unix(PathBuf),
}

impl Endpoint {
    /// Resolve and connect (blocking).
    pub fn connect(&self, timeout: Option<Duration>) -> Result<ScStream> {
        let stream = match self {
            Endpoint::Tcp(authority) => {
                let addrs: Vec<SocketAddr> = authority
                    .to_socket_addrs()
                    .map_err(|e| TransportError::Connect {
                        endpoint: authority.clone(),
                        source: e,
                    })?
                    .collect();
                ScStream::connect_tcp(&addrs, timeout)?
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => ScStream::connect_unix(path)?,
            #[cfg(not(unix))]
            Endpoint::Unix(path) => {
                return Err(TransportError::Connect {
                    endpoint: path.display().to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::Unsupported,
                        "unix domain sockets are not available on this platform",
                    ),
                });
            }
        };
        info!(endpoint = %self, "connected to graph store");
        Ok(stream)
    }
}

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(TransportError::InvalidEndpoint(s.to_string()));
            }
            return Ok(Endpoint::Unix(PathBuf::from(path)));
        }

        let authority = s.strip_prefix("tcp://").unwrap_or(s);
        match authority.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                Ok(Endpoint::Tcp(authority.to_string()))
            }
            _ => Err(TransportError::InvalidEndpoint(s.to_string())),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp(authority) => write!(f, "tcp://{authority}"),
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}
