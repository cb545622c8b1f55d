use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};

/// A connected duplex stream to the graph store, implementing Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
/// It wraps a TCP stream, or a Unix domain socket stream on Unix.
pub struct ScStream {
    inner: ScStreamInner,
}

enum ScStreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for ScStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            ScStreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            ScStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for ScStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            ScStreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            ScStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            ScStreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            ScStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl ScStream {
    /// Connect to a TCP endpoint (blocking).
    ///
    /// With `timeout` set, each resolved address is tried with that bound.
    pub fn connect_tcp(addrs: &[SocketAddr], timeout: Option<Duration>) -> Result<Self> {
        let mut last_err = None;
        for addr in addrs {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    // Frames are small and strictly request/response.
                    stream.set_nodelay(true)?;
                    debug!(%addr, "connected over tcp");
                    return Ok(Self::from_tcp(stream));
                }
                Err(err) => last_err = Some(err),
            }
        }

        let endpoint = addrs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Err(TransportError::Connect {
            endpoint,
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "no addresses to connect to")
            }),
        })
    }

    /// Connect to a listening Unix domain socket (blocking).
    #[cfg(unix)]
    pub fn connect_unix(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let stream =
            std::os::unix::net::UnixStream::connect(path).map_err(|e| TransportError::Connect {
                endpoint: path.display().to_string(),
                source: e,
            })?;
        debug!(?path, "connected to unix domain socket");
        Ok(Self::from_unix(stream))
    }

    /// Wrap an already-connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: ScStreamInner::Tcp(stream),
        }
    }

    /// Wrap an already-connected Unix domain socket stream.
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: ScStreamInner::Unix(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            ScStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            ScStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            ScStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            ScStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            ScStreamInner::Tcp(stream) => Ok(Self::from_tcp(stream.try_clone()?)),
            #[cfg(unix)]
            ScStreamInner::Unix(stream) => Ok(Self::from_unix(stream.try_clone()?)),
        }
    }

    /// Shut down both halves of the connection.
    ///
    /// Any thread blocked reading from a clone of this stream wakes up with EOF.
    pub fn shutdown(&self) -> Result<()> {
        let res = match &self.inner {
            ScStreamInner::Tcp(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(unix)]
            ScStreamInner::Unix(stream) => stream.shutdown(Shutdown::Both),
        };
        match res {
            Ok(()) => Ok(()),
            // Already closed by the peer.
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            ScStreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            ScStreamInner::Unix(_) => "unix-domain-socket",
        }
    }
}

impl std::fmt::Debug for ScStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScStream")
            .field("type", &self.transport_name())
            .finish()
    }
}
