use scwire_transport::Endpoint;
use tracing::debug;

use crate::client::ScClient;
use crate::config::ClientConfig;
use crate::connection::StreamConnection;
use crate::error::{ClientError, Result};

/// Connect to `endpoint` with default configuration.
///
/// ```no_run
/// let client = scwire_client::connect("tcp://127.0.0.1:55770")?;
/// let found = client.find_element_by_system_identifier("nrel_main_idtf")?.wait()?;
/// println!("{}", found.identifier());
/// # Ok::<(), scwire_client::ClientError>(())
/// ```
pub fn connect(endpoint: &str) -> Result<ScClient> {
    connect_with_config(endpoint, &ClientConfig::default())
}

/// Connect to `endpoint` (`tcp://host:port`, `host:port` or `unix:///path`).
pub fn connect_with_config(endpoint: &str, config: &ClientConfig) -> Result<ScClient> {
    let endpoint: Endpoint = endpoint.parse()?;
    let stream = endpoint.connect(config.connect_timeout)?;
    debug!(transport = stream.transport_name(), "building client");

    let closer = stream.try_clone()?;
    let conn = StreamConnection::new(stream, config.frame.clone()).map_err(ClientError::Frame)?;
    Ok(ScClient::from_connection(conn, config)?.with_closer(closer))
}
