//! Raw SCPI socket transport.
//!
//! Siglent scopes, generators and supplies listen on port 5024; the Keysight
//! 34970A/DAQ970A family on 5025. Both speak newline-terminated ASCII, with binary
//! waveform blocks arriving unterminated.
//!
//! # Example
//!
//! ```no_run
//! use scpi_control::transport::{ConnectionSettings, TcpTransport, Transport};
//!
//! # fn example() -> scpi_control::Result<()> {
//! let mut scope = TcpTransport::new(ConnectionSettings::new("192.168.1.100", 5024));
//! scope.connect()?;
//! let idn = scope.query("*IDN?")?;
//! # Ok(())
//! # }
//! ```

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::stream::{is_timeout, link_lost, LineChannel};
use super::{ConnectionSettings, Transport};
use crate::error::{Result, ScpiError};

/// TCP transport for one instrument.
pub struct TcpTransport {
    settings: ConnectionSettings,
    channel: Option<LineChannel<TcpStream>>,
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("endpoint", &self.settings.endpoint())
            .field("connected", &self.channel.is_some())
            .finish()
    }
}

impl TcpTransport {
    /// A disconnected transport for `settings`.
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            channel: None,
        }
    }

    /// Wrap a stream that was connected elsewhere, such as one accepted from a
    /// listener in tests.
    pub fn from_stream(stream: TcpStream, settings: ConnectionSettings) -> Result<Self> {
        let endpoint = settings.endpoint();
        configure(&stream, &settings).map_err(|e| ScpiError::Connection {
            endpoint: endpoint.clone(),
            command: None,
            message: e.to_string(),
        })?;
        Ok(Self {
            channel: Some(LineChannel::new(
                stream,
                endpoint,
                settings.timeout,
                settings.drain_timeout,
            )),
            settings,
        })
    }

    /// Connection settings in use.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    fn open_channel(&mut self, command: Option<&str>) -> Result<&mut LineChannel<TcpStream>> {
        let endpoint = self.settings.endpoint();
        self.channel
            .as_mut()
            .ok_or_else(|| ScpiError::not_connected(&endpoint, command))
    }

    fn release_on_loss<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(e) = &result {
            if link_lost(e) && self.channel.take().is_some() {
                tracing::warn!(endpoint = %self.settings.endpoint(), error = %e, "TCP connection lost");
            }
        }
        result
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>> {
        let endpoint = self.settings.endpoint();
        let addrs: Vec<SocketAddr> = (self.settings.host.as_str(), self.settings.port)
            .to_socket_addrs()
            .map_err(|e| ScpiError::Connection {
                endpoint: endpoint.clone(),
                command: None,
                message: format!("could not resolve host: {e}"),
            })?
            .collect();
        if addrs.is_empty() {
            return Err(ScpiError::Connection {
                endpoint,
                command: None,
                message: "host resolved to no addresses".to_string(),
            });
        }
        Ok(addrs)
    }
}

fn configure(stream: &TcpStream, settings: &ConnectionSettings) -> std::io::Result<()> {
    if let Err(e) = stream.set_nodelay(true) {
        tracing::warn!(
            endpoint = %settings.endpoint(),
            error = %e,
            "Failed to set TCP_NODELAY (continuing anyway)"
        );
    }
    stream.set_read_timeout(Some(settings.timeout))?;
    stream.set_write_timeout(Some(settings.timeout))?;
    Ok(())
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> Result<()> {
        if self.channel.is_some() {
            return Ok(());
        }
        let endpoint = self.settings.endpoint();
        let timeout = self.settings.timeout;
        tracing::debug!(
            endpoint = %endpoint,
            timeout_ms = timeout.as_millis(),
            "Connecting to TCP endpoint"
        );

        let mut last_error = None;
        let mut connected = None;
        for addr in self.resolve()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    connected = Some(stream);
                    break;
                }
                Err(e) => last_error = Some(e),
            }
        }

        let stream = match (connected, last_error) {
            (Some(stream), _) => stream,
            (None, Some(e)) if is_timeout(&e) => {
                tracing::error!(endpoint = %endpoint, "TCP connection timed out");
                return Err(ScpiError::Timeout {
                    endpoint,
                    command: None,
                    timeout,
                });
            }
            (None, e) => {
                let message = e.map_or_else(|| "connection failed".to_string(), |e| e.to_string());
                tracing::error!(endpoint = %endpoint, error = %message, "TCP connection failed");
                return Err(ScpiError::Connection {
                    endpoint,
                    command: None,
                    message,
                });
            }
        };

        configure(&stream, &self.settings).map_err(|e| ScpiError::Connection {
            endpoint: endpoint.clone(),
            command: None,
            message: e.to_string(),
        })?;
        tracing::info!(endpoint = %endpoint, "TCP connection established");
        self.channel = Some(LineChannel::new(
            stream,
            endpoint,
            timeout,
            self.settings.drain_timeout,
        ));
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.channel.take().is_some() {
            tracing::info!(endpoint = %self.settings.endpoint(), "TCP connection closed");
        }
    }

    fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    fn write(&mut self, command: &str) -> Result<()> {
        let result = self
            .open_channel(Some(command))
            .and_then(|channel| channel.write_command(command));
        self.release_on_loss(result)
    }

    fn read(&mut self) -> Result<String> {
        let result = self.open_channel(None).and_then(|channel| channel.read_line());
        self.release_on_loss(result)
    }

    fn read_raw(&mut self, size: Option<usize>) -> Result<Vec<u8>> {
        let result = self.open_channel(None).and_then(|channel| match size {
            Some(n) => channel.read_exact(n),
            None => channel.drain(),
        });
        self.release_on_loss(result)
    }

    fn endpoint(&self) -> String {
        self.settings.endpoint()
    }

    fn settle_delay(&self) -> Duration {
        self.settings.settle_delay
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}
