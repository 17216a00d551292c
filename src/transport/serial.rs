//! RS-232 / USB-CDC transport via the `serialport` crate.

use std::time::Duration;

use serialport::SerialPort;

use super::stream::{link_lost, LineChannel};
use super::{ConnectionSettings, Transport};
use crate::error::{Result, ScpiError};

/// Serial transport for one instrument.
///
/// Uses 8N1 framing at the configured baud rate. The read timeout of the port is
/// the primary timeout from [`ConnectionSettings`].
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    settings: ConnectionSettings,
    channel: Option<LineChannel<Box<dyn SerialPort>>>,
}

impl SerialTransport {
    /// A closed transport for the port at `path`.
    pub fn new(path: impl Into<String>, baud_rate: u32, settings: ConnectionSettings) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            settings,
            channel: None,
        }
    }

    /// Configured baud rate.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn open_channel(
        &mut self,
        command: Option<&str>,
    ) -> Result<&mut LineChannel<Box<dyn SerialPort>>> {
        let endpoint = self.endpoint();
        self.channel
            .as_mut()
            .ok_or_else(|| ScpiError::not_connected(&endpoint, command))
    }

    fn release_on_loss<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(e) = &result {
            if link_lost(e) && self.channel.take().is_some() {
                tracing::warn!(endpoint = %self.path, error = %e, "Serial port lost");
            }
        }
        result
    }
}

impl Transport for SerialTransport {
    fn connect(&mut self) -> Result<()> {
        if self.channel.is_some() {
            return Ok(());
        }
        let endpoint = self.endpoint();
        tracing::debug!(endpoint = %endpoint, baud_rate = self.baud_rate, "Opening serial port");

        let port = serialport::new(&self.path, self.baud_rate)
            .timeout(self.settings.timeout)
            .open()
            .map_err(|e| {
                tracing::error!(endpoint = %endpoint, error = %e, "Failed to open serial port");
                ScpiError::Connection {
                    endpoint: endpoint.clone(),
                    command: None,
                    message: format!("failed to open serial port @ {} baud: {e}", self.baud_rate),
                }
            })?;

        tracing::info!(endpoint = %endpoint, "Serial port opened");
        self.channel = Some(LineChannel::new(
            port,
            endpoint,
            self.settings.timeout,
            self.settings.drain_timeout,
        ));
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.channel.take().is_some() {
            tracing::info!(endpoint = %self.path, "Serial port closed");
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
        self.path.clone()
    }

    fn settle_delay(&self) -> Duration {
        self.settings.settle_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_device_fails_to_connect() {
        let mut transport = SerialTransport::new(
            "/dev/does-not-exist-scpi",
            9600,
            ConnectionSettings::default(),
        );
        let err = transport.connect().unwrap_err();
        assert!(matches!(err, ScpiError::Connection { .. }));
        assert!(err.to_string().contains("/dev/does-not-exist-scpi"));
        assert!(!transport.is_connected());
    }

    #[test]
    fn write_requires_connection() {
        let mut transport = SerialTransport::new("COM9", 115200, ConnectionSettings::default());
        assert_eq!(transport.baud_rate(), 115200);
        assert!(transport.write("*RST").is_err());
    }
}
