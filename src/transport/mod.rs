//! Blocking SCPI transports.
//!
//! A [`Transport`] carries ASCII commands to one instrument and returns text or
//! binary responses. Every call blocks until it completes or the configured timeout
//! expires. Commands on one transport are strictly ordered; the `&mut self`
//! receivers make that the caller's problem rather than a runtime check.
//!
//! Implementations:
//! - [`TcpTransport`]: raw SCPI socket (port 5024/5025),
//! - `SerialTransport`: RS-232/USB-CDC via `serialport` (feature `instrument_serial`),
//! - [`MockTransport`]: deterministic in-memory double for tests and demos.
//!
//! [`open_transport`] turns a resource string into the right transport.

pub mod mock;
#[cfg(feature = "instrument_serial")]
pub mod serial;
mod stream;
pub mod tcp;

use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;
use std::time::Duration;

use crate::error::{Result, ScpiError};

pub use mock::{MockHandle, MockTransport};
#[cfg(feature = "instrument_serial")]
pub use serial::SerialTransport;
pub use tcp::TcpTransport;

/// Default primary I/O timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default pause between writing a query and reading its response.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);
/// Default idle gap that ends an unsized `read_raw`.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);
/// Raw-socket port used by scopes, generators and supplies.
pub const DEFAULT_SCPI_PORT: u16 = 5024;

/// Line terminator appended to every command.
pub const TERMINATOR: char = '\n';

/// Endpoint and timing for one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Host name or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Connect, write and read timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Pause between the write and read halves of a query
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    /// Idle gap that ends an unsized raw read
    #[serde(with = "humantime_serde")]
    pub drain_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_SCPI_PORT,
            timeout: DEFAULT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

impl ConnectionSettings {
    /// Settings for `host:port` with default timing.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the primary timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the query settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the raw-read drain timeout.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// `host:port`, as embedded in error messages.
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Request/response channel to one instrument.
pub trait Transport: Send {
    /// Open the connection. A no-op when already connected.
    fn connect(&mut self) -> Result<()>;

    /// Close the connection. Idempotent; never fails.
    fn disconnect(&mut self);

    /// Whether the transport is currently connected. Becomes false after a
    /// connection-level failure; timeouts leave it connected.
    fn is_connected(&self) -> bool;

    /// Send `command`, appending the terminator if absent.
    fn write(&mut self, command: &str) -> Result<()>;

    /// Read one response line with surrounding whitespace and leading NULs removed.
    fn read(&mut self) -> Result<String>;

    /// Read exactly `size` bytes, or everything until the line goes quiet.
    fn read_raw(&mut self, size: Option<usize>) -> Result<Vec<u8>>;

    /// `host:port` or device path, for logs and errors.
    fn endpoint(&self) -> String;

    /// Pause between the write and read halves of [`Transport::query`].
    fn settle_delay(&self) -> Duration {
        DEFAULT_SETTLE_DELAY
    }

    /// Write `command`, wait the settle delay, read the response.
    fn query(&mut self, command: &str) -> Result<String> {
        self.write(command)?;
        let delay = self.settle_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.read()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn write(&mut self, command: &str) -> Result<()> {
        (**self).write(command)
    }

    fn read(&mut self) -> Result<String> {
        (**self).read()
    }

    fn read_raw(&mut self, size: Option<usize>) -> Result<Vec<u8>> {
        (**self).read_raw(size)
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }

    fn settle_delay(&self) -> Duration {
        (**self).settle_delay()
    }

    fn query(&mut self, command: &str) -> Result<String> {
        (**self).query(command)
    }
}

/// Append the terminator unless the command already ends with it.
pub fn terminate(command: &str) -> String {
    if command.ends_with(TERMINATOR) {
        command.to_string()
    } else {
        format!("{command}{TERMINATOR}")
    }
}

/// Strip surrounding whitespace and any leading NUL padding.
pub fn clean_response(raw: &str) -> String {
    raw.trim_start_matches(|c: char| c == '\0' || c.is_whitespace())
        .trim_end()
        .to_string()
}

/// Where an instrument lives, parsed from a resource string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Raw TCP socket
    Tcp {
        /// Host name or address
        host: String,
        /// Port
        port: u16,
    },
    /// Serial device
    Serial {
        /// Device path (`/dev/ttyUSB0`, `COM3`)
        path: String,
        /// Baud rate
        baud_rate: u32,
    },
    /// In-memory double
    Mock,
}

/// Baud rate used when a serial resource does not name one.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

impl Resource {
    /// Parse a resource string.
    ///
    /// Accepted forms:
    /// - `TCPIP[n]::<host>::<port>::SOCKET` (VISA raw socket)
    /// - `tcp://<host>[:<port>]`, `<host>:<port>`, `<host>`, with IPv6 hosts in
    ///   brackets (`tcp://[::1]:5024`)
    /// - `ASRL<path>::INSTR`, `serial://<path>[?baud=<n>]`
    /// - `mock://`
    ///
    /// `default_port` fills in a missing TCP port.
    pub fn parse(resource: &str, default_port: u16) -> Result<Self> {
        let resource = resource.trim();
        let invalid = |why: &str| ScpiError::Configuration(format!("{why}: '{resource}'"));

        if resource.is_empty() {
            return Err(invalid("empty resource string"));
        }
        if resource.eq_ignore_ascii_case("mock") || resource.to_ascii_lowercase().starts_with("mock://") {
            return Ok(Resource::Mock);
        }

        let upper = resource.to_ascii_uppercase();
        if upper.starts_with("TCPIP") {
            let parts: Vec<&str> = resource.split("::").collect();
            return match parts.as_slice() {
                [_, host, port, kind] if kind.eq_ignore_ascii_case("SOCKET") => Ok(Resource::Tcp {
                    host: host.to_string(),
                    port: port.parse().map_err(|_| invalid("invalid port"))?,
                }),
                _ => Err(invalid("only TCPIP raw SOCKET resources are supported")),
            };
        }
        if let Some(rest) = upper.strip_prefix("ASRL") {
            let path = rest.strip_suffix("::INSTR").unwrap_or(rest);
            // Preserve the original case of the device path.
            let path = &resource[4..4 + path.len()];
            if path.is_empty() {
                return Err(invalid("missing serial device"));
            }
            return Ok(Resource::Serial {
                path: path.to_string(),
                baud_rate: DEFAULT_BAUD_RATE,
            });
        }
        if let Some(rest) = strip_scheme(resource, "serial://") {
            let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
            if path.is_empty() {
                return Err(invalid("missing serial device"));
            }
            let mut baud_rate = DEFAULT_BAUD_RATE;
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some(("baud", value)) => {
                        baud_rate = value.parse().map_err(|_| invalid("invalid baud rate"))?;
                    }
                    _ => return Err(invalid("unknown serial option")),
                }
            }
            return Ok(Resource::Serial {
                path: path.to_string(),
                baud_rate,
            });
        }
        if let Some(address) = strip_scheme(resource, "tcp://") {
            return tcp_address(address, default_port).map_err(invalid);
        }
        if upper.contains("::") && !resource.starts_with('[') {
            return Err(invalid("unsupported VISA resource"));
        }
        tcp_address(resource, default_port).map_err(invalid)
    }
}

/// `host`, `host:port`, `[v6]`, `[v6]:port` or a bare IPv6 address.
fn tcp_address(address: &str, default_port: u16) -> std::result::Result<Resource, &'static str> {
    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or("unterminated IPv6 address")?;
        if tail.is_empty() {
            (host, None)
        } else {
            (host, Some(tail.strip_prefix(':').ok_or("invalid port")?))
        }
    } else if address.parse::<Ipv6Addr>().is_ok() {
        (address, None)
    } else {
        match address.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (address, None),
        }
    };
    if host.is_empty() {
        return Err("missing host");
    }
    let port = match port {
        Some(port) => port.parse().map_err(|_| "invalid port")?,
        None => default_port,
    };
    Ok(Resource::Tcp {
        host: host.to_string(),
        port,
    })
}

fn strip_scheme<'a>(resource: &'a str, scheme: &str) -> Option<&'a str> {
    let head = resource.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme)
        .then(|| &resource[scheme.len()..])
}

/// Open a boxed transport for `resource`. `settings` supplies timing; its host and
/// port are replaced by the resource's.
pub fn open_transport(resource: &str, settings: &ConnectionSettings) -> Result<Box<dyn Transport>> {
    match Resource::parse(resource, settings.port)? {
        Resource::Tcp { host, port } => Ok(Box::new(TcpTransport::new(ConnectionSettings {
            host,
            port,
            ..settings.clone()
        }))),
        Resource::Mock => Ok(Box::new(MockTransport::new())),
        #[cfg(feature = "instrument_serial")]
        Resource::Serial { path, baud_rate } => Ok(Box::new(SerialTransport::new(
            path,
            baud_rate,
            settings.clone(),
        ))),
        #[cfg(not(feature = "instrument_serial"))]
        Resource::Serial { .. } => Err(ScpiError::FeatureNotEnabled(
            "instrument_serial".to_string(),
        )),
    }
}
