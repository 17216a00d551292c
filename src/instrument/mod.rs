//! Instrument facade.
//!
//! [`Instrument`] composes one transport with the capability profile detected from
//! `*IDN?` and the command catalog for that profile's dialect:
//!
//! ```text
//! connect() -> Transport::connect -> query("*IDN?") -> detect -> CommandCatalog
//! op(params) -> CommandCatalog::resolve -> Transport::write/query [-> decode]
//! ```
//!
//! The facade owns its transport exclusively; commands are issued strictly in
//! call order. Errors from the transport, catalog and codec surface unchanged.
//!
//! # Example
//!
//! ```
//! use scpi_control::capability::DeviceFamily;
//! use scpi_control::instrument::Instrument;
//! use scpi_control::transport::MockTransport;
//! use scpi_control::waveform::SampleWidth;
//!
//! let mut scope = Instrument::new(MockTransport::new(), DeviceFamily::Oscilloscope);
//! scope.connect().unwrap();
//! let block = scope.acquire_waveform(1, SampleWidth::Byte).unwrap();
//! assert_eq!(block.voltages, vec![0.0, 1.0, 2.0, 3.0]);
//! ```

mod channel;
mod logger;
mod output;
mod scope;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info, warn};

use crate::capability::{self, CapabilityProfile, DeviceFamily, IdnInfo};
use crate::catalog::{CommandCatalog, Params};
use crate::error::{Result, ScpiError};
use crate::transport::Transport;

pub use channel::OutputChannel;
pub use scope::WaveformPreamble;

const IDN_QUERY: &str = "*IDN?";

static ERROR_RESPONSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([-+]?\d+)\s*,\s*"?([^"]*)"?\s*$"#).expect("Invalid error response regex")
});

/// State that exists only while connected.
#[derive(Debug)]
struct Session {
    idn: String,
    profile: CapabilityProfile,
    catalog: CommandCatalog,
    channels: Vec<OutputChannel>,
}

/// One connected instrument.
pub struct Instrument<T: Transport> {
    transport: T,
    family: DeviceFamily,
    session: Option<Session>,
}

impl<T: Transport> Instrument<T> {
    /// Facade over `transport` for an instrument of `family`. Nothing is sent
    /// until [`Instrument::connect`].
    pub fn new(transport: T, family: DeviceFamily) -> Self {
        Self {
            transport,
            family,
            session: None,
        }
    }

    /// Connect, identify, and load the matching profile and catalog.
    ///
    /// If the instrument cannot be identified the transport is closed again and a
    /// connection error naming `*IDN?` is returned. Connecting twice is a no-op.
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        let endpoint = self.transport.endpoint();
        info!(endpoint = %endpoint, family = %self.family, "Connecting to instrument");
        self.transport.connect()?;

        let idn = match self.transport.query(IDN_QUERY) {
            Ok(idn) if !idn.trim().is_empty() => idn,
            outcome => {
                let reason = match outcome {
                    Err(e) => e.to_string(),
                    Ok(_) => "empty identification response".to_string(),
                };
                error!(endpoint = %endpoint, error = %reason, "Failed to identify device");
                self.transport.disconnect();
                return Err(ScpiError::Connection {
                    endpoint,
                    command: Some(IDN_QUERY.to_string()),
                    message: format!("connected but failed to identify device: {reason}"),
                });
            }
        };

        let profile = capability::detect(self.family, &idn);
        let catalog = CommandCatalog::for_profile(&profile);
        let channels = profile
            .channels
            .iter()
            .cloned()
            .map(OutputChannel::new)
            .collect();
        info!(
            endpoint = %endpoint,
            model = %profile.model_name,
            variant = %profile.variant,
            "Connected to instrument"
        );
        self.session = Some(Session {
            idn,
            profile,
            catalog,
            channels,
        });
        Ok(())
    }

    /// Close the connection and forget the profile. Never fails.
    pub fn disconnect(&mut self) {
        if self.session.take().is_some() {
            info!(endpoint = %self.transport.endpoint(), "Disconnecting from instrument");
        }
        self.transport.disconnect();
    }

    /// Whether the transport is open and the instrument identified.
    pub fn is_connected(&self) -> bool {
        self.session.is_some() && self.transport.is_connected()
    }

    /// Device family this facade was created for.
    pub fn family(&self) -> DeviceFamily {
        self.family
    }

    /// Detected profile, while connected.
    pub fn profile(&self) -> Option<&CapabilityProfile> {
        self.session.as_ref().map(|s| &s.profile)
    }

    /// Raw `*IDN?` response, while connected.
    pub fn idn(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.idn.as_str())
    }

    /// Parsed `*IDN?` fields, while connected.
    pub fn device_info(&self) -> Option<IdnInfo> {
        self.idn().and_then(IdnInfo::parse)
    }

    /// Catalog for the detected dialect, while connected.
    pub fn catalog(&self) -> Option<CommandCatalog> {
        self.session.as_ref().map(|s| s.catalog)
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Output or input channels, in profile order.
    pub fn channels(&self) -> &[OutputChannel] {
        self.session
            .as_ref()
            .map_or(&[][..], |s| s.channels.as_slice())
    }

    /// Channel `number`, validated against the profile.
    pub fn channel(&self, number: u16) -> Result<&OutputChannel> {
        let session = self.session()?;
        session
            .channels
            .iter()
            .find(|c| c.number() == number)
            .ok_or_else(|| {
                let valid: Vec<u16> = session.channels.iter().map(|c| c.number()).collect();
                ScpiError::InvalidParameter(format!(
                    "Invalid channel number: {number}. Must be one of {valid:?}"
                ))
            })
    }

    /// Resolve `operation` and send it without reading a response.
    pub fn execute(&mut self, operation: &str, params: &Params) -> Result<()> {
        let command = self.session()?.catalog.resolve(operation, params)?;
        self.transport.write(&command)
    }

    /// Resolve `operation`, send it and return the response line.
    pub fn query_operation(&mut self, operation: &str, params: &Params) -> Result<String> {
        let command = self.session()?.catalog.resolve(operation, params)?;
        self.transport.query(&command)
    }

    /// Send a literal command.
    pub fn write(&mut self, command: &str) -> Result<()> {
        self.session()?;
        self.transport.write(command)
    }

    /// Send a literal query and return the response line.
    pub fn query(&mut self, command: &str) -> Result<String> {
        self.session()?;
        self.transport.query(command)
    }

    /// Pop the instrument's error queue once; a nonzero code becomes
    /// [`ScpiError::Device`].
    pub fn check_device_error(&mut self) -> Result<()> {
        let response = self.query_operation("get_error", &Params::new())?;
        let (code, message) = parse_error_response(&response)?;
        if code == 0 {
            Ok(())
        } else {
            warn!(endpoint = %self.transport.endpoint(), code, message = %message, "Instrument reported error");
            Err(ScpiError::Device { code, message })
        }
    }

    fn session(&self) -> Result<&Session> {
        match &self.session {
            Some(session) if self.transport.is_connected() => Ok(session),
            _ => Err(ScpiError::not_connected(&self.transport.endpoint(), None)),
        }
    }

    fn profile_or_err(&self) -> Result<&CapabilityProfile> {
        Ok(&self.session()?.profile)
    }
}

impl<T: Transport> Drop for Instrument<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<T: Transport> std::fmt::Debug for Instrument<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrument")
            .field("endpoint", &self.transport.endpoint())
            .field("family", &self.family)
            .field("profile", &self.profile().map(|p| p.to_string()))
            .finish()
    }
}

/// Parse a `SYST:ERR?` response such as `-113,"Undefined header"`.
pub fn parse_error_response(response: &str) -> Result<(i32, String)> {
    let caps = ERROR_RESPONSE
        .captures(response)
        .ok_or_else(|| ScpiError::Response {
            quantity: "error queue entry",
            response: response.to_string(),
        })?;
    let code = caps[1].parse().map_err(|_| ScpiError::Response {
        quantity: "error code",
        response: response.to_string(),
    })?;
    Ok((code, caps[2].trim().to_string()))
}

/// First numeric token of a plain response (`5.000`, `+1.2E-03 V`).
pub(crate) fn parse_number(response: &str, quantity: &'static str) -> Result<f64> {
    response
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| ScpiError::Response {
            quantity,
            response: response.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Variant;
    use crate::error::ErrorKind;
    use crate::params;
    use crate::transport::MockTransport;

    fn scope() -> Instrument<MockTransport> {
        let mut scope = Instrument::new(MockTransport::new(), DeviceFamily::Oscilloscope);
        scope.connect().unwrap();
        scope
    }

    #[test]
    fn connect_detects_profile_and_channels() {
        let scope = scope();
        assert!(scope.is_connected());
        let profile = scope.profile().unwrap();
        assert_eq!(profile.model_name, "SDS1104X-E");
        assert_eq!(profile.variant, Variant::SiglentSds);
        assert_eq!(scope.channels().len(), 4);
        assert_eq!(scope.device_info().unwrap().serial, "MOCK0001");
        assert_eq!(scope.catalog().unwrap().variant(), Variant::SiglentSds);
    }

    #[test]
    fn operations_require_connection() {
        let mut scope = Instrument::new(MockTransport::new(), DeviceFamily::Oscilloscope);
        let err = scope.execute("stop", &Params::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(scope.profile().is_none());
        assert!(scope.channels().is_empty());
    }

    #[test]
    fn identification_failure_disconnects() {
        let mock = MockTransport::new().with_response("*IDN?", "");
        let mut scope = Instrument::new(mock, DeviceFamily::Oscilloscope);
        let err = scope.connect().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err.to_string().contains("*IDN?"));
        assert!(!scope.transport().is_connected());
    }

    #[test]
    fn execute_resolves_through_dialect() {
        let mut scope = scope();
        let handle = scope.transport().handle();
        scope
            .execute("set_voltage_scale", &params! { "ch" => 1, "scale" => 0.5 })
            .unwrap();
        assert_eq!(handle.writes().last().unwrap(), "C1:VDIV 0.5");
        assert_eq!(handle.voltage_scale(1), Some(0.5));
    }

    #[test]
    fn invalid_channel_is_rejected() {
        let scope = scope();
        let err = scope.channel(5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(err.to_string().contains("[1, 2, 3, 4]"));
    }

    #[test]
    fn device_errors_surface_with_code() {
        let mut scope = scope();
        assert!(scope.check_device_error().is_ok());
        scope.transport().handle().push_device_error(-222, "Data out of range");
        match scope.check_device_error() {
            Err(ScpiError::Device { code, message }) => {
                assert_eq!(code, -222);
                assert_eq!(message, "Data out of range");
            }
            other => panic!("expected device error, got {other:?}"),
        }
    }

    #[test]
    fn error_response_parsing() {
        assert_eq!(
            parse_error_response("+0,\"No error\"").unwrap(),
            (0, "No error".to_string())
        );
        assert_eq!(
            parse_error_response("-113, Undefined header").unwrap(),
            (-113, "Undefined header".to_string())
        );
        assert!(parse_error_response("garbage").is_err());
    }

    #[test]
    fn disconnect_clears_session() {
        let mut scope = scope();
        scope.disconnect();
        scope.disconnect();
        assert!(!scope.is_connected());
        assert!(scope.idn().is_none());
    }
}
