//! Validation helpers.
//!
//! The `is_*` functions check configuration values and return a static message.
//! The `check_*` functions guard instrument setpoints against a channel's limits;
//! they run before a command is rendered, so an out-of-range value never reaches
//! the instrument.

use std::net::IpAddr;
use std::ops::RangeInclusive;

use crate::capability::ChannelSpec;
use crate::error::{Result, ScpiError};

/// Validates if a given u16 value is a valid port number.
/// This function checks that the port is not 0, which is reserved.
///
/// # Arguments
///
/// * `port` - The u16 value to validate.
///
/// # Returns
///
/// * `Ok(())` if the port is valid.
/// * `Err(&'static str)` if the port is invalid.
pub fn is_valid_port(port: u16) -> std::result::Result<(), &'static str> {
    if port > 0 {
        Ok(())
    } else {
        Err("Port number must be greater than 0")
    }
}

/// Validates if a given string is an IP address or a DNS host name.
///
/// # Arguments
///
/// * `host` - The string to validate.
///
/// # Returns
///
/// * `Ok(())` if the host is valid.
/// * `Err(&'static str)` if the host is invalid.
pub fn is_valid_host(host: &str) -> std::result::Result<(), &'static str> {
    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    if host.is_empty() || host.len() > 253 {
        return Err("Host name must be 1-253 characters");
    }
    let labels_ok = host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    // All-numeric dotted names are malformed IPs, not host names.
    let numeric = host.chars().all(|c| c.is_ascii_digit() || c == '.');
    if labels_ok && !numeric {
        Ok(())
    } else {
        Err("Invalid host name or IP address")
    }
}

/// Validates if a given value is within a specified numeric range.
///
/// # Arguments
///
/// * `value` - The value to validate.
/// * `range` - The inclusive range to validate against.
///
/// # Returns
///
/// * `Ok(())` if the value is within the range.
/// * `Err(&'static str)` if the value is outside the range.
pub fn is_in_range<T: PartialOrd>(
    value: T,
    range: RangeInclusive<T>,
) -> std::result::Result<(), &'static str> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err("Value is outside the specified range")
    }
}

/// Validates if a given string is not empty.
///
/// # Arguments
///
/// * `value` - The string to validate.
///
/// # Returns
///
/// * `Ok(())` if the string is not empty.
/// * `Err(&'static str)` if the string is empty.
pub fn is_not_empty(value: &str) -> std::result::Result<(), &'static str> {
    if !value.trim().is_empty() {
        Ok(())
    } else {
        Err("Value cannot be empty")
    }
}

fn invalid(message: String) -> ScpiError {
    ScpiError::InvalidParameter(message)
}

fn ensure_finite(quantity: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{quantity} must be a finite number, got {value}")))
    }
}

/// Frequency must be positive and no higher than the channel maximum.
pub fn check_frequency(spec: &ChannelSpec, frequency: f64) -> Result<()> {
    ensure_finite("Frequency", frequency)?;
    let max = spec.max_frequency.unwrap_or(f64::INFINITY);
    if frequency > 0.0 && frequency <= max {
        Ok(())
    } else {
        Err(invalid(format!(
            "Frequency {frequency}Hz outside (0, {max}]Hz for channel {}",
            spec.number
        )))
    }
}

/// Amplitude (Vpp) must lie within the channel's amplitude range.
pub fn check_amplitude(spec: &ChannelSpec, amplitude: f64) -> Result<()> {
    ensure_finite("Amplitude", amplitude)?;
    let min = spec.min_amplitude.unwrap_or(0.0);
    let max = spec.max_amplitude.unwrap_or(f64::INFINITY);
    is_in_range(amplitude, min..=max)
        .ok()
        .filter(|_| amplitude > 0.0)
        .ok_or_else(|| {
            invalid(format!(
                "Amplitude {amplitude}Vpp outside range [{min}, {max}]Vpp for channel {}",
                spec.number
            ))
        })
}

/// Offset magnitude must not exceed the channel maximum.
pub fn check_offset(spec: &ChannelSpec, offset: f64) -> Result<()> {
    ensure_finite("Offset", offset)?;
    match spec.max_offset {
        Some(max) if offset.abs() > max => Err(invalid(format!(
            "Offset {offset}V exceeds maximum {max}V for channel {}",
            spec.number
        ))),
        _ => Ok(()),
    }
}

/// Voltage setpoint must be within `[0, max_voltage]`.
pub fn check_voltage(spec: &ChannelSpec, voltage: f64) -> Result<()> {
    ensure_finite("Voltage", voltage)?;
    let max = spec.max_voltage.unwrap_or(f64::INFINITY);
    is_in_range(voltage, 0.0..=max).map_err(|_| {
        invalid(format!(
            "Voltage {voltage}V outside range [0, {max}]V for channel {}",
            spec.number
        ))
    })
}

/// Current limit must be within `[0, max_current]`.
pub fn check_current(spec: &ChannelSpec, current: f64) -> Result<()> {
    ensure_finite("Current", current)?;
    let max = spec.max_current.unwrap_or(f64::INFINITY);
    is_in_range(current, 0.0..=max).map_err(|_| {
        invalid(format!(
            "Current {current}A outside range [0, {max}]A for channel {}",
            spec.number
        ))
    })
}

/// Phase must be within `[0, 360]` degrees.
pub fn check_phase(phase: f64) -> Result<()> {
    is_in_range(phase, 0.0..=360.0)
        .map_err(|_| invalid(format!("Phase {phase} degrees must be between 0 and 360")))
}

/// Duty cycle must be within `[0, 100]` percent.
pub fn check_duty_cycle(percent: f64) -> Result<()> {
    is_in_range(percent, 0.0..=100.0)
        .map_err(|_| invalid(format!("Duty cycle {percent}% must be between 0 and 100")))
}
