//! Data-logger readings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One value returned by an immediate measurement or a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Measured value.
    pub value: f64,
    /// Scan channel, when known.
    pub channel: Option<u16>,
    /// Unit symbol, when known.
    pub unit: Option<String>,
    /// Host time at which the response carrying this reading arrived.
    pub timestamp: Option<DateTime<Utc>>,
    /// Alarm annotation reported with the reading, if any.
    pub alarm_state: Option<String>,
}

impl Reading {
    /// A bare value with no channel, unit or timestamp.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            channel: None,
            unit: None,
            timestamp: None,
            alarm_state: None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(unit) = &self.unit {
            write!(f, " {unit}")?;
        }
        if let Some(channel) = self.channel {
            write!(f, " (ch {channel})")?;
        }
        Ok(())
    }
}

/// Split a comma-separated reading response.
///
/// Fields may carry a unit suffix (`+2.5E+00 VDC`). Empty fields and fields that
/// do not start with a number are skipped.
pub fn parse_readings(response: &str) -> Vec<Reading> {
    response
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .filter_map(|field| {
            let parsed = parse_field(field);
            if parsed.is_none() {
                tracing::debug!(field = %field, "Could not parse reading value");
            }
            parsed
        })
        .collect()
}

fn parse_field(field: &str) -> Option<Reading> {
    if let Ok(value) = field.parse::<f64>() {
        return Some(Reading::new(value));
    }
    let (number, unit) = field.split_once(char::is_whitespace)?;
    let mut reading = Reading::new(number.parse().ok()?);
    let unit = unit.trim();
    if !unit.is_empty() {
        reading.unit = Some(unit.to_string());
    }
    Some(reading)
}

/// Fill in channel numbers (by position) and a default unit where the
/// instrument did not report them, and stamp every reading with `received_at`.
pub fn annotate(
    readings: &mut [Reading],
    channels: &[u16],
    unit: &str,
    received_at: DateTime<Utc>,
) {
    for (i, reading) in readings.iter_mut().enumerate() {
        if reading.channel.is_none() {
            reading.channel = channels.get(i).copied();
        }
        if reading.unit.is_none() && !unit.is_empty() {
            reading.unit = Some(unit.to_string());
        }
        reading.timestamp.get_or_insert(received_at);
    }
}
