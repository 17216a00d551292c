//! Data-logger measurements, scan lists, alarms and scaling.

use chrono::Utc;
use tracing::debug;

use super::Instrument;
use crate::capability::{Features, MeasurementFunction};
use crate::catalog::{format_channel_list, ChannelList, Params};
use crate::error::{Result, ScpiError};
use crate::params;
use crate::reading::{annotate, parse_readings, Reading};
use crate::transport::Transport;

/// Thermocouple type used when temperature is measured without further setup.
pub const DEFAULT_SENSOR_TYPE: &str = "TC,K";
const AUTO_RANGE: &str = "AUTO";
const DEFAULT_RESOLUTION: &str = "DEF";

fn function_params(function: MeasurementFunction, channels: &str) -> Params {
    match function {
        MeasurementFunction::Temperature => params! {
            "sensor_type" => DEFAULT_SENSOR_TYPE,
            "channels" => channels,
        },
        _ => params! {
            "range" => AUTO_RANGE,
            "resolution" => DEFAULT_RESOLUTION,
            "channels" => channels,
        },
    }
}

fn operation_for(prefix: &str, function: MeasurementFunction) -> Result<String> {
    function
        .operation_suffix()
        .map(|suffix| format!("{prefix}_{suffix}"))
        .ok_or_else(|| {
            ScpiError::InvalidParameter(format!(
                "{} has no {prefix} operation",
                function.mnemonic()
            ))
        })
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}

impl<T: Transport> Instrument<T> {
    fn require_feature(&self, feature: &str, present: impl Fn(&Features) -> bool) -> Result<()> {
        let profile = self.profile_or_err()?;
        if present(&profile.features) {
            Ok(())
        } else {
            Err(ScpiError::InvalidParameter(format!(
                "{} does not support {feature}",
                profile.model_name
            )))
        }
    }

    /// One immediate measurement of `function` on `channels`.
    ///
    /// Readings are paired with the requested channel numbers in order and carry
    /// the function's default unit unless the instrument reported one.
    pub fn measure(
        &mut self,
        function: MeasurementFunction,
        channels: impl Into<ChannelList>,
    ) -> Result<Vec<Reading>> {
        let channels = channels.into();
        let operation = operation_for("measure", function)?;
        let params = function_params(function, &format_channel_list(channels.clone()));
        let response = self.query_operation(&operation, &params)?;
        let received_at = Utc::now();

        let mut readings = parse_readings(&response);
        annotate(
            &mut readings,
            &channels.numbers(),
            function.default_unit(),
            received_at,
        );
        debug!(function = function.mnemonic(), count = readings.len(), "Measured");
        Ok(readings)
    }

    /// Configure `channels` for `function` without triggering.
    pub fn configure(
        &mut self,
        function: MeasurementFunction,
        channels: impl Into<ChannelList>,
    ) -> Result<()> {
        let operation = operation_for("configure", function)?;
        let params = function_params(function, &format_channel_list(channels));
        self.execute(&operation, &params)
    }

    /// Replace the scan list.
    pub fn set_scan_list(&mut self, channels: impl Into<ChannelList>) -> Result<()> {
        self.execute(
            "set_scan_list",
            &params! { "channels" => format_channel_list(channels) },
        )
    }

    /// Start the configured scan.
    pub fn initiate(&mut self) -> Result<()> {
        self.execute("initiate", &Params::new())
    }

    /// Abort a running scan.
    pub fn abort(&mut self) -> Result<()> {
        self.execute("abort", &Params::new())
    }

    /// Trigger a scan and wait for its readings (`READ?`).
    pub fn read_scan(&mut self) -> Result<Vec<Reading>> {
        self.readings_from("read")
    }

    /// Readings of the last completed scan (`FETC?`).
    pub fn fetch(&mut self) -> Result<Vec<Reading>> {
        self.readings_from("fetch")
    }

    fn readings_from(&mut self, operation: &str) -> Result<Vec<Reading>> {
        let response = self.query_operation(operation, &Params::new())?;
        let received_at = Utc::now();
        let mut readings = parse_readings(&response);
        annotate(&mut readings, &[], "", received_at);
        Ok(readings)
    }

    /// Alarm limits for `channels`; `None` leaves a limit unchanged. Enables
    /// alarms on the channels when any limit is given.
    pub fn set_alarm_limits(
        &mut self,
        channels: impl Into<ChannelList>,
        high: Option<f64>,
        low: Option<f64>,
    ) -> Result<()> {
        self.require_feature("alarms", |f| f.has_alarm)?;
        let channels = format_channel_list(channels);
        if let Some(limit) = high {
            self.execute(
                "set_alarm_high",
                &params! { "limit" => limit, "channels" => channels },
            )?;
        }
        if let Some(limit) = low {
            self.execute(
                "set_alarm_low",
                &params! { "limit" => limit, "channels" => channels },
            )?;
        }
        if high.is_some() || low.is_some() {
            self.execute(
                "set_alarm_enable",
                &params! { "state" => "ON", "channels" => channels },
            )?;
        }
        Ok(())
    }

    /// `mx+b` scaling for `channels`.
    pub fn set_scaling(
        &mut self,
        channels: impl Into<ChannelList>,
        gain: f64,
        offset: f64,
        enable: bool,
    ) -> Result<()> {
        self.require_feature("scaling", |f| f.has_math)?;
        let channels = format_channel_list(channels);
        self.execute(
            "set_scaling_gain",
            &params! { "gain" => gain, "channels" => channels },
        )?;
        self.execute(
            "set_scaling_offset",
            &params! { "offset" => offset, "channels" => channels },
        )?;
        self.execute(
            "set_scaling_enable",
            &params! { "state" => on_off(enable), "channels" => channels },
        )
    }
}
