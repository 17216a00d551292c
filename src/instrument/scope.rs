//! Oscilloscope acquisition.

use serde::Serialize;
use tracing::{debug, info};

use super::Instrument;
use crate::catalog::Params;
use crate::error::Result;
use crate::params;
use crate::transport::Transport;
use crate::waveform::{self, SampleWidth, WaveformBlock};

/// Acquisition settings needed to scale one channel's samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveformPreamble {
    /// Source channel.
    pub channel: u16,
    /// Volts per division
    pub voltage_scale: f64,
    /// Volts
    pub voltage_offset: f64,
    /// Seconds per division
    pub timebase: f64,
    /// Samples per second
    pub sample_rate: f64,
}

impl<T: Transport> Instrument<T> {
    /// Vertical scale of `channel` in volts per division.
    pub fn voltage_scale(&mut self, channel: u16) -> Result<f64> {
        self.channel(channel)?;
        let response = self.query_operation("get_voltage_scale", &params! { "ch" => channel })?;
        waveform::parse_voltage_scale(&response)
    }

    /// Vertical offset of `channel` in volts.
    pub fn voltage_offset(&mut self, channel: u16) -> Result<f64> {
        self.channel(channel)?;
        let response = self.query_operation("get_voltage_offset", &params! { "ch" => channel })?;
        waveform::parse_voltage_offset(&response)
    }

    /// Horizontal scale in seconds per division.
    pub fn timebase(&mut self) -> Result<f64> {
        let response = self.query_operation("get_timebase", &Params::new())?;
        waveform::parse_timebase(&response)
    }

    /// Current sample rate in samples per second.
    pub fn sample_rate(&mut self) -> Result<f64> {
        let response = self.query_operation("get_sample_rate", &Params::new())?;
        waveform::parse_sample_rate(&response)
    }

    /// Set the vertical scale of `channel`.
    pub fn set_voltage_scale(&mut self, channel: u16, volts_per_div: f64) -> Result<()> {
        self.channel(channel)?;
        self.execute(
            "set_voltage_scale",
            &params! { "ch" => channel, "scale" => volts_per_div },
        )
    }

    /// Set the horizontal scale.
    pub fn set_timebase(&mut self, seconds_per_div: f64) -> Result<()> {
        self.execute("set_timebase", &params! { "timebase" => seconds_per_div })
    }

    /// Query everything [`waveform::decode`] needs for `channel`.
    pub fn waveform_preamble(&mut self, channel: u16) -> Result<WaveformPreamble> {
        Ok(WaveformPreamble {
            channel,
            voltage_scale: self.voltage_scale(channel)?,
            voltage_offset: self.voltage_offset(channel)?,
            timebase: self.timebase()?,
            sample_rate: self.sample_rate()?,
        })
    }

    /// Fetch and decode the current record of `channel`.
    ///
    /// The preamble is read first, then the waveform query is written and the
    /// binary block drained from the transport.
    pub fn acquire_waveform(&mut self, channel: u16, width: SampleWidth) -> Result<WaveformBlock> {
        let preamble = self.waveform_preamble(channel)?;
        debug!(?preamble, "Read waveform preamble");

        self.execute("get_waveform", &params! { "ch" => channel })?;
        let raw = self.transport.read_raw(None)?;
        let block = waveform::decode(
            &raw,
            preamble.voltage_scale,
            preamble.voltage_offset,
            preamble.sample_rate,
            preamble.timebase,
            width,
        )?
        .with_channel(channel);

        info!(
            channel,
            samples = block.record_length,
            sample_rate = block.sample_rate,
            "Acquired waveform"
        );
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use crate::capability::DeviceFamily;
    use crate::error::ErrorKind;
    use crate::instrument::Instrument;
    use crate::transport::MockTransport;
    use crate::waveform::SampleWidth;

    fn connected(mock: MockTransport) -> Instrument<MockTransport> {
        let mut scope = Instrument::new(mock, DeviceFamily::Oscilloscope);
        scope.connect().unwrap();
        scope
    }

    #[test]
    fn preamble_reads_siglent_formatted_values() {
        let mock = MockTransport::new()
            .with_voltage_scale(1, 0.5)
            .with_voltage_offset(1, -0.25)
            .with_acquisition(1e9, 1e-6);
        let mut scope = connected(mock);
        let preamble = scope.waveform_preamble(1).unwrap();
        assert_eq!(preamble.voltage_scale, 0.5);
        assert_eq!(preamble.voltage_offset, -0.25);
        assert!((preamble.timebase - 1e-6).abs() < 1e-15);
        assert!((preamble.sample_rate - 1e9).abs() < 1.0);
    }

    #[test]
    fn acquire_decodes_default_record() {
        let mut scope = connected(MockTransport::new());
        let block = scope.acquire_waveform(1, SampleWidth::Byte).unwrap();
        assert_eq!(block.channel, Some(1));
        assert_eq!(block.voltages, vec![0.0, 1.0, 2.0, 3.0]);
        let expected = [-0.002, -0.001, 0.0, 0.001];
        for (t, e) in block.times.iter().zip(expected) {
            assert!((t - e).abs() < 1e-12);
        }
        assert_eq!(scope.transport().handle().waveform_requests(), vec![1]);
    }

    #[test]
    fn acquire_applies_offset_and_scale() {
        let mock = MockTransport::new()
            .with_voltage_scale(2, 2.0)
            .with_voltage_offset(2, 1.0)
            .with_waveform(2, &[25, 0xE7]);
        let mut scope = connected(mock);
        let block = scope.acquire_waveform(2, SampleWidth::Byte).unwrap();
        assert_eq!(block.voltages, vec![1.0, -3.0]);
    }

    #[test]
    fn acquire_rejects_unknown_channel_before_sending() {
        let mut scope = connected(MockTransport::new());
        let handle = scope.transport().handle();
        handle.clear_logs();
        let err = scope.acquire_waveform(9, SampleWidth::Byte).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(handle.writes().is_empty());
    }

    #[test]
    fn set_timebase_updates_state() {
        let mut scope = connected(MockTransport::new());
        scope.set_timebase(2e-3).unwrap();
        assert_eq!(scope.transport().handle().timebase(), 2e-3);
        assert!((scope.timebase().unwrap() - 2e-3).abs() < 1e-12);
    }
}
