//! Generator and power-supply setpoints.
//!
//! Every setter validates against the channel's limits before resolving the
//! command, so a rejected value sends nothing.

use tracing::debug;

use super::{parse_number, Instrument};
use crate::capability::{ChannelSpec, WaveShape};
use crate::error::{Result, ScpiError};
use crate::params;
use crate::transport::Transport;
use crate::validation;

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}

impl<T: Transport> Instrument<T> {
    fn checked_channel(
        &self,
        channel: u16,
        check: impl FnOnce(&ChannelSpec) -> Result<()>,
    ) -> Result<()> {
        check(self.channel(channel)?.spec())
    }

    /// Generator output frequency in Hz.
    pub fn set_frequency(&mut self, channel: u16, frequency: f64) -> Result<()> {
        self.checked_channel(channel, |spec| validation::check_frequency(spec, frequency))?;
        debug!(channel, frequency, "Setting frequency");
        self.execute("set_frequency", &params! { "ch" => channel, "frequency" => frequency })
    }

    /// Generator amplitude in Vpp.
    pub fn set_amplitude(&mut self, channel: u16, amplitude: f64) -> Result<()> {
        self.checked_channel(channel, |spec| validation::check_amplitude(spec, amplitude))?;
        debug!(channel, amplitude, "Setting amplitude");
        self.execute("set_amplitude", &params! { "ch" => channel, "amplitude" => amplitude })
    }

    /// Generator DC offset in volts.
    pub fn set_offset(&mut self, channel: u16, offset: f64) -> Result<()> {
        self.checked_channel(channel, |spec| validation::check_offset(spec, offset))?;
        debug!(channel, offset, "Setting offset");
        self.execute("set_offset", &params! { "ch" => channel, "offset" => offset })
    }

    /// Generator phase in degrees.
    pub fn set_phase(&mut self, channel: u16, phase: f64) -> Result<()> {
        self.channel(channel)?;
        validation::check_phase(phase)?;
        self.execute("set_phase", &params! { "ch" => channel, "phase" => phase })
    }

    /// Pulse duty cycle in percent.
    pub fn set_duty_cycle(&mut self, channel: u16, percent: f64) -> Result<()> {
        self.channel(channel)?;
        validation::check_duty_cycle(percent)?;
        debug!(channel, percent, "Setting duty cycle");
        self.execute("set_pulse_duty", &params! { "ch" => channel, "duty" => percent })
    }

    /// Generator waveform shape.
    pub fn set_waveform_shape(&mut self, channel: u16, shape: WaveShape) -> Result<()> {
        self.channel(channel)?;
        let profile = self.profile_or_err()?;
        if !profile.waveforms.contains(&shape) {
            return Err(ScpiError::InvalidParameter(format!(
                "Waveform {} not supported by {}",
                shape.scpi_name(),
                profile.model_name
            )));
        }
        self.execute(
            "set_function",
            &params! { "ch" => channel, "function" => shape.scpi_name() },
        )
    }

    /// Supply voltage setpoint in volts.
    pub fn set_voltage(&mut self, channel: u16, voltage: f64) -> Result<()> {
        self.checked_channel(channel, |spec| validation::check_voltage(spec, voltage))?;
        debug!(channel, voltage, "Setting voltage");
        self.execute("set_voltage", &params! { "ch" => channel, "voltage" => voltage })
    }

    /// Supply current limit in amps.
    pub fn set_current(&mut self, channel: u16, current: f64) -> Result<()> {
        self.checked_channel(channel, |spec| validation::check_current(spec, current))?;
        debug!(channel, current, "Setting current limit");
        self.execute("set_current", &params! { "ch" => channel, "current" => current })
    }

    /// Enable or disable an output.
    pub fn set_output(&mut self, channel: u16, enabled: bool) -> Result<()> {
        self.channel(channel)?;
        self.execute("set_output", &params! { "ch" => channel, "state" => on_off(enabled) })
    }

    /// Measured output voltage.
    pub fn read_voltage(&mut self, channel: u16) -> Result<f64> {
        self.measure_output(channel, "measure_voltage", "output voltage")
    }

    /// Measured output current.
    pub fn read_current(&mut self, channel: u16) -> Result<f64> {
        self.measure_output(channel, "measure_current", "output current")
    }

    /// Measured output power.
    pub fn read_power(&mut self, channel: u16) -> Result<f64> {
        self.measure_output(channel, "measure_power", "output power")
    }

    fn measure_output(
        &mut self,
        channel: u16,
        operation: &str,
        quantity: &'static str,
    ) -> Result<f64> {
        self.channel(channel)?;
        let response = self.query_operation(operation, &params! { "ch" => channel })?;
        parse_number(&response, quantity)
    }
}

#[cfg(test)]
mod tests {
    use crate::capability::{DeviceFamily, WaveShape};
    use crate::error::ErrorKind;
    use crate::instrument::Instrument;
    use crate::transport::MockTransport;

    fn supply() -> Instrument<MockTransport> {
        let mock = MockTransport::new().with_idn("Siglent Technologies,SPD3303X,SPD001,1.01");
        let mut psu = Instrument::new(mock, DeviceFamily::PowerSupply);
        psu.connect().unwrap();
        psu
    }

    #[test]
    fn supply_setpoints_reach_the_instrument() {
        let mut psu = supply();
        let handle = psu.transport().handle();
        psu.set_voltage(1, 5.0).unwrap();
        psu.set_current(1, 1.0).unwrap();
        psu.set_output(1, true).unwrap();
        assert_eq!(
            handle.writes(),
            vec!["*IDN?", "CH1:VOLT 5", "CH1:CURR 1", "OUTPut CH1,ON"]
        );
        assert_eq!(handle.supply(1), Some((5.0, 1.0, true)));
    }

    #[test]
    fn measurements_follow_the_load() {
        let mut psu = supply();
        psu.set_voltage(2, 5.0).unwrap();
        psu.set_current(2, 1.0).unwrap();
        assert_eq!(psu.read_voltage(2).unwrap(), 0.0);
        psu.set_output(2, true).unwrap();
        assert!((psu.read_voltage(2).unwrap() - 5.0).abs() < 1e-9);
        assert!((psu.read_current(2).unwrap() - 0.5).abs() < 1e-9);
        assert!((psu.read_power(2).unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_setpoints_send_nothing() {
        let mut psu = supply();
        let handle = psu.transport().handle();
        handle.clear_logs();

        let err = psu.set_voltage(3, 6.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(psu.set_current(1, 3.5).is_err());
        assert!(psu.set_voltage(4, 1.0).is_err());
        assert!(handle.writes().is_empty());
    }

    #[test]
    fn generator_limits_come_from_the_profile() {
        let mock = MockTransport::new().with_idn("Siglent Technologies,SDG1032X,SDG001,1.01");
        let mut awg = Instrument::new(mock, DeviceFamily::FunctionGenerator);
        awg.connect().unwrap();
        let handle = awg.transport().handle();

        awg.set_frequency(1, 1e3).unwrap();
        awg.set_amplitude(1, 2.0).unwrap();
        awg.set_waveform_shape(1, WaveShape::Sine).unwrap();
        assert!(awg.set_frequency(1, 31e6).is_err());
        assert!(awg.set_phase(2, 400.0).is_err());

        let writes = handle.writes();
        assert!(writes.contains(&"C1:BSWV FRQ,1000".to_string()));
        assert!(writes.contains(&"C1:BSWV AMP,2".to_string()));
        assert!(writes.contains(&"C1:BSWV WVTP,SINE".to_string()));
        assert_eq!(writes.len(), 4);
    }

    #[test]
    fn duty_cycle_is_checked_before_sending() {
        let mock = MockTransport::new().with_idn("Siglent Technologies,SDG1032X,SDG001,1.01");
        let mut awg = Instrument::new(mock, DeviceFamily::FunctionGenerator);
        awg.connect().unwrap();
        let handle = awg.transport().handle();
        handle.clear_logs();

        let err = awg.set_duty_cycle(1, 120.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(handle.writes().is_empty());

        awg.set_duty_cycle(2, 25.0).unwrap();
        assert_eq!(handle.writes(), vec!["C2:BSWV DUTY,25"]);
    }
}
