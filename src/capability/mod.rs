//! Model capability profiles and identification-string detection.
//!
//! Every device family has one immutable registry of known models, built on first
//! use and never mutated afterwards. [`CapabilityRegistry::detect`] classifies an
//! `*IDN?` response in four steps:
//!
//! 1. exact match on the model field,
//! 2. normalized match (whitespace, `-` and `_` removed, upper-cased),
//! 3. partial match, only when the manufacturer field contains one of the family's
//!    known vendor aliases; the longest registered model contained in the reported
//!    model wins,
//! 4. a conservative generic profile with every optional feature off.
//!
//! Detection never fails.

mod models;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::ScpiError;

/// Kind of instrument a registry or catalog describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceFamily {
    /// Digital storage oscilloscope
    #[serde(alias = "scope")]
    Oscilloscope,
    /// Function / arbitrary waveform generator
    #[serde(alias = "awg")]
    FunctionGenerator,
    /// Programmable DC power supply
    #[serde(alias = "psu")]
    PowerSupply,
    /// Switch-unit data logger with internal DMM
    #[serde(alias = "daq")]
    DataLogger,
}

impl DeviceFamily {
    /// All families, in registry order.
    pub const ALL: [DeviceFamily; 4] = [
        DeviceFamily::Oscilloscope,
        DeviceFamily::FunctionGenerator,
        DeviceFamily::PowerSupply,
        DeviceFamily::DataLogger,
    ];

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceFamily::Oscilloscope => "oscilloscope",
            DeviceFamily::FunctionGenerator => "function_generator",
            DeviceFamily::PowerSupply => "power_supply",
            DeviceFamily::DataLogger => "data_logger",
        }
    }

    /// Conventional raw-socket SCPI port for the family.
    pub fn default_port(&self) -> u16 {
        match self {
            DeviceFamily::DataLogger => 5025,
            _ => 5024,
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceFamily {
    type Err = ScpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "oscilloscope" | "scope" => Ok(DeviceFamily::Oscilloscope),
            "function_generator" | "awg" | "generator" => Ok(DeviceFamily::FunctionGenerator),
            "power_supply" | "psu" => Ok(DeviceFamily::PowerSupply),
            "data_logger" | "daq" | "logger" => Ok(DeviceFamily::DataLogger),
            other => Err(ScpiError::Configuration(format!(
                "unknown device family '{other}'"
            ))),
        }
    }
}

/// Vendor SCPI dialect selecting which override table a catalog consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Plain SCPI-99; no override table
    Generic,
    /// Siglent SDS oscilloscopes
    SiglentSds,
    /// Siglent SDG function generators
    SiglentSdg,
    /// Siglent SPD power supplies
    SiglentSpd,
    /// Keysight/Agilent 34970A and DAQ970A series
    KeysightDaq,
}

impl Variant {
    /// Stable lowercase tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Generic => "generic",
            Variant::SiglentSds => "siglent_sds",
            Variant::SiglentSdg => "siglent_sdg",
            Variant::SiglentSpd => "siglent_spd",
            Variant::KeysightDaq => "keysight_daq",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = ScpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Variant::Generic),
            "siglent_sds" => Ok(Variant::SiglentSds),
            "siglent_sdg" => Ok(Variant::SiglentSdg),
            "siglent_spd" => Ok(Variant::SiglentSpd),
            "keysight_daq" => Ok(Variant::KeysightDaq),
            other => Err(ScpiError::Configuration(format!("unknown variant '{other}'"))),
        }
    }
}

/// Measurement functions a data-logger module can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementFunction {
    /// DC volts.
    VoltageDc,
    /// AC volts, RMS.
    VoltageAc,
    /// DC amps.
    CurrentDc,
    /// AC amps, RMS.
    CurrentAc,
    /// Two-wire resistance.
    Resistance2W,
    /// Four-wire resistance.
    Resistance4W,
    /// Frequency in Hz.
    Frequency,
    /// Period in seconds.
    Period,
    /// Thermocouple, RTD or thermistor temperature.
    Temperature,
    /// Digital input byte or word.
    DigitalInput,
    /// Digital output byte or word.
    DigitalOutput,
}

impl MeasurementFunction {
    /// SCPI mnemonic (`VOLT:DC`, `FRES`, ...).
    pub fn mnemonic(&self) -> &'static str {
        match self {
            MeasurementFunction::VoltageDc => "VOLT:DC",
            MeasurementFunction::VoltageAc => "VOLT:AC",
            MeasurementFunction::CurrentDc => "CURR:DC",
            MeasurementFunction::CurrentAc => "CURR:AC",
            MeasurementFunction::Resistance2W => "RES",
            MeasurementFunction::Resistance4W => "FRES",
            MeasurementFunction::Frequency => "FREQ",
            MeasurementFunction::Period => "PER",
            MeasurementFunction::Temperature => "TEMP",
            MeasurementFunction::DigitalInput => "DIG:INP",
            MeasurementFunction::DigitalOutput => "DIG:OUTP",
        }
    }

    /// Catalog operation suffix shared by `configure_*` and `measure_*`.
    ///
    /// `None` for digital I/O, which has no DMM measurement.
    pub fn operation_suffix(&self) -> Option<&'static str> {
        match self {
            MeasurementFunction::VoltageDc => Some("voltage_dc"),
            MeasurementFunction::VoltageAc => Some("voltage_ac"),
            MeasurementFunction::CurrentDc => Some("current_dc"),
            MeasurementFunction::CurrentAc => Some("current_ac"),
            MeasurementFunction::Resistance2W => Some("resistance_2w"),
            MeasurementFunction::Resistance4W => Some("resistance_4w"),
            MeasurementFunction::Frequency => Some("frequency"),
            MeasurementFunction::Period => Some("period"),
            MeasurementFunction::Temperature => Some("temperature"),
            MeasurementFunction::DigitalInput | MeasurementFunction::DigitalOutput => None,
        }
    }

    /// Unit attached to readings when the instrument does not report one.
    pub fn default_unit(&self) -> &'static str {
        match self {
            MeasurementFunction::VoltageDc | MeasurementFunction::VoltageAc => "V",
            MeasurementFunction::CurrentDc | MeasurementFunction::CurrentAc => "A",
            MeasurementFunction::Resistance2W | MeasurementFunction::Resistance4W => "Ω",
            MeasurementFunction::Frequency => "Hz",
            MeasurementFunction::Period => "s",
            MeasurementFunction::Temperature => "°C",
            MeasurementFunction::DigitalInput | MeasurementFunction::DigitalOutput => "",
        }
    }
}

/// Output waveform shapes a generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveShape {
    /// Sine.
    Sine,
    /// Square.
    Square,
    /// Ramp or triangle.
    Ramp,
    /// Pulse with adjustable duty cycle.
    Pulse,
    /// Gaussian noise.
    Noise,
    /// User-loaded arbitrary waveform.
    Arbitrary,
    /// DC level.
    Dc,
}

impl WaveShape {
    /// SCPI token as sent in `set_function`.
    pub fn scpi_name(&self) -> &'static str {
        match self {
            WaveShape::Sine => "SINE",
            WaveShape::Square => "SQUARE",
            WaveShape::Ramp => "RAMP",
            WaveShape::Pulse => "PULSE",
            WaveShape::Noise => "NOISE",
            WaveShape::Arbitrary => "ARB",
            WaveShape::Dc => "DC",
        }
    }
}

/// Limits of one output or input channel. Fields that do not apply to the
/// family are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSpec {
    /// Channel number as the instrument addresses it (1-based, or 101.. for loggers)
    pub number: u16,
    /// Maximum output frequency or analog bandwidth (Hz)
    pub max_frequency: Option<f64>,
    /// Maximum amplitude (Vpp)
    pub max_amplitude: Option<f64>,
    /// Minimum amplitude (Vpp)
    pub min_amplitude: Option<f64>,
    /// Maximum DC offset magnitude (V)
    pub max_offset: Option<f64>,
    /// Maximum voltage setpoint or input voltage (V)
    pub max_voltage: Option<f64>,
    /// Maximum current setpoint (A)
    pub max_current: Option<f64>,
    /// Frequency resolution (Hz)
    pub frequency_resolution: Option<f64>,
    /// Amplitude resolution (V)
    pub amplitude_resolution: Option<f64>,
}

impl ChannelSpec {
    fn empty(number: u16) -> Self {
        Self {
            number,
            max_frequency: None,
            max_amplitude: None,
            min_amplitude: None,
            max_offset: None,
            max_voltage: None,
            max_current: None,
            frequency_resolution: None,
            amplitude_resolution: None,
        }
    }

    /// Generator output channel.
    pub fn generator(
        number: u16,
        max_frequency: f64,
        max_amplitude: f64,
        min_amplitude: f64,
        max_offset: f64,
    ) -> Self {
        Self {
            max_frequency: Some(max_frequency),
            max_amplitude: Some(max_amplitude),
            min_amplitude: Some(min_amplitude),
            max_offset: Some(max_offset),
            frequency_resolution: Some(1e-6),
            amplitude_resolution: Some(0.001),
            ..Self::empty(number)
        }
    }

    /// Power-supply output.
    pub fn supply(number: u16, max_voltage: f64, max_current: f64) -> Self {
        Self {
            max_voltage: Some(max_voltage),
            max_current: Some(max_current),
            ..Self::empty(number)
        }
    }

    /// Oscilloscope analog input.
    pub fn scope_input(number: u16, bandwidth: f64) -> Self {
        Self {
            max_frequency: Some(bandwidth),
            ..Self::empty(number)
        }
    }

    /// Data-logger multiplexer input.
    pub fn logger_input(number: u16, max_voltage: f64) -> Self {
        Self {
            max_voltage: Some(max_voltage),
            ..Self::empty(number)
        }
    }
}

/// A data-logger plug-in module occupying one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSpec {
    /// Slot number, 1-based.
    pub slot: u8,
    /// Module part number, e.g. `34901A`.
    pub module_type: String,
    /// Channels on the module.
    pub num_channels: u16,
    /// First channel number, `slot * 100 + 1` for Keysight switch units
    pub channel_start: u16,
    /// Supported measurement functions.
    pub functions: Vec<MeasurementFunction>,
    /// Maximum input voltage.
    pub max_voltage: f64,
    /// Human-readable summary.
    pub description: String,
}

impl ModuleSpec {
    /// Channel numbers on this module, ascending.
    pub fn channel_numbers(&self) -> impl Iterator<Item = u16> + '_ {
        self.channel_start..self.channel_start + self.num_channels
    }
}

/// Optional capability flags. Every flag defaults to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Features {
    /// AM/FM/PM modulation.
    pub has_modulation: bool,
    /// Frequency sweep.
    pub has_sweep: bool,
    /// Burst mode.
    pub has_burst: bool,
    /// Arbitrary waveform upload.
    pub has_arbitrary: bool,
    /// Noise output.
    pub has_noise: bool,
    /// Built-in DMM.
    pub has_internal_dmm: bool,
    /// Readings carry instrument timestamps.
    pub has_timestamp: bool,
    /// Alarm limits.
    pub has_alarm: bool,
    /// Mx+B scaling.
    pub has_math: bool,
    /// Over-voltage protection.
    pub has_ovp: bool,
    /// Over-current protection.
    pub has_ocp: bool,
    /// Timed output sequences.
    pub has_timer: bool,
    /// Output waveform display.
    pub has_waveform: bool,
    /// Series/parallel channel tracking.
    pub has_tracking: bool,
    /// FFT math channel.
    pub has_fft: bool,
    /// Serial bus decode.
    pub has_decode: bool,
}

/// Everything known about one instrument model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityProfile {
    /// Registered model name.
    pub model_name: String,
    /// Vendor name.
    pub manufacturer: String,
    /// Instrument family.
    pub family: DeviceFamily,
    /// Ordered channel limits; the facade builds its channel list from these
    pub channels: Vec<ChannelSpec>,
    /// Installed modules (data loggers only)
    pub modules: Vec<ModuleSpec>,
    /// Producible waveforms (generators only)
    pub waveforms: Vec<WaveShape>,
    /// Optional capabilities.
    pub features: Features,
    /// Sa/s for scopes and generators, channels/s for loggers
    pub max_sample_rate: Option<f64>,
    /// Record length, arbitrary-waveform length, or reading memory
    pub memory_depth: Option<usize>,
    /// DMM resolution in digits (data loggers only)
    pub dmm_resolution: Option<f64>,
    /// Command dialect.
    pub variant: Variant,
}

impl CapabilityProfile {
    /// Number of addressable channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Channel numbers in order.
    pub fn channel_numbers(&self) -> Vec<u16> {
        self.channels.iter().map(|c| c.number).collect()
    }

    /// Spec for a channel number, if the model has it.
    pub fn channel(&self, number: u16) -> Option<&ChannelSpec> {
        self.channels.iter().find(|c| c.number == number)
    }

    /// Whether any installed module supports `function`.
    pub fn supports_measurement(&self, function: MeasurementFunction) -> bool {
        self.modules.iter().any(|m| m.functions.contains(&function))
    }

    /// True when this profile came from the generic fallback.
    pub fn is_generic(&self) -> bool {
        self.variant == Variant::Generic
    }
}

impl fmt::Display for CapabilityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} channels, {})",
            self.manufacturer,
            self.model_name,
            self.channels.len(),
            self.variant
        )
    }
}

/// Fields of an `*IDN?` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdnInfo {
    /// Manufacturer field.
    pub manufacturer: String,
    /// Model field.
    pub model: String,
    /// Serial number field.
    pub serial: String,
    /// Firmware version field.
    pub firmware: String,
}

impl IdnInfo {
    /// Split `Manufacturer,Model,Serial,Firmware`. Returns `None` when fewer than two
    /// fields are present.
    pub fn parse(idn: &str) -> Option<Self> {
        let parts: Vec<&str> = idn.split(',').map(str::trim).collect();
        if parts.len() < 2 {
            return None;
        }
        let field = |i: usize| parts.get(i).map(|s| s.to_string()).unwrap_or_default();
        Some(Self {
            manufacturer: field(0),
            model: field(1),
            serial: field(2),
            firmware: field(3),
        })
    }
}

/// Upper-case and strip whitespace, `-` and `_`.
pub fn normalize_model(model: &str) -> String {
    model
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Immutable table of known models for one family.
#[derive(Debug)]
pub struct CapabilityRegistry {
    family: DeviceFamily,
    models: BTreeMap<&'static str, CapabilityProfile>,
    vendor_aliases: &'static [&'static str],
}

static OSCILLOSCOPES: Lazy<CapabilityRegistry> = Lazy::new(|| CapabilityRegistry {
    family: DeviceFamily::Oscilloscope,
    models: models::oscilloscopes(),
    vendor_aliases: &["Siglent"],
});

static FUNCTION_GENERATORS: Lazy<CapabilityRegistry> = Lazy::new(|| CapabilityRegistry {
    family: DeviceFamily::FunctionGenerator,
    models: models::function_generators(),
    vendor_aliases: &["Siglent"],
});

static POWER_SUPPLIES: Lazy<CapabilityRegistry> = Lazy::new(|| CapabilityRegistry {
    family: DeviceFamily::PowerSupply,
    models: models::power_supplies(),
    vendor_aliases: &["Siglent"],
});

static DATA_LOGGERS: Lazy<CapabilityRegistry> = Lazy::new(|| CapabilityRegistry {
    family: DeviceFamily::DataLogger,
    models: models::data_loggers(),
    vendor_aliases: &["Keysight", "Agilent", "HP"],
});

impl CapabilityRegistry {
    /// The registry for `family`.
    pub fn for_family(family: DeviceFamily) -> &'static CapabilityRegistry {
        match family {
            DeviceFamily::Oscilloscope => &*OSCILLOSCOPES,
            DeviceFamily::FunctionGenerator => &*FUNCTION_GENERATORS,
            DeviceFamily::PowerSupply => &*POWER_SUPPLIES,
            DeviceFamily::DataLogger => &*DATA_LOGGERS,
        }
    }

    /// Family this registry describes.
    pub fn family(&self) -> DeviceFamily {
        self.family
    }

    /// Classify an `*IDN?` response. Never fails.
    pub fn detect(&self, idn: &str) -> CapabilityProfile {
        let Some(info) = IdnInfo::parse(idn) else {
            warn!(family = %self.family, idn, "Invalid *IDN? response format");
            return self.generic_profile("Unknown", &format!("Generic {}", self.family));
        };

        debug!(
            family = %self.family,
            manufacturer = %info.manufacturer,
            model = %info.model,
            "Detecting model from IDN"
        );

        if let Some(profile) = self.models.get(info.model.as_str()) {
            info!(model = %info.model, "Exact model match");
            return profile.clone();
        }

        let normalized = normalize_model(&info.model);
        if let Some((key, profile)) = self
            .models
            .iter()
            .find(|(key, _)| normalize_model(key) == normalized)
        {
            info!(reported = %info.model, registered = %key, "Normalized model match");
            return profile.clone();
        }

        if self.manufacturer_is_known(&info.manufacturer) {
            let partial = self
                .models
                .iter()
                .map(|(key, profile)| (normalize_model(key), *key, profile))
                .filter(|(norm_key, _, _)| normalized.contains(norm_key.as_str()))
                .max_by_key(|(norm_key, _, _)| norm_key.len());
            if let Some((_, key, profile)) = partial {
                info!(reported = %info.model, registered = %key, "Partial model match");
                return profile.clone();
            }
        }

        warn!(
            family = %self.family,
            model = %info.model,
            "Model not in registry, using generic SCPI profile"
        );
        self.generic_profile(&info.manufacturer, &info.model)
    }

    /// An alias must appear as a whole word of the reported manufacturer, with
    /// its exact case.
    fn manufacturer_is_known(&self, manufacturer: &str) -> bool {
        manufacturer
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| self.vendor_aliases.contains(&word))
    }

    fn generic_profile(&self, manufacturer: &str, model: &str) -> CapabilityProfile {
        models::generic(self.family, manufacturer, model)
    }

    /// Registered model names, sorted.
    pub fn supported_models(&self) -> Vec<&'static str> {
        self.models.keys().copied().collect()
    }

    /// Registered profiles whose manufacturer matches, case-insensitively.
    pub fn models_by_manufacturer(&self, manufacturer: &str) -> Vec<&CapabilityProfile> {
        self.models
            .values()
            .filter(|p| p.manufacturer.eq_ignore_ascii_case(manufacturer))
            .collect()
    }

    /// Registered profile by exact model name.
    pub fn profile(&self, model: &str) -> Option<&CapabilityProfile> {
        self.models.get(model)
    }
}

/// Shorthand for `CapabilityRegistry::for_family(family).detect(idn)`.
pub fn detect(family: DeviceFamily, idn: &str) -> CapabilityProfile {
    CapabilityRegistry::for_family(family).detect(idn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_returns_registered_profile() {
        let profile = detect(
            DeviceFamily::FunctionGenerator,
            "Siglent Technologies,SDG1032X,SDG1XCAD1R1234,2.01.01.37R1",
        );
        assert_eq!(profile.model_name, "SDG1032X");
        assert_eq!(profile.variant, Variant::SiglentSdg);
        assert_eq!(profile.num_channels(), 2);
        assert_eq!(profile.channels[0].max_frequency, Some(30e6));
    }

    #[test]
    fn normalized_match_ignores_case_and_separators() {
        let profile = detect(DeviceFamily::Oscilloscope, "Siglent Technologies,sds 1104x_e,X,1");
        assert_eq!(profile.model_name, "SDS1104X-E");
        assert_eq!(profile.variant, Variant::SiglentSds);
    }

    #[test]
    fn partial_match_requires_known_vendor() {
        let known = detect(DeviceFamily::DataLogger, "HP,34970A-OPT001,1,1");
        assert_eq!(known.model_name, "34970A");

        let unknown = detect(DeviceFamily::DataLogger, "Acme,34970A-OPT001,1,1");
        assert_eq!(unknown.variant, Variant::Generic);
        assert_eq!(unknown.model_name, "34970A-OPT001");
    }

    #[test]
    fn vendor_alias_must_be_a_whole_word() {
        for manufacturer in ["Graphpoint", "Chp Instruments", "hp"] {
            let profile = detect(DeviceFamily::DataLogger, &format!("{manufacturer},34970A-OPT001,1,1"));
            assert_eq!(profile.variant, Variant::Generic, "{manufacturer}");
        }
        let profile = detect(DeviceFamily::DataLogger, "HP Inc.,34970A-OPT001,1,1");
        assert_eq!(profile.variant, Variant::KeysightDaq);
    }

    #[test]
    fn models_are_listed_by_manufacturer() {
        let registry = CapabilityRegistry::for_family(DeviceFamily::PowerSupply);
        let mut models: Vec<&str> = registry
            .models_by_manufacturer("siglent")
            .iter()
            .map(|p| p.model_name.as_str())
            .collect();
        models.sort_unstable();
        assert_eq!(models, vec!["SPD3303X", "SPD3303X-E"]);
        assert!(registry.models_by_manufacturer("Keysight").is_empty());
    }

    #[test]
    fn partial_match_prefers_longest_key() {
        let profile = detect(DeviceFamily::PowerSupply, "Siglent Technologies,SPD3303X-E Plus,S,1");
        assert_eq!(profile.model_name, "SPD3303X-E");
    }

    #[test]
    fn malformed_idn_falls_back_to_generic() {
        let profile = detect(DeviceFamily::FunctionGenerator, "garbage");
        assert_eq!(profile.variant, Variant::Generic);
        assert_eq!(profile.manufacturer, "Unknown");
        assert_eq!(profile.num_channels(), 1);
    }

    #[test]
    fn normalize_model_strips_separators() {
        assert_eq!(normalize_model(" sds-1104x_e "), "SDS1104XE");
    }

    #[test]
    fn idn_info_parses_all_fields() {
        let info = IdnInfo::parse("Siglent Technologies, SPD3303X ,SPD3XXXX,1.01").unwrap();
        assert_eq!(info.manufacturer, "Siglent Technologies");
        assert_eq!(info.model, "SPD3303X");
        assert_eq!(info.serial, "SPD3XXXX");
        assert_eq!(info.firmware, "1.01");
        assert!(IdnInfo::parse("lonely").is_none());
    }

    #[test]
    fn variant_and_family_parse_round_trip() {
        for variant in [
            Variant::Generic,
            Variant::SiglentSds,
            Variant::SiglentSdg,
            Variant::SiglentSpd,
            Variant::KeysightDaq,
        ] {
            assert_eq!(variant.as_str().parse::<Variant>().unwrap(), variant);
        }
        assert_eq!("daq".parse::<DeviceFamily>().unwrap(), DeviceFamily::DataLogger);
        assert_eq!("Power-Supply".parse::<DeviceFamily>().unwrap(), DeviceFamily::PowerSupply);
        assert!("toaster".parse::<DeviceFamily>().is_err());
    }

    #[test]
    fn module_channel_numbers_start_at_slot_base() {
        let registry = CapabilityRegistry::for_family(DeviceFamily::DataLogger);
        let profile = registry.profile("34970A").unwrap();
        let channels: Vec<u16> = profile.modules[0].channel_numbers().collect();
        assert_eq!(channels.first(), Some(&101));
        assert_eq!(channels.last(), Some(&120));
        assert!(profile.supports_measurement(MeasurementFunction::Temperature));
    }
}
