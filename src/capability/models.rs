//! Static model tables. Add new models here.

use std::collections::BTreeMap;

use super::{
    CapabilityProfile, ChannelSpec, DeviceFamily, Features, MeasurementFunction, ModuleSpec,
    Variant, WaveShape,
};

const ALL_WAVES: [WaveShape; 7] = [
    WaveShape::Sine,
    WaveShape::Square,
    WaveShape::Ramp,
    WaveShape::Pulse,
    WaveShape::Noise,
    WaveShape::Arbitrary,
    WaveShape::Dc,
];

const MUX_FUNCTIONS: [MeasurementFunction; 9] = [
    MeasurementFunction::VoltageDc,
    MeasurementFunction::VoltageAc,
    MeasurementFunction::CurrentDc,
    MeasurementFunction::CurrentAc,
    MeasurementFunction::Resistance2W,
    MeasurementFunction::Resistance4W,
    MeasurementFunction::Frequency,
    MeasurementFunction::Period,
    MeasurementFunction::Temperature,
];

fn siglent(
    family: DeviceFamily,
    model: &str,
    channels: Vec<ChannelSpec>,
    features: Features,
    variant: Variant,
) -> CapabilityProfile {
    CapabilityProfile {
        model_name: model.to_string(),
        manufacturer: "Siglent".to_string(),
        family,
        channels,
        modules: Vec::new(),
        waveforms: Vec::new(),
        features,
        max_sample_rate: None,
        memory_depth: None,
        dmm_resolution: None,
        variant,
    }
}

fn scope(model: &str, inputs: u16, bandwidth: f64, sample_rate: f64, depth: usize) -> CapabilityProfile {
    let channels = (1..=inputs)
        .map(|n| ChannelSpec::scope_input(n, bandwidth))
        .collect();
    let features = Features {
        has_math: true,
        has_fft: true,
        has_decode: true,
        ..Features::default()
    };
    CapabilityProfile {
        max_sample_rate: Some(sample_rate),
        memory_depth: Some(depth),
        ..siglent(DeviceFamily::Oscilloscope, model, channels, features, Variant::SiglentSds)
    }
}

pub(super) fn oscilloscopes() -> BTreeMap<&'static str, CapabilityProfile> {
    BTreeMap::from([
        ("SDS1104X-E", scope("SDS1104X-E", 4, 100e6, 1e9, 14_000_000)),
        ("SDS1204X-E", scope("SDS1204X-E", 4, 200e6, 1e9, 14_000_000)),
        ("SDS1202X-E", scope("SDS1202X-E", 2, 200e6, 1e9, 14_000_000)),
        ("SDS2104X Plus", scope("SDS2104X Plus", 4, 100e6, 2e9, 200_000_000)),
    ])
}

fn generator(
    model: &str,
    max_frequency: f64,
    max_amplitude: f64,
    max_offset: f64,
    sample_rate: f64,
    waveform_length: usize,
) -> CapabilityProfile {
    let channels = (1..=2)
        .map(|n| ChannelSpec::generator(n, max_frequency, max_amplitude, 0.002, max_offset))
        .collect();
    let features = Features {
        has_modulation: true,
        has_sweep: true,
        has_burst: true,
        has_arbitrary: true,
        has_noise: true,
        ..Features::default()
    };
    CapabilityProfile {
        waveforms: ALL_WAVES.to_vec(),
        max_sample_rate: Some(sample_rate),
        memory_depth: Some(waveform_length),
        ..siglent(
            DeviceFamily::FunctionGenerator,
            model,
            channels,
            features,
            Variant::SiglentSdg,
        )
    }
}

pub(super) fn function_generators() -> BTreeMap<&'static str, CapabilityProfile> {
    BTreeMap::from([
        ("SDG1032X", generator("SDG1032X", 30e6, 20.0, 10.0, 150e6, 16_384)),
        ("SDG1025", generator("SDG1025", 25e6, 10.0, 5.0, 125e6, 8_192)),
        ("SDG1020", generator("SDG1020", 20e6, 10.0, 5.0, 125e6, 8_192)),
        ("SDG2122X", generator("SDG2122X", 120e6, 20.0, 10.0, 1.2e9, 16_384)),
        ("SDG2082X", generator("SDG2082X", 80e6, 20.0, 10.0, 1.2e9, 16_384)),
        ("SDG2042X", generator("SDG2042X", 40e6, 20.0, 10.0, 1.2e9, 16_384)),
    ])
}

fn supply(model: &str, outputs: Vec<ChannelSpec>, features: Features) -> CapabilityProfile {
    siglent(DeviceFamily::PowerSupply, model, outputs, features, Variant::SiglentSpd)
}

pub(super) fn power_supplies() -> BTreeMap<&'static str, CapabilityProfile> {
    let triple = || {
        vec![
            ChannelSpec::supply(1, 30.0, 3.0),
            ChannelSpec::supply(2, 30.0, 3.0),
            ChannelSpec::supply(3, 5.0, 3.2),
        ]
    };
    let spd3303 = Features {
        has_ovp: true,
        has_ocp: true,
        has_timer: true,
        has_waveform: true,
        has_tracking: true,
        ..Features::default()
    };
    let single = Features {
        has_ovp: true,
        has_ocp: true,
        has_timer: true,
        ..Features::default()
    };
    BTreeMap::from([
        ("SPD3303X", supply("SPD3303X", triple(), spd3303)),
        ("SPD3303X-E", supply("SPD3303X-E", triple(), spd3303)),
        ("SPD1305X", supply("SPD1305X", vec![ChannelSpec::supply(1, 30.0, 5.0)], single)),
        ("SPD1168X", supply("SPD1168X", vec![ChannelSpec::supply(1, 16.0, 8.0)], single)),
    ])
}

fn mux_20ch(slot: u8) -> ModuleSpec {
    ModuleSpec {
        slot,
        module_type: "34901A".to_string(),
        num_channels: 20,
        channel_start: u16::from(slot) * 100 + 1,
        functions: MUX_FUNCTIONS.to_vec(),
        max_voltage: 300.0,
        description: "20-Channel Multiplexer (2/4-wire)".to_string(),
    }
}

fn logger(
    model: &str,
    modules: Vec<ModuleSpec>,
    scan_rate: f64,
    memory: usize,
    has_dmm: bool,
) -> CapabilityProfile {
    let channels = modules
        .iter()
        .flat_map(|m| m.channel_numbers().map(|n| ChannelSpec::logger_input(n, m.max_voltage)))
        .collect();
    CapabilityProfile {
        model_name: model.to_string(),
        manufacturer: "Keysight".to_string(),
        family: DeviceFamily::DataLogger,
        channels,
        modules,
        waveforms: Vec::new(),
        features: Features {
            has_internal_dmm: has_dmm,
            has_timestamp: true,
            has_alarm: true,
            has_math: has_dmm,
            ..Features::default()
        },
        max_sample_rate: Some(scan_rate),
        memory_depth: Some(memory),
        dmm_resolution: has_dmm.then_some(6.5),
        variant: Variant::KeysightDaq,
    }
}

pub(super) fn data_loggers() -> BTreeMap<&'static str, CapabilityProfile> {
    BTreeMap::from([
        ("34970A", logger("34970A", vec![mux_20ch(1)], 250.0, 50_000, true)),
        ("34972A", logger("34972A", vec![mux_20ch(1)], 250.0, 50_000, true)),
        ("DAQ970A", logger("DAQ970A", vec![mux_20ch(1)], 450.0, 500_000, true)),
        ("DAQ973A", logger("DAQ973A", Vec::new(), 450.0, 500_000, false)),
    ])
}

/// Conservative profile for an unrecognised instrument: one channel (one module for
/// loggers), modest limits, optional features off, generic SCPI-99 commands.
pub(super) fn generic(family: DeviceFamily, manufacturer: &str, model: &str) -> CapabilityProfile {
    let base = CapabilityProfile {
        model_name: model.to_string(),
        manufacturer: manufacturer.to_string(),
        family,
        channels: Vec::new(),
        modules: Vec::new(),
        waveforms: Vec::new(),
        features: Features::default(),
        max_sample_rate: None,
        memory_depth: None,
        dmm_resolution: None,
        variant: Variant::Generic,
    };
    match family {
        DeviceFamily::Oscilloscope => CapabilityProfile {
            channels: vec![ChannelSpec::scope_input(1, 50e6)],
            max_sample_rate: Some(500e6),
            memory_depth: Some(7_000),
            ..base
        },
        DeviceFamily::FunctionGenerator => CapabilityProfile {
            channels: vec![ChannelSpec::generator(1, 10e6, 10.0, 0.01, 5.0)],
            waveforms: vec![WaveShape::Sine, WaveShape::Square, WaveShape::Ramp, WaveShape::Pulse],
            max_sample_rate: Some(100e6),
            memory_depth: Some(8_192),
            ..base
        },
        DeviceFamily::PowerSupply => CapabilityProfile {
            channels: vec![ChannelSpec::supply(1, 30.0, 3.0)],
            ..base
        },
        DeviceFamily::DataLogger => {
            let module = ModuleSpec {
                slot: 1,
                module_type: "Generic".to_string(),
                num_channels: 20,
                channel_start: 101,
                functions: vec![
                    MeasurementFunction::VoltageDc,
                    MeasurementFunction::VoltageAc,
                    MeasurementFunction::Resistance2W,
                ],
                max_voltage: 300.0,
                description: "Generic Input Module".to_string(),
            };
            let channels = module
                .channel_numbers()
                .map(|n| ChannelSpec::logger_input(n, module.max_voltage))
                .collect();
            CapabilityProfile {
                channels,
                modules: vec![module],
                // Baseline for any DMM-based logger, not optional command sets.
                features: Features {
                    has_internal_dmm: true,
                    has_timestamp: true,
                    ..Features::default()
                },
                max_sample_rate: Some(100.0),
                memory_depth: Some(10_000),
                dmm_resolution: Some(5.5),
                ..base
            }
        }
    }
}
