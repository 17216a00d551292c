//! Oscilloscope command tables.

pub(super) const GENERIC: &[(&str, &str)] = &[
    ("identify", "*IDN?"),
    ("reset", "*RST"),
    ("clear_status", "*CLS"),
    ("get_error", "SYST:ERR?"),
    ("operation_complete", "*OPC?"),
    // Vertical
    ("set_voltage_scale", ":CHAN{ch}:SCAL {scale}"),
    ("get_voltage_scale", ":CHAN{ch}:SCAL?"),
    ("set_voltage_offset", ":CHAN{ch}:OFFS {offset}"),
    ("get_voltage_offset", ":CHAN{ch}:OFFS?"),
    ("set_channel_display", ":CHAN{ch}:DISP {state}"),
    ("get_channel_display", ":CHAN{ch}:DISP?"),
    ("set_coupling", ":CHAN{ch}:COUP {coupling}"),
    // Horizontal / acquisition
    ("set_timebase", ":TIM:SCAL {timebase}"),
    ("get_timebase", ":TIM:SCAL?"),
    ("get_sample_rate", ":ACQ:SRAT?"),
    ("run", ":RUN"),
    ("stop", ":STOP"),
    ("single", ":SING"),
    ("auto_setup", ":AUT"),
    // Trigger
    ("set_trigger_mode", ":TRIG:SWE {mode}"),
    ("get_trigger_mode", ":TRIG:SWE?"),
    ("set_trigger_source", ":TRIG:EDGE:SOUR {source}"),
    ("set_trigger_level", ":TRIG:EDGE:LEV {level}"),
    ("get_trigger_status", ":TRIG:STAT?"),
    ("force_trigger", ":TFOR"),
    // Waveform
    ("get_waveform", ":WAV:SOUR CHAN{ch};:WAV:DATA?"),
];

/// Siglent SDS series.
pub(super) const SIGLENT_SDS: &[(&str, &str)] = &[
    ("set_voltage_scale", "C{ch}:VDIV {scale}"),
    ("get_voltage_scale", "C{ch}:VDIV?"),
    ("set_voltage_offset", "C{ch}:OFST {offset}"),
    ("get_voltage_offset", "C{ch}:OFST?"),
    ("set_channel_display", "C{ch}:TRA {state}"),
    ("get_channel_display", "C{ch}:TRA?"),
    ("set_coupling", "C{ch}:CPL {coupling}"),
    ("set_timebase", "TDIV {timebase}"),
    ("get_timebase", "TDIV?"),
    ("get_sample_rate", "SARA?"),
    ("run", "TRIG_MODE AUTO"),
    ("stop", "STOP"),
    ("single", "TRIG_MODE SINGLE"),
    ("arm", "ARM"),
    ("auto_setup", "ASET"),
    ("set_trigger_mode", "TRIG_MODE {mode}"),
    ("get_trigger_mode", "TRIG_MODE?"),
    ("set_trigger_source", "TRIG_SELECT EDGE,SR,{source}"),
    ("get_trigger_source", "TRIG_SELECT?"),
    ("set_trigger_level", "{source}:TRLV {level}"),
    ("force_trigger", "FRTR"),
    ("get_waveform", "C{ch}:WF? DAT2"),
];
