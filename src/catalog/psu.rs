//! Power-supply command tables.

pub(super) const GENERIC: &[(&str, &str)] = &[
    ("identify", "*IDN?"),
    ("reset", "*RST"),
    ("clear_status", "*CLS"),
    ("get_error", "SYST:ERR?"),
    ("operation_complete", "*OPC?"),
    ("set_voltage", "SOUR{ch}:VOLT {voltage}"),
    ("get_voltage", "SOUR{ch}:VOLT?"),
    ("set_current", "SOUR{ch}:CURR {current}"),
    ("get_current", "SOUR{ch}:CURR?"),
    ("set_output", "OUTP{ch} {state}"),
    ("get_output", "OUTP{ch}?"),
    ("measure_voltage", "MEAS:VOLT? CH{ch}"),
    ("measure_current", "MEAS:CURR? CH{ch}"),
    ("measure_power", "MEAS:POW? CH{ch}"),
    ("set_ovp_level", "SOUR{ch}:VOLT:PROT {level}"),
    ("get_ovp_level", "SOUR{ch}:VOLT:PROT?"),
    ("set_ocp_level", "SOUR{ch}:CURR:PROT {level}"),
    ("get_ocp_level", "SOUR{ch}:CURR:PROT?"),
];

/// Siglent SPD series.
pub(super) const SIGLENT_SPD: &[(&str, &str)] = &[
    ("set_voltage", "CH{ch}:VOLT {voltage}"),
    ("get_voltage", "CH{ch}:VOLT?"),
    ("set_current", "CH{ch}:CURR {current}"),
    ("get_current", "CH{ch}:CURR?"),
    ("set_output", "OUTPut CH{ch},{state}"),
    ("measure_voltage", "MEASure{ch}:VOLTage?"),
    ("measure_current", "MEASure{ch}:CURRent?"),
    ("measure_power", "MEASure{ch}:POWEr?"),
    ("set_tracking", "OUTPut:TRACK {mode}"),
    ("set_timer", "TIMEr:SET CH{ch},{group},{voltage},{current},{seconds}"),
    ("set_timer_state", "TIMEr CH{ch},{state}"),
    ("set_waveform_display", "OUTPut:WAVE CH{ch},{state}"),
    ("get_status", "SYSTem:STATus?"),
];
