//! Function-generator command tables.

pub(super) const GENERIC: &[(&str, &str)] = &[
    // IEEE 488.2
    ("identify", "*IDN?"),
    ("reset", "*RST"),
    ("clear_status", "*CLS"),
    ("get_error", "SYST:ERR?"),
    ("operation_complete", "*OPC?"),
    // Basic waveform
    ("set_function", "SOUR{ch}:FUNC {function}"),
    ("get_function", "SOUR{ch}:FUNC?"),
    ("set_frequency", "SOUR{ch}:FREQ {frequency}"),
    ("get_frequency", "SOUR{ch}:FREQ?"),
    ("set_amplitude", "SOUR{ch}:VOLT {amplitude}"),
    ("get_amplitude", "SOUR{ch}:VOLT?"),
    ("set_offset", "SOUR{ch}:VOLT:OFFS {offset}"),
    ("get_offset", "SOUR{ch}:VOLT:OFFS?"),
    ("set_phase", "SOUR{ch}:PHAS {phase}"),
    ("get_phase", "SOUR{ch}:PHAS?"),
    // Output
    ("set_output", "OUTP{ch} {state}"),
    ("get_output", "OUTP{ch}?"),
    ("set_output_load", "OUTP{ch}:LOAD {load}"),
    ("get_output_load", "OUTP{ch}:LOAD?"),
    ("set_output_polarity", "OUTP{ch}:POL {polarity}"),
    ("get_output_polarity", "OUTP{ch}:POL?"),
    // Pulse / ramp
    ("set_pulse_width", "SOUR{ch}:FUNC:PULS:WIDT {width}"),
    ("get_pulse_width", "SOUR{ch}:FUNC:PULS:WIDT?"),
    ("set_pulse_period", "SOUR{ch}:FUNC:PULS:PER {period}"),
    ("get_pulse_period", "SOUR{ch}:FUNC:PULS:PER?"),
    ("set_pulse_duty", "SOUR{ch}:FUNC:PULS:DCYC {duty}"),
    ("get_pulse_duty", "SOUR{ch}:FUNC:PULS:DCYC?"),
    ("set_ramp_symmetry", "SOUR{ch}:FUNC:RAMP:SYMM {symmetry}"),
    ("get_ramp_symmetry", "SOUR{ch}:FUNC:RAMP:SYMM?"),
];

/// Siglent SDG basic-wave (`BSWV`) dialect.
pub(super) const SIGLENT_SDG: &[(&str, &str)] = &[
    ("set_function", "C{ch}:BSWV WVTP,{function}"),
    ("get_function", "C{ch}:BSWV? WVTP"),
    ("set_frequency", "C{ch}:BSWV FRQ,{frequency}"),
    ("get_frequency", "C{ch}:BSWV? FRQ"),
    ("set_amplitude", "C{ch}:BSWV AMP,{amplitude}"),
    ("get_amplitude", "C{ch}:BSWV? AMP"),
    ("set_offset", "C{ch}:BSWV OFST,{offset}"),
    ("get_offset", "C{ch}:BSWV? OFST"),
    ("set_phase", "C{ch}:BSWV PHSE,{phase}"),
    ("get_phase", "C{ch}:BSWV? PHSE"),
    ("set_pulse_duty", "C{ch}:BSWV DUTY,{duty}"),
    ("get_pulse_duty", "C{ch}:BSWV? DUTY"),
    ("set_ramp_symmetry", "C{ch}:BSWV SYM,{symmetry}"),
    ("get_ramp_symmetry", "C{ch}:BSWV? SYM"),
    ("set_output", "C{ch}:OUTP {state}"),
    ("get_output", "C{ch}:OUTP?"),
    ("set_output_load", "C{ch}:OUTP LOAD,{load}"),
    ("get_output_load", "C{ch}:OUTP? LOAD"),
    ("set_output_polarity", "C{ch}:OUTP PLRT,{polarity}"),
    ("get_output_polarity", "C{ch}:OUTP? PLRT"),
    // Arbitrary, modulation, burst, sweep
    ("set_arb_waveform", "C{ch}:ARWV NAME,{name}"),
    ("get_arb_waveform", "C{ch}:ARWV? NAME"),
    ("set_modulation", "C{ch}:MDWV STATE,{state}"),
    ("get_modulation", "C{ch}:MDWV? STATE"),
    ("set_burst_state", "C{ch}:BTWV STATE,{state}"),
    ("get_burst_state", "C{ch}:BTWV? STATE"),
    ("set_sweep_state", "C{ch}:SWWV STATE,{state}"),
    ("get_sweep_state", "C{ch}:SWWV? STATE"),
];
