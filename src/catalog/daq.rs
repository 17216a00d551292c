//! Data-logger command tables.

pub(super) const GENERIC: &[(&str, &str)] = &[
    // IEEE 488.2
    ("identify", "*IDN?"),
    ("reset", "*RST"),
    ("clear_status", "*CLS"),
    ("get_error", "SYST:ERR?"),
    ("operation_complete", "*OPC?"),
    // Configuration
    ("configure_voltage_dc", "CONF:VOLT:DC {range},{resolution},{channels}"),
    ("configure_voltage_ac", "CONF:VOLT:AC {range},{resolution},{channels}"),
    ("configure_current_dc", "CONF:CURR:DC {range},{resolution},{channels}"),
    ("configure_current_ac", "CONF:CURR:AC {range},{resolution},{channels}"),
    ("configure_resistance_2w", "CONF:RES {range},{resolution},{channels}"),
    ("configure_resistance_4w", "CONF:FRES {range},{resolution},{channels}"),
    ("configure_frequency", "CONF:FREQ {range},{resolution},{channels}"),
    ("configure_period", "CONF:PER {range},{resolution},{channels}"),
    ("configure_temperature", "CONF:TEMP {sensor_type},{channels}"),
    // Scan list
    ("set_scan_list", "ROUT:SCAN {channels}"),
    ("get_scan_list", "ROUT:SCAN?"),
    ("clear_scan_list", "ROUT:SCAN (@)"),
    ("set_channel_delay", "ROUT:CHAN:DEL {delay},{channels}"),
    ("get_channel_delay", "ROUT:CHAN:DEL? {channels}"),
    // Trigger
    ("set_trigger_source", "TRIG:SOUR {source}"),
    ("get_trigger_source", "TRIG:SOUR?"),
    ("set_trigger_count", "TRIG:COUN {count}"),
    ("get_trigger_count", "TRIG:COUN?"),
    ("set_trigger_delay", "TRIG:DEL {delay}"),
    ("get_trigger_delay", "TRIG:DEL?"),
    ("set_trigger_timer", "TRIG:TIM {interval}"),
    ("get_trigger_timer", "TRIG:TIM?"),
    // Acquisition
    ("initiate", "INIT"),
    ("abort", "ABOR"),
    ("trigger", "*TRG"),
    // Data retrieval
    ("read", "READ?"),
    ("fetch", "FETC?"),
    ("read_remove", "R? {max_readings}"),
    ("get_data_points", "DATA:POIN?"),
    ("clear_data", "DATA:DEL NVMEM"),
    // Immediate measurement
    ("measure_voltage_dc", "MEAS:VOLT:DC? {range},{resolution},{channels}"),
    ("measure_voltage_ac", "MEAS:VOLT:AC? {range},{resolution},{channels}"),
    ("measure_current_dc", "MEAS:CURR:DC? {range},{resolution},{channels}"),
    ("measure_current_ac", "MEAS:CURR:AC? {range},{resolution},{channels}"),
    ("measure_resistance_2w", "MEAS:RES? {range},{resolution},{channels}"),
    ("measure_resistance_4w", "MEAS:FRES? {range},{resolution},{channels}"),
    ("measure_frequency", "MEAS:FREQ? {range},{resolution},{channels}"),
    ("measure_period", "MEAS:PER? {range},{resolution},{channels}"),
    ("measure_temperature", "MEAS:TEMP? {sensor_type},{channels}"),
    ("get_scan_state", "ROUT:SCAN:STAT?"),
];

/// Keysight 34970A / DAQ970A series.
pub(super) const KEYSIGHT_DAQ: &[(&str, &str)] = &[
    ("configure_voltage_dc", "CONF:VOLT:DC {range},{resolution},{channels}"),
    ("configure_voltage_ac", "CONF:VOLT:AC {range},{resolution},{channels}"),
    ("configure_current_dc", "CONF:CURR:DC {range},{resolution},{channels}"),
    ("configure_current_ac", "CONF:CURR:AC {range},{resolution},{channels}"),
    ("configure_resistance_2w", "CONF:RES {range},{resolution},{channels}"),
    ("configure_resistance_4w", "CONF:FRES {range},{resolution},{channels}"),
    ("configure_temperature_tc", "CONF:TEMP TC,{tc_type},{channels}"),
    ("configure_temperature_rtd", "CONF:TEMP RTD,{rtd_type},{channels}"),
    ("configure_temperature_therm", "CONF:TEMP THER,{therm_type},{channels}"),
    ("set_sample_count", "SAMP:COUN {count}"),
    ("get_sample_count", "SAMP:COUN?"),
    ("set_trigger_source_immediate", "TRIG:SOUR IMM"),
    ("set_trigger_source_timer", "TRIG:SOUR TIM"),
    ("set_trigger_source_bus", "TRIG:SOUR BUS"),
    ("set_trigger_source_external", "TRIG:SOUR EXT"),
    // Reading format
    ("set_data_format", "FORM:READ:ALAR {state}"),
    ("set_data_timestamp", "FORM:READ:TIME {state}"),
    ("set_data_channel", "FORM:READ:CHAN {state}"),
    ("set_data_unit", "FORM:READ:UNIT {state}"),
    // Alarm limits
    ("set_alarm_high", "CALC:LIM:UPP {limit},{channels}"),
    ("get_alarm_high", "CALC:LIM:UPP? {channels}"),
    ("set_alarm_low", "CALC:LIM:LOW {limit},{channels}"),
    ("get_alarm_low", "CALC:LIM:LOW? {channels}"),
    ("set_alarm_enable", "CALC:LIM:STAT {state},{channels}"),
    ("get_alarm_enable", "CALC:LIM:STAT? {channels}"),
    // mx+b scaling
    ("set_scaling_gain", "CALC:SCAL:GAIN {gain},{channels}"),
    ("get_scaling_gain", "CALC:SCAL:GAIN? {channels}"),
    ("set_scaling_offset", "CALC:SCAL:OFFS {offset},{channels}"),
    ("get_scaling_offset", "CALC:SCAL:OFFS? {channels}"),
    ("set_scaling_enable", "CALC:SCAL:STAT {state},{channels}"),
    ("get_scaling_enable", "CALC:SCAL:STAT? {channels}"),
    // Digitize
    ("configure_digitize", "ACQ:VOLT:DC {range},{channels}"),
    ("set_digitize_rate", "ACQ:SRAT {rate}"),
    ("get_digitize_rate", "ACQ:SRAT?"),
    // Monitor
    ("set_monitor_channel", "ROUT:MON {channel}"),
    ("get_monitor_channel", "ROUT:MON?"),
    ("set_monitor_enable", "ROUT:MON:STAT {state}"),
    ("get_monitor_enable", "ROUT:MON:STAT?"),
    ("read_monitor", "ROUT:MON:DATA?"),
    ("get_module_info", "SYST:CTYP? {slot}"),
];
