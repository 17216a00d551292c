//! Deterministic in-memory transport.
//!
//! [`MockTransport`] behaves like a Siglent SDS oscilloscope and SPD power supply
//! sharing one socket. It provides:
//! - State for the common scope and supply set commands, answered by their queries
//!   in the instrument's own number format
//! - Canned responses keyed by exact command text
//! - Framed waveform blocks per channel for `read_raw`
//! - One-shot connect failure injection
//! - Write/query logs for test verification through a [`MockHandle`]
//!
//! Queries with no state and no canned response answer with an empty line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::Transport;
use crate::error::{Result, ScpiError};
use crate::waveform::encode_block;

/// Identity reported by a default mock.
pub const MOCK_IDN: &str = "Siglent Technologies,SDS1104X-E,MOCK0001,1.0.0.0";

const MOCK_ENDPOINT: &str = "mock-scope:0";
const DEFAULT_PAYLOAD: [u8; 4] = [0, 25, 50, 75];

macro_rules! command_regex {
    ($pattern:expr) => {
        Lazy::new(|| Regex::new(concat!("(?i)^", $pattern, "$")).expect("Invalid mock command regex"))
    };
}

static SET_VDIV: Lazy<Regex> = command_regex!(r"C(\d+):VDIV\s+(.+)");
static SET_OFST: Lazy<Regex> = command_regex!(r"C(\d+):OFST\s+(.+)");
static SET_TRA: Lazy<Regex> = command_regex!(r"C(\d+):TRA\s+(ON|OFF)");
static SET_TRLV: Lazy<Regex> = command_regex!(r"C(\d+):TRLV\s+(.+)");
static GET_VDIV: Lazy<Regex> = command_regex!(r"C(\d+):VDIV\?");
static GET_OFST: Lazy<Regex> = command_regex!(r"C(\d+):OFST\?");
static GET_TRA: Lazy<Regex> = command_regex!(r"C(\d+):TRA\?");
static GET_TRLV: Lazy<Regex> = command_regex!(r"C(\d+):TRLV\?");
static GET_WF: Lazy<Regex> =
    command_regex!(r"(?:C(\d+):WF\?.*|:WAV:SOUR\s+CHAN(\d+);:WAV:DATA\?)");
static SET_SUPPLY: Lazy<Regex> = command_regex!(r"(?:CH|SOUR)(\d+):(VOLT|CURR)\s+(.+)");
static GET_SUPPLY: Lazy<Regex> = command_regex!(r"(?:CH|SOUR)(\d+):(VOLT|CURR)\?");
static SET_OUTPUT: Lazy<Regex> = command_regex!(r"OUTP(?:UT)?\s+CH(\d+),\s*(ON|OFF)");
static MEASURE_NUMBERED: Lazy<Regex> = command_regex!(r"MEAS(?:URE)?(\d+):(VOLT|CURR|POW)\w*\?");
static MEASURE_CHANNEL: Lazy<Regex> = command_regex!(r"MEAS(?:URE)?:(VOLT|CURR|POW)\w*\?\s*CH(\d+)");

/// Format `value` the way Siglent firmware does: two decimals, signed two-digit
/// exponent, unit suffix (`1.00E+03SA/S`).
pub fn siglent_sci(value: f64, unit: &str) -> String {
    let formatted = format!("{value:.2E}");
    match formatted.split_once('E') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}E{sign}{:02}{unit}", exponent.abs())
        }
        None => format!("{formatted}{unit}"),
    }
}

/// Leading numeric part of a set-command argument (`"2.0V"` -> 2.0).
fn parse_setting(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Ok(v) = value.parse() {
        return Some(v);
    }
    let end = value
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_ascii_digit() || *c == '.')
        .map(|(i, c)| i + c.len_utf8())?;
    value[..end].parse().ok()
}

#[derive(Debug, Clone)]
struct ScopeChannel {
    enabled: bool,
    voltage_scale: f64,
    voltage_offset: f64,
    trigger_level: f64,
    payload: Vec<u8>,
}

impl Default for ScopeChannel {
    fn default() -> Self {
        Self {
            enabled: true,
            voltage_scale: 1.0,
            voltage_offset: 0.0,
            trigger_level: 0.0,
            payload: DEFAULT_PAYLOAD.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SupplyChannel {
    voltage: f64,
    current: f64,
    output: bool,
}

#[derive(Debug)]
struct MockState {
    idn: String,
    channels: BTreeMap<u16, ScopeChannel>,
    supplies: BTreeMap<u16, SupplyChannel>,
    load_resistance: f64,
    sample_rate: f64,
    timebase: f64,
    trigger_mode: String,
    trigger_type: String,
    trigger_source: String,
    trigger_status: VecDeque<String>,
    device_errors: VecDeque<(i32, String)>,
    custom_responses: HashMap<String, VecDeque<String>>,
    pending: VecDeque<String>,
    last_waveform_channel: Option<u16>,
    writes: Vec<String>,
    queries: Vec<String>,
    timebase_updates: Vec<f64>,
    waveform_requests: Vec<u16>,
    fail_next_connect: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            idn: MOCK_IDN.to_string(),
            channels: (1..=4).map(|ch| (ch, ScopeChannel::default())).collect(),
            supplies: (1..=3).map(|ch| (ch, SupplyChannel::default())).collect(),
            load_resistance: 10.0,
            sample_rate: 1_000.0,
            timebase: 1e-3,
            trigger_mode: "STOP".to_string(),
            trigger_type: "EDGE".to_string(),
            trigger_source: "C1".to_string(),
            trigger_status: VecDeque::from(["Stop".to_string()]),
            device_errors: VecDeque::new(),
            custom_responses: HashMap::new(),
            pending: VecDeque::new(),
            last_waveform_channel: None,
            writes: Vec::new(),
            queries: Vec::new(),
            timebase_updates: Vec::new(),
            waveform_requests: Vec::new(),
            fail_next_connect: false,
        }
    }
}

/// Pop from a sequence, leaving the last entry in place.
fn next_sticky(queue: &mut VecDeque<String>) -> Option<String> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

fn channel_of(caps: &regex::Captures<'_>) -> u16 {
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

impl MockState {
    fn apply_write(&mut self, command: &str) {
        let upper = command.to_ascii_uppercase();

        if let Some(value) = upper.strip_prefix("TDIV ") {
            if let Some(v) = parse_setting(value) {
                self.timebase = v;
            }
            self.timebase_updates.push(self.timebase);
        } else if let Some(caps) = SET_VDIV.captures(command) {
            if let Some(v) = parse_setting(&caps[2]) {
                self.channels.entry(channel_of(&caps)).or_default().voltage_scale = v;
            }
        } else if let Some(caps) = SET_OFST.captures(command) {
            if let Some(v) = parse_setting(&caps[2]) {
                self.channels.entry(channel_of(&caps)).or_default().voltage_offset = v;
            }
        } else if let Some(caps) = SET_TRA.captures(command) {
            self.channels.entry(channel_of(&caps)).or_default().enabled =
                caps[2].eq_ignore_ascii_case("ON");
        } else if let Some(mode) = upper.strip_prefix("TRIG_MODE ") {
            self.trigger_mode = mode.trim().to_string();
        } else if let Some(params) = upper.strip_prefix("TRIG_SELECT ") {
            let fields: Vec<&str> = params.split(',').map(str::trim).collect();
            if let [kind, _, source] = fields.as_slice() {
                self.trigger_type = kind.to_string();
                self.trigger_source = source.to_string();
            }
        } else if upper == "ARM" {
            if self.trigger_status.len() <= 1 {
                self.trigger_status = VecDeque::from(["Run".to_string(), "Stop".to_string()]);
            }
        } else if let Some(caps) = SET_TRLV.captures(command) {
            if let Some(v) = parse_setting(&caps[2]) {
                self.channels.entry(channel_of(&caps)).or_default().trigger_level = v;
            }
        } else if let Some(caps) = SET_SUPPLY.captures(command) {
            if let Some(v) = parse_setting(&caps[3]) {
                let supply = self.supplies.entry(channel_of(&caps)).or_default();
                if caps[2].eq_ignore_ascii_case("VOLT") {
                    supply.voltage = v;
                } else {
                    supply.current = v;
                }
            }
        } else if let Some(caps) = SET_OUTPUT.captures(command) {
            self.supplies.entry(channel_of(&caps)).or_default().output =
                caps[2].eq_ignore_ascii_case("ON");
        }
    }

    fn respond(&mut self, command: &str) -> String {
        if let Some(queue) = self.custom_responses.get_mut(command) {
            if let Some(response) = next_sticky(queue) {
                return response;
            }
        }

        let upper = command.to_ascii_uppercase();
        match upper.as_str() {
            "*IDN?" => return self.idn.clone(),
            "*OPC?" => return "1".to_string(),
            "SYST:ERR?" | "SYSTEM:ERROR?" | "SYST:ERR:NEXT?" => {
                return match self.device_errors.pop_front() {
                    Some((code, message)) => format!("{code:+},\"{message}\""),
                    None => "+0,\"No error\"".to_string(),
                };
            }
            ":TRIG:STAT?" | "TRIG:STAT?" => {
                return next_sticky(&mut self.trigger_status).unwrap_or_default();
            }
            "TRIG_MODE?" => return self.trigger_mode.clone(),
            "TRIG_SELECT?" => {
                return format!("{},SR,{}", self.trigger_type, self.trigger_source);
            }
            "TDIV?" => return format!("TDIV {}", siglent_sci(self.timebase, "S")),
            "SARA?" => return format!("SARA {}", siglent_sci(self.sample_rate, "SA/S")),
            _ => {}
        }

        if let Some(caps) = GET_VDIV.captures(command) {
            let ch = channel_of(&caps);
            let scale = self.channels.get(&ch).map_or(1.0, |c| c.voltage_scale);
            return format!("C{ch}:VDIV {}", siglent_sci(scale, "V"));
        }
        if let Some(caps) = GET_OFST.captures(command) {
            let ch = channel_of(&caps);
            let offset = self.channels.get(&ch).map_or(0.0, |c| c.voltage_offset);
            return format!("C{ch}:OFST {}", siglent_sci(offset, "V"));
        }
        if let Some(caps) = GET_TRA.captures(command) {
            let enabled = self.channels.get(&channel_of(&caps)).map_or(true, |c| c.enabled);
            return if enabled { "ON" } else { "OFF" }.to_string();
        }
        if let Some(caps) = GET_TRLV.captures(command) {
            let ch = channel_of(&caps);
            let level = self.channels.get(&ch).map_or(0.0, |c| c.trigger_level);
            return format!("C{ch}:TRLV {}", siglent_sci(level, "V"));
        }
        if let Some(caps) = GET_SUPPLY.captures(command) {
            let supply = self.supplies.get(&channel_of(&caps)).cloned().unwrap_or_default();
            let value = if caps[2].eq_ignore_ascii_case("VOLT") {
                supply.voltage
            } else {
                supply.current
            };
            return format!("{value:.3}");
        }
        if let Some(caps) = MEASURE_NUMBERED.captures(command) {
            return self.measure_supply(channel_of(&caps), &caps[2]);
        }
        if let Some(caps) = MEASURE_CHANNEL.captures(command) {
            let ch = caps
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            return self.measure_supply(ch, &caps[1]);
        }

        String::new()
    }

    /// Output voltage follows the setpoint into a resistive load, limited by the
    /// current setpoint.
    fn measure_supply(&self, channel: u16, quantity: &str) -> String {
        let supply = self.supplies.get(&channel).cloned().unwrap_or_default();
        let (voltage, current) = if supply.output {
            let current = (supply.voltage / self.load_resistance).min(supply.current);
            (current * self.load_resistance, current)
        } else {
            (0.0, 0.0)
        };
        let value = match quantity.to_ascii_uppercase().as_str() {
            "VOLT" => voltage,
            "CURR" => current,
            _ => voltage * current,
        };
        format!("{value:.3}")
    }

    fn waveform_block(&self, size: Option<usize>) -> Vec<u8> {
        let channel = self
            .last_waveform_channel
            .or_else(|| self.channels.keys().next().copied());
        let payload = channel
            .and_then(|ch| self.channels.get(&ch))
            .map(|c| c.payload.as_slice())
            .unwrap_or(&[]);
        let mut block = b"DESC,".to_vec();
        block.extend_from_slice(&encode_block(payload));
        if let Some(size) = size {
            block.truncate(size);
        }
        block
    }
}

/// Shared view of a [`MockTransport`]'s state, usable after the transport has been
/// moved into an instrument.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every command written, in order, without terminators.
    pub fn writes(&self) -> Vec<String> {
        self.state().writes.clone()
    }

    /// Every query (command containing `?`) written, in order.
    pub fn queries(&self) -> Vec<String> {
        self.state().queries.clone()
    }

    /// Clear the write and query logs.
    pub fn clear_logs(&self) {
        let mut state = self.state();
        state.writes.clear();
        state.queries.clear();
        state.timebase_updates.clear();
        state.waveform_requests.clear();
    }

    /// Channels requested with `C<n>:WF?`, in order.
    pub fn waveform_requests(&self) -> Vec<u16> {
        self.state().waveform_requests.clone()
    }

    /// Timebase after each `TDIV` write.
    pub fn timebase_updates(&self) -> Vec<f64> {
        self.state().timebase_updates.clone()
    }

    /// Answer `command` with `response` from now on.
    pub fn set_response(&self, command: &str, response: &str) {
        self.set_responses(command, &[response]);
    }

    /// Answer `command` with each response in turn; the last one repeats.
    pub fn set_responses(&self, command: &str, responses: &[&str]) {
        self.state().custom_responses.insert(
            command.trim().to_string(),
            responses.iter().map(|r| r.to_string()).collect(),
        );
    }

    /// Replace the identification string.
    pub fn set_idn(&self, idn: &str) {
        self.state().idn = idn.to_string();
    }

    /// Raw sample bytes returned for `channel`'s waveform query.
    pub fn set_waveform(&self, channel: u16, payload: &[u8]) {
        self.state().channels.entry(channel).or_default().payload = payload.to_vec();
    }

    /// Sample rate reported by `SARA?`.
    pub fn set_sample_rate(&self, sample_rate: f64) {
        self.state().sample_rate = sample_rate;
    }

    /// Queue an error for the next `SYST:ERR?`.
    pub fn push_device_error(&self, code: i32, message: &str) {
        self.state()
            .device_errors
            .push_back((code, message.to_string()));
    }

    /// Fail the next `connect` call only.
    pub fn trigger_failure(&self) {
        self.state().fail_next_connect = true;
    }

    /// Current timebase in s/div.
    pub fn timebase(&self) -> f64 {
        self.state().timebase
    }

    /// Current V/div of `channel`.
    pub fn voltage_scale(&self, channel: u16) -> Option<f64> {
        self.state().channels.get(&channel).map(|c| c.voltage_scale)
    }

    /// Current offset of `channel`.
    pub fn voltage_offset(&self, channel: u16) -> Option<f64> {
        self.state().channels.get(&channel).map(|c| c.voltage_offset)
    }

    /// Trace display state of `channel`.
    pub fn channel_enabled(&self, channel: u16) -> Option<bool> {
        self.state().channels.get(&channel).map(|c| c.enabled)
    }

    /// Trigger sweep mode.
    pub fn trigger_mode(&self) -> String {
        self.state().trigger_mode.clone()
    }

    /// Trigger source channel.
    pub fn trigger_source(&self) -> String {
        self.state().trigger_source.clone()
    }

    /// Supply setpoints `(voltage, current, output)` for `channel`.
    pub fn supply(&self, channel: u16) -> Option<(f64, f64, bool)> {
        self.state()
            .supplies
            .get(&channel)
            .map(|s| (s.voltage, s.current, s.output))
    }
}

/// Mock transport for testing.
///
/// # Example
///
/// ```
/// use scpi_control::transport::{MockTransport, Transport};
///
/// let mut mock = MockTransport::new();
/// mock.connect().unwrap();
/// mock.write("TDIV 2E-3").unwrap();
/// assert_eq!(mock.query("TDIV?").unwrap(), "TDIV 2.00E-03S");
/// ```
#[derive(Debug)]
pub struct MockTransport {
    connected: bool,
    handle: MockHandle,
}

impl MockTransport {
    /// A disconnected mock with default scope and supply state.
    pub fn new() -> Self {
        Self {
            connected: false,
            handle: MockHandle {
                state: Arc::new(Mutex::new(MockState::default())),
            },
        }
    }

    /// Report `idn` from `*IDN?`.
    pub fn with_idn(self, idn: &str) -> Self {
        self.handle.set_idn(idn);
        self
    }

    /// Scope channels `1..=count`, replacing the default two.
    pub fn with_channels(self, count: u16) -> Self {
        self.handle.state().channels = (1..=count).map(|ch| (ch, ScopeChannel::default())).collect();
        self
    }

    /// Answer `command` with `response`.
    pub fn with_response(self, command: &str, response: &str) -> Self {
        self.handle.set_response(command, response);
        self
    }

    /// Sample bytes for `channel`'s waveform.
    pub fn with_waveform(self, channel: u16, payload: &[u8]) -> Self {
        self.handle.set_waveform(channel, payload);
        self
    }

    /// Voltage scale for `channel`.
    pub fn with_voltage_scale(self, channel: u16, scale: f64) -> Self {
        self.handle.state().channels.entry(channel).or_default().voltage_scale = scale;
        self
    }

    /// Voltage offset for `channel`.
    pub fn with_voltage_offset(self, channel: u16, offset: f64) -> Self {
        self.handle.state().channels.entry(channel).or_default().voltage_offset = offset;
        self
    }

    /// Sample rate and timebase.
    pub fn with_acquisition(self, sample_rate: f64, timebase: f64) -> Self {
        {
            let mut state = self.handle.state();
            state.sample_rate = sample_rate;
            state.timebase = timebase;
        }
        self
    }

    /// Sequence answered by the trigger-status query; the last entry repeats.
    pub fn with_trigger_status(self, statuses: &[&str]) -> Self {
        self.handle.state().trigger_status = statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Shared view of this mock's state and logs.
    pub fn handle(&self) -> MockHandle {
        self.handle.clone()
    }

    fn ensure_connected(&self, command: Option<&str>) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(ScpiError::not_connected(MOCK_ENDPOINT, command))
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn connect(&mut self) -> Result<()> {
        let fail = std::mem::take(&mut self.handle.state().fail_next_connect);
        if fail {
            return Err(ScpiError::Connection {
                endpoint: MOCK_ENDPOINT.to_string(),
                command: None,
                message: "mock connection failure".to_string(),
            });
        }
        self.connected = true;
        tracing::info!(endpoint = MOCK_ENDPOINT, "Mock transport connected");
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.handle.state().pending.clear();
            tracing::info!(endpoint = MOCK_ENDPOINT, "Mock transport disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn write(&mut self, command: &str) -> Result<()> {
        self.ensure_connected(Some(command))?;
        let command = command.trim();
        let mut state = self.handle.state();
        state.writes.push(command.to_string());

        if let Some(caps) = GET_WF.captures(command) {
            let channel = channel_of(&caps);
            state.last_waveform_channel = Some(channel);
            state.waveform_requests.push(channel);
        } else if command.contains('?') {
            state.queries.push(command.to_string());
            let response = state.respond(command);
            state.pending.push_back(response);
        } else {
            state.apply_write(command);
        }
        tracing::debug!(endpoint = MOCK_ENDPOINT, command = %command, "Sent command");
        Ok(())
    }

    fn read(&mut self) -> Result<String> {
        self.ensure_connected(None)?;
        let mut state = self.handle.state();
        match state.pending.pop_front() {
            Some(response) => Ok(response),
            None => Err(ScpiError::Timeout {
                endpoint: MOCK_ENDPOINT.to_string(),
                command: state.writes.last().cloned(),
                timeout: Duration::ZERO,
            }),
        }
    }

    fn read_raw(&mut self, size: Option<usize>) -> Result<Vec<u8>> {
        self.ensure_connected(None)?;
        Ok(self.handle.state().waveform_block(size))
    }

    fn endpoint(&self) -> String {
        MOCK_ENDPOINT.to_string()
    }

    fn settle_delay(&self) -> Duration {
        Duration::ZERO
    }
}
