//! IEEE-488.2 block decoding into voltage/time samples.
//!
//! A waveform query answers with an optional header, a definite-length block
//! `#<n><len><payload>` and possibly trailing terminators. Samples are signed
//! integer codes centred on zero:
//!
//! | width | sample type | codes per division |
//! |-------|-------------|--------------------|
//! | BYTE  | `i8`        | 25                 |
//! | WORD  | `i16` LE    | 6400               |
//!
//! `v[i] = code[i] * (scale / code_per_div) - offset`, and the time axis puts the
//! trigger at the record midpoint: `t[i] = i * dt - n * dt / 2`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{BlockError, Result, ScpiError};

/// Sample width of the waveform payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SampleWidth {
    /// One signed byte per sample
    #[default]
    Byte,
    /// Two bytes per sample, little-endian signed
    Word,
}

impl SampleWidth {
    /// Vertical codes per screen division.
    pub fn code_per_div(&self) -> f64 {
        match self {
            SampleWidth::Byte => 25.0,
            SampleWidth::Word => 6400.0,
        }
    }

    /// Bytes per sample.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleWidth::Byte => 1,
            SampleWidth::Word => 2,
        }
    }
}

impl std::str::FromStr for SampleWidth {
    type Err = ScpiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BYTE" | "8" => Ok(SampleWidth::Byte),
            "WORD" | "16" => Ok(SampleWidth::Word),
            other => Err(ScpiError::InvalidParameter(format!(
                "sample width must be BYTE or WORD, got '{other}'"
            ))),
        }
    }
}

/// Decoded waveform record. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveformBlock {
    /// Sample voltages (V)
    pub voltages: Vec<f64>,
    /// Sample times relative to the trigger (s)
    pub times: Vec<f64>,
    /// Source channel, when known
    pub channel: Option<u16>,
    /// Sa/s
    pub sample_rate: f64,
    /// Number of samples.
    pub record_length: usize,
    /// s/div
    pub timebase: f64,
    /// V/div
    pub voltage_scale: f64,
    /// V
    pub voltage_offset: f64,
}

impl WaveformBlock {
    /// Attach the source channel.
    pub fn with_channel(mut self, channel: u16) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Record duration (s).
    pub fn duration(&self) -> f64 {
        self.record_length as f64 / self.sample_rate
    }

    /// Write `time_s,voltage_v` rows preceded by `# key: value` metadata lines.
    #[cfg(feature = "storage_csv")]
    pub fn write_csv<W: std::io::Write>(&self, mut out: W) -> Result<()> {
        let channel = self
            .channel
            .map_or_else(|| "unknown".to_string(), |c| c.to_string());
        let header = [
            ("exported", chrono::Utc::now().to_rfc3339()),
            ("channel", channel),
            ("sample_rate", self.sample_rate.to_string()),
            ("record_length", self.record_length.to_string()),
            ("timebase", self.timebase.to_string()),
            ("voltage_scale", self.voltage_scale.to_string()),
            ("voltage_offset", self.voltage_offset.to_string()),
        ];
        for (key, value) in header {
            writeln!(out, "# {key}: {value}")?;
        }

        let mut writer = csv::Writer::from_writer(out);
        writer
            .write_record(["time_s", "voltage_v"])
            .map_err(|e| ScpiError::Export(e.to_string()))?;
        for (t, v) in self.times.iter().zip(&self.voltages) {
            writer
                .write_record([t.to_string(), v.to_string()])
                .map_err(|e| ScpiError::Export(e.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Create `path` and write the record as CSV.
    #[cfg(feature = "storage_csv")]
    pub fn save_csv<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(std::io::BufWriter::new(file))?;
        tracing::info!(path = %path.as_ref().display(), "Waveform exported");
        Ok(())
    }

    /// Stub when CSV support is compiled out.
    #[cfg(not(feature = "storage_csv"))]
    pub fn save_csv<P: AsRef<std::path::Path>>(&self, _path: P) -> Result<()> {
        Err(ScpiError::FeatureNotEnabled("storage_csv".to_string()))
    }
}

/// Locate the definite-length block in `raw` and return its payload.
///
/// Bytes after the declared length (line terminators) are ignored.
pub fn parse_block(raw: &[u8]) -> std::result::Result<&[u8], BlockError> {
    let marker = raw
        .iter()
        .position(|&b| b == b'#')
        .ok_or(BlockError::MissingMarker)?;

    let digit = *raw.get(marker + 1).ok_or(BlockError::NonNumericLengthDigit)?;
    if !digit.is_ascii_digit() {
        return Err(BlockError::NonNumericLengthDigit);
    }
    let width = usize::from(digit - b'0');
    if width == 0 {
        return Err(BlockError::ZeroLengthDigit);
    }

    let field_start = marker + 2;
    let field = raw
        .get(field_start..field_start + width)
        .ok_or(BlockError::TruncatedLengthField)?;
    if !field.iter().all(u8::is_ascii_digit) {
        return Err(BlockError::NonNumericLengthField);
    }
    let declared = field
        .iter()
        .try_fold(0usize, |acc, &b| {
            acc.checked_mul(10)?.checked_add(usize::from(b - b'0'))
        })
        .ok_or(BlockError::NonNumericLengthField)?;

    let data_start = field_start + width;
    let available = raw.len() - data_start;
    if declared > available {
        return Err(BlockError::LengthExceedsData {
            declared,
            available,
        });
    }
    Ok(&raw[data_start..data_start + declared])
}

/// Frame `payload` as `#<n><len><payload>`.
pub fn encode_block(payload: &[u8]) -> Vec<u8> {
    let len = payload.len().to_string();
    let mut out = Vec::with_capacity(2 + len.len() + payload.len());
    out.push(b'#');
    out.extend_from_slice(len.len().to_string().as_bytes());
    out.extend_from_slice(len.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Raw sample codes from a block payload.
pub fn sample_codes(payload: &[u8], width: SampleWidth) -> std::result::Result<Vec<i32>, BlockError> {
    match width {
        SampleWidth::Byte => Ok(payload.iter().map(|&b| i32::from(b as i8)).collect()),
        SampleWidth::Word => {
            if payload.len() % 2 != 0 {
                return Err(BlockError::OddWordLength(payload.len()));
            }
            Ok(payload
                .chunks_exact(2)
                .map(|pair| i32::from(i16::from_le_bytes([pair[0], pair[1]])))
                .collect())
        }
    }
}

/// Trigger-centred time axis for `n` samples.
pub fn time_axis(n: usize, sample_rate: f64) -> Vec<f64> {
    let dt = 1.0 / sample_rate;
    let half_span = n as f64 * dt / 2.0;
    (0..n).map(|i| i as f64 * dt - half_span).collect()
}

/// Decode a raw waveform response into voltages and times.
///
/// `timebase` is carried into the result for reference; the time axis is derived
/// from `sample_rate` alone.
pub fn decode(
    raw: &[u8],
    voltage_scale: f64,
    voltage_offset: f64,
    sample_rate: f64,
    timebase: f64,
    width: SampleWidth,
) -> Result<WaveformBlock> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(ScpiError::InvalidParameter(format!(
            "sample rate must be positive, got {sample_rate}"
        )));
    }

    let payload = parse_block(raw)?;
    let codes = sample_codes(payload, width)?;
    let volts_per_code = voltage_scale / width.code_per_div();
    let voltages: Vec<f64> = codes
        .iter()
        .map(|&code| f64::from(code) * volts_per_code - voltage_offset)
        .collect();
    let times = time_axis(voltages.len(), sample_rate);

    tracing::debug!(
        samples = voltages.len(),
        sample_rate,
        width = ?width,
        "Decoded waveform block"
    );

    Ok(WaveformBlock {
        record_length: voltages.len(),
        voltages,
        times,
        channel: None,
        sample_rate,
        timebase,
        voltage_scale,
        voltage_offset,
    })
}

const NUMBER: &str = r"([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)";

fn quantity_regex(unit: &str) -> Regex {
    // Optional echoed header ("C1:VDIV ", "SARA "), value, optional unit.
    let pattern = format!(r"(?i)^\s*(?:\S+\s+)?{NUMBER}\s*(?:{unit})?\s*$");
    Regex::new(&pattern).expect("Invalid quantity regex")
}

static VOLTS: Lazy<Regex> = Lazy::new(|| quantity_regex("V"));
static SECONDS: Lazy<Regex> = Lazy::new(|| quantity_regex("S"));
static SAMPLES: Lazy<Regex> = Lazy::new(|| quantity_regex("([kmg])?SA/S"));

fn parse_quantity(re: &Regex, response: &str, quantity: &'static str) -> Result<f64> {
    let error = || ScpiError::Response {
        quantity,
        response: response.to_string(),
    };
    let caps = re.captures(response).ok_or_else(error)?;
    let value: f64 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(error)?;
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(prefix) if prefix == "k" => 1e3,
        Some(prefix) if prefix == "m" => 1e6,
        Some(prefix) if prefix == "g" => 1e9,
        _ => 1.0,
    };
    Ok(value * multiplier)
}

/// Parse a `VDIV?` response such as `C1:VDIV 2.00E+00V`.
pub fn parse_voltage_scale(response: &str) -> Result<f64> {
    parse_quantity(&VOLTS, response, "voltage scale")
}

/// Parse an `OFST?` response such as `C1:OFST -5.00E-01V`.
pub fn parse_voltage_offset(response: &str) -> Result<f64> {
    parse_quantity(&VOLTS, response, "voltage offset")
}

/// Parse a `TDIV?` response such as `TDIV 1.00E-03S`.
pub fn parse_timebase(response: &str) -> Result<f64> {
    parse_quantity(&SECONDS, response, "timebase")
}

/// Parse a `SARA?` response such as `SARA 1.00E+09Sa/s` or `SARA 1.00GSa/s`.
pub fn parse_sample_rate(response: &str) -> Result<f64> {
    parse_quantity(&SAMPLES, response, "sample rate")
}
