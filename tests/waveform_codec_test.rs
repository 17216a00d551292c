//! Block framing and sample scaling.

use scpi_control::error::BlockError;
use scpi_control::waveform::{decode, encode_block, parse_block, SampleWidth};
use scpi_control::{ErrorKind, ScpiError};

fn with_header(payload: &[u8]) -> Vec<u8> {
    let mut raw = b"DESC,".to_vec();
    raw.extend_from_slice(&encode_block(payload));
    raw
}

#[test]
fn byte_block_decodes_to_divisions() {
    let mut raw = b"DESC,#14".to_vec();
    raw.extend_from_slice(&[0, 25, 50, 75]);
    let block = decode(&raw, 1.0, 0.0, 1000.0, 1e-3, SampleWidth::Byte).unwrap();
    assert_eq!(block.voltages, vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(block.record_length, 4);
    assert_eq!(block.times.len(), 4);
}

#[test]
fn word_block_is_little_endian_signed() {
    let mut payload = Vec::new();
    for code in [6400i16, -6400, 3200] {
        payload.extend_from_slice(&code.to_le_bytes());
    }
    let block = decode(&with_header(&payload), 2.0, 0.0, 1e6, 1e-6, SampleWidth::Word).unwrap();
    let expected = [2.0, -2.0, 1.0];
    for (v, e) in block.voltages.iter().zip(expected) {
        assert!((v - e).abs() < 1e-12, "{v} != {e}");
    }
}

#[test]
fn trailing_terminator_is_ignored() {
    let mut raw = with_header(&[25, 25]);
    raw.extend_from_slice(b"\n\n");
    let block = decode(&raw, 1.0, 0.0, 100.0, 0.0, SampleWidth::Byte).unwrap();
    assert_eq!(block.voltages.len(), 2);
}

#[test]
fn time_axis_is_trigger_centred() {
    let block = decode(&with_header(&[0; 4]), 1.0, 0.0, 1000.0, 1e-3, SampleWidth::Byte).unwrap();
    let expected = [-0.002, -0.001, 0.0, 0.001];
    for (t, e) in block.times.iter().zip(expected) {
        assert!((t - e).abs() < 1e-12, "{t} != {e}");
    }
    assert!((block.duration() - 0.004).abs() < 1e-12);
}

#[test]
fn empty_block_yields_empty_record() {
    let block = decode(b"#10", 1.0, 0.0, 1000.0, 0.0, SampleWidth::Byte).unwrap();
    assert!(block.voltages.is_empty());
    assert!(block.times.is_empty());
}

#[test]
fn framing_errors_are_distinguished() {
    let cases: [(&[u8], BlockError); 5] = [
        (&b""[..], BlockError::MissingMarker),
        (&b"DESC,no block"[..], BlockError::MissingMarker),
        (&b"#04"[..], BlockError::ZeroLengthDigit),
        (&b"#x4"[..], BlockError::NonNumericLengthDigit),
        (&b"#3"[..], BlockError::TruncatedLengthField),
    ];
    for (raw, expected) in cases {
        assert_eq!(parse_block(raw).unwrap_err(), expected, "{raw:?}");
    }
    assert_eq!(parse_block(b"#2a4").unwrap_err(), BlockError::NonNumericLengthField);
    assert_eq!(
        parse_block(b"#18abc").unwrap_err(),
        BlockError::LengthExceedsData {
            declared: 8,
            available: 3
        }
    );
}

#[test]
fn odd_word_payload_is_rejected() {
    let err = decode(&with_header(&[1, 2, 3]), 1.0, 0.0, 1.0, 0.0, SampleWidth::Word).unwrap_err();
    assert!(matches!(err, ScpiError::Block(BlockError::OddWordLength(3))));
    assert_eq!(err.kind(), ErrorKind::Command);
}

#[test]
fn byte_round_trip_within_one_code_step() {
    let scale = 0.5;
    let offset = 0.1;
    let step = scale / SampleWidth::Byte.code_per_div();
    let originals: Vec<f64> = (-10..=10).map(|i| f64::from(i) * 0.05).collect();
    let payload: Vec<u8> = originals
        .iter()
        .map(|v| (((v + offset) / step).round() as i8) as u8)
        .collect();
    let block = decode(&with_header(&payload), scale, offset, 1e3, 0.0, SampleWidth::Byte).unwrap();
    for (decoded, original) in block.voltages.iter().zip(&originals) {
        assert!((decoded - original).abs() <= step, "{decoded} vs {original}");
    }
}

#[test]
fn non_positive_sample_rate_is_invalid() {
    let err = decode(&with_header(&[0]), 1.0, 0.0, 0.0, 0.0, SampleWidth::Byte).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[cfg(feature = "storage_csv")]
#[test]
fn csv_export_has_metadata_and_rows() {
    let block = decode(&with_header(&[0, 25]), 1.0, 0.0, 1000.0, 1e-3, SampleWidth::Byte)
        .unwrap()
        .with_channel(2);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ch2.csv");
    block.save_csv(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("# channel: 2"));
    assert!(contents.contains("time_s,voltage_v"));
    let rows: Vec<&str> = contents.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], "0,1");
}
