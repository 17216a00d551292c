//! TCP transport against a loopback instrument.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use scpi_control::capability::{DeviceFamily, Variant};
use scpi_control::instrument::Instrument;
use scpi_control::transport::{ConnectionSettings, TcpTransport, Transport};
use scpi_control::waveform::{encode_block, SampleWidth};
use scpi_control::{ErrorKind, ScpiError};

type Handler = fn(&str) -> Option<Vec<u8>>;

/// Accept one client and answer each received line with `handler`'s bytes.
fn spawn_instrument(handler: Handler) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);
        let mut received = Vec::new();
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap_or(0) > 0 {
            let command = line.trim_end().to_string();
            if let Some(reply) = handler(&command) {
                if writer.write_all(&reply).is_err() {
                    break;
                }
            }
            received.push(command);
            line.clear();
        }
        received
    });
    (port, server)
}

fn settings(port: u16) -> ConnectionSettings {
    ConnectionSettings::new("127.0.0.1", port)
        .with_timeout(Duration::from_millis(500))
        .with_drain_timeout(Duration::from_millis(100))
}

fn siglent_scope(command: &str) -> Option<Vec<u8>> {
    let reply: &[u8] = match command {
        "*IDN?" => b"\0Siglent Technologies,SDS1104X-E,SDS00001,8.2.6.1.37R9\r\n",
        "C1:VDIV?" => b"C1:VDIV 5.00E-01V\n",
        "C1:OFST?" => b"C1:OFST 0.00E+00V\n",
        "TDIV?" => b"TDIV 1.00E-03S\n",
        "SARA?" => b"SARA 1.00E+03Sa/s\n",
        "C1:WF? DAT2" => {
            let mut block = b"C1:WF DAT2,".to_vec();
            block.extend_from_slice(&encode_block(&[0, 25, 50, 0xCE]));
            block.extend_from_slice(b"\n\n");
            return Some(block);
        }
        _ => return None,
    };
    Some(reply.to_vec())
}

#[test]
fn query_strips_nul_and_terminators() {
    let (port, server) = spawn_instrument(siglent_scope);
    let mut transport = TcpTransport::new(settings(port));
    transport.connect().unwrap();
    assert_eq!(
        transport.query("*IDN?").unwrap(),
        "Siglent Technologies,SDS1104X-E,SDS00001,8.2.6.1.37R9"
    );
    transport.disconnect();
    assert_eq!(server.join().unwrap(), vec!["*IDN?"]);
}

#[test]
fn facade_acquires_over_tcp() {
    let (port, server) = spawn_instrument(siglent_scope);
    let mut scope = Instrument::new(TcpTransport::new(settings(port)), DeviceFamily::Oscilloscope);
    scope.connect().unwrap();
    assert_eq!(scope.profile().unwrap().variant, Variant::SiglentSds);

    let block = scope.acquire_waveform(1, SampleWidth::Byte).unwrap();
    let expected = [0.0, 0.5, 1.0, -1.0];
    assert_eq!(block.voltages.len(), expected.len());
    for (v, e) in block.voltages.iter().zip(expected) {
        assert!((v - e).abs() < 1e-12, "{v} != {e}");
    }
    assert_eq!(block.sample_rate, 1000.0);

    scope.disconnect();
    let received = server.join().unwrap();
    assert_eq!(received.last().map(String::as_str), Some("C1:WF? DAT2"));
}

#[test]
fn silent_instrument_times_out_with_context() {
    let (port, server) = spawn_instrument(|_| None);
    let mut transport = TcpTransport::new(settings(port).with_timeout(Duration::from_millis(200)));
    transport.connect().unwrap();

    let err = transport.query("MEAS:VOLT? CH1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.is_retry_safe());
    let message = err.to_string();
    assert!(message.contains(&format!("127.0.0.1:{port}")), "{message}");
    assert!(message.contains("MEAS:VOLT? CH1"), "{message}");

    transport.disconnect();
    server.join().unwrap();
}

#[test]
fn raw_read_without_data_times_out() {
    let (port, server) = spawn_instrument(|_| None);
    let mut transport = TcpTransport::new(settings(port).with_timeout(Duration::from_millis(200)));
    transport.connect().unwrap();
    transport.write("C1:WF? DAT2").unwrap();
    let err = transport.read_raw(None).unwrap_err();
    assert!(matches!(err, ScpiError::Timeout { .. }));
    transport.disconnect();
    server.join().unwrap();
}

#[test]
fn sized_raw_read_returns_exact_bytes() {
    let (port, server) = spawn_instrument(|command| {
        (command == "DATA?").then(|| encode_block(b"abcdef"))
    });
    let mut transport = TcpTransport::new(settings(port));
    transport.connect().unwrap();
    transport.write("DATA?").unwrap();
    assert_eq!(transport.read_raw(Some(4)).unwrap(), b"#16a");
    assert_eq!(transport.read_raw(Some(5)).unwrap(), b"bcdef");
    transport.disconnect();
    server.join().unwrap();
}

#[test]
fn closed_connection_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        drop(stream);
    });

    let mut transport = TcpTransport::new(settings(port));
    transport.connect().unwrap();
    server.join().unwrap();

    let err = transport.read().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(!transport.is_connected());
}
