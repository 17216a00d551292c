//! Layered configuration loading.

use serial_test::serial;
use std::io::Write;
use std::time::Duration;

use scpi_control::capability::DeviceFamily;
use scpi_control::config::Settings;
use scpi_control::transport::Resource;
use scpi_control::ErrorKind;

const SAMPLE: &str = r#"
[application]
log_level = "debug"

[connection]
timeout_ms = 2000

[[instruments]]
id = "scope"
family = "oscilloscope"
resource = "TCPIP0::192.168.1.50::5024::SOCKET"

[[instruments]]
id = "logger"
family = "daq"
resource = "192.168.1.60"
enabled = false
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn file_values_override_defaults() {
    let file = write_config(SAMPLE);
    let settings = Settings::load_from(file.path()).unwrap();

    assert_eq!(settings.application.log_level, "debug");
    assert_eq!(settings.application.name, "scpi-control");
    assert_eq!(settings.connection.timeout_ms, 2000);
    assert_eq!(settings.connection.settle_delay_ms, 10);
    assert_eq!(settings.instruments.len(), 2);
    assert_eq!(settings.instruments[1].family, DeviceFamily::DataLogger);
    assert_eq!(settings.enabled_instruments().len(), 1);

    let daq = settings.connection_settings(DeviceFamily::DataLogger);
    assert_eq!(daq.timeout, Duration::from_secs(2));
    assert_eq!(daq.port, 5025);
    assert_eq!(
        Resource::parse(&settings.instruments[1].resource, daq.port).unwrap(),
        Resource::Tcp {
            host: "192.168.1.60".to_string(),
            port: 5025
        }
    );
}

#[test]
#[serial]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_from(dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
#[serial]
fn environment_overrides_file() {
    let file = write_config(SAMPLE);
    std::env::set_var("SCPI_CONTROL_CONNECTION__TIMEOUT_MS", "750");
    std::env::set_var("SCPI_CONTROL_APPLICATION__LOG_LEVEL", "warn");
    let loaded = Settings::load_from(file.path());
    std::env::remove_var("SCPI_CONTROL_CONNECTION__TIMEOUT_MS");
    std::env::remove_var("SCPI_CONTROL_APPLICATION__LOG_LEVEL");

    let settings = loaded.unwrap();
    assert_eq!(settings.connection.timeout_ms, 750);
    assert_eq!(settings.application.log_level, "warn");
}

#[test]
#[serial]
fn invalid_values_are_rejected_on_load() {
    let file = write_config("[connection]\nraw_drain_timeout_ms = 0\n");
    let err = Settings::load_from(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("raw_drain_timeout_ms"));

    let file = write_config("[[instruments]]\nid = \"x\"\nfamily = \"toaster\"\nresource = \"mock://\"\n");
    assert!(Settings::load_from(file.path()).is_err());
}

#[test]
#[serial]
fn settings_round_trip_through_toml() {
    let file = write_config(SAMPLE);
    let settings = Settings::load_from(file.path()).unwrap();
    let rendered = toml::to_string(&settings).unwrap();
    let again = write_config(&rendered);
    assert_eq!(Settings::load_from(again.path()).unwrap(), settings);
}

#[test]
#[serial]
fn shipped_configuration_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/scpi_control.toml");
    let settings = Settings::load_from(path).unwrap();
    assert!(settings.instrument("bench_scope").is_some());
    assert_eq!(settings.enabled_instruments().len(), 1);
}
