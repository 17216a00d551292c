use scpi_control::capability::ChannelSpec;
use scpi_control::validation::*;
use scpi_control::ErrorKind;

#[test]
fn test_is_valid_port() {
    assert!(is_valid_port(5025).is_ok());
    assert!(is_valid_port(0).is_err());
}

#[test]
fn test_is_valid_host() {
    assert!(is_valid_host("127.0.0.1").is_ok());
    assert!(is_valid_host("::1").is_ok());
    assert!(is_valid_host("scope-01.lab.local").is_ok());
    assert!(is_valid_host("256.0.0.1").is_err());
    assert!(is_valid_host("not a host").is_err());
    assert!(is_valid_host("-bad.example").is_err());
    assert!(is_valid_host("").is_err());
}

#[test]
fn test_is_in_range() {
    assert!(is_in_range(5, 1..=10).is_ok());
    assert!(is_in_range(11, 1..=10).is_err());
    assert!(is_in_range(0.5, 0.0..=1.0).is_ok());
}

#[test]
fn test_is_not_empty() {
    assert!(is_not_empty("hello").is_ok());
    assert!(is_not_empty("").is_err());
    assert!(is_not_empty("   ").is_err());
}

#[test]
fn test_supply_limits() {
    let spec = ChannelSpec::supply(3, 5.0, 3.2);
    assert!(check_voltage(&spec, 5.0).is_ok());
    assert!(check_current(&spec, 0.0).is_ok());

    let err = check_voltage(&spec, 5.1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert!(err.to_string().contains("channel 3"));
    assert!(check_current(&spec, 3.3).is_err());
}

#[test]
fn test_amplitude_window() {
    let spec = ChannelSpec::generator(1, 30e6, 20.0, 0.002, 10.0);
    assert!(check_amplitude(&spec, 0.002).is_ok());
    assert!(check_amplitude(&spec, 20.0).is_ok());
    assert!(check_amplitude(&spec, 0.001).is_err());
    assert!(check_amplitude(&spec, 20.5).is_err());
}

#[test]
fn test_phase_and_duty_cycle() {
    assert!(check_phase(0.0).is_ok());
    assert!(check_phase(360.0).is_ok());
    assert!(check_phase(-1.0).is_err());
    assert!(check_duty_cycle(50.0).is_ok());
    assert!(check_duty_cycle(100.1).is_err());
}
