//! # SCPI Control Library
//!
//! Protocol substrate for talking to bench instruments over SCPI: oscilloscopes,
//! function generators, power supplies and data loggers. The library turns
//! symbolic operations into vendor-correct command strings, detects what a
//! connected instrument can do from its `*IDN?` reply, and decodes binary
//! waveform transfers into calibrated voltage and time series.
//!
//! ## Crate Structure
//!
//! - **`transport`**: The `Transport` trait and its TCP, serial and in-memory
//!   implementations. Line-oriented request/response with timeouts.
//! - **`catalog`**: Per-family command tables with vendor overrides. See
//!   `catalog::CommandCatalog`.
//! - **`capability`**: Model registries and `*IDN?` based profile detection with a
//!   generic fallback. See `capability::CapabilityRegistry`.
//! - **`waveform`**: IEEE-488.2 definite-length block parsing and sample scaling.
//! - **`reading`**: Data-logger readings parsed from comma-separated responses.
//! - **`instrument`**: The `Instrument` facade composing the pieces above.
//! - **`config`**: Figment-based settings from TOML and environment variables.
//! - **`tracing_setup`**: Subscriber installation for binaries.
//! - **`validation`**: Configuration and setpoint checks.
//! - **`error`**: The crate-wide `ScpiError` taxonomy.

pub mod capability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod instrument;
pub mod reading;
pub mod tracing_setup;
pub mod transport;
pub mod validation;
pub mod waveform;

pub use capability::{CapabilityProfile, CapabilityRegistry, DeviceFamily, Variant};
pub use catalog::{CommandCatalog, Params};
pub use error::{ErrorKind, Result, ScpiError};
pub use instrument::Instrument;
pub use reading::Reading;
pub use transport::{open_transport, ConnectionSettings, Transport};
pub use waveform::{SampleWidth, WaveformBlock};
