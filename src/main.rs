//! CLI Entry Point for scpi-control
//!
//! Provides command-line access to:
//! - Identifying an instrument and showing its detected capability profile
//! - Sending literal SCPI commands and queries
//! - Resolving symbolic operations without any hardware attached
//! - Acquiring oscilloscope waveforms, optionally saved as CSV
//! - Listing the models each family registry knows
//!
//! # Usage
//!
//! ```bash
//! scpi-control identify 192.168.1.50 --family scope
//! scpi-control query TCPIP0::192.168.1.60::5025::SOCKET "MEAS:VOLT:DC? (@101)" --family daq
//! scpi-control resolve --family psu --variant siglent_spd set_voltage ch=1 voltage=5
//! scpi-control acquire mock:// --channel 1 --width byte --output ch1.csv
//! scpi-control models --family awg
//! scpi-control models --manufacturer keysight
//! ```
//!
//! A resource may also name an instrument `id` from the configuration file, in
//! which case its family and resource string come from there.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scpi_control::capability::{CapabilityRegistry, DeviceFamily, Variant};
use scpi_control::catalog::{CommandCatalog, Params};
use scpi_control::config::{Settings, DEFAULT_CONFIG_PATH};
use scpi_control::instrument::Instrument;
use scpi_control::tracing_setup::{self, parse_log_level, OutputFormat, TracingConfig};
use scpi_control::transport::{open_transport, Transport};
use scpi_control::waveform::SampleWidth;

#[derive(Parser)]
#[command(name = "scpi-control")]
#[command(about = "SCPI instrument control over TCP and serial", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true, default_value = "compact")]
    log_format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect, identify and print the detected profile
    Identify {
        /// Resource string or configured instrument id
        resource: String,

        /// Device family used for detection
        #[arg(long, default_value = "oscilloscope")]
        family: DeviceFamily,
    },

    /// Send a literal command; commands containing `?` print the response
    Query {
        /// Resource string or configured instrument id
        resource: String,

        /// SCPI command text
        command: String,

        /// Device family, selects the default port
        #[arg(long, default_value = "oscilloscope")]
        family: DeviceFamily,
    },

    /// Resolve a symbolic operation to its command string
    Resolve {
        #[arg(long)]
        family: DeviceFamily,

        #[arg(long, default_value = "generic")]
        variant: Variant,

        /// Operation name, e.g. `set_voltage`
        operation: String,

        /// Template parameters as `key=value`
        params: Vec<String>,
    },

    /// Acquire one oscilloscope channel
    Acquire {
        /// Resource string or configured instrument id
        resource: String,

        #[arg(long, default_value = "1")]
        channel: u16,

        /// Sample width (byte or word)
        #[arg(long, default_value = "byte")]
        width: SampleWidth,

        /// Write time/voltage pairs to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List the models a family registry knows
    Models {
        #[arg(long)]
        family: Option<DeviceFamily>,

        /// Only list models from this manufacturer
        #[arg(long)]
        manufacturer: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let level = match &cli.log_level {
        Some(level) => parse_log_level(level)?,
        None => parse_log_level(&settings.application.log_level)?,
    };
    tracing_setup::init(TracingConfig::new(level).with_format(cli.log_format))?;

    match cli.command {
        Commands::Identify { resource, family } => identify(&settings, &resource, family),
        Commands::Query {
            resource,
            command,
            family,
        } => query(&settings, &resource, &command, family),
        Commands::Resolve {
            family,
            variant,
            operation,
            params,
        } => resolve(family, variant, &operation, &params),
        Commands::Acquire {
            resource,
            channel,
            width,
            output,
        } => acquire(&settings, &resource, channel, width, output),
        Commands::Models {
            family,
            manufacturer,
        } => models(family, manufacturer.as_deref()),
    }
}

/// Configured instrument ids take precedence over literal resource strings.
fn target(settings: &Settings, resource: &str, family: DeviceFamily) -> (String, DeviceFamily) {
    match settings.instrument(resource) {
        Some(definition) => (definition.resource.clone(), definition.family),
        None => (resource.to_string(), family),
    }
}

fn connect(
    settings: &Settings,
    resource: &str,
    family: DeviceFamily,
) -> Result<Instrument<Box<dyn Transport>>> {
    let (resource, family) = target(settings, resource, family);
    let transport = open_transport(&resource, &settings.connection_settings(family))?;
    let mut instrument = Instrument::new(transport, family);
    instrument
        .connect()
        .with_context(|| format!("connecting to {resource}"))?;
    Ok(instrument)
}

fn identify(settings: &Settings, resource: &str, family: DeviceFamily) -> Result<()> {
    let instrument = connect(settings, resource, family)?;
    let profile = instrument
        .profile()
        .ok_or_else(|| anyhow!("instrument reported no profile"))?;

    println!("IDN:      {}", instrument.idn().unwrap_or_default());
    println!("Model:    {} {}", profile.manufacturer, profile.model_name);
    println!("Family:   {}", profile.family);
    println!("Variant:  {}", profile.variant);
    println!("Channels: {:?}", profile.channel_numbers());
    if profile.is_generic() {
        println!("Note:     model not in registry, using generic SCPI commands");
    }
    println!("{}", serde_json::to_string_pretty(&profile.features)?);
    Ok(())
}

fn query(settings: &Settings, resource: &str, command: &str, family: DeviceFamily) -> Result<()> {
    let mut instrument = connect(settings, resource, family)?;
    if command.contains('?') {
        println!("{}", instrument.query(command)?);
    } else {
        instrument.write(command)?;
    }
    Ok(())
}

fn resolve(family: DeviceFamily, variant: Variant, operation: &str, pairs: &[String]) -> Result<()> {
    let mut params = Params::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("parameter '{pair}' is not key=value"))?;
        params.insert(key.trim().to_string(), value.trim().to_string());
    }
    let catalog = CommandCatalog::new(family, variant);
    println!("{}", catalog.resolve(operation, &params)?);
    Ok(())
}

fn acquire(
    settings: &Settings,
    resource: &str,
    channel: u16,
    width: SampleWidth,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut scope = connect(settings, resource, DeviceFamily::Oscilloscope)?;
    if scope.family() != DeviceFamily::Oscilloscope {
        bail!("{resource} is configured as a {}, not an oscilloscope", scope.family());
    }
    let block = scope.acquire_waveform(channel, width)?;

    println!("Channel:     {channel}");
    println!("Samples:     {}", block.record_length);
    println!("Sample rate: {} Sa/s", block.sample_rate);
    println!("Duration:    {} s", block.duration());
    if let Some(path) = output {
        block.save_csv(&path)?;
        println!("Saved:       {}", path.display());
    }
    Ok(())
}

fn models(family: Option<DeviceFamily>, manufacturer: Option<&str>) -> Result<()> {
    let families = match family {
        Some(family) => vec![family],
        None => DeviceFamily::ALL.to_vec(),
    };
    for family in families {
        let registry = CapabilityRegistry::for_family(family);
        let models: Vec<&str> = match manufacturer {
            Some(manufacturer) => {
                let mut models: Vec<&str> = registry
                    .models_by_manufacturer(manufacturer)
                    .into_iter()
                    .map(|profile| profile.model_name.as_str())
                    .collect();
                models.sort_unstable();
                models
            }
            None => registry.supported_models(),
        };
        if models.is_empty() {
            continue;
        }
        println!("{family}:");
        for model in models {
            println!("  {model}");
        }
    }
    Ok(())
}
