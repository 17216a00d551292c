//! Symbolic operation names to literal SCPI strings.
//!
//! Each device family has a generic SCPI-99 table and zero or more vendor override
//! tables keyed by [`Variant`]. Resolution consults the override table for the
//! variant first, then the generic table, and fails with
//! [`ScpiError::UnknownCommand`] if neither has the operation. Placeholders are
//! `{name}`; every placeholder must have a value or resolution fails with
//! [`ScpiError::MissingParameter`] before anything is rendered.
//!
//! ```
//! use scpi_control::capability::{DeviceFamily, Variant};
//! use scpi_control::catalog::CommandCatalog;
//! use scpi_control::params;
//!
//! let catalog = CommandCatalog::new(DeviceFamily::PowerSupply, Variant::SiglentSpd);
//! let cmd = catalog.resolve("set_voltage", &params! { "ch" => 1, "voltage" => 5.0 }).unwrap();
//! assert_eq!(cmd, "CH1:VOLT 5");
//! ```

mod awg;
mod daq;
mod psu;
mod scope;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use strfmt::strfmt;

use crate::capability::{CapabilityProfile, DeviceFamily, Variant};
use crate::error::{Result, ScpiError};

/// Keyword parameters for template substitution.
pub type Params = HashMap<String, String>;

/// Build a [`Params`] map from `key => value` pairs. Values only need `ToString`.
#[macro_export]
macro_rules! params {
    () => {
        $crate::catalog::Params::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::catalog::Params::new();
        $(
            params.insert(
                ::std::string::ToString::to_string(&$key),
                ::std::string::ToString::to_string(&$value),
            );
        )+
        params
    }};
}

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(?::[^}]*)?\}").expect("Invalid placeholder regex")
});

type Table = HashMap<&'static str, &'static str>;

/// Immutable template tables for one device family.
#[derive(Debug)]
pub struct CommandTables {
    family: DeviceFamily,
    generic: Table,
    overrides: HashMap<Variant, Table>,
}

impl CommandTables {
    fn build(
        family: DeviceFamily,
        generic: &[(&'static str, &'static str)],
        overrides: &[(Variant, &[(&'static str, &'static str)])],
    ) -> Self {
        Self {
            family,
            generic: generic.iter().copied().collect(),
            overrides: overrides
                .iter()
                .map(|(variant, table)| (*variant, table.iter().copied().collect::<Table>()))
                .collect(),
        }
    }

    /// Tables for `family`.
    pub fn for_family(family: DeviceFamily) -> &'static CommandTables {
        match family {
            DeviceFamily::Oscilloscope => &*SCOPE_TABLES,
            DeviceFamily::FunctionGenerator => &*AWG_TABLES,
            DeviceFamily::PowerSupply => &*PSU_TABLES,
            DeviceFamily::DataLogger => &*DAQ_TABLES,
        }
    }

    /// Family these tables belong to.
    pub fn family(&self) -> DeviceFamily {
        self.family
    }

    /// Template for `operation` under `variant`, override first.
    pub fn template(&self, variant: Variant, operation: &str) -> Option<&'static str> {
        self.overrides
            .get(&variant)
            .and_then(|table| table.get(operation))
            .or_else(|| self.generic.get(operation))
            .copied()
    }

    fn operations(&self, variant: Variant) -> BTreeSet<&'static str> {
        let mut ops: BTreeSet<&'static str> = self.generic.keys().copied().collect();
        if let Some(table) = self.overrides.get(&variant) {
            ops.extend(table.keys().copied());
        }
        ops
    }
}

static SCOPE_TABLES: Lazy<CommandTables> = Lazy::new(|| {
    CommandTables::build(
        DeviceFamily::Oscilloscope,
        scope::GENERIC,
        &[(Variant::SiglentSds, scope::SIGLENT_SDS)],
    )
});

static AWG_TABLES: Lazy<CommandTables> = Lazy::new(|| {
    CommandTables::build(
        DeviceFamily::FunctionGenerator,
        awg::GENERIC,
        &[(Variant::SiglentSdg, awg::SIGLENT_SDG)],
    )
});

static PSU_TABLES: Lazy<CommandTables> = Lazy::new(|| {
    CommandTables::build(
        DeviceFamily::PowerSupply,
        psu::GENERIC,
        &[(Variant::SiglentSpd, psu::SIGLENT_SPD)],
    )
});

static DAQ_TABLES: Lazy<CommandTables> = Lazy::new(|| {
    CommandTables::build(
        DeviceFamily::DataLogger,
        daq::GENERIC,
        &[(Variant::KeysightDaq, daq::KEYSIGHT_DAQ)],
    )
});

/// Resolve `operation` to a literal command. Pure; touches no I/O.
pub fn resolve(
    tables: &CommandTables,
    variant: Variant,
    operation: &str,
    params: &Params,
) -> Result<String> {
    let template =
        tables
            .template(variant, operation)
            .ok_or_else(|| ScpiError::UnknownCommand {
                operation: operation.to_string(),
                variant: variant.to_string(),
            })?;
    render(operation, template, params)
}

/// Substitute every `{placeholder}` in `template`, or fail naming the first one
/// without a value.
pub fn render(operation: &str, template: &str, params: &Params) -> Result<String> {
    let missing = PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|key| !params.contains_key(*key));
    if let Some(key) = missing {
        return Err(ScpiError::MissingParameter {
            operation: operation.to_string(),
            key: key.to_string(),
        });
    }

    strfmt(template, params)
        .map_err(|e| ScpiError::Command(format!("failed to render '{operation}': {e}")))
}

/// Command resolver bound to one family and variant.
#[derive(Debug, Clone, Copy)]
pub struct CommandCatalog {
    variant: Variant,
    tables: &'static CommandTables,
}

impl CommandCatalog {
    /// Catalog for a family/variant pair. A variant without an override table for
    /// this family resolves against the generic table only.
    pub fn new(family: DeviceFamily, variant: Variant) -> Self {
        Self {
            variant,
            tables: CommandTables::for_family(family),
        }
    }

    /// Catalog matching a detected profile.
    pub fn for_profile(profile: &CapabilityProfile) -> Self {
        Self::new(profile.family, profile.variant)
    }

    /// Device family.
    pub fn family(&self) -> DeviceFamily {
        self.tables.family()
    }

    /// Dialect in use.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// See [`resolve`].
    pub fn resolve(&self, operation: &str, params: &Params) -> Result<String> {
        resolve(self.tables, self.variant, operation, params)
    }

    /// Whether `operation` resolves under this variant.
    pub fn supports(&self, operation: &str) -> bool {
        self.tables.template(self.variant, operation).is_some()
    }

    /// Sorted union of generic and override operation names.
    pub fn list_operations(&self) -> Vec<&'static str> {
        self.tables.operations(self.variant).into_iter().collect()
    }
}

/// Channel selection for data-logger commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelList {
    /// One channel, e.g. `101`
    Single(u16),
    /// Explicit list, e.g. `[101, 102, 103]`
    Many(Vec<u16>),
    /// Already-written selection, e.g. `(@101:110)` or `101:110`
    Raw(String),
}

impl From<u16> for ChannelList {
    fn from(channel: u16) -> Self {
        ChannelList::Single(channel)
    }
}

impl From<Vec<u16>> for ChannelList {
    fn from(channels: Vec<u16>) -> Self {
        ChannelList::Many(channels)
    }
}

impl From<&[u16]> for ChannelList {
    fn from(channels: &[u16]) -> Self {
        ChannelList::Many(channels.to_vec())
    }
}

impl From<&str> for ChannelList {
    fn from(channels: &str) -> Self {
        ChannelList::Raw(channels.to_string())
    }
}

impl ChannelList {
    /// Individual channel numbers, expanding `first:last` ranges. Entries that are
    /// not numbers are dropped.
    pub fn numbers(&self) -> Vec<u16> {
        match self {
            ChannelList::Single(ch) => vec![*ch],
            ChannelList::Many(list) => list.clone(),
            ChannelList::Raw(raw) => raw
                .trim()
                .trim_start_matches("(@")
                .trim_end_matches(')')
                .split(',')
                .flat_map(|entry| match entry.split_once(':') {
                    Some((first, last)) => match (first.trim().parse::<u16>(), last.trim().parse::<u16>()) {
                        (Ok(first), Ok(last)) if first <= last => (first..=last).collect::<Vec<u16>>(),
                        _ => Vec::new(),
                    },
                    None => entry.trim().parse::<u16>().map(|ch| vec![ch]).unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Render a SCPI channel list: `(@101)`, `(@101,102,103)`.
///
/// Raw strings starting with `(@` pass through untouched; anything else is wrapped.
pub fn format_channel_list(channels: impl Into<ChannelList>) -> String {
    match channels.into() {
        ChannelList::Single(ch) => format!("(@{ch})"),
        ChannelList::Many(list) => {
            let joined = list
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(",");
            format!("(@{joined})")
        }
        ChannelList::Raw(raw) if raw.starts_with("(@") => raw,
        ChannelList::Raw(raw) => format!("(@{raw})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn generic_data_logger_configure() {
        let catalog = CommandCatalog::new(DeviceFamily::DataLogger, Variant::Generic);
        let cmd = catalog
            .resolve(
                "configure_voltage_dc",
                &params! { "range" => "AUTO", "resolution" => "AUTO", "channels" => "(@101:103)" },
            )
            .unwrap();
        assert_eq!(cmd, "CONF:VOLT:DC AUTO,AUTO,(@101:103)");
    }

    #[test]
    fn override_takes_precedence() {
        let generic = CommandCatalog::new(DeviceFamily::PowerSupply, Variant::Generic);
        let spd = CommandCatalog::new(DeviceFamily::PowerSupply, Variant::SiglentSpd);
        let p = params! { "ch" => 1, "voltage" => "5.0" };

        assert_eq!(generic.resolve("set_voltage", &p).unwrap(), "SOUR1:VOLT 5.0");
        assert_eq!(spd.resolve("set_voltage", &p).unwrap(), "CH1:VOLT 5.0");
        assert_eq!(
            spd.resolve("set_output", &params! { "ch" => 1, "state" => "ON" }).unwrap(),
            "OUTPut CH1,ON"
        );
        assert_eq!(
            spd.resolve("measure_voltage", &params! { "ch" => 1 }).unwrap(),
            "MEASure1:VOLTage?"
        );
    }

    #[test]
    fn generic_operations_fall_through_for_every_variant() {
        for family in DeviceFamily::ALL {
            for variant in [
                Variant::Generic,
                Variant::SiglentSds,
                Variant::SiglentSdg,
                Variant::SiglentSpd,
                Variant::KeysightDaq,
            ] {
                let catalog = CommandCatalog::new(family, variant);
                assert_eq!(catalog.resolve("identify", &Params::new()).unwrap(), "*IDN?");
                assert_eq!(catalog.resolve("reset", &Params::new()).unwrap(), "*RST");
            }
        }
    }

    #[test]
    fn unknown_operation_names_variant() {
        let catalog = CommandCatalog::new(DeviceFamily::FunctionGenerator, Variant::SiglentSdg);
        let err = catalog.resolve("nonexistent_command", &Params::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCommand);
        assert!(err.to_string().contains("siglent_sdg"));
    }

    #[test]
    fn missing_parameter_names_key() {
        let catalog = CommandCatalog::new(DeviceFamily::PowerSupply, Variant::Generic);
        let err = catalog.resolve("set_voltage", &params! { "ch" => 1 }).unwrap_err();
        match err {
            ScpiError::MissingParameter { operation, key } => {
                assert_eq!(operation, "set_voltage");
                assert_eq!(key, "voltage");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn vendor_only_operation_is_unknown_on_generic() {
        let generic = CommandCatalog::new(DeviceFamily::DataLogger, Variant::Generic);
        let keysight = CommandCatalog::new(DeviceFamily::DataLogger, Variant::KeysightDaq);
        assert!(!generic.supports("set_alarm_high"));
        assert!(keysight.supports("set_alarm_high"));
        assert!(keysight.supports("read"));
    }

    #[test]
    fn list_operations_is_sorted_union() {
        let catalog = CommandCatalog::new(DeviceFamily::FunctionGenerator, Variant::SiglentSdg);
        let ops = catalog.list_operations();
        let mut sorted = ops.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ops, sorted);
        assert!(ops.contains(&"set_arb_waveform"));
        assert!(ops.contains(&"set_pulse_width"));
        assert!(ops.contains(&"identify"));
    }

    #[test]
    fn extra_parameters_are_ignored() {
        let catalog = CommandCatalog::new(DeviceFamily::Oscilloscope, Variant::SiglentSds);
        let cmd = catalog
            .resolve("get_waveform", &params! { "ch" => 2, "unused" => "x" })
            .unwrap();
        assert_eq!(cmd, "C2:WF? DAT2");
    }

    #[test]
    fn channel_list_formats() {
        assert_eq!(format_channel_list(101u16), "(@101)");
        assert_eq!(format_channel_list(vec![101, 102, 103]), "(@101,102,103)");
        assert_eq!(format_channel_list("(@101:110)"), "(@101:110)");
        assert_eq!(format_channel_list("101:110"), "(@101:110)");
        assert_eq!(format_channel_list(Vec::<u16>::new()), "(@)");
    }

    #[test]
    fn channel_list_numbers_expand_ranges() {
        assert_eq!(ChannelList::from("(@101:103,110)").numbers(), vec![101, 102, 103, 110]);
        assert_eq!(ChannelList::from("201").numbers(), vec![201]);
        assert_eq!(ChannelList::from(vec![1, 2]).numbers(), vec![1, 2]);
        assert!(ChannelList::from("(@)").numbers().is_empty());
    }

    #[test]
    fn params_macro_stringifies_values() {
        let p = params! { "ch" => 2, "frequency" => 1000.5, "state" => "ON" };
        assert_eq!(p["ch"], "2");
        assert_eq!(p["frequency"], "1000.5");
        assert_eq!(p["state"], "ON");
    }
}
