use std::io::Write;

pub mod catalog;
pub mod defaults;
pub mod error;
pub mod listing;
pub mod settings;

pub use catalog::{PortCatalog, PortDescriptor, PortKind, StaticCatalog, SystemCatalog};
pub use defaults::{resolve_defaults, set_baud_rate, set_port_name, Defaults, FALLBACK_BAUD_RATE};
pub use error::{Error, Result, SettingsError};
pub use listing::list_ports;
pub use settings::{MemorySettings, SettingKey, SettingValue, SettingsStore, TomlSettings};

/// What the user asked for on the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Options {
    pub port: Option<String>,
    pub baud: Option<String>,
    pub list_ports: bool,
}

/// Resolves the defaults, applies the overrides and runs the requested
/// command. Returns the defaults in effect at the end.
///
/// Errors stop the run where they happen; whatever was persisted before
/// stays persisted.
pub fn run(
    options: &Options,
    store: &mut impl SettingsStore,
    catalog: &impl PortCatalog,
    help: &str,
    out: &mut impl Write,
) -> Result<Defaults> {
    let mut defaults = resolve_defaults(store, catalog)?;

    if let Some(port) = &options.port {
        set_port_name(&mut defaults, store, catalog, port)?;
    }
    if let Some(baud) = &options.baud {
        set_baud_rate(&mut defaults, store, baud)?;
    }

    if options.list_ports {
        list_ports(out, catalog, &defaults)?;
    } else {
        writeln!(out, "no command supplied")?;
        writeln!(out)?;
        write!(out, "{help}")?;
    }

    Ok(defaults)
}
