use tracing::{info, warn};

use crate::catalog::PortCatalog;
use crate::error::{Error, Result};
use crate::settings::{SettingKey, SettingsStore};

pub const FALLBACK_BAUD_RATE: i32 = 9600;

/// Port and baud rate in effect for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub port_name: Option<String>,
    pub baud_rate: i32,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            port_name: None,
            baud_rate: FALLBACK_BAUD_RATE,
        }
    }
}

/// Rebuilds the defaults from the store.
///
/// A persisted port that is no longer present is dropped from the returned
/// value but left in the store, so it comes back once the device is plugged
/// in again. A missing baud rate is replaced by [`FALLBACK_BAUD_RATE`] and
/// persisted.
pub fn resolve_defaults(
    store: &mut impl SettingsStore,
    catalog: &impl PortCatalog,
) -> Result<Defaults> {
    let mut defaults = Defaults::default();

    if let Some(value) = store.value(SettingKey::DefaultPortName) {
        let port_name = value.to_text();
        if catalog.contains(&port_name) {
            info!("read default portname '{port_name}' from settings");
            defaults.port_name = Some(port_name);
        } else {
            info!("default portname '{port_name}' not available.");
        }
    }

    let stored_baud = store.value(SettingKey::DefaultBaudRate);
    match stored_baud
        .as_ref()
        .and_then(|value| value.to_integer())
        .and_then(|baud| i32::try_from(baud).ok())
    {
        Some(baud_rate) => {
            info!("read default baudrate {baud_rate} baud");
            defaults.baud_rate = baud_rate;
        }
        None => {
            if let Some(value) = stored_baud {
                warn!(
                    "ignoring stored baudrate '{}', not a legal value",
                    value.to_text()
                );
            }
            set_baud_rate(&mut defaults, store, &FALLBACK_BAUD_RATE.to_string())?;
        }
    }

    Ok(defaults)
}

/// Selects the default port by 1-based catalog index or by exact name.
pub fn set_port_name(
    defaults: &mut Defaults,
    store: &mut impl SettingsStore,
    catalog: &impl PortCatalog,
    input: &str,
) -> Result<()> {
    let ports = catalog.list_ports();

    let port_name = match input.trim().parse::<i64>() {
        Ok(index) => {
            let position = usize::try_from(index)
                .ok()
                .and_then(|index| index.checked_sub(1))
                .ok_or(Error::OutOfRangeIndex(index))?;
            ports
                .into_iter()
                .nth(position)
                .map(|port| port.name)
                .ok_or(Error::OutOfRangeIndex(index))?
        }
        Err(_) => ports
            .into_iter()
            .map(|port| port.name)
            .find(|name| name == input)
            .ok_or_else(|| Error::PortNameNotFound(input.to_owned()))?,
    };

    store.set_value(SettingKey::DefaultPortName, port_name.as_str().into())?;
    info!("now using default portname '{port_name}'.");
    defaults.port_name = Some(port_name);

    Ok(())
}

pub fn set_baud_rate(
    defaults: &mut Defaults,
    store: &mut impl SettingsStore,
    input: &str,
) -> Result<()> {
    let baud_rate: i32 = input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidBaudRate(input.to_owned()))?;

    store.set_value(SettingKey::DefaultBaudRate, baud_rate.into())?;
    info!("now using default baudrate {baud_rate} baud");
    defaults.baud_rate = baud_rate;

    Ok(())
}
