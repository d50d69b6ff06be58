use std::io::{self, Write};

use tracing::debug;

use crate::catalog::PortCatalog;
use crate::defaults::Defaults;

pub const DEFAULT_MARKER: &str = " (*)";

/// Prints the catalog in 1-based order, marking the default port.
pub fn list_ports(
    out: &mut impl Write,
    catalog: &impl PortCatalog,
    defaults: &Defaults,
) -> io::Result<()> {
    writeln!(out, "Serial ports:")?;

    for (index, port) in catalog.list_ports().into_iter().enumerate() {
        let index = index + 1;
        debug!("port {index}: {} is {}", port.name, port.kind);

        let marker = if defaults.port_name.as_deref() == Some(port.name.as_str()) {
            DEFAULT_MARKER
        } else {
            ""
        };
        writeln!(out, "{index}: {}{marker}", port.name)?;
    }

    Ok(())
}
