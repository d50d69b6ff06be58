use std::fmt;

use serialport::{SerialPortInfo, SerialPortType};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    Usb {
        vid: u16,
        pid: u16,
        serial_number: Option<String>,
        manufacturer: Option<String>,
        product: Option<String>,
    },
    Pci,
    Bluetooth,
    Unknown,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::Usb {
                vid,
                pid,
                serial_number,
                manufacturer,
                product,
            } => {
                write!(f, "USB {vid:04x}:{pid:04x}")?;
                if let Some(manufacturer) = manufacturer {
                    write!(f, " {manufacturer}")?;
                }
                if let Some(product) = product {
                    write!(f, " {product}")?;
                }
                if let Some(serial_number) = serial_number {
                    write!(f, " (serial {serial_number})")?;
                }
                Ok(())
            }
            PortKind::Pci => f.write_str("PCI"),
            PortKind::Bluetooth => f.write_str("Bluetooth"),
            PortKind::Unknown => f.write_str("unknown"),
        }
    }
}

/// A serial port as reported by the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    pub name: String,
    pub kind: PortKind,
}

impl PortDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        PortDescriptor {
            name: name.into(),
            kind: PortKind::Unknown,
        }
    }
}

impl From<SerialPortInfo> for PortDescriptor {
    fn from(info: SerialPortInfo) -> Self {
        let kind = match info.port_type {
            SerialPortType::UsbPort(usb) => PortKind::Usb {
                vid: usb.vid,
                pid: usb.pid,
                serial_number: usb.serial_number,
                manufacturer: usb.manufacturer,
                product: usb.product,
            },
            SerialPortType::PciPort => PortKind::Pci,
            SerialPortType::BluetoothPort => PortKind::Bluetooth,
            SerialPortType::Unknown => PortKind::Unknown,
        };

        PortDescriptor {
            name: info.port_name,
            kind,
        }
    }
}

/// Source of the ports currently present on the host.
///
/// Ports come and go between calls, so callers ask again whenever they need
/// the current state instead of holding on to a previous answer.
pub trait PortCatalog {
    fn list_ports(&self) -> Vec<PortDescriptor>;

    fn contains(&self, name: &str) -> bool {
        self.list_ports().iter().any(|port| port.name == name)
    }
}

/// The ports the operating system reports right now.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCatalog;

impl PortCatalog for SystemCatalog {
    fn list_ports(&self) -> Vec<PortDescriptor> {
        match serialport::available_ports() {
            Ok(ports) => ports.into_iter().map(PortDescriptor::from).collect(),
            Err(e) => {
                warn!("failed to enumerate serial ports: {e}");
                Vec::new()
            }
        }
    }
}

/// A fixed set of ports.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    ports: Vec<PortDescriptor>,
}

impl StaticCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticCatalog {
            ports: names.into_iter().map(PortDescriptor::new).collect(),
        }
    }
}

impl PortCatalog for StaticCatalog {
    fn list_ports(&self) -> Vec<PortDescriptor> {
        self.ports.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_catalog_keeps_order() {
        let catalog = StaticCatalog::new(["COM3", "COM1", "COM7"]);
        let names: Vec<_> = catalog.list_ports().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["COM3", "COM1", "COM7"]);
    }

    #[test]
    fn contains_is_exact_and_case_sensitive() {
        let catalog = StaticCatalog::new(["/dev/ttyUSB0"]);
        assert!(catalog.contains("/dev/ttyUSB0"));
        assert!(!catalog.contains("/dev/ttyusb0"));
        assert!(!catalog.contains("/dev/ttyUSB"));
    }

    #[test]
    fn usb_kind_display() {
        let kind = PortKind::Usb {
            vid: 0x10c4,
            pid: 0xea60,
            serial_number: Some("0001".into()),
            manufacturer: Some("Silicon Labs".into()),
            product: Some("CP2102".into()),
        };
        assert_eq!(
            kind.to_string(),
            "USB 10c4:ea60 Silicon Labs CP2102 (serial 0001)"
        );
        assert_eq!(PortKind::Pci.to_string(), "PCI");
    }

    #[test]
    fn converts_system_port_info() {
        let info = SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::PciPort,
        };
        let port = PortDescriptor::from(info);
        assert_eq!(port.name, "/dev/ttyS0");
        assert_eq!(port.kind, PortKind::Pci);
    }
}
