//! Finding a controller among the serial ports of this machine


use super::{
    transport::{PortConfig, SerialTransport},
    Driver, DriverError,
};
use serialport::{SerialPortInfo, SerialPortType};
use tracing::debug;

/// USB manufacturer string of the controller
pub const MANUFACTURER: &str = "VIRTUALMATTER";
/// USB product string of the controller
pub const PRODUCT: &str = "VMSTEP";

// either the manufacturer or the product has to match, older boards only set
// one of them
fn is_match(
    manufacturer: Option<&str>,
    product: Option<&str>,
    serial_number: Option<&str>,
    wanted_serial: Option<&str>,
) -> bool {
    if manufacturer != Some(MANUFACTURER) && product != Some(PRODUCT) {
        return false;
    }
    match wanted_serial {
        Some(wanted) => serial_number == Some(wanted),
        None => true,
    }
}

fn port_matches(port: &SerialPortInfo, wanted_serial: Option<&str>) -> bool {
    match &port.port_type {
        SerialPortType::UsbPort(info) => is_match(
            info.manufacturer.as_deref(),
            info.product.as_deref(),
            info.serial_number.as_deref(),
            wanted_serial,
        ),
        _ => false,
    }
}

/// Returns the path of the first serial port a controller is connected to
///
/// If `serial_number` is given, only the controller with that serial number
/// matches.
///
/// # Errors
/// [`DriverError::NoDevice`] if no port matches.
pub fn find_port(serial_number: Option<&str>) -> Result<String, DriverError> {
    let ports = serialport::available_ports()?;
    debug!(count = ports.len(), "enumerated serial ports");
    ports
        .into_iter()
        .find(|p| port_matches(p, serial_number))
        .map(|p| p.port_name)
        .ok_or(DriverError::NoDevice)
}

/// Opens the first controller found by [`find_port`]
///
/// # Examples
/// ```no_run
/// # use vmstep_driver::{discover, PortConfig};
/// let mut driver = discover(Some("0042"), &PortConfig::default()).unwrap();
/// println!("firmware {}", driver.get_firmware().unwrap());
/// ```
pub fn discover(
    serial_number: Option<&str>,
    config: &PortConfig,
) -> Result<Driver<SerialTransport>, DriverError> {
    let path = find_port(serial_number)?;
    debug!(path = %path, "found controller");
    Driver::open(SerialTransport::open(&path, config)?)
}
