use std::error::Error;

use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

use crate::config::DeviceIdentity;
use crate::hid::{EnumeratedDevice, HidBackend};

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Match")]
    matched: String,
}

impl DeviceRow {
    fn new(device: &EnumeratedDevice, identity: &DeviceIdentity) -> Self {
        let matched = identity.matches(device.vendor_id, device.product_id);
        Self {
            id: format!("{:04x}:{:04x}", device.vendor_id, device.product_id),
            manufacturer: device.manufacturer.clone().unwrap_or_default(),
            product: device.product.clone().unwrap_or_default(),
            path: device.path_string(),
            matched: if matched { "yes" } else { "" }.to_string(),
        }
    }
}

/// Build a table of the given devices, marking the ones that match the
/// identity.
pub fn device_table(devices: &[EnumeratedDevice], identity: &DeviceIdentity) -> Table {
    let rows: Vec<DeviceRow> = devices
        .iter()
        .map(|device| DeviceRow::new(device, identity))
        .collect();
    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("HID Devices"));
    table
}

/// Print every visible HID device
pub fn handle_list<H: HidBackend>(
    hid: &mut H,
    identity: &DeviceIdentity,
) -> Result<(), Box<dyn Error>> {
    let devices = hid.enumerate()?;
    let matching = devices
        .iter()
        .filter(|device| identity.matches(device.vendor_id, device.product_id))
        .count();

    let table = device_table(&devices, identity);
    println!("{table}");
    println!(
        "Found {} HID device(s), {matching} matching {identity}",
        devices.len()
    );

    Ok(())
}
