pub mod driver;
pub mod event;
pub mod hid_report;

#[cfg(test)]
pub mod driver_test;
