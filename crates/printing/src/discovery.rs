use thiserror::Error;
use tracing::{info, warn};

use crate::platform::PrinterBackend;

/// Vendor substring used to pick the default printer.
pub const PREFERRED_VENDOR: &str = "rongta";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("{0}")]
    Enumerate(String),
}

/// Printer names reported by the host, in host order.
pub fn list_printers<B: PrinterBackend>(backend: &B) -> Result<Vec<String>, DiscoveryError> {
    match backend.enumerate_printers() {
        Ok(printers) => {
            info!(count = printers.len(), ?printers, "discovered printers");
            Ok(printers)
        }
        Err(err) => {
            warn!(error = %err, "failed to list printers");
            Err(DiscoveryError::Enumerate(err.to_string()))
        }
    }
}

/// First name containing `vendor`, compared case-insensitively.
pub fn preferred_printer<'a>(printers: &'a [String], vendor: &str) -> Option<&'a str> {
    let vendor = vendor.to_lowercase();
    printers
        .iter()
        .find(|name| name.to_lowercase().contains(&vendor))
        .map(String::as_str)
}

/// Lists printers and returns the first one from the preferred vendor.
pub fn find_preferred<B: PrinterBackend>(
    backend: &B,
    vendor: &str,
) -> Result<Option<String>, DiscoveryError> {
    let printers = list_printers(backend)?;
    Ok(preferred_printer(&printers, vendor).map(str::to_string))
}
