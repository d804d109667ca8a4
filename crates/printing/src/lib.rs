//! Receipt rendering: geometry, layout, the per-task print job and the host printer backends.

pub mod controller;
pub mod discovery;
pub mod display;
pub mod job;
pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod platform;

#[cfg(unix)]
pub mod cups;
#[cfg(windows)]
pub mod gdi;

pub use controller::{PrintJobError, ReceiptFormatter};
pub use discovery::{find_preferred, list_printers, preferred_printer, DiscoveryError, PREFERRED_VENDOR};
pub use display::{DisplayCommand, Point, PrintDisplayList, TextExtent};
pub use job::{
    format_timestamp, FontSpec, FontWeight, PrintJob, PrintJobId, ReceiptFonts, ReceiptGeometry,
    DOCUMENT_NAME, RECEIPT_WIDTH_PX,
};
pub use layout::{centered_x, ReceiptLayout};
pub use platform::{DeviceContext, PrinterBackend, PrinterHandle, ScopedPrinter};

#[cfg(unix)]
pub use cups::{CupsBackend, CupsError};
#[cfg(windows)]
pub use gdi::{GdiBackend, GdiError};

/// Printer backend for the host platform.
#[cfg(windows)]
pub type SystemBackend = gdi::GdiBackend;
#[cfg(unix)]
pub type SystemBackend = cups::CupsBackend;

/// Backend for the host platform, sized for `geometry`.
#[cfg(windows)]
pub fn system_backend(_geometry: ReceiptGeometry) -> SystemBackend {
    gdi::GdiBackend
}

/// Backend for the host platform, sized for `geometry`.
#[cfg(unix)]
pub fn system_backend(geometry: ReceiptGeometry) -> SystemBackend {
    cups::CupsBackend::new(geometry)
}
