use chrono::NaiveDateTime;
use receipt_tasks_core::TaskPrinter;
use thiserror::Error;
use tracing::{error, info};

use crate::discovery::{self, DiscoveryError};
use crate::job::{PrintJob, ReceiptFonts, ReceiptGeometry, DOCUMENT_NAME};
use crate::layout::ReceiptLayout;
use crate::platform::{DeviceContext, PrinterBackend, ScopedPrinter};

/// Errors raised while printing one receipt.
/// 列印單張收據時可能發生的錯誤。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrintJobError {
    #[error("could not open printer {printer}: {detail}")]
    Open { printer: String, detail: String },
    #[error("could not create a device context for {printer}: {detail}")]
    Device { printer: String, detail: String },
    #[error("drawing on {printer} failed: {detail}")]
    Draw { printer: String, detail: String },
    #[error("committing the page to {printer} failed: {detail}")]
    Commit { printer: String, detail: String },
    #[error("releasing {printer} failed: {detail}")]
    Release { printer: String, detail: String },
}

/// Renders tasks as receipts on a printer backend.
///
/// The printable width is resolved once at construction and reused for every job.
#[derive(Debug)]
pub struct ReceiptFormatter<B> {
    backend: B,
    geometry: ReceiptGeometry,
    fonts: ReceiptFonts,
    width_px: i32,
}

impl<B: PrinterBackend> ReceiptFormatter<B> {
    pub fn new(backend: B) -> Self {
        Self::with_layout(backend, ReceiptGeometry::default(), ReceiptFonts::default())
    }

    pub fn with_layout(backend: B, geometry: ReceiptGeometry, fonts: ReceiptFonts) -> Self {
        let width_px = geometry.width_px();
        Self {
            backend,
            geometry,
            fonts,
            width_px,
        }
    }

    pub fn width_px(&self) -> i32 {
        self.width_px
    }

    pub fn list_printers(&self) -> Result<Vec<String>, DiscoveryError> {
        discovery::list_printers(&self.backend)
    }

    /// Prints one task with its timestamp as a single document.
    ///
    /// The printer handle is released on every exit path. Failures are logged
    /// here and returned to the caller; nothing is retried.
    pub fn print_task(
        &self,
        printer: &str,
        task: &str,
        timestamp: NaiveDateTime,
    ) -> Result<(), PrintJobError> {
        let job = PrintJob::new(printer, task, timestamp);
        match self.run_job(&job) {
            Ok(()) => {
                info!(job = %job.id, printer, task, "printed task");
                Ok(())
            }
            Err(err) => {
                error!(job = %job.id, printer, task, error = %err, "failed to print task");
                Err(err)
            }
        }
    }

    fn run_job(&self, job: &PrintJob<'_>) -> Result<(), PrintJobError> {
        let printer = job.printer;
        let handle = self
            .backend
            .open_printer(printer)
            .map_err(|err| PrintJobError::Open {
                printer: printer.to_string(),
                detail: err.to_string(),
            })?;
        let guard = ScopedPrinter::new(printer, handle);

        let result = self.render_document(job);

        let released = guard.close().map_err(|err| PrintJobError::Release {
            printer: printer.to_string(),
            detail: err.to_string(),
        });
        // A render failure outranks a release failure.
        result.and(released)
    }

    fn render_document(&self, job: &PrintJob<'_>) -> Result<(), PrintJobError> {
        let printer = job.printer;
        let mut device = self
            .backend
            .create_device_context(printer)
            .map_err(|err| PrintJobError::Device {
                printer: printer.to_string(),
                detail: err.to_string(),
            })?;

        let drawn = self.draw_page(&mut device, job);
        if drawn.is_err() {
            device.abort_document();
        }
        let released = device.release().map_err(|err| PrintJobError::Release {
            printer: printer.to_string(),
            detail: err.to_string(),
        });
        drawn.and(released)
    }

    fn draw_page<D: DeviceContext>(
        &self,
        device: &mut D,
        job: &PrintJob<'_>,
    ) -> Result<(), PrintJobError> {
        let printer = job.printer;
        let draw_err = |err: D::Error| PrintJobError::Draw {
            printer: printer.to_string(),
            detail: err.to_string(),
        };
        let commit_err = |err: D::Error| PrintJobError::Commit {
            printer: printer.to_string(),
            detail: err.to_string(),
        };

        device.start_document(DOCUMENT_NAME).map_err(commit_err)?;
        device.start_page().map_err(commit_err)?;

        device.select_font(&self.fonts.task).map_err(draw_err)?;
        let extent = device.text_extent(job.task).map_err(draw_err)?;
        let layout = ReceiptLayout::compute(&self.geometry, self.width_px, extent);
        device.text_out(layout.task, job.task).map_err(draw_err)?;

        device.select_font(&self.fonts.timestamp).map_err(draw_err)?;
        device
            .text_out(layout.timestamp, &job.timestamp_label())
            .map_err(draw_err)?;
        device.text_out(layout.feed_mark, " ").map_err(draw_err)?;

        device.end_page().map_err(commit_err)?;
        device.end_document().map_err(commit_err)
    }
}

impl<B: PrinterBackend> TaskPrinter for ReceiptFormatter<B> {
    type Error = PrintJobError;

    fn print_task(
        &self,
        printer: &str,
        task: &str,
        timestamp: NaiveDateTime,
    ) -> Result<(), Self::Error> {
        ReceiptFormatter::print_task(self, printer, task, timestamp)
    }
}
