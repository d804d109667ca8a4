//! CUPS backend: `lpstat` for discovery, pages rendered to PDF and spooled with `lp`.

use std::io::{self, Write as _};
use std::process::{Command, Output, Stdio};

use thiserror::Error;
use tracing::debug;

use crate::display::{DisplayCommand, Point, PrintDisplayList, TextExtent};
use crate::job::{FontSpec, ReceiptGeometry};
use crate::metrics::text_width_px;
use crate::pdf::render_receipt_pdf;
use crate::platform::{DeviceContext, PrinterBackend, PrinterHandle};

#[derive(Debug, Error)]
pub enum CupsError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: &'static str,
        status: String,
        stderr: String,
    },
    #[error("printer {0} is not known to CUPS")]
    UnknownPrinter(String),
    #[error("device is in the wrong state: {0}")]
    State(&'static str),
}

/// Printing through the local CUPS scheduler.
#[derive(Debug, Clone)]
pub struct CupsBackend {
    geometry: ReceiptGeometry,
}

impl CupsBackend {
    pub fn new(geometry: ReceiptGeometry) -> Self {
        Self { geometry }
    }
}

impl Default for CupsBackend {
    fn default() -> Self {
        Self::new(ReceiptGeometry::default())
    }
}

impl PrinterBackend for CupsBackend {
    type Error = CupsError;
    type Handle = CupsPrinter;
    type Device = CupsDevice;

    fn enumerate_printers(&self) -> Result<Vec<String>, Self::Error> {
        let output = run("lpstat", Command::new("lpstat").arg("-e"))?;
        Ok(parse_destinations(&String::from_utf8_lossy(&output.stdout)))
    }

    fn open_printer(&self, name: &str) -> Result<Self::Handle, Self::Error> {
        let known = self.enumerate_printers()?;
        if !known.iter().any(|candidate| candidate == name) {
            return Err(CupsError::UnknownPrinter(name.to_string()));
        }
        Ok(CupsPrinter {
            name: name.to_string(),
        })
    }

    fn create_device_context(&self, name: &str) -> Result<Self::Device, Self::Error> {
        Ok(CupsDevice::new(name, self.geometry))
    }
}

fn parse_destinations(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn run(command: &'static str, cmd: &mut Command) -> Result<Output, CupsError> {
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|source| CupsError::Spawn { command, source })?;
    check_status(command, output)
}

fn check_status(command: &'static str, output: Output) -> Result<Output, CupsError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(CupsError::Failed {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// CUPS has no handle to hold open; this records that the destination was validated.
#[derive(Debug)]
pub struct CupsPrinter {
    name: String,
}

impl PrinterHandle for CupsPrinter {
    type Error = CupsError;

    fn close(self) -> Result<(), Self::Error> {
        debug!(printer = %self.name, "released CUPS destination");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentState {
    Idle,
    Open,
    InPage,
    PageDone,
}

/// Records drawing commands and submits them as one PDF when the document ends.
#[derive(Debug)]
pub struct CupsDevice {
    printer: String,
    geometry: ReceiptGeometry,
    title: String,
    font: Option<FontSpec>,
    page: PrintDisplayList,
    state: DocumentState,
}

impl CupsDevice {
    fn new(printer: &str, geometry: ReceiptGeometry) -> Self {
        Self {
            printer: printer.to_string(),
            geometry,
            title: String::new(),
            font: None,
            page: PrintDisplayList::default(),
            state: DocumentState::Idle,
        }
    }

    fn expect_state(&self, state: DocumentState, message: &'static str) -> Result<(), CupsError> {
        if self.state == state {
            Ok(())
        } else {
            Err(CupsError::State(message))
        }
    }

    fn spool(&self, pdf: &[u8]) -> Result<(), CupsError> {
        let mut child = Command::new("lp")
            .args(["-d", self.printer.as_str(), "-t", self.title.as_str(), "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CupsError::Spawn {
                command: "lp",
                source,
            })?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(pdf).map_err(|source| CupsError::Spawn {
                command: "lp",
                source,
            })?;
        }
        let output = child.wait_with_output().map_err(|source| CupsError::Spawn {
            command: "lp",
            source,
        })?;
        let output = check_status("lp", output)?;
        debug!(
            printer = %self.printer,
            response = %String::from_utf8_lossy(&output.stdout).trim(),
            "spooled receipt"
        );
        Ok(())
    }
}

impl DeviceContext for CupsDevice {
    type Error = CupsError;

    fn start_document(&mut self, name: &str) -> Result<(), Self::Error> {
        self.expect_state(DocumentState::Idle, "document already started")?;
        self.title = name.to_string();
        self.state = DocumentState::Open;
        Ok(())
    }

    fn start_page(&mut self) -> Result<(), Self::Error> {
        self.expect_state(DocumentState::Open, "page started outside a document")?;
        self.page = PrintDisplayList::default();
        self.state = DocumentState::InPage;
        Ok(())
    }

    fn select_font(&mut self, font: &FontSpec) -> Result<(), Self::Error> {
        self.font = Some(font.clone());
        self.page.push(DisplayCommand::SelectFont(font.clone()));
        Ok(())
    }

    fn text_extent(&mut self, text: &str) -> Result<TextExtent, Self::Error> {
        let font = self
            .font
            .as_ref()
            .ok_or(CupsError::State("no font selected"))?;
        Ok(TextExtent::new(text_width_px(font, text), font.height_px))
    }

    fn text_out(&mut self, position: Point, text: &str) -> Result<(), Self::Error> {
        self.expect_state(DocumentState::InPage, "text drawn outside a page")?;
        self.page.push(DisplayCommand::Text {
            position,
            text: text.to_string(),
        });
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), Self::Error> {
        self.expect_state(DocumentState::InPage, "no page to end")?;
        self.state = DocumentState::PageDone;
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), Self::Error> {
        self.expect_state(DocumentState::PageDone, "document ended with no finished page")?;
        let width_px = self.geometry.width_px();
        let pdf = render_receipt_pdf(&self.page, &self.geometry, width_px);
        self.spool(&pdf)?;
        self.state = DocumentState::Idle;
        Ok(())
    }

    fn abort_document(&mut self) {
        debug!(printer = %self.printer, "discarding unfinished receipt");
        self.page = PrintDisplayList::default();
        self.state = DocumentState::Idle;
    }

    fn release(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::FontWeight;

    #[test]
    fn destinations_are_one_per_line() {
        let listing = "RONGTA_80mm\nOffice_Laser\n\n  PDF  \n";
        assert_eq!(
            parse_destinations(listing),
            vec!["RONGTA_80mm", "Office_Laser", "PDF"]
        );
    }

    #[test]
    fn measuring_requires_a_font() {
        let mut device = CupsDevice::new("RONGTA", ReceiptGeometry::default());
        assert!(matches!(
            device.text_extent("abc"),
            Err(CupsError::State(_))
        ));
        device
            .select_font(&FontSpec::new("Arial", 20, FontWeight::Normal))
            .unwrap();
        let extent = device.text_extent("abcd").unwrap();
        assert_eq!(extent.height, 20);
        assert_eq!(extent.width, 44);

        device
            .select_font(&FontSpec::new("Arial", 100, FontWeight::Normal))
            .unwrap();
        let narrow = device.text_extent("iiii").unwrap();
        let wide = device.text_extent("WWWW").unwrap();
        assert!(wide.width > narrow.width * 4);
    }

    #[test]
    fn drawing_outside_a_page_is_rejected() {
        let mut device = CupsDevice::new("RONGTA", ReceiptGeometry::default());
        assert!(device.text_out(Point::new(0, 0), "x").is_err());
        device.start_document("Receipt Task").unwrap();
        device.start_page().unwrap();
        device.text_out(Point::new(20, 40), "x").unwrap();
        device.end_page().unwrap();
        assert!(device.text_out(Point::new(20, 40), "late").is_err());
        device.abort_document();
        assert!(device.start_document("again").is_ok());
    }
}
