//! Windows backend: winspool for discovery and handles, a GDI printer DC for drawing.

use std::slice;

use thiserror::Error;
use tracing::{debug, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::SIZE;
use windows::Win32::Graphics::Gdi::{
    CreateDCW, CreateFontW, DeleteDC, DeleteObject, GetTextExtentPoint32W, SelectObject,
    TextOutW, CLIP_DEFAULT_PRECIS, DEFAULT_CHARSET, DEFAULT_QUALITY, HDC, HFONT,
    OUT_DEFAULT_PRECIS,
};
use windows::Win32::Graphics::Printing::{
    ClosePrinter, EnumPrintersW, OpenPrinterW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL,
    PRINTER_HANDLE, PRINTER_INFO_4W,
};
use windows::Win32::Storage::Xps::{AbortDoc, EndDoc, EndPage, StartDocW, StartPage, DOCINFOW};

use crate::display::{Point, TextExtent};
use crate::job::FontSpec;
use crate::platform::{DeviceContext, PrinterBackend, PrinterHandle};

#[derive(Debug, Error)]
pub enum GdiError {
    #[error("{call} failed: {source}")]
    Win32 {
        call: &'static str,
        #[source]
        source: windows::core::Error,
    },
    #[error("printer name is not valid UTF-16: {0}")]
    Name(String),
}

fn win32(call: &'static str) -> impl FnOnce(windows::core::Error) -> GdiError {
    move |source| GdiError::Win32 { call, source }
}

fn last_error(call: &'static str) -> GdiError {
    GdiError::Win32 {
        call,
        source: windows::core::Error::from_win32(),
    }
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn wide_unterminated(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// The Windows print spooler.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdiBackend;

impl PrinterBackend for GdiBackend {
    type Error = GdiError;
    type Handle = GdiPrinter;
    type Device = GdiDevice;

    fn enumerate_printers(&self) -> Result<Vec<String>, Self::Error> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed = 0u32;
        let mut returned = 0u32;
        // The sizing call reports ERROR_INSUFFICIENT_BUFFER; only `needed` matters.
        let _ = unsafe {
            EnumPrintersW(flags, PCWSTR::null(), 4, None, &mut needed, &mut returned)
        };
        if needed == 0 {
            return Ok(Vec::new());
        }

        // u64 storage keeps the PRINTER_INFO_4W records pointer-aligned.
        let mut storage = vec![0u64; (needed as usize).div_ceil(8)];
        let buffer =
            unsafe { slice::from_raw_parts_mut(storage.as_mut_ptr().cast::<u8>(), needed as usize) };
        unsafe {
            EnumPrintersW(
                flags,
                PCWSTR::null(),
                4,
                Some(buffer),
                &mut needed,
                &mut returned,
            )
        }
        .map_err(win32("EnumPrintersW"))?;

        let records = unsafe {
            slice::from_raw_parts(
                storage.as_ptr().cast::<PRINTER_INFO_4W>(),
                returned as usize,
            )
        };
        records
            .iter()
            .filter(|record| !record.pPrinterName.is_null())
            .map(|record| {
                unsafe { record.pPrinterName.to_string() }
                    .map_err(|err| GdiError::Name(err.to_string()))
            })
            .collect()
    }

    fn open_printer(&self, name: &str) -> Result<Self::Handle, Self::Error> {
        let name_w = wide(name);
        let mut handle = PRINTER_HANDLE::default();
        unsafe { OpenPrinterW(PCWSTR(name_w.as_ptr()), &mut handle, None) }
            .map_err(win32("OpenPrinterW"))?;
        Ok(GdiPrinter {
            name: name.to_string(),
            handle,
        })
    }

    fn create_device_context(&self, name: &str) -> Result<Self::Device, Self::Error> {
        let name_w = wide(name);
        let hdc = unsafe { CreateDCW(w!("WINSPOOL"), PCWSTR(name_w.as_ptr()), PCWSTR::null(), None) };
        if hdc.is_invalid() {
            return Err(last_error("CreateDCW"));
        }
        Ok(GdiDevice {
            hdc,
            fonts: Vec::new(),
            released: false,
        })
    }
}

#[derive(Debug)]
pub struct GdiPrinter {
    name: String,
    handle: PRINTER_HANDLE,
}

impl PrinterHandle for GdiPrinter {
    type Error = GdiError;

    fn close(self) -> Result<(), Self::Error> {
        debug!(printer = %self.name, "closing printer handle");
        unsafe { ClosePrinter(self.handle) }.map_err(win32("ClosePrinter"))
    }
}

/// Printer device context. Fonts created through it are deleted on release.
#[derive(Debug)]
pub struct GdiDevice {
    hdc: HDC,
    fonts: Vec<HFONT>,
    released: bool,
}

impl GdiDevice {
    fn check_job(result: i32, call: &'static str) -> Result<(), GdiError> {
        if result > 0 {
            Ok(())
        } else {
            Err(last_error(call))
        }
    }

    fn free(&mut self) -> Result<(), GdiError> {
        self.released = true;
        for font in self.fonts.drain(..) {
            unsafe {
                let _ = DeleteObject(font);
            }
        }
        let deleted = unsafe { DeleteDC(self.hdc) };
        if deleted.as_bool() {
            Ok(())
        } else {
            Err(last_error("DeleteDC"))
        }
    }
}

impl DeviceContext for GdiDevice {
    type Error = GdiError;

    fn start_document(&mut self, name: &str) -> Result<(), Self::Error> {
        let name_w = wide(name);
        let info = DOCINFOW {
            cbSize: std::mem::size_of::<DOCINFOW>() as i32,
            lpszDocName: PCWSTR(name_w.as_ptr()),
            ..Default::default()
        };
        Self::check_job(unsafe { StartDocW(self.hdc, &info) }, "StartDocW")
    }

    fn start_page(&mut self) -> Result<(), Self::Error> {
        Self::check_job(unsafe { StartPage(self.hdc) }, "StartPage")
    }

    fn select_font(&mut self, font: &FontSpec) -> Result<(), Self::Error> {
        let face = wide(&font.family);
        let handle = unsafe {
            CreateFontW(
                font.height_px,
                0,
                0,
                0,
                font.weight.gdi_weight(),
                0,
                0,
                0,
                DEFAULT_CHARSET,
                OUT_DEFAULT_PRECIS,
                CLIP_DEFAULT_PRECIS,
                DEFAULT_QUALITY,
                0,
                PCWSTR(face.as_ptr()),
            )
        };
        if handle.is_invalid() {
            return Err(last_error("CreateFontW"));
        }
        self.fonts.push(handle);
        let previous = unsafe { SelectObject(self.hdc, handle) };
        if previous.is_invalid() {
            return Err(last_error("SelectObject"));
        }
        Ok(())
    }

    fn text_extent(&mut self, text: &str) -> Result<TextExtent, Self::Error> {
        let text_w = wide_unterminated(text);
        let mut size = SIZE::default();
        let ok = unsafe { GetTextExtentPoint32W(self.hdc, &text_w, &mut size) };
        if !ok.as_bool() {
            return Err(last_error("GetTextExtentPoint32W"));
        }
        Ok(TextExtent::new(size.cx, size.cy))
    }

    fn text_out(&mut self, position: Point, text: &str) -> Result<(), Self::Error> {
        let text_w = wide_unterminated(text);
        let ok = unsafe { TextOutW(self.hdc, position.x, position.y, &text_w) };
        if !ok.as_bool() {
            return Err(last_error("TextOutW"));
        }
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), Self::Error> {
        Self::check_job(unsafe { EndPage(self.hdc) }, "EndPage")
    }

    fn end_document(&mut self) -> Result<(), Self::Error> {
        Self::check_job(unsafe { EndDoc(self.hdc) }, "EndDoc")
    }

    fn abort_document(&mut self) {
        if unsafe { AbortDoc(self.hdc) } <= 0 {
            warn!("AbortDoc failed; the spooler may hold a partial job");
        }
    }

    fn release(mut self) -> Result<(), Self::Error> {
        self.free()
    }
}

impl Drop for GdiDevice {
    fn drop(&mut self) {
        if !self.released {
            if let Err(err) = self.free() {
                warn!(error = %err, "failed to release printer device context");
            }
        }
    }
}
