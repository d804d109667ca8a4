use std::fmt;

use tracing::warn;

use crate::display::{Point, TextExtent};
use crate::job::FontSpec;

/// Abstraction over the host printing subsystem.
/// 主機列印子系統的抽象介面。
pub trait PrinterBackend {
    type Error: fmt::Display;
    type Handle: PrinterHandle<Error = Self::Error>;
    type Device: DeviceContext<Error = Self::Error>;

    /// Locally registered and connected printers, in the order the host reports them.
    fn enumerate_printers(&self) -> Result<Vec<String>, Self::Error>;

    fn open_printer(&self, name: &str) -> Result<Self::Handle, Self::Error>;

    /// Creates a drawing surface bound to the named printer.
    fn create_device_context(&self, name: &str) -> Result<Self::Device, Self::Error>;
}

/// Open printer handle. Closing consumes it, so it can be released only once.
/// 已開啟的印表機控制代碼。
pub trait PrinterHandle {
    type Error: fmt::Display;

    fn close(self) -> Result<(), Self::Error>;
}

/// Drawing surface bound to one printer for the lifetime of a document.
/// 與單一印表機綁定的繪圖介面。
pub trait DeviceContext {
    type Error: fmt::Display;

    fn start_document(&mut self, name: &str) -> Result<(), Self::Error>;
    fn start_page(&mut self) -> Result<(), Self::Error>;
    fn select_font(&mut self, font: &FontSpec) -> Result<(), Self::Error>;
    /// Pixel extent of `text` in the currently selected font.
    fn text_extent(&mut self, text: &str) -> Result<TextExtent, Self::Error>;
    fn text_out(&mut self, position: Point, text: &str) -> Result<(), Self::Error>;
    fn end_page(&mut self) -> Result<(), Self::Error>;
    fn end_document(&mut self) -> Result<(), Self::Error>;
    /// Discards a document that failed part way through.
    fn abort_document(&mut self);
    fn release(self) -> Result<(), Self::Error>;
}

/// Scoped ownership of an open printer handle.
///
/// [`ScopedPrinter::close`] releases the handle on the normal path; dropping the
/// guard without closing (early return, panic unwinding) releases it as well.
pub struct ScopedPrinter<H: PrinterHandle> {
    name: String,
    handle: Option<H>,
}

impl<H: PrinterHandle> ScopedPrinter<H> {
    pub fn new(name: &str, handle: H) -> Self {
        Self {
            name: name.to_string(),
            handle: Some(handle),
        }
    }

    pub fn close(mut self) -> Result<(), H::Error> {
        match self.handle.take() {
            Some(handle) => handle.close(),
            None => Ok(()),
        }
    }
}

impl<H: PrinterHandle> Drop for ScopedPrinter<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.close() {
                warn!(printer = %self.name, error = %err, "failed to release printer handle");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingHandle {
        closes: Rc<Cell<u32>>,
        fail: bool,
    }

    impl PrinterHandle for CountingHandle {
        type Error = String;

        fn close(self) -> Result<(), Self::Error> {
            self.closes.set(self.closes.get() + 1);
            if self.fail {
                Err("close failed".into())
            } else {
                Ok(())
            }
        }
    }

    fn handle(closes: &Rc<Cell<u32>>, fail: bool) -> CountingHandle {
        CountingHandle {
            closes: closes.clone(),
            fail,
        }
    }

    #[test]
    fn explicit_close_releases_once() {
        let closes = Rc::new(Cell::new(0));
        let guard = ScopedPrinter::new("RONGTA", handle(&closes, false));
        guard.close().unwrap();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn dropping_guard_releases_once() {
        let closes = Rc::new(Cell::new(0));
        {
            let _guard = ScopedPrinter::new("RONGTA", handle(&closes, false));
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn close_error_is_reported_without_second_release() {
        let closes = Rc::new(Cell::new(0));
        let guard = ScopedPrinter::new("RONGTA", handle(&closes, true));
        assert_eq!(guard.close(), Err("close failed".to_string()));
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn panic_while_open_still_releases() {
        let closes = Rc::new(Cell::new(0));
        let inner = closes.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = ScopedPrinter::new("RONGTA", handle(&inner, false));
            panic!("driver exploded");
        }));
        assert!(result.is_err());
        assert_eq!(closes.get(), 1);
    }
}
