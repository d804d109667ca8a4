use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;

pub const MM_PER_INCH: f64 = 25.4;

/// Document name handed to the spooler for every receipt.
pub const DOCUMENT_NAME: &str = "Receipt Task";

/// Printable width of the standard 80 mm / 203 dpi receipt, computed once per process.
pub static RECEIPT_WIDTH_PX: Lazy<i32> =
    Lazy::new(|| ReceiptGeometry::thermal_80mm().compute_width_px());

/// Opaque identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrintJobId(u64);

impl PrintJobId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for PrintJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrintJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "receipt-{}", self.0)
    }
}

/// Physical receipt geometry. Lengths other than the paper width are device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiptGeometry {
    pub paper_width_mm: f64,
    pub dpi: u32,
    pub margin_px: i32,
    /// Distance from the top margin to the task line.
    pub task_offset_px: i32,
    /// Gap between the bottom of the task line and the timestamp.
    pub timestamp_gap_px: i32,
    /// Height reserved for the timestamp line before the bottom padding starts.
    pub timestamp_line_px: i32,
    /// Feed distance below the timestamp so the slip clears the tear bar.
    pub bottom_padding_px: i32,
}

impl ReceiptGeometry {
    pub const fn thermal_80mm() -> Self {
        Self {
            paper_width_mm: 80.0,
            dpi: 203,
            margin_px: 20,
            task_offset_px: 20,
            timestamp_gap_px: 40,
            timestamp_line_px: 20,
            bottom_padding_px: 120,
        }
    }

    /// `round(paper_width_mm / 25.4 * dpi)`.
    pub fn compute_width_px(&self) -> i32 {
        (self.paper_width_mm / MM_PER_INCH * f64::from(self.dpi)).round() as i32
    }

    /// Width in pixels, reusing the process-wide value for the standard paper.
    pub fn width_px(&self) -> i32 {
        let standard = Self::thermal_80mm();
        if self.paper_width_mm == standard.paper_width_mm && self.dpi == standard.dpi {
            *RECEIPT_WIDTH_PX
        } else {
            self.compute_width_px()
        }
    }

    /// Converts device pixels to PDF points (1/72").
    pub fn px_to_points(&self, px: f32) -> f32 {
        px * 72.0 / self.dpi.max(1) as f32
    }
}

impl Default for ReceiptGeometry {
    fn default() -> Self {
        Self::thermal_80mm()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Normal,
    Bold,
}

impl FontWeight {
    /// GDI weight value (`FW_NORMAL` / `FW_BOLD`).
    pub const fn gdi_weight(self) -> i32 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
        }
    }
}

/// Font request expressed the way printer drivers take it: family, cell height in pixels, weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub family: String,
    pub height_px: i32,
    pub weight: FontWeight,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, height_px: i32, weight: FontWeight) -> Self {
        Self {
            family: family.into(),
            height_px,
            weight,
        }
    }
}

/// The two fonts used on a receipt. The task font must dominate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFonts {
    pub task: FontSpec,
    pub timestamp: FontSpec,
}

impl ReceiptFonts {
    pub fn new(family: &str, task_height_px: i32, timestamp_height_px: i32) -> Self {
        // Keep the task line visually dominant even with odd settings.
        let task_height_px = task_height_px.max(timestamp_height_px + 1);
        Self {
            task: FontSpec::new(family, task_height_px, FontWeight::Bold),
            timestamp: FontSpec::new(family, timestamp_height_px, FontWeight::Normal),
        }
    }
}

impl Default for ReceiptFonts {
    fn default() -> Self {
        Self::new("Arial", 44, 20)
    }
}

/// One receipt to print. Consumed by the formatter and not retained.
#[derive(Debug, Clone)]
pub struct PrintJob<'a> {
    pub id: PrintJobId,
    pub printer: &'a str,
    pub task: &'a str,
    pub timestamp: NaiveDateTime,
}

impl<'a> PrintJob<'a> {
    pub fn new(printer: &'a str, task: &'a str, timestamp: NaiveDateTime) -> Self {
        Self {
            id: PrintJobId::new(),
            printer,
            task,
            timestamp,
        }
    }

    /// `YYYY-MM-DD HH:MM`, 24-hour clock, no seconds.
    pub fn timestamp_label(&self) -> String {
        format_timestamp(self.timestamp)
    }
}

pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn standard_receipt_is_639_pixels_wide() {
        assert_eq!(ReceiptGeometry::thermal_80mm().compute_width_px(), 639);
        assert_eq!(*RECEIPT_WIDTH_PX, 639);
        assert_eq!(ReceiptGeometry::default().width_px(), 639);
    }

    #[test]
    fn narrower_paper_recomputes_width() {
        let geometry = ReceiptGeometry {
            paper_width_mm: 58.0,
            ..ReceiptGeometry::thermal_80mm()
        };
        // 58 / 25.4 * 203 = 463.5...
        assert_eq!(geometry.width_px(), 464);
    }

    #[test]
    fn timestamp_drops_seconds_and_pads() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|date| date.and_hms_opt(7, 5, 59))
            .unwrap();
        assert_eq!(format_timestamp(at), "2024-01-02 07:05");
        let job = PrintJob::new("RONGTA", "task", at);
        assert_eq!(job.timestamp_label(), "2024-01-02 07:05");
    }

    #[test]
    fn task_font_stays_dominant() {
        let fonts = ReceiptFonts::new("Arial", 10, 20);
        assert!(fonts.task.height_px > fonts.timestamp.height_px);
        assert_eq!(fonts.task.weight, FontWeight::Bold);
        assert_eq!(fonts.timestamp.weight, FontWeight::Normal);
    }

    #[test]
    fn job_ids_are_unique() {
        let a = PrintJobId::new();
        let b = PrintJobId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("receipt-"));
    }
}
