use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 預設設定檔名稱。 / Default settings file, looked up in the working directory.
pub const SETTINGS_FILE: &str = "receipt_tasks.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 應用程式設定。 / Application settings; every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReceiptSettings {
    #[serde(default)]
    pub printer: PrinterSettings,
    #[serde(default)]
    pub receipt: ReceiptLayoutSettings,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub window: WindowSettings,
}

impl ReceiptSettings {
    /// 修正不合理的數值。 / Replaces blank or out-of-range values.
    pub fn sanitize(&mut self) {
        self.printer.sanitize();
        self.receipt.sanitize();
        self.log.sanitize();
        self.window.sanitize();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterSettings {
    /// 預設印表機的廠牌子字串。 / Vendor substring that picks the default printer.
    #[serde(default = "default_vendor")]
    pub preferred_vendor: String,
}

fn default_vendor() -> String {
    "rongta".to_string()
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            preferred_vendor: default_vendor(),
        }
    }
}

impl PrinterSettings {
    fn sanitize(&mut self) {
        let trimmed = self.preferred_vendor.trim();
        self.preferred_vendor = if trimmed.is_empty() {
            default_vendor()
        } else {
            trimmed.to_string()
        };
    }
}

/// 收據字型與送紙距離。 / Fonts and feed padding for the printed slip.
///
/// 紙寬、解析度與邊界固定為 80 mm / 203 dpi / 20 px，不可設定。
/// / Paper width, resolution and margin are fixed at 80 mm / 203 dpi / 20 px.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLayoutSettings {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_task_font")]
    pub task_font_px: i32,
    #[serde(default = "default_timestamp_font")]
    pub timestamp_font_px: i32,
    #[serde(default = "default_bottom_padding")]
    pub bottom_padding_px: i32,
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_task_font() -> i32 {
    44
}

fn default_timestamp_font() -> i32 {
    20
}

fn default_bottom_padding() -> i32 {
    120
}

impl Default for ReceiptLayoutSettings {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            task_font_px: default_task_font(),
            timestamp_font_px: default_timestamp_font(),
            bottom_padding_px: default_bottom_padding(),
        }
    }
}

impl ReceiptLayoutSettings {
    fn sanitize(&mut self) {
        if self.font_family.trim().is_empty() {
            self.font_family = default_font_family();
        }
        self.task_font_px = self.task_font_px.clamp(8, 200);
        self.timestamp_font_px = self.timestamp_font_px.clamp(6, 200);
        self.bottom_padding_px = self.bottom_padding_px.clamp(0, 1000);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
    /// `tracing-subscriber` 篩選語法。 / Directive string in `EnvFilter` syntax.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("receipt_tasks.log")
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

impl LogSettings {
    fn sanitize(&mut self) {
        if self.file.as_os_str().is_empty() {
            self.file = default_log_file();
        }
        if self.filter.trim().is_empty() {
            self.filter = default_log_filter();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_window_width")]
    pub width: f32,
    #[serde(default = "default_window_height")]
    pub height: f32,
}

fn default_window_width() -> f32 {
    500.0
}

fn default_window_height() -> f32 {
    600.0
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl WindowSettings {
    fn sanitize(&mut self) {
        if !self.width.is_finite() {
            self.width = default_window_width();
        }
        if !self.height.is_finite() {
            self.height = default_window_height();
        }
        self.width = self.width.clamp(320.0, 4096.0);
        self.height = self.height.clamp(320.0, 4096.0);
    }
}

/// 唯讀設定檔。 / Read-only settings file; the application never writes it back.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    data: ReceiptSettings,
}

impl SettingsStore {
    /// 載入設定；檔案不存在時使用預設值。 / Loads settings, using defaults when the file is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut data = ReceiptSettings::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: ReceiptSettings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &ReceiptSettings {
        &self.data
    }

    pub fn into_settings(self) -> ReceiptSettings {
        self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
