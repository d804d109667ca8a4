pub mod settings;

pub use settings::{
    LogSettings, PrinterSettings, ReceiptLayoutSettings, ReceiptSettings, SettingsError,
    SettingsStore, WindowSettings, SETTINGS_FILE,
};
