use receipt_tasks_settings::{ReceiptSettings, SettingsError, SettingsStore};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("receipt_tasks.json");

    let store = SettingsStore::load(&path).expect("load defaults");
    let settings = store.settings();
    assert_eq!(settings.printer.preferred_vendor, "rongta");
    assert_eq!(settings.receipt.font_family, "Arial");
    assert_eq!(settings.receipt.task_font_px, 44);
    assert_eq!(settings.receipt.timestamp_font_px, 20);
    assert_eq!(settings.receipt.bottom_padding_px, 120);
    assert_eq!(settings.log.file, Path::new("receipt_tasks.log"));
    assert_eq!(settings.log.filter, "info");
    assert_eq!(settings.window.width, 500.0);
    assert_eq!(settings.window.height, 600.0);
    assert!(!path.exists(), "loading must not create the file");
}

#[test]
fn partial_file_keeps_defaults_for_missing_fields() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("receipt_tasks.json");
    fs::write(
        &path,
        r#"{
            "printer": { "preferred_vendor": "Epson" },
            "receipt": { "task_font_px": 52 },
            "log": { "filter": "receipt_tasks=debug" }
        }"#,
    )
    .expect("write settings");

    let settings = SettingsStore::load(&path).expect("load").into_settings();
    assert_eq!(settings.printer.preferred_vendor, "Epson");
    assert_eq!(settings.receipt.task_font_px, 52);
    assert_eq!(settings.receipt.timestamp_font_px, 20);
    assert_eq!(settings.receipt.font_family, "Arial");
    assert_eq!(settings.log.filter, "receipt_tasks=debug");
    assert_eq!(settings.log.file, Path::new("receipt_tasks.log"));
    assert_eq!(settings.window, ReceiptSettings::default().window);
}

#[test]
fn out_of_range_values_are_sanitized_on_load() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("receipt_tasks.json");
    fs::write(
        &path,
        r#"{
            "printer": { "preferred_vendor": "" },
            "receipt": { "timestamp_font_px": 1, "font_family": " " },
            "window": { "width": 50, "height": 100000 }
        }"#,
    )
    .expect("write settings");

    let store = SettingsStore::load(&path).expect("load");
    let settings = store.settings();
    assert_eq!(settings.printer.preferred_vendor, "rongta");
    assert_eq!(settings.receipt.timestamp_font_px, 6);
    assert_eq!(settings.receipt.font_family, "Arial");
    assert_eq!(settings.window.width, 320.0);
    assert_eq!(settings.window.height, 4096.0);
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn paper_geometry_keys_are_not_settings() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("receipt_tasks.json");
    fs::write(
        &path,
        r#"{ "receipt": { "paper_width_mm": 58, "dpi": 180, "margin_px": 0, "bottom_padding_px": 90 } }"#,
    )
    .expect("write settings");

    let settings = SettingsStore::load(&path).expect("load").into_settings();
    assert_eq!(settings.receipt.bottom_padding_px, 90);
    let stored = serde_json::to_value(&settings.receipt).expect("serialize");
    assert!(stored.get("paper_width_mm").is_none());
    assert!(stored.get("dpi").is_none());
    assert!(stored.get("margin_px").is_none());
}

#[test]
fn malformed_file_reports_parse_error() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("receipt_tasks.json");
    fs::write(&path, "{ not json").expect("write settings");

    let err = SettingsStore::load(&path).expect_err("should fail");
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(err.to_string().contains("receipt_tasks.json"));
}

#[test]
fn directory_in_place_of_file_reports_read_error() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("receipt_tasks.json");
    fs::create_dir(&path).expect("create dir");

    let err = SettingsStore::load(&path).expect_err("should fail");
    assert!(matches!(err, SettingsError::Read { .. }));
}
