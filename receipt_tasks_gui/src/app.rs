use eframe::{egui, App, Frame};
use egui::{Align, Align2, Color32, Layout};
use receipt_tasks_printing::{
    system_backend, ReceiptFonts, ReceiptFormatter, ReceiptGeometry, SystemBackend,
};
use receipt_tasks_settings::{ReceiptLayoutSettings, ReceiptSettings};

use crate::state::{AppState, Dialog, DialogKind};

pub const APP_TITLE: &str = "Receipt Task Printer";

/// User intents collected while drawing a frame and applied afterwards.
#[derive(Debug, Clone, PartialEq)]
enum UiAction {
    SelectPrinter(String),
    RefreshPrinters,
    AddTask,
    SelectRow(usize),
    RemoveSelected,
    ClearAll,
    PrintAll,
    CloseDialog { confirmed: bool },
}

pub struct ReceiptTaskApp {
    state: AppState,
    formatter: ReceiptFormatter<SystemBackend>,
    preferred_vendor: String,
    focus_input: bool,
}

impl ReceiptTaskApp {
    pub fn new(settings: &ReceiptSettings) -> Self {
        let (geometry, fonts) = receipt_layout(&settings.receipt);
        let formatter =
            ReceiptFormatter::with_layout(system_backend(geometry), geometry, fonts);
        let mut app = Self {
            state: AppState::new(),
            formatter,
            preferred_vendor: settings.printer.preferred_vendor.clone(),
            focus_input: true,
        };
        app.refresh_printers();
        app
    }

    fn refresh_printers(&mut self) {
        let printers = self.formatter.list_printers();
        self.state.load_printers(printers, &self.preferred_vendor);
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::SelectPrinter(name) => self.state.select_printer(&name),
            UiAction::RefreshPrinters => self.refresh_printers(),
            UiAction::AddTask => {
                self.state.add_task();
                self.focus_input = true;
            }
            UiAction::SelectRow(row) => self.state.select_row(Some(row)),
            UiAction::RemoveSelected => self.state.remove_selected(),
            UiAction::ClearAll => self.state.request_clear(),
            UiAction::PrintAll => self.state.print_all(&self.formatter),
            UiAction::CloseDialog { confirmed } => self.state.resolve_dialog(confirmed),
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .exact_height(24.0)
            .show(ctx, |ui| {
                ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                    ui.label(self.state.status());
                });
            });
    }

    fn show_main_panel(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let interactive = self.state.dialog().is_none();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                ui.heading(APP_TITLE);
                ui.add_space(8.0);
                self.show_printer_row(ui, actions);
                ui.add_space(8.0);
                self.show_input_row(ui, actions);
                ui.add_space(8.0);
                ui.label("Tasks:");
                self.show_task_list(ui, actions);
                ui.add_space(8.0);
                self.show_action_row(ui, actions);
            });
        });
    }

    fn show_printer_row(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.label("Printer:");
            let current = self.state.selected_printer().unwrap_or("");
            egui::ComboBox::from_id_source("printer_select")
                .width(260.0)
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for printer in self.state.printers() {
                        if ui
                            .selectable_label(printer == current, printer)
                            .clicked()
                        {
                            actions.push(UiAction::SelectPrinter(printer.clone()));
                        }
                    }
                });
            if ui.button("Refresh printers").clicked() {
                actions.push(UiAction::RefreshPrinters);
            }
        });
    }

    fn show_input_row(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.label("New task:");
        ui.horizontal(|ui| {
            let input = egui::TextEdit::singleline(self.state.input_mut())
                .desired_width(ui.available_width() - 90.0)
                .hint_text("Describe the task");
            let response = ui.add(input);
            if self.focus_input {
                response.request_focus();
                self.focus_input = false;
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                actions.push(UiAction::AddTask);
            }
            if ui.button("Add Task").clicked() {
                actions.push(UiAction::AddTask);
            }
        });
    }

    fn show_task_list(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .max_height(ui.available_height() - 48.0)
                .show(ui, |ui| {
                    for (row, text) in self.state.rows().iter().enumerate() {
                        let selected = self.state.selected() == Some(row);
                        if ui.selectable_label(selected, text).clicked() {
                            actions.push(UiAction::SelectRow(row));
                        }
                    }
                });
        });
    }

    fn show_action_row(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let has_tasks = self.state.has_tasks();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(has_tasks, egui::Button::new("Remove Selected"))
                .clicked()
            {
                actions.push(UiAction::RemoveSelected);
            }
            if ui
                .add_enabled(has_tasks, egui::Button::new("Clear All"))
                .clicked()
            {
                actions.push(UiAction::ClearAll);
            }
            if ui
                .add_enabled(has_tasks, egui::Button::new("Print All"))
                .clicked()
            {
                actions.push(UiAction::PrintAll);
            }
        });
    }

    fn show_dialog(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let Some(dialog) = self.state.dialog() else {
            return;
        };
        egui::Window::new(dialog.title())
            .id(egui::Id::new("modal_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                let message = dialog.message();
                match dialog {
                    Dialog::Message {
                        kind: DialogKind::Error,
                        ..
                    } => {
                        ui.colored_label(Color32::from_rgb(200, 60, 60), message);
                    }
                    Dialog::Message {
                        kind: DialogKind::Warning,
                        ..
                    } => {
                        ui.colored_label(Color32::from_rgb(200, 140, 40), message);
                    }
                    _ => {
                        ui.label(message);
                    }
                }
                ui.add_space(8.0);
                ui.horizontal(|ui| match dialog {
                    Dialog::ConfirmClear(_) => {
                        if ui.button("Yes").clicked() {
                            actions.push(UiAction::CloseDialog { confirmed: true });
                        }
                        if ui.button("No").clicked() {
                            actions.push(UiAction::CloseDialog { confirmed: false });
                        }
                    }
                    Dialog::Message { .. } => {
                        if ui.button("OK").clicked() {
                            actions.push(UiAction::CloseDialog { confirmed: false });
                        }
                    }
                });
            });
    }
}

impl App for ReceiptTaskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let mut actions = Vec::new();
        self.show_status_bar(ctx);
        self.show_main_panel(ctx, &mut actions);
        self.show_dialog(ctx, &mut actions);
        for action in actions {
            self.apply(action);
        }
    }
}

/// Receipt geometry and fonts from the `receipt` settings section.
///
/// Paper width, resolution and margin always come from the 80 mm profile.
fn receipt_layout(settings: &ReceiptLayoutSettings) -> (ReceiptGeometry, ReceiptFonts) {
    let geometry = ReceiptGeometry {
        bottom_padding_px: settings.bottom_padding_px,
        ..ReceiptGeometry::thermal_80mm()
    };
    let fonts = ReceiptFonts::new(
        &settings.font_family,
        settings.task_font_px,
        settings.timestamp_font_px,
    );
    (geometry, fonts)
}
