use chrono::{Local, NaiveDateTime};
use receipt_tasks_core::{
    print_all, BatchOutcome, PendingClear, PrintAllError, TaskError, TaskList, TaskPrinter,
};
use receipt_tasks_printing::{preferred_printer, DiscoveryError};
use tracing::info;

pub const READY_STATUS: &str = "Ready - Enter tasks to begin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Warning,
    Error,
}

/// Modal dialog waiting for the user.
#[derive(Debug, PartialEq, Eq)]
pub enum Dialog {
    Message {
        kind: DialogKind,
        title: &'static str,
        message: String,
    },
    ConfirmClear(PendingClear),
}

impl Dialog {
    fn info(title: &'static str, message: impl Into<String>) -> Self {
        Dialog::Message {
            kind: DialogKind::Info,
            title,
            message: message.into(),
        }
    }

    fn warning(title: &'static str, message: impl Into<String>) -> Self {
        Dialog::Message {
            kind: DialogKind::Warning,
            title,
            message: message.into(),
        }
    }

    fn error(title: &'static str, message: impl Into<String>) -> Self {
        Dialog::Message {
            kind: DialogKind::Error,
            title,
            message: message.into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dialog::Message { title, .. } => title,
            Dialog::ConfirmClear(_) => "Confirm Clear",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Dialog::Message { message, .. } => message.clone(),
            Dialog::ConfirmClear(pending) => format!(
                "Are you sure you want to clear all {} tasks?",
                pending.count()
            ),
        }
    }
}

/// Window state behind the widgets. The visible rows are re-rendered from the
/// task list after every mutation and never edited directly.
#[derive(Debug)]
pub struct AppState {
    tasks: TaskList,
    rows: Vec<String>,
    selected: Option<usize>,
    input: String,
    printers: Vec<String>,
    selected_printer: Option<String>,
    status: String,
    dialog: Option<Dialog>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            tasks: TaskList::new(),
            rows: Vec::new(),
            selected: None,
            input: String::new(),
            printers: Vec::new(),
            selected_printer: None,
            status: READY_STATUS.to_string(),
            dialog: None,
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn printers(&self) -> &[String] {
        &self.printers
    }

    pub fn selected_printer(&self) -> Option<&str> {
        self.selected_printer.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn has_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Replaces the printer choices with a discovery result and picks the default:
    /// the first `vendor` printer, else the first printer, else nothing.
    pub fn load_printers(&mut self, result: Result<Vec<String>, DiscoveryError>, vendor: &str) {
        match result {
            Ok(printers) => {
                self.selected_printer = preferred_printer(&printers, vendor)
                    .or_else(|| printers.first().map(String::as_str))
                    .map(str::to_string);
                self.printers = printers;
                if let Some(printer) = &self.selected_printer {
                    info!(printer = %printer, "default printer selected");
                }
            }
            Err(err) => {
                self.printers.clear();
                self.selected_printer = None;
                self.dialog = Some(Dialog::error(
                    "Printer Error",
                    format!("Could not list printers: {err}"),
                ));
            }
        }
    }

    pub fn select_printer(&mut self, name: &str) {
        if !self.printers.iter().any(|printer| printer == name) {
            return;
        }
        info!(printer = name, "printer selected");
        self.selected_printer = Some(name.to_string());
        self.status = format!("Printer selected: {name}");
    }

    /// Adds the current input as a task; the input is cleared only on success.
    pub fn add_task(&mut self) {
        let added = self.tasks.add(&self.input).map(|_| ());
        match added {
            Ok(()) => {
                self.input.clear();
                self.refresh_rows();
                self.status = format!("Task added. Total tasks: {}", self.tasks.len());
            }
            Err(TaskError::TooLong { max, .. }) => {
                self.dialog = Some(Dialog::warning(
                    "Task Too Long",
                    format!("Task description must be {max} characters or less."),
                ));
            }
            Err(_) => {
                self.dialog = Some(Dialog::warning(
                    "Empty Task",
                    "Please enter a task description.",
                ));
            }
        }
    }

    pub fn select_row(&mut self, row: Option<usize>) {
        self.selected = row.filter(|row| *row < self.rows.len());
    }

    pub fn remove_selected(&mut self) {
        match self.tasks.remove(self.selected) {
            Ok(_) => {
                self.selected = None;
                self.refresh_rows();
                self.status = format!("Task removed. Total tasks: {}", self.tasks.len());
            }
            Err(_) => {
                self.dialog = Some(Dialog::info(
                    "No Selection",
                    "Please select a task to remove.",
                ));
            }
        }
    }

    /// Opens the clear confirmation, or explains that there is nothing to clear.
    pub fn request_clear(&mut self) {
        self.dialog = Some(match self.tasks.begin_clear() {
            Ok(pending) => Dialog::ConfirmClear(pending),
            Err(_) => Dialog::info("Empty List", "No tasks to clear."),
        });
    }

    /// Closes the open dialog; a confirmed clear empties the list.
    pub fn resolve_dialog(&mut self, confirmed: bool) {
        if let Some(Dialog::ConfirmClear(pending)) = self.dialog.take() {
            if confirmed {
                self.tasks.confirm_clear(pending);
                self.selected = None;
                self.refresh_rows();
                self.status = "All tasks cleared".to_string();
            }
        }
    }

    /// Prints every task on the selected printer, stamping each with `clock`.
    pub fn print_all_with<P, C>(&mut self, printer: &P, clock: C)
    where
        P: TaskPrinter,
        C: FnMut() -> NaiveDateTime,
    {
        let outcome = print_all(
            &mut self.tasks,
            self.selected_printer.as_deref(),
            printer,
            clock,
        );
        match outcome {
            Err(PrintAllError::NoPrinter) => {
                self.dialog = Some(Dialog::error(
                    "No Printer",
                    "Please select a printer before printing.",
                ));
            }
            Err(PrintAllError::NoTasks) => {
                self.dialog = Some(Dialog::info("No Tasks", "There are no tasks to print."));
            }
            Ok(BatchOutcome::Printed { count }) => {
                self.selected = None;
                self.refresh_rows();
                self.status = format!("All {count} tasks printed.");
                self.dialog = Some(Dialog::info(
                    "Print Complete",
                    format!("All {count} tasks printed successfully."),
                ));
            }
            Ok(outcome @ BatchOutcome::Failed { .. }) => {
                let message = format!(
                    "{} task(s) failed to print. See log for details.",
                    outcome.failure_count()
                );
                self.status = message.clone();
                self.dialog = Some(Dialog::error("Print Error", message));
            }
        }
    }

    /// Prints every task, stamping each with the local wall-clock time.
    pub fn print_all<P: TaskPrinter>(&mut self, printer: &P) {
        self.print_all_with(printer, || Local::now().naive_local());
    }

    fn refresh_rows(&mut self) {
        self.rows = self.tasks.render();
        if self.selected.is_some_and(|row| row >= self.rows.len()) {
            self.selected = None;
        }
    }
}
