use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{error, info};

use crate::task_list::TaskList;

/// Prints one task as one receipt on a named printer.
///
/// Implemented by the receipt formatter; tests substitute stubs.
pub trait TaskPrinter {
    type Error: fmt::Display;

    fn print_task(
        &self,
        printer: &str,
        task: &str,
        timestamp: NaiveDateTime,
    ) -> Result<(), Self::Error>;
}

/// Reasons a batch is refused before any task is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrintAllError {
    #[error("no printer is selected")]
    NoPrinter,
    #[error("there are no tasks to print")]
    NoTasks,
}

/// A task that failed to print, identified by its 1-based display position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub position: usize,
    pub message: String,
}

/// Aggregate result of a batch that was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every task printed; the list has been emptied.
    Printed { count: usize },
    /// At least one task failed; the list is left untouched.
    Failed {
        attempted: usize,
        failures: Vec<TaskFailure>,
    },
}

impl BatchOutcome {
    pub fn failure_count(&self) -> usize {
        match self {
            BatchOutcome::Printed { .. } => 0,
            BatchOutcome::Failed { failures, .. } => failures.len(),
        }
    }
}

/// Prints every task in display order, one job per task.
///
/// A fresh timestamp is taken from `clock` for each task. Failures are
/// collected without stopping the pass. The list is consumed only when the
/// whole batch succeeded; otherwise it stays as it was, including tasks that
/// did print.
pub fn print_all<P, C>(
    tasks: &mut TaskList,
    printer: Option<&str>,
    formatter: &P,
    mut clock: C,
) -> Result<BatchOutcome, PrintAllError>
where
    P: TaskPrinter,
    C: FnMut() -> NaiveDateTime,
{
    let printer = printer
        .filter(|name| !name.trim().is_empty())
        .ok_or(PrintAllError::NoPrinter)?;
    if tasks.is_empty() {
        return Err(PrintAllError::NoTasks);
    }

    let mut failures = Vec::new();
    for (index, task) in tasks.iter().enumerate() {
        let position = index + 1;
        if let Err(err) = formatter.print_task(printer, task.as_str(), clock()) {
            error!(position, printer, task = %task, error = %err, "error printing task");
            failures.push(TaskFailure {
                position,
                message: err.to_string(),
            });
        }
    }

    let attempted = tasks.len();
    if failures.is_empty() {
        info!(printer, count = attempted, "all tasks printed");
        tasks.discard_all();
        Ok(BatchOutcome::Printed { count: attempted })
    } else {
        error!(
            printer,
            failed = failures.len(),
            attempted,
            "batch print finished with failures"
        );
        Ok(BatchOutcome::Failed {
            attempted,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct AlwaysOk;

    impl TaskPrinter for AlwaysOk {
        type Error = String;

        fn print_task(&self, _: &str, _: &str, _: NaiveDateTime) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(8, 5, 0))
            .unwrap()
    }

    #[test]
    fn blank_printer_name_counts_as_unselected() {
        let mut tasks = TaskList::new();
        tasks.add("Buy milk").unwrap();
        let result = print_all(&mut tasks, Some("  "), &AlwaysOk, fixed_clock);
        assert_eq!(result, Err(PrintAllError::NoPrinter));
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn failure_count_reflects_outcome() {
        assert_eq!(BatchOutcome::Printed { count: 3 }.failure_count(), 0);
        let failed = BatchOutcome::Failed {
            attempted: 2,
            failures: vec![TaskFailure {
                position: 2,
                message: "jam".into(),
            }],
        };
        assert_eq!(failed.failure_count(), 1);
    }
}
