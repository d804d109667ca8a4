pub mod batch;
pub mod task_list;

pub use batch::{print_all, BatchOutcome, PrintAllError, TaskFailure, TaskPrinter};
pub use task_list::{PendingClear, Task, TaskError, TaskList, MAX_TASK_CHARS};
