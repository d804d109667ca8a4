use std::fmt;

use thiserror::Error;
use tracing::info;

/// 單一任務允許的最大字元數。 / Maximum number of characters allowed in one task.
pub const MAX_TASK_CHARS: usize = 100;

/// 任務清單操作的驗證錯誤。 / Validation failures raised by task list operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task description is empty")]
    Empty,
    #[error("task description has {length} characters; at most {max} are allowed")]
    TooLong { length: usize, max: usize },
    #[error("no task is selected")]
    NoSelection,
    #[error("there are no tasks to clear")]
    NothingToClear,
}

/// 已修剪且通過長度驗證的任務文字。 / A trimmed task description that passed length validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task(String);

impl Task {
    /// 修剪空白並驗證長度。 / Trims surrounding whitespace and validates the length.
    pub fn parse(text: &str) -> Result<Self, TaskError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TaskError::Empty);
        }
        let length = trimmed.chars().count();
        if length > MAX_TASK_CHARS {
            return Err(TaskError::TooLong {
                length,
                max: MAX_TASK_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 清除操作的確認憑證，只能由 [`TaskList::begin_clear`] 取得。
/// / Confirmation token for a clear; only [`TaskList::begin_clear`] hands one out.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingClear {
    count: usize,
}

impl PendingClear {
    /// 要求確認時清單中的任務數。 / Number of tasks in the list when confirmation was requested.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// 依插入順序保存待列印任務。 / Holds pending tasks in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 驗證後附加到清單尾端。 / Validates the text and appends it to the tail.
    pub fn add(&mut self, text: &str) -> Result<&Task, TaskError> {
        let task = Task::parse(text)?;
        info!(task = %task, total = self.tasks.len() + 1, "task added");
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// 移除指定位置（0 起算）的任務；`None` 表示沒有選取。
    /// / Removes the task at the 0-based index; `None` means nothing is selected.
    pub fn remove(&mut self, index: Option<usize>) -> Result<Task, TaskError> {
        let index = index
            .filter(|index| *index < self.tasks.len())
            .ok_or(TaskError::NoSelection)?;
        let removed = self.tasks.remove(index);
        info!(task = %removed, position = index + 1, total = self.tasks.len(), "task removed");
        Ok(removed)
    }

    /// 開始清除流程；清單為空時失敗。 / Starts a clear; fails when the list is already empty.
    pub fn begin_clear(&self) -> Result<PendingClear, TaskError> {
        if self.tasks.is_empty() {
            return Err(TaskError::NothingToClear);
        }
        Ok(PendingClear {
            count: self.tasks.len(),
        })
    }

    /// 使用者確認後清除全部任務，回傳清除數量。 / Discards every task once the user confirmed.
    pub fn confirm_clear(&mut self, pending: PendingClear) -> usize {
        let cleared = self.tasks.len();
        self.tasks.clear();
        info!(cleared, requested = pending.count, "all tasks cleared");
        cleared
    }

    pub(crate) fn discard_all(&mut self) {
        self.tasks.clear();
    }

    /// 產生 `"{序號}. {任務}"` 形式的顯示列。 / Renders `"{position}. {text}"` rows, numbered from 1.
    pub fn render(&self) -> Vec<String> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(index, task)| format!("{}. {}", index + 1, task))
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
