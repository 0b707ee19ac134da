//! Pure projections over an in-memory task collection: filtering,
//! deterministic sorting, and aggregate statistics. No I/O.

use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{Priority, Task};

/// Completion-state filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" => Ok(StatusFilter::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown status filter '{other}' (expected all, pending, or completed)"
            ))),
        }
    }
}

/// Combined display filter. All present predicates AND together.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    pub category: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self.status {
            StatusFilter::All => {}
            StatusFilter::Pending => {
                if task.completed {
                    return false;
                }
            }
            StatusFilter::Completed => {
                if !task.completed {
                    return false;
                }
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref() {
            if !task.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        true
    }
}

/// Filter a collection for display, returning copies.
pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect()
}

/// Stable multi-key display sort: incomplete before completed, then
/// priority weight descending, then newer `created_at` first.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| {
        left.completed
            .cmp(&right.completed)
            .then_with(|| right.priority.weight().cmp(&left.priority.weight()))
            .then_with(|| right.created_at.cmp(&left.created_at))
    });
}

/// Aggregate statistics for a task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Rounded percent of completed tasks; 0 when the collection is empty.
    pub completion_rate: u32,
    pub high_priority_pending: usize,
}

pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let completion_rate = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    };
    let high_priority_pending = tasks
        .iter()
        .filter(|task| task.priority == Priority::High && !task.completed)
        .count();
    TaskStats {
        total,
        completed,
        pending: total - completed,
        completion_rate,
        high_priority_pending,
    }
}

/// A task is overdue iff it has a due date, is not completed, and the due
/// date (date only) is strictly before `today`.
pub fn is_overdue_on(task: &Task, today: NaiveDate) -> bool {
    match task.due_date {
        Some(due) if !task.completed => due.with_timezone(&Local).date_naive() < today,
        _ => false,
    }
}

/// Overdue check against the local calendar date.
pub fn is_overdue(task: &Task) -> bool {
    is_overdue_on(task, Local::now().date_naive())
}
