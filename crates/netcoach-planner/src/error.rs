use thiserror::Error;

use crate::board::Day;

/// Errors from task placement on a [`crate::board::WeeklyBoard`].
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("task '{0}' already exists on the board")]
    DuplicateTask(String),

    #[error("task '{task_id}' is already placed on {day}")]
    AlreadyPlaced { task_id: String, day: Day },

    #[error("task '{0}' is still in the pool")]
    NotPlaced(String),

    #[error("unknown day: {0}")]
    UnknownDay(String),
}
