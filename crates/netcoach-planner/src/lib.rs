//! netcoach-planner: the coach's weekly task board.
//!
//! Tasks start in an unplaced pool and are dragged onto weekdays. Both
//! placement operations are idempotent so a repeated request from the UI
//! leaves the board as it was.

pub mod board;
pub mod error;

pub use board::{BoardTask, Day, Placement, Slot, WeeklyBoard};
pub use error::PlannerError;
