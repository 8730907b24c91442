//! The weekly board: an unplaced pool plus one slot list per weekday.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use chrono::{Days, NaiveDate};
use netcoach_core::model::{ReportPeriod, TaskRecord};
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Day of a Monday-start week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Turkish day name as shown on the board.
    pub fn label(self) -> &'static str {
        match self {
            Day::Monday => "Pazartesi",
            Day::Tuesday => "Salı",
            Day::Wednesday => "Çarşamba",
            Day::Thursday => "Perşembe",
            Day::Friday => "Cuma",
            Day::Saturday => "Cumartesi",
            Day::Sunday => "Pazar",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Day {
    type Err = PlannerError;

    /// Accepts English names, their three-letter forms, or the Turkish label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Day::ALL
            .into_iter()
            .find(|d| {
                let english = format!("{d:?}").to_lowercase();
                wanted == english || wanted == english[..3] || wanted == d.label().to_lowercase()
            })
            .ok_or_else(|| PlannerError::UnknownDay(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardTask {
    pub task_id: String,
    pub title: String,
    #[serde(default)]
    pub lesson: Option<String>,
    /// Planned study time.
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub completed: bool,
}

impl BoardTask {
    pub fn new(task_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            title: title.into(),
            lesson: None,
            minutes: 0,
            completed: false,
        }
    }
}

/// What a placement call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Moved,
    Unchanged,
}

/// Where a task currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Pool,
    Day(Day),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyBoard {
    pub student_id: String,
    /// Monday of the planned week.
    pub week_start: NaiveDate,
    #[serde(default)]
    pub pool: Vec<BoardTask>,
    #[serde(default)]
    pub days: [Vec<BoardTask>; 7],
}

impl WeeklyBoard {
    /// An empty board for the Monday-start week containing `date`.
    pub fn new(student_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            student_id: student_id.into(),
            week_start: ReportPeriod::week_of(date).start,
            pool: Vec::new(),
            days: Default::default(),
        }
    }

    pub fn day(&self, day: Day) -> &[BoardTask] {
        &self.days[day.index()]
    }

    pub fn date_of(&self, day: Day) -> NaiveDate {
        self.week_start + Days::new(day.index() as u64)
    }

    pub fn locate(&self, task_id: &str) -> Option<Slot> {
        if self.pool.iter().any(|t| t.task_id == task_id) {
            return Some(Slot::Pool);
        }
        Day::ALL
            .into_iter()
            .find(|d| self.day(*d).iter().any(|t| t.task_id == task_id))
            .map(Slot::Day)
    }

    /// Put a new task in the pool.
    pub fn add_to_pool(&mut self, task: BoardTask) -> Result<(), PlannerError> {
        if self.locate(&task.task_id).is_some() {
            return Err(PlannerError::DuplicateTask(task.task_id));
        }
        self.pool.push(task);
        Ok(())
    }

    /// Move a pool task to the end of `day`. Repeating the call for the same
    /// day changes nothing.
    pub fn assign_from_pool(&mut self, task_id: &str, day: Day) -> Result<Placement, PlannerError> {
        match self.locate(task_id) {
            None => Err(PlannerError::UnknownTask(task_id.to_string())),
            Some(Slot::Day(current)) if current == day => Ok(Placement::Unchanged),
            Some(Slot::Day(current)) => Err(PlannerError::AlreadyPlaced {
                task_id: task_id.to_string(),
                day: current,
            }),
            Some(Slot::Pool) => {
                let task = take(&mut self.pool, task_id)?;
                self.days[day.index()].push(task);
                tracing::debug!(task_id, day = %day, "task assigned from pool");
                Ok(Placement::Moved)
            }
        }
    }

    /// Move a placed task to the end of `new_day`. Moving to the day it is
    /// already on changes nothing.
    pub fn move_task(&mut self, task_id: &str, new_day: Day) -> Result<Placement, PlannerError> {
        match self.locate(task_id) {
            None => Err(PlannerError::UnknownTask(task_id.to_string())),
            Some(Slot::Pool) => Err(PlannerError::NotPlaced(task_id.to_string())),
            Some(Slot::Day(current)) if current == new_day => Ok(Placement::Unchanged),
            Some(Slot::Day(current)) => {
                let task = take(&mut self.days[current.index()], task_id)?;
                self.days[new_day.index()].push(task);
                tracing::debug!(task_id, from = %current, to = %new_day, "task moved");
                Ok(Placement::Moved)
            }
        }
    }

    pub fn planned_minutes(&self, day: Day) -> u32 {
        self.day(day).iter().map(|t| t.minutes).sum()
    }

    /// Placed tasks as records due on their day, for daily reports.
    pub fn task_records(&self) -> Vec<TaskRecord> {
        Day::ALL
            .into_iter()
            .flat_map(|d| {
                self.day(d).iter().map(move |t| TaskRecord {
                    task_id: t.task_id.clone(),
                    student_id: self.student_id.clone(),
                    title: t.title.clone(),
                    lesson: t.lesson.clone(),
                    due_date: Some(self.date_of(d)),
                    completed: t.completed,
                })
            })
            .collect()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read board file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse board file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize board")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write board file: {}", path.display()))
    }
}

fn take(tasks: &mut Vec<BoardTask>, task_id: &str) -> Result<BoardTask, PlannerError> {
    let pos = tasks
        .iter()
        .position(|t| t.task_id == task_id)
        .ok_or_else(|| PlannerError::UnknownTask(task_id.to_string()))?;
    Ok(tasks.remove(pos))
}
