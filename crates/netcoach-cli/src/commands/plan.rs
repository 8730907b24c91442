//! The `netcoach plan` command: edit a weekly task board file.

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use netcoach_planner::{BoardTask, Day, Placement, WeeklyBoard};

use super::today;

pub fn create(board_path: &Path, student: String, date: Option<NaiveDate>) -> Result<()> {
    if board_path.exists() {
        anyhow::bail!("board already exists: {}", board_path.display());
    }
    let board = WeeklyBoard::new(student, date.unwrap_or_else(today));
    board.save(board_path)?;
    println!(
        "Created board for week of {} at {}",
        board.week_start.format("%d.%m.%Y"),
        board_path.display()
    );
    Ok(())
}

pub fn add(
    board_path: &Path,
    task_id: String,
    title: String,
    lesson: Option<String>,
    minutes: u32,
) -> Result<()> {
    let mut board = WeeklyBoard::load(board_path)?;
    let task = BoardTask {
        lesson,
        minutes,
        ..BoardTask::new(task_id.clone(), title)
    };
    board.add_to_pool(task)?;
    board.save(board_path)?;
    println!("Added {task_id} to the pool");
    Ok(())
}

pub fn assign(board_path: &Path, task_id: &str, day: &str) -> Result<()> {
    let day: Day = day.parse()?;
    let mut board = WeeklyBoard::load(board_path)?;
    let placement = board.assign_from_pool(task_id, day)?;
    finish(&board, board_path, placement, task_id, day)
}

pub fn move_task(board_path: &Path, task_id: &str, day: &str) -> Result<()> {
    let day: Day = day.parse()?;
    let mut board = WeeklyBoard::load(board_path)?;
    let placement = board.move_task(task_id, day)?;
    finish(&board, board_path, placement, task_id, day)
}

fn finish(
    board: &WeeklyBoard,
    board_path: &Path,
    placement: Placement,
    task_id: &str,
    day: Day,
) -> Result<()> {
    match placement {
        Placement::Moved => {
            board.save(board_path)?;
            println!("{task_id} is now on {day}");
        }
        Placement::Unchanged => println!("{task_id} is already on {day}"),
    }
    Ok(())
}

pub fn show(board_path: &Path) -> Result<()> {
    let board = WeeklyBoard::load(board_path)?;
    println!(
        "Board of {} for week of {}",
        board.student_id,
        board.week_start.format("%d.%m.%Y")
    );

    let mut table = Table::new();
    table.set_header(vec!["Gün", "Tarih", "Görevler", "Süre (dk)"]);
    for day in Day::ALL {
        let titles: Vec<String> = board
            .day(day)
            .iter()
            .map(|t| {
                let mark = if t.completed { "[x]" } else { "[ ]" };
                format!("{mark} {} ({})", t.title, t.task_id)
            })
            .collect();
        table.add_row(vec![
            Cell::new(day),
            Cell::new(board.date_of(day).format("%d.%m.%Y")),
            Cell::new(titles.join("\n")),
            Cell::new(board.planned_minutes(day)),
        ]);
    }
    println!("{table}");

    if board.pool.is_empty() {
        println!("Pool is empty.");
    } else {
        println!("Pool:");
        for t in &board.pool {
            println!("  {} {}", t.task_id, t.title);
        }
    }
    Ok(())
}
