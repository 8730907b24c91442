//! The `netcoach report` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use netcoach_core::model::ReportPeriod;
use netcoach_core::report::{compute_daily_report, DailyReport, MonthlyReport, WeeklyReport};
use netcoach_core::traits::ActivitySource;
use netcoach_planner::WeeklyBoard;

use super::{lesson_table, percent, today, DataArgs, Session};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    args: DataArgs,
    kind: String,
    student: String,
    date: Option<NaiveDate>,
    board: Option<PathBuf>,
    format: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let session = Session::open(&args)?;
    let format = session.format(format);
    let date = date.unwrap_or_else(today);

    match kind.as_str() {
        "daily" => {
            let report = match board {
                Some(path) => daily_with_board(&session, &student, date, &path).await?,
                None => session.engine.daily_report(&student, date).await?,
            };
            session.emit(&report, &format, output.as_deref(), print_daily)
        }
        "weekly" => {
            let report = session.engine.weekly_report(&student, date).await?;
            session.emit(&report, &format, output.as_deref(), print_weekly)
        }
        "monthly" => {
            let report = session.engine.monthly_report(&student, date).await?;
            session.emit(&report, &format, output.as_deref(), print_monthly)
        }
        other => anyhow::bail!("unknown report kind: {other} (expected daily, weekly, monthly)"),
    }
}

/// Daily report whose task counts also include the tasks planned on a board.
async fn daily_with_board(
    session: &Session,
    student: &str,
    date: NaiveDate,
    board_path: &std::path::Path,
) -> Result<DailyReport> {
    let board = WeeklyBoard::load(board_path)?;
    if board.student_id != student {
        anyhow::bail!(
            "board {} belongs to student {}, not {student}",
            board_path.display(),
            board.student_id
        );
    }
    let entries = session
        .source
        .activities(student, &ReportPeriod::day(date))
        .await?;
    let mut tasks = session.source.tasks(student).await?;
    for planned in board.task_records() {
        if !tasks.iter().any(|known| known.task_id == planned.task_id) {
            tasks.push(planned);
        }
    }
    Ok(compute_daily_report(date, &entries, &tasks)?)
}

fn print_daily(report: &DailyReport) {
    println!("Daily report for {}", report.date.format("%d.%m.%Y"));
    if report.empty {
        println!("No activity recorded.");
    }
    println!(
        "Solved {} (correct {}, wrong {}), accuracy {}, {} min",
        report.total_questions_solved,
        report.total_correct,
        report.total_wrong,
        percent(report.accuracy_rate),
        report.study_minutes
    );
    println!(
        "Tasks: {} completed, {} pending",
        report.completed_tasks, report.pending_tasks
    );
    if !report.lesson_breakdown.is_empty() {
        println!("{}", lesson_table(&report.lesson_breakdown));
    }
}

fn print_weekly(report: &WeeklyReport) {
    let summary = &report.summary;
    println!("Weekly report for {}", report.period.label());
    if report.empty {
        println!("No questions solved this week.");
        return;
    }
    println!(
        "Solved {}, accuracy {}, {} min, trend {} ({:+.1})",
        summary.total_solved,
        percent(summary.accuracy_rate),
        summary.study_minutes,
        summary.trend,
        summary.change_percent
    );

    let mut table = Table::new();
    table.set_header(vec!["Gün", "Çözülen", "Doğru", "Süre (dk)", "Başarı"]);
    for d in &report.daily_breakdown {
        table.add_row(vec![
            Cell::new(d.date.format("%d.%m.%Y %a")),
            Cell::new(d.solved),
            Cell::new(d.correct),
            Cell::new(d.minutes),
            Cell::new(percent(d.accuracy)),
        ]);
    }
    println!("{table}");
    println!("{}", lesson_table(&report.lesson_breakdown));
}

fn print_monthly(report: &MonthlyReport) {
    let summary = &report.summary;
    println!("Monthly report for {}", report.period.label());
    if report.empty {
        println!("No questions solved this month.");
        return;
    }
    println!(
        "Solved {}, accuracy {}, {} min, improvement {:+.1}",
        summary.total_solved,
        percent(summary.accuracy_rate),
        summary.study_minutes,
        summary.improvement_rate
    );

    let mut table = Table::new();
    table.set_header(vec!["Hafta", "Çözülen", "Doğru", "Başarı"]);
    for w in &report.weekly_breakdown {
        table.add_row(vec![
            Cell::new(&w.period),
            Cell::new(w.solved),
            Cell::new(w.correct),
            Cell::new(percent(w.accuracy)),
        ]);
    }
    println!("{table}");
    println!("{}", lesson_table(&report.lesson_breakdown));
}
