//! The `netcoach topics` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use netcoach_core::topics::TopicProgressReport;

use super::{percent, DataArgs, Session};

pub async fn execute(
    args: DataArgs,
    student: String,
    format: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let session = Session::open(&args)?;
    let format = session.format(format);

    let progress = session.engine.topic_progress(&student).await?;
    session.emit(&progress, &format, output.as_deref(), print_progress)
}

fn print_progress(report: &TopicProgressReport) {
    if report.empty {
        println!("No topics on the checklist of {}.", report.student_id);
        return;
    }
    println!(
        "{}/{} topics completed ({}), {} in progress",
        report.counts.completed,
        report.counts.total,
        percent(report.completion_rate),
        report.counts.in_progress
    );

    let mut table = Table::new();
    table.set_header(vec!["Ders", "Tamamlanan", "Devam", "İlerleme", "Sıradaki Konu"]);
    for lesson in &report.lessons {
        table.add_row(vec![
            Cell::new(&lesson.lesson),
            Cell::new(format!("{}/{}", lesson.counts.completed, lesson.counts.total)),
            Cell::new(lesson.counts.in_progress),
            Cell::new(percent(lesson.completion_rate)),
            Cell::new(lesson.next_topic.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}
