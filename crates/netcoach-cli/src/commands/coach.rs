//! The `netcoach coach` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use netcoach_core::engine::ProgressReporter;
use netcoach_core::report::{write_json, CoachWeeklySummary, StudentProgress};

use super::{percent, today, DataArgs, Session};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_student_complete(&self, progress: &StudentProgress) {
        tracing::debug!(
            student = %progress.student_id,
            status = %progress.status,
            "student analyzed"
        );
    }

    fn on_student_error(&self, student_id: &str, error: &str) {
        eprintln!("  ERROR: {student_id}: {error}");
    }

    fn on_summary_complete(&self, total: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "Analyzed {}/{total} students, {failed} failed ({:.2}s)",
            total - failed,
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    args: DataArgs,
    date: Option<NaiveDate>,
    format: Option<String>,
    output: Option<PathBuf>,
    save: bool,
) -> Result<()> {
    let session = Session::open(&args)?;
    let format = session.format(format);

    let summary = session
        .engine
        .coach_weekly_summary(date.unwrap_or_else(today), &ConsoleReporter)
        .await?;

    if save {
        let path = session.config.output_dir.join(format!(
            "coach-{}.json",
            summary.period.start.format("%Y%m%d")
        ));
        write_json(&summary, &path)?;
        eprintln!("Saved summary to {}", path.display());
    }

    session.emit(&summary, &format, output.as_deref(), print_summary)
}

fn progress_table(rows: &[StudentProgress]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Öğrenci", "Çözülen", "Başarı", "Önceki", "Değişim", "Durum", "Son Aktivite",
    ]);
    for p in rows {
        let name = if p.needs_attention {
            format!("{} (!)", p.student_name)
        } else {
            p.student_name.clone()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(p.questions_solved),
            Cell::new(percent(p.accuracy_rate)),
            Cell::new(percent(p.previous_accuracy_rate)),
            Cell::new(format!("{:+.1}", p.change)),
            Cell::new(p.status),
            Cell::new(
                p.last_activity
                    .map(|d| d.format("%d.%m.%Y").to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    }
    table
}

fn print_summary(summary: &CoachWeeklySummary) {
    let counts = &summary.summary;
    println!("Coach summary for {}", summary.period.label());
    println!(
        "{} students: {} improved, {} stable, {} declined, {} need attention",
        counts.total_students,
        counts.students_improved,
        counts.students_stable,
        counts.students_declined,
        counts.attention_needed
    );
    if summary.all_students.is_empty() {
        return;
    }
    println!("{}", progress_table(&summary.all_students));
    if !summary.most_improved.is_empty() {
        let names: Vec<&str> = summary
            .most_improved
            .iter()
            .map(|p| p.student_name.as_str())
            .collect();
        println!("Most improved: {}", names.join(", "));
    }
    if !summary.most_declined.is_empty() {
        let names: Vec<&str> = summary
            .most_declined
            .iter()
            .map(|p| p.student_name.as_str())
            .collect();
        println!("Most declined: {}", names.join(", "));
    }
}
