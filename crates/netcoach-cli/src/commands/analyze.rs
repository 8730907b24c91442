//! The `netcoach analyze` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use netcoach_core::model::{LessonStat, ReportPeriod};
use netcoach_core::report::{write_json, StudentAnalysis};
use netcoach_core::traits::ActivitySource;
use netcoach_core::trend::compare_lessons;

use super::{lesson_table, percent, today, DataArgs, Session};

/// Days covered when no `--from` is given.
const DEFAULT_WINDOW_DAYS: u32 = 7;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    args: DataArgs,
    student: String,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    format: Option<String>,
    output: Option<PathBuf>,
    save: bool,
) -> Result<()> {
    let session = Session::open(&args)?;
    let format = session.format(format);

    let end = to.unwrap_or_else(today);
    let period = match from {
        Some(start) => ReportPeriod::new(start, end)?,
        None => ReportPeriod::trailing_days(end, DEFAULT_WINDOW_DAYS),
    };

    let analysis = session.engine.student_analysis(&student, period).await?;

    if save {
        let path = session.config.output_dir.join(format!(
            "analysis-{student}-{}.json",
            period.end.format("%Y%m%d")
        ));
        write_json(&analysis, &path)?;
        eprintln!("Saved analysis to {}", path.display());
    }

    let previous = session
        .source
        .previous_lesson_stats(&student, &period)
        .await?;
    let thresholds = *session.engine.thresholds();

    session.emit(&analysis, &format, output.as_deref(), |a| {
        print_analysis(a);
        let comparison = compare_lessons(&a.lesson_stats, &previous, &thresholds);
        if !comparison.improved.is_empty() || comparison.has_declines() {
            println!("\nCompared with {}:", period.previous().label());
            for c in &comparison.improved {
                println!(
                    "  + {} {:.1}% -> {:.1}% ({:+.1})",
                    c.lesson, c.previous_accuracy, c.current_accuracy, c.change
                );
            }
            for c in &comparison.declined {
                println!(
                    "  - {} {:.1}% -> {:.1}% ({:+.1})",
                    c.lesson, c.previous_accuracy, c.current_accuracy, c.change
                );
            }
        }
    })
}

fn names(stats: &[LessonStat]) -> String {
    if stats.is_empty() {
        return "-".to_string();
    }
    stats
        .iter()
        .map(|s| s.lesson.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_analysis(analysis: &StudentAnalysis) {
    println!("Period: {}", analysis.period.label());
    if analysis.empty {
        println!("No questions solved in this period.");
        return;
    }
    let overall = &analysis.overall_stats;
    println!(
        "{} solved, {} correct, {} wrong, accuracy {}",
        overall.total_solved,
        overall.total_correct,
        overall.total_wrong,
        percent(overall.accuracy_rate)
    );
    println!("{}", lesson_table(&analysis.lesson_stats));
    println!("Weak lessons:   {}", names(&analysis.weak_lessons));
    println!("Strong lessons: {}", names(&analysis.strong_lessons));
}
