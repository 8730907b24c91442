//! The `netcoach exam` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use netcoach_core::aggregate::{ExamSummary, MultiExamSummary};
use netcoach_core::parser::decode_stored_analysis;
use netcoach_core::recommendations::{identify_weak_topics, recommend, TopicResult};

use super::{percent, DataArgs, Session};

pub async fn execute(
    args: DataArgs,
    student: String,
    exam: Option<String>,
    topics: Option<PathBuf>,
    format: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let session = Session::open(&args)?;
    let format = session.format(format);

    let Some(exam_id) = exam else {
        let history = session.engine.exam_history(&student).await?;
        return match format.as_str() {
            "text" => {
                print_history(&history);
                Ok(())
            }
            "json" => {
                println!("{}", serde_json::to_string_pretty(&history)?);
                Ok(())
            }
            other => anyhow::bail!("exam history supports text and json, not {other}"),
        };
    };

    let summary = session.engine.exam_summary(&student, &exam_id).await?;

    let mut weak_topics = match topics {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read topics: {}", path.display()))?;
            let topics: Vec<TopicResult> = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse topics: {}", path.display()))?;
            identify_weak_topics(&topics)?
        }
        None => Vec::new(),
    };
    if let Some(stored) = session
        .source
        .dataset()
        .stored_analyses
        .iter()
        .find(|s| s.exam_id == exam_id)
    {
        let (decoded, warnings) = decode_stored_analysis(stored);
        for w in &warnings {
            eprintln!("WARNING: {}", w.message);
        }
        for topic in decoded.weak_topics {
            if !weak_topics.contains(&topic) {
                weak_topics.push(topic);
            }
        }
    }
    let recommendations = recommend(&summary, &weak_topics);

    session.emit(&summary, &format, output.as_deref(), |s| {
        print_summary(s);
        println!("\n{}", recommendations.to_text());
    })
}

fn print_summary(summary: &ExamSummary) {
    println!(
        "{} ({}) {}",
        summary.exam_name.as_deref().unwrap_or(&summary.exam_id),
        summary.exam_type,
        summary.exam_date.format("%d.%m.%Y")
    );

    let mut table = Table::new();
    table.set_header(vec!["Ders", "Doğru", "Yanlış", "Boş", "Net", "Başarı"]);
    for s in &summary.subject_breakdown {
        table.add_row(vec![
            Cell::new(&s.subject_name),
            Cell::new(s.correct),
            Cell::new(s.wrong),
            Cell::new(s.blank),
            Cell::new(format!("{:.2}", s.net)),
            Cell::new(percent(s.accuracy)),
        ]);
    }
    println!("{table}");
    println!("Toplam Net: {:.2}", summary.total_net);
}

fn print_history(history: &MultiExamSummary) {
    if history.empty {
        println!("No exams recorded.");
        return;
    }
    println!(
        "{} exam(s): average net {:.2}, best {:.2}, latest {:.2}",
        history.exam_count, history.average_net, history.best_net, history.latest_net
    );

    let mut table = Table::new();
    table.set_header(vec!["Tarih", "Sınav", "Tür", "Net"]);
    for point in &history.net_progression {
        table.add_row(vec![
            Cell::new(point.exam_date.format("%d.%m.%Y")),
            Cell::new(&point.exam_id),
            Cell::new(point.exam_type),
            Cell::new(format!("{:.2}", point.total_net)),
        ]);
    }
    println!("{table}");

    let mut table = Table::new();
    table.set_header(vec!["Ders", "Sınav", "Ort. Net", "Ort. Başarı"]);
    for s in &history.subject_averages {
        table.add_row(vec![
            Cell::new(&s.subject_name),
            Cell::new(s.exam_count),
            Cell::new(format!("{:.2}", s.average_net)),
            Cell::new(percent(s.average_accuracy)),
        ]);
    }
    println!("{table}");
}
