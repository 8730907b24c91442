//! The `netcoach compare` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use netcoach_core::report::{read_json, StudentAnalysis};
use netcoach_core::trend::{compare_lessons, LessonComparison, TrendResult};

use crate::config::load_config_from;

#[derive(Serialize)]
struct AnalysisComparison {
    baseline_period: String,
    current_period: String,
    overall: TrendResult,
    lessons: LessonComparison,
}

impl AnalysisComparison {
    fn to_markdown(&self) -> String {
        let mut md = format!(
            "## Karşılaştırma: {} → {}\n\n",
            self.baseline_period, self.current_period
        );
        md.push_str(&format!(
            "Genel başarı: **{}** ({:+.1} puan)\n\n",
            self.overall.status, self.overall.change_percent
        ));
        if !self.lessons.improved.is_empty() || !self.lessons.declined.is_empty() {
            md.push_str("| Ders | Önceki | Şimdi | Değişim |\n|---|---|---|---|\n");
            for c in self.lessons.improved.iter().chain(&self.lessons.declined) {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:+.1} |\n",
                    c.lesson.replace('|', "\\|"),
                    c.previous_accuracy,
                    c.current_accuracy,
                    c.change
                ));
            }
        }
        if !self.lessons.new_lessons.is_empty() {
            md.push_str(&format!(
                "\nYeni dersler: {}\n",
                self.lessons.new_lessons.join(", ")
            ));
        }
        if !self.lessons.removed_lessons.is_empty() {
            md.push_str(&format!(
                "\nBırakılan dersler: {}\n",
                self.lessons.removed_lessons.join(", ")
            ));
        }
        md
    }
}

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    config: Option<PathBuf>,
    fail_on_decline: bool,
    format: String,
) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let baseline: StudentAnalysis = read_json(&baseline_path)?;
    let current: StudentAnalysis = read_json(&current_path)?;

    let report = AnalysisComparison {
        baseline_period: baseline.period.label(),
        current_period: current.period.label(),
        overall: config.thresholds.trend(
            current.overall_stats.accuracy_rate,
            baseline.overall_stats.accuracy_rate,
        ),
        lessons: compare_lessons(
            &current.lesson_stats,
            &baseline.lesson_stats,
            &config.thresholds,
        ),
    };

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison {} -> {}: overall {} ({:+.1})",
                report.baseline_period,
                report.current_period,
                report.overall.status,
                report.overall.change_percent
            );
            println!(
                "{} improved, {} declined, {} stable",
                report.lessons.improved.len(),
                report.lessons.declined.len(),
                report.lessons.stable
            );

            if !report.lessons.declined.is_empty() {
                println!("\nDeclines:");
                for c in &report.lessons.declined {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1})",
                        c.lesson, c.previous_accuracy, c.current_accuracy, c.change
                    );
                }
            }

            if !report.lessons.improved.is_empty() {
                println!("\nImprovements:");
                for c in &report.lessons.improved {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1})",
                        c.lesson, c.previous_accuracy, c.current_accuracy, c.change
                    );
                }
            }

            if !report.lessons.new_lessons.is_empty() {
                println!("\n{} new lesson(s)", report.lessons.new_lessons.len());
            }
            if !report.lessons.removed_lessons.is_empty() {
                println!("{} dropped lesson(s)", report.lessons.removed_lessons.len());
            }
        }
    }

    if fail_on_decline && report.lessons.has_declines() {
        std::process::exit(1);
    }

    Ok(())
}
