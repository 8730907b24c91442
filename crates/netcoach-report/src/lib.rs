//! netcoach-report: HTML and Markdown renditions of study reports.

pub mod html;
pub mod markdown;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;

use netcoach_core::aggregate::ExamSummary;
use netcoach_core::report::{
    CoachWeeklySummary, DailyReport, MonthlyReport, StudentAnalysis, WeeklyReport,
};
use netcoach_core::topics::TopicProgressReport;
use netcoach_core::trend::AnalysisThresholds;

/// File formats a report can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Html,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            other => anyhow::bail!("unknown output format: {other} (expected json, markdown, html)"),
        }
    }
}

/// A report that can be rendered as a document.
pub trait Render: Serialize {
    fn title(&self) -> String;
    /// HTML fragment; accuracy cells are coloured by `thresholds`.
    fn html_body(&self, thresholds: &AnalysisThresholds) -> String;
    fn markdown(&self) -> String;
}

impl Render for ExamSummary {
    fn title(&self) -> String {
        format!("Sınav Sonucu: {}", self.exam_name.as_deref().unwrap_or(&self.exam_id))
    }
    fn html_body(&self, thresholds: &AnalysisThresholds) -> String {
        html::exam_body(self, thresholds)
    }
    fn markdown(&self) -> String {
        markdown::exam(self)
    }
}

impl Render for StudentAnalysis {
    fn title(&self) -> String {
        "Öğrenci Analizi".to_string()
    }
    fn html_body(&self, thresholds: &AnalysisThresholds) -> String {
        html::analysis_body(self, thresholds)
    }
    fn markdown(&self) -> String {
        markdown::analysis(self)
    }
}

impl Render for DailyReport {
    fn title(&self) -> String {
        format!("Günlük Rapor: {}", self.date.format("%d.%m.%Y"))
    }
    fn html_body(&self, thresholds: &AnalysisThresholds) -> String {
        html::daily_body(self, thresholds)
    }
    fn markdown(&self) -> String {
        markdown::daily(self)
    }
}

impl Render for WeeklyReport {
    fn title(&self) -> String {
        format!("Haftalık Rapor: {}", self.period.label())
    }
    fn html_body(&self, thresholds: &AnalysisThresholds) -> String {
        html::weekly_body(self, thresholds)
    }
    fn markdown(&self) -> String {
        markdown::weekly(self)
    }
}

impl Render for MonthlyReport {
    fn title(&self) -> String {
        format!("Aylık Rapor: {}", self.period.label())
    }
    fn html_body(&self, thresholds: &AnalysisThresholds) -> String {
        html::monthly_body(self, thresholds)
    }
    fn markdown(&self) -> String {
        markdown::monthly(self)
    }
}

impl Render for CoachWeeklySummary {
    fn title(&self) -> String {
        format!("Koç Haftalık Özeti: {}", self.period.label())
    }
    fn html_body(&self, thresholds: &AnalysisThresholds) -> String {
        html::coach_body(self, thresholds)
    }
    fn markdown(&self) -> String {
        markdown::coach(self)
    }
}

impl Render for TopicProgressReport {
    fn title(&self) -> String {
        format!("Konu Takibi: {}", self.student_id)
    }
    fn html_body(&self, _thresholds: &AnalysisThresholds) -> String {
        html::topics_body(self)
    }
    fn markdown(&self) -> String {
        markdown::topics(self)
    }
}

/// Render `report` in `format`.
pub fn render<R: Render>(
    report: &R,
    format: OutputFormat,
    thresholds: &AnalysisThresholds,
) -> Result<String> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    Ok(match format {
        OutputFormat::Json => json,
        OutputFormat::Markdown => report.markdown(),
        OutputFormat::Html => html::page(&report.title(), &report.html_body(thresholds), &json),
    })
}

/// Render and write `report` to `path`, creating parent directories.
pub fn write_report<R: Render>(
    report: &R,
    format: OutputFormat,
    thresholds: &AnalysisThresholds,
    path: &Path,
) -> Result<()> {
    let content = render(report, format, thresholds)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {format} report to {}", path.display()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use netcoach_core::model::{ActivityEntry, ReportPeriod};
    use netcoach_core::report::{
        compute_coach_weekly_summary, weekly_report_for, CoachWeeklySummary, StudentProgress,
        WeeklyReport,
    };
    use netcoach_core::model::{TopicRecord, TopicStatus};
    use netcoach_core::topics::{compute_topic_progress, TopicProgressReport};
    use netcoach_core::trend::TrendStatus;

    pub fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn entry(day: u32, lesson: &str, solved: i64, correct: i64) -> ActivityEntry {
        ActivityEntry {
            student_id: "s1".into(),
            date: date(day),
            lesson: lesson.into(),
            topic: None,
            solved,
            correct,
            wrong: solved - correct,
            minutes: 40,
        }
    }

    /// Week of Monday 11 March 2024, rising from 60% to 90%.
    pub fn weekly() -> WeeklyReport {
        let entries = vec![
            entry(11, "Matematik", 20, 12),
            entry(16, "Matematik", 10, 9),
            entry(14, "Fizik", 5, 4),
        ];
        weekly_report_for(date(11), &entries).unwrap()
    }

    pub fn empty_weekly() -> WeeklyReport {
        weekly_report_for(date(11), &[]).unwrap()
    }

    fn progress(
        id: &str,
        name: &str,
        now: f64,
        before: f64,
        status: TrendStatus,
        needs_attention: bool,
    ) -> StudentProgress {
        StudentProgress {
            student_id: id.into(),
            student_name: name.into(),
            questions_solved: 100,
            accuracy_rate: now,
            previous_accuracy_rate: before,
            change: now - before,
            status,
            needs_attention,
            last_activity: Some(date(15)),
        }
    }

    fn topic(id: &str, lesson: &str, name: &str, status: TopicStatus) -> TopicRecord {
        TopicRecord {
            topic_id: id.into(),
            student_id: "s1".into(),
            lesson: lesson.into(),
            topic: name.into(),
            status,
            order_index: 0,
            exam_type: None,
        }
    }

    /// Two lessons, each half done.
    pub fn topics() -> TopicProgressReport {
        let topics = vec![
            topic("k1", "TYT - Matematik", "Limit", TopicStatus::Completed),
            topic("k2", "TYT - Matematik", "Türev", TopicStatus::InProgress),
            topic("k3", "TYT - Türkçe", "Sözcükte Anlam", TopicStatus::Completed),
            topic("k4", "TYT - Türkçe", "Paragraf", TopicStatus::NotStarted),
        ];
        compute_topic_progress("s1", &topics).unwrap()
    }

    pub fn no_topics() -> TopicProgressReport {
        compute_topic_progress("s1", &[]).unwrap()
    }

    pub fn coach() -> CoachWeeklySummary {
        compute_coach_weekly_summary(
            ReportPeriod::week_of(date(11)),
            vec![
                progress("s1", "Ayşe", 80.0, 70.0, TrendStatus::Improved, false),
                progress(
                    "s2",
                    "<script>alert(1)</script>",
                    50.0,
                    65.0,
                    TrendStatus::Declined,
                    true,
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn render_json_round_trips_trend_label() {
        let json = render(
            &fixtures::weekly(),
            OutputFormat::Json,
            &AnalysisThresholds::default(),
        ).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["trend"], "Yükseliş");
    }

    #[test]
    fn render_html_embeds_raw_json() {
        let html = render(
            &fixtures::coach(),
            OutputFormat::Html,
            &AnalysisThresholds::default(),
        ).unwrap();
        assert!(html.contains("<title>Koç Haftalık Özeti: 11.03.2024 - 17.03.2024</title>"));
        assert!(html.contains("Ham JSON"));
    }

    #[test]
    fn write_report_to_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("weekly.md");
        write_report(
            &fixtures::weekly(),
            OutputFormat::Markdown,
            &AnalysisThresholds::default(),
            &path,
        ).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Haftalık Rapor"));
    }
}
