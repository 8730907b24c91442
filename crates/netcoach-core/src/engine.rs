//! Report orchestrator.
//!
//! Pulls snapshots from an [`ActivitySource`] and runs the pure analysis
//! functions over them. The coach summary fans out over students with
//! bounded parallelism.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::aggregate::{compute_exam_summary, summarize_exams, ExamSummary, MultiExamSummary};
use crate::model::ReportPeriod;
use crate::report::{
    compute_coach_weekly_summary, compute_daily_report, compute_monthly_report,
    compute_student_analysis, compute_weekly_report, daily_breakdown, student_progress,
    CoachWeeklySummary, DailyReport, MonthlyReport, StudentAnalysis, StudentProgress,
    WeeklyReport,
};
use crate::topics::{compute_topic_progress, TopicProgressReport};
use crate::traits::ActivitySource;
use crate::trend::AnalysisThresholds;

/// Configuration for the report engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum students analyzed concurrently.
    pub parallelism: usize,
    pub thresholds: AnalysisThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            thresholds: AnalysisThresholds::default(),
        }
    }
}

/// Progress reporting for multi-student runs.
pub trait ProgressReporter: Send + Sync {
    fn on_student_complete(&self, progress: &StudentProgress);
    fn on_student_error(&self, student_id: &str, error: &str);
    fn on_summary_complete(&self, total: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_student_complete(&self, _: &StudentProgress) {}
    fn on_student_error(&self, _: &str, _: &str) {}
    fn on_summary_complete(&self, _: usize, _: usize, _: Duration) {}
}

pub struct ReportEngine {
    source: Arc<dyn ActivitySource>,
    config: EngineConfig,
}

impl ReportEngine {
    pub fn new(source: Arc<dyn ActivitySource>, config: EngineConfig) -> Self {
        Self { source, config }
    }

    pub fn thresholds(&self) -> &AnalysisThresholds {
        &self.config.thresholds
    }

    /// Scored summary of one exam of a student.
    pub async fn exam_summary(&self, student_id: &str, exam_id: &str) -> Result<ExamSummary> {
        let exams = self.source.exams(student_id).await?;
        let mut exam = exams
            .into_iter()
            .find(|e| e.exam_id == exam_id)
            .with_context(|| format!("exam '{exam_id}' not found for student '{student_id}'"))?;
        if exam.subjects.is_empty() {
            exam.subjects = self.source.exam_subjects(exam_id).await?;
        }
        Ok(compute_exam_summary(&exam)?)
    }

    /// Net progression and subject averages across all exams of a student.
    pub async fn exam_history(&self, student_id: &str) -> Result<MultiExamSummary> {
        let exams = self.source.exams(student_id).await?;
        Ok(summarize_exams(&exams)?)
    }

    pub async fn student_analysis(
        &self,
        student_id: &str,
        period: ReportPeriod,
    ) -> Result<StudentAnalysis> {
        let stats = self.source.lesson_stats(student_id, &period).await?;
        Ok(compute_student_analysis(
            &stats,
            period,
            &self.config.thresholds,
        )?)
    }

    pub async fn daily_report(&self, student_id: &str, date: NaiveDate) -> Result<DailyReport> {
        let entries = self
            .source
            .activities(student_id, &ReportPeriod::day(date))
            .await?;
        let tasks = self.source.tasks(student_id).await?;
        Ok(compute_daily_report(date, &entries, &tasks)?)
    }

    /// Report for the Monday-start week containing `date`.
    pub async fn weekly_report(&self, student_id: &str, date: NaiveDate) -> Result<WeeklyReport> {
        let period = ReportPeriod::week_of(date);
        let entries = self.source.activities(student_id, &period).await?;
        Ok(compute_weekly_report(daily_breakdown(&period, &entries)?)?)
    }

    /// Report for the calendar month containing `date`.
    pub async fn monthly_report(&self, student_id: &str, date: NaiveDate) -> Result<MonthlyReport> {
        let period = ReportPeriod::month_of(date);
        let entries = self.source.activities(student_id, &period).await?;
        Ok(compute_monthly_report(&period, &entries)?)
    }

    /// Completion of a student's curriculum checklist, per lesson.
    pub async fn topic_progress(&self, student_id: &str) -> Result<TopicProgressReport> {
        let topics = self.source.topics(student_id).await?;
        Ok(compute_topic_progress(student_id, &topics)?)
    }

    /// Every student's week containing `date` against the week before.
    ///
    /// A student whose data cannot be analyzed is reported to `progress`
    /// and left out of the summary.
    pub async fn coach_weekly_summary(
        &self,
        date: NaiveDate,
        progress: &dyn ProgressReporter,
    ) -> Result<CoachWeeklySummary> {
        let start = Instant::now();
        let period = ReportPeriod::week_of(date);
        let students = self.source.students().await?;
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut futures = FuturesUnordered::new();
        for student in students {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let thresholds = self.config.thresholds;

            futures.push(async move {
                let student_id = student.student_id.clone();
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    let current = source.activities(&student.student_id, &period).await?;
                    let previous = source
                        .activities(&student.student_id, &period.previous())
                        .await?;
                    Ok::<_, anyhow::Error>(student_progress(
                        &student,
                        &current,
                        &previous,
                        &thresholds,
                    )?)
                };
                (student_id, inner.await)
            });
        }

        let total = futures.len();
        let mut failed = 0usize;
        let mut rows = Vec::with_capacity(total);
        while let Some((student_id, result)) = futures.next().await {
            match result {
                Ok(row) => {
                    progress.on_student_complete(&row);
                    rows.push(row);
                }
                Err(e) => {
                    tracing::error!("analysis failed for student {student_id}: {e:#}");
                    progress.on_student_error(&student_id, &e.to_string());
                    failed += 1;
                }
            }
        }

        progress.on_summary_complete(total, failed, start.elapsed());
        tracing::info!(
            source = self.source.name(),
            students = total,
            failed,
            "coach weekly summary built"
        );
        Ok(compute_coach_weekly_summary(period, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ActivityEntry, Dataset, ExamRecord, ExamType, Student, SubjectResult, TopicRecord,
        TopicStatus,
    };
    use crate::source::DatasetSource;
    use crate::trend::{TrendStatus, WeeklyTrend};
    use std::sync::Mutex;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn entry(student: &str, day: u32, lesson: &str, solved: i64, correct: i64) -> ActivityEntry {
        ActivityEntry {
            student_id: student.into(),
            date: date(day),
            lesson: lesson.into(),
            topic: None,
            solved,
            correct,
            wrong: solved - correct,
            minutes: 30,
        }
    }

    fn student(id: &str, name: &str) -> Student {
        Student {
            student_id: id.into(),
            name: name.into(),
            track: None,
        }
    }

    fn topic(id: &str, student: &str, status: TopicStatus, order: i64) -> TopicRecord {
        TopicRecord {
            topic_id: id.into(),
            student_id: student.into(),
            lesson: "TYT - Matematik".into(),
            topic: id.into(),
            status,
            order_index: order,
            exam_type: Some(ExamType::Tyt),
        }
    }

    fn engine() -> ReportEngine {
        // Week of 11 March 2024 is Monday 11 .. Sunday 17.
        let dataset = Dataset {
            students: vec![
                student("s1", "Ayşe"),
                student("s2", "Mehmet"),
                student("s3", "Zeynep"),
            ],
            exams: vec![ExamRecord {
                exam_id: "e1".into(),
                student_id: "s1".into(),
                exam_type: ExamType::Tyt,
                exam_date: date(10),
                exam_name: Some("Deneme 1".into()),
                subjects: vec![SubjectResult::new("Türkçe", 35, 3, 2)],
            }],
            activities: vec![
                entry("s1", 5, "Matematik", 20, 10),
                entry("s1", 11, "Matematik", 20, 16),
                entry("s1", 16, "Fizik", 10, 9),
                entry("s2", 6, "Kimya", 10, 9),
                entry("s2", 12, "Kimya", 10, 5),
                entry("s3", 7, "Biyoloji", 10, 7),
                entry("s3", 13, "Biyoloji", 10, 7),
            ],
            topics: vec![
                topic("k2", "s1", TopicStatus::InProgress, 1),
                topic("k1", "s1", TopicStatus::Completed, 0),
                topic("k3", "s2", TopicStatus::Completed, 0),
            ],
            ..Default::default()
        };
        ReportEngine::new(
            Arc::new(DatasetSource::new("test", dataset)),
            EngineConfig::default(),
        )
    }

    #[derive(Default)]
    struct Recorder {
        completed: Mutex<Vec<String>>,
        summary: Mutex<Option<(usize, usize)>>,
    }

    impl ProgressReporter for Recorder {
        fn on_student_complete(&self, progress: &StudentProgress) {
            self.completed
                .lock()
                .unwrap()
                .push(progress.student_id.clone());
        }
        fn on_student_error(&self, _: &str, _: &str) {}
        fn on_summary_complete(&self, total: usize, failed: usize, _: Duration) {
            *self.summary.lock().unwrap() = Some((total, failed));
        }
    }

    #[tokio::test]
    async fn coach_summary_across_students() {
        let recorder = Recorder::default();
        let summary = engine()
            .coach_weekly_summary(date(14), &recorder)
            .await
            .unwrap();

        assert_eq!(summary.summary.total_students, 3);
        assert_eq!(summary.summary.students_improved, 1);
        assert_eq!(summary.summary.students_declined, 1);
        assert_eq!(summary.summary.students_stable, 1);
        assert_eq!(summary.most_improved[0].student_id, "s1");
        assert_eq!(summary.most_declined[0].student_id, "s2");
        assert_eq!(summary.all_students[2].status, TrendStatus::Declined);

        assert_eq!(recorder.completed.lock().unwrap().len(), 3);
        assert_eq!(*recorder.summary.lock().unwrap(), Some((3, 0)));
    }

    #[tokio::test]
    async fn student_analysis_for_week() {
        let analysis = engine()
            .student_analysis("s1", ReportPeriod::week_of(date(11)))
            .await
            .unwrap();
        assert_eq!(analysis.overall_stats.total_solved, 30);
        assert_eq!(analysis.strong_lessons.len(), 2);
        assert!(analysis.weak_lessons.is_empty());
    }

    #[tokio::test]
    async fn weekly_report_has_seven_days() {
        let report = engine().weekly_report("s1", date(13)).await.unwrap();
        assert_eq!(report.daily_breakdown.len(), 7);
        assert_eq!(report.summary.total_solved, 30);
        assert_eq!(report.summary.trend, WeeklyTrend::Rising);
    }

    #[tokio::test]
    async fn topic_progress_per_student() {
        let engine = engine();
        let progress = engine.topic_progress("s1").await.unwrap();
        assert_eq!(progress.counts.total, 2);
        assert_eq!(progress.completion_rate, 50.0);
        assert_eq!(progress.lessons[0].next_topic.as_deref(), Some("k2"));

        let none = engine.topic_progress("s3").await.unwrap();
        assert!(none.empty);
        assert_eq!(none.completion_rate, 0.0);
    }

    #[tokio::test]
    async fn exam_summary_lookup() {
        let engine = engine();
        let summary = engine.exam_summary("s1", "e1").await.unwrap();
        assert_eq!(summary.total_net, 34.25);
        assert!(engine.exam_summary("s2", "e1").await.is_err());
    }

    #[tokio::test]
    async fn parallelism_of_one_still_completes() {
        let mut engine = engine();
        engine.config.parallelism = 1;
        let summary = engine
            .coach_weekly_summary(date(11), &NoopReporter)
            .await
            .unwrap();
        assert_eq!(summary.all_students.len(), 3);
    }
}
