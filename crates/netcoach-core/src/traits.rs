//! The read interface the analysis core consumes.
//!
//! Persistence lives outside this crate; whatever serves the dashboard's
//! REST API implements [`ActivitySource`] over its own storage.

use async_trait::async_trait;

use crate::model::{
    ActivityEntry, ExamRecord, LessonStat, ReportPeriod, Student, SubjectResult, TaskRecord,
    TopicRecord,
};

/// Read operations on persisted student data.
///
/// Every method returns an immutable snapshot; the core never writes back.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Human-readable source name (e.g. a file path).
    fn name(&self) -> &str;

    /// All students of the coach.
    async fn students(&self) -> anyhow::Result<Vec<Student>>;

    /// Exams of a student, in stored order.
    async fn exams(&self, student_id: &str) -> anyhow::Result<Vec<ExamRecord>>;

    /// Ordered subject results of one exam.
    async fn exam_subjects(&self, exam_id: &str) -> anyhow::Result<Vec<SubjectResult>>;

    /// Study-log entries of a student inside `period`.
    async fn activities(
        &self,
        student_id: &str,
        period: &ReportPeriod,
    ) -> anyhow::Result<Vec<ActivityEntry>>;

    /// Tasks of a student.
    async fn tasks(&self, student_id: &str) -> anyhow::Result<Vec<TaskRecord>>;

    /// Curriculum topics of a student, in checklist order.
    async fn topics(&self, student_id: &str) -> anyhow::Result<Vec<TopicRecord>>;

    /// Per-lesson aggregates of a student inside `period`.
    async fn lesson_stats(
        &self,
        student_id: &str,
        period: &ReportPeriod,
    ) -> anyhow::Result<Vec<LessonStat>> {
        let entries = self.activities(student_id, period).await?;
        Ok(crate::report::lesson_stats_from_activities(&entries)?)
    }

    /// Per-lesson aggregates for the period of equal length before `period`.
    async fn previous_lesson_stats(
        &self,
        student_id: &str,
        period: &ReportPeriod,
    ) -> anyhow::Result<Vec<LessonStat>> {
        self.lesson_stats(student_id, &period.previous()).await
    }
}
