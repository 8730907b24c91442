//! Core data model types for netcoach.
//!
//! All of these are value objects built fresh for each report request from
//! a snapshot supplied by the storage collaborator. Nothing here is mutated
//! back into storage.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::scoring;

/// Raw answer counts for one subject of an exam.
///
/// Counts are signed so that negative input survives deserialization and
/// is rejected by [`SubjectResult::validate`] instead of being clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectResult {
    /// Subject name as shown on the exam sheet (e.g. "Türkçe").
    #[serde(alias = "name")]
    pub subject_name: String,
    /// Number of questions in the subject, when known.
    #[serde(default, alias = "total")]
    pub total_questions: Option<i64>,
    #[serde(default)]
    pub correct: i64,
    #[serde(default)]
    pub wrong: i64,
    #[serde(default)]
    pub blank: i64,
}

impl SubjectResult {
    pub fn new(subject_name: impl Into<String>, correct: i64, wrong: i64, blank: i64) -> Self {
        Self {
            subject_name: subject_name.into(),
            total_questions: None,
            correct,
            wrong,
            blank,
        }
    }

    /// Set the known question total.
    pub fn with_total(mut self, total_questions: i64) -> Self {
        self.total_questions = Some(total_questions);
        self
    }

    /// Questions that appear on the answer sheet: correct + wrong + blank.
    pub fn attempted(&self) -> Result<i64> {
        scoring::checked_total(
            &format!("{}.attempted", self.subject_name),
            &[self.correct, self.wrong, self.blank],
        )
    }

    /// Check that every count is non-negative and that the counts fit in
    /// the known question total.
    pub fn validate(&self) -> Result<()> {
        let field = |name: &str| format!("{}.{}", self.subject_name, name);
        scoring::ensure_non_negative(&field("correct"), self.correct)?;
        scoring::ensure_non_negative(&field("wrong"), self.wrong)?;
        scoring::ensure_non_negative(&field("blank"), self.blank)?;

        let attempted = self.attempted()?;
        if let Some(total) = self.total_questions {
            scoring::ensure_non_negative(&field("total_questions"), total)?;
            if attempted > total {
                return Err(AnalysisError::invalid(
                    field("total_questions"),
                    format!("correct + wrong + blank = {attempted} exceeds total of {total}"),
                ));
            }
        }
        Ok(())
    }
}

/// The two exam types of the Turkish university entrance exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    /// Temel Yeterlilik Testi, the foundational exam.
    #[serde(rename = "TYT")]
    Tyt,
    /// Alan Yeterlilik Testi, the field-specific exam.
    #[serde(rename = "AYT")]
    Ayt,
}

/// A subject and its question count in a standard exam layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectTemplate {
    pub name: &'static str,
    pub total_questions: i64,
}

const TYT_SUBJECTS: &[SubjectTemplate] = &[
    SubjectTemplate { name: "Türkçe", total_questions: 40 },
    SubjectTemplate { name: "Matematik", total_questions: 40 },
    SubjectTemplate { name: "Fen Bilimleri", total_questions: 20 },
    SubjectTemplate { name: "Sosyal Bilimler", total_questions: 20 },
];

const AYT_SUBJECTS: &[SubjectTemplate] = &[
    SubjectTemplate { name: "Matematik", total_questions: 40 },
    SubjectTemplate { name: "Fizik", total_questions: 14 },
    SubjectTemplate { name: "Kimya", total_questions: 13 },
    SubjectTemplate { name: "Biyoloji", total_questions: 13 },
    SubjectTemplate { name: "Edebiyat", total_questions: 24 },
    SubjectTemplate { name: "Tarih-1", total_questions: 10 },
    SubjectTemplate { name: "Coğrafya-1", total_questions: 6 },
];

impl ExamType {
    /// Standard subject layout, in exam display order.
    pub fn template(&self) -> &'static [SubjectTemplate] {
        match self {
            ExamType::Tyt => TYT_SUBJECTS,
            ExamType::Ayt => AYT_SUBJECTS,
        }
    }

    /// Question count of `subject_name` in this exam's layout.
    pub fn template_total(&self, subject_name: &str) -> Option<i64> {
        self.template()
            .iter()
            .find(|t| t.name == subject_name)
            .map(|t| t.total_questions)
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::Tyt => write!(f, "TYT"),
            ExamType::Ayt => write!(f, "AYT"),
        }
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TYT" => Ok(ExamType::Tyt),
            "AYT" => Ok(ExamType::Ayt),
            other => Err(format!("unknown exam type: {other}")),
        }
    }
}

/// One practice exam taken by a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRecord {
    pub exam_id: String,
    pub student_id: String,
    pub exam_type: ExamType,
    pub exam_date: NaiveDate,
    /// Publisher or title of the practice exam.
    #[serde(default)]
    pub exam_name: Option<String>,
    /// Subjects in exam display order.
    #[serde(default)]
    pub subjects: Vec<SubjectResult>,
}

impl ExamRecord {
    /// Subjects with unknown question totals filled from the exam type's
    /// template. Subjects outside the template keep `None`.
    pub fn resolved_subjects(&self) -> Vec<SubjectResult> {
        self.subjects
            .iter()
            .map(|subject| {
                let mut subject = subject.clone();
                if subject.total_questions.is_none() {
                    subject.total_questions = self.exam_type.template_total(&subject.subject_name);
                }
                subject
            })
            .collect()
    }
}

/// Aggregated practice results for one lesson over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonStat {
    pub lesson: String,
    pub total_solved: u64,
    pub total_correct: u64,
    pub total_wrong: u64,
    /// Percentage in [0, 100]; 0 when nothing was solved.
    pub accuracy_rate: f64,
}

impl LessonStat {
    pub fn new(lesson: impl Into<String>, solved: u64, correct: u64, wrong: u64) -> Result<Self> {
        let lesson = lesson.into();
        let answered = scoring::checked_sum(&format!("{lesson}.answered"), [correct, wrong])?;
        if answered > solved {
            return Err(AnalysisError::invalid(
                format!("{lesson}.total_solved"),
                format!("correct + wrong = {answered} exceeds solved {solved}"),
            ));
        }
        Ok(Self {
            accuracy_rate: scoring::rate(correct, solved),
            lesson,
            total_solved: solved,
            total_correct: correct,
            total_wrong: wrong,
        })
    }

    /// Questions solved but neither correct nor wrong.
    pub fn total_blank(&self) -> u64 {
        self.total_solved
            .saturating_sub(self.total_correct.saturating_add(self.total_wrong))
    }

    /// Fold another stat for the same lesson into this one.
    pub fn absorb(&mut self, other: &LessonStat) -> Result<()> {
        let sum = |name: &str, a: u64, b: u64| {
            scoring::checked_sum(&format!("{}.{name}", self.lesson), [a, b])
        };
        let solved = sum("total_solved", self.total_solved, other.total_solved)?;
        let correct = sum("total_correct", self.total_correct, other.total_correct)?;
        let wrong = sum("total_wrong", self.total_wrong, other.total_wrong)?;
        self.total_solved = solved;
        self.total_correct = correct;
        self.total_wrong = wrong;
        self.accuracy_rate = scoring::rate(correct, solved);
        Ok(())
    }
}

/// One line of a student's study log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub student_id: String,
    pub date: NaiveDate,
    pub lesson: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub solved: i64,
    #[serde(default)]
    pub correct: i64,
    #[serde(default)]
    pub wrong: i64,
    /// Study time in minutes.
    #[serde(default)]
    pub minutes: i64,
}

impl ActivityEntry {
    pub fn validate(&self) -> Result<()> {
        let field = |name: &str| format!("{}@{}.{}", self.lesson, self.date, name);
        scoring::ensure_non_negative(&field("solved"), self.solved)?;
        scoring::ensure_non_negative(&field("correct"), self.correct)?;
        scoring::ensure_non_negative(&field("wrong"), self.wrong)?;
        scoring::ensure_non_negative(&field("minutes"), self.minutes)?;
        let answered = scoring::checked_total(&field("answered"), &[self.correct, self.wrong])?;
        if answered > self.solved {
            return Err(AnalysisError::invalid(
                field("solved"),
                format!("correct + wrong = {answered} exceeds solved {}", self.solved),
            ));
        }
        Ok(())
    }

    pub fn blank(&self) -> i64 {
        self.solved - self.correct - self.wrong
    }
}

/// A task a coach assigned to a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub student_id: String,
    pub title: String,
    #[serde(default)]
    pub lesson: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
}

/// Where a student stands on one curriculum topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TopicStatus {
    #[default]
    #[serde(rename = "baslanmadi")]
    NotStarted,
    #[serde(rename = "devam", alias = "devam-ediyor")]
    InProgress,
    #[serde(rename = "tamamlandi")]
    Completed,
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TopicStatus::NotStarted => "Başlanmadı",
            TopicStatus::InProgress => "Devam Ediyor",
            TopicStatus::Completed => "Tamamlandı",
        };
        f.write_str(label)
    }
}

/// One curriculum topic on a student's checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRecord {
    #[serde(alias = "id")]
    pub topic_id: String,
    pub student_id: String,
    /// Lesson the topic belongs to (e.g. "TYT - Matematik").
    #[serde(alias = "ders")]
    pub lesson: String,
    #[serde(alias = "konu")]
    pub topic: String,
    #[serde(default, alias = "durum")]
    pub status: TopicStatus,
    /// Position in the student's checklist.
    #[serde(default)]
    pub order_index: i64,
    #[serde(default, alias = "sinav_turu")]
    pub exam_type: Option<ExamType>,
}

impl TopicRecord {
    pub fn validate(&self) -> Result<()> {
        if self.lesson.trim().is_empty() {
            return Err(AnalysisError::invalid(
                "lesson",
                format!("topic '{}' has no lesson", self.topic_id),
            ));
        }
        if self.topic.trim().is_empty() {
            return Err(AnalysisError::invalid(
                "topic",
                format!("topic '{}' has no name", self.topic_id),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    /// Study track, e.g. "Sayısal" or "Eşit Ağırlık".
    #[serde(default)]
    pub track: Option<String>,
}

/// Exam analysis as persisted by the storage collaborator: the breakdown
/// and weak topics are JSON strings that may be missing or corrupt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredExamAnalysis {
    pub exam_id: String,
    #[serde(default)]
    pub subject_breakdown: Option<String>,
    #[serde(default)]
    pub weak_topics: Option<String>,
}

/// A full snapshot of one coach's data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub exams: Vec<ExamRecord>,
    #[serde(default)]
    pub activities: Vec<ActivityEntry>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub topics: Vec<TopicRecord>,
    #[serde(default)]
    pub stored_analyses: Vec<StoredExamAnalysis>,
}

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(AnalysisError::invalid(
                "period",
                format!("end {end} is before start {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The Monday-to-Sunday week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date - Duration::days(i64::from(date.day0()));
        let mut end = start;
        while let Some(next) = end.succ_opt() {
            if next.month() != start.month() {
                break;
            }
            end = next;
        }
        Self { start, end }
    }

    /// The `days` days ending at (and including) `end`.
    pub fn trailing_days(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            start: end - Duration::days(span),
            end,
        }
    }

    /// The period of equal length immediately before this one.
    pub fn previous(&self) -> Self {
        let length = self.len_days();
        Self {
            start: self.start - Duration::days(length),
            end: self.start - Duration::days(1),
        }
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date of the period in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Display label in the dd.mm.yyyy form used by the dashboard.
    pub fn label(&self) -> String {
        if self.start == self.end {
            self.start.format("%d.%m.%Y").to_string()
        } else {
            format!(
                "{} - {}",
                self.start.format("%d.%m.%Y"),
                self.end.format("%d.%m.%Y")
            )
        }
    }
}
