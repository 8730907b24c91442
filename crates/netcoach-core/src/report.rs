//! Report assembly: daily, weekly and monthly study reports, the student
//! analysis, and the coach's weekly summary.
//!
//! Every report is built from an immutable slice of activity entries. A
//! period without activity is not an error: numeric fields are zero and the
//! report's `empty` flag is set so the UI can show an empty state distinct
//! from loading or failure.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AnalysisError, Result};
use crate::model::{ActivityEntry, LessonStat, ReportPeriod, Student, TaskRecord};
use crate::scoring;
use crate::trend::{classify, AnalysisThresholds, TrendStatus, WeeklyTrend};

/// Running totals over activity entries.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    solved: u64,
    correct: u64,
    wrong: u64,
    minutes: u64,
}

impl Tally {
    fn add_counts(&mut self, solved: u64, correct: u64, wrong: u64, minutes: u64) -> Result<()> {
        self.solved = scoring::checked_sum("total_solved", [self.solved, solved])?;
        self.correct = scoring::checked_sum("total_correct", [self.correct, correct])?;
        self.wrong = scoring::checked_sum("total_wrong", [self.wrong, wrong])?;
        self.minutes = scoring::checked_sum("study_minutes", [self.minutes, minutes])?;
        Ok(())
    }

    /// Totals of validated entries; counts are non-negative.
    fn of_entries<'a>(entries: impl IntoIterator<Item = &'a ActivityEntry>) -> Result<Self> {
        let mut tally = Tally::default();
        for e in entries {
            tally.add_counts(
                e.solved as u64,
                e.correct as u64,
                e.wrong as u64,
                e.minutes as u64,
            )?;
        }
        Ok(tally)
    }

    fn of_days(days: &[DayStat]) -> Result<Self> {
        let mut tally = Tally::default();
        for d in days {
            tally.add_counts(d.solved, d.correct, d.wrong, d.minutes)?;
        }
        Ok(tally)
    }

    fn accuracy(&self) -> f64 {
        scoring::rate(self.correct, self.solved)
    }
}

fn validate_all(entries: &[ActivityEntry]) -> Result<()> {
    entries.iter().try_for_each(ActivityEntry::validate)
}

/// Aggregate activity entries into per-lesson stats, in first-seen order.
pub fn lesson_stats_from_activities(entries: &[ActivityEntry]) -> Result<Vec<LessonStat>> {
    let mut stats: Vec<LessonStat> = Vec::new();
    for entry in entries {
        entry.validate()?;
        let stat = LessonStat::new(
            entry.lesson.clone(),
            entry.solved as u64,
            entry.correct as u64,
            entry.wrong as u64,
        )?;
        match stats.iter_mut().find(|s| s.lesson == entry.lesson) {
            Some(existing) => existing.absorb(&stat)?,
            None => stats.push(stat),
        }
    }
    Ok(stats)
}

/// Merge per-lesson stats that may repeat a lesson, in first-seen order.
fn merge_lessons<'a>(stats: impl IntoIterator<Item = &'a LessonStat>) -> Result<Vec<LessonStat>> {
    let mut merged: Vec<LessonStat> = Vec::new();
    for stat in stats {
        match merged.iter_mut().find(|s| s.lesson == stat.lesson) {
            Some(existing) => existing.absorb(stat)?,
            None => merged.push(stat.clone()),
        }
    }
    Ok(merged)
}

/// Check a caller-supplied lesson stat against its own counts.
fn validate_lesson(stat: &LessonStat) -> Result<()> {
    LessonStat::new(
        stat.lesson.clone(),
        stat.total_solved,
        stat.total_correct,
        stat.total_wrong,
    )
    .map(|_| ())
}

/// Stable sort, most solved first.
fn sort_by_solved(stats: &mut [LessonStat]) {
    stats.sort_by(|a, b| b.total_solved.cmp(&a.total_solved));
}

/// The lesson with the most solved questions; the first one wins ties.
pub fn most_studied_lesson(stats: &[LessonStat]) -> Option<String> {
    let mut best: Option<&LessonStat> = None;
    for stat in stats.iter().filter(|s| s.total_solved > 0) {
        if best.map_or(true, |b| stat.total_solved > b.total_solved) {
            best = Some(stat);
        }
    }
    best.map(|s| s.lesson.clone())
}

// ---------------------------------------------------------------------------
// Daily report
// ---------------------------------------------------------------------------

/// One day of study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub total_questions_solved: u64,
    pub total_correct: u64,
    pub total_wrong: u64,
    pub accuracy_rate: f64,
    pub study_minutes: u64,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub most_studied_lesson: Option<String>,
    pub lesson_breakdown: Vec<LessonStat>,
    /// Nothing solved and no task completed on this day.
    pub empty: bool,
}

/// Build the report for `date`. Entries and tasks for other days are ignored.
pub fn compute_daily_report(
    date: NaiveDate,
    entries: &[ActivityEntry],
    tasks: &[TaskRecord],
) -> Result<DailyReport> {
    let todays: Vec<ActivityEntry> = entries.iter().filter(|e| e.date == date).cloned().collect();
    validate_all(&todays)?;
    let tally = Tally::of_entries(&todays)?;

    let mut lesson_breakdown = lesson_stats_from_activities(&todays)?;
    let most_studied = most_studied_lesson(&lesson_breakdown);
    sort_by_solved(&mut lesson_breakdown);

    let due_today = tasks.iter().filter(|t| t.due_date == Some(date));
    let (completed_tasks, pending_tasks) = due_today.fold((0, 0), |(done, open), t| {
        if t.completed {
            (done + 1, open)
        } else {
            (done, open + 1)
        }
    });

    Ok(DailyReport {
        date,
        total_questions_solved: tally.solved,
        total_correct: tally.correct,
        total_wrong: tally.wrong,
        accuracy_rate: tally.accuracy(),
        study_minutes: tally.minutes,
        completed_tasks,
        pending_tasks,
        most_studied_lesson: most_studied,
        lesson_breakdown,
        empty: tally.solved == 0 && completed_tasks == 0,
    })
}

// ---------------------------------------------------------------------------
// Weekly report
// ---------------------------------------------------------------------------

/// Totals for one day of a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayStat {
    pub date: NaiveDate,
    pub solved: u64,
    pub correct: u64,
    pub wrong: u64,
    pub minutes: u64,
    pub accuracy: f64,
    #[serde(default)]
    pub lessons: Vec<LessonStat>,
}

impl DayStat {
    /// Check the counts of this day and of its lessons. Accuracy is derived
    /// from the counts, so it is not checked here.
    pub fn validate(&self) -> Result<()> {
        let answered =
            scoring::checked_sum(&format!("{}.answered", self.date), [self.correct, self.wrong])?;
        if answered > self.solved {
            return Err(AnalysisError::invalid(
                format!("{}.solved", self.date),
                format!("correct + wrong = {answered} exceeds solved {}", self.solved),
            ));
        }
        self.lessons.iter().try_for_each(validate_lesson)
    }
}

/// Per-day totals for every day of `period`, zero-filled.
pub fn daily_breakdown(period: &ReportPeriod, entries: &[ActivityEntry]) -> Result<Vec<DayStat>> {
    period
        .days()
        .map(|date| {
            let day_entries: Vec<ActivityEntry> =
                entries.iter().filter(|e| e.date == date).cloned().collect();
            let lessons = lesson_stats_from_activities(&day_entries)?;
            let tally = Tally::of_entries(&day_entries)?;
            Ok(DayStat {
                date,
                solved: tally.solved,
                correct: tally.correct,
                wrong: tally.wrong,
                minutes: tally.minutes,
                accuracy: tally.accuracy(),
                lessons,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReportSummary {
    pub total_solved: u64,
    pub total_correct: u64,
    pub accuracy_rate: f64,
    pub study_minutes: u64,
    /// Two-valued label kept for existing report consumers.
    pub trend: WeeklyTrend,
    pub trend_status: TrendStatus,
    /// Later-half accuracy minus earlier-half accuracy, in points.
    pub change_percent: f64,
    pub most_studied_lesson: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub period: ReportPeriod,
    pub summary: WeeklyReportSummary,
    pub daily_breakdown: Vec<DayStat>,
    /// Most studied lesson first.
    pub lesson_breakdown: Vec<LessonStat>,
    pub empty: bool,
}

/// Build a weekly report from its per-day breakdown.
///
/// Days must be consecutive dates in ascending order, each with counts
/// where correct + wrong ≤ solved. Day accuracies are recomputed from the
/// counts.
///
/// The trend compares the accuracy of the later half of the days with the
/// earlier half; for an odd number of days the middle day is in neither.
pub fn compute_weekly_report(mut daily_breakdown: Vec<DayStat>) -> Result<WeeklyReport> {
    let (Some(first), Some(last)) = (daily_breakdown.first(), daily_breakdown.last()) else {
        return Err(AnalysisError::invalid(
            "daily_breakdown",
            "must cover at least one day",
        ));
    };
    let period = ReportPeriod::new(first.date, last.date)?;

    for (i, day) in daily_breakdown.iter_mut().enumerate() {
        day.validate()?;
        let expected = period.start.checked_add_days(Days::new(i as u64));
        if expected != Some(day.date) {
            return Err(AnalysisError::invalid(
                "daily_breakdown",
                format!(
                    "day {} is {}, expected consecutive dates from {}",
                    i + 1,
                    day.date,
                    period.start
                ),
            ));
        }
        day.accuracy = scoring::rate(day.correct, day.solved);
    }

    let tally = Tally::of_days(&daily_breakdown)?;

    let half = daily_breakdown.len() / 2;
    let earlier = Tally::of_days(&daily_breakdown[..half])?;
    let later = Tally::of_days(&daily_breakdown[daily_breakdown.len() - half..])?;
    let trend = AnalysisThresholds::default().trend(later.accuracy(), earlier.accuracy());

    let mut lesson_breakdown = merge_lessons(daily_breakdown.iter().flat_map(|d| &d.lessons))?;
    let most_studied = most_studied_lesson(&lesson_breakdown);
    sort_by_solved(&mut lesson_breakdown);

    tracing::debug!(
        period = %period.label(),
        solved = tally.solved,
        status = %trend.status,
        "weekly report assembled"
    );

    Ok(WeeklyReport {
        period,
        summary: WeeklyReportSummary {
            total_solved: tally.solved,
            total_correct: tally.correct,
            accuracy_rate: tally.accuracy(),
            study_minutes: tally.minutes,
            trend: WeeklyTrend::from_status(trend.status),
            trend_status: trend.status,
            change_percent: trend.change_percent,
            most_studied_lesson: most_studied,
        },
        daily_breakdown,
        lesson_breakdown,
        empty: tally.solved == 0,
    })
}

/// Weekly report for the Monday-start week containing `date`.
pub fn weekly_report_for(date: NaiveDate, entries: &[ActivityEntry]) -> Result<WeeklyReport> {
    let period = ReportPeriod::week_of(date);
    compute_weekly_report(daily_breakdown(&period, entries)?)
}

// ---------------------------------------------------------------------------
// Monthly report
// ---------------------------------------------------------------------------

/// Totals for one week bucket of a month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekStat {
    /// Display label, e.g. "04.03.2024 - 10.03.2024".
    pub period: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub solved: u64,
    pub correct: u64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub total_solved: u64,
    pub total_correct: u64,
    pub accuracy_rate: f64,
    pub study_minutes: u64,
    /// Last active week's accuracy minus the first active week's, in points.
    pub improvement_rate: f64,
    pub most_studied_lesson: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub period: ReportPeriod,
    pub summary: MonthlySummary,
    pub weekly_breakdown: Vec<WeekStat>,
    pub lesson_breakdown: Vec<LessonStat>,
    pub empty: bool,
}

/// Build a report over `period`, bucketed into Monday-start weeks clipped to
/// the period.
pub fn compute_monthly_report(
    period: &ReportPeriod,
    entries: &[ActivityEntry],
) -> Result<MonthlyReport> {
    let in_period: Vec<ActivityEntry> = entries
        .iter()
        .filter(|e| period.contains(e.date))
        .cloned()
        .collect();
    validate_all(&in_period)?;

    let mut weekly_breakdown = Vec::new();
    let mut cursor = period.start;
    while cursor <= period.end {
        let week = ReportPeriod::week_of(cursor);
        let bucket = ReportPeriod {
            start: cursor,
            end: week.end.min(period.end),
        };
        let tally = Tally::of_entries(in_period.iter().filter(|e| bucket.contains(e.date)))?;
        weekly_breakdown.push(WeekStat {
            period: bucket.label(),
            start: bucket.start,
            end: bucket.end,
            solved: tally.solved,
            correct: tally.correct,
            accuracy: tally.accuracy(),
        });
        match bucket.end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    let active: Vec<&WeekStat> = weekly_breakdown.iter().filter(|w| w.solved > 0).collect();
    let improvement_rate = match (active.first(), active.last()) {
        (Some(first), Some(last)) if active.len() > 1 => {
            AnalysisThresholds::default()
                .trend(last.accuracy, first.accuracy)
                .change_percent
        }
        _ => 0.0,
    };

    let tally = Tally::of_entries(&in_period)?;

    let mut lesson_breakdown = lesson_stats_from_activities(&in_period)?;
    let most_studied = most_studied_lesson(&lesson_breakdown);
    sort_by_solved(&mut lesson_breakdown);

    Ok(MonthlyReport {
        period: *period,
        summary: MonthlySummary {
            total_solved: tally.solved,
            total_correct: tally.correct,
            accuracy_rate: tally.accuracy(),
            study_minutes: tally.minutes,
            improvement_rate,
            most_studied_lesson: most_studied,
        },
        weekly_breakdown,
        lesson_breakdown,
        empty: tally.solved == 0,
    })
}

/// Monthly report for the calendar month containing `date`.
pub fn monthly_report_for(date: NaiveDate, entries: &[ActivityEntry]) -> Result<MonthlyReport> {
    compute_monthly_report(&ReportPeriod::month_of(date), entries)
}

// ---------------------------------------------------------------------------
// Student analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_solved: u64,
    pub total_correct: u64,
    pub total_wrong: u64,
    pub accuracy_rate: f64,
    pub lesson_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAnalysis {
    pub period: ReportPeriod,
    pub overall_stats: OverallStats,
    /// Most solved first.
    pub lesson_stats: Vec<LessonStat>,
    pub weak_lessons: Vec<LessonStat>,
    pub strong_lessons: Vec<LessonStat>,
    pub empty: bool,
}

/// Overall stats plus weak/strong buckets for one student's period.
///
/// Repeated lessons are merged. A stat whose correct + wrong exceeds its
/// solved count is rejected.
pub fn compute_student_analysis(
    lesson_stats: &[LessonStat],
    period: ReportPeriod,
    thresholds: &AnalysisThresholds,
) -> Result<StudentAnalysis> {
    lesson_stats.iter().try_for_each(validate_lesson)?;
    let mut merged = merge_lessons(lesson_stats)?;
    let total_solved = scoring::checked_sum("total_solved", merged.iter().map(|s| s.total_solved))?;
    let total_correct =
        scoring::checked_sum("total_correct", merged.iter().map(|s| s.total_correct))?;
    let total_wrong = scoring::checked_sum("total_wrong", merged.iter().map(|s| s.total_wrong))?;

    let buckets = classify(&merged, thresholds);
    sort_by_solved(&mut merged);

    Ok(StudentAnalysis {
        period,
        overall_stats: OverallStats {
            total_solved,
            total_correct,
            total_wrong,
            accuracy_rate: scoring::rate(total_correct, total_solved),
            lesson_count: merged.len(),
        },
        lesson_stats: merged,
        weak_lessons: buckets.weak,
        strong_lessons: buckets.strong,
        empty: total_solved == 0,
    })
}

// ---------------------------------------------------------------------------
// Coach weekly summary
// ---------------------------------------------------------------------------

/// One student's week against the previous week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProgress {
    pub student_id: String,
    pub student_name: String,
    pub questions_solved: u64,
    pub accuracy_rate: f64,
    pub previous_accuracy_rate: f64,
    /// Accuracy change in percentage points.
    pub change: f64,
    pub status: TrendStatus,
    pub needs_attention: bool,
    pub last_activity: Option<NaiveDate>,
}

/// Compare a student's current-period entries with the previous period.
pub fn student_progress(
    student: &Student,
    current: &[ActivityEntry],
    previous: &[ActivityEntry],
    thresholds: &AnalysisThresholds,
) -> Result<StudentProgress> {
    validate_all(current)?;
    validate_all(previous)?;

    let now = Tally::of_entries(current)?;
    let before = Tally::of_entries(previous)?;

    let trend = thresholds.trend(now.accuracy(), before.accuracy());
    let needs_attention = now.solved == 0 || now.accuracy() < thresholds.weak_below;

    Ok(StudentProgress {
        student_id: student.student_id.clone(),
        student_name: student.name.clone(),
        questions_solved: now.solved,
        accuracy_rate: now.accuracy(),
        previous_accuracy_rate: before.accuracy(),
        change: trend.change_percent,
        status: trend.status,
        needs_attention,
        last_activity: current.iter().chain(previous).map(|e| e.date).max(),
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachSummaryCounts {
    pub total_students: usize,
    pub students_improved: usize,
    pub students_stable: usize,
    pub students_declined: usize,
    pub attention_needed: usize,
}

/// Weekly overview of every student of a coach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachWeeklySummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub period: ReportPeriod,
    pub summary: CoachSummaryCounts,
    /// Up to three students with the largest gain.
    pub most_improved: Vec<StudentProgress>,
    /// Up to three students with the largest drop.
    pub most_declined: Vec<StudentProgress>,
    /// Largest change first; equal changes ordered by name.
    pub all_students: Vec<StudentProgress>,
}

/// Students shown in the most-improved and most-declined lists.
pub const HIGHLIGHT_COUNT: usize = 3;

/// Assemble the coach summary. Input order does not matter.
pub fn compute_coach_weekly_summary(
    period: ReportPeriod,
    mut progress: Vec<StudentProgress>,
) -> CoachWeeklySummary {
    progress.sort_by(|a, b| {
        b.change
            .total_cmp(&a.change)
            .then_with(|| a.student_name.cmp(&b.student_name))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    let count = |status: TrendStatus| progress.iter().filter(|p| p.status == status).count();
    let summary = CoachSummaryCounts {
        total_students: progress.len(),
        students_improved: count(TrendStatus::Improved),
        students_stable: count(TrendStatus::Stable),
        students_declined: count(TrendStatus::Declined),
        attention_needed: progress.iter().filter(|p| p.needs_attention).count(),
    };

    let most_improved = progress
        .iter()
        .filter(|p| p.status == TrendStatus::Improved)
        .take(HIGHLIGHT_COUNT)
        .cloned()
        .collect();
    let most_declined = progress
        .iter()
        .rev()
        .filter(|p| p.status == TrendStatus::Declined)
        .take(HIGHLIGHT_COUNT)
        .cloned()
        .collect();

    CoachWeeklySummary {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        period,
        summary,
        most_improved,
        most_declined,
        all_students: progress,
    }
}

// ---------------------------------------------------------------------------
// JSON persistence
// ---------------------------------------------------------------------------

/// Save any report as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(report: &T, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

/// Load a report previously saved with [`write_json`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse report JSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn entry(day: u32, lesson: &str, solved: i64, correct: i64, wrong: i64) -> ActivityEntry {
        ActivityEntry {
            student_id: "s1".into(),
            date: date(day),
            lesson: lesson.into(),
            topic: None,
            solved,
            correct,
            wrong,
            minutes: 30,
        }
    }

    fn task(id: &str, day: u32, completed: bool) -> TaskRecord {
        TaskRecord {
            task_id: id.into(),
            student_id: "s1".into(),
            title: format!("task {id}"),
            lesson: None,
            due_date: Some(date(day)),
            completed,
        }
    }

    fn student(id: &str, name: &str) -> Student {
        Student {
            student_id: id.into(),
            name: name.into(),
            track: None,
        }
    }

    #[test]
    fn lesson_stats_merge_in_first_seen_order() {
        let stats = lesson_stats_from_activities(&[
            entry(4, "Fizik", 10, 5, 3),
            entry(4, "Matematik", 20, 18, 2),
            entry(5, "Fizik", 10, 7, 1),
        ])
        .unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].lesson, "Fizik");
        assert_eq!(stats[0].total_solved, 20);
        assert_eq!(stats[0].accuracy_rate, 60.0);
    }

    #[test]
    fn most_studied_prefers_first_on_ties() {
        let stats = vec![
            LessonStat::new("Fizik", 10, 5, 0).unwrap(),
            LessonStat::new("Kimya", 10, 5, 0).unwrap(),
        ];
        assert_eq!(most_studied_lesson(&stats).as_deref(), Some("Fizik"));
        assert_eq!(most_studied_lesson(&[]), None);
    }

    #[test]
    fn daily_report_counts() {
        let entries = vec![
            entry(4, "Matematik", 30, 24, 4),
            entry(4, "Fizik", 10, 5, 5),
            entry(5, "Kimya", 50, 50, 0),
        ];
        let tasks = vec![task("t1", 4, true), task("t2", 4, false), task("t3", 5, true)];
        let report = compute_daily_report(date(4), &entries, &tasks).unwrap();

        assert_eq!(report.total_questions_solved, 40);
        assert_eq!(report.total_correct, 29);
        assert_eq!(report.accuracy_rate, 72.5);
        assert_eq!(report.study_minutes, 60);
        assert_eq!(report.completed_tasks, 1);
        assert_eq!(report.pending_tasks, 1);
        assert_eq!(report.most_studied_lesson.as_deref(), Some("Matematik"));
        assert!(!report.empty);
    }

    #[test]
    fn daily_report_empty_day() {
        let report = compute_daily_report(date(9), &[entry(4, "Fizik", 10, 5, 5)], &[]).unwrap();
        assert!(report.empty);
        assert_eq!(report.total_questions_solved, 0);
        assert_eq!(report.accuracy_rate, 0.0);
        assert!(report.most_studied_lesson.is_none());
        assert!(report.lesson_breakdown.is_empty());
    }

    #[test]
    fn daily_report_rejects_invalid_entry() {
        let result = compute_daily_report(date(4), &[entry(4, "Fizik", 5, 4, 3)], &[]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));
    }

    #[test]
    fn weekly_breakdown_is_zero_filled() {
        let days = daily_breakdown(
            &ReportPeriod::week_of(date(6)),
            &[entry(5, "Fizik", 10, 8, 2)],
        )
        .unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, date(4));
        assert_eq!(days[1].solved, 10);
        assert_eq!(days[2].solved, 0);
        assert_eq!(days[2].accuracy, 0.0);
    }

    #[test]
    fn weekly_report_rising() {
        // Week of 2024-03-04 (Mon) .. 2024-03-10 (Sun).
        let entries = vec![
            entry(4, "Matematik", 20, 10, 10),
            entry(5, "Fizik", 10, 5, 5),
            entry(7, "Kimya", 100, 0, 0),
            entry(9, "Matematik", 20, 18, 2),
            entry(10, "Matematik", 10, 9, 1),
        ];
        let report = weekly_report_for(date(6), &entries).unwrap();

        assert_eq!(report.summary.total_solved, 160);
        assert_eq!(report.summary.trend, WeeklyTrend::Rising);
        assert_eq!(report.summary.trend_status, TrendStatus::Improved);
        assert!((report.summary.change_percent - 40.0).abs() < 1e-9);
        assert_eq!(report.summary.most_studied_lesson.as_deref(), Some("Kimya"));
        assert_eq!(report.lesson_breakdown[0].lesson, "Kimya");
        assert_eq!(report.lesson_breakdown[1].lesson, "Matematik");
        assert_eq!(report.lesson_breakdown[1].total_solved, 50);
        assert!(!report.empty);
    }

    #[test]
    fn weekly_report_falling_label() {
        let entries = vec![entry(4, "Fizik", 10, 9, 1), entry(10, "Fizik", 10, 3, 7)];
        let report = weekly_report_for(date(4), &entries).unwrap();
        assert_eq!(report.summary.trend, WeeklyTrend::Falling);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["trend"], "Düşüş");
    }

    #[test]
    fn weekly_report_empty_week() {
        let report = weekly_report_for(date(20), &[entry(4, "Fizik", 10, 9, 1)]).unwrap();
        assert!(report.empty);
        assert_eq!(report.summary.total_solved, 0);
        assert_eq!(report.summary.accuracy_rate, 0.0);
        assert_eq!(report.summary.trend_status, TrendStatus::Stable);
        assert_eq!(report.summary.trend, WeeklyTrend::Rising);
        assert_eq!(report.daily_breakdown.len(), 7);
    }

    #[test]
    fn weekly_report_needs_days() {
        assert!(compute_weekly_report(vec![]).is_err());
    }

    fn day_stat(day: u32, solved: u64, correct: u64, wrong: u64) -> DayStat {
        DayStat {
            date: date(day),
            solved,
            correct,
            wrong,
            minutes: 0,
            accuracy: 0.0,
            lessons: Vec::new(),
        }
    }

    #[test]
    fn weekly_report_rejects_counts_over_solved() {
        let result = compute_weekly_report(vec![day_stat(4, 10, 50, 0)]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));

        let result = compute_weekly_report(vec![day_stat(4, 10, 6, 5)]);
        assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));

        let mut bad_lesson = day_stat(4, 10, 5, 5);
        bad_lesson.lessons.push(LessonStat {
            lesson: "Fizik".into(),
            total_solved: 2,
            total_correct: 9,
            total_wrong: 0,
            accuracy_rate: 450.0,
        });
        assert!(compute_weekly_report(vec![bad_lesson]).is_err());
    }

    #[test]
    fn weekly_report_rejects_gaps_and_disorder() {
        let gap = vec![day_stat(4, 1, 1, 0), day_stat(6, 1, 1, 0)];
        assert!(matches!(
            compute_weekly_report(gap),
            Err(AnalysisError::InvalidInput { .. })
        ));

        let reversed = vec![day_stat(5, 1, 1, 0), day_stat(4, 1, 1, 0)];
        assert!(compute_weekly_report(reversed).is_err());

        let repeated = vec![day_stat(4, 1, 1, 0), day_stat(4, 1, 1, 0), day_stat(5, 1, 1, 0)];
        assert!(compute_weekly_report(repeated).is_err());
    }

    #[test]
    fn weekly_report_recomputes_day_accuracy() {
        let mut day = day_stat(4, 10, 5, 5);
        day.accuracy = 99.0;
        let report = compute_weekly_report(vec![day, day_stat(5, 0, 0, 0)]).unwrap();
        assert_eq!(report.daily_breakdown[0].accuracy, 50.0);
        assert_eq!(report.summary.accuracy_rate, 50.0);
        assert_eq!(report.period.end, date(5));
    }

    #[test]
    fn monthly_report_weeks_and_improvement() {
        // March 2024 starts on a Friday.
        let entries = vec![
            entry(1, "Fizik", 10, 5, 5),
            entry(12, "Fizik", 10, 6, 4),
            entry(28, "Matematik", 20, 16, 4),
        ];
        let report = monthly_report_for(date(15), &entries).unwrap();

        assert_eq!(report.period.start, date(1));
        assert_eq!(report.period.end, date(31));
        assert_eq!(report.weekly_breakdown.len(), 5);
        assert_eq!(report.weekly_breakdown[0].start, date(1));
        assert_eq!(report.weekly_breakdown[0].end, date(3));
        assert_eq!(report.weekly_breakdown[4].end, date(31));
        assert_eq!(report.summary.total_solved, 40);
        assert!((report.summary.improvement_rate - 30.0).abs() < 1e-9);
        assert_eq!(report.summary.most_studied_lesson.as_deref(), Some("Fizik"));
    }

    #[test]
    fn monthly_report_single_active_week_has_no_improvement() {
        let report = monthly_report_for(date(15), &[entry(12, "Fizik", 10, 6, 4)]).unwrap();
        assert_eq!(report.summary.improvement_rate, 0.0);
        let empty = monthly_report_for(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), &[]).unwrap();
        assert!(empty.empty);
        assert_eq!(empty.summary.total_solved, 0);
    }

    #[test]
    fn student_analysis_buckets() {
        let stats = vec![
            LessonStat::new("Fizik", 20, 8, 10).unwrap(),
            LessonStat::new("Matematik", 50, 45, 5).unwrap(),
            LessonStat::new("Kimya", 10, 7, 3).unwrap(),
            LessonStat::new("Tarih", 0, 0, 0).unwrap(),
        ];
        let analysis = compute_student_analysis(
            &stats,
            ReportPeriod::week_of(date(4)),
            &AnalysisThresholds::default(),
        )
        .unwrap();

        assert_eq!(analysis.overall_stats.total_solved, 80);
        assert_eq!(analysis.overall_stats.lesson_count, 4);
        assert_eq!(analysis.lesson_stats[0].lesson, "Matematik");
        assert_eq!(analysis.weak_lessons.len(), 1);
        assert_eq!(analysis.weak_lessons[0].lesson, "Fizik");
        assert_eq!(analysis.strong_lessons[0].lesson, "Matematik");
        assert!(!analysis.empty);
    }

    #[test]
    fn student_analysis_empty() {
        let analysis = compute_student_analysis(
            &[],
            ReportPeriod::day(date(4)),
            &AnalysisThresholds::default(),
        )
        .unwrap();
        assert!(analysis.empty);
        assert_eq!(analysis.overall_stats.accuracy_rate, 0.0);
    }

    #[test]
    fn student_analysis_rejects_inconsistent_stat() {
        let mut stat = LessonStat::new("Fizik", 10, 5, 5).unwrap();
        stat.total_correct = 50;
        let result = compute_student_analysis(
            &[stat],
            ReportPeriod::day(date(4)),
            &AnalysisThresholds::default(),
        );
        assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));
    }

    #[test]
    fn coach_summary_ranks_students() {
        let t = AnalysisThresholds::default();
        let progress = vec![
            student_progress(
                &student("a", "Ayşe"),
                &[entry(11, "Fizik", 10, 9, 1)],
                &[entry(4, "Fizik", 10, 5, 5)],
                &t,
            )
            .unwrap(),
            student_progress(
                &student("b", "Burak"),
                &[entry(11, "Fizik", 10, 4, 6)],
                &[entry(4, "Fizik", 10, 8, 2)],
                &t,
            )
            .unwrap(),
            student_progress(&student("c", "Can"), &[], &[], &t).unwrap(),
        ];

        let summary = compute_coach_weekly_summary(ReportPeriod::week_of(date(11)), progress);
        assert_eq!(summary.summary.total_students, 3);
        assert_eq!(summary.summary.students_improved, 1);
        assert_eq!(summary.summary.students_declined, 1);
        assert_eq!(summary.summary.students_stable, 1);
        assert_eq!(summary.summary.attention_needed, 2);
        assert_eq!(summary.most_improved[0].student_id, "a");
        assert_eq!(summary.most_declined[0].student_id, "b");
        assert_eq!(summary.all_students[0].student_id, "a");
        assert_eq!(summary.all_students[2].student_id, "b");
        assert_eq!(summary.all_students[1].last_activity, None);
    }

    #[test]
    fn json_roundtrip() {
        let report = weekly_report_for(date(6), &[entry(5, "Fizik", 10, 8, 2)]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("weekly.json");

        write_json(&report, &path).unwrap();
        let loaded: WeeklyReport = read_json(&path).unwrap();
        assert_eq!(loaded.summary.total_solved, 10);
        assert_eq!(loaded.period, report.period);
    }
}
