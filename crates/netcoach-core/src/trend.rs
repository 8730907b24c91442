//! Weak/strong lesson classification and period-over-period trends.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::LessonStat;

/// Thresholds that drive classification and trend status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisThresholds {
    /// A lesson below this accuracy is weak.
    #[serde(default = "default_weak_below")]
    pub weak_below: f64,
    /// A lesson at or above this accuracy is strong.
    #[serde(default = "default_strong_at_least")]
    pub strong_at_least: f64,
    /// Solved questions a lesson needs before it can be called weak.
    #[serde(default = "default_min_weak_sample")]
    pub min_weak_sample: u64,
    /// Changes within this many percentage points count as stable.
    #[serde(default)]
    pub stable_epsilon: f64,
}

fn default_weak_below() -> f64 {
    60.0
}

fn default_strong_at_least() -> f64 {
    80.0
}

fn default_min_weak_sample() -> u64 {
    1
}

impl Default for AnalysisThresholds {
    fn default() -> Self {
        Self {
            weak_below: default_weak_below(),
            strong_at_least: default_strong_at_least(),
            min_weak_sample: default_min_weak_sample(),
            stable_epsilon: 0.0,
        }
    }
}

impl AnalysisThresholds {
    /// Below `weak_below` with at least `min_weak_sample` solved. A lesson
    /// with nothing solved is never weak, even when the minimum is 0.
    pub fn is_weak(&self, stat: &LessonStat) -> bool {
        stat.total_solved > 0
            && stat.total_solved >= self.min_weak_sample
            && stat.accuracy_rate < self.weak_below
    }

    pub fn is_strong(&self, stat: &LessonStat) -> bool {
        stat.total_solved > 0 && stat.accuracy_rate >= self.strong_at_least
    }

    /// Trend between two accuracies using this configuration's stable band.
    pub fn trend(&self, current: f64, previous: f64) -> TrendResult {
        let change_percent = current - previous;
        let status = if change_percent.abs() <= self.stable_epsilon {
            TrendStatus::Stable
        } else if change_percent > 0.0 {
            TrendStatus::Improved
        } else {
            TrendStatus::Declined
        };
        TrendResult {
            status,
            change_percent,
        }
    }
}

/// Direction of change between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Improved,
    Declined,
    Stable,
}

impl fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendStatus::Improved => write!(f, "improved"),
            TrendStatus::Declined => write!(f, "declined"),
            TrendStatus::Stable => write!(f, "stable"),
        }
    }
}

/// The two-valued trend label carried by weekly reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeeklyTrend {
    #[serde(rename = "Yükseliş")]
    Rising,
    #[serde(rename = "Düşüş")]
    Falling,
}

impl WeeklyTrend {
    /// Stable weeks are reported as rising: the label only flags a drop.
    pub fn from_status(status: TrendStatus) -> Self {
        match status {
            TrendStatus::Declined => WeeklyTrend::Falling,
            TrendStatus::Improved | TrendStatus::Stable => WeeklyTrend::Rising,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeeklyTrend::Rising => "Yükseliş",
            WeeklyTrend::Falling => "Düşüş",
        }
    }
}

impl fmt::Display for WeeklyTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status and size of a change, in percentage points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub status: TrendStatus,
    pub change_percent: f64,
}

/// Trend from `previous` to `current` accuracy.
///
/// Stable only on exact equality; any positive change is an improvement.
pub fn trend(current_period_accuracy: f64, previous_period_accuracy: f64) -> TrendResult {
    AnalysisThresholds::default().trend(current_period_accuracy, previous_period_accuracy)
}

/// Weak and strong lessons, each ordered by descending solved count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonBuckets {
    pub weak: Vec<LessonStat>,
    pub strong: Vec<LessonStat>,
}

/// Sort lessons into weak and strong buckets.
///
/// Lessons between the two thresholds land in neither. Ordering within a
/// bucket is stable: ties in solved count keep input order.
pub fn classify(lesson_stats: &[LessonStat], thresholds: &AnalysisThresholds) -> LessonBuckets {
    let mut weak: Vec<LessonStat> = lesson_stats
        .iter()
        .filter(|s| thresholds.is_weak(s))
        .cloned()
        .collect();
    let mut strong: Vec<LessonStat> = lesson_stats
        .iter()
        .filter(|s| thresholds.is_strong(s))
        .cloned()
        .collect();

    weak.sort_by(|a, b| b.total_solved.cmp(&a.total_solved));
    strong.sort_by(|a, b| b.total_solved.cmp(&a.total_solved));

    LessonBuckets { weak, strong }
}

/// Accuracy change of one lesson between two periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonChange {
    pub lesson: String,
    pub previous_accuracy: f64,
    pub current_accuracy: f64,
    pub change: f64,
}

/// Lesson-by-lesson comparison of two periods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonComparison {
    /// Largest gain first.
    pub improved: Vec<LessonChange>,
    /// Largest drop first.
    pub declined: Vec<LessonChange>,
    pub stable: usize,
    /// Lessons studied now but not in the previous period.
    pub new_lessons: Vec<String>,
    /// Lessons studied before but not in the current period.
    pub removed_lessons: Vec<String>,
}

impl LessonComparison {
    pub fn has_declines(&self) -> bool {
        !self.declined.is_empty()
    }
}

/// Compare per-lesson accuracy of the current period against the previous.
pub fn compare_lessons(
    current: &[LessonStat],
    previous: &[LessonStat],
    thresholds: &AnalysisThresholds,
) -> LessonComparison {
    let previous_by_lesson: HashMap<&str, &LessonStat> =
        previous.iter().map(|s| (s.lesson.as_str(), s)).collect();

    let mut comparison = LessonComparison::default();

    for stat in current {
        let Some(before) = previous_by_lesson.get(stat.lesson.as_str()) else {
            comparison.new_lessons.push(stat.lesson.clone());
            continue;
        };
        let result = thresholds.trend(stat.accuracy_rate, before.accuracy_rate);
        let change = LessonChange {
            lesson: stat.lesson.clone(),
            previous_accuracy: before.accuracy_rate,
            current_accuracy: stat.accuracy_rate,
            change: result.change_percent,
        };
        match result.status {
            TrendStatus::Improved => comparison.improved.push(change),
            TrendStatus::Declined => comparison.declined.push(change),
            TrendStatus::Stable => comparison.stable += 1,
        }
    }

    comparison.removed_lessons = previous
        .iter()
        .filter(|p| !current.iter().any(|c| c.lesson == p.lesson))
        .map(|p| p.lesson.clone())
        .collect();

    comparison
        .improved
        .sort_by(|a, b| b.change.total_cmp(&a.change));
    comparison
        .declined
        .sort_by(|a, b| a.change.total_cmp(&b.change));

    comparison
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(lesson: &str, solved: u64, correct: u64) -> LessonStat {
        LessonStat::new(lesson, solved, correct, 0).unwrap()
    }

    #[test]
    fn thresholds_are_inclusive_on_strong_only() {
        let t = AnalysisThresholds::default();
        let sixty = stat("Kimya", 10, 6);
        let eighty = stat("Fizik", 10, 8);
        let below = stat("Biyoloji", 100, 59);

        assert!(!t.is_weak(&sixty));
        assert!(!t.is_strong(&sixty));
        assert!(t.is_strong(&eighty));
        assert!(t.is_weak(&below));
    }

    #[test]
    fn zero_solved_lands_in_neither_bucket() {
        let buckets = classify(&[stat("Tarih", 0, 0)], &AnalysisThresholds::default());
        assert!(buckets.weak.is_empty());
        assert!(buckets.strong.is_empty());
    }

    #[test]
    fn zero_solved_is_not_weak_without_a_minimum_sample() {
        let t = AnalysisThresholds {
            min_weak_sample: 0,
            ..Default::default()
        };
        let buckets = classify(&[stat("Tarih", 0, 0), stat("Fizik", 1, 0)], &t);
        assert_eq!(buckets.weak.len(), 1);
        assert_eq!(buckets.weak[0].lesson, "Fizik");
        assert!(buckets.strong.is_empty());
    }

    #[test]
    fn min_sample_excludes_thin_lessons() {
        let t = AnalysisThresholds {
            min_weak_sample: 20,
            ..Default::default()
        };
        let buckets = classify(&[stat("Fizik", 10, 2), stat("Kimya", 25, 5)], &t);
        assert_eq!(buckets.weak.len(), 1);
        assert_eq!(buckets.weak[0].lesson, "Kimya");
    }

    #[test]
    fn buckets_sorted_by_solved_descending_and_stable() {
        let stats = vec![
            stat("Fizik", 10, 2),
            stat("Kimya", 30, 9),
            stat("Biyoloji", 10, 1),
            stat("Matematik", 50, 45),
            stat("Türkçe", 80, 70),
            stat("Tarih", 20, 14),
        ];
        let buckets = classify(&stats, &AnalysisThresholds::default());

        let weak: Vec<&str> = buckets.weak.iter().map(|s| s.lesson.as_str()).collect();
        assert_eq!(weak, vec!["Kimya", "Fizik", "Biyoloji"]);
        let strong: Vec<&str> = buckets.strong.iter().map(|s| s.lesson.as_str()).collect();
        assert_eq!(strong, vec!["Türkçe", "Matematik"]);
    }

    #[test]
    fn classify_is_idempotent() {
        let stats = vec![stat("A", 10, 2), stat("B", 10, 9), stat("C", 10, 3)];
        let t = AnalysisThresholds::default();
        assert_eq!(classify(&stats, &t), classify(&stats, &t));
    }

    #[test]
    fn trend_status_and_change() {
        let up = trend(75.0, 70.0);
        assert_eq!(up.status, TrendStatus::Improved);
        assert_eq!(up.change_percent, 5.0);

        assert_eq!(trend(60.0, 72.5).status, TrendStatus::Declined);
        assert_eq!(trend(72.5, 72.5).status, TrendStatus::Stable);
        assert_eq!(trend(72.5, 72.5).change_percent, 0.0);
    }

    #[test]
    fn stable_band() {
        let t = AnalysisThresholds {
            stable_epsilon: 1.0,
            ..Default::default()
        };
        assert_eq!(t.trend(70.5, 70.0).status, TrendStatus::Stable);
        assert_eq!(t.trend(71.5, 70.0).status, TrendStatus::Improved);
    }

    #[test]
    fn weekly_trend_labels() {
        assert_eq!(WeeklyTrend::from_status(TrendStatus::Improved).label(), "Yükseliş");
        assert_eq!(WeeklyTrend::from_status(TrendStatus::Stable), WeeklyTrend::Rising);
        assert_eq!(WeeklyTrend::from_status(TrendStatus::Declined).to_string(), "Düşüş");
        assert_eq!(
            serde_json::to_string(&WeeklyTrend::Rising).unwrap(),
            "\"Yükseliş\""
        );
        assert_eq!(
            serde_json::to_string(&TrendStatus::Declined).unwrap(),
            "\"declined\""
        );
    }

    #[test]
    fn lesson_comparison() {
        let previous = vec![stat("Fizik", 10, 5), stat("Kimya", 10, 8), stat("Tarih", 10, 5)];
        let current = vec![
            stat("Fizik", 10, 7),
            stat("Kimya", 10, 6),
            stat("Biyoloji", 10, 9),
        ];
        let cmp = compare_lessons(&current, &previous, &AnalysisThresholds::default());

        assert_eq!(cmp.improved.len(), 1);
        assert_eq!(cmp.improved[0].lesson, "Fizik");
        assert!((cmp.improved[0].change - 20.0).abs() < 1e-9);
        assert_eq!(cmp.declined[0].lesson, "Kimya");
        assert!(cmp.has_declines());
        assert_eq!(cmp.new_lessons, vec!["Biyoloji"]);
        assert_eq!(cmp.removed_lessons, vec!["Tarih"]);
        assert_eq!(cmp.stable, 0);
    }
}
