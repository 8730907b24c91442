//! Curriculum progress: how far a student is through their topic checklist.
//!
//! Completion of a lesson is completed topics over all of its topics, as a
//! percentage. A lesson or student with no topics is 0% complete and the
//! report's `empty` flag is set.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ExamType, TopicRecord, TopicStatus};
use crate::scoring;

/// Status counts of a group of topics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub not_started: u64,
}

impl StatusCounts {
    fn count(&mut self, status: TopicStatus) {
        self.total += 1;
        match status {
            TopicStatus::Completed => self.completed += 1,
            TopicStatus::InProgress => self.in_progress += 1,
            TopicStatus::NotStarted => self.not_started += 1,
        }
    }

    /// Completed share in percent, 0 when there are no topics.
    pub fn completion_rate(&self) -> f64 {
        scoring::rate(self.completed, self.total)
    }
}

/// Progress through the topics of one lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonProgress {
    pub lesson: String,
    /// Exam of the lesson's first topic that names one.
    pub exam_type: Option<ExamType>,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub completion_rate: f64,
    /// First topic in progress, else the first not yet started.
    pub next_topic: Option<String>,
    /// Topics in checklist order.
    pub topics: Vec<TopicRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicProgressReport {
    pub student_id: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub completion_rate: f64,
    /// Lessons in the order their first topic appears on the checklist.
    pub lessons: Vec<LessonProgress>,
    pub empty: bool,
}

fn next_topic(topics: &[TopicRecord]) -> Option<String> {
    let first = |status| topics.iter().find(|t| t.status == status);
    first(TopicStatus::InProgress)
        .or_else(|| first(TopicStatus::NotStarted))
        .map(|t| t.topic.clone())
}

/// Group a student's topics by lesson and measure completion.
///
/// Topics are ordered by `order_index`; ties keep their input order.
pub fn compute_topic_progress(
    student_id: &str,
    topics: &[TopicRecord],
) -> Result<TopicProgressReport> {
    let mut ordered: Vec<&TopicRecord> = topics.iter().collect();
    ordered.sort_by_key(|t| t.order_index);

    let mut counts = StatusCounts::default();
    let mut lessons: Vec<LessonProgress> = Vec::new();
    for topic in ordered {
        topic.validate()?;
        counts.count(topic.status);
        let idx = match lessons.iter().position(|l| l.lesson == topic.lesson) {
            Some(idx) => idx,
            None => {
                lessons.push(LessonProgress {
                    lesson: topic.lesson.clone(),
                    exam_type: None,
                    counts: StatusCounts::default(),
                    completion_rate: 0.0,
                    next_topic: None,
                    topics: Vec::new(),
                });
                lessons.len() - 1
            }
        };
        let lesson = &mut lessons[idx];
        lesson.counts.count(topic.status);
        lesson.exam_type = lesson.exam_type.or(topic.exam_type);
        lesson.topics.push(topic.clone());
    }

    for lesson in &mut lessons {
        lesson.completion_rate = lesson.counts.completion_rate();
        lesson.next_topic = next_topic(&lesson.topics);
    }

    tracing::debug!(
        student = student_id,
        topics = counts.total,
        completed = counts.completed,
        "computed topic progress"
    );
    Ok(TopicProgressReport {
        student_id: student_id.to_string(),
        completion_rate: counts.completion_rate(),
        counts,
        empty: lessons.is_empty(),
        lessons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn topic(id: &str, lesson: &str, status: TopicStatus, order: i64) -> TopicRecord {
        TopicRecord {
            topic_id: id.into(),
            student_id: "s1".into(),
            lesson: lesson.into(),
            topic: format!("Konu {id}"),
            status,
            order_index: order,
            exam_type: Some(ExamType::Tyt),
        }
    }

    #[test]
    fn completion_per_lesson_and_overall() {
        let topics = vec![
            topic("m1", "TYT - Matematik", TopicStatus::Completed, 0),
            topic("m2", "TYT - Matematik", TopicStatus::InProgress, 1),
            topic("m3", "TYT - Matematik", TopicStatus::NotStarted, 2),
            topic("m4", "TYT - Matematik", TopicStatus::Completed, 3),
            topic("t1", "TYT - Türkçe", TopicStatus::NotStarted, 4),
        ];
        let report = compute_topic_progress("s1", &topics).unwrap();

        assert!(!report.empty);
        assert_eq!(report.counts.total, 5);
        assert_eq!(report.counts.completed, 2);
        assert_eq!(report.counts.in_progress, 1);
        assert_eq!(report.completion_rate, 40.0);

        let math = &report.lessons[0];
        assert_eq!(math.lesson, "TYT - Matematik");
        assert_eq!(math.counts.total, 4);
        assert_eq!(math.completion_rate, 50.0);
        assert_eq!(math.next_topic.as_deref(), Some("Konu m2"));
        assert_eq!(math.exam_type, Some(ExamType::Tyt));

        let turkish = &report.lessons[1];
        assert_eq!(turkish.completion_rate, 0.0);
        assert_eq!(turkish.next_topic.as_deref(), Some("Konu t1"));
    }

    #[test]
    fn no_topics_is_zero_percent_and_empty() {
        let report = compute_topic_progress("s1", &[]).unwrap();
        assert!(report.empty);
        assert_eq!(report.counts, StatusCounts::default());
        assert_eq!(report.completion_rate, 0.0);
        assert!(report.lessons.is_empty());
    }

    #[test]
    fn lessons_follow_checklist_order() {
        let topics = vec![
            topic("f1", "AYT - Fizik", TopicStatus::Completed, 5),
            topic("k1", "AYT - Kimya", TopicStatus::Completed, 1),
            topic("f0", "AYT - Fizik", TopicStatus::Completed, 0),
        ];
        let report = compute_topic_progress("s1", &topics).unwrap();
        let lessons: Vec<&str> = report.lessons.iter().map(|l| l.lesson.as_str()).collect();
        assert_eq!(lessons, vec!["AYT - Fizik", "AYT - Kimya"]);
        assert_eq!(report.lessons[0].topics[0].topic_id, "f0");
        assert_eq!(report.lessons[0].completion_rate, 100.0);
        assert_eq!(report.lessons[0].next_topic, None);
    }

    #[test]
    fn nameless_topic_is_rejected() {
        let mut bad = topic("x", "TYT - Fizik", TopicStatus::NotStarted, 0);
        bad.topic = String::new();
        let err = compute_topic_progress("s1", &[bad]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { ref field, .. } if field == "topic"));
    }

    #[test]
    fn status_labels_and_wire_names() {
        assert_eq!(TopicStatus::InProgress.to_string(), "Devam Ediyor");
        let parsed: TopicStatus = serde_json::from_str("\"devam-ediyor\"").unwrap();
        assert_eq!(parsed, TopicStatus::InProgress);
        assert_eq!(
            serde_json::to_string(&TopicStatus::Completed).unwrap(),
            "\"tamamlandi\""
        );
    }
}
