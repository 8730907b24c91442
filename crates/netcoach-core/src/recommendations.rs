//! Study recommendations from exam results.

use serde::{Deserialize, Serialize};

use crate::aggregate::ExamSummary;
use crate::error::Result;
use crate::scoring;

/// Topic-level counts inside one exam subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicResult {
    pub subject: String,
    pub topic: String,
    #[serde(default)]
    pub correct: i64,
    #[serde(default)]
    pub wrong: i64,
    #[serde(default)]
    pub blank: i64,
}

/// A topic is weak below this accuracy.
pub const WEAK_TOPIC_ACCURACY: f64 = 50.0;
/// A topic is weak with more wrong answers than this.
pub const WEAK_TOPIC_MAX_WRONG: i64 = 3;

const MAX_WEAK_TOPICS: usize = 5;
const MAX_SUBJECT_HINTS: usize = 3;

/// Topics with accuracy below 50% or more than three wrong answers, as
/// "Subject - Topic" labels. Topics with no questions are skipped.
pub fn identify_weak_topics(topics: &[TopicResult]) -> Result<Vec<String>> {
    let mut weak = Vec::new();
    for topic in topics {
        let total = topic.correct + topic.wrong + topic.blank;
        let accuracy = scoring::compute_accuracy(topic.correct, total)?;
        scoring::ensure_non_negative(&format!("{}.wrong", topic.topic), topic.wrong)?;
        scoring::ensure_non_negative(&format!("{}.blank", topic.topic), topic.blank)?;
        if total == 0 {
            continue;
        }
        if accuracy < WEAK_TOPIC_ACCURACY || topic.wrong > WEAK_TOPIC_MAX_WRONG {
            weak.push(format!("{} - {}", topic.subject, topic.topic));
        }
    }
    Ok(weak)
}

/// How much ground a subject still needs to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyLevel {
    /// Net below 10: revisit the basics.
    Foundation,
    /// Net below 20: focus on medium questions.
    Intermediate,
    /// Reinforce with hard questions.
    Advanced,
}

impl StudyLevel {
    pub fn for_net(net: f64) -> Self {
        if net < 10.0 {
            StudyLevel::Foundation
        } else if net < 20.0 {
            StudyLevel::Intermediate
        } else {
            StudyLevel::Advanced
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            StudyLevel::Foundation => "Temel kavramları tekrar edin ve bol soru çözün",
            StudyLevel::Intermediate => "Orta seviye sorulara odaklanın",
            StudyLevel::Advanced => "Zor soruları çözerek pekiştirin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectHint {
    pub subject_name: String,
    pub net: f64,
    pub level: StudyLevel,
    pub advice: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendations {
    /// At most five weak topics, in input order.
    pub priority_topics: Vec<String>,
    /// The three lowest-net subjects, lowest first.
    pub subject_hints: Vec<SubjectHint>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.priority_topics.is_empty() && self.subject_hints.is_empty()
    }

    /// Plain-text rendition for notifications and the CLI.
    pub fn to_text(&self) -> String {
        if self.is_empty() {
            return "Genel olarak iyi bir performans. Çalışmaya devam edin!".to_string();
        }

        let mut lines = Vec::new();
        if !self.priority_topics.is_empty() {
            lines.push("Öncelikli Çalışılacak Konular:".to_string());
            lines.extend(self.priority_topics.iter().map(|t| format!("  • {t}")));
            lines.push(String::new());
        }
        if !self.subject_hints.is_empty() {
            lines.push("Ders Bazlı Öneriler:".to_string());
            lines.extend(
                self.subject_hints
                    .iter()
                    .map(|h| format!("  • {}: {}", h.subject_name, h.advice)),
            );
        }
        lines.join("\n")
    }
}

/// Build recommendations from an exam summary and its weak topics.
pub fn recommend(summary: &ExamSummary, weak_topics: &[String]) -> Recommendations {
    let mut by_net: Vec<_> = summary.subject_breakdown.iter().collect();
    by_net.sort_by(|a, b| a.net.total_cmp(&b.net));

    let subject_hints = by_net
        .into_iter()
        .take(MAX_SUBJECT_HINTS)
        .map(|s| {
            let level = StudyLevel::for_net(s.net);
            SubjectHint {
                subject_name: s.subject_name.clone(),
                net: s.net,
                level,
                advice: level.advice().to_string(),
            }
        })
        .collect();

    Recommendations {
        priority_topics: weak_topics.iter().take(MAX_WEAK_TOPICS).cloned().collect(),
        subject_hints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::compute_exam_summary;
    use crate::model::{ExamRecord, ExamType, SubjectResult};
    use chrono::NaiveDate;

    fn topic(subject: &str, name: &str, correct: i64, wrong: i64, blank: i64) -> TopicResult {
        TopicResult {
            subject: subject.into(),
            topic: name.into(),
            correct,
            wrong,
            blank,
        }
    }

    #[test]
    fn weak_topic_rules() {
        let weak = identify_weak_topics(&[
            topic("Matematik", "Fonksiyonlar", 5, 2, 1),
            topic("Fizik", "Elektrik", 2, 2, 1),
            topic("Kimya", "Asit-Baz", 10, 4, 0),
            topic("Biyoloji", "Hücre", 0, 0, 0),
        ])
        .unwrap();
        assert_eq!(weak, vec!["Fizik - Elektrik", "Kimya - Asit-Baz"]);
    }

    #[test]
    fn weak_topics_reject_negative_counts() {
        assert!(identify_weak_topics(&[topic("Fizik", "Optik", 2, -1, 0)]).is_err());
    }

    #[test]
    fn recommendations_from_exam() {
        let exam = ExamRecord {
            exam_id: "e1".into(),
            student_id: "s1".into(),
            exam_type: ExamType::Tyt,
            exam_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            exam_name: None,
            subjects: vec![
                SubjectResult::new("Türkçe", 35, 3, 2),
                SubjectResult::new("Matematik", 15, 8, 17),
                SubjectResult::new("Fen Bilimleri", 6, 8, 6),
                SubjectResult::new("Sosyal Bilimler", 18, 2, 0),
            ],
        };
        let summary = compute_exam_summary(&exam).unwrap();
        let topics: Vec<String> = (1..=7).map(|i| format!("Konu {i}")).collect();
        let recs = recommend(&summary, &topics);

        assert_eq!(recs.priority_topics.len(), 5);
        let order: Vec<&str> = recs
            .subject_hints
            .iter()
            .map(|h| h.subject_name.as_str())
            .collect();
        assert_eq!(order, vec!["Fen Bilimleri", "Matematik", "Sosyal Bilimler"]);
        assert_eq!(recs.subject_hints[0].level, StudyLevel::Foundation);
        assert_eq!(recs.subject_hints[1].level, StudyLevel::Intermediate);
        assert_eq!(recs.subject_hints[2].level, StudyLevel::Intermediate);
        assert!(recs.to_text().contains("Konu 1"));
    }

    #[test]
    fn empty_recommendations_text() {
        assert!(Recommendations::default()
            .to_text()
            .contains("Çalışmaya devam edin"));
    }
}
