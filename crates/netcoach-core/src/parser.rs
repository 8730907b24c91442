//! Snapshot loading, stored-breakdown decoding, and dataset validation.
//!
//! Stored exam analyses keep their subject breakdown and weak topics as JSON
//! strings. Decoding distinguishes an absent value from a corrupt one so that
//! corruption is reported instead of silently shown as "no data".

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::error::AnalysisError;
use crate::model::{Dataset, StoredExamAnalysis, SubjectResult};

/// Outcome of decoding an optional stored JSON string.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// No value was stored (missing, blank, or JSON `null`).
    Absent,
    Present(T),
}

impl<T> Decoded<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Decoded::Absent)
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        match self {
            Decoded::Absent => T::default(),
            Decoded::Present(value) => value,
        }
    }
}

fn decode_stored<T: DeserializeOwned>(
    raw: Option<&str>,
    context: &str,
) -> std::result::Result<Decoded<T>, AnalysisError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Decoded::Absent);
    };
    let value: Option<T> =
        serde_json::from_str(raw).map_err(|source| AnalysisError::ParseFailure {
            context: context.to_string(),
            source,
        })?;
    Ok(value.map_or(Decoded::Absent, Decoded::Present))
}

/// Decode a stored subject breakdown string.
pub fn decode_subject_breakdown(
    raw: Option<&str>,
) -> std::result::Result<Decoded<Vec<SubjectResult>>, AnalysisError> {
    decode_stored(raw, "subject breakdown")
}

/// Decode a stored weak-topic list string.
pub fn decode_weak_topics(
    raw: Option<&str>,
) -> std::result::Result<Decoded<Vec<String>>, AnalysisError> {
    decode_stored(raw, "weak topics")
}

/// A non-fatal problem found in a dataset.
#[derive(Debug, Clone)]
pub struct DataWarning {
    /// The record the warning refers to (exam, student, or task id).
    pub record_id: Option<String>,
    pub message: String,
}

/// A stored analysis decoded leniently.
#[derive(Debug, Clone, Default)]
pub struct DecodedAnalysis {
    pub exam_id: String,
    pub subjects: Vec<SubjectResult>,
    pub weak_topics: Vec<String>,
}

/// Decode a stored analysis, turning corrupt fields into empty values plus
/// a warning. Each warning is also logged.
pub fn decode_stored_analysis(stored: &StoredExamAnalysis) -> (DecodedAnalysis, Vec<DataWarning>) {
    let mut warnings = Vec::new();
    let mut note = |err: AnalysisError| {
        tracing::warn!(exam_id = %stored.exam_id, "corrupt stored analysis: {err}");
        warnings.push(DataWarning {
            record_id: Some(stored.exam_id.clone()),
            message: err.to_string(),
        });
    };

    let subjects = match decode_subject_breakdown(stored.subject_breakdown.as_deref()) {
        Ok(decoded) => decoded.unwrap_or_default(),
        Err(err) => {
            note(err);
            Vec::new()
        }
    };
    let weak_topics = match decode_weak_topics(stored.weak_topics.as_deref()) {
        Ok(decoded) => decoded.unwrap_or_default(),
        Err(err) => {
            note(err);
            Vec::new()
        }
    };

    (
        DecodedAnalysis {
            exam_id: stored.exam_id.clone(),
            subjects,
            weak_topics,
        },
        warnings,
    )
}

/// Load a dataset snapshot from a `.json` or `.toml` file.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset: {}", path.display()))?;
    parse_dataset_str(&content, path)
}

/// Parse a dataset string; the format follows the file extension of
/// `source_path` and defaults to JSON.
pub fn parse_dataset_str(content: &str, source_path: &Path) -> Result<Dataset> {
    let is_toml = source_path.extension().is_some_and(|ext| ext == "toml");
    let dataset: Dataset = if is_toml {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?
    };

    tracing::debug!(
        students = dataset.students.len(),
        exams = dataset.exams.len(),
        activities = dataset.activities.len(),
        "loaded dataset from {}",
        source_path.display()
    );
    Ok(dataset)
}

/// Check a dataset for problems that would make reports fail or mislead.
pub fn validate_dataset(dataset: &Dataset) -> Vec<DataWarning> {
    let mut warnings = Vec::new();
    let warn = |warnings: &mut Vec<DataWarning>, id: &str, message: String| {
        warnings.push(DataWarning {
            record_id: Some(id.to_string()),
            message,
        });
    };

    // Duplicate ids
    let mut student_ids = HashSet::new();
    for student in &dataset.students {
        if !student_ids.insert(student.student_id.as_str()) {
            warn(
                &mut warnings,
                &student.student_id,
                format!("duplicate student ID: {}", student.student_id),
            );
        }
    }
    let mut exam_ids = HashSet::new();
    for exam in &dataset.exams {
        if !exam_ids.insert(exam.exam_id.as_str()) {
            warn(
                &mut warnings,
                &exam.exam_id,
                format!("duplicate exam ID: {}", exam.exam_id),
            );
        }
    }

    // Exams
    for exam in &dataset.exams {
        if !student_ids.contains(exam.student_id.as_str()) {
            warn(
                &mut warnings,
                &exam.exam_id,
                format!("exam belongs to unknown student {}", exam.student_id),
            );
        }
        if exam.subjects.is_empty() {
            warn(&mut warnings, &exam.exam_id, "exam has no subjects".into());
        }
        for subject in &exam.subjects {
            if let Err(e) = subject.validate() {
                warn(&mut warnings, &exam.exam_id, e.to_string());
            }
        }
    }

    // Activities
    for entry in &dataset.activities {
        if !student_ids.contains(entry.student_id.as_str()) {
            warn(
                &mut warnings,
                &entry.student_id,
                format!("activity on {} belongs to unknown student", entry.date),
            );
        }
        if let Err(e) = entry.validate() {
            warn(&mut warnings, &entry.student_id, e.to_string());
        }
    }

    // Tasks
    for task in &dataset.tasks {
        if !student_ids.contains(task.student_id.as_str()) {
            warn(
                &mut warnings,
                &task.task_id,
                format!("task belongs to unknown student {}", task.student_id),
            );
        }
    }

    // Topics
    for topic in &dataset.topics {
        if !student_ids.contains(topic.student_id.as_str()) {
            warn(
                &mut warnings,
                &topic.topic_id,
                format!("topic belongs to unknown student {}", topic.student_id),
            );
        }
        if let Err(e) = topic.validate() {
            warn(&mut warnings, &topic.topic_id, e.to_string());
        }
    }

    // Stored analyses
    for stored in &dataset.stored_analyses {
        if !exam_ids.contains(stored.exam_id.as_str()) {
            warn(
                &mut warnings,
                &stored.exam_id,
                "stored analysis refers to an unknown exam".into(),
            );
        }
        if let Err(e) = decode_subject_breakdown(stored.subject_breakdown.as_deref()) {
            warn(&mut warnings, &stored.exam_id, e.to_string());
        }
        if let Err(e) = decode_weak_topics(stored.weak_topics.as_deref()) {
            warn(&mut warnings, &stored.exam_id, e.to_string());
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExamType, TopicStatus};
    use std::path::PathBuf;

    const VALID_JSON: &str = r#"{
  "students": [
    { "student_id": "s1", "name": "Ayşe Yılmaz", "track": "Sayısal" }
  ],
  "exams": [
    {
      "exam_id": "e1",
      "student_id": "s1",
      "exam_type": "TYT",
      "exam_date": "2024-03-10",
      "subjects": [
        { "subject_name": "Türkçe", "total_questions": 40, "correct": 35, "wrong": 3, "blank": 2 },
        { "name": "Matematik", "total": 40, "correct": 25, "wrong": 8, "blank": 7 }
      ]
    }
  ],
  "activities": [
    { "student_id": "s1", "date": "2024-03-04", "lesson": "Matematik", "solved": 40, "correct": 30, "wrong": 6, "minutes": 60 }
  ],
  "tasks": [
    { "task_id": "t1", "student_id": "s1", "title": "Türev tekrar", "due_date": "2024-03-04", "completed": true }
  ],
  "topics": [
    { "id": "k1", "student_id": "s1", "ders": "TYT - Matematik", "konu": "Türev", "durum": "devam-ediyor", "order_index": 3, "sinav_turu": "TYT" },
    { "topic_id": "k2", "student_id": "s1", "lesson": "TYT - Matematik", "topic": "İntegral" }
  ],
  "stored_analyses": [
    { "exam_id": "e1", "subject_breakdown": "[{\"name\":\"Türkçe\",\"correct\":35,\"wrong\":3,\"blank\":2,\"net\":34.25}]" }
  ]
}"#;

    #[test]
    fn parse_valid_json() {
        let dataset = parse_dataset_str(VALID_JSON, &PathBuf::from("data.json")).unwrap();
        assert_eq!(dataset.students.len(), 1);
        assert_eq!(dataset.exams[0].subjects[1].subject_name, "Matematik");
        assert_eq!(dataset.exams[0].subjects[1].total_questions, Some(40));
        assert!(dataset.tasks[0].completed);
        assert_eq!(dataset.topics[0].topic_id, "k1");
        assert_eq!(dataset.topics[0].status, TopicStatus::InProgress);
        assert_eq!(dataset.topics[0].exam_type, Some(ExamType::Tyt));
        assert_eq!(dataset.topics[1].status, TopicStatus::NotStarted);
        assert_eq!(dataset.topics[1].order_index, 0);
        assert!(validate_dataset(&dataset).is_empty());
    }

    #[test]
    fn parse_toml_dataset() {
        let toml = r#"
[[students]]
student_id = "s1"
name = "Ali"

[[activities]]
student_id = "s1"
date = "2024-03-04"
lesson = "Fizik"
solved = 10
correct = 7
wrong = 2
"#;
        let dataset = parse_dataset_str(toml, &PathBuf::from("data.toml")).unwrap();
        assert_eq!(dataset.activities[0].lesson, "Fizik");
        assert_eq!(dataset.activities[0].minutes, 0);
    }

    #[test]
    fn parse_malformed_json() {
        let result = parse_dataset_str("{ students: ", &PathBuf::from("bad.json"));
        assert!(result.is_err());
    }

    #[test]
    fn breakdown_absent_vs_corrupt() {
        assert!(decode_subject_breakdown(None).unwrap().is_absent());
        assert!(decode_subject_breakdown(Some("  ")).unwrap().is_absent());
        assert!(decode_subject_breakdown(Some("null")).unwrap().is_absent());

        let present = decode_subject_breakdown(Some(r#"[{"name":"Fizik","correct":5}]"#)).unwrap();
        match present {
            Decoded::Present(subjects) => {
                assert_eq!(subjects[0].subject_name, "Fizik");
                assert_eq!(subjects[0].wrong, 0);
            }
            Decoded::Absent => panic!("expected a decoded breakdown"),
        }

        let corrupt = decode_subject_breakdown(Some("[{\"name\": \"Fizik\""));
        assert!(matches!(corrupt, Err(AnalysisError::ParseFailure { .. })));
        assert!(corrupt.unwrap_err().is_corrupt_data());
    }

    #[test]
    fn lenient_decoding_reports_corruption() {
        let stored = StoredExamAnalysis {
            exam_id: "e9".into(),
            subject_breakdown: Some("not json".into()),
            weak_topics: Some(r#"["Fizik - Elektrik"]"#.into()),
        };
        let (decoded, warnings) = decode_stored_analysis(&stored);
        assert!(decoded.subjects.is_empty());
        assert_eq!(decoded.weak_topics, vec!["Fizik - Elektrik"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].record_id.as_deref(), Some("e9"));
        assert!(warnings[0].message.contains("subject breakdown"));
    }

    #[test]
    fn validate_reports_problems() {
        let mut dataset = parse_dataset_str(VALID_JSON, &PathBuf::from("data.json")).unwrap();
        dataset.students.push(dataset.students[0].clone());
        dataset.exams[0].subjects[0].wrong = 10;
        dataset.activities[0].correct = -1;
        dataset.stored_analyses[0].weak_topics = Some("{".into());
        dataset.topics[1].topic = " ".into();

        let warnings = validate_dataset(&dataset);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate student")));
        assert!(warnings.iter().any(|w| w.message.contains("exceeds total")));
        assert!(warnings.iter().any(|w| w.message.contains("non-negative")));
        assert!(warnings.iter().any(|w| w.message.contains("weak topics")));
        assert!(warnings
            .iter()
            .any(|w| w.record_id.as_deref() == Some("k2") && w.message.contains("no name")));
    }

    #[test]
    fn unknown_topic_status_is_a_parse_error() {
        let json = r#"{ "topics": [
            { "id": "k1", "student_id": "s1", "ders": "Fizik", "konu": "Optik", "durum": "bitti" }
        ] }"#;
        assert!(parse_dataset_str(json, &PathBuf::from("data.json")).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, VALID_JSON).unwrap();
        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.exams.len(), 1);
        assert!(load_dataset(&dir.path().join("missing.json")).is_err());
    }
}
