//! In-memory [`ActivitySource`] over a loaded dataset snapshot.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{
    ActivityEntry, Dataset, ExamRecord, ReportPeriod, Student, SubjectResult, TaskRecord,
    TopicRecord,
};
use crate::parser::load_dataset;
use crate::traits::ActivitySource;

/// Serves reads from a [`Dataset`] held in memory.
pub struct DatasetSource {
    name: String,
    dataset: Dataset,
}

impl DatasetSource {
    pub fn new(name: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            name: name.into(),
            dataset,
        }
    }

    /// Load a snapshot file and serve it.
    pub fn from_path(path: &Path) -> Result<Self> {
        let dataset = load_dataset(path)?;
        Ok(Self::new(path.display().to_string(), dataset))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[async_trait]
impl ActivitySource for DatasetSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn students(&self) -> Result<Vec<Student>> {
        Ok(self.dataset.students.clone())
    }

    async fn exams(&self, student_id: &str) -> Result<Vec<ExamRecord>> {
        Ok(self
            .dataset
            .exams
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn exam_subjects(&self, exam_id: &str) -> Result<Vec<SubjectResult>> {
        self.dataset
            .exams
            .iter()
            .find(|e| e.exam_id == exam_id)
            .map(|e| e.subjects.clone())
            .ok_or_else(|| anyhow::anyhow!("exam not found: {exam_id}"))
    }

    async fn activities(
        &self,
        student_id: &str,
        period: &ReportPeriod,
    ) -> Result<Vec<ActivityEntry>> {
        Ok(self
            .dataset
            .activities
            .iter()
            .filter(|a| a.student_id == student_id && period.contains(a.date))
            .cloned()
            .collect())
    }

    async fn tasks(&self, student_id: &str) -> Result<Vec<TaskRecord>> {
        Ok(self
            .dataset
            .tasks
            .iter()
            .filter(|t| t.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn topics(&self, student_id: &str) -> Result<Vec<TopicRecord>> {
        let mut topics: Vec<TopicRecord> = self
            .dataset
            .topics
            .iter()
            .filter(|t| t.student_id == student_id)
            .cloned()
            .collect();
        topics.sort_by_key(|t| t.order_index);
        Ok(topics)
    }
}
