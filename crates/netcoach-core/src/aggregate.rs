//! Exam-level and multi-exam aggregation of subject results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ExamRecord, ExamType, SubjectResult};
use crate::scoring::score_subject;

/// Scored view of one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectBreakdown {
    pub subject_name: String,
    #[serde(default)]
    pub total_questions: Option<i64>,
    pub correct: i64,
    pub wrong: i64,
    pub blank: i64,
    pub net: f64,
    /// Correct answers over correct + wrong + blank, as a percentage.
    pub accuracy: f64,
}

/// Summary of a single exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSummary {
    pub exam_id: String,
    pub student_id: String,
    pub exam_type: ExamType,
    pub exam_date: NaiveDate,
    #[serde(default)]
    pub exam_name: Option<String>,
    /// Sum of the subject nets, unrounded.
    pub total_net: f64,
    /// Subjects in the order they appear on the exam.
    pub subject_breakdown: Vec<SubjectBreakdown>,
}

/// Score every subject, keeping input order.
///
/// Subjects with nothing attempted stay in the breakdown with net 0.
pub fn aggregate_subjects(subjects: &[SubjectResult]) -> Result<(f64, Vec<SubjectBreakdown>)> {
    let mut total_net = 0.0;
    let mut breakdown = Vec::with_capacity(subjects.len());

    for subject in subjects {
        let (net, accuracy) = score_subject(subject)?;
        total_net += net;
        breakdown.push(SubjectBreakdown {
            subject_name: subject.subject_name.clone(),
            total_questions: subject.total_questions,
            correct: subject.correct,
            wrong: subject.wrong,
            blank: subject.blank,
            net,
            accuracy,
        });
    }

    Ok((total_net, breakdown))
}

/// Compute the total net and per-subject breakdown of an exam.
///
/// Subjects without a known question total are checked against the exam
/// type's template, so a TYT "Fen Bilimleri" with more than 20 answers is
/// rejected.
pub fn compute_exam_summary(exam: &ExamRecord) -> Result<ExamSummary> {
    let (total_net, subject_breakdown) = aggregate_subjects(&exam.resolved_subjects())?;
    tracing::debug!(
        exam_id = %exam.exam_id,
        subjects = subject_breakdown.len(),
        total_net,
        "exam summarized"
    );

    Ok(ExamSummary {
        exam_id: exam.exam_id.clone(),
        student_id: exam.student_id.clone(),
        exam_type: exam.exam_type,
        exam_date: exam.exam_date,
        exam_name: exam.exam_name.clone(),
        total_net,
        subject_breakdown,
    })
}

/// One exam's total net on a timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetPoint {
    pub exam_id: String,
    pub exam_date: NaiveDate,
    pub exam_type: ExamType,
    pub total_net: f64,
}

/// Average performance in one subject across several exams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectAverage {
    pub subject_name: String,
    pub exam_count: usize,
    pub average_net: f64,
    pub average_accuracy: f64,
}

/// Summary over several exams of one student.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiExamSummary {
    pub exam_count: usize,
    pub average_net: f64,
    pub best_net: f64,
    pub latest_net: f64,
    /// Exams ordered by date; exams on the same date keep input order.
    pub net_progression: Vec<NetPoint>,
    /// Subjects in first-seen order.
    pub subject_averages: Vec<SubjectAverage>,
    /// No exams were supplied.
    pub empty: bool,
}

/// Summarize a set of exams. An empty slice yields a zeroed summary.
pub fn summarize_exams(exams: &[ExamRecord]) -> Result<MultiExamSummary> {
    if exams.is_empty() {
        return Ok(MultiExamSummary {
            empty: true,
            ..Default::default()
        });
    }

    let summaries = exams
        .iter()
        .map(compute_exam_summary)
        .collect::<Result<Vec<_>>>()?;

    let mut net_progression: Vec<NetPoint> = summaries
        .iter()
        .map(|s| NetPoint {
            exam_id: s.exam_id.clone(),
            exam_date: s.exam_date,
            exam_type: s.exam_type,
            total_net: s.total_net,
        })
        .collect();
    net_progression.sort_by_key(|p| p.exam_date);

    let total: f64 = summaries.iter().map(|s| s.total_net).sum();
    let best_net = summaries
        .iter()
        .map(|s| s.total_net)
        .fold(f64::NEG_INFINITY, f64::max);
    let latest_net = net_progression.last().map(|p| p.total_net).unwrap_or(0.0);

    // (name, exams, net sum, accuracy sum)
    let mut per_subject: Vec<(String, usize, f64, f64)> = Vec::new();
    for breakdown in summaries.iter().flat_map(|s| &s.subject_breakdown) {
        match per_subject
            .iter_mut()
            .find(|(name, ..)| *name == breakdown.subject_name)
        {
            Some(entry) => {
                entry.1 += 1;
                entry.2 += breakdown.net;
                entry.3 += breakdown.accuracy;
            }
            None => per_subject.push((
                breakdown.subject_name.clone(),
                1,
                breakdown.net,
                breakdown.accuracy,
            )),
        }
    }

    let subject_averages = per_subject
        .into_iter()
        .map(|(subject_name, count, net_sum, accuracy_sum)| SubjectAverage {
            subject_name,
            exam_count: count,
            average_net: net_sum / count as f64,
            average_accuracy: accuracy_sum / count as f64,
        })
        .collect();

    Ok(MultiExamSummary {
        exam_count: summaries.len(),
        average_net: total / summaries.len() as f64,
        best_net,
        latest_net,
        net_progression,
        subject_averages,
        empty: false,
    })
}
