//! Markdown renditions, suitable for PR-style notes or chat messages.

use netcoach_core::aggregate::ExamSummary;
use netcoach_core::model::LessonStat;
use netcoach_core::report::{
    CoachWeeklySummary, DailyReport, MonthlyReport, StudentAnalysis, StudentProgress, WeeklyReport,
};
use netcoach_core::topics::TopicProgressReport;

fn cell(s: &str) -> String {
    s.replace('|', "\\|")
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut md = format!("| {} |\n", headers.join(" | "));
    md.push_str(&format!(
        "|{}\n",
        headers.iter().map(|_| "---|").collect::<String>()
    ));
    for row in rows {
        md.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    md
}

fn lesson_table(stats: &[LessonStat]) -> String {
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| {
            vec![
                cell(&s.lesson),
                s.total_solved.to_string(),
                s.total_correct.to_string(),
                s.total_wrong.to_string(),
                format!("{:.1}%", s.accuracy_rate),
            ]
        })
        .collect();
    table(&["Ders", "Çözülen", "Doğru", "Yanlış", "Başarı"], &rows)
}

fn lesson_names(stats: &[LessonStat]) -> String {
    if stats.is_empty() {
        return "-".to_string();
    }
    stats
        .iter()
        .map(|s| format!("{} ({:.1}%)", s.lesson, s.accuracy_rate))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn exam(summary: &ExamSummary) -> String {
    let title = summary
        .exam_name
        .clone()
        .unwrap_or_else(|| summary.exam_id.clone());
    let mut md = format!("## {} ({})\n\n", title, summary.exam_type);
    md.push_str(&format!(
        "Tarih: {} | **Toplam Net: {:.2}**\n\n",
        summary.exam_date.format("%d.%m.%Y"),
        summary.total_net
    ));
    let rows: Vec<Vec<String>> = summary
        .subject_breakdown
        .iter()
        .map(|s| {
            vec![
                cell(&s.subject_name),
                s.correct.to_string(),
                s.wrong.to_string(),
                s.blank.to_string(),
                format!("{:.2}", s.net),
                format!("{:.1}%", s.accuracy),
            ]
        })
        .collect();
    md.push_str(&table(
        &["Ders", "Doğru", "Yanlış", "Boş", "Net", "Başarı"],
        &rows,
    ));
    md
}

pub fn analysis(analysis: &StudentAnalysis) -> String {
    let mut md = format!("## Öğrenci Analizi ({})\n\n", analysis.period.label());
    if analysis.empty {
        md.push_str("_Bu dönemde çözülmüş soru yok._\n");
        return md;
    }
    let overall = &analysis.overall_stats;
    md.push_str(&format!(
        "**{}** soru, **{:.1}%** başarı, {} ders\n\n",
        overall.total_solved, overall.accuracy_rate, overall.lesson_count
    ));
    md.push_str(&format!(
        "- Zayıf dersler: {}\n",
        lesson_names(&analysis.weak_lessons)
    ));
    md.push_str(&format!(
        "- Güçlü dersler: {}\n\n",
        lesson_names(&analysis.strong_lessons)
    ));
    md.push_str(&lesson_table(&analysis.lesson_stats));
    md
}

pub fn daily(report: &DailyReport) -> String {
    let mut md = format!("## Günlük Rapor ({})\n\n", report.date.format("%d.%m.%Y"));
    if report.empty {
        md.push_str("_Bugün için kayıt yok._\n\n");
    }
    md.push_str(&format!(
        "- Çözülen: {} (doğru {}, yanlış {})\n",
        report.total_questions_solved, report.total_correct, report.total_wrong
    ));
    md.push_str(&format!("- Başarı: {:.1}%\n", report.accuracy_rate));
    md.push_str(&format!("- Süre: {} dk\n", report.study_minutes));
    md.push_str(&format!(
        "- Görevler: {} tamamlandı, {} bekliyor\n",
        report.completed_tasks, report.pending_tasks
    ));
    if let Some(lesson) = &report.most_studied_lesson {
        md.push_str(&format!("- En çok çalışılan: {lesson}\n"));
    }
    if !report.lesson_breakdown.is_empty() {
        md.push('\n');
        md.push_str(&lesson_table(&report.lesson_breakdown));
    }
    md
}

pub fn weekly(report: &WeeklyReport) -> String {
    let summary = &report.summary;
    let mut md = format!("## Haftalık Rapor ({})\n\n", report.period.label());
    if report.empty {
        md.push_str("_Bu hafta çözülmüş soru yok._\n");
        return md;
    }
    md.push_str(&format!(
        "**{}** soru, **{:.1}%** başarı, {} dk | Trend: **{}** ({:+.1})\n\n",
        summary.total_solved,
        summary.accuracy_rate,
        summary.study_minutes,
        summary.trend,
        summary.change_percent
    ));
    let rows: Vec<Vec<String>> = report
        .daily_breakdown
        .iter()
        .map(|d| {
            vec![
                d.date.format("%d.%m.%Y").to_string(),
                d.solved.to_string(),
                d.correct.to_string(),
                d.minutes.to_string(),
                format!("{:.1}%", d.accuracy),
            ]
        })
        .collect();
    md.push_str(&table(
        &["Gün", "Çözülen", "Doğru", "Süre (dk)", "Başarı"],
        &rows,
    ));
    md.push('\n');
    md.push_str(&lesson_table(&report.lesson_breakdown));
    md
}

pub fn monthly(report: &MonthlyReport) -> String {
    let summary = &report.summary;
    let mut md = format!("## Aylık Rapor ({})\n\n", report.period.label());
    if report.empty {
        md.push_str("_Bu ay çözülmüş soru yok._\n");
        return md;
    }
    md.push_str(&format!(
        "**{}** soru, **{:.1}%** başarı, gelişim {:+.1} puan\n\n",
        summary.total_solved, summary.accuracy_rate, summary.improvement_rate
    ));
    let rows: Vec<Vec<String>> = report
        .weekly_breakdown
        .iter()
        .map(|w| {
            vec![
                w.period.clone(),
                w.solved.to_string(),
                w.correct.to_string(),
                format!("{:.1}%", w.accuracy),
            ]
        })
        .collect();
    md.push_str(&table(&["Hafta", "Çözülen", "Doğru", "Başarı"], &rows));
    md.push('\n');
    md.push_str(&lesson_table(&report.lesson_breakdown));
    md
}

fn progress_table(students: &[StudentProgress]) -> String {
    let rows: Vec<Vec<String>> = students
        .iter()
        .map(|p| {
            let name = if p.needs_attention {
                format!("{} :warning:", cell(&p.student_name))
            } else {
                cell(&p.student_name)
            };
            vec![
                name,
                p.questions_solved.to_string(),
                format!("{:.1}%", p.accuracy_rate),
                format!("{:+.1}", p.change),
                p.status.to_string(),
            ]
        })
        .collect();
    table(&["Öğrenci", "Çözülen", "Başarı", "Değişim", "Durum"], &rows)
}

pub fn coach(summary: &CoachWeeklySummary) -> String {
    let counts = &summary.summary;
    let mut md = format!("## Koç Haftalık Özeti ({})\n\n", summary.period.label());
    md.push_str(&format!(
        "{} öğrenci: {} yükseldi, {} sabit, {} düştü. {} öğrenci ilgi bekliyor.\n\n",
        counts.total_students,
        counts.students_improved,
        counts.students_stable,
        counts.students_declined,
        counts.attention_needed
    ));
    if summary.all_students.is_empty() {
        return md;
    }
    if !summary.most_improved.is_empty() {
        md.push_str("### En Çok Yükselenler\n\n");
        md.push_str(&progress_table(&summary.most_improved));
        md.push('\n');
    }
    if !summary.most_declined.is_empty() {
        md.push_str("### En Çok Düşenler\n\n");
        md.push_str(&progress_table(&summary.most_declined));
        md.push('\n');
    }
    md.push_str("### Tüm Öğrenciler\n\n");
    md.push_str(&progress_table(&summary.all_students));
    md
}

pub fn topics(report: &TopicProgressReport) -> String {
    let mut md = format!("## Konu Takibi ({})\n\n", report.student_id);
    if report.empty {
        md.push_str("_Konu listesi boş._\n");
        return md;
    }
    md.push_str(&format!(
        "{} / {} konu tamamlandı (**{:.0}%**), {} konu devam ediyor.\n\n",
        report.counts.completed,
        report.counts.total,
        report.completion_rate,
        report.counts.in_progress
    ));
    let rows: Vec<Vec<String>> = report
        .lessons
        .iter()
        .map(|l| {
            vec![
                cell(&l.lesson),
                format!("{}/{}", l.counts.completed, l.counts.total),
                l.counts.in_progress.to_string(),
                format!("{:.0}%", l.completion_rate),
                l.next_topic.as_deref().map(cell).unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    md.push_str(&table(
        &["Ders", "Tamamlanan", "Devam", "İlerleme", "Sıradaki Konu"],
        &rows,
    ));
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn topic_progress_table() {
        let md = topics(&fixtures::topics());
        assert!(md.contains("2 / 4 konu tamamlandı (**50%**)"));
        assert!(md.contains("| TYT - Matematik | 1/2 | 1 | 50% | Türev |"));
        assert!(md.contains("| TYT - Türkçe | 1/2 | 0 | 50% | Paragraf |"));

        let empty = topics(&fixtures::no_topics());
        assert!(empty.contains("Konu listesi boş"));
    }

    #[test]
    fn table_shape() {
        let md = table(&["A", "B"], &[vec!["1".into(), "2".into()]]);
        assert_eq!(md, "| A | B |\n|---|---|\n| 1 | 2 |\n");
    }

    #[test]
    fn pipes_in_names_are_escaped() {
        assert_eq!(cell("Tarih|Coğrafya"), "Tarih\\|Coğrafya");
    }

    #[test]
    fn weekly_markdown() {
        let md = weekly(&fixtures::weekly());
        assert!(md.starts_with("## Haftalık Rapor (11.03.2024 - 17.03.2024)"));
        assert!(md.contains("Trend: **Yükseliş**"));
        assert!(md.contains("| Matematik |"));
    }

    #[test]
    fn empty_weekly_markdown() {
        assert!(weekly(&fixtures::empty_weekly()).contains("_Bu hafta çözülmüş soru yok._"));
    }

    #[test]
    fn coach_markdown_counts() {
        let md = coach(&fixtures::coach());
        assert!(md.contains("2 öğrenci: 1 yükseldi, 0 sabit, 1 düştü."));
        assert!(md.contains(":warning:"));
    }
}
