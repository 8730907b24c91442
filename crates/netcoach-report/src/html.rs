//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use netcoach_core::aggregate::ExamSummary;
use netcoach_core::model::LessonStat;
use netcoach_core::report::{
    CoachWeeklySummary, DailyReport, MonthlyReport, StudentAnalysis, StudentProgress, WeeklyReport,
};
use netcoach_core::topics::TopicProgressReport;
use netcoach_core::trend::AnalysisThresholds;

/// Escape a string for safe HTML insertion.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Wrap a rendered body into a full page. `raw_json` goes into a collapsed
/// block at the bottom.
pub fn page(title: &str, body: &str, raw_json: &str) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"tr\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(title)));
    html.push_str(&format!(
        "<p class=\"meta\">Oluşturulma: {}</p>\n",
        chrono::Utc::now().format("%d.%m.%Y %H:%M UTC")
    ));
    html.push_str("</header>\n");

    html.push_str(body);

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Ham JSON</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&raw_json.replace('<', "&lt;").replace('>', "&gt;"));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn sortable_table(id: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = format!("<table class=\"data\" id=\"{id}\">\n<thead><tr>");
    for (i, h) in headers.iter().enumerate() {
        html.push_str(&format!(
            "<th onclick=\"sortTable('{id}', {i})\">{}</th>",
            html_escape(h)
        ));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{cell}</td>"));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table>\n");
    html
}

fn stat_cards(cards: &[(&str, String)]) -> String {
    let mut html = String::from("<div class=\"cards\">\n");
    for (label, value) in cards {
        html.push_str(&format!(
            "<div class=\"card\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>\n",
            html_escape(label),
            html_escape(value)
        ));
    }
    html.push_str("</div>\n");
    html
}

fn empty_state(message: &str) -> String {
    format!("<p class=\"empty\">{}</p>\n", html_escape(message))
}

/// CSS class matching the strong/weak lesson buckets.
fn accuracy_class(accuracy: f64, t: &AnalysisThresholds) -> &'static str {
    if accuracy >= t.strong_at_least {
        "pass"
    } else if accuracy < t.weak_below {
        "fail"
    } else {
        ""
    }
}

fn accuracy_span(accuracy: f64, t: &AnalysisThresholds) -> String {
    format!(
        "<span class=\"{}\">{:.1}%</span>",
        accuracy_class(accuracy, t),
        accuracy
    )
}

fn lesson_rows(stats: &[LessonStat], t: &AnalysisThresholds) -> Vec<Vec<String>> {
    stats
        .iter()
        .map(|s| {
            vec![
                html_escape(&s.lesson),
                s.total_solved.to_string(),
                s.total_correct.to_string(),
                s.total_wrong.to_string(),
                accuracy_span(s.accuracy_rate, t),
            ]
        })
        .collect()
}

fn lesson_section(heading: &str, id: &str, stats: &[LessonStat], t: &AnalysisThresholds) -> String {
    let mut html = format!("<h2>{}</h2>\n", html_escape(heading));
    if stats.is_empty() {
        html.push_str(&empty_state("Kayıt yok."));
        return html;
    }
    html.push_str(&sortable_table(
        id,
        &["Ders", "Çözülen", "Doğru", "Yanlış", "Başarı"],
        &lesson_rows(stats, t),
    ));
    html
}

/// Horizontal bars of accuracy percentages (0..=100).
fn accuracy_chart(bars: &[(String, f64)], t: &AnalysisThresholds) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 200;

    let total_height = bars.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, accuracy)) in bars.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (accuracy.clamp(0.0, 100.0) / 100.0 * max_width as f64) as usize;

        let color = match accuracy_class(*accuracy, t) {
            "pass" => "#22c55e",
            "fail" => "#ef4444",
            _ => "#eab308",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            accuracy
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn lesson_chart(stats: &[LessonStat], t: &AnalysisThresholds) -> String {
    if stats.is_empty() {
        return String::new();
    }
    let bars: Vec<(String, f64)> = stats
        .iter()
        .map(|s| (s.lesson.clone(), s.accuracy_rate))
        .collect();
    accuracy_chart(&bars, t)
}

pub fn exam_body(summary: &ExamSummary, t: &AnalysisThresholds) -> String {
    let mut html = String::from("<section class=\"dashboard\">\n");
    html.push_str(&stat_cards(&[
        ("Sınav", summary.exam_name.clone().unwrap_or_else(|| summary.exam_id.clone())),
        ("Tür", summary.exam_type.to_string()),
        ("Tarih", summary.exam_date.format("%d.%m.%Y").to_string()),
        ("Toplam Net", format!("{:.2}", summary.total_net)),
    ]));

    let rows: Vec<Vec<String>> = summary
        .subject_breakdown
        .iter()
        .map(|s| {
            vec![
                html_escape(&s.subject_name),
                s.correct.to_string(),
                s.wrong.to_string(),
                s.blank.to_string(),
                format!("{:.2}", s.net),
                accuracy_span(s.accuracy, t),
            ]
        })
        .collect();
    html.push_str("<h2>Ders Bazlı Sonuçlar</h2>\n");
    html.push_str(&sortable_table(
        "subjects",
        &["Ders", "Doğru", "Yanlış", "Boş", "Net", "Başarı"],
        &rows,
    ));
    let bars: Vec<(String, f64)> = summary
        .subject_breakdown
        .iter()
        .map(|s| (s.subject_name.clone(), s.accuracy))
        .collect();
    if !bars.is_empty() {
        html.push_str(&accuracy_chart(&bars, t));
    }
    html.push_str("</section>\n");
    html
}

pub fn analysis_body(analysis: &StudentAnalysis, t: &AnalysisThresholds) -> String {
    let mut html = String::from("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<p class=\"meta\">Dönem: {}</p>\n",
        html_escape(&analysis.period.label())
    ));
    if analysis.empty {
        html.push_str(&empty_state("Bu dönemde çözülmüş soru yok."));
        html.push_str("</section>\n");
        return html;
    }
    let overall = &analysis.overall_stats;
    html.push_str(&stat_cards(&[
        ("Çözülen", overall.total_solved.to_string()),
        ("Doğru", overall.total_correct.to_string()),
        ("Yanlış", overall.total_wrong.to_string()),
        ("Başarı", format!("{:.1}%", overall.accuracy_rate)),
        ("Ders", overall.lesson_count.to_string()),
    ]));
    html.push_str(&lesson_chart(&analysis.lesson_stats, t));
    html.push_str("</section>\n");

    html.push_str(&lesson_section("Zayıf Dersler", "weak", &analysis.weak_lessons, t));
    html.push_str(&lesson_section("Güçlü Dersler", "strong", &analysis.strong_lessons, t));
    html.push_str(&lesson_section("Tüm Dersler", "lessons", &analysis.lesson_stats, t));
    html
}

pub fn daily_body(report: &DailyReport, t: &AnalysisThresholds) -> String {
    let mut html = String::from("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<p class=\"meta\">Tarih: {}</p>\n",
        report.date.format("%d.%m.%Y")
    ));
    html.push_str(&stat_cards(&[
        ("Çözülen", report.total_questions_solved.to_string()),
        ("Doğru", report.total_correct.to_string()),
        ("Başarı", format!("{:.1}%", report.accuracy_rate)),
        ("Süre (dk)", report.study_minutes.to_string()),
        ("Tamamlanan Görev", report.completed_tasks.to_string()),
        ("Bekleyen Görev", report.pending_tasks.to_string()),
    ]));
    if report.empty {
        html.push_str(&empty_state("Bugün için kayıt yok."));
    }
    html.push_str("</section>\n");
    if !report.empty {
        html.push_str(&lesson_section("Dersler", "lessons", &report.lesson_breakdown, t));
    }
    html
}

pub fn weekly_body(report: &WeeklyReport, t: &AnalysisThresholds) -> String {
    let summary = &report.summary;
    let mut html = String::from("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<p class=\"meta\">Dönem: {}</p>\n",
        html_escape(&report.period.label())
    ));
    html.push_str(&stat_cards(&[
        ("Çözülen", summary.total_solved.to_string()),
        ("Başarı", format!("{:.1}%", summary.accuracy_rate)),
        ("Süre (dk)", summary.study_minutes.to_string()),
        ("Trend", summary.trend.to_string()),
        (
            "En Çok Çalışılan",
            summary.most_studied_lesson.clone().unwrap_or_else(|| "-".into()),
        ),
    ]));
    if report.empty {
        html.push_str(&empty_state("Bu hafta çözülmüş soru yok."));
        html.push_str("</section>\n");
        return html;
    }
    html.push_str("</section>\n");

    let rows: Vec<Vec<String>> = report
        .daily_breakdown
        .iter()
        .map(|d| {
            vec![
                d.date.format("%d.%m.%Y").to_string(),
                d.solved.to_string(),
                d.correct.to_string(),
                d.minutes.to_string(),
                accuracy_span(d.accuracy, t),
            ]
        })
        .collect();
    html.push_str("<h2>Günlük Dağılım</h2>\n");
    html.push_str(&sortable_table(
        "days",
        &["Gün", "Çözülen", "Doğru", "Süre (dk)", "Başarı"],
        &rows,
    ));
    html.push_str(&lesson_section("Dersler", "lessons", &report.lesson_breakdown, t));
    html.push_str(&lesson_chart(&report.lesson_breakdown, t));
    html
}

pub fn monthly_body(report: &MonthlyReport, t: &AnalysisThresholds) -> String {
    let summary = &report.summary;
    let mut html = String::from("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<p class=\"meta\">Dönem: {}</p>\n",
        html_escape(&report.period.label())
    ));
    html.push_str(&stat_cards(&[
        ("Çözülen", summary.total_solved.to_string()),
        ("Başarı", format!("{:.1}%", summary.accuracy_rate)),
        ("Süre (dk)", summary.study_minutes.to_string()),
        ("Gelişim", format!("{:+.1}", summary.improvement_rate)),
    ]));
    if report.empty {
        html.push_str(&empty_state("Bu ay çözülmüş soru yok."));
        html.push_str("</section>\n");
        return html;
    }
    html.push_str("</section>\n");

    let rows: Vec<Vec<String>> = report
        .weekly_breakdown
        .iter()
        .map(|w| {
            vec![
                html_escape(&w.period),
                w.solved.to_string(),
                w.correct.to_string(),
                accuracy_span(w.accuracy, t),
            ]
        })
        .collect();
    html.push_str("<h2>Haftalık Dağılım</h2>\n");
    html.push_str(&sortable_table(
        "weeks",
        &["Hafta", "Çözülen", "Doğru", "Başarı"],
        &rows,
    ));
    html.push_str(&lesson_section("Dersler", "lessons", &report.lesson_breakdown, t));
    html
}

fn progress_rows(students: &[StudentProgress], t: &AnalysisThresholds) -> Vec<Vec<String>> {
    students
        .iter()
        .map(|p| {
            let name = if p.needs_attention {
                format!("{} <span class=\"fail\">!</span>", html_escape(&p.student_name))
            } else {
                html_escape(&p.student_name)
            };
            vec![
                name,
                p.questions_solved.to_string(),
                accuracy_span(p.accuracy_rate, t),
                format!("{:.1}%", p.previous_accuracy_rate),
                format!("{:+.1}", p.change),
                p.status.to_string(),
            ]
        })
        .collect()
}

pub fn coach_body(summary: &CoachWeeklySummary, t: &AnalysisThresholds) -> String {
    const HEADERS: [&str; 6] = ["Öğrenci", "Çözülen", "Başarı", "Önceki", "Değişim", "Durum"];

    let counts = &summary.summary;
    let mut html = String::from("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<p class=\"meta\">Dönem: {}</p>\n",
        html_escape(&summary.period.label())
    ));
    html.push_str(&stat_cards(&[
        ("Öğrenci", counts.total_students.to_string()),
        ("Yükselen", counts.students_improved.to_string()),
        ("Sabit", counts.students_stable.to_string()),
        ("Düşen", counts.students_declined.to_string()),
        ("İlgi Gereken", counts.attention_needed.to_string()),
    ]));
    html.push_str("</section>\n");

    if summary.all_students.is_empty() {
        html.push_str(&empty_state("Kayıtlı öğrenci yok."));
        return html;
    }
    if !summary.most_improved.is_empty() {
        html.push_str("<h2>En Çok Yükselenler</h2>\n");
        html.push_str(&sortable_table(
            "improved",
            &HEADERS,
            &progress_rows(&summary.most_improved, t),
        ));
    }
    if !summary.most_declined.is_empty() {
        html.push_str("<h2>En Çok Düşenler</h2>\n");
        html.push_str(&sortable_table(
            "declined",
            &HEADERS,
            &progress_rows(&summary.most_declined, t),
        ));
    }
    html.push_str("<h2>Tüm Öğrenciler</h2>\n");
    html.push_str(&sortable_table(
        "students",
        &HEADERS,
        &progress_rows(&summary.all_students, t),
    ));
    html
}

pub fn topics_body(report: &TopicProgressReport) -> String {
    let mut html = String::from("<section class=\"dashboard\">\n");
    if report.empty {
        html.push_str(&empty_state("Konu listesi boş."));
        html.push_str("</section>\n");
        return html;
    }
    html.push_str(&stat_cards(&[
        ("Konu", report.counts.total.to_string()),
        ("Tamamlanan", report.counts.completed.to_string()),
        ("Devam Eden", report.counts.in_progress.to_string()),
        ("İlerleme", format!("{:.0}%", report.completion_rate)),
    ]));
    html.push_str("</section>\n");

    let rows: Vec<Vec<String>> = report
        .lessons
        .iter()
        .map(|l| {
            vec![
                html_escape(&l.lesson),
                format!("{}/{}", l.counts.completed, l.counts.total),
                l.counts.in_progress.to_string(),
                format!(
                    "<progress max=\"100\" value=\"{:.0}\"></progress> {:.0}%",
                    l.completion_rate, l.completion_rate
                ),
                html_escape(l.next_topic.as_deref().unwrap_or("-")),
            ]
        })
        .collect();
    html.push_str("<h2>Dersler</h2>\n");
    html.push_str(&sortable_table(
        "lessons",
        &["Ders", "Tamamlanan", "Devam", "İlerleme", "Sıradaki Konu"],
        &rows,
    ));

    for lesson in &report.lessons {
        html.push_str(&format!(
            "<details><summary>{}</summary>\n<ul>\n",
            html_escape(&lesson.lesson)
        ));
        for topic in &lesson.topics {
            html.push_str(&format!(
                "<li>{} <em>{}</em></li>\n",
                html_escape(&topic.topic),
                html_escape(&topic.status.to_string())
            ));
        }
        html.push_str("</ul></details>\n");
    }
    html
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; margin: 1rem 0; }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 0.75rem 1.25rem; display: flex; flex-direction: column; }
.card .label { color: #6b7280; font-size: 0.85rem; }
.card .value { font-size: 1.4rem; font-weight: bold; }
.empty { font-style: italic; color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    if (!isNaN(na) && !isNaN(nb)) return asc ? na - nb : nb - na;
    return asc ? va.localeCompare(vb, 'tr') : vb.localeCompare(va, 'tr');
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
