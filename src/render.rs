//! Plain-text dashboard rendering
//!
//! Draws a [`DashboardReport`] as terminal text: a preview table, horizontal bar
//! charts for the grouped views, headline metrics, insights and the recommendation.

use crate::types::{DashboardReport, InsightValue, RecommendationTier};
use std::fmt::Write;

/// Width in characters of the longest bar
const BAR_WIDTH: usize = 40;

const BAR_CHAR: char = '#';

/// Render a report as a text dashboard
pub fn render_text(report: &DashboardReport) -> String {
    let mut out = String::new();

    heading(&mut out, "Digital Addiction Analytics Dashboard", '=');
    let _ = writeln!(
        out,
        "Records: {} loaded, {} rejected | Filter: {} ({}) -> {} matched",
        report.source.total_records,
        report.source.rejected_rows,
        report.filter.mode,
        if report.filter.categories.is_empty() {
            "none".to_string()
        } else {
            report.filter.categories.join(", ")
        },
        report.filter.matched_records,
    );

    if !report.preview.is_empty() {
        section(&mut out, "Dataset Preview");
        let _ = writeln!(
            out,
            "{:<10}  {:<16} {:<14} {:>8} {:>7} {:>6} {:>4} {:>8}  {}",
            "date", "app_name", "category", "minutes", "pickups", "notifs", "hour", "score", "level"
        );
        for row in &report.preview {
            let r = &row.record;
            let _ = writeln!(
                out,
                "{:<10}  {:<16} {:<14} {:>8.1} {:>7} {:>6} {:>4} {:>8.2}  {}",
                r.date.format("%Y-%m-%d"),
                truncate(&r.app_name, 16),
                truncate(&r.category, 14),
                r.usage_minutes,
                r.pickups,
                r.notifications,
                r.hour,
                row.addiction_score,
                row.addiction_level,
            );
        }
    }

    let aggregates = &report.aggregates;

    section(&mut out, "Total Usage by App (minutes)");
    bar_chart(
        &mut out,
        aggregates
            .usage_by_app
            .iter()
            .map(|a| (a.app_name.clone(), a.total_minutes)),
    );

    section(&mut out, "Addiction Level Distribution");
    bar_chart(
        &mut out,
        aggregates
            .level_distribution
            .iter()
            .map(|l| (l.level.to_string(), l.count as f64)),
    );

    section(&mut out, "Hourly Usage Pattern (avg minutes)");
    bar_chart(
        &mut out,
        aggregates
            .hourly_profile
            .iter()
            .map(|h| (format!("{:02}:00", h.hour), h.mean_minutes)),
    );

    let insights = &report.insights;
    section(&mut out, "Metrics");
    let _ = writeln!(out, "Total Screen Time (min): {}", insights.total_usage);
    let _ = writeln!(out, "Avg Addiction Score:     {:.2}", insights.avg_addiction_score);
    let _ = writeln!(out, "High Addiction Records:  {}", insights.high_addiction_count);

    section(&mut out, "Key Insights");
    let _ = writeln!(out, "- Highest usage app: {}", describe(&insights.top_app, |s| s.clone()));
    let _ = writeln!(
        out,
        "- Most addictive category: {}",
        describe(&insights.top_category, |s| s.clone())
    );
    let _ = writeln!(
        out,
        "- Peak engagement hour: {}",
        describe(&insights.peak_hour, |h| format!("{h:02}:00"))
    );

    section(&mut out, "Recommendations");
    let recommendation = &report.recommendation;
    let label = match recommendation.tier {
        RecommendationTier::High => "WARNING",
        RecommendationTier::Moderate => "INFO",
        RecommendationTier::Low => "OK",
    };
    let _ = writeln!(
        out,
        "[{label}] {} (avg score {:.2})",
        recommendation
            .message
            .as_deref()
            .unwrap_or("No warnings for the current selection."),
        recommendation.based_on_score,
    );

    out
}

fn heading(out: &mut String, title: &str, underline: char) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", underline.to_string().repeat(title.chars().count()));
}

fn section(out: &mut String, title: &str) {
    out.push('\n');
    heading(out, title, '-');
}

fn describe<T>(value: &InsightValue<T>, show: impl Fn(&T) -> String) -> String {
    match value {
        InsightValue::Available(v) => show(v),
        InsightValue::NoData => "no data".to_string(),
    }
}

/// Horizontal bars scaled so the largest value spans [`BAR_WIDTH`]
fn bar_chart(out: &mut String, rows: impl Iterator<Item = (String, f64)>) {
    let rows: Vec<(String, f64)> = rows.collect();
    if rows.is_empty() {
        let _ = writeln!(out, "(no data)");
        return;
    }

    let max = rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count().min(20))
        .max()
        .unwrap_or(0);

    for (label, value) in &rows {
        let len = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "{:<width$} | {} {}",
            truncate(label, 20),
            BAR_CHAR.to_string().repeat(len),
            format_value(*value),
            width = label_width,
        );
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('~');
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze_csv;
    use crate::filter::CategoryFilter;
    use crate::adapter::LoadPolicy;

    const CSV: &str = "date,app_name,category,usage_minutes,pickups,notifications,hour\n\
                       2024-01-15,Instagram,Social,400,30,12,21\n\
                       2024-01-15,Slack,Work,45,8,20,10\n\
                       2024-01-16,Instagram,Social,100,10,4,22\n";

    #[test]
    fn test_render_contains_sections() {
        let report = analyze_csv(CSV, &CategoryFilter::All, LoadPolicy::Abort, 5).unwrap();
        let text = render_text(&report);

        for section in [
            "Dataset Preview",
            "Total Usage by App",
            "Addiction Level Distribution",
            "Hourly Usage Pattern",
            "Metrics",
            "Key Insights",
            "Recommendations",
        ] {
            assert!(text.contains(section), "missing section {section}");
        }
        assert!(text.contains("Highest usage app: Instagram"));
        assert!(text.contains("Total Screen Time (min): 545"));
        assert!(text.contains("21:00"));
    }

    #[test]
    fn test_largest_bar_spans_full_width() {
        let report = analyze_csv(CSV, &CategoryFilter::All, LoadPolicy::Abort, 0).unwrap();
        let text = render_text(&report);
        let full_bar = "#".repeat(BAR_WIDTH);
        let instagram_line = text
            .lines()
            .find(|l| l.starts_with("Instagram") && l.contains('|'))
            .unwrap();
        assert!(instagram_line.contains(&full_bar));
        assert!(!text.contains("Dataset Preview"));
    }

    #[test]
    fn test_empty_selection_renders_no_data() {
        let filter = CategoryFilter::selected(Vec::<String>::new());
        let report = analyze_csv(CSV, &filter, LoadPolicy::Abort, 5).unwrap();
        let text = render_text(&report);

        assert!(text.contains("(no data)"));
        assert!(text.contains("Highest usage app: no data"));
        assert!(text.contains("Filter: selected (none) -> 0 matched"));
        assert!(text.contains("[OK]"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("averyverylongname", 6), "avery~");
    }
}
