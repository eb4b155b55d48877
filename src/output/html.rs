// Topics-over-time HTML page: an inline SVG line chart plus a topic table.
//
// The page is self-contained (no scripts, no external assets) so it can be
// mailed around or dropped next to the coding worksheets.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::db::models::format_timestamp;
use crate::topics::over_time::TopicsOverTime;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 420.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 64.0;

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the full HTML page.
pub fn render_topics_over_time(tot: &TopicsOverTime, title: &str) -> String {
    let mut html = String::new();
    let title = escape_html(title);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n\
         body {{ font-family: sans-serif; margin: 2em; color: #222; }}\n\
         table {{ border-collapse: collapse; margin-top: 1.5em; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 4px 10px; text-align: left; }}\n\
         .swatch {{ display: inline-block; width: 12px; height: 12px; margin-right: 6px; }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n"
    );
    let _ = writeln!(
        html,
        "<p>{} tweets, {} without a topic, {} time bins.</p>",
        tot.documents,
        tot.outliers,
        tot.bins.len()
    );

    if tot.series.is_empty() {
        html.push_str("<p>No topics matched any tweet.</p>\n</body>\n</html>\n");
        return html;
    }

    html.push_str(&render_chart(tot));
    html.push_str(&render_table(tot));
    html.push_str("</body>\n</html>\n");
    html
}

fn render_chart(tot: &TopicsOverTime) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let max_count = tot
        .series
        .iter()
        .flat_map(|s| s.counts.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    let n_bins = tot.bins.len();

    let x_at = |i: usize| -> f64 {
        if n_bins <= 1 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + plot_w * i as f64 / (n_bins - 1) as f64
        }
    };
    let y_at = |count: usize| -> f64 { MARGIN_TOP + plot_h * (1.0 - count as f64 / max_count) };

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\" role=\"img\">"
    );

    // Axes
    let x_axis_y = MARGIN_TOP + plot_h;
    let _ = writeln!(
        svg,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{x_axis_y}\" x2=\"{}\" y2=\"{x_axis_y}\" stroke=\"#444\"/>",
        MARGIN_LEFT + plot_w
    );
    let _ = writeln!(
        svg,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" y2=\"{x_axis_y}\" stroke=\"#444\"/>"
    );
    let _ = writeln!(
        svg,
        "<text x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"end\">{}</text>",
        MARGIN_LEFT - 6.0,
        MARGIN_TOP + 4.0,
        max_count as usize
    );
    let _ = writeln!(
        svg,
        "<text x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"end\">0</text>",
        MARGIN_LEFT - 6.0,
        x_axis_y + 4.0
    );

    // Bin labels: first, last, and roughly every fourth in between
    let step = (n_bins / 4).max(1);
    for (i, bin) in tot.bins.iter().enumerate() {
        if i % step != 0 && i + 1 != n_bins {
            continue;
        }
        let _ = writeln!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">{}</text>",
            x_at(i),
            x_axis_y + 18.0,
            bin.start.format("%Y-%m-%d")
        );
    }

    for (k, series) in tot.series.iter().enumerate() {
        let color = PALETTE[k % PALETTE.len()];
        let points: Vec<String> = series
            .counts
            .iter()
            .enumerate()
            .map(|(i, &c)| format!("{:.1},{:.1}", x_at(i), y_at(c)))
            .collect();
        let _ = writeln!(
            svg,
            "<polyline fill=\"none\" stroke=\"{color}\" stroke-width=\"2\" points=\"{}\">\
             <title>{}</title></polyline>",
            points.join(" "),
            escape_html(&series.label)
        );
        for (i, &c) in series.counts.iter().enumerate() {
            let _ = writeln!(
                svg,
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{color}\">\
                 <title>{} ({}): {c}</title></circle>",
                x_at(i),
                y_at(c),
                escape_html(&series.label),
                tot.bins[i].start.format("%Y-%m-%d")
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn render_table(tot: &TopicsOverTime) -> String {
    let mut table = String::new();
    table.push_str(
        "<table>\n<thead><tr><th>Topic</th><th>Label</th><th>Keywords</th><th>Tweets</th></tr></thead>\n<tbody>\n",
    );
    for (k, series) in tot.series.iter().enumerate() {
        let color = PALETTE[k % PALETTE.len()];
        let _ = writeln!(
            table,
            "<tr><td><span class=\"swatch\" style=\"background:{color}\"></span>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td></tr>",
            series.topic_id,
            escape_html(&series.label),
            escape_html(&series.keywords.join(", ")),
            series.total()
        );
    }
    table.push_str("</tbody>\n</table>\n");

    if let (Some(first), Some(last)) = (tot.bins.first(), tot.bins.last()) {
        let _ = writeln!(
            table,
            "<p>Covering {} to {}.</p>",
            format_timestamp(&first.start),
            format_timestamp(&last.end)
        );
    }
    table
}

/// Render and write the page, creating parent directories as needed.
pub fn write_topics_html(path: &Path, tot: &TopicsOverTime, title: &str) -> Result<()> {
    super::files::ensure_parent_dir(path)?;
    std::fs::write(path, render_topics_over_time(tot, title))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::over_time::{TimeBin, TopicSeries};
    use chrono::NaiveDate;

    fn tot(series: Vec<TopicSeries>) -> TopicsOverTime {
        let start = NaiveDate::from_ymd_opt(2021, 4, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mid = start + chrono::Duration::days(38);
        let end = start + chrono::Duration::days(77);
        TopicsOverTime {
            bins: vec![
                TimeBin { start, end: mid },
                TimeBin {
                    start: mid,
                    end,
                },
            ],
            series,
            documents: 5,
            outliers: 1,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom & Jerry's\"</b>"),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_contains_series_and_escapes_labels() {
        let page = render_topics_over_time(
            &tot(vec![TopicSeries {
                topic_id: 0,
                label: "vaccine / <mandate>".to_string(),
                keywords: vec!["vaccine".to_string(), "mandate".to_string()],
                counts: vec![3, 1],
            }]),
            "Week 2 & 3",
        );
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Week 2 &amp; 3</title>"));
        assert!(page.contains("<polyline"));
        assert!(page.contains("vaccine / &lt;mandate&gt;"));
        assert!(!page.contains("<mandate>"));
        assert!(page.contains("2021-04-10"));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_render_without_series() {
        let page = render_topics_over_time(&tot(vec![]), "Empty");
        assert!(page.contains("No topics matched"));
        assert!(!page.contains("<svg"));
    }
}
