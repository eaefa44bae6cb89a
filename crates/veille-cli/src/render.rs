//! Terminal and markdown rendering of annotated articles.

use std::fmt::Write as _;

use chrono::Utc;
use veille_news::{AnnotatedArticle, SearchParams};

pub(crate) const EMPTY_NOTICE: &str = "no articles found";

const TITLE_WIDTH: usize = 48;
const SUMMARY_WIDTH: usize = 60;

/// Fixed-width table, one row per article. Long cells are cut to fit.
pub(crate) fn render_table(articles: &[AnnotatedArticle]) -> String {
    if articles.is_empty() {
        return format!("{EMPTY_NOTICE}\n");
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<18}{:<50}{:<11}{:<62}{:<16}URL",
        "DATE", "TITLE", "SENTIMENT", "SUMMARY", "SOURCE"
    );
    for article in articles {
        let _ = writeln!(
            out,
            "{:<18}{:<50}{:<11}{:<62}{:<16}{}",
            format_date(article),
            fit(&article.title, TITLE_WIDTH),
            article.sentiment_label,
            fit(&article.summary, SUMMARY_WIDTH),
            fit(&article.source_name, 14),
            article.url
        );
    }
    out
}

/// Markdown report with full summaries.
pub(crate) fn render_markdown(
    subject: &str,
    params: &SearchParams,
    articles: &[AnnotatedArticle],
) -> String {
    let mut out = String::new();
    let now = Utc::now().format("%Y-%m-%d %H:%M UTC");

    let _ = writeln!(out, "# Veille: {subject}");
    let _ = writeln!(out);
    let _ = writeln!(out, "**Generated**: {now}");
    let _ = writeln!(
        out,
        "**Keyword**: {}",
        params.keyword.as_deref().unwrap_or("(none)")
    );
    let _ = writeln!(out, "**Language**: {}", params.language);
    let _ = writeln!(out, "**Articles**: {}", articles.len());
    let _ = writeln!(out);

    if articles.is_empty() {
        let _ = writeln!(out, "_{EMPTY_NOTICE}_");
        return out;
    }

    let _ = writeln!(out, "| Date | Title | Sentiment | Summary | Source | Link |");
    let _ = writeln!(out, "|------|-------|-----------|---------|--------|------|");
    for article in articles {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            format_date(article),
            escape_cell(&article.title),
            article.sentiment_label,
            escape_cell(&article.summary),
            escape_cell(&article.source_name),
            article.url
        );
    }
    out
}

fn format_date(article: &AnnotatedArticle) -> String {
    article.date.map_or_else(
        || "-".to_string(),
        |d| d.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Cuts `s` to `width` characters, marking the cut with `…`.
fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}
