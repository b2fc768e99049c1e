//! Markdown rendering of the dashboard page.

use crate::models::{DISPLAY_FORMAT, NoticeLevel, Page};
use crate::utils::slugify_title;
use std::fmt::Write;

const TAGLINE: &str = "Summarized AI news from trusted sources. Stay updated. Stay smart.";

fn notice_label(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "Info",
        NoticeLevel::Success => "Success",
        NoticeLevel::Warning => "Warning",
        NoticeLevel::Error => "Error",
    }
}

/// Render `page` as a Markdown document.
pub fn page_to_markdown(page: &Page) -> String {
    let mut md = String::new();

    writeln!(md, "# AI News Dashboard\n").unwrap();
    writeln!(md, "_{TAGLINE}_\n").unwrap();
    writeln!(
        md,
        "**Topic:** {} | generated {} UTC\n",
        page.topic,
        page.generated_at.format(DISPLAY_FORMAT)
    )
    .unwrap();

    for notice in &page.notices {
        writeln!(md, "> **{}:** {}\n", notice_label(notice.level), notice.message).unwrap();
    }

    if !page.articles.is_empty() {
        writeln!(md, "## Contents\n").unwrap();
        for rendered in &page.articles {
            let heading = format!("{}. {}", rendered.position, rendered.article.title);
            writeln!(md, "- [{}](#{})", heading, slugify_title(&heading)).unwrap();
        }
        writeln!(md).unwrap();
    }

    for rendered in &page.articles {
        let article = &rendered.article;
        writeln!(md, "## {}. {}\n", rendered.position, article.title).unwrap();
        writeln!(md, "**Source:** {}  ", article.source_name).unwrap();
        writeln!(md, "**Published:** {}  ", article.published_display()).unwrap();
        writeln!(md, "[Read full article]({})\n", article.url).unwrap();
        writeln!(md, "### Summary\n").unwrap();
        writeln!(md, "{}\n", rendered.summary).unwrap();
    }

    writeln!(md, "---\n").unwrap();
    writeln!(md, "Powered by Gemini & NewsAPI").unwrap();
    md
}
