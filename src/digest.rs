//! Plain-text digest of the rendered articles.
//!
//! Each rendered article becomes one block:
//!
//! ```text
//! {title}
//! {summary}
//! {url}
//! ```
//!
//! followed by a trailing newline. The email body is the first
//! [`DIGEST_LIMIT`] blocks joined by a blank line.

use crate::models::RenderedArticle;
use itertools::Itertools;

/// Maximum number of articles included in an emailed digest.
pub const DIGEST_LIMIT: usize = 5;

/// Subject line of the digest email.
pub const DIGEST_SUBJECT: &str = "Your AI News Digest";

/// Format one article as a digest block.
pub fn format_block(title: &str, summary: &str, url: &str) -> String {
    format!("{title}\n{summary}\n{url}\n")
}

/// All rendered articles as digest blocks, in render order.
pub fn blocks(articles: &[RenderedArticle]) -> Vec<String> {
    articles
        .iter()
        .map(|r| format_block(&r.article.title, &r.summary, &r.article.url))
        .collect()
}

/// The emailable body: the first [`DIGEST_LIMIT`] blocks separated by blank lines.
pub fn email_body(blocks: &[String]) -> String {
    blocks.iter().take(DIGEST_LIMIT).join("\n\n")
}
