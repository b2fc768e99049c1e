//! JSON output of the rendered page.
//!
//! One file per topic, overwritten on every render, so the directory always
//! holds the latest page for each topic that has been viewed.

use crate::models::Page;
use crate::utils::ensure_writable_dir;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Write `page` to `{json_output_dir}/{topic}.json` and return the path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, topic = %page.topic))]
pub async fn write_page(page: &Page, json_output_dir: &str) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(page)?;
    ensure_writable_dir(json_output_dir).await?;

    let path = format!(
        "{}/{}.json",
        json_output_dir.trim_end_matches('/'),
        page.topic.label().to_lowercase()
    );
    fs::write(&path, json).await?;
    info!(path = %path, articles = page.articles.len(), "Wrote JSON page");
    Ok(path)
}
