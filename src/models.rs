//! Data models for fetched articles and the rendered dashboard page.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Topic`]: The fixed set of AI subtopics a reader can filter by
//! - [`Article`]: A news record as returned by the search API
//! - [`RenderedArticle`]: An article paired with its summary, ready for display
//! - [`Page`]: The render model returned by every dashboard handler
//! - [`Notice`]: Non-fatal messages surfaced to the reader
//!
//! The wire-format records ([`RawArticle`], [`RawSource`]) use camelCase field
//! names to match the news API's JSON, hence the `#[allow(non_snake_case)]`
//! attributes.

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout used by the news API for `publishedAt`.
pub const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Human-readable layout used when displaying a publication time.
pub const DISPLAY_FORMAT: &str = "%B %d, %Y %I:%M %p";

/// An AI subtopic used to narrow the news search.
///
/// Each topic maps onto a query-string fragment that is appended to the base
/// query with `AND`. [`Topic::All`] has an empty fragment and leaves the base
/// query untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    All,
    #[value(name = "nlp")]
    Nlp,
    Robotics,
    Ethics,
    Healthcare,
    Finance,
}

impl Topic {
    /// Every topic, in the order they are offered to the reader.
    pub const ALL: [Topic; 6] = [
        Topic::All,
        Topic::Nlp,
        Topic::Robotics,
        Topic::Ethics,
        Topic::Healthcare,
        Topic::Finance,
    ];

    /// Display label for the topic selector.
    pub fn label(self) -> &'static str {
        match self {
            Topic::All => "All",
            Topic::Nlp => "NLP",
            Topic::Robotics => "Robotics",
            Topic::Ethics => "Ethics",
            Topic::Healthcare => "Healthcare",
            Topic::Finance => "Finance",
        }
    }

    /// Query fragment appended to the base search query.
    pub fn query_fragment(self) -> &'static str {
        match self {
            Topic::All => "",
            Topic::Nlp => "natural language processing",
            Topic::Robotics => "robotics",
            Topic::Ethics => "ai ethics",
            Topic::Healthcare => "ai healthcare",
            Topic::Finance => "ai finance",
        }
    }

    /// Parse a topic from its label, ignoring case.
    pub fn parse(input: &str) -> Option<Topic> {
        <Topic as ValueEnum>::from_str(input.trim(), true).ok()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Top-level body of a news search response.
///
/// A body without an `articles` key deserializes to an empty list; error
/// payloads carry `status: "error"` plus `code` and `message`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

/// A single article record exactly as the news API returns it.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub publishedAt: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// The `source` object nested inside a [`RawArticle`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// A fetched news article.
///
/// Articles are immutable once fetched. The url is the article's identity, but
/// duplicates are not removed: two records with the same url render twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub source_name: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub description: Option<String>,
    pub content: Option<String>,
}

impl Article {
    /// Text handed to the summarizer: the description, falling back to the
    /// content. Blank strings count as absent.
    pub fn summary_input(&self) -> Option<&str> {
        non_blank(self.description.as_deref()).or_else(|| non_blank(self.content.as_deref()))
    }

    /// Publication time formatted for display, e.g. `"May 06, 2025 02:30 PM"`.
    pub fn published_display(&self) -> String {
        self.published_at.format(DISPLAY_FORMAT).to_string()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

impl TryFrom<RawArticle> for Article {
    type Error = String;

    fn try_from(raw: RawArticle) -> Result<Self, Self::Error> {
        let url = raw
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| "article has no url".to_string())?;
        let published = raw
            .publishedAt
            .ok_or_else(|| format!("article {url} has no publishedAt"))?;
        let published_at = NaiveDateTime::parse_from_str(&published, PUBLISHED_AT_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("article {url} has unparsable publishedAt {published:?}: {e}"))?;

        Ok(Article {
            title: raw.title.unwrap_or_default(),
            source_name: raw.source.and_then(|s| s.name).unwrap_or_default(),
            published_at,
            url,
            description: raw.description,
            content: raw.content,
        })
    }
}

/// An article paired with the summary shown beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedArticle {
    /// 1-based position in the rendered list.
    pub position: usize,
    pub article: Article,
    pub summary: String,
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A non-fatal message surfaced to the reader alongside the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// The render model produced by one dashboard action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub topic: Topic,
    pub generated_at: DateTime<Utc>,
    pub articles: Vec<RenderedArticle>,
    pub notices: Vec<Notice>,
}
