//! Article summarization with a per-input cache and sentinel fallbacks.

use crate::api::TextGenerator;
use crate::cache::TtlCache;
use crate::models::Notice;
use crate::utils::truncate_for_log;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Returned when an article has no text to summarize.
pub const NO_CONTENT_SUMMARY: &str = "No content available to summarize.";

/// Returned when the model call fails.
pub const API_ERROR_SUMMARY: &str = "Summary not available due to an API error.";

/// Build the instruction prompt for one article.
pub fn build_prompt(text: &str, url: &str) -> String {
    format!(
        "You are a professional content writer. Summarize this article in 2-3 sentences:\n\n{text}\n\nURL: {url}"
    )
}

/// A summary plus the notice to show the reader, if the model call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summarized {
    pub text: String,
    pub notice: Option<Notice>,
}

impl Summarized {
    fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), notice: None }
    }
}

pub struct Summarizer<G> {
    generator: G,
    ttl: Duration,
    cache: TtlCache<(String, String), String>,
}

impl<G: TextGenerator> Summarizer<G> {
    pub fn new(generator: G, ttl: Duration) -> Self {
        Self {
            generator,
            ttl,
            cache: TtlCache::new("summary"),
        }
    }

    /// Summarize `text`, which came from the article at `url`.
    ///
    /// Empty or absent text short-circuits to [`NO_CONTENT_SUMMARY`] without a
    /// model call. A failing model call yields [`API_ERROR_SUMMARY`] and an
    /// error notice; it is not cached, so the next render tries again.
    #[instrument(level = "info", skip(self, text))]
    pub async fn summarize(&self, text: Option<&str>, url: &str) -> Summarized {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            debug!("No content to summarize");
            return Summarized::ok(NO_CONTENT_SUMMARY);
        };

        let key = (text.to_string(), url.to_string());
        let result = self
            .cache
            .get_or_compute(key, self.ttl, || async {
                self.generator.generate(&build_prompt(text, url)).await
            })
            .await;

        match result {
            Ok(summary) => {
                debug!(summary = %truncate_for_log(&summary, 120), "Summarized article");
                Summarized::ok(summary)
            }
            Err(e) => {
                error!(error = %e, "Summarization failed");
                Summarized {
                    text: API_ERROR_SUMMARY.to_string(),
                    notice: Some(Notice::error(format!("Gemini API error: {e}"))),
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::GenerateError;
    use crate::models::NoticeLevel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const DAY: Duration = Duration::from_secs(86_400);

    /// Counts calls and echoes a canned summary, or fails every call.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeGenerator {
        pub calls: Arc<AtomicUsize>,
        pub fail: bool,
    }

    impl FakeGenerator {
        pub fn failing() -> Self {
            Self { fail: true, ..Self::default() }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GenerateError::Api("quota exceeded".to_string()));
            }
            let url = prompt.rsplit("URL: ").next().unwrap_or_default();
            Ok(format!("Summary of {url}"))
        }
    }

    #[test]
    fn test_prompt_embeds_text_and_url() {
        let prompt = build_prompt("Body text", "https://example.com/a");
        assert!(prompt.starts_with("You are a professional content writer."));
        assert!(prompt.contains("\n\nBody text\n\n"));
        assert!(prompt.ends_with("URL: https://example.com/a"));
    }

    #[tokio::test]
    async fn test_empty_input_skips_model() {
        let generator = FakeGenerator::default();
        let summarizer = Summarizer::new(generator.clone(), DAY);

        assert_eq!(summarizer.summarize(None, "https://e/1").await.text, NO_CONTENT_SUMMARY);
        assert_eq!(summarizer.summarize(Some(""), "https://e/1").await.text, NO_CONTENT_SUMMARY);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_identical_input_calls_model_once() {
        let generator = FakeGenerator::default();
        let summarizer = Summarizer::new(generator.clone(), DAY);

        let first = summarizer.summarize(Some("text"), "https://e/1").await;
        let second = summarizer.summarize(Some("text"), "https://e/1").await;
        assert_eq!(first, second);
        assert_eq!(first.text, "Summary of https://e/1");
        assert_eq!(generator.call_count(), 1);

        // Same text under a different url is a different key
        summarizer.summarize(Some("text"), "https://e/2").await;
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_recomputed_after_ttl() {
        let generator = FakeGenerator::default();
        let summarizer = Summarizer::new(generator.clone(), DAY);

        summarizer.summarize(Some("text"), "https://e/1").await;
        tokio::time::advance(DAY).await;
        summarizer.summarize(Some("text"), "https://e/1").await;
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_model_error_degrades_to_sentinel() {
        let generator = FakeGenerator::failing();
        let summarizer = Summarizer::new(generator.clone(), DAY);

        let out = summarizer.summarize(Some("text"), "https://e/1").await;
        assert_eq!(out.text, API_ERROR_SUMMARY);
        let notice = out.notice.expect("error notice");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("quota exceeded"));

        // Failures are not cached
        summarizer.summarize(Some("text"), "https://e/1").await;
        assert_eq!(generator.call_count(), 2);
    }
}
