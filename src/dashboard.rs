//! Request/response handlers behind every dashboard action.
//!
//! Each reader action maps onto exactly one handler:
//!
//! | Action | Handler |
//! |--------|---------|
//! | Select a topic | [`Dashboard::show`] |
//! | Click refresh | [`Dashboard::refresh`] |
//! | Submit the email form | [`Dashboard::submit_email`] |
//!
//! Handlers run the whole pipeline (fetch, then summarize each article in
//! order) and return a [`Page`]. Nothing here is fatal: fetch failures become
//! an empty page with a warning, summarization failures become sentinel text,
//! and email failures become an error notice.

use crate::api::{GeminiClient, TextGenerator};
use crate::config::{DashboardConfig, Secrets};
use crate::digest::{self, DIGEST_SUBJECT};
use crate::models::{Notice, Page, RenderedArticle, Topic};
use crate::news::NewsFetcher;
use crate::notifier::{MailTransport, Notifier, SmtpMailer};
use crate::summarizer::Summarizer;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::error::Error;
use tracing::{info, instrument, warn};

pub const NO_NEWS_NOTICE: &str = "No news found or API limit exceeded.";
pub const REFRESHED_NOTICE: &str = "News cache cleared; showing the latest headlines.";
pub const EMAIL_SENT_NOTICE: &str = "Email sent successfully!";
pub const EMAIL_FAILED_NOTICE: &str = "Failed to send email. Check your credentials or try again.";

/// What happened to an email submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailOutcome {
    /// No recipient was entered, so nothing was sent.
    Skipped,
    Sent,
    Failed,
}

pub struct Dashboard<G, M> {
    fetcher: NewsFetcher,
    summarizer: Summarizer<G>,
    notifier: Notifier<M>,
    config_warnings: Vec<String>,
}

impl Dashboard<GeminiClient, SmtpMailer> {
    /// Wire up the production clients from configuration.
    pub fn from_config(config: &DashboardConfig, secrets: Secrets) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(concat!("ai_news_dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let config_warnings = secrets.warnings();
        for warning in &config_warnings {
            warn!("{warning}");
        }

        let fetcher = NewsFetcher::new(
            client.clone(),
            &config.news_base_url,
            secrets.news_api_key,
            config.page_size,
            config.news_ttl(),
        )?;
        let gemini = GeminiClient::new(client, &config.gemini_base_url, &config.gemini_model, secrets.gemini_api_key)?;
        let mailer = SmtpMailer::new(
            config.smtp_host.clone(),
            config.smtp_port,
            secrets.email_sender.clone(),
            secrets.email_password,
        );

        Ok(Self::new(
            fetcher,
            Summarizer::new(gemini, config.summary_ttl()),
            Notifier::new(mailer, secrets.email_sender),
            config_warnings,
        ))
    }
}

impl<G: TextGenerator, M: MailTransport> Dashboard<G, M> {
    pub fn new(
        fetcher: NewsFetcher,
        summarizer: Summarizer<G>,
        notifier: Notifier<M>,
        config_warnings: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            notifier,
            config_warnings,
        }
    }

    /// Render the page for `topic`.
    #[instrument(level = "info", skip(self), fields(%topic))]
    pub async fn show(&self, topic: Topic) -> Page {
        let mut notices: Vec<Notice> = self.config_warnings.iter().map(Notice::warning).collect();

        let articles = match self.fetcher.fetch(topic).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(error = %e, "News fetch failed; rendering as no results");
                Vec::new()
            }
        };
        if articles.is_empty() {
            notices.push(Notice::warning(NO_NEWS_NOTICE));
        }

        let summarizer = &self.summarizer;
        let summarized: Vec<_> = stream::iter(articles)
            .then(move |article| async move {
                let summary = summarizer.summarize(article.summary_input(), &article.url).await;
                (article, summary)
            })
            .collect()
            .await;

        let mut rendered = Vec::with_capacity(summarized.len());
        for (i, (article, summary)) in summarized.into_iter().enumerate() {
            notices.extend(summary.notice);
            rendered.push(RenderedArticle {
                position: i + 1,
                article,
                summary: summary.text,
            });
        }
        info!(articles = rendered.len(), notices = notices.len(), "Rendered page");

        Page {
            topic,
            generated_at: Utc::now(),
            articles: rendered,
            notices,
        }
    }

    /// Drop all cached search results. Summaries stay cached.
    pub fn clear_news_cache(&self) {
        self.fetcher.clear_cache();
    }

    /// Drop all cached search results, then render `topic` from fresh data.
    #[instrument(level = "info", skip(self), fields(%topic))]
    pub async fn refresh(&self, topic: Topic) -> Page {
        self.clear_news_cache();
        let mut page = self.show(topic).await;
        page.notices.insert(0, Notice::info(REFRESHED_NOTICE));
        page
    }

    /// Render `topic` and email the top of its digest to `recipient`.
    ///
    /// An empty recipient renders the page but sends nothing.
    #[instrument(level = "info", skip(self), fields(%topic))]
    pub async fn submit_email(&self, topic: Topic, recipient: &str) -> (Page, EmailOutcome) {
        let mut page = self.show(topic).await;
        if recipient.is_empty() {
            return (page, EmailOutcome::Skipped);
        }

        let body = digest::email_body(&digest::blocks(&page.articles));
        let outcome = if self.notifier.send(recipient, DIGEST_SUBJECT, &body).await {
            page.notices.push(Notice::success(EMAIL_SENT_NOTICE));
            EmailOutcome::Sent
        } else {
            page.notices.push(Notice::error(EMAIL_FAILED_NOTICE));
            EmailOutcome::Failed
        };
        (page, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoticeLevel;
    use crate::notifier::tests::FakeTransport;
    use crate::summarizer::tests::FakeGenerator;
    use crate::summarizer::{API_ERROR_SUMMARY, NO_CONTENT_SUMMARY};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HOUR: Duration = Duration::from_secs(3600);
    const DAY: Duration = Duration::from_secs(86_400);

    fn dashboard(
        server: &MockServer,
        generator: FakeGenerator,
        transport: FakeTransport,
        warnings: Vec<String>,
    ) -> Dashboard<FakeGenerator, FakeTransport> {
        let fetcher = NewsFetcher::new(Client::new(), &server.uri(), Some("k".to_string()), 10, HOUR).unwrap();
        Dashboard::new(
            fetcher,
            Summarizer::new(generator, DAY),
            Notifier::new(transport, Some("bot@example.com".to_string())),
            warnings,
        )
    }

    async fn mount_two_articles(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param(
                "q",
                "artificial intelligence OR machine learning AND natural language processing",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "articles": [
                    {
                        "title": "Transformers learn to read",
                        "source": { "name": "Wire" },
                        "publishedAt": "2025-05-06T14:30:00Z",
                        "url": "https://e/1",
                        "description": "A new language model.",
                        "content": null
                    },
                    {
                        "title": "Untitled brief",
                        "source": { "name": "Blog" },
                        "publishedAt": "2025-05-05T09:00:00Z",
                        "url": "https://e/2",
                        "description": null,
                        "content": null
                    }
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_nlp_render_and_email_end_to_end() {
        let server = MockServer::start().await;
        mount_two_articles(&server).await;
        let generator = FakeGenerator::default();
        let transport = FakeTransport::accepting();
        let dashboard = dashboard(&server, generator.clone(), transport.clone(), Vec::new());

        let page = dashboard.show(Topic::Nlp).await;
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.articles[0].position, 1);
        assert_eq!(page.articles[0].summary, "Summary of https://e/1");
        assert_eq!(page.articles[1].summary, NO_CONTENT_SUMMARY);
        assert!(page.notices.is_empty());
        assert_eq!(generator.call_count(), 1);

        let (_, outcome) = dashboard.submit_email(Topic::Nlp, "reader@example.com").await;
        assert_eq!(outcome, EmailOutcome::Sent);
        // The re-render is served from both caches
        assert_eq!(generator.call_count(), 1);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Your AI News Digest");
        let blocks: Vec<&str> = sent[0].body.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            sent[0].body,
            "Transformers learn to read\nSummary of https://e/1\nhttps://e/1\n\n\n\
             Untitled brief\nNo content available to summarize.\nhttps://e/2\n"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_renders_no_news() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let dashboard = dashboard(&server, FakeGenerator::default(), FakeTransport::accepting(), Vec::new());

        let page = dashboard.show(Topic::All).await;
        assert!(page.articles.is_empty());
        assert_eq!(page.notices, vec![Notice::warning(NO_NEWS_NOTICE)]);
    }

    #[tokio::test]
    async fn test_summarization_failure_does_not_abort_batch() {
        let server = MockServer::start().await;
        mount_two_articles(&server).await;
        let dashboard = dashboard(&server, FakeGenerator::failing(), FakeTransport::accepting(), Vec::new());

        let page = dashboard.show(Topic::Nlp).await;
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.articles[0].summary, API_ERROR_SUMMARY);
        assert_eq!(page.articles[1].summary, NO_CONTENT_SUMMARY);
        assert_eq!(page.notices.len(), 1);
        assert_eq!(page.notices[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_config_warning_is_shown() {
        let server = MockServer::start().await;
        mount_two_articles(&server).await;
        let warning = "GEMINI_API_KEY not found. Summaries are disabled for this session.".to_string();
        let dashboard = dashboard(
            &server,
            FakeGenerator::default(),
            FakeTransport::accepting(),
            vec![warning.clone()],
        );

        let page = dashboard.show(Topic::Nlp).await;
        assert_eq!(page.notices[0], Notice::warning(warning));
        assert_eq!(page.articles.len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_refetches() {
        let server = MockServer::start().await;
        mount_two_articles(&server).await;
        let dashboard = dashboard(&server, FakeGenerator::default(), FakeTransport::accepting(), Vec::new());

        dashboard.show(Topic::Nlp).await;
        dashboard.show(Topic::Nlp).await;
        assert_eq!(server.received_requests().await.unwrap().len(), 1);

        let page = dashboard.refresh(Topic::Nlp).await;
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.notices, vec![Notice::info(REFRESHED_NOTICE)]);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_recipient_is_skipped() {
        let server = MockServer::start().await;
        mount_two_articles(&server).await;
        let transport = FakeTransport::accepting();
        let dashboard = dashboard(&server, FakeGenerator::default(), transport.clone(), Vec::new());

        let (page, outcome) = dashboard.submit_email(Topic::Nlp, "").await;
        assert_eq!(outcome, EmailOutcome::Skipped);
        assert_eq!(page.articles.len(), 2);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_adds_error_notice() {
        let server = MockServer::start().await;
        mount_two_articles(&server).await;
        let dashboard = dashboard(&server, FakeGenerator::default(), FakeTransport::rejecting(), Vec::new());

        let (page, outcome) = dashboard.submit_email(Topic::Nlp, "reader@example.com").await;
        assert_eq!(outcome, EmailOutcome::Failed);
        assert_eq!(page.notices.last(), Some(&Notice::error(EMAIL_FAILED_NOTICE)));
    }

    #[tokio::test]
    async fn test_digest_is_prefix_of_rendered_list() {
        let server = MockServer::start().await;
        let raw: Vec<_> = (1..=7)
            .map(|i| {
                json!({
                    "title": format!("T{i}"),
                    "source": { "name": "Wire" },
                    "publishedAt": format!("2025-05-{:02}T08:00:00Z", 20 - i),
                    "url": format!("https://e/{i}"),
                    "description": format!("D{i}")
                })
            })
            .collect();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "articles": raw })))
            .mount(&server)
            .await;
        let transport = FakeTransport::accepting();
        let dashboard = dashboard(&server, FakeGenerator::default(), transport.clone(), Vec::new());

        let (page, outcome) = dashboard.submit_email(Topic::All, "reader@example.com").await;
        assert_eq!(outcome, EmailOutcome::Sent);
        assert_eq!(page.articles.len(), 7);
        let expected = digest::blocks(&page.articles)[..5].join("\n\n");
        assert_eq!(transport.sent()[0].body, expected);
    }
}
