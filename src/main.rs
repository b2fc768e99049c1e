//! # AI News Dashboard
//!
//! Fetches AI-related headlines from NewsAPI, summarizes each article with
//! Gemini, renders the result as Markdown, and can email the top five
//! summaries to a reader.
//!
//! ## Usage
//!
//! ```sh
//! ai_news_dashboard --topic nlp
//! ai_news_dashboard --topic finance --email-to reader@example.com
//! ai_news_dashboard --interactive
//! ```
//!
//! ## Architecture
//!
//! Every reader action is an explicit handler call on [`dashboard::Dashboard`]:
//! 1. **Fetching**: One search request per topic, cached for an hour
//! 2. **Summarizing**: One model call per distinct article text, cached for a day
//! 3. **Rendering**: The page model is printed as Markdown (and optionally JSON)
//! 4. **Emailing**: The first five digest blocks go out over SMTP on request

use clap::Parser;
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cache;
mod cli;
mod config;
mod dashboard;
mod digest;
mod error;
mod models;
mod news;
mod notifier;
mod outputs;
mod summarizer;
mod utils;

use api::TextGenerator;
use cli::{Cli, Command, HELP};
use config::DashboardConfig;
use dashboard::{Dashboard, EmailOutcome};
use models::{Page, Topic};
use notifier::MailTransport;
use outputs::{json, markdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Missing .env is fine; real environment variables still apply
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ai_news_dashboard starting up");
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env file");
    }

    let args = Cli::parse();
    debug!(topic = %args.topic, refresh = args.refresh, interactive = args.interactive, "Parsed CLI arguments");

    if let Some(dir) = &args.json_output_dir {
        utils::ensure_writable_dir(dir).await?;
    }

    let config = DashboardConfig::load(args.config.as_deref()).await?;
    let dashboard = Dashboard::from_config(&config, args.secrets())?;

    if args.interactive {
        run_interactive(&dashboard, args.topic, args.json_output_dir.as_deref()).await?;
    } else {
        let page = match args.email_to.as_deref() {
            Some(recipient) => {
                if args.refresh {
                    dashboard.clear_news_cache();
                }
                let (page, outcome) = dashboard.submit_email(args.topic, recipient).await;
                info!(?outcome, "Email submission handled");
                page
            }
            None if args.refresh => dashboard.refresh(args.topic).await,
            None => dashboard.show(args.topic).await,
        };
        emit(&page, args.json_output_dir.as_deref()).await?;
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), millis = elapsed.subsec_millis(), "Execution complete");
    Ok(())
}

/// Print `page` as Markdown and, if configured, write it as JSON.
async fn emit(page: &Page, json_output_dir: Option<&str>) -> Result<(), Box<dyn Error>> {
    println!("{}", markdown::page_to_markdown(page));
    if let Some(dir) = json_output_dir {
        json::write_page(page, dir).await?;
    }
    Ok(())
}

/// Read commands from stdin until `quit` or end of input.
///
/// The dashboard, and with it both caches, lives for the whole session.
#[instrument(level = "info", skip_all, fields(%initial))]
async fn run_interactive<G, M>(
    dashboard: &Dashboard<G, M>,
    initial: Topic,
    json_output_dir: Option<&str>,
) -> Result<(), Box<dyn Error>>
where
    G: TextGenerator,
    M: MailTransport,
{
    let mut current = initial;
    emit(&dashboard.show(current).await, json_output_dir).await?;
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line, current) {
            Ok(command) => command,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };
        debug!(?command, "Handling command");

        match command {
            Command::Show(topic) => {
                current = topic;
                emit(&dashboard.show(current).await, json_output_dir).await?;
            }
            Command::Refresh => emit(&dashboard.refresh(current).await, json_output_dir).await?,
            Command::Email(recipient) => {
                let (page, outcome) = dashboard.submit_email(current, &recipient).await;
                if outcome == EmailOutcome::Skipped {
                    warn!("No recipient given; nothing sent");
                    eprintln!("usage: email <addr>");
                }
                emit(&page, json_output_dir).await?;
            }
            Command::Topics => {
                for topic in Topic::ALL {
                    eprintln!("  {}", topic.label());
                }
            }
            Command::Help => eprintln!("{HELP}"),
            Command::Quit => break,
        }
    }
    Ok(())
}
