//! Command-line interface definitions for the AI News Dashboard.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Secrets can be provided via command-line flags or environment variables
//! (a `.env` file in the working directory is loaded first).

use crate::config::Secrets;
use crate::models::Topic;
use clap::Parser;

/// Command-line arguments for the AI News Dashboard.
///
/// # Examples
///
/// ```sh
/// # Render the NLP page once
/// ai_news_dashboard --topic nlp
///
/// # Bypass the cache and email the top five summaries
/// ai_news_dashboard --topic robotics --refresh --email-to reader@example.com
///
/// # Keep the caches warm across several actions
/// ai_news_dashboard --interactive
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// AI subtopic to show
    #[arg(short, long, value_enum, default_value_t = Topic::All)]
    pub topic: Topic,

    /// Clear the news cache before fetching
    #[arg(short, long)]
    pub refresh: bool,

    /// Email the top five summaries to this address
    #[arg(short, long)]
    pub email_to: Option<String>,

    /// Also write the rendered page as JSON into this directory
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Optional path to a YAML file overriding endpoints, model and cache lifetimes
    #[arg(short, long)]
    pub config: Option<String>,

    /// Read actions from stdin instead of rendering once
    #[arg(short, long)]
    pub interactive: bool,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Address the digest is sent from (also the SMTP username)
    #[arg(long, env = "EMAIL_SENDER")]
    pub email_sender: Option<String>,

    /// SMTP password for the sender
    #[arg(long, env = "EMAIL_PASSWORD", hide_env_values = true)]
    pub email_password: Option<String>,
}

impl Cli {
    pub fn secrets(&self) -> Secrets {
        Secrets {
            news_api_key: self.news_api_key.clone(),
            gemini_api_key: self.gemini_api_key.clone(),
            email_sender: self.email_sender.clone(),
            email_password: self.email_password.clone(),
        }
    }
}

/// One action typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show(Topic),
    Refresh,
    Email(String),
    Topics,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  topic <name>   show a topic (all, nlp, robotics, ethics, healthcare, finance)
  refresh        clear the news cache and reload the current topic
  email <addr>   email the top five summaries of the current topic
  topics         list topics
  help           show this message
  quit           exit";

impl Command {
    /// Parse one input line. Blank input re-shows the current topic.
    pub fn parse(line: &str, current: Topic) -> Result<Command, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match word.to_lowercase().as_str() {
            "" => Ok(Command::Show(current)),
            "topic" | "t" => Topic::parse(rest)
                .map(Command::Show)
                .ok_or_else(|| format!("unknown topic {rest:?}; try `topics`")),
            "refresh" | "r" => Ok(Command::Refresh),
            "email" | "e" => Ok(Command::Email(rest.to_string())),
            "topics" => Ok(Command::Topics),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command {other:?}; try `help`")),
        }
    }
}
