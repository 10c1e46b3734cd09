pub mod id_field;

use std::time::Duration;

use clap::{arg, Parser};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dotenv::dotenv;

pub use id_field::IdField;

#[derive(Debug, Clone, Parser, Default)]
pub struct Config {
    /// Slug of the post to open
    slug: String,
    /// Base url of the content API
    #[arg(long, env = "STRAPI_URL", default_value = "http://localhost:1337")]
    api_url: String,
    /// Base url prepended to media paths [default: api url]
    #[arg(long, env = "STRAPI_MEDIA_URL")]
    media_url: Option<String>,
    /// API token sent as bearer authorization
    #[arg(long, env = "STRAPI_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Collection holding the posts
    #[arg(short, long, default_value = "blogs")]
    collection: String,
    /// Field used to address a post when saving
    #[arg(long, default_value = "id")]
    id_field: IdField,
    /// Highlighting theme for code blocks
    #[arg(long, default_value = "base16-ocean.dark")]
    theme: String,
    /// Retry transient request failures
    #[arg(long, default_value = "0")]
    retries: u32,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Disable colored output
    #[arg(long, name = "no-color")]
    no_color: bool,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Config {
    /// Parse the configuration from the environment and command line arguments
    pub fn parse() -> Self {
        dotenv().ok();
        <Self as Parser>::parse()
    }
    /// Create a logger with the configured verbosity level
    pub fn init_logger(&self) {
        env_logger::Builder::new()
            .filter_level(self.verbose.log_level_filter())
            .format_target(false)
            .init();
    }
    pub fn slug(&self) -> &str {
        &self.slug
    }
    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
    /// Media base, the api url unless overridden
    pub fn media_url(&self) -> &str {
        self.media_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or_else(|| self.api_url())
    }
    /// Get the authorization header value
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|token| {
            if token.starts_with("Bearer ") {
                token.clone()
            } else {
                format!("Bearer {}", token)
            }
        })
    }
    pub fn collection(&self) -> &str {
        &self.collection
    }
    pub const fn id_field(&self) -> IdField {
        self.id_field
    }
    pub fn theme(&self) -> &str {
        &self.theme
    }
    pub const fn retries(&self) -> u32 {
        self.retries
    }
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
    pub const fn color(&self) -> bool {
        !self.no_color
    }
}
