// ABOUTME: Configuration for the curio pipeline: HTTP Options, the fluent ClientBuilder and CacheOptions.
// ABOUTME: ClientBuilder produces a WikiClient; CacheOptions carries the parse and section-link TTLs.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::WikiClient;
use crate::error::Result;

/// Default MediaWiki action API endpoint.
pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Default User-Agent sent with every upstream request.
pub const DEFAULT_USER_AGENT: &str = "CurioGarden/1.0 (accessibility-first Wikipedia audio reader)";

/// Freshness window shared by both caches unless overridden.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration options for the HTTP content source.
#[derive(Debug, Clone)]
pub struct Options {
    pub api_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::blocking::Client>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: HashMap::new(),
            http_client: None,
        }
    }
}

/// Builder for constructing WikiClient instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Point the client at another action API endpoint.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.opts.api_url = api_url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Use a custom HTTP client. Timeout and User-Agent are then whatever
    /// that client was built with.
    pub fn http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Build the WikiClient with the configured options.
    pub fn build(self) -> Result<WikiClient> {
        WikiClient::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Freshness windows for the two caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    pub parse_ttl: Duration,
    pub links_ttl: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            parse_ttl: DEFAULT_CACHE_TTL,
            links_ttl: DEFAULT_CACHE_TTL,
        }
    }
}
