use serde::Deserialize;

/// Main configuration structure for Shelf-Harvest
///
/// Every section and key is optional; missing values take the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default, rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host every request is made against
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Search and harvest behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Maximum number of simultaneous page fetches
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Hard cap on candidates taken from the search results
    #[serde(default = "default_max_products")]
    pub max_products: usize,

    /// Maximum number of reviews fetched per product
    #[serde(default = "default_max_reviews")]
    pub max_reviews: u32,

    /// Highest search result page fetched
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,

    /// Reviews requested per reviews API call
    #[serde(default = "default_review_page_size")]
    pub review_page_size: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent_requests(),
            max_products: default_max_products(),
            max_reviews: default_max_reviews(),
            page_cap: default_page_cap(),
            review_page_size: default_review_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Adaptive request rate configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RateLimitConfig {
    /// Starting rate in requests per second
    #[serde(default = "default_initial_rate")]
    pub initial_rate: f64,

    /// Upper bound on the rate in requests per second
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,

    /// Lower bound of the random delay added to every request (milliseconds)
    #[serde(default = "default_min_jitter_ms")]
    pub min_jitter_ms: u64,

    /// Upper bound of the random delay added to every request (milliseconds)
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            initial_rate: default_initial_rate(),
            max_rate: default_max_rate(),
            min_jitter_ms: default_min_jitter_ms(),
            max_jitter_ms: default_max_jitter_ms(),
        }
    }
}

/// Connection-level retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Total attempts per request, including the first
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Backoff before the first retry (milliseconds); doubles every attempt
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Cap on a single backoff (seconds)
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    /// Upper bound of the random jitter added to each backoff (milliseconds)
    #[serde(default = "default_backoff_jitter_ms")]
    pub backoff_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
            backoff_jitter_ms: default_backoff_jitter_ms(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Folder holding one CSV file per collection
    #[serde(rename = "csv-dir", default = "default_csv_dir")]
    pub csv_dir: String,

    /// Folder holding one JSON file per collection
    #[serde(rename = "json-dir", default = "default_json_dir")]
    pub json_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_dir: default_csv_dir(),
            json_dir: default_json_dir(),
        }
    }
}

/// User agents rotated across requests
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_user_agents")]
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: default_user_agents(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.argos.co.uk".to_string()
}

fn default_max_concurrent_requests() -> usize {
    5
}

fn default_max_products() -> usize {
    150
}

fn default_max_reviews() -> u32 {
    400
}

fn default_page_cap() -> u32 {
    6
}

fn default_review_page_size() -> u32 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_initial_rate() -> f64 {
    1.0
}

fn default_max_rate() -> f64 {
    10.0
}

fn default_min_jitter_ms() -> u64 {
    300
}

fn default_max_jitter_ms() -> u64 {
    600
}

fn default_attempts() -> u32 {
    5
}

fn default_base_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_secs() -> u64 {
    60
}

fn default_backoff_jitter_ms() -> u64 {
    1000
}

fn default_csv_dir() -> String {
    "CsvFolder".to_string()
}

fn default_json_dir() -> String {
    "JsonFolder".to_string()
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:89.0) Gecko/20100101 Firefox/89.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
        "Mozilla/5.0 (iPad; CPU OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
        "Mozilla/5.0 (Android 11; Mobile; rv:68.0) Gecko/68.0 Firefox/89.0",
        "Mozilla/5.0 (Android 11; Mobile; LG-M255; rv:89.0) Gecko/89.0 Firefox/89.0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
