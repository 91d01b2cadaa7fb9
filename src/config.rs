use std::env;
use std::str::FromStr;

/// Deployment environment, selects log format and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Thresholds and windows used by the confluence scorer.
///
/// Every number the engine compares against lives here so boundaries can be
/// exercised in tests without touching the scoring code.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Trend filter SMA period (default: 50).
    pub sma_period: usize,
    /// RSI period (default: 14).
    pub rsi_period: usize,
    /// Volume baseline period (default: 20).
    pub volume_period: usize,
    /// Neighbours on each side a pivot must beat (default: 2).
    pub pivot_window: usize,
    /// Scan only the last N points for pivots. `None` scans the whole series.
    pub pivot_lookback: Option<usize>,
    /// Cluster only the most recent N pivot lows. `None` uses all of them.
    pub support_pivot_count: Option<usize>,
    /// Momentum triggers when RSI is strictly below this (default: 40).
    pub rsi_threshold: f64,
    /// Volume spike triggers when the ratio is strictly above this (default: 1.3).
    pub volume_spike_ratio: f64,
    /// Relative support cluster tolerance (default: 0.015).
    pub cluster_tolerance: f64,
    /// Members a cluster needs to count as support (default: 2).
    pub min_cluster_members: usize,
    /// Empirical bonus needs a win rate strictly above this (default: 0.65).
    pub bonus_win_rate: f64,
    /// Empirical bonus needs at least this many trades (default: 10).
    pub bonus_min_trades: u32,
    /// STRONG needs a win rate of at least this (default: 0.65).
    pub strong_win_rate: f64,
    /// STRONG needs a score of at least this (default: 3).
    pub strong_min_score: u8,
    /// PARTIAL needs a win rate of at least this (default: 0.55).
    pub partial_win_rate: f64,
    /// PARTIAL score band lower bound, also the AVOID cutoff (default: 2).
    pub partial_min_score: u8,
    /// PARTIAL score band upper bound (default: 3).
    pub partial_max_score: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            sma_period: 50,
            rsi_period: 14,
            volume_period: 20,
            pivot_window: 2,
            pivot_lookback: None,
            support_pivot_count: None,
            rsi_threshold: 40.0,
            volume_spike_ratio: 1.3,
            cluster_tolerance: 0.015,
            min_cluster_members: 2,
            bonus_win_rate: 0.65,
            bonus_min_trades: 10,
            strong_win_rate: 0.65,
            strong_min_score: 3,
            partial_win_rate: 0.55,
            partial_min_score: 2,
            partial_max_score: 3,
        }
    }
}

impl ScoringConfig {
    /// Load scoring overrides from `SCORING_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sma_period: env_or("SCORING_SMA_PERIOD", defaults.sma_period),
            rsi_period: env_or("SCORING_RSI_PERIOD", defaults.rsi_period),
            volume_period: env_or("SCORING_VOLUME_PERIOD", defaults.volume_period),
            pivot_window: env_or("SCORING_PIVOT_WINDOW", defaults.pivot_window),
            pivot_lookback: env::var("SCORING_PIVOT_LOOKBACK")
                .ok()
                .and_then(|v| v.parse().ok()),
            support_pivot_count: env::var("SCORING_SUPPORT_PIVOTS")
                .ok()
                .and_then(|v| v.parse().ok()),
            rsi_threshold: env_or("SCORING_RSI_THRESHOLD", defaults.rsi_threshold),
            volume_spike_ratio: env_or("SCORING_VOLUME_SPIKE", defaults.volume_spike_ratio),
            cluster_tolerance: env_or("SCORING_CLUSTER_TOLERANCE", defaults.cluster_tolerance),
            min_cluster_members: env_or("SCORING_MIN_CLUSTER_MEMBERS", defaults.min_cluster_members),
            bonus_win_rate: env_or("SCORING_BONUS_WIN_RATE", defaults.bonus_win_rate),
            bonus_min_trades: env_or("SCORING_BONUS_MIN_TRADES", defaults.bonus_min_trades),
            strong_win_rate: env_or("SCORING_STRONG_WIN_RATE", defaults.strong_win_rate),
            strong_min_score: env_or("SCORING_STRONG_MIN_SCORE", defaults.strong_min_score),
            partial_win_rate: env_or("SCORING_PARTIAL_WIN_RATE", defaults.partial_win_rate),
            partial_min_score: env_or("SCORING_PARTIAL_MIN_SCORE", defaults.partial_min_score),
            partial_max_score: env_or("SCORING_PARTIAL_MAX_SCORE", defaults.partial_max_score),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Deployment environment.
    pub environment: Environment,
    /// Base URL of the historical price API.
    pub investing_base_url: String,
    /// Upstream request timeout (seconds).
    pub investing_timeout_secs: u64,
    /// Upstream attempts before giving up.
    pub investing_retries: u32,
    /// Report cache TTL (seconds).
    pub cache_ttl_secs: u64,
    /// Whether reports are cached at all.
    pub cache_enabled: bool,
    /// Maximum instrument codes in one bulk request.
    pub max_bulk_codes: usize,
    /// Maximum requested date range (days).
    pub max_date_range_days: i64,
    /// JSON file with per-code backtest summaries.
    pub backtest_file: Option<String>,
    /// Engine thresholds.
    pub scoring: ScoringConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT")
            .map(|v| Environment::from_str(&v))
            .unwrap_or_default();

        // Shorter cache while developing, none at all under test
        let default_ttl = match environment {
            Environment::Development => 60,
            _ => 300,
        };
        let default_cache = !matches!(environment, Environment::Testing);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8000),
            environment,
            investing_base_url: env::var("INVESTING_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.investing.com/api".to_string()),
            investing_timeout_secs: env_or("INVESTING_API_TIMEOUT", 15),
            investing_retries: env_or("INVESTING_API_RETRIES", 3),
            cache_ttl_secs: env_or("CACHE_TTL", default_ttl),
            cache_enabled: env::var("CACHE_ENABLED")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(default_cache),
            max_bulk_codes: env_or("MAX_BULK_STOCKS", 20),
            max_date_range_days: env_or("MAX_DATE_RANGE_DAYS", 365),
            backtest_file: env::var("BACKTEST_SUMMARY_FILE").ok(),
            scoring: ScoringConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
