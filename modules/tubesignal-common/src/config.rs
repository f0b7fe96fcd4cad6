use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Video platform data API
    pub youtube_api_key: String,

    // Ad-network keyword planner. Several keys form a rotation ring;
    // quota exhaustion on one rotates to the next.
    pub google_ads_api_keys: Vec<String>,
    pub google_ads_customer_id: String,

    // Serper (google video search)
    pub serper_api_key: String,

    // Self-hosted trends scraper sidecar. Optional: without it the trends
    // signal is absent and the demand classifier runs on neutral data.
    pub trends_service_url: Option<String>,

    // Durable actor state. Optional: without it the engine runs on the
    // in-memory store and durable slots do not survive restarts.
    pub database_url: Option<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Trending warm-up
    pub regions: Vec<String>,
    pub warmup_hour_utc: u32,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        let regions: Vec<String> = env::var("REGIONS")
            .unwrap_or_else(|_| "US".to_string())
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        let google_ads_api_keys: Vec<String> = env::var("GOOGLE_ADS_API_KEYS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            youtube_api_key: required_env("YOUTUBE_API_KEY"),
            google_ads_api_keys,
            google_ads_customer_id: env::var("GOOGLE_ADS_CUSTOMER_ID").unwrap_or_default(),
            serper_api_key: env::var("SERPER_API_KEY").unwrap_or_default(),
            trends_service_url: env::var("TRENDS_SERVICE_URL").ok(),
            database_url: env::var("DATABASE_URL").ok(),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            regions,
            warmup_hour_utc: env::var("WARMUP_HOUR_UTC")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6),
        }
    }

    /// Log the presence of each sensitive env var without exposing values.
    pub fn log_redacted(&self) {
        let vars = [
            ("YOUTUBE_API_KEY", self.youtube_api_key.len()),
            ("SERPER_API_KEY", self.serper_api_key.len()),
        ];
        for (name, len) in vars {
            if len == 0 {
                tracing::info!("{name} = (empty)");
            } else {
                tracing::info!("{name} = ({len} chars)");
            }
        }
        tracing::info!(
            keys = self.google_ads_api_keys.len(),
            "GOOGLE_ADS_API_KEYS ring"
        );
        tracing::info!(regions = ?self.regions, warmup_hour_utc = self.warmup_hour_utc, "Warm-up schedule");
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
