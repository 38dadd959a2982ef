use dotenv::dotenv;
use std::env;

/// Messages fetched per page when loading older history.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// How often the expiry sweep scans the loaded view.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60_000;
/// How often per-message countdown labels refresh.
pub const DEFAULT_COUNTDOWN_TICK_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub page_size: usize,
    pub sweep_interval_ms: u64,
    pub countdown_tick_ms: u64,
    pub app_env: String,
}

impl Config {
    /// Load the configuration from environment variables.
    /// Calls dotenv() automatically.
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let page_size = env::var("MESSAGE_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "Invalid MESSAGE_PAGE_SIZE: must be a positive number".to_string())?;
        if page_size == 0 {
            return Err("Invalid MESSAGE_PAGE_SIZE: must be at least 1".to_string());
        }

        let sweep_interval_ms = env::var("EXPIRY_SWEEP_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_SWEEP_INTERVAL_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "Invalid EXPIRY_SWEEP_INTERVAL_MS: must be a positive number".to_string())?;
        if sweep_interval_ms == 0 {
            return Err("Invalid EXPIRY_SWEEP_INTERVAL_MS: must be at least 1".to_string());
        }

        let countdown_tick_ms = env::var("COUNTDOWN_TICK_MS")
            .unwrap_or_else(|_| DEFAULT_COUNTDOWN_TICK_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "Invalid COUNTDOWN_TICK_MS: must be a positive number".to_string())?;
        if countdown_tick_ms == 0 {
            return Err("Invalid COUNTDOWN_TICK_MS: must be at least 1".to_string());
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            page_size,
            sweep_interval_ms,
            countdown_tick_ms,
            app_env,
        })
    }

    /// Print the configuration for startup logging.
    pub fn print_info(&self) {
        println!("   Engine Configuration:");
        println!("   Environment: {}", self.app_env);
        println!("   Message Page Size: {}", self.page_size);
        println!("   Expiry Sweep Interval: {}ms", self.sweep_interval_ms);
        println!("   Countdown Tick: {}ms", self.countdown_tick_ms);
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            page_size: DEFAULT_PAGE_SIZE,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            countdown_tick_ms: DEFAULT_COUNTDOWN_TICK_MS,
            app_env: "development".to_string(),
        }
    }
}
