use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;
use chrono::Duration;
use env_helpers::{get_env, get_env_default};

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub database_url: String,
    /// Optional JSON plan catalog; built-in plans are used when unset.
    pub plan_catalog_path: Option<PathBuf>,
    /// Days of degraded access after `period_end` before hard lock-out.
    pub grace_period_days: i64,
    /// Cadence of the expiry scanner sweep.
    pub scan_interval_secs: u64,
    /// How far past `now` a sweep looks for upcoming boundaries. Must cover
    /// the largest warning window.
    pub scan_lookahead_days: i64,
    /// "Expiring soon" thresholds in days before `period_end`, e.g. "3,7".
    pub expiry_warning_days: Vec<i64>,
    /// Page size for the scanner's keyset pagination.
    pub scan_page_size: i64,
    /// Bounded optimistic-concurrency retries before surfacing contention.
    pub cas_max_retries: u32,
    /// Optional webhook for expiry alerts; alerts go to the log when unset.
    pub notify_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");
        let database_url: String = get_env("DATABASE_URL");

        let plan_catalog_path: Option<PathBuf> =
            std::env::var("PLAN_CATALOG_PATH").ok().map(PathBuf::from);

        let grace_period_days: i64 = get_env_default("GRACE_PERIOD_DAYS", 5);
        let scan_interval_secs: u64 = get_env_default("SCAN_INTERVAL_SECS", 3_600);
        let scan_lookahead_days: i64 = get_env_default("SCAN_LOOKAHEAD_DAYS", 7);
        let expiry_warning_days = parse_warning_days(&get_env_default(
            "EXPIRY_WARNING_DAYS",
            String::from("3,7"),
        ));
        let scan_page_size: i64 = get_env_default("SCAN_PAGE_SIZE", 200);
        let cas_max_retries: u32 = get_env_default("CAS_MAX_RETRIES", 3);
        let notify_webhook_url: Option<String> = std::env::var("NOTIFY_WEBHOOK_URL").ok();

        Self {
            bind_addr,
            cors_origin,
            database_url,
            plan_catalog_path,
            grace_period_days,
            scan_interval_secs,
            scan_lookahead_days,
            expiry_warning_days,
            scan_page_size,
            cas_max_retries,
            notify_webhook_url,
        }
    }

    pub fn grace_window(&self) -> Duration {
        Duration::days(self.grace_period_days)
    }

    pub fn scan_lookahead(&self) -> Duration {
        Duration::days(self.scan_lookahead_days)
    }
}

fn parse_warning_days(raw: &str) -> Vec<i64> {
    let mut days: Vec<i64> = raw
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .filter(|d| *d > 0)
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}
