use std::env;
use std::net::SocketAddr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppError;

pub const DEFAULT_SUBDOMAIN: &str = "utoronto";
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 900;

#[derive(Clone, Debug)]
pub struct CanvasConfig {
    pub api_token: String,
    pub subdomain: String,
    /// Courses starting on or after this instant count as active, and the
    /// announcement window never reaches further back than the earliest start.
    pub year_start: DateTime<Utc>,
    pub sync_interval_secs: u64,
    pub bind_addr: SocketAddr,
}

impl CanvasConfig {
    pub fn new(api_token: impl Into<String>, year_start: DateTime<Utc>) -> Self {
        Self {
            api_token: api_token.into(),
            subdomain: DEFAULT_SUBDOMAIN.to_string(),
            year_start,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let api_token = env::var("CANVAS_TOKEN")
            .map_err(|_| AppError::Config("CANVAS_TOKEN is not set".to_string()))?;
        let year_start = env::var("CANVAS_YEAR_START")
            .map_err(|_| AppError::Config("CANVAS_YEAR_START is not set".to_string()))
            .and_then(|raw| parse_year_start(&raw))?;

        let mut config = Self::new(api_token, year_start);

        if let Ok(subdomain) = env::var("CANVAS_SUBDOMAIN") {
            config.subdomain = subdomain;
        }
        if let Ok(raw) = env::var("SYNC_INTERVAL_SECS") {
            config.sync_interval_secs = raw
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid SYNC_INTERVAL_SECS: {}", raw)))?;
        }
        if let Ok(raw) = env::var("BIND_ADDR") {
            config.bind_addr = raw
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid BIND_ADDR: {}", raw)))?;
        }

        Ok(config)
    }

    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = subdomain.into();
        self
    }

    pub fn base_url(&self) -> String {
        format!("https://{}.instructure.com", self.subdomain)
    }
}

/// Accepts either a bare `YYYY-MM-DD` date (midnight UTC) or a full RFC 3339 timestamp.
fn parse_year_start(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Config(format!("Invalid CANVAS_YEAR_START: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn year_start_accepts_plain_dates() {
        let parsed = parse_year_start("2020-07-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn year_start_accepts_rfc3339() {
        let parsed = parse_year_start("2020-07-01T04:00:00-04:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2020, 7, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn year_start_rejects_garbage() {
        assert!(matches!(parse_year_start("last july"), Err(AppError::Config(_))));
    }

    #[test]
    fn base_url_uses_subdomain() {
        let config = CanvasConfig::new("token", Utc::now()).with_subdomain("q");
        assert_eq!(config.base_url(), "https://q.instructure.com");
    }
}
