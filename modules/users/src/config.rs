use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::contract::model::DEFAULT_PAGE_SIZE;

/// Configuration for the users module (`modules.users` in the app config).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Deadline applied to every request handled by the REST layer.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(default)]
    pub events: EventsConfig,
}

/// Where user events go.
///
/// With an `endpoint` they are POSTed over HTTP; without one they are
/// broadcast in-process and exposed on the SSE route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    #[serde(default)]
    pub endpoint: Option<Url>,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    #[serde(default = "default_publish_timeout", with = "humantime_serde")]
    pub publish_timeout: Duration,
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            request_timeout: default_request_timeout(),
            events: EventsConfig::default(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            exchange: default_exchange(),
            publish_timeout: default_publish_timeout(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_exchange() -> String {
    "events.user".to_string()
}

fn default_publish_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_broadcast_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: UsersConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.default_page_size, 10);
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        assert!(cfg.events.endpoint.is_none());
        assert_eq!(cfg.events.exchange, "events.user");
        assert_eq!(cfg.events.publish_timeout, Duration::from_secs(2));
    }

    #[test]
    fn parses_humantime_and_endpoint() {
        let cfg: UsersConfig = serde_json::from_value(serde_json::json!({
            "default_page_size": 25,
            "request_timeout": "750ms",
            "events": {
                "endpoint": "http://broker.local/publish",
                "exchange": "users.audit",
                "publish_timeout": "1s"
            }
        }))
        .unwrap();

        assert_eq!(cfg.default_page_size, 25);
        assert_eq!(cfg.request_timeout, Duration::from_millis(750));
        assert_eq!(
            cfg.events.endpoint.as_ref().map(Url::as_str),
            Some("http://broker.local/publish")
        );
        assert_eq!(cfg.events.exchange, "users.audit");
        assert_eq!(cfg.events.broadcast_capacity, 256);
    }

    #[test]
    fn rejects_unknown_fields() {
        let res: Result<UsersConfig, _> =
            serde_json::from_value(serde_json::json!({ "page_size": 5 }));
        assert!(res.is_err());
    }
}
