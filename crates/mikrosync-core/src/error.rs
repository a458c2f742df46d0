// ── Core error types ──
//
// User-facing errors from mikrosync-core. Consumers never see HTTP status
// codes or JSON decode failures directly: the `From<mikrosync_api::Error>`
// impl translates transport errors into these variants.
//
// The polling path itself never returns an error; these surface only from
// lifecycle calls (`connect`) and write-path passthroughs.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to router at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Router disconnected")]
    ControllerDisconnected,

    #[error("Router request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<mikrosync_api::Error> for CoreError {
    fn from(err: mikrosync_api::Error) -> Self {
        match err {
            mikrosync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            mikrosync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            mikrosync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            mikrosync_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            mikrosync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            mikrosync_api::Error::Router { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            mikrosync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_maps_through() {
        let err: CoreError = mikrosync_api::Error::Authentication {
            message: "bad password".into(),
        }
        .into();
        assert!(matches!(err, CoreError::AuthenticationFailed { ref message } if message == "bad password"));
    }

    #[test]
    fn router_rejection_keeps_status() {
        let err: CoreError = mikrosync_api::Error::Router {
            status: 400,
            message: "no such item".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(400), .. }));
        assert_eq!(err.to_string(), "API error: no such item");
    }

    #[test]
    fn timeout_keeps_duration() {
        let err: CoreError = mikrosync_api::Error::Timeout { timeout_secs: 30 }.into();
        assert_eq!(err.to_string(), "Router request timed out after 30s");
    }
}
