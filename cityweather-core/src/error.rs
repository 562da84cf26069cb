use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a geocoding or forecast request.
///
/// Callers treat every variant the same way; the split only shapes the message.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Unexpected {service} response: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

impl NetworkError {
    pub(crate) fn transport(service: &'static str, source: reqwest::Error) -> Self {
        NetworkError::Transport { service, source }
    }

    pub(crate) fn status(service: &'static str, status: StatusCode, body: &str) -> Self {
        NetworkError::Status {
            service,
            status,
            body: truncate_body(body),
        }
    }

    pub(crate) fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        NetworkError::Malformed {
            service,
            reason: reason.into(),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bodies_are_truncated_on_char_boundaries() {
        let body = "é".repeat(300);
        let err = NetworkError::status("geocoding", StatusCode::BAD_GATEWAY, &body);
        let NetworkError::Status { body, .. } = err else {
            panic!("expected a status error");
        };
        assert!(body.ends_with("..."));
        assert_eq!(body.chars().count(), 203);
    }

    #[test]
    fn short_bodies_are_kept() {
        let err = NetworkError::status("forecast", StatusCode::NOT_FOUND, "nope");
        assert_eq!(err.to_string(), "forecast request failed with status 404 Not Found: nope");
    }
}
