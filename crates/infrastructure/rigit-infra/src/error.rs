use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("authentication failed; please log in again")]
    Unauthorized,
    #[error("no stored credential; please log in")]
    MissingCredential,
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Auth,
    Server,
    Network,
    Decode,
    Config,
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Unauthorized | ApiError::MissingCredential => ApiErrorKind::Auth,
            ApiError::Status { .. } => ApiErrorKind::Server,
            ApiError::Transport(_) => ApiErrorKind::Network,
            ApiError::Decode(_) => ApiErrorKind::Decode,
            ApiError::InvalidUrl(_) => ApiErrorKind::Config,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ApiError::Decode(value.to_string())
        } else {
            ApiError::Transport(value.to_string())
        }
    }
}

/// Human-readable message for a failed response.
///
/// Lookup order: `detail` (strings as-is, FastAPI validation arrays joined by
/// `"; "`, anything else as compact JSON), then `message`, then the raw body,
/// then a generic status line. Never fails.
pub fn extract_error_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
        if let Some(detail) = json.get("detail").filter(|d| !d.is_null()) {
            if let Some(message) = detail_message(detail) {
                return message;
            }
        }
        if let Some(Value::String(message)) = json.get("message") {
            if !message.trim().is_empty() {
                return message.clone();
            }
        }
    }
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!("request failed with status {status}")
}

fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(entries) => {
            let msgs: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                Some(detail.to_string())
            } else {
                Some(msgs.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_wins() {
        let body = r#"{"detail": "Contract not found", "message": "ignored"}"#;
        assert_eq!(extract_error_message(404, body), "Contract not found");
    }

    #[test]
    fn validation_arrays_are_joined() {
        let body = r#"{"detail": [
            {"loc": ["body", "email"], "msg": "field required", "type": "value_error.missing"},
            {"loc": ["body", "quantity"], "msg": "value is not a valid integer"}
        ]}"#;
        assert_eq!(
            extract_error_message(422, body),
            "field required; value is not a valid integer"
        );
    }

    #[test]
    fn structured_detail_is_compacted() {
        let body = r#"{"detail": {"code": "STOCK", "missing": 3}}"#;
        assert_eq!(extract_error_message(409, body), r#"{"code":"STOCK","missing":3}"#);
    }

    #[test]
    fn falls_back_to_message_then_text_then_status() {
        assert_eq!(extract_error_message(500, r#"{"message": "boom"}"#), "boom");
        assert_eq!(extract_error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_error_message(503, "  "), "request failed with status 503");
    }
}
