use serde::{Deserialize, Serialize};

pub const MAX_LISTED_COLLECTIONS: usize = 10;
pub const MAX_ERROR_CHARS: usize = 50;

/// Body of `GET /test`. Built without ever failing; store errors become text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticsResponse {
    pub backend: String,
    pub database: String,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub connection_status: String,
    pub collections: Vec<String>,
}

impl Default for DiagnosticsResponse {
    fn default() -> Self {
        Self {
            backend: "✅ Running".to_string(),
            database: "❌ Not Available".to_string(),
            database_url: None,
            database_name: None,
            connection_status: "Not Connected".to_string(),
            collections: Vec::new(),
        }
    }
}

pub fn env_presence(set: bool) -> String {
    if set {
        "✅ Set".to_string()
    } else {
        "❌ Not Set".to_string()
    }
}

/// Char-boundary-safe truncation for error text surfaced to clients.
pub fn truncate_error(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}
