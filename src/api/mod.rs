use crate::models::{EditableFields, ErrorBody, Item, ItemId, UpdateItemResponse};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: http_error_message(status, body),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Builds the user-facing detail for a non-2xx reply.
///
/// Prefers the backend's `{"error": ...}` field, then the raw body, then the
/// status reason phrase.
pub(crate) fn http_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
        .or_else(|| {
            let raw = body.trim();
            // An HTML error page is noise in an alert.
            (!raw.is_empty() && !raw.starts_with('<')).then(|| raw.to_string())
        })
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default();

    format!("Server error: {} - {}", status.as_u16(), detail)
}

/// The two failure kinds of the table synchronizer.
#[derive(Clone, Debug)]
pub(crate) enum SyncError {
    /// Collection retrieval failed.
    Fetch(ApiError),
    /// Single-item update failed.
    Save { id: ItemId, source: ApiError },
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Error loading data: {e}"),
            Self::Save { id, source } => write!(f, "Error saving item {id}: {source}"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub refresh_interval_ms: u32,
}

impl EnvConfig {
    pub(crate) const DEFAULT_API_URL: &'static str = "http://localhost:5000/api";
    pub(crate) const DEFAULT_REFRESH_INTERVAL_MS: u32 = 30_000;
    const MIN_REFRESH_INTERVAL_MS: f64 = 1_000.0;

    pub fn new() -> Self {
        let mut api_url = None;
        let mut refresh_interval_ms = None;

        // Both the README style (`API_URL`) and lowercase keys are accepted.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    let lookup = |keys: [&str; 2]| {
                        keys.into_iter().find_map(|k| {
                            js_sys::Reflect::get(&env, &k.into())
                                .ok()
                                .filter(|v| !v.is_undefined() && !v.is_null())
                        })
                    };

                    api_url = lookup(["API_URL", "api_url"]).and_then(|v| v.as_string());
                    refresh_interval_ms = lookup(["REFRESH_INTERVAL_MS", "refresh_interval_ms"])
                        .and_then(|v| {
                            v.as_f64()
                                .or_else(|| v.as_string().and_then(|s| s.trim().parse().ok()))
                        });
                }
            }
        }

        Self::from_values(api_url, refresh_interval_ms)
    }

    pub(crate) fn from_values(api_url: Option<String>, refresh_interval_ms: Option<f64>) -> Self {
        let api_url = api_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_API_URL.to_string());

        let refresh_interval_ms = refresh_interval_ms
            .filter(|ms| ms.is_finite() && *ms >= Self::MIN_REFRESH_INTERVAL_MS)
            .map(|ms| ms.min(u32::MAX as f64) as u32)
            .unwrap_or(Self::DEFAULT_REFRESH_INTERVAL_MS);

        Self {
            api_url,
            refresh_interval_ms,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn item_path(id: &ItemId) -> String {
        format!("/items/{}", urlencoding::encode(id.as_str()))
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let mut req = client.request(method, self.url(path));

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, &body))
        }
    }

    pub async fn list_items(&self) -> ApiResult<Vec<Item>> {
        self.request_api(reqwest::Method::GET, "/items", Option::<&()>::None)
            .await
    }

    pub async fn update_item(
        &self,
        id: &ItemId,
        fields: &EditableFields,
    ) -> ApiResult<UpdateItemResponse> {
        self.request_api(reqwest::Method::PUT, &Self::item_path(id), Some(fields))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_api_client_new_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/api/".to_string());
        assert_eq!(client.base_url, "http://localhost:5000/api");
        assert_eq!(client.url("/items"), "http://localhost:5000/api/items");
    }

    #[test]
    fn test_item_path_encodes_id() {
        assert_eq!(ApiClient::item_path(&ItemId::new("42")), "/items/42");
        assert_eq!(
            ApiClient::item_path(&ItemId::new("shelf a/1")),
            "/items/shelf%20a%2F1"
        );
    }

    #[test]
    fn test_http_error_message_prefers_error_field() {
        let msg = http_error_message(StatusCode::BAD_REQUEST, r#"{"error": "bad"}"#);
        assert_eq!(msg, "Server error: 400 - bad");
    }

    #[test]
    fn test_http_error_message_falls_back_to_body_then_reason() {
        let msg = http_error_message(StatusCode::INTERNAL_SERVER_ERROR, "disk full");
        assert_eq!(msg, "Server error: 500 - disk full");

        let msg = http_error_message(StatusCode::NOT_FOUND, "<html>nope</html>");
        assert_eq!(msg, "Server error: 404 - Not Found");

        let msg = http_error_message(StatusCode::BAD_GATEWAY, r#"{"error": ""}"#);
        assert!(msg.starts_with("Server error: 502 - "));
    }

    #[test]
    fn test_sync_error_display_carries_detail() {
        let fetch = SyncError::Fetch(ApiError {
            kind: ApiErrorKind::Network,
            message: "connection refused".to_string(),
        });
        assert_eq!(fetch.to_string(), "Error loading data: connection refused");

        let save = SyncError::Save {
            id: ItemId::new("3"),
            source: ApiError {
                kind: ApiErrorKind::Http,
                message: http_error_message(StatusCode::BAD_REQUEST, r#"{"error":"bad"}"#),
            },
        };
        let text = save.to_string();
        assert!(text.contains("item 3"));
        assert!(text.contains("bad"));
    }

    #[test]
    fn test_env_config_defaults() {
        let cfg = EnvConfig::from_values(None, None);
        assert_eq!(cfg.api_url, EnvConfig::DEFAULT_API_URL);
        assert_eq!(cfg.refresh_interval_ms, 30_000);
    }

    #[test]
    fn test_env_config_overrides_and_sanitizes() {
        let cfg = EnvConfig::from_values(Some(" https://skladi.example/api/ ".to_string()), Some(5_000.0));
        assert_eq!(cfg.api_url, "https://skladi.example/api");
        assert_eq!(cfg.refresh_interval_ms, 5_000);

        let cfg = EnvConfig::from_values(Some("   ".to_string()), Some(10.0));
        assert_eq!(cfg.api_url, EnvConfig::DEFAULT_API_URL);
        assert_eq!(cfg.refresh_interval_ms, EnvConfig::DEFAULT_REFRESH_INTERVAL_MS);

        let cfg = EnvConfig::from_values(None, Some(f64::NAN));
        assert_eq!(cfg.refresh_interval_ms, EnvConfig::DEFAULT_REFRESH_INTERVAL_MS);
    }
}
