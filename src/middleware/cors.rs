use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Exact origins, or a leading `*` for any origin.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".into()],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_headers: ["Content-Type", "Authorization", "X-Requested-With"]
                .into_iter()
                .map(String::from)
                .collect(),
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    fn apply_headers(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        if let Some(first) = self.allowed_origins.first() {
            if first == "*" {
                headers.insert(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                );
            } else if let Some(origin) = origin.filter(|origin| {
                self.allowed_origins
                    .iter()
                    .any(|allowed| origin.as_bytes() == allowed.as_bytes())
            }) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
                headers.append(header::VARY, HeaderValue::from_static("Origin"));
            }
        }

        if let Some(value) = joined(&self.allowed_methods) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, value);
        }

        if let Some(value) = joined(&self.allowed_headers) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
        }

        if self.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }
}

fn joined(values: &[String]) -> Option<HeaderValue> {
    if values.is_empty() {
        return None;
    }
    HeaderValue::from_str(&values.join(", ")).ok()
}

/// Adds CORS headers; answers every `OPTIONS` request itself with 204.
pub async fn cors(State(config): State<Arc<CorsConfig>>, req: Request, next: Next) -> Response {
    let origin = req.headers().get(header::ORIGIN).cloned();

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    config.apply_headers(origin.as_ref(), response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(value: &'static str) -> HeaderValue {
        HeaderValue::from_static(value)
    }

    #[test]
    fn wildcard_allows_any_origin() {
        let mut headers = HeaderMap::new();
        CorsConfig::default()
            .apply_headers(Some(&origin("https://a.example")), &mut headers);

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization, X-Requested-With"
        );
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }

    #[test]
    fn allow_list_matches_exactly() {
        let config = CorsConfig {
            allowed_origins: vec![
                "https://app.example".into(),
                "https://admin.example".into(),
            ],
            allow_credentials: true,
            ..CorsConfig::default()
        };

        let mut headers = HeaderMap::new();
        config.apply_headers(Some(&origin("https://admin.example")), &mut headers);
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://admin.example"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

        let mut headers = HeaderMap::new();
        config.apply_headers(
            Some(&origin("https://app.example.evil")),
            &mut headers,
        );
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

        let mut headers = HeaderMap::new();
        config.apply_headers(None, &mut headers);
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn empty_lists_leave_headers_unset() {
        let config = CorsConfig {
            allowed_origins: vec![],
            allowed_methods: vec![],
            allowed_headers: vec![],
            allow_credentials: false,
        };
        let mut headers = HeaderMap::new();
        config.apply_headers(Some(&origin("https://a.example")), &mut headers);
        assert!(headers.is_empty());
    }
}
