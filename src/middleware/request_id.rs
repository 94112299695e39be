use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use super::context::RequestContext;
use super::timeout::Deadline;
use crate::utils::{generate_id, is_valid_id};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub type RequestIdGenerator = fn() -> String;
pub type RequestIdValidator = fn(&str) -> bool;

#[derive(Debug, Clone)]
pub struct RequestIdConfig {
    pub header_name: HeaderName,
    pub generator: RequestIdGenerator,
    pub validator: RequestIdValidator,
    pub reuse_existing: bool,
}

impl Default for RequestIdConfig {
    fn default() -> Self {
        Self {
            header_name: HeaderName::from_static(REQUEST_ID_HEADER),
            generator: generate_id,
            validator: is_valid_id,
            reuse_existing: true,
        }
    }
}

impl RequestIdConfig {
    /// Caller-supplied id if acceptable, otherwise a fresh one.
    fn resolve(&self, req: &Request) -> String {
        let existing = if self.reuse_existing {
            req.headers()
                .get(&self.header_name)
                .and_then(|value| value.to_str().ok())
                .filter(|id| !id.is_empty() && (self.validator)(id))
        } else {
            None
        };

        match existing {
            Some(id) => id.to_owned(),
            None => (self.generator)(),
        }
    }
}

pub async fn request_id(
    State(config): State<RequestIdConfig>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = config.resolve(&req);
    let deadline = req.extensions().get::<Deadline>().map(|d| d.0);
    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
        deadline,
    });

    let mut response = next.run(req).await;
    match HeaderValue::from_str(&request_id) {
        Ok(value) => {
            response.headers_mut().insert(config.header_name, value);
        }
        Err(e) => tracing::warn!(error = %e, "Request id is not a valid header value"),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(id: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(id) = id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn valid_caller_id_is_reused() {
        let config = RequestIdConfig::default();
        let id = "V1StGXR8_Z5jdHi6B-myT";
        assert_eq!(config.resolve(&request_with(Some(id))), id);
    }

    #[test]
    fn invalid_caller_id_is_replaced() {
        let config = RequestIdConfig::default();
        let resolved = config.resolve(&request_with(Some("not valid!")));
        assert_ne!(resolved, "not valid!");
        assert!(is_valid_id(&resolved));
    }

    #[test]
    fn reuse_can_be_disabled() {
        let config = RequestIdConfig {
            reuse_existing: false,
            generator: || "generated".to_owned(),
            ..RequestIdConfig::default()
        };
        let resolved = config.resolve(&request_with(Some("V1StGXR8_Z5jdHi6B-myT")));
        assert_eq!(resolved, "generated");
    }
}
