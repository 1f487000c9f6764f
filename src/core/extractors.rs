//! Axum extractors for search criteria
//!
//! Criteria are an opaque key/value mapping taken from the request body. Both
//! JSON and form-encoded bodies are accepted; an empty body means "no criteria".

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, header};
use axum::Form;
use serde_json::{Map, Value};

use crate::core::error::{GatewayError, ValidationError};

const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Search criteria extracted from the request body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn search(
///     criteria: Result<SearchCriteria, GatewayError>,
/// ) -> Response {
///     let SearchCriteria(criteria) = criteria?;
///     // criteria is a serde_json::Value, {} when the body was empty
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria(pub Value);

impl SearchCriteria {
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl<S> FromRequest<S> for SearchCriteria
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match media_type(req.headers()).as_deref() {
            Some(FORM_MEDIA_TYPE) => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|rejection| invalid_body(rejection.body_text()))?;

                Ok(Self(Value::Object(
                    pairs
                        .into_iter()
                        .map(|(key, value)| (key, Value::String(value)))
                        .collect(),
                )))
            }
            Some(media) if !is_json(media) => Err(invalid_body(format!(
                "unsupported content type '{}', send JSON or form-encoded criteria",
                media
            ))),
            // JSON, or no declared content type
            _ => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|rejection| invalid_body(rejection.body_text()))?;

                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Self::empty());
                }

                serde_json::from_slice(&bytes)
                    .map(Self)
                    .map_err(|e| invalid_body(e.to_string()))
            }
        }
    }
}

fn media_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
}

fn is_json(media: &str) -> bool {
    media == "application/json" || (media.starts_with("application/") && media.ends_with("+json"))
}

fn invalid_body(message: String) -> GatewayError {
    ValidationError::InvalidBody { message }.into()
}
