//! JSON:API documents
//!
//! A [`Document`] carries either primary data or a list of errors, never both.
//! Resource objects are built from whatever payload an operation returned: the
//! attribute set of each object is the payload's own top-level keys.

use crate::core::error::SerializationError;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Media type of every JSON:API document emitted by the gateway
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Members a resource object reserves for itself; they never appear as attributes
const RESERVED_MEMBERS: [&str; 2] = ["id", "type"];

/// Member used as identifier when a payload has no `id`
const FALLBACK_ID_MEMBER: &str = "uid";

/// Top-level JSON:API document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Document {
    /// Successful response with primary data
    Data { data: PrimaryData },

    /// Failed response
    Errors { errors: Vec<ApiError> },
}

/// Primary data: one resource object or a collection of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    One(ResourceObject),
    Many(Vec<ResourceObject>),
}

/// A single JSON:API resource object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub attributes: Map<String, Value>,
}

/// A JSON:API error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Status-like code, always rendered as a string
    pub code: String,
    pub title: String,
    /// Human-readable message, or the upstream body verbatim
    pub detail: Value,
}

impl ApiError {
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        detail: impl Into<Value>,
    ) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            detail: detail.into(),
        }
    }
}

impl Document {
    /// Serialize an operation payload as a document of the given resource type
    ///
    /// - an object becomes a single resource object
    /// - an array becomes a collection; every element must be an object
    ///
    /// Anything else (or an unusable `id`) is a [`SerializationError`].
    pub fn from_payload(resource_type: &str, payload: Value) -> Result<Self, SerializationError> {
        let data = match payload {
            Value::Object(members) => {
                PrimaryData::One(ResourceObject::from_members(resource_type, members)?)
            }
            Value::Array(items) => PrimaryData::Many(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| match item {
                        Value::Object(members) => {
                            ResourceObject::from_members(resource_type, members)
                        }
                        other => Err(shape_error(
                            resource_type,
                            format!(
                                "collection element {} is {}, expected an object",
                                index,
                                value_kind(&other)
                            ),
                        )),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            other => {
                return Err(shape_error(
                    resource_type,
                    format!(
                        "payload is {}, expected an object or an array of objects",
                        value_kind(&other)
                    ),
                ));
            }
        };

        Ok(Document::Data { data })
    }

    /// Build an error document with a single error
    pub fn error(error: ApiError) -> Self {
        Document::Errors {
            errors: vec![error],
        }
    }

    /// Primary data, if this is a data document
    pub fn data(&self) -> Option<&PrimaryData> {
        match self {
            Document::Data { data } => Some(data),
            Document::Errors { .. } => None,
        }
    }

    /// Errors, if this is an error document
    pub fn errors(&self) -> Option<&[ApiError]> {
        match self {
            Document::Data { .. } => None,
            Document::Errors { errors } => Some(errors),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Document::Errors { .. })
    }
}

impl ResourceObject {
    fn from_members(
        resource_type: &str,
        mut members: Map<String, Value>,
    ) -> Result<Self, SerializationError> {
        let id = match members.get("id") {
            Some(value) => Some(render_id(value).ok_or_else(|| {
                shape_error(
                    resource_type,
                    format!(
                        "`id` member is {}, expected a string or a number",
                        value_kind(value)
                    ),
                )
            })?),
            None => members.get(FALLBACK_ID_MEMBER).and_then(render_id),
        };

        for reserved in RESERVED_MEMBERS {
            members.remove(reserved);
        }

        Ok(Self {
            resource_type: resource_type.to_string(),
            id,
            attributes: members,
        })
    }
}

fn render_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn shape_error(resource_type: &str, message: String) -> SerializationError {
    SerializationError {
        resource_type: resource_type.to_string(),
        message,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl IntoResponse for Document {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self) {
            Ok(body) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(JSONAPI_MEDIA_TYPE),
                )],
                body,
            )
                .into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to encode JSON:API document");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}
