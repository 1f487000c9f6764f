//! Capability-driven route synthesis for a single resource
//!
//! Each capability present on a [`ResourceDescriptor`] yields one handler:
//! - `page`   → `GET  /{namespace}/{segment}`
//! - `search` → `POST /{namespace}/{segment}`
//! - `get`    → `GET  /{namespace}/{segment}/{id}`
//!
//! Absent capabilities mount nothing, so the framework's own 404/405 answers
//! requests for them.

use crate::config::{GatewayConfig, PaginationConfig};
use crate::core::document::Document;
use crate::core::error::{GatewayError, GatewayResult, ValidationError, map_error};
use crate::core::extractors::SearchCriteria;
use crate::core::query::{PageQuery, Pagination, SearchParams};
use crate::core::resource::{
    Capability, GetOperation, PageOperation, ResourceDescriptor, ResourceError, SearchOperation,
};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get, post};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;

/// Per-resource settings shared by every handler of that resource
#[derive(Debug)]
pub struct RouteContext {
    /// JSON:API `type` of every resource object (the URL segment)
    pub resource_type: String,
    pub pagination: PaginationConfig,
    pub legacy_status_codes: bool,
}

impl RouteContext {
    pub fn new(resource_type: impl Into<String>, config: &GatewayConfig) -> Self {
        Self {
            resource_type: resource_type.into(),
            pagination: config.pagination.clone(),
            legacy_status_codes: config.legacy_status_codes,
        }
    }

    /// Serialize a successful payload, or map the operation's failure
    pub fn respond(&self, outcome: Result<Value, ResourceError>) -> Response {
        let payload = match outcome {
            Ok(payload) => payload,
            Err(err) => return self.reject(err.into()),
        };

        match Document::from_payload(&self.resource_type, payload) {
            Ok(document) => document.into_response(),
            Err(err) => self.reject(err.into()),
        }
    }

    /// Render a failure as a JSON:API error response
    pub fn reject(&self, err: GatewayError) -> Response {
        let (mut status, document) = map_error(&err);
        if self.legacy_status_codes && err.is_soft_failure() {
            status = StatusCode::OK;
        }
        (status, document).into_response()
    }

    fn pagination(
        &self,
        query: Result<Query<PageQuery>, QueryRejection>,
    ) -> GatewayResult<Pagination> {
        let Query(raw) = query.map_err(invalid_query)?;
        Ok(raw.pagination(&self.pagination)?)
    }

    fn search_params(
        &self,
        query: Result<Query<PageQuery>, QueryRejection>,
    ) -> GatewayResult<SearchParams> {
        let Query(raw) = query.map_err(invalid_query)?;
        Ok(raw.search(&self.pagination)?)
    }
}

fn invalid_query(rejection: QueryRejection) -> GatewayError {
    ValidationError::InvalidQuery {
        message: rejection.body_text(),
    }
    .into()
}

fn invalid_path(rejection: PathRejection) -> GatewayError {
    ValidationError::InvalidPath {
        message: rejection.body_text(),
    }
    .into()
}

#[derive(Clone)]
struct ListState {
    context: Arc<RouteContext>,
    operation: Arc<dyn PageOperation>,
}

#[derive(Clone)]
struct SearchState {
    context: Arc<RouteContext>,
    operation: Arc<dyn SearchOperation>,
}

#[derive(Clone)]
struct RetrieveState {
    context: Arc<RouteContext>,
    operation: Arc<dyn GetOperation>,
}

/// Build the router for one resource mounted at `/{namespace}/{segment}`
pub fn build_resource_routes(
    descriptor: &ResourceDescriptor,
    segment: &str,
    config: &GatewayConfig,
) -> Router {
    let context = Arc::new(RouteContext::new(segment, config));
    let collection_path = config.collection_path(segment);
    let item_path = format!("{}/{{id}}", collection_path);

    let mut collection: Option<MethodRouter> = None;

    if let Some(operation) = descriptor.page() {
        let route = get(list_resource).with_state(ListState {
            context: context.clone(),
            operation: operation.clone(),
        });
        collection = Some(route);
        tracing::info!(
            resource = descriptor.name(),
            capability = %Capability::Page,
            "Mounting GET {}",
            collection_path
        );
    }

    if let Some(operation) = descriptor.search() {
        let route = post(search_resource).with_state(SearchState {
            context: context.clone(),
            operation: operation.clone(),
        });
        collection = Some(match collection {
            Some(existing) => existing.merge(route),
            None => route,
        });
        tracing::info!(
            resource = descriptor.name(),
            capability = %Capability::Search,
            "Mounting POST {}",
            collection_path
        );
    }

    let mut router = Router::new();

    if let Some(collection) = collection {
        router = router.route(&collection_path, collection);
    }

    if let Some(operation) = descriptor.get() {
        router = router.route(
            &item_path,
            get(retrieve_resource).with_state(RetrieveState {
                context,
                operation: operation.clone(),
            }),
        );
        tracing::info!(
            resource = descriptor.name(),
            capability = %Capability::Get,
            "Mounting GET {}",
            item_path
        );
    }

    router
}

/// `GET /{namespace}/{segment}?page&size`
async fn list_resource(
    State(state): State<ListState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Response {
    let context = &state.context;
    let Pagination { page, size } = match context.pagination(query) {
        Ok(pagination) => pagination,
        Err(err) => return context.reject(err),
    };

    tracing::debug!(resource = %context.resource_type, page, size, "Listing resource");
    context.respond(state.operation.page(page, size).await)
}

/// `POST /{namespace}/{segment}?page&size&sort` with criteria in the body
async fn search_resource(
    State(state): State<SearchState>,
    query: Result<Query<PageQuery>, QueryRejection>,
    criteria: Result<SearchCriteria, GatewayError>,
) -> Response {
    let context = &state.context;
    let SearchParams { pagination, sort } = match context.search_params(query) {
        Ok(params) => params,
        Err(err) => return context.reject(err),
    };
    let criteria = match criteria {
        Ok(criteria) => criteria.into_inner(),
        Err(err) => return context.reject(err),
    };

    tracing::debug!(
        resource = %context.resource_type,
        page = pagination.page,
        size = pagination.size,
        sort = %sort,
        "Searching resource"
    );
    context.respond(
        state
            .operation
            .search(pagination.page, pagination.size, &sort, criteria)
            .await,
    )
}

/// `GET /{namespace}/{segment}/{id}`
async fn retrieve_resource(
    State(state): State<RetrieveState>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let context = &state.context;
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return context.reject(invalid_path(rejection)),
    };
    tracing::debug!(resource = %context.resource_type, id = %id, "Retrieving resource");
    context.respond(state.operation.get(&id).await)
}
