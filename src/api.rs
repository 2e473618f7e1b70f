use crate::models::{Category, Component, HealthResponse};
use crate::storage::ComponentStorage;
use crate::user_storage::UserStorage;
use crate::validation::{validate_new_component, FieldError};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

/// Everything the handlers share. Built once at startup and handed to the
/// router; tests build a fresh one per case.
pub struct AppState {
    pub components: Arc<ComponentStorage>,
    pub users: Arc<UserStorage>,
}

impl AppState {
    pub fn new(components: ComponentStorage, users: UserStorage) -> Arc<Self> {
        Arc::new(Self {
            components: Arc::new(components),
            users: Arc::new(users),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/components", get(list_components).post(create_component))
        .route("/api/components/search", get(search_components))
        .route("/api/components/:id", get(get_component))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
}

/// Uniform error body for every failing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid component data")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = match &self {
            ApiError::Internal(err) => {
                error!(error = %format!("{:#}", err), "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let errors = match self {
            ApiError::Validation(errors) => errors,
            _ => Vec::new(),
        };

        let body = ErrorBody {
            code: code.to_string(),
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    ApiError::Internal(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

/// Query string as raw pairs. Repeated keys are kept in order.
type QueryPairs = Vec<(String, String)>;

/// First value given for `key`, if any.
fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        components: state.components.count().await,
    })
}

async fn list_components(
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<Vec<Component>>, ApiError> {
    let pairs = match query {
        Ok(Query(pairs)) => pairs,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "unreadable list query, listing everything");
            Vec::new()
        }
    };

    let filter = Category::filter_from(first_value(&pairs, "category"));
    let components = state.components.list_components(filter.as_ref()).await;
    Ok(Json(components))
}

async fn search_components(
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<Vec<Component>>, ApiError> {
    let Query(pairs) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let query = first_value(&pairs, "q")
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Search query is required".to_string()))?;

    Ok(Json(state.components.search_components(query).await))
}

async fn get_component(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Component>, ApiError> {
    state
        .components
        .get_component(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Component not found".to_string()))
}

async fn create_component(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Component>), ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        ApiError::Validation(vec![FieldError::new("body", rejection.body_text())])
    })?;

    let data = validate_new_component(&body).map_err(ApiError::Validation)?;
    let component = state.components.create_component(data).await;

    info!(
        id = %component.id,
        name = %component.name,
        category = %component.category,
        "component created"
    );

    Ok((StatusCode::CREATED, Json(component)))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn assert_opaque(raw: &str, cause: &str) {
        assert!(!raw.contains(cause), "cause leaked: {raw}");

        let body: ErrorBody = serde_json::from_str(raw).unwrap();
        assert_eq!(body.code, "internal_error");
        assert_eq!(body.message, "Internal server error");
        assert!(body.errors.is_empty());
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause() {
        let response = ApiError::Internal(anyhow::anyhow!("disk on fire")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_opaque(&body_of(response).await, "disk on fire");
    }

    #[test]
    fn first_value_wins_for_repeated_keys() {
        let pairs = vec![
            ("category".to_string(), "Cards".to_string()),
            ("category".to_string(), "All".to_string()),
        ];
        assert_eq!(first_value(&pairs, "category"), Some("Cards"));
        assert_eq!(first_value(&pairs, "q"), None);
    }

    #[test]
    fn error_kinds_map_to_status_codes() {
        let cases = [
            (
                ApiError::Validation(vec![FieldError::new("name", "Required")]),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::BadRequest("q".to_string()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("nope".to_string()), StatusCode::NOT_FOUND),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn panic_payloads_become_opaque_500s() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_opaque(&body_of(response).await, "boom");

        let response = handle_panic(Box::new(String::from("owned boom")));
        assert_opaque(&body_of(response).await, "owned boom");
    }
}
