use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::merge::{MergeSummary, ProductsFile};

#[derive(Clone)]
pub struct AppState {
    products: Arc<ProductsFile>,
}

impl AppState {
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        Self {
            products: Arc::new(ProductsFile::new(config.products_file.clone())),
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    let product_routes = Router::new()
        .route("/products", get(list_products))
        .route("/products/merge", post(merge_products));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/v1", product_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
    })
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(state.products.read_all().await?))
}

async fn merge_products(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MergeSummary>, AppError> {
    let items = parse_merge_body(&body)?;
    let summary = state.products.append(items).await?;
    tracing::info!(
        endpoint = "products_merge",
        added = summary.added,
        total = summary.total,
        file = %state.products.path().display(),
        "Merged pushed products"
    );
    Ok(Json(summary))
}

fn parse_merge_body(body: &[u8]) -> Result<Vec<Value>, AppError> {
    let value = serde_json::from_slice::<Value>(body)
        .map_err(|error| AppError::bad_request(format!("Body is not valid JSON: {error}")))?;
    match value {
        Value::Array(items) if items.is_empty() => {
            Err(AppError::bad_request("No products in request body"))
        }
        Value::Array(items) => Ok(items),
        _ => Err(AppError::bad_request("Body must be a JSON array of products")),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    fn test_router(products_file: &Path) -> Router {
        let config = Arc::new(AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            products_file: products_file.to_path_buf(),
        });
        app_router(AppState::from_config(config))
    }

    fn merge_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/products/merge")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn merge_appends_and_reports_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        let router = test_router(&path);

        let response = router
            .clone()
            .oneshot(merge_request(r#"[{"name":"Kopi","price":5000}]"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"added": 1, "total": 1}));

        let response = router
            .clone()
            .oneshot(merge_request(
                r#"[{"name":"Kopi","price":5000},{"name":"Teh","price":3000}]"#,
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!({"added": 2, "total": 3}));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/v1/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let listed = json_body(response).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn merge_rejects_empty_and_non_array_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        let router = test_router(&path);

        for body in ["[]", r#"{"name":"Kopi"}"#, "not json"] {
            let response = router.clone().oneshot(merge_request(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let error = json_body(response).await;
            assert!(error["error"].as_str().unwrap().starts_with("Invalid request"));
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir.path().join("products.json"));

        let response = router
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }
}
