use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod auth;
mod config;
mod models;
mod routes;
mod scheduler;

use adapters::{InMemoryRepository, SystemClock, UuidV4Ids};
use application::{
    DocumentService, FolderService, HrService, MarketingService, PipelineService,
    SignatureService,
};
use bureau::{Clock, Entity, IdGenerator, Repo};
use config::ServerConfig;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub folder_service: Arc<FolderService>,
    pub document_service: Arc<DocumentService>,
    pub signature_service: Arc<SignatureService>,
    pub hr_service: Arc<HrService>,
    pub marketing_service: Arc<MarketingService>,
    pub pipeline_service: Arc<PipelineService>,
    /// Bearer token for protected routes; `None` disables auth
    pub api_key: Option<Arc<str>>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Bureau API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn repo<T: Entity>(ids: &Arc<dyn IdGenerator>, clock: &Arc<dyn Clock>) -> Repo<T> {
    Arc::new(InMemoryRepository::<T>::new(ids.clone(), clock.clone()))
}

/// Wire the in-memory stores and the application services
pub fn build_state(
    config: &ServerConfig,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
) -> AppState {
    let domain = Arc::new(config.domain.clone());

    let folders = repo(&ids, &clock);
    let documents = repo(&ids, &clock);
    let links = repo(&ids, &clock);
    let workflows = repo(&ids, &clock);
    let notifications = repo(&ids, &clock);
    let employees = repo(&ids, &clock);
    let leave = repo(&ids, &clock);
    let contacts = repo(&ids, &clock);
    let segments = repo(&ids, &clock);
    let deals = repo(&ids, &clock);

    let document_service = Arc::new(DocumentService::new(
        documents.clone(),
        links,
        workflows.clone(),
        folders.clone(),
        domain.clone(),
    ));
    let folder_service = Arc::new(FolderService::new(
        folders,
        document_service.clone(),
        domain.clone(),
    ));
    let signature_service = Arc::new(SignatureService::new(
        workflows,
        documents,
        notifications,
        ids,
        clock.clone(),
        domain.clone(),
    ));
    let hr_service = Arc::new(HrService::new(
        employees,
        leave,
        document_service.clone(),
        clock.clone(),
        domain.clone(),
    ));
    let marketing_service = Arc::new(MarketingService::new(
        contacts.clone(),
        segments,
        deals.clone(),
        document_service.clone(),
        domain.clone(),
    ));
    let pipeline_service = Arc::new(PipelineService::new(
        deals,
        contacts,
        document_service.clone(),
        clock,
        domain,
    ));

    AppState {
        folder_service,
        document_service,
        signature_service,
        hr_service,
        marketing_service,
        pipeline_service,
        api_key: config.api_key.as_deref().map(Arc::from),
    }
}

pub fn build_router(state: AppState) -> Router {
    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .merge(routes::folders::router())
        .merge(routes::documents::router())
        .merge(routes::signatures::router())
        .merge(routes::hr::router())
        .merge(routes::marketing::router())
        .merge(routes::sales::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bureau_server=info,tower_http=info")),
        )
        .init();

    tracing::info!("Bureau API initializing...");
    let config = ServerConfig::from_env()?;

    if config.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!("No BUREAU_API_KEY set - authentication disabled");
    }

    let state = build_state(&config, Arc::new(UuidV4Ids), Arc::new(SystemClock));

    if scheduler::maybe_start_sweeper(state.signature_service.clone(), config.expiry_sweep_secs)
        .is_none()
    {
        tracing::warn!("Signature expiry sweeper disabled");
    }

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("Swagger UI: /swagger-ui");
    tracing::info!("Bureau API listening on {}", config.bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapters::{ManualClock, SequentialIds};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use chrono::TimeZone;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(api_key: Option<&str>) -> Router {
        let mut config = ServerConfig::default();
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }
        let start = chrono::Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .unwrap();
        build_router(build_state(
            &config,
            Arc::new(SequentialIds::new()),
            Arc::new(ManualClock::new(start)),
        ))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app(Some("secret"));
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_protected_routes_require_bearer_token() {
        let app = app(Some("secret"));
        let (status, _) = send(&app, Method::GET, "/bureau/folders", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/bureau/folders")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_document_search_ranks_title_matches_first() {
        let app = app(None);
        let (status, folder) = send(
            &app,
            Method::POST,
            "/bureau/folders",
            Some(json!({"name": "Contracts"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        for (title, tags) in [("Invoice March", json!(["billing"])), ("Supplier notes", json!(["invoice"]))] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/bureau/documents",
                Some(json!({
                    "title": title,
                    "folder_id": folder["id"],
                    "mime_type": "application/pdf",
                    "size_bytes": 1024,
                    "tags": tags,
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, hits) = send(
            &app,
            Method::POST,
            "/bureau/documents/search",
            Some(json!({"query": "invoice"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let hits = hits.as_array().unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["document"]["title"], "Invoice March");
        assert_eq!(hits[0]["score"], 75);
        assert_eq!(hits[1]["score"], 25);
    }

    #[tokio::test]
    async fn test_domain_errors_surface_as_statuses() {
        let app = app(None);

        let (status, _) = send(
            &app,
            Method::GET,
            "/bureau/deals/00000000-0000-0000-0000-000000000042",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/bureau/contacts/query",
            Some(json!({"clauses": [{"field": "shoe_size", "operator": "equals", "value": 42}]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, deal) = send(
            &app,
            Method::POST,
            "/bureau/deals",
            Some(json!({"title": "Renewal", "amount": 1200.0, "currency": "eur", "stage": "won"})),
        )
        .await;
        let uri = format!("/bureau/deals/{}/stage", deal["id"].as_str().unwrap());
        let (status, _) = send(&app, Method::POST, &uri, Some(json!({"stage": "lead"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_pipeline_summary_covers_every_stage() {
        let app = app(None);
        let (status, _) = send(
            &app,
            Method::POST,
            "/bureau/deals",
            Some(json!({"title": "Audit", "amount": 5000.0, "currency": "EUR"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, summary) = send(&app, Method::GET, "/bureau/pipeline", None).await;
        assert_eq!(status, StatusCode::OK);
        let summary = summary.as_array().unwrap();
        assert_eq!(summary.len(), bureau::DealStage::ALL.len());
        assert_eq!(summary[0]["stage"], "lead");
        assert_eq!(summary[0]["count"], 1);
    }
}
