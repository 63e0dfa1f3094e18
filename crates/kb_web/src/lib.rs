use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod service;
pub mod state;

pub use service::SearchService;
pub use state::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/search-query", post(handlers::search_query))
        .route("/searches", get(handlers::list_searches).delete(handlers::clear_searches))
        .route("/healthz", get(handlers::health))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> kb_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("👋 Shutting down");
        })
        .await?;
    Ok(())
}

pub mod prelude {
    pub use kb_core::{Article, Error, Result, SearchRecord, Summary};
    pub use crate::{create_app, serve, AppState, SearchService};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use kb_core::{Article, SearchStore};
    use kb_inference::models::LocalSummarizer;
    use kb_search::Corpus;
    use kb_storage::InMemorySearchStore;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state(store: Arc<InMemorySearchStore>) -> AppState {
        let corpus = Corpus::new(vec![Article::new(
            "pw",
            "How to reset your password",
            "To reset your password go to account settings -> reset password. If you don't get an email check spam.",
        )])
        .unwrap();
        AppState::new(SearchService::new(
            Arc::new(corpus),
            Arc::new(LocalSummarizer::with_latency(Duration::ZERO)),
            store,
        ))
    }

    fn post_query(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/search-query")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[tokio::test]
    async fn test_healthz() {
        let app = create_app(test_state(Arc::new(InMemorySearchStore::new())));
        let resp = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_bytes(resp).await, b"ok");
    }

    #[tokio::test]
    async fn test_search_query_returns_answer() {
        let store = Arc::new(InMemorySearchStore::new());
        let app = create_app(test_state(store.clone()));

        let resp = app
            .oneshot(post_query(r#"{"query":"I forgot my password"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert!(json["ai_summary_answer"]
            .as_str()
            .unwrap()
            .contains("How to reset your password"));
        assert_eq!(json["ai_relevant_articles"][0], "pw");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_is_bad_request() {
        let store = Arc::new(InMemorySearchStore::new());
        let app = create_app(test_state(store.clone()));

        let resp = app.oneshot(post_query(r#"{"query":""}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(resp).await, b"query cannot be empty");
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_query_is_answered() {
        let app = create_app(test_state(Arc::new(InMemorySearchStore::new())));

        let resp = app.oneshot(post_query(r#"{"query":"   "}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert!(json["ai_summary_answer"]
            .as_str()
            .unwrap()
            .contains("couldn't find any KB articles"));
        assert_eq!(json["ai_relevant_articles"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let app = create_app(test_state(Arc::new(InMemorySearchStore::new())));
        let resp = app.oneshot(post_query("{not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(resp).await, b"invalid json");
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected() {
        let app = create_app(test_state(Arc::new(InMemorySearchStore::new())));
        let resp = app
            .oneshot(Request::builder().uri("/search-query").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_list_and_clear_searches() {
        let store = Arc::new(InMemorySearchStore::new());
        store.save("vpn", "Install the client.", &["kb-1".to_string()]).unwrap();
        let app = create_app(test_state(store.clone()));

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/searches").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["query"], "vpn");
        assert_eq!(json[0]["ai_relevant_articles"][0], "kb-1");

        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/searches")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(store.list().unwrap().is_empty());
    }
}
