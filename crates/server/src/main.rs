mod models;

use models::*;

use axum::{Json, Router, routing::get};
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

const DEFAULT_PORT: u16 = 3001;
const WELCOME: &str = "Bem-vindo ao Portal de Ideias API";

// ===== Main =====

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port = port_from_env(env::var("PORT").ok())?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app()).await?;
    Ok(())
}

fn port_from_env(value: Option<String>) -> anyhow::Result<u16> {
    match value {
        None => {
            tracing::info!("PORT not set, using default: {DEFAULT_PORT}");
            Ok(DEFAULT_PORT)
        }
        Some(p) => p
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT value {p:?}: {e}")),
    }
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ===== Handlers =====

async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: WELCOME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_returns_welcome_message() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let welcome: Welcome = serde_json::from_slice(&body).unwrap();
        assert_eq!(welcome.message, WELCOME);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = app()
            .oneshot(Request::builder().uri("/Ideias").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn port_defaults_and_rejects_garbage() {
        assert_eq!(port_from_env(None).unwrap(), DEFAULT_PORT);
        assert_eq!(port_from_env(Some("8080".into())).unwrap(), 8080);
        assert!(port_from_env(Some("http".into())).is_err());
    }
}
